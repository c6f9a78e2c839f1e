use prost::Message;
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let out_dir = PathBuf::from(std::env::var("OUT_DIR")?);

    let ifiles = ["raft_client.proto"];
    let include_dirs = ["proto"];
    let fds = protox::compile(ifiles, include_dirs)?;

    let fd_path = out_dir.join("raft_client_descriptor.bin");
    std::fs::write(fd_path, fds.encode_to_vec())?;

    let mut config = prost_build::Config::new();
    config.bytes(["."]);
    config.service_generator(tonic_build::configure().service_generator());
    config.compile_fds(fds)?;

    println!("cargo:rerun-if-changed=proto/raft_client.proto");
    Ok(())
}
