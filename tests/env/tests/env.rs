use anyhow::Result;
use env::*;
use serial_test::serial;
use test_log::test;

#[serial]
#[test(tokio::test(flavor = "multi_thread"))]
async fn create() -> Result<()> {
    let env = Env::new(1, 1).await?;
    let rep = env.submit(1, AppRequest::Get, true).await?;
    assert!(rep.is_success());
    Ok(())
}

#[serial]
#[test(tokio::test(flavor = "multi_thread"))]
async fn create_remove() -> Result<()> {
    let mut env = Env::new(2, 1).await?;
    env.check_connectivity(2).await?;

    env.remove_node(2);
    tokio::time::sleep(std::time::Duration::from_millis(500)).await;

    let rep = env.submit(1, AppRequest::Get, true).await?;
    assert!(rep.is_success());
    assert!(env.submit(2, AppRequest::Get, true).await.is_err());
    Ok(())
}
