use super::*;
use bincode::Options;
use serde::{Deserialize, Serialize};

/// Upper bound of a serialized stack trace.
const MAX_STACK_TRACE_BYTES: u64 = 1 << 20;

fn codec() -> impl bincode::Options {
    bincode::DefaultOptions::new().with_limit(MAX_STACK_TRACE_BYTES)
}

/// One frame of a stack trace.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct StackFrame {
    pub function: String,
    pub file: Option<String>,
    pub line: Option<u32>,
}

impl StackFrame {
    pub fn new(function: impl Into<String>) -> Self {
        Self {
            function: function.into(),
            file: None,
            line: None,
        }
    }

    pub fn at(mut self, file: impl Into<String>, line: u32) -> Self {
        self.file = Some(file.into());
        self.line = Some(line);
        self
    }
}

/// Stack trace of the place a state machine error was raised.
/// It travels as an opaque blob produced by `serialize`.
#[derive(shrinkwraprs::Shrinkwrap, Serialize, Deserialize, Clone, PartialEq, Eq, Debug, Default)]
pub struct StackTrace(Vec<StackFrame>);

impl StackTrace {
    pub fn new(frames: Vec<StackFrame>) -> Self {
        Self(frames)
    }

    /// Capture the stack of the calling thread.
    /// Frames are recovered from the text rendering of `std::backtrace::Backtrace`.
    pub fn capture() -> Self {
        let bt = std::backtrace::Backtrace::force_capture();
        parse_backtrace(&bt.to_string())
    }

    pub fn frames(&self) -> &[StackFrame] {
        &self.0
    }

    pub fn serialize(&self) -> Bytes {
        if self.0.is_empty() {
            return Bytes::new();
        }
        match codec().serialize(&self.0) {
            Ok(x) => x.into(),
            Err(e) => {
                warn!("failed to serialize stack trace: {e}");
                Bytes::new()
            }
        }
    }

    /// Bytes that are not a serialized stack trace yield an empty trace.
    pub fn deserialize(x: &[u8]) -> Self {
        if x.is_empty() {
            return Self::default();
        }
        match codec().deserialize::<Vec<StackFrame>>(x) {
            Ok(frames) => Self(frames),
            Err(e) => {
                warn!("dropped an undecodable stack trace (len={}): {e}", x.len());
                Self::default()
            }
        }
    }
}

impl From<Vec<StackFrame>> for StackTrace {
    fn from(frames: Vec<StackFrame>) -> Self {
        Self(frames)
    }
}

/// Parse the text rendering of `std::backtrace::Backtrace`:
///
/// ```text
///    0: crate::module::function
///              at ./src/module.rs:10:5
/// ```
///
/// This rendering is not a stable format. Lines that don't match it are
/// skipped, so a different rendering yields fewer frames or none.
fn parse_backtrace(s: &str) -> StackTrace {
    let mut frames: Vec<StackFrame> = vec![];
    for line in s.lines() {
        let line = line.trim();
        if let Some(loc) = line.strip_prefix("at ") {
            let Some(last) = frames.last_mut() else {
                continue;
            };
            // file:line:column
            let mut parts = loc.rsplitn(3, ':');
            let _column = parts.next();
            let line_no = parts.next().and_then(|x| x.parse().ok());
            match (parts.next(), line_no) {
                (Some(file), Some(line_no)) => {
                    last.file = Some(file.to_owned());
                    last.line = Some(line_no);
                }
                _ => last.file = Some(loc.to_owned()),
            }
        } else if let Some((index, function)) = line.split_once(": ") {
            if index.parse::<usize>().is_ok() {
                frames.push(StackFrame::new(function));
            }
        }
    }
    StackTrace(frames)
}
