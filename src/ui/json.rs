//! NDJSON event types for `--json` output.
//!
//! Every command writes one JSON object per line on stdout. Generator console
//! output goes to stderr in this mode so stdout stays machine-readable.

use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;

use flexgen::task::{ContentDigest, Purged};

/// Write a single NDJSON event (one JSON object per line).
pub fn write_event(out: &mut impl Write, event: &impl Serialize) -> io::Result<()> {
    let line = serde_json::to_string(event).unwrap_or_else(|_| "{}".to_string());
    out.write_all(line.as_bytes())?;
    out.write_all(b"\n")?;
    Ok(())
}

/// Convenience helper that writes to stdout.
pub fn emit(event: &impl Serialize) -> io::Result<()> {
    let mut out = io::stdout().lock();
    write_event(&mut out, event)
}

/// Event emitted when a command starts.
#[derive(Debug, Clone, Serialize)]
pub struct StartEvent<'a> {
    pub event: &'static str,
    pub command: &'a str,
    pub version: &'static str,
}

impl<'a> StartEvent<'a> {
    pub fn new(command: &'a str) -> Self {
        Self {
            event: "start",
            command,
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

/// Event emitted when a command completes.
#[derive(Debug, Clone, Serialize)]
pub struct CompleteEvent<'a> {
    pub event: &'static str,
    pub command: &'a str,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl<'a> CompleteEvent<'a> {
    pub fn new(command: &'a str, success: bool) -> Self {
        Self {
            event: "complete",
            command,
            success,
            duration_ms: None,
        }
    }

    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }
}

/// Event emitted when an error occurs.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorEvent<'a> {
    pub event: &'static str,
    pub command: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lexer: Option<&'a str>,
    pub code: &'a str,
    pub message: String,
}

impl<'a> ErrorEvent<'a> {
    pub fn new(command: &'a str, code: &'a str, message: impl Into<String>) -> Self {
        Self {
            event: "error",
            command,
            lexer: None,
            code,
            message: message.into(),
        }
    }

    pub fn for_lexer(mut self, lexer: &'a str) -> Self {
        self.lexer = Some(lexer);
        self
    }
}

/// Event emitted before the generator is launched for a lexer.
#[derive(Debug, Clone, Serialize)]
pub struct TaskStartedEvent<'a> {
    pub event: &'static str,
    pub lexer: &'a str,
    pub target_file: &'a Path,
    pub command_line: String,
}

impl<'a> TaskStartedEvent<'a> {
    pub fn new(lexer: &'a str, target_file: &'a Path, command_line: String) -> Self {
        Self {
            event: "task_started",
            lexer,
            target_file,
            command_line,
        }
    }
}

/// Event emitted after a successful generator run.
#[derive(Debug, Clone, Serialize)]
pub struct TaskFinishedEvent<'a> {
    pub event: &'static str,
    pub lexer: &'a str,
    pub target_file: &'a Path,
    pub changed: bool,
    pub purged: Purged,
    pub fingerprint: &'a ContentDigest,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<&'a ContentDigest>,
    pub duration_ms: u64,
}

/// Event carrying the generator command for `flexgen args`.
#[derive(Debug, Clone, Serialize)]
pub struct ArgsEvent<'a> {
    pub event: &'static str,
    pub lexer: &'a str,
    pub program: String,
    pub args: Vec<String>,
    pub command_line: String,
}

/// Event reporting one lexer's validation result for `flexgen check`.
#[derive(Debug, Clone, Serialize)]
pub struct CheckEvent<'a> {
    pub event: &'static str,
    pub lexer: &'a str,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_file: Option<&'a Path>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
