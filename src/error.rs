//! Error taxonomy of the command pipeline.

use crate::command::{ExitCode, STATUS_NOT_FOUND, STATUS_SPAWN_FAILED, STATUS_USAGE};
use crate::lexer::LexingError;
use std::collections::TryReserveError;
use std::io::{self, ErrorKind};
use thiserror::Error;

/// Failures the interpreter can hit while turning a line into a finished process.
///
/// Everything except [`ShellError::Wait`] is recoverable: the loop reports it and moves
/// on to the next line with the status given by [`ShellError::status`].
#[derive(Error, Debug)]
pub enum ShellError {
    #[error("not found")]
    NotFound,
    #[error("Illegal number: {0}")]
    IllegalNumber(String),
    #[error("{}", .0.trim_end())]
    Usage(String),
    #[error("cannot allocate memory")]
    OutOfMemory(#[from] TryReserveError),
    #[error("{}", exec_reason(.0))]
    Exec(#[source] io::Error),
    #[error("cannot spawn process: {0}")]
    Spawn(#[source] io::Error),
    #[error("failed to wait for child process: {0}")]
    Wait(#[source] io::Error),
}

impl ShellError {
    /// Exit status recorded for the iteration that failed with this error.
    pub fn status(&self) -> ExitCode {
        match self {
            ShellError::NotFound | ShellError::Exec(_) => STATUS_NOT_FOUND,
            ShellError::IllegalNumber(_) | ShellError::Usage(_) => STATUS_USAGE,
            ShellError::OutOfMemory(_) => 1,
            ShellError::Spawn(_) | ShellError::Wait(_) => STATUS_SPAWN_FAILED,
        }
    }

    /// Whether the shell can no longer continue after this error.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ShellError::Wait(_))
    }
}

impl From<LexingError> for ShellError {
    fn from(err: LexingError) -> Self {
        match err {
            LexingError::OutOfMemory(e) => ShellError::OutOfMemory(e),
        }
    }
}

fn exec_reason(err: &io::Error) -> String {
    match err.kind() {
        ErrorKind::NotFound => "not found".to_string(),
        ErrorKind::PermissionDenied => "Permission denied".to_string(),
        _ => err.to_string(),
    }
}
