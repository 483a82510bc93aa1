use crate::command::{ExecutableCommand, ExitCode, SIGNAL_BASE, STATUS_SPAWN_FAILED};
use crate::env::Environment;
use crate::error::ShellError;
use anyhow::Result;
use log::{debug, trace};
use std::borrow::Cow;
use std::collections::TryReserveError;
use std::ffi::OsString;
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

/// Separator between directories in `PATH`.
pub const PATH_DELIMITER: char = ':';

/// Command that is not a builtin.
///
/// `name` is what the user typed and becomes the child's argv[0]; `program` is the
/// resolved location actually executed.
pub struct ExternalCommand {
    name: OsString,
    program: PathBuf,
    args: Vec<OsString>,
}

impl ExternalCommand {
    pub fn new(name: impl Into<OsString>, program: PathBuf, args: Vec<OsString>) -> Self {
        Self {
            name: name.into(),
            program,
            args,
        }
    }
}

impl ExecutableCommand for ExternalCommand {
    /// Spawns the program with exactly the variables of `env` and blocks until it ends.
    fn execute(
        self: Box<Self>,
        _stdout: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        let mut command = Command::new(&self.program);
        command.args(&self.args).env_clear().envs(env.iter());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.arg0(&self.name);
        }

        let mut child = command.spawn().map_err(classify_spawn_error)?;
        debug!("spawned {} as pid {}", self.program.display(), child.id());
        let exit_status = child.wait().map_err(ShellError::Wait)?;
        trace!("pid {} finished: {}", child.id(), exit_status);
        Ok(status_code(exit_status))
    }
}

/// Separates failures to create a process at all from failures to start the program.
///
/// `std::process::Command` reports exec errors of the child back to the parent, so both
/// kinds arrive here. Only resource exhaustion means no process could be created.
fn classify_spawn_error(err: io::Error) -> ShellError {
    match err.kind() {
        ErrorKind::WouldBlock | ErrorKind::OutOfMemory => ShellError::Spawn(err),
        _ => ShellError::Exec(err),
    }
}

/// Translate the termination of a child into a shell status.
pub fn status_code(exit_status: ExitStatus) -> ExitCode {
    match exit_status.code() {
        Some(x) => x,
        None => terminated_by_signal(exit_status),
    }
}

#[cfg(unix)]
fn terminated_by_signal(exit_status: ExitStatus) -> ExitCode {
    use std::os::unix::process::ExitStatusExt;
    match exit_status.signal() {
        Some(signal) => SIGNAL_BASE + signal,
        None => STATUS_SPAWN_FAILED,
    }
}

#[cfg(not(unix))]
fn terminated_by_signal(_exit_status: ExitStatus) -> ExitCode {
    STATUS_SPAWN_FAILED
}

/// Resolve a command name to the file that should be executed.
///
/// Behavior:
/// - Name containing `/` (absolute or relative): returned unchanged if it exists;
///   `search_paths` is never consulted.
/// - Bare name: each directory of `search_paths` (the `PATH` value) is tried in order and
///   the first existing `<dir>/<name>` wins.
/// - Empty segments of `search_paths` are skipped; they do not stand for the current
///   directory.
/// - Empty name, missing `PATH` or no match: [`ShellError::NotFound`].
///
/// Only existence is checked. Whether the file can actually be executed is found out at
/// spawn time.
pub fn find_command_path<'a>(
    search_paths: Option<&str>,
    name: &'a str,
) -> Result<Cow<'a, Path>, ShellError> {
    if name.is_empty() {
        return Err(ShellError::NotFound);
    }

    if name.contains('/') {
        return find_by_path(Path::new(name))
            .map(Cow::Borrowed)
            .ok_or(ShellError::NotFound);
    }

    let Some(search_paths) = search_paths else {
        trace!("PATH is not set, {} cannot be resolved", name);
        return Err(ShellError::NotFound);
    };

    find_in_path(search_paths, name)?
        .map(Cow::Owned)
        .ok_or(ShellError::NotFound)
}

fn find_in_path(search_paths: &str, cmd: &str) -> Result<Option<PathBuf>, TryReserveError> {
    for dir in search_paths.split(PATH_DELIMITER).filter(|dir| !dir.is_empty()) {
        let path = candidate(dir, cmd)?;
        trace!("trying {}", path.display());
        if find_by_path(&path).is_some() {
            return Ok(Some(path));
        }
    }
    Ok(None)
}

fn candidate(dir: &str, cmd: &str) -> Result<PathBuf, TryReserveError> {
    let mut path = PathBuf::new();
    path.try_reserve(dir.len() + 1 + cmd.len())?;
    path.push(dir);
    path.push(cmd);
    Ok(path)
}

fn find_by_path(path: &Path) -> Option<&Path> {
    if path.exists() { Some(path) } else { None }
}
