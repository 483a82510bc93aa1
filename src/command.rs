use crate::env::Environment;
use anyhow::Result;
use std::io::Write;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// This mirrors the convention used by POSIX shells and many command-line tools.
/// The shell itself reports -1 when a child process could not be created at all.
pub type ExitCode = i32;

/// Status of a command that could not be found or whose image could not be executed.
pub const STATUS_NOT_FOUND: ExitCode = 127;

/// Status of a builtin invoked with bad arguments.
pub const STATUS_USAGE: ExitCode = 2;

/// Status recorded when the process-creation primitive itself failed.
pub const STATUS_SPAWN_FAILED: ExitCode = -1;

/// Offset added to a signal number when a child was killed by that signal.
pub const SIGNAL_BASE: ExitCode = 128;

/// Reduce a shell status to the byte the operating system reports for the process.
pub fn process_exit_byte(code: ExitCode) -> u8 {
    (code & 0xff) as u8
}

/// Object-safe trait for any command that can be executed by the shell.
///
/// This is implemented by built-ins via a blanket impl and by external commands.
pub trait ExecutableCommand {
    /// Executes the command.
    ///
    /// `stdout` is where in-process output goes; external commands inherit the real
    /// standard streams instead.
    fn execute(self: Box<Self>, stdout: &mut dyn Write, env: &mut Environment)
    -> Result<ExitCode>;
}

/// Factory that tries to create a command from a name and its arguments.
///
/// Returns `None` when the factory doesn't recognize the `name`.
pub trait CommandFactory {
    /// Attempt to create a command instance for the provided name and arguments.
    fn try_create(
        &self,
        env: &Environment,
        name: &str,
        args: &[&str],
    ) -> Option<Box<dyn ExecutableCommand>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_exit_byte_truncates() {
        assert_eq!(process_exit_byte(0), 0);
        assert_eq!(process_exit_byte(42), 42);
        assert_eq!(process_exit_byte(STATUS_SPAWN_FAILED), 255);
        assert_eq!(process_exit_byte(256 + 3), 3);
    }
}
