use crate::command::{CommandFactory, ExecutableCommand, ExitCode};
use crate::env::Environment;
use crate::error::ShellError;
use crate::interpreter::Factory;
use anyhow::Result;
use argh::{EarlyExit, FromArgs};
use log::debug;
use std::io::Write;

/// Built-in commands known to the shell at compile time.
///
/// Builtins are parsed using the [`argh`] crate (`FromArgs`) and executed directly
/// in-process without spawning a child process.
pub(crate) trait BuiltinCommand: Sized + FromArgs {
    /// Canonical name of the command, e.g. "exit" or "env".
    fn name() -> &'static str;

    /// Build the command from its arguments. Defaults to `argh` parsing.
    fn parse(name: &str, args: &[&str]) -> Result<Self, EarlyExit> {
        Self::from_args(&[name], args)
    }

    /// Executes the command using provided output stream and environment.
    ///
    /// Return value should follow shell conventions: 0 for success, non-zero for error.
    fn execute(self, stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode>;
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    fn execute(
        self: Box<Self>,
        stdout: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        <T as BuiltinCommand>::execute(*self, stdout, env)
    }
}

/// Stand-in for a builtin whose arguments did not parse, or that was asked for `--help`.
struct InvalidArgs {
    output: String,
    is_error: bool,
}

impl ExecutableCommand for InvalidArgs {
    fn execute(
        self: Box<Self>,
        stdout: &mut dyn Write,
        _env: &mut Environment,
    ) -> Result<ExitCode> {
        if self.is_error {
            return Err(ShellError::Usage(self.output).into());
        }
        stdout.write_all(self.output.as_bytes())?;
        Ok(0)
    }
}

impl<T: BuiltinCommand + 'static> CommandFactory for Factory<T> {
    fn try_create(
        &self,
        _env: &Environment,
        name: &str,
        args: &[&str],
    ) -> Option<Box<dyn ExecutableCommand>> {
        if name == T::name() {
            Some(match T::parse(name, args) {
                Ok(cmd) => Box::new(cmd),
                Err(EarlyExit { output, status }) => Box::new(InvalidArgs {
                    output,
                    is_error: status.is_err(),
                }),
            })
        } else {
            None
        }
    }
}

/// Result of offering an argument vector to the builtins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinOutcome {
    /// No builtin has this name; resolve and spawn it instead.
    NotBuiltin,
    /// The builtin ran; the status is this iteration's status.
    Handled(ExitCode),
    /// The builtin asked the shell to stop with this status.
    Terminate(ExitCode),
}

/// Run `name` if one of `builtins` recognizes it.
///
/// Errors come from the builtin itself (usage errors, failed writes) and leave
/// `env.should_exit` untouched.
pub(crate) fn dispatch(
    builtins: &[Box<dyn CommandFactory>],
    env: &mut Environment,
    name: &str,
    args: &[&str],
    stdout: &mut dyn Write,
) -> Result<BuiltinOutcome> {
    let Some(cmd) = builtins
        .iter()
        .find_map(|factory| factory.try_create(env, name, args))
    else {
        return Ok(BuiltinOutcome::NotBuiltin);
    };

    debug!("running builtin {}", name);
    let code = cmd.execute(stdout, env)?;
    if env.should_exit {
        Ok(BuiltinOutcome::Terminate(code))
    } else {
        Ok(BuiltinOutcome::Handled(code))
    }
}

/// The builtins every interpreter starts with.
pub(crate) fn default_builtins() -> Vec<Box<dyn CommandFactory>> {
    vec![
        Box::new(Factory::<Exit>::default()),
        Box::new(Factory::<Env>::default()),
    ]
}

#[derive(FromArgs)]
/// Exit the shell.
/// Without a status, exits with the status of the last external command.
pub struct Exit {
    #[argh(positional)]
    /// exit status; decimal digits only, reduced modulo 256.
    pub status: Option<String>,
}

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    fn execute(self, _stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode> {
        let code = match self.status {
            Some(arg) => parse_exit_status(&arg)?,
            None => env.last_external_status,
        };
        env.should_exit = true;
        Ok(code)
    }
}

/// Accepts only ASCII digits; the value is folded modulo 256 so any length works.
fn parse_exit_status(arg: &str) -> Result<ExitCode, ShellError> {
    if arg.is_empty() || !arg.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ShellError::IllegalNumber(arg.to_string()));
    }
    Ok(arg
        .bytes()
        .fold(0, |acc, b| (acc * 10 + ExitCode::from(b - b'0')) % 256))
}

#[derive(FromArgs)]
/// Print the environment, one KEY=VALUE entry per line.
pub struct Env {}

impl BuiltinCommand for Env {
    fn name() -> &'static str {
        "env"
    }

    /// Arguments are ignored.
    fn parse(_name: &str, _args: &[&str]) -> Result<Self, EarlyExit> {
        Ok(Env {})
    }

    fn execute(self, stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode> {
        for (key, value) in env.iter() {
            writeln!(stdout, "{}={}", key, value)?;
        }
        Ok(0)
    }
}
