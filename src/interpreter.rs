use crate::builtin::{self, BuiltinOutcome};
use crate::command::{CommandFactory, ExecutableCommand, ExitCode};
use crate::config::Config;
use crate::env::Environment;
use crate::error::ShellError;
use crate::external::{ExternalCommand, find_command_path};
use crate::lexer;
use anyhow::{Context, Result};
use log::{debug, warn};
use std::ffi::OsString;
use std::io::{BufRead, Write};

/// Factory allows creating instances of ExecutableCommand.
///
/// Only supports builtins defined in this crate.
pub(crate) struct Factory<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

/// What the read-eval loop should do after one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Read the next line; carries the status now recorded as the last one.
    Continue(ExitCode),
    /// Stop the loop and exit the process with this status.
    Terminate(ExitCode),
}

/// A minimal shell-like interpreter that can execute built-in and external commands.
///
/// The interpreter owns an [`Environment`] and a list of builtin [`CommandFactory`]
/// objects. A name none of them recognizes is resolved against `PATH` and spawned.
///
/// Example
/// ```
/// use simple_shell::{Config, Flow, Interpreter, env::Environment};
/// let env = Environment::from_vars([("GREETING", "hello")]);
/// let mut sh = Interpreter::new(Config::default(), env);
/// let mut out = Vec::new();
/// let flow = sh.execute_line("env", &mut out, &mut std::io::sink()).unwrap();
/// assert_eq!(flow, Flow::Continue(0));
/// assert_eq!(out, b"GREETING=hello\n");
/// ```
pub struct Interpreter {
    config: Config,
    env: Environment,
    builtins: Vec<Box<dyn CommandFactory>>,
}

impl Interpreter {
    /// Create an interpreter with the default builtins: `exit` and `env`.
    pub fn new(config: Config, env: Environment) -> Self {
        Self::with_builtins(config, env, builtin::default_builtins())
    }

    /// Create a new interpreter with a custom set of builtin factories.
    pub fn with_builtins(
        config: Config,
        env: Environment,
        builtins: Vec<Box<dyn CommandFactory>>,
    ) -> Self {
        Self {
            config,
            env,
            builtins,
        }
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// Settings the interpreter was created with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Read lines from `input` and run them until end of input or `exit`.
    ///
    /// Returns the status the shell process should exit with. Errors are only returned
    /// when the shell cannot go on: reading `input` failed or a child could not be
    /// waited for.
    pub fn repl(
        &mut self,
        input: &mut dyn BufRead,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
    ) -> Result<ExitCode> {
        let mut line = Vec::new();

        loop {
            if self.config.interactive {
                stdout.write_all(self.config.prompt.as_bytes())?;
                stdout.flush()?;
            }

            line.clear();
            let read = input
                .read_until(b'\n', &mut line)
                .context("failed to read standard input")?;
            if read == 0 {
                if self.config.interactive {
                    writeln!(stdout)?;
                }
                debug!("end of input, exiting with {}", self.env.last_status);
                return Ok(self.env.last_status);
            }
            if line.last() == Some(&b'\n') {
                line.pop();
            }

            let text = String::from_utf8_lossy(&line);
            if let Flow::Terminate(code) = self.execute_line(&text, stdout, stderr)? {
                debug!("exit requested with {}", code);
                return Ok(code);
            }
        }
    }

    /// Tokenize and run one line of input.
    ///
    /// Blank lines do nothing and keep the previous status. A line that cannot be
    /// tokenized is reported and skipped.
    pub fn execute_line(
        &mut self,
        line: &str,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
    ) -> Result<Flow> {
        let argv = match lexer::split_into_tokens(line) {
            Ok(argv) => argv,
            Err(err) => {
                self.report(stderr, None, &ShellError::from(err))?;
                return Ok(Flow::Continue(self.env.last_status));
            }
        };
        if argv.is_empty() {
            return Ok(Flow::Continue(self.env.last_status));
        }
        self.run(&argv, stdout, stderr)
    }

    /// Run a single command invocation given as an argument vector.
    ///
    /// Builtins are tried first; anything else is resolved and spawned. Recoverable
    /// failures are reported on `stderr` and turned into a status, which is recorded
    /// as the last status. Statuses of external commands, failed lookups included, are
    /// also kept as the last external status for `exit`.
    pub fn run(
        &mut self,
        argv: &[String],
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
    ) -> Result<Flow> {
        let Some((name, rest)) = argv.split_first() else {
            return Ok(Flow::Continue(self.env.last_status));
        };
        let args: Vec<&str> = rest.iter().map(String::as_str).collect();

        let result = match builtin::dispatch(&self.builtins, &mut self.env, name, &args, stdout) {
            Ok(BuiltinOutcome::NotBuiltin) => {
                let status = match self.run_external(name, rest, stdout) {
                    Ok(code) => code,
                    Err(err) => self.recover(name, err, stderr)?,
                };
                self.env.last_external_status = status;
                Ok(status)
            }
            Ok(BuiltinOutcome::Handled(code)) => Ok(code),
            Ok(BuiltinOutcome::Terminate(code)) => {
                self.env.last_status = code;
                return Ok(Flow::Terminate(code));
            }
            Err(err) => Err(err),
        };

        let status = match result {
            Ok(code) => code,
            Err(err) => self.recover(name, err, stderr)?,
        };
        self.env.last_status = status;
        Ok(Flow::Continue(status))
    }

    fn run_external(
        &mut self,
        name: &str,
        args: &[String],
        stdout: &mut dyn Write,
    ) -> Result<ExitCode> {
        let program = find_command_path(self.env.get_var("PATH"), name)?.into_owned();
        debug!("resolved {} to {}", name, program.display());

        // Children write straight to the inherited descriptors.
        stdout.flush()?;
        let cmd = ExternalCommand::new(name, program, args.iter().map(OsString::from).collect());
        Box::new(cmd).execute(stdout, &mut self.env)
    }

    /// Report a failed command and return the status it leaves behind.
    fn recover(&self, name: &str, err: anyhow::Error, stderr: &mut dyn Write) -> Result<ExitCode> {
        match err.downcast::<ShellError>() {
            Ok(err) if err.is_fatal() => Err(err.into()),
            Ok(err) => {
                self.report(stderr, Some(name), &err)?;
                Ok(err.status())
            }
            Err(err) => {
                warn!("{} failed: {:#}", name, err);
                writeln!(stderr, "{}: 1: {}: {:#}", self.config.program_name, name, err)?;
                Ok(1)
            }
        }
    }

    /// Writes `<program>: 1: [<command>: ]<message>`.
    ///
    /// The `1` is a fixed field kept for compatibility, not a line counter.
    fn report(&self, stderr: &mut dyn Write, name: Option<&str>, err: &ShellError) -> Result<()> {
        let program = &self.config.program_name;
        match name {
            Some(name) => writeln!(stderr, "{}: 1: {}: {}", program, name, err)?,
            None => writeln!(stderr, "{}: 1: {}", program, err)?,
        }
        Ok(())
    }
}
