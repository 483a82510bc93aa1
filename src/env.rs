use crate::command::ExitCode;
use std::env as stdenv;

/// Mutable, user-level view of the process environment used by the interpreter.
///
/// The environment contains:
/// - `vars`: the variables visible to executed commands, in the order the process
///   received them.
/// - `last_status`: the exit status of the most recent command, used at end of input.
/// - `last_external_status`: the exit status of the most recent external command, read
///   by `exit` without an argument.
/// - `should_exit`: a flag that the read-eval loop checks to know when to terminate.
///
/// Resolution, spawning and the `env` builtin all read this snapshot rather than the
/// live process environment, so tests can inject a fake one with [`Environment::from_vars`].
#[derive(Debug, Clone)]
pub struct Environment {
    /// Ordered `KEY=VALUE` pairs (e.g. PATH, HOME).
    pub vars: Vec<(String, String)>,
    /// Exit status of the last command; 0 until something has run.
    pub last_status: ExitCode,
    /// Exit status of the last external command, including not-found (127), exec (127)
    /// and spawn (-1) failures. Builtins never change it.
    pub last_external_status: ExitCode,
    /// When set to true, indicates that an interactive loop should exit.
    pub should_exit: bool,
}

impl Environment {
    /// Capture the current process environment into a new `Environment` instance.
    ///
    /// Keys and values that are not valid UTF-8 are converted lossily.
    pub fn new() -> Self {
        Self::from_vars(stdenv::vars_os().map(|(k, v)| {
            (
                k.to_string_lossy().into_owned(),
                v.to_string_lossy().into_owned(),
            )
        }))
    }

    /// Build an environment from explicit pairs, keeping their order.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
            last_status: 0,
            last_external_status: 0,
            should_exit: false,
        }
    }

    /// Get the value of an environment variable.
    pub fn get_var(&self, key: &str) -> Option<&str> {
        self.vars
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set or override an environment variable; new keys are appended at the end.
    pub fn set_var(&mut self, key: impl Into<String>, val: impl Into<String>) {
        let key = key.into();
        let val = val.into();
        match self.vars.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => *v = val,
            None => self.vars.push((key, val)),
        }
    }

    /// Iterate over all variables in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
