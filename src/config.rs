use std::io::IsTerminal;

/// Name used in messages when the process was started without an argv[0].
pub const DEFAULT_PROGRAM_NAME: &str = "simple_shell";

/// Prompt printed before each line in interactive sessions.
pub const DEFAULT_PROMPT: &str = "$ ";

/// Runtime settings of one shell session.
#[derive(Debug, Clone)]
pub struct Config {
    /// Name the shell was invoked with; prefixes every error message.
    pub program_name: String,
    /// Written to stdout before each line is read in interactive mode.
    pub prompt: String,
    /// Print the prompt (and a newline on EOF) only when reading from a terminal.
    pub interactive: bool,
}

impl Config {
    /// Settings for the running process: argv[0] verbatim and whether stdin is a terminal.
    pub fn from_process() -> Self {
        let program_name = std::env::args_os()
            .next()
            .map(|arg0| arg0.to_string_lossy().into_owned())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| DEFAULT_PROGRAM_NAME.to_string());
        Self {
            program_name,
            prompt: DEFAULT_PROMPT.to_string(),
            interactive: std::io::stdin().is_terminal(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            program_name: DEFAULT_PROGRAM_NAME.to_string(),
            prompt: DEFAULT_PROMPT.to_string(),
            interactive: false,
        }
    }
}
