//! A tiny interactive command interpreter.
//!
//! Each input line is split into an argument vector, checked against the small set of
//! builtins implemented in Rust (`exit`, `env`), and otherwise resolved against `PATH`
//! and run as a child process. The child's termination is mapped to a shell-style exit
//! status that feeds the next `exit`.
//!
//! The main entry point is [`Interpreter`]. The public modules [`command`], [`env`] and
//! [`error`] expose the status type, the injected process environment and the error
//! taxonomy; [`lexer`] and [`external::find_command_path`] are usable on their own.

mod builtin;
pub mod command;
pub mod config;
pub mod env;
pub mod error;
pub mod external;
mod interpreter;
pub mod lexer;

pub use builtin::BuiltinOutcome;
pub use config::Config;
/// Just a convenient re-export of the interactive command runner.
///
/// See [`Interpreter`] for the high-level API.
pub use interpreter::{Flow, Interpreter};
