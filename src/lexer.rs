//! Splitting of an input line into an argument vector.
//!
//! Words are separated by runs of blanks. There is no quoting, escaping or expansion:
//! every run of non-blank characters becomes one literal argument.

use std::collections::TryReserveError;
use thiserror::Error;

/// Characters that separate words.
pub const DELIMITERS: [char; 4] = [' ', '\t', '\r', '\n'];

/// Errors that can occur during the lexical analysis process.
#[derive(Error, Debug)]
pub enum LexingError {
    /// A buffer for the argument vector or one of its words could not grow.
    #[error("cannot allocate memory")]
    OutOfMemory(#[from] TryReserveError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexingState {
    Start,
    ReadingWord,
}

struct LexingFSM<'a> {
    input: std::str::Chars<'a>,
    state: LexingState,
    buffer: String,
}

impl<'a> LexingFSM<'a> {
    fn new(line: &'a str) -> Self {
        LexingFSM {
            input: line.chars(),
            state: LexingState::Start,
            buffer: String::new(),
        }
    }

    /// Runs the machine over the whole line and returns the collected words.
    ///
    /// Every buffer grows through `try_reserve`, so running out of memory is reported
    /// as [`LexingError::OutOfMemory`] instead of aborting the shell.
    fn make_tokens(&mut self) -> Result<Vec<String>, LexingError> {
        let mut out = Vec::new();

        while let Some(ch) = self.input.next() {
            match self.state {
                LexingState::Start => self.handle_start(ch)?,
                LexingState::ReadingWord => self.handle_word(ch, &mut out)?,
            }
        }

        if self.state == LexingState::ReadingWord {
            self.finalize_word(&mut out)?;
        }

        Ok(out)
    }

    fn handle_start(&mut self, ch: char) -> Result<(), LexingError> {
        if !is_delimiter(ch) {
            self.push_char(ch)?;
            self.state = LexingState::ReadingWord;
        }
        Ok(())
    }

    fn handle_word(&mut self, ch: char, out: &mut Vec<String>) -> Result<(), LexingError> {
        if is_delimiter(ch) {
            self.finalize_word(out)?;
            self.state = LexingState::Start;
        } else {
            self.push_char(ch)?;
        }
        Ok(())
    }

    fn push_char(&mut self, ch: char) -> Result<(), LexingError> {
        self.buffer.try_reserve(ch.len_utf8())?;
        self.buffer.push(ch);
        Ok(())
    }

    fn finalize_word(&mut self, out: &mut Vec<String>) -> Result<(), LexingError> {
        out.try_reserve(1)?;
        out.push(std::mem::take(&mut self.buffer));
        Ok(())
    }
}

fn is_delimiter(ch: char) -> bool {
    DELIMITERS.contains(&ch)
}

/// The main entry point function to perform lexical analysis.
///
/// Returns an empty vector for an empty or all-blank line; callers treat that as
/// "nothing to do".
pub fn split_into_tokens(line: &str) -> Result<Vec<String>, LexingError> {
    LexingFSM::new(line).make_tokens()
}
