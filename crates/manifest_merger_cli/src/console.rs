//! Terminal-backed console for the merge engine.
//!
//! Messages go to stderr so that stdout only carries the patch. Questions are
//! asked with `dialoguer` and only when stdin is a terminal.

use std::io::{self, IsTerminal};

use colored::{ColoredString, Colorize};
use dialoguer::Confirm;
use manifest_merger::{Console, EngineResult, FormatTag, MergeError, Verbosity};

#[cfg(test)]
#[path = "console_tests.rs"]
mod tests;

/// Console writing to the terminal.
#[derive(Debug, Clone)]
pub struct TerminalConsole {
    verbosity: Verbosity,
    interactive: bool,
}

impl TerminalConsole {
    /// Creates a console that is interactive when stdin is a terminal.
    pub fn new(verbosity: Verbosity) -> Self {
        Self::with_interactive(verbosity, io::stdin().is_terminal())
    }

    pub fn with_interactive(verbosity: Verbosity, interactive: bool) -> Self {
        Self {
            verbosity,
            interactive,
        }
    }

    /// Whether a message at `verbosity` is printed.
    pub fn shows(&self, verbosity: Verbosity) -> bool {
        verbosity <= self.verbosity
    }
}

impl Console for TerminalConsole {
    fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn ask(&mut self, question: &str, default: bool) -> EngineResult<bool> {
        if !self.interactive {
            return Err(MergeError::Prompt {
                reason: "stdin is not a terminal".to_string(),
            });
        }
        Confirm::new()
            .with_prompt(question)
            .default(default)
            .interact()
            .map_err(|e| MergeError::Prompt {
                reason: format!("Failed to get user input: {}", e),
            })
    }

    fn log(&mut self, message: &str, verbosity: Verbosity, tag: Option<FormatTag>) {
        if self.shows(verbosity) {
            eprintln!("{}", style(message, tag));
        }
    }
}

/// Maps the number of `-v` flags to a verbosity threshold.
pub fn verbosity_from_count(count: u8) -> Verbosity {
    match count {
        0 => Verbosity::Normal,
        1 => Verbosity::Verbose,
        2 => Verbosity::VeryVerbose,
        _ => Verbosity::Debug,
    }
}

/// Colors a message according to its tag.
pub fn style(message: &str, tag: Option<FormatTag>) -> ColoredString {
    match tag {
        Some(FormatTag::Info) => message.green(),
        Some(FormatTag::Comment) => message.yellow(),
        Some(FormatTag::Warning) => message.yellow().bold(),
        Some(FormatTag::Error) => message.red().bold(),
        Some(FormatTag::Question) => message.cyan(),
        None => message.normal(),
    }
}
