//! Operator-facing console abstraction.
//!
//! The engine never prints or reads input directly. Hosts supply a
//! [`Console`] that decides where messages go and how questions are asked.
//! Diagnostics for developers go through `tracing` instead.

use std::collections::VecDeque;

use crate::errors::{EngineResult, MergeError};

#[cfg(test)]
#[path = "console_tests.rs"]
mod tests;

/// How chatty a message is. Hosts filter on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Verbosity {
    Normal,
    Verbose,
    VeryVerbose,
    Debug,
}

/// Presentation hint attached to a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatTag {
    Info,
    Comment,
    Warning,
    Error,
    Question,
}

/// Message sink and question asker used while merging.
pub trait Console {
    /// Whether [`Console::ask`] can block on an answer from an operator.
    fn is_interactive(&self) -> bool;

    /// Asks a yes/no question and blocks until it is answered.
    ///
    /// # Errors
    ///
    /// Returns `MergeError::Prompt` when the console is not interactive or
    /// reading the answer fails. The conflict policy checks
    /// [`Console::is_interactive`] first and reports the field instead.
    fn ask(&mut self, question: &str, default: bool) -> EngineResult<bool>;

    /// Emits one message.
    fn log(&mut self, message: &str, verbosity: Verbosity, tag: Option<FormatTag>);
}

/// One message captured by [`BufferedConsole`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggedMessage {
    pub message: String,
    pub verbosity: Verbosity,
    pub tag: Option<FormatTag>,
}

/// A console that records messages in memory and answers questions from a
/// scripted queue.
///
/// Useful for hosts without a terminal that collect decisions up front, and
/// for tests.
///
/// # Examples
///
/// ```rust
/// use manifest_merger::{BufferedConsole, Console, Verbosity};
///
/// let mut console = BufferedConsole::interactive(vec![true]);
/// assert!(console.ask("Update require?", false).unwrap());
/// // Queue exhausted: the default answer is used.
/// assert!(!console.ask("Update extra?", false).unwrap());
///
/// console.log("done", Verbosity::Normal, None);
/// assert!(console.contains("done"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct BufferedConsole {
    interactive: bool,
    answers: VecDeque<bool>,
    messages: Vec<LoggedMessage>,
    questions: Vec<String>,
}

impl BufferedConsole {
    /// A console that cannot ask questions.
    pub fn new() -> Self {
        Self::default()
    }

    /// An interactive console answering from `answers` in order, then with
    /// each question's default.
    pub fn interactive(answers: impl IntoIterator<Item = bool>) -> Self {
        Self {
            interactive: true,
            answers: answers.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn messages(&self) -> &[LoggedMessage] {
        &self.messages
    }

    pub fn questions(&self) -> &[String] {
        &self.questions
    }

    /// Returns `true` if any recorded message contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.messages.iter().any(|m| m.message.contains(needle))
    }
}

impl Console for BufferedConsole {
    fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn ask(&mut self, question: &str, default: bool) -> EngineResult<bool> {
        if !self.interactive {
            return Err(MergeError::Prompt {
                reason: "the console is not interactive".to_string(),
            });
        }
        self.questions.push(question.to_string());
        Ok(self.answers.pop_front().unwrap_or(default))
    }

    fn log(&mut self, message: &str, verbosity: Verbosity, tag: Option<FormatTag>) {
        self.messages.push(LoggedMessage {
            message: message.to_string(),
            verbosity,
            tag,
        });
    }
}
