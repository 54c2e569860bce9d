//! Conflict policy and the per-invocation merge context.
//!
//! Whenever the classifier reports a conflict, the merge components ask the
//! [`MergeContext`] whether the target's action should be applied. The answer
//! depends on [`MergeOptions`]:
//!
//! - **Override** (`force_override`): always apply, and say so
//! - **Interactive** (`interactive`): ask the operator, defaulting to "no";
//!   a non-interactive console is a fatal usage error
//! - **Keep** (default): never apply, and point at the two options above
//!
//! Every consulted conflict is recorded so hosts can report them afterwards.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::console::{Console, FormatTag, Verbosity};
use crate::errors::{EngineResult, MergeError};

#[cfg(test)]
#[path = "policy_tests.rs"]
mod tests;

/// Command-line style switches selecting how conflicts are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeOptions {
    /// Apply the target's value even over local changes.
    #[serde(default)]
    pub force_override: bool,

    /// Ask the operator about each conflict.
    #[serde(default)]
    pub interactive: bool,
}

impl MergeOptions {
    /// Options that keep every local change.
    pub fn keep() -> Self {
        Self::default()
    }

    /// Options that override every local change.
    pub fn force_override() -> Self {
        Self {
            force_override: true,
            interactive: false,
        }
    }

    /// Options that ask about every conflict.
    pub fn interactive() -> Self {
        Self {
            force_override: false,
            interactive: true,
        }
    }

    /// The effective mode. Forcing wins over asking.
    pub fn mode(&self) -> ConflictMode {
        if self.force_override {
            ConflictMode::Override
        } else if self.interactive {
            ConflictMode::Interactive
        } else {
            ConflictMode::Keep
        }
    }
}

/// How conflicts are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictMode {
    Keep,
    Override,
    Interactive,
}

/// Outcome of one conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// The target's action was applied over the local change.
    Applied,
    /// The local value was kept.
    Declined,
}

/// Diagnostic record of a conflict the policy was consulted about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConflictRecord {
    pub field: String,
    pub description: String,
    pub resolution: Resolution,
}

/// Everything a merge call needs besides its three input values.
///
/// Created once per merge invocation and passed explicitly to each merge
/// function. Sections never share any other state.
pub struct MergeContext<'a> {
    console: &'a mut dyn Console,
    options: MergeOptions,
    conflicts: Vec<ConflictRecord>,
}

impl<'a> MergeContext<'a> {
    pub fn new(console: &'a mut dyn Console, options: MergeOptions) -> Self {
        Self {
            console,
            options,
            conflicts: Vec::new(),
        }
    }

    pub fn options(&self) -> MergeOptions {
        self.options
    }

    /// Forwards a message to the console.
    pub fn log(&mut self, message: &str, verbosity: Verbosity, tag: Option<FormatTag>) {
        self.console.log(message, verbosity, tag);
    }

    /// Conflicts resolved so far, in the order they were resolved.
    pub fn conflicts(&self) -> &[ConflictRecord] {
        &self.conflicts
    }

    /// Drains the recorded conflicts.
    pub fn take_conflicts(&mut self) -> Vec<ConflictRecord> {
        std::mem::take(&mut self.conflicts)
    }

    /// Decides whether a conflicting target action on `field` is applied.
    ///
    /// Returns `true` to apply the target's action, `false` to keep the
    /// installed value.
    ///
    /// # Errors
    ///
    /// Returns `MergeError::InteractiveUnavailable` in interactive mode when
    /// the console cannot ask questions, and propagates console failures.
    pub fn resolve_conflict(&mut self, field: &str, description: &str) -> EngineResult<bool> {
        let apply = match self.options.mode() {
            ConflictMode::Override => {
                self.console
                    .log(description, Verbosity::Normal, Some(FormatTag::Warning));
                self.console.log(
                    "Overriding local changes due to --force-overrides.",
                    Verbosity::Normal,
                    None,
                );
                true
            }
            ConflictMode::Interactive => {
                if !self.console.is_interactive() {
                    warn!(field, "Interactive conflict resolution without a terminal");
                    return Err(MergeError::InteractiveUnavailable {
                        field: field.to_string(),
                    });
                }
                let question = format!("{}\nUpdate {}?", description, field);
                self.console.ask(&question, false)?
            }
            ConflictMode::Keep => {
                self.console
                    .log(description, Verbosity::Normal, Some(FormatTag::Comment));
                self.console.log(
                    &format!(
                        "{} will not be changed. Re-run with --force-overrides or \
                         --interactive-conflicts to override.",
                        field
                    ),
                    Verbosity::Normal,
                    Some(FormatTag::Comment),
                );
                false
            }
        };

        let resolution = if apply {
            Resolution::Applied
        } else {
            Resolution::Declined
        };
        debug!(field, ?resolution, "Resolved conflict");
        self.conflicts.push(ConflictRecord {
            field: field.to_string(),
            description: description.to_string(),
            resolution,
        });
        Ok(apply)
    }
}

impl std::fmt::Debug for MergeContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MergeContext")
            .field("options", &self.options)
            .field("conflicts", &self.conflicts)
            .finish_non_exhaustive()
    }
}
