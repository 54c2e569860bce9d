//! Three-way delta classification for a single value.
//!
//! Given the value of one field in the original baseline, the target baseline
//! and the installed copy, [`classify`] decides what the target is trying to do
//! to the field and whether the installed copy has diverged in a way that makes
//! doing it a conflict.
//!
//! A conflict means the target wants to move the value away from the original
//! while the installed value has already moved away from the original itself.
//! A value that already equals the target is never a conflict.

use std::fmt;

#[cfg(test)]
#[path = "classifier_tests.rs"]
mod tests;

/// What the target baseline does to a field, relative to the installed copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeltaAction {
    None,
    Add,
    Remove,
    Change,
}

impl fmt::Display for DeltaAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DeltaAction::None => "none",
            DeltaAction::Add => "add",
            DeltaAction::Remove => "remove",
            DeltaAction::Change => "change",
        };
        f.write_str(label)
    }
}

/// Classification of one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delta {
    pub action: DeltaAction,
    /// Human-readable description when applying `action` would discard a
    /// local change.
    pub conflict: Option<String>,
}

impl Delta {
    fn clean(action: DeltaAction) -> Self {
        Self {
            action,
            conflict: None,
        }
    }

    fn conflicted(action: DeltaAction, description: String) -> Self {
        Self {
            action,
            conflict: Some(description),
        }
    }

    pub fn is_conflict(&self) -> bool {
        self.conflict.is_some()
    }
}

/// Classifies the change the target makes to one field.
///
/// `None` stands for an absent or null value. Rules, first match wins:
///
/// | original | target | installed | action | conflict |
/// |---|---|---|---|---|
/// | = target | | | none | no |
/// | | | = target | none | no |
/// | null | | null | add | no |
/// | null | | other | change | yes |
/// | | null | = original | remove | no |
/// | | null | other | remove | yes |
/// | set | set | = original | change | no |
/// | set | set | null | add | yes |
/// | set | set | other | change | yes |
///
/// # Examples
///
/// ```rust
/// use manifest_merger::{classify, DeltaAction};
///
/// let delta = classify("require.php", Some("^8.1"), Some("^8.2"), Some("^8.1"));
/// assert_eq!(delta.action, DeltaAction::Change);
/// assert!(!delta.is_conflict());
///
/// let delta = classify("require.php", Some("^8.1"), Some("^8.2"), Some("^8.0"));
/// assert_eq!(delta.action, DeltaAction::Change);
/// assert!(delta.is_conflict());
/// ```
pub fn classify<T>(field: &str, original: Option<&T>, target: Option<&T>, user: Option<&T>) -> Delta
where
    T: PartialEq + fmt::Display + ?Sized,
{
    if original == target || user == target {
        return Delta::clean(DeltaAction::None);
    }

    let Some(original) = original else {
        return match user {
            None => Delta::clean(DeltaAction::Add),
            Some(user) => Delta::conflicted(
                DeltaAction::Change,
                format!(
                    "Target {} wants to add \"{}\" but the installation has \"{}\"",
                    field,
                    display(target),
                    user
                ),
            ),
        };
    };

    let Some(target) = target else {
        return if user == Some(original) {
            Delta::clean(DeltaAction::Remove)
        } else {
            Delta::conflicted(
                DeltaAction::Remove,
                format!(
                    "Target {} wants to remove \"{}\" but the installation has \"{}\"",
                    field,
                    original,
                    display(user)
                ),
            )
        };
    };

    match user {
        Some(user) if user == original => Delta::clean(DeltaAction::Change),
        None => Delta::conflicted(
            DeltaAction::Add,
            format!(
                "Target {} wants to update \"{}\" to \"{}\" but the field was removed",
                field, original, target
            ),
        ),
        Some(user) => Delta::conflicted(
            DeltaAction::Change,
            format!(
                "Target {} wants to update from \"{}\" to \"{}\" but it is instead \"{}\"",
                field, original, target, user
            ),
        ),
    }
}

fn display<T: fmt::Display + ?Sized>(value: Option<&T>) -> String {
    value.map_or_else(|| "null".to_string(), |v| v.to_string())
}
