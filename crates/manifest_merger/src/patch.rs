//! Merge results and the patch handed back to callers.
//!
//! Each section merge yields a [`MergeResult`]. The section driver collects
//! every changed result into a [`Patch`]; sections absent from the patch are
//! left untouched. Applying the patch to the installed manifest is the
//! caller's job, [`Patch::apply_to`] is provided for hosts that keep the
//! manifest as a [`ConfigMap`].

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::policy::ConflictRecord;
use crate::value::{ConfigMap, ConfigValue};

#[cfg(test)]
#[path = "patch_tests.rs"]
mod tests;

/// Outcome of merging one section or key.
///
/// A `value` of `None`, null, or an empty container means "remove".
#[derive(Debug, Clone, PartialEq)]
pub struct MergeResult {
    pub changed: bool,
    pub value: Option<ConfigValue>,
}

impl MergeResult {
    /// Keeps the installed value as it is.
    pub fn unchanged(value: Option<ConfigValue>) -> Self {
        Self {
            changed: false,
            value,
        }
    }

    /// Replaces the installed value.
    pub fn changed(value: Option<ConfigValue>) -> Self {
        Self {
            changed: true,
            value,
        }
    }

    /// Returns `true` when the result asks for the key to be removed.
    pub fn is_removal(&self) -> bool {
        self.value.as_ref().map_or(true, ConfigValue::is_removal)
    }
}

/// New content for one section.
#[derive(Debug, Clone, PartialEq)]
pub enum PatchEntry {
    Set(ConfigValue),
    Remove,
}

impl From<MergeResult> for PatchEntry {
    fn from(result: MergeResult) -> Self {
        match result.value {
            Some(value) if !value.is_removal() => PatchEntry::Set(value),
            _ => PatchEntry::Remove,
        }
    }
}

/// Ordered mapping from section name to its new content.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Patch {
    entries: Vec<(String, PatchEntry)>,
}

impl Patch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `result` for `section` if it changed anything.
    pub fn record(&mut self, section: impl Into<String>, result: MergeResult) {
        if !result.changed {
            return;
        }
        let section = section.into();
        let entry = PatchEntry::from(result);
        match self.entries.iter_mut().find(|(name, _)| *name == section) {
            Some((_, existing)) => *existing = entry,
            None => self.entries.push((section, entry)),
        }
    }

    /// Returns `true` if any section changed.
    pub fn has_changes(&self) -> bool {
        !self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, section: &str) -> Option<&PatchEntry> {
        self.entries
            .iter()
            .find(|(name, _)| name == section)
            .map(|(_, entry)| entry)
    }

    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PatchEntry)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    /// Writes every entry into `manifest`: set entries replace in place or
    /// append, remove entries delete the section.
    pub fn apply_to(&self, manifest: &mut ConfigMap) {
        for (section, entry) in &self.entries {
            match entry {
                PatchEntry::Set(value) => {
                    manifest.insert(section.clone(), value.clone());
                }
                PatchEntry::Remove => {
                    manifest.remove(section);
                }
            }
        }
    }
}

impl Serialize for Patch {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (section, entry) in &self.entries {
            match entry {
                PatchEntry::Set(value) => map.serialize_entry(section, value)?,
                PatchEntry::Remove => map.serialize_entry(section, &())?,
            }
        }
        map.end()
    }
}

/// Everything a full manifest merge produces.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MergeReport {
    pub patch: Patch,
    /// Conflicts the policy was consulted about, in resolution order.
    pub conflicts: Vec<ConflictRecord>,
}

impl MergeReport {
    /// Returns `true` if the caller has anything to write back.
    pub fn has_changes(&self) -> bool {
        self.patch.has_changes()
    }
}
