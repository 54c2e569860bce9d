//! Section layout settings.
//!
//! Tells the section driver which top-level sections are entity collections,
//! which of those are order-sensitive, and which sections to leave alone.
//!
//! # TOML Format
//!
//! ```toml
//! ordered_entity_sections = ["require", "require-dev"]
//! unordered_entity_sections = ["conflict", "provide", "replace"]
//! ignored_sections = ["version"]
//! excluded_entities = ["acme/product-edition"]
//! ```
//!
//! Every field is optional and falls back to [`MergeSettings::default`].

use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;

/// How a top-level section is merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    /// Generic recursive merge.
    Tree,
    /// Name → constraint collection.
    Entities { ordered: bool },
}

/// Section layout of a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeSettings {
    /// Entity sections whose order is meaningful.
    pub ordered_entity_sections: Vec<String>,

    /// Entity sections compared as sets.
    pub unordered_entity_sections: Vec<String>,

    /// Sections that are never merged and never patched.
    pub ignored_sections: Vec<String>,

    /// Entity names skipped by the entity merger, matched ignoring ASCII case.
    pub excluded_entities: Vec<String>,
}

impl Default for MergeSettings {
    fn default() -> Self {
        Self {
            ordered_entity_sections: vec!["require".to_string(), "require-dev".to_string()],
            unordered_entity_sections: vec![
                "conflict".to_string(),
                "provide".to_string(),
                "replace".to_string(),
            ],
            ignored_sections: Vec::new(),
            excluded_entities: Vec::new(),
        }
    }
}

impl MergeSettings {
    pub fn section_kind(&self, section: &str) -> SectionKind {
        if self.ordered_entity_sections.iter().any(|s| s == section) {
            SectionKind::Entities { ordered: true }
        } else if self.unordered_entity_sections.iter().any(|s| s == section) {
            SectionKind::Entities { ordered: false }
        } else {
            SectionKind::Tree
        }
    }

    pub fn is_ignored(&self, section: &str) -> bool {
        self.ignored_sections.iter().any(|s| s == section)
    }

    /// Predicate matching `excluded_entities`, ignoring ASCII case.
    pub fn exclusion(&self) -> impl Fn(&str) -> bool + '_ {
        move |name: &str| {
            self.excluded_entities
                .iter()
                .any(|excluded| excluded.eq_ignore_ascii_case(name))
        }
    }
}
