//! Manifest merging engine.
//!
//! This module drives the three-way merge over whole manifests. Each top-level
//! section is merged on its own, from the matching values of the three trees:
//!
//! 1. **Original** - the baseline the installation started from
//! 2. **Target** - the baseline being upgraded to
//! 3. **Installed** - the working copy, possibly customized
//!
//! Entity sections (as configured in [`MergeSettings`]) go through the
//! entity-set merger, everything else through the tree merger. Changed
//! sections are collected into a [`Patch`].
//!
//! # Examples
//!
//! ```rust
//! use manifest_merger::{
//!     BufferedConsole, ConfigMap, ManifestMerger, MergeContext, MergeOptions, MergeSettings,
//!     PatchEntry,
//! };
//! use serde_json::json;
//!
//! let original: ConfigMap = serde_json::from_value(json!({"require": {"php": "^8.1"}}))?;
//! let target: ConfigMap = serde_json::from_value(json!({"require": {"php": "^8.2"}}))?;
//! let installed: ConfigMap = serde_json::from_value(json!({"require": {"php": "^8.1"}}))?;
//!
//! let merger = ManifestMerger::new(MergeSettings::default());
//! let mut console = BufferedConsole::new();
//! let mut ctx = MergeContext::new(&mut console, MergeOptions::default());
//!
//! let report = merger.merge(&original, &target, &installed, &|_: &str| false, &mut ctx)?;
//!
//! assert!(report.has_changes());
//! assert!(matches!(report.patch.get("require"), Some(PatchEntry::Set(_))));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use tracing::{debug, info};

use crate::{
    console::Verbosity,
    entities::{merge_entities, ConstraintParser, EntityCollection, LiteralConstraints},
    errors::EngineResult,
    patch::{MergeReport, MergeResult, Patch},
    policy::MergeContext,
    settings::{MergeSettings, SectionKind},
    tree::merge_tree,
    value::{ConfigMap, ConfigValue},
};

#[cfg(test)]
#[path = "merger_tests.rs"]
mod tests;

/// Manifest merging engine.
///
/// Stateless apart from its settings: every call takes its inputs and a
/// [`MergeContext`] and returns a fresh report, so merging the same inputs
/// with the same decisions always yields the same patch.
#[derive(Debug, Clone, Default)]
pub struct ManifestMerger<P = LiteralConstraints> {
    settings: MergeSettings,
    parser: P,
}

impl ManifestMerger<LiteralConstraints> {
    /// Creates a merger comparing constraints textually.
    pub fn new(settings: MergeSettings) -> Self {
        Self {
            settings,
            parser: LiteralConstraints,
        }
    }
}

impl<P: ConstraintParser> ManifestMerger<P> {
    /// Creates a merger with a host-supplied constraint parser.
    pub fn with_parser(settings: MergeSettings, parser: P) -> Self {
        Self { settings, parser }
    }

    pub fn settings(&self) -> &MergeSettings {
        &self.settings
    }

    /// Merges every section of three manifests.
    ///
    /// Sections are visited in a fixed order: the original's sections first,
    /// then those only the target has. Sections only the installation has,
    /// and ignored sections, are never touched.
    ///
    /// # Arguments
    ///
    /// * `original` - Baseline the installation was created from
    /// * `target` - Baseline being upgraded to
    /// * `user` - Installed, possibly customized, manifest
    /// * `exclude` - Entity names the entity merger must skip
    /// * `ctx` - Console, conflict options and conflict log
    ///
    /// # Errors
    ///
    /// Returns `MergeError` if an entity section is malformed, or if the
    /// conflict policy fails (for example interactive mode without a terminal).
    /// The merge stops at the first error.
    pub fn merge(
        &self,
        original: &ConfigMap,
        target: &ConfigMap,
        user: &ConfigMap,
        exclude: &dyn Fn(&str) -> bool,
        ctx: &mut MergeContext<'_>,
    ) -> EngineResult<MergeReport> {
        let mut patch = Patch::new();

        let sections = original
            .keys()
            .chain(target.keys().filter(|key| !original.contains_key(key)))
            .filter(|section| !self.settings.is_ignored(section));

        for section in sections {
            let result = self.merge_section(
                section,
                original.get(section),
                target.get(section),
                user.get(section),
                exclude,
                ctx,
            )?;
            if result.changed {
                ctx.log(
                    &format!("Updating {}", section),
                    Verbosity::Verbose,
                    None,
                );
            }
            patch.record(section, result);
        }

        info!(
            changed_sections = patch.len(),
            conflicts = ctx.conflicts().len(),
            "Manifest merge complete"
        );
        Ok(MergeReport {
            patch,
            conflicts: ctx.take_conflicts(),
        })
    }

    /// Merges one top-level section according to its configured kind.
    ///
    /// # Errors
    ///
    /// See [`ManifestMerger::merge`].
    pub fn merge_section(
        &self,
        section: &str,
        original: Option<&ConfigValue>,
        target: Option<&ConfigValue>,
        user: Option<&ConfigValue>,
        exclude: &dyn Fn(&str) -> bool,
        ctx: &mut MergeContext<'_>,
    ) -> EngineResult<MergeResult> {
        let kind = self.settings.section_kind(section);
        debug!(section, ?kind, "Merging section");

        match kind {
            SectionKind::Tree => merge_tree(section, original, target, user, ctx),
            SectionKind::Entities { ordered } => {
                let original = EntityCollection::from_section(section, original, &self.parser)?;
                let target = EntityCollection::from_section(section, target, &self.parser)?;
                let installed = EntityCollection::from_section(section, user, &self.parser)?;
                merge_entities(
                    section, &original, &target, &installed, exclude, ordered, ctx,
                )
            }
        }
    }
}
