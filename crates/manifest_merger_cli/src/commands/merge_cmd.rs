//! Merge command: upgrades an installed manifest from one baseline to another.
//!
//! The three manifests are read from JSON or TOML files, merged by the engine,
//! and the resulting patch is printed. With `--write` the patch is applied to
//! the installed file in place, in the format it was read in.

use std::{
    fs,
    path::{Path, PathBuf},
};

use clap::Args;
use manifest_merger::{
    ConfigMap, Console, FormatTag, ManifestMerger, MergeContext, MergeOptions, MergeReport,
    Patch, Verbosity,
};
use tracing::{debug, info, instrument};

use crate::config::AppConfig;
use crate::console::{verbosity_from_count, TerminalConsole};
use crate::errors::Error;

#[cfg(test)]
#[path = "merge_cmd_tests.rs"]
mod tests;

/// Command-line arguments for the merge command.
#[derive(Args, Debug, Clone, Default)]
pub struct MergeArgs {
    /// Manifest of the baseline the installation was created from.
    #[arg(long)]
    pub original: PathBuf,

    /// Manifest of the baseline to upgrade to.
    #[arg(long)]
    pub target: PathBuf,

    /// Installed, possibly customized, manifest.
    #[arg(long)]
    pub installed: PathBuf,

    /// Path to a TOML configuration file with a `[merge]` table.
    #[arg(long)]
    pub config: Option<String>,

    /// Apply the target's value on every conflict.
    #[arg(long)]
    pub force_overrides: bool,

    /// Ask about every conflict. Requires a terminal.
    #[arg(long)]
    pub interactive_conflicts: bool,

    /// Write the merged manifest back to the installed file.
    #[arg(long)]
    pub write: bool,

    /// Increase message verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl MergeArgs {
    fn options(&self) -> MergeOptions {
        MergeOptions {
            force_override: self.force_overrides,
            interactive: self.interactive_conflicts,
        }
    }
}

/// Serialization format of a manifest file, picked by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
    Json,
    Toml,
}

impl ManifestFormat {
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("json") => Ok(ManifestFormat::Json),
            Some("toml") => Ok(ManifestFormat::Toml),
            _ => Err(Error::InvalidArguments(format!(
                "Unsupported manifest format for {:?}, expected a .json or .toml file",
                path
            ))),
        }
    }
}

/// Reads a manifest file into a map of top-level sections.
pub fn load_manifest(path: &Path) -> Result<ConfigMap, Error> {
    let format = ManifestFormat::from_path(path)?;
    debug!(message = "Loading manifest", path = ?path, format = ?format);

    let content = fs::read_to_string(path).map_err(|e| Error::LoadFile(path.to_path_buf(), e))?;
    let parse_error = |reason: String| Error::ParseManifest(path.to_path_buf(), reason);
    match format {
        ManifestFormat::Json => {
            serde_json::from_str(&content).map_err(|e| parse_error(e.to_string()))
        }
        ManifestFormat::Toml => toml::from_str(&content).map_err(|e| parse_error(e.to_string())),
    }
}

/// Renders a manifest in the given format.
pub fn render_manifest(manifest: &ConfigMap, format: ManifestFormat) -> Result<String, Error> {
    match format {
        ManifestFormat::Json => serde_json::to_string_pretty(manifest)
            .map(|json| json + "\n")
            .map_err(|e| Error::WriteOutput(e.to_string())),
        ManifestFormat::Toml => {
            toml::to_string_pretty(manifest).map_err(|e| Error::WriteOutput(e.to_string()))
        }
    }
}

/// Renders a patch as pretty JSON, removed sections as `null`.
pub fn render_patch(patch: &Patch) -> Result<String, Error> {
    serde_json::to_string_pretty(patch).map_err(|e| Error::WriteOutput(e.to_string()))
}

/// Runs the merge against an arbitrary console.
///
/// Loads the configuration and the three manifests, merges them and, when
/// asked to and something changed, writes the patched installed manifest.
#[instrument(skip(console))]
pub fn run_merge<C: Console>(args: &MergeArgs, console: &mut C) -> Result<MergeReport, Error> {
    let config = AppConfig::resolve(args.config.as_deref())?;
    let format = ManifestFormat::from_path(&args.installed)?;

    let original = load_manifest(&args.original)?;
    let target = load_manifest(&args.target)?;
    let mut installed = load_manifest(&args.installed)?;

    let merger = ManifestMerger::new(config.merge.clone());
    let exclude = config.merge.exclusion();
    let report = {
        let mut ctx = MergeContext::new(console, args.options());
        merger.merge(&original, &target, &installed, &exclude, &mut ctx)?
    };

    if args.write && report.has_changes() {
        report.patch.apply_to(&mut installed);
        let rendered = render_manifest(&installed, format)?;
        fs::write(&args.installed, rendered).map_err(|e| {
            Error::WriteOutput(format!("Failed to write {:?}: {}", args.installed, e))
        })?;
        info!(
            message = "Installed manifest updated",
            path = ?args.installed,
            sections = report.patch.len()
        );
    }

    Ok(report)
}

/// Execute the merge command with a terminal console and print the patch.
#[instrument]
pub fn execute(args: &MergeArgs) -> Result<(), Error> {
    let mut console = TerminalConsole::new(verbosity_from_count(args.verbose));
    let report = run_merge(args, &mut console)?;

    println!("{}", render_patch(&report.patch)?);
    if !report.conflicts.is_empty() {
        console.log(
            &format!("{} conflict(s) found", report.conflicts.len()),
            Verbosity::Normal,
            Some(FormatTag::Comment),
        );
    }
    Ok(())
}
