//! Command modules for the manifest-merger CLI.
//!
//! - `merge_cmd`: three-way merge of manifest files

pub mod merge_cmd;
