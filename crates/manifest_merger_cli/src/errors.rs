use std::{io, path::PathBuf};

use manifest_merger::MergeError;
use thiserror::Error;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors that can occur in the manifest-merger CLI application.
///
/// This enum represents all possible error conditions that can arise while
/// loading manifests and configuration, running the merge and writing the
/// result back.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error occurred while loading or parsing configuration.
    ///
    /// This error is returned when there are issues with the configuration file,
    /// such as invalid values or an explicitly requested file that is missing.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid command-line arguments were provided.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// Failed to load a file from the filesystem.
    ///
    /// This error wraps underlying I/O errors that occur when reading files,
    /// such as permission issues or missing files.
    #[error("Failed to load file {0:?}.")]
    LoadFile(PathBuf, #[source] io::Error),

    /// A manifest file could not be parsed, or its top level is not a map.
    #[error("Failed to parse manifest {0:?}: {1}")]
    ParseManifest(PathBuf, String),

    /// The merge engine rejected the inputs or the conflict policy failed.
    #[error("Merge failed: {0}")]
    Merge(#[from] MergeError),

    /// The patch or the updated manifest could not be rendered or written.
    #[error("Failed to write output: {0}")]
    WriteOutput(String),
}

impl Error {
    /// Process exit code reported for this error.
    ///
    /// File system failures exit with 2, everything else with 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::LoadFile(..) | Error::WriteOutput(_) => 2,
            _ => 1,
        }
    }
}
