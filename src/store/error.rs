//! Preference store errors.

use std::path::PathBuf;

use thiserror::Error;

/// Error returned when a preference store cannot be read or written.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing file could not be read, written or created.
    #[error("failed to access preference file '{}'", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The backing file exists but is not a JSON object of strings.
    #[error("preference file '{}' is malformed", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// The preferences could not be serialized for writing.
    #[error("failed to encode preference file '{}'", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
