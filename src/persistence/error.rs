//! Persistence errors.

use std::path::PathBuf;

use thiserror::Error;

use crate::allocation::AllocationError;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("i/o error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A record that does not follow the line format.
    #[error("{}:{line}: {reason}", .file.display())]
    Malformed {
        file: PathBuf,
        /// 1-based line number.
        line: usize,
        reason: String,
    },

    /// A text field holding a `,` or line break cannot round-trip.
    #[error("cannot encode {field} {value:?}: contains a separator")]
    UnencodableField { field: &'static str, value: String },

    /// The loaded records would break engine invariants.
    #[error("snapshot rejected: {0}")]
    Restore(#[from] AllocationError),
}
