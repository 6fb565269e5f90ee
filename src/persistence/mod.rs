//! Flat-file persistence for engine snapshots.
//!
//! Three comma-delimited text files (requesters, resources, discharge
//! history), one record per line. See [`codec`] for the exact line
//! formats. File locations come from a [`StoreConfig`] supplied at
//! construction.
//!
//! Loading never runs a matching pass: the restored engine holds every
//! non-discharged requester as waiting and every resource as free, and
//! matching resumes on its next mutating call.

pub mod codec;
mod error;
mod store;

pub use error::PersistenceError;
pub use store::{FileStore, StoreConfig};
