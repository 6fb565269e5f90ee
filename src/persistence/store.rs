//! File-backed snapshot store.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::allocation::{AllocationEngine, AllocatorConfig, Clock, Snapshot};

use super::codec;
use super::error::PersistenceError;

/// Where a [`FileStore`] keeps its three files.
///
/// # Examples
///
/// ```
/// use u_bedalloc::persistence::StoreConfig;
///
/// let config = StoreConfig::default().with_directory("/var/lib/beds");
/// assert!(config.requesters_path().ends_with("patients.txt"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StoreConfig {
    /// Directory holding all three files.
    pub directory: PathBuf,
    /// Requesters of every state.
    pub requesters_file: String,
    /// All resources.
    pub resources_file: String,
    /// Discharge history.
    pub discharged_file: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            requesters_file: "patients.txt".into(),
            resources_file: "beds.txt".into(),
            discharged_file: "discharged_patients.txt".into(),
        }
    }
}

impl StoreConfig {
    pub fn with_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.directory = dir.into();
        self
    }

    pub fn with_requesters_file(mut self, name: impl Into<String>) -> Self {
        self.requesters_file = name.into();
        self
    }

    pub fn with_resources_file(mut self, name: impl Into<String>) -> Self {
        self.resources_file = name.into();
        self
    }

    pub fn with_discharged_file(mut self, name: impl Into<String>) -> Self {
        self.discharged_file = name.into();
        self
    }

    pub fn requesters_path(&self) -> PathBuf {
        self.directory.join(&self.requesters_file)
    }

    pub fn resources_path(&self) -> PathBuf {
        self.directory.join(&self.resources_file)
    }

    pub fn discharged_path(&self) -> PathBuf {
        self.directory.join(&self.discharged_file)
    }
}

/// Saves and loads engine snapshots as three comma-delimited text files.
#[derive(Debug, Clone)]
pub struct FileStore {
    config: StoreConfig,
}

impl FileStore {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    /// A store using the default file names inside `dir`.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self::new(StoreConfig::default().with_directory(dir))
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Writes the engine's current state.
    pub fn save<C: Clock>(&self, engine: &AllocationEngine<C>) -> Result<(), PersistenceError> {
        self.save_snapshot(&engine.snapshot())
    }

    /// Writes a snapshot. Every record is encoded before any file is
    /// touched, so an unencodable field leaves the files as they were.
    pub fn save_snapshot(&self, snapshot: &Snapshot) -> Result<(), PersistenceError> {
        let requesters = encode_all(&snapshot.requesters, codec::encode_requester)?;
        let resources = encode_all(&snapshot.resources, codec::encode_resource)?;
        let discharged = encode_all(&snapshot.discharged, codec::encode_discharged)?;

        write_file(&self.config.requesters_path(), &requesters)?;
        write_file(&self.config.resources_path(), &resources)?;
        write_file(&self.config.discharged_path(), &discharged)?;

        info!(
            requesters = snapshot.requesters.len(),
            resources = snapshot.resources.len(),
            discharged = snapshot.discharged.len(),
            directory = %self.config.directory.display(),
            "snapshot saved"
        );
        Ok(())
    }

    /// Reads a snapshot. Missing files count as empty.
    pub fn load(&self) -> Result<Snapshot, PersistenceError> {
        let snapshot = Snapshot {
            requesters: read_file(&self.config.requesters_path(), codec::decode_requester)?,
            resources: read_file(&self.config.resources_path(), codec::decode_resource)?,
            discharged: read_file(&self.config.discharged_path(), codec::decode_discharged)?,
        };
        info!(
            requesters = snapshot.requesters.len(),
            resources = snapshot.resources.len(),
            discharged = snapshot.discharged.len(),
            directory = %self.config.directory.display(),
            "snapshot loaded"
        );
        Ok(snapshot)
    }

    /// Reads a snapshot and rebuilds an engine from it, without matching.
    pub fn load_engine<C: Clock>(
        &self,
        config: AllocatorConfig,
        clock: C,
    ) -> Result<AllocationEngine<C>, PersistenceError> {
        let snapshot = self.load()?;
        Ok(AllocationEngine::restore(config, clock, snapshot)?)
    }
}

fn encode_all<T>(
    records: &[T],
    encode: fn(&T) -> Result<String, PersistenceError>,
) -> Result<String, PersistenceError> {
    let mut out = String::new();
    for record in records {
        out.push_str(&encode(record)?);
        out.push('\n');
    }
    Ok(out)
}

fn write_file(path: &Path, contents: &str) -> Result<(), PersistenceError> {
    fs::write(path, contents).map_err(|source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn read_file<T>(
    path: &Path,
    decode: fn(&str) -> Result<T, String>,
) -> Result<Vec<T>, PersistenceError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "no saved data; starting empty");
            return Ok(Vec::new());
        }
        Err(source) => {
            return Err(PersistenceError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let mut records = Vec::new();
    for (i, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let record = decode(line).map_err(|reason| PersistenceError::Malformed {
            file: path.to_path_buf(),
            line: i + 1,
            reason,
        })?;
        records.push(record);
    }
    Ok(records)
}
