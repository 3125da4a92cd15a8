// 📂 Dataset Loader - CSV → in-memory registry records
// Read once per session, immutable afterwards

use crate::error::{DashboardError, Result};
use crate::registry::RegistryRecord;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Loaded registry table plus where and when it came from
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<RegistryRecord>,

    /// Path the rows were read from (`None` for in-memory datasets)
    pub source: Option<PathBuf>,

    /// When the file was read
    pub loaded_at: DateTime<Utc>,

    /// SHA-256 of the raw file bytes, hex encoded
    pub fingerprint: String,
}

impl Dataset {
    /// Build a dataset from rows already in memory
    pub fn from_records(records: Vec<RegistryRecord>) -> Self {
        Dataset {
            records,
            source: None,
            loaded_at: Utc::now(),
            fingerprint: String::new(),
        }
    }

    pub fn records(&self) -> &[RegistryRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First 12 hex chars of the fingerprint, for headers
    pub fn short_fingerprint(&self) -> &str {
        short(&self.fingerprint)
    }

    pub fn info(&self) -> DatasetInfo {
        DatasetInfo {
            source: self.source.as_ref().map(|p| p.display().to_string()),
            loaded_at: self.loaded_at,
            fingerprint: self.fingerprint.clone(),
        }
    }
}

/// Provenance shown alongside the charts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetInfo {
    pub source: Option<String>,
    pub loaded_at: DateTime<Utc>,
    pub fingerprint: String,
}

impl DatasetInfo {
    pub fn short_fingerprint(&self) -> &str {
        short(&self.fingerprint)
    }
}

fn short(fingerprint: &str) -> &str {
    &fingerprint[..fingerprint.len().min(12)]
}

/// Read the registry CSV at `path`.
///
/// Fails with `FileNotFound` when the file does not exist and `Parse` when
/// the CSV itself is malformed. Column presence is not checked: a missing
/// column simply yields `None` for every row.
pub fn load_dataset(path: &Path) -> Result<Dataset> {
    let bytes = fs::read(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => DashboardError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => DashboardError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let fingerprint = compute_fingerprint(&bytes);
    let records = parse_records(&bytes, path)?;

    info!(
        path = %path.display(),
        rows = records.len(),
        "loaded registry dataset"
    );

    Ok(Dataset {
        records,
        source: Some(path.to_path_buf()),
        loaded_at: Utc::now(),
        fingerprint,
    })
}

fn parse_records(bytes: &[u8], path: &Path) -> Result<Vec<RegistryRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let mut records = Vec::new();

    for result in rdr.deserialize() {
        let record: RegistryRecord = result.map_err(|source| DashboardError::Parse {
            path: path.to_path_buf(),
            line: source.position().map(|p| p.line()).unwrap_or(0),
            source,
        })?;
        records.push(record);
    }

    debug!(rows = records.len(), "parsed registry rows");
    Ok(records)
}

fn compute_fingerprint(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
