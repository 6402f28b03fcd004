//! Timestamp-versioned JSON snapshot files.
//!
//! Each stage writes its full output as one file named
//! `{kind}-{version}.json` in the data directory. Versions are UTC
//! timestamps formatted so that lexical order is chronological order.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{PersistenceError, PersistenceResult};

/// Version string format.
pub const VERSION_FORMAT: &str = "%Y%m%dT%H%M%S";

/// What a snapshot holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnapshotKind {
    /// Crawl output: `RawRecord`s
    Raw,
    /// Enrichment output: `EnrichedRecord`s
    Enriched,
    /// Records that exhausted enrichment
    FailedEnriched,
    /// Records the seed stage could not store
    FailedSeed,
}

impl SnapshotKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            SnapshotKind::Raw => "raw",
            SnapshotKind::Enriched => "enriched",
            SnapshotKind::FailedEnriched => "failed-enriched",
            SnapshotKind::FailedSeed => "failed-seed",
        }
    }

    pub fn file_name(&self, version: &str) -> String {
        format!("{}-{}.json", self.prefix(), version)
    }

    /// Version part of `file_name` if it belongs to this kind.
    pub fn parse_version<'a>(&self, file_name: &'a str) -> Option<&'a str> {
        file_name
            .strip_prefix(self.prefix())?
            .strip_prefix('-')?
            .strip_suffix(".json")
            .filter(|v| !v.is_empty())
    }
}

impl fmt::Display for SnapshotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Version string for `at`.
pub fn version_at(at: DateTime<Utc>) -> String {
    at.format(VERSION_FORMAT).to_string()
}

/// Version string for now.
pub fn new_version() -> String {
    version_at(Utc::now())
}

/// Greatest file name of `kind` among `names`.
pub fn latest_name<'a, I>(kind: SnapshotKind, names: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    names
        .into_iter()
        .filter(|name| kind.parse_version(name).is_some())
        .max()
}

/// Reads and writes snapshots under one directory.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, kind: SnapshotKind, version: &str) -> PathBuf {
        self.dir.join(kind.file_name(version))
    }

    /// Write `items` as a pretty-printed JSON array.
    ///
    /// Writes to a temporary file and renames it into place.
    pub async fn write<T: Serialize>(
        &self,
        kind: SnapshotKind,
        version: &str,
        items: &[T],
    ) -> PersistenceResult<PathBuf> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| PersistenceError::Io {
                path: self.dir.clone(),
                source,
            })?;

        let path = self.path_for(kind, version);
        let body = serde_json::to_vec_pretty(items).map_err(|source| PersistenceError::Json {
            path: path.clone(),
            source,
        })?;

        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &body)
            .await
            .map_err(|source| PersistenceError::Io {
                path: tmp.clone(),
                source,
            })?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|source| PersistenceError::Io {
                path: path.clone(),
                source,
            })?;

        info!(path = %path.display(), count = items.len(), "Snapshot written");
        Ok(path)
    }

    /// Path of the newest snapshot of `kind`, if any.
    ///
    /// A missing data directory counts as no snapshots.
    pub async fn latest(&self, kind: SnapshotKind) -> PersistenceResult<Option<PathBuf>> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(PersistenceError::Io {
                    path: self.dir.clone(),
                    source,
                })
            }
        };

        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|source| PersistenceError::Io {
                path: self.dir.clone(),
                source,
            })?
        {
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }

        let latest = latest_name(kind, names.iter().map(String::as_str));
        debug!(
            kind = %kind,
            latest = ?latest,
            candidates = names.len(),
            "Resolved latest snapshot"
        );
        Ok(latest.map(|name| self.dir.join(name)))
    }

    /// Read a snapshot file.
    pub async fn read<T: DeserializeOwned>(&self, path: &Path) -> PersistenceResult<Vec<T>> {
        let body = tokio::fs::read(path)
            .await
            .map_err(|source| PersistenceError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        serde_json::from_slice(&body).map_err(|source| PersistenceError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read the newest snapshot of `kind`, returning its version and items.
    pub async fn read_latest<T: DeserializeOwned>(
        &self,
        kind: SnapshotKind,
    ) -> PersistenceResult<(String, Vec<T>)> {
        let path = self
            .latest(kind)
            .await?
            .ok_or_else(|| PersistenceError::NotFound {
                kind: kind.to_string(),
                dir: self.dir.clone(),
            })?;

        let version = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| kind.parse_version(n))
            .unwrap_or_default()
            .to_string();

        let items = self.read(&path).await?;
        info!(path = %path.display(), count = items.len(), "Snapshot loaded");
        Ok((version, items))
    }
}
