// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSON file-based backend
//!
//! One pretty-printed file per record at `<base>/<kind>/<id>.json`. Writes go
//! to a temporary sibling first and are renamed into place.

use crate::{sort_records, StorageBackend, StorageError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use sw_core::{Record, RecordKey, RecordKind};
use tokio::fs;

const KINDS: [RecordKind; 2] = [RecordKind::Color, RecordKind::Palette];

#[derive(Clone)]
pub struct JsonFileBackend {
    base_path: PathBuf,
}

impl JsonFileBackend {
    /// Open a backend rooted at the given directory
    pub fn open(base_path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let base_path = base_path.into();
        std::fs::create_dir_all(&base_path)?;
        Ok(Self { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn kind_dir(&self, kind: RecordKind) -> PathBuf {
        self.base_path.join(kind.to_string())
    }

    fn path_for(&self, key: &RecordKey) -> Result<PathBuf, StorageError> {
        let valid = !key.id.is_empty()
            && !key.id.starts_with('.')
            && !key.id.contains(['/', '\\']);
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.kind_dir(key.kind).join(format!("{}.json", key.id)))
    }
}

#[async_trait]
impl StorageBackend for JsonFileBackend {
    async fn get(&self, key: &RecordKey) -> Result<Option<Record>, StorageError> {
        let path = self.path_for(key)?;
        let json = match fs::read_to_string(&path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let record: Record = serde_json::from_str(&json)?;
        if &record.key() != key {
            return Err(StorageError::Mismatch { key: key.clone() });
        }
        Ok(Some(record))
    }

    async fn put(&self, record: &Record) -> Result<(), StorageError> {
        let path = self.path_for(&record.key())?;
        fs::create_dir_all(self.kind_dir(record.kind())).await?;
        let json = serde_json::to_string_pretty(record)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).await?;
        fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn delete(&self, key: &RecordKey) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn list_all(&self) -> Result<Vec<Record>, StorageError> {
        let mut records = Vec::new();
        for kind in KINDS {
            let dir = self.kind_dir(kind);
            let mut entries = match fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if path.extension().map(|e| e == "json").unwrap_or(false) {
                    let json = fs::read_to_string(&path).await?;
                    records.push(serde_json::from_str::<Record>(&json)?);
                }
            }
        }
        sort_records(&mut records);
        Ok(records)
    }

    async fn clear(&self) -> Result<(), StorageError> {
        for kind in KINDS {
            match fs::remove_dir_all(self.kind_dir(kind)).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "json_tests.rs"]
mod tests;
