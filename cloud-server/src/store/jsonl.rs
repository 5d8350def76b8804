//! Append-only JSONL store
//!
//! `sensor_data.jsonl` holds snapshots, `predictions.jsonl` holds
//! prediction records. One JSON document per line, newest last.
//!
//! An active file that reaches the size limit is renamed to
//! `<stem>-YYYY-MM-DD-HHMMSS.ffffff.jsonl` and a fresh one is started.
//! The latest snapshot is read backwards from the end of the newest file;
//! prediction records are located through an id → offset index built at open.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use airhealth_core::RawRecord;

use crate::models::{PredictionRecord, StoredPrediction, StoredSnapshot};

use super::{RecordSink, SnapshotSink, SnapshotSource, StoreError};

const SNAPSHOT_STEM: &str = "sensor_data";
const PREDICTION_STEM: &str = "predictions";

pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024; // 10 MB

const READ_CHUNK: u64 = 8 * 1024;

/// Where a prediction record starts
#[derive(Debug, Clone)]
struct RecordLocation {
    path: PathBuf,
    offset: u64,
}

/// Just enough of a stored record to index it
#[derive(Deserialize)]
struct RecordId {
    id: String,
}

pub struct JsonlStore {
    base_dir: PathBuf,
    max_file_size: u64,
    // serializes appends, rotation and indexed reads
    write_lock: Mutex<()>,
    index: RwLock<HashMap<String, RecordLocation>>,
}

impl JsonlStore {
    pub fn open(base_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        Self::open_with_limit(base_dir, MAX_FILE_SIZE)
    }

    pub fn open_with_limit(base_dir: impl Into<PathBuf>, max_file_size: u64) -> Result<Self, StoreError> {
        let base_dir = base_dir.into();
        fs::create_dir_all(&base_dir)?;

        let store = Self {
            base_dir,
            max_file_size: max_file_size.max(1),
            write_lock: Mutex::new(()),
            index: RwLock::new(HashMap::new()),
        };
        let indexed = store.build_index()?;

        tracing::info!(
            "JSONL store at {} ({} prediction records indexed)",
            store.base_dir.display(),
            indexed
        );

        Ok(store)
    }

    fn active_path(&self, stem: &str) -> PathBuf {
        self.base_dir.join(format!("{}.jsonl", stem))
    }

    /// Rotated files of `stem`, oldest first (timestamped names sort in order)
    fn rotated_paths(&self, stem: &str) -> Result<Vec<PathBuf>, StoreError> {
        let prefix = format!("{}-", stem);
        let mut paths: Vec<PathBuf> = fs::read_dir(&self.base_dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .map_or(false, |n| n.starts_with(&prefix) && n.ends_with(".jsonl"))
            })
            .collect();

        paths.sort();
        Ok(paths)
    }

    // ========================================================================
    // WRITE PATH
    // ========================================================================

    /// Append one document, returning the file and offset it landed at.
    /// Caller holds `write_lock`.
    fn append<T: Serialize>(&self, stem: &str, value: &T) -> Result<RecordLocation, StoreError> {
        let mut line = serde_json::to_vec(value)?;
        line.push(b'\n');

        self.rotate_if_full(stem)?;

        let path = self.active_path(stem);
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)?;

        let mut offset = file.metadata()?.len();
        if offset > 0 && !ends_with_newline(&mut file, offset)? {
            tracing::warn!("Terminating torn last line in {}", path.display());
            file.write_all(b"\n")?;
            offset += 1;
        }

        file.write_all(&line)?;
        Ok(RecordLocation { path, offset })
    }

    /// Move a full active file aside. Caller holds `write_lock`.
    fn rotate_if_full(&self, stem: &str) -> Result<(), StoreError> {
        let active = self.active_path(stem);
        let size = match fs::metadata(&active) {
            Ok(meta) => meta.len(),
            Err(_) => return Ok(()),
        };
        if size < self.max_file_size {
            return Ok(());
        }

        let rotated = self.base_dir.join(format!(
            "{}-{}.jsonl",
            stem,
            Utc::now().format("%Y-%m-%d-%H%M%S%.6f")
        ));
        fs::rename(&active, &rotated)?;
        tracing::info!("Rotated {} ({} bytes) to {}", active.display(), size, rotated.display());

        if stem == PREDICTION_STEM {
            for location in self.index.write().values_mut() {
                if location.path == active {
                    location.path = rotated.clone();
                }
            }
        }

        Ok(())
    }

    // ========================================================================
    // READ PATH
    // ========================================================================

    /// Scan prediction files once, recording where each id starts
    fn build_index(&self) -> Result<usize, StoreError> {
        let mut paths = self.rotated_paths(PREDICTION_STEM)?;
        paths.push(self.active_path(PREDICTION_STEM));

        let mut index = self.index.write();
        for path in paths {
            if !path.exists() {
                continue;
            }

            let mut reader = BufReader::new(File::open(&path)?);
            let mut offset = 0u64;
            let mut line = Vec::new();
            loop {
                line.clear();
                let read = reader.read_until(b'\n', &mut line)?;
                if read == 0 {
                    break;
                }
                if let Ok(record) = serde_json::from_slice::<RecordId>(&line) {
                    index.insert(
                        record.id,
                        RecordLocation {
                            path: path.clone(),
                            offset,
                        },
                    );
                }
                offset += read as u64;
            }
        }

        Ok(index.len())
    }

    fn read_at(&self, location: &RecordLocation) -> Result<Option<StoredPrediction>, StoreError> {
        let mut file = File::open(&location.path)?;
        file.seek(SeekFrom::Start(location.offset))?;

        let mut line = Vec::new();
        BufReader::new(file).read_until(b'\n', &mut line)?;
        Ok(parse_line(&line, &location.path))
    }
}

impl SnapshotSource for JsonlStore {
    fn latest(&self) -> Result<Option<RawRecord>, StoreError> {
        let mut paths = self.rotated_paths(SNAPSHOT_STEM)?;
        paths.push(self.active_path(SNAPSHOT_STEM));

        // newest file first; fall back to older ones when it holds nothing usable
        for path in paths.iter().rev() {
            if let Some(snapshot) = read_last::<StoredSnapshot>(path)? {
                return Ok(Some(snapshot.data));
            }
        }
        Ok(None)
    }
}

impl SnapshotSink for JsonlStore {
    fn push(&self, record: &RawRecord) -> Result<String, StoreError> {
        let snapshot = StoredSnapshot {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            data: record.clone(),
        };

        let _guard = self.write_lock.lock();
        self.append(SNAPSHOT_STEM, &snapshot)?;
        Ok(snapshot.id)
    }
}

impl RecordSink for JsonlStore {
    fn write(&self, record: &PredictionRecord) -> Result<String, StoreError> {
        let stored = StoredPrediction {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            record: record.clone(),
        };

        let _guard = self.write_lock.lock();
        let location = self.append(PREDICTION_STEM, &stored)?;
        self.index.write().insert(stored.id.clone(), location);

        tracing::debug!("Stored prediction record {}", stored.id);
        Ok(stored.id)
    }

    fn fetch(&self, id: &str) -> Result<Option<StoredPrediction>, StoreError> {
        // rotation renames files, so read under the write lock
        let _guard = self.write_lock.lock();
        let location = match self.index.read().get(id).cloned() {
            Some(location) => location,
            None => return Ok(None),
        };

        Ok(self.read_at(&location)?.filter(|record| record.id == id))
    }
}

// ============================================================================
// LINE HELPERS
// ============================================================================

fn ends_with_newline(file: &mut File, len: u64) -> Result<bool, StoreError> {
    let mut last = [0u8; 1];
    file.seek(SeekFrom::Start(len - 1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

/// Parse one line; blank lines are skipped quietly, corrupt ones with a warning
fn parse_line<T: DeserializeOwned>(line: &[u8], path: &Path) -> Option<T> {
    let trimmed = trim_whitespace(line);
    if trimmed.is_empty() {
        return None;
    }

    match serde_json::from_slice(trimmed) {
        Ok(item) => Some(item),
        Err(e) => {
            tracing::warn!("Skipping corrupt line in {}: {}", path.display(), e);
            None
        }
    }
}

fn trim_whitespace(line: &[u8]) -> &[u8] {
    let start = line.iter().position(|b| !b.is_ascii_whitespace()).unwrap_or(line.len());
    let end = line.iter().rposition(|b| !b.is_ascii_whitespace()).map_or(start, |i| i + 1);
    &line[start..end]
}

/// Last parseable document of a file, reading backwards in chunks
fn read_last<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let mut pos = file.metadata()?.len();
    // bytes not yet split into lines, in file order
    let mut tail: Vec<u8> = Vec::new();

    while pos > 0 {
        let read = READ_CHUNK.min(pos);
        pos -= read;

        let mut chunk = vec![0u8; read as usize];
        file.seek(SeekFrom::Start(pos))?;
        file.read_exact(&mut chunk)?;
        chunk.extend_from_slice(&tail);
        tail = chunk;

        // everything after a newline is a complete line
        while let Some(newline) = tail.iter().rposition(|&b| b == b'\n') {
            let line = tail.split_off(newline + 1);
            tail.truncate(newline);
            if let Some(item) = parse_line(&line, path) {
                return Ok(Some(item));
            }
        }
    }

    // first line of the file
    Ok(parse_line(&tail, path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn raw(value: serde_json::Value) -> RawRecord {
        value.as_object().cloned().unwrap()
    }

    fn record(layout_hash: u32) -> PredictionRecord {
        PredictionRecord {
            features: raw(json!({"temperature_c": 35.0, "co2_ppm": 1200.0})),
            predictions: vec![],
            layout_hash,
        }
    }

    fn append_raw(path: &Path, bytes: &[u8]) {
        let mut file = OpenOptions::new().create(true).append(true).open(path).unwrap();
        file.write_all(bytes).unwrap();
    }

    #[test]
    fn test_latest_snapshot() {
        let dir = tempdir().unwrap();
        let store = JsonlStore::open(dir.path()).unwrap();

        assert!(store.latest().unwrap().is_none());

        store.push(&raw(json!({"temperature": 20}))).unwrap();
        store.push(&raw(json!({"temperature": 35, "pm25": 80}))).unwrap();

        let latest = store.latest().unwrap().unwrap();
        assert_eq!(latest["temperature"], 35);
        assert_eq!(latest["pm25"], 80);
    }

    #[test]
    fn test_corrupt_tail_line_skipped() {
        let dir = tempdir().unwrap();
        let store = JsonlStore::open(dir.path()).unwrap();
        store.push(&raw(json!({"co2_ppm": 900}))).unwrap();

        append_raw(&dir.path().join("sensor_data.jsonl"), b"{not json\n");

        let latest = store.latest().unwrap().unwrap();
        assert_eq!(latest["co2_ppm"], 900);
    }

    #[test]
    fn test_torn_write_does_not_swallow_next_snapshot() {
        let dir = tempdir().unwrap();
        let store = JsonlStore::open(dir.path()).unwrap();
        let path = dir.path().join("sensor_data.jsonl");

        store.push(&raw(json!({"pm25": 10}))).unwrap();
        append_raw(&path, br#"{"id":"x","crea"#);
        store.push(&raw(json!({"pm25": 80}))).unwrap();

        assert_eq!(store.latest().unwrap().unwrap()["pm25"], 80);

        // torn fragment stays isolated on its own line
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 3);
        assert_eq!(content.lines().nth(1), Some(r#"{"id":"x","crea"#));
    }

    #[test]
    fn test_latest_reads_across_chunks() {
        let dir = tempdir().unwrap();
        let store = JsonlStore::open(dir.path()).unwrap();

        let padding = "x".repeat(READ_CHUNK as usize * 2);
        store.push(&raw(json!({"pm25": 1, "note": padding}))).unwrap();
        store.push(&raw(json!({"pm25": 2, "note": padding}))).unwrap();

        let latest = store.latest().unwrap().unwrap();
        assert_eq!(latest["pm25"], 2);
    }

    #[test]
    fn test_prediction_record_round_trip() {
        let dir = tempdir().unwrap();
        let store = JsonlStore::open(dir.path()).unwrap();

        let id = store.write(&record(42)).unwrap();

        let stored = store.fetch(&id).unwrap().unwrap();
        assert_eq!(stored.record.layout_hash, 42);
        let keys: Vec<&String> = stored.record.features.keys().collect();
        assert_eq!(keys, vec!["temperature_c", "co2_ppm"]);

        assert!(store.fetch("missing").unwrap().is_none());
    }

    #[test]
    fn test_rotation_keeps_records_reachable() {
        let dir = tempdir().unwrap();
        // every file is full after one line
        let store = JsonlStore::open_with_limit(dir.path(), 1).unwrap();

        let first = store.write(&record(1)).unwrap();
        let second = store.write(&record(2)).unwrap();
        store.push(&raw(json!({"pm25": 10}))).unwrap();
        store.push(&raw(json!({"pm25": 80}))).unwrap();

        assert_eq!(store.rotated_paths(PREDICTION_STEM).unwrap().len(), 1);
        assert_eq!(store.rotated_paths(SNAPSHOT_STEM).unwrap().len(), 1);

        assert_eq!(store.fetch(&first).unwrap().unwrap().record.layout_hash, 1);
        assert_eq!(store.fetch(&second).unwrap().unwrap().record.layout_hash, 2);
        assert_eq!(store.latest().unwrap().unwrap()["pm25"], 80);

        // index is rebuilt from disk
        let reopened = JsonlStore::open(dir.path()).unwrap();
        assert_eq!(reopened.fetch(&first).unwrap().unwrap().record.layout_hash, 1);
        assert_eq!(reopened.fetch(&second).unwrap().unwrap().record.layout_hash, 2);
    }

    #[test]
    fn test_latest_falls_back_to_rotated_file() {
        let dir = tempdir().unwrap();
        let store = JsonlStore::open(dir.path()).unwrap();
        store.push(&raw(json!({"pm25": 55}))).unwrap();

        fs::rename(
            dir.path().join("sensor_data.jsonl"),
            dir.path().join("sensor_data-2026-01-01-000000.000000.jsonl"),
        )
        .unwrap();

        assert_eq!(store.latest().unwrap().unwrap()["pm25"], 55);
    }
}
