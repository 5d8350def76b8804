//! In-process store, lost on restart

use chrono::Utc;
use parking_lot::RwLock;
use uuid::Uuid;

use airhealth_core::RawRecord;

use crate::models::{PredictionRecord, StoredPrediction, StoredSnapshot};

use super::{RecordSink, SnapshotSink, SnapshotSource, StoreError};

#[derive(Default)]
pub struct MemoryStore {
    snapshots: RwLock<Vec<StoredSnapshot>>,
    records: RwLock<Vec<StoredPrediction>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_count(&self) -> usize {
        self.records.read().len()
    }
}

impl SnapshotSource for MemoryStore {
    fn latest(&self) -> Result<Option<RawRecord>, StoreError> {
        Ok(self.snapshots.read().last().map(|s| s.data.clone()))
    }
}

impl SnapshotSink for MemoryStore {
    fn push(&self, record: &RawRecord) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        self.snapshots.write().push(StoredSnapshot {
            id: id.clone(),
            created_at: Utc::now(),
            data: record.clone(),
        });
        Ok(id)
    }
}

impl RecordSink for MemoryStore {
    fn write(&self, record: &PredictionRecord) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        self.records.write().push(StoredPrediction {
            id: id.clone(),
            created_at: Utc::now(),
            record: record.clone(),
        });
        Ok(id)
    }

    fn fetch(&self, id: &str) -> Result<Option<StoredPrediction>, StoreError> {
        Ok(self.records.read().iter().find(|r| r.id == id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        assert!(store.latest().unwrap().is_none());

        let snapshot = json!({"aqi": 152}).as_object().cloned().unwrap();
        store.push(&snapshot).unwrap();
        assert_eq!(store.latest().unwrap(), Some(snapshot));

        let id = store
            .write(&PredictionRecord {
                features: Default::default(),
                predictions: vec![],
                layout_hash: 7,
            })
            .unwrap();
        assert_eq!(store.record_count(), 1);
        assert_eq!(store.fetch(&id).unwrap().unwrap().record.layout_hash, 7);
    }
}
