//! Persistence collaborators
//!
//! Snapshots are raw sensor readings as uploaded; records are stored
//! prediction results. All calls block and run on the blocking pool.

pub mod jsonl;
pub mod memory;

use airhealth_core::RawRecord;

use crate::models::{PredictionRecord, StoredPrediction};

pub use jsonl::JsonlStore;
pub use memory::MemoryStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Latest raw sensor reading
pub trait SnapshotSource: Send + Sync {
    /// `None` when nothing was ever uploaded
    fn latest(&self) -> Result<Option<RawRecord>, StoreError>;
}

pub trait SnapshotSink: Send + Sync {
    /// Store a reading, returning its document id
    fn push(&self, record: &RawRecord) -> Result<String, StoreError>;
}

pub trait RecordSink: Send + Sync {
    /// Persist a prediction record, returning its document id
    fn write(&self, record: &PredictionRecord) -> Result<String, StoreError>;

    fn fetch(&self, id: &str) -> Result<Option<StoredPrediction>, StoreError>;
}
