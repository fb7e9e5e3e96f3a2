use chrono::{DateTime, Utc};
use cookbook::GenericRecord;
use serde::Serialize;
use uuid::Uuid;

/// One poll's worth of recently added recipes, handed to the source callback.
#[derive(Clone, Debug, Serialize)]
pub struct FeedBatch {
    /// UUIDv7 identifier (time-ordered)
    pub batch_id: String,
    /// Connector that produced the batch
    pub source: String,
    pub polled_at: DateTime<Utc>,
    pub records: Vec<GenericRecord>,
}

impl FeedBatch {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Wrap polled recipe records into a feed batch.
pub fn records_to_batch(source: &str, records: Vec<GenericRecord>) -> FeedBatch {
    FeedBatch {
        batch_id: Uuid::now_v7().to_string(),
        source: source.to_string(),
        polled_at: Utc::now(),
        records,
    }
}
