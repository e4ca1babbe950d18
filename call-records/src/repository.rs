use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

use crate::error::CallRecordResult;
use crate::models::CallRecord;

/// Call-record store with per-record compare-and-swap writes
#[async_trait]
pub trait CallRecordRepository: Send + Sync {
    async fn find(&self, call_id: &str) -> CallRecordResult<Option<CallRecord>>;

    /// Insert unless a record with the same id exists; `false` when it did
    async fn insert_if_absent(&self, record: CallRecord) -> CallRecordResult<bool>;

    /// Store `record` only if the stored revision still equals `expected`.
    ///
    /// The store bumps the revision on success. Returns `false` when another
    /// writer got there first.
    async fn replace_if_revision(&self, record: CallRecord, expected: u64) -> CallRecordResult<bool>;

    /// Toggle the operator flag; `None` for an unknown id
    async fn set_flagged(&self, call_id: &str, flagged: bool) -> CallRecordResult<Option<CallRecord>>;

    async fn count(&self) -> CallRecordResult<usize>;
}

/// In-memory call-record store
pub struct InMemoryCallRecordRepository {
    records: Arc<DashMap<String, CallRecord>>,
}

impl InMemoryCallRecordRepository {
    pub fn new() -> Self {
        Self {
            records: Arc::new(DashMap::new()),
        }
    }
}

impl Default for InMemoryCallRecordRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CallRecordRepository for InMemoryCallRecordRepository {
    async fn find(&self, call_id: &str) -> CallRecordResult<Option<CallRecord>> {
        Ok(self.records.get(call_id).map(|record| record.clone()))
    }

    async fn insert_if_absent(&self, mut record: CallRecord) -> CallRecordResult<bool> {
        match self.records.entry(record.call_id.clone()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                record.revision = 1;
                slot.insert(record);
                Ok(true)
            }
        }
    }

    async fn replace_if_revision(&self, mut record: CallRecord, expected: u64) -> CallRecordResult<bool> {
        let Some(mut stored) = self.records.get_mut(&record.call_id) else {
            return Ok(false);
        };
        if stored.revision != expected {
            return Ok(false);
        }
        record.revision = expected.saturating_add(1);
        *stored = record;
        Ok(true)
    }

    async fn set_flagged(&self, call_id: &str, flagged: bool) -> CallRecordResult<Option<CallRecord>> {
        Ok(self.records.get_mut(call_id).map(|mut stored| {
            stored.flagged = flagged;
            stored.revision = stored.revision.saturating_add(1);
            stored.updated_at = Utc::now();
            stored.clone()
        }))
    }

    async fn count(&self) -> CallRecordResult<usize> {
        Ok(self.records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CallSource, Outcome};
    use serde_json::Map;

    fn record(call_id: &str) -> CallRecord {
        let now = Utc::now();
        CallRecord {
            call_id: call_id.to_string(),
            phone_from: None,
            phone_to: None,
            started_at: now,
            ended_at: None,
            duration_seconds: 0,
            intent: None,
            outcome: Outcome::Unknown,
            provider_npi: None,
            provider_name: None,
            patient_name: None,
            patient_dob: None,
            transcript: Vec::new(),
            recording_url: None,
            tags: Vec::new(),
            flagged: false,
            transferred: false,
            transfer_reason: None,
            source: CallSource::Bland,
            auth_success: None,
            extracted_data: Map::new(),
            complete: false,
            revision: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_once() {
        let repo = InMemoryCallRecordRepository::new();
        assert!(repo.insert_if_absent(record("a")).await.unwrap());
        assert!(!repo.insert_if_absent(record("a")).await.unwrap());
        assert_eq!(repo.count().await.unwrap(), 1);
        assert_eq!(repo.find("a").await.unwrap().unwrap().revision, 1);
    }

    #[tokio::test]
    async fn test_stale_revision_is_refused() {
        let repo = InMemoryCallRecordRepository::new();
        repo.insert_if_absent(record("a")).await.unwrap();

        let mut first = repo.find("a").await.unwrap().unwrap();
        let mut second = first.clone();
        first.duration_seconds = 10;
        second.duration_seconds = 20;

        assert!(repo.replace_if_revision(first, 1).await.unwrap());
        assert!(!repo.replace_if_revision(second, 1).await.unwrap());

        let stored = repo.find("a").await.unwrap().unwrap();
        assert_eq!(stored.duration_seconds, 10);
        assert_eq!(stored.revision, 2);
    }

    #[tokio::test]
    async fn test_flag_toggle() {
        let repo = InMemoryCallRecordRepository::new();
        repo.insert_if_absent(record("a")).await.unwrap();
        let flagged = repo.set_flagged("a", true).await.unwrap().unwrap();
        assert!(flagged.flagged);
        assert!(repo.set_flagged("missing", true).await.unwrap().is_none());
    }
}
