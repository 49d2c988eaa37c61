use std::str::FromStr;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Deserialize;
use time::OffsetDateTime;
use tracing::debug;

use super::{Predicate, Record, Store, StoreError};

/// How a new record's id is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdStrategy {
    /// Counter seeded past the highest existing id; ids are never reused.
    #[default]
    Monotonic,
    /// Current length + 1. Collides with a live id once anything but the
    /// last record has been deleted.
    Sequential,
}

impl FromStr for IdStrategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monotonic" => Ok(Self::Monotonic),
            "sequential" => Ok(Self::Sequential),
            other => anyhow::bail!("unknown id strategy {other:?}"),
        }
    }
}

struct Inner<R> {
    records: Vec<R>,
    next_id: u64,
}

/// Process-local collection. Each operation holds the lock for its whole
/// body, so callers observe it as atomic.
pub struct MemoryStore<R> {
    inner: Mutex<Inner<R>>,
    ids: IdStrategy,
}

impl<R: Record> MemoryStore<R> {
    pub fn new(ids: IdStrategy) -> Self {
        Self::with_records(ids, Vec::new())
    }

    pub fn with_records(ids: IdStrategy, records: Vec<R>) -> Self {
        let next_id = records.iter().map(Record::id).max().unwrap_or(0) + 1;
        Self {
            inner: Mutex::new(Inner { records, next_id }),
            ids,
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<R> Inner<R> {
    fn position(&self, id: u64) -> Option<usize>
    where
        R: Record,
    {
        self.records.iter().position(|r| r.id() == id)
    }
}

#[async_trait]
impl<R: Record> Store<R> for MemoryStore<R> {
    async fn list(&self, filter: &R::Filter) -> Result<Vec<R>, StoreError> {
        let inner = self.inner.lock();
        Ok(inner
            .records
            .iter()
            .filter(|r| r.matches(filter))
            .cloned()
            .collect())
    }

    async fn get(&self, id: u64) -> Result<R, StoreError> {
        let inner = self.inner.lock();
        inner
            .records
            .iter()
            .find(|r| r.id() == id)
            .cloned()
            .ok_or(StoreError::NotFound(R::KIND))
    }

    async fn find(&self, predicate: Predicate<'_, R>) -> Result<Option<R>, StoreError> {
        let inner = self.inner.lock();
        Ok(inner.records.iter().find(|r| predicate(r)).cloned())
    }

    async fn create(&self, draft: R::Draft) -> Result<R, StoreError> {
        let mut inner = self.inner.lock();
        let id = match self.ids {
            IdStrategy::Monotonic => inner.next_id,
            IdStrategy::Sequential => inner.records.len() as u64 + 1,
        };
        let record = R::from_draft(id, draft, OffsetDateTime::now_utc())?;
        inner.next_id = inner.next_id.max(id + 1);
        inner.records.push(record.clone());
        debug!(kind = R::KIND, id, "record created");
        Ok(record)
    }

    async fn update(&self, id: u64, patch: R::Patch) -> Result<R, StoreError> {
        let mut inner = self.inner.lock();
        let idx = inner.position(id).ok_or(StoreError::NotFound(R::KIND))?;
        let record = &mut inner.records[idx];
        record.apply(patch);
        debug!(kind = R::KIND, id, "record updated");
        Ok(record.clone())
    }

    async fn delete(&self, id: u64) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        let idx = inner.position(id).ok_or(StoreError::NotFound(R::KIND))?;
        inner.records.remove(idx);
        debug!(kind = R::KIND, id, "record deleted");
        Ok(())
    }
}
