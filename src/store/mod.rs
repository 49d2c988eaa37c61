//! Collection store: the ordered, unindexed sequence of records behind each
//! resource.
//!
//! Route handlers only ever see `Arc<dyn Store<R>>`, so the in-memory
//! implementation can be swapped for a persistent one without touching them.

mod coerce;
mod memory;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use time::OffsetDateTime;

pub use coerce::{
    explicit, is_present, lenient_float, lenient_int, merge_text, null_as_nan, parse_id,
};
pub use memory::{IdStrategy, MemoryStore};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Validation(&'static str),
}

/// A record type that can live in a collection store.
pub trait Record: Clone + Serialize + Send + Sync + 'static {
    /// Human-facing name used in error messages ("Product not found").
    const KIND: &'static str;

    /// Create body. Fields are optional so presence can be checked here
    /// rather than by the JSON decoder.
    type Draft: DeserializeOwned + Send + 'static;
    /// Update body; absent fields keep their current value.
    type Patch: DeserializeOwned + Send + 'static;
    /// List query; every populated predicate must hold.
    type Filter: DeserializeOwned + Default + Send + Sync + 'static;

    fn id(&self) -> u64;

    fn from_draft(
        id: u64,
        draft: Self::Draft,
        created_at: OffsetDateTime,
    ) -> Result<Self, StoreError>;

    fn apply(&mut self, patch: Self::Patch);

    fn matches(&self, filter: &Self::Filter) -> bool;
}

pub type Predicate<'a, R> = &'a (dyn Fn(&R) -> bool + Send + Sync);

#[async_trait]
pub trait Store<R: Record>: Send + Sync {
    async fn list(&self, filter: &R::Filter) -> Result<Vec<R>, StoreError>;
    async fn get(&self, id: u64) -> Result<R, StoreError>;
    async fn find(&self, predicate: Predicate<'_, R>) -> Result<Option<R>, StoreError>;
    async fn create(&self, draft: R::Draft) -> Result<R, StoreError>;
    async fn update(&self, id: u64, patch: R::Patch) -> Result<R, StoreError>;
    async fn delete(&self, id: u64) -> Result<(), StoreError>;
}
