//! Repository layer: visitor storage behind a single interface

pub mod memory;
pub mod visitors;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::visitor::{CheckoutOutcome, Visitor},
};

/// Persistence collaborator for visitor records.
///
/// Implementations must order query results by `check_in_time` descending and
/// must only set `check_out_time` when it is still absent.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VisitorStore: Send + Sync {
    /// Store a new record and return it as persisted
    async fn insert(&self, visitor: &Visitor) -> AppResult<Visitor>;

    /// Records whose log date equals `date`, or every record when `None`
    async fn query_by_log_date(&self, date: Option<NaiveDate>) -> AppResult<Vec<Visitor>>;

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Visitor>>;

    /// Set the checkout time if the record is still active
    async fn update_checkout(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<CheckoutOutcome>;

    /// Remove every record of a log date, returning how many were removed
    async fn delete_by_log_date(&self, date: NaiveDate) -> AppResult<u64>;

    /// Check that the backing store is reachable
    async fn ping(&self) -> AppResult<()>;
}

/// Main repository struct holding the configured store
#[derive(Clone)]
pub struct Repository {
    pub visitors: Arc<dyn VisitorStore>,
}

impl Repository {
    pub fn new(visitors: Arc<dyn VisitorStore>) -> Self {
        Self { visitors }
    }

    /// Repository backed by PostgreSQL
    pub fn postgres(pool: Pool<Postgres>) -> Self {
        Self::new(Arc::new(visitors::PgVisitorsRepository::new(pool)))
    }

    /// Repository backed by process memory only
    pub fn in_memory() -> Self {
        Self::new(Arc::new(memory::MemoryVisitorsRepository::new()))
    }
}
