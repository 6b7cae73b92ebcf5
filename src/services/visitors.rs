//! Visitor lifecycle and listing service

use chrono::{FixedOffset, NaiveDate, Utc};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::visitor::{
        log_date_of, CheckoutOutcome, CreateVisitor, Visitor, VisitorListing, VisitorSummary,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct VisitorsService {
    repository: Repository,
    offset: FixedOffset,
    allow_purge: bool,
}

impl VisitorsService {
    pub fn new(repository: Repository, offset: FixedOffset, allow_purge: bool) -> Self {
        Self {
            repository,
            offset,
            allow_purge,
        }
    }

    /// Current calendar day in the log timezone
    pub fn today(&self) -> NaiveDate {
        log_date_of(Utc::now(), &self.offset)
    }

    /// Register (check in) a visitor
    pub async fn register(&self, data: CreateVisitor) -> AppResult<Visitor> {
        data.check()?;

        let visitor = data.into_visitor(Uuid::new_v4(), Utc::now(), &self.offset);
        let stored = self.repository.visitors.insert(&visitor).await?;

        tracing::info!(
            visitor_id = %stored.id,
            log_date = %stored.log_date,
            "Visitor checked in"
        );
        Ok(stored)
    }

    /// Check a visitor out; a record can only be checked out once
    pub async fn check_out(&self, id: Uuid) -> AppResult<Visitor> {
        match self.repository.visitors.update_checkout(id, Utc::now()).await? {
            CheckoutOutcome::Updated(visitor) => {
                tracing::info!(visitor_id = %visitor.id, "Visitor checked out");
                Ok(visitor)
            }
            CheckoutOutcome::AlreadyCheckedOut(visitor) => {
                Err(AppError::AlreadyCheckedOut(format!(
                    "Visitor {} already checked out at {}",
                    visitor.id,
                    visitor
                        .check_out_time
                        .map(|t| t.to_rfc3339())
                        .unwrap_or_default()
                )))
            }
            CheckoutOutcome::NotFound => Err(not_found(id)),
        }
    }

    /// Get a visitor by ID
    pub async fn get(&self, id: Uuid) -> AppResult<Visitor> {
        self.repository
            .visitors
            .get_by_id(id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// List visitors of a log date (all visitors when `None`), newest first
    pub async fn list_by_date(&self, date: Option<NaiveDate>) -> AppResult<VisitorListing> {
        let records = self.repository.visitors.query_by_log_date(date).await?;
        Ok(VisitorListing::from_records(records, date))
    }

    /// Totals for a log date, defaulting to today
    pub async fn summary(&self, date: Option<NaiveDate>) -> AppResult<VisitorSummary> {
        let date = date.unwrap_or_else(|| self.today());
        let records = self.repository.visitors.query_by_log_date(Some(date)).await?;
        Ok(VisitorSummary::tally(date, &records))
    }

    /// Delete every record logged today (administrative)
    pub async fn purge_today(&self) -> AppResult<u64> {
        if !self.allow_purge {
            return Err(AppError::Authorization(
                "Bulk deletion of visitor records is disabled".to_string(),
            ));
        }

        let today = self.today();
        let deleted = self.repository.visitors.delete_by_log_date(today).await?;
        tracing::warn!(log_date = %today, deleted, "Purged visitor records");
        Ok(deleted)
    }

    /// Check that the store is reachable
    pub async fn ping(&self) -> AppResult<()> {
        self.repository.visitors.ping().await
    }
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Visitor with id {} not found", id))
}
