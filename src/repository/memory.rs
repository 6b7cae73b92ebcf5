//! In-process visitors repository
//!
//! Keeps every record in a single list, optionally mirrored to a JSON file
//! after each write so that records survive a restart.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::visitor::{CheckoutOutcome, Visitor},
};

use super::VisitorStore;

#[derive(Default)]
pub struct MemoryVisitorsRepository {
    records: RwLock<Vec<Visitor>>,
    snapshot: Option<PathBuf>,
}

impl MemoryVisitorsRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a repository mirrored to `path`, loading it when the file exists
    pub async fn open(path: impl Into<PathBuf>) -> AppResult<Self> {
        let path = path.into();
        let records = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.is_empty() => Vec::new(),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                AppError::Storage(format!("Corrupt snapshot {}: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                return Err(AppError::Storage(format!(
                    "Cannot read snapshot {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        tracing::info!(
            "Loaded {} visitor record(s) from {}",
            records.len(),
            path.display()
        );

        Ok(Self {
            records: RwLock::new(records),
            snapshot: Some(path),
        })
    }

    async fn persist(&self, records: &[Visitor]) -> AppResult<()> {
        let Some(path) = self.snapshot.as_deref() else {
            return Ok(());
        };
        write_snapshot(path, records).await.map_err(|e| {
            AppError::Storage(format!("Cannot write snapshot {}: {}", path.display(), e))
        })
    }
}

async fn write_snapshot(path: &Path, records: &[Visitor]) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let json = serde_json::to_vec_pretty(records)?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, json).await?;
    tokio::fs::rename(&tmp, path).await
}

fn newest_first(records: &mut [Visitor]) {
    records.sort_by(|a, b| b.check_in_time.cmp(&a.check_in_time));
}

#[async_trait]
impl VisitorStore for MemoryVisitorsRepository {
    async fn insert(&self, visitor: &Visitor) -> AppResult<Visitor> {
        let mut records = self.records.write().await;
        if records.iter().any(|v| v.id == visitor.id) {
            return Err(AppError::Storage(format!(
                "Visitor with id {} already exists",
                visitor.id
            )));
        }

        records.push(visitor.clone());
        if let Err(e) = self.persist(&records).await {
            records.pop();
            return Err(e);
        }
        Ok(visitor.clone())
    }

    async fn query_by_log_date(&self, date: Option<NaiveDate>) -> AppResult<Vec<Visitor>> {
        let records = self.records.read().await;
        let mut matching: Vec<Visitor> = records
            .iter()
            .filter(|v| date.map_or(true, |d| v.log_date == d))
            .cloned()
            .collect();
        newest_first(&mut matching);
        Ok(matching)
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Visitor>> {
        let records = self.records.read().await;
        Ok(records.iter().find(|v| v.id == id).cloned())
    }

    async fn update_checkout(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<CheckoutOutcome> {
        let mut records = self.records.write().await;
        let Some(idx) = records.iter().position(|v| v.id == id) else {
            return Ok(CheckoutOutcome::NotFound);
        };

        if records[idx].check_out_time.is_some() {
            return Ok(CheckoutOutcome::AlreadyCheckedOut(records[idx].clone()));
        }

        let check_out = at.max(records[idx].check_in_time);
        records[idx].check_out_time = Some(check_out);
        if let Err(e) = self.persist(&records).await {
            records[idx].check_out_time = None;
            return Err(e);
        }
        Ok(CheckoutOutcome::Updated(records[idx].clone()))
    }

    async fn delete_by_log_date(&self, date: NaiveDate) -> AppResult<u64> {
        let mut records = self.records.write().await;
        let (removed, kept): (Vec<Visitor>, Vec<Visitor>) =
            records.drain(..).partition(|v| v.log_date == date);
        *records = kept;

        if let Err(e) = self.persist(&records).await {
            records.extend(removed);
            return Err(e);
        }
        Ok(removed.len() as u64)
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn visitor_at(name: &str, check_in: DateTime<Utc>) -> Visitor {
        Visitor {
            id: Uuid::new_v4(),
            name: name.to_string(),
            address: "12 Oak St".to_string(),
            mobile_number: "9876543210".to_string(),
            purpose: "Delivery".to_string(),
            reference: "Reception".to_string(),
            check_in_time: check_in,
            check_out_time: None,
            log_date: check_in.date_naive(),
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_query_filters_and_orders() {
        let repo = MemoryVisitorsRepository::new();
        let morning = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let early = visitor_at("early", morning);
        let late = visitor_at("late", morning + Duration::hours(3));
        let other_day = visitor_at("other", morning - Duration::days(1));

        for v in [&early, &other_day, &late] {
            repo.insert(v).await.unwrap();
        }

        let names = |vs: Vec<Visitor>| vs.into_iter().map(|v| v.name).collect::<Vec<_>>();

        let on_day = repo.query_by_log_date(Some(day(2024, 5, 1))).await.unwrap();
        assert_eq!(names(on_day), ["late", "early"]);

        let all = repo.query_by_log_date(None).await.unwrap();
        assert_eq!(names(all), ["late", "early", "other"]);

        let none = repo.query_by_log_date(Some(day(2020, 1, 1))).await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_checkout_only_once() {
        let repo = MemoryVisitorsRepository::new();
        let check_in = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let v = repo.insert(&visitor_at("a", check_in)).await.unwrap();

        let first_at = check_in + Duration::minutes(30);
        let first = repo.update_checkout(v.id, first_at).await.unwrap();
        let CheckoutOutcome::Updated(updated) = first else {
            panic!("expected update, got {:?}", first);
        };
        assert_eq!(updated.check_out_time, Some(first_at));

        let second = repo
            .update_checkout(v.id, first_at + Duration::hours(1))
            .await
            .unwrap();
        match second {
            CheckoutOutcome::AlreadyCheckedOut(current) => {
                assert_eq!(current.check_out_time, Some(first_at));
            }
            other => panic!("expected already checked out, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_checkout_never_precedes_check_in() {
        let repo = MemoryVisitorsRepository::new();
        let check_in = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let v = repo.insert(&visitor_at("a", check_in)).await.unwrap();

        let outcome = repo
            .update_checkout(v.id, check_in - Duration::seconds(5))
            .await
            .unwrap();
        let CheckoutOutcome::Updated(updated) = outcome else {
            panic!("expected update");
        };
        assert_eq!(updated.check_out_time, Some(check_in));
    }

    #[tokio::test]
    async fn test_checkout_unknown_id() {
        let repo = MemoryVisitorsRepository::new();
        let outcome = repo.update_checkout(Uuid::new_v4(), Utc::now()).await.unwrap();
        assert_eq!(outcome, CheckoutOutcome::NotFound);
        assert!(repo.query_by_log_date(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_id_rejected() {
        let repo = MemoryVisitorsRepository::new();
        let v = visitor_at("a", Utc::now());
        repo.insert(&v).await.unwrap();
        assert!(matches!(repo.insert(&v).await, Err(AppError::Storage(_))));
    }

    #[tokio::test]
    async fn test_delete_by_log_date() {
        let repo = MemoryVisitorsRepository::new();
        let today = Utc.with_ymd_and_hms(2024, 5, 2, 10, 0, 0).unwrap();
        repo.insert(&visitor_at("a", today)).await.unwrap();
        repo.insert(&visitor_at("b", today + Duration::hours(1))).await.unwrap();
        repo.insert(&visitor_at("c", today - Duration::days(1))).await.unwrap();

        assert_eq!(repo.delete_by_log_date(day(2024, 5, 2)).await.unwrap(), 2);
        let left = repo.query_by_log_date(None).await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].name, "c");
    }

    #[tokio::test]
    async fn test_snapshot_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records").join("visitor_records.json");

        let check_in = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let id = {
            let repo = MemoryVisitorsRepository::open(&path).await.unwrap();
            let v = repo.insert(&visitor_at("a", check_in)).await.unwrap();
            repo.update_checkout(v.id, check_in + Duration::hours(2))
                .await
                .unwrap();
            v.id
        };

        let reopened = MemoryVisitorsRepository::open(&path).await.unwrap();
        let v = reopened.get_by_id(id).await.unwrap().expect("record persisted");
        assert_eq!(v.check_out_time, Some(check_in + Duration::hours(2)));
        assert_eq!(v.log_date, day(2024, 5, 1));
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("visitor_records.json");
        tokio::fs::write(&path, b"{not json").await.unwrap();

        assert!(matches!(
            MemoryVisitorsRepository::open(&path).await,
            Err(AppError::Storage(_))
        ));
    }
}
