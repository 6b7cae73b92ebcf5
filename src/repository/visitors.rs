//! Visitors repository (PostgreSQL)

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::visitor::{CheckoutOutcome, Visitor},
};

use super::VisitorStore;

#[derive(Clone)]
pub struct PgVisitorsRepository {
    pool: Pool<Postgres>,
}

impl PgVisitorsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VisitorStore for PgVisitorsRepository {
    async fn insert(&self, visitor: &Visitor) -> AppResult<Visitor> {
        let row = sqlx::query_as::<_, Visitor>(
            r#"
            INSERT INTO visitors (
                id, name, address, mobile_number, purpose, reference,
                check_in_time, check_out_time, log_date
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(visitor.id)
        .bind(&visitor.name)
        .bind(&visitor.address)
        .bind(&visitor.mobile_number)
        .bind(&visitor.purpose)
        .bind(&visitor.reference)
        .bind(visitor.check_in_time)
        .bind(visitor.check_out_time)
        .bind(visitor.log_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn query_by_log_date(&self, date: Option<NaiveDate>) -> AppResult<Vec<Visitor>> {
        let where_clause = if date.is_some() {
            "WHERE log_date = $1"
        } else {
            ""
        };

        let query = format!(
            "SELECT * FROM visitors {} ORDER BY check_in_time DESC",
            where_clause
        );

        let mut builder = sqlx::query_as::<_, Visitor>(&query);
        if let Some(d) = date {
            builder = builder.bind(d);
        }

        let rows = builder.fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Visitor>> {
        let row = sqlx::query_as::<_, Visitor>("SELECT * FROM visitors WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn update_checkout(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<CheckoutOutcome> {
        // GREATEST keeps the row CHECK constraint satisfied if clocks disagree
        let updated = sqlx::query_as::<_, Visitor>(
            r#"
            UPDATE visitors
            SET check_out_time = GREATEST($2, check_in_time)
            WHERE id = $1 AND check_out_time IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(at)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(visitor) = updated {
            return Ok(CheckoutOutcome::Updated(visitor));
        }

        Ok(match self.get_by_id(id).await? {
            Some(visitor) => CheckoutOutcome::AlreadyCheckedOut(visitor),
            None => CheckoutOutcome::NotFound,
        })
    }

    async fn delete_by_log_date(&self, date: NaiveDate) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM visitors WHERE log_date = $1")
            .bind(date)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
