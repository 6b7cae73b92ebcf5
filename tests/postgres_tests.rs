//! PostgreSQL store tests
//!
//! Require a reachable database in `DATABASE_URL`.
//! Run with: cargo test --test postgres_tests -- --ignored

use chrono::{Duration, Utc};
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use visitor_log_server::{
    models::{CheckoutOutcome, Visitor},
    repository::{visitors::PgVisitorsRepository, VisitorStore},
};

async fn repository() -> PgVisitorsRepository {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPoolOptions::new()
        .max_connections(20)
        .connect(&url)
        .await
        .expect("Failed to connect to database");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");
    PgVisitorsRepository::new(pool)
}

fn visitor(name: &str) -> Visitor {
    let now = Utc::now();
    Visitor {
        id: Uuid::new_v4(),
        name: name.to_string(),
        address: "12 Oak St".to_string(),
        mobile_number: "9876543210".to_string(),
        purpose: "Interview".to_string(),
        reference: "HR Desk".to_string(),
        check_in_time: now,
        check_out_time: None,
        log_date: now.date_naive(),
    }
}

#[tokio::test]
#[ignore]
async fn test_concurrent_checkouts_update_once() {
    let repo = repository().await;
    let stored = repo.insert(&visitor("Asha")).await.unwrap();
    let id = stored.id;

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let repo = repo.clone();
            let at = stored.check_in_time + Duration::seconds(i + 1);
            tokio::spawn(async move { repo.update_checkout(id, at).await })
        })
        .collect();

    let mut updated = 0;
    let mut rejected = 0;
    for handle in handles {
        match handle.await.unwrap().unwrap() {
            CheckoutOutcome::Updated(_) => updated += 1,
            CheckoutOutcome::AlreadyCheckedOut(_) => rejected += 1,
            CheckoutOutcome::NotFound => panic!("record vanished"),
        }
    }

    assert_eq!((updated, rejected), (1, 15));
}

#[tokio::test]
#[ignore]
async fn test_checkout_unknown_id() {
    let repo = repository().await;
    let outcome = repo.update_checkout(Uuid::new_v4(), Utc::now()).await.unwrap();
    assert_eq!(outcome, CheckoutOutcome::NotFound);
}

#[tokio::test]
#[ignore]
async fn test_query_by_log_date_round_trip() {
    let repo = repository().await;
    let stored = repo.insert(&visitor("Ravi")).await.unwrap();

    let listed = repo.query_by_log_date(Some(stored.log_date)).await.unwrap();
    let found = listed
        .iter()
        .find(|v| v.id == stored.id)
        .expect("inserted record listed");
    assert_eq!(found.name, "Ravi");
    assert!(listed
        .windows(2)
        .all(|w| w[0].check_in_time >= w[1].check_in_time));
}
