//! Test helpers: a throwaway PostgreSQL container with the workspace migrations applied.
//!
//! Requires Docker. When no container runtime is reachable the suites print a notice and
//! return early instead of failing.

use chrono::{DateTime, Duration, Utc};
use cv_core::models::CvRecord;
use cv_db::PostgresCvRepository;
use sqlx::postgres::PgPoolOptions;
use testcontainers_modules::postgres::Postgres;
use testcontainers_modules::testcontainers::runners::AsyncRunner;
use testcontainers_modules::testcontainers::ContainerAsync;
use uuid::Uuid;

/// Repository bound to an isolated database; the container lives as long as this value.
pub struct TestDb {
    pub repo: PostgresCvRepository,
    pub pool: sqlx::PgPool,
    pub _container: ContainerAsync<Postgres>,
}

pub async fn setup_test_db() -> Option<TestDb> {
    let container = match Postgres::default().start().await {
        Ok(container) => container,
        Err(e) => {
            eprintln!("skipping PostgreSQL test, container did not start: {}", e);
            return None;
        }
    };

    let host = container.get_host().await.expect("Failed to read container host");
    let port = container
        .get_host_port_ipv4(5432)
        .await
        .expect("Failed to read container port");
    let connection_string = format!(
        "postgresql://postgres:postgres@{}:{}/postgres",
        host, port
    );

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(std::time::Duration::from_secs(30))
        .connect(&connection_string)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    Some(TestDb {
        repo: PostgresCvRepository::new(pool.clone()),
        pool,
        _container: container,
    })
}

/// Postgres keeps microseconds; truncate so round-tripped timestamps compare equal.
pub fn micros(ts: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_micros(ts.timestamp_micros()).expect("timestamp in range")
}

/// Pending record created `age_secs` seconds ago.
pub fn pending_record(name: &str, age_secs: i64) -> CvRecord {
    let id = Uuid::new_v4();
    CvRecord::new_pending(
        id,
        name,
        "application/pdf",
        format!("cv/{}.pdf", id),
        micros(Utc::now() - Duration::seconds(age_secs)),
    )
}
