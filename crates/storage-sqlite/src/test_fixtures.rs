//! Temp-file databases for the repository tests.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use std::sync::Arc;
use tempfile::{tempdir, TempDir};

use eventcover_core::premiums::{PremiumBreakdown, PremiumInputs};
use eventcover_core::quotes::{QuoteRecord, QuoteRepositoryTrait, QuoteSource, QuoteStatus};

use crate::db::{create_pool, get_connection, init, run_migrations, spawn_writer, DbPool, WriteHandle};
use crate::quotes::QuoteRepository;
use crate::schema::quotes;

pub struct TestDb {
    pub dir: TempDir,
    pub path: String,
    pub pool: Arc<DbPool>,
    pub writer: WriteHandle,
}

impl TestDb {
    /// Must be called inside a Tokio runtime; the writer is spawned on it.
    pub fn new() -> Self {
        let dir = tempdir().expect("Failed to create temp directory");
        let path = dir.path().join("test.db").to_string_lossy().to_string();
        init(&path).expect("Failed to initialise database");
        let pool = create_pool(&path).expect("Failed to create pool");
        run_migrations(&pool).expect("Failed to run migrations");
        let writer = spawn_writer((*pool).clone());
        TestDb {
            dir,
            path,
            pool,
            writer,
        }
    }

    /// Inserts a customer quote and returns its id.
    pub async fn insert_quote(&self, quote_number: &str, email: &str) -> String {
        QuoteRepository::new(self.pool.clone(), self.writer.clone())
            .create(quote_record(quote_number, email))
            .await
            .expect("Failed to insert quote")
            .id
    }

    pub fn backdate_quote(&self, quote_id: &str, created_at: NaiveDateTime) {
        let mut conn = get_connection(&self.pool).expect("Failed to get connection");
        diesel::update(quotes::table.find(quote_id))
            .set(quotes::created_at.eq(created_at))
            .execute(&mut conn)
            .expect("Failed to backdate quote");
    }

    /// Flags a quote as converted without creating its policy.
    pub fn mark_converted(&self, quote_id: &str) {
        let mut conn = get_connection(&self.pool).expect("Failed to get connection");
        diesel::update(quotes::table.find(quote_id))
            .set(quotes::converted_to_policy.eq(true))
            .execute(&mut conn)
            .expect("Failed to mark quote converted");
    }
}

pub fn quote_record(quote_number: &str, email: &str) -> QuoteRecord {
    let inputs = PremiumInputs {
        coverage_level: Some(4),
        liability_coverage: Some("option1".to_string()),
        liquor_liability: false,
        max_guests: None,
    };
    QuoteRecord {
        quote_number: quote_number.to_string(),
        status: QuoteStatus::Step1,
        source: QuoteSource::Customer,
        email: email.to_string(),
        coverage_level: inputs.coverage_level,
        liability_coverage: inputs.liability_coverage.clone(),
        liquor_liability: inputs.liquor_liability,
        premiums: PremiumBreakdown::calculate(&inputs),
        event: None,
        policy_holder: None,
    }
}
