//! Quote repository and service traits.

use async_trait::async_trait;
use chrono::NaiveDateTime;

use super::quotes_model::{NewQuote, Quote, QuoteCreation, QuoteLookup, QuoteRecord, QuoteUpdate};
use crate::errors::Result;
use crate::policies::PolicyVersion;

/// Trait defining the contract for Quote repository operations.
///
/// Event, venue, and policy holder details are persisted alongside the quote
/// in the same transaction.
#[async_trait]
pub trait QuoteRepositoryTrait: Send + Sync {
    /// Inserts a quote, creating the owning user by email when absent.
    ///
    /// A duplicate quote number surfaces as a unique violation.
    async fn create(&self, record: QuoteRecord) -> Result<Quote>;

    /// Persists the full state of an existing quote and its details.
    async fn save(&self, quote: Quote) -> Result<Quote>;

    /// Deletes a quote and everything it owns.
    ///
    /// Returns the policy versions removed by the cascade so their documents
    /// can be cleaned up.
    async fn delete_by_number(&self, quote_number: &str) -> Result<Vec<PolicyVersion>>;

    /// Marks every unconverted, non-expired quote created before `cutoff`
    /// as expired in a single statement. Returns the number of rows changed.
    async fn expire_created_before(&self, cutoff: NaiveDateTime) -> Result<usize>;

    fn get_by_id(&self, quote_id: &str) -> Result<Quote>;

    fn get_by_number(&self, quote_number: &str) -> Result<Quote>;

    fn list_by_email(&self, email: &str) -> Result<Vec<Quote>>;

    fn list(&self) -> Result<Vec<Quote>>;
}

/// Trait defining the contract for Quote service operations.
#[async_trait]
pub trait QuoteServiceTrait: Send + Sync {
    /// Creates a quote, converting it immediately when a customer has
    /// already paid.
    async fn create_quote(&self, new_quote: NewQuote) -> Result<QuoteCreation>;

    /// Applies a partial update identified by quote number.
    async fn update_quote(&self, quote_number: &str, update: QuoteUpdate) -> Result<Quote>;

    /// Deletes a quote with its event, policy, payments, and versions.
    async fn delete_quote(&self, quote_number: &str) -> Result<()>;

    /// Finds quotes by number, id, email, or returns all of them.
    fn find_quotes(&self, lookup: QuoteLookup) -> Result<Vec<Quote>>;

    fn get_quote(&self, quote_number: &str) -> Result<Quote>;

    /// Expires stale unconverted quotes. Returns how many changed.
    async fn expire_stale_quotes(&self, now: NaiveDateTime) -> Result<usize>;
}
