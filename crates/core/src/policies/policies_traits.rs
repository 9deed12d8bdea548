//! Policy repository and service traits.

use async_trait::async_trait;

use super::policies_model::{
    ConversionOutcome, NewPolicy, Policy, PolicyNumberStrategy, PolicyRecord, PolicyUpdate,
    PolicyVersion, PolicyVersionSummary, PolicyView, VersionDocument, VersionedPolicyWrite,
    VersionedUpdateOutcome,
};
use crate::errors::Result;
use crate::payments::NewPayment;

/// Trait defining the contract for Policy repository operations.
#[async_trait]
pub trait PolicyRepositoryTrait: Send + Sync {
    /// Converts a quote in a single transaction.
    ///
    /// If the quote already has a policy it is returned unchanged with
    /// `created = false`. Otherwise the policy is inserted and the quote is
    /// marked converted. A supplied payment is written in the same
    /// transaction and linked to the policy.
    async fn convert_quote(
        &self,
        quote_id: &str,
        policy_number: String,
        payment: Option<NewPayment>,
    ) -> Result<ConversionOutcome>;

    /// Inserts a policy that is not linked to a quote.
    async fn create(&self, record: PolicyRecord) -> Result<Policy>;

    /// Verifies the expected timestamps, inserts the version, applies the
    /// update, and prunes old versions, all in one transaction.
    async fn update_with_version(&self, write: VersionedPolicyWrite)
        -> Result<VersionedUpdateOutcome>;

    /// Deletes a policy with its payments and versions. Returns the removed
    /// versions.
    async fn delete(&self, policy_id: &str) -> Result<Vec<PolicyVersion>>;

    /// Prunes every policy down to `max_versions`. Returns removed versions.
    async fn prune_versions(&self, max_versions: usize) -> Result<Vec<PolicyVersion>>;

    fn get_by_id(&self, policy_id: &str) -> Result<Policy>;

    fn get_by_number(&self, policy_number: &str) -> Result<Policy>;

    fn find_by_quote_id(&self, quote_id: &str) -> Result<Option<Policy>>;

    fn list(&self) -> Result<Vec<Policy>>;

    /// Lists versions newest first.
    fn list_versions(&self, policy_id: &str) -> Result<Vec<PolicyVersion>>;

    fn get_version(&self, policy_id: &str, version_id: &str) -> Result<PolicyVersion>;
}

/// Trait defining the contract for Policy service operations.
#[async_trait]
pub trait PolicyServiceTrait: Send + Sync {
    /// Converts a quote to a policy. Idempotent.
    async fn convert_quote(
        &self,
        quote_id: &str,
        strategy: PolicyNumberStrategy,
    ) -> Result<ConversionOutcome>;

    /// Converts a quote and records a payment in the same transaction.
    async fn convert_quote_with_payment(
        &self,
        quote_id: &str,
        strategy: PolicyNumberStrategy,
        payment: Option<NewPayment>,
    ) -> Result<ConversionOutcome>;

    /// Explicit conversion requested through the API.
    ///
    /// Rejects quotes that are already converted, and admin quotes unless
    /// `force_convert` is set. Admin conversions record an admin payment.
    async fn create_from_quote(
        &self,
        quote_number: &str,
        force_convert: bool,
    ) -> Result<ConversionOutcome>;

    /// Creates a standalone policy.
    async fn create_policy(&self, new_policy: NewPolicy) -> Result<Policy>;

    /// Snapshots the current state as a version, then applies the update.
    async fn update_policy(&self, policy_id: &str, update: PolicyUpdate) -> Result<PolicyView>;

    async fn delete_policy(&self, policy_id: &str) -> Result<()>;

    /// Applies version retention to every policy. Returns rows removed.
    async fn cleanup_all_policy_versions(&self) -> Result<usize>;

    /// Deletes the documents of removed versions. Missing files are
    /// ignored. Returns how many were deleted.
    async fn discard_version_documents(&self, versions: &[PolicyVersion]) -> usize;

    fn get_policy(&self, policy_id: &str) -> Result<PolicyView>;

    fn list_policies(&self) -> Result<Vec<PolicyView>>;

    fn list_versions(&self, policy_id: &str) -> Result<Vec<PolicyVersionSummary>>;

    async fn download_version(&self, policy_id: &str, version_id: &str)
        -> Result<VersionDocument>;
}
