//! Policy domain models.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::details::{EventDetails, PolicyHolderDetails};
use crate::payments::Payment;
use crate::quotes::{Quote, QuoteUpdate};

/// Domain model representing a policy.
///
/// `event` and `policy_holder` are the policy's own details. For
/// quote-derived policies the quote's details take precedence, see
/// [`resolve_policy_details`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    pub id: String,
    pub policy_number: String,
    pub quote_id: Option<String>,
    pub pdf_url: Option<String>,
    pub event: Option<EventDetails>,
    pub policy_holder: Option<PolicyHolderDetails>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Policy created directly by an administrator, without a quote.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPolicy {
    /// Generated when absent.
    pub policy_number: Option<String>,
    pub pdf_url: Option<String>,
    pub event: Option<EventDetails>,
    pub policy_holder: Option<PolicyHolderDetails>,
}

/// Prepared policy handed to the repository for insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyRecord {
    pub policy_number: String,
    pub pdf_url: Option<String>,
    pub event: Option<EventDetails>,
    pub policy_holder: Option<PolicyHolderDetails>,
}

/// Descriptive details of a policy or quote.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyDetails {
    pub event: Option<EventDetails>,
    pub policy_holder: Option<PolicyHolderDetails>,
}

impl PolicyDetails {
    pub fn of_policy(policy: &Policy) -> Self {
        Self {
            event: policy.event.clone(),
            policy_holder: policy.policy_holder.clone(),
        }
    }

    pub fn of_quote(quote: &Quote) -> Self {
        Self {
            event: quote.event.clone(),
            policy_holder: quote.policy_holder.clone(),
        }
    }
}

/// Resolves the details shown for a policy: each section comes from the
/// quote when the quote has it, otherwise from the policy itself.
pub fn resolve_policy_details(
    policy_details: PolicyDetails,
    quote_details: Option<PolicyDetails>,
) -> PolicyDetails {
    match quote_details {
        Some(quote) => PolicyDetails {
            event: quote.event.or(policy_details.event),
            policy_holder: quote.policy_holder.or(policy_details.policy_holder),
        },
        None => policy_details,
    }
}

/// A policy with its quote and resolved details.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyView {
    pub policy: Policy,
    pub quote: Option<Quote>,
    pub event: Option<EventDetails>,
    pub policy_holder: Option<PolicyHolderDetails>,
    #[serde(default)]
    pub payments: Vec<Payment>,
}

impl PolicyView {
    pub fn new(policy: Policy, quote: Option<Quote>, payments: Vec<Payment>) -> Self {
        let details = resolve_policy_details(
            PolicyDetails::of_policy(&policy),
            quote.as_ref().map(PolicyDetails::of_quote),
        );
        Self {
            policy,
            quote,
            event: details.event,
            policy_holder: details.policy_holder,
            payments,
        }
    }

    pub fn email(&self) -> Option<&str> {
        self.quote.as_ref().map(|q| q.email.as_str())
    }
}

/// Point-in-time copy of a policy stored with each version.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicySnapshot {
    pub policy: Policy,
    pub quote: Option<Quote>,
    pub event: Option<EventDetails>,
    pub policy_holder: Option<PolicyHolderDetails>,
    pub pdf_file_name: String,
    pub captured_at: NaiveDateTime,
}

impl PolicySnapshot {
    pub fn capture(view: &PolicyView, pdf_file_name: String, captured_at: NaiveDateTime) -> Self {
        Self {
            policy: view.policy.clone(),
            quote: view.quote.clone(),
            event: view.event.clone(),
            policy_holder: view.policy_holder.clone(),
            pdf_file_name,
            captured_at,
        }
    }
}

/// Partial update for a policy.
///
/// Details and premium inputs land on the quote for quote-derived policies,
/// otherwise on the policy's own records.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyUpdate {
    pub pdf_url: Option<String>,
    pub email: Option<String>,
    pub coverage_level: Option<i32>,
    pub liability_coverage: Option<String>,
    pub liquor_liability: Option<bool>,
    pub event: Option<EventDetails>,
    pub policy_holder: Option<PolicyHolderDetails>,
}

impl PolicyUpdate {
    pub(crate) fn quote_update(&self) -> QuoteUpdate {
        QuoteUpdate {
            status: None,
            email: self.email.clone(),
            coverage_level: self.coverage_level,
            liability_coverage: self.liability_coverage.clone(),
            liquor_liability: self.liquor_liability,
            event: self.event.clone(),
            policy_holder: self.policy_holder.clone(),
        }
    }
}

/// How a conversion picks the new policy's number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyNumberStrategy {
    /// `PI-` plus six random digits, retried on collision.
    Random,
    /// `PI-` plus the trailing segment of the quote number.
    FromQuoteNumber,
}

/// Result of converting a quote.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionOutcome {
    pub policy: Policy,
    /// False when the quote already had a policy.
    pub created: bool,
    /// Payment written in the conversion transaction, if one was supplied.
    pub payment: Option<Payment>,
}

/// Stored version of a policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyVersion {
    pub id: String,
    pub policy_id: String,
    /// JSON-encoded [`PolicySnapshot`].
    pub data: String,
    pub pdf_file_name: Option<String>,
    pub created_at: NaiveDateTime,
}

impl PolicyVersion {
    pub fn snapshot(&self) -> serde_json::Result<PolicySnapshot> {
        serde_json::from_str(&self.data)
    }
}

/// Version listing entry without the snapshot payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyVersionSummary {
    pub id: String,
    pub policy_id: String,
    pub pdf_file_name: Option<String>,
    pub created_at: NaiveDateTime,
}

impl From<PolicyVersion> for PolicyVersionSummary {
    fn from(version: PolicyVersion) -> Self {
        Self {
            id: version.id,
            policy_id: version.policy_id,
            pdf_file_name: version.pdf_file_name,
            created_at: version.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPolicyVersion {
    pub policy_id: String,
    pub data: String,
    pub pdf_file_name: String,
    pub created_at: NaiveDateTime,
}

/// Everything written by a versioned policy update, applied in one
/// transaction.
#[derive(Debug, Clone)]
pub struct VersionedPolicyWrite {
    pub policy_id: String,
    /// The policy's `updated_at` when the snapshot was taken.
    pub expected_updated_at: NaiveDateTime,
    /// The quote's `updated_at` when the snapshot was taken.
    pub expected_quote_updated_at: Option<NaiveDateTime>,
    pub version: NewPolicyVersion,
    pub pdf_url: Option<String>,
    pub event: Option<EventDetails>,
    pub policy_holder: Option<PolicyHolderDetails>,
    /// Updated quote state for quote-derived policies.
    pub quote: Option<Quote>,
    pub max_versions: usize,
}

#[derive(Debug, Clone)]
pub struct VersionedUpdateOutcome {
    pub policy: Policy,
    pub version: PolicyVersion,
    /// Versions removed by retention, oldest beyond the limit.
    pub pruned: Vec<PolicyVersion>,
}

/// Rendered document for a stored version.
#[derive(Debug, Clone)]
pub struct VersionDocument {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Builds the document name for a policy version.
pub fn version_file_name(policy_id: &str, timestamp_millis: i64) -> String {
    format!("policy_{}_{}.pdf", policy_id, timestamp_millis)
}
