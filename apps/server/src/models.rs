//! Request and response bodies of the REST API.
//!
//! Domain types from `eventcover_core` are serialized directly where they
//! already have the wire shape; the types here cover query strings and
//! envelopes around them.

use eventcover_core::{
    payments::Payment,
    policies::{ConversionOutcome, Policy},
    premiums::{coverage_limit, map_max_guests_to_guest_range, PremiumBreakdown, PremiumInputs},
    quotes::{Quote, QuoteCreation, QuoteLookup},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
}

/// Query string of `GET /quotes`. The first key present wins, in the
/// order quote number, id, email, all.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct QuoteQuery {
    pub quote_number: Option<String>,
    pub id: Option<String>,
    pub email: Option<String>,
    #[serde(default)]
    pub all_quotes: Option<bool>,
}

impl QuoteQuery {
    pub fn lookup(self) -> Option<QuoteLookup> {
        let present = |value: Option<String>| value.filter(|v| !v.trim().is_empty());

        if let Some(number) = present(self.quote_number) {
            return Some(QuoteLookup::ByNumber(number));
        }
        if let Some(id) = present(self.id) {
            return Some(QuoteLookup::ById(id));
        }
        if let Some(email) = present(self.email) {
            return Some(QuoteLookup::ByEmail(email));
        }
        if self.all_quotes == Some(true) {
            return Some(QuoteLookup::All);
        }
        None
    }
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct QuoteCreated {
    pub quote_number: String,
    pub quote: Quote,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy: Option<Policy>,
    pub converted: bool,
}

impl From<QuoteCreation> for QuoteCreated {
    fn from(creation: QuoteCreation) -> Self {
        let converted = creation.converted();
        Self {
            quote_number: creation.quote.quote_number.clone(),
            quote: creation.quote,
            policy: creation.policy,
            converted,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct FromQuoteRequest {
    pub quote_number: String,
    #[serde(default)]
    pub force_convert: bool,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PolicyCreated {
    pub policy_number: String,
    pub policy: Policy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment: Option<Payment>,
}

impl From<ConversionOutcome> for PolicyCreated {
    fn from(outcome: ConversionOutcome) -> Self {
        Self {
            policy_number: outcome.policy.policy_number.clone(),
            policy: outcome.policy,
            payment: outcome.payment,
        }
    }
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PremiumPreviewQuery {
    pub coverage_level: Option<i32>,
    pub liability_coverage: Option<String>,
    #[serde(default)]
    pub liquor_liability: bool,
    pub max_guests: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PremiumPreview {
    #[schema(value_type = String)]
    pub base_premium: Decimal,
    #[schema(value_type = String)]
    pub liability_premium: Decimal,
    #[schema(value_type = String)]
    pub liquor_liability_premium: Decimal,
    #[schema(value_type = String)]
    pub total_premium: Decimal,
    /// Guest bucket the guest count falls in, absent when out of range.
    pub guest_range: Option<String>,
    #[schema(value_type = Option<String>)]
    pub coverage_limit: Option<Decimal>,
}

impl From<PremiumPreviewQuery> for PremiumPreview {
    fn from(query: PremiumPreviewQuery) -> Self {
        let guest_range = query
            .max_guests
            .as_deref()
            .and_then(map_max_guests_to_guest_range)
            .map(|range| range.label().to_string());
        let limit = query.coverage_level.and_then(coverage_limit);
        let breakdown = PremiumBreakdown::calculate(&PremiumInputs {
            coverage_level: query.coverage_level,
            liability_coverage: query.liability_coverage,
            liquor_liability: query.liquor_liability,
            max_guests: query.max_guests,
        });

        Self {
            base_premium: breakdown.base_premium,
            liability_premium: breakdown.liability_premium,
            liquor_liability_premium: breakdown.liquor_liability_premium,
            total_premium: breakdown.total_premium,
            guest_range,
            coverage_limit: limit,
        }
    }
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct LogQuery {
    pub limit: Option<i64>,
}

impl LogQuery {
    pub const DEFAULT_LIMIT: i64 = 100;
    pub const MAX_LIMIT: i64 = 1000;

    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT)
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CleanupResult {
    pub removed: usize,
}
