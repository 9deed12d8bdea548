//! Quote domain models.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::details::{EventDetails, PolicyHolderDetails};
use crate::errors::{Error, Result, ValidationError};
use crate::payments::PaymentStatus;
use crate::premiums::{PremiumBreakdown, PremiumInputs};

/// Progress of a quote through the multi-step form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuoteStatus {
    #[default]
    Step1,
    Step2,
    Step3,
    Complete,
    Expired,
}

impl QuoteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteStatus::Step1 => "STEP1",
            QuoteStatus::Step2 => "STEP2",
            QuoteStatus::Step3 => "STEP3",
            QuoteStatus::Complete => "COMPLETE",
            QuoteStatus::Expired => "EXPIRED",
        }
    }

    /// Position in the form flow. Expired sits outside the flow.
    fn step(&self) -> Option<u8> {
        match self {
            QuoteStatus::Step1 => Some(1),
            QuoteStatus::Step2 => Some(2),
            QuoteStatus::Step3 => Some(3),
            QuoteStatus::Complete => Some(4),
            QuoteStatus::Expired => None,
        }
    }
}

impl FromStr for QuoteStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "STEP1" => Ok(QuoteStatus::Step1),
            "STEP2" => Ok(QuoteStatus::Step2),
            "STEP3" => Ok(QuoteStatus::Step3),
            "COMPLETE" => Ok(QuoteStatus::Complete),
            "EXPIRED" => Ok(QuoteStatus::Expired),
            _ => Err(format!("Unknown quote status: {}", s)),
        }
    }
}

/// Who submitted the quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuoteSource {
    #[default]
    Customer,
    Admin,
}

impl QuoteSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteSource::Customer => "CUSTOMER",
            QuoteSource::Admin => "ADMIN",
        }
    }

    /// Status a freshly created quote starts in.
    pub fn initial_status(&self) -> QuoteStatus {
        match self {
            QuoteSource::Customer => QuoteStatus::Step1,
            QuoteSource::Admin => QuoteStatus::Complete,
        }
    }
}

impl FromStr for QuoteSource {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "CUSTOMER" => Ok(QuoteSource::Customer),
            "ADMIN" => Ok(QuoteSource::Admin),
            _ => Err(format!("Unknown quote source: {}", s)),
        }
    }
}

/// Domain model representing a quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub id: String,
    pub quote_number: String,
    pub status: QuoteStatus,
    pub source: QuoteSource,
    pub converted_to_policy: bool,
    pub user_id: String,
    pub email: String,
    pub coverage_level: Option<i32>,
    pub liability_coverage: Option<String>,
    pub liquor_liability: bool,
    pub base_premium: Decimal,
    pub liability_premium: Decimal,
    pub liquor_liability_premium: Decimal,
    pub total_premium: Decimal,
    pub event: Option<EventDetails>,
    pub policy_holder: Option<PolicyHolderDetails>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Quote {
    pub fn premium_inputs(&self) -> PremiumInputs {
        PremiumInputs {
            coverage_level: self.coverage_level,
            liability_coverage: self.liability_coverage.clone(),
            liquor_liability: self.liquor_liability,
            max_guests: self.event.as_ref().and_then(|e| e.max_guests.clone()),
        }
    }

    pub fn premiums(&self) -> PremiumBreakdown {
        PremiumBreakdown {
            base_premium: self.base_premium,
            liability_premium: self.liability_premium,
            liquor_liability_premium: self.liquor_liability_premium,
            total_premium: self.total_premium,
        }
    }

    pub fn set_premiums(&mut self, breakdown: PremiumBreakdown) {
        self.base_premium = breakdown.base_premium;
        self.liability_premium = breakdown.liability_premium;
        self.liquor_liability_premium = breakdown.liquor_liability_premium;
        self.total_premium = breakdown.total_premium;
    }

    /// Recomputes every premium component from the quote's current inputs.
    pub fn recalculate_premiums(&mut self) {
        let breakdown = PremiumBreakdown::calculate(&self.premium_inputs());
        self.set_premiums(breakdown);
    }

    /// Checks that moving to `next` is allowed.
    ///
    /// Expired quotes stay expired, and converted quotes cannot move back to
    /// an earlier step.
    pub fn validate_transition(&self, next: QuoteStatus) -> Result<()> {
        if next == self.status {
            return Ok(());
        }

        if self.status == QuoteStatus::Expired {
            return Err(Error::invalid_input(format!(
                "Quote {} has expired and cannot move to {}",
                self.quote_number,
                next.as_str()
            )));
        }

        if self.converted_to_policy {
            let regresses = match (self.status.step(), next.step()) {
                (Some(current), Some(target)) => target < current,
                _ => false,
            };
            if regresses {
                return Err(Error::invalid_input(format!(
                    "Quote {} has been converted and cannot move back to {}",
                    self.quote_number,
                    next.as_str()
                )));
            }
        }

        Ok(())
    }
}

/// Input model for creating a new quote.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewQuote {
    pub email: Option<String>,
    #[serde(default)]
    pub source: QuoteSource,
    pub coverage_level: Option<i32>,
    pub liability_coverage: Option<String>,
    #[serde(default)]
    pub liquor_liability: bool,
    pub event: Option<EventDetails>,
    pub policy_holder: Option<PolicyHolderDetails>,
    /// Payment already collected by the customer flow.
    pub payment_status: Option<PaymentStatus>,
    pub payment_method: Option<String>,
}

impl NewQuote {
    /// Returns the trimmed, non-empty email or a validation error.
    pub fn validated_email(&self) -> Result<String> {
        match self.email.as_deref().map(str::trim) {
            Some(email) if !email.is_empty() => Ok(email.to_string()),
            _ => Err(ValidationError::MissingField("email".to_string()).into()),
        }
    }

    pub fn premium_inputs(&self) -> PremiumInputs {
        PremiumInputs {
            coverage_level: self.coverage_level,
            liability_coverage: self.liability_coverage.clone(),
            liquor_liability: self.liquor_liability,
            max_guests: self.event.as_ref().and_then(|e| e.max_guests.clone()),
        }
    }
}

/// Fully prepared quote handed to the repository for insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteRecord {
    pub quote_number: String,
    pub status: QuoteStatus,
    pub source: QuoteSource,
    pub email: String,
    pub coverage_level: Option<i32>,
    pub liability_coverage: Option<String>,
    pub liquor_liability: bool,
    pub premiums: PremiumBreakdown,
    pub event: Option<EventDetails>,
    pub policy_holder: Option<PolicyHolderDetails>,
}

/// Partial update for an existing quote.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteUpdate {
    pub status: Option<QuoteStatus>,
    pub email: Option<String>,
    pub coverage_level: Option<i32>,
    pub liability_coverage: Option<String>,
    pub liquor_liability: Option<bool>,
    pub event: Option<EventDetails>,
    pub policy_holder: Option<PolicyHolderDetails>,
}

impl QuoteUpdate {
    /// Whether the update touches any premium input.
    pub fn affects_premiums(&self) -> bool {
        self.coverage_level.is_some()
            || self.liability_coverage.is_some()
            || self.liquor_liability.is_some()
            || self
                .event
                .as_ref()
                .map_or(false, |event| event.max_guests.is_some())
    }

    /// Applies the update to `quote`, recomputing premiums when an input
    /// changed. Returns whether premiums were recomputed.
    pub fn apply_to(self, quote: &mut Quote) -> Result<bool> {
        let recalculate = self.affects_premiums();

        if let Some(status) = self.status {
            quote.validate_transition(status)?;
            quote.status = status;
        }
        if let Some(email) = self.email {
            let email = email.trim().to_string();
            if email.is_empty() {
                return Err(ValidationError::MissingField("email".to_string()).into());
            }
            quote.email = email;
        }
        if let Some(level) = self.coverage_level {
            quote.coverage_level = Some(level);
        }
        if let Some(liability) = self.liability_coverage {
            quote.liability_coverage = Some(liability);
        }
        if let Some(liquor) = self.liquor_liability {
            quote.liquor_liability = liquor;
        }
        if let Some(event) = self.event {
            match quote.event.as_mut() {
                Some(existing) => existing.merge(event),
                None => quote.event = Some(event),
            }
        }
        if let Some(holder) = self.policy_holder {
            match quote.policy_holder.as_mut() {
                Some(existing) => existing.merge(holder),
                None => quote.policy_holder = Some(holder),
            }
        }

        if recalculate {
            quote.recalculate_premiums();
        }
        Ok(recalculate)
    }
}

/// Filter used when listing quotes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuoteLookup {
    ByNumber(String),
    ById(String),
    ByEmail(String),
    All,
}

/// Result of creating a quote, with the policy when it was converted
/// straight away.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteCreation {
    pub quote: Quote,
    pub policy: Option<crate::policies::Policy>,
}

impl QuoteCreation {
    pub fn converted(&self) -> bool {
        self.policy.is_some()
    }
}
