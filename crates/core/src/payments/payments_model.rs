//! Payment domain models.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::policies::Policy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Success,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Success => "SUCCESS",
            PaymentStatus::Failed => "FAILED",
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(PaymentStatus::Pending),
            "SUCCESS" => Ok(PaymentStatus::Success),
            "FAILED" => Ok(PaymentStatus::Failed),
            _ => Err(format!("Unknown payment status: {}", s)),
        }
    }
}

/// Domain model representing a payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: String,
    pub status: PaymentStatus,
    pub quote_id: Option<String>,
    pub policy_id: Option<String>,
    pub amount: Decimal,
    pub method: String,
    pub reference: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input model for inserting a payment.
///
/// When handed to a conversion, `policy_id` is filled in with the policy the
/// conversion produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPayment {
    pub status: PaymentStatus,
    pub quote_id: Option<String>,
    pub policy_id: Option<String>,
    pub amount: Decimal,
    pub method: String,
    pub reference: Option<String>,
}

impl NewPayment {
    /// A settled payment for a quote.
    pub fn success_for_quote(
        quote_id: &str,
        amount: Decimal,
        method: impl Into<String>,
        reference: Option<String>,
    ) -> Self {
        Self {
            status: PaymentStatus::Success,
            quote_id: Some(quote_id.to_string()),
            policy_id: None,
            amount,
            method: method.into(),
            reference,
        }
    }
}

/// Manually entered payment.
///
/// `amount` and `status` are required. They are optional here so a missing
/// value is reported as a validation error rather than a body rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualPayment {
    pub quote_number: Option<String>,
    pub quote_id: Option<String>,
    pub policy_id: Option<String>,
    pub amount: Option<Decimal>,
    pub method: Option<String>,
    pub status: Option<PaymentStatus>,
    pub reference: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDetails {
    pub card_number: String,
    /// `YYYY-MM` or `MMYY`, passed through to the gateway.
    pub expiration_date: String,
    pub card_code: Option<String>,
}

/// Card payment for a quote, charged through the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayPayment {
    pub quote_number: String,
    pub card: CardDetails,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub zip: Option<String>,
}

/// Request sent to the payment gateway.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayChargeRequest {
    pub amount: Decimal,
    pub invoice_number: String,
    pub description: String,
    pub customer_email: String,
    pub card: CardDetails,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub zip: Option<String>,
}

/// Approved gateway transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayCharge {
    pub transaction_id: String,
    pub auth_code: Option<String>,
    pub message: Option<String>,
}

/// Result of recording a payment.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReceipt {
    pub payment: Payment,
    pub policy: Option<Policy>,
    /// True when this payment created the policy.
    pub converted: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentFilter {
    pub quote_id: Option<String>,
    pub policy_id: Option<String>,
}
