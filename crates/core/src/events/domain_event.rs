//! Domain event types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::payments::{Payment, PaymentStatus};
use crate::quotes::QuoteSource;

/// Domain events emitted by core services after successful mutations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    QuoteCreated {
        quote_id: String,
        quote_number: String,
        source: QuoteSource,
        email: String,
    },

    QuoteUpdated {
        quote_id: String,
        quote_number: String,
        /// Whether the update recomputed premiums.
        premiums_recalculated: bool,
    },

    QuoteDeleted { quote_number: String },

    QuotesExpired { count: usize },

    /// A quote was converted into a new policy.
    PolicyConverted {
        policy_id: String,
        policy_number: String,
        quote_id: String,
    },

    /// A policy was created without a quote.
    PolicyCreated {
        policy_id: String,
        policy_number: String,
    },

    PolicyUpdated {
        policy_id: String,
        version_id: String,
        pruned_versions: usize,
    },

    PolicyDeleted { policy_id: String },

    PaymentRecorded {
        payment_id: String,
        quote_id: Option<String>,
        policy_id: Option<String>,
        status: PaymentStatus,
        amount: Decimal,
        method: String,
    },
}

impl DomainEvent {
    pub fn quote_created(
        quote_id: String,
        quote_number: String,
        source: QuoteSource,
        email: String,
    ) -> Self {
        Self::QuoteCreated {
            quote_id,
            quote_number,
            source,
            email,
        }
    }

    pub fn quote_updated(quote_id: String, quote_number: String, premiums_recalculated: bool) -> Self {
        Self::QuoteUpdated {
            quote_id,
            quote_number,
            premiums_recalculated,
        }
    }

    pub fn quote_deleted(quote_number: String) -> Self {
        Self::QuoteDeleted { quote_number }
    }

    pub fn quotes_expired(count: usize) -> Self {
        Self::QuotesExpired { count }
    }

    pub fn policy_converted(policy_id: String, policy_number: String, quote_id: String) -> Self {
        Self::PolicyConverted {
            policy_id,
            policy_number,
            quote_id,
        }
    }

    pub fn policy_created(policy_id: String, policy_number: String) -> Self {
        Self::PolicyCreated {
            policy_id,
            policy_number,
        }
    }

    pub fn policy_updated(policy_id: String, version_id: String, pruned_versions: usize) -> Self {
        Self::PolicyUpdated {
            policy_id,
            version_id,
            pruned_versions,
        }
    }

    pub fn policy_deleted(policy_id: String) -> Self {
        Self::PolicyDeleted { policy_id }
    }

    pub fn payment_recorded(payment: &Payment) -> Self {
        Self::PaymentRecorded {
            payment_id: payment.id.clone(),
            quote_id: payment.quote_id.clone(),
            policy_id: payment.policy_id.clone(),
            status: payment.status,
            amount: payment.amount,
            method: payment.method.clone(),
        }
    }

    /// Short action name recorded in the event log.
    pub fn action(&self) -> &'static str {
        match self {
            DomainEvent::QuoteCreated { .. } => "quote_created",
            DomainEvent::QuoteUpdated { .. } => "quote_updated",
            DomainEvent::QuoteDeleted { .. } => "quote_deleted",
            DomainEvent::QuotesExpired { .. } => "quotes_expired",
            DomainEvent::PolicyConverted { .. } => "policy_converted",
            DomainEvent::PolicyCreated { .. } => "policy_created",
            DomainEvent::PolicyUpdated { .. } => "policy_updated",
            DomainEvent::PolicyDeleted { .. } => "policy_deleted",
            DomainEvent::PaymentRecorded { .. } => "payment_recorded",
        }
    }

    /// Human-readable summary recorded in the event log.
    pub fn message(&self) -> String {
        match self {
            DomainEvent::QuoteCreated {
                quote_number,
                source,
                ..
            } => format!("Quote {} created ({})", quote_number, source.as_str()),
            DomainEvent::QuoteUpdated { quote_number, .. } => {
                format!("Quote {} updated", quote_number)
            }
            DomainEvent::QuoteDeleted { quote_number } => {
                format!("Quote {} deleted", quote_number)
            }
            DomainEvent::QuotesExpired { count } => format!("{} quote(s) expired", count),
            DomainEvent::PolicyConverted { policy_number, .. } => {
                format!("Quote converted to policy {}", policy_number)
            }
            DomainEvent::PolicyCreated { policy_number, .. } => {
                format!("Policy {} created", policy_number)
            }
            DomainEvent::PolicyUpdated {
                policy_id,
                pruned_versions,
                ..
            } => format!(
                "Policy {} updated, {} old version(s) pruned",
                policy_id, pruned_versions
            ),
            DomainEvent::PolicyDeleted { policy_id } => format!("Policy {} deleted", policy_id),
            DomainEvent::PaymentRecorded {
                amount,
                status,
                method,
                ..
            } => format!(
                "Payment of {} recorded via {} ({})",
                amount,
                method,
                status.as_str()
            ),
        }
    }

    /// Email of the customer the event concerns, when known.
    pub fn user_email(&self) -> Option<&str> {
        match self {
            DomainEvent::QuoteCreated { email, .. } => Some(email.as_str()),
            _ => None,
        }
    }
}
