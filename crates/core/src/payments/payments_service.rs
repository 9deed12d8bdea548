use log::{debug, info, warn};
use rust_decimal::Decimal;
use std::sync::Arc;

use super::payments_model::{
    GatewayChargeRequest, GatewayPayment, ManualPayment, NewPayment, Payment, PaymentFilter,
    PaymentReceipt, PaymentStatus,
};
use super::payments_traits::{PaymentGateway, PaymentRepositoryTrait, PaymentServiceTrait};
use crate::constants::{DEFAULT_MANUAL_PAYMENT_METHOD, GATEWAY_PAYMENT_METHOD};
use crate::errors::{Error, Result, ValidationError};
use crate::events::{DomainEvent, DomainEventSink};
use crate::policies::{PolicyNumberStrategy, PolicyServiceTrait};
use crate::quotes::{Quote, QuoteRepositoryTrait};

/// Service for recording payments and converting paid quotes.
pub struct PaymentService {
    repository: Arc<dyn PaymentRepositoryTrait>,
    quote_repository: Arc<dyn QuoteRepositoryTrait>,
    policy_service: Arc<dyn PolicyServiceTrait>,
    gateway: Arc<dyn PaymentGateway>,
    event_sink: Arc<dyn DomainEventSink>,
}

impl PaymentService {
    pub fn new(
        repository: Arc<dyn PaymentRepositoryTrait>,
        quote_repository: Arc<dyn QuoteRepositoryTrait>,
        policy_service: Arc<dyn PolicyServiceTrait>,
        gateway: Arc<dyn PaymentGateway>,
        event_sink: Arc<dyn DomainEventSink>,
    ) -> Self {
        Self {
            repository,
            quote_repository,
            policy_service,
            gateway,
            event_sink,
        }
    }

    fn resolve_quote(&self, payment: &ManualPayment) -> Result<Option<Quote>> {
        if let Some(number) = payment.quote_number.as_deref() {
            return self.quote_repository.get_by_number(number).map(Some);
        }
        if let Some(id) = payment.quote_id.as_deref() {
            return self.quote_repository.get_by_id(id).map(Some);
        }
        Ok(None)
    }

    /// Converts the quote and writes the payment in one transaction.
    async fn convert_with(
        &self,
        quote: &Quote,
        strategy: PolicyNumberStrategy,
        payment: NewPayment,
    ) -> Result<PaymentReceipt> {
        let outcome = self
            .policy_service
            .convert_quote_with_payment(&quote.id, strategy, Some(payment))
            .await?;

        let payment = outcome.payment.ok_or_else(|| {
            Error::Unexpected(format!(
                "Conversion of quote {} did not record the payment",
                quote.quote_number
            ))
        })?;

        Ok(PaymentReceipt {
            payment,
            policy: Some(outcome.policy),
            converted: outcome.created,
        })
    }
}

#[async_trait::async_trait]
impl PaymentServiceTrait for PaymentService {
    async fn record_payment(&self, payment: ManualPayment) -> Result<PaymentReceipt> {
        let amount = payment
            .amount
            .ok_or_else(|| ValidationError::MissingField("amount".to_string()))?;
        let status = payment
            .status
            .ok_or_else(|| ValidationError::MissingField("status".to_string()))?;

        let quote = self.resolve_quote(&payment)?;
        if quote.is_none() && payment.policy_id.is_none() {
            return Err(Error::invalid_input(
                "A payment needs a quoteNumber, quoteId, or policyId",
            ));
        }
        if amount < Decimal::ZERO {
            return Err(Error::invalid_input("Payment amount cannot be negative"));
        }

        let new_payment = NewPayment {
            status,
            quote_id: quote.as_ref().map(|q| q.id.clone()),
            policy_id: payment.policy_id.clone(),
            amount,
            method: payment
                .method
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_MANUAL_PAYMENT_METHOD.to_string()),
            reference: payment.reference,
        };

        if let (PaymentStatus::Success, Some(quote)) = (status, quote.as_ref()) {
            debug!("Successful payment for quote {}, converting", quote.quote_number);
            return self
                .convert_with(quote, PolicyNumberStrategy::Random, new_payment)
                .await;
        }

        let recorded = self.repository.create(new_payment).await?;
        info!(
            "Recorded {} payment {} of {}",
            recorded.status.as_str(),
            recorded.id,
            recorded.amount
        );
        self.event_sink
            .emit(DomainEvent::payment_recorded(&recorded));
        Ok(PaymentReceipt {
            payment: recorded,
            policy: None,
            converted: false,
        })
    }

    async fn charge_card(&self, payment: GatewayPayment) -> Result<PaymentReceipt> {
        let quote = self.quote_repository.get_by_number(&payment.quote_number)?;
        if quote.total_premium <= Decimal::ZERO {
            return Err(Error::invalid_input(format!(
                "Quote {} has no premium to charge",
                quote.quote_number
            )));
        }
        if quote.converted_to_policy {
            return Err(Error::invalid_input(format!(
                "Quote {} has already been converted to a policy",
                quote.quote_number
            )));
        }
        let already_paid = self
            .repository
            .list(&PaymentFilter {
                quote_id: Some(quote.id.clone()),
                policy_id: None,
            })?
            .iter()
            .any(|p| p.status == PaymentStatus::Success);
        if already_paid {
            return Err(Error::invalid_input(format!(
                "Quote {} already has a successful payment",
                quote.quote_number
            )));
        }

        let holder = quote.policy_holder.clone().unwrap_or_default();
        let request = GatewayChargeRequest {
            amount: quote.total_premium,
            invoice_number: quote.quote_number.clone(),
            description: format!("Event insurance quote {}", quote.quote_number),
            customer_email: quote.email.clone(),
            card: payment.card,
            first_name: payment.first_name.or(holder.first_name),
            last_name: payment.last_name.or(holder.last_name),
            zip: payment.zip.or(holder.zip),
        };

        let charge = self.gateway.charge(request).await?;
        info!(
            "Gateway approved transaction {} for quote {}",
            charge.transaction_id, quote.quote_number
        );

        let new_payment = NewPayment::success_for_quote(
            &quote.id,
            quote.total_premium,
            GATEWAY_PAYMENT_METHOD,
            Some(charge.transaction_id),
        );
        let converted = match self
            .convert_with(&quote, PolicyNumberStrategy::FromQuoteNumber, new_payment.clone())
            .await
        {
            Err(Error::Conflict(message)) => {
                warn!(
                    "{}; converting quote {} with a random policy number",
                    message, quote.quote_number
                );
                self.convert_with(&quote, PolicyNumberStrategy::Random, new_payment.clone())
                    .await
            }
            other => other,
        };

        match converted {
            Ok(receipt) => Ok(receipt),
            Err(err) => {
                // The card is charged: keep the payment so the quote can be
                // converted later.
                warn!(
                    "Conversion of paid quote {} failed: {}",
                    quote.quote_number, err
                );
                let recorded = self.repository.create(new_payment).await?;
                self.event_sink
                    .emit(DomainEvent::payment_recorded(&recorded));
                Ok(PaymentReceipt {
                    payment: recorded,
                    policy: None,
                    converted: false,
                })
            }
        }
    }

    fn list_payments(&self, filter: &PaymentFilter) -> Result<Vec<Payment>> {
        self.repository.list(filter)
    }
}
