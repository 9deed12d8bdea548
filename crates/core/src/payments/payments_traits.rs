//! Payment repository, gateway, and service traits.

use async_trait::async_trait;

use super::payments_model::{
    GatewayCharge, GatewayChargeRequest, GatewayPayment, ManualPayment, NewPayment, Payment,
    PaymentFilter, PaymentReceipt,
};
use crate::errors::Result;

#[async_trait]
pub trait PaymentRepositoryTrait: Send + Sync {
    async fn create(&self, new_payment: NewPayment) -> Result<Payment>;

    fn get_by_id(&self, payment_id: &str) -> Result<Payment>;

    /// Lists payments newest first, optionally narrowed to a quote or policy.
    fn list(&self, filter: &PaymentFilter) -> Result<Vec<Payment>>;
}

/// Card payment processor.
///
/// Declines and transport failures are both reported as
/// `Error::ExternalService` carrying the processor's message.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn charge(&self, request: GatewayChargeRequest) -> Result<GatewayCharge>;
}

#[async_trait]
pub trait PaymentServiceTrait: Send + Sync {
    /// Records a manual payment. A successful payment against a quote
    /// converts it to a policy.
    async fn record_payment(&self, payment: ManualPayment) -> Result<PaymentReceipt>;

    /// Charges a card for a quote's total premium and converts the quote on
    /// approval. Nothing is persisted when the gateway rejects the charge.
    ///
    /// Converted or already paid quotes are rejected before charging. An
    /// approved charge is always recorded, even when conversion fails.
    async fn charge_card(&self, payment: GatewayPayment) -> Result<PaymentReceipt>;

    fn list_payments(&self, filter: &PaymentFilter) -> Result<Vec<Payment>>;
}
