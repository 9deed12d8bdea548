//! Payments module - payment records, gateway abstraction, and the service
//! that turns successful payments into policies.

mod payments_model;
mod payments_service;
mod payments_traits;


pub use payments_model::{
    CardDetails, GatewayCharge, GatewayChargeRequest, GatewayPayment, ManualPayment, NewPayment,
    Payment, PaymentFilter, PaymentReceipt, PaymentStatus,
};
pub use payments_service::PaymentService;
pub use payments_traits::{PaymentGateway, PaymentRepositoryTrait, PaymentServiceTrait};
