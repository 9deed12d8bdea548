//! Database model for payments.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use eventcover_core::payments::{NewPayment, Payment};

use crate::utils::{parse_decimal, parse_enum};

#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::payments)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PaymentDB {
    pub id: String,
    pub status: String,
    pub quote_id: Option<String>,
    pub policy_id: Option<String>,
    pub amount: String,
    pub method: String,
    pub reference: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl PaymentDB {
    pub fn new(id: String, payment: NewPayment, timestamp: NaiveDateTime) -> Self {
        Self {
            id,
            status: payment.status.as_str().to_string(),
            quote_id: payment.quote_id,
            policy_id: payment.policy_id,
            amount: payment.amount.to_string(),
            method: payment.method,
            reference: payment.reference,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }
}

impl From<PaymentDB> for Payment {
    fn from(db: PaymentDB) -> Self {
        Self {
            status: parse_enum(&db.status, "payment status"),
            amount: parse_decimal(&db.amount, "amount"),
            id: db.id,
            quote_id: db.quote_id,
            policy_id: db.policy_id,
            method: db.method,
            reference: db.reference,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}
