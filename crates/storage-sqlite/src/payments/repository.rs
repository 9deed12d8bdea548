use async_trait::async_trait;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;
use std::sync::Arc;

use eventcover_core::errors::{Error, Result};
use eventcover_core::payments::{NewPayment, Payment, PaymentFilter, PaymentRepositoryTrait};

use super::model::PaymentDB;
use crate::db::{get_connection, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::payments;
use crate::utils::{new_id, now};

/// Inserts a payment on the caller's connection.
pub(crate) fn insert_payment(conn: &mut SqliteConnection, payment: NewPayment) -> Result<Payment> {
    let row = PaymentDB::new(new_id(), payment, now());
    diesel::insert_into(payments::table)
        .values(&row)
        .execute(conn)
        .into_core()?;
    Ok(Payment::from(row))
}

pub struct PaymentRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl PaymentRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        PaymentRepository { pool, writer }
    }
}

#[async_trait]
impl PaymentRepositoryTrait for PaymentRepository {
    async fn create(&self, new_payment: NewPayment) -> Result<Payment> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Payment> {
                insert_payment(conn, new_payment)
            })
            .await
    }

    fn get_by_id(&self, payment_id: &str) -> Result<Payment> {
        let mut conn = get_connection(&self.pool)?;
        payments::table
            .find(payment_id)
            .select(PaymentDB::as_select())
            .first(&mut conn)
            .optional()
            .into_core()?
            .map(Payment::from)
            .ok_or_else(|| Error::NotFound(format!("Payment {}", payment_id)))
    }

    fn list(&self, filter: &PaymentFilter) -> Result<Vec<Payment>> {
        let mut conn = get_connection(&self.pool)?;
        let mut query = payments::table.select(PaymentDB::as_select()).into_boxed();
        if let Some(quote_id) = filter.quote_id.as_deref() {
            query = query.filter(payments::quote_id.eq(quote_id));
        }
        if let Some(policy_id) = filter.policy_id.as_deref() {
            query = query.filter(payments::policy_id.eq(policy_id));
        }
        let rows = query
            .order((payments::created_at.desc(), payments::id.desc()))
            .load::<PaymentDB>(&mut conn)
            .into_core()?;
        Ok(rows.into_iter().map(Payment::from).collect())
    }
}
