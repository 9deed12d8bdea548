use async_trait::async_trait;
use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;
use std::sync::Arc;

use eventcover_core::errors::{Error, Result};
use eventcover_core::policies::PolicyVersion;
use eventcover_core::quotes::{Quote, QuoteRecord, QuoteRepositoryTrait, QuoteStatus};

use super::model::{QuoteChangesDB, QuoteDB, UserDB};
use crate::db::{get_connection, WriteHandle};
use crate::details::{
    load_event, load_policy_holder, replace_event, replace_policy_holder, DetailsOwner,
};
use crate::errors::IntoCore;
use crate::policies::PolicyVersionDB;
use crate::schema::{policies, policy_versions, quotes, users};
use crate::utils::{new_id, now};

/// Attaches event and policy holder details to a quote row.
pub(crate) fn load_quote(conn: &mut SqliteConnection, row: QuoteDB) -> QueryResult<Quote> {
    let event = load_event(conn, DetailsOwner::Quote(&row.id))?;
    let policy_holder = load_policy_holder(conn, DetailsOwner::Quote(&row.id))?;
    Ok(row.into_domain(event, policy_holder))
}

fn load_quote_by_id(
    conn: &mut SqliteConnection,
    quote_id: &str,
) -> QueryResult<Option<Quote>> {
    let row = quotes::table
        .find(quote_id)
        .select(QuoteDB::as_select())
        .first(conn)
        .optional()?;
    row.map(|row| load_quote(conn, row)).transpose()
}

/// Returns the id of the user owning `email`, creating the user if needed.
fn user_id_for_email(
    conn: &mut SqliteConnection,
    email: &str,
    timestamp: NaiveDateTime,
) -> QueryResult<String> {
    let existing = users::table
        .filter(users::email.eq(email))
        .select(users::id)
        .first::<String>(conn)
        .optional()?;
    if let Some(user_id) = existing {
        return Ok(user_id);
    }

    let user = UserDB {
        id: new_id(),
        email: email.to_string(),
        created_at: timestamp,
        updated_at: timestamp,
    };
    diesel::insert_into(users::table)
        .values(&user)
        .execute(conn)?;
    Ok(user.id)
}

/// Writes the full state of `quote` and its details. Returns the stored quote.
///
/// `quote.updated_at` must match the stored row, otherwise the write is a
/// `Conflict`: a stale copy never overwrites a conversion or an expiry.
pub(crate) fn write_quote(
    conn: &mut SqliteConnection,
    quote: Quote,
    timestamp: NaiveDateTime,
) -> Result<Quote> {
    let stored = quotes::table
        .find(quote.id.as_str())
        .select((quotes::updated_at, quotes::converted_to_policy))
        .first::<(NaiveDateTime, bool)>(conn)
        .optional()
        .into_core()?;
    let (stored_updated_at, converted_to_policy) =
        stored.ok_or_else(|| Error::NotFound(format!("Quote {}", quote.id)))?;
    if stored_updated_at != quote.updated_at {
        return Err(Error::Conflict(format!(
            "Quote {} was modified concurrently",
            quote.quote_number
        )));
    }

    let user_id = user_id_for_email(conn, &quote.email, timestamp).into_core()?;
    let changes = QuoteChangesDB::new(&quote, user_id.clone(), timestamp);

    diesel::update(quotes::table.find(quote.id.as_str()))
        .set(&changes)
        .execute(conn)
        .into_core()?;

    let owner = DetailsOwner::Quote(&quote.id);
    replace_event(conn, owner, quote.event.as_ref()).into_core()?;
    replace_policy_holder(conn, owner, quote.policy_holder.as_ref()).into_core()?;

    Ok(Quote {
        user_id,
        converted_to_policy,
        updated_at: timestamp,
        ..quote
    })
}

pub struct QuoteRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl QuoteRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        QuoteRepository { pool, writer }
    }

    fn load_all(&self, rows: Vec<QuoteDB>) -> Result<Vec<Quote>> {
        let mut conn = get_connection(&self.pool)?;
        rows.into_iter()
            .map(|row| load_quote(&mut conn, row).into_core())
            .collect()
    }
}

#[async_trait]
impl QuoteRepositoryTrait for QuoteRepository {
    async fn create(&self, record: QuoteRecord) -> Result<Quote> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Quote> {
                let timestamp = now();
                let user_id = user_id_for_email(conn, &record.email, timestamp).into_core()?;
                let row = QuoteDB::from_record(new_id(), user_id, &record, timestamp);

                diesel::insert_into(quotes::table)
                    .values(&row)
                    .execute(conn)
                    .into_core()?;

                let owner = DetailsOwner::Quote(&row.id);
                replace_event(conn, owner, record.event.as_ref()).into_core()?;
                replace_policy_holder(conn, owner, record.policy_holder.as_ref()).into_core()?;

                Ok(row.into_domain(record.event, record.policy_holder))
            })
            .await
    }

    async fn save(&self, quote: Quote) -> Result<Quote> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Quote> {
                write_quote(conn, quote, now())
            })
            .await
    }

    async fn delete_by_number(&self, quote_number: &str) -> Result<Vec<PolicyVersion>> {
        let quote_number = quote_number.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Vec<PolicyVersion>> {
                let quote_id = quotes::table
                    .filter(quotes::quote_number.eq(&quote_number))
                    .select(quotes::id)
                    .first::<String>(conn)
                    .optional()
                    .into_core()?
                    .ok_or_else(|| Error::NotFound(format!("Quote {}", quote_number)))?;

                let removed = policy_versions::table
                    .inner_join(policies::table)
                    .filter(policies::quote_id.eq(&quote_id))
                    .select(PolicyVersionDB::as_select())
                    .load::<PolicyVersionDB>(conn)
                    .into_core()?;

                // Policy, payments, versions, and details go with it.
                diesel::delete(quotes::table.find(quote_id.as_str()))
                    .execute(conn)
                    .into_core()?;

                Ok(removed.into_iter().map(PolicyVersion::from).collect())
            })
            .await
    }

    async fn expire_created_before(&self, cutoff: NaiveDateTime) -> Result<usize> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                diesel::update(
                    quotes::table
                        .filter(quotes::converted_to_policy.eq(false))
                        .filter(quotes::status.ne(QuoteStatus::Expired.as_str()))
                        .filter(quotes::created_at.lt(cutoff)),
                )
                .set((
                    quotes::status.eq(QuoteStatus::Expired.as_str()),
                    quotes::updated_at.eq(now()),
                ))
                .execute(conn)
                .into_core()
            })
            .await
    }

    fn get_by_id(&self, quote_id: &str) -> Result<Quote> {
        let mut conn = get_connection(&self.pool)?;
        load_quote_by_id(&mut conn, quote_id)
            .into_core()?
            .ok_or_else(|| Error::NotFound(format!("Quote {}", quote_id)))
    }

    fn get_by_number(&self, quote_number: &str) -> Result<Quote> {
        let mut conn = get_connection(&self.pool)?;
        let row = quotes::table
            .filter(quotes::quote_number.eq(quote_number))
            .select(QuoteDB::as_select())
            .first(&mut conn)
            .optional()
            .into_core()?
            .ok_or_else(|| Error::NotFound(format!("Quote {}", quote_number)))?;
        load_quote(&mut conn, row).into_core()
    }

    fn list_by_email(&self, email: &str) -> Result<Vec<Quote>> {
        let rows = {
            let mut conn = get_connection(&self.pool)?;
            quotes::table
                .filter(quotes::email.eq(email))
                .order(quotes::created_at.desc())
                .select(QuoteDB::as_select())
                .load::<QuoteDB>(&mut conn)
                .into_core()?
        };
        self.load_all(rows)
    }

    fn list(&self) -> Result<Vec<Quote>> {
        let rows = {
            let mut conn = get_connection(&self.pool)?;
            quotes::table
                .order(quotes::created_at.desc())
                .select(QuoteDB::as_select())
                .load::<QuoteDB>(&mut conn)
                .into_core()?
        };
        self.load_all(rows)
    }
}
