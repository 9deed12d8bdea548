use async_trait::async_trait;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;
use log::debug;
use std::sync::Arc;

use eventcover_core::errors::{Error, Result};
use eventcover_core::payments::NewPayment;
use eventcover_core::policies::{
    ConversionOutcome, Policy, PolicyRecord, PolicyRepositoryTrait, PolicyVersion,
    VersionedPolicyWrite, VersionedUpdateOutcome,
};

use super::model::{PolicyDB, PolicyVersionDB};
use crate::db::{get_connection, WriteHandle};
use crate::details::{
    load_event, load_policy_holder, replace_event, replace_policy_holder, DetailsOwner,
};
use crate::errors::IntoCore;
use crate::payments::insert_payment;
use crate::quotes::write_quote;
use crate::schema::{policies, policy_versions, quotes};
use crate::utils::{new_id, now};

fn load_policy(conn: &mut SqliteConnection, row: PolicyDB) -> QueryResult<Policy> {
    let event = load_event(conn, DetailsOwner::Policy(&row.id))?;
    let policy_holder = load_policy_holder(conn, DetailsOwner::Policy(&row.id))?;
    Ok(row.into_domain(event, policy_holder))
}

fn find_policy_row(conn: &mut SqliteConnection, policy_id: &str) -> Result<PolicyDB> {
    policies::table
        .find(policy_id)
        .select(PolicyDB::as_select())
        .first(conn)
        .optional()
        .into_core()?
        .ok_or_else(|| Error::NotFound(format!("Policy {}", policy_id)))
}

fn versions_of(conn: &mut SqliteConnection, policy_id: &str) -> QueryResult<Vec<PolicyVersionDB>> {
    policy_versions::table
        .filter(policy_versions::policy_id.eq(policy_id))
        .order((policy_versions::created_at.desc(), policy_versions::id.desc()))
        .select(PolicyVersionDB::as_select())
        .load::<PolicyVersionDB>(conn)
}

/// Deletes all but the newest `max_versions` versions of a policy.
fn prune_policy_versions(
    conn: &mut SqliteConnection,
    policy_id: &str,
    max_versions: usize,
) -> QueryResult<Vec<PolicyVersion>> {
    let doomed: Vec<PolicyVersionDB> = versions_of(conn, policy_id)?
        .into_iter()
        .skip(max_versions)
        .collect();
    if doomed.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<&str> = doomed.iter().map(|v| v.id.as_str()).collect();
    diesel::delete(policy_versions::table.filter(policy_versions::id.eq_any(ids)))
        .execute(conn)?;
    debug!(
        "Pruned {} version(s) of policy {}",
        doomed.len(),
        policy_id
    );
    Ok(doomed.into_iter().map(PolicyVersion::from).collect())
}

pub struct PolicyRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl PolicyRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        PolicyRepository { pool, writer }
    }
}

#[async_trait]
impl PolicyRepositoryTrait for PolicyRepository {
    async fn convert_quote(
        &self,
        quote_id: &str,
        policy_number: String,
        payment: Option<NewPayment>,
    ) -> Result<ConversionOutcome> {
        let quote_id = quote_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<ConversionOutcome> {
                let quote_exists = quotes::table
                    .find(quote_id.as_str())
                    .select(quotes::id)
                    .first::<String>(conn)
                    .optional()
                    .into_core()?
                    .is_some();
                if !quote_exists {
                    return Err(Error::NotFound(format!("Quote {}", quote_id)));
                }

                let existing = policies::table
                    .filter(policies::quote_id.eq(&quote_id))
                    .select(PolicyDB::as_select())
                    .first(conn)
                    .optional()
                    .into_core()?;

                let (policy, created) = match existing {
                    Some(row) => (load_policy(conn, row).into_core()?, false),
                    None => {
                        let timestamp = now();
                        let row = PolicyDB {
                            id: new_id(),
                            policy_number,
                            quote_id: Some(quote_id.clone()),
                            pdf_url: None,
                            created_at: timestamp,
                            updated_at: timestamp,
                        };
                        diesel::insert_into(policies::table)
                            .values(&row)
                            .execute(conn)
                            .into_core()?;
                        diesel::update(quotes::table.find(quote_id.as_str()))
                            .set((
                                quotes::converted_to_policy.eq(true),
                                quotes::updated_at.eq(timestamp),
                            ))
                            .execute(conn)
                            .into_core()?;
                        (row.into_domain(None, None), true)
                    }
                };

                let payment = payment
                    .map(|p| {
                        insert_payment(
                            conn,
                            NewPayment {
                                policy_id: Some(policy.id.clone()),
                                ..p
                            },
                        )
                    })
                    .transpose()?;

                Ok(ConversionOutcome {
                    policy,
                    created,
                    payment,
                })
            })
            .await
    }

    async fn create(&self, record: PolicyRecord) -> Result<Policy> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Policy> {
                let timestamp = now();
                let row = PolicyDB {
                    id: new_id(),
                    policy_number: record.policy_number,
                    quote_id: None,
                    pdf_url: record.pdf_url,
                    created_at: timestamp,
                    updated_at: timestamp,
                };
                diesel::insert_into(policies::table)
                    .values(&row)
                    .execute(conn)
                    .into_core()?;

                let owner = DetailsOwner::Policy(&row.id);
                replace_event(conn, owner, record.event.as_ref()).into_core()?;
                replace_policy_holder(conn, owner, record.policy_holder.as_ref()).into_core()?;

                Ok(row.into_domain(record.event, record.policy_holder))
            })
            .await
    }

    async fn update_with_version(
        &self,
        write: VersionedPolicyWrite,
    ) -> Result<VersionedUpdateOutcome> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<VersionedUpdateOutcome> {
                let current = find_policy_row(conn, &write.policy_id)?;
                if current.updated_at != write.expected_updated_at {
                    return Err(Error::Conflict(format!(
                        "Policy {} was modified concurrently",
                        write.policy_id
                    )));
                }

                if let (Some(quote), Some(expected)) =
                    (write.quote.as_ref(), write.expected_quote_updated_at)
                {
                    let stored = quotes::table
                        .find(quote.id.as_str())
                        .select(quotes::updated_at)
                        .first::<chrono::NaiveDateTime>(conn)
                        .optional()
                        .into_core()?;
                    if stored != Some(expected) {
                        return Err(Error::Conflict(format!(
                            "Quote {} was modified concurrently",
                            quote.quote_number
                        )));
                    }
                }

                let version = PolicyVersionDB::new(new_id(), write.version);
                diesel::insert_into(policy_versions::table)
                    .values(&version)
                    .execute(conn)
                    .into_core()?;

                let timestamp = now();
                if let Some(quote) = write.quote {
                    write_quote(conn, quote, timestamp)?;
                }

                diesel::update(policies::table.find(write.policy_id.as_str()))
                    .set((
                        policies::pdf_url.eq(write.pdf_url.as_deref()),
                        policies::updated_at.eq(timestamp),
                    ))
                    .execute(conn)
                    .into_core()?;
                let owner = DetailsOwner::Policy(&write.policy_id);
                replace_event(conn, owner, write.event.as_ref()).into_core()?;
                replace_policy_holder(conn, owner, write.policy_holder.as_ref()).into_core()?;

                let pruned = prune_policy_versions(conn, &write.policy_id, write.max_versions)
                    .into_core()?;

                let row = find_policy_row(conn, &write.policy_id)?;
                let policy = load_policy(conn, row).into_core()?;

                Ok(VersionedUpdateOutcome {
                    policy,
                    version: PolicyVersion::from(version),
                    pruned,
                })
            })
            .await
    }

    async fn delete(&self, policy_id: &str) -> Result<Vec<PolicyVersion>> {
        let policy_id = policy_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Vec<PolicyVersion>> {
                let row = find_policy_row(conn, &policy_id)?;
                let removed = versions_of(conn, &policy_id).into_core()?;

                if let Some(quote_id) = row.quote_id.as_deref() {
                    diesel::update(quotes::table.find(quote_id))
                        .set((
                            quotes::converted_to_policy.eq(false),
                            quotes::updated_at.eq(now()),
                        ))
                        .execute(conn)
                        .into_core()?;
                }

                // Payments, versions, and details follow the policy row.
                diesel::delete(policies::table.find(policy_id.as_str()))
                    .execute(conn)
                    .into_core()?;

                Ok(removed.into_iter().map(PolicyVersion::from).collect())
            })
            .await
    }

    async fn prune_versions(&self, max_versions: usize) -> Result<Vec<PolicyVersion>> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Vec<PolicyVersion>> {
                let policy_ids = policy_versions::table
                    .select(policy_versions::policy_id)
                    .distinct()
                    .load::<String>(conn)
                    .into_core()?;

                let mut pruned = Vec::new();
                for policy_id in policy_ids {
                    pruned.extend(
                        prune_policy_versions(conn, &policy_id, max_versions).into_core()?,
                    );
                }
                Ok(pruned)
            })
            .await
    }

    fn get_by_id(&self, policy_id: &str) -> Result<Policy> {
        let mut conn = get_connection(&self.pool)?;
        let row = find_policy_row(&mut conn, policy_id)?;
        load_policy(&mut conn, row).into_core()
    }

    fn get_by_number(&self, policy_number: &str) -> Result<Policy> {
        let mut conn = get_connection(&self.pool)?;
        let row = policies::table
            .filter(policies::policy_number.eq(policy_number))
            .select(PolicyDB::as_select())
            .first(&mut conn)
            .optional()
            .into_core()?
            .ok_or_else(|| Error::NotFound(format!("Policy {}", policy_number)))?;
        load_policy(&mut conn, row).into_core()
    }

    fn find_by_quote_id(&self, quote_id: &str) -> Result<Option<Policy>> {
        let mut conn = get_connection(&self.pool)?;
        let row = policies::table
            .filter(policies::quote_id.eq(quote_id))
            .select(PolicyDB::as_select())
            .first(&mut conn)
            .optional()
            .into_core()?;
        row.map(|row| load_policy(&mut conn, row).into_core())
            .transpose()
    }

    fn list(&self) -> Result<Vec<Policy>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = policies::table
            .order(policies::created_at.desc())
            .select(PolicyDB::as_select())
            .load::<PolicyDB>(&mut conn)
            .into_core()?;
        rows.into_iter()
            .map(|row| load_policy(&mut conn, row).into_core())
            .collect()
    }

    fn list_versions(&self, policy_id: &str) -> Result<Vec<PolicyVersion>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = versions_of(&mut conn, policy_id).into_core()?;
        Ok(rows.into_iter().map(PolicyVersion::from).collect())
    }

    fn get_version(&self, policy_id: &str, version_id: &str) -> Result<PolicyVersion> {
        let mut conn = get_connection(&self.pool)?;
        policy_versions::table
            .filter(policy_versions::policy_id.eq(policy_id))
            .filter(policy_versions::id.eq(version_id))
            .select(PolicyVersionDB::as_select())
            .first(&mut conn)
            .optional()
            .into_core()?
            .map(PolicyVersion::from)
            .ok_or_else(|| Error::NotFound(format!("Version {} of policy {}", version_id, policy_id)))
    }
}
