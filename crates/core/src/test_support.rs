//! In-memory repositories shared by the service tests.

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::documents::{DocumentStore, PolicyDocumentRenderer};
use crate::errors::{DatabaseError, Error, Result};
use crate::payments::{NewPayment, Payment, PaymentFilter, PaymentRepositoryTrait};
use crate::policies::{
    ConversionOutcome, Policy, PolicyRecord, PolicyRepositoryTrait, PolicySnapshot,
    PolicyVersion, VersionedPolicyWrite, VersionedUpdateOutcome,
};
use crate::quotes::{Quote, QuoteRecord, QuoteRepositoryTrait, QuoteStatus};

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn unique_violation(what: &str) -> Error {
    Error::Database(DatabaseError::UniqueViolation(what.to_string()))
}

#[derive(Default)]
struct MemoryState {
    quotes: Vec<Quote>,
    policies: Vec<Policy>,
    payments: Vec<Payment>,
    /// Insertion order is kept so equal timestamps still sort newest last.
    versions: Vec<PolicyVersion>,
    forced_quote_collisions: usize,
    forced_policy_collisions: usize,
    fail_versioned_writes: bool,
}

impl MemoryState {
    fn insert_payment(&mut self, new_payment: NewPayment) -> Payment {
        let timestamp = now();
        let payment = Payment {
            id: new_id(),
            status: new_payment.status,
            quote_id: new_payment.quote_id,
            policy_id: new_payment.policy_id,
            amount: new_payment.amount,
            method: new_payment.method,
            reference: new_payment.reference,
            created_at: timestamp,
            updated_at: timestamp,
        };
        self.payments.push(payment.clone());
        payment
    }

    /// Removes versions of `policy_id` beyond the newest `max_versions`.
    fn prune(&mut self, policy_id: &str, max_versions: usize) -> Vec<PolicyVersion> {
        let mut ranked: Vec<(usize, &PolicyVersion)> = self
            .versions
            .iter()
            .enumerate()
            .filter(|(_, v)| v.policy_id == policy_id)
            .collect();
        ranked.sort_by(|(ia, a), (ib, b)| b.created_at.cmp(&a.created_at).then(ib.cmp(ia)));

        let doomed: Vec<String> = ranked
            .iter()
            .skip(max_versions)
            .map(|(_, v)| v.id.clone())
            .collect();

        let (pruned, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.versions)
            .into_iter()
            .partition(|v| doomed.contains(&v.id));
        self.versions = kept;
        pruned
    }

    fn remove_policy(&mut self, policy_id: &str) -> Vec<PolicyVersion> {
        self.policies.retain(|p| p.id != policy_id);
        self.payments
            .retain(|p| p.policy_id.as_deref() != Some(policy_id));
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.versions)
            .into_iter()
            .partition(|v| v.policy_id == policy_id);
        self.versions = kept;
        removed
    }
}

/// In-memory stand-in for the quote, policy, and payment tables.
#[derive(Clone, Default)]
pub struct MemoryDb {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `count` quote inserts fail with a unique violation.
    pub fn force_quote_collisions(&self, count: usize) {
        self.state.lock().unwrap().forced_quote_collisions = count;
    }

    /// Makes the next `count` policy inserts fail with a unique violation.
    pub fn force_policy_collisions(&self, count: usize) {
        self.state.lock().unwrap().forced_policy_collisions = count;
    }

    pub fn fail_versioned_writes(&self, fail: bool) {
        self.state.lock().unwrap().fail_versioned_writes = fail;
    }

    pub fn quotes(&self) -> Vec<Quote> {
        self.state.lock().unwrap().quotes.clone()
    }

    pub fn policies(&self) -> Vec<Policy> {
        self.state.lock().unwrap().policies.clone()
    }

    pub fn payments(&self) -> Vec<Payment> {
        self.state.lock().unwrap().payments.clone()
    }

    pub fn versions(&self) -> Vec<PolicyVersion> {
        self.state.lock().unwrap().versions.clone()
    }

    pub fn insert_quote(&self, quote: Quote) {
        self.state.lock().unwrap().quotes.push(quote);
    }

    pub fn insert_version(&self, version: PolicyVersion) {
        self.state.lock().unwrap().versions.push(version);
    }

    /// Moves a quote's creation time, as if it had been created earlier.
    pub fn backdate_quote(&self, quote_id: &str, created_at: NaiveDateTime) {
        let mut state = self.state.lock().unwrap();
        if let Some(quote) = state.quotes.iter_mut().find(|q| q.id == quote_id) {
            quote.created_at = created_at;
        }
    }

    /// Touches a policy as if another writer had changed it.
    pub fn touch_policy(&self, policy_id: &str) {
        let mut state = self.state.lock().unwrap();
        if let Some(policy) = state.policies.iter_mut().find(|p| p.id == policy_id) {
            policy.updated_at += chrono::Duration::seconds(1);
        }
    }
}

#[async_trait]
impl QuoteRepositoryTrait for MemoryDb {
    async fn create(&self, record: QuoteRecord) -> Result<Quote> {
        let mut state = self.state.lock().unwrap();
        if state.forced_quote_collisions > 0 {
            state.forced_quote_collisions -= 1;
            return Err(unique_violation("quotes.quote_number"));
        }
        if state
            .quotes
            .iter()
            .any(|q| q.quote_number == record.quote_number)
        {
            return Err(unique_violation("quotes.quote_number"));
        }

        let timestamp = now();
        let quote = Quote {
            id: new_id(),
            quote_number: record.quote_number,
            status: record.status,
            source: record.source,
            converted_to_policy: false,
            user_id: format!("user-{}", record.email),
            email: record.email,
            coverage_level: record.coverage_level,
            liability_coverage: record.liability_coverage,
            liquor_liability: record.liquor_liability,
            base_premium: record.premiums.base_premium,
            liability_premium: record.premiums.liability_premium,
            liquor_liability_premium: record.premiums.liquor_liability_premium,
            total_premium: record.premiums.total_premium,
            event: record.event,
            policy_holder: record.policy_holder,
            created_at: timestamp,
            updated_at: timestamp,
        };
        state.quotes.push(quote.clone());
        Ok(quote)
    }

    async fn save(&self, quote: Quote) -> Result<Quote> {
        let mut state = self.state.lock().unwrap();
        let slot = state
            .quotes
            .iter_mut()
            .find(|q| q.id == quote.id)
            .ok_or_else(|| Error::NotFound(format!("Quote {}", quote.id)))?;
        if slot.updated_at != quote.updated_at {
            return Err(Error::Conflict(format!(
                "Quote {} was modified concurrently",
                quote.quote_number
            )));
        }
        *slot = Quote {
            converted_to_policy: slot.converted_to_policy,
            updated_at: now(),
            ..quote
        };
        Ok(slot.clone())
    }

    async fn delete_by_number(&self, quote_number: &str) -> Result<Vec<PolicyVersion>> {
        let mut state = self.state.lock().unwrap();
        let quote_id = state
            .quotes
            .iter()
            .find(|q| q.quote_number == quote_number)
            .map(|q| q.id.clone())
            .ok_or_else(|| Error::NotFound(format!("Quote {}", quote_number)))?;

        let policy_id = state
            .policies
            .iter()
            .find(|p| p.quote_id.as_deref() == Some(quote_id.as_str()))
            .map(|p| p.id.clone());
        let removed = match policy_id {
            Some(policy_id) => state.remove_policy(&policy_id),
            None => Vec::new(),
        };
        state
            .payments
            .retain(|p| p.quote_id.as_deref() != Some(quote_id.as_str()));
        state.quotes.retain(|q| q.id != quote_id);
        Ok(removed)
    }

    async fn expire_created_before(&self, cutoff: NaiveDateTime) -> Result<usize> {
        let mut state = self.state.lock().unwrap();
        let mut count = 0;
        for quote in state.quotes.iter_mut() {
            if !quote.converted_to_policy
                && quote.status != QuoteStatus::Expired
                && quote.created_at < cutoff
            {
                quote.status = QuoteStatus::Expired;
                quote.updated_at = now();
                count += 1;
            }
        }
        Ok(count)
    }

    fn get_by_id(&self, quote_id: &str) -> Result<Quote> {
        self.state
            .lock()
            .unwrap()
            .quotes
            .iter()
            .find(|q| q.id == quote_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Quote {}", quote_id)))
    }

    fn get_by_number(&self, quote_number: &str) -> Result<Quote> {
        self.state
            .lock()
            .unwrap()
            .quotes
            .iter()
            .find(|q| q.quote_number == quote_number)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Quote {}", quote_number)))
    }

    fn list_by_email(&self, email: &str) -> Result<Vec<Quote>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .quotes
            .iter()
            .filter(|q| q.email == email)
            .cloned()
            .collect())
    }

    fn list(&self) -> Result<Vec<Quote>> {
        Ok(self.quotes())
    }
}

#[async_trait]
impl PolicyRepositoryTrait for MemoryDb {
    async fn convert_quote(
        &self,
        quote_id: &str,
        policy_number: String,
        payment: Option<NewPayment>,
    ) -> Result<ConversionOutcome> {
        let mut state = self.state.lock().unwrap();
        if !state.quotes.iter().any(|q| q.id == quote_id) {
            return Err(Error::NotFound(format!("Quote {}", quote_id)));
        }

        let existing = state
            .policies
            .iter()
            .find(|p| p.quote_id.as_deref() == Some(quote_id))
            .cloned();

        let (policy, created) = match existing {
            Some(policy) => (policy, false),
            None => {
                if state.forced_policy_collisions > 0 {
                    state.forced_policy_collisions -= 1;
                    return Err(unique_violation("policies.policy_number"));
                }
                if state
                    .policies
                    .iter()
                    .any(|p| p.policy_number == policy_number)
                {
                    return Err(unique_violation("policies.policy_number"));
                }
                let timestamp = now();
                let policy = Policy {
                    id: new_id(),
                    policy_number,
                    quote_id: Some(quote_id.to_string()),
                    pdf_url: None,
                    event: None,
                    policy_holder: None,
                    created_at: timestamp,
                    updated_at: timestamp,
                };
                state.policies.push(policy.clone());
                if let Some(quote) = state.quotes.iter_mut().find(|q| q.id == quote_id) {
                    quote.converted_to_policy = true;
                    quote.updated_at = timestamp;
                }
                (policy, true)
            }
        };

        let payment = payment.map(|p| {
            state.insert_payment(NewPayment {
                policy_id: Some(policy.id.clone()),
                ..p
            })
        });

        Ok(ConversionOutcome {
            policy,
            created,
            payment,
        })
    }

    async fn create(&self, record: PolicyRecord) -> Result<Policy> {
        let mut state = self.state.lock().unwrap();
        if state.forced_policy_collisions > 0 {
            state.forced_policy_collisions -= 1;
            return Err(unique_violation("policies.policy_number"));
        }
        if state
            .policies
            .iter()
            .any(|p| p.policy_number == record.policy_number)
        {
            return Err(unique_violation("policies.policy_number"));
        }
        let timestamp = now();
        let policy = Policy {
            id: new_id(),
            policy_number: record.policy_number,
            quote_id: None,
            pdf_url: record.pdf_url,
            event: record.event,
            policy_holder: record.policy_holder,
            created_at: timestamp,
            updated_at: timestamp,
        };
        state.policies.push(policy.clone());
        Ok(policy)
    }

    async fn update_with_version(
        &self,
        write: VersionedPolicyWrite,
    ) -> Result<VersionedUpdateOutcome> {
        let mut state = self.state.lock().unwrap();
        if state.fail_versioned_writes {
            return Err(Error::Database(DatabaseError::QueryFailed(
                "disk I/O error".to_string(),
            )));
        }

        let current = state
            .policies
            .iter()
            .find(|p| p.id == write.policy_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Policy {}", write.policy_id)))?;
        if current.updated_at != write.expected_updated_at {
            return Err(Error::Conflict(format!(
                "Policy {} was modified concurrently",
                write.policy_id
            )));
        }

        let version = PolicyVersion {
            id: new_id(),
            policy_id: write.policy_id.clone(),
            data: write.version.data,
            pdf_file_name: Some(write.version.pdf_file_name),
            created_at: write.version.created_at,
        };
        state.versions.push(version.clone());

        let timestamp = now();
        if let Some(quote) = write.quote {
            if let Some(slot) = state.quotes.iter_mut().find(|q| q.id == quote.id) {
                *slot = Quote {
                    updated_at: timestamp,
                    ..quote
                };
            }
        }

        let policy = {
            let slot = state
                .policies
                .iter_mut()
                .find(|p| p.id == write.policy_id)
                .ok_or_else(|| Error::NotFound(format!("Policy {}", write.policy_id)))?;
            slot.pdf_url = write.pdf_url;
            slot.event = write.event;
            slot.policy_holder = write.policy_holder;
            slot.updated_at = timestamp;
            slot.clone()
        };

        let pruned = state.prune(&write.policy_id, write.max_versions);
        Ok(VersionedUpdateOutcome {
            policy,
            version,
            pruned,
        })
    }

    async fn delete(&self, policy_id: &str) -> Result<Vec<PolicyVersion>> {
        let mut state = self.state.lock().unwrap();
        let quote_id = state
            .policies
            .iter()
            .find(|p| p.id == policy_id)
            .map(|p| p.quote_id.clone())
            .ok_or_else(|| Error::NotFound(format!("Policy {}", policy_id)))?;
        if let Some(quote_id) = quote_id {
            if let Some(quote) = state.quotes.iter_mut().find(|q| q.id == quote_id) {
                quote.converted_to_policy = false;
            }
        }
        Ok(state.remove_policy(policy_id))
    }

    async fn prune_versions(&self, max_versions: usize) -> Result<Vec<PolicyVersion>> {
        let mut state = self.state.lock().unwrap();
        let policy_ids: Vec<String> = state.policies.iter().map(|p| p.id.clone()).collect();
        let mut pruned = Vec::new();
        for policy_id in policy_ids {
            pruned.extend(state.prune(&policy_id, max_versions));
        }
        Ok(pruned)
    }

    fn get_by_id(&self, policy_id: &str) -> Result<Policy> {
        self.policies()
            .into_iter()
            .find(|p| p.id == policy_id)
            .ok_or_else(|| Error::NotFound(format!("Policy {}", policy_id)))
    }

    fn get_by_number(&self, policy_number: &str) -> Result<Policy> {
        self.policies()
            .into_iter()
            .find(|p| p.policy_number == policy_number)
            .ok_or_else(|| Error::NotFound(format!("Policy {}", policy_number)))
    }

    fn find_by_quote_id(&self, quote_id: &str) -> Result<Option<Policy>> {
        Ok(self
            .policies()
            .into_iter()
            .find(|p| p.quote_id.as_deref() == Some(quote_id)))
    }

    fn list(&self) -> Result<Vec<Policy>> {
        Ok(self.policies())
    }

    fn list_versions(&self, policy_id: &str) -> Result<Vec<PolicyVersion>> {
        let mut versions: Vec<(usize, PolicyVersion)> = self
            .versions()
            .into_iter()
            .enumerate()
            .filter(|(_, v)| v.policy_id == policy_id)
            .collect();
        versions.sort_by(|(ia, a), (ib, b)| b.created_at.cmp(&a.created_at).then(ib.cmp(ia)));
        Ok(versions.into_iter().map(|(_, v)| v).collect())
    }

    fn get_version(&self, policy_id: &str, version_id: &str) -> Result<PolicyVersion> {
        self.versions()
            .into_iter()
            .find(|v| v.policy_id == policy_id && v.id == version_id)
            .ok_or_else(|| Error::NotFound(format!("Policy version {}", version_id)))
    }
}

#[async_trait]
impl PaymentRepositoryTrait for MemoryDb {
    async fn create(&self, new_payment: NewPayment) -> Result<Payment> {
        Ok(self.state.lock().unwrap().insert_payment(new_payment))
    }

    fn get_by_id(&self, payment_id: &str) -> Result<Payment> {
        self.payments()
            .into_iter()
            .find(|p| p.id == payment_id)
            .ok_or_else(|| Error::NotFound(format!("Payment {}", payment_id)))
    }

    fn list(&self, filter: &PaymentFilter) -> Result<Vec<Payment>> {
        let mut payments: Vec<Payment> = self
            .payments()
            .into_iter()
            .filter(|p| filter.quote_id.is_none() || p.quote_id == filter.quote_id)
            .filter(|p| filter.policy_id.is_none() || p.policy_id == filter.policy_id)
            .collect();
        payments.reverse();
        Ok(payments)
    }
}

/// Document store backed by a map.
#[derive(Clone, Default)]
pub struct MemoryDocumentStore {
    files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.files.lock().unwrap().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn contains(&self, file_name: &str) -> bool {
        self.files.lock().unwrap().contains_key(file_name)
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn write(&self, file_name: &str, bytes: Vec<u8>) -> Result<()> {
        self.files
            .lock()
            .unwrap()
            .insert(file_name.to_string(), bytes);
        Ok(())
    }

    async fn read(&self, file_name: &str) -> Result<Vec<u8>> {
        self.files
            .lock()
            .unwrap()
            .get(file_name)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Document {}", file_name)))
    }

    async fn delete(&self, file_name: &str) -> Result<bool> {
        Ok(self.files.lock().unwrap().remove(file_name).is_some())
    }

    async fn exists(&self, file_name: &str) -> Result<bool> {
        Ok(self.files.lock().unwrap().contains_key(file_name))
    }
}

/// Renderer producing a short fake PDF naming the policy.
pub struct StubRenderer;

impl PolicyDocumentRenderer for StubRenderer {
    fn render(&self, snapshot: &PolicySnapshot) -> Result<Vec<u8>> {
        Ok(format!("%PDF-1.4 {}", snapshot.policy.policy_number).into_bytes())
    }
}
