use chrono::Utc;
use log::{debug, info, warn};
use std::sync::Arc;

use super::policies_model::{
    version_file_name, ConversionOutcome, NewPolicy, NewPolicyVersion, Policy,
    PolicyNumberStrategy, PolicyRecord, PolicySnapshot, PolicyUpdate, PolicyVersion,
    PolicyVersionSummary, PolicyView, VersionDocument, VersionedPolicyWrite,
};
use super::policies_traits::{PolicyRepositoryTrait, PolicyServiceTrait};
use crate::constants::{ADMIN_PAYMENT_METHOD, MAX_POLICY_VERSIONS, NUMBER_GENERATION_ATTEMPTS};
use crate::documents::{DocumentStore, PolicyDocumentRenderer};
use crate::errors::{Error, Result};
use crate::events::{DomainEvent, DomainEventSink};
use crate::payments::{NewPayment, PaymentFilter, PaymentRepositoryTrait};
use crate::quotes::{QuoteRepositoryTrait, QuoteSource};
use crate::utils::numbering::{generate_policy_number, policy_number_from_quote_number};

/// Service for converting quotes and maintaining policies and their versions.
pub struct PolicyService {
    repository: Arc<dyn PolicyRepositoryTrait>,
    quote_repository: Arc<dyn QuoteRepositoryTrait>,
    payment_repository: Arc<dyn PaymentRepositoryTrait>,
    renderer: Arc<dyn PolicyDocumentRenderer>,
    document_store: Arc<dyn DocumentStore>,
    event_sink: Arc<dyn DomainEventSink>,
}

impl PolicyService {
    pub fn new(
        repository: Arc<dyn PolicyRepositoryTrait>,
        quote_repository: Arc<dyn QuoteRepositoryTrait>,
        payment_repository: Arc<dyn PaymentRepositoryTrait>,
        renderer: Arc<dyn PolicyDocumentRenderer>,
        document_store: Arc<dyn DocumentStore>,
        event_sink: Arc<dyn DomainEventSink>,
    ) -> Self {
        Self {
            repository,
            quote_repository,
            payment_repository,
            renderer,
            document_store,
            event_sink,
        }
    }

    fn build_view(&self, policy: Policy) -> Result<PolicyView> {
        let quote = match policy.quote_id.as_deref() {
            Some(quote_id) => Some(self.quote_repository.get_by_id(quote_id)?),
            None => None,
        };
        let payments = self.payment_repository.list(&PaymentFilter {
            quote_id: None,
            policy_id: Some(policy.id.clone()),
        })?;
        Ok(PolicyView::new(policy, quote, payments))
    }

    /// Picks a version file name that is not already in the store.
    async fn next_version_file_name(&self, policy_id: &str) -> Result<String> {
        let mut millis = Utc::now().timestamp_millis();
        loop {
            let file_name = version_file_name(policy_id, millis);
            if !self.document_store.exists(&file_name).await? {
                return Ok(file_name);
            }
            millis += 1;
        }
    }

    async fn insert_standalone(&self, record: PolicyRecord, generated: bool) -> Result<Policy> {
        let attempts = if generated {
            NUMBER_GENERATION_ATTEMPTS
        } else {
            1
        };
        let mut attempt = 0;
        loop {
            attempt += 1;
            let candidate = if generated && attempt > 1 {
                PolicyRecord {
                    policy_number: generate_policy_number(),
                    ..record.clone()
                }
            } else {
                record.clone()
            };

            match self.repository.create(candidate).await {
                Ok(policy) => return Ok(policy),
                Err(err) if err.is_unique_violation() && attempt < attempts => {
                    warn!("Policy number collision (attempt {}), retrying", attempt);
                }
                Err(err) if err.is_unique_violation() => {
                    return Err(Error::Conflict(format!(
                        "Policy number {} is already in use",
                        record.policy_number
                    )));
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[async_trait::async_trait]
impl PolicyServiceTrait for PolicyService {
    async fn convert_quote(
        &self,
        quote_id: &str,
        strategy: PolicyNumberStrategy,
    ) -> Result<ConversionOutcome> {
        self.convert_quote_with_payment(quote_id, strategy, None)
            .await
    }

    async fn convert_quote_with_payment(
        &self,
        quote_id: &str,
        strategy: PolicyNumberStrategy,
        payment: Option<NewPayment>,
    ) -> Result<ConversionOutcome> {
        let quote = self.quote_repository.get_by_id(quote_id)?;
        let attempts = match strategy {
            PolicyNumberStrategy::Random => NUMBER_GENERATION_ATTEMPTS,
            PolicyNumberStrategy::FromQuoteNumber => 1,
        };

        let mut attempt = 0;
        let outcome = loop {
            attempt += 1;
            let policy_number = match strategy {
                PolicyNumberStrategy::Random => generate_policy_number(),
                PolicyNumberStrategy::FromQuoteNumber => {
                    policy_number_from_quote_number(&quote.quote_number)
                }
            };

            match self
                .repository
                .convert_quote(quote_id, policy_number.clone(), payment.clone())
                .await
            {
                Ok(outcome) => break outcome,
                Err(err) if err.is_unique_violation() && attempt < attempts => {
                    warn!(
                        "Policy number {} already taken (attempt {}), retrying",
                        policy_number, attempt
                    );
                }
                Err(err) if err.is_unique_violation() => {
                    return Err(Error::Conflict(format!(
                        "Policy number {} is already in use",
                        policy_number
                    )));
                }
                Err(err) => return Err(err),
            }
        };

        if outcome.created {
            info!(
                "Converted quote {} to policy {}",
                quote.quote_number, outcome.policy.policy_number
            );
            self.event_sink.emit(DomainEvent::policy_converted(
                outcome.policy.id.clone(),
                outcome.policy.policy_number.clone(),
                quote.id.clone(),
            ));
        } else {
            debug!(
                "Quote {} already converted to policy {}",
                quote.quote_number, outcome.policy.policy_number
            );
        }
        if let Some(recorded) = outcome.payment.as_ref() {
            self.event_sink
                .emit(DomainEvent::payment_recorded(recorded));
        }

        Ok(outcome)
    }

    async fn create_from_quote(
        &self,
        quote_number: &str,
        force_convert: bool,
    ) -> Result<ConversionOutcome> {
        let quote = self.quote_repository.get_by_number(quote_number)?;

        if quote.converted_to_policy {
            return Err(Error::invalid_input(format!(
                "Quote {} has already been converted to a policy",
                quote.quote_number
            )));
        }

        let is_admin = quote.source == QuoteSource::Admin;
        if is_admin && !force_convert {
            return Err(Error::invalid_input(format!(
                "Quote {} was created by an admin; set forceConvert to convert it",
                quote.quote_number
            )));
        }

        let payment = is_admin.then(|| {
            NewPayment::success_for_quote(
                &quote.id,
                quote.total_premium,
                ADMIN_PAYMENT_METHOD,
                None,
            )
        });

        let outcome = self
            .convert_quote_with_payment(&quote.id, PolicyNumberStrategy::Random, payment)
            .await?;

        if is_admin {
            let mut converted = self.quote_repository.get_by_id(&quote.id)?;
            let reconciled = converted
                .event
                .as_mut()
                .and_then(|event| event.venue.as_mut())
                .map_or(false, |venue| venue.reconcile_location_types());
            if reconciled {
                debug!(
                    "Reconciled venue location types for quote {}",
                    converted.quote_number
                );
                self.quote_repository.save(converted).await?;
            }
        }

        Ok(outcome)
    }

    async fn create_policy(&self, new_policy: NewPolicy) -> Result<Policy> {
        let provided = new_policy
            .policy_number
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        let generated = provided.is_none();

        let record = PolicyRecord {
            policy_number: provided.unwrap_or_else(generate_policy_number),
            pdf_url: new_policy.pdf_url,
            event: new_policy.event,
            policy_holder: new_policy.policy_holder,
        };

        let policy = self.insert_standalone(record, generated).await?;
        info!("Created policy {}", policy.policy_number);
        self.event_sink.emit(DomainEvent::policy_created(
            policy.id.clone(),
            policy.policy_number.clone(),
        ));
        Ok(policy)
    }

    async fn update_policy(&self, policy_id: &str, update: PolicyUpdate) -> Result<PolicyView> {
        let view = self.build_view(self.repository.get_by_id(policy_id)?)?;

        // Validate and apply in memory before any document is written.
        let mut policy = view.policy.clone();
        let mut quote = view.quote.clone();
        match quote.as_mut() {
            Some(quote) => {
                update.quote_update().apply_to(quote)?;
            }
            None => {
                if let Some(event) = update.event.clone() {
                    match policy.event.as_mut() {
                        Some(existing) => existing.merge(event),
                        None => policy.event = Some(event),
                    }
                }
                if let Some(holder) = update.policy_holder.clone() {
                    match policy.policy_holder.as_mut() {
                        Some(existing) => existing.merge(holder),
                        None => policy.policy_holder = Some(holder),
                    }
                }
            }
        }
        if let Some(pdf_url) = update.pdf_url.clone() {
            policy.pdf_url = Some(pdf_url);
        }

        let captured_at = Utc::now().naive_utc();
        let file_name = self.next_version_file_name(policy_id).await?;
        let snapshot = PolicySnapshot::capture(&view, file_name.clone(), captured_at);
        let document = self.renderer.render(&snapshot)?;
        let data = serde_json::to_string(&snapshot)?;
        self.document_store.write(&file_name, document).await?;

        let write = VersionedPolicyWrite {
            policy_id: policy_id.to_string(),
            expected_updated_at: view.policy.updated_at,
            expected_quote_updated_at: view.quote.as_ref().map(|q| q.updated_at),
            version: NewPolicyVersion {
                policy_id: policy_id.to_string(),
                data,
                pdf_file_name: file_name.clone(),
                created_at: captured_at,
            },
            pdf_url: policy.pdf_url,
            event: policy.event,
            policy_holder: policy.policy_holder,
            quote,
            max_versions: MAX_POLICY_VERSIONS,
        };

        let outcome = match self.repository.update_with_version(write).await {
            Ok(outcome) => outcome,
            Err(err) => {
                if let Err(cleanup_err) = self.document_store.delete(&file_name).await {
                    warn!(
                        "Failed to remove orphan document {}: {}",
                        file_name, cleanup_err
                    );
                }
                return Err(err);
            }
        };

        let pruned = outcome.pruned.len();
        if pruned > 0 {
            self.discard_version_documents(&outcome.pruned).await;
        }

        info!(
            "Updated policy {} (version {}, {} pruned)",
            outcome.policy.policy_number, outcome.version.id, pruned
        );
        self.event_sink.emit(DomainEvent::policy_updated(
            outcome.policy.id.clone(),
            outcome.version.id.clone(),
            pruned,
        ));

        self.build_view(outcome.policy)
    }

    async fn delete_policy(&self, policy_id: &str) -> Result<()> {
        let removed = self.repository.delete(policy_id).await?;
        self.discard_version_documents(&removed).await;
        info!("Deleted policy {}", policy_id);
        self.event_sink
            .emit(DomainEvent::policy_deleted(policy_id.to_string()));
        Ok(())
    }

    async fn cleanup_all_policy_versions(&self) -> Result<usize> {
        let pruned = self.repository.prune_versions(MAX_POLICY_VERSIONS).await?;
        let documents = self.discard_version_documents(&pruned).await;
        info!(
            "Version cleanup removed {} row(s) and {} document(s)",
            pruned.len(),
            documents
        );
        Ok(pruned.len())
    }

    async fn discard_version_documents(&self, versions: &[PolicyVersion]) -> usize {
        let mut deleted = 0;
        for file_name in versions.iter().filter_map(|v| v.pdf_file_name.as_deref()) {
            match self.document_store.delete(file_name).await {
                Ok(true) => deleted += 1,
                Ok(false) => debug!("Version document {} already gone", file_name),
                Err(err) => warn!("Failed to delete version document {}: {}", file_name, err),
            }
        }
        deleted
    }

    fn get_policy(&self, policy_id: &str) -> Result<PolicyView> {
        self.build_view(self.repository.get_by_id(policy_id)?)
    }

    fn list_policies(&self) -> Result<Vec<PolicyView>> {
        self.repository
            .list()?
            .into_iter()
            .map(|policy| self.build_view(policy))
            .collect()
    }

    fn list_versions(&self, policy_id: &str) -> Result<Vec<PolicyVersionSummary>> {
        self.repository.get_by_id(policy_id)?;
        Ok(self
            .repository
            .list_versions(policy_id)?
            .into_iter()
            .map(PolicyVersionSummary::from)
            .collect())
    }

    async fn download_version(
        &self,
        policy_id: &str,
        version_id: &str,
    ) -> Result<VersionDocument> {
        let version = self.repository.get_version(policy_id, version_id)?;
        let file_name = match version.pdf_file_name.clone() {
            Some(name) => name,
            None => version.snapshot()?.pdf_file_name,
        };

        if !self.document_store.exists(&file_name).await? {
            return Err(Error::NotFound(format!(
                "Document for policy version {}",
                version_id
            )));
        }
        let bytes = self.document_store.read(&file_name).await?;
        Ok(VersionDocument { file_name, bytes })
    }
}
