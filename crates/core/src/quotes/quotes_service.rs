use chrono::{Duration, NaiveDateTime, Utc};
use log::{debug, info, warn};
use std::sync::Arc;

use super::quotes_model::{NewQuote, Quote, QuoteCreation, QuoteLookup, QuoteRecord, QuoteSource, QuoteUpdate};
use super::quotes_traits::{QuoteRepositoryTrait, QuoteServiceTrait};
use crate::constants::{DEFAULT_ONLINE_PAYMENT_METHOD, NUMBER_GENERATION_ATTEMPTS, QUOTE_EXPIRY_DAYS};
use crate::errors::{Error, Result};
use crate::events::{DomainEvent, DomainEventSink};
use crate::payments::{NewPayment, PaymentStatus};
use crate::policies::{PolicyNumberStrategy, PolicyServiceTrait};
use crate::premiums::PremiumBreakdown;
use crate::utils::numbering::generate_quote_number;

/// Service for managing quotes.
pub struct QuoteService {
    repository: Arc<dyn QuoteRepositoryTrait>,
    policy_service: Arc<dyn PolicyServiceTrait>,
    event_sink: Arc<dyn DomainEventSink>,
}

impl QuoteService {
    pub fn new(
        repository: Arc<dyn QuoteRepositoryTrait>,
        policy_service: Arc<dyn PolicyServiceTrait>,
        event_sink: Arc<dyn DomainEventSink>,
    ) -> Self {
        Self {
            repository,
            policy_service,
            event_sink,
        }
    }

    /// Inserts the quote, drawing a fresh number on every collision.
    async fn insert_with_unique_number(&self, template: QuoteRecord) -> Result<Quote> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let record = QuoteRecord {
                quote_number: generate_quote_number(Utc::now().date_naive()),
                ..template.clone()
            };
            let quote_number = record.quote_number.clone();

            match self.repository.create(record).await {
                Ok(quote) => return Ok(quote),
                Err(err) if err.is_unique_violation() && attempt < NUMBER_GENERATION_ATTEMPTS => {
                    warn!(
                        "Quote number {} already taken (attempt {}), retrying",
                        quote_number, attempt
                    );
                }
                Err(err) if err.is_unique_violation() => {
                    return Err(Error::Conflict(format!(
                        "Could not allocate a unique quote number after {} attempts",
                        attempt
                    )));
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[async_trait::async_trait]
impl QuoteServiceTrait for QuoteService {
    async fn create_quote(&self, new_quote: NewQuote) -> Result<QuoteCreation> {
        let email = new_quote.validated_email()?;
        let premiums = PremiumBreakdown::calculate(&new_quote.premium_inputs());
        debug!(
            "Creating {} quote for {} with total premium {}",
            new_quote.source.as_str(),
            email,
            premiums.total_premium
        );

        let template = QuoteRecord {
            quote_number: String::new(),
            status: new_quote.source.initial_status(),
            source: new_quote.source,
            email,
            coverage_level: new_quote.coverage_level,
            liability_coverage: new_quote.liability_coverage.clone(),
            liquor_liability: new_quote.liquor_liability,
            premiums,
            event: new_quote.event.clone(),
            policy_holder: new_quote.policy_holder.clone(),
        };

        let quote = self.insert_with_unique_number(template).await?;
        info!("Created quote {}", quote.quote_number);
        self.event_sink.emit(DomainEvent::quote_created(
            quote.id.clone(),
            quote.quote_number.clone(),
            quote.source,
            quote.email.clone(),
        ));

        let already_paid = new_quote.payment_status == Some(PaymentStatus::Success);
        if quote.source != QuoteSource::Customer || !already_paid {
            return Ok(QuoteCreation {
                quote,
                policy: None,
            });
        }

        let method = new_quote
            .payment_method
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ONLINE_PAYMENT_METHOD.to_string());
        let payment =
            NewPayment::success_for_quote(&quote.id, quote.total_premium, method, None);

        // The quote is stored either way; a failed conversion leaves it
        // unconverted for a later payment or an explicit conversion.
        match self
            .policy_service
            .convert_quote_with_payment(&quote.id, PolicyNumberStrategy::Random, Some(payment))
            .await
        {
            Ok(outcome) => Ok(QuoteCreation {
                quote: self.repository.get_by_id(&quote.id)?,
                policy: Some(outcome.policy),
            }),
            Err(err) => {
                warn!(
                    "Auto-conversion of paid quote {} failed: {}",
                    quote.quote_number, err
                );
                Ok(QuoteCreation {
                    quote,
                    policy: None,
                })
            }
        }
    }

    async fn update_quote(&self, quote_number: &str, update: QuoteUpdate) -> Result<Quote> {
        let mut quote = self.repository.get_by_number(quote_number)?;
        let recalculated = update.apply_to(&mut quote)?;
        if recalculated {
            debug!(
                "Recalculated premiums for quote {}: total {}",
                quote.quote_number, quote.total_premium
            );
        }

        let saved = self.repository.save(quote).await?;
        self.event_sink.emit(DomainEvent::quote_updated(
            saved.id.clone(),
            saved.quote_number.clone(),
            recalculated,
        ));
        Ok(saved)
    }

    async fn delete_quote(&self, quote_number: &str) -> Result<()> {
        let removed_versions = self.repository.delete_by_number(quote_number).await?;
        if !removed_versions.is_empty() {
            let deleted = self
                .policy_service
                .discard_version_documents(&removed_versions)
                .await;
            debug!(
                "Deleted {} version document(s) with quote {}",
                deleted, quote_number
            );
        }

        info!("Deleted quote {}", quote_number);
        self.event_sink
            .emit(DomainEvent::quote_deleted(quote_number.to_string()));
        Ok(())
    }

    fn find_quotes(&self, lookup: QuoteLookup) -> Result<Vec<Quote>> {
        match lookup {
            QuoteLookup::ByNumber(number) => Ok(vec![self.repository.get_by_number(&number)?]),
            QuoteLookup::ById(id) => Ok(vec![self.repository.get_by_id(&id)?]),
            QuoteLookup::ByEmail(email) => {
                let email = email.trim();
                let quotes = self.repository.list_by_email(email)?;
                if quotes.is_empty() {
                    return Err(Error::NotFound(format!("Quotes for {}", email)));
                }
                Ok(quotes)
            }
            QuoteLookup::All => self.repository.list(),
        }
    }

    fn get_quote(&self, quote_number: &str) -> Result<Quote> {
        self.repository.get_by_number(quote_number)
    }

    async fn expire_stale_quotes(&self, now: NaiveDateTime) -> Result<usize> {
        let cutoff = now - Duration::days(QUOTE_EXPIRY_DAYS);
        let expired = self.repository.expire_created_before(cutoff).await?;
        if expired > 0 {
            info!("Expired {} quote(s) created before {}", expired, cutoff);
            self.event_sink.emit(DomainEvent::quotes_expired(expired));
        }
        Ok(expired)
    }
}
