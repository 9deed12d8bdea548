#[cfg(test)]
mod tests {
    use crate::constants::MAX_POLICY_VERSIONS;
    use crate::details::{EventDetails, PolicyHolderDetails, VenueDetails};
    use crate::documents::DocumentStore;
    use crate::errors::Error;
    use crate::events::{DomainEvent, MockDomainEventSink};
    use crate::payments::PaymentStatus;
    use crate::policies::{
        resolve_policy_details, NewPolicy, PolicyDetails, PolicyNumberStrategy, PolicyService,
        PolicyServiceTrait, PolicySnapshot, PolicyUpdate, PolicyVersion,
    };
    use crate::quotes::{NewQuote, QuoteService, QuoteServiceTrait, QuoteSource};
    use crate::test_support::{MemoryDb, MemoryDocumentStore, StubRenderer};
    use chrono::{Duration, Utc};
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    struct Harness {
        db: MemoryDb,
        store: MemoryDocumentStore,
        sink: MockDomainEventSink,
        policies: Arc<PolicyService>,
        quotes: QuoteService,
    }

    fn harness() -> Harness {
        let db = MemoryDb::new();
        let store = MemoryDocumentStore::new();
        let sink = MockDomainEventSink::new();
        let policies = Arc::new(PolicyService::new(
            Arc::new(db.clone()),
            Arc::new(db.clone()),
            Arc::new(db.clone()),
            Arc::new(StubRenderer),
            Arc::new(store.clone()),
            Arc::new(sink.clone()),
        ));
        let quotes = QuoteService::new(
            Arc::new(db.clone()),
            policies.clone(),
            Arc::new(sink.clone()),
        );
        Harness {
            db,
            store,
            sink,
            policies,
            quotes,
        }
    }

    fn new_quote(source: QuoteSource) -> NewQuote {
        NewQuote {
            email: Some("host@example.com".to_string()),
            source,
            coverage_level: Some(3),
            liability_coverage: Some("option1".to_string()),
            liquor_liability: false,
            event: Some(EventDetails {
                event_type: Some("birthday".to_string()),
                max_guests: Some("60".to_string()),
                venue: Some(VenueDetails {
                    name: Some("Loft".to_string()),
                    location_type: Some("indoor".to_string()),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            policy_holder: Some(PolicyHolderDetails {
                first_name: Some("Sam".to_string()),
                last_name: Some("Rivera".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    // ==================== Detail resolution ====================

    #[test]
    fn test_resolve_prefers_quote_details() {
        let policy_details = PolicyDetails {
            event: Some(EventDetails {
                event_type: Some("policy-event".to_string()),
                ..Default::default()
            }),
            policy_holder: Some(PolicyHolderDetails {
                first_name: Some("Policy".to_string()),
                ..Default::default()
            }),
        };
        let quote_details = PolicyDetails {
            event: Some(EventDetails {
                event_type: Some("quote-event".to_string()),
                ..Default::default()
            }),
            policy_holder: None,
        };

        let resolved = resolve_policy_details(policy_details.clone(), Some(quote_details));
        assert_eq!(
            resolved.event.unwrap().event_type.as_deref(),
            Some("quote-event")
        );
        assert_eq!(
            resolved.policy_holder.unwrap().first_name.as_deref(),
            Some("Policy")
        );

        let standalone = resolve_policy_details(policy_details.clone(), None);
        assert_eq!(standalone, policy_details);
    }

    // ==================== Conversion ====================

    #[tokio::test]
    async fn test_convert_quote_is_idempotent() {
        let h = harness();
        let quote = h
            .quotes
            .create_quote(new_quote(QuoteSource::Customer))
            .await
            .unwrap()
            .quote;

        let first = h
            .policies
            .convert_quote(&quote.id, PolicyNumberStrategy::Random)
            .await
            .unwrap();
        let second = h
            .policies
            .convert_quote(&quote.id, PolicyNumberStrategy::Random)
            .await
            .unwrap();

        assert!(first.created);
        assert!(!second.created);
        assert_eq!(first.policy.id, second.policy.id);
        assert_eq!(h.db.policies().len(), 1);
        assert!(h.db.quotes()[0].converted_to_policy);

        let conversions = h
            .sink
            .events()
            .into_iter()
            .filter(|e| matches!(e, DomainEvent::PolicyConverted { .. }))
            .count();
        assert_eq!(conversions, 1);
    }

    #[tokio::test]
    async fn test_convert_from_quote_number_uses_suffix() {
        let h = harness();
        let quote = h
            .quotes
            .create_quote(new_quote(QuoteSource::Customer))
            .await
            .unwrap()
            .quote;

        let outcome = h
            .policies
            .convert_quote(&quote.id, PolicyNumberStrategy::FromQuoteNumber)
            .await
            .unwrap();

        let suffix = quote.quote_number.rsplit('-').next().unwrap();
        assert_eq!(outcome.policy.policy_number, format!("PI-{}", suffix));
    }

    #[tokio::test]
    async fn test_random_policy_number_retries_collisions() {
        let h = harness();
        let quote = h
            .quotes
            .create_quote(new_quote(QuoteSource::Customer))
            .await
            .unwrap()
            .quote;
        h.db.force_policy_collisions(2);

        let outcome = h
            .policies
            .convert_quote(&quote.id, PolicyNumberStrategy::Random)
            .await
            .unwrap();
        assert!(outcome.created);
    }

    #[tokio::test]
    async fn test_quote_number_strategy_does_not_retry() {
        let h = harness();
        let quote = h
            .quotes
            .create_quote(new_quote(QuoteSource::Customer))
            .await
            .unwrap()
            .quote;
        h.db.force_policy_collisions(1);

        let result = h
            .policies
            .convert_quote(&quote.id, PolicyNumberStrategy::FromQuoteNumber)
            .await;

        assert!(matches!(result, Err(Error::Conflict(_))));
        assert!(h.db.policies().is_empty());
        assert!(!h.db.quotes()[0].converted_to_policy);
    }

    #[tokio::test]
    async fn test_create_from_quote_rejects_converted_quote() {
        let h = harness();
        let quote = h
            .quotes
            .create_quote(new_quote(QuoteSource::Customer))
            .await
            .unwrap()
            .quote;

        h.policies
            .create_from_quote(&quote.quote_number, false)
            .await
            .unwrap();
        let again = h.policies.create_from_quote(&quote.quote_number, false).await;

        assert!(matches!(again, Err(Error::Validation(_))));
        assert_eq!(h.db.policies().len(), 1);
    }

    #[tokio::test]
    async fn test_admin_quote_requires_force_convert() {
        let h = harness();
        let quote = h
            .quotes
            .create_quote(new_quote(QuoteSource::Admin))
            .await
            .unwrap()
            .quote;

        let refused = h.policies.create_from_quote(&quote.quote_number, false).await;
        assert!(matches!(refused, Err(Error::Validation(_))));
        assert!(h.db.policies().is_empty());

        let outcome = h
            .policies
            .create_from_quote(&quote.quote_number, true)
            .await
            .unwrap();
        assert!(outcome.created);

        let payments = h.db.payments();
        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].method, "admin");
        assert_eq!(payments[0].status, PaymentStatus::Success);
        assert_eq!(payments[0].amount, dec!(415));

        let venue = h.db.quotes()[0]
            .event
            .clone()
            .and_then(|e| e.venue)
            .unwrap();
        assert_eq!(venue.ceremony_location_type.as_deref(), Some("indoor"));
    }

    // ==================== Standalone policies ====================

    #[tokio::test]
    async fn test_create_standalone_policy() {
        let h = harness();
        let policy = h
            .policies
            .create_policy(NewPolicy {
                event: Some(EventDetails {
                    event_type: Some("gala".to_string()),
                    ..Default::default()
                }),
                ..Default::default()
            })
            .await
            .unwrap();

        assert!(policy.policy_number.starts_with("PI-"));
        assert!(policy.quote_id.is_none());

        let view = h.policies.get_policy(&policy.id).unwrap();
        assert_eq!(view.event.unwrap().event_type.as_deref(), Some("gala"));
    }

    #[tokio::test]
    async fn test_create_policy_with_taken_number_conflicts() {
        let h = harness();
        let explicit = NewPolicy {
            policy_number: Some("PI-000042".to_string()),
            ..Default::default()
        };
        h.policies.create_policy(explicit.clone()).await.unwrap();
        let duplicate = h.policies.create_policy(explicit).await;
        assert!(matches!(duplicate, Err(Error::Conflict(_))));
    }

    // ==================== Versioning ====================

    #[tokio::test]
    async fn test_update_snapshots_previous_state() {
        let h = harness();
        let quote = h
            .quotes
            .create_quote(new_quote(QuoteSource::Customer))
            .await
            .unwrap()
            .quote;
        let policy = h
            .policies
            .create_from_quote(&quote.quote_number, false)
            .await
            .unwrap()
            .policy;

        let view = h
            .policies
            .update_policy(
                &policy.id,
                PolicyUpdate {
                    coverage_level: Some(6),
                    event: Some(EventDetails {
                        max_guests: Some("90".to_string()),
                        ..Default::default()
                    }),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        // Updates land on the quote and premiums follow.
        let updated_quote = view.quote.unwrap();
        assert_eq!(updated_quote.coverage_level, Some(6));
        assert_eq!(updated_quote.total_premium, dec!(615));
        assert_eq!(view.event.unwrap().max_guests.as_deref(), Some("90"));

        let versions = h.policies.list_versions(&policy.id).unwrap();
        assert_eq!(versions.len(), 1);
        let file_name = versions[0].pdf_file_name.clone().unwrap();
        assert!(file_name.starts_with(&format!("policy_{}_", policy.id)));
        assert!(h.store.contains(&file_name));

        // The snapshot holds the state before the update.
        let stored = h.db.versions();
        let snapshot: PolicySnapshot = serde_json::from_str(&stored[0].data).unwrap();
        assert_eq!(snapshot.quote.unwrap().coverage_level, Some(3));
        assert_eq!(snapshot.pdf_file_name, file_name);

        let document = h
            .policies
            .download_version(&policy.id, &versions[0].id)
            .await
            .unwrap();
        assert!(document.bytes.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn test_standalone_update_changes_own_details() {
        let h = harness();
        let policy = h
            .policies
            .create_policy(NewPolicy::default())
            .await
            .unwrap();

        let view = h
            .policies
            .update_policy(
                &policy.id,
                PolicyUpdate {
                    policy_holder: Some(PolicyHolderDetails {
                        first_name: Some("Jo".to_string()),
                        ..Default::default()
                    }),
                    pdf_url: Some("https://docs.example.com/p.pdf".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(
            view.policy_holder.unwrap().first_name.as_deref(),
            Some("Jo")
        );
        assert_eq!(
            view.policy.pdf_url.as_deref(),
            Some("https://docs.example.com/p.pdf")
        );
    }

    #[tokio::test]
    async fn test_retention_keeps_ten_newest_versions() {
        let h = harness();
        let policy = h
            .policies
            .create_policy(NewPolicy::default())
            .await
            .unwrap();

        for i in 0..11 {
            h.policies
                .update_policy(
                    &policy.id,
                    PolicyUpdate {
                        pdf_url: Some(format!("https://docs.example.com/{}.pdf", i)),
                        ..Default::default()
                    },
                )
                .await
                .unwrap();
        }

        let versions = h.db.versions();
        assert_eq!(versions.len(), MAX_POLICY_VERSIONS);
        assert_eq!(h.store.file_names().len(), MAX_POLICY_VERSIONS);
        for version in &versions {
            assert!(h.store.contains(version.pdf_file_name.as_deref().unwrap()));
        }
    }

    #[tokio::test]
    async fn test_failed_write_removes_orphan_document() {
        let h = harness();
        let policy = h
            .policies
            .create_policy(NewPolicy::default())
            .await
            .unwrap();
        h.db.fail_versioned_writes(true);

        let result = h
            .policies
            .update_policy(&policy.id, PolicyUpdate::default())
            .await;

        assert!(result.is_err());
        assert!(h.store.file_names().is_empty());
        assert!(h.db.versions().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_update_writes_nothing() {
        let h = harness();
        let quote = h
            .quotes
            .create_quote(new_quote(QuoteSource::Customer))
            .await
            .unwrap()
            .quote;
        let policy = h
            .policies
            .create_from_quote(&quote.quote_number, false)
            .await
            .unwrap()
            .policy;

        let result = h
            .policies
            .update_policy(
                &policy.id,
                PolicyUpdate {
                    email: Some("  ".to_string()),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(Error::Validation(_))));
        assert!(h.store.file_names().is_empty());
        assert!(h.db.versions().is_empty());
    }

    #[tokio::test]
    async fn test_cleanup_all_policy_versions() {
        let h = harness();
        let policy = h
            .policies
            .create_policy(NewPolicy::default())
            .await
            .unwrap();

        let base = Utc::now().naive_utc() - Duration::days(1);
        for i in 0..13 {
            let file_name = format!("policy_{}_{}.pdf", policy.id, i);
            h.db.insert_version(PolicyVersion {
                id: format!("v{:02}", i),
                policy_id: policy.id.clone(),
                data: "{}".to_string(),
                pdf_file_name: Some(file_name.clone()),
                created_at: base + Duration::minutes(i),
            });
            h.store
                .write(&file_name, b"%PDF-1.4".to_vec())
                .await
                .unwrap();
        }

        let removed = h.policies.cleanup_all_policy_versions().await.unwrap();

        assert_eq!(removed, 3);
        let remaining: Vec<String> = h.db.versions().into_iter().map(|v| v.id).collect();
        assert_eq!(remaining.len(), 10);
        assert!(!remaining.contains(&"v00".to_string()));
        assert!(!remaining.contains(&"v02".to_string()));
        assert!(remaining.contains(&"v03".to_string()));
        assert_eq!(h.store.file_names().len(), 10);
    }

    #[tokio::test]
    async fn test_delete_policy_removes_documents() {
        let h = harness();
        let policy = h
            .policies
            .create_policy(NewPolicy::default())
            .await
            .unwrap();
        h.policies
            .update_policy(&policy.id, PolicyUpdate::default())
            .await
            .unwrap();
        assert_eq!(h.store.file_names().len(), 1);

        h.policies.delete_policy(&policy.id).await.unwrap();

        assert!(h.store.file_names().is_empty());
        assert!(h.policies.get_policy(&policy.id).is_err());
    }
}
