use std::path::PathBuf;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use eventcover_server::{api::app_router, build_state, config::Config};
use serde_json::{json, Value};
use tempfile::{tempdir, TempDir};
use tower::ServiceExt;

struct TestApp {
    router: Router,
    documents_dir: PathBuf,
    _tmp: TempDir,
}

async fn build_test_app() -> TestApp {
    let tmp = tempdir().unwrap();
    let root = tmp.path().to_path_buf();
    let path = |name: &str| root.join(name).to_string_lossy().into_owned();
    let config = Config::from_lookup(|key| match key {
        "EC_DB_PATH" => Some(path("test.db")),
        "EC_DOCUMENTS_DIR" => Some(path("documents")),
        "EC_BACKUP_DIR" => Some(path("backups")),
        "EC_SCHEDULER_ENABLED" => Some("false".to_string()),
        _ => None,
    })
    .unwrap();

    let state = build_state(&config).await.unwrap();
    TestApp {
        router: app_router(state, &config),
        documents_dir: PathBuf::from(&config.documents_dir),
        _tmp: tmp,
    }
}

impl TestApp {
    async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn create_admin_policy(&self) -> Value {
        let (status, created) = self
            .send(
                Method::POST,
                "/api/v1/quotes",
                Some(json!({
                    "email": "planner@example.com",
                    "source": "ADMIN",
                    "coverageLevel": 3,
                    "liabilityCoverage": "option1",
                    "event": { "eventType": "Wedding", "maxGuests": "80" }
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, converted) = self
            .send(
                Method::POST,
                "/api/v1/policies/from-quote",
                Some(json!({
                    "quoteNumber": created["quoteNumber"],
                    "forceConvert": true
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        converted
    }
}

fn amount(value: &Value) -> f64 {
    value.as_f64().unwrap()
}

#[tokio::test]
async fn customer_quote_is_priced() {
    let app = build_test_app().await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/quotes",
            Some(json!({
                "email": "pat@example.com",
                "coverageLevel": 5,
                "liabilityCoverage": "option2",
                "liquorLiability": true,
                "event": { "maxGuests": "120" }
            })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["converted"], false);
    let quote = &body["quote"];
    assert_eq!(quote["status"], "STEP1");
    assert_eq!(quote["source"], "CUSTOMER");
    assert_eq!(amount(&quote["basePremium"]), 355.0);
    assert_eq!(amount(&quote["liabilityPremium"]), 180.0);
    assert_eq!(amount(&quote["liquorLiabilityPremium"]), 85.0);
    assert_eq!(amount(&quote["totalPremium"]), 620.0);

    let number = body["quoteNumber"].as_str().unwrap();
    assert!(number.starts_with("QI-"));
    let (status, found) = app
        .send(Method::GET, &format!("/api/v1/quotes?quoteNumber={}", number), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found.as_array().unwrap().len(), 1);
    assert_eq!(found[0]["id"], quote["id"]);
}

#[tokio::test]
async fn quote_requires_email() {
    let app = build_test_app().await;

    let (status, body) = app
        .send(Method::POST, "/api/v1/quotes", Some(json!({ "coverageLevel": 2 })))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("email"));
}

#[tokio::test]
async fn quote_lookup_errors() {
    let app = build_test_app().await;

    let (status, _) = app.send(Method::GET, "/api/v1/quotes", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(Method::GET, "/api/v1/quotes?quoteNumber=QI-01012026-999999", None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .send(Method::DELETE, "/api/v1/quotes/QI-01012026-999999", None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_quote_converts_only_when_forced() {
    let app = build_test_app().await;

    let (status, created) = app
        .send(
            Method::POST,
            "/api/v1/quotes",
            Some(json!({
                "email": "planner@example.com",
                "source": "ADMIN",
                "coverageLevel": 5,
                "liabilityCoverage": "option2",
                "liquorLiability": true,
                "event": { "maxGuests": "120" }
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["quote"]["status"], "COMPLETE");
    assert_eq!(created["converted"], false);
    let number = created["quoteNumber"].clone();

    let (status, _) = app
        .send(
            Method::POST,
            "/api/v1/policies/from-quote",
            Some(json!({ "quoteNumber": number })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, converted) = app
        .send(
            Method::POST,
            "/api/v1/policies/from-quote",
            Some(json!({ "quoteNumber": number, "forceConvert": true })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(converted["policyNumber"].as_str().unwrap().starts_with("PI-"));
    let policy_id = converted["policy"]["id"].as_str().unwrap().to_string();

    let (status, payments) = app
        .send(
            Method::GET,
            &format!("/api/v1/payments?policyId={}", policy_id),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let payments = payments.as_array().unwrap();
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0]["status"], "SUCCESS");
    assert_eq!(payments[0]["method"], "admin");
    assert_eq!(amount(&payments[0]["amount"]), 620.0);

    let (status, policies) = app.send(Method::GET, "/api/v1/policies", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(policies.as_array().unwrap().len(), 1);

    // A converted quote cannot be converted twice.
    let (status, _) = app
        .send(
            Method::POST,
            "/api/v1/policies/from-quote",
            Some(json!({ "quoteNumber": number, "forceConvert": true })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn policy_updates_are_versioned() {
    let app = build_test_app().await;
    let converted = app.create_admin_policy().await;
    let policy_id = converted["policy"]["id"].as_str().unwrap().to_string();
    let policy_uri = format!("/api/v1/policies/{}", policy_id);

    let (status, _) = app
        .send(
            Method::PUT,
            &policy_uri,
            Some(json!({ "event": { "eventType": "Anniversary" } })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, updated) = app
        .send(
            Method::PUT,
            &policy_uri,
            Some(json!({ "coverageLevel": 5, "event": { "eventType": "Graduation" } })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["event"]["eventType"], "Graduation");
    assert_eq!(updated["event"]["maxGuests"], "80");
    assert_eq!(updated["quote"]["coverageLevel"], 5);

    let (status, view) = app.send(Method::GET, &policy_uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["event"]["eventType"], "Graduation");

    let (status, versions) = app
        .send(Method::GET, &format!("{}/versions", policy_uri), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let versions = versions.as_array().unwrap();
    assert_eq!(versions.len(), 2);
    for version in versions {
        let file_name = version["pdfFileName"].as_str().unwrap();
        assert!(file_name.starts_with(&format!("policy_{}_", policy_id)));
        assert!(app.documents_dir.join(file_name).exists());
    }

    let version_id = versions[0]["id"].as_str().unwrap();
    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("{}/versions/{}/download", policy_uri, version_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/pdf"
    );
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(bytes.starts_with(b"%PDF-"));
}

#[tokio::test]
async fn deleting_policy_releases_quote() {
    let app = build_test_app().await;
    let converted = app.create_admin_policy().await;
    let policy_id = converted["policy"]["id"].as_str().unwrap();

    let (status, _) = app
        .send(Method::DELETE, &format!("/api/v1/policies/{}", policy_id), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app
        .send(Method::GET, &format!("/api/v1/policies/{}", policy_id), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_jobs_and_logs() {
    let app = build_test_app().await;

    let (status, _) = app
        .send(Method::POST, "/api/v1/admin/jobs/not-a-job", None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .send(Method::POST, "/api/v1/admin/jobs/expire-quotes", None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, backup) = app.send(Method::POST, "/api/v1/admin/backups", None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(backup["status"], "SUCCESS");

    let (status, cleanup) = app
        .send(Method::POST, "/api/v1/admin/cleanup-policy-versions", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cleanup["removed"], 0);

    app.send(
        Method::POST,
        "/api/v1/quotes",
        Some(json!({ "email": "pat@example.com" })),
    )
    .await;

    // Event rows are written by a background worker.
    let mut recorded = false;
    for _ in 0..50 {
        let (status, events) = app
            .send(Method::GET, "/api/v1/admin/event-logs?limit=10", None)
            .await;
        assert_eq!(status, StatusCode::OK);
        if !events.as_array().unwrap().is_empty() {
            recorded = true;
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
    assert!(recorded);
}

#[tokio::test]
async fn premium_preview_matches_quote_pricing() {
    let app = build_test_app().await;

    let (status, preview) = app
        .send(
            Method::GET,
            "/api/v1/premiums/preview?coverageLevel=5&liabilityCoverage=option2&liquorLiability=true&maxGuests=120",
            None,
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(amount(&preview["totalPremium"]), 620.0);
    assert_eq!(preview["guestRange"], "101-150");
}

#[tokio::test]
async fn manual_payment_requires_amount_and_status() {
    let app = build_test_app().await;
    let (status, created) = app
        .send(
            Method::POST,
            "/api/v1/quotes",
            Some(json!({ "email": "pat@example.com", "coverageLevel": 2 })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let quote_number = created["quoteNumber"].clone();

    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/payment",
            Some(json!({ "quoteNumber": quote_number, "status": "SUCCESS" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("amount"));

    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/payment",
            Some(json!({ "quoteNumber": quote_number, "amount": 100 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("status"));
}

#[tokio::test]
async fn unknown_email_is_not_found() {
    let app = build_test_app().await;

    let (status, _) = app
        .send(Method::GET, "/api/v1/quotes?email=nobody@example.com", None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
