use axum::{body::Body, http::Request};
use eventcover_server::{api::app_router, build_state, config::Config};
use tempfile::tempdir;
use tower::ServiceExt;

#[tokio::test]
async fn healthz_works() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().to_path_buf();
    let config = Config::from_lookup(|key| match key {
        "EC_DB_PATH" => Some(root.join("test.db").to_string_lossy().into_owned()),
        "EC_DOCUMENTS_DIR" => Some(root.join("documents").to_string_lossy().into_owned()),
        "EC_BACKUP_DIR" => Some(root.join("backups").to_string_lossy().into_owned()),
        _ => None,
    })
    .unwrap();
    let state = build_state(&config).await.unwrap();
    let app = app_router(state, &config);

    let response = app
        .oneshot(Request::builder().uri("/api/v1/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
}
