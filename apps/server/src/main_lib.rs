use std::sync::Arc;

use crate::{
    config::Config,
    documents::{FileDocumentStore, TextPdfRenderer},
    domain_events::EventLogSink,
    gateway::AuthorizeNetGateway,
    mailer::TracingMailer,
};
use eventcover_core::{
    logs::LogRepositoryTrait,
    maintenance::{MaintenanceService, MaintenanceServiceTrait},
    payments::{PaymentService, PaymentServiceTrait},
    policies::{PolicyService, PolicyServiceTrait},
    quotes::{QuoteService, QuoteServiceTrait},
};
use eventcover_storage_sqlite::{
    db::{self, spawn_writer},
    BackupRepository, LogRepository, PaymentRepository, PolicyRepository, QuoteRepository,
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub struct AppState {
    pub quote_service: Arc<dyn QuoteServiceTrait>,
    pub policy_service: Arc<dyn PolicyServiceTrait>,
    pub payment_service: Arc<dyn PaymentServiceTrait>,
    pub maintenance_service: Arc<dyn MaintenanceServiceTrait>,
    pub log_repository: Arc<dyn LogRepositoryTrait>,
}

/// Installs the global subscriber. `EC_LOG_FORMAT=text` switches from JSON
/// to human-readable lines.
pub fn init_tracing() {
    let log_format = std::env::var("EC_LOG_FORMAT").unwrap_or_else(|_| "json".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("text") {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    } else {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = spawn_writer((*pool).clone());

    let quote_repository = Arc::new(QuoteRepository::new(pool.clone(), writer.clone()));
    let policy_repository = Arc::new(PolicyRepository::new(pool.clone(), writer.clone()));
    let payment_repository = Arc::new(PaymentRepository::new(pool.clone(), writer.clone()));
    let log_repository = Arc::new(LogRepository::new(pool.clone(), writer.clone()));
    let backup_repository = Arc::new(BackupRepository::new(
        pool.clone(),
        writer.clone(),
        db_path.clone(),
    ));

    // Domain event sink - phase 1: buffers events until the worker starts
    let domain_event_sink = Arc::new(EventLogSink::new());

    let document_store = Arc::new(FileDocumentStore::new(&config.documents_dir)?);
    tracing::info!("Policy documents stored in {}", config.documents_dir);

    let policy_service: Arc<dyn PolicyServiceTrait> = Arc::new(PolicyService::new(
        policy_repository,
        quote_repository.clone(),
        payment_repository.clone(),
        Arc::new(TextPdfRenderer::new()),
        document_store,
        domain_event_sink.clone(),
    ));

    let quote_service: Arc<dyn QuoteServiceTrait> = Arc::new(QuoteService::new(
        quote_repository.clone(),
        policy_service.clone(),
        domain_event_sink.clone(),
    ));

    let payment_service: Arc<dyn PaymentServiceTrait> = Arc::new(PaymentService::new(
        payment_repository,
        quote_repository,
        policy_service.clone(),
        Arc::new(AuthorizeNetGateway::new(config.authorize_net.clone())),
        domain_event_sink.clone(),
    ));

    let maintenance_service: Arc<dyn MaintenanceServiceTrait> =
        Arc::new(MaintenanceService::new(
            quote_service.clone(),
            backup_repository,
            log_repository.clone(),
            Arc::new(TracingMailer::new(config.smtp.clone())),
            config.maintenance_settings(),
        ));

    if config.error_tracking_dsn.is_some() {
        tracing::info!("EC_ERROR_TRACKING_DSN is set; errors are recorded in error_logs only");
    }

    // Domain event sink - phase 2: start writing events to the event log
    domain_event_sink.start_worker(log_repository.clone());

    Ok(Arc::new(AppState {
        quote_service,
        policy_service,
        payment_service,
        maintenance_service,
        log_repository,
    }))
}
