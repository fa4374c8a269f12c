use crate::cli::ServeArgs;
use crate::infra::{
    AppState, InMemoryAccountDirectory, InMemoryJobDirectory, InMemoryQuestionCatalog,
    InMemoryResultRepository,
};
use crate::routes::with_skillfit_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use skillfit::config::AppConfig;
use skillfit::error::AppError;
use skillfit::telemetry;
use skillfit::workflows::assessment::AssessmentService;
use skillfit::workflows::verification::{
    spawn_sweeper, LoggingNotifier, RegistrationService, ShardedVerificationStore,
    VerificationService,
};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(ShardedVerificationStore::new(config.verification.shards));
    let verification = Arc::new(VerificationService::new(
        store,
        Arc::new(LoggingNotifier),
    ));
    let sweeper = config
        .verification
        .sweep_interval
        .map(|every| spawn_sweeper(verification.clone(), every));

    let accounts = InMemoryAccountDirectory::default();
    let registration = Arc::new(RegistrationService::new(
        verification,
        Arc::new(accounts.clone()),
    ));
    let assessment = Arc::new(AssessmentService::new(
        Arc::new(InMemoryQuestionCatalog::seeded()),
        Arc::new(InMemoryJobDirectory::seeded()),
        Arc::new(InMemoryResultRepository::new(accounts)),
    ));

    let app = with_skillfit_routes(registration, assessment)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        shards = config.verification.shards,
        sweeping = sweeper.is_some(),
        "skillfit service ready"
    );

    let served = axum::serve(listener, app).await;
    if let Some(handle) = sweeper {
        handle.abort();
    }
    served?;
    Ok(())
}
