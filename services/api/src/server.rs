use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use career_compass::config::AppConfig;
use career_compass::error::AppError;
use career_compass::telemetry;
use career_compass::workflows::profile::{HttpPredictionClient, ProfileSubmissionService};
use tracing::info;

use crate::cli::ServeArgs;
use crate::infra::{AppState, ConfiguredProfileStore};
use crate::routes::with_profile_routes;

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
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let predictor = Arc::new(HttpPredictionClient::from_config(&config.prediction)?);
    let store = ConfiguredProfileStore::from_config(
        &config.store,
        Duration::from_secs(config.prediction.timeout_secs),
    )?;
    info!(
        prediction_api = %config.prediction.base_url,
        profile_store = store.kind(),
        "collaborators configured"
    );
    let submission_service = Arc::new(ProfileSubmissionService::new(predictor, Arc::new(store)));

    let app = with_profile_routes(submission_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "career compass ready");

    axum::serve(listener, app).await?;
    Ok(())
}
