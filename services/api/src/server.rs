use crate::cli::ServeArgs;
use crate::infra::{ApiContext, AppState};
use crate::routes::app_router;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use shopledger::config::AppConfig;
use shopledger::error::AppError;
use shopledger::ledger::Ledger;
use shopledger::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

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

    let ledger = Ledger::in_memory(&config.auth);
    match &config.auth.bootstrap_admin {
        Some(admin) => {
            ledger.auth.ensure_admin(&admin.username, &admin.password)?;
        }
        None => warn!("no bootstrap administrator configured"),
    }

    let context = ApiContext::new(ledger, config.listing.default_page_size);
    let app = app_router(context)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "shop ledger api ready");

    axum::serve(listener, app).await?;
    Ok(())
}
