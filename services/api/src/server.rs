use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::build_app;
use axum_prometheus::PrometheusMetricLayer;
use civic_complaints::config::{AppConfig, ConfigError, StoreBackend};
use civic_complaints::error::AppError;
use civic_complaints::registry::{InMemoryStore, MongoStore, RegistryState, RegistryStore};
use civic_complaints::telemetry;
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

    match config.store.backend {
        StoreBackend::Memory => {
            warn!("using in-memory store; data is lost on shutdown");
            serve(config, Arc::new(InMemoryStore::default())).await
        }
        StoreBackend::Mongo => {
            let uri = config
                .store
                .mongodb_uri
                .clone()
                .ok_or(ConfigError::MissingMongoUri)?;
            let store = MongoStore::connect(&uri, &config.store.database).await?;
            info!(database = %config.store.database, "connected to mongodb");
            serve(config, Arc::new(store)).await
        }
    }
}

async fn serve<S>(config: AppConfig, store: Arc<S>) -> Result<(), AppError>
where
    S: RegistryStore + 'static,
{
    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let app = build_app(RegistryState::new(store), app_state, &config.assets.public_dir)
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        backend = ?config.store.backend,
        public_dir = %config.assets.public_dir.display(),
        "complaint registry ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
