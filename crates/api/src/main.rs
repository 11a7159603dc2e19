use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use civic_advisors::{
    build_client, ClassificationAdvisor, ClassifierClient, GeocodeClient, GeminiClient,
    PriorityAdvisor, ReverseGeocoder,
};
use civic_core::access::AccessList;
use civic_events::{EmailConfig, EmailDelivery, Mailer, OutboxConfig, OutboxDispatcher};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use civic_api::config::{AdvisorConfig, ServerConfig};
use civic_api::router::build_app_router;
use civic_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "civic_api=debug,civic_events=debug,tower_http=debug".into()
            }),
        )
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json_logs).then(|| tracing_subscriber::fmt::layer()))
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = civic_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    civic_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    civic_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Staff allow-list ---
    let access = Arc::new(load_access_list(config.access_list_path.as_deref()));

    // --- Advisory services ---
    let (priority, classifier, geocoder) = build_advisors(&config.advisors);

    // --- Email outbox ---
    let outbox_cancel = CancellationToken::new();
    let outbox_handle = match EmailConfig::from_env() {
        Some(email_config) => {
            let delivery =
                EmailDelivery::new(email_config).expect("Failed to build SMTP transport");
            let mailer: Arc<dyn Mailer> = Arc::new(delivery);
            let dispatcher = OutboxDispatcher::new(pool.clone(), mailer, OutboxConfig::from_env());
            let cancel = outbox_cancel.clone();
            tracing::info!("Email outbox dispatcher started");
            Some(tokio::spawn(async move {
                dispatcher.run(cancel).await;
            }))
        }
        None => {
            tracing::info!("SMTP_HOST not set, notification emails disabled");
            None
        }
    };

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        access,
        priority,
        classifier,
        geocoder,
        email_enabled: outbox_handle.is_some(),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    outbox_cancel.cancel();
    if let Some(handle) = outbox_handle {
        let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
        tracing::info!("Email outbox dispatcher stopped");
    }

    tracing::info!("Graceful shutdown complete");
}

/// Load the staff allow-list, or an empty one when no path is configured.
///
/// Panics on an unreadable file or an invalid document.
fn load_access_list(path: Option<&str>) -> AccessList {
    let Some(path) = path else {
        tracing::warn!("ACCESS_LIST_PATH not set, every identity is a plain user");
        return AccessList::empty();
    };

    let raw = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Failed to read access list '{path}': {e}"));
    let list = AccessList::from_json(&raw)
        .unwrap_or_else(|e| panic!("Invalid access list '{path}': {e}"));
    tracing::info!(path, version = list.version(), "Access list loaded");
    list
}

type Advisors = (
    Option<Arc<dyn PriorityAdvisor>>,
    Option<Arc<dyn ClassificationAdvisor>>,
    Option<Arc<dyn ReverseGeocoder>>,
);

/// Build a client for every advisory service that has its key or URL set.
fn build_advisors(config: &AdvisorConfig) -> Advisors {
    let client = build_client().expect("Failed to build HTTP client");

    let priority = config.gemini_api_key.clone().map(|key| {
        Arc::new(GeminiClient::new(
            client.clone(),
            config.gemini_base_url.clone(),
            config.gemini_model.clone(),
            key,
        )) as Arc<dyn PriorityAdvisor>
    });
    let classifier = config.classifier_url.clone().map(|url| {
        Arc::new(ClassifierClient::new(client.clone(), url)) as Arc<dyn ClassificationAdvisor>
    });
    let geocoder = config.geocode_api_key.clone().map(|key| {
        Arc::new(GeocodeClient::new(
            client.clone(),
            config.geocode_base_url.clone(),
            key,
        )) as Arc<dyn ReverseGeocoder>
    });

    tracing::info!(
        priority = priority.is_some(),
        classifier = classifier.is_some(),
        geocoder = geocoder.is_some(),
        "Advisory services configured"
    );

    (priority, classifier, geocoder)
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl-C, starting graceful shutdown"),
        () = terminate => tracing::info!("Received SIGTERM, starting graceful shutdown"),
    }
}
