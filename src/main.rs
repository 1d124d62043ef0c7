use std::sync::Arc;

use axum::{routing::get, Router};
use axum_prometheus::PrometheusMetricLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use wishlist_server::config::Config;
use wishlist_server::extract::MetadataExtractor;
use wishlist_server::fetch::HttpFetcher;
use wishlist_server::handlers;
use wishlist_server::state::AppState;

#[tokio::main]
async fn main() {
    // Initialize tracing — JSON in production, human-readable in dev.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "wishlist_server=info,tower_http=info"
            .parse()
            .unwrap()
    });

    if std::env::var("APP_ENV").as_deref() == Ok("production") {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    info!("🚀 Wishlist Server starting...");

    let config = Config::from_env();
    info!(
        timeout = ?config.fetch_timeout,
        max_body_bytes = config.max_body_bytes,
        "📝 Configuration loaded"
    );
    if config.allow_private_hosts {
        tracing::warn!("⚠️ Private-address guard disabled (ALLOW_PRIVATE_HOSTS=true)");
    }

    let fetcher = HttpFetcher::from_config(&config).expect("Failed to build HTTP client");
    let app_state = AppState {
        extractor: Arc::new(MetadataExtractor::new(
            Arc::new(fetcher),
            config.fetch_timeout,
        )),
    };

    // CORS: permissive in dev, restrictive in production.
    let cors = if config.is_dev {
        info!("🔓 CORS: permissive (dev mode)");
        CorsLayer::permissive()
    } else {
        tracing::warn!(
            "🔒 CORS: restrictive (production mode). \
             Serve the client from the same origin as the API."
        );
        CorsLayer::new()
    };

    // Prometheus metrics layer
    let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();

    let app = Router::new()
        // Health check + metrics
        .route("/health", get(handlers::health_check))
        .route(
            "/metrics",
            get(move || async move { metric_handle.render() }),
        )
        .route("/api/metadata", get(handlers::metadata::get_metadata))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(prometheus_layer)
        .layer(cors)
        .with_state(app_state);

    let addr = config.server_addr();
    info!("🎧 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .await
        .expect("Server failed to start");
}
