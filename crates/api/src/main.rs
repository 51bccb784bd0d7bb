use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use atelier_api::config::ServerConfig;
use atelier_api::notifications::NotificationMailer;
use atelier_api::router::build_app_router;
use atelier_api::state::AppState;
use atelier_events::EventBus;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "atelier_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(ServerConfig::from_env());

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = atelier_db::create_pool(&database_url)
        .await
        .expect("failed to connect to database");
    atelier_db::health_check(&pool)
        .await
        .expect("database health check failed");
    atelier_db::run_migrations(&pool)
        .await
        .expect("failed to run migrations");
    tracing::info!("database ready");

    let event_bus = Arc::new(EventBus::default());
    let mailer = NotificationMailer::new(pool.clone());
    let mailer_handle = tokio::spawn(mailer.run(event_bus.subscribe()));

    let state = AppState::new(pool, config.clone(), event_bus.clone());
    let app = build_app_router(state, &config);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind listen address");
    tracing::info!(addr = %addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    // The serve future has dropped its state by now; releasing our bus
    // handle closes the channel and lets the mailer loop exit.
    drop(event_bus);
    if tokio::time::timeout(
        Duration::from_secs(config.shutdown_timeout_secs),
        mailer_handle,
    )
    .await
    .is_err()
    {
        tracing::warn!("notification mailer did not stop within the shutdown window");
    }

    tracing::info!("shutdown complete");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
