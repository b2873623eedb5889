use std::time::Duration;

use dotenvy::dotenv;
use sea_orm::{ConnectOptions, Database};
use song_submissions::{
    migration::{Migrator, MigratorTrait},
    router, AdminGate, AppState, Config, ExpiredDeletion, SeaOrmSessionStore,
    SeaOrmSubmissionStore,
};
use time::Duration as TimeDuration;
use tokio::signal;
use tower_sessions::{Expiry, SessionManagerLayer};
use tracing::{error, info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Before tracing, so RUST_LOG may come from .env
    dotenv().ok();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init();

    let config = Config::from_env()?;

    let mut opt = ConnectOptions::new(config.database_url.clone());
    opt.max_connections(config.db_max_connections)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(10))
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(10))
        .max_lifetime(Duration::from_secs(10 * 60))
        .sqlx_logging(false);

    let db = Database::connect(opt).await?;
    info!("Connected to database");

    Migrator::up(&db, None).await?;
    info!("Migrations applied");

    let session_store = SeaOrmSessionStore::new(db.clone());
    tokio::spawn(delete_expired_sessions(
        session_store.clone(),
        config.session_cleanup_period,
    ));

    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(config.secure_cookies)
        .with_expiry(Expiry::OnInactivity(TimeDuration::days(
            config.session_ttl_days,
        )));

    let state = AppState::new(
        SeaOrmSubmissionStore::new(db),
        AdminGate::new(config.admin_password.clone()),
    );
    let app = router(state).layer(session_layer);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("Server starting on http://{}", config.bind_addr);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn delete_expired_sessions(store: SeaOrmSessionStore, period: Duration) {
    let mut interval = tokio::time::interval(period);
    loop {
        interval.tick().await;
        if let Err(err) = store.delete_expired().await {
            error!(error = %err, "failed to delete expired sessions");
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(err) => {
                error!(error = %err, "failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
