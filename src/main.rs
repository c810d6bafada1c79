use pairchat::{AppState, ChatService, config::Config};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_telemetry(&config);

    let store = config.database.open(config.max_connections).await?;
    let app_state = AppState {
        chat: ChatService::new(store, config.sender_policy),
    };
    let app = pairchat::app(app_state);

    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    info!(
        addr = %listener.local_addr()?,
        database = ?config.database,
        sender_policy = ?config.sender_policy,
        "pairchat listening"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("pairchat stopped");
    Ok(())
}

fn init_telemetry(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let registry = tracing_subscriber::registry().with(filter);

    if config.log_json {
        registry
            .with(fmt::layer().json().with_target(true))
            .init();
    } else {
        registry.with(fmt::layer().with_target(false)).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
}
