use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, warn};

use fitness_plan_proxy::config::{Cli, Config, API_KEY_ENV};
use fitness_plan_proxy::server::proxy_api::{build_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments.
    let cli = Cli::parse();

    // Initialize tracing/logging.
    let filter = if cli.verbose {
        "fitness_plan_proxy=debug,tower_http=debug"
    } else {
        "fitness_plan_proxy=info,tower_http=info"
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with_target(true);

    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    info!("fitness-plan-proxy v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration. A missing key is reported per request, not here.
    let config = Config::load(&cli.config)?.with_api_key_from_env();

    if config.api_key.is_none() {
        warn!("{API_KEY_ENV} is not set; proxy requests will fail with 500");
    }

    info!(
        route = %config.server.route,
        endpoint = %config.upstream.endpoint(),
        "Configuration loaded"
    );

    let state = AppState::new(config);
    let app = build_router(state);

    // Start the server.
    let listen_addr = cli.listen;
    info!(addr = %listen_addr, "Starting server");

    let listener = TcpListener::bind(&listen_addr).await?;
    info!("Listening on {listen_addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
