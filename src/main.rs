use clap::Parser;
use tracing_subscriber::EnvFilter;

use sessionkey::{ServerArgs, build_state};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = ServerArgs::parse();

    // Initialize tracing
    init_tracing();

    // Configuration problems are fatal
    let state = build_state(&args).inspect_err(|e| tracing::error!("{}", e))?;

    let app = sessionkey::create_router(state);

    // Create a TCP listener
    let listener = tokio::net::TcpListener::bind(args.listen).await?;
    tracing::info!("session key service listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
