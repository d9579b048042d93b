// src/main.rs
// =============================================================================
// This is the entry point of the link-prober server.
//
// What happens here:
// 1. Parse command-line arguments (and PROBER_* environment variables)
// 2. Set up logging with tracing (RUST_LOG controls the level)
// 3. Build the shared state and the axum router
// 4. Serve until Ctrl-C / SIGTERM, then shut down gracefully
// 5. Exit with proper code (0 = clean shutdown, 1 = startup or server error)
//
// Rust concepts used:
// - async/await: The server and every probe run on the tokio runtime
// - anyhow::Result + .context(): Attach a readable message to any error
// =============================================================================

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use link_prober::{api, build_state, cli::Cli};

// The #[tokio::main] attribute transforms our async main into a real main function
// It creates a tokio runtime and runs our async code inside it
#[tokio::main]
async fn main() {
    init_logging();

    let exit_code = match run().await {
        Ok(()) => 0,
        Err(e) => {
            // {:#} prints the whole context chain on one line
            error!("{:#}", e);
            1
        }
    };

    std::process::exit(exit_code);
}

// Logs go to stderr; RUST_LOG overrides the default filter,
// e.g. RUST_LOG=link_prober=debug to see every probed URL
fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("link_prober=info,tower_http=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<()> {
    let config = Cli::parse()
        .into_config()
        .context("invalid configuration")?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        pool_size = config.probe.pool_size,
        max_redirects = config.probe.max_redirects,
        "starting link-prober"
    );

    let shutdown = CancellationToken::new();
    let state = build_state(&config.probe, shutdown.clone()).context("failed to build HTTP client")?;
    let app = api::create_router(state);

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.listen_addr))?;

    info!(addr = %config.listen_addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await
        .context("server error")?;

    info!("server stopped");
    Ok(())
}

// Resolves once the process is asked to stop, after cancelling the token
// so batches still in flight wind down instead of holding up the shutdown
async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to listen for SIGTERM");
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

    info!("shutdown requested");
    shutdown.cancel();
}
