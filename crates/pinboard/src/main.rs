mod app;
mod cache;
mod config;
mod context;
mod handlers;
mod rate_limit;
mod services;
mod state;
mod storage;
mod supervisor;

use std::{net::SocketAddr, time::Duration};

use anyhow::Result;
use clap::Parser;
use listenfd::ListenFd;
use tokio::{net::TcpListener, signal};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    app::create_app,
    config::Config,
    state::AppState,
    supervisor::{Shutdown, Supervisor},
};

/// Pinboard - Pin images, organize them into boards, and follow your friends
#[derive(Parser, Debug)]
#[command(name = "pinboard")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Host address to bind the server to
    #[arg(long, short = 'H', default_value = "0.0.0.0", env = "HOST")]
    host: String,

    /// Port to listen on
    #[arg(long, short, default_value = "3000", env = "PORT")]
    port: u16,

    /// Number of serving workers (default: available parallelism)
    #[arg(long, short, env = "WORKERS")]
    workers: Option<usize>,

    /// Delay before a crashed worker is restarted, in milliseconds
    #[arg(long, default_value = "100", env = "RESTART_BACKOFF_MS")]
    restart_backoff_ms: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing();

    let config = Config::from_env();
    let state = AppState::new(config).await?;
    let app = create_app(state);

    // Auto-reload support via listenfd
    let mut listenfd = ListenFd::from_env();
    let listener = match listenfd.take_tcp_listener(0)? {
        // If we are given a tcp listener on listen fd 0, use that one
        Some(listener) => listener,
        // Otherwise fall back to CLI-specified host:port
        None => std::net::TcpListener::bind(format!("{}:{}", cli.host, cli.port))?,
    };
    listener.set_nonblocking(true)?;

    tracing::info!("listening on {}", listener.local_addr()?);

    let workers = cli.workers.unwrap_or_else(|| {
        std::thread::available_parallelism()
            .map(|p| p.get())
            .unwrap_or(4)
    });

    let (trigger, shutdown) = Shutdown::channel();
    tokio::spawn(async move {
        shutdown_signal().await;
        trigger.send_replace(true);
    });

    // Every worker accepts on its own handle to the same socket.
    let serve = move |worker: usize, shutdown: Shutdown| {
        let app = app.clone();
        let listener = listener.try_clone();
        async move {
            let listener = TcpListener::from_std(listener?)?;
            tracing::debug!(worker, "Worker accepting connections");
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .with_graceful_shutdown(shutdown.wait())
            .await?;
            Ok::<(), anyhow::Error>(())
        }
    };

    Supervisor::new(workers, Duration::from_millis(cli.restart_backoff_ms))
        .run(serve, shutdown)
        .await;

    tracing::info!("Server stopped");
    Ok(())
}

/// Logs go to stdout; `LOG_FORMAT=json` switches to one JSON object per line.
fn init_tracing() {
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pinboard=debug,tower_http=debug".into()),
        )
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(tracing_subscriber::fmt::layer))
        .init();
}

/// Wait for shutdown signals (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
    }
}
