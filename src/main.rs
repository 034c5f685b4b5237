use std::path::PathBuf;

use clap::Parser;
use school_portal::{AppState, build_app, config::PortalConfig, observability};

/// School portal server
#[derive(Parser, Debug)]
#[command(version, about = "School portal server", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to the TOML config file
    #[arg(short, long, global = true, default_value = "school-portal.toml")]
    config: PathBuf,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Start the server (default)
    Serve,
    /// Load and validate the config file, then exit
    Check,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let config = match PortalConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config from {}: {}", args.config.display(), e);
            std::process::exit(1);
        }
    };

    match args.command.unwrap_or(Command::Serve) {
        Command::Check => println!("{}: OK", args.config.display()),
        Command::Serve => {
            if let Err(e) = run_server(config, &args.config).await {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    }
}

async fn run_server(
    config: PortalConfig,
    config_path: &std::path::Path,
) -> Result<(), Box<dyn std::error::Error>> {
    observability::init_tracing(&config.observability.logging)?;
    tracing::info!(config_file = %config_path.display(), "Starting school portal");

    let state = AppState::new(config.clone())?;

    if let Some(admin) = &config.auth.bootstrap_admin {
        match state.services.users.ensure_bootstrap_admin(admin).await {
            Ok(true) => tracing::info!(email = %admin.email, "Bootstrap administrator created"),
            Ok(false) => {}
            Err(e) => tracing::error!(error = %e, "Failed to create bootstrap administrator"),
        }
    }

    if !config.auth.token_cookie.secure {
        tracing::warn!("Token cookie is not marked Secure; browsers will send it over plain HTTP");
    }

    let app = build_app(&config, state);

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Server listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
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

    tracing::info!("Shutdown signal received");
}
