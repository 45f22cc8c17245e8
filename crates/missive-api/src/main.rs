//! Missive CLI and REST API entry point.
//!
//! Binary name: `missive`
//!
//! Parses CLI arguments, loads configuration, initializes the database and
//! message service, then dispatches to the appropriate command handler or
//! starts the REST API server.

mod cli;
mod http;
mod state;

use clap::Parser;
use clap_complete::generate;

use cli::message::SendArgs;
use cli::{Cli, Commands};
use missive_observe::tracing_setup::{default_filter, init_tracing, shutdown_tracing};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Shell completions don't need tracing or app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "missive", &mut std::io::stdout());
        return Ok(());
    }

    init_tracing(default_filter(cli.verbose, cli.quiet), cli.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let result = run(cli).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Initialize application state (config, DB, services)
    let state = AppState::init(cli.config.as_deref()).await?;

    match cli.command {
        Commands::Serve { port, host } => {
            let host = host.unwrap_or_else(|| state.config.server.host.clone());
            let port = port.unwrap_or(state.config.server.port);
            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            if !cli.quiet {
                println!(
                    "  {} Missive API listening on {}",
                    console::style("⚡").bold(),
                    console::style(format!("http://{addr}")).cyan()
                );
                println!("  {}", console::style("Press Ctrl+C to stop").dim());
            }
            tracing::info!(%addr, api_keys = state.api_keys.len(), "Server started");

            let db_pool = state.db_pool.clone();
            let router = http::router::build_router(state);

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            db_pool.close().await;
            if !cli.quiet {
                println!("\n  Server stopped.");
            }
        }

        Commands::Send {
            session,
            sender,
            content,
            id,
            timestamp,
        } => {
            let args = SendArgs {
                session,
                sender,
                content,
                id,
                timestamp,
            };
            cli::message::send_message(&state, args, cli.json).await?;
        }

        Commands::Show { message_id } => {
            cli::message::show_message(&state, &message_id, cli.json).await?;
        }

        Commands::List {
            session_id,
            limit,
            offset,
            sender,
        } => {
            cli::message::list_messages(
                &state,
                &session_id,
                limit,
                offset,
                sender.as_deref(),
                cli.json,
            )
            .await?;
        }

        Commands::Stats { session_id } => {
            cli::session::session_stats(&state, &session_id, cli.json).await?;
        }

        Commands::Search {
            query,
            limit,
            offset,
        } => {
            cli::message::search_messages(&state, &query, limit, offset, cli.json).await?;
        }

        Commands::Sessions { limit } => {
            cli::session::list_sessions(&state, limit, cli.json).await?;
        }

        Commands::Delete { message_id, force } => {
            cli::message::delete_message(&state, &message_id, force, cli.json).await?;
        }

        Commands::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to install SIGTERM handler: {err}");
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
