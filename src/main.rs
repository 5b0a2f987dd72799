use clap::Parser;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{error, info, warn};
use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use sitewatch::alerting::evaluation_service::EvaluationService;
use sitewatch::bot::api::BotApiClient;
use sitewatch::bot::{poller, BotContext};
use sitewatch::config::SiteWatchConfig;
use sitewatch::db;
use sitewatch::monitor::{checker, MonitorState};
use sitewatch::notifications::encryption::EncryptionService;
use sitewatch::notifications::service::NotificationService;
use sitewatch::version::VERSION;
use sitewatch::web::{create_router, AppState};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Receive bot updates over an inbound webhook instead of long polling
    #[arg(long)]
    webhook: bool,
}

fn init_logging(log_dir: &str) {
    // The appender panics if the directory cannot be created lazily.
    let _ = std::fs::create_dir_all(log_dir);

    // Log to a file: JSON format, daily rotation
    let file_appender = rolling::daily(log_dir, "sitewatch.log");
    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false) // No ANSI colors in file
        .json();

    // Log to stdout: human-readable format
    let stdout_layer = fmt::layer().with_writer(std::io::stdout);

    // Combine layers and filter based on RUST_LOG
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx::query=warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();
}

async fn wait_for_shutdown() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler.");
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
                error!(error = %e, "Failed to install SIGTERM handler.");
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

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Manually check for --version before full parsing to keep the output simple.
    if std::env::args().any(|arg| arg == "--version") {
        println!("sitewatch version: {VERSION}");
        return Ok(());
    }

    let args = Args::parse();

    // --- Config Setup ---
    let config = match SiteWatchConfig::load(args.config.as_deref()) {
        Ok(config) => Arc::new(config),
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return Err(e.into());
        }
    };

    init_logging(&config.log_dir);
    info!(version = VERSION, url = %config.check_url, "Starting sitewatch.");

    // --- Database Setup ---
    let pool = db::init_pool(&config.data_dir).await?;

    // --- Notification Service Setup ---
    let encryption = Arc::new(EncryptionService::from_hex_key(&config.encryption_key)?);
    let notification_service = Arc::new(NotificationService::new(pool.clone(), encryption));

    // --- Monitor Setup ---
    let monitor = MonitorState::new_shared();
    let (outcome_tx, outcome_rx) = mpsc::channel(100);
    let (shutdown_tx, shutdown_rx) = watch::channel(());

    let check_client = checker::build_client(&config)?;
    let check_task = tokio::spawn(checker::run_check_loop(
        check_client,
        config.clone(),
        outcome_tx,
        shutdown_rx.clone(),
    ));

    let evaluation_service = Arc::new(EvaluationService::new(
        pool.clone(),
        config.clone(),
        monitor.clone(),
        notification_service.clone(),
    ));
    let evaluation_task = tokio::spawn(evaluation_service.run(outcome_rx));

    let retention_task = tokio::spawn(db::tasks::run_retention_task(
        pool.clone(),
        config.retention_days,
        shutdown_rx.clone(),
    ));

    // --- Bot Setup ---
    let bot_api = Arc::new(BotApiClient::new(&config.bot_token));
    let bot_context = Arc::new(BotContext::new(
        bot_api.clone(),
        pool.clone(),
        monitor.clone(),
        config.clone(),
    ));

    // --- Shutdown Signal Task ---
    tokio::spawn(async move {
        wait_for_shutdown().await;
        info!("Shutdown signal received.");
        if shutdown_tx.send(()).is_err() {
            warn!("All shutdown receivers already dropped.");
        }
    });

    if args.webhook {
        // Webhook mode: receive updates over HTTP and serve the status API.
        if let Some(public_url) = &config.public_webhook_url {
            match bot_api.set_webhook(public_url).await {
                Ok(()) => info!(url = %public_url, "Webhook registered with the bot API."),
                Err(e) => warn!(error = %e, "Failed to register webhook with the bot API."),
            }
        } else {
            warn!("No public_webhook_url configured; expecting an external webhook registration.");
        }

        let app_state = Arc::new(AppState {
            config: config.clone(),
            pool: pool.clone(),
            monitor: monitor.clone(),
            bot: bot_context.clone(),
            notification_service: notification_service.clone(),
        });
        let app = create_router(app_state);

        let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
        info!(address = %config.listen_addr, "HTTP server listening.");

        let mut serve_shutdown_rx = shutdown_rx.clone();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = serve_shutdown_rx.changed().await;
            })
            .await?;
    } else {
        // Polling mode: long-poll the bot API in the foreground.
        poller::run_polling_loop(bot_context, shutdown_rx.clone()).await;
    }

    // Monitor tasks exit once the shutdown channel fires.
    let _ = check_task.await;
    let _ = evaluation_task.await;
    let _ = retention_task.await;

    info!("sitewatch stopped.");
    Ok(())
}
