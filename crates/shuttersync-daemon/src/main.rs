//! ShutterSync Daemon - Background folder synchronization service
//!
//! This binary watches an event photo folder and mirrors it to the remote
//! image service:
//! - New files are debounced, deduplicated, optionally composited with an
//!   event frame, and uploaded
//! - Removed files are debounced and deleted remotely
//! - Graceful shutdown on SIGTERM/SIGINT
//!
//! # Architecture
//!
//! The daemon wires three long-lived tasks over mpsc channels: the watch
//! supervisor feeding events in, and the add/delete queue drains consuming
//! them. All three are controlled by a `CancellationToken` triggered on
//! receipt of SIGTERM or SIGINT.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use shuttersync_api::HttpSyncClient;
use shuttersync_core::config::Config;
use shuttersync_core::ports::{
    IActivityLog, IFolderPicker, INotifier, IRemoteSyncClient, ISessionProvider,
};
use shuttersync_pipeline::ledger::UploadLedger;
use shuttersync_pipeline::queue::{run_add_queue, run_delete_queue, QueueConfig};
use shuttersync_pipeline::{FileProcessor, WatchSupervisor};

mod adapters;

use adapters::{ConfigSessionProvider, HeadlessFolderPicker, LogActivityJournal, LogNotifier};

/// Background folder synchronization daemon
#[derive(Debug, Parser)]
#[command(name = "shuttersyncd", version, about = "Event photo folder sync daemon")]
struct Args {
    /// Use alternate config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Watch this folder instead of the configured one
    #[arg(long)]
    folder: Option<PathBuf>,
}

// ============================================================================
// DaemonService
// ============================================================================

/// Main daemon service that owns the pipeline wiring
struct DaemonService {
    /// Application configuration loaded from YAML
    config: Config,
    /// The folder to watch
    folder: PathBuf,
    /// Token for signalling graceful shutdown to all async tasks
    shutdown: CancellationToken,
}

impl DaemonService {
    /// Loads configuration and resolves the watch folder
    fn new(args: &Args, shutdown: CancellationToken) -> Result<Self> {
        let config_path = args
            .config
            .clone()
            .unwrap_or_else(Config::default_path);
        let config = Config::load_or_default(&config_path);
        info!(config_path = %config_path.display(), "Loaded configuration");

        for issue in config.validate() {
            warn!(field = %issue.field, message = %issue.message, "Configuration issue");
        }

        let folder = args
            .folder
            .clone()
            .or_else(|| config.sync.folder.clone())
            .context(
                "No folder to watch. Set sync.folder in the config or pass --folder.",
            )?;

        Ok(Self {
            config,
            folder,
            shutdown,
        })
    }

    /// Runs the pipeline until shutdown
    ///
    /// Builds the adapters, spawns the two queue drains, and drives the
    /// watch supervisor on the current task. Stopping the watch does not
    /// cancel an in-flight drain; the queue tasks finish their current
    /// snapshot once their channels close.
    async fn run(&self) -> Result<()> {
        let remote: Arc<dyn IRemoteSyncClient> =
            Arc::new(HttpSyncClient::new(self.config.api.base_url.clone()));
        let session: Arc<dyn ISessionProvider> =
            Arc::new(ConfigSessionProvider::new(self.config.session.clone()));
        let notifier: Arc<dyn INotifier> = Arc::new(LogNotifier);
        let activity: Arc<dyn IActivityLog> = Arc::new(LogActivityJournal);
        let picker: Arc<dyn IFolderPicker> = Arc::new(HeadlessFolderPicker);

        let ledger = UploadLedger::new(self.config.sync.ledger_file.clone());
        info!(
            ledger = %self.config.sync.ledger_file.display(),
            "Upload ledger ready"
        );

        let processor = Arc::new(FileProcessor::new(
            remote,
            session,
            notifier.clone(),
            activity.clone(),
            ledger,
            Duration::from_millis(self.config.sync.delete_timeout_ms),
        ));

        let queue_config = QueueConfig {
            drain_idle: Duration::from_millis(self.config.sync.drain_idle_ms),
            action_delay: Duration::from_millis(self.config.sync.action_delay_ms),
        };

        let (add_tx, add_rx) = mpsc::channel(1024);
        let (delete_tx, delete_rx) = mpsc::channel(1024);

        let add_drain = tokio::spawn(run_add_queue(
            add_rx,
            processor.clone(),
            queue_config.clone(),
        ));
        let delete_drain = tokio::spawn(run_delete_queue(
            delete_rx,
            processor,
            queue_config,
        ));

        let supervisor =
            WatchSupervisor::new(add_tx, delete_tx, picker, notifier, activity);
        let result = supervisor
            .run(self.folder.clone(), self.shutdown.clone())
            .await;

        // Release the queue senders so the drains observe channel close and
        // stop once their current snapshot (if any) completes.
        drop(supervisor);
        if let Err(e) = add_drain.await {
            error!(error = %e, "Add queue task panicked");
        }
        if let Err(e) = delete_drain.await {
            error!(error = %e, "Delete queue task panicked");
        }

        result
    }
}

// ============================================================================
// Graceful shutdown signal handler
// ============================================================================

/// Waits for SIGTERM or SIGINT and triggers the cancellation token
async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C)");
        }
        _ = terminate => {
            info!("Received SIGTERM");
        }
    }

    token.cancel();
}

// ============================================================================
// Main entry point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let shutdown_token = CancellationToken::new();
    let service = DaemonService::new(&args, shutdown_token.clone())?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(service.config.logging.level.clone()));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .init();

    info!("ShutterSync daemon starting (shuttersyncd)");

    let signal_token = shutdown_token.clone();
    tokio::spawn(async move {
        shutdown_signal(signal_token).await;
    });

    let result = service.run().await;

    match &result {
        Ok(()) => info!("ShutterSync daemon shut down gracefully"),
        Err(e) => error!(error = %e, "ShutterSync daemon exiting with error"),
    }

    result
}

// ============================================================================
// Tests
// ============================================================================
