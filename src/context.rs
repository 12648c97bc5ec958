use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};

use resonance_core::{
    Backend, BackgroundTasks, EngineCommand, HttpBackend, IngestionMailbox, MeterEngine,
    SettingsStore, spawn_poller,
};

use crate::presenter::{self, SharedBoard};

/// How often the producer pulls a full dataset.
const POLL_PERIOD: Duration = Duration::from_secs(1);
/// Longest wait for the engine's final settings save at exit.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);
const COMMAND_QUEUE: usize = 32;

/// Startup options taken from the command line.
#[derive(Debug, Default)]
pub struct Startup {
    pub backend_url: Option<String>,
    pub config_path: Option<PathBuf>,
    pub snapshot: Option<PathBuf>,
}

/// Holds all shared state for the terminal front-end.
/// The engine owns the meter state; this only keeps the handles to reach it.
#[derive(Clone)]
pub struct CliContext {
    commands: mpsc::Sender<EngineCommand>,
    pub board: SharedBoard,
    pub tasks: Arc<Mutex<BackgroundTasks>>,
}

impl CliContext {
    /// Load settings, start the producer and the engine loop.
    pub async fn start(startup: Startup) -> Result<Self, String> {
        let store = match startup.config_path {
            Some(path) => SettingsStore::File(path),
            None => SettingsStore::Default,
        };
        let mut settings = store.load();
        if let Some(url) = startup.backend_url {
            settings.backend_url = url;
        }

        let backend = HttpBackend::new(&settings.backend_url).map_err(|e| e.to_string())?;
        if !backend.is_reachable().await {
            println!("Backend at {} is not reachable yet", backend.base_url());
        }

        let mailbox = Arc::new(IngestionMailbox::new());
        let (status_tx, status_rx) = mpsc::unbounded_channel();
        let (command_tx, command_rx) = mpsc::channel(COMMAND_QUEUE);

        let board = SharedBoard::default();
        let mut engine = MeterEngine::new(backend.clone(), Arc::clone(&mailbox), store, settings);
        presenter::attach(engine.view_mut(), &board);

        let mut tasks = BackgroundTasks::default();
        tasks.poller = Some(spawn_poller(backend, mailbox, POLL_PERIOD, status_tx));
        tasks.engine = Some(tokio::spawn(engine.run(command_rx, status_rx)));

        let ctx = Self {
            commands: command_tx,
            board,
            tasks: Arc::new(Mutex::new(tasks)),
        };
        if let Some(path) = startup.snapshot {
            ctx.send(EngineCommand::LoadSnapshot(path)).await?;
        }
        Ok(ctx)
    }

    pub async fn send(&self, command: EngineCommand) -> Result<(), String> {
        self.commands
            .send(command)
            .await
            .map_err(|_| "error: engine is not running".to_string())
    }

    /// Ask the engine to stop, wait for its final save, then stop the producer.
    pub async fn shutdown(&self) {
        let mut tasks = self.tasks.lock().await;
        if self.send(EngineCommand::Shutdown).await.is_ok()
            && let Some(engine) = tasks.engine.take()
        {
            match tokio::time::timeout(SHUTDOWN_TIMEOUT, engine).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::error!(error = %e, "Engine task failed"),
                Err(_) => tracing::warn!("Engine did not stop in time"),
            }
        }
        tasks.abort_all();
    }
}
