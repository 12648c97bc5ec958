//! Meter engine - the single consumer loop that owns all display state
//!
//! Architecture:
//! - A producer task (see [`crate::backend::spawn_poller`]) posts full datasets
//!   into the shared [`IngestionMailbox`]; that mailbox is the only state
//!   touched from outside the loop.
//! - [`MeterEngine::run`] drains the mailbox on every UI tick, reconciles the
//!   cache, sweeps idle entities and rebuilds the ranked rows.
//! - Detail fetches run as spawned tasks and report back over a channel, so a
//!   slow backend never stalls a tick.
//! - User commands arrive as [`EngineCommand`]s; results reach the
//!   presentation layer through the observables in [`MeterView`].

mod error;
mod mode;
mod view;


pub use error::EngineError;
pub use mode::{FreezePlan, FrozenView, Mode, ModeController, ThawPlan};
pub use view::MeterView;

use chrono::Local;
use futures::FutureExt;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use resonance_types::{ConnectionStatus, SearchMode, SortColumn, ViewMode};

use crate::backend::Backend;
use crate::cache::{ActivityTracker, DetailTicket, EntityCache};
use crate::context::{MeterSettings, SettingsStore};
use crate::dataset::{Dataset, DetailBlock, EntityId};
use crate::detail::DetailSummary;
use crate::mailbox::IngestionMailbox;
use crate::ranking::{self, SearchFilter, SortSpec};
use crate::session::{CombatClock, Countdown, CountdownTick};
use crate::snapshot::{self, SnapshotError, SnapshotRecord};

pub const CLOCK_PERIOD: Duration = Duration::from_secs(1);
pub const SETTINGS_SAVE_PERIOD: Duration = Duration::from_secs(5);
/// Longest a value-only change waits before the rows are rebuilt.
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(1);

const MIN_UI_INTERVAL_MS: u64 = 50;

// ─────────────────────────────────────────────────────────────────────────────
// Commands
// ─────────────────────────────────────────────────────────────────────────────

/// Messages sent to the engine from the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCommand {
    SortBy(SortColumn),
    SetIdleMode(bool),
    SetFilter { mode: SearchMode, query: String },
    Inspect(EntityId),
    SaveSnapshot,
    LoadSnapshot(PathBuf),
    ExitSnapshot,
    TogglePause,
    Reset,
    StartCountdown(u32),
    AbortCountdown,
    Shutdown,
}

/// A finished detail fetch. `outcome` is `None` when the request failed.
#[derive(Debug)]
pub struct DetailCompletion {
    ticket: DetailTicket,
    outcome: Option<DetailBlock>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Engine
// ─────────────────────────────────────────────────────────────────────────────

pub struct MeterEngine<B: Backend> {
    backend: B,
    mailbox: Arc<IngestionMailbox>,
    store: SettingsStore,
    settings: MeterSettings,

    cache: EntityCache,
    tracker: ActivityTracker,
    sort: SortSpec,
    filter: SearchFilter,
    clock: CombatClock,
    countdown: Countdown,
    mode: ModeController,
    paused: bool,
    inspected: Option<EntityId>,

    view: MeterView,
    detail_tx: mpsc::UnboundedSender<DetailCompletion>,
    detail_rx: Option<mpsc::UnboundedReceiver<DetailCompletion>>,

    /// Values changed since the last refresh
    dirty: bool,
    next_refresh: Instant,
}

impl<B: Backend> MeterEngine<B> {
    pub fn new(
        backend: B,
        mailbox: Arc<IngestionMailbox>,
        store: SettingsStore,
        settings: MeterSettings,
    ) -> Self {
        let (detail_tx, detail_rx) = mpsc::unbounded_channel();
        let clock = CombatClock::restore(settings.elapsed_seconds, settings.fight_active);
        let mut view = MeterView::new();
        view.duration.set(clock.duration_text());

        Self {
            backend,
            mailbox,
            store,
            cache: EntityCache::new(),
            tracker: ActivityTracker::new(
                Duration::from_secs(settings.idle_threshold_secs),
                settings.idle_mode_enabled,
            ),
            sort: SortSpec::new(settings.sort_column, settings.sort_direction),
            filter: SearchFilter::default(),
            clock,
            countdown: Countdown::default(),
            mode: ModeController::new(settings.pause_on_snapshot),
            paused: false,
            inspected: None,
            view,
            detail_tx,
            detail_rx: Some(detail_rx),
            dirty: false,
            next_refresh: Instant::now(),
            settings,
        }
    }

    pub fn view(&self) -> &MeterView {
        &self.view
    }

    /// Subscribe to view fields before calling [`run`](Self::run).
    pub fn view_mut(&mut self) -> &mut MeterView {
        &mut self.view
    }

    pub fn cache(&self) -> &EntityCache {
        &self.cache
    }

    pub fn mode(&self) -> &ModeController {
        &self.mode
    }

    pub fn clock(&self) -> &CombatClock {
        &self.clock
    }

    pub fn settings(&self) -> &MeterSettings {
        &self.settings
    }

    pub fn sort(&self) -> SortSpec {
        self.sort
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Idle classification runs only in live mode with the toggle on.
    pub fn idle_active(&self) -> bool {
        self.tracker.is_enabled() && self.mode.is_live()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Event Loop
    // ─────────────────────────────────────────────────────────────────────────

    /// Run until [`EngineCommand::Shutdown`] arrives or the command channel closes.
    pub async fn run(
        mut self,
        mut commands: mpsc::Receiver<EngineCommand>,
        mut status_rx: mpsc::UnboundedReceiver<ConnectionStatus>,
    ) {
        let Some(mut detail_rx) = self.detail_rx.take() else {
            tracing::error!("Engine already ran");
            return;
        };
        self.initialize().await;

        let ui_period =
            Duration::from_millis(self.settings.ui_update_interval_ms.max(MIN_UI_INTERVAL_MS));
        let start = tokio::time::Instant::now();
        let mut ui = tokio::time::interval(ui_period);
        let mut clock = tokio::time::interval_at(start + CLOCK_PERIOD, CLOCK_PERIOD);
        let mut save = tokio::time::interval_at(start + SETTINGS_SAVE_PERIOD, SETTINGS_SAVE_PERIOD);
        ui.set_missed_tick_behavior(MissedTickBehavior::Skip);
        clock.set_missed_tick_behavior(MissedTickBehavior::Skip);
        save.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!(ui_ms = ui_period.as_millis() as u64, "Engine running");

        loop {
            tokio::select! {
                _ = ui.tick() => self.tick_ui(Instant::now()),
                _ = clock.tick() => self.tick_clock(Instant::now()).await,
                _ = save.tick() => self.save_settings(),
                Some(done) = detail_rx.recv() => self.apply_detail(done, Instant::now()),
                Some(status) = status_rx.recv() => self.on_connection(status).await,
                command = commands.recv() => {
                    let Some(command) = command else {
                        self.shutdown().await;
                        break;
                    };
                    let stop = command == EngineCommand::Shutdown;
                    self.dispatch(command, Instant::now()).await;
                    if stop {
                        break;
                    }
                }
            }
        }
    }

    /// Query the pause state and seed the cache from one pull.
    pub async fn initialize(&mut self) {
        match self.backend.is_paused().await {
            Ok(paused) => self.set_local_paused(paused),
            Err(e) => tracing::warn!(error = %e, "Could not query backend pause state"),
        }

        let now = Instant::now();
        match self.backend.pull().await {
            Ok(dataset) => {
                if !dataset.has_output() && self.clock.is_started() {
                    tracing::info!("Backend has no data, combat clock reset");
                    self.clock.reset();
                    self.view.duration.set(self.clock.duration_text());
                }
                self.seed_live(&dataset, now);
            }
            Err(e) => tracing::warn!(error = %e, "Initial pull failed"),
        }
        self.refresh(now);
    }

    /// [`on_ui_tick`](Self::on_ui_tick) with panics caught and logged, so a
    /// bad tick never stops the loop.
    pub fn tick_ui(&mut self, now: Instant) {
        if panic::catch_unwind(AssertUnwindSafe(|| self.on_ui_tick(now))).is_err() {
            tracing::error!("UI tick panicked, skipped");
        }
    }

    /// [`on_clock_tick`](Self::on_clock_tick) with panics caught and logged.
    pub async fn tick_clock(&mut self, now: Instant) {
        let tick = AssertUnwindSafe(self.on_clock_tick(now)).catch_unwind();
        if tick.await.is_err() {
            tracing::error!("Clock tick panicked, skipped");
        }
    }

    /// Drain the mailbox, classify idle entities and refresh when needed.
    ///
    /// Every collaborator failure is mapped to "no data" before it gets here,
    /// so a tick always completes.
    pub fn on_ui_tick(&mut self, now: Instant) {
        let mut resort = false;

        if self.mode.is_live() {
            if let Some(dataset) = self.mailbox.take_and_clear() {
                resort |= self.apply_live_dataset(&dataset, now);
            }
            if self.idle_active() && !self.tracker.sweep(&mut self.cache, now).is_empty() {
                resort = true;
            }
            for ticket in self.cache.due_detail_fetches(now) {
                self.spawn_detail_fetch(ticket);
            }
        }

        if resort || (self.dirty && now >= self.next_refresh) {
            self.refresh(now);
        }
    }

    /// One-second tick for the combat clock and the countdown.
    pub async fn on_clock_tick(&mut self, now: Instant) {
        if self.clock.tick(now) {
            self.view.duration.set(self.clock.duration_text());
        }

        match self.countdown.tick() {
            CountdownTick::Idle => {}
            CountdownTick::Running(_) => {
                self.view.countdown.set(self.countdown.text());
            }
            CountdownTick::Finished => {
                self.view.countdown.set(String::new());
                tracing::info!("Countdown finished");
                if let Err(e) = self.set_backend_paused(true).await {
                    tracing::warn!(error = %e, "Could not pause backend after countdown");
                }
                self.notify("Countdown finished");
            }
        }
    }

    pub fn apply_detail(&mut self, completion: DetailCompletion, now: Instant) {
        let id = completion.ticket.id;
        if self
            .cache
            .complete_detail(completion.ticket, completion.outcome, now)
            && self.inspected == Some(id)
        {
            self.publish_inspection(id);
        }
    }

    pub async fn on_connection(&mut self, status: ConnectionStatus) {
        self.view.connection.set(status);
        if status == ConnectionStatus::Connected {
            match self.backend.is_paused().await {
                Ok(paused) => self.set_local_paused(paused),
                Err(e) => tracing::debug!(error = %e, "Pause state unavailable after reconnect"),
            }
        }
    }

    /// Rebuild percentages (live only), order, ranks, rows and totals.
    pub fn refresh(&mut self, now: Instant) {
        let totals = if self.mode.is_live() {
            ranking::compute_percentages(&mut self.cache)
        } else {
            ranking::active_totals(&self.cache)
        };
        let idle_active = self.idle_active();
        ranking::sort_and_rank(&mut self.cache, self.sort, idle_active);

        let rows = ranking::build_rows(&self.cache, self.sort.column, &self.filter);
        self.view.rows.set(rows);
        self.view.totals.set(ranking::column_totals(&totals));

        self.dirty = false;
        self.next_refresh = now + REFRESH_INTERVAL;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Live Data
    // ─────────────────────────────────────────────────────────────────────────

    /// Reconcile a live dataset. Returns true if the list must be re-sorted now.
    fn apply_live_dataset(&mut self, dataset: &Dataset, now: Instant) -> bool {
        let result = self.cache.reconcile(dataset, now);
        if result.any_data_changed {
            self.dirty = true;
            let has_output = dataset.has_output();
            if !has_output && self.clock.is_started() {
                tracing::info!("Backend data cleared, combat clock reset");
                self.clock.reset();
                self.view.duration.set(self.clock.duration_text());
            } else {
                self.clock.record_activity(now, has_output);
            }
        }
        if self.inspected.is_some_and(|id| result.removed.contains(&id)) {
            self.inspected = None;
            self.view.inspection.set(None);
        }
        result.needs_resort()
    }

    /// Populate the cache without counting the data as new activity.
    fn seed_live(&mut self, dataset: &Dataset, now: Instant) {
        self.cache.reconcile(dataset, now);
        self.dirty = true;
    }

    fn spawn_detail_fetch(&self, ticket: DetailTicket) {
        let backend = self.backend.clone();
        let tx = self.detail_tx.clone();
        tokio::spawn(async move {
            let outcome = match backend.fetch_detail(ticket.id).await {
                Ok(block) => Some(block),
                Err(e) => {
                    tracing::debug!(entity_id = ticket.id, error = %e, "Detail fetch failed");
                    None
                }
            };
            // The engine may already be gone
            let _ = tx.send(DetailCompletion { ticket, outcome });
        });
    }

    /// Fetch details inline for every record that has none yet.
    async fn fetch_missing_details(&mut self, now: Instant) {
        for id in self.cache.missing_details() {
            let Some(ticket) = self.cache.claim_detail_fetch(id) else {
                continue;
            };
            let outcome = match self.backend.fetch_detail(id).await {
                Ok(block) => Some(block),
                Err(e) => {
                    tracing::debug!(entity_id = id, error = %e, "Detail fetch failed");
                    None
                }
            };
            self.cache.complete_detail(ticket, outcome, now);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Commands
    // ─────────────────────────────────────────────────────────────────────────

    /// Handle a command, logging and surfacing any failure as a notice.
    pub async fn dispatch(&mut self, command: EngineCommand, now: Instant) {
        tracing::debug!(?command, "Engine command");
        if let Err(e) = self.handle_command(command, now).await {
            let text = describe(&e);
            tracing::warn!(error = %text, "Command failed");
            self.notify(text);
        }
    }

    pub async fn handle_command(
        &mut self,
        command: EngineCommand,
        now: Instant,
    ) -> Result<(), EngineError> {
        match command {
            EngineCommand::SortBy(column) => {
                self.sort.select(column);
                self.refresh(now);
            }
            EngineCommand::SetIdleMode(enabled) => self.set_idle_mode(enabled, now),
            EngineCommand::SetFilter { mode, query } => {
                self.filter = SearchFilter::new(mode, query);
                self.refresh(now);
            }
            EngineCommand::Inspect(id) => self.inspect(id)?,
            EngineCommand::SaveSnapshot => {
                let path = self.save_snapshot(now).await?;
                self.notify(format!("Snapshot saved: {}", path.display()));
            }
            EngineCommand::LoadSnapshot(path) => self.load_snapshot(&path, now).await?,
            EngineCommand::ExitSnapshot => self.exit_snapshot(now).await,
            EngineCommand::TogglePause => self.set_backend_paused(!self.paused).await?,
            EngineCommand::Reset => {
                self.require_live("reset")?;
                self.reset_data(now).await?;
            }
            EngineCommand::StartCountdown(seconds) => self.start_countdown(seconds, now).await?,
            EngineCommand::AbortCountdown => self.abort_countdown().await?,
            EngineCommand::Shutdown => self.shutdown().await,
        }
        Ok(())
    }

    fn require_live(&self, action: &'static str) -> Result<(), EngineError> {
        if self.mode.is_live() {
            Ok(())
        } else {
            Err(EngineError::Frozen { action })
        }
    }

    fn set_idle_mode(&mut self, enabled: bool, now: Instant) {
        self.tracker.set_enabled(enabled);
        if !enabled && self.cache.clear_idle() {
            tracing::debug!("Idle flags cleared");
        }
        self.refresh(now);
    }

    fn inspect(&mut self, id: EntityId) -> Result<(), EngineError> {
        let record = self.cache.get(id).ok_or(EngineError::UnknownEntity(id))?;
        self.inspected = Some(id);
        if record.detail.is_some() {
            self.publish_inspection(id);
            return Ok(());
        }

        let name = record.data.name.clone();
        self.view.inspection.set(None);
        self.notify(format!("No skill data for {name} yet"));
        if self.mode.is_live()
            && let Some(ticket) = self.cache.claim_detail_fetch(id)
        {
            self.spawn_detail_fetch(ticket);
        }
        Ok(())
    }

    fn publish_inspection(&mut self, id: EntityId) {
        let summary = self.cache.get(id).and_then(|record| {
            let block = record.detail.as_ref()?;
            let entity_total = record.data.damage() + record.data.healing();
            Some(DetailSummary::build(id, &record.data.name, block, entity_total))
        });
        self.view.inspection.publish(summary);
    }

    async fn save_snapshot(&mut self, now: Instant) -> Result<PathBuf, EngineError> {
        if self.cache.is_empty() {
            return Err(SnapshotError::Empty.into());
        }
        if self.mode.is_live() {
            self.fetch_missing_details(now).await;
            self.refresh(now);
        }
        let record = SnapshotRecord::capture(&self.cache, self.clock.elapsed())?;

        let dir = PathBuf::from(&self.settings.snapshot_dir);
        std::fs::create_dir_all(&dir).map_err(|source| SnapshotError::Write {
            path: dir.clone(),
            source,
        })?;
        let path = snapshot::snapshot_path(&dir, Local::now());
        record.save_to_file(&path)?;
        Ok(path)
    }

    /// Live -> Frozen, or swap the displayed snapshot while frozen.
    ///
    /// The file is read and validated before any state changes, so a bad
    /// document leaves the current mode and cache untouched.
    async fn load_snapshot(&mut self, path: &Path, now: Instant) -> Result<(), EngineError> {
        let snapshot = SnapshotRecord::load_from_file(path)?;
        let records = snapshot.to_records(now);
        if records.is_empty() {
            return Err(SnapshotError::Empty.into());
        }
        let name = snapshot::display_name(path);
        let elapsed = snapshot.elapsed_seconds;

        let plan = self.mode.enter_frozen(snapshot, name.clone(), self.paused);
        if plan.pause_backend
            && let Err(e) = self.set_backend_paused(true).await
        {
            tracing::warn!(error = %e, "Could not pause backend for snapshot view");
            self.mode.backend_pause_failed();
        }
        if self.countdown.abort() {
            self.view.countdown.set(String::new());
        }

        self.cache.replace_with(records);
        self.clock.freeze(elapsed);
        self.inspected = None;
        self.refresh(now);

        self.view.inspection.set(None);
        self.view.mode.set(ViewMode::Frozen);
        self.view.snapshot_name.set(Some(name.clone()));
        self.view.duration.set(self.clock.duration_text());
        tracing::info!(snapshot = %name, entities = self.cache.len(), "Snapshot loaded");
        Ok(())
    }

    /// Frozen -> Live. Repopulates from buffered live data or one fresh pull.
    async fn exit_snapshot(&mut self, now: Instant) {
        let Some(plan) = self.mode.exit_frozen(&self.mailbox) else {
            return;
        };
        if plan.resume_backend()
            && let Err(e) = self.set_backend_paused(false).await
        {
            tracing::warn!(error = %e, "Could not resume backend");
            self.notify("Could not resume the backend");
        }

        let dataset = match plan {
            ThawPlan::ApplyBuffered { dataset, .. } => Some(dataset),
            ThawPlan::Pull { .. } => match self.backend.pull().await {
                Ok(dataset) => Some(dataset),
                Err(e) => {
                    tracing::warn!(error = %e, "Pull after snapshot view failed");
                    self.notify("Backend unavailable");
                    None
                }
            },
        };

        let backend_reset = dataset.as_ref().is_some_and(|d| !d.has_output());
        self.clock.thaw(backend_reset);
        self.cache.clear();
        self.inspected = None;
        if let Some(dataset) = &dataset {
            self.seed_live(dataset, now);
        }
        self.refresh(now);

        self.view.inspection.set(None);
        self.view.mode.set(ViewMode::Live);
        self.view.snapshot_name.set(None);
        self.view.duration.set(self.clock.duration_text());
        tracing::info!(backend_reset, entities = self.cache.len(), "Back to live data");
    }

    async fn set_backend_paused(&mut self, paused: bool) -> Result<(), EngineError> {
        self.backend.set_paused(paused).await?;
        self.set_local_paused(paused);
        tracing::info!(paused, "Backend pause state changed");
        Ok(())
    }

    fn set_local_paused(&mut self, paused: bool) {
        self.paused = paused;
        self.clock.set_paused(paused);
        self.view.paused.set(paused);
    }

    /// Zero the clock, clear backend and local data, then pull fresh.
    /// Clear backend and local data. Local state is kept if the backend refuses.
    async fn reset_data(&mut self, now: Instant) -> Result<(), EngineError> {
        self.backend.reset().await?;
        self.clock.reset();
        self.view.duration.set(self.clock.duration_text());

        self.cache.clear();
        self.mailbox.clear();
        self.inspected = None;
        self.view.inspection.set(None);
        self.refresh(now);

        match self.backend.pull().await {
            Ok(dataset) => {
                self.seed_live(&dataset, now);
                self.refresh(now);
            }
            Err(e) => tracing::warn!(error = %e, "Pull after reset failed"),
        }
        tracing::info!("Data reset");
        Ok(())
    }

    async fn start_countdown(&mut self, seconds: u32, now: Instant) -> Result<(), EngineError> {
        self.require_live("countdown")?;
        self.countdown.start(seconds)?;
        if let Err(e) = self.reset_data(now).await {
            self.countdown.abort();
            return Err(e);
        }
        if self.paused
            && let Err(e) = self.set_backend_paused(false).await
        {
            self.countdown.abort();
            return Err(e);
        }
        self.view.countdown.set(self.countdown.text());
        tracing::info!(seconds, "Countdown started");
        Ok(())
    }

    async fn abort_countdown(&mut self) -> Result<(), EngineError> {
        if !self.countdown.abort() {
            return Ok(());
        }
        self.view.countdown.set(String::new());
        self.set_backend_paused(true).await?;
        self.notify("Countdown aborted");
        Ok(())
    }

    /// Pause-on-exit and a final settings save.
    pub async fn shutdown(&mut self) {
        if self.settings.pause_on_exit
            && !self.paused
            && let Err(e) = self.set_backend_paused(true).await
        {
            tracing::warn!(error = %e, "Could not pause backend on exit");
        }
        self.save_settings();
        tracing::info!("Engine stopped");
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Settings
    // ─────────────────────────────────────────────────────────────────────────

    pub fn save_settings(&mut self) {
        let (elapsed, started) = self.clock.live_state();
        self.settings.elapsed_seconds = elapsed;
        self.settings.fight_active = started;
        self.settings.sort_column = self.sort.column;
        self.settings.sort_direction = self.sort.direction;
        self.settings.idle_mode_enabled = self.tracker.is_enabled();

        if let Err(e) = self.store.save(&self.settings) {
            tracing::warn!(error = %describe(&e), "Failed to save settings");
        }
    }

    fn notify(&mut self, message: impl Into<String>) {
        self.view.notice.publish(Some(message.into()));
    }
}

/// Error message followed by its source chain.
fn describe(error: &dyn std::error::Error) -> String {
    let mut text = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}
