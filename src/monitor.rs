use std::future::Future;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::ctfd::SnapshotSource;
use crate::detector;
use crate::error::FetchError;
use crate::ntfy::Notifier;
use crate::reporter;
use crate::state::{MonitorState, StateStore};
use crate::types::{ChallengeCatalogSnapshot, CycleReport, Event, ScoreboardSnapshot};

/// Polls the snapshot source, alerts on changes, and keeps the state cache current.
///
/// The monitor owns its [`MonitorState`] outright; nothing else mutates it.
pub struct Monitor<S, N> {
    source: S,
    notifier: N,
    store: StateStore,
    user: String,
    interval: Duration,
    state: MonitorState,
}

impl<S: SnapshotSource, N: Notifier> Monitor<S, N> {
    pub fn new(source: S, notifier: N, store: StateStore, user: &str, interval: Duration) -> Self {
        Self {
            source,
            notifier,
            store,
            user: user.to_string(),
            interval,
            state: MonitorState::default(),
        }
    }

    pub fn state(&self) -> &MonitorState {
        &self.state
    }

    /// Hydrate state from the cache, seeding it from the API when the cache
    /// holds no usable snapshots. Seeding never produces alerts.
    pub async fn bootstrap(&mut self) {
        self.state = self.store.load();
        self.state.user_position = self
            .state
            .last_scoreboard
            .as_ref()
            .map_or(0, |sb| detector::find_position(sb, &self.user));

        if self.state.is_seeded() {
            info!("Using cached state");
            return;
        }

        info!("No cached state found, fetching initial state from API...");
        match self.fetch_both().await {
            Ok((scoreboard, challenges)) => {
                let user_position = detector::find_position(&scoreboard, &self.user);
                self.state = MonitorState {
                    last_scoreboard: Some(scoreboard),
                    last_challenges: Some(challenges),
                    user_position,
                };
                info!(user_position, "Seeded initial state");
                self.persist();
            }
            Err(e) => warn!("Error getting initial state: {e}"),
        }
    }

    async fn fetch_both(&self) -> Result<(ScoreboardSnapshot, ChallengeCatalogSnapshot), FetchError> {
        let scoreboard = self.source.fetch_scoreboard().await?;
        let challenges = self.source.fetch_challenges().await?;
        Ok((scoreboard, challenges))
    }

    /// One poll: fetch, compare against the previous snapshots, notify, persist.
    ///
    /// A fetch failure returns early with the state untouched. Notification
    /// and persistence failures are logged and do not fail the cycle.
    pub async fn run_cycle(&mut self) -> Result<CycleReport, FetchError> {
        let (scoreboard, challenges) = self.fetch_both().await?;

        let rank = detector::check_rank(self.state.user_position, &scoreboard, &self.user);
        let new_challenges =
            detector::check_challenges(self.state.last_challenges.as_ref(), &challenges);

        let mut report = CycleReport {
            timestamp: chrono::Utc::now().to_rfc3339(),
            user_position: rank.current_rank,
            rank_alerts: rank.events.len(),
            new_challenges: new_challenges.len(),
            ..Default::default()
        };

        for event in rank.events.iter().chain(new_challenges.iter()) {
            if self.dispatch(event).await {
                report.notified += 1;
            } else {
                report.notify_failures += 1;
            }
        }

        self.state = MonitorState {
            last_scoreboard: Some(scoreboard),
            last_challenges: Some(challenges),
            user_position: rank.current_rank,
        };
        report.persisted = self.persist();
        Ok(report)
    }

    async fn dispatch(&self, event: &Event) -> bool {
        match self.notifier.send(&event.notification()).await {
            Ok(()) => {
                match event {
                    Event::RankRegressed { new_rank, .. } => {
                        info!("Sent bypass alert: {} -> {new_rank}", self.user)
                    }
                    Event::ChallengePublished { name, .. } => {
                        info!("Sent new challenge alert: {name}")
                    }
                }
                true
            }
            Err(e) => {
                warn!(?event, "Failed to send alert: {e}");
                false
            }
        }
    }

    /// Write the current state to the cache, logging any failure.
    pub fn persist(&self) -> bool {
        match self.store.save(&self.state) {
            Ok(()) => {
                debug!("State saved to cache: {}", self.store.path().display());
                true
            }
            Err(e) => {
                warn!("Error saving state to cache: {e}");
                false
            }
        }
    }

    /// Bootstrap, then poll every `interval` until `shutdown` resolves.
    ///
    /// Shutdown is only observed between cycles. The state is saved once more
    /// on the way out and returned.
    pub async fn run(mut self, shutdown: impl Future<Output = ()>) -> MonitorState {
        self.bootstrap().await;

        info!(
            "Starting monitoring (interval: {} seconds)",
            self.interval.as_secs()
        );
        info!("Monitoring user: {}", self.user);

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Received shutdown signal, saving state and stopping...");
                    break;
                }
                _ = tokio::time::sleep(self.interval) => {
                    match self.run_cycle().await {
                        Ok(report) => reporter::report_cycle(&report),
                        Err(e) => warn!("Error during monitoring: {e}"),
                    }
                }
            }
        }

        if self.persist() {
            info!("State saved to cache: {}", self.store.path().display());
        }
        self.state
    }
}

/// Resolves on Ctrl+C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
