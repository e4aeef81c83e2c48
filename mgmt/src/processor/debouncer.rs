// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Reload scheduler. Configs are not applied as soon as they are received: the first
//! change arms a timer and the config held when it fires gets applied. Bursts of changes
//! thus result in a single reload. Failed applies are retried at a shorter, fixed interval
//! until they succeed or a different config supersedes them.

use chrono::{DateTime, Local};
use config::Config;
use std::fmt::Display;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::frr::reload::ConfigApplier;

/// Requests to the reload scheduler
#[derive(Debug)]
pub enum ReloadEvent {
    /// A new desired config
    NewConfig(Box<Config>),
    /// Apply again the last config, if any
    ReapplyLast,
}

/// The sending side of the scheduler event queue
#[derive(Clone, Debug)]
pub struct ReloadSender(mpsc::UnboundedSender<ReloadEvent>);

impl ReloadSender {
    fn send(&self, event: ReloadEvent) -> bool {
        if self.0.send(event).is_err() {
            warn!("Reload scheduler is gone: request dropped");
            return false;
        }
        true
    }
    /// Request a config to be applied. Returns false if the scheduler no longer runs.
    pub fn new_config(&self, config: Config) -> bool {
        self.send(ReloadEvent::NewConfig(Box::new(config)))
    }
    /// Request the last config to be applied again
    pub fn reapply_last(&self) -> bool {
        self.send(ReloadEvent::ReapplyLast)
    }
}

/// Create the event queue of a reload scheduler
#[must_use]
pub fn reload_channel() -> (ReloadSender, mpsc::UnboundedReceiver<ReloadEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ReloadSender(tx), rx)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReloadState {
    /// Nothing to apply
    Idle,
    /// A config awaits being applied
    Pending,
    /// The last apply failed and will be retried
    Retrying,
}
impl Display for ReloadState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReloadState::Idle => write!(f, "idle"),
            ReloadState::Pending => write!(f, "pending"),
            ReloadState::Retrying => write!(f, "retrying"),
        }
    }
}

/// Apply statistics
#[derive(Clone, Debug, Default)]
pub struct ReloadStats {
    pub applied: u64,
    pub failed: u64,
    pub last_success: Option<DateTime<Local>>,
    pub last_failure: Option<DateTime<Local>>,
}
impl Display for ReloadStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let show = |t: &Option<DateTime<Local>>| {
            t.map_or_else(|| "never".to_string(), |t| t.format("%H:%M:%S%.3f").to_string())
        };
        write!(
            f,
            "applied: {} failed: {} last success: {} last failure: {}",
            self.applied,
            self.failed,
            show(&self.last_success),
            show(&self.last_failure)
        )
    }
}

/// The reload scheduler
pub struct Debouncer<A: ConfigApplier> {
    applier: A,
    rx: mpsc::UnboundedReceiver<ReloadEvent>,
    state: ReloadState,
    held: Option<Config>,
    deadline: Option<Instant>,
    reload_interval: Duration,
    retry_interval: Duration,
    stats: ReloadStats,
}

impl<A: ConfigApplier> Debouncer<A> {
    #[must_use]
    pub fn new(
        applier: A,
        rx: mpsc::UnboundedReceiver<ReloadEvent>,
        reload_interval: Duration,
        retry_interval: Duration,
    ) -> Self {
        Self {
            applier,
            rx,
            state: ReloadState::Idle,
            held: None,
            deadline: None,
            reload_interval,
            retry_interval,
            stats: ReloadStats::default(),
        }
    }
    #[must_use]
    pub fn state(&self) -> ReloadState {
        self.state
    }
    #[must_use]
    pub fn stats(&self) -> &ReloadStats {
        &self.stats
    }
    #[must_use]
    pub fn held(&self) -> Option<&Config> {
        self.held.as_ref()
    }

    fn set_state(&mut self, state: ReloadState) {
        if self.state != state {
            debug!("Reload scheduler: {} -> {state}", self.state);
            self.state = state;
        }
    }

    fn arm(&mut self, interval: Duration) {
        self.deadline = Some(Instant::now() + interval);
    }

    fn on_new_config(&mut self, config: Config) {
        if self.held.as_ref() == Some(&config) {
            debug!("Config did not change: ignoring it");
            return;
        }
        self.held = Some(config);
        match self.state {
            ReloadState::Idle => {
                self.arm(self.reload_interval);
                self.set_state(ReloadState::Pending);
            }
            /* the armed timer bounds the delay since the first change */
            ReloadState::Pending => debug!("Replaced pending config"),
            ReloadState::Retrying => debug!("Replaced config being retried"),
        }
    }

    fn on_reapply_last(&mut self) {
        if self.held.is_none() {
            debug!("No config was ever received: nothing to reapply");
            return;
        }
        if self.state == ReloadState::Idle {
            info!("Reapplying last config");
            self.arm(self.reload_interval);
            self.set_state(ReloadState::Pending);
        }
    }

    /// Process one event
    pub fn handle_event(&mut self, event: ReloadEvent) {
        match event {
            ReloadEvent::NewConfig(config) => self.on_new_config(*config),
            ReloadEvent::ReapplyLast => self.on_reapply_last(),
        }
    }

    /// Apply the held config. Called when the timer fires.
    pub fn on_timer(&mut self) {
        self.deadline = None;
        let Some(config) = &self.held else {
            self.set_state(ReloadState::Idle);
            return;
        };
        match self.applier.apply(config) {
            Ok(()) => {
                self.stats.applied += 1;
                self.stats.last_success = Some(Local::now());
                info!("Config successfully applied. {}", self.stats);
                self.set_state(ReloadState::Idle);
            }
            Err(e) => {
                self.stats.failed += 1;
                self.stats.last_failure = Some(Local::now());
                error!(
                    "Failed to apply config: {e}. Will retry in {:?}. {}",
                    self.retry_interval, self.stats
                );
                self.arm(self.retry_interval);
                self.set_state(ReloadState::Retrying);
            }
        }
    }

    /// Run the scheduler until cancelled or until all senders are gone
    pub async fn run(mut self, cancel: CancellationToken) {
        info!(
            "Reload scheduler started: reload interval {:?} retry interval {:?}",
            self.reload_interval, self.retry_interval
        );
        loop {
            let deadline = self.deadline;
            tokio::select! {
                () = cancel.cancelled() => {
                    info!("Reload scheduler cancelled");
                    break;
                }
                event = self.rx.recv() => match event {
                    Some(event) => self.handle_event(event),
                    None => {
                        info!("Reload event queue closed");
                        break;
                    }
                },
                () = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.on_timer();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frr::reload::FrrErr;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use tokio::time::sleep;

    const RELOAD: Duration = Duration::from_millis(3000);
    const RETRY: Duration = Duration::from_millis(500);

    /// Records applied configs and when they were applied. Fails the first `failures` applies.
    #[derive(Clone, Default)]
    struct MockApplier {
        applied: Arc<Mutex<Vec<(Instant, Config)>>>,
        failures: Arc<Mutex<u32>>,
    }
    impl MockApplier {
        fn failing(failures: u32) -> Self {
            Self {
                failures: Arc::new(Mutex::new(failures)),
                ..Default::default()
            }
        }
        fn applied(&self) -> Vec<Config> {
            self.applied.lock().iter().map(|(_, c)| c.clone()).collect()
        }
        fn applied_at(&self) -> Vec<(Instant, Config)> {
            self.applied.lock().clone()
        }
    }
    impl ConfigApplier for MockApplier {
        fn apply(&mut self, config: &Config) -> Result<(), FrrErr> {
            self.applied.lock().push((Instant::now(), config.clone()));
            let mut failures = self.failures.lock();
            if *failures > 0 {
                *failures -= 1;
                return Err(FrrErr::BadPid("none".to_string()));
            }
            Ok(())
        }
    }

    fn config(hostname: &str) -> Config {
        Config::new().set_hostname(hostname)
    }

    fn start(applier: MockApplier) -> (ReloadSender, CancellationToken) {
        let (tx, rx) = reload_channel();
        let cancel = CancellationToken::new();
        let debouncer = Debouncer::new(applier, rx, RELOAD, RETRY);
        tokio::spawn(debouncer.run(cancel.clone()));
        (tx, cancel)
    }

    #[tokio::test(start_paused = true)]
    async fn test_bursts_are_coalesced() {
        let applier = MockApplier::default();
        let (tx, cancel) = start(applier.clone());
        let begin = Instant::now();

        /* changes at 0ms, 100ms, 350ms, ... 5850ms: the timer armed by the first one
        must fire at 3000ms regardless of the changes that follow */
        tx.new_config(config("c0"));
        sleep(Duration::from_millis(100)).await;
        for n in 1..=24 {
            tx.new_config(config(&format!("c{n}")));
            sleep(Duration::from_millis(250)).await;
        }
        assert_eq!(Instant::now() - begin, Duration::from_millis(6100));
        sleep(Duration::from_millis(1)).await;

        /* c12 is the last change before 3000ms, c13 at 3100ms arms the next timer */
        assert_eq!(
            applier.applied_at(),
            vec![
                (begin + RELOAD, config("c12")),
                (begin + Duration::from_millis(3100) + RELOAD, config("c24")),
            ]
        );
        cancel.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_config_is_not_reapplied() {
        let applier = MockApplier::default();
        let (tx, cancel) = start(applier.clone());
        tx.new_config(config("a"));
        sleep(RELOAD * 2).await;
        tx.new_config(config("a"));
        sleep(RELOAD * 2).await;
        assert_eq!(applier.applied().len(), 1);
        cancel.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_are_retried() {
        let applier = MockApplier::failing(2);
        let (tx, cancel) = start(applier.clone());
        tx.new_config(config("a"));
        sleep(RELOAD + Duration::from_millis(10)).await;
        assert_eq!(applier.applied().len(), 1);
        sleep(RETRY).await;
        assert_eq!(applier.applied().len(), 2);
        sleep(RETRY).await;
        assert_eq!(applier.applied(), vec![config("a"); 3]);
        sleep(RELOAD * 2).await;
        assert_eq!(applier.applied().len(), 3);
        cancel.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_targets_latest_config() {
        let applier = MockApplier::failing(1);
        let (tx, cancel) = start(applier.clone());
        tx.new_config(config("a"));
        sleep(RELOAD + Duration::from_millis(10)).await;
        tx.new_config(config("b"));
        sleep(RETRY).await;
        assert_eq!(applier.applied(), vec![config("a"), config("b")]);
        cancel.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn test_reapply_last() {
        let applier = MockApplier::default();
        let (tx, cancel) = start(applier.clone());

        /* nothing held yet */
        tx.reapply_last();
        sleep(RELOAD * 2).await;
        assert!(applier.applied().is_empty());

        tx.new_config(config("a"));
        sleep(RELOAD * 2).await;
        tx.reapply_last();
        sleep(RELOAD * 2).await;
        assert_eq!(applier.applied(), vec![config("a"), config("a")]);
        cancel.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn test_state_machine() {
        let (_tx, rx) = reload_channel();
        let mut debouncer = Debouncer::new(MockApplier::failing(1), rx, RELOAD, RETRY);
        assert_eq!(debouncer.state(), ReloadState::Idle);

        debouncer.handle_event(ReloadEvent::NewConfig(Box::new(config("a"))));
        assert_eq!(debouncer.state(), ReloadState::Pending);
        debouncer.handle_event(ReloadEvent::ReapplyLast);
        assert_eq!(debouncer.state(), ReloadState::Pending);

        debouncer.on_timer();
        assert_eq!(debouncer.state(), ReloadState::Retrying);
        assert_eq!(debouncer.stats().failed, 1);

        debouncer.handle_event(ReloadEvent::NewConfig(Box::new(config("b"))));
        assert_eq!(debouncer.state(), ReloadState::Retrying);
        assert_eq!(debouncer.held(), Some(&config("b")));

        debouncer.on_timer();
        assert_eq!(debouncer.state(), ReloadState::Idle);
        assert_eq!(debouncer.stats().applied, 1);
        assert!(debouncer.stats().last_success.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_when_cancelled() {
        let (_tx, rx) = reload_channel();
        let cancel = CancellationToken::new();
        let debouncer = Debouncer::new(MockApplier::default(), rx, RELOAD, RETRY);
        let handle = tokio::spawn(debouncer.run(cancel.clone()));
        cancel.cancel();
        handle.await.expect("Scheduler panicked");
    }
}
