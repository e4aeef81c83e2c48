// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Start of the management tasks: the reload scheduler and the status poller

use config::ConversionParams;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::frr::reload::{FrrPaths, FrrReloader};
use crate::processor::debouncer::{Debouncer, reload_channel};
use crate::processor::proc::ConfigProcessor;
use crate::processor::status::{StatusCell, StatusPoller};

pub const DEFAULT_RELOAD_INTERVAL: Duration = Duration::from_millis(3000);
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_millis(500);
pub const DEFAULT_STATUS_INTERVAL: Duration = Duration::from_millis(5000);

/// Parameters of the management tasks
#[derive(Clone, Debug)]
pub struct MgmtParams {
    pub paths: FrrPaths,
    pub conversion: ConversionParams,
    /// Delay between the first config change and its apply
    pub reload_interval: Duration,
    /// Delay between a failed apply and the next attempt
    pub retry_interval: Duration,
    /// Period of the reloader status polling
    pub status_interval: Duration,
}

impl MgmtParams {
    #[must_use]
    pub fn new(paths: FrrPaths, conversion: ConversionParams) -> Self {
        Self {
            paths,
            conversion,
            reload_interval: DEFAULT_RELOAD_INTERVAL,
            retry_interval: DEFAULT_RETRY_INTERVAL,
            status_interval: DEFAULT_STATUS_INTERVAL,
        }
    }
}

/// The running management tasks
pub struct Mgmt {
    pub processor: ConfigProcessor,
    pub status: StatusCell,
    handles: Vec<JoinHandle<()>>,
}

impl Mgmt {
    /// Wait for all tasks to terminate. They do once the cancellation token is cancelled.
    pub async fn join(self) {
        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Management task failed: {e}");
            }
        }
        debug!("All management tasks terminated");
    }
}

/// Spawn the management tasks on the current tokio runtime
#[must_use]
pub fn start_mgmt(params: MgmtParams, cancel: &CancellationToken) -> Mgmt {
    info!(
        "Starting management: FRR config at {}",
        params.paths.config_file.display()
    );
    let (reload, rx) = reload_channel();
    let status = StatusCell::new();

    let debouncer = Debouncer::new(
        FrrReloader::new(params.paths.clone()),
        rx,
        params.reload_interval,
        params.retry_interval,
    );
    let poller = StatusPoller::new(params.paths, reload.clone(), status.clone());
    let handles = vec![
        tokio::spawn(debouncer.run(cancel.clone())),
        tokio::spawn(poller.run(cancel.clone(), params.status_interval)),
    ];

    let processor = ConfigProcessor::new(params.conversion, reload, status.clone());
    Mgmt {
        processor,
        status,
        handles,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::LogLevel;
    use config::external::fragment::{Fragment, RouterSpec};
    use std::fs;

    #[tokio::test(start_paused = true)]
    async fn test_start_and_stop() {
        let dir = tempfile::tempdir().expect("No tempdir");
        let paths = FrrPaths::in_dir(dir.path());
        let mut params = MgmtParams::new(
            paths.clone(),
            ConversionParams::new("node-1", LogLevel::Info),
        );
        params.reload_interval = Duration::from_millis(100);
        let cancel = CancellationToken::new();
        let mgmt = start_mgmt(params, &cancel);

        let fragment = Fragment::new("a").add_router(RouterSpec::new(65000));
        assert!(mgmt.processor.process(&[fragment]).is_ok());
        tokio::time::sleep(Duration::from_millis(200)).await;

        /* there is no reloader to signal, but the config got written */
        let written = fs::read_to_string(&paths.config_file).expect("Config not written");
        assert!(written.contains("router bgp 65000"));
        assert!(written.contains("hostname node-1"));
        assert_eq!(mgmt.status.snapshot().last_conversion_result, "Ok");

        cancel.cancel();
        mgmt.join().await;
    }
}
