// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Entry point for desired-state fragments

use config::external::fragment::Fragment;
use config::{ConfigResult, ConversionParams, build_config, stringify};
use tracing::{debug, error, info, warn};

use crate::processor::debouncer::ReloadSender;
use crate::processor::status::StatusCell;

/// Turns sets of fragments into configs for the reload scheduler. Every reconciliation
/// pass is recorded in the published status.
#[derive(Clone, Debug)]
pub struct ConfigProcessor {
    params: ConversionParams,
    reload: ReloadSender,
    status: StatusCell,
}

impl ConfigProcessor {
    #[must_use]
    pub fn new(params: ConversionParams, reload: ReloadSender, status: StatusCell) -> Self {
        Self {
            params,
            reload,
            status,
        }
    }
    #[must_use]
    pub fn params(&self) -> &ConversionParams {
        &self.params
    }
    #[must_use]
    pub fn status(&self) -> &StatusCell {
        &self.status
    }

    /// Build a config from the given fragments and have it applied. A failure leaves the
    /// last config in place.
    pub fn process(&self, fragments: &[Fragment]) -> ConfigResult {
        debug!("Processing {} fragments...", fragments.len());
        let result = build_config(fragments, &self.params).map(|config| {
            if !self.reload.new_config(config) {
                warn!("Built config could not be handed to the reload scheduler");
            }
        });
        match &result {
            Ok(()) => info!("Successfully processed {} fragments", fragments.len()),
            Err(e) => error!("Rejected fragments: {e}"),
        }
        self.status.set_conversion_result(&stringify(&result));
        result
    }

    /// Record a failure that prevented fragments from being processed at all
    pub fn report_failure(&self, msg: &str) {
        error!("Unable to process fragments: {msg}");
        self.status.set_conversion_result(&format!("FAILED: {msg}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::debouncer::{ReloadEvent, reload_channel};
    use config::LogLevel;
    use config::external::fragment::{NeighborSpec, RouterSpec};
    use pretty_assertions::assert_eq;

    fn fragment(name: &str, asn: u32) -> Fragment {
        Fragment::new(name)
            .add_router(RouterSpec::new(asn).add_neighbor(NeighborSpec::new(65100, "10.0.0.1")))
    }

    #[test]
    fn test_process_sends_config() {
        let (tx, mut rx) = reload_channel();
        let processor = ConfigProcessor::new(
            ConversionParams::new("node-1", LogLevel::Info),
            tx,
            StatusCell::new(),
        );
        assert!(processor.process(&[fragment("a", 65000)]).is_ok());
        let Ok(ReloadEvent::NewConfig(config)) = rx.try_recv() else {
            unreachable!("A config should have been sent");
        };
        assert_eq!(config.hostname, "node-1");
        assert_eq!(config.routers.len(), 1);
        assert_eq!(processor.status().snapshot().last_conversion_result, "Ok");
    }

    #[test]
    fn test_process_rejects_conflicts() {
        let (tx, mut rx) = reload_channel();
        let processor = ConfigProcessor::new(
            ConversionParams::new("node-1", LogLevel::Info),
            tx,
            StatusCell::new(),
        );
        let result = processor.process(&[fragment("a", 65000), fragment("b", 65001)]);
        assert!(result.is_err());
        assert!(rx.try_recv().is_err());
        let status = processor.status().snapshot();
        assert!(status.last_conversion_result.starts_with("FAILED: "));
        assert!(status.last_conversion_result.contains("65001"));
    }

    #[test]
    fn test_report_failure() {
        let (tx, _rx) = reload_channel();
        let processor = ConfigProcessor::new(
            ConversionParams::new("node-1", LogLevel::Info),
            tx,
            StatusCell::new(),
        );
        processor.report_failure("bad.yaml: invalid type");
        assert_eq!(
            processor.status().snapshot().last_conversion_result,
            "FAILED: bad.yaml: invalid type"
        );
    }
}
