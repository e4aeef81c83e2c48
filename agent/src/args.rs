// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Command line of the agent. Every option can also be set from the environment.

pub use clap::Parser;
use config::LogLevel;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "bgpcfg")]
#[command(about = "Merges BGP configuration fragments and keeps FRR configured accordingly", long_about = None)]
pub struct CmdArgs {
    #[arg(
        long,
        env = "BGPCFG_FRAGMENTS_DIR",
        value_name = "DIR",
        default_value = "/etc/bgpcfg/fragments",
        help = "Directory with the configuration fragments (*.yaml, *.yml, *.json)"
    )]
    fragments_dir: PathBuf,

    #[arg(
        long,
        env = "NODE_NAME",
        value_name = "NAME",
        default_value = "",
        help = "Name of this node, used as FRR hostname"
    )]
    node_name: String,

    #[arg(
        long,
        env = "BGPCFG_LOG_LEVEL",
        value_name = "LEVEL",
        default_value = "info",
        value_parser = LogLevel::from_str,
        help = "Log level of the agent and of FRR: one of all, debug, info, warn, error, none"
    )]
    log_level: LogLevel,

    #[arg(
        long,
        env = "BGPCFG_ALWAYS_BLOCK",
        value_name = "CIDR",
        value_delimiter = ',',
        help = "Prefixes never to be accepted from any neighbor. Can be repeated or comma-separated"
    )]
    always_block: Vec<String>,

    #[arg(
        long,
        env = "BGPCFG_RELOAD_INTERVAL_MS",
        value_name = "MS",
        default_value_t = 3000,
        help = "Delay between a configuration change and its application"
    )]
    reload_interval_ms: u64,

    #[arg(
        long,
        env = "BGPCFG_RETRY_INTERVAL_MS",
        value_name = "MS",
        default_value_t = 500,
        help = "Delay between a failed configuration apply and the next attempt"
    )]
    retry_interval_ms: u64,

    #[arg(
        long,
        env = "BGPCFG_STATUS_INTERVAL_MS",
        value_name = "MS",
        default_value_t = 5000,
        help = "Period of the FRR status polling"
    )]
    status_interval_ms: u64,

    #[arg(
        long,
        env = "BGPCFG_RESCAN_INTERVAL_MS",
        value_name = "MS",
        default_value_t = 5000,
        help = "Period of the fragment directory scans"
    )]
    rescan_interval_ms: u64,
}

impl CmdArgs {
    pub fn fragments_dir(&self) -> &PathBuf {
        &self.fragments_dir
    }
    pub fn node_name(&self) -> &str {
        &self.node_name
    }
    pub fn log_level(&self) -> LogLevel {
        self.log_level
    }
    pub fn always_block(&self) -> Vec<&str> {
        self.always_block.iter().map(String::as_str).collect()
    }
    pub fn reload_interval(&self) -> Duration {
        Duration::from_millis(self.reload_interval_ms)
    }
    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }
    pub fn status_interval(&self) -> Duration {
        Duration::from_millis(self.status_interval_ms)
    }
    pub fn rescan_interval(&self) -> Duration {
        Duration::from_millis(self.rescan_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = CmdArgs::try_parse_from(["bgpcfg", "--node-name", "node-1"])
            .expect("Should parse");
        assert_eq!(args.node_name(), "node-1");
        assert_eq!(args.log_level(), LogLevel::Info);
        assert_eq!(args.reload_interval(), Duration::from_millis(3000));
        assert_eq!(args.retry_interval(), Duration::from_millis(500));
        assert!(args.always_block().is_empty());
    }

    #[test]
    fn test_args() {
        let args = CmdArgs::try_parse_from([
            "bgpcfg",
            "--log-level",
            "DEBUG",
            "--always-block",
            "10.0.0.0/8,192.168.0.0/16",
            "--always-block",
            "fd00::/8",
            "--status-interval-ms",
            "100",
        ])
        .expect("Should parse");
        assert_eq!(args.log_level(), LogLevel::Debug);
        assert_eq!(
            args.always_block(),
            vec!["10.0.0.0/8", "192.168.0.0/16", "fd00::/8"]
        );
        assert_eq!(args.status_interval(), Duration::from_millis(100));

        assert!(CmdArgs::try_parse_from(["bgpcfg", "--log-level", "loud"]).is_err());
    }
}
