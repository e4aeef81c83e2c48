// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Status feedback. The FRR reloader reports the outcome of every reload in a set of
//! files. These are polled periodically: a failed reload makes the scheduler apply the last
//! config again, and the outcome is published in a [`FrrStatus`] snapshot.

use chrono::{DateTime, Local};
use parking_lot::Mutex;
use regex_lite::{NoExpand, Regex};
use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use thiserror::Error;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::frr::reload::FrrPaths;
use crate::processor::debouncer::ReloadSender;

pub const PASSWORD_REDACTED: &str = "password <retracted>";

#[allow(clippy::expect_used)]
static PASSWORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"password\s+\S+").expect("static regex"));

#[derive(Error, Debug)]
pub enum StatusError {
    #[error("Failed to read {}: {err}", path.display())]
    Read { path: PathBuf, err: std::io::Error },

    #[error("Malformed status '{0}'")]
    Malformed(String),
}

/// Replace every match of `re` in `text`. The replacement is literal.
#[must_use]
pub fn redact(text: &str, re: &Regex, replacement: &str) -> String {
    re.replace_all(text, NoExpand(replacement)).into_owned()
}

/// Hide the passwords in some FRR config text
#[must_use]
pub fn redact_passwords(text: &str) -> String {
    redact(text, &PASSWORD_RE, PASSWORD_REDACTED)
}

/// The latest known state of FRR and of the config processing
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FrrStatus {
    /// Result word reported by the reloader for the last reload
    pub last_reload_result: String,
    /// Timestamp reported by the reloader for the last reload
    pub last_reload_timestamp: String,
    pub running_config: String,
    pub last_applied: String,
    pub last_error: String,
    /// Outcome of the last conversion of fragments into a config
    pub last_conversion_result: String,
    /// When this snapshot was last updated from the reloader files
    pub last_update: Option<DateTime<Local>>,
}

impl FrrStatus {
    #[must_use]
    pub fn reload_failed(&self) -> bool {
        self.last_reload_result.contains("failure")
    }
}

/// Shared, lock-protected [`FrrStatus`]
#[derive(Clone, Debug, Default)]
pub struct StatusCell(Arc<Mutex<FrrStatus>>);

impl StatusCell {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
    /// A copy of the current status
    #[must_use]
    pub fn snapshot(&self) -> FrrStatus {
        self.0.lock().clone()
    }
    pub fn set_conversion_result(&self, result: &str) {
        self.0.lock().last_conversion_result = result.to_owned();
    }
    fn update_from_reloader(&self, report: ReloaderReport) {
        let mut status = self.0.lock();
        status.last_reload_timestamp = report.timestamp;
        status.last_reload_result = report.result;
        status.running_config = redact_passwords(&report.running_config);
        status.last_applied = redact_passwords(&report.last_applied);
        status.last_error = report.last_error;
        status.last_update = Some(Local::now());
    }
}

/// Parse the content of the status file: a timestamp and a result word
pub fn parse_status(content: &str) -> Result<(String, String), StatusError> {
    let mut tokens = content.split_whitespace();
    match (tokens.next(), tokens.next()) {
        (Some(timestamp), Some(result)) => Ok((timestamp.to_owned(), result.to_owned())),
        _ => Err(StatusError::Malformed(content.trim().to_owned())),
    }
}

/// What the reloader reported in its files
#[derive(Debug)]
struct ReloaderReport {
    timestamp: String,
    result: String,
    running_config: String,
    last_applied: String,
    last_error: String,
}

fn read_file(path: &Path) -> Result<String, StatusError> {
    std::fs::read_to_string(path).map_err(|err| StatusError::Read {
        path: path.to_path_buf(),
        err,
    })
}

/// Read a file that the reloader may not have written yet
fn read_optional(path: &Path) -> Result<String, StatusError> {
    match read_file(path) {
        Err(StatusError::Read { err, .. }) if err.kind() == ErrorKind::NotFound => {
            Ok(String::new())
        }
        other => other,
    }
}

/// Periodically reads the reloader files
pub struct StatusPoller {
    paths: FrrPaths,
    reload: ReloadSender,
    cell: StatusCell,
    last_timestamp: Option<String>,
}

impl StatusPoller {
    #[must_use]
    pub fn new(paths: FrrPaths, reload: ReloadSender, cell: StatusCell) -> Self {
        Self {
            paths,
            reload,
            cell,
            last_timestamp: None,
        }
    }

    fn read_report(&self) -> Result<Option<ReloaderReport>, StatusError> {
        let (timestamp, result) = parse_status(&read_file(&self.paths.status_file)?)?;
        if self.last_timestamp.as_ref() == Some(&timestamp) {
            return Ok(None);
        }
        Ok(Some(ReloaderReport {
            timestamp,
            result,
            running_config: read_optional(&self.paths.running_config_file)?,
            last_applied: read_optional(&self.paths.last_applied_file)?,
            last_error: read_optional(&self.paths.last_error_file)?,
        }))
    }

    /// Poll the reloader files once. The published status is kept as is if they can't be read.
    pub fn tick(&mut self) {
        let report = match self.read_report() {
            Ok(Some(report)) => report,
            Ok(None) => return,
            Err(e) => {
                warn!("Unable to read FRR status: {e}");
                return;
            }
        };
        debug!(
            "FRR reload status at {}: {}",
            report.timestamp, report.result
        );
        self.last_timestamp = Some(report.timestamp.clone());
        if report.result.contains("failure") {
            error!(
                "FRR failed to reload config at {}: {}",
                report.timestamp,
                report.last_error.trim()
            );
            self.reload.reapply_last();
        }
        self.cell.update_from_reloader(report);
    }

    /// Poll every `period` until cancelled
    pub async fn run(mut self, cancel: CancellationToken, period: Duration) {
        info!("Polling FRR status every {period:?}");
        let mut ticker = interval(period.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    info!("Status poller cancelled");
                    break;
                }
                _ = ticker.tick() => self.tick(),
            }
        }
    }
}
