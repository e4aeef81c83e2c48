// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Fragment source: a directory scanned periodically for fragment files

use config::Fragment;
use mgmt::processor::proc::ConfigProcessor;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Failed to read directory {}: {err}", path.display())]
    ReadDir { path: PathBuf, err: std::io::Error },

    #[error("Failed to read {}: {err}", path.display())]
    Read { path: PathBuf, err: std::io::Error },

    #[error("Failed to parse {}: {msg}", path.display())]
    Parse { path: PathBuf, msg: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
    Yaml,
    Json,
}

fn format_of(path: &Path) -> Option<Format> {
    match path.extension()?.to_str()? {
        "yaml" | "yml" => Some(Format::Yaml),
        "json" => Some(Format::Json),
        _ => None,
    }
}

fn parse_fragment(path: &Path, format: Format) -> Result<Fragment, SourceError> {
    let content = fs::read_to_string(path).map_err(|err| SourceError::Read {
        path: path.to_path_buf(),
        err,
    })?;
    let parsed = match format {
        Format::Yaml => serde_yaml_ng::from_str(&content).map_err(|e| e.to_string()),
        Format::Json => serde_json::from_str(&content).map_err(|e| e.to_string()),
    };
    parsed.map_err(|msg| SourceError::Parse {
        path: path.to_path_buf(),
        msg,
    })
}

/// Read all the fragments in `dir`, sorted by file name
pub fn load_fragments(dir: &Path) -> Result<Vec<Fragment>, SourceError> {
    let read_dir_err = |err| SourceError::ReadDir {
        path: dir.to_path_buf(),
        err,
    };
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_dir_err)? {
        let path = entry.map_err(read_dir_err)?.path();
        if path.is_file()
            && let Some(format) = format_of(&path)
        {
            files.push((path, format));
        }
    }
    files.sort_by(|a, b| a.0.file_name().cmp(&b.0.file_name()));

    files
        .iter()
        .map(|(path, format)| parse_fragment(path, *format))
        .collect()
}

/// Feeds the fragments of a directory to a [`ConfigProcessor`]
pub struct FragmentSource {
    dir: PathBuf,
    processor: ConfigProcessor,
    last: Option<Vec<Fragment>>,
}

impl FragmentSource {
    pub fn new(dir: &Path, processor: ConfigProcessor) -> Self {
        Self {
            dir: dir.to_path_buf(),
            processor,
            last: None,
        }
    }

    /// Do a reconciliation pass, unless the fragments did not change
    pub fn scan(&mut self) {
        match load_fragments(&self.dir) {
            Ok(fragments) => {
                if self.last.as_ref() == Some(&fragments) {
                    debug!("Fragments in {} did not change", self.dir.display());
                    return;
                }
                info!(
                    "Found {} fragments in {}",
                    fragments.len(),
                    self.dir.display()
                );
                self.processor.process(&fragments).ok();
                self.last = Some(fragments);
            }
            Err(e) => {
                self.processor.report_failure(&e.to_string());
                self.last = None;
            }
        }
    }

    /// Scan every `period` until cancelled
    pub async fn run(mut self, cancel: CancellationToken, period: Duration) {
        info!(
            "Watching {} every {period:?} for fragments",
            self.dir.display()
        );
        let mut ticker = interval(period.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    info!("Fragment source cancelled");
                    break;
                }
                _ = ticker.tick() => self.scan(),
            }
        }
    }
}
