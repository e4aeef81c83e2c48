// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Delivery of configs to FRR: the rendered config is written to a well-known file and
//! the reloader process, whose pid is recorded in a pid file, is signalled to load it.

use config::Config;
use nix::sys::signal::{Signal, kill};
use nix::unistd::Pid;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::frr::renderer::render_config;

#[derive(Error, Debug)]
pub enum FrrErr {
    #[error("Rendering error: {0}")]
    Render(String),

    #[error("Failed to write config to {}: {err}", path.display())]
    Write { path: PathBuf, err: std::io::Error },

    #[error("Failed to read pid file {}: {err}", path.display())]
    PidFile { path: PathBuf, err: std::io::Error },

    #[error("Invalid pid '{0}'")]
    BadPid(String),

    #[error("Failed to signal process {pid}: {err}")]
    Signal { pid: i32, err: nix::errno::Errno },
}

/* Environment variables to override the default file locations */
pub const ENV_CONFIG_FILE: &str = "FRR_CONFIG_FILE";
pub const ENV_PID_FILE: &str = "FRR_RELOADER_PID_FILE";
pub const ENV_STATUS_FILE: &str = "FRR_STATUS_FILE";
pub const ENV_RUNNING_CONFIG_FILE: &str = "FRR_RUNNING_CONFIG_FILE";
pub const ENV_LAST_APPLIED_FILE: &str = "FRR_LAST_APPLIED_FILE";
pub const ENV_LAST_ERROR_FILE: &str = "FRR_LAST_ERROR_FILE";

pub const DEFAULT_RELOADER_DIR: &str = "/etc/frr_reloader";

/// Locations of the files shared with the FRR reloader
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrrPaths {
    /// The config file we write
    pub config_file: PathBuf,
    /// Where the reloader records its pid
    pub pid_file: PathBuf,
    /// Outcome of the last reload: a timestamp and a result word
    pub status_file: PathBuf,
    pub running_config_file: PathBuf,
    pub last_applied_file: PathBuf,
    pub last_error_file: PathBuf,
}

impl FrrPaths {
    /// Default locations of all the files within some directory
    #[must_use]
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            config_file: dir.join("frr.conf"),
            pid_file: dir.join("reloader.pid"),
            status_file: dir.join(".status"),
            running_config_file: dir.join("running-config"),
            last_applied_file: dir.join("last-applied"),
            last_error_file: dir.join("last-error"),
        }
    }

    /// Build the paths from the defaults, overridden by the variables that `lookup` resolves
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::in_dir(Path::new(DEFAULT_RELOADER_DIR));
        let resolve = |var: &str, default: PathBuf| {
            lookup(var)
                .filter(|v| !v.is_empty())
                .map_or(default, PathBuf::from)
        };
        Self {
            config_file: resolve(ENV_CONFIG_FILE, defaults.config_file),
            pid_file: resolve(ENV_PID_FILE, defaults.pid_file),
            status_file: resolve(ENV_STATUS_FILE, defaults.status_file),
            running_config_file: resolve(ENV_RUNNING_CONFIG_FILE, defaults.running_config_file),
            last_applied_file: resolve(ENV_LAST_APPLIED_FILE, defaults.last_applied_file),
            last_error_file: resolve(ENV_LAST_ERROR_FILE, defaults.last_error_file),
        }
    }

    /// Build the paths from the process environment
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|var| std::env::var(var).ok())
    }
}

/// Something able to apply a [`Config`]. Applying is synchronous and is never retried
/// by implementors.
pub trait ConfigApplier: Send {
    fn apply(&mut self, config: &Config) -> Result<(), FrrErr>;
}

/// Writes configs for the FRR reloader and signals it
#[derive(Clone, Debug)]
pub struct FrrReloader {
    paths: FrrPaths,
}

impl FrrReloader {
    #[must_use]
    pub fn new(paths: FrrPaths) -> Self {
        Self { paths }
    }
    #[must_use]
    pub fn paths(&self) -> &FrrPaths {
        &self.paths
    }

    /// Read the pid of the reloader
    fn reloader_pid(&self) -> Result<Pid, FrrErr> {
        let path = &self.paths.pid_file;
        let content = fs::read_to_string(path).map_err(|err| FrrErr::PidFile {
            path: path.clone(),
            err,
        })?;
        let content = content.trim();
        match content.parse::<i32>() {
            Ok(pid) if pid > 0 => Ok(Pid::from_raw(pid)),
            _ => Err(FrrErr::BadPid(content.to_owned())),
        }
    }

    /// Ask the reloader to load the config file
    pub fn reload(&self) -> Result<(), FrrErr> {
        let pid = self.reloader_pid()?;
        debug!("Signalling FRR reloader with pid {pid}...");
        kill(pid, Signal::SIGHUP).map_err(|err| FrrErr::Signal {
            pid: pid.as_raw(),
            err,
        })
    }

    /// Overwrite the config file with `text` and have the reloader load it
    pub fn apply_text(&self, text: &str) -> Result<(), FrrErr> {
        let path = &self.paths.config_file;
        debug!("Writing FRR config to {}...", path.display());
        fs::write(path, text).map_err(|err| FrrErr::Write {
            path: path.clone(),
            err,
        })?;
        self.reload()
    }
}

impl ConfigApplier for FrrReloader {
    fn apply(&mut self, config: &Config) -> Result<(), FrrErr> {
        info!("Applying FRR config...");
        let rendered = render_config(config)?;
        self.apply_text(&rendered).inspect_err(|e| {
            error!("Failed to apply config: {e}");
        })
    }
}
