//! Backend command boundary.
//!
//! The view never computes scores or probes hardware itself. Everything it
//! shows comes through a [`Backend`]: a set of single-shot request/response
//! commands that either return a full replacement value or fail.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::{BackendError, Result};
use crate::fit::ModelFitRecord;
use crate::hardware::SystemInfoRecord;

pub const GET_SYSTEM_INFO: &str = "get_system_info";
pub const GET_SYSTEM_SPECS: &str = "get_system_specs";
pub const GET_MODEL_FITS: &str = "get_model_fits";
pub const GET_MODEL_DETAIL: &str = "get_model_detail";
pub const REFRESH_INSTALLED: &str = "refresh_installed";

/// A source of system-info and model-fit data.
pub trait Backend: Send + Sync {
    /// Human-readable description shown in logs and the status line.
    fn describe(&self) -> String;

    fn get_system_info(&self) -> Result<SystemInfoRecord>;

    /// Same contract as [`Backend::get_system_info`], under the name used by
    /// the second desktop variant.
    fn get_system_specs(&self) -> Result<SystemInfoRecord> {
        self.get_system_info()
    }

    fn get_model_fits(&self) -> Result<Vec<ModelFitRecord>>;

    /// One record by exact name, `None` when the host doesn't know it.
    fn get_model_detail(&self, name: &str) -> Result<Option<ModelFitRecord>> {
        Ok(self.get_model_fits()?.into_iter().find(|r| r.name == name))
    }

    /// Ask the host to re-detect installed models. Returns the updated system
    /// record; installed flags change on the next [`Backend::get_model_fits`].
    fn refresh_installed(&self) -> Result<SystemInfoRecord> {
        self.get_system_info()
    }
}

/// Which command name a host expects for the system-info fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum SystemCommand {
    #[default]
    Info,
    Specs,
}

impl SystemCommand {
    pub fn command_name(&self) -> &'static str {
        match self {
            SystemCommand::Info => GET_SYSTEM_INFO,
            SystemCommand::Specs => GET_SYSTEM_SPECS,
        }
    }

    pub fn fetch(&self, backend: &dyn Backend) -> Result<SystemInfoRecord> {
        match self {
            SystemCommand::Info => backend.get_system_info(),
            SystemCommand::Specs => backend.get_system_specs(),
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshot file
// ---------------------------------------------------------------------------

/// On-disk snapshot: `{"system": {...}, "models": [...]}`. Either section may
/// be absent, in which case only the command reading it fails.
#[derive(Deserialize)]
struct Snapshot {
    #[serde(default)]
    system: Option<SystemInfoRecord>,
    #[serde(default)]
    models: Option<Vec<ModelFitRecord>>,
}

/// Serves commands from a JSON snapshot, re-read on every call so that
/// editing the file and refreshing picks up the change.
pub struct SnapshotBackend {
    path: PathBuf,
}

impl SnapshotBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self, command: &'static str) -> Result<Snapshot> {
        debug!(command, path = %self.path.display(), "reading snapshot");
        let text = std::fs::read_to_string(&self.path).map_err(|source| BackendError::Io {
            command,
            path: self.path.clone(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|e| BackendError::Decode {
            command,
            details: e.to_string(),
        })
    }
}

impl Backend for SnapshotBackend {
    fn describe(&self) -> String {
        format!("snapshot {}", self.path.display())
    }

    fn get_system_info(&self) -> Result<SystemInfoRecord> {
        self.load(GET_SYSTEM_INFO)?
            .system
            .ok_or(BackendError::MissingSection {
                command: GET_SYSTEM_INFO,
                section: "system",
            })
    }

    fn get_model_fits(&self) -> Result<Vec<ModelFitRecord>> {
        self.load(GET_MODEL_FITS)?
            .models
            .ok_or(BackendError::MissingSection {
                command: GET_MODEL_FITS,
                section: "models",
            })
    }
}

// ---------------------------------------------------------------------------
// HTTP host
// ---------------------------------------------------------------------------

/// Invokes commands on an HTTP host as `GET {base_url}/{command}`.
pub struct HttpBackend {
    base_url: String,
    timeout: Duration,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            timeout,
        }
    }

    /// Build the full URL for a command name.
    fn command_url(&self, command: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), command)
    }

    fn invoke<T: serde::de::DeserializeOwned>(&self, command: &'static str) -> Result<T> {
        self.invoke_with(command, &[])
    }

    fn invoke_with<T: serde::de::DeserializeOwned>(
        &self,
        command: &'static str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let url = self.command_url(command);
        debug!(command, %url, "invoking backend command");
        let mut request = ureq::get(&url).timeout(self.timeout);
        for (key, value) in query {
            request = request.query(key, value);
        }
        let resp = request
            .call()
            .map_err(|e| BackendError::Transport {
                command,
                details: e.to_string(),
            })?;
        resp.into_json().map_err(|e| BackendError::Decode {
            command,
            details: e.to_string(),
        })
    }
}

impl Backend for HttpBackend {
    fn describe(&self) -> String {
        format!("host {}", self.base_url)
    }

    fn get_system_info(&self) -> Result<SystemInfoRecord> {
        self.invoke(GET_SYSTEM_INFO)
    }

    fn get_system_specs(&self) -> Result<SystemInfoRecord> {
        self.invoke(GET_SYSTEM_SPECS)
    }

    fn get_model_fits(&self) -> Result<Vec<ModelFitRecord>> {
        self.invoke(GET_MODEL_FITS)
    }

    fn get_model_detail(&self, name: &str) -> Result<Option<ModelFitRecord>> {
        self.invoke_with(GET_MODEL_DETAIL, &[("name", name)])
    }

    fn refresh_installed(&self) -> Result<SystemInfoRecord> {
        self.invoke(REFRESH_INSTALLED)
    }
}
