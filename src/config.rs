//! Configuration handling for the provisioning CLI

use crate::form::FormStatus;
use crate::services::DEFAULT_FORM_SERVICE_ADDRESS;
use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

/// Job store used when none is configured
pub const DEFAULT_JOB_STORE_URL: &str = "http://127.0.0.1:3000";
/// Per-request timeout used when none is configured
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

const ENV_JOB_STORE_URL: &str = "JOBBOARD_JOB_STORE_URL";
const ENV_JOB_STORE_TOKEN: &str = "JOBBOARD_JOB_STORE_TOKEN";
const ENV_FORM_SERVICE_URL: &str = "JOBBOARD_FORM_SERVICE_URL";
const ENV_FORM_SERVICE_API_KEY: &str = "JOBBOARD_FORM_SERVICE_API_KEY";
const ENV_REQUEST_TIMEOUT_SECS: &str = "JOBBOARD_REQUEST_TIMEOUT_SECS";

/// Service endpoints and defaults for provisioning
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProvisionConfig {
    /// Base URL of the job store
    pub job_store_url: Option<String>,
    /// Bearer token for the job store
    pub job_store_token: Option<String>,
    /// Base URL of the form service
    pub form_service_url: Option<String>,
    /// API key for the form service
    pub form_service_api_key: Option<String>,
    /// Status for new forms
    pub form_status: Option<FormStatus>,
    /// Timeout applied to every outbound request
    pub request_timeout_secs: Option<u64>,
}

impl ProvisionConfig {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("nz", "jobboard", "jobboard-forms")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load configuration from file
    pub fn load() -> Result<Self> {
        let path = Self::config_path();

        if let Some(path) = path {
            if path.exists() {
                let content = fs::read_to_string(&path)?;
                let config: ProvisionConfig = serde_json::from_str(&content)?;
                return Ok(config);
            }
        }

        Ok(Self::default())
    }

    /// Load the file, then let the process environment win
    pub fn load_with_env() -> Result<Self> {
        let mut config = Self::load()?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Override fields from `lookup`, skipping unset or empty values
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(url) = get(ENV_JOB_STORE_URL) {
            self.job_store_url = Some(url);
        }
        if let Some(token) = get(ENV_JOB_STORE_TOKEN) {
            self.job_store_token = Some(token);
        }
        if let Some(url) = get(ENV_FORM_SERVICE_URL) {
            self.form_service_url = Some(url);
        }
        if let Some(key) = get(ENV_FORM_SERVICE_API_KEY) {
            self.form_service_api_key = Some(key);
        }
        if let Some(raw) = get(ENV_REQUEST_TIMEOUT_SECS) {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => self.request_timeout_secs = Some(secs),
                _ => warn!("Ignoring {ENV_REQUEST_TIMEOUT_SECS}={raw:?}, expected a positive number of seconds"),
            }
        }
    }

    pub fn job_store_url(&self) -> &str {
        self.job_store_url.as_deref().unwrap_or(DEFAULT_JOB_STORE_URL)
    }

    pub fn form_service_url(&self) -> &str {
        self.form_service_url
            .as_deref()
            .unwrap_or(DEFAULT_FORM_SERVICE_ADDRESS)
    }

    pub fn form_status(&self) -> FormStatus {
        self.form_status.unwrap_or_default()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_secs
                .filter(|secs| *secs > 0)
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }
}
