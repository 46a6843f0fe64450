//! CLI settings
//!
//! Layered the usual way: built-in defaults, then a TOML file, then
//! `JOBHUB_*` environment variables (nested keys use `__`, e.g.
//! `JOBHUB_ENDPOINTS__REFRESH_PATH`), then command line flags.

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use directories::ProjectDirs;
use jobhub_http::client::ClientConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

const CONFIG_FILE: &str = "config.toml";
const COOKIE_JAR_FILE: &str = "cookies.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the Jobhub API
    pub api_url: String,
    /// Where the cookie jar and logs live
    pub state_dir: PathBuf,
    /// Per-request timeout; zero disables it
    pub request_timeout_secs: u64,
    pub user_agent: Option<String>,
    pub endpoints: ClientConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8080".to_string(),
            state_dir: default_state_dir(),
            request_timeout_secs: 10,
            user_agent: None,
            endpoints: ClientConfig::default(),
        }
    }
}

impl Settings {
    /// Load settings, reading `config_file` if given and otherwise the
    /// optional `config.toml` in the state directory
    pub fn load(config_file: Option<&Path>, state_dir: Option<PathBuf>) -> Result<Self> {
        let defaults = Self::default();
        let implicit_file = state_dir
            .as_deref()
            .unwrap_or(&defaults.state_dir)
            .join(CONFIG_FILE);

        let mut builder = Config::builder().add_source(Config::try_from(&defaults)?);

        builder = match config_file {
            Some(path) => builder.add_source(File::from(path)),
            None => builder.add_source(File::from(implicit_file).required(false)),
        };

        builder = builder.add_source(
            Environment::with_prefix("JOBHUB")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let mut settings: Self = builder
            .build()
            .and_then(|config| config.try_deserialize())
            .context("Failed to load settings")?;

        if let Some(state_dir) = state_dir {
            settings.state_dir = state_dir;
        }
        Ok(settings)
    }

    pub fn cookie_jar_path(&self) -> PathBuf {
        self.state_dir.join(COOKIE_JAR_FILE)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }
}

fn default_state_dir() -> PathBuf {
    if let Some(dirs) = ProjectDirs::from("dev", "Jobhub", "jobhub") {
        dirs.data_dir().to_path_buf()
    } else {
        warn!("Failed to determine platform-specific directories, using ./.jobhub");
        PathBuf::from(".jobhub")
    }
}
