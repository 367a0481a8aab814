use std::env;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::error::ApiError;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Where the client talks to and where it keeps its session mirror.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: Url,
    pub timeout: Duration,
    pub data_dir: PathBuf,
    pub protected_routes: Vec<String>,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Ok(Self {
            base_url: Url::parse(base_url)?,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            data_dir: default_data_dir(),
            protected_routes: vec!["/dashboard".to_string(), "/profile".to_string()],
        })
    }

    /// Reads `TODOFLOW_API_URL`, `TODOFLOW_TIMEOUT_SECS` and `TODOFLOW_DATA_DIR`.
    /// Debug builds load `.env` first.
    pub fn from_env() -> Result<Self, ApiError> {
        #[cfg(debug_assertions)]
        dotenv::dotenv().ok();

        let base_url = env::var("TODOFLOW_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let mut config = Self::new(&base_url)?;

        if let Ok(raw) = env::var("TODOFLOW_TIMEOUT_SECS") {
            match raw.parse::<u64>() {
                Ok(secs) => config.timeout = Duration::from_secs(secs),
                Err(e) => log::warn!("Ignoring TODOFLOW_TIMEOUT_SECS={}: {}", raw, e),
            }
        }
        if let Ok(dir) = env::var("TODOFLOW_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }

        log::info!("Using API at {}", config.base_url);
        Ok(config)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn with_protected_routes<I, S>(mut self, routes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.protected_routes = routes.into_iter().map(Into::into).collect();
        self
    }

    pub fn session_file(&self) -> PathBuf {
        self.data_dir.join("session.json")
    }

    /// Resolves an API path such as `/api/auth/me` against the base URL.
    pub fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base_url.join(path)?)
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(env::temp_dir)
        .join("todoflow")
}
