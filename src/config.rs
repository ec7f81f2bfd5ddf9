use serde::Serialize;
use std::path::PathBuf;

use crate::error::{DashboardError, Result};

pub const DEFAULT_MODEL_DIR: &str = "student_performance_models";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Config {
    pub model_dir: PathBuf,
    pub host: String,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            model_dir: PathBuf::from(DEFAULT_MODEL_DIR),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl Config {
    /// Read `DASHBOARD_MODEL_DIR`, `DASHBOARD_HOST` and `DASHBOARD_PORT`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(dir) = lookup("DASHBOARD_MODEL_DIR").filter(|s| !s.trim().is_empty()) {
            config.model_dir = PathBuf::from(dir);
        }
        if let Some(host) = lookup("DASHBOARD_HOST").filter(|s| !s.trim().is_empty()) {
            config.host = host;
        }
        if let Some(port) = lookup("DASHBOARD_PORT") {
            config.port = port
                .trim()
                .parse()
                .map_err(|_| DashboardError::Config(format!("invalid DASHBOARD_PORT {:?}", port)))?;
        }

        Ok(config)
    }

    pub fn bind_addr(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}
