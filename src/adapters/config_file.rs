//! JSON config file adapter.
//!
//! Implements [`ConfigPort`].  A missing file loads defaults; a present
//! file is parsed with missing fields defaulted, then validated.  `save`
//! validates first and writes atomically.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::info;

use super::utils::write_atomically;
use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::ControllerConfig;

pub struct JsonConfigFile {
    path: PathBuf,
}

impl JsonConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigPort for JsonConfigFile {
    fn load(&self) -> Result<ControllerConfig, ConfigError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("config: {} not found, using defaults", self.path.display());
                return Ok(ControllerConfig::default());
            }
            Err(_) => return Err(ConfigError::IoError),
        };
        let cfg: ControllerConfig =
            serde_json::from_str(&text).map_err(|_| ConfigError::Corrupted)?;
        cfg.validate()?;
        info!("config: loaded {}", self.path.display());
        Ok(cfg)
    }

    fn save(&self, config: &ControllerConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let json = serde_json::to_vec_pretty(config).map_err(|_| ConfigError::IoError)?;
        write_atomically(&self.path, &json).map_err(|_| ConfigError::IoError)?;
        info!("config: saved {}", self.path.display());
        Ok(())
    }
}
