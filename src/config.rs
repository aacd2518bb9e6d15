use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::app_dirs::AppDirs;

const MIN_TICK_INTERVAL_MS: u64 = 10;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    /// Period of the lava clock.
    pub tick_interval_ms: u64,
    /// Lava speed in character cells per second.
    pub lava_speed: f64,
    /// Cells between the lava and the first character at the start.
    pub head_start: u16,
    /// Extra cells the lava jumps on every wrong key. Zero disables it.
    pub wrong_key_penalty: u16,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 250,
            lava_speed: 4.0,
            head_start: 7,
            wrong_key_penalty: 0,
        }
    }
}

impl GameConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn validated(mut self) -> Self {
        self.tick_interval_ms = self.tick_interval_ms.max(MIN_TICK_INTERVAL_MS);
        if !self.lava_speed.is_finite() || self.lava_speed < 0.0 {
            self.lava_speed = Self::default().lava_speed;
        }
        self
    }
}

pub trait ConfigStore {
    fn load(&self) -> GameConfig;
    fn save(&self, cfg: &GameConfig) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        let path = AppDirs::config_path().unwrap_or_else(|| PathBuf::from("lavatype_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> GameConfig {
        if let Ok(bytes) = fs::read(&self.path) {
            match serde_json::from_slice::<GameConfig>(&bytes) {
                Ok(cfg) => return cfg.validated(),
                Err(err) => {
                    tracing::warn!(path = %self.path.display(), %err, "ignoring malformed config")
                }
            }
        }
        GameConfig::default()
    }

    fn save(&self, cfg: &GameConfig) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err))?;
        fs::write(&self.path, data)
    }
}
