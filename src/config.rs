use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::quotes::SupportedLanguage;
use crate::skill::{SkillModel, DEFAULT_MEAN_WPM, DEFAULT_STD_DEV_WPM};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub language: SupportedLanguage,
    pub mean_wpm: f64,
    pub std_dev_wpm: f64,
    pub history: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: SupportedLanguage::En,
            mean_wpm: DEFAULT_MEAN_WPM,
            std_dev_wpm: DEFAULT_STD_DEV_WPM,
            history: true,
        }
    }
}

impl Config {
    pub fn skill_model(&self) -> SkillModel {
        SkillModel::new(self.mean_wpm, self.std_dev_wpm).sanitized()
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        match fs::read(&self.path) {
            Ok(bytes) => match serde_json::from_slice::<Config>(&bytes) {
                Ok(cfg) => {
                    debug!(path = %self.path.display(), "config loaded");
                    cfg
                }
                Err(e) => {
                    warn!(path = %self.path.display(), error = %e, "unreadable config, using defaults");
                    Config::default()
                }
            },
            Err(_) => Config::default(),
        }
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}
