use directories::ProjectDirs;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "dailytype";

/// Centralized application directory resolution
#[derive(Debug, Clone)]
pub struct AppDirs {
    state_dir: PathBuf,
}

impl AppDirs {
    /// `$HOME/.local/state/dailytype`, or the platform's local data dir.
    pub fn resolve() -> Self {
        let state_dir = if let Ok(home) = std::env::var("HOME") {
            PathBuf::from(home)
                .join(".local")
                .join("state")
                .join(APP_NAME)
        } else {
            ProjectDirs::from("", "", APP_NAME)
                .map(|proj_dirs| proj_dirs.data_local_dir().to_path_buf())
                .unwrap_or_else(|| PathBuf::from(format!(".{APP_NAME}")))
        };
        Self { state_dir }
    }

    pub fn with_state_dir<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            state_dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }

    pub fn db_path(&self) -> PathBuf {
        self.state_dir.join("records.db")
    }

    pub fn history_path(&self) -> PathBuf {
        self.state_dir.join("history.csv")
    }

    pub fn log_path(&self) -> PathBuf {
        self.state_dir.join("dailytype.log")
    }

    /// Config lives with the state when the state dir was given explicitly.
    pub fn config_path(&self, explicit: bool) -> PathBuf {
        if explicit {
            return self.state_dir.join("config.json");
        }
        ProjectDirs::from("", "", APP_NAME)
            .map(|pd| pd.config_dir().join("config.json"))
            .unwrap_or_else(|| PathBuf::from("dailytype_config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_under_explicit_state_dir() {
        let dirs = AppDirs::with_state_dir("/tmp/dt");
        assert_eq!(dirs.db_path(), PathBuf::from("/tmp/dt/records.db"));
        assert_eq!(dirs.history_path(), PathBuf::from("/tmp/dt/history.csv"));
        assert_eq!(dirs.log_path(), PathBuf::from("/tmp/dt/dailytype.log"));
        assert_eq!(dirs.config_path(true), PathBuf::from("/tmp/dt/config.json"));
    }

    #[test]
    fn test_resolve_ends_with_app_name() {
        assert!(AppDirs::resolve().state_dir().ends_with(APP_NAME));
    }
}
