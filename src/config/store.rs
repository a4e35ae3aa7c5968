use std::cell::RefCell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::{Account, Config, ConfigError, ConfigResult};
use crate::assets::LoadOutcome;

#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `None` when no config has been written yet.
    pub fn load(&self) -> ConfigResult<Option<Config>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|source| ConfigError::Parse {
                path: self.path.clone(),
                source,
            })
    }

    pub fn save(&self, config: &Config) -> ConfigResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: self.path.clone(),
                source,
            })?;
        }

        let serialized = serde_json::to_string_pretty(config)?;
        fs::write(&self.path, serialized).map_err(|source| ConfigError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

/// Loaded configuration shared between the window and the settings UI.
/// Every mutation is written back to the store.
#[derive(Debug)]
pub struct Settings {
    store: ConfigStore,
    config: RefCell<Config>,
}

impl Settings {
    pub fn new(store: ConfigStore) -> Self {
        Self {
            store,
            config: RefCell::new(Config::default()),
        }
    }

    /// Falls back to defaults when the file is missing or unusable.
    pub fn load(&self) -> LoadOutcome<ConfigError> {
        match self.store.load() {
            Ok(Some(config)) => {
                let count = config.accounts.len();
                tracing::info!(
                    path = %self.store.path().display(),
                    accounts = count,
                    debug = config.debug,
                    "loaded config"
                );
                *self.config.borrow_mut() = config;
                LoadOutcome::Loaded { count }
            }
            Ok(None) => {
                tracing::info!(
                    path = %self.store.path().display(),
                    "no config found; using defaults"
                );
                *self.config.borrow_mut() = Config::default();
                LoadOutcome::Skipped
            }
            Err(err) => {
                tracing::warn!(?err, "failed to load config; using defaults");
                *self.config.borrow_mut() = Config::default();
                LoadOutcome::Failed(err)
            }
        }
    }

    pub fn snapshot(&self) -> Config {
        self.config.borrow().clone()
    }

    pub fn debug(&self) -> bool {
        self.config.borrow().debug
    }

    pub fn accounts(&self) -> Vec<Account> {
        self.config.borrow().accounts.clone()
    }

    pub fn account(&self, id: &str) -> Option<Account> {
        self.config.borrow().account(id).cloned()
    }

    pub fn auto_login_account(&self) -> Option<Account> {
        self.config.borrow().auto_login_account().cloned()
    }

    pub fn set_debug(&self, debug: bool) -> ConfigResult<()> {
        self.update(|config| {
            config.debug = debug;
            Ok(())
        })
    }

    /// Applies `change` and persists the result. The in-memory config is left
    /// untouched if `change` fails.
    pub fn update<F>(&self, change: F) -> ConfigResult<()>
    where
        F: FnOnce(&mut Config) -> ConfigResult<()>,
    {
        let mut next = self.snapshot();
        change(&mut next)?;
        self.store.save(&next)?;
        *self.config.borrow_mut() = next;
        Ok(())
    }
}
