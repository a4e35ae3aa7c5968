use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod store;

pub use store::{ConfigStore, Settings};

pub const APP_DIR: &str = "discord-gtk";
pub const APP_CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigPathError {
    MissingHomeDirectory,
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing HOME environment variable")]
    MissingHomeDirectory,
    #[error("failed to read config: {path}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to write config: {path}")]
    Write { path: PathBuf, source: io::Error },
    #[error("failed to parse config: {path}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to serialize config")]
    Serialize(#[from] serde_json::Error),
    #[error("no saved account with id {0}")]
    UnknownAccount(String),
}

impl From<ConfigPathError> for ConfigError {
    fn from(err: ConfigPathError) -> Self {
        match err {
            ConfigPathError::MissingHomeDirectory => Self::MissingHomeDirectory,
        }
    }
}

/// A saved credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub token: String,
    #[serde(default)]
    pub auto_login: bool,
}

/// User accounts and preferences from `config.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub debug: bool,
}

impl Config {
    pub fn auto_login_account(&self) -> Option<&Account> {
        self.accounts.iter().find(|account| account.auto_login)
    }

    pub fn account(&self, id: &str) -> Option<&Account> {
        self.accounts.iter().find(|account| account.id == id)
    }

    /// Replaces the account with the same id, or appends it.
    pub fn upsert_account(&mut self, account: Account) {
        match self.accounts.iter_mut().find(|saved| saved.id == account.id) {
            Some(saved) => *saved = account,
            None => self.accounts.push(account),
        }
    }

    pub fn remove_account(&mut self, id: &str) -> Option<Account> {
        let index = self.accounts.iter().position(|account| account.id == id)?;
        Some(self.accounts.remove(index))
    }

    /// Flags `id` for auto-login and clears the flag everywhere else.
    pub fn set_auto_login(&mut self, id: &str) -> ConfigResult<()> {
        if self.account(id).is_none() {
            return Err(ConfigError::UnknownAccount(id.to_string()));
        }
        for account in &mut self.accounts {
            account.auto_login = account.id == id;
        }
        Ok(())
    }
}

pub fn config_env_dirs() -> (Option<PathBuf>, Option<PathBuf>) {
    (
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
}

pub fn default_config_path() -> Result<PathBuf, ConfigPathError> {
    let (xdg_config_home, home) = config_env_dirs();
    app_config_path(
        APP_DIR,
        APP_CONFIG_FILE,
        xdg_config_home.as_deref(),
        home.as_deref(),
    )
}

pub fn app_config_path(
    app_dir: &str,
    file_name: &str,
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    let mut path = config_root(xdg_config_home, home)?;
    path.push(app_dir);
    path.push(file_name);
    Ok(path)
}

fn config_root(
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    if let Some(xdg) = xdg_config_home.filter(|path| !path.as_os_str().is_empty()) {
        return Ok(xdg.to_path_buf());
    }

    let home = home.ok_or(ConfigPathError::MissingHomeDirectory)?;
    Ok(home.join(".config"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(id: &str, auto_login: bool) -> Account {
        Account {
            id: id.to_string(),
            token: format!("token-{id}"),
            auto_login,
        }
    }

    #[test]
    fn app_config_path_prefers_xdg_config_home() {
        let path = app_config_path(
            APP_DIR,
            APP_CONFIG_FILE,
            Some(Path::new("/tmp/config-root")),
            Some(Path::new("/tmp/home")),
        )
        .expect("path should resolve");

        assert_eq!(
            path,
            PathBuf::from("/tmp/config-root/discord-gtk/config.json")
        );
    }

    #[test]
    fn app_config_path_ignores_empty_xdg_and_uses_home() {
        let path = app_config_path(
            APP_DIR,
            APP_CONFIG_FILE,
            Some(Path::new("")),
            Some(Path::new("/tmp/home")),
        )
        .expect("path should resolve");

        assert_eq!(
            path,
            PathBuf::from("/tmp/home/.config/discord-gtk/config.json")
        );
    }

    #[test]
    fn app_config_path_errors_when_home_missing_and_xdg_unset() {
        let error = app_config_path(APP_DIR, APP_CONFIG_FILE, None, None).unwrap_err();
        assert_eq!(error, ConfigPathError::MissingHomeDirectory);
    }

    #[test]
    fn config_parses_camel_case_and_defaults_missing_fields() {
        let config: Config = serde_json::from_str(
            r#"{"accounts":[{"id":"alice","token":"abc","autoLogin":true},{"id":"bob","token":"def"}]}"#,
        )
        .expect("config should parse");

        assert!(!config.debug);
        assert_eq!(config.accounts.len(), 2);
        assert!(!config.accounts[1].auto_login);
        assert_eq!(config.auto_login_account().map(|a| a.id.as_str()), Some("alice"));
    }

    #[test]
    fn auto_login_account_is_none_without_flag() {
        let config = Config {
            accounts: vec![account("alice", false), account("bob", false)],
            debug: false,
        };
        assert!(config.auto_login_account().is_none());
    }

    #[test]
    fn upsert_replaces_existing_account_by_id() {
        let mut config = Config::default();
        config.upsert_account(account("alice", false));
        config.upsert_account(Account {
            token: "rotated".to_string(),
            ..account("alice", true)
        });

        assert_eq!(config.accounts.len(), 1);
        assert_eq!(config.accounts[0].token, "rotated");
        assert!(config.accounts[0].auto_login);
    }

    #[test]
    fn set_auto_login_is_exclusive() {
        let mut config = Config {
            accounts: vec![account("alice", true), account("bob", false)],
            debug: false,
        };

        config.set_auto_login("bob").expect("bob exists");
        assert_eq!(config.auto_login_account().map(|a| a.id.as_str()), Some("bob"));
        assert!(!config.accounts[0].auto_login);

        assert!(matches!(
            config.set_auto_login("carol"),
            Err(ConfigError::UnknownAccount(id)) if id == "carol"
        ));
    }

    #[test]
    fn remove_account_returns_removed_entry() {
        let mut config = Config {
            accounts: vec![account("alice", false)],
            debug: true,
        };
        assert_eq!(config.remove_account("alice"), Some(account("alice", false)));
        assert_eq!(config.remove_account("alice"), None);
    }
}
