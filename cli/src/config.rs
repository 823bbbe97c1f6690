// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{error::Error, path::PathBuf, str::FromStr};

use davsync_carddav::CardDavConfig;
use tokio::fs;

/// Name of the application, used for the config directory.
pub const APP_NAME: &str = "davsync";

const DAVSYNC_CONFIG_ENV: &str = "DAVSYNC_CONFIG";

/// Loads the configuration.
///
/// The file is taken from `path`, then from `$DAVSYNC_CONFIG`, then from
/// `davsync/config.toml` in the user config directory.
///
/// # Errors
///
/// Returns an error if no config file is found or it cannot be parsed.
#[tracing::instrument]
pub async fn parse_config(path: Option<PathBuf>) -> Result<Config, Box<dyn Error>> {
    let path = if let Some(path) = path {
        path
    } else if let Ok(env_path) = std::env::var(DAVSYNC_CONFIG_ENV) {
        PathBuf::from(env_path)
    } else {
        let config = get_config_dir()?.join(format!("{APP_NAME}/config.toml"));
        if !config.exists() {
            return Err(format!("No config found at: {}", config.display()).into());
        }
        config
    };

    tracing::debug!(path = %path.display(), "reading config");
    fs::read_to_string(&path)
        .await
        .map_err(|e| format!("Failed to read config file at {}: {}", path.display(), e))?
        .parse::<Config>()
}

/// Configuration of the davsync command-line tool.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    /// The `CardDAV` server to sync with.
    pub server: CardDavConfig,
}

impl FromStr for Config {
    type Err = Box<dyn Error>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(toml::from_str(s)?)
    }
}

fn get_config_dir() -> Result<PathBuf, Box<dyn Error>> {
    #[cfg(unix)]
    let config_dir = xdg::BaseDirectories::new().get_config_home();
    #[cfg(not(unix))]
    let config_dir = dirs::config_dir();
    config_dir.ok_or_else(|| "User-specific home directory not found".into())
}

#[cfg(test)]
#[allow(unsafe_code)]
mod tests {
    use super::*;
    use davsync_carddav::{AuthMethod, DeltaMode, SyncMethod};
    use std::fs;
    use std::sync::OnceLock;
    use tempfile::TempDir;
    use tokio::sync::Mutex;

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn write_config(path: &std::path::Path, base_url: &str) {
        let toml_content = format!(
            r#"
[server]
base_url = "{base_url}"
home_path = "/dav/addressbooks/user/"
"#
        );
        fs::write(path, toml_content).unwrap();
    }

    #[test]
    fn parses_full_config() {
        let config: Config = r#"
[server]
base_url = "https://dav.example.com"
home_path = "/dav/addressbooks/user/"
timeout_secs = 10

[server.auth]
type = "basic"
username = "user"
password = "pass"

[server.sync]
method = "basic"
delta = "inline"
"#
        .parse()
        .unwrap();

        assert_eq!(config.server.base_url, "https://dav.example.com");
        assert_eq!(config.server.timeout_secs, 10);
        assert!(matches!(
            config.server.auth,
            AuthMethod::Basic { ref username, .. } if username == "user"
        ));
        assert_eq!(config.server.sync.method, SyncMethod::Basic);
        assert_eq!(config.server.sync.delta, DeltaMode::Inline);
    }

    #[test]
    fn fills_defaults() {
        let config: Config = r#"
[server]
base_url = "https://dav.example.com"
home_path = "/dav/addressbooks/user/"
"#
        .parse()
        .unwrap();

        assert!(matches!(config.server.auth, AuthMethod::None));
        assert_eq!(config.server.timeout_secs, 30);
        assert_eq!(config.server.sync.method, SyncMethod::Webdav);
        assert_eq!(config.server.sync.delta, DeltaMode::Multiget);
    }

    #[test]
    fn rejects_missing_server() {
        assert!("".parse::<Config>().is_err());
    }

    #[tokio::test]
    async fn cli_flag_overrides_env_var() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        write_config(&config_path, "https://cli.example.com");
        let env_path = temp_dir.path().join("env_config.toml");
        write_config(&env_path, "https://env.example.com");

        {
            let _guard = env_lock().lock().await;
            unsafe {
                std::env::set_var(DAVSYNC_CONFIG_ENV, env_path.to_str().unwrap());
            }

            let config = parse_config(Some(config_path.clone())).await.unwrap();

            assert_eq!(config.server.base_url, "https://cli.example.com");

            unsafe {
                std::env::remove_var(DAVSYNC_CONFIG_ENV);
            }
        }
    }

    #[tokio::test]
    async fn env_var_overrides_default_config() {
        let temp_dir = TempDir::new().unwrap();
        let env_path = temp_dir.path().join("env_config.toml");
        write_config(&env_path, "https://env.example.com");

        {
            let _guard = env_lock().lock().await;
            unsafe {
                std::env::set_var(DAVSYNC_CONFIG_ENV, env_path.to_str().unwrap());
            }

            let config = parse_config(None).await.unwrap();

            assert_eq!(config.server.base_url, "https://env.example.com");

            unsafe {
                std::env::remove_var(DAVSYNC_CONFIG_ENV);
            }
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn uses_default_when_no_cli_or_env() {
        let temp_dir = TempDir::new().unwrap();
        let default_config_dir = temp_dir.path().join(APP_NAME);
        fs::create_dir_all(&default_config_dir).unwrap();
        write_config(
            &default_config_dir.join("config.toml"),
            "https://default.example.com",
        );

        let xdg_config_home = temp_dir.path().to_str().unwrap().to_string();
        {
            let _guard = env_lock().lock().await;
            unsafe {
                std::env::remove_var(DAVSYNC_CONFIG_ENV);
                std::env::set_var("XDG_CONFIG_HOME", xdg_config_home);
            }

            let config = parse_config(None).await.unwrap();

            assert_eq!(config.server.base_url, "https://default.example.com");

            unsafe {
                std::env::remove_var("XDG_CONFIG_HOME");
            }
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn returns_error_when_no_config_found() {
        let temp_dir = TempDir::new().unwrap();
        let empty_dir = temp_dir.path().join("empty");
        fs::create_dir(&empty_dir).unwrap();

        let xdg_config_home = empty_dir.to_str().unwrap().to_string();
        {
            let _guard = env_lock().lock().await;
            unsafe {
                std::env::remove_var(DAVSYNC_CONFIG_ENV);
                std::env::set_var("XDG_CONFIG_HOME", xdg_config_home);
            }

            let result = parse_config(None).await;

            assert!(result.is_err());

            unsafe {
                std::env::remove_var("XDG_CONFIG_HOME");
            }
        }
    }

    #[tokio::test]
    async fn returns_error_for_unreadable_path() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.toml");

        let result = parse_config(Some(missing)).await;

        let err = result.unwrap_err().to_string();
        assert!(err.contains("Failed to read config file"));
    }
}
