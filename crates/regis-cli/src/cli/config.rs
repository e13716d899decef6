use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use regis_core::config::ReconnectMode;
use regis_core::{CoreConfig, Permission};

/// Per-invocation overrides from command-line flags
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub base_url: Option<String>,
    pub socket_url: Option<String>,
    pub user_id: Option<u64>,
    pub csrf_token: Option<String>,
    pub session_cookie: Option<String>,
    pub permission: Option<Permission>,
    pub reconnect: Option<ReconnectMode>,
}

impl CliOverrides {
    pub fn apply(self, config: &mut CoreConfig) {
        if let Some(base_url) = self.base_url {
            config.base_url = base_url;
        }
        if self.socket_url.is_some() {
            config.socket_url = self.socket_url;
        }
        if self.user_id.is_some() {
            config.current_user_id = self.user_id;
        }
        if self.csrf_token.is_some() {
            config.csrf_token = self.csrf_token;
        }
        if self.session_cookie.is_some() {
            config.session_cookie = self.session_cookie;
        }
        if let Some(permission) = self.permission {
            config.notification_permission = permission;
        }
        if let Some(reconnect) = self.reconnect {
            config.reconnect = reconnect;
        }
    }
}

/// `~/.config/regis/config.json` on Linux
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("regis").join("config.json"))
}

/// Load the config file, then apply flag overrides.
///
/// An explicit `path` must exist. Without one the default location is used
/// when present, built-in defaults otherwise.
pub fn load_config(path: Option<&Path>, overrides: CliOverrides) -> Result<CoreConfig> {
    let mut config = match path {
        Some(path) => CoreConfig::load(path)
            .with_context(|| format!("Failed to load config file: {}", path.display()))?,
        None => match default_config_path().filter(|p| p.exists()) {
            Some(path) => CoreConfig::load(&path)
                .with_context(|| format!("Failed to load config file: {}", path.display()))?,
            None => CoreConfig::default(),
        },
    };
    overrides.apply(&mut config);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_overrides_win_over_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"baseUrl": "https://school.example", "currentUserId": 3, "csrfToken": "file"}}"#
        )
        .unwrap();

        let overrides = CliOverrides {
            user_id: Some(9),
            csrf_token: Some("flag".to_string()),
            reconnect: Some(ReconnectMode::Resume),
            ..Default::default()
        };
        let config = load_config(Some(file.path()), overrides).unwrap();
        assert_eq!(config.base_url, "https://school.example");
        assert_eq!(config.current_user_id, Some(9));
        assert_eq!(config.csrf_token.as_deref(), Some("flag"));
        assert_eq!(config.reconnect, ReconnectMode::Resume);
    }

    #[test]
    fn test_unset_overrides_keep_file_values() {
        let mut config = CoreConfig {
            socket_url: Some("wss://school.example/ws/".to_string()),
            ..Default::default()
        };
        CliOverrides::default().apply(&mut config);
        assert_eq!(config.socket_url.as_deref(), Some("wss://school.example/ws/"));
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let err = load_config(Some(Path::new("/no/such/regis.json")), CliOverrides::default())
            .unwrap_err();
        assert!(err.to_string().contains("/no/such/regis.json"));
    }
}
