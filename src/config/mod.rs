//! Settings file (`translator.conf`) and config/log directory resolution.
//!
//! The file is a flat list of `key = value` lines; comments start with `#`,
//! `//` or `;`. Unknown keys are reported as notices and ignored so older
//! binaries keep working with newer files.

mod parse;
pub mod paths;

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::server::DEFAULT_PREFIX;
use crate::store::validate_locale;

pub use parse::{parse_key_value, skip_comment_or_empty};
pub use paths::{config_dir, logs_dir};

/// Default listen address of `translator serve`.
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:3030";
/// Default host page the editor connects to.
pub const DEFAULT_HOST_URL: &str = "http://127.0.0.1:3030/";

/// Effective settings: defaults, then the file, then CLI flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Server listen address.
    pub listen_addr: SocketAddr,
    /// Directory of `<locale>.yml` files; `<config>/locales` when unset.
    pub locales_dir: Option<PathBuf>,
    /// Locale used when a lookup names none.
    pub default_locale: String,
    /// Mount point of the translator endpoints.
    pub route_prefix: String,
    /// Fixed anti-forgery token; a random one is generated when unset.
    pub csrf_token: Option<String>,
    /// Host page URL for the editor.
    pub host_url: String,
    /// Log level used when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 3030)),
            locales_dir: None,
            default_locale: "en".to_string(),
            route_prefix: DEFAULT_PREFIX.to_string(),
            csrf_token: None,
            host_url: DEFAULT_HOST_URL.to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    /// What: Locale directory, falling back to `<config>/locales`.
    #[must_use]
    pub fn locales_dir(&self) -> PathBuf {
        self.locales_dir
            .clone()
            .unwrap_or_else(paths::default_locales_dir)
    }
}

/// What: Normalize a route prefix to `/segment` form without trailing slash.
#[must_use]
pub fn normalize_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

/// What: Parse settings file content over the defaults.
///
/// Inputs:
/// - `content`: Full text of a `translator.conf`
///
/// Output:
/// - Settings with every recognised key applied
/// - Notices for skipped lines and unknown keys, for the caller to log once
///   logging is up
///
/// # Errors
/// - `ConfigError::InvalidValue` when `listen_addr` is not a socket address or
///   `default_locale` is not a locale name
pub fn parse_settings(content: &str) -> Result<(Settings, Vec<String>), ConfigError> {
    let mut settings = Settings::default();
    let mut notices = Vec::new();
    for (index, line) in content.lines().enumerate() {
        if skip_comment_or_empty(line) {
            continue;
        }
        let Some((key, value)) = parse_key_value(line) else {
            notices.push(format!("ignoring settings line {} without '='", index + 1));
            continue;
        };
        let invalid = || ConfigError::InvalidValue {
            key: key.clone(),
            value: value.clone(),
            line: index + 1,
        };
        match key.as_str() {
            "listen_addr" => settings.listen_addr = value.parse().map_err(|_| invalid())?,
            "locales_dir" if !value.is_empty() => settings.locales_dir = Some(PathBuf::from(&value)),
            "default_locale" => {
                validate_locale(&value).map_err(|_| invalid())?;
                settings.default_locale = value;
            }
            "route_prefix" => settings.route_prefix = normalize_prefix(&value),
            "csrf_token" => {
                settings.csrf_token = Some(value).filter(|v| !v.is_empty());
            }
            "host_url" if !value.is_empty() => settings.host_url = value,
            "log_level" if !value.is_empty() => settings.log_level = value,
            "locales_dir" | "host_url" | "log_level" => {}
            other => notices.push(format!("unknown setting '{other}' on line {} ignored", index + 1)),
        }
    }
    Ok((settings, notices))
}

/// What: Load settings from `path`, or from the resolved `translator.conf`.
///
/// Output:
/// - Defaults and no notices when no settings file exists
/// - Otherwise what [`parse_settings`] returns
///
/// # Errors
/// - `ConfigError::Read` when the file exists but cannot be read
/// - Any parse error from [`parse_settings`]
pub fn load_settings(path: Option<&Path>) -> Result<(Settings, Vec<String>), ConfigError> {
    let path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => paths::resolve_settings_config_path(),
    };
    let Some(path) = path else {
        return Ok((Settings::default(), Vec::new()));
    };
    let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;
    parse_settings(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    /// What: Known keys override defaults; comments and unknown keys are skipped.
    fn parses_known_keys() {
        let (settings, notices) = parse_settings(
            "# translator settings\n\
             listen_addr = 0.0.0.0:8080\n\
             locales_dir = /srv/locales\n\
             default_locale = de\n\
             route_prefix = admin/i18n/\n\
             ; comment\n\
             csrf_token = secret\n\
             colour = blue\n\
             stray line\n",
        )
        .expect("valid settings");
        assert_eq!(
            notices,
            vec![
                "unknown setting 'colour' on line 8 ignored".to_string(),
                "ignoring settings line 9 without '='".to_string(),
            ]
        );
        assert_eq!(settings.listen_addr, SocketAddr::from(([0, 0, 0, 0], 8080)));
        assert_eq!(settings.locales_dir(), PathBuf::from("/srv/locales"));
        assert_eq!(settings.default_locale, "de");
        assert_eq!(settings.route_prefix, "/admin/i18n");
        assert_eq!(settings.csrf_token.as_deref(), Some("secret"));
        assert_eq!(settings.host_url, DEFAULT_HOST_URL);
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    /// What: Bad values name their key and line.
    fn rejects_invalid_values() {
        let err = parse_settings("\nlisten_addr = nowhere\n").expect_err("invalid address");
        assert_eq!(
            err.to_string(),
            "invalid value 'nowhere' for 'listen_addr' on line 2"
        );
        assert!(parse_settings("default_locale = ../etc").is_err());
    }

    #[test]
    /// What: Empty token means "generate one".
    fn empty_token_is_unset() {
        let (settings, _) = parse_settings("csrf_token =").expect("valid settings");
        assert_eq!(settings.csrf_token, None);
    }

    #[test]
    /// What: A missing explicit file is a read error; its content is parsed otherwise.
    fn loads_explicit_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("translator.conf");
        assert!(matches!(
            load_settings(Some(&path)),
            Err(ConfigError::Read { .. })
        ));
        std::fs::write(&path, "log_level = debug\n").expect("write settings");
        let (settings, notices) = load_settings(Some(&path)).expect("loads");
        assert_eq!(settings.log_level, "debug");
        assert!(notices.is_empty());
    }

    #[test]
    fn normalizes_prefixes() {
        assert_eq!(normalize_prefix("/translator/"), "/translator");
        assert_eq!(normalize_prefix("translator"), "/translator");
        assert_eq!(normalize_prefix(" / "), "");
    }
}
