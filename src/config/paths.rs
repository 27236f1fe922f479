//! Config, logs and locale directory resolution.

use std::env;
use std::path::{Path, PathBuf};

/// Settings file name inside the config directory.
pub const SETTINGS_FILE: &str = "translator.conf";

/// Locate `translator.conf`, preferring `$HOME/.config/translator` over `$XDG_CONFIG_HOME/translator`.
pub(crate) fn resolve_settings_config_path() -> Option<PathBuf> {
    let home = env::var("HOME").ok();
    let xdg_config = env::var("XDG_CONFIG_HOME").ok();
    let mut candidates: Vec<PathBuf> = Vec::new();
    if let Some(h) = home.as_deref() {
        candidates.push(Path::new(h).join(".config").join("translator").join(SETTINGS_FILE));
    }
    if let Some(xdg) = xdg_config.as_deref() {
        candidates.push(Path::new(xdg).join("translator").join(SETTINGS_FILE));
    }
    candidates.into_iter().find(|p| p.is_file())
}

/// Resolve an XDG base directory from `var`, else `$HOME` joined with `home_default`.
fn xdg_base_dir(var: &str, home_default: &[&str]) -> PathBuf {
    if let Ok(p) = env::var(var)
        && !p.trim().is_empty()
    {
        return PathBuf::from(p);
    }
    let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
    let mut base = PathBuf::from(home);
    for seg in home_default {
        base = base.join(seg);
    }
    base
}

/// Config directory: `$HOME/.config/translator`, else under `$XDG_CONFIG_HOME` (created on demand).
#[must_use]
pub fn config_dir() -> PathBuf {
    if let Ok(home) = env::var("HOME") {
        let dir = Path::new(&home).join(".config").join("translator");
        if std::fs::create_dir_all(&dir).is_ok() {
            return dir;
        }
    }
    let dir = xdg_base_dir("XDG_CONFIG_HOME", &[".config"]).join("translator");
    let _ = std::fs::create_dir_all(&dir);
    dir
}

/// Logs directory under the config directory (created on demand).
#[must_use]
pub fn logs_dir() -> PathBuf {
    let dir = config_dir().join("logs");
    let _ = std::fs::create_dir_all(&dir);
    dir
}

/// Default locale files directory under the config directory (not created).
#[must_use]
pub fn default_locales_dir() -> PathBuf {
    config_dir().join("locales")
}
