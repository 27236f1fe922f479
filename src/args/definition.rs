//! Command-line argument definition and processing.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{Settings, normalize_prefix};
use crate::error::ConfigError;
use crate::store::validate_locale;

/// translator - capture every translation a page looks up and edit it in place
#[derive(Parser, Debug)]
#[command(name = "translator")]
#[command(version)]
#[command(about = "Capture every translation a page looks up and edit it in place", long_about = None)]
pub struct Args {
    /// What to run
    #[command(subcommand)]
    pub command: Command,

    /// Set the logging level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Enable verbose output (equivalent to --log-level debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Settings file to read instead of ~/.config/translator/translator.conf
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Mount point of the translator endpoints (default: /translator)
    #[arg(long, global = true)]
    pub prefix: Option<String>,
}

/// Subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Serve the demo page and the translator endpoints over YAML locale files
    Serve {
        /// Address to listen on (default: 127.0.0.1:3030)
        #[arg(long)]
        listen: Option<SocketAddr>,
        /// Directory holding <locale>.yml files
        #[arg(long)]
        locales_dir: Option<PathBuf>,
        /// Locale used when a lookup names none
        #[arg(long)]
        default_locale: Option<String>,
        /// Fixed anti-forgery token instead of a random one
        #[arg(long)]
        csrf_token: Option<String>,
    },
    /// Open the terminal editor against a running host page
    Edit {
        /// Host page URL (default: http://127.0.0.1:3030/)
        #[arg(long)]
        host_url: Option<String>,
    },
}

impl Args {
    /// What: Overlay command-line values on settings loaded from file.
    ///
    /// # Errors
    /// - `ConfigError::InvalidFlag` when `--default-locale` is not a locale name
    ///
    /// Details:
    /// - Only flags that were given replace the file or default values.
    pub fn apply_to(&self, settings: &mut Settings) -> Result<(), ConfigError> {
        if let Some(level) = &self.log_level {
            settings.log_level.clone_from(level);
        }
        if let Some(prefix) = &self.prefix {
            settings.route_prefix = normalize_prefix(prefix);
        }
        match &self.command {
            Command::Serve {
                listen,
                locales_dir,
                default_locale,
                csrf_token,
            } => {
                if let Some(addr) = listen {
                    settings.listen_addr = *addr;
                }
                if let Some(dir) = locales_dir {
                    settings.locales_dir = Some(dir.clone());
                }
                if let Some(locale) = default_locale {
                    validate_locale(locale).map_err(|_| ConfigError::InvalidFlag {
                        flag: "default-locale",
                        value: locale.clone(),
                    })?;
                    settings.default_locale.clone_from(locale);
                }
                if let Some(token) = csrf_token {
                    settings.csrf_token = Some(token.clone());
                }
            }
            Command::Edit { host_url } => {
                if let Some(url) = host_url {
                    settings.host_url.clone_from(url);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    /// What: Given flags override settings; absent ones leave them alone.
    fn flags_override_settings() {
        let args = Args::parse_from([
            "translator",
            "serve",
            "--listen",
            "0.0.0.0:9000",
            "--default-locale",
            "fr",
            "--prefix",
            "i18n",
        ]);
        let mut settings = Settings {
            csrf_token: Some("from-file".into()),
            ..Settings::default()
        };
        args.apply_to(&mut settings).expect("valid flags");
        assert_eq!(settings.listen_addr, SocketAddr::from(([0, 0, 0, 0], 9000)));
        assert_eq!(settings.default_locale, "fr");
        assert_eq!(settings.route_prefix, "/i18n");
        assert_eq!(settings.csrf_token.as_deref(), Some("from-file"));
    }

    #[test]
    /// What: Global flags may follow the subcommand.
    fn edit_takes_host_url_and_globals() {
        let args = Args::parse_from([
            "translator",
            "edit",
            "--host-url",
            "http://localhost:8080/",
            "--log-level",
            "debug",
        ]);
        let mut settings = Settings::default();
        args.apply_to(&mut settings).expect("valid flags");
        assert_eq!(settings.host_url, "http://localhost:8080/");
        assert_eq!(settings.log_level, "debug");
        assert_eq!(
            args.command,
            Command::Edit {
                host_url: Some("http://localhost:8080/".into())
            }
        );
    }

    #[test]
    /// What: A malformed `--default-locale` is rejected and leaves settings alone.
    fn rejects_bad_default_locale() {
        let args = Args::parse_from(["translator", "serve", "--default-locale", "../etc"]);
        let mut settings = Settings::default();
        let err = args.apply_to(&mut settings).expect_err("invalid locale");
        assert_eq!(err.to_string(), "invalid value '../etc' for --default-locale");
        assert_eq!(settings.default_locale, "en");
    }
}
