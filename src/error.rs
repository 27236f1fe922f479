//! Error types shared across the crate.

use std::path::PathBuf;

use thiserror::Error;

/// A lookup found nothing at the resolved path.
///
/// This is the "not found" outcome a provider reports, not a failure: the
/// capture layer records it with an empty value so it can be filled in.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("translation missing: {locale}.{path}")]
pub struct MissingTranslation {
    /// Locale the lookup ran against.
    pub locale: String,
    /// Fully resolved dot path.
    pub path: String,
}

/// Outcome of a failed `resolve`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// Nothing stored at the path.
    #[error(transparent)]
    Missing(#[from] MissingTranslation),
    /// The `scope` option has a shape that cannot form a path.
    #[error("invalid scope for key '{key}': expected nothing, a segment or a list of segments, got {found}")]
    InvalidScope {
        /// Key of the offending lookup.
        key: String,
        /// Short description of what was passed instead.
        found: String,
    },
}

impl ResolveError {
    /// What: Whether this is the benign "not found" case.
    #[must_use]
    pub const fn is_missing(&self) -> bool {
        matches!(self, Self::Missing(_))
    }
}

/// Failures reading or writing the translation store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem failure.
    #[error("failed to access {path}: {source}")]
    Io {
        /// File or directory involved.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// YAML could not be parsed or produced.
    #[error("invalid YAML in {path}: {source}")]
    Yaml {
        /// File involved.
        path: PathBuf,
        /// Underlying parser error.
        #[source]
        source: serde_norway::Error,
    },
    /// Locale code does not look like `language[-script][-region]`.
    #[error("invalid locale code '{0}'. Expected format: language[-region] (e.g. 'en', 'de-DE')")]
    InvalidLocale(String),
    /// Path is empty or has empty segments.
    #[error("invalid translation path '{0}'")]
    InvalidPath(String),
    /// A plain string sits where the path needs a mapping.
    #[error("cannot write '{path}' in locale '{locale}': '{blocking}' is a plain string")]
    PathConflict {
        /// Locale written to.
        locale: String,
        /// Path being written.
        path: String,
        /// Prefix that holds a scalar.
        blocking: String,
    },
}

/// Failures decoding an edit submission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    /// A `translations[...]` field whose brackets do not form `[locale][path]`.
    #[error("malformed submission field '{0}': expected translations[locale][path]")]
    MalformedField(String),
}

/// Failures surfaced by the editor session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditorError {
    /// The host page exposes no anti-forgery token; nothing is submitted.
    #[error("CSRF-token could not be found")]
    MissingCsrfToken,
    /// Save was requested while no tables are loaded.
    #[error("nothing to save: the editor is {0}")]
    NotLoaded(&'static str),
    /// Network or HTTP status failure.
    #[error("{0}")]
    Transport(String),
}

/// Failures loading the settings file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Settings file exists but cannot be read.
    #[error("failed to read settings {path}: {source}")]
    Read {
        /// Settings file involved.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// A value could not be parsed for its key.
    #[error("invalid value '{value}' for '{key}' on line {line}")]
    InvalidValue {
        /// Setting name.
        key: String,
        /// Raw value.
        value: String,
        /// 1-based line number.
        line: usize,
    },
    /// A command-line flag value was rejected.
    #[error("invalid value '{value}' for --{flag}")]
    InvalidFlag {
        /// Flag name without dashes.
        flag: &'static str,
        /// Raw value.
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    /// What: The missing error reads like the classic placeholder text.
    fn missing_message_matches_placeholder() {
        let err = ResolveError::from(MissingTranslation {
            locale: "en".into(),
            path: "errors.messages.blank".into(),
        });
        assert!(err.is_missing());
        assert_eq!(
            err.to_string(),
            "translation missing: en.errors.messages.blank"
        );
    }
}
