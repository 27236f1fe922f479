//! Translation stores: where edited strings are persisted.
//!
//! # Overview
//!
//! - [`MemoryStore`] keeps locale trees in memory.
//! - [`YamlStore`] loads `locales/{locale}.yml` files and writes them back on flush.
//!
//! Both resolve lookups ([`crate::capture::TranslationProvider`]) and accept
//! edits ([`TranslationStore`]). Locale files nest keys under a single
//! top-level locale key:
//!
//! ```yaml
//! en:
//!   errors:
//!     messages:
//!       blank: "can't be blank"
//! ```
//!
//! which is addressed as `errors.messages.blank`.

mod memory;
pub mod tree;
mod yaml;

pub use memory::MemoryStore;
pub use yaml::YamlStore;

use crate::capture::Value;
use crate::error::StoreError;
use crate::submission::EditSubmission;

/// Get/set-by-path access to persisted translations.
pub trait TranslationStore: Send + Sync {
    /// What: Current value at `path` in `locale`.
    fn get(&self, locale: &str, path: &str) -> Option<Value>;

    /// What: Store editor text at `path` in `locale`.
    ///
    /// Output:
    /// - `Ok(true)` when the stored value changed
    ///
    /// # Errors
    /// - Invalid locale or path, or a plain string blocking the path
    fn write(&self, locale: &str, path: &str, text: &str) -> Result<bool, StoreError>;

    /// What: Check that `write` would accept `path` in `locale`, without writing.
    ///
    /// # Errors
    /// - The error `write` would return for this path
    fn check_write(&self, locale: &str, path: &str) -> Result<(), StoreError>;

    /// What: Locales currently held.
    fn locales(&self) -> Vec<String>;

    /// What: Persist pending changes.
    ///
    /// # Errors
    /// - Backend-specific persistence failures
    fn flush(&self) -> Result<(), StoreError>;
}

/// What: Validate locale code format.
///
/// Inputs:
/// - `locale`: Locale code to validate
///
/// # Errors
/// - `StoreError::InvalidLocale` unless the code is alphanumerics joined by single hyphens
///
/// Details:
/// - Allows `en`, `en-US`, `zh-Hans-CN`; rejects spaces, brackets and other punctuation.
pub fn validate_locale(locale: &str) -> Result<(), StoreError> {
    let ok = !locale.is_empty()
        && locale.len() <= 20
        && locale.chars().all(|c| c.is_alphanumeric() || c == '-')
        && !locale.starts_with('-')
        && !locale.ends_with('-')
        && !locale.contains("--");
    if ok {
        Ok(())
    } else {
        Err(StoreError::InvalidLocale(locale.to_string()))
    }
}

/// What: Validate a dot path.
///
/// # Errors
/// - `StoreError::InvalidPath` for empty paths or empty segments
pub fn validate_path(path: &str) -> Result<(), StoreError> {
    tree::segments(path)
        .map(|_| ())
        .ok_or_else(|| StoreError::InvalidPath(path.to_string()))
}

/// What: Write every field of a submission, then flush.
///
/// Inputs:
/// - `store`: Target store
/// - `submission`: Locale -> path -> text
///
/// Output:
/// - Number of paths whose stored value changed
///
/// # Errors
/// - The first rejected field; nothing is written in that case
///
/// Details:
/// - Every field is checked (format and path conflicts) before the first write.
/// - Fields equal to what is stored are skipped, so resubmitting is idempotent.
pub fn apply_submission(
    store: &dyn TranslationStore,
    submission: &EditSubmission,
) -> Result<usize, StoreError> {
    for (locale, fields) in submission.iter() {
        for path in fields.keys() {
            store.check_write(locale, path)?;
        }
    }
    let mut changed = 0;
    for (locale, fields) in submission.iter() {
        for (path, text) in fields {
            if store.write(locale, path, text)? {
                tracing::info!(locale, path, "translation updated");
                changed += 1;
            }
        }
    }
    store.flush()?;
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    /// What: Locale codes follow the language[-script][-region] shape.
    fn locale_format() {
        for ok in ["en", "en-US", "de-DE", "zh-Hans-CN"] {
            assert!(validate_locale(ok).is_ok(), "{ok}");
        }
        for bad in ["", "-en-US", "en-US-", "en--US", "en US", "en]"] {
            assert!(validate_locale(bad).is_err(), "{bad}");
        }
    }

    #[test]
    /// What: A bad path anywhere rejects the whole submission before writing.
    fn validation_precedes_writes() {
        let store = MemoryStore::new("en");
        let mut submission = EditSubmission::new();
        submission.insert("en", "greeting", "Hi");
        submission.insert("en", "bad..path", "x");
        assert!(apply_submission(&store, &submission).is_err());
        assert_eq!(store.get("en", "greeting"), None);
    }

    #[test]
    /// What: A plain string blocking a later field rejects the whole submission.
    fn path_conflict_leaves_store_unchanged() {
        let store =
            MemoryStore::from_yaml_str("en", "en:\n  greeting: Hello\n  home: Home\n").expect("yaml");
        let mut submission = EditSubmission::new();
        submission.insert("en", "greeting", "Hi");
        submission.insert("en", "home.title", "x");
        let err = apply_submission(&store, &submission).expect_err("conflict");
        assert!(matches!(err, StoreError::PathConflict { ref blocking, .. } if blocking == "home"));
        assert_eq!(store.get("en", "greeting"), Some(Value::scalar("Hello")));
        assert_eq!(store.get("en", "home"), Some(Value::scalar("Home")));
    }

    #[test]
    /// What: Resubmitting a captured snapshot unchanged keeps null leaves missing.
    fn unchanged_resubmit_keeps_null_leaf_missing() {
        use crate::capture::{Accumulator, CaptureRecorder, Options, TranslationProvider};
        use std::sync::Arc;

        let store = Arc::new(
            MemoryStore::from_yaml_str("en", "en:\n  empty: ~\n  greeting: Hello\n").expect("yaml"),
        );
        let recorder = CaptureRecorder::new(Arc::clone(&store), Arc::new(Accumulator::new()));
        assert!(recorder.resolve("empty", &Options::new()).is_err());
        recorder.resolve("greeting", &Options::new()).expect("found");

        let mut submission = EditSubmission::new();
        for (locale, entries) in recorder.accumulator().snapshot() {
            for (path, entry) in entries {
                submission.insert(&locale, &path, entry.value);
            }
        }
        assert_eq!(submission.get("en", "empty"), Some(""));
        assert_eq!(apply_submission(store.as_ref(), &submission).expect("applies"), 0);
        let err = store.resolve("empty", &Options::new()).expect_err("still missing");
        assert!(err.is_missing());
    }

    #[test]
    /// What: Only changed fields are counted.
    fn counts_changed_fields() {
        let store = MemoryStore::from_yaml_str("en", "en:\n  a: one\n  b: two\n").expect("yaml");
        let mut submission = EditSubmission::new();
        submission.insert("en", "a", "one");
        submission.insert("en", "b", "zwei");
        assert_eq!(apply_submission(&store, &submission).expect("applies"), 1);
        assert_eq!(store.get("en", "b"), Some(Value::scalar("zwei")));
    }
}
