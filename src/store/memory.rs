//! In-memory translation store.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use indexmap::IndexMap;
use serde_norway::{Mapping, Value as Yaml};

use crate::capture::{Options, TranslationProvider, Value, resolve_path};
use crate::error::{MissingTranslation, ResolveError, StoreError};
use crate::store::tree::{self, WriteOutcome};
use crate::store::{TranslationStore, validate_locale, validate_path};

/// Locale trees held in memory.
///
/// Serves lookups as a [`TranslationProvider`] and edits as a
/// [`TranslationStore`]. `flush` is a no-op.
#[derive(Debug)]
pub struct MemoryStore {
    default_locale: String,
    locales: RwLock<IndexMap<String, Mapping>>,
}

impl MemoryStore {
    /// What: Empty store whose lookups default to `default_locale`.
    #[must_use]
    pub fn new(default_locale: impl Into<String>) -> Self {
        Self {
            default_locale: default_locale.into(),
            locales: RwLock::new(IndexMap::new()),
        }
    }

    /// What: Build a store from a YAML document with one top-level key per locale.
    ///
    /// # Errors
    /// - `StoreError::Yaml` when the document does not parse
    ///
    /// Details:
    /// - Top-level entries whose value is not a mapping are ignored.
    pub fn from_yaml_str(default_locale: &str, yaml: &str) -> Result<Self, StoreError> {
        let doc: Mapping = serde_norway::from_str(yaml).map_err(|source| StoreError::Yaml {
            path: "<inline>".into(),
            source,
        })?;
        let store = Self::new(default_locale);
        for (key, value) in doc {
            if let (Some(locale), Yaml::Mapping(tree)) = (key.as_str(), value) {
                store.insert_locale(locale, tree);
            }
        }
        Ok(store)
    }

    fn read(&self) -> RwLockReadGuard<'_, IndexMap<String, Mapping>> {
        self.locales.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_guard(&self) -> RwLockWriteGuard<'_, IndexMap<String, Mapping>> {
        self.locales.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// What: Replace the whole tree of one locale.
    pub fn insert_locale(&self, locale: &str, tree: Mapping) {
        self.write_guard().insert(locale.to_string(), tree);
    }

    /// What: Copy of one locale's tree.
    #[must_use]
    pub fn locale_tree(&self, locale: &str) -> Option<Mapping> {
        self.read().get(locale).cloned()
    }

    /// What: Write text at `path`, reporting whether anything changed.
    ///
    /// # Errors
    /// - `StoreError::InvalidLocale` / `StoreError::InvalidPath` for malformed input
    /// - `StoreError::PathConflict` when a plain string blocks the path
    pub fn write_text(&self, locale: &str, path: &str, text: &str) -> Result<WriteOutcome, StoreError> {
        validate_locale(locale)?;
        validate_path(path)?;
        let mut guard = self.write_guard();
        let root = guard.entry(locale.to_string()).or_default();
        tree::write(root, path, text).map_err(|blocking| StoreError::PathConflict {
            locale: locale.to_string(),
            path: path.to_string(),
            blocking,
        })
    }
}

impl TranslationProvider for MemoryStore {
    fn resolve(&self, key: &str, options: &Options) -> Result<Value, ResolveError> {
        let path = resolve_path(key, options)?;
        let locale = options
            .locale()
            .map_or_else(|| self.default_locale.clone(), str::to_string);
        let found = self
            .read()
            .get(&locale)
            .and_then(|root| tree::lookup(root, &path))
            .and_then(Value::from_yaml);
        found.ok_or_else(|| MissingTranslation { locale, path }.into())
    }

    fn default_locale(&self) -> String {
        self.default_locale.clone()
    }
}

impl TranslationStore for MemoryStore {
    fn get(&self, locale: &str, path: &str) -> Option<Value> {
        self.read()
            .get(locale)
            .and_then(|root| tree::lookup(root, path))
            .and_then(Value::from_yaml)
    }

    fn write(&self, locale: &str, path: &str, text: &str) -> Result<bool, StoreError> {
        Ok(self.write_text(locale, path, text)? == WriteOutcome::Changed)
    }

    fn check_write(&self, locale: &str, path: &str) -> Result<(), StoreError> {
        validate_locale(locale)?;
        validate_path(path)?;
        let blocking = self
            .read()
            .get(locale)
            .and_then(|root| tree::blocking_prefix(root, path));
        match blocking {
            Some(blocking) => Err(StoreError::PathConflict {
                locale: locale.to_string(),
                path: path.to_string(),
                blocking,
            }),
            None => Ok(()),
        }
    }

    fn locales(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }

    fn flush(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> MemoryStore {
        MemoryStore::from_yaml_str(
            "en",
            r#"
en:
  greeting: "Hello"
  date:
    formats:
      short: "%b %d"
      long: "%B %d, %Y"
    day_names:
      - Sunday
      - Monday
de:
  greeting: "Hallo"
"#,
        )
        .expect("valid yaml")
    }

    #[test]
    /// What: Resolution returns scalars, trees and sequences by node kind.
    fn resolve_by_node_kind() {
        let s = store();
        assert_eq!(
            s.resolve("greeting", &Options::new()),
            Ok(Value::scalar("Hello"))
        );
        assert_eq!(
            s.resolve("greeting", &Options::new().with("locale", "de")),
            Ok(Value::scalar("Hallo"))
        );
        let Ok(Value::Tree(formats)) = s.resolve("formats", &Options::new().with("scope", "date"))
        else {
            panic!("expected tree");
        };
        assert_eq!(formats.len(), 2);
        assert_eq!(
            s.resolve("date.day_names", &Options::new()),
            Ok(Value::Sequence(vec!["Sunday".into(), "Monday".into()]))
        );
    }

    #[test]
    /// What: Unknown locales and paths are reported as missing.
    fn unknown_is_missing() {
        let s = store();
        let err = s
            .resolve("greeting", &Options::new().with("locale", "fr"))
            .expect_err("no fr");
        assert!(err.is_missing());
        assert!(s.resolve("nope", &Options::new()).expect_err("no key").is_missing());
    }

    #[test]
    /// What: Writes validate input and become visible to lookups.
    fn write_then_resolve() {
        let s = store();
        assert!(s.write("en", "greeting", "Hi").expect("write ok"));
        assert!(!s.write("en", "greeting", "Hi").expect("write ok"));
        assert_eq!(s.get("en", "greeting"), Some(Value::scalar("Hi")));
        assert!(matches!(
            s.write("en us", "greeting", "x"),
            Err(StoreError::InvalidLocale(_))
        ));
        assert!(matches!(
            s.write("en", "a..b", "x"),
            Err(StoreError::InvalidPath(_))
        ));
        assert!(matches!(
            s.write("en", "greeting.deeper", "x"),
            Err(StoreError::PathConflict { .. })
        ));
    }
}
