//! Locale files on disk: `locales_dir/{locale}.yml`.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde_norway::{Mapping, Value as Yaml};

use crate::capture::{Options, TranslationProvider, Value};
use crate::error::{ResolveError, StoreError};
use crate::store::tree::WriteOutcome;
use crate::store::{MemoryStore, TranslationStore, validate_locale};

/// Translation store backed by a directory of YAML locale files.
///
/// Files are read once at [`YamlStore::open`]; edits live in memory until
/// [`TranslationStore::flush`] rewrites the touched locale files.
#[derive(Debug)]
pub struct YamlStore {
    locales_dir: PathBuf,
    memory: MemoryStore,
    dirty: Mutex<BTreeSet<String>>,
}

impl YamlStore {
    /// What: Load every `*.yml` file in `locales_dir`.
    ///
    /// Inputs:
    /// - `locales_dir`: Directory holding `{locale}.yml` files
    /// - `default_locale`: Locale used when a lookup names none
    ///
    /// Output:
    /// - Store with one locale per valid file; empty when the directory does not exist
    ///
    /// # Errors
    /// - `StoreError::Io` when the directory or a file cannot be read
    /// - `StoreError::Yaml` when a file is not valid YAML
    ///
    /// Details:
    /// - Files with an invalid locale name and empty files are skipped with a warning.
    /// - The tree is taken from the top-level key matching the file name; a file
    ///   with a single differently named top-level key is accepted with a warning.
    pub fn open(locales_dir: impl Into<PathBuf>, default_locale: &str) -> Result<Self, StoreError> {
        let locales_dir = locales_dir.into();
        let memory = MemoryStore::new(default_locale);
        if locales_dir.is_dir() {
            let entries = fs::read_dir(&locales_dir).map_err(|source| StoreError::Io {
                path: locales_dir.clone(),
                source,
            })?;
            let mut files: Vec<PathBuf> = entries
                .filter_map(Result::ok)
                .map(|e| e.path())
                .filter(|p| p.extension().is_some_and(|ext| ext == "yml"))
                .collect();
            files.sort();
            for file in files {
                if let Some((locale, tree)) = load_locale_file(&file)? {
                    tracing::debug!(
                        "Loaded locale '{}' with {} top-level keys",
                        locale,
                        tree.len()
                    );
                    memory.insert_locale(&locale, tree);
                }
            }
        } else {
            tracing::warn!(
                path = %locales_dir.display(),
                "locales directory not found; starting with an empty store"
            );
        }
        Ok(Self {
            locales_dir,
            memory,
            dirty: Mutex::new(BTreeSet::new()),
        })
    }

    /// What: Directory the store reads and writes.
    #[must_use]
    pub fn locales_dir(&self) -> &Path {
        &self.locales_dir
    }

    /// What: Path of the file holding `locale`.
    #[must_use]
    pub fn locale_file(&self, locale: &str) -> PathBuf {
        self.locales_dir.join(format!("{locale}.yml"))
    }

    /// Rewrite one locale file through a temporary sibling.
    fn save_locale(&self, locale: &str) -> Result<(), StoreError> {
        let tree = self.memory.locale_tree(locale).unwrap_or_default();
        let mut doc = Mapping::new();
        doc.insert(Yaml::String(locale.to_string()), Yaml::Mapping(tree));
        let path = self.locale_file(locale);
        let text = serde_norway::to_string(&doc).map_err(|source| StoreError::Yaml {
            path: path.clone(),
            source,
        })?;
        fs::create_dir_all(&self.locales_dir).map_err(|source| io_error(&self.locales_dir, source))?;
        let tmp = path.with_extension("yml.tmp");
        fs::write(&tmp, text).map_err(|source| io_error(&tmp, source))?;
        fs::rename(&tmp, &path).map_err(|source| io_error(&path, source))?;
        tracing::info!(locale, path = %path.display(), "locale file written");
        Ok(())
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// What: Load one locale file.
///
/// Output:
/// - `Ok(None)` for files that are skipped (bad name, empty)
///
/// # Errors
/// - `StoreError::Io` / `StoreError::Yaml` for unreadable or unparsable files
fn load_locale_file(file: &Path) -> Result<Option<(String, Mapping)>, StoreError> {
    let Some(locale) = file.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
        return Ok(None);
    };
    if validate_locale(&locale).is_err() {
        tracing::warn!(path = %file.display(), "skipping locale file with invalid locale name");
        return Ok(None);
    }
    let contents = fs::read_to_string(file).map_err(|source| StoreError::Io {
        path: file.to_path_buf(),
        source,
    })?;
    if contents.trim().is_empty() {
        tracing::warn!(path = %file.display(), "skipping empty locale file");
        return Ok(None);
    }
    let doc: Mapping = serde_norway::from_str(&contents).map_err(|source| StoreError::Yaml {
        path: file.to_path_buf(),
        source,
    })?;
    if let Some(Yaml::Mapping(tree)) = doc.get(locale.as_str()) {
        return Ok(Some((locale, tree.clone())));
    }
    match doc.into_iter().next() {
        Some((key, Yaml::Mapping(tree))) if key.is_string() => {
            tracing::warn!(
                path = %file.display(),
                found = ?key.as_str(),
                "top-level key does not match file name; using it for '{}'",
                locale
            );
            Ok(Some((locale, tree)))
        }
        _ => {
            tracing::warn!(path = %file.display(), "locale file has no translation tree");
            Ok(None)
        }
    }
}

impl TranslationProvider for YamlStore {
    fn resolve(&self, key: &str, options: &Options) -> Result<Value, ResolveError> {
        self.memory.resolve(key, options)
    }

    fn default_locale(&self) -> String {
        self.memory.default_locale()
    }
}

impl TranslationStore for YamlStore {
    fn get(&self, locale: &str, path: &str) -> Option<Value> {
        self.memory.get(locale, path)
    }

    fn write(&self, locale: &str, path: &str, text: &str) -> Result<bool, StoreError> {
        let changed = self.memory.write_text(locale, path, text)? == WriteOutcome::Changed;
        if changed {
            self.dirty
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(locale.to_string());
        }
        Ok(changed)
    }

    fn check_write(&self, locale: &str, path: &str) -> Result<(), StoreError> {
        self.memory.check_write(locale, path)
    }

    fn locales(&self) -> Vec<String> {
        self.memory.locales()
    }

    fn flush(&self) -> Result<(), StoreError> {
        let pending: Vec<String> = std::mem::take(
            &mut *self.dirty.lock().unwrap_or_else(PoisonError::into_inner),
        )
        .into_iter()
        .collect();
        for (idx, locale) in pending.iter().enumerate() {
            if let Err(e) = self.save_locale(locale) {
                self.dirty
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .extend(pending[idx..].iter().cloned());
                return Err(e);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str, contents: &str) {
        fs::write(dir.join(name), contents).expect("Failed to write test locale file");
    }

    #[test]
    /// What: Valid files load; empty and badly named files are skipped.
    fn open_loads_valid_files() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory for test");
        let dir = temp_dir.path();
        write_file(dir, "en.yml", "en:\n  greeting: Hello\n");
        write_file(dir, "de-DE.yml", "de-DE:\n  greeting: Hallo\n");
        write_file(dir, "empty.yml", "");
        write_file(dir, "bad name.yml", "x:\n  y: z\n");
        write_file(dir, "notes.txt", "ignored");

        let store = YamlStore::open(dir, "en").expect("store opens");
        assert_eq!(store.locales(), vec!["de-DE".to_string(), "en".to_string()]);
        assert_eq!(store.get("de-DE", "greeting"), Some(Value::scalar("Hallo")));
    }

    #[test]
    /// What: Invalid YAML is an error, a missing directory is an empty store.
    fn open_errors_and_missing_dir() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory for test");
        write_file(temp_dir.path(), "en.yml", "invalid: yaml: content: [");
        assert!(matches!(
            YamlStore::open(temp_dir.path(), "en"),
            Err(StoreError::Yaml { .. })
        ));

        let store = YamlStore::open(temp_dir.path().join("absent"), "en").expect("empty store");
        assert!(store.locales().is_empty());
    }

    #[test]
    /// What: Flush rewrites only touched locales and the result reloads identically.
    fn flush_persists_edits() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory for test");
        let dir = temp_dir.path();
        write_file(dir, "en.yml", "en:\n  greeting: Hello\n  farewell: Bye %{name}\n");
        write_file(dir, "de.yml", "de:\n  greeting: Hallo\n");
        let de_before = fs::read_to_string(dir.join("de.yml")).expect("read de");

        let store = YamlStore::open(dir, "en").expect("store opens");
        assert!(store.write("en", "greeting", "Hi").expect("write"));
        assert!(store.write("en", "home.title", "Welcome").expect("write"));
        store.flush().expect("flush");

        assert_eq!(
            fs::read_to_string(dir.join("de.yml")).expect("read de"),
            de_before
        );
        let reloaded = YamlStore::open(dir, "en").expect("reopen");
        assert_eq!(reloaded.get("en", "greeting"), Some(Value::scalar("Hi")));
        assert_eq!(reloaded.get("en", "home.title"), Some(Value::scalar("Welcome")));
        assert_eq!(
            reloaded.get("en", "farewell"),
            Some(Value::scalar("Bye %{name}"))
        );
        assert!(!dir.join("en.yml.tmp").exists());
    }

    #[test]
    /// What: A rejected submission writes nothing, so a later save cannot persist part of it.
    fn rejected_submission_is_not_flushed_later() {
        use crate::store::apply_submission;
        use crate::submission::EditSubmission;

        let temp_dir = TempDir::new().expect("Failed to create temp directory for test");
        let dir = temp_dir.path();
        write_file(dir, "en.yml", "en:\n  greeting: Hello\n  home: Home\n");
        let store = YamlStore::open(dir, "en").expect("store opens");

        let mut rejected = EditSubmission::new();
        rejected.insert("en", "greeting", "Hi");
        rejected.insert("en", "home.title", "x");
        assert!(matches!(
            apply_submission(&store, &rejected),
            Err(StoreError::PathConflict { .. })
        ));

        let mut later = EditSubmission::new();
        later.insert("en", "other", "b");
        assert_eq!(apply_submission(&store, &later).expect("applies"), 1);

        let reloaded = YamlStore::open(dir, "en").expect("reopen");
        assert_eq!(reloaded.get("en", "greeting"), Some(Value::scalar("Hello")));
        assert_eq!(reloaded.get("en", "other"), Some(Value::scalar("b")));
    }

    #[test]
    /// What: A single mismatched top-level key is still used for the file's locale.
    fn mismatched_top_level_key() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory for test");
        write_file(temp_dir.path(), "fr.yml", "fr-FR:\n  greeting: Bonjour\n");
        let store = YamlStore::open(temp_dir.path(), "en").expect("store opens");
        assert_eq!(store.get("fr", "greeting"), Some(Value::scalar("Bonjour")));
    }
}
