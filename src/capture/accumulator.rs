//! Shared store of everything looked up since the last reset.
//!
//! One accumulator serves the whole process. Concurrent requests write into
//! the same maps, so a snapshot shows whatever rendered since the last reset
//! with no isolation between requests. Each `record` replaces a whole entry
//! under the lock; readers never observe half of an entry.

use std::sync::{Mutex, MutexGuard, PoisonError};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::capture::options::Interpolations;

/// Captured value and interpolation context for one path in one locale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureEntry {
    /// Editable text of the value; empty for missing translations.
    pub value: String,
    /// Interpolation values supplied with the last lookup, for display only.
    #[serde(default)]
    pub options: Interpolations,
}

/// Path to entry, in first-capture order.
pub type LocaleCapture = IndexMap<String, CaptureEntry>;

/// Locale to its captured paths. This is also the snapshot wire shape.
pub type Snapshot = IndexMap<String, LocaleCapture>;

/// Mutex-guarded accumulation of capture entries.
#[derive(Debug, Default)]
pub struct Accumulator {
    inner: Mutex<Snapshot>,
}

impl Accumulator {
    /// What: Create an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries are whole-value replacements, so a poisoned lock still holds consistent data.
    fn lock(&self) -> MutexGuard<'_, Snapshot> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// What: Record the latest lookup of `path` in `locale`.
    ///
    /// Inputs:
    /// - `locale`: Locale the lookup ran against
    /// - `path`: Resolved dot path
    /// - `value`: Editable text of the result
    /// - `options`: Interpolation values of the lookup
    ///
    /// Details:
    /// - Repeated paths overwrite value and options but keep their original position.
    pub fn record(&self, locale: &str, path: &str, value: String, options: Interpolations) {
        self.lock()
            .entry(locale.to_string())
            .or_default()
            .insert(path.to_string(), CaptureEntry { value, options });
    }

    /// What: Deep copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.lock().clone()
    }

    /// What: Drop every entry so the next render starts a fresh pass.
    pub fn reset(&self) {
        let mut guard = self.lock();
        let dropped: usize = guard.values().map(IndexMap::len).sum();
        guard.clear();
        tracing::debug!(dropped, "translation capture reset");
    }

    /// What: Number of captured entries over all locales.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().values().map(IndexMap::len).sum()
    }

    /// What: Whether nothing has been captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
