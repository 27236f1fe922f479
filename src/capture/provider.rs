//! The lookup capability every translation source implements.

use std::sync::Arc;

use crate::capture::options::Options;
use crate::capture::value::Value;
use crate::error::ResolveError;

/// Something that can resolve a translation key.
///
/// Implementors read `scope` and `locale` from `options` themselves. A key
/// that does not exist is reported as `ResolveError::Missing`; a provider
/// must never panic for it.
pub trait TranslationProvider: Send + Sync {
    /// What: Resolve `key` under the scope and locale carried by `options`.
    ///
    /// # Errors
    /// - `ResolveError::Missing` when nothing is stored at the resolved path
    /// - `ResolveError::InvalidScope` when the scope shape is unsupported
    fn resolve(&self, key: &str, options: &Options) -> Result<Value, ResolveError>;

    /// What: Locale used when `options` names none.
    fn default_locale(&self) -> String;
}

impl<P: TranslationProvider + ?Sized> TranslationProvider for Arc<P> {
    fn resolve(&self, key: &str, options: &Options) -> Result<Value, ResolveError> {
        (**self).resolve(key, options)
    }

    fn default_locale(&self) -> String {
        (**self).default_locale()
    }
}
