//! Decorator that records every lookup passing through a provider.

use std::sync::Arc;

use crate::capture::accumulator::Accumulator;
use crate::capture::options::Options;
use crate::capture::path::{child_path, resolve_path};
use crate::capture::provider::TranslationProvider;
use crate::capture::value::Value;
use crate::error::ResolveError;

/// Wraps a provider and logs each lookup into an [`Accumulator`].
///
/// The caller always receives exactly what the wrapped provider returned;
/// capturing is a side channel.
pub struct CaptureRecorder<P> {
    inner: P,
    accumulator: Arc<Accumulator>,
}

impl<P: TranslationProvider> CaptureRecorder<P> {
    /// What: Wrap `inner`, recording into `accumulator`.
    pub const fn new(inner: P, accumulator: Arc<Accumulator>) -> Self {
        Self { inner, accumulator }
    }

    /// What: Accumulator this recorder writes to.
    #[must_use]
    pub const fn accumulator(&self) -> &Arc<Accumulator> {
        &self.accumulator
    }

    /// What: Wrapped provider.
    #[must_use]
    pub const fn inner(&self) -> &P {
        &self.inner
    }

    /// What: Turn one lookup result into capture entries.
    ///
    /// Details:
    /// - Scalars (and sequences) land at `path`.
    /// - Trees land one entry per direct child at `path.child`; nothing at `path` itself.
    /// - Missing results and missing placeholders land at `path` with an empty value.
    fn capture(&self, locale: &str, path: &str, options: &Options, result: &Result<Value, ResolveError>) {
        let interpolations = options.interpolations();
        match result {
            Ok(Value::Tree(children)) => {
                for (sub_key, sub_value) in children {
                    let sub_path = child_path(path, sub_key);
                    tracing::trace!(locale, path = %sub_path, "captured tree leaf");
                    self.accumulator.record(
                        locale,
                        &sub_path,
                        sub_value.to_editable_text(),
                        interpolations.clone(),
                    );
                }
            }
            Ok(value) if value.is_missing_placeholder() => {
                tracing::debug!(locale, path, "captured missing translation placeholder");
                self.accumulator
                    .record(locale, path, String::new(), interpolations);
            }
            Ok(value) => {
                tracing::trace!(locale, path, "captured translation");
                self.accumulator
                    .record(locale, path, value.to_editable_text(), interpolations);
            }
            Err(ResolveError::Missing(_)) => {
                tracing::debug!(locale, path, "captured missing translation");
                self.accumulator
                    .record(locale, path, String::new(), interpolations);
            }
            Err(ResolveError::InvalidScope { .. }) => {}
        }
    }
}

impl<P: TranslationProvider> TranslationProvider for CaptureRecorder<P> {
    /// What: Resolve through the wrapped provider and record the outcome.
    ///
    /// # Errors
    /// - `ResolveError::InvalidScope` before delegating when the scope is malformed
    /// - Whatever the wrapped provider returns, unchanged
    ///
    /// Details:
    /// - `raise`, `throw` and `object` are removed before delegating.
    fn resolve(&self, key: &str, options: &Options) -> Result<Value, ResolveError> {
        let path = resolve_path(key, options)?;
        let options = options.without_stripped();
        let locale = options
            .locale()
            .map_or_else(|| self.inner.default_locale(), str::to_string);
        let result = self.inner.resolve(key, &options);
        self.capture(&locale, &path, &options, &result);
        result
    }

    fn default_locale(&self) -> String {
        self.inner.default_locale()
    }
}
