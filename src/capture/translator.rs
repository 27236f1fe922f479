//! Rendering-side entry point: capture, then interpolate.

use std::sync::Arc;

use crate::capture::accumulator::Accumulator;
use crate::capture::interpolate::interpolate;
use crate::capture::options::Options;
use crate::capture::path::resolve_path;
use crate::capture::provider::TranslationProvider;
use crate::capture::recorder::CaptureRecorder;
use crate::capture::value::Value;
use crate::error::ResolveError;

/// Translation helper handed to page renderers.
///
/// Every call goes through a [`CaptureRecorder`], so the accumulator sees the
/// raw template (`"Bye %{name}"`) while the page gets the interpolated text.
pub struct Translator<P> {
    recorder: CaptureRecorder<P>,
}

impl<P: TranslationProvider> Translator<P> {
    /// What: Build a translator over `provider`, capturing into `accumulator`.
    pub const fn new(provider: P, accumulator: Arc<Accumulator>) -> Self {
        Self {
            recorder: CaptureRecorder::new(provider, accumulator),
        }
    }

    /// What: Translate `key` to display text.
    ///
    /// Inputs:
    /// - `key`: Lookup key
    /// - `options`: Scope, locale and interpolation values
    ///
    /// Output:
    /// - Interpolated text; sequences are joined with `", "`
    /// - The resolved path when the translation is missing or is a sub-tree
    ///
    /// # Errors
    /// - `ResolveError::InvalidScope` when the scope is malformed
    pub fn t(&self, key: &str, options: &Options) -> Result<String, ResolveError> {
        match self.recorder.resolve(key, options) {
            Ok(Value::Scalar(template)) => Ok(interpolate(&template, &options.interpolations())),
            Ok(Value::Sequence(items)) => Ok(items.join(", ")),
            Ok(Value::Tree(_)) => resolve_path(key, options),
            Err(ResolveError::Missing(missing)) => {
                tracing::debug!(
                    "Missing translation key: '{}' ({}). Returning key as-is.",
                    missing.path,
                    missing.locale
                );
                Ok(missing.path)
            }
            Err(err) => Err(err),
        }
    }

    /// What: Resolve `key` to its raw value, still capturing the lookup.
    ///
    /// # Errors
    /// - Whatever the provider reports, including `ResolveError::Missing`
    pub fn lookup(&self, key: &str, options: &Options) -> Result<Value, ResolveError> {
        self.recorder.resolve(key, options)
    }

    /// What: Locale used when a lookup names none.
    #[must_use]
    pub fn default_locale(&self) -> String {
        self.recorder.default_locale()
    }

    /// What: Accumulator receiving the captures.
    #[must_use]
    pub const fn accumulator(&self) -> &Arc<Accumulator> {
        self.recorder.accumulator()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    /// What: Pages receive interpolated text while the capture keeps the template.
    fn renders_interpolated_captures_template() {
        let store = MemoryStore::from_yaml_str("en", "en:\n  farewell: \"Bye %{name}\"\n")
            .expect("valid yaml");
        let accumulator = Arc::new(Accumulator::new());
        let translator = Translator::new(store, Arc::clone(&accumulator));

        let out = translator
            .t("farewell", &Options::new().with("name", "Alice"))
            .expect("renders");
        assert_eq!(out, "Bye Alice");

        let snap = accumulator.snapshot();
        assert_eq!(snap["en"]["farewell"].value, "Bye %{name}");
        assert_eq!(
            snap["en"]["farewell"].options.get("name").map(String::as_str),
            Some("Alice")
        );
    }

    #[test]
    /// What: Missing keys render as their path instead of failing the page.
    fn missing_renders_path() {
        let store = MemoryStore::new("en");
        let translator = Translator::new(store, Arc::new(Accumulator::new()));
        let out = translator
            .t("title", &Options::new().with("scope", "home"))
            .expect("missing is not an error");
        assert_eq!(out, "home.title");
    }
}
