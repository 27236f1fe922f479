//! Edit submissions and their `translations[locale][path]` form encoding.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::SubmissionError;

/// Form field prefix shared by the editor and the write endpoint.
const FIELD_PREFIX: &str = "translations";

/// Edited values keyed by locale, then path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EditSubmission {
    locales: IndexMap<String, IndexMap<String, String>>,
}

/// JSON body accepted by the write endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionBody {
    /// The edited values.
    #[serde(default)]
    pub translations: EditSubmission,
}

impl EditSubmission {
    /// What: Empty submission.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// What: Set the value for `path` in `locale`.
    pub fn insert(&mut self, locale: &str, path: &str, value: impl Into<String>) {
        self.locales
            .entry(locale.to_string())
            .or_default()
            .insert(path.to_string(), value.into());
    }

    /// What: Submitted value for `path` in `locale`.
    #[must_use]
    pub fn get(&self, locale: &str, path: &str) -> Option<&str> {
        self.locales
            .get(locale)
            .and_then(|fields| fields.get(path))
            .map(String::as_str)
    }

    /// What: Iterate locales with their fields, in submission order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &IndexMap<String, String>)> {
        self.locales.iter()
    }

    /// What: Total number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.locales.values().map(IndexMap::len).sum()
    }

    /// What: Whether the submission carries no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// What: Encode as ordered form pairs ready for urlencoding.
    #[must_use]
    pub fn to_form_pairs(&self) -> Vec<(String, String)> {
        self.locales
            .iter()
            .flat_map(|(locale, fields)| {
                fields
                    .iter()
                    .map(move |(path, value)| (field_name(locale, path), value.clone()))
            })
            .collect()
    }

    /// What: Decode form pairs into a submission.
    ///
    /// Inputs:
    /// - `pairs`: Decoded `(name, value)` pairs of the form body
    ///
    /// # Errors
    /// - `SubmissionError::MalformedField` for a `translations[...]` field that is
    ///   not exactly `translations[locale][path]`
    ///
    /// Details:
    /// - Fields outside the `translations[` prefix (tokens, buttons) are ignored.
    /// - A repeated field keeps its last value.
    pub fn from_form_pairs<I>(pairs: I) -> Result<Self, SubmissionError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut submission = Self::new();
        for (name, value) in pairs {
            if let Some((locale, path)) = parse_field_name(&name)? {
                submission.insert(locale, path, value);
            }
        }
        Ok(submission)
    }
}

/// What: Form field name for one edited path.
#[must_use]
pub fn field_name(locale: &str, path: &str) -> String {
    format!("{FIELD_PREFIX}[{locale}][{path}]")
}

/// What: Split a form field name into locale and path.
///
/// Output:
/// - `Ok(None)` for fields that are not translations
///
/// # Errors
/// - `SubmissionError::MalformedField` when the brackets do not form `[locale][path]`
pub fn parse_field_name(name: &str) -> Result<Option<(&str, &str)>, SubmissionError> {
    let Some(rest) = name
        .strip_prefix(FIELD_PREFIX)
        .and_then(|r| r.strip_prefix('['))
    else {
        return Ok(None);
    };
    let malformed = || SubmissionError::MalformedField(name.to_string());
    let (locale, rest) = rest.split_once(']').ok_or_else(malformed)?;
    let path = rest
        .strip_prefix('[')
        .and_then(|r| r.strip_suffix(']'))
        .ok_or_else(malformed)?;
    if locale.is_empty() || locale.contains('[') || path.is_empty() || path.contains(']') {
        return Err(malformed());
    }
    Ok(Some((locale, path)))
}
