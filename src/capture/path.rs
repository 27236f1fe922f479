//! Building the dot path of a lookup from its scope and key.

use crate::capture::options::{OptionValue, Options};
use crate::error::ResolveError;

/// What: Extract the scope segments of a lookup.
///
/// Inputs:
/// - `key`: Lookup key, used only for the error message
/// - `options`: Options bag that may carry `scope`
///
/// Output:
/// - Ordered segments; empty when no scope is given
///
/// # Errors
/// - `ResolveError::InvalidScope` when `scope` is neither absent, `Null`, text,
///   nor a list of text
///
/// Details:
/// - Blank segments are kept here and dropped by [`resolve_path`].
pub fn scope_segments(key: &str, options: &Options) -> Result<Vec<String>, ResolveError> {
    let invalid = |found: &str| ResolveError::InvalidScope {
        key: key.to_string(),
        found: found.to_string(),
    };
    match options.get("scope") {
        None | Some(OptionValue::Null) => Ok(Vec::new()),
        Some(OptionValue::Text(segment)) => Ok(vec![segment.clone()]),
        Some(OptionValue::List(items)) => items
            .iter()
            .map(|item| match item {
                OptionValue::Text(s) => Ok(s.clone()),
                OptionValue::Null => Ok(String::new()),
                other => Err(invalid(&describe(other))),
            })
            .collect(),
        Some(other) => Err(invalid(&describe(other))),
    }
}

/// What: Resolve the full dot path of a lookup.
///
/// Inputs:
/// - `key`: Lookup key (may itself contain dots)
/// - `options`: Options bag that may carry `scope`
///
/// Output:
/// - Non-blank scope segments followed by the key, joined with `.`
///
/// # Errors
/// - `ResolveError::InvalidScope` for unsupported scope shapes (see [`scope_segments`])
///
/// Details:
/// - Computed before any lookup happens so missing keys still get a path.
pub fn resolve_path(key: &str, options: &Options) -> Result<String, ResolveError> {
    let mut segments = scope_segments(key, options)?;
    segments.push(key.to_string());
    Ok(segments
        .iter()
        .filter(|s| !s.trim().is_empty())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("."))
}

/// What: Join a parent path and a sub-key.
#[must_use]
pub fn child_path(parent: &str, sub_key: &str) -> String {
    if parent.is_empty() {
        sub_key.to_string()
    } else {
        format!("{parent}.{sub_key}")
    }
}

/// Short name of an option value's shape for error messages.
fn describe(value: &OptionValue) -> String {
    match value {
        OptionValue::Null => "null".into(),
        OptionValue::Bool(b) => format!("boolean {b}"),
        OptionValue::Integer(n) => format!("integer {n}"),
        OptionValue::Text(_) => "text".into(),
        OptionValue::List(_) => "nested list".into(),
        OptionValue::Object(o) => format!("object {}", o.label()),
    }
}
