//! Operations on one locale's nested YAML tree.

use serde_norway::{Mapping, Value as Yaml};

use crate::capture::Value;

/// What: Split a dot path into segments.
///
/// Output:
/// - `None` when the path is empty or has an empty segment (`a..b`, `.a`).
#[must_use]
pub fn segments(path: &str) -> Option<Vec<&str>> {
    let parts: Vec<&str> = path.split('.').collect();
    if parts.iter().any(|p| p.trim().is_empty()) {
        return None;
    }
    Some(parts)
}

/// What: Find the node stored at `path`.
#[must_use]
pub fn lookup<'a>(root: &'a Mapping, path: &str) -> Option<&'a Yaml> {
    let parts = segments(path)?;
    let (last, parents) = parts.split_last()?;
    let mut node = root;
    for seg in parents {
        node = node.get(*seg)?.as_mapping()?;
    }
    node.get(*last)
}

/// What: Find the plain value that would block a write at `path`.
///
/// Output:
/// - Dot prefix of the first non-mapping, non-null node above the leaf
///
/// Details:
/// - Mirrors the walk of [`write`] without modifying the tree.
#[must_use]
pub fn blocking_prefix(root: &Mapping, path: &str) -> Option<String> {
    let parts = segments(path)?;
    let (_, parents) = parts.split_last()?;
    let mut node = root;
    for (depth, seg) in parents.iter().enumerate() {
        match node.get(*seg) {
            None | Some(Yaml::Null) => return None,
            Some(Yaml::Mapping(child)) => node = child,
            Some(_) => return Some(parts[..=depth].join(".")),
        }
    }
    None
}

/// Outcome of writing one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The stored node changed.
    Changed,
    /// The text matched what was stored, or was blank for an absent path.
    Unchanged,
}

/// What: Write editor text at `path`, creating intermediate mappings.
///
/// Inputs:
/// - `root`: Locale tree to modify
/// - `path`: Dot path (already validated with [`segments`])
/// - `text`: Submitted text
///
/// Output:
/// - `Ok(WriteOutcome)`; `Err(prefix)` naming the plain string that blocks the path
///
/// Details:
/// - Text equal to the stored node's editable form is a no-op, which keeps
///   re-submitting an unchanged snapshot free of side effects.
/// - Blank text for an absent path is skipped so missing keys stay missing;
///   null and tagged leaves resolve as missing and count as absent.
/// - Over a sequence or mapping, text that parses as the same kind of YAML
///   restores the structure; anything else is stored as a plain string.
pub fn write(root: &mut Mapping, path: &str, text: &str) -> Result<WriteOutcome, String> {
    let Some(parts) = segments(path) else {
        return Err(path.to_string());
    };
    let Some((last, parents)) = parts.split_last() else {
        return Err(path.to_string());
    };

    if let Some(existing) = lookup(root, path)
        && Value::from_yaml(existing).map(|v| v.to_editable_text()).as_deref() == Some(text)
    {
        return Ok(WriteOutcome::Unchanged);
    }
    if text.is_empty() && lookup(root, path).and_then(Value::from_yaml).is_none() {
        return Ok(WriteOutcome::Unchanged);
    }

    let mut node = root;
    for (depth, seg) in parents.iter().enumerate() {
        let slot = node
            .entry(Yaml::String((*seg).to_string()))
            .or_insert_with(|| Yaml::Mapping(Mapping::new()));
        if slot.is_null() {
            *slot = Yaml::Mapping(Mapping::new());
        }
        match slot {
            Yaml::Mapping(child) => node = child,
            _ => return Err(parts[..=depth].join(".")),
        }
    }

    let key = Yaml::String((*last).to_string());
    let replacement = match node.get(&key) {
        Some(Yaml::Sequence(_)) => parse_as(text, Yaml::is_sequence),
        Some(Yaml::Mapping(_)) => parse_as(text, Yaml::is_mapping),
        _ => Yaml::String(text.to_string()),
    };
    node.insert(key, replacement);
    Ok(WriteOutcome::Changed)
}

/// Parse `text` as YAML and keep it only when `kind` accepts the result.
fn parse_as(text: &str, kind: fn(&Yaml) -> bool) -> Yaml {
    match serde_norway::from_str::<Yaml>(text) {
        Ok(parsed) if kind(&parsed) => parsed,
        _ => Yaml::String(text.to_string()),
    }
}
