//! One editable table per locale, built from a snapshot.

use crate::capture::{Interpolations, Snapshot};

/// One captured path shown as key / editable value / options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    /// Dot path, read-only.
    pub path: String,
    /// Value as captured, used to tell edited rows apart.
    pub original: String,
    /// Current content of the input.
    pub input: String,
    /// Read-only rendering of the interpolation values.
    pub options_text: String,
}

impl TableRow {
    /// What: Whether the input differs from the captured value.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.input != self.original
    }
}

/// Rows captured for one locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleTable {
    /// Locale heading.
    pub locale: String,
    /// Rows in capture order.
    pub rows: Vec<TableRow>,
}

/// What: Build the tables for a snapshot.
///
/// Output:
/// - One table per locale, rows in the snapshot's path order
#[must_use]
pub fn build_tables(snapshot: &Snapshot) -> Vec<LocaleTable> {
    snapshot
        .iter()
        .map(|(locale, entries)| LocaleTable {
            locale: locale.clone(),
            rows: entries
                .iter()
                .map(|(path, entry)| TableRow {
                    path: path.clone(),
                    original: entry.value.clone(),
                    input: entry.value.clone(),
                    options_text: options_text(&entry.options),
                })
                .collect(),
        })
        .collect()
}

/// What: Render interpolation values as `%{name} = value`, comma separated.
#[must_use]
pub fn options_text(options: &Interpolations) -> String {
    options
        .iter()
        .map(|(name, value)| format!("%{{{name}}} = {value}"))
        .collect::<Vec<_>>()
        .join(", ")
}
