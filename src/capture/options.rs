//! Lookup options bag: scope, locale, behaviour flags and interpolation values.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

/// Keys that steer the lookup itself and are never interpolation values.
pub const RESERVED_KEYS: &[&str] = &[
    "scope",
    "locale",
    "default",
    "raise",
    "throw",
    "object",
    "separator",
    "format",
    "fallback",
    "cascade",
    "exception_handler",
    "deep_interpolation",
    "rescue_format",
    "fallback_in_progress",
    "fallback_original_locale",
];

/// Keys removed before the lookup is delegated: they either change failure behaviour
/// or carry host objects that cannot be stored.
pub const STRIPPED_KEYS: &[&str] = &["raise", "throw", "object"];

/// Interpolation name to display value, as shown next to a captured string.
pub type Interpolations = IndexMap<String, String>;

/// Opaque reference to a host object passed along with a lookup (e.g. a form model).
#[derive(Clone)]
pub struct HostObject {
    label: String,
    inner: Arc<dyn Any + Send + Sync>,
}

impl HostObject {
    /// What: Wrap a host value under a human-readable label.
    pub fn new<T: Any + Send + Sync>(label: impl Into<String>, value: T) -> Self {
        Self {
            label: label.into(),
            inner: Arc::new(value),
        }
    }

    /// What: Label used when the object has to be displayed.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// What: Borrow the wrapped value if it has type `T`.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }
}

impl fmt::Debug for HostObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HostObject({})", self.label)
    }
}

impl PartialEq for HostObject {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

/// One value in the options bag.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    /// Explicit nothing.
    Null,
    /// Flag such as `raise: true`.
    Bool(bool),
    /// Integer such as `count: 3`.
    Integer(i64),
    /// Text such as `name: "Alice"` or a single scope segment.
    Text(String),
    /// Ordered list such as a multi-segment scope.
    List(Vec<Self>),
    /// Host object reference; never stored.
    Object(HostObject),
}

impl OptionValue {
    /// What: Text shown to the operator for this value.
    ///
    /// Details:
    /// - Lists join their items with `", "`; objects render as `#<label>`.
    #[must_use]
    pub fn display_text(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(b) => b.to_string(),
            Self::Integer(n) => n.to_string(),
            Self::Text(s) => s.clone(),
            Self::List(items) => items
                .iter()
                .map(Self::display_text)
                .collect::<Vec<_>>()
                .join(", "),
            Self::Object(o) => format!("#<{}>", o.label()),
        }
    }

    /// What: Borrow the text of a `Text` value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for OptionValue {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl<T: Into<Self>> From<Vec<T>> for OptionValue {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

/// Ordered options bag passed with every lookup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Options {
    entries: IndexMap<String, OptionValue>,
}

impl Options {
    /// What: Empty options bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// What: Builder-style insert.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// What: Insert or replace a value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<OptionValue>) {
        self.entries.insert(name.into(), value.into());
    }

    /// What: Look up a value by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.entries.get(name)
    }

    /// What: Locale named in the bag, if it is given as non-blank text.
    #[must_use]
    pub fn locale(&self) -> Option<&str> {
        self.get("locale")
            .and_then(OptionValue::as_text)
            .map(str::trim)
            .filter(|l| !l.is_empty())
    }

    /// What: Copy of the bag without the keys in [`STRIPPED_KEYS`].
    ///
    /// Details:
    /// - This is the bag a wrapped provider receives.
    #[must_use]
    pub fn without_stripped(&self) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .filter(|(k, _)| !STRIPPED_KEYS.contains(&k.as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }

    /// What: Interpolation values of the bag, rendered for display.
    ///
    /// Output:
    /// - Every entry whose key is not in [`RESERVED_KEYS`], in insertion order.
    #[must_use]
    pub fn interpolations(&self) -> Interpolations {
        self.entries
            .iter()
            .filter(|(k, _)| !RESERVED_KEYS.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.display_text()))
            .collect()
    }

    /// What: Iterate over all entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}
