//! Lookup results and their editable text form.

use indexmap::IndexMap;

/// Prefix a provider uses when it hands back a missing-translation placeholder instead of an error.
pub const MISSING_PREFIX: &str = "translation missing: ";

/// What: Result of resolving a translation path.
///
/// Details:
/// - `Scalar` is a single string leaf.
/// - `Tree` is a sub-tree of keys; order follows the source.
/// - `Sequence` is an ordered list of strings (e.g. day names).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Plain string leaf.
    Scalar(String),
    /// Mapping of sub-key to sub-value.
    Tree(IndexMap<String, Self>),
    /// Ordered list of string items.
    Sequence(Vec<String>),
}

impl Value {
    /// What: Build a scalar value.
    #[must_use]
    pub fn scalar(text: impl Into<String>) -> Self {
        Self::Scalar(text.into())
    }

    /// What: Check whether this value is a provider's missing-translation placeholder.
    ///
    /// Output:
    /// - `true` only for scalars starting with [`MISSING_PREFIX`].
    #[must_use]
    pub fn is_missing_placeholder(&self) -> bool {
        matches!(self, Self::Scalar(s) if s.starts_with(MISSING_PREFIX))
    }

    /// What: Render the value as text an operator can edit in a single input.
    ///
    /// Output:
    /// - Scalars as-is; sequences as a YAML block list (`- item` per line);
    ///   trees as a YAML block mapping.
    ///
    /// Details:
    /// - Structured values go through `serde_norway` so the store can parse them back
    ///   when the text is submitted unchanged.
    #[must_use]
    pub fn to_editable_text(&self) -> String {
        match self {
            Self::Scalar(s) => s.clone(),
            Self::Sequence(_) | Self::Tree(_) => serde_norway::to_string(&self.to_yaml())
                .map(|s| s.trim_end().to_string())
                .unwrap_or_default(),
        }
    }

    /// What: Convert into a `serde_norway` YAML node.
    #[must_use]
    pub fn to_yaml(&self) -> serde_norway::Value {
        match self {
            Self::Scalar(s) => serde_norway::Value::String(s.clone()),
            Self::Sequence(items) => serde_norway::Value::Sequence(
                items
                    .iter()
                    .map(|i| serde_norway::Value::String(i.clone()))
                    .collect(),
            ),
            Self::Tree(map) => {
                let mut mapping = serde_norway::Mapping::new();
                for (k, v) in map {
                    mapping.insert(serde_norway::Value::String(k.clone()), v.to_yaml());
                }
                serde_norway::Value::Mapping(mapping)
            }
        }
    }

    /// What: Convert a YAML node into a lookup value.
    ///
    /// Output:
    /// - `None` for `null` and tagged nodes, which carry no translatable text.
    ///
    /// Details:
    /// - Numbers and booleans become scalars through their text form.
    /// - Mapping entries with non-string keys are skipped.
    #[must_use]
    pub fn from_yaml(node: &serde_norway::Value) -> Option<Self> {
        match node {
            serde_norway::Value::String(s) => Some(Self::Scalar(s.clone())),
            serde_norway::Value::Bool(b) => Some(Self::Scalar(b.to_string())),
            serde_norway::Value::Number(n) => Some(Self::Scalar(n.to_string())),
            serde_norway::Value::Sequence(seq) => Some(Self::Sequence(
                seq.iter()
                    .filter_map(|item| match Self::from_yaml(item)? {
                        Self::Scalar(s) => Some(s),
                        other => Some(other.to_editable_text()),
                    })
                    .collect(),
            )),
            serde_norway::Value::Mapping(map) => {
                let mut tree = IndexMap::new();
                for (k, v) in map {
                    if let (Some(key), Some(value)) = (k.as_str(), Self::from_yaml(v)) {
                        tree.insert(key.to_string(), value);
                    }
                }
                Some(Self::Tree(tree))
            }
            serde_norway::Value::Null | serde_norway::Value::Tagged(_) => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Scalar(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Scalar(s)
    }
}
