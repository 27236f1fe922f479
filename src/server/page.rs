//! Demo host page: renders a handful of lookups so each request is a capture pass.

use std::fmt::Write as _;

use axum::{
    extract::{Query, State},
    response::Html,
};
use serde::Deserialize;

use crate::capture::Options;
use crate::error::ResolveError;
use crate::server::ServerState;

/// Page query parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    /// Locale to render; the store default when absent.
    pub locale: Option<String>,
    /// Name interpolated into the farewell line.
    pub name: Option<String>,
}

/// What: Lookups the demo page performs, as `(key, options)`.
#[must_use]
pub fn page_lookups(locale: Option<&str>, name: &str) -> Vec<(&'static str, Options)> {
    let base = || match locale {
        Some(l) => Options::new().with("locale", l),
        None => Options::new(),
    };
    vec![
        ("title", base().with("scope", "home")),
        ("greeting", base()),
        ("farewell", base().with("name", name)),
        ("day_names", base().with("scope", "date")),
        ("blank", base().with("scope", vec!["errors", "messages"])),
    ]
}

/// GET / - Render the demo page through the capturing translator
pub async fn index(State(state): State<ServerState>, Query(query): Query<PageQuery>) -> Html<String> {
    tracing::info!("GET / (locale={:?})", query.locale);
    let name = query.name.as_deref().unwrap_or("Alice");
    let mut items = String::new();
    for (key, options) in page_lookups(query.locale.as_deref(), name) {
        let text = match state.translator.t(key, &options) {
            Ok(text) => text,
            Err(err @ ResolveError::InvalidScope { .. }) => {
                tracing::error!(error = %err, "page lookup misconfigured");
                err.to_string()
            }
            Err(err) => err.to_string(),
        };
        let _ = writeln!(items, "    <li>{}</li>", escape_html(&text));
    }
    Html(format!(
        r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="utf-8">
    <meta name="csrf-token" content="{token}">
    <title>translator</title>
  </head>
  <body>
  <ul>
{items}  </ul>
  </body>
</html>
"#,
        token = escape_html(state.csrf.as_str()),
    ))
}

/// What: Escape text for HTML element and attribute content.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
