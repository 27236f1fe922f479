//! `%{name}` placeholder substitution.

use crate::capture::options::Interpolations;

/// What: Replace `%{name}` placeholders with their interpolation values.
///
/// Inputs:
/// - `template`: Raw translation text
/// - `values`: Interpolation name to value
///
/// Output:
/// - Text with known placeholders substituted
///
/// Details:
/// - Unknown placeholders are left as written so the gap stays visible.
/// - `%%{name}` is an escape and yields a literal `%{name}`.
/// - An unterminated `%{` is copied through unchanged.
#[must_use]
pub fn interpolate(template: &str, values: &Interpolations) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('%') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        if let Some(escaped) = tail.strip_prefix("%%{") {
            out.push_str("%{");
            rest = escaped;
            continue;
        }
        let Some(body) = tail.strip_prefix("%{") else {
            out.push('%');
            rest = &tail[1..];
            continue;
        };
        let Some(end) = body.find('}') else {
            out.push_str(tail);
            return out;
        };
        let name = &body[..end];
        match values.get(name) {
            Some(value) => out.push_str(value),
            None => {
                out.push_str("%{");
                out.push_str(name);
                out.push('}');
            }
        }
        rest = &body[end + 1..];
    }
    out.push_str(rest);
    out
}
