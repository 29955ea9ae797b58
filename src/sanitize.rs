//! Input sanitization at the trust boundary.
//!
//! Two kinds of untrusted input reach the pipeline:
//!
//! - **Filenames**, from the manifest or from the `?article=` address
//!   parameter. They become retrieval paths under the documents directory, so
//!   [`sanitize_filename`] rejects anything that could escape it.
//! - **Text**, from header values and plain-mode body content. It becomes
//!   HTML, so [`escape_text`] neutralizes the five markup-significant
//!   characters. [`Escaped`] plugs the same escaping into maud templates.

use maud::Render;

/// Validate and normalize a filename from an untrusted source.
///
/// Returns `None` to reject. Rules, in order:
///
/// 1. Backslash separators become forward slashes.
/// 2. Surrounding whitespace is trimmed; an empty result is rejected.
/// 3. Any `..` anywhere in the value is rejected.
/// 4. A leading `/` (absolute path) is rejected.
///
/// Accepted values are returned in normalized form, and normalizing them
/// again is a no-op.
pub fn sanitize_filename(raw: &str) -> Option<String> {
    let normalized = raw.replace('\\', "/");
    let trimmed = normalized.trim();
    if trimmed.is_empty() || trimmed.contains("..") || trimmed.starts_with('/') {
        return None;
    }
    Some(trimmed.to_string())
}

/// Escape `&`, `<`, `>`, `"` and `'` for embedding in HTML text or quoted
/// attribute values. Absent input yields an empty string.
pub fn escape_text<'a>(value: impl Into<Option<&'a str>>) -> String {
    let Some(value) = value.into() else {
        return String::new();
    };
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
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

/// Renders untrusted text through [`escape_text`] inside `html!` templates.
///
/// Use this for every header value and every plain-text fragment:
///
/// ```
/// use maud::html;
/// use newsstand::sanitize::Escaped;
///
/// let title = "<script>alert('x')</script>";
/// let markup = html! { h1 { (Escaped(title)) } };
/// assert!(!markup.into_string().contains("<script>"));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Escaped<'a>(pub &'a str);

impl Render for Escaped<'_> {
    fn render_to(&self, buffer: &mut String) {
        buffer.push_str(&escape_text(self.0));
    }
}
