//! Body text rendering.
//!
//! A newsletter body becomes article markup in one of two modes:
//!
//! - **Plain** (always available): the body is split into paragraphs on blank
//!   lines, each paragraph is escaped, single newlines become `<br>`, and each
//!   paragraph is wrapped in `<p>`.
//! - **Rich** (when a [`RichFormatting`] pair is configured): the raw body goes
//!   to a [`MarkupFormatter`] (CommonMark by default), and the generated HTML
//!   then goes through a [`MarkupSanitizer`] restricted to
//!   [`ALLOWED_ATTRIBUTES`]. A formatter error falls back to plain mode.
//!
//! Either way the returned [`Markup`] contains no unsanitized input. There is
//! no path where formatter output reaches the page without the sanitizer.

use maud::{Markup, PreEscaped, html};
use pulldown_cmark::{Options, Parser, html as md_html};
use std::collections::{HashMap, HashSet};
use std::fmt;
use thiserror::Error;

use crate::config::PressConfig;
use crate::sanitize::Escaped;

/// The only attributes that survive sanitization of rich markup.
pub const ALLOWED_ATTRIBUTES: &[&str] = &["href", "src", "alt", "title", "class", "style"];

#[derive(Error, Debug)]
#[error("formatting failed: {0}")]
pub struct FormatError(pub String);

/// Turns source text into HTML. The output is untrusted.
pub trait MarkupFormatter: Send + Sync {
    fn format(&self, source: &str) -> Result<String, FormatError>;
}

/// Reduces untrusted HTML to a safe subset, keeping only `allowed_attributes`.
pub trait MarkupSanitizer: Send + Sync {
    fn sanitize(&self, markup: &str, allowed_attributes: &[&str]) -> String;
}

/// CommonMark formatting via `pulldown-cmark`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommonMarkFormatter;

impl MarkupFormatter for CommonMarkFormatter {
    fn format(&self, source: &str) -> Result<String, FormatError> {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);

        let parser = Parser::new_ext(source, options);
        let mut html_output = String::with_capacity(source.len() * 2);
        md_html::push_html(&mut html_output, parser);
        Ok(html_output)
    }
}

/// HTML sanitization via `ammonia`.
///
/// Keeps ammonia's default tag and URL-scheme allow-lists, replaces its
/// attribute lists with the caller's generic list, and drops every
/// tag-specific attribute.
#[derive(Debug, Clone, Copy, Default)]
pub struct AmmoniaSanitizer;

impl MarkupSanitizer for AmmoniaSanitizer {
    fn sanitize(&self, markup: &str, allowed_attributes: &[&str]) -> String {
        let attributes: HashSet<&str> = allowed_attributes.iter().copied().collect();
        ammonia::Builder::default()
            .generic_attributes(attributes)
            .tag_attributes(HashMap::new())
            .clean(markup)
            .to_string()
    }
}

/// A formatter and the sanitizer its output must pass through.
///
/// The two only exist together, so rich mode can't run unsanitized.
pub struct RichFormatting {
    formatter: Box<dyn MarkupFormatter>,
    sanitizer: Box<dyn MarkupSanitizer>,
}

impl RichFormatting {
    pub fn new(
        formatter: impl MarkupFormatter + 'static,
        sanitizer: impl MarkupSanitizer + 'static,
    ) -> Self {
        Self {
            formatter: Box::new(formatter),
            sanitizer: Box::new(sanitizer),
        }
    }

    /// CommonMark formatting with ammonia sanitization.
    pub fn commonmark() -> Self {
        Self::new(CommonMarkFormatter, AmmoniaSanitizer)
    }
}

impl fmt::Debug for RichFormatting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RichFormatting").finish_non_exhaustive()
    }
}

/// Renders newsletter bodies to safe markup.
#[derive(Debug, Default)]
pub struct BodyRenderer {
    rich: Option<RichFormatting>,
}

impl BodyRenderer {
    pub fn new(rich: Option<RichFormatting>) -> Self {
        Self { rich }
    }

    /// Plain paragraphs only.
    pub fn plain() -> Self {
        Self { rich: None }
    }

    /// Rich mode when `rendering.rich_formatting` is set, plain otherwise.
    pub fn from_config(config: &PressConfig) -> Self {
        if config.rendering.rich_formatting {
            Self::new(Some(RichFormatting::commonmark()))
        } else {
            Self::plain()
        }
    }

    pub fn is_rich(&self) -> bool {
        self.rich.is_some()
    }

    pub fn render_body(&self, text: &str) -> Markup {
        let Some(rich) = &self.rich else {
            return render_paragraphs(text);
        };
        match rich.formatter.format(text) {
            Ok(generated) => PreEscaped(rich.sanitizer.sanitize(&generated, ALLOWED_ATTRIBUTES)),
            Err(e) => {
                tracing::warn!(error = %e, "rich formatting failed, rendering plain paragraphs");
                render_paragraphs(text)
            }
        }
    }
}

/// Split text into blank-line separated paragraphs, trimmed, empties dropped.
pub fn split_paragraphs(text: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in text.split('\n') {
        if line.trim().is_empty() {
            flush_paragraph(&mut current, &mut paragraphs);
        } else {
            current.push(line);
        }
    }
    flush_paragraph(&mut current, &mut paragraphs);
    paragraphs
}

fn flush_paragraph(lines: &mut Vec<&str>, paragraphs: &mut Vec<String>) {
    if lines.is_empty() {
        return;
    }
    let paragraph = lines.join("\n").trim().to_string();
    lines.clear();
    if !paragraph.is_empty() {
        paragraphs.push(paragraph);
    }
}

/// Plain mode: escaped `<p>` blocks with `<br>` for single newlines.
pub fn render_paragraphs(text: &str) -> Markup {
    let paragraphs = split_paragraphs(text);
    html! {
        @for paragraph in &paragraphs {
            p {
                @for (i, line) in paragraph.split('\n').enumerate() {
                    @if i > 0 { br; }
                    (Escaped(line))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingFormatter;

    impl MarkupFormatter for FailingFormatter {
        fn format(&self, _source: &str) -> Result<String, FormatError> {
            Err(FormatError("boom".to_string()))
        }
    }

    /// Passes markup through untouched so tests can see formatter output.
    struct IdentitySanitizer;

    impl MarkupSanitizer for IdentitySanitizer {
        fn sanitize(&self, markup: &str, _allowed: &[&str]) -> String {
            markup.to_string()
        }
    }

    fn rich() -> BodyRenderer {
        BodyRenderer::new(Some(RichFormatting::commonmark()))
    }

    // =========================================================================
    // Plain mode
    // =========================================================================

    #[test]
    fn two_paragraphs() {
        let html = BodyRenderer::plain().render_body("Hello\n\nWorld").into_string();
        assert_eq!(html, "<p>Hello</p><p>World</p>");
    }

    #[test]
    fn single_newlines_become_line_breaks() {
        let html = render_paragraphs("line one\nline two").into_string();
        assert_eq!(html, "<p>line one<br>line two</p>");
    }

    #[test]
    fn runs_of_blank_lines_split_once() {
        let html = render_paragraphs("a\n\n\n   \n\nb").into_string();
        assert_eq!(html, "<p>a</p><p>b</p>");
    }

    #[test]
    fn paragraphs_are_trimmed() {
        assert_eq!(split_paragraphs("  a  \n\n\tb\n"), vec!["a", "b"]);
    }

    #[test]
    fn empty_body_renders_nothing() {
        assert_eq!(render_paragraphs("").into_string(), "");
        assert_eq!(render_paragraphs("\n\n   \n").into_string(), "");
    }

    #[test]
    fn script_is_escaped_in_plain_mode() {
        let html = BodyRenderer::plain()
            .render_body("<script>alert('x')</script>")
            .into_string();
        assert!(!html.contains("<script>"));
        assert_eq!(
            html,
            "<p>&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;</p>"
        );
    }

    #[test]
    fn plain_mode_does_not_interpret_markdown() {
        let html = BodyRenderer::plain().render_body("**bold**").into_string();
        assert_eq!(html, "<p>**bold**</p>");
    }

    // =========================================================================
    // Rich mode
    // =========================================================================

    #[test]
    fn rich_mode_renders_markdown() {
        let html = rich()
            .render_body("Some **bold** and *italic*.\n\n- one\n- two")
            .into_string();
        assert!(html.contains("<strong>bold</strong>"));
        assert!(html.contains("<em>italic</em>"));
        assert!(html.contains("<li>one</li>"));
    }

    #[test]
    fn rich_mode_keeps_safe_links() {
        let html = rich()
            .render_body("[site](https://example.com \"Home\")")
            .into_string();
        assert!(html.contains("href=\"https://example.com\""));
        assert!(html.contains("title=\"Home\""));
    }

    #[test]
    fn rich_mode_strips_script_elements() {
        let html = rich()
            .render_body("Hello\n\n<script>alert('x')</script>")
            .into_string();
        assert!(!html.contains("<script"));
        assert!(!html.contains("alert"));
        assert!(html.contains("Hello"));
    }

    #[test]
    fn rich_mode_strips_event_handlers() {
        let html = rich()
            .render_body("<p onclick=\"steal()\" class=\"lead\">hi</p>")
            .into_string();
        assert!(!html.contains("onclick"));
        assert!(html.contains("class=\"lead\""));
    }

    #[test]
    fn rich_mode_strips_attributes_outside_allow_list() {
        let html = rich()
            .render_body("<img src=\"a.png\" alt=\"A\" width=\"10\" data-x=\"1\">")
            .into_string();
        assert!(html.contains("src=\"a.png\""));
        assert!(html.contains("alt=\"A\""));
        assert!(!html.contains("width"));
        assert!(!html.contains("data-x"));
    }

    #[test]
    fn rich_mode_drops_javascript_urls() {
        let html = rich()
            .render_body("[click](javascript:alert(1))")
            .into_string();
        assert!(!html.contains("javascript:"));
    }

    #[test]
    fn formatter_output_always_goes_through_sanitizer() {
        struct RecordingSanitizer;
        impl MarkupSanitizer for RecordingSanitizer {
            fn sanitize(&self, _markup: &str, allowed: &[&str]) -> String {
                format!("sanitized:{}", allowed.join(","))
            }
        }
        let rich = RichFormatting::new(CommonMarkFormatter, RecordingSanitizer);
        let renderer = BodyRenderer::new(Some(rich));
        assert_eq!(
            renderer.render_body("anything").into_string(),
            "sanitized:href,src,alt,title,class,style"
        );
    }

    #[test]
    fn formatter_failure_falls_back_to_plain() {
        let rich = RichFormatting::new(FailingFormatter, IdentitySanitizer);
        let renderer = BodyRenderer::new(Some(rich));
        let html = renderer.render_body("Hello\n\n<b>World</b>").into_string();
        assert_eq!(html, "<p>Hello</p><p>&lt;b&gt;World&lt;/b&gt;</p>");
    }

    #[test]
    fn from_config_follows_rendering_switch() {
        let mut config = PressConfig::default();
        assert!(BodyRenderer::from_config(&config).is_rich());
        config.rendering.rich_formatting = false;
        assert!(!BodyRenderer::from_config(&config).is_rich());
    }
}
