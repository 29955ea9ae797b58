//! Header block parsing for newsletter source files.
//!
//! Every newsletter is a plain `.txt` file that may open with a header block:
//!
//! ```text
//! ---
//! Title: Headline here
//! Subtitle: Short subtitle here
//! Author: Jane Reporter
//! Thumbnail: thumbnails/example.jpg
//! Date: 2026-01-20
//! ---
//! Body lines follow here. Blank lines become paragraphs.
//! ```
//!
//! ## Parsing rules
//!
//! - Carriage returns are stripped, then a leading byte-order mark and any
//!   leading whitespace.
//! - If the first line is not exactly `---`, the whole text is body and the
//!   metadata is empty. This is the normal case for header-less files.
//! - Inside the block, blank lines are skipped and `Key: value` lines are
//!   recorded (key is everything before the first colon, both sides trimmed).
//!   A repeated key overwrites the earlier value. Lines without a colon are
//!   ignored.
//! - A line consisting solely of `---` ends the block. A block that never
//!   terminates consumes the rest of the file, leaving an empty body.
//! - The body is everything after the terminator, trimmed.
//!
//! No escaping happens here. Header values and body text are untrusted and
//! every consumer must treat them that way.

use std::collections::BTreeMap;

/// Delimiter line that opens and closes a header block.
pub const DELIMITER: &str = "---";

pub const TITLE: &str = "Title";
pub const SUBTITLE: &str = "Subtitle";
pub const AUTHOR: &str = "Author";
pub const THUMBNAIL: &str = "Thumbnail";
pub const DATE: &str = "Date";

/// Header key/value pairs, keyed exactly as written in the source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata(BTreeMap<String, String>);

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, replacing any previous value for the key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Raw value for a key, exactly as parsed (possibly empty).
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Value for a key, treating an empty value the same as a missing one.
    ///
    /// Display fallbacks (title → filename, author → "Staff") kick in for
    /// both cases.
    pub fn non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    pub fn title(&self) -> Option<&str> {
        self.non_empty(TITLE)
    }

    pub fn subtitle(&self) -> Option<&str> {
        self.non_empty(SUBTITLE)
    }

    pub fn author(&self) -> Option<&str> {
        self.non_empty(AUTHOR)
    }

    pub fn thumbnail(&self) -> Option<&str> {
        self.non_empty(THUMBNAIL)
    }

    pub fn date(&self) -> Option<&str> {
        self.non_empty(DATE)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Serialize back into a delimited header block, one `Key: value` per line.
    ///
    /// Parsing the result yields an equal map, provided keys contain no colon
    /// and neither keys nor values carry surrounding whitespace or newlines.
    pub fn to_header_block(&self) -> String {
        let mut out = String::from(DELIMITER);
        out.push('\n');
        for (key, value) in self.iter() {
            out.push_str(key);
            out.push_str(": ");
            out.push_str(value);
            out.push('\n');
        }
        out.push_str(DELIMITER);
        out.push('\n');
        out
    }
}

impl FromIterator<(String, String)> for Metadata {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Result of splitting a raw document into header metadata and body text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedDocument {
    pub meta: Metadata,
    pub body: String,
}

impl ParsedDocument {
    /// Reassemble a source text that parses back to this document.
    pub fn to_text(&self) -> String {
        if self.meta.is_empty() {
            return self.body.clone();
        }
        format!("{}\n{}", self.meta.to_header_block(), self.body)
    }
}

/// Split raw newsletter text into metadata and body.
///
/// Never fails: anything that doesn't look like a header block is body.
pub fn parse(raw: &str) -> ParsedDocument {
    let normalized = raw.replace('\r', "");
    let text = normalized.trim_start_matches('\u{feff}').trim_start();

    let mut lines = text.split('\n');
    let opens_block = lines
        .next()
        .is_some_and(|first| first.trim_end() == DELIMITER);
    if !opens_block {
        return ParsedDocument {
            meta: Metadata::new(),
            body: text.trim().to_string(),
        };
    }

    let mut meta = Metadata::new();
    for line in lines.by_ref() {
        let line = line.trim();
        if line == DELIMITER {
            break;
        }
        if line.is_empty() {
            continue;
        }
        if let Some((key, value)) = split_header_line(line) {
            meta.insert(key, value);
        }
    }

    let body = lines.collect::<Vec<_>>().join("\n").trim().to_string();
    ParsedDocument { meta, body }
}

/// Split `Key: value` at the first colon. The key must be non-empty.
fn split_header_line(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once(':')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key, value.trim()))
}
