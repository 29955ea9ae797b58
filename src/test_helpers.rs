//! Shared test utilities for the newsstand test suite.
//!
//! Builders for records and in-memory content roots, so aggregator and view
//! tests don't repeat manifest plumbing.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let source = source_with(r#"["a.txt"]"#, &[("a.txt", "---\nTitle: A\n---\nBody")]);
//! let dated = record_dated("b.txt", "2026-01-01");
//! ```

use crate::collection::NewsletterRecord;
use crate::header::{self, Metadata};
use crate::source::MemorySource;

// =========================================================================
// Records
// =========================================================================

/// An undated record with no metadata and an empty body.
pub fn record(filename: &str) -> NewsletterRecord {
    NewsletterRecord {
        filename: filename.to_string(),
        meta: Metadata::new(),
        body: String::new(),
    }
}

/// A record carrying only a `Date` header (valid or not).
pub fn record_dated(filename: &str, date: &str) -> NewsletterRecord {
    let mut r = record(filename);
    r.meta.insert(header::DATE, date);
    r
}

// =========================================================================
// Sources
// =========================================================================

/// A content root with the default layout: the manifest at
/// `newsletters/index.json` and each file under `newsletters/`.
pub fn source_with(manifest_json: &str, files: &[(&str, &str)]) -> MemorySource {
    let mut source = MemorySource::new().with("newsletters/index.json", manifest_json);
    for (name, content) in files {
        source.insert(format!("newsletters/{name}"), *content);
    }
    source
}
