//! Manifest-driven loading and ordering of the newsletter collection.
//!
//! ## Loading
//!
//! [`load_collection`] is the only place that performs bulk I/O:
//!
//! ```text
//! manifest (JSON array) → string entries → sanitize_filename → dedupe
//!     → fetch + parse every file concurrently → drop failures → sort
//! ```
//!
//! It never fails. An unreadable or malformed manifest, or one that isn't an
//! array, yields an empty collection. A newsletter that can't be fetched is
//! left out of the result and logged. Nothing is retried.
//!
//! All retrievals are issued before any is awaited and the loader waits for
//! every one to settle, so one slow or failing file never blocks or aborts
//! the others. `loading.max_concurrent_fetches` bounds how many are in flight.
//!
//! ## Ordering
//!
//! Two records with valid `YYYY-MM-DD` dates order newest first; any
//! comparison involving a missing or invalid date orders by filename. Those
//! pairwise rules alone are not transitive once dated and undated records
//! mix, so [`sort_records`] applies them in a way that always yields one
//! deterministic sequence:
//!
//! 1. sort everything by filename;
//! 2. within each run of consecutive dated records, sort newest first
//!    (filename breaks ties).
//!
//! Undated records keep their filename position and dated records only move
//! within their run, so every dated/undated pair ends up in filename order
//! and neighbouring dated records end up in date order.

use futures::StreamExt;
use futures::future::join_all;
use std::cmp::Ordering;
use std::collections::HashSet;
use thiserror::Error;

use crate::config::PressConfig;
use crate::dates::parse_date;
use crate::header::{self, Metadata};
use crate::sanitize::sanitize_filename;
use crate::source::{DocumentSource, FetchError};

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("manifest unavailable: {0}")]
    ManifestUnavailable(#[source] FetchError),
    #[error("manifest is not valid JSON: {0}")]
    ManifestMalformed(#[from] serde_json::Error),
    #[error("manifest is not a JSON array")]
    ManifestNotAList,
    #[error("newsletter {filename} unavailable: {source}")]
    DocumentUnavailable {
        filename: String,
        #[source]
        source: FetchError,
    },
}

/// One successfully loaded newsletter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsletterRecord {
    /// Sanitized filename, relative to the documents directory.
    pub filename: String,
    pub meta: Metadata,
    pub body: String,
}

impl NewsletterRecord {
    /// `Title` header, or the filename when missing or empty.
    pub fn display_title(&self) -> &str {
        self.meta.title().unwrap_or(&self.filename)
    }
}

/// The sorted set of newsletters loaded for one page session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collection {
    records: Vec<NewsletterRecord>,
}

impl Collection {
    /// Build a collection, applying the listing order.
    pub fn new(mut records: Vec<NewsletterRecord>) -> Self {
        sort_records(&mut records);
        Self { records }
    }

    pub fn find(&self, filename: &str) -> Option<&NewsletterRecord> {
        self.records.iter().find(|r| r.filename == filename)
    }

    pub fn records(&self) -> &[NewsletterRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NewsletterRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn filenames(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.filename.as_str()).collect()
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a NewsletterRecord;
    type IntoIter = std::slice::Iter<'a, NewsletterRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Load, parse and sort every newsletter listed in the manifest.
pub async fn load_collection(source: &dyn DocumentSource, config: &PressConfig) -> Collection {
    let filenames = match load_manifest(source, config).await {
        Ok(filenames) => filenames,
        Err(e) => {
            tracing::warn!(
                manifest = %config.paths.manifest,
                error = %e,
                "could not load manifest"
            );
            return Collection::default();
        }
    };

    let outcomes = match config.loading.max_concurrent_fetches {
        None => {
            join_all(
                filenames
                    .iter()
                    .map(|filename| load_record(source, config, filename)),
            )
            .await
        }
        Some(limit) => {
            futures::stream::iter(
                filenames
                    .iter()
                    .map(|filename| load_record(source, config, filename)),
            )
            .buffer_unordered(limit.max(1))
            .collect::<Vec<_>>()
            .await
        }
    };

    let records: Vec<NewsletterRecord> = outcomes
        .into_iter()
        .filter_map(|outcome| match outcome {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(error = %e, "skipping newsletter");
                None
            }
        })
        .collect();

    tracing::info!(
        listed = filenames.len(),
        loaded = records.len(),
        "loaded newsletter collection"
    );
    Collection::new(records)
}

/// Fetch the manifest and reduce it to sanitized, de-duplicated filenames.
pub async fn load_manifest(
    source: &dyn DocumentSource,
    config: &PressConfig,
) -> Result<Vec<String>, LoadError> {
    let raw = source
        .fetch(&config.paths.manifest)
        .await
        .map_err(LoadError::ManifestUnavailable)?;
    parse_manifest(&raw)
}

/// Parse manifest JSON into the filenames worth fetching.
///
/// Non-string entries and entries that fail sanitization are dropped;
/// repeated filenames keep their first occurrence.
pub fn parse_manifest(raw: &str) -> Result<Vec<String>, LoadError> {
    let value: serde_json::Value = serde_json::from_str(raw)?;
    let entries = value.as_array().ok_or(LoadError::ManifestNotAList)?;

    let mut seen = HashSet::new();
    let mut filenames = Vec::with_capacity(entries.len());
    for entry in entries {
        let Some(raw_name) = entry.as_str() else {
            tracing::debug!(%entry, "dropping non-string manifest entry");
            continue;
        };
        let Some(filename) = sanitize_filename(raw_name) else {
            tracing::debug!(entry = raw_name, "dropping unsafe manifest entry");
            continue;
        };
        if seen.insert(filename.clone()) {
            filenames.push(filename);
        } else {
            tracing::debug!(%filename, "dropping duplicate manifest entry");
        }
    }
    Ok(filenames)
}

/// Fetch and parse one newsletter. `filename` must already be sanitized.
pub async fn load_record(
    source: &dyn DocumentSource,
    config: &PressConfig,
    filename: &str,
) -> Result<NewsletterRecord, LoadError> {
    let text = source
        .fetch(&config.document_path(filename))
        .await
        .map_err(|source| LoadError::DocumentUnavailable {
            filename: filename.to_string(),
            source,
        })?;
    let parsed = header::parse(&text);
    Ok(NewsletterRecord {
        filename: filename.to_string(),
        meta: parsed.meta,
        body: parsed.body,
    })
}

/// Pairwise listing order: newest first when both dates are valid, filename
/// otherwise. Equal dates fall back to filename.
pub fn compare_records(a: &NewsletterRecord, b: &NewsletterRecord) -> Ordering {
    let a_date = a.meta.date().and_then(parse_date);
    let b_date = b.meta.date().and_then(parse_date);
    match (a_date, b_date) {
        (Some(a_date), Some(b_date)) => b_date
            .cmp(&a_date)
            .then_with(|| a.filename.cmp(&b.filename)),
        _ => a.filename.cmp(&b.filename),
    }
}

/// Sort records into listing order. See the module docs for how mixed
/// dated/undated input is handled.
pub fn sort_records(records: &mut [NewsletterRecord]) {
    records.sort_by(|a, b| a.filename.cmp(&b.filename));

    let mut start = 0;
    while start < records.len() {
        if !has_valid_date(&records[start]) {
            start += 1;
            continue;
        }
        let mut end = start;
        while end < records.len() && has_valid_date(&records[end]) {
            end += 1;
        }
        records[start..end].sort_by(compare_records);
        start = end;
    }
}

fn has_valid_date(record: &NewsletterRecord) -> bool {
    record.meta.date().and_then(parse_date).is_some()
}
