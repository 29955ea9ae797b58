//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Each newsletter leads with its listing position and display title. The
//! source path and the remaining metadata follow as indented context lines,
//! so the output reads as an inventory that can still be traced back to
//! files.
//!
//! ```text
//! Newsletters (2)
//! 001 Spring issue
//!     Source: newsletters/a.txt
//!     Feb 1, 2026 • Ann
//! 002 b.txt
//!     Source: newsletters/b.txt
//!     Staff
//! ```
//!
//! The byline mirrors the listing cards: the date only when valid, the
//! author falling back to the configured default.
//!
//! # Architecture
//!
//! `format_*` functions return `Vec<String>` and do no I/O; `print_*`
//! wrappers write them to stdout.

use crate::collection::{Collection, NewsletterRecord};
use crate::config::PressConfig;
use crate::dates::display_date;
use crate::view::ViewState;

// ============================================================================
// Helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

const INDENT: &str = "    ";

fn record_lines(index: usize, record: &NewsletterRecord, config: &PressConfig) -> Vec<String> {
    let meta = &record.meta;
    let mut lines = vec![
        format!("{} {}", format_index(index), record.display_title()),
        format!("{INDENT}Source: {}", config.document_path(&record.filename)),
    ];
    if let Some(subtitle) = meta.subtitle() {
        lines.push(format!("{INDENT}Subtitle: {subtitle}"));
    }
    let date = display_date(meta.date());
    let author = meta.author().unwrap_or(config.view.default_author.as_str());
    if date.is_empty() {
        lines.push(format!("{INDENT}{author}"));
    } else {
        lines.push(format!("{INDENT}{date} • {author}"));
    }
    lines
}

// ============================================================================
// Collection
// ============================================================================

/// Format the loaded collection in listing order.
pub fn format_collection(collection: &Collection, config: &PressConfig) -> Vec<String> {
    if collection.is_empty() {
        return vec![format!(
            "No newsletters found. Add .txt files to {} and list them in {}.",
            config.paths.documents, config.paths.manifest
        )];
    }
    let mut lines = vec![format!("Newsletters ({})", collection.len())];
    for (i, record) in collection.iter().enumerate() {
        lines.extend(record_lines(i + 1, record, config));
    }
    lines
}

pub fn print_collection(collection: &Collection, config: &PressConfig) {
    for line in format_collection(collection, config) {
        println!("{}", line);
    }
}

// ============================================================================
// Render
// ============================================================================

/// One-line summary of what the view ended up showing.
pub fn format_view_state(state: &ViewState) -> String {
    match state {
        ViewState::List => "Showing: listing".to_string(),
        ViewState::Article {
            filename,
            available: true,
        } => format!("Showing: article {filename}"),
        ViewState::Article {
            filename,
            available: false,
        } => format!("Showing: article {filename} (unavailable)"),
    }
}
