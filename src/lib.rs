//! # Newsstand
//!
//! A small newsletter publishing pipeline. Newsletters are plain `.txt`
//! files with an optional header block; a JSON manifest lists which ones
//! exist. Newsstand loads them, orders them newest first, and renders a
//! listing and individual articles as HTML.
//!
//! # Architecture: Load, Then View
//!
//! ```text
//! 1. Load    manifest + .txt files  →  Collection   (fetch, parse, sort)
//! 2. View    Collection + address   →  markup       (listing or article)
//! ```
//!
//! Every piece of text that reaches markup came from a file or an address
//! someone else controls. Header values and plain bodies are escaped,
//! formatted bodies are sanitized, and filenames are checked before they are
//! used to build a retrieval path.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`header`] | Splits a source file into its header block and body |
//! | [`sanitize`] | Filename checks and text escaping for markup |
//! | [`dates`] | Strict `YYYY-MM-DD` parsing and display formatting |
//! | [`render`] | Body rendering: plain paragraphs or sanitized CommonMark |
//! | [`source`] | Retrieval transports: filesystem, HTTP, in-memory |
//! | [`collection`] | Manifest loading, concurrent retrieval, listing order |
//! | [`view`] | List/Article state machine over a rendering host |
//! | [`page`] | Full HTML documents around the view containers |
//! | [`config`] | `config.toml` loading and validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Partial Failure Is Normal
//!
//! A missing or unreadable newsletter is logged and skipped; the rest of the
//! collection still renders. Only a broken manifest empties the listing, and
//! even then the page shows a hint rather than an error.
//!
//! ## Formatting Only With Sanitization
//!
//! Rich formatting is a formatter and sanitizer pair that can't be built
//! apart (see [`render::RichFormatting`]). Without it, bodies fall back to
//! escaped paragraphs.
//!
//! ## Explicit View Mode
//!
//! Whether selecting an article navigates to a dedicated page or opens an
//! overlay is decided by [`view::ViewMode`], taken from configuration, never
//! by inspecting the page.

pub mod collection;
pub mod config;
pub mod dates;
pub mod header;
pub mod output;
pub mod page;
pub mod render;
pub mod sanitize;
pub mod source;
pub mod view;

#[cfg(test)]
pub(crate) mod test_helpers;
