//! List and article views, and the state machine between them.
//!
//! The controller never touches a real document. It drives a [`RenderHost`],
//! which offers three primitives: mount markup into a named container, read
//! or replace the visible address, and move focus. [`MemoryHost`] is the
//! in-process implementation used by the CLI and tests.
//!
//! ## States
//!
//! ```text
//!            select (page mode)  ──► navigate to article_page?article=<file>
//!   List ──┤
//!            select (overlay)    ──► Article ──close / Escape──► List
//! ```
//!
//! On [`ViewController::start`] the collection is loaded and the listing is
//! mounted. If the address carries `?article=<file>`, the filename is
//! sanitized and resolved, first from the loaded collection and otherwise by
//! fetching it directly.
//!
//! ## Modes
//!
//! The presentation strategy is chosen up front with [`ViewMode`]:
//!
//! - **Page**: entries link to a dedicated article page. Selecting one
//!   navigates there; the next load renders the article into
//!   [`ARTICLE_CONTENT`].
//! - **Overlay**: the article opens over the listing from the already-loaded
//!   record. Close or Escape hides it, restores focus and strips the
//!   parameter from the address.

use maud::{Markup, html};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use url::form_urlencoded;

use crate::collection::{Collection, NewsletterRecord, load_collection, load_record};
use crate::config::PressConfig;
use crate::dates::display_date;
use crate::render::BodyRenderer;
use crate::sanitize::{Escaped, sanitize_filename};
use crate::source::DocumentSource;

/// Container holding the listing cards.
pub const LIST_CONTAINER: &str = "news-list";
/// Overlay wrapper, shown and hidden in overlay mode.
pub const ARTICLE_VIEW: &str = "article-view";
/// Container the article markup is mounted into.
pub const ARTICLE_CONTENT: &str = "article-content";
/// Overlay close control; receives focus while the overlay is open.
pub const CLOSE_CONTROL: &str = "close-article";

/// How an article is presented when an entry is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Navigate to a dedicated article page.
    #[default]
    Page,
    /// Open the article over the listing.
    Overlay,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    List,
    Article {
        filename: String,
        /// False when the article couldn't be resolved and a notice is shown instead.
        available: bool,
    },
}

/// A visible address: path plus decoded query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    path: String,
    query: Vec<(String, String)>,
}

impl Address {
    /// Parse `path?query`. An empty path becomes `/`.
    pub fn parse(raw: &str) -> Self {
        let (path, query) = raw.split_once('?').unwrap_or((raw, ""));
        let path = if path.is_empty() { "/" } else { path };
        Self {
            path: path.to_string(),
            query: form_urlencoded::parse(query.as_bytes())
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect(),
        }
    }

    pub fn root() -> Self {
        Self::parse("/")
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// First value of a query parameter.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Same address with `name` set to `value`, replacing earlier values.
    pub fn with_param(&self, name: &str, value: &str) -> Self {
        let mut next = self.without_param(name);
        next.query.push((name.to_string(), value.to_string()));
        next
    }

    pub fn without_param(&self, name: &str) -> Self {
        Self {
            path: self.path.clone(),
            query: self
                .query
                .iter()
                .filter(|(k, _)| k != name)
                .cloned()
                .collect(),
        }
    }

    pub fn with_path(&self, path: &str) -> Self {
        Self {
            path: path.to_string(),
            query: self.query.clone(),
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)?;
        if !self.query.is_empty() {
            let query = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(self.query.iter())
                .finish();
            write!(f, "?{query}")?;
        }
        Ok(())
    }
}

/// The document-rendering environment the controller draws into.
pub trait RenderHost {
    /// Replace the contents of a named container.
    fn mount(&mut self, container: &str, markup: Markup);
    fn set_hidden(&mut self, container: &str, hidden: bool);
    fn address(&self) -> Address;
    /// Change the visible address without reloading.
    fn replace_address(&mut self, address: Address);
    /// Load a different address. The current page is torn down.
    fn navigate(&mut self, address: Address);
    fn focused(&self) -> Option<String>;
    fn focus(&mut self, element: &str);
}

/// In-memory [`RenderHost`] that records what was mounted.
#[derive(Debug, Clone)]
pub struct MemoryHost {
    address: Address,
    containers: BTreeMap<String, String>,
    hidden: BTreeSet<String>,
    focus: Option<String>,
    pending_navigation: Option<Address>,
}

impl MemoryHost {
    /// A fresh page at `address` with the overlay hidden.
    pub fn new(address: Address) -> Self {
        Self {
            address,
            containers: BTreeMap::new(),
            hidden: BTreeSet::from([ARTICLE_VIEW.to_string()]),
            focus: None,
            pending_navigation: None,
        }
    }

    pub fn container(&self, name: &str) -> Option<&str> {
        self.containers.get(name).map(String::as_str)
    }

    pub fn is_hidden(&self, name: &str) -> bool {
        self.hidden.contains(name)
    }

    /// The address a page-mode selection asked to load, if any.
    pub fn take_navigation(&mut self) -> Option<Address> {
        self.pending_navigation.take()
    }
}

impl RenderHost for MemoryHost {
    fn mount(&mut self, container: &str, markup: Markup) {
        self.containers
            .insert(container.to_string(), markup.into_string());
    }

    fn set_hidden(&mut self, container: &str, hidden: bool) {
        if hidden {
            self.hidden.insert(container.to_string());
        } else {
            self.hidden.remove(container);
        }
    }

    fn address(&self) -> Address {
        self.address.clone()
    }

    fn replace_address(&mut self, address: Address) {
        self.address = address;
    }

    fn navigate(&mut self, address: Address) {
        self.pending_navigation = Some(address);
    }

    fn focused(&self) -> Option<String> {
        self.focus.clone()
    }

    fn focus(&mut self, element: &str) {
        self.focus = Some(element.to_string());
    }
}

/// Display-ready fields of one listing card, with fallbacks applied.
///
/// Values are still raw text; templates escape them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub filename: String,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    /// Empty when the date is missing or invalid.
    pub date: String,
    pub thumbnail: String,
    pub href: String,
}

impl ListingEntry {
    pub fn from_record(record: &NewsletterRecord, config: &PressConfig, mode: ViewMode) -> Self {
        let meta = &record.meta;
        Self {
            filename: record.filename.clone(),
            title: record.display_title().to_string(),
            subtitle: meta.subtitle().unwrap_or_default().to_string(),
            author: meta
                .author()
                .unwrap_or(config.view.default_author.as_str())
                .to_string(),
            date: display_date(meta.date()),
            thumbnail: meta
                .thumbnail()
                .unwrap_or(config.paths.placeholder_thumbnail.as_str())
                .to_string(),
            href: article_address(config, mode, &Address::root(), &record.filename).to_string(),
        }
    }
}

/// The shareable address of an article.
///
/// Page mode points at the dedicated article page; overlay mode keeps the
/// current path.
pub fn article_address(
    config: &PressConfig,
    mode: ViewMode,
    current: &Address,
    filename: &str,
) -> Address {
    let base = match mode {
        ViewMode::Page => current.with_path(&config.view.article_page),
        ViewMode::Overlay => current.clone(),
    };
    base.with_param(&config.view.article_param, filename)
}

/// `date • author`, omitting the date when there is none.
fn byline(date: &str, author: &str) -> Markup {
    html! {
        @if !date.is_empty() {
            (Escaped(date)) " • "
        }
        (Escaped(author))
    }
}

pub fn render_card(entry: &ListingEntry) -> Markup {
    html! {
        article.news-card data-file=(Escaped(&entry.filename)) {
            a.news-link href=(Escaped(&entry.href)) {
                img.news-thumb src=(Escaped(&entry.thumbnail)) alt="" loading="lazy";
                div.news-body {
                    div.news-meta { (byline(&entry.date, &entry.author)) }
                    h3.news-title { (Escaped(&entry.title)) }
                    p.news-sub { (Escaped(&entry.subtitle)) }
                }
            }
        }
    }
}

pub fn render_listing(collection: &Collection, config: &PressConfig, mode: ViewMode) -> Markup {
    if collection.is_empty() {
        let hint = format!(
            "No newsletters found. Add .txt files to {} and list them in {}.",
            config.paths.documents, config.paths.manifest
        );
        return html! { p.empty-notice { (Escaped(&hint)) } };
    }
    html! {
        @for record in collection {
            (render_card(&ListingEntry::from_record(record, config, mode)))
        }
    }
}

/// Full article view: optional thumbnail, headings, byline, then the body.
pub fn render_article(
    record: &NewsletterRecord,
    config: &PressConfig,
    renderer: &BodyRenderer,
) -> Markup {
    let meta = &record.meta;
    let author = meta.author().unwrap_or(config.view.default_author.as_str());
    let date = display_date(meta.date());
    html! {
        @if let Some(thumbnail) = meta.thumbnail() {
            img.article-thumb src=(Escaped(thumbnail)) alt="";
        }
        h1 { (Escaped(record.display_title())) }
        div.lead { (Escaped(meta.subtitle().unwrap_or_default())) }
        div.news-meta { (byline(&date, author)) }
        hr;
        div.article-body { (renderer.render_body(&record.body)) }
    }
}

pub fn render_unavailable(filename: &str) -> Markup {
    html! {
        div.article-unavailable {
            p { "This newsletter could not be loaded." }
            p.article-file { code { (Escaped(filename)) } }
        }
    }
}

/// Drives one page session.
pub struct ViewController<'a> {
    config: &'a PressConfig,
    source: &'a dyn DocumentSource,
    renderer: &'a BodyRenderer,
    mode: ViewMode,
    collection: Collection,
    state: ViewState,
    restore_focus: Option<String>,
}

impl<'a> ViewController<'a> {
    pub fn new(
        config: &'a PressConfig,
        source: &'a dyn DocumentSource,
        renderer: &'a BodyRenderer,
        mode: ViewMode,
    ) -> Self {
        Self {
            config,
            source,
            renderer,
            mode,
            collection: Collection::default(),
            state: ViewState::List,
            restore_focus: None,
        }
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    /// Initial load: build the collection, mount the listing, and open the
    /// article named in the address, if any.
    pub async fn start(&mut self, host: &mut dyn RenderHost) {
        self.collection = load_collection(self.source, self.config).await;
        self.state = ViewState::List;

        let address = host.address();
        let requested = address
            .param(&self.config.view.article_param)
            .map(str::to_string);

        match (self.mode, requested) {
            (ViewMode::Page, Some(raw)) => {
                self.show_article(host, &raw).await;
            }
            (ViewMode::Overlay, Some(raw)) => {
                self.mount_listing(host);
                self.show_article(host, &raw).await;
            }
            (_, None) => self.mount_listing(host),
        }
    }

    /// List → Article for a selected listing entry.
    pub async fn select(&mut self, host: &mut dyn RenderHost, filename: &str) {
        match self.mode {
            ViewMode::Page => {
                let Some(filename) = sanitize_filename(filename) else {
                    tracing::debug!(filename, "ignoring selection of unsafe filename");
                    return;
                };
                let target = article_address(self.config, self.mode, &host.address(), &filename);
                host.navigate(target);
            }
            ViewMode::Overlay => self.show_article(host, filename).await,
        }
    }

    /// Article → List. Only the overlay can be closed; returns whether it was.
    pub fn close(&mut self, host: &mut dyn RenderHost) -> bool {
        if self.mode != ViewMode::Overlay || self.state == ViewState::List {
            return false;
        }
        host.set_hidden(ARTICLE_VIEW, true);
        host.replace_address(Address::root());
        if let Some(element) = self.restore_focus.take() {
            host.focus(&element);
        }
        self.state = ViewState::List;
        true
    }

    /// Escape closes an open overlay.
    pub fn handle_escape(&mut self, host: &mut dyn RenderHost) -> bool {
        self.close(host)
    }

    /// Resolve an untrusted filename and mount the article (or a notice).
    async fn show_article(&mut self, host: &mut dyn RenderHost, raw: &str) {
        let Some(filename) = sanitize_filename(raw) else {
            tracing::debug!(filename = raw, "rejected unsafe article filename");
            self.mount_article(host, raw, None);
            return;
        };

        let markup = match self.collection.find(&filename) {
            Some(record) => {
                tracing::debug!(%filename, "article resolved from collection");
                Some(render_article(record, self.config, self.renderer))
            }
            None => match load_record(self.source, self.config, &filename).await {
                Ok(record) => {
                    tracing::debug!(%filename, "article fetched directly");
                    Some(render_article(&record, self.config, self.renderer))
                }
                Err(e) => {
                    tracing::warn!(error = %e, "article unavailable");
                    None
                }
            },
        };
        self.mount_article(host, &filename, markup);
    }

    fn mount_article(&mut self, host: &mut dyn RenderHost, filename: &str, markup: Option<Markup>) {
        let available = markup.is_some();
        host.mount(
            ARTICLE_CONTENT,
            markup.unwrap_or_else(|| render_unavailable(filename)),
        );

        if self.mode == ViewMode::Overlay {
            if self.state == ViewState::List {
                self.restore_focus = host.focused();
            }
            host.set_hidden(ARTICLE_VIEW, false);
            host.focus(CLOSE_CONTROL);
            if available {
                let address = article_address(self.config, self.mode, &host.address(), filename);
                host.replace_address(address);
            }
        }

        self.state = ViewState::Article {
            filename: filename.to_string(),
            available,
        };
    }

    fn mount_listing(&self, host: &mut dyn RenderHost) {
        host.mount(
            LIST_CONTAINER,
            render_listing(&self.collection, self.config, self.mode),
        );
    }
}
