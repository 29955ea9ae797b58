//! Full HTML documents around the view containers.
//!
//! [`ViewController`](crate::view::ViewController) only fills named
//! containers. This module wraps whatever a [`MemoryHost`] holds into a
//! complete page so the CLI can emit something a browser can open.
//!
//! ## Layouts
//!
//! - **Listing** (both modes): header plus `#news-list`. In overlay mode the
//!   hidden-or-shown `#article-view` dialog follows the grid.
//! - **Article page** (page mode with `?article=`): header, a link back to
//!   the listing, then `#article-content`.
//!
//! Container contents come out of maud templates already escaped, so they
//! are inserted as-is. Styles are embedded from `static/style.css`.

use maud::{DOCTYPE, Markup, PreEscaped, html};

use crate::config::PressConfig;
use crate::view::{
    ARTICLE_CONTENT, ARTICLE_VIEW, CLOSE_CONTROL, LIST_CONTAINER, MemoryHost, ViewMode,
};

const CSS: &str = include_str!("../static/style.css");

/// Render the host's current contents as a standalone document.
pub fn render_document(config: &PressConfig, mode: ViewMode, host: &MemoryHost) -> Markup {
    let site_title = config.view.site_title.as_str();
    let content = match (mode, host.container(LIST_CONTAINER)) {
        (ViewMode::Page, None) => article_page(host),
        (ViewMode::Page, Some(list)) => listing(list),
        (ViewMode::Overlay, list) => html! {
            (listing(list.unwrap_or_default()))
            (overlay(host))
        },
    };
    let body = html! {
        (site_header(site_title))
        main { (content) }
    };
    base_document(site_title, body)
}

fn base_document(title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(CSS)) }
            }
            body {
                (content)
            }
        }
    }
}

fn site_header(title: &str) -> Markup {
    html! {
        header.site-header {
            a href="/" { (title) }
        }
    }
}

fn listing(list: &str) -> Markup {
    html! {
        section.news-grid id=(LIST_CONTAINER) {
            (PreEscaped(list))
        }
    }
}

fn overlay(host: &MemoryHost) -> Markup {
    html! {
        div.article-overlay id=(ARTICLE_VIEW) role="dialog" aria-modal="true"
            hidden[host.is_hidden(ARTICLE_VIEW)] {
            div.article-panel {
                button.close-article id=(CLOSE_CONTROL) type="button" aria-label="Close" { "×" }
                article id=(ARTICLE_CONTENT) {
                    (PreEscaped(host.container(ARTICLE_CONTENT).unwrap_or_default()))
                }
            }
        }
    }
}

fn article_page(host: &MemoryHost) -> Markup {
    html! {
        div.article-page {
            a.back-link href="/" { "← All newsletters" }
            article id=(ARTICLE_CONTENT) {
                (PreEscaped(host.container(ARTICLE_CONTENT).unwrap_or_default()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::{Address, RenderHost};

    fn host_with(list: Option<&str>, article: Option<&str>) -> MemoryHost {
        let mut host = MemoryHost::new(Address::root());
        if let Some(list) = list {
            host.mount(LIST_CONTAINER, PreEscaped(list.to_string()));
        }
        if let Some(article) = article {
            host.mount(ARTICLE_CONTENT, PreEscaped(article.to_string()));
        }
        host
    }

    #[test]
    fn listing_document_has_shell_and_list() {
        let config = PressConfig::default();
        let host = host_with(Some("<article class=\"news-card\"></article>"), None);
        let html = render_document(&config, ViewMode::Page, &host).into_string();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Newsletters</title>"));
        assert!(html.contains("id=\"news-list\""));
        assert!(html.contains("<article class=\"news-card\"></article>"));
        assert!(!html.contains("id=\"article-view\""));
        assert!(html.contains(".news-grid"));
    }

    #[test]
    fn page_mode_article_document() {
        let config = PressConfig::default();
        let host = host_with(None, Some("<h1>Hello</h1>"));
        let html = render_document(&config, ViewMode::Page, &host).into_string();

        assert!(html.contains("All newsletters"));
        assert!(html.contains("<h1>Hello</h1>"));
        assert!(!html.contains("id=\"news-list\""));
    }

    #[test]
    fn overlay_hidden_until_opened() {
        let config = PressConfig::default();
        let mut host = host_with(Some(""), None);
        let closed = render_document(&config, ViewMode::Overlay, &host).into_string();
        assert!(closed.contains("id=\"article-view\""));
        assert!(closed.contains("aria-modal=\"true\" hidden>"));

        host.mount(ARTICLE_CONTENT, PreEscaped("<h1>Open</h1>".to_string()));
        host.set_hidden(ARTICLE_VIEW, false);
        let open = render_document(&config, ViewMode::Overlay, &host).into_string();
        assert!(!open.contains("aria-modal=\"true\" hidden>"));
        assert!(open.contains("<h1>Open</h1>"));
        assert!(open.contains("id=\"close-article\""));
    }

    #[test]
    fn site_title_is_escaped() {
        let mut config = PressConfig::default();
        config.view.site_title = "<Daily>".to_string();
        let host = host_with(Some(""), None);
        let html = render_document(&config, ViewMode::Page, &host).into_string();
        assert!(html.contains("<title>&lt;Daily&gt;</title>"));
    }
}
