//! Read-only view over parsed page markup.
//!
//! Detectors work against the [`PageDocument`] capability instead of a
//! concrete parsing library, so they stay pure functions over the page.

use rustc_hash::FxHashMap;
use scraper::{Html, Selector};
use std::sync::LazyLock;

static SCRIPT_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("script").unwrap());

/// Parsed page markup, owned by a single extraction call.
pub trait PageDocument {
    /// First element matching the CSS selector, as a detached snapshot.
    fn select_first(&self, selector: &str) -> Option<PageElement>;

    /// Text content of every inline `<script>` block, in document order.
    fn scripts(&self) -> Vec<String>;
}

/// Attribute snapshot of a matched element, detached from the tree.
#[derive(Debug, Clone)]
pub struct PageElement {
    attrs: FxHashMap<String, String>,
}

impl PageElement {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }
}

/// `scraper`-backed [`PageDocument`] implementation.
///
/// The underlying tree is not `Send`; keep instances inside synchronous
/// sections and never hold one across an await point.
pub struct ScraperPage {
    html: Html,
}

impl ScraperPage {
    pub fn parse(markup: &str) -> Self {
        Self {
            html: Html::parse_document(markup),
        }
    }
}

impl PageDocument for ScraperPage {
    fn select_first(&self, selector: &str) -> Option<PageElement> {
        let selector = Selector::parse(selector).ok()?;
        self.html.select(&selector).next().map(|element| PageElement {
            attrs: element
                .value()
                .attrs()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
        })
    }

    fn scripts(&self) -> Vec<String> {
        self.html
            .select(&SCRIPT_SELECTOR)
            .map(|element| element.text().collect::<String>())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{PageDocument, ScraperPage};

    #[test]
    fn test_select_first_snapshots_attributes() {
        let page = ScraperPage::parse(
            r#"<video><source type="video/mp4" src="https://host/a.mp4"></video>"#,
        );
        let element = page.select_first(r#"source[type="video/mp4"]"#).unwrap();
        assert_eq!(element.attr("src"), Some("https://host/a.mp4"));
        assert_eq!(element.attr("missing"), None);
    }

    #[test]
    fn test_select_first_no_match() {
        let page = ScraperPage::parse("<p>nothing here</p>");
        assert!(page.select_first(r#"div[data-vimeo-id]"#).is_none());
    }

    #[test]
    fn test_scripts_in_document_order() {
        let page = ScraperPage::parse(
            "<script>first();</script><div></div><script>second();</script>",
        );
        let scripts = page.scripts();
        assert_eq!(scripts, vec!["first();".to_string(), "second();".to_string()]);
    }
}
