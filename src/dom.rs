//! Thin typed wrapper over the `scraper` HTML tree.
//!
//! Queries never fail: an invalid selector or a missing element yields an empty
//! result, and attribute lookups return `Option`. The extraction chains rely on
//! this to treat structural absence as "no result".

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

/// A parsed HTML document.
pub struct Document {
    html: Html,
}

/// A borrowed element inside a [`Document`].
#[derive(Clone, Copy)]
pub struct Element<'a> {
    inner: ElementRef<'a>,
}

impl Document {
    /// Parse raw document text. HTML parsing is error-tolerant and always succeeds.
    pub fn parse(text: &str) -> Self {
        Self {
            html: Html::parse_document(text),
        }
    }

    /// All elements matching `selector`, in document order.
    pub fn query(&self, selector: &str) -> Vec<Element<'_>> {
        match Selector::parse(selector) {
            Ok(sel) => self.html.select(&sel).map(Element::wrap).collect(),
            Err(e) => {
                debug!(%selector, error = %e, "Invalid selector; treating as no match");
                Vec::new()
            }
        }
    }

    /// First element matching `selector`.
    pub fn first(&self, selector: &str) -> Option<Element<'_>> {
        let sel = Selector::parse(selector).ok()?;
        self.html.select(&sel).next().map(Element::wrap)
    }
}

impl<'a> Element<'a> {
    fn wrap(inner: ElementRef<'a>) -> Self {
        Self { inner }
    }

    /// Attribute value, if present.
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.inner.value().attr(name)
    }

    /// Concatenated descendant text, trimmed.
    pub fn text(&self) -> String {
        self.inner.text().collect::<String>().trim().to_string()
    }

    /// Local tag name, lowercase.
    pub fn tag(&self) -> &'a str {
        self.inner.value().name()
    }

    /// True if any class token contains `needle`, compared case-insensitively.
    pub fn class_contains(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.inner
            .value()
            .classes()
            .any(|class| class.to_lowercase().contains(&needle))
    }

    /// First descendant (excluding self) satisfying `pred`, in document order.
    pub fn find_descendant<F>(&self, pred: F) -> Option<Element<'a>>
    where
        F: Fn(&Element<'a>) -> bool,
    {
        self.inner
            .descendants()
            .skip(1)
            .filter_map(ElementRef::wrap)
            .map(Element::wrap)
            .find(|el| pred(el))
    }
}
