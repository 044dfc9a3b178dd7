//! Ordered fallback extraction over a single detail document.
//!
//! Every field of an [`ArticleRecord`](crate::models::ArticleRecord) is produced
//! by a [`FieldChain`]: a table of strategies tried in priority order, the first
//! non-empty result winning. A strategy that finds nothing simply yields `None`;
//! it can never abort the rest of its chain or any other chain.
//!
//! # Strategy kinds
//!
//! | Kind | Output | Reads |
//! |------|--------|-------|
//! | [`Probe`] | `String` | element text, attribute, URL or search seed |
//! | [`ListProbe`] | `Vec<String>` | texts of all matching elements |
//!
//! The concrete chains live in [`fields`].

pub mod fields;

use crate::dom::Document;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

pub use fields::{extract_from_html, inspect_fields};

static FIRST_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());
static SITE_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*[|｜].*$").unwrap());

/// Everything a strategy may look at.
pub struct ExtractionContext<'a> {
    /// The parsed detail page.
    pub document: &'a Document,
    /// Canonical URL the page was fetched from.
    pub url: &'a str,
    /// Title seen on the search page, if any.
    pub seed_title: Option<&'a str>,
}

/// A single step of a field chain.
pub trait Strategy {
    type Output;

    /// Short label used in logs and inspect output.
    fn name(&self) -> &'static str;

    /// Evaluate against one document. `None` means "try the next strategy".
    fn apply(&self, ctx: &ExtractionContext<'_>) -> Option<Self::Output>;
}

/// Where a scalar strategy reads its raw value from.
#[derive(Debug, Clone)]
pub enum Source {
    /// Text of the first element matching the selector.
    Text(&'static str),
    /// Text of the first matching element whose text is non-empty.
    FirstNonEmptyText(&'static str),
    /// Attribute of the first element matching the selector.
    Attr {
        selector: &'static str,
        attr: &'static str,
    },
    /// First capture group of a pattern applied to the page URL.
    UrlCapture(&'static Lazy<Regex>),
    /// Last path segment of the page URL.
    UrlSlug,
    /// Title seen on the search page.
    SeedTitle,
}

/// Post-processing applied to a raw value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    Identity,
    /// Drop a trailing `| site` or `｜ site` suffix.
    StripSiteSuffix,
    /// Keep only the first run of ASCII digits.
    FirstDigits,
    /// Hyphens and underscores to spaces, literal `n` removed.
    SlugToWords,
    /// Reject the value when it equals the given string.
    RejectIfEquals(&'static str),
}

/// Scalar strategy: a source plus a transform.
#[derive(Debug, Clone)]
pub struct Probe {
    pub name: &'static str,
    pub source: Source,
    pub transform: Transform,
}

/// List strategy: trimmed texts of matching elements, empties dropped.
///
/// With `limit`, only the first `limit` matched elements are considered.
#[derive(Debug, Clone)]
pub struct ListProbe {
    pub name: &'static str,
    pub selector: &'static str,
    pub limit: Option<usize>,
    /// Restrict matches to elements with a class token containing this string.
    pub class_hint: Option<&'static str>,
}

impl Probe {
    pub fn new(name: &'static str, source: Source) -> Self {
        Self {
            name,
            source,
            transform: Transform::Identity,
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    fn raw(&self, ctx: &ExtractionContext<'_>) -> Option<String> {
        match &self.source {
            Source::Text(selector) => ctx.document.first(selector).map(|el| el.text()),
            Source::FirstNonEmptyText(selector) => ctx
                .document
                .query(selector)
                .into_iter()
                .map(|el| el.text())
                .find(|text| !text.is_empty()),
            Source::Attr { selector, attr } => ctx
                .document
                .first(selector)
                .and_then(|el| el.attr(attr).map(str::to_string)),
            Source::UrlCapture(pattern) => pattern
                .captures(ctx.url)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string()),
            Source::UrlSlug => ctx.url.rsplit('/').next().map(str::to_string),
            Source::SeedTitle => ctx.seed_title.map(str::to_string),
        }
    }
}

impl Transform {
    pub fn apply(self, value: String) -> Option<String> {
        match self {
            Transform::Identity => Some(value),
            Transform::StripSiteSuffix => Some(SITE_SUFFIX.replace(&value, "").into_owned()),
            Transform::FirstDigits => FIRST_DIGITS.find(&value).map(|m| m.as_str().to_string()),
            Transform::SlugToWords => Some(value.replace(['-', '_'], " ").replace('n', "")),
            Transform::RejectIfEquals(rejected) => (value != rejected).then_some(value),
        }
    }
}

impl Strategy for Probe {
    type Output = String;

    fn name(&self) -> &'static str {
        self.name
    }

    fn apply(&self, ctx: &ExtractionContext<'_>) -> Option<String> {
        let raw = self.raw(ctx)?;
        let value = self.transform.apply(raw.trim().to_string())?;
        let value = value.trim();
        (!value.is_empty()).then(|| value.to_string())
    }
}

impl ListProbe {
    pub fn new(name: &'static str, selector: &'static str) -> Self {
        Self {
            name,
            selector,
            limit: None,
            class_hint: None,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_class_hint(mut self, hint: &'static str) -> Self {
        self.class_hint = Some(hint);
        self
    }
}

impl Strategy for ListProbe {
    type Output = Vec<String>;

    fn name(&self) -> &'static str {
        self.name
    }

    fn apply(&self, ctx: &ExtractionContext<'_>) -> Option<Vec<String>> {
        let matched = ctx
            .document
            .query(self.selector)
            .into_iter()
            .filter(|el| self.class_hint.is_none_or(|hint| el.class_contains(hint)));
        let texts: Vec<String> = matched
            .take(self.limit.unwrap_or(usize::MAX))
            .map(|el| el.text())
            .filter(|text| !text.is_empty())
            .collect();
        (!texts.is_empty()).then_some(texts)
    }
}

/// An ordered list of strategies for one field.
pub struct FieldChain<S> {
    field: &'static str,
    strategies: Vec<S>,
}

/// One strategy's individual result, reported by [`FieldChain::trace`].
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyOutcome<T> {
    pub strategy: &'static str,
    pub value: Option<T>,
}

impl<S: Strategy> FieldChain<S> {
    pub fn new(field: &'static str, strategies: Vec<S>) -> Self {
        Self { field, strategies }
    }

    pub fn field(&self) -> &'static str {
        self.field
    }

    /// First strategy result, in priority order.
    pub fn evaluate(&self, ctx: &ExtractionContext<'_>) -> Option<S::Output> {
        for strategy in &self.strategies {
            if let Some(value) = strategy.apply(ctx) {
                debug!(field = self.field, strategy = strategy.name(), url = ctx.url, "Strategy matched");
                return Some(value);
            }
        }
        debug!(field = self.field, url = ctx.url, "No strategy matched");
        None
    }

    /// Evaluate every strategy, without stopping at the first hit.
    pub fn trace(&self, ctx: &ExtractionContext<'_>) -> Vec<StrategyOutcome<S::Output>> {
        self.strategies
            .iter()
            .map(|strategy| StrategyOutcome {
                strategy: strategy.name(),
                value: strategy.apply(ctx),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx<'a>(document: &'a Document, url: &'a str) -> ExtractionContext<'a> {
        ExtractionContext {
            document,
            url,
            seed_title: None,
        }
    }

    #[test]
    fn test_strip_site_suffix() {
        let strip = |s: &str| Transform::StripSiteSuffix.apply(s.to_string()).unwrap();
        assert_eq!(strip("Example Title | note"), "Example Title");
        assert_eq!(strip("生成AIの話｜山田｜note"), "生成AIの話");
        assert_eq!(strip("No suffix here"), "No suffix here");
    }

    #[test]
    fn test_first_digits() {
        assert_eq!(Transform::FirstDigits.apply("♡ 42 likes 7".into()), Some("42".into()));
        assert_eq!(Transform::FirstDigits.apply("none".into()), None);
    }

    #[test]
    fn test_slug_to_words_drops_n() {
        assert_eq!(
            Transform::SlugToWords.apply("my-new_post".into()),
            Some("my ew post".into())
        );
    }

    #[test]
    fn test_reject_if_equals() {
        assert_eq!(Transform::RejectIfEquals("note").apply("note".into()), None);
        assert_eq!(
            Transform::RejectIfEquals("note").apply("alice".into()),
            Some("alice".into())
        );
    }

    #[test]
    fn test_value_is_trimmed_before_transform() {
        let doc = Document::parse(r#"<meta property="og:site_name" content=" note ">"#);
        let c = ctx(&doc, "https://example.com/x");
        let probe = Probe::new(
            "site name",
            Source::Attr {
                selector: "meta[property='og:site_name']",
                attr: "content",
            },
        )
        .with_transform(Transform::RejectIfEquals("note"));
        assert_eq!(probe.apply(&c), None);
    }

    #[test]
    fn test_empty_text_is_no_result() {
        let doc = Document::parse("<h1>   </h1><h1>Second</h1>");
        let c = ctx(&doc, "https://note.com/x");
        assert_eq!(Probe::new("h1", Source::Text("h1")).apply(&c), None);
        assert_eq!(
            Probe::new("h1 any", Source::FirstNonEmptyText("h1")).apply(&c),
            Some("Second".to_string())
        );
    }

    #[test]
    fn test_chain_priority_and_trace() {
        let doc = Document::parse(r#"<p class="a">alpha</p><p class="b">beta</p>"#);
        let c = ctx(&doc, "https://note.com/x");
        let chain = FieldChain::new(
            "demo",
            vec![
                Probe::new("missing", Source::Text("p.zzz")),
                Probe::new("b", Source::Text("p.b")),
                Probe::new("a", Source::Text("p.a")),
            ],
        );
        assert_eq!(chain.evaluate(&c), Some("beta".to_string()));

        let trace = chain.trace(&c);
        assert_eq!(trace.len(), 3);
        assert_eq!(trace[0].value, None);
        assert_eq!(trace[2].value.as_deref(), Some("alpha"));
    }

    #[test]
    fn test_list_probe_limit_applies_before_empty_filter() {
        let doc = Document::parse("<p>one</p><p> </p><p>three</p><p>four</p>");
        let c = ctx(&doc, "https://note.com/x");
        let probe = ListProbe::new("p", "p").with_limit(3);
        assert_eq!(probe.apply(&c), Some(vec!["one".to_string(), "three".to_string()]));
    }

    #[test]
    fn test_list_probe_empty_is_none() {
        let doc = Document::parse("<p></p>");
        let c = ctx(&doc, "https://note.com/x");
        assert_eq!(ListProbe::new("p", "p").apply(&c), None);
        assert_eq!(ListProbe::new("span", "span").apply(&c), None);
    }
}
