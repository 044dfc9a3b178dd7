//! The six note.com field chains.
//!
//! Each chain lists more specific selectors before generic ones. Selectors
//! track the markup variants seen on note.com article pages; when the site
//! drifts, new variants go at the front of the relevant table.

use super::{ExtractionContext, FieldChain, ListProbe, Probe, Source, Strategy, Transform};
use crate::dom::Document;
use crate::models::{AUTHOR_UNKNOWN, ExtractedFields, LIKES_DEFAULT, TITLE_UNKNOWN};
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{info, instrument};

/// Site name the platform puts in `og:site_name`; never an author.
const PLATFORM_BRAND: &str = "note";

static AUTHOR_FROM_URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"note\.com/([^/]+)").unwrap());

/// Paragraph containers tried for the preview, most specific first.
const PREVIEW_SELECTORS: [(&str, &str); 3] = [
    ("note body", "div.note-common-styles__textnote-body p"),
    ("styled text", "div[class*='styles__text'] p"),
    ("article paragraph", "article p"),
];

const PREVIEW_PARAGRAPHS: usize = 3;

/// Header class, `og:title`, `<title>` (both minus the site suffix), any `h1`, URL slug, search seed.
pub fn title_chain() -> FieldChain<Probe> {
    FieldChain::new(
        "title",
        vec![
            Probe::new("header title", Source::Text("h1.o-noteContentHeader__title")),
            Probe::new(
                "og:title",
                Source::Attr {
                    selector: "meta[property='og:title']",
                    attr: "content",
                },
            )
            .with_transform(Transform::StripSiteSuffix),
            Probe::new("title element", Source::Text("title"))
                .with_transform(Transform::StripSiteSuffix),
            Probe::new("any h1", Source::FirstNonEmptyText("h1")),
            Probe::new("url slug", Source::UrlSlug).with_transform(Transform::SlugToWords),
            Probe::new("search seed", Source::SeedTitle),
        ],
    )
}

/// `data-note-user-name`, the user segment of the URL, then `og:site_name` unless it is the brand.
pub fn author_chain() -> FieldChain<Probe> {
    FieldChain::new(
        "author",
        vec![
            Probe::new(
                "user-name attribute",
                Source::Attr {
                    selector: "a[data-note-user-name]",
                    attr: "data-note-user-name",
                },
            ),
            Probe::new("url segment", Source::UrlCapture(&AUTHOR_FROM_URL)),
            Probe::new(
                "og:site_name",
                Source::Attr {
                    selector: "meta[property='og:site_name']",
                    attr: "content",
                },
            )
            .with_transform(Transform::RejectIfEquals(PLATFORM_BRAND)),
        ],
    )
}

/// `datetime` of the first `<time>` element.
pub fn published_date_chain() -> FieldChain<Probe> {
    FieldChain::new(
        "published_date",
        vec![Probe::new(
            "time datetime",
            Source::Attr {
                selector: "time",
                attr: "datetime",
            },
        )],
    )
}

/// Like-count attribute, header attachment, then any like/heart element; first digit run of each.
pub fn likes_chain() -> FieldChain<Probe> {
    FieldChain::new(
        "likes",
        vec![
            Probe::new(
                "like-count attribute",
                Source::Attr {
                    selector: "button[data-like-count]",
                    attr: "data-like-count",
                },
            )
            .with_transform(Transform::FirstDigits),
            Probe::new(
                "header attachment",
                Source::Text(".o-noteContentHeader__titleAttachment"),
            )
            .with_transform(Transform::FirstDigits),
            Probe::new(
                "like/heart class",
                Source::Text(
                    "span[class*='like'], div[class*='like'], span[class*='heart'], div[class*='heart']",
                ),
            )
            .with_transform(Transform::FirstDigits),
        ],
    )
}

/// Hashtag links, else `a`/`span` elements with a `tag` class.
pub fn tags_chain() -> FieldChain<ListProbe> {
    FieldChain::new(
        "tags",
        vec![
            ListProbe::new("hashtag links", "a[href^='/hashtag/']"),
            ListProbe::new("tag class", "a, span").with_class_hint("tag"),
        ],
    )
}

/// First three paragraphs of the most specific body container present.
pub fn preview_chain() -> FieldChain<ListProbe> {
    FieldChain::new(
        "content_preview",
        PREVIEW_SELECTORS
            .into_iter()
            .map(|(name, selector)| ListProbe::new(name, selector).with_limit(PREVIEW_PARAGRAPHS))
            .collect(),
    )
}

/// Run all six chains against one document and apply terminal fallbacks.
#[instrument(level = "debug", skip_all, fields(url = %ctx.url))]
pub fn extract_fields(ctx: &ExtractionContext<'_>) -> ExtractedFields {
    ExtractedFields {
        title: title_chain()
            .evaluate(ctx)
            .unwrap_or_else(|| TITLE_UNKNOWN.to_string()),
        author: author_chain()
            .evaluate(ctx)
            .unwrap_or_else(|| AUTHOR_UNKNOWN.to_string()),
        published_date: published_date_chain().evaluate(ctx),
        like_count: likes_chain()
            .evaluate(ctx)
            .unwrap_or_else(|| LIKES_DEFAULT.to_string()),
        tags: tags_chain().evaluate(ctx).unwrap_or_default(),
        content_preview: preview_chain()
            .evaluate(ctx)
            .map(|paragraphs| paragraphs.join("\n"))
            .unwrap_or_default(),
    }
}

/// Log every strategy's individual result for one page.
///
/// Used by `--inspect` to see which markup variants a page still carries.
pub fn inspect_fields(ctx: &ExtractionContext<'_>) {
    fn report<S: Strategy>(chain: &FieldChain<S>, ctx: &ExtractionContext<'_>, show: impl Fn(&S::Output) -> String) {
        for outcome in chain.trace(ctx) {
            let value = outcome.value.as_ref().map(&show);
            info!(
                field = chain.field(),
                strategy = outcome.strategy,
                matched = value.is_some(),
                value = value.as_deref().unwrap_or("-"),
                "Strategy result"
            );
        }
    }

    let list = |items: &Vec<String>| items.iter().join(" / ");
    report(&title_chain(), ctx, String::clone);
    report(&author_chain(), ctx, String::clone);
    report(&published_date_chain(), ctx, String::clone);
    report(&likes_chain(), ctx, String::clone);
    report(&tags_chain(), ctx, list);
    report(&preview_chain(), ctx, list);

    let fields = extract_fields(ctx);
    info!(?fields, "Merged result");
}

/// Parse `body` and extract every field for `url`.
pub fn extract_from_html(body: &str, url: &str, seed_title: Option<&str>) -> ExtractedFields {
    let document = Document::parse(body);
    let ctx = ExtractionContext {
        document: &document,
        url,
        seed_title,
    };
    extract_fields(&ctx)
}
