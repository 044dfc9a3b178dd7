//! Link harvesting from note.com listing pages.
//!
//! Turns one search-results (or hashtag listing) document into article
//! [`Candidate`]s. The transform is pure: the accumulated URL set is read,
//! never written, so the caller decides when a candidate becomes part of the
//! crawl.

use crate::dom::{Document, Element};
use crate::models::Candidate;
use std::collections::HashSet;
use tracing::{debug, instrument};
use url::Url;

/// Anchor classes used by the known search-result card layouts.
const CARD_ANCHORS: &str = "a.a-link, a.m-largeNoteWrapper__link, a.fn";

/// Path marker every article URL carries.
const ARTICLE_PATH_MARKER: &str = "/n/";

/// The links found on one listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Harvest {
    /// Anchors matched before exclusion and dedup; zero means the listing is exhausted.
    pub anchors_found: usize,
    /// New candidates in document order.
    pub candidates: Vec<Candidate>,
}

impl Harvest {
    pub fn is_exhausted(&self) -> bool {
        self.anchors_found == 0
    }
}

/// True for hrefs that never lead to an article.
pub fn is_excluded(href: &str) -> bool {
    href == "#" || href.contains("help-note.com") || href.contains("search?")
}

/// Extract new candidates from a listing page.
///
/// Card anchors are tried first; only if none exist does every anchor whose
/// href contains `/n/` qualify. Hrefs are resolved against `base`, excluded
/// patterns dropped, and URLs present in `seen` (or repeated on the page)
/// skipped.
#[instrument(level = "debug", skip_all, fields(base = %base))]
pub fn harvest_links(document: &Document, base: &Url, seen: &HashSet<String>) -> Harvest {
    let mut anchors = document.query(CARD_ANCHORS);
    if anchors.is_empty() {
        anchors = document
            .query("a[href]")
            .into_iter()
            .filter(|a| a.attr("href").is_some_and(|h| h.contains(ARTICLE_PATH_MARKER)))
            .collect();
    }

    let anchors_found = anchors.len();
    let mut page_seen: HashSet<String> = HashSet::new();
    let mut candidates = Vec::new();

    for anchor in anchors {
        let Some(href) = anchor.attr("href") else {
            continue;
        };
        if is_excluded(href) {
            debug!(%href, "Skipping excluded link");
            continue;
        }
        let url = match base.join(href) {
            Ok(resolved) => resolved.to_string(),
            Err(e) => {
                debug!(%href, error = %e, "Skipping unresolvable link");
                continue;
            }
        };
        if seen.contains(&url) || !page_seen.insert(url.clone()) {
            continue;
        }
        candidates.push(Candidate {
            url,
            title_hint: title_hint(&anchor),
        });
    }

    debug!(anchors_found, new = candidates.len(), "Harvested listing page");
    Harvest {
        anchors_found,
        candidates,
    }
}

/// Card title: a nested `h3`, else a nested element with a `title` class.
fn title_hint(anchor: &Element<'_>) -> String {
    anchor
        .find_descendant(|el| el.tag() == "h3")
        .or_else(|| anchor.find_descendant(|el| el.class_contains("title")))
        .map(|el| el.text())
        .unwrap_or_default()
}
