//! note.com scraping in two phases.
//!
//! 1. **Harvesting** ([`harvest`]): read listing pages and collect unique
//!    article URLs with the card title as a seed
//! 2. **Details** ([`details`]): fetch each article page and merge the
//!    extracted fields into its record
//!
//! # Listing Markup
//!
//! | Layout | Anchor selector | Notes |
//! |--------|-----------------|-------|
//! | Search cards | `a.a-link`, `a.m-largeNoteWrapper__link`, `a.fn` | Tried first |
//! | Anything else | `a[href*='/n/']` | Used only when no card anchor exists |
//!
//! Failed fetches never stop a run: listing pages are skipped, article pages
//! become degraded records.

pub mod details;
pub mod harvest;
