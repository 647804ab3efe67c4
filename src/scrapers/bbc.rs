//! BBC search results.
//!
//! BBC search cards frequently carry no timestamp; such results are assumed
//! to be a day old so they still sort among dated ones.

use super::{DatePolicy, SourceAdapter};

pub const ADAPTER: SourceAdapter = SourceAdapter {
    name: "BBC",
    base_origin: "https://www.bbc.co.uk",
    containers: &[
        ".ssrcss-1020bd1-Stack",
        ".ssrcss-1krxqkx-Stack",
        "[data-testid='search-result']",
        ".gs-c-promo",
    ],
    titles: &["h3", ".gs-c-promo-heading__title", "[data-testid='title']"],
    links: &["a[href]"],
    dates: &["time", "[data-testid='timestamp']"],
    date_policy: DatePolicy::AssumeDaysOld(1),
    article_hints: &["/news/"],
};
