//! AP News search results.
//!
//! AP has shipped at least three card layouts; the newest is tried first.

use super::{DatePolicy, SourceAdapter};

pub const ADAPTER: SourceAdapter = SourceAdapter {
    name: "AP News",
    base_origin: "https://apnews.com",
    containers: &[".CardList-items > div", ".PagePromo", "[data-key='card']"],
    titles: &[
        ".CardHeadline h3",
        ".PagePromo-title",
        "h3.Component-headline",
        "h2",
        "h3",
    ],
    links: &["a[href]"],
    dates: &[
        "time",
        ".PagePromo-timestamp",
        ".CardTime-time",
        "[data-key='timestamp']",
    ],
    date_policy: DatePolicy::Unset,
    article_hints: &["/article/"],
};
