//! Reuters search results.

use super::{DatePolicy, SourceAdapter};

pub const ADAPTER: SourceAdapter = SourceAdapter {
    name: "Reuters",
    base_origin: "https://www.reuters.com",
    containers: &[
        "li.search-result",
        ".search-result__list-item",
        "[data-testid='search-result']",
        ".media-story-card",
    ],
    titles: &[
        "h3.search-result-title",
        "[data-testid='heading']",
        "h3",
        ".media-story-card__heading",
    ],
    links: &["a[href]"],
    dates: &["time", ".media-story-card__datetime"],
    date_policy: DatePolicy::Unset,
    article_hints: &["/world/"],
};
