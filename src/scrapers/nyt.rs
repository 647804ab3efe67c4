//! New York Times search results.
//!
//! The generated `css-*` class names change with every front-end deploy, so
//! the stable `data-testid` hooks are kept at the end of each list.

use super::{DatePolicy, SourceAdapter};

pub const ADAPTER: SourceAdapter = SourceAdapter {
    name: "The New York Times",
    base_origin: "https://www.nytimes.com",
    containers: &[
        ".css-1i8vfl5",
        ".css-1l4w6pd",
        "[data-testid='search-bodega-result']",
    ],
    titles: &["h4", "[data-testid='headline']"],
    links: &["a[href]"],
    dates: &["time", "[data-testid='publication-date']"],
    date_policy: DatePolicy::Unset,
    article_hints: &["/20", "/article/"],
};
