//! The Guardian search results.

use super::{DatePolicy, SourceAdapter};

pub const ADAPTER: SourceAdapter = SourceAdapter {
    name: "The Guardian",
    base_origin: "https://www.theguardian.com",
    containers: &[".fc-item", ".search-results__item", ".u-faux-block-link"],
    titles: &["h2", "h3", ".fc-item__title"],
    links: &["a[href]"],
    dates: &["time", ".fc-item__timestamp"],
    date_policy: DatePolicy::Unset,
    article_hints: &["/article/"],
};
