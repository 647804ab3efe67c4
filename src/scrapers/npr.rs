//! NPR search results.

use super::{DatePolicy, SourceAdapter};

pub const ADAPTER: SourceAdapter = SourceAdapter {
    name: "NPR",
    base_origin: "https://www.npr.org",
    containers: &[".item-info", ".result-item", ".stories-list article"],
    titles: &["h2", "h3", ".title"],
    links: &["a[href]"],
    dates: &["time", ".date"],
    date_policy: DatePolicy::Unset,
    article_hints: &["/story/", "/20"],
};
