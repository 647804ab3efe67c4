//! Al Jazeera search results.

use super::{DatePolicy, SourceAdapter};

pub const ADAPTER: SourceAdapter = SourceAdapter {
    name: "Al Jazeera",
    base_origin: "https://www.aljazeera.com",
    containers: &[".gc__content", ".article-card"],
    titles: &["h3", ".gc__title"],
    links: &["a[href]"],
    dates: &["time", ".date-simple"],
    date_policy: DatePolicy::Unset,
    article_hints: &["/news/", "/20"],
};
