//! CNN search results.
//!
//! Results sit in `.cnn-search__result` blocks with relative links that
//! resolve to URLs like `https://www.cnn.com/2025/05/06/politics/article-slug`.

use super::{DatePolicy, SourceAdapter};

pub const ADAPTER: SourceAdapter = SourceAdapter {
    name: "CNN",
    base_origin: "https://www.cnn.com",
    containers: &[".cnn-search__result", ".cnn-search__result-contents"],
    titles: &["h3", ".cnn-search__result-headline"],
    links: &["a[href]"],
    dates: &["time", ".cnn-search__result-publish-date"],
    date_policy: DatePolicy::Unset,
    article_hints: &["/20", "/article/"],
};
