//! Merging candidates from every source into one ordered list.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::models::ArticleCandidate;

/// Orderings the caller can switch between after a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Relevance descending, newer first among ties.
    #[default]
    Relevance,
    /// Newest first. Undated candidates go last.
    Date,
    /// Source name ascending, relevance descending inside each source.
    Source,
}

/// Newest first with undated candidates after every dated one.
fn by_date_desc(a: &ArticleCandidate, b: &ArticleCandidate) -> Ordering {
    match (a.date(), b.date()) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn by_relevance_desc(a: &ArticleCandidate, b: &ArticleCandidate) -> Ordering {
    b.relevance().cmp(&a.relevance())
}

/// Sort in place. Sorting is stable so equal keys keep source order.
pub fn sort_candidates(items: &mut [ArticleCandidate], key: SortKey) {
    match key {
        SortKey::Relevance => {
            items.sort_by(|a, b| by_relevance_desc(a, b).then_with(|| by_date_desc(a, b)))
        }
        SortKey::Date => items.sort_by(by_date_desc),
        SortKey::Source => items.sort_by(|a, b| {
            a.source()
                .cmp(b.source())
                .then_with(|| by_relevance_desc(a, b))
        }),
    }
}

/// The merged result list of one session.
///
/// Duplicates reported by different sources are all kept.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RankedResults {
    sort: SortKey,
    items: Vec<ArticleCandidate>,
}

impl RankedResults {
    /// Merge `items` (already in source order) and apply the default
    /// relevance ranking.
    pub fn new(items: Vec<ArticleCandidate>) -> Self {
        let mut results = Self {
            sort: SortKey::Relevance,
            items,
        };
        sort_candidates(&mut results.items, SortKey::Relevance);
        results
    }

    pub fn resort(&mut self, key: SortKey) {
        self.sort = key;
        sort_candidates(&mut self.items, key);
    }

    pub fn sort_key(&self) -> SortKey {
        self.sort
    }

    pub fn items(&self) -> &[ArticleCandidate] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The 1-based `n`th item in the current order.
    pub fn nth(&self, n: usize) -> Option<&ArticleCandidate> {
        n.checked_sub(1).and_then(|i| self.items.get(i))
    }

    pub fn stats(&self) -> ResultStats {
        ResultStats::from_items(&self.items)
    }
}

/// Summary figures for a result list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultStats {
    pub total: usize,
    pub average_relevance: f64,
    pub earliest: Option<DateTime<Utc>>,
    pub latest: Option<DateTime<Utc>>,
    pub per_source: BTreeMap<String, usize>,
}

impl ResultStats {
    pub fn from_items(items: &[ArticleCandidate]) -> Self {
        let total = items.len();
        let relevance_sum: u64 = items.iter().map(|c| u64::from(c.relevance())).sum();
        let average_relevance = if total == 0 {
            0.0
        } else {
            relevance_sum as f64 / total as f64
        };
        let mut per_source = BTreeMap::new();
        for c in items {
            *per_source.entry(c.source().to_string()).or_insert(0) += 1;
        }
        Self {
            total,
            average_relevance,
            earliest: items.iter().filter_map(|c| c.date()).min(),
            latest: items.iter().filter_map(|c| c.date()).max(),
            per_source,
        }
    }
}
