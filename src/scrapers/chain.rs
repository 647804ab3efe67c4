//! Ordered "first of several selectors" lookups.
//!
//! Search page markup drifts, so every lookup is a list of CSS selectors in
//! priority order. The first selector that yields something wins and the
//! rest are never tried. The same type serves containers, titles, links and
//! dates.

use scraper::{ElementRef, Selector};
use tracing::warn;

use crate::utils::element_text;

#[derive(Debug, Clone)]
pub struct SelectorChain {
    selectors: Vec<Selector>,
}

impl SelectorChain {
    /// Compile `css` in order. Selectors that fail to parse are logged and
    /// skipped.
    pub fn new(css: &[&str]) -> Self {
        let selectors = css
            .iter()
            .filter_map(|c| match Selector::parse(c) {
                Ok(sel) => Some(sel),
                Err(e) => {
                    warn!(selector = %c, error = %e, "Skipping invalid selector");
                    None
                }
            })
            .collect();
        Self { selectors }
    }

    /// All matches of the first selector that matches at least one element
    /// below `root`.
    pub fn select_all<'a>(&self, root: ElementRef<'a>) -> Vec<ElementRef<'a>> {
        self.selectors
            .iter()
            .map(|sel| root.select(sel).collect::<Vec<_>>())
            .find(|found| !found.is_empty())
            .unwrap_or_default()
    }

    /// Text of the first selector whose first match has non-empty text.
    pub fn first_text(&self, root: ElementRef<'_>) -> Option<String> {
        self.first_element_text(root).map(|(_, text)| text)
    }

    /// Like [`first_text`](Self::first_text) but also returns the element.
    pub fn first_element_text<'a>(&self, root: ElementRef<'a>) -> Option<(ElementRef<'a>, String)> {
        self.selectors.iter().find_map(|sel| {
            let el = root.select(sel).next()?;
            let text = element_text(&el);
            (!text.is_empty()).then_some((el, text))
        })
    }

    /// Value of `attr` on the first selector whose first match carries a
    /// non-empty value.
    pub fn first_attr(&self, root: ElementRef<'_>, attr: &str) -> Option<String> {
        self.selectors.iter().find_map(|sel| {
            let value = root.select(sel).next()?.value().attr(attr)?.trim();
            (!value.is_empty()).then(|| value.to_string())
        })
    }

    /// The first element, trying selectors in order, that satisfies `keep`.
    pub fn first_where<'a>(
        &self,
        root: ElementRef<'a>,
        keep: impl Fn(&ElementRef<'a>) -> bool,
    ) -> Option<ElementRef<'a>> {
        self.selectors
            .iter()
            .find_map(|sel| root.select(sel).find(|el| keep(el)))
    }
}
