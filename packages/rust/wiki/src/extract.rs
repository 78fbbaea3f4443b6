//! Pull candidate movie titles out of the wiki page.
//!
//! The wiki italicises every film it mentions, so the candidates are simply
//! the text of all `<i>` elements in document order, run through a
//! [`TitleFilter`].

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use seenlist_shared::WikiEntry;

use crate::filter::TitleFilter;

static ITALIC_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("i").expect("italic selector"));

/// Filtered titles in order of first appearance.
pub fn extract_titles(doc: &Html) -> Vec<String> {
    let mut filter = TitleFilter::new();
    let titles: Vec<String> = doc
        .select(&ITALIC_SEL)
        .filter_map(|el| filter.accept(&element_text(el)))
        .collect();

    debug!(count = titles.len(), "extracted titles");
    titles
}

/// Like [`extract_titles`], but also reads the episode air date from the
/// table cell after the one holding each title.
pub fn extract_entries(doc: &Html) -> Vec<WikiEntry> {
    let mut filter = TitleFilter::new();
    doc.select(&ITALIC_SEL)
        .filter_map(|el| {
            let title = filter.accept(&element_text(el))?;
            Some(WikiEntry {
                title,
                air_date: air_date_for(el),
            })
        })
        .collect()
}

/// Parse raw HTML and extract titles in one go.
pub fn extract_titles_from_html(html: &str) -> Vec<String> {
    extract_titles(&Html::parse_document(html))
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>()
}

/// Text of the first non-empty `<td>` following the cell that contains `el`.
fn air_date_for(el: ElementRef<'_>) -> Option<String> {
    let cell = el
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|a| matches!(a.value().name(), "td" | "th"))?;

    cell.next_siblings()
        .filter_map(ElementRef::wrap)
        .filter(|sib| sib.value().name() == "td")
        .map(|sib| sib.text().collect::<String>().trim().to_string())
        .find(|text| !text.is_empty())
}
