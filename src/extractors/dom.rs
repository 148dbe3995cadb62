// src/extractors/dom.rs
use scraper::ElementRef;

/// Visible text of an element with whitespace runs collapsed, the way a
/// browser reports `innerText` for a single-line cell.
pub fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Direct element children in document order; text and comment nodes are skipped.
pub fn child_elements(element: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    element.children().filter_map(ElementRef::wrap).collect()
}
