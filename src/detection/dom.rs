//! DOM query helpers.
//!
//! Attribute access is normalized here: classes always come back as an
//! ordered list of lowercase strings and missing attributes as "".

use scraper::{ElementRef, Html, Selector};

use super::DetectError;

pub fn selector(css: &str) -> Result<Selector, DetectError> {
    Selector::parse(css).map_err(|e| DetectError::Selector(format!("{}: {:?}", css, e)))
}

/// Lowercased attribute value, or "" when absent.
pub fn attr_lower(el: ElementRef<'_>, name: &str) -> String {
    el.value().attr(name).unwrap_or_default().to_lowercase()
}

/// Class list in document order, lowercased.
pub fn class_list(el: ElementRef<'_>) -> Vec<String> {
    el.value().classes().map(|c| c.to_lowercase()).collect()
}

pub fn tag_name(el: ElementRef<'_>) -> &str {
    el.value().name()
}

/// Visible text with runs of whitespace collapsed to one space.
pub fn collapsed_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Classes and id joined into one lowercase string.
pub fn class_and_id(el: ElementRef<'_>) -> String {
    let mut blob = class_list(el).join(" ");
    blob.push(' ');
    blob.push_str(&attr_lower(el, "id"));
    blob
}

/// Element ancestors, nearest first.
pub fn element_ancestors<'a>(el: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    el.ancestors().filter_map(ElementRef::wrap)
}

pub fn parent_element(el: ElementRef<'_>) -> Option<ElementRef<'_>> {
    el.parent().and_then(ElementRef::wrap)
}

pub fn is_descendant_of(el: ElementRef<'_>, candidates: &[ElementRef<'_>]) -> bool {
    element_ancestors(el).any(|a| candidates.contains(&a))
}

/// Text of the labels tied to an input: `label[for=id]`, an enclosing
/// label, and the nearest preceding sibling label.
pub fn label_text(document: &Html, input: ElementRef<'_>) -> String {
    let mut parts = Vec::new();

    if let Some(id) = input.value().id().filter(|id| !id.is_empty()) {
        if let Ok(labels) = selector("label") {
            parts.extend(
                document
                    .select(&labels)
                    .filter(|label| label.value().attr("for") == Some(id))
                    .map(collapsed_text),
            );
        }
    }

    if let Some(label) = element_ancestors(input).find(|a| tag_name(*a) == "label") {
        parts.push(collapsed_text(label));
    }

    if let Some(sibling) = input.prev_siblings().filter_map(ElementRef::wrap).next() {
        if tag_name(sibling) == "label" {
            parts.push(collapsed_text(sibling));
        }
    }

    parts.join(" ").to_lowercase()
}
