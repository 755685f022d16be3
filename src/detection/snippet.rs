//! Snippet cleaning.
//!
//! Serializes an element back to indented HTML with script, style and
//! noscript content removed, then truncates it.

use scraper::{ElementRef, Node};

use crate::utils::{escape_attr, escape_text};

/// Default snippet length for form snippets.
pub const DEFAULT_MAX_CHARS: usize = 500;

const SKIPPED_TAGS: &[&str] = &["script", "style", "noscript"];

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Clean and truncate an element to at most `max_chars` characters,
/// ellipsis included.
pub fn clean_snippet(el: ElementRef<'_>, max_chars: usize) -> String {
    let mut out = String::new();
    write_element(el, 0, &mut out);
    truncate(out.trim_end(), max_chars)
}

const ELLIPSIS: &str = "...";

/// Cut `s` to at most `max_chars` characters, ending in "..." when cut.
pub(crate) fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let keep = max_chars.saturating_sub(ELLIPSIS.len());
    let cut = s.char_indices().nth(keep).map_or(s.len(), |(i, _)| i);
    format!("{}{}", &s[..cut], ELLIPSIS)
}

fn write_element(el: ElementRef<'_>, depth: usize, out: &mut String) {
    let element = el.value();
    let name = element.name();
    if SKIPPED_TAGS.contains(&name) {
        return;
    }

    indent(depth, out);
    out.push('<');
    out.push_str(name);
    // Sorted so that output does not depend on attribute storage order.
    let mut attrs: Vec<(&str, &str)> = element.attrs().collect();
    attrs.sort_by(|a, b| a.0.cmp(b.0));
    for (key, value) in attrs {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(&escape_attr(value));
        out.push('"');
    }
    out.push_str(">\n");

    if VOID_TAGS.contains(&name) {
        return;
    }

    for child in el.children() {
        match child.value() {
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    write_element(child_el, depth + 1, out);
                }
            }
            Node::Text(text) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    indent(depth + 1, out);
                    out.push_str(&escape_text(trimmed));
                    out.push('\n');
                }
            }
            _ => {}
        }
    }

    indent(depth, out);
    out.push_str("</");
    out.push_str(name);
    out.push_str(">\n");
}

fn indent(depth: usize, out: &mut String) {
    for _ in 0..depth {
        out.push(' ');
    }
}
