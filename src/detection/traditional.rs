//! Traditional username/password form detection.

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::dom::{
    attr_lower, class_and_id, collapsed_text, element_ancestors, label_text, parent_element,
    selector, tag_name,
};
use super::providers::{
    contains_any, LOGIN_CONTAINER_KEYWORDS, LOGIN_FIELD_KEYWORDS, NON_CREDENTIAL_INPUT_TYPES,
    PASSWORD_KEYWORDS,
};
use super::snippet::{clean_snippet, DEFAULT_MAX_CHARS};
use super::DetectError;
use crate::models::TraditionalAuthComponent;

/// Ancestor levels searched for a formless login container.
const CONTAINER_SEARCH_DEPTH: usize = 5;

/// A password field found by either lens.
struct Candidate<'a> {
    input: ElementRef<'a>,
    /// `type="password"` rather than a password-named field.
    explicit: bool,
}

pub(super) fn detect(document: &Html) -> Result<TraditionalAuthComponent, DetectError> {
    let inputs = selector("input")?;
    let candidates = password_candidates(document, &inputs);
    if candidates.is_empty() {
        debug!("No password inputs found");
        return Ok(TraditionalAuthComponent::not_found());
    }
    debug!("Found {} password input candidate(s)", candidates.len());

    let buttons = selector("button, input")?;
    let mut snippets = Vec::new();
    let mut indicators = vec!["password_input".to_string()];

    for candidate in &candidates {
        let form = element_ancestors(candidate.input).find(|a| tag_name(*a) == "form");
        match form {
            Some(form) => {
                let login_fields = form
                    .select(&inputs)
                    .filter(|el| *el != candidate.input)
                    .filter(|el| is_login_field(document, *el))
                    .count();
                if login_fields > 0 {
                    debug!("Found {} login-related input(s)", login_fields);
                    indicators.push("email_input".to_string());
                }
                if find_submit(form, &buttons).is_some() {
                    indicators.push("submit_button".to_string());
                }
                snippets.push(clean_snippet(form, DEFAULT_MAX_CHARS));
            }
            None => match login_container(candidate.input, &inputs) {
                Some(container) => {
                    debug!("Found formless login container <{}>", tag_name(container));
                    indicators.push("formless_login".to_string());
                    snippets.push(clean_snippet(container, DEFAULT_MAX_CHARS));
                }
                None if candidate.explicit => {
                    if let Some(parent) = parent_element(candidate.input) {
                        snippets.push(clean_snippet(parent, DEFAULT_MAX_CHARS));
                    }
                }
                None => {}
            },
        }
    }

    Ok(TraditionalAuthComponent::from_matches(snippets, indicators))
}

/// Explicit password inputs plus inputs whose attributes or labels name a
/// password, in document order.
fn password_candidates<'a>(document: &'a Html, inputs: &Selector) -> Vec<Candidate<'a>> {
    document
        .select(inputs)
        .filter_map(|input| {
            let input_type = attr_lower(input, "type");
            if input_type == "password" {
                return Some(Candidate {
                    input,
                    explicit: true,
                });
            }
            if NON_CREDENTIAL_INPUT_TYPES.contains(&input_type.as_str()) {
                return None;
            }
            let blob = [
                attr_lower(input, "name"),
                attr_lower(input, "id"),
                attr_lower(input, "placeholder"),
                attr_lower(input, "autocomplete"),
                label_text(document, input),
            ]
            .join(" ");
            contains_any(&blob, PASSWORD_KEYWORDS).then_some(Candidate {
                input,
                explicit: false,
            })
        })
        .collect()
}

/// Whether an input in the same form looks like the identifier field.
fn is_login_field(document: &Html, input: ElementRef<'_>) -> bool {
    let input_type = attr_lower(input, "type");
    if input_type == "password" || NON_CREDENTIAL_INPUT_TYPES.contains(&input_type.as_str()) {
        return false;
    }
    if input_type == "email" || input_type == "tel" {
        return true;
    }
    let blob = [
        attr_lower(input, "name"),
        attr_lower(input, "id"),
        attr_lower(input, "placeholder"),
        attr_lower(input, "aria-label"),
        attr_lower(input, "autocomplete"),
        attr_lower(input, "class"),
        label_text(document, input),
    ]
    .join(" ");
    if contains_any(&blob, PASSWORD_KEYWORDS) {
        return false;
    }
    contains_any(&blob, LOGIN_FIELD_KEYWORDS)
}

/// Explicit submit control, then a button mentioning log/sign, then any
/// button.
fn find_submit<'a>(form: ElementRef<'a>, buttons: &Selector) -> Option<ElementRef<'a>> {
    let controls: Vec<ElementRef<'a>> = form.select(buttons).collect();
    let is_button = |el: &ElementRef<'_>| tag_name(*el) == "button";

    controls
        .iter()
        .find(|el| attr_lower(**el, "type") == "submit")
        .or_else(|| {
            controls.iter().filter(|el| is_button(el)).find(|el| {
                let text = collapsed_text(**el).to_lowercase();
                text.contains("log") || text.contains("sign")
            })
        })
        .or_else(|| controls.iter().find(|el| is_button(el)))
        .copied()
}

/// Nearest ancestor within the search depth whose class or id names a
/// login, provided it holds more than one visible input.
fn login_container<'a>(input: ElementRef<'a>, inputs: &Selector) -> Option<ElementRef<'a>> {
    element_ancestors(input)
        .take(CONTAINER_SEARCH_DEPTH)
        .find(|a| contains_any(&class_and_id(*a), LOGIN_CONTAINER_KEYWORDS))
        .filter(|container| {
            container
                .select(inputs)
                .filter(|el| attr_lower(*el, "type") != "hidden")
                .count()
                > 1
        })
}
