//! OAuth/SSO button detection.

use scraper::{ElementRef, Html};
use tracing::debug;

use super::dom::{attr_lower, class_list, collapsed_text, is_descendant_of, selector, tag_name};
use super::providers::{has_oauth_phrase, provider_for_text, provider_for_url};
use super::snippet::clean_snippet;
use super::DetectError;
use crate::models::OAuthAuthComponent;

pub(super) fn detect(document: &Html) -> Result<OAuthAuthComponent, DetectError> {
    let clickable = selector("button, a, div")?;

    let mut accepted: Vec<ElementRef<'_>> = Vec::new();
    let mut providers = Vec::new();
    let mut snippets = Vec::new();
    let mut indicators = Vec::new();
    let mut checked = 0usize;

    for element in document.select(&clickable) {
        if tag_name(element) == "div" && !is_scripted_control(element) {
            continue;
        }
        if is_descendant_of(element, &accepted) {
            continue;
        }
        checked += 1;

        let blob = text_blob(element);
        let href = attr_lower(element, "href");
        let matched = if has_oauth_phrase(&blob) {
            provider_for_text(&blob).map(|p| (p, "oauth"))
        } else if !href.is_empty() {
            provider_for_url(&href).map(|p| (p, "sso_url"))
        } else {
            None
        };

        let Some((provider, rule)) = matched else {
            continue;
        };
        if providers.iter().any(|p| p == provider) {
            continue;
        }

        debug!("Found {} OAuth control ({})", provider, rule);
        accepted.push(element);
        providers.push(provider.to_string());
        indicators.push(format!("{}_{}", provider, rule));
        snippets.push(clean_snippet(element, OAuthAuthComponent::MAX_SNIPPET_CHARS));
    }

    debug!(
        "Checked {} clickable elements, {} provider(s)",
        checked,
        providers.len()
    );
    Ok(OAuthAuthComponent::from_matches(providers, snippets, indicators))
}

/// A div acting as a button or link through a role or click handler.
fn is_scripted_control(element: ElementRef<'_>) -> bool {
    let role = attr_lower(element, "role");
    role == "button" || role == "link" || element.value().attr("onclick").is_some()
}

/// Lowercase text, classes, id, href and click handler of a control.
fn text_blob(element: ElementRef<'_>) -> String {
    [
        collapsed_text(element).to_lowercase(),
        class_list(element).join(" "),
        attr_lower(element, "id"),
        attr_lower(element, "href"),
        attr_lower(element, "onclick"),
    ]
    .join(" ")
}
