//! Authentication component models.
//!
//! These structs are the output contract of the detection engine. Field
//! names and ordering are serialized verbatim into API responses.

use serde::{Deserialize, Serialize};

/// Traditional username/password form component.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraditionalAuthComponent {
    pub found: bool,
    #[serde(default)]
    pub html_snippets: Vec<String>,
    #[serde(default)]
    pub indicators: Vec<String>,
}

impl TraditionalAuthComponent {
    /// Maximum number of form snippets kept.
    pub const MAX_SNIPPETS: usize = 3;

    pub fn not_found() -> Self {
        Self::default()
    }

    /// Build a component from raw matches.
    ///
    /// Snippets are de-duplicated by exact text (first occurrence wins) and
    /// capped at [`Self::MAX_SNIPPETS`]. The component is found iff at least
    /// one snippet survives; indicators are dropped otherwise.
    pub fn from_matches(snippets: Vec<String>, indicators: Vec<String>) -> Self {
        let html_snippets = unique_in_order(snippets, Self::MAX_SNIPPETS);
        if html_snippets.is_empty() {
            return Self::not_found();
        }
        Self {
            found: true,
            html_snippets,
            indicators: unique_in_order(indicators, usize::MAX),
        }
    }
}

/// OAuth/SSO button component.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthAuthComponent {
    pub found: bool,
    #[serde(default)]
    pub providers: Vec<String>,
    #[serde(default)]
    pub html_snippets: Vec<String>,
    #[serde(default)]
    pub indicators: Vec<String>,
}

impl OAuthAuthComponent {
    /// Maximum number of button snippets kept.
    pub const MAX_SNIPPETS: usize = 5;
    /// Maximum characters per button snippet.
    pub const MAX_SNIPPET_CHARS: usize = 300;

    pub fn not_found() -> Self {
        Self::default()
    }

    /// Build a component from raw matches, applying the same ordered
    /// de-duplication to providers, snippets and indicators.
    pub fn from_matches(
        providers: Vec<String>,
        snippets: Vec<String>,
        indicators: Vec<String>,
    ) -> Self {
        let providers = unique_in_order(providers, usize::MAX);
        if providers.is_empty() {
            return Self::not_found();
        }
        Self {
            found: true,
            providers,
            html_snippets: unique_in_order(snippets, Self::MAX_SNIPPETS),
            indicators: unique_in_order(indicators, usize::MAX),
        }
    }
}

/// Container for all authentication components found on a page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthComponents {
    pub traditional_form: TraditionalAuthComponent,
    pub oauth_buttons: OAuthAuthComponent,
}

impl AuthComponents {
    pub fn new(traditional_form: TraditionalAuthComponent, oauth_buttons: OAuthAuthComponent) -> Self {
        Self {
            traditional_form,
            oauth_buttons,
        }
    }

    /// Both components not found.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Check if any authentication component was found.
    pub fn has_auth(&self) -> bool {
        self.traditional_form.found || self.oauth_buttons.found
    }
}

/// Keep the first occurrence of each item, preserving order, up to `cap`.
fn unique_in_order(items: Vec<String>, cap: usize) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len().min(cap));
    for item in items {
        if out.len() >= cap {
            break;
        }
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}
