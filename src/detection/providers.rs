//! Static keyword and provider tables.
//!
//! Everything here is read-only and shared by every detection run.

/// An identity provider and the keywords that name it in button text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Provider {
    pub name: &'static str,
    pub keywords: &'static [&'static str],
}

/// Providers in match priority order. The first provider with a matching
/// keyword wins.
pub const PROVIDERS: &[Provider] = &[
    Provider {
        name: "google",
        keywords: &["google", "gmail"],
    },
    Provider {
        name: "microsoft",
        keywords: &["microsoft", "outlook", "office365", "azure"],
    },
    Provider {
        name: "github",
        keywords: &["github"],
    },
    Provider {
        name: "facebook",
        keywords: &["facebook", "fb"],
    },
    Provider {
        name: "apple",
        keywords: &["apple"],
    },
    Provider {
        name: "linkedin",
        keywords: &["linkedin"],
    },
    Provider {
        name: "twitter",
        keywords: &["twitter", "x.com"],
    },
    Provider {
        name: "amazon",
        keywords: &["amazon"],
    },
];

/// Canonical OAuth redirect URL fragments, matched against lowercase hrefs.
pub const OAUTH_URLS: &[(&str, &str)] = &[
    ("accounts.google.com", "google"),
    ("login.microsoftonline.com", "microsoft"),
    ("github.com/login/oauth", "github"),
    ("facebook.com/dialog/oauth", "facebook"),
    ("appleid.apple.com/auth", "apple"),
];

/// Phrases that mark a control as a third-party sign-in.
pub const OAUTH_PHRASES: &[&str] = &[
    "sign in with",
    "continue with",
    "log in with",
    "login with",
    "signup with",
    "sign up with",
];

/// Attribute and label fragments that mark a password field whose type may
/// be toggled by script.
pub const PASSWORD_KEYWORDS: &[&str] = &["password", "passwd", "pwd"];

/// Fragments that mark an identifier field next to a password.
pub const LOGIN_FIELD_KEYWORDS: &[&str] = &[
    "email",
    "e-mail",
    "mail",
    "username",
    "user_name",
    "user-name",
    "userid",
    "user",
    "login",
    "account",
    "identifier",
    "phone",
    "mobile",
    "member",
    "customer",
    "handle",
];

/// Class/id fragments of a container wrapping a formless login.
pub const LOGIN_CONTAINER_KEYWORDS: &[&str] =
    &["login", "signin", "sign-in", "auth", "authentication"];

/// Input types that never carry credentials.
pub const NON_CREDENTIAL_INPUT_TYPES: &[&str] = &["hidden", "submit", "button", "checkbox", "radio"];

/// First provider whose keyword appears in `blob`.
pub fn provider_for_text(blob: &str) -> Option<&'static str> {
    PROVIDERS
        .iter()
        .find(|p| p.keywords.iter().any(|k| blob.contains(k)))
        .map(|p| p.name)
}

/// First provider whose OAuth URL fragment appears in `href`.
pub fn provider_for_url(href: &str) -> Option<&'static str> {
    OAUTH_URLS
        .iter()
        .find(|(fragment, _)| href.contains(fragment))
        .map(|(_, provider)| *provider)
}

pub fn has_oauth_phrase(blob: &str) -> bool {
    OAUTH_PHRASES.iter().any(|p| blob.contains(p))
}

pub fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_priority() {
        assert_eq!(provider_for_text("continue with google"), Some("google"));
        assert_eq!(provider_for_text("sign in with office365"), Some("microsoft"));
        // google outranks github when both appear
        assert_eq!(provider_for_text("github or google"), Some("google"));
        assert_eq!(provider_for_text("continue with email"), None);
    }

    #[test]
    fn test_provider_for_url() {
        assert_eq!(
            provider_for_url("https://accounts.google.com/o/oauth2/auth"),
            Some("google")
        );
        assert_eq!(
            provider_for_url("https://github.com/login/oauth/authorize?client_id=1"),
            Some("github")
        );
        assert_eq!(provider_for_url("https://github.com/about"), None);
    }

    #[test]
    fn test_every_url_provider_is_known() {
        for (_, provider) in OAUTH_URLS {
            assert!(PROVIDERS.iter().any(|p| p.name == *provider));
        }
    }
}
