//! User agent handling for page requests.

/// Desktop Chrome user agent sent by default so sites serve their regular
/// login markup instead of a bot page.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Resolve the user agent from the configured value: the custom string if
/// one is set and non-blank, the desktop Chrome default otherwise.
pub fn resolve_user_agent(config: Option<&str>) -> String {
    match config.map(str::trim) {
        Some(custom) if !custom.is_empty() => custom.to_string(),
        _ => USER_AGENT.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_user_agent_default() {
        let ua = resolve_user_agent(None);
        assert!(ua.contains("Chrome/120"));
    }

    #[test]
    fn test_resolve_user_agent_blank_uses_default() {
        assert_eq!(resolve_user_agent(Some("  ")), USER_AGENT);
    }

    #[test]
    fn test_resolve_user_agent_custom() {
        let ua = resolve_user_agent(Some("MyBot/1.0"));
        assert_eq!(ua, "MyBot/1.0");
    }
}
