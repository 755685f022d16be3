//! Prompt templates.

/// Login classification prompt. Placeholders: `{url}`, `{html}`.
pub const LOGIN_CLASSIFICATION_PROMPT: &str = r#"Analyze this HTML snippet from {url} and determine if it contains login/authentication components.

HTML snippet:
```html
{html}
```

Please analyze and respond with ONLY a valid JSON object (no markdown, no code blocks, just the JSON):
{
  "has_login_form": true/false,
  "has_password_field": true/false,
  "has_email_username_field": true/false,
  "oauth_providers": ["google", "microsoft", "github", "facebook", "apple"],
  "confidence": "high"/"medium"/"low",
  "reasoning": "brief explanation"
}

Rules:
- Only include OAuth providers you clearly see mentioned (like "Sign in with Google" or oauth URLs)
- Be conservative - only set has_login_form to true if you're confident
- Look for password input fields, email/username fields, login buttons
- Return ONLY the JSON object, nothing else"#;

pub fn login_classification_prompt(url: &str, html: &str) -> String {
    LOGIN_CLASSIFICATION_PROMPT
        .replace("{url}", url)
        .replace("{html}", html)
}
