//! SMS text templates.
//!
//! Eskiz only delivers texts whose wording was approved by moderation,
//! so the message body is configuration, not code. A template must carry
//! the `{code}` placeholder; everything else about it is opaque.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::SmsError;

/// Placeholder replaced by the verification code when rendering.
pub const CODE_PLACEHOLDER: &str = "{code}";

/// The approved production template.
pub const DEFAULT_CODE_TEMPLATE: &str =
    "{code} - Код подтверждения авторизации в приложении Oson Ish";

/// A moderation-approved SMS template with a `{code}` placeholder.
///
/// Construction validates the placeholder, so a `CodeTemplate` value can
/// always be rendered. Deserialization goes through the same check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CodeTemplate(String);

impl CodeTemplate {
    /// Builds a template, rejecting texts without the `{code}` placeholder.
    pub fn new(text: impl Into<String>) -> Result<Self, SmsError> {
        let text = text.into();
        if !text.contains(CODE_PLACEHOLDER) {
            return Err(SmsError::Invalid(format!(
                "message template is missing the {} placeholder",
                CODE_PLACEHOLDER
            )));
        }
        Ok(Self(text))
    }

    /// Substitutes `code` into the placeholder.
    pub fn render(&self, code: &str) -> String {
        self.0.replace(CODE_PLACEHOLDER, code)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CodeTemplate {
    fn default() -> Self {
        Self(DEFAULT_CODE_TEMPLATE.to_string())
    }
}

impl fmt::Display for CodeTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for CodeTemplate {
    type Error = SmsError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CodeTemplate> for String {
    fn from(template: CodeTemplate) -> String {
        template.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_template_renders() {
        let template = CodeTemplate::default();
        let text = template.render("123456");
        assert_eq!(
            text,
            "123456 - Код подтверждения авторизации в приложении Oson Ish"
        );
    }

    #[test]
    fn test_missing_placeholder_rejected() {
        let err = CodeTemplate::new("your code is 123456").unwrap_err();
        assert!(matches!(err, SmsError::Invalid(_)));
    }

    #[test]
    fn test_placeholder_replaced_everywhere() {
        let template = CodeTemplate::new("{code} {code}").unwrap();
        assert_eq!(template.render("42"), "42 42");
    }

    #[test]
    fn test_deserialization_validates() {
        let ok: CodeTemplate = serde_json::from_str("\"Код: {code}\"").unwrap();
        assert_eq!(ok.as_str(), "Код: {code}");

        let bad = serde_json::from_str::<CodeTemplate>("\"no placeholder here\"");
        assert!(bad.is_err());
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let template = CodeTemplate::new("Код: {code}").unwrap();
        let json = serde_json::to_string(&template).unwrap();
        assert_eq!(json, "\"Код: {code}\"");
    }
}
