// Viewer-conditional PII redaction.
//
// Recruiters see documents untouched. Everyone else gets a case-insensitive
// pattern sweep applied in fixed declaration order, so output is reproducible
// even where patterns could overlap. Replacement tokens never re-match any
// pattern, which makes the sweep idempotent.

use regex::{Regex, RegexBuilder};
use uuid::Uuid;

use crate::matching::features::ResumeFeatures;

pub const EMAIL_TOKEN: &str = "[EMAIL_REDACTED]";
pub const PHONE_TOKEN: &str = "[PHONE_REDACTED]";
pub const LINKEDIN_TOKEN: &str = "[LINKEDIN_REDACTED]";

/// (pattern, replacement) pairs, applied in this order.
pub const DEFAULT_PII_PATTERNS: &[(&str, &str)] = &[
    (r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b", EMAIL_TOKEN),
    (r"(\+?1[-.\s]?)?\(?([0-9]{3})\)?[-.\s]?([0-9]{3})[-.\s]?([0-9]{4})", PHONE_TOKEN),
    (r"\b\d{3}-?\d{2}-?\d{4}\b", "[SSN_REDACTED]"),
    (r"\b\d{4}[-\s]?\d{4}[-\s]?\d{4}[-\s]?\d{4}\b", "[CARD_REDACTED]"),
    (
        r"\d+\s+[A-Za-z\s]+(?:Street|St|Avenue|Ave|Road|Rd|Boulevard|Blvd|Lane|Ln|Drive|Dr)",
        "[ADDRESS_REDACTED]",
    ),
    (r"linkedin\.com/in/[a-zA-Z0-9-]+", LINKEDIN_TOKEN),
    (r"github\.com/[a-zA-Z0-9-]+", "[GITHUB_REDACTED]"),
    (
        r"https?://(?:www\.)?[a-zA-Z0-9-]+\.[a-zA-Z]{2,}(?:/[^\s]*)?",
        "[WEBSITE_REDACTED]",
    ),
];

/// The caller identity the engine redacts for. Supplied by the auth
/// boundary as a request extractor.
#[derive(Debug, Clone, Copy)]
pub struct Viewer {
    pub id: Uuid,
    pub is_recruiter: bool,
}

struct RedactionRule {
    pattern: Regex,
    replacement: &'static str,
}

/// Compiled redaction table, built once at startup and shared through
/// `AppState`.
pub struct Redactor {
    rules: Vec<RedactionRule>,
}

impl Redactor {
    pub fn new() -> Result<Self, regex::Error> {
        Self::with_patterns(DEFAULT_PII_PATTERNS)
    }

    pub fn with_patterns(patterns: &[(&str, &'static str)]) -> Result<Self, regex::Error> {
        let rules = patterns
            .iter()
            .map(|(pattern, replacement)| {
                Ok(RedactionRule {
                    pattern: RegexBuilder::new(pattern).case_insensitive(true).build()?,
                    replacement,
                })
            })
            .collect::<Result<Vec<_>, regex::Error>>()?;
        Ok(Self { rules })
    }

    /// Full-text sweep. Identity for recruiters.
    pub fn redact_text(&self, text: &str, viewer: &Viewer) -> String {
        if viewer.is_recruiter {
            return text.to_string();
        }
        let mut out = text.to_string();
        for rule in &self.rules {
            out = rule.pattern.replace_all(&out, rule.replacement).into_owned();
        }
        out
    }

    /// Overwrites the isolated contact handles email, phone, and linkedin
    /// with fixed tokens when present. All other features pass through.
    pub fn redact_features(&self, features: &ResumeFeatures, viewer: &Viewer) -> ResumeFeatures {
        if viewer.is_recruiter {
            return features.clone();
        }
        let mut out = features.clone();
        if out.contact.email.is_some() {
            out.contact.email = Some(EMAIL_TOKEN.to_string());
        }
        if out.contact.phone.is_some() {
            out.contact.phone = Some(PHONE_TOKEN.to_string());
        }
        if out.contact.linkedin.is_some() {
            out.contact.linkedin = Some(LINKEDIN_TOKEN.to_string());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::features::ContactFields;

    fn recruiter() -> Viewer {
        Viewer { id: Uuid::new_v4(), is_recruiter: true }
    }

    fn candidate() -> Viewer {
        Viewer { id: Uuid::new_v4(), is_recruiter: false }
    }

    fn redactor() -> Redactor {
        Redactor::new().unwrap()
    }

    #[test]
    fn test_email_and_phone_masked_for_non_recruiter() {
        let out = redactor().redact_text("Contact: jane@ex.com, 555-123-4567", &candidate());
        assert_eq!(out, "Contact: [EMAIL_REDACTED], [PHONE_REDACTED]");
    }

    #[test]
    fn test_recruiter_sees_everything() {
        let text = "jane@ex.com 555-123-4567 123-45-6789 github.com/jane";
        assert_eq!(redactor().redact_text(text, &recruiter()), text);
    }

    #[test]
    fn test_ssn_and_card_masked() {
        let out = redactor().redact_text("SSN 123-45-6789 card 4111-1111-1111-1111", &candidate());
        assert_eq!(out, "SSN [SSN_REDACTED] card [CARD_REDACTED]");
    }

    #[test]
    fn test_address_masked() {
        let out = redactor().redact_text("Lives at 42 Elm Street for now", &candidate());
        assert!(out.contains("[ADDRESS_REDACTED]"));
        assert!(!out.contains("Elm"));
    }

    #[test]
    fn test_profile_urls_masked() {
        let out = redactor().redact_text(
            "linkedin.com/in/jane and github.com/jane and https://jane.dev/blog",
            &candidate(),
        );
        assert_eq!(
            out,
            "[LINKEDIN_REDACTED] and [GITHUB_REDACTED] and [WEBSITE_REDACTED]"
        );
    }

    #[test]
    fn test_case_insensitive_sweep() {
        let out = redactor().redact_text("LinkedIn.com/in/jane", &candidate());
        assert_eq!(out, "[LINKEDIN_REDACTED]");
    }

    #[test]
    fn test_earlier_pattern_wins_inside_urls() {
        // The phone rule runs before the website rule and consumes the
        // digits, which leaves the URL unmatchable for the website rule.
        let out = redactor().redact_text("http://call-555-123-4567.example.com/x", &candidate());
        assert_eq!(out, "http://call-[PHONE_REDACTED].example.com/x");
    }

    #[test]
    fn test_redaction_is_idempotent() {
        let redactor = redactor();
        let viewer = candidate();
        let once = redactor.redact_text(
            "jane@ex.com, 555-123-4567, 123-45-6789, 4111 1111 1111 1111, \
             42 Elm Street, linkedin.com/in/jane, github.com/jane, https://jane.dev",
            &viewer,
        );
        assert_eq!(redactor.redact_text(&once, &viewer), once);
    }

    #[test]
    fn test_features_contact_tokens() {
        let features = ResumeFeatures {
            contact: ContactFields {
                email: Some("jane@ex.com".to_string()),
                phone: Some("555-123-4567".to_string()),
                linkedin: Some("linkedin.com/in/jane".to_string()),
                github: Some("github.com/jane".to_string()),
            },
            ..ResumeFeatures::default()
        };
        let out = redactor().redact_features(&features, &candidate());
        assert_eq!(out.contact.email.as_deref(), Some("[EMAIL_REDACTED]"));
        assert_eq!(out.contact.phone.as_deref(), Some("[PHONE_REDACTED]"));
        assert_eq!(out.contact.linkedin.as_deref(), Some("[LINKEDIN_REDACTED]"));
        // The structured github handle passes through the field-level pass.
        assert_eq!(out.contact.github.as_deref(), Some("github.com/jane"));
    }

    #[test]
    fn test_features_absent_fields_stay_absent() {
        let out = redactor().redact_features(&ResumeFeatures::default(), &candidate());
        assert_eq!(out, ResumeFeatures::default());
    }

    #[test]
    fn test_features_untouched_for_recruiter() {
        let features = ResumeFeatures {
            skills: vec!["python".to_string()],
            contact: ContactFields {
                email: Some("jane@ex.com".to_string()),
                ..ContactFields::default()
            },
            ..ResumeFeatures::default()
        };
        let out = redactor().redact_features(&features, &recruiter());
        assert_eq!(out, features);
    }
}
