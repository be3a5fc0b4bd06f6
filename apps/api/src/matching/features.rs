// Structured feature extraction from raw document text.
//
// Extraction is total: any input yields a Features value, with empty or
// absent fields standing in for anything the text does not contain.

use serde::{Deserialize, Serialize};

use crate::matching::config::MatchConfig;

/// Isolated contact handles, each the first match in the whole document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactFields {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub linkedin: Option<String>,
    pub github: Option<String>,
}

/// Everything the engine knows about a document beyond its raw text.
/// Derived at ingest time and stored alongside the document, so answers
/// and redaction never re-parse content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeFeatures {
    /// Vocabulary entries present in the text, in vocabulary order.
    pub skills: Vec<String>,
    /// First "<N> years experience" figure, if one parses.
    pub experience_years: Option<u32>,
    /// Organization names from the experience section, capped.
    pub companies: Vec<String>,
    /// Degree keywords from the education section, capped, case as written.
    pub degrees: Vec<String>,
    pub contact: ContactFields,
}

pub fn extract(text: &str, config: &MatchConfig) -> ResumeFeatures {
    ResumeFeatures {
        skills: extract_skills(text, config),
        experience_years: extract_experience_years(text, config),
        companies: extract_companies(text, config),
        degrees: extract_degrees(text, config),
        contact: extract_contact(text, config),
    }
}

/// Substring containment against the vocabulary, case-insensitive.
/// "java" therefore also hits inside "javascript"; the vocabulary is
/// ordered so reviewers see both.
fn extract_skills(text: &str, config: &MatchConfig) -> Vec<String> {
    let lower = text.to_lowercase();
    config
        .skill_vocabulary
        .iter()
        .filter(|skill| lower.contains(skill.as_str()))
        .cloned()
        .collect()
}

fn extract_experience_years(text: &str, config: &MatchConfig) -> Option<u32> {
    config
        .years_pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Scans a bounded window after the first experience header for
/// organization names. No header, no companies.
fn extract_companies(text: &str, config: &MatchConfig) -> Vec<String> {
    let Some(header) = config.experience_header.find(text) else {
        return Vec::new();
    };
    let window: String = text[header.end()..]
        .chars()
        .take(config.experience_window)
        .collect();
    config
        .company_pattern
        .captures_iter(&window)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .take(config.company_cap)
        .collect()
}

/// Scans a bounded window after the first education header and keeps the
/// matched degree keyword, not the trailing subject text.
fn extract_degrees(text: &str, config: &MatchConfig) -> Vec<String> {
    let Some(header) = config.education_header.find(text) else {
        return Vec::new();
    };
    let window: String = text[header.end()..]
        .chars()
        .take(config.education_window)
        .collect();
    config
        .degree_pattern
        .captures_iter(&window)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .take(config.degree_cap)
        .collect()
}

fn extract_contact(text: &str, config: &MatchConfig) -> ContactFields {
    ContactFields {
        email: first_match(&config.email_pattern, text),
        phone: first_match(&config.phone_pattern, text),
        linkedin: first_match(&config.linkedin_pattern, text),
        github: first_match(&config.github_pattern, text),
    }
}

fn first_match(pattern: &regex::Regex, text: &str) -> Option<String> {
    pattern.find(text).map(|m| m.as_str().to_string())
}
