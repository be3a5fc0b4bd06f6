// Requirement-level evidence for one (job, document) pair.
//
// Every job requirement lands in exactly one bucket: evidenced, silently
// satisfied (partial token overlap, no snippet), or missing. Experience and
// education items are appended after the requirement sweep, in that order.

use serde::{Deserialize, Serialize};

use crate::matching::config::MatchConfig;

/// Query form of a job posting.
#[derive(Debug, Clone)]
pub struct JobSpec {
    pub title: String,
    pub description: String,
    pub requirements: Vec<String>,
}

impl JobSpec {
    /// Single query string: title, description, then requirements,
    /// space-joined.
    pub fn composite_text(&self) -> String {
        format!("{} {} {}", self.title, self.description, self.requirements.join(" "))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceKind {
    SkillMatch,
    ExperienceMatch,
    EducationMatch,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceItem {
    pub requirement: String,
    pub evidence: String,
    #[serde(rename = "type")]
    pub kind: EvidenceKind,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequirementAnnotation {
    pub evidence: Vec<EvidenceItem>,
    pub missing_requirements: Vec<String>,
}

pub fn annotate(job: &JobSpec, doc_text: &str, config: &MatchConfig) -> RequirementAnnotation {
    let doc_lower = doc_text.to_lowercase();
    let job_desc_lower = job.description.to_lowercase();

    let mut evidence = Vec::new();
    let mut missing = Vec::new();

    for requirement in &job.requirements {
        let req_lower = requirement.to_lowercase();
        if doc_lower.contains(&req_lower) {
            evidence.push(EvidenceItem {
                requirement: requirement.clone(),
                evidence: context_window(doc_text, &doc_lower, &req_lower, config.evidence_window),
                kind: EvidenceKind::SkillMatch,
            });
        } else if !satisfied_by_token(&req_lower, &doc_lower, config.similar_token_min_len) {
            missing.push(requirement.clone());
        }
        // A token-overlap hit counts as satisfied but carries no snippet.
    }

    evidence.extend(experience_evidence(&job_desc_lower, &doc_lower, config));
    evidence.extend(education_evidence(&job_desc_lower, doc_text, &doc_lower, config));

    RequirementAnnotation { evidence, missing_requirements: missing }
}

/// Window of `window` characters on each side of the first occurrence of
/// `needle_lower`, cut from the original-case text, whitespace collapsed.
fn context_window(text: &str, text_lower: &str, needle_lower: &str, window: usize) -> String {
    let Some(byte_pos) = text_lower.find(needle_lower) else {
        return String::new();
    };
    let char_pos = text_lower[..byte_pos].chars().count();
    let needle_len = needle_lower.chars().count();
    let start = char_pos.saturating_sub(window);
    let take = (char_pos - start) + needle_len + window;
    let raw: String = text.chars().skip(start).take(take).collect();
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Partial credit: any requirement token longer than `min_len` characters
/// found in the document satisfies the requirement. Asymmetric on purpose,
/// document tokens are never split.
fn satisfied_by_token(req_lower: &str, doc_lower: &str, min_len: usize) -> bool {
    req_lower
        .split_whitespace()
        .filter(|token| token.chars().count() > min_len)
        .any(|token| doc_lower.contains(token))
}

/// One experience item when both sides state a years figure and the
/// candidate meets or exceeds the requirement.
fn experience_evidence(
    job_desc_lower: &str,
    doc_lower: &str,
    config: &MatchConfig,
) -> Option<EvidenceItem> {
    let required = first_years_figure(job_desc_lower, config)?;
    let candidate = first_years_figure(doc_lower, config)?;
    (candidate >= required).then(|| EvidenceItem {
        requirement: format!("{required} years of experience"),
        evidence: format!("Candidate has {candidate} years of experience"),
        kind: EvidenceKind::ExperienceMatch,
    })
}

fn first_years_figure(text: &str, config: &MatchConfig) -> Option<u32> {
    config
        .years_pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// One item per education term named by the job description and present in
/// the document, snippet cut around the document occurrence.
fn education_evidence(
    job_desc_lower: &str,
    doc_text: &str,
    doc_lower: &str,
    config: &MatchConfig,
) -> Vec<EvidenceItem> {
    config
        .education_terms
        .iter()
        .filter(|term| job_desc_lower.contains(term.as_str()) && doc_lower.contains(term.as_str()))
        .map(|term| EvidenceItem {
            requirement: format!("Education: {term}"),
            evidence: context_window(doc_text, doc_lower, term, config.evidence_window),
            kind: EvidenceKind::EducationMatch,
        })
        .collect()
}
