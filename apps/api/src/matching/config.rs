// Vocabulary and pattern tables for the matching engine.
// Everything the extractor, evidence engine, and answer renderer treat as
// domain knowledge lives here as data, so deployments and tests can swap
// tables without touching the algorithms.

use regex::Regex;

// ──────────────────────────────────────────────
// Default tables
// ──────────────────────────────────────────────

/// Skill terms recognized by the extractor. Matched as lowercase substrings,
/// so multi-word entries ("machine learning") hit as whole phrases.
pub const DEFAULT_SKILL_VOCABULARY: &[&str] = &[
    "python",
    "javascript",
    "java",
    "react",
    "node.js",
    "sql",
    "aws",
    "docker",
    "kubernetes",
    "git",
    "html",
    "css",
    "typescript",
    "angular",
    "vue",
    "django",
    "flask",
    "fastapi",
    "postgresql",
    "mongodb",
    "redis",
    "elasticsearch",
    "machine learning",
    "ai",
    "data science",
    "analytics",
    "project management",
    "agile",
    "scrum",
    "leadership",
    "communication",
    "problem solving",
];

/// Education terms that pair a job description with a resume for
/// education evidence. Checked in this order.
pub const DEFAULT_EDUCATION_TERMS: &[&str] =
    &["bachelor", "master", "phd", "degree", "university", "college"];

const DEFAULT_SKILLS_TRIGGERS: &[&str] = &["skill", "skills", "technology", "technologies"];
const DEFAULT_EXPERIENCE_TRIGGERS: &[&str] = &["experience", "work", "job", "career"];
const DEFAULT_EDUCATION_TRIGGERS: &[&str] = &["education", "degree", "university", "college"];
const DEFAULT_CONTACT_TRIGGERS: &[&str] = &["contact", "email", "phone", "linkedin"];

const EXPERIENCE_HEADER_PATTERN: &str = r"(?i)(experience|work history|employment|career)";
const COMPANY_PATTERN: &str = r"([A-Z][a-zA-Z\s&]+(?:Inc|Corp|LLC|Ltd|Company|Technologies|Systems))";
const EDUCATION_HEADER_PATTERN: &str =
    r"(?i)(education|academic|degree|university|college|bachelor|master|phd)";
const DEGREE_PATTERN: &str = r"(?i)(bachelor|master|phd|mba|bs|ms)\s+[a-zA-Z\s]+";
const YEARS_PATTERN: &str = r"(?i)(\d+)\s*years?\s*(?:of\s*)?experience";
const EMAIL_PATTERN: &str = r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b";
const PHONE_PATTERN: &str = r"(\+?1[-.\s]?)?\(?([0-9]{3})\)?[-.\s]?([0-9]{3})[-.\s]?([0-9]{4})";
const LINKEDIN_PATTERN: &str = r"linkedin\.com/in/[a-zA-Z0-9-]+";
const GITHUB_PATTERN: &str = r"github\.com/[a-zA-Z0-9-]+";

// ──────────────────────────────────────────────
// Config
// ──────────────────────────────────────────────

/// Compiled tables driving feature extraction, evidence, and answers.
/// Built once at startup and shared through `AppState`.
#[derive(Debug, Clone)]
pub struct MatchConfig {
    pub skill_vocabulary: Vec<String>,
    pub education_terms: Vec<String>,

    /// Question classification tables, checked in this order. The first
    /// category with a hit wins.
    pub skills_triggers: Vec<String>,
    pub experience_triggers: Vec<String>,
    pub education_triggers: Vec<String>,
    pub contact_triggers: Vec<String>,

    /// Anchors the organization scan window.
    pub experience_header: Regex,
    /// Capitalized run ending in a legal-entity suffix.
    pub company_pattern: Regex,
    /// Anchors the degree scan window.
    pub education_header: Regex,
    /// Degree keyword followed by free text. Only the keyword is kept.
    pub degree_pattern: Regex,
    /// "<N> years [of] experience". The first occurrence wins.
    pub years_pattern: Regex,
    pub email_pattern: Regex,
    pub phone_pattern: Regex,
    pub linkedin_pattern: Regex,
    pub github_pattern: Regex,

    /// Characters scanned after the experience header.
    pub experience_window: usize,
    /// Characters scanned after the education header.
    pub education_window: usize,
    /// Organizations kept per document.
    pub company_cap: usize,
    /// Degrees kept per document.
    pub degree_cap: usize,
    /// Characters kept on each side of an evidence hit.
    pub evidence_window: usize,
    /// Requirement tokens longer than this many characters can satisfy a
    /// requirement by partial overlap.
    pub similar_token_min_len: usize,

    // Answer rendering caps, one per question category.
    pub answer_skill_cap: usize,
    pub answer_company_cap: usize,
    pub answer_degree_cap: usize,
    pub answer_contact_cap: usize,

    /// Snippets are truncated to this many characters.
    pub snippet_max_chars: usize,
    /// Snippets shorter than this are dropped.
    pub snippet_min_chars: usize,
    /// Snippets kept per source document.
    pub snippet_cap: usize,
    /// Sentences carried into a general-mode answer.
    pub general_answer_snippets: usize,
}

impl MatchConfig {
    /// Compiles the default tables. Pattern compilation is the only way
    /// this fails, which makes bad deployment-time substitutions loud.
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            skill_vocabulary: owned(DEFAULT_SKILL_VOCABULARY),
            education_terms: owned(DEFAULT_EDUCATION_TERMS),
            skills_triggers: owned(DEFAULT_SKILLS_TRIGGERS),
            experience_triggers: owned(DEFAULT_EXPERIENCE_TRIGGERS),
            education_triggers: owned(DEFAULT_EDUCATION_TRIGGERS),
            contact_triggers: owned(DEFAULT_CONTACT_TRIGGERS),
            experience_header: Regex::new(EXPERIENCE_HEADER_PATTERN)?,
            company_pattern: Regex::new(COMPANY_PATTERN)?,
            education_header: Regex::new(EDUCATION_HEADER_PATTERN)?,
            degree_pattern: Regex::new(DEGREE_PATTERN)?,
            years_pattern: Regex::new(YEARS_PATTERN)?,
            email_pattern: Regex::new(EMAIL_PATTERN)?,
            phone_pattern: Regex::new(PHONE_PATTERN)?,
            linkedin_pattern: Regex::new(LINKEDIN_PATTERN)?,
            github_pattern: Regex::new(GITHUB_PATTERN)?,
            experience_window: 1000,
            education_window: 500,
            company_cap: 5,
            degree_cap: 3,
            evidence_window: 100,
            similar_token_min_len: 3,
            answer_skill_cap: 10,
            answer_company_cap: 5,
            answer_degree_cap: 3,
            answer_contact_cap: 3,
            snippet_max_chars: 200,
            snippet_min_chars: 50,
            snippet_cap: 3,
            general_answer_snippets: 2,
        })
    }
}

fn owned(table: &[&str]) -> Vec<String> {
    table.iter().map(|s| s.to_string()).collect()
}
