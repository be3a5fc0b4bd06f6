// Corpus ranking and question answering on top of the scorer and the
// evidence engine.
//
// Both entry points are pure over their inputs: same corpus, same query,
// same output. Corpus order is insertion order, and the stable sort keeps
// it on score ties.

use serde::Serialize;
use uuid::Uuid;

use crate::matching::config::MatchConfig;
use crate::matching::evidence::{annotate, EvidenceItem, JobSpec};
use crate::matching::features::ResumeFeatures;
use crate::matching::scoring::{DocRepr, QueryRepr, SimilarityScorer};

/// A stored resume as the pipeline sees it.
#[derive(Debug, Clone)]
pub struct DocumentSnapshot {
    pub id: Uuid,
    pub filename: String,
    pub text: String,
    pub features: ResumeFeatures,
    pub embedding: Option<Vec<f64>>,
}

/// One ranked result for a job match run.
#[derive(Debug, Clone, Serialize)]
pub struct MatchOutcome {
    pub resume_id: Uuid,
    pub filename: String,
    pub score: f64,
    pub evidence: Vec<EvidenceItem>,
    pub missing_requirements: Vec<String>,
}

/// Scores the whole corpus against the job, orders descending, then runs
/// the evidence engine over the kept slice only.
pub fn rank_for_job(
    job: &JobSpec,
    corpus: &[DocumentSnapshot],
    top_n: i64,
    scorer: &dyn SimilarityScorer,
    config: &MatchConfig,
) -> Vec<MatchOutcome> {
    let query = QueryRepr::new(&job.composite_text());
    let mut scored = score_corpus(&query, corpus, scorer);
    let keep = effective_top_k(top_n, scored.len());
    scored.truncate(keep);

    scored
        .into_iter()
        .map(|(index, score)| {
            let doc = &corpus[index];
            let annotation = annotate(job, &doc.text, config);
            MatchOutcome {
                resume_id: doc.id,
                filename: doc.filename.clone(),
                score,
                evidence: annotation.evidence,
                missing_requirements: annotation.missing_requirements,
            }
        })
        .collect()
}

/// One source document backing an answer.
#[derive(Debug, Clone, Serialize)]
pub struct AnswerSource {
    pub resume_id: Uuid,
    pub filename: String,
    pub similarity_score: f64,
    pub snippets: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionAnswer {
    pub answer: String,
    pub sources: Vec<AnswerSource>,
}

/// Free-text question over the corpus. Documents scoring zero never count
/// as sources, and an empty corpus gets a canned answer instead of an
/// error.
pub fn answer_question(
    question: &str,
    corpus: &[DocumentSnapshot],
    top_k: i64,
    scorer: &dyn SimilarityScorer,
    config: &MatchConfig,
) -> QuestionAnswer {
    if corpus.is_empty() {
        return QuestionAnswer {
            answer: "No resumes found. Please upload some resumes first.".to_string(),
            sources: Vec::new(),
        };
    }

    let query = QueryRepr::new(question);
    let mut scored = score_corpus(&query, corpus, scorer);
    scored.retain(|(_, score)| *score > 0.0);
    let keep = effective_top_k(top_k, scored.len());
    scored.truncate(keep);

    let ranked: Vec<&DocumentSnapshot> = scored.iter().map(|(index, _)| &corpus[*index]).collect();
    let answer = render_answer(question, &ranked, config);
    let sources = scored
        .iter()
        .map(|(index, score)| {
            let doc = &corpus[*index];
            AnswerSource {
                resume_id: doc.id,
                filename: doc.filename.clone(),
                similarity_score: *score,
                snippets: relevant_snippets(question, &doc.text, config),
            }
        })
        .collect();

    QuestionAnswer { answer, sources }
}

/// Scores every document and orders by score descending. `sort_by` is
/// stable, so equal scores keep insertion order.
fn score_corpus(
    query: &QueryRepr,
    corpus: &[DocumentSnapshot],
    scorer: &dyn SimilarityScorer,
) -> Vec<(usize, f64)> {
    let mut scored: Vec<(usize, f64)> = corpus
        .iter()
        .enumerate()
        .map(|(index, doc)| {
            let repr = DocRepr { text: &doc.text, embedding: doc.embedding.as_deref() };
            (index, scorer.score(query, &repr))
        })
        .collect();
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored
}

/// Top-k policy: a non-positive or oversized request means everything.
fn effective_top_k(requested: i64, available: usize) -> usize {
    if requested <= 0 {
        return available;
    }
    (requested as usize).min(available)
}

// ──────────────────────────────────────────────
// Answer rendering
// ──────────────────────────────────────────────

/// Routes the question to a category template. The first category whose
/// trigger list hits wins; everything else is the general path.
fn render_answer(question: &str, ranked: &[&DocumentSnapshot], config: &MatchConfig) -> String {
    if ranked.is_empty() {
        return "I couldn't find relevant information in the uploaded resumes.".to_string();
    }
    let question_lower = question.to_lowercase();
    if contains_any(&question_lower, &config.skills_triggers) {
        skills_answer(ranked, config)
    } else if contains_any(&question_lower, &config.experience_triggers) {
        experience_answer(ranked, config)
    } else if contains_any(&question_lower, &config.education_triggers) {
        education_answer(ranked, config)
    } else if contains_any(&question_lower, &config.contact_triggers) {
        contact_answer(ranked, config)
    } else {
        general_answer(question, ranked, config)
    }
}

fn contains_any(haystack: &str, needles: &[String]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle.as_str()))
}

/// Union of stored skills in rank-major, first-seen order.
fn skills_answer(ranked: &[&DocumentSnapshot], config: &MatchConfig) -> String {
    let mut skills: Vec<String> = Vec::new();
    for doc in ranked {
        for skill in &doc.features.skills {
            if !skills.contains(skill) {
                skills.push(skill.clone());
            }
        }
    }
    skills.truncate(config.answer_skill_cap);
    if skills.is_empty() {
        "I couldn't find specific skills mentioned in the resumes.".to_string()
    } else {
        format!("Based on the uploaded resumes, I found these skills: {}.", skills.join(", "))
    }
}

/// Companies in rank order. Duplicates across documents are kept.
fn experience_answer(ranked: &[&DocumentSnapshot], config: &MatchConfig) -> String {
    let companies: Vec<String> = ranked
        .iter()
        .flat_map(|doc| doc.features.companies.iter().cloned())
        .take(config.answer_company_cap)
        .collect();
    if companies.is_empty() {
        "I couldn't find specific work experience details in the resumes.".to_string()
    } else {
        format!("Based on the resumes, I found work experience at: {}.", companies.join(", "))
    }
}

fn education_answer(ranked: &[&DocumentSnapshot], config: &MatchConfig) -> String {
    let degrees: Vec<String> = ranked
        .iter()
        .flat_map(|doc| doc.features.degrees.iter().cloned())
        .take(config.answer_degree_cap)
        .collect();
    if degrees.is_empty() {
        "I couldn't find specific education details in the resumes.".to_string()
    } else {
        format!("Based on the resumes, I found education information: {}.", degrees.join(", "))
    }
}

/// Email and phone lines per document, capped across documents.
fn contact_answer(ranked: &[&DocumentSnapshot], config: &MatchConfig) -> String {
    let mut lines: Vec<String> = Vec::new();
    for doc in ranked {
        if let Some(email) = &doc.features.contact.email {
            lines.push(format!("Email: {email}"));
        }
        if let Some(phone) = &doc.features.contact.phone {
            lines.push(format!("Phone: {phone}"));
        }
    }
    lines.truncate(config.answer_contact_cap);
    if lines.is_empty() {
        "I couldn't find specific contact information in the resumes.".to_string()
    } else {
        format!("Based on the resumes, I found contact information: {}.", lines.join(", "))
    }
}

/// Leading sentences of the best document that mention a query word.
fn general_answer(question: &str, ranked: &[&DocumentSnapshot], config: &MatchConfig) -> String {
    let snippets = relevant_snippets(question, &ranked[0].text, config);
    if snippets.is_empty() {
        return "I found some relevant resumes but couldn't extract specific information \
                to answer your question."
            .to_string();
    }
    let joined = snippets
        .iter()
        .take(config.general_answer_snippets)
        .cloned()
        .collect::<Vec<_>>()
        .join(" ");
    format!("Based on the most relevant resume, here's what I found: {joined}")
}

/// Sentences containing at least one query word, trimmed and truncated to
/// `snippet_max_chars` characters. Anything shorter than
/// `snippet_min_chars` after truncation is dropped.
pub fn relevant_snippets(query: &str, content: &str, config: &MatchConfig) -> Vec<String> {
    let query_lower = query.to_lowercase();
    let words: Vec<&str> = query_lower.split_whitespace().collect();
    content
        .split(['.', '!', '?'])
        .filter_map(|sentence| {
            let sentence_lower = sentence.to_lowercase();
            if !words.iter().any(|word| sentence_lower.contains(word)) {
                return None;
            }
            let snippet: String = sentence.trim().chars().take(config.snippet_max_chars).collect();
            (snippet.chars().count() >= config.snippet_min_chars).then_some(snippet)
        })
        .take(config.snippet_cap)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::features::{extract, ContactFields};
    use crate::matching::scoring::LexicalScorer;

    fn config() -> MatchConfig {
        MatchConfig::new().unwrap()
    }

    fn snapshot(filename: &str, text: &str) -> DocumentSnapshot {
        DocumentSnapshot {
            id: Uuid::new_v4(),
            filename: filename.to_string(),
            text: text.to_string(),
            features: extract(text, &config()),
            embedding: None,
        }
    }

    fn job(title: &str, description: &str, requirements: &[&str]) -> JobSpec {
        JobSpec {
            title: title.to_string(),
            description: description.to_string(),
            requirements: requirements.iter().map(|r| r.to_string()).collect(),
        }
    }

    #[test]
    fn test_rank_orders_by_score_descending() {
        let corpus = vec![
            snapshot("weak.txt", "Warehouse logistics and forklifts."),
            snapshot("strong.txt", "Rust and Tokio services in production."),
        ];
        let job = job("Engineer", "Rust services", &[]);
        let out = rank_for_job(&job, &corpus, 10, &LexicalScorer, &config());
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].filename, "strong.txt");
        assert!(out[0].score > out[1].score);
    }

    #[test]
    fn test_rank_tie_keeps_insertion_order() {
        let corpus = vec![
            snapshot("first.txt", "Python developer."),
            snapshot("second.txt", "Python developer."),
            snapshot("third.txt", "Python developer."),
        ];
        let job = job("Engineer", "Python", &[]);
        let out = rank_for_job(&job, &corpus, 0, &LexicalScorer, &config());
        let names: Vec<&str> = out.iter().map(|m| m.filename.as_str()).collect();
        assert_eq!(names, vec!["first.txt", "second.txt", "third.txt"]);
    }

    #[test]
    fn test_rank_is_deterministic() {
        let corpus = vec![
            snapshot("a.txt", "Python and SQL work."),
            snapshot("b.txt", "Python services."),
            snapshot("c.txt", "Unrelated text."),
        ];
        let job = job("Engineer", "Python SQL", &["Python"]);
        let first = rank_for_job(&job, &corpus, 10, &LexicalScorer, &config());
        let second = rank_for_job(&job, &corpus, 10, &LexicalScorer, &config());
        let scores: Vec<f64> = first.iter().map(|m| m.score).collect();
        let again: Vec<f64> = second.iter().map(|m| m.score).collect();
        assert_eq!(scores, again);
    }

    #[test]
    fn test_rank_scores_all_but_annotates_kept_slice_only() {
        let corpus = vec![
            snapshot("a.txt", "Python everywhere."),
            snapshot("b.txt", "Python sometimes."),
            snapshot("c.txt", "No relevant terms."),
        ];
        let job = job("Engineer", "Python", &["Python"]);
        let out = rank_for_job(&job, &corpus, 2, &LexicalScorer, &config());
        assert_eq!(out.len(), 2);
        // Zero scorers are still ranked in job mode, just not kept here.
        let all = rank_for_job(&job, &corpus, 0, &LexicalScorer, &config());
        assert_eq!(all.len(), 3);
        assert_eq!(all[2].filename, "c.txt");
        assert_eq!(all[2].score, 0.0);
    }

    #[test]
    fn test_top_k_policy() {
        assert_eq!(effective_top_k(3, 10), 3);
        assert_eq!(effective_top_k(0, 10), 10);
        assert_eq!(effective_top_k(-5, 10), 10);
        assert_eq!(effective_top_k(25, 10), 10);
    }

    #[test]
    fn test_adding_query_term_present_in_doc_never_lowers_score() {
        let doc = snapshot("a.txt", "Python and Docker in production.");
        let corpus = vec![doc];
        let base = rank_for_job(
            &job("Engineer", "Python", &[]),
            &corpus,
            1,
            &LexicalScorer,
            &config(),
        );
        let wider = rank_for_job(
            &job("Engineer", "Python Docker", &[]),
            &corpus,
            1,
            &LexicalScorer,
            &config(),
        );
        assert!(wider[0].score >= base[0].score);
    }

    #[test]
    fn test_empty_corpus_answer() {
        let out = answer_question("any question", &[], 5, &LexicalScorer, &config());
        assert_eq!(out.answer, "No resumes found. Please upload some resumes first.");
        assert!(out.sources.is_empty());
    }

    #[test]
    fn test_zero_score_documents_are_not_sources() {
        let corpus = vec![
            snapshot("hit.txt", "Kayaking instructor with swiftwater rescue training."),
            snapshot("miss.txt", "Completely unrelated content."),
        ];
        let out = answer_question("kayaking", &corpus, 5, &LexicalScorer, &config());
        assert_eq!(out.sources.len(), 1);
        assert_eq!(out.sources[0].filename, "hit.txt");
    }

    #[test]
    fn test_no_relevant_documents_canned_answer() {
        let corpus = vec![snapshot("a.txt", "Nothing matching here.")];
        let out = answer_question("zymurgy", &corpus, 5, &LexicalScorer, &config());
        assert_eq!(out.answer, "I couldn't find relevant information in the uploaded resumes.");
        assert!(out.sources.is_empty());
    }

    #[test]
    fn test_skills_question_aggregates_first_seen() {
        let corpus = vec![
            snapshot("a.txt", "Deep Python and Docker skills."),
            snapshot("b.txt", "Docker and AWS skills."),
        ];
        let out = answer_question("What skills do candidates have", &corpus, 5, &LexicalScorer, &config());
        // Rank-major aggregation: the first document contributes python and
        // docker, the second adds aws; the duplicate docker is dropped.
        assert_eq!(
            out.answer,
            "Based on the uploaded resumes, I found these skills: python, docker, aws."
        );
    }

    #[test]
    fn test_skills_question_cap() {
        let mut config = config();
        config.answer_skill_cap = 2;
        let corpus = vec![snapshot("a.txt", "Python, Docker, AWS, and Redis skills.")];
        let out = answer_question("list skills", &corpus, 5, &LexicalScorer, &config);
        assert_eq!(
            out.answer,
            "Based on the uploaded resumes, I found these skills: python, aws."
        );
    }

    #[test]
    fn test_classification_first_trigger_wins() {
        // "skills" and "experience" both present; skills is checked first.
        let corpus = vec![snapshot("a.txt", "Python skills and experience.")];
        let out = answer_question(
            "What skills and experience are there?",
            &corpus,
            5,
            &LexicalScorer,
            &config(),
        );
        assert!(out.answer.starts_with("Based on the uploaded resumes, I found these skills:"));
    }

    #[test]
    fn test_experience_question_lists_companies() {
        let corpus = vec![snapshot(
            "a.txt",
            "EXPERIENCE:\nInitech Technologies (2020) work with Globex Corp (2021).",
        )];
        let out = answer_question("Where did they work", &corpus, 5, &LexicalScorer, &config());
        assert_eq!(
            out.answer,
            "Based on the resumes, I found work experience at: Initech Technologies, Globex Corp."
        );
    }

    #[test]
    fn test_contact_question_lists_email_and_phone() {
        let mut doc = snapshot("a.txt", "Reach me by email anytime.");
        doc.features.contact = ContactFields {
            email: Some("jane@example.com".to_string()),
            phone: Some("555-123-4567".to_string()),
            linkedin: None,
            github: None,
        };
        let corpus = vec![doc];
        let out = answer_question("contact email", &corpus, 5, &LexicalScorer, &config());
        assert_eq!(
            out.answer,
            "Based on the resumes, I found contact information: Email: jane@example.com, Phone: 555-123-4567."
        );
    }

    #[test]
    fn test_general_question_quotes_best_document() {
        let text = "Led the observability program across forty product teams for three years. \
                    Unrelated closing line.";
        let corpus = vec![snapshot("a.txt", text)];
        let out = answer_question("Tell me about observability", &corpus, 5, &LexicalScorer, &config());
        assert_eq!(
            out.answer,
            "Based on the most relevant resume, here's what I found: \
             Led the observability program across forty product teams for three years"
        );
    }

    #[test]
    fn test_general_question_short_sentences_dropped() {
        let corpus = vec![snapshot("a.txt", "Maritime cook. Worked on boats.")];
        let out = answer_question("Tell me about maritime", &corpus, 5, &LexicalScorer, &config());
        assert_eq!(
            out.answer,
            "I found some relevant resumes but couldn't extract specific information to answer your question."
        );
    }

    #[test]
    fn test_snippets_truncated_and_capped() {
        let mut config = config();
        config.snippet_min_chars = 5;
        config.snippet_max_chars = 20;
        let content = "kayak trip one was long enough. kayak trip two also long. \
                       kayak three here too. kayak four never shown.";
        let snippets = relevant_snippets("kayak", content, &config);
        assert_eq!(snippets.len(), 3);
        assert!(snippets.iter().all(|s| s.chars().count() <= 20));
        assert_eq!(snippets[0], "kayak trip one was l");
    }

    #[test]
    fn test_sources_capped_by_k() {
        let corpus: Vec<DocumentSnapshot> = (0..4)
            .map(|i| snapshot(&format!("doc{i}.txt"), "kayak guide"))
            .collect();
        let out = answer_question("kayak", &corpus, 2, &LexicalScorer, &config());
        assert_eq!(out.sources.len(), 2);
        assert_eq!(out.sources[0].filename, "doc0.txt");
        assert_eq!(out.sources[1].filename, "doc1.txt");
    }
}
