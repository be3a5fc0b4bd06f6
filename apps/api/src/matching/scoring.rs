#![allow(dead_code)]

// Similarity scoring between a query and a document.
//
// Two strategies behind one trait: lexical term overlap (the default) and
// cosine over dense vectors. `AppState` carries an `Arc<dyn SimilarityScorer>`
// chosen at startup from SIMILARITY_STRATEGY, so the ranking pipeline never
// knows which one is running.

use std::sync::Arc;

use crate::matching::normalize::normalize;

/// Query side of a comparison, built once per request.
#[derive(Debug, Clone)]
pub struct QueryRepr {
    /// Lowercased whitespace tokens. Duplicates count separately.
    pub terms: Vec<String>,
    /// Canonical form for dense-vector input.
    pub normalized: String,
    pub embedding: Option<Vec<f64>>,
}

impl QueryRepr {
    pub fn new(raw: &str) -> Self {
        Self {
            terms: raw.to_lowercase().split_whitespace().map(str::to_string).collect(),
            normalized: normalize(raw),
            embedding: None,
        }
    }
}

/// Document side of a comparison: extracted text plus a stored vector
/// when one exists.
#[derive(Debug, Clone, Copy)]
pub struct DocRepr<'a> {
    pub text: &'a str,
    pub embedding: Option<&'a [f64]>,
}

pub trait SimilarityScorer: Send + Sync {
    /// Relevance of `doc` to `query`, always in [0, 1].
    fn score(&self, query: &QueryRepr, doc: &DocRepr<'_>) -> f64;

    /// Strategy label, reported at startup.
    fn name(&self) -> &'static str;
}

/// Fraction of query terms appearing as substrings of the document.
pub struct LexicalScorer;

impl SimilarityScorer for LexicalScorer {
    fn score(&self, query: &QueryRepr, doc: &DocRepr<'_>) -> f64 {
        if query.terms.is_empty() {
            return 0.0;
        }
        let haystack = doc.text.to_lowercase();
        let hits = query
            .terms
            .iter()
            .filter(|term| haystack.contains(term.as_str()))
            .count();
        hits as f64 / query.terms.len() as f64
    }

    fn name(&self) -> &'static str {
        "lexical"
    }
}

/// Cosine similarity over stored vectors. Scores 0.0 whenever either side
/// has no vector, so the pipeline stays total while embeddings are absent.
pub struct CosineScorer;

impl SimilarityScorer for CosineScorer {
    fn score(&self, query: &QueryRepr, doc: &DocRepr<'_>) -> f64 {
        match (query.embedding.as_deref(), doc.embedding) {
            (Some(a), Some(b)) => cosine(a, b).clamp(0.0, 1.0),
            _ => 0.0,
        }
    }

    fn name(&self) -> &'static str {
        "vector"
    }
}

/// Plain cosine. A zero-magnitude vector on either side scores 0.0 instead
/// of dividing by zero.
fn cosine(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Builds the scorer named by SIMILARITY_STRATEGY. An unknown name is a
/// startup error, never a silent fallback.
pub fn scorer_from_strategy(strategy: &str) -> anyhow::Result<Arc<dyn SimilarityScorer>> {
    match strategy {
        "lexical" => Ok(Arc::new(LexicalScorer)),
        "vector" => Ok(Arc::new(CosineScorer)),
        other => anyhow::bail!(
            "unsupported similarity strategy '{other}' (expected 'lexical' or 'vector')"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str) -> DocRepr<'_> {
        DocRepr { text, embedding: None }
    }

    #[test]
    fn test_lexical_full_overlap() {
        let query = QueryRepr::new("python docker");
        let score = LexicalScorer.score(&query, &doc("Python and Docker daily"));
        assert_eq!(score, 1.0);
    }

    #[test]
    fn test_lexical_partial_overlap() {
        let query = QueryRepr::new("python cobol");
        let score = LexicalScorer.score(&query, &doc("Python shop"));
        assert_eq!(score, 0.5);
    }

    #[test]
    fn test_lexical_duplicate_terms_count_separately() {
        let query = QueryRepr::new("python python cobol");
        let score = LexicalScorer.score(&query, &doc("python here"));
        assert!((score - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_lexical_empty_query_scores_zero() {
        let query = QueryRepr::new("   ");
        assert_eq!(LexicalScorer.score(&query, &doc("anything")), 0.0);
    }

    #[test]
    fn test_lexical_empty_document_scores_zero() {
        let query = QueryRepr::new("python");
        assert_eq!(LexicalScorer.score(&query, &doc("")), 0.0);
    }

    #[test]
    fn test_lexical_score_stays_in_bounds() {
        let docs = ["", "python", "python rust sql", "PYTHON PYTHON"];
        let query = QueryRepr::new("python rust go");
        for text in docs {
            let score = LexicalScorer.score(&query, &doc(text));
            assert!((0.0..=1.0).contains(&score), "score {score} for {text:?}");
        }
    }

    #[test]
    fn test_cosine_parallel_vectors() {
        let mut query = QueryRepr::new("anything");
        query.embedding = Some(vec![1.0, 2.0, 3.0]);
        let vector = [2.0, 4.0, 6.0];
        let doc = DocRepr { text: "", embedding: Some(&vector) };
        assert!((CosineScorer.score(&query, &doc) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_cosine_orthogonal_vectors() {
        let mut query = QueryRepr::new("anything");
        query.embedding = Some(vec![1.0, 0.0]);
        let vector = [0.0, 1.0];
        let doc = DocRepr { text: "", embedding: Some(&vector) };
        assert_eq!(CosineScorer.score(&query, &doc), 0.0);
    }

    #[test]
    fn test_cosine_zero_vector_scores_zero() {
        let mut query = QueryRepr::new("anything");
        query.embedding = Some(vec![1.0, 2.0]);
        let vector = [0.0, 0.0];
        let doc = DocRepr { text: "", embedding: Some(&vector) };
        assert_eq!(CosineScorer.score(&query, &doc), 0.0);
    }

    #[test]
    fn test_cosine_negative_similarity_clamps_to_zero() {
        let mut query = QueryRepr::new("anything");
        query.embedding = Some(vec![1.0, 0.0]);
        let vector = [-1.0, 0.0];
        let doc = DocRepr { text: "", embedding: Some(&vector) };
        assert_eq!(CosineScorer.score(&query, &doc), 0.0);
    }

    #[test]
    fn test_cosine_missing_either_side_scores_zero() {
        let query = QueryRepr::new("anything");
        let vector = [1.0, 2.0];
        let with_vector = DocRepr { text: "", embedding: Some(&vector) };
        assert_eq!(CosineScorer.score(&query, &with_vector), 0.0);

        let mut query = QueryRepr::new("anything");
        query.embedding = Some(vec![1.0, 2.0]);
        assert_eq!(CosineScorer.score(&query, &doc("text only")), 0.0);
    }

    #[test]
    fn test_query_repr_normalized_form() {
        let query = QueryRepr::new("Senior C++ Engineer!!");
        assert_eq!(query.normalized, "senior engineer!!");
        assert_eq!(query.terms, vec!["senior", "c++", "engineer!!"]);
    }

    #[test]
    fn test_strategy_selection() {
        assert_eq!(scorer_from_strategy("lexical").unwrap().name(), "lexical");
        assert_eq!(scorer_from_strategy("vector").unwrap().name(), "vector");
        assert!(scorer_from_strategy("semantic").is_err());
    }
}
