//! TF-IDF vector space builder.
//!
//! Fits a term-weighting model over the full corpus of content documents:
//! term frequency per document over unigrams and bigrams, smoothed inverse
//! document frequency, document-frequency bounds expressed as corpus
//! fractions, and L2-normalized row vectors so a plain dot product equals
//! cosine similarity.
//!
//! No stop-word list is applied: the corpus is not general-purpose English
//! prose, and stripping common words would remove meaningful Vietnamese
//! terms.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{RecommendError, Result};

/// Default lower document-frequency bound, as a fraction of corpus size.
pub const DEFAULT_MIN_DF: f64 = 0.01;

/// Default upper document-frequency bound, as a fraction of corpus size.
pub const DEFAULT_MAX_DF: f64 = 0.95;

/// A sparse weighted-term vector: `(column, weight)` pairs sorted by column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseVector(pub Vec<(u32, f32)>);

impl SparseVector {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Dot product via merge join over the sorted index lists.
    pub fn dot(&self, other: &SparseVector) -> f64 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0f64;
        while i < self.0.len() && j < other.0.len() {
            let (ci, wi) = self.0[i];
            let (cj, wj) = other.0[j];
            match ci.cmp(&cj) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += f64::from(wi) * f64::from(wj);
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }

    pub fn norm(&self) -> f64 {
        self.0
            .iter()
            .map(|(_, w)| f64::from(*w) * f64::from(*w))
            .sum::<f64>()
            .sqrt()
    }

    /// Cosine similarity: dot product over the product of norms, defined as
    /// 0 when either norm is 0.
    pub fn cosine(&self, other: &SparseVector) -> f64 {
        let denom = self.norm() * other.norm();
        if denom <= f64::EPSILON {
            return 0.0;
        }
        self.dot(other) / denom
    }

    fn l2_normalize(&mut self) {
        let norm = self.norm();
        if norm > f64::EPSILON {
            for (_, w) in &mut self.0 {
                *w = (f64::from(*w) / norm) as f32;
            }
        }
    }
}

/// Split normalized text into word tokens: alphanumeric runs of length >= 2.
pub fn tokenize(text: &str) -> Vec<&str> {
    text.split(|c: char| !c.is_alphanumeric() && c != '_')
        .filter(|t| t.chars().count() >= 2)
        .collect()
}

/// Expand tokens into unigrams plus adjacent bigrams.
fn ngrams(tokens: &[&str]) -> Vec<String> {
    let mut terms: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();
    for pair in tokens.windows(2) {
        terms.push(format!("{} {}", pair[0], pair[1]));
    }
    terms
}

fn term_counts(text: &str) -> HashMap<String, u32> {
    let mut counts: HashMap<String, u32> = HashMap::new();
    for term in ngrams(&tokenize(text)) {
        *counts.entry(term).or_insert(0) += 1;
    }
    counts
}

/// The fitted vocabulary and IDF weights. Immutable once returned from
/// [`TfidfVectorizer::fit`] until the next retrain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfModel {
    /// term -> column index. Columns are assigned in lexicographic term
    /// order for reproducible layouts across identical corpora.
    pub vocabulary: HashMap<String, u32>,
    /// IDF weight per column.
    pub idf: Vec<f32>,
}

impl TfidfModel {
    pub fn vocab_len(&self) -> usize {
        self.idf.len()
    }

    /// Vectorize an arbitrary text through the fitted model. Out-of-vocabulary
    /// terms are ignored, not an error. The result is L2-normalized.
    pub fn transform(&self, text: &str) -> SparseVector {
        let mut entries: Vec<(u32, f32)> = term_counts(text)
            .into_iter()
            .filter_map(|(term, count)| {
                self.vocabulary
                    .get(&term)
                    .map(|&col| (col, count as f32 * self.idf[col as usize]))
            })
            .collect();
        entries.sort_unstable_by_key(|(col, _)| *col);
        let mut vec = SparseVector(entries);
        vec.l2_normalize();
        vec
    }
}

/// Fits a [`TfidfModel`] plus the corpus term matrix.
///
/// Both document-frequency bounds are fractions of corpus size, so the
/// thresholds scale automatically with catalog size: terms in fewer than
/// `min_df` or more than `max_df` of documents are excluded.
#[derive(Debug, Clone, Copy)]
pub struct TfidfVectorizer {
    pub min_df: f64,
    pub max_df: f64,
}

impl Default for TfidfVectorizer {
    fn default() -> Self {
        Self {
            min_df: DEFAULT_MIN_DF,
            max_df: DEFAULT_MAX_DF,
        }
    }
}

impl TfidfVectorizer {
    pub fn new(min_df: f64, max_df: f64) -> Self {
        Self { min_df, max_df }
    }

    /// Fit the weighting model over the corpus and return it together with
    /// one L2-normalized row vector per document, aligned by index.
    ///
    /// Fails with [`RecommendError::EmptyCorpus`] for a zero-document corpus.
    pub fn fit(&self, corpus: &[String]) -> Result<(TfidfModel, Vec<SparseVector>)> {
        if corpus.is_empty() {
            return Err(RecommendError::EmptyCorpus);
        }
        let n = corpus.len() as f64;

        let doc_counts: Vec<HashMap<String, u32>> =
            corpus.iter().map(|doc| term_counts(doc)).collect();

        // Document frequency per term. BTreeMap gives the lexicographic
        // column order.
        let mut df: BTreeMap<&str, usize> = BTreeMap::new();
        for counts in &doc_counts {
            let unique: HashSet<&str> = counts.keys().map(String::as_str).collect();
            for term in unique {
                *df.entry(term).or_insert(0) += 1;
            }
        }

        let mut vocabulary: HashMap<String, u32> = HashMap::new();
        let mut idf: Vec<f32> = Vec::new();
        for (term, count) in &df {
            let fraction = *count as f64 / n;
            if fraction < self.min_df || fraction > self.max_df {
                continue;
            }
            let col = idf.len() as u32;
            vocabulary.insert((*term).to_string(), col);
            idf.push((((1.0 + n) / (1.0 + *count as f64)).ln() + 1.0) as f32);
        }

        let matrix: Vec<SparseVector> = doc_counts
            .iter()
            .map(|counts| {
                let mut entries: Vec<(u32, f32)> = counts
                    .iter()
                    .filter_map(|(term, count)| {
                        vocabulary
                            .get(term)
                            .map(|&col| (col, *count as f32 * idf[col as usize]))
                    })
                    .collect();
                entries.sort_unstable_by_key(|(col, _)| *col);
                let mut vec = SparseVector(entries);
                vec.l2_normalize();
                vec
            })
            .collect();

        Ok((TfidfModel { vocabulary, idf }, matrix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_fit_empty_corpus_fails() {
        let result = TfidfVectorizer::default().fit(&[]);
        assert!(matches!(result, Err(RecommendError::EmptyCorpus)));
    }

    #[test]
    fn test_fit_row_count_matches_corpus() {
        let corpus = docs(&["gold ring", "gold bracelet", "silver watch"]);
        let (model, matrix) = TfidfVectorizer::default().fit(&corpus).unwrap();
        assert_eq!(matrix.len(), corpus.len());
        for row in &matrix {
            for (col, _) in &row.0 {
                assert!((*col as usize) < model.vocab_len());
            }
        }
    }

    #[test]
    fn test_tokenize_drops_single_chars() {
        assert_eq!(tokenize("a gold ring x"), vec!["gold", "ring"]);
    }

    #[test]
    fn test_tokenize_keeps_tag_tokens() {
        assert_eq!(
            tokenize("price_very_low star_4"),
            vec!["price_very_low", "star_4"]
        );
    }

    #[test]
    fn test_bigrams_in_vocabulary() {
        let corpus = docs(&["gold ring", "gold ring", "silver watch"]);
        let (model, _) = TfidfVectorizer::default().fit(&corpus).unwrap();
        assert!(model.vocabulary.contains_key("gold ring"));
    }

    #[test]
    fn test_max_df_excludes_ubiquitous_terms() {
        let corpus = docs(&["gold ring", "gold watch", "gold chain"]);
        let (model, _) = TfidfVectorizer::default().fit(&corpus).unwrap();
        // "gold" appears in every document (df = 1.0 > 0.95) and is cut.
        assert!(!model.vocabulary.contains_key("gold"));
        assert!(model.vocabulary.contains_key("ring"));
    }

    #[test]
    fn test_min_df_excludes_rare_terms() {
        let vectorizer = TfidfVectorizer::new(0.5, 0.95);
        let corpus = docs(&["gold ring", "gold bracelet", "silver watch"]);
        let (model, _) = vectorizer.fit(&corpus).unwrap();
        // "silver" appears in 1/3 of documents, below the 0.5 bound.
        assert!(!model.vocabulary.contains_key("silver"));
        assert!(model.vocabulary.contains_key("gold"));
    }

    #[test]
    fn test_rows_are_unit_length() {
        let corpus = docs(&["gold ring", "gold bracelet", "silver watch"]);
        let (_, matrix) = TfidfVectorizer::default().fit(&corpus).unwrap();
        for row in &matrix {
            if !row.is_empty() {
                assert!((row.norm() - 1.0).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_transform_ignores_oov_terms() {
        let corpus = docs(&["gold ring", "gold bracelet", "silver watch"]);
        let (model, _) = TfidfVectorizer::default().fit(&corpus).unwrap();
        assert!(model.transform("platinum necklace").is_empty());
        assert!(!model.transform("platinum ring").is_empty());
    }

    #[test]
    fn test_identical_documents_have_cosine_one() {
        let corpus = docs(&["gold ring", "gold ring", "silver watch"]);
        let (_, matrix) = TfidfVectorizer::default().fit(&corpus).unwrap();
        assert!((matrix[0].cosine(&matrix[1]) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_disjoint_documents_have_cosine_zero() {
        let corpus = docs(&["gold ring", "silver watch", "linen dress"]);
        let (_, matrix) = TfidfVectorizer::default().fit(&corpus).unwrap();
        assert_eq!(matrix[0].cosine(&matrix[1]), 0.0);
    }

    #[test]
    fn test_cosine_zero_norm_is_zero() {
        let empty = SparseVector::default();
        let other = SparseVector(vec![(0, 1.0)]);
        assert_eq!(empty.cosine(&other), 0.0);
    }
}
