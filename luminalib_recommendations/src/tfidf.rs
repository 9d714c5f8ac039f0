use std::collections::{BTreeMap, HashMap};

use itertools::Itertools;

mod stop_words;

pub const DEFAULT_MAX_FEATURES: usize = 100;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum TfidfError {
    #[error("Empty vocabulary, documents contain only stop words")]
    EmptyVocabulary,

    #[error("Vectors have different dimensions {0} and {1}")]
    DimensionMismatch(usize, usize),
}

/// Vectorizer fitted on a whole corpus at once.
///
/// The vocabulary keeps the `max_features` terms with the highest term frequency across the
/// corpus, ties broken alphabetically. Weights are raw counts times smooth idf
/// `ln((1 + n) / (1 + df)) + 1`, and every row is L2 normalized.
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    max_features: usize,
}

impl Default for TfidfVectorizer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FEATURES)
    }
}

impl TfidfVectorizer {
    pub fn new(max_features: usize) -> Self {
        Self { max_features }
    }

    /// One row per document, in the order of `documents`
    pub fn fit_transform<S: AsRef<str>>(
        &self,
        documents: &[S],
    ) -> Result<Vec<Vec<f64>>, TfidfError> {
        let term_counts: Vec<HashMap<String, usize>> = documents
            .iter()
            .map(|document| tokenize(document.as_ref()).into_iter().counts())
            .collect();

        let mut corpus_frequency: BTreeMap<&str, usize> = BTreeMap::new();
        let mut document_frequency: HashMap<&str, usize> = HashMap::new();
        for counts in &term_counts {
            for (term, count) in counts {
                *corpus_frequency.entry(term.as_str()).or_default() += count;
                *document_frequency.entry(term.as_str()).or_default() += 1;
            }
        }

        if corpus_frequency.is_empty() {
            return Err(TfidfError::EmptyVocabulary);
        }

        // BTreeMap iteration is alphabetical and the sort is stable
        let vocabulary: HashMap<&str, usize> = corpus_frequency
            .iter()
            .sorted_by(|a, b| b.1.cmp(a.1))
            .take(self.max_features)
            .map(|(term, _)| *term)
            .sorted()
            .enumerate()
            .map(|(idx, term)| (term, idx))
            .collect();

        let n_documents = documents.len() as f64;
        let mut idf = vec![0.0; vocabulary.len()];
        for (term, idx) in &vocabulary {
            let df = document_frequency.get(term).copied().unwrap_or_default() as f64;
            idf[*idx] = ((1.0 + n_documents) / (1.0 + df)).ln() + 1.0;
        }

        let rows = term_counts
            .iter()
            .map(|counts| {
                let mut row = vec![0.0; vocabulary.len()];
                for (term, count) in counts {
                    if let Some(idx) = vocabulary.get(term.as_str()) {
                        row[*idx] = *count as f64 * idf[*idx];
                    }
                }
                l2_normalize(&mut row);
                row
            })
            .collect();

        Ok(rows)
    }
}

/// Lower-cased tokens of at least two word characters, stop words removed
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|token| token.chars().count() >= 2)
        .filter(|token| !stop_words::is_stop_word(token))
        .map(str::to_string)
        .collect()
}

fn l2_normalize(row: &mut [f64]) {
    let norm = row.iter().map(|value| value * value).sum::<f64>().sqrt();
    if norm > 0.0 {
        row.iter_mut().for_each(|value| *value /= norm);
    }
}

/// Cosine similarity, 0 when either vector is all zeros
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> Result<f64, TfidfError> {
    if a.len() != b.len() {
        return Err(TfidfError::DimensionMismatch(a.len(), b.len()));
    }
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }
    Ok(dot / (norm_a * norm_b))
}

#[cfg(test)]
mod tfidf_tests {
    use super::*;

    #[test]
    fn tokenizer_drops_stop_words_and_short_tokens() {
        assert_eq!(
            tokenize("The Hobbit, or There and Back Again: a 2nd_edition by J. R. R. Tolkien"),
            vec!["hobbit", "2nd_edition", "tolkien"]
        );
    }

    #[test]
    fn only_stop_words_is_an_error() {
        let vectorizer = TfidfVectorizer::default();
        assert_eq!(
            vectorizer.fit_transform(&["the and of", "a b c"]),
            Err(TfidfError::EmptyVocabulary)
        );
        assert_eq!(
            vectorizer.fit_transform::<&str>(&[]),
            Err(TfidfError::EmptyVocabulary)
        );
    }

    #[test]
    fn rows_are_unit_length_or_zero() {
        let rows = TfidfVectorizer::default()
            .fit_transform(&["dragons and wizards", "wizards school", "the of and"])
            .unwrap();
        assert_eq!(rows.len(), 3);
        for row in &rows[..2] {
            let norm = row.iter().map(|v| v * v).sum::<f64>().sqrt();
            assert!((norm - 1.0).abs() < 1e-9);
        }
        assert!(rows[2].iter().all(|v| *v == 0.0));
    }

    #[test]
    fn smooth_idf_weights() {
        // vocabulary sorted: [dragons, wizards]
        let rows = TfidfVectorizer::default()
            .fit_transform(&["dragons wizards", "wizards"])
            .unwrap();
        let idf_dragons = (3.0f64 / 2.0).ln() + 1.0;
        let idf_wizards = 1.0;
        let norm = (idf_dragons * idf_dragons + idf_wizards * idf_wizards).sqrt();
        assert!((rows[0][0] - idf_dragons / norm).abs() < 1e-9);
        assert!((rows[0][1] - idf_wizards / norm).abs() < 1e-9);
        assert_eq!(rows[1], vec![0.0, 1.0]);
    }

    #[test]
    fn vocabulary_keeps_most_frequent_terms_with_alphabetical_ties() {
        let rows = TfidfVectorizer::new(2)
            .fit_transform(&["zebra zebra apple mango", "mango banana"])
            .unwrap();
        // zebra 2, mango 2 kept; apple and banana (1 each) dropped
        assert_eq!(rows[0].len(), 2);
        assert_eq!(rows[1][0], 1.0);
        assert_eq!(rows[1][1], 0.0);

        let rows = TfidfVectorizer::new(1)
            .fit_transform(&["pear apple", "kiwi"])
            .unwrap();
        // all tie on 1, apple wins alphabetically
        assert_eq!(rows, vec![vec![1.0], vec![0.0]]);
    }

    #[test]
    fn cosine_similarity_of_vectors() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]).unwrap() - 1.0).abs() < 1e-9);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).unwrap(), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[0.0, 1.0]).unwrap(), 0.0);
        assert_eq!(
            cosine_similarity(&[1.0], &[1.0, 0.0]),
            Err(TfidfError::DimensionMismatch(1, 2))
        );
    }
}
