//! TF-IDF vectors and cosine similarity between event texts

use std::collections::{BTreeMap, BTreeSet, HashSet};

use super::stopwords::ENGLISH_STOP_WORDS;
use super::WeightedPair;

/// L2-normalized sparse vector, entries sorted by term index
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    entries: Vec<(usize, f64)>,
}

impl SparseVector {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Dot product by merging the two sorted entry lists
    pub fn dot(&self, other: &SparseVector) -> f64 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;
        while i < self.entries.len() && j < other.entries.len() {
            let (ti, vi) = self.entries[i];
            let (tj, vj) = other.entries[j];
            match ti.cmp(&tj) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += vi * vj;
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }
}

/// Bag-of-words vectorizer with smoothed inverse document frequency
pub struct TfIdfVectorizer {
    stop_words: HashSet<&'static str>,
}

impl Default for TfIdfVectorizer {
    fn default() -> Self {
        Self::english()
    }
}

impl TfIdfVectorizer {
    /// Vectorizer filtering the checked-in English stopword list
    pub fn english() -> Self {
        Self {
            stop_words: ENGLISH_STOP_WORDS.iter().copied().collect(),
        }
    }

    /// Lower-cased word tokens of at least two characters, minus stopwords
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        text.to_lowercase()
            .split(|c: char| !(c.is_alphanumeric() || c == '_'))
            .filter(|token| token.chars().count() >= 2)
            .filter(|token| !self.stop_words.contains(token))
            .map(str::to_string)
            .collect()
    }

    /// Fits the vocabulary on `documents` and returns one vector per document.
    ///
    /// idf(t) = ln((1 + n) / (1 + df(t))) + 1; raw term counts; L2 norm.
    pub fn fit_transform(&self, documents: &[String]) -> Vec<SparseVector> {
        let tokenized: Vec<Vec<String>> = documents.iter().map(|d| self.tokenize(d)).collect();

        let vocabulary: BTreeMap<&str, usize> = tokenized
            .iter()
            .flatten()
            .map(String::as_str)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .enumerate()
            .map(|(index, term)| (term, index))
            .collect();

        if vocabulary.is_empty() {
            return vec![SparseVector::default(); documents.len()];
        }

        let mut document_frequency = vec![0usize; vocabulary.len()];
        let term_counts: Vec<BTreeMap<usize, f64>> = tokenized
            .iter()
            .map(|tokens| {
                let mut counts = BTreeMap::new();
                for token in tokens {
                    *counts.entry(vocabulary[token.as_str()]).or_insert(0.0) += 1.0;
                }
                for &term in counts.keys() {
                    document_frequency[term] += 1;
                }
                counts
            })
            .collect();

        let n = documents.len() as f64;
        let idf: Vec<f64> = document_frequency
            .iter()
            .map(|&df| ((1.0 + n) / (1.0 + df as f64)).ln() + 1.0)
            .collect();

        term_counts
            .into_iter()
            .map(|counts| {
                let weighted: Vec<(usize, f64)> = counts
                    .into_iter()
                    .map(|(term, count)| (term, count * idf[term]))
                    .collect();
                let norm = weighted.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
                if norm > 0.0 {
                    SparseVector {
                        entries: weighted.into_iter().map(|(t, w)| (t, w / norm)).collect(),
                    }
                } else {
                    SparseVector::default()
                }
            })
            .collect()
    }
}

/// Pairwise cosine similarity of already normalized vectors
pub fn similarity_matrix(vectors: &[SparseVector]) -> Vec<Vec<f64>> {
    vectors
        .iter()
        .map(|a| vectors.iter().map(|b| a.dot(b)).collect())
        .collect()
}

/// Directed content edges for every ordered pair above `min_similarity`
pub fn content_edges(texts: &[String], weight: f64, min_similarity: f64) -> Vec<WeightedPair> {
    if texts.len() < 2 {
        return Vec::new();
    }

    let vectors = TfIdfVectorizer::english().fit_transform(texts);
    let similarities = similarity_matrix(&vectors);

    let mut edges = Vec::new();
    for (i, row) in similarities.iter().enumerate() {
        for (j, &similarity) in row.iter().enumerate() {
            if i != j && similarity > min_similarity {
                edges.push(WeightedPair {
                    from: i,
                    to: j,
                    weight: weight * similarity,
                });
            }
        }
    }
    edges
}
