//! Fuzzy text similarity between listings.
//!
//! Each text field is compared with a token-set ratio: both strings are
//! lowercased, split on anything that is not alphanumeric and deduplicated
//! into sorted sets, so word order and repetition do not matter. Strings
//! built from the shared and the leftover tokens are then compared with a
//! normalized Indel ratio (longest common subsequence), which gives partial
//! credit for near-identical words such as `bike` and `bikes`.

use std::collections::BTreeSet;

use rapidfuzz::distance::indel;

use crate::domain::listing::Listing;
use crate::domain::types::SimilarityScore;
use crate::matching::MatchingConfig;

/// Computes the weighted similarity between two listings.
///
/// Symmetric by construction: `score(a, b) == score(b, a)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarityScorer {
    name_weight: f64,
    description_weight: f64,
    category_weight: f64,
}

impl SimilarityScorer {
    pub fn new(config: &MatchingConfig) -> Self {
        Self {
            name_weight: config.name_weight,
            description_weight: config.description_weight,
            category_weight: config.category_weight,
        }
    }

    /// Weighted sum of the name, description and category sub-scores,
    /// rounded to two decimal places.
    pub fn score(&self, a: &Listing, b: &Listing) -> SimilarityScore {
        let name = token_set_ratio(a.name.as_str(), b.name.as_str());
        let description = token_set_ratio(a.description_text(), b.description_text());
        let category = token_set_ratio(a.category_text(), b.category_text());

        let weighted = self.name_weight * name
            + self.description_weight * description
            + self.category_weight * category;

        SimilarityScore::saturating(round_to_hundredths(weighted))
    }
}

impl Default for SimilarityScorer {
    fn default() -> Self {
        Self::new(&MatchingConfig::default())
    }
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn tokenize(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn join_tokens(head: &str, tail: &[&str]) -> String {
    let tail = tail.join(" ");
    match (head.is_empty(), tail.is_empty()) {
        (true, _) => tail,
        (_, true) => head.to_string(),
        _ => format!("{head} {tail}"),
    }
}

/// Token-set similarity of two strings in [0, 100].
///
/// Returns 0 when either side has no tokens, so two empty fields never
/// count as a match.
pub fn token_set_ratio(a: &str, b: &str) -> f64 {
    let tokens_a = tokenize(a);
    let tokens_b = tokenize(b);
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }

    let common: Vec<&str> = tokens_a.intersection(&tokens_b).map(String::as_str).collect();
    let only_a: Vec<&str> = tokens_a.difference(&tokens_b).map(String::as_str).collect();
    let only_b: Vec<&str> = tokens_b.difference(&tokens_a).map(String::as_str).collect();

    // One token set contains the other.
    if !common.is_empty() && (only_a.is_empty() || only_b.is_empty()) {
        return 100.0;
    }

    let sect = common.join(" ");
    let with_a = join_tokens(&sect, &only_a);
    let with_b = join_tokens(&sect, &only_b);

    let mut best = indel_ratio(&with_a, &with_b);
    if !sect.is_empty() {
        best = best
            .max(indel_ratio(&sect, &with_a))
            .max(indel_ratio(&sect, &with_b));
    }
    best
}

/// Normalized Indel similarity scaled to [0, 100]:
/// `100 * 2 * lcs / (len_a + len_b)` over characters.
pub fn indel_ratio(a: &str, b: &str) -> f64 {
    100.0 * indel::normalized_similarity(a.chars(), b.chars())
}
