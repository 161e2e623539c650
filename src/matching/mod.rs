//! Match computation and persistence for opposite-type listings.
//!
//! A matching pass runs whenever a listing is created or its scored content
//! changes: [`MatchEngine::find_candidates`] scores every listing of the
//! opposite type, and [`MatchEngine::upsert_matches`] stores the pairs that
//! are not matched yet, together with their notifications, in a single
//! transaction.

use chrono::Utc;
use serde::Deserialize;
use thiserror::Error;

use pushkind_common::repository::errors::RepositoryError;

use crate::domain::listing::Listing;
use crate::domain::matches::{ListingPair, Match, NewMatch};
use crate::domain::types::SimilarityScore;
use crate::repository::{ListingReader, MatchStore};

pub mod notify;
pub mod scorer;

pub use scorer::SimilarityScorer;

/// Tunable weights and threshold of the matching engine.
///
/// The weights favour the name over the description over the category.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    pub name_weight: f64,
    pub description_weight: f64,
    pub category_weight: f64,
    /// Minimum score (inclusive) for a pair to be stored.
    pub threshold: f64,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            name_weight: 0.5,
            description_weight: 0.4,
            category_weight: 0.1,
            threshold: 70.0,
        }
    }
}

impl MatchingConfig {
    /// Checks that weights are non-negative and sum to at most one, and that
    /// the threshold lies within the score range.
    pub fn validate(&self) -> Result<(), MatchingError> {
        let weights = [
            ("name_weight", self.name_weight),
            ("description_weight", self.description_weight),
            ("category_weight", self.category_weight),
        ];
        for (field, weight) in weights {
            if !weight.is_finite() || weight < 0.0 {
                return Err(MatchingError::InvalidConfig(format!(
                    "{field} must be a non-negative number"
                )));
            }
        }

        let total: f64 = weights.iter().map(|(_, weight)| weight).sum();
        if total <= 0.0 || total > 1.0 + 1e-9 {
            return Err(MatchingError::InvalidConfig(format!(
                "weights must sum to a value in (0, 1], got {total}"
            )));
        }

        if !(SimilarityScore::MIN..=SimilarityScore::MAX).contains(&self.threshold) {
            return Err(MatchingError::InvalidConfig(format!(
                "threshold must be between 0 and 100, got {}",
                self.threshold
            )));
        }

        Ok(())
    }
}

/// Errors raised by a matching pass.
#[derive(Debug, Error)]
pub enum MatchingError {
    /// Querying candidates or committing the pass failed; nothing was
    /// persisted and the pass may be retried.
    #[error("storage error during matching: {0}")]
    Storage(RepositoryError),
    #[error("invalid matching configuration: {0}")]
    InvalidConfig(String),
}

impl From<RepositoryError> for MatchingError {
    fn from(value: RepositoryError) -> Self {
        Self::Storage(value)
    }
}

/// An opposite-type listing whose score cleared the threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub listing: Listing,
    pub score: SimilarityScore,
}

/// Finds and stores matches between opposite-type listings.
#[derive(Debug, Clone)]
pub struct MatchEngine {
    config: MatchingConfig,
    scorer: SimilarityScorer,
}

impl MatchEngine {
    pub fn new(config: MatchingConfig) -> Result<Self, MatchingError> {
        config.validate()?;
        Ok(Self {
            scorer: SimilarityScorer::new(&config),
            config,
        })
    }

    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }

    pub fn score(&self, a: &Listing, b: &Listing) -> SimilarityScore {
        self.scorer.score(a, b)
    }

    /// Whether `score` is high enough to store a match.
    pub fn accepts(&self, score: SimilarityScore) -> bool {
        score.get() >= self.config.threshold
    }

    /// Scores every opposite-type listing against `listing` and keeps those
    /// at or above the threshold, ordered by candidate id.
    pub fn find_candidates<R>(
        &self,
        listing: &Listing,
        repo: &R,
    ) -> Result<Vec<ScoredCandidate>, MatchingError>
    where
        R: ListingReader + ?Sized,
    {
        let pool = repo.query_opposite_type(listing.item_type, listing.id)?;

        let mut candidates: Vec<ScoredCandidate> = pool
            .into_iter()
            .filter(|candidate| candidate.id != listing.id)
            .filter_map(|candidate| {
                let score = self.score(listing, &candidate);
                self.accepts(score).then_some(ScoredCandidate {
                    listing: candidate,
                    score,
                })
            })
            .collect();
        candidates.sort_by_key(|candidate| candidate.listing.id);

        log::debug!(
            "Listing {} has {} candidate(s) at or above {}",
            listing.id,
            candidates.len(),
            self.config.threshold
        );
        Ok(candidates)
    }

    /// Stores a match for every candidate pair not matched yet and notifies
    /// both owners, all in one transaction.
    ///
    /// Existing pairs are left untouched, whichever order they were stored
    /// in. Returns only the matches created by this call.
    pub fn upsert_matches<S>(
        &self,
        listing: &Listing,
        candidates: &[ScoredCandidate],
        store: &S,
    ) -> Result<Vec<Match>, MatchingError>
    where
        S: MatchStore,
    {
        if candidates.is_empty() {
            return Ok(vec![]);
        }

        let created = store.run_in_transaction(|uow| {
            let mut created = Vec::new();
            for candidate in candidates {
                let pair = ListingPair::new(listing.id, candidate.listing.id);
                if pair.is_self_pair() || uow.exists_pair(listing.id, candidate.listing.id)? {
                    continue;
                }

                let new_match = NewMatch {
                    listing_a_id: listing.id,
                    listing_b_id: candidate.listing.id,
                    similarity_score: candidate.score,
                    created_at: Utc::now().naive_utc(),
                };
                let Some(stored) = uow.insert_match(&new_match)? else {
                    log::info!(
                        "Match {}-{} was stored concurrently, skipping",
                        pair.low(),
                        pair.high()
                    );
                    continue;
                };

                notify::notify_pair(&mut *uow, &stored, listing, &candidate.listing)?;
                created.push(stored);
            }
            Ok::<_, MatchingError>(created)
        })?;

        if !created.is_empty() {
            log::info!(
                "Stored {} new match(es) for listing {}",
                created.len(),
                listing.id
            );
        }
        Ok(created)
    }

    /// Runs a full matching pass for `listing`.
    pub fn run<R>(&self, listing: &Listing, repo: &R) -> Result<Vec<Match>, MatchingError>
    where
        R: ListingReader + MatchStore,
    {
        let candidates = self.find_candidates(listing, repo)?;
        self.upsert_matches(listing, &candidates, repo)
    }
}

impl Default for MatchEngine {
    fn default() -> Self {
        let config = MatchingConfig::default();
        Self {
            scorer: SimilarityScorer::new(&config),
            config,
        }
    }
}
