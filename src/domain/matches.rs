use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{ListingId, MatchId, SimilarityScore};

/// A stored link between two opposite-type listings whose similarity
/// cleared the threshold. Written once, never updated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Match {
    pub id: MatchId,
    /// Listing whose matching pass created the record.
    pub listing_a_id: ListingId,
    /// Candidate listing found during that pass.
    pub listing_b_id: ListingId,
    pub similarity_score: SimilarityScore,
    pub created_at: NaiveDateTime,
}

impl Match {
    /// Order-independent identity of the matched listings.
    pub fn pair(&self) -> ListingPair {
        ListingPair::new(self.listing_a_id, self.listing_b_id)
    }

    /// Returns `true` when `listing_id` is one side of this match.
    pub fn involves(&self, listing_id: ListingId) -> bool {
        self.listing_a_id == listing_id || self.listing_b_id == listing_id
    }
}

/// Data required to insert a new [`Match`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewMatch {
    pub listing_a_id: ListingId,
    pub listing_b_id: ListingId,
    pub similarity_score: SimilarityScore,
    pub created_at: NaiveDateTime,
}

impl NewMatch {
    pub fn pair(&self) -> ListingPair {
        ListingPair::new(self.listing_a_id, self.listing_b_id)
    }
}

/// Unordered pair of listing identifiers, stored as `(low, high)`.
///
/// `(a, b)` and `(b, a)` normalize to the same value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListingPair {
    low: ListingId,
    high: ListingId,
}

impl ListingPair {
    pub fn new(a: ListingId, b: ListingId) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }

    pub const fn low(self) -> ListingId {
        self.low
    }

    pub const fn high(self) -> ListingId {
        self.high
    }

    /// A listing paired with itself is never a valid match.
    pub fn is_self_pair(self) -> bool {
        self.low == self.high
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_identity_ignores_order() {
        let a = ListingId::new(3).unwrap();
        let b = ListingId::new(9).unwrap();

        assert_eq!(ListingPair::new(a, b), ListingPair::new(b, a));
        assert_eq!(ListingPair::new(b, a).low(), a);
        assert_eq!(ListingPair::new(b, a).high(), b);
        assert!(!ListingPair::new(a, b).is_self_pair());
        assert!(ListingPair::new(a, a).is_self_pair());
    }
}
