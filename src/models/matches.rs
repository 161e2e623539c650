use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::matches::{Match as DomainMatch, NewMatch as DomainNewMatch};
use crate::domain::types::{SimilarityScore, TypeConstraintError};

/// Diesel model representing a row in the `matches` table.
#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::matches)]
pub struct Match {
    pub id: i32,
    pub listing_a_id: i32,
    pub listing_b_id: i32,
    pub pair_low: i32,
    pub pair_high: i32,
    pub similarity_score: f64,
    pub created_at: NaiveDateTime,
}

/// Insertable form of [`Match`] carrying the normalized pair columns.
#[derive(Insertable)]
#[diesel(table_name = crate::schema::matches)]
pub struct NewMatch {
    pub listing_a_id: i32,
    pub listing_b_id: i32,
    pub pair_low: i32,
    pub pair_high: i32,
    pub similarity_score: f64,
    pub created_at: NaiveDateTime,
}

impl TryFrom<Match> for DomainMatch {
    type Error = TypeConstraintError;

    fn try_from(row: Match) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id.try_into()?,
            listing_a_id: row.listing_a_id.try_into()?,
            listing_b_id: row.listing_b_id.try_into()?,
            similarity_score: SimilarityScore::new(row.similarity_score)?,
            created_at: row.created_at,
        })
    }
}

impl From<&DomainNewMatch> for NewMatch {
    fn from(new_match: &DomainNewMatch) -> Self {
        let pair = new_match.pair();
        Self {
            listing_a_id: new_match.listing_a_id.get(),
            listing_b_id: new_match.listing_b_id.get(),
            pair_low: pair.low().get(),
            pair_high: pair.high().get(),
            similarity_score: new_match.similarity_score.get(),
            created_at: new_match.created_at,
        }
    }
}
