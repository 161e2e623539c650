use serde::Serialize;

use crate::domain::listing::Listing;
use crate::domain::matches::Match;

/// One page of listings together with paging metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingPageDto {
    pub items: Vec<Listing>,
    pub page: usize,
    pub total_pages: usize,
    pub total: usize,
}

/// A saved listing and the matches its matching pass created.
///
/// `matching_failed` is set when the listing was stored but its pass was
/// not; the pass can be retried without saving the listing again.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavedListingDto {
    pub listing: Listing,
    pub matches: Vec<Match>,
    pub matching_failed: bool,
}

impl SavedListingDto {
    pub fn new(listing: Listing, matches: Vec<Match>) -> Self {
        Self {
            listing,
            matches,
            matching_failed: false,
        }
    }

    pub fn without_matching(listing: Listing) -> Self {
        Self {
            listing,
            matches: vec![],
            matching_failed: true,
        }
    }
}
