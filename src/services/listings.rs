use chrono::Utc;
use pushkind_common::domain::auth::AuthenticatedUser;
use pushkind_common::pagination::DEFAULT_ITEMS_PER_PAGE;
use serde::Deserialize;

use crate::domain::listing::Listing;
use crate::domain::matches::Match;
use crate::domain::types::{ItemType, ListingId, UserId};
use crate::dto::listings::{ListingPageDto, SavedListingDto};
use crate::forms::listings::{AddListingFormPayload, UpdateListingFormPayload};
use crate::matching::MatchEngine;
use crate::repository::{ListingListQuery, ListingReader, ListingWriter, MatchStore};

use super::{ServiceError, ServiceResult, authorize};

/// Query parameters accepted by the listing index.
#[derive(Deserialize, Debug, Default)]
pub struct ListingsQueryParams {
    pub item_type: Option<String>,
    pub page: Option<usize>,
}

/// Runs the matching pass for a listing that is already saved.
///
/// A failed pass does not undo the save, so the caller gets the listing
/// back flagged instead of an error it might answer by saving it again.
fn saved_with_matches<R>(engine: &MatchEngine, listing: Listing, repo: &R) -> SavedListingDto
where
    R: ListingReader + MatchStore,
{
    match engine.run(&listing, repo) {
        Ok(matches) => SavedListingDto::new(listing, matches),
        Err(e) => {
            log::error!("Matching pass for listing {} failed: {e}", listing.id);
            SavedListingDto::without_matching(listing)
        }
    }
}

/// Loads `id` and checks that `owner_id` owns it.
fn owned_listing<R>(id: i32, owner_id: UserId, repo: &R) -> ServiceResult<Listing>
where
    R: ListingReader,
{
    let id = ListingId::new(id).map_err(|_| ServiceError::NotFound)?;

    let listing = match repo.get_listing_by_id(id) {
        Ok(Some(listing)) => listing,
        Ok(None) => return Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to get listing: {e}");
            return Err(ServiceError::Internal);
        }
    };

    if listing.owner_id != owner_id {
        log::warn!("User {owner_id} tried to modify listing {id} owned by someone else");
        return Err(ServiceError::Unauthorized);
    }
    Ok(listing)
}

pub fn show_listings<R>(
    params: ListingsQueryParams,
    user: &AuthenticatedUser,
    repo: &R,
) -> ServiceResult<ListingPageDto>
where
    R: ListingReader,
{
    authorize(user)?;

    let page = params.page.unwrap_or(1).max(1);
    let mut query = ListingListQuery::default().paginate(page, DEFAULT_ITEMS_PER_PAGE);
    if let Some(item_type) = params.item_type.filter(|t| !t.trim().is_empty()) {
        query = query.item_type(ItemType::try_from(item_type)?);
    }

    match repo.list_listings(query) {
        Ok((total, items)) => Ok(ListingPageDto {
            items,
            page,
            total_pages: total.div_ceil(DEFAULT_ITEMS_PER_PAGE),
            total,
        }),
        Err(e) => {
            log::error!("Failed to list listings: {e}");
            Err(ServiceError::Internal)
        }
    }
}

pub fn show_my_listings<R>(user: &AuthenticatedUser, repo: &R) -> ServiceResult<Vec<Listing>>
where
    R: ListingReader,
{
    let user_id = authorize(user)?;

    match repo.list_listings(ListingListQuery::default().owner(user_id)) {
        Ok((_total, items)) => Ok(items),
        Err(e) => {
            log::error!("Failed to list listings of user {user_id}: {e}");
            Err(ServiceError::Internal)
        }
    }
}

pub fn get_listing<R>(id: i32, user: &AuthenticatedUser, repo: &R) -> ServiceResult<Listing>
where
    R: ListingReader,
{
    authorize(user)?;

    let id = ListingId::new(id).map_err(|_| ServiceError::NotFound)?;
    match repo.get_listing_by_id(id) {
        Ok(Some(listing)) => Ok(listing),
        Ok(None) => Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to get listing: {e}");
            Err(ServiceError::Internal)
        }
    }
}

/// Saves a new listing owned by the caller and matches it against
/// opposite-type listings.
pub fn create_listing<R>(
    payload: AddListingFormPayload,
    user: &AuthenticatedUser,
    repo: &R,
    engine: &MatchEngine,
) -> ServiceResult<SavedListingDto>
where
    R: ListingReader + ListingWriter + MatchStore,
{
    let user_id = authorize(user)?;

    let listing = match repo.create_listing(&payload.into_new_listing(user_id)) {
        Ok(listing) => listing,
        Err(e) => {
            log::error!("Failed to create listing: {e}");
            return Err(ServiceError::Internal);
        }
    };

    Ok(saved_with_matches(engine, listing, repo))
}

/// Merges `payload` into a listing owned by the caller.
///
/// A matching pass runs only when a scored field or the item type changed.
pub fn update_listing<R>(
    id: i32,
    payload: UpdateListingFormPayload,
    user: &AuthenticatedUser,
    repo: &R,
    engine: &MatchEngine,
) -> ServiceResult<SavedListingDto>
where
    R: ListingReader + ListingWriter + MatchStore,
{
    let user_id = authorize(user)?;
    let current = owned_listing(id, user_id, repo)?;

    let rematch = payload.update.affects_matching();
    let listing = current.merge(payload.update, Utc::now().naive_utc());

    match repo.update_listing(&listing) {
        Ok(0) => return Err(ServiceError::NotFound),
        Ok(_) => {}
        Err(e) => {
            log::error!("Failed to update listing {}: {e}", listing.id);
            return Err(ServiceError::Internal);
        }
    }

    if rematch {
        Ok(saved_with_matches(engine, listing, repo))
    } else {
        Ok(SavedListingDto::new(listing, vec![]))
    }
}

/// Reruns the matching pass of a listing owned by the caller.
///
/// Safe to repeat: pairs already stored are skipped.
pub fn rematch_listing<R>(
    id: i32,
    user: &AuthenticatedUser,
    repo: &R,
    engine: &MatchEngine,
) -> ServiceResult<Vec<Match>>
where
    R: ListingReader + MatchStore,
{
    let user_id = authorize(user)?;
    let listing = owned_listing(id, user_id, repo)?;

    engine.run(&listing, repo).map_err(|e| {
        log::error!("Matching pass for listing {} failed: {e}", listing.id);
        ServiceError::Internal
    })
}

pub fn delete_listing<R>(id: i32, user: &AuthenticatedUser, repo: &R) -> ServiceResult<()>
where
    R: ListingReader + ListingWriter,
{
    let user_id = authorize(user)?;
    let listing = owned_listing(id, user_id, repo)?;

    match repo.delete_listing(listing.id, user_id) {
        Ok(0) => Err(ServiceError::NotFound),
        Ok(_) => Ok(()),
        Err(e) => {
            log::error!("Failed to delete listing {}: {e}", listing.id);
            Err(ServiceError::Internal)
        }
    }
}
