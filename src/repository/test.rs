use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use pushkind_common::repository::errors::{RepositoryError, RepositoryResult};

use crate::domain::listing::{Listing, NewListing};
use crate::domain::matches::{Match, NewMatch};
use crate::domain::notification::{NewNotification, Notification};
use crate::domain::types::{ItemType, ListingId, MatchId, NotificationId, UserId};
use crate::repository::{
    ListingListQuery, ListingReader, ListingWriter, MatchReader, MatchStore, MatchUnitOfWork,
    NotificationReader, NotificationWriter,
};

#[derive(Debug, Clone, Default)]
struct State {
    listings: Vec<Listing>,
    matches: Vec<Match>,
    notifications: Vec<Notification>,
    last_listing_id: i32,
    last_match_id: i32,
    last_notification_id: i32,
}

/// A storage failure shaped like the ones SQLite reports.
fn storage_failure(message: &str) -> RepositoryError {
    RepositoryError::from(DieselError::DatabaseError(
        DatabaseErrorKind::Unknown,
        Box::new(message.to_string()),
    ))
}

fn next_id(counter: &mut i32) -> i32 {
    *counter += 1;
    *counter
}

/// Stateful in-memory repository used for unit tests.
///
/// Match transactions work on a copy of the state that replaces the
/// original only when the closure succeeds, and hold the lock for the
/// whole transaction so concurrent passes are serialized.
#[derive(Debug, Default)]
pub struct TestRepository {
    state: Mutex<State>,
    fail_candidate_query: bool,
    fail_notifications: bool,
    include_self_in_candidates: bool,
    hide_stored_pairs: bool,
}

impl TestRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Candidate queries return a storage error.
    pub fn failing_candidate_query(mut self) -> Self {
        self.fail_candidate_query = true;
        self
    }

    /// Every notification insert returns a storage error.
    pub fn failing_notifications(mut self) -> Self {
        self.fail_notifications = true;
        self
    }

    /// Candidate queries ignore `exclude_id`, like a sloppy store would.
    pub fn including_self_in_candidates(mut self) -> Self {
        self.include_self_in_candidates = true;
        self
    }

    /// `exists_pair` always answers `false`, as when another pass commits
    /// the pair between the check and the insert.
    pub fn hiding_stored_pairs(mut self) -> Self {
        self.hide_stored_pairs = true;
        self
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("test repository lock poisoned")
    }

    /// Store a listing with a fresh id, bypassing any matching.
    pub fn add_listing(&self, listing: NewListing) -> Listing {
        self.create_listing(&listing).expect("in-memory insert")
    }

    pub fn listings(&self) -> Vec<Listing> {
        self.state().listings.clone()
    }

    pub fn matches(&self) -> Vec<Match> {
        self.state().matches.clone()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.state().notifications.clone()
    }
}

impl ListingReader for TestRepository {
    fn get_listing_by_id(&self, id: ListingId) -> RepositoryResult<Option<Listing>> {
        Ok(self.state().listings.iter().find(|l| l.id == id).cloned())
    }

    fn list_listings(&self, query: ListingListQuery) -> RepositoryResult<(usize, Vec<Listing>)> {
        let mut items: Vec<Listing> = self.state().listings.clone();
        if let Some(owner_id) = query.owner_id {
            items.retain(|l| l.owner_id == owner_id);
        }
        if let Some(item_type) = query.item_type {
            items.retain(|l| l.item_type == item_type);
        }
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = items.len();
        if let Some(pagination) = query.pagination {
            let offset = (pagination.page.max(1) - 1).saturating_mul(pagination.per_page);
            items = items
                .into_iter()
                .skip(offset)
                .take(pagination.per_page)
                .collect();
        }
        Ok((total, items))
    }

    fn query_opposite_type(
        &self,
        item_type: ItemType,
        exclude_id: ListingId,
    ) -> RepositoryResult<Vec<Listing>> {
        if self.fail_candidate_query {
            return Err(storage_failure("candidate query failed"));
        }
        let wanted = item_type.opposite();
        Ok(self
            .state()
            .listings
            .iter()
            .filter(|l| {
                l.item_type == wanted || (self.include_self_in_candidates && l.id == exclude_id)
            })
            .filter(|l| self.include_self_in_candidates || l.id != exclude_id)
            .cloned()
            .collect())
    }
}

impl ListingWriter for TestRepository {
    fn create_listing(&self, listing: &NewListing) -> RepositoryResult<Listing> {
        let mut state = self.state();
        let now = Utc::now().naive_utc();
        let id = ListingId::new(next_id(&mut state.last_listing_id))?;
        let created = Listing {
            id,
            owner_id: listing.owner_id,
            name: listing.name.clone(),
            description: listing.description.clone(),
            category: listing.category.clone(),
            condition: listing.condition.clone(),
            price: listing.price,
            quantity: listing.quantity,
            image_url: listing.image_url.clone(),
            video_url: listing.video_url.clone(),
            item_type: listing.item_type,
            created_at: now,
            updated_at: now,
        };
        state.listings.push(created.clone());
        Ok(created)
    }

    fn update_listing(&self, listing: &Listing) -> RepositoryResult<usize> {
        let mut state = self.state();
        match state
            .listings
            .iter_mut()
            .find(|l| l.id == listing.id && l.owner_id == listing.owner_id)
        {
            Some(stored) => {
                *stored = Listing {
                    created_at: stored.created_at,
                    ..listing.clone()
                };
                Ok(1)
            }
            None => Ok(0),
        }
    }

    fn delete_listing(&self, id: ListingId, owner_id: UserId) -> RepositoryResult<usize> {
        let mut state = self.state();
        let before = state.listings.len();
        state
            .listings
            .retain(|l| !(l.id == id && l.owner_id == owner_id));
        let removed = before - state.listings.len();
        if removed == 0 {
            return Ok(0);
        }

        let dropped: Vec<MatchId> = state
            .matches
            .iter()
            .filter(|m| m.involves(id))
            .map(|m| m.id)
            .collect();
        state.matches.retain(|m| !m.involves(id));
        for notification in &mut state.notifications {
            if notification
                .match_id
                .is_some_and(|match_id| dropped.contains(&match_id))
            {
                notification.match_id = None;
            }
        }
        Ok(removed)
    }
}

impl MatchReader for TestRepository {
    fn list_matches_for_owner(&self, owner_id: UserId) -> RepositoryResult<Vec<Match>> {
        let state = self.state();
        let owned: Vec<ListingId> = state
            .listings
            .iter()
            .filter(|l| l.owner_id == owner_id)
            .map(|l| l.id)
            .collect();
        let mut items: Vec<Match> = state
            .matches
            .iter()
            .filter(|m| owned.iter().any(|id| m.involves(*id)))
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(items)
    }
}

impl NotificationReader for TestRepository {
    fn list_notifications(&self, user_id: UserId) -> RepositoryResult<Vec<Notification>> {
        let mut items: Vec<Notification> = self
            .state()
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(items)
    }
}

impl NotificationWriter for TestRepository {
    fn mark_notification_read(
        &self,
        id: NotificationId,
        user_id: UserId,
    ) -> RepositoryResult<usize> {
        let mut state = self.state();
        let mut found = 0;
        for notification in &mut state.notifications {
            if notification.id == id && notification.user_id == user_id {
                notification.is_read = true;
                found += 1;
            }
        }
        Ok(found)
    }
}

struct TestUnitOfWork {
    staged: State,
    fail_notifications: bool,
    hide_stored_pairs: bool,
}

impl MatchUnitOfWork for TestUnitOfWork {
    fn exists_pair(&mut self, a: ListingId, b: ListingId) -> RepositoryResult<bool> {
        if self.hide_stored_pairs {
            return Ok(false);
        }
        let pair = crate::domain::matches::ListingPair::new(a, b);
        Ok(self.staged.matches.iter().any(|m| m.pair() == pair))
    }

    fn insert_match(&mut self, new_match: &NewMatch) -> RepositoryResult<Option<Match>> {
        if self
            .staged
            .matches
            .iter()
            .any(|m| m.pair() == new_match.pair())
        {
            return Ok(None);
        }
        let stored = Match {
            id: MatchId::new(next_id(&mut self.staged.last_match_id))?,
            listing_a_id: new_match.listing_a_id,
            listing_b_id: new_match.listing_b_id,
            similarity_score: new_match.similarity_score,
            created_at: new_match.created_at,
        };
        self.staged.matches.push(stored.clone());
        Ok(Some(stored))
    }

    fn insert_notification(
        &mut self,
        notification: &NewNotification,
    ) -> RepositoryResult<Notification> {
        if self.fail_notifications {
            return Err(storage_failure("notification insert failed"));
        }
        let stored = Notification {
            id: NotificationId::new(next_id(&mut self.staged.last_notification_id))?,
            user_id: notification.user_id,
            match_id: Some(notification.match_id),
            message: notification.message.clone(),
            is_read: false,
            created_at: notification.created_at,
        };
        self.staged.notifications.push(stored.clone());
        Ok(stored)
    }
}

impl MatchStore for TestRepository {
    fn run_in_transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn MatchUnitOfWork) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        let mut state = self.state();
        let mut uow = TestUnitOfWork {
            staged: state.clone(),
            fail_notifications: self.fail_notifications,
            hide_stored_pairs: self.hide_stored_pairs,
        };
        let value = work(&mut uow)?;
        *state = uow.staged;
        Ok(value)
    }
}
