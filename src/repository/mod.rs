use diesel::RunQueryDsl;
use pushkind_common::db::{DbConnection, DbPool};
use pushkind_common::pagination::Pagination;
use pushkind_common::repository::errors::{RepositoryError, RepositoryResult};

use crate::domain::listing::{Listing, NewListing};
use crate::domain::matches::{Match, NewMatch};
use crate::domain::notification::{NewNotification, Notification};
use crate::domain::types::{ItemType, ListingId, NotificationId, UserId};

pub mod listing;
pub mod matches;
pub mod notification;
#[cfg(test)]
pub mod test;

/// How long a connection waits for another writer's lock before SQLite
/// reports the database as busy.
const SQLITE_BUSY_TIMEOUT_MS: u32 = 5_000;

/// Repository implementation backed by Diesel and SQLite.
///
/// The underlying `r2d2::Pool` is cheap to clone, allowing the repository to
/// be passed around freely between handlers.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool, // r2d2::Pool is cheap to clone
}

impl DieselRepository {
    /// Create a new repository from an established database pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get a pooled database connection.
    ///
    /// Concurrent matching passes queue on the write lock instead of
    /// failing with `SQLITE_BUSY`.
    fn conn(&self) -> RepositoryResult<DbConnection> {
        let mut conn = self.pool.get()?;
        diesel::sql_query(format!("PRAGMA busy_timeout = {SQLITE_BUSY_TIMEOUT_MS}"))
            .execute(&mut conn)?;
        Ok(conn)
    }
}

/// Query parameters used when listing listings.
#[derive(Debug, Clone, Default)]
pub struct ListingListQuery {
    /// Restrict to listings owned by this user.
    pub owner_id: Option<UserId>,
    /// Restrict to `have` or `need` listings.
    pub item_type: Option<ItemType>,
    /// Pagination parameters.
    pub pagination: Option<Pagination>,
}

impl ListingListQuery {
    pub fn owner(mut self, owner_id: UserId) -> Self {
        self.owner_id = Some(owner_id);
        self
    }
    pub fn item_type(mut self, item_type: ItemType) -> Self {
        self.item_type = Some(item_type);
        self
    }
    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

/// Read-only operations for listing entities.
pub trait ListingReader {
    /// Retrieve a listing by its identifier.
    fn get_listing_by_id(&self, id: ListingId) -> RepositoryResult<Option<Listing>>;
    /// List listings matching the supplied query, newest first.
    fn list_listings(&self, query: ListingListQuery) -> RepositoryResult<(usize, Vec<Listing>)>;
    /// Every listing of the type opposite to `item_type`, except `exclude_id`.
    ///
    /// Always reads fresh rows; matching passes must not see cached data.
    fn query_opposite_type(
        &self,
        item_type: ItemType,
        exclude_id: ListingId,
    ) -> RepositoryResult<Vec<Listing>>;
}

/// Write operations for listing entities.
pub trait ListingWriter {
    /// Persist a new listing and return it with its assigned id.
    fn create_listing(&self, listing: &NewListing) -> RepositoryResult<Listing>;
    /// Overwrite the content of an existing listing owned by `listing.owner_id`.
    fn update_listing(&self, listing: &Listing) -> RepositoryResult<usize>;
    /// Delete a listing together with its matches.
    fn delete_listing(&self, id: ListingId, owner_id: UserId) -> RepositoryResult<usize>;
}

/// Read-only operations for stored matches.
pub trait MatchReader {
    /// Matches involving any listing owned by `owner_id`, most recent first.
    fn list_matches_for_owner(&self, owner_id: UserId) -> RepositoryResult<Vec<Match>>;
}

/// Read-only operations for notifications.
pub trait NotificationReader {
    /// Notifications addressed to `user_id`, most recent first.
    fn list_notifications(&self, user_id: UserId) -> RepositoryResult<Vec<Notification>>;
}

/// Write operations for notifications outside of a matching pass.
pub trait NotificationWriter {
    /// Mark a notification read. Returns the number of rows found for the
    /// id and owner; marking an already read notification still counts.
    fn mark_notification_read(&self, id: NotificationId, user_id: UserId)
    -> RepositoryResult<usize>;
}

/// Writes performed by one matching pass.
///
/// Obtained only through [`MatchStore::run_in_transaction`], so every call
/// shares the same transaction.
pub trait MatchUnitOfWork {
    /// Whether a match exists for the pair in either order.
    fn exists_pair(&mut self, a: ListingId, b: ListingId) -> RepositoryResult<bool>;
    /// Insert a match. Returns `None` when the unordered pair is already
    /// stored, which the uniqueness constraint reports under races.
    fn insert_match(&mut self, new_match: &NewMatch) -> RepositoryResult<Option<Match>>;
    fn insert_notification(
        &mut self,
        notification: &NewNotification,
    ) -> RepositoryResult<Notification>;
}

/// Transaction boundary for match and notification writes.
pub trait MatchStore {
    /// Run `work` in one transaction: commit when it returns `Ok`, roll
    /// everything back when it returns `Err` or the commit fails.
    fn run_in_transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn MatchUnitOfWork) -> Result<T, E>,
        E: From<RepositoryError>;
}
