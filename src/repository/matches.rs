use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sqlite::SqliteConnection;
use pushkind_common::repository::errors::{RepositoryError, RepositoryResult};

use crate::domain::matches::{ListingPair, Match, NewMatch};
use crate::domain::notification::{NewNotification, Notification};
use crate::domain::types::{ListingId, UserId};
use crate::models::matches::{Match as DbMatch, NewMatch as DbNewMatch};
use crate::models::notification::{
    NewNotification as DbNewNotification, Notification as DbNotification,
};
use crate::repository::{DieselRepository, MatchReader, MatchStore, MatchUnitOfWork};

impl MatchReader for DieselRepository {
    fn list_matches_for_owner(&self, owner_id: UserId) -> RepositoryResult<Vec<Match>> {
        use crate::schema::{listings, matches};

        let mut conn = self.conn()?;

        let owned = || {
            listings::table
                .filter(listings::owner_id.eq(owner_id.get()))
                .select(listings::id)
        };

        let items = matches::table
            .filter(
                matches::listing_a_id
                    .eq_any(owned())
                    .or(matches::listing_b_id.eq_any(owned())),
            )
            .order((matches::created_at.desc(), matches::id.desc()))
            .load::<DbMatch>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<Match>, _>>()?;

        Ok(items)
    }
}

/// Error raised inside a matching transaction: either the caller's own
/// error or a database failure that forces a rollback.
enum TransactionError<E> {
    Work(E),
    Database(DieselError),
}

impl<E> From<DieselError> for TransactionError<E> {
    fn from(value: DieselError) -> Self {
        Self::Database(value)
    }
}

impl MatchStore for DieselRepository {
    fn run_in_transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn MatchUnitOfWork) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        let mut conn = self.conn()?;

        // IMMEDIATE takes the write lock up front, so the existence checks
        // and inserts of concurrent passes cannot interleave.
        let result = conn.immediate_transaction(|conn| {
            let mut uow = DieselMatchUnitOfWork { conn };
            work(&mut uow).map_err(TransactionError::Work)
        });

        match result {
            Ok(value) => Ok(value),
            Err(TransactionError::Work(e)) => Err(e),
            Err(TransactionError::Database(e)) => {
                log::error!("Matching transaction failed: {e}");
                Err(E::from(RepositoryError::from(e)))
            }
        }
    }
}

/// Unit of work bound to an open SQLite transaction.
pub struct DieselMatchUnitOfWork<'c> {
    conn: &'c mut SqliteConnection,
}

impl MatchUnitOfWork for DieselMatchUnitOfWork<'_> {
    fn exists_pair(&mut self, a: ListingId, b: ListingId) -> RepositoryResult<bool> {
        use crate::schema::matches;

        let pair = ListingPair::new(a, b);

        // Both orderings of the raw columns are checked as well, for rows
        // written before the normalized columns existed.
        let count = matches::table
            .filter(
                matches::pair_low
                    .eq(pair.low().get())
                    .and(matches::pair_high.eq(pair.high().get()))
                    .or(matches::listing_a_id
                        .eq(a.get())
                        .and(matches::listing_b_id.eq(b.get())))
                    .or(matches::listing_a_id
                        .eq(b.get())
                        .and(matches::listing_b_id.eq(a.get()))),
            )
            .count()
            .get_result::<i64>(self.conn)?;

        Ok(count > 0)
    }

    fn insert_match(&mut self, new_match: &NewMatch) -> RepositoryResult<Option<Match>> {
        use crate::schema::matches;

        let row = DbNewMatch::from(new_match);

        // Savepoint: a constraint violation must not poison the outer
        // transaction.
        let inserted = self.conn.transaction(|conn| {
            diesel::insert_into(matches::table)
                .values(&row)
                .get_result::<DbMatch>(conn)
        });

        match inserted {
            Ok(stored) => Ok(Some(stored.try_into()?)),
            Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
                log::debug!(
                    "Pair {}-{} already stored, insert skipped",
                    row.pair_low,
                    row.pair_high
                );
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn insert_notification(
        &mut self,
        notification: &NewNotification,
    ) -> RepositoryResult<Notification> {
        use crate::schema::notifications;

        let row = DbNewNotification::from(notification);

        let stored = diesel::insert_into(notifications::table)
            .values(&row)
            .get_result::<DbNotification>(self.conn)?;

        Ok(stored.try_into()?)
    }
}
