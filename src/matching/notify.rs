use crate::domain::listing::Listing;
use crate::domain::matches::Match;
use crate::domain::notification::{NewNotification, Notification};
use crate::domain::types::NotificationMessage;
use crate::repository::MatchUnitOfWork;
use pushkind_common::repository::errors::RepositoryResult;

/// Text sent to the owner of `own` when it matched `other`.
pub fn match_message(own: &Listing, other: &Listing) -> String {
    format!("Your item '{}' matches with '{}'", own.name, other.name)
}

/// Inserts one notification per side of a freshly stored match.
///
/// Runs inside the caller's unit of work so the notifications commit or
/// roll back together with `stored`.
pub fn notify_pair<U>(
    uow: &mut U,
    stored: &Match,
    listing_a: &Listing,
    listing_b: &Listing,
) -> RepositoryResult<[Notification; 2]>
where
    U: MatchUnitOfWork + ?Sized,
{
    let for_a = NewNotification {
        user_id: listing_a.owner_id,
        match_id: stored.id,
        message: NotificationMessage::new(match_message(listing_a, listing_b))?,
        created_at: stored.created_at,
    };
    let for_b = NewNotification {
        user_id: listing_b.owner_id,
        match_id: stored.id,
        message: NotificationMessage::new(match_message(listing_b, listing_a))?,
        created_at: stored.created_at,
    };

    Ok([
        uow.insert_notification(&for_a)?,
        uow.insert_notification(&for_b)?,
    ])
}
