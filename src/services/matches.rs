use pushkind_common::domain::auth::AuthenticatedUser;

use crate::domain::matches::Match;
use crate::domain::notification::Notification;
use crate::domain::types::NotificationId;
use crate::repository::{MatchReader, NotificationReader, NotificationWriter};

use super::{ServiceError, ServiceResult, authorize};

pub fn show_my_matches<R>(user: &AuthenticatedUser, repo: &R) -> ServiceResult<Vec<Match>>
where
    R: MatchReader,
{
    let user_id = authorize(user)?;

    repo.list_matches_for_owner(user_id).map_err(|e| {
        log::error!("Failed to list matches of user {user_id}: {e}");
        ServiceError::Internal
    })
}

pub fn show_my_notifications<R>(
    user: &AuthenticatedUser,
    repo: &R,
) -> ServiceResult<Vec<Notification>>
where
    R: NotificationReader,
{
    let user_id = authorize(user)?;

    repo.list_notifications(user_id).map_err(|e| {
        log::error!("Failed to list notifications of user {user_id}: {e}");
        ServiceError::Internal
    })
}

/// Marks a notification of the caller as read. Repeating the call is a
/// no-op; someone else's notification reads as missing.
pub fn mark_notification_read<R>(id: i32, user: &AuthenticatedUser, repo: &R) -> ServiceResult<()>
where
    R: NotificationWriter,
{
    let user_id = authorize(user)?;
    let id = NotificationId::new(id).map_err(|_| ServiceError::NotFound)?;

    match repo.mark_notification_read(id, user_id) {
        Ok(0) => Err(ServiceError::NotFound),
        Ok(_) => Ok(()),
        Err(e) => {
            log::error!("Failed to mark notification {id} read: {e}");
            Err(ServiceError::Internal)
        }
    }
}
