use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{MatchId, NotificationId, NotificationMessage, UserId};

/// A message addressed to a user, created when one of their listings is
/// matched. Only the read flag ever changes after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: UserId,
    /// `None` once the referenced match has been removed.
    pub match_id: Option<MatchId>,
    pub message: NotificationMessage,
    pub is_read: bool,
    pub created_at: NaiveDateTime,
}

/// Data required to insert a new unread [`Notification`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewNotification {
    pub user_id: UserId,
    pub match_id: MatchId,
    pub message: NotificationMessage,
    pub created_at: NaiveDateTime,
}
