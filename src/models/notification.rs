use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::notification::{
    NewNotification as DomainNewNotification, Notification as DomainNotification,
};
use crate::domain::types::{NotificationMessage, TypeConstraintError};

/// Diesel model representing a row in the `notifications` table.
#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::notifications)]
pub struct Notification {
    pub id: i32,
    pub user_id: i32,
    pub match_id: Option<i32>,
    pub message: String,
    pub is_read: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::notifications)]
pub struct NewNotification<'a> {
    pub user_id: i32,
    pub match_id: Option<i32>,
    pub message: &'a str,
    pub is_read: bool,
    pub created_at: NaiveDateTime,
}

impl TryFrom<Notification> for DomainNotification {
    type Error = TypeConstraintError;

    fn try_from(row: Notification) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id.try_into()?,
            user_id: row.user_id.try_into()?,
            match_id: row.match_id.map(TryInto::try_into).transpose()?,
            message: NotificationMessage::new(row.message)?,
            is_read: row.is_read,
            created_at: row.created_at,
        })
    }
}

impl<'a> From<&'a DomainNewNotification> for NewNotification<'a> {
    fn from(notification: &'a DomainNewNotification) -> Self {
        Self {
            user_id: notification.user_id.get(),
            match_id: Some(notification.match_id.get()),
            message: notification.message.as_str(),
            is_read: false,
            created_at: notification.created_at,
        }
    }
}
