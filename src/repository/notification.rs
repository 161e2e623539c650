use diesel::prelude::*;
use pushkind_common::repository::errors::RepositoryResult;

use crate::domain::notification::Notification;
use crate::domain::types::{NotificationId, UserId};
use crate::models::notification::Notification as DbNotification;
use crate::repository::{DieselRepository, NotificationReader, NotificationWriter};

impl NotificationReader for DieselRepository {
    fn list_notifications(&self, user_id: UserId) -> RepositoryResult<Vec<Notification>> {
        use crate::schema::notifications;

        let mut conn = self.conn()?;

        let items = notifications::table
            .filter(notifications::user_id.eq(user_id.get()))
            .order((notifications::created_at.desc(), notifications::id.desc()))
            .load::<DbNotification>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<Notification>, _>>()?;

        Ok(items)
    }
}

impl NotificationWriter for DieselRepository {
    fn mark_notification_read(
        &self,
        id: NotificationId,
        user_id: UserId,
    ) -> RepositoryResult<usize> {
        use crate::schema::notifications;

        let mut conn = self.conn()?;

        let affected = diesel::update(
            notifications::table
                .filter(notifications::id.eq(id.get()))
                .filter(notifications::user_id.eq(user_id.get())),
        )
        .set(notifications::is_read.eq(true))
        .execute(&mut conn)?;

        Ok(affected)
    }
}
