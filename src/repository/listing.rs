use chrono::Utc;
use diesel::prelude::*;
use pushkind_common::repository::errors::RepositoryResult;

use crate::domain::listing::{Listing, NewListing};
use crate::domain::types::{ItemType, ListingId, UserId};
use crate::models::listing::{
    Listing as DbListing, ListingChangeset, NewListing as DbNewListing,
};
use crate::repository::{DieselRepository, ListingListQuery, ListingReader, ListingWriter};

impl ListingReader for DieselRepository {
    fn get_listing_by_id(&self, id: ListingId) -> RepositoryResult<Option<Listing>> {
        use crate::schema::listings;

        let mut conn = self.conn()?;

        let listing = listings::table
            .filter(listings::id.eq(id.get()))
            .first::<DbListing>(&mut conn)
            .optional()?;

        let listing = listing.map(TryInto::try_into).transpose()?;
        Ok(listing)
    }

    fn list_listings(&self, query: ListingListQuery) -> RepositoryResult<(usize, Vec<Listing>)> {
        use crate::schema::listings;

        let mut conn = self.conn()?;

        let query_builder = || {
            let mut items = listings::table.into_boxed::<diesel::sqlite::Sqlite>();

            if let Some(owner_id) = query.owner_id {
                items = items.filter(listings::owner_id.eq(owner_id.get()));
            }

            if let Some(item_type) = query.item_type {
                items = items.filter(listings::item_type.eq(item_type.as_str()));
            }

            items
        };

        let total = query_builder().count().get_result::<i64>(&mut conn)? as usize;

        let mut items = query_builder();

        // Apply pagination if requested
        if let Some(pagination) = &query.pagination {
            let skipped = (pagination.page.max(1) - 1).saturating_mul(pagination.per_page);
            let offset = i64::try_from(skipped).unwrap_or(i64::MAX);
            let limit = i64::try_from(pagination.per_page).unwrap_or(i64::MAX);
            items = items.offset(offset).limit(limit);
        }

        let items = items
            .order((listings::created_at.desc(), listings::id.desc()))
            .load::<DbListing>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<Listing>, _>>()?;

        Ok((total, items))
    }

    fn query_opposite_type(
        &self,
        item_type: ItemType,
        exclude_id: ListingId,
    ) -> RepositoryResult<Vec<Listing>> {
        use crate::schema::listings;

        let mut conn = self.conn()?;

        let items = listings::table
            .filter(listings::item_type.eq(item_type.opposite().as_str()))
            .filter(listings::id.ne(exclude_id.get()))
            .order(listings::id.asc())
            .load::<DbListing>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<Listing>, _>>()?;

        Ok(items)
    }
}

impl ListingWriter for DieselRepository {
    fn create_listing(&self, listing: &NewListing) -> RepositoryResult<Listing> {
        use crate::schema::listings;

        let mut conn = self.conn()?;
        let db_listing = DbNewListing::from_domain(listing, Utc::now().naive_utc());

        let created = diesel::insert_into(listings::table)
            .values(&db_listing)
            .get_result::<DbListing>(&mut conn)?;

        Ok(created.try_into()?)
    }

    fn update_listing(&self, listing: &Listing) -> RepositoryResult<usize> {
        use crate::schema::listings;

        let mut conn = self.conn()?;

        let affected = diesel::update(
            listings::table
                .filter(listings::id.eq(listing.id.get()))
                .filter(listings::owner_id.eq(listing.owner_id.get())),
        )
        .set(ListingChangeset::from(listing))
        .execute(&mut conn)?;

        Ok(affected)
    }

    fn delete_listing(&self, id: ListingId, owner_id: UserId) -> RepositoryResult<usize> {
        use crate::schema::{listings, matches, notifications};

        let mut conn = self.conn()?;

        let affected = conn.transaction::<_, diesel::result::Error, _>(|conn| {
            let owned = listings::table
                .filter(listings::id.eq(id.get()))
                .filter(listings::owner_id.eq(owner_id.get()))
                .count()
                .get_result::<i64>(conn)?;
            if owned == 0 {
                return Ok(0);
            }

            let match_ids = matches::table
                .filter(
                    matches::listing_a_id
                        .eq(id.get())
                        .or(matches::listing_b_id.eq(id.get())),
                )
                .select(matches::id.nullable());

            // Notifications outlive the match they announced.
            diesel::update(notifications::table.filter(notifications::match_id.eq_any(match_ids)))
                .set(notifications::match_id.eq(None::<i32>))
                .execute(conn)?;

            diesel::delete(
                matches::table.filter(
                    matches::listing_a_id
                        .eq(id.get())
                        .or(matches::listing_b_id.eq(id.get())),
                ),
            )
            .execute(conn)?;

            diesel::delete(listings::table.filter(listings::id.eq(id.get()))).execute(conn)
        })?;

        Ok(affected)
    }
}
