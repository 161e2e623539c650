use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::listing::{Listing as DomainListing, NewListing as DomainNewListing};
use crate::domain::types::{
    CategoryName, ImageUrl, ItemType, ListingCondition, ListingDescription, ListingName,
    ListingPrice, ListingQuantity, TypeConstraintError, VideoUrl,
};

/// Diesel model representing a row in the `listings` table.
#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::listings)]
pub struct Listing {
    pub id: i32,
    pub owner_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub condition: Option<String>,
    pub price: f64,
    pub quantity: i32,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub item_type: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Insertable form of [`Listing`].
#[derive(Insertable)]
#[diesel(table_name = crate::schema::listings)]
pub struct NewListing<'a> {
    pub owner_id: i32,
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub category: Option<&'a str>,
    pub condition: Option<&'a str>,
    pub price: f64,
    pub quantity: i32,
    pub image_url: Option<&'a str>,
    pub video_url: Option<&'a str>,
    pub item_type: &'a str,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Full content changeset written after a merged update.
///
/// `treat_none_as_null` so that cleared optional fields reach the database.
#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::listings, treat_none_as_null = true)]
pub struct ListingChangeset<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub category: Option<&'a str>,
    pub condition: Option<&'a str>,
    pub price: f64,
    pub quantity: i32,
    pub image_url: Option<&'a str>,
    pub video_url: Option<&'a str>,
    pub item_type: &'a str,
    pub updated_at: NaiveDateTime,
}

fn optional<T, F>(value: Option<String>, build: F) -> Result<Option<T>, TypeConstraintError>
where
    F: FnOnce(String) -> Result<T, TypeConstraintError>,
{
    // Legacy rows may hold empty strings where NULL is meant.
    match value {
        Some(value) if !value.trim().is_empty() => build(value).map(Some),
        _ => Ok(None),
    }
}

impl TryFrom<Listing> for DomainListing {
    type Error = TypeConstraintError;

    fn try_from(listing: Listing) -> Result<Self, Self::Error> {
        Ok(Self {
            id: listing.id.try_into()?,
            owner_id: listing.owner_id.try_into()?,
            name: ListingName::new(listing.name)?,
            description: optional(listing.description, ListingDescription::new)?,
            category: optional(listing.category, CategoryName::new)?,
            condition: optional(listing.condition, ListingCondition::new)?,
            price: ListingPrice::new(listing.price)?,
            quantity: ListingQuantity::new(listing.quantity)?,
            image_url: optional(listing.image_url, ImageUrl::new)?,
            video_url: optional(listing.video_url, VideoUrl::new)?,
            item_type: ItemType::try_from(listing.item_type)?,
            created_at: listing.created_at,
            updated_at: listing.updated_at,
        })
    }
}

impl<'a> NewListing<'a> {
    pub fn from_domain(listing: &'a DomainNewListing, now: NaiveDateTime) -> Self {
        Self {
            owner_id: listing.owner_id.get(),
            name: listing.name.as_str(),
            description: listing.description.as_deref(),
            category: listing.category.as_deref(),
            condition: listing.condition.as_deref(),
            price: listing.price.get(),
            quantity: listing.quantity.get(),
            image_url: listing.image_url.as_deref(),
            video_url: listing.video_url.as_deref(),
            item_type: listing.item_type.as_str(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl<'a> From<&'a DomainListing> for ListingChangeset<'a> {
    fn from(listing: &'a DomainListing) -> Self {
        Self {
            name: listing.name.as_str(),
            description: listing.description.as_deref(),
            category: listing.category.as_deref(),
            condition: listing.condition.as_deref(),
            price: listing.price.get(),
            quantity: listing.quantity.get(),
            image_url: listing.image_url.as_deref(),
            video_url: listing.video_url.as_deref(),
            item_type: listing.item_type.as_str(),
            updated_at: listing.updated_at,
        }
    }
}
