use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{
    CategoryName, ImageUrl, ItemType, ListingCondition, ListingDescription, ListingId,
    ListingName, ListingPrice, ListingQuantity, UserId, VideoUrl,
};

/// An item a user offers (`have`) or seeks (`need`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Listing {
    pub id: ListingId,
    pub owner_id: UserId,
    pub name: ListingName,
    pub description: Option<ListingDescription>,
    pub category: Option<CategoryName>,
    pub condition: Option<ListingCondition>,
    pub price: ListingPrice,
    pub quantity: ListingQuantity,
    pub image_url: Option<ImageUrl>,
    pub video_url: Option<VideoUrl>,
    pub item_type: ItemType,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Information required to create a new [`Listing`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewListing {
    pub owner_id: UserId,
    pub name: ListingName,
    pub description: Option<ListingDescription>,
    pub category: Option<CategoryName>,
    pub condition: Option<ListingCondition>,
    pub price: ListingPrice,
    pub quantity: ListingQuantity,
    pub image_url: Option<ImageUrl>,
    pub video_url: Option<VideoUrl>,
    pub item_type: ItemType,
}

/// Partial update of a listing's content.
///
/// `None` leaves a field untouched. For optional columns the inner option
/// distinguishes "set" (`Some(Some(v))`) from "clear" (`Some(None)`).
/// Identity (`id`, `owner_id`) and `created_at` are not part of the update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingUpdate {
    pub name: Option<ListingName>,
    pub description: Option<Option<ListingDescription>>,
    pub category: Option<Option<CategoryName>>,
    pub condition: Option<Option<ListingCondition>>,
    pub price: Option<ListingPrice>,
    pub quantity: Option<ListingQuantity>,
    pub image_url: Option<Option<ImageUrl>>,
    pub video_url: Option<Option<VideoUrl>>,
    pub item_type: Option<ItemType>,
}

impl ListingUpdate {
    /// Returns `true` when the update would not change any field.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Whether the update touches a field the similarity score depends on.
    pub fn affects_matching(&self) -> bool {
        self.name.is_some()
            || self.description.is_some()
            || self.category.is_some()
            || self.item_type.is_some()
    }
}

impl Listing {
    /// Applies `update` and returns the merged listing.
    ///
    /// `updated_at` is always set to `now`, even for an empty update.
    pub fn merge(mut self, update: ListingUpdate, now: NaiveDateTime) -> Self {
        let ListingUpdate {
            name,
            description,
            category,
            condition,
            price,
            quantity,
            image_url,
            video_url,
            item_type,
        } = update;

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(description) = description {
            self.description = description;
        }
        if let Some(category) = category {
            self.category = category;
        }
        if let Some(condition) = condition {
            self.condition = condition;
        }
        if let Some(price) = price {
            self.price = price;
        }
        if let Some(quantity) = quantity {
            self.quantity = quantity;
        }
        if let Some(image_url) = image_url {
            self.image_url = image_url;
        }
        if let Some(video_url) = video_url {
            self.video_url = video_url;
        }
        if let Some(item_type) = item_type {
            self.item_type = item_type;
        }
        self.updated_at = now;
        self
    }

    /// Text used by the similarity scorer; absent fields read as empty.
    pub fn description_text(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }

    pub fn category_text(&self) -> &str {
        self.category.as_deref().unwrap_or_default()
    }
}
