use serde::{Deserialize, Deserializer};
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::listing::{ListingUpdate, NewListing};
use crate::domain::types::{
    CategoryName, ImageUrl, ItemType, ListingCondition, ListingDescription, ListingName,
    ListingPrice, ListingQuantity, TypeConstraintError, UserId, VideoUrl,
};

/// Distinguishes an absent field (`None`) from an explicit `null`
/// (`Some(None)`).
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Blank input clears an optional field.
fn optional_text<T, F>(value: Option<String>, build: F) -> Result<Option<T>, TypeConstraintError>
where
    F: FnOnce(String) -> Result<T, TypeConstraintError>,
{
    match value {
        Some(value) if !value.trim().is_empty() => build(value).map(Some),
        _ => Ok(None),
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddListingForm {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub condition: Option<String>,
    #[validate(range(min = 0.0))]
    #[serde(default)]
    pub price: f64,
    #[validate(range(min = 1, max = 1000))]
    pub quantity: Option<i32>,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    #[validate(length(min = 1))]
    pub item_type: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AddListingFormPayload {
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

impl AddListingFormPayload {
    pub fn into_new_listing(self, owner_id: UserId) -> NewListing {
        NewListing {
            owner_id,
            name: self.name,
            description: self.description,
            category: self.category,
            condition: self.condition,
            price: self.price,
            quantity: self.quantity,
            image_url: self.image_url,
            video_url: self.video_url,
            item_type: self.item_type,
        }
    }
}

#[derive(Debug, Error)]
pub enum AddListingFormError {
    #[error("Add listing form validation failed: {0}")]
    Validation(String),
    #[error("Add listing form contains invalid data: {0}")]
    TypeConstraint(String),
}

impl From<ValidationErrors> for AddListingFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<TypeConstraintError> for AddListingFormError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

impl TryFrom<AddListingForm> for AddListingFormPayload {
    type Error = AddListingFormError;

    fn try_from(value: AddListingForm) -> Result<Self, Self::Error> {
        value.validate()?;

        Ok(Self {
            name: ListingName::new(value.name)?,
            description: optional_text(value.description, ListingDescription::new)?,
            category: optional_text(value.category, CategoryName::new)?,
            condition: optional_text(value.condition, ListingCondition::new)?,
            price: ListingPrice::new(value.price)?,
            quantity: value
                .quantity
                .map(ListingQuantity::new)
                .transpose()?
                .unwrap_or_default(),
            image_url: optional_text(value.image_url, ImageUrl::new)?,
            video_url: optional_text(value.video_url, VideoUrl::new)?,
            item_type: ItemType::try_from(value.item_type)?,
        })
    }
}

/// Partial update body. Omitted fields are left untouched; `null` (or a
/// blank string) clears an optional field.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateListingForm {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub category: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub condition: Option<Option<String>>,
    #[validate(range(min = 0.0))]
    pub price: Option<f64>,
    #[validate(range(min = 1, max = 1000))]
    pub quantity: Option<i32>,
    #[serde(default, deserialize_with = "nullable")]
    pub image_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub video_url: Option<Option<String>>,
    pub item_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateListingFormPayload {
    pub update: ListingUpdate,
}

#[derive(Debug, Error)]
pub enum UpdateListingFormError {
    #[error("Update listing form validation failed: {0}")]
    Validation(String),
    #[error("Update listing form contains invalid data: {0}")]
    TypeConstraint(String),
}

impl From<ValidationErrors> for UpdateListingFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<TypeConstraintError> for UpdateListingFormError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

impl TryFrom<UpdateListingForm> for UpdateListingFormPayload {
    type Error = UpdateListingFormError;

    fn try_from(value: UpdateListingForm) -> Result<Self, Self::Error> {
        value.validate()?;

        let update = ListingUpdate {
            name: value.name.map(ListingName::new).transpose()?,
            description: value
                .description
                .map(|v| optional_text(v, ListingDescription::new))
                .transpose()?,
            category: value
                .category
                .map(|v| optional_text(v, CategoryName::new))
                .transpose()?,
            condition: value
                .condition
                .map(|v| optional_text(v, ListingCondition::new))
                .transpose()?,
            price: value.price.map(ListingPrice::new).transpose()?,
            quantity: value.quantity.map(ListingQuantity::new).transpose()?,
            image_url: value
                .image_url
                .map(|v| optional_text(v, ImageUrl::new))
                .transpose()?,
            video_url: value
                .video_url
                .map(|v| optional_text(v, VideoUrl::new))
                .transpose()?,
            item_type: value.item_type.map(ItemType::try_from).transpose()?,
        };

        Ok(Self { update })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_listing_defaults_quantity_and_blank_fields() {
        let form: AddListingForm = serde_json::from_str(
            r#"{"name": " red bicycle ", "description": "  ", "item_type": "HAVE"}"#,
        )
        .unwrap();

        let payload: AddListingFormPayload = form.try_into().unwrap();

        assert_eq!(payload.name, "red bicycle");
        assert_eq!(payload.description, None);
        assert_eq!(payload.quantity, ListingQuantity::default());
        assert_eq!(payload.price.get(), 0.0);
        assert_eq!(payload.item_type, ItemType::Have);
    }

    #[test]
    fn add_listing_rejects_bad_values() {
        let cases = [
            r#"{"name": "", "item_type": "have"}"#,
            r#"{"name": "bike", "item_type": "swap"}"#,
            r#"{"name": "bike", "item_type": "have", "price": -1.0}"#,
            r#"{"name": "bike", "item_type": "have", "quantity": 1001}"#,
            r#"{"name": "bike", "item_type": "have", "image_url": "not a url"}"#,
        ];
        for case in cases {
            let form: AddListingForm = serde_json::from_str(case).unwrap();
            let payload: Result<AddListingFormPayload, _> = form.try_into();
            assert!(payload.is_err(), "{case}");
        }
    }

    #[test]
    fn update_listing_separates_absent_and_null() {
        let form: UpdateListingForm =
            serde_json::from_str(r#"{"price": 5.5, "description": null}"#).unwrap();

        let payload: UpdateListingFormPayload = form.try_into().unwrap();

        assert_eq!(payload.update.price.map(ListingPrice::get), Some(5.5));
        assert_eq!(payload.update.description, Some(None));
        assert_eq!(payload.update.category, None);
        assert_eq!(payload.update.name, None);
        assert!(payload.update.affects_matching());
    }

    #[test]
    fn empty_update_is_empty() {
        let form: UpdateListingForm = serde_json::from_str("{}").unwrap();
        let payload: UpdateListingFormPayload = form.try_into().unwrap();
        assert!(payload.update.is_empty());
    }
}
