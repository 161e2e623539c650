//! Strongly-typed value objects used by domain entities.
//!
//! Listings, matches and notifications carry these wrappers instead of raw
//! primitives so identifiers, text values and numeric ranges are checked
//! once, at the boundary.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use thiserror::Error;
use validator::ValidateUrl;

/// Errors produced when attempting to construct constrained domain types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeConstraintError {
    /// An identifier was zero or negative.
    #[error("{0} must be greater than zero")]
    NonPositiveId(&'static str),
    /// A numeric value required to be non-negative was negative or not finite.
    #[error("{0} must be zero or greater")]
    NegativeNumber(&'static str),
    /// A numeric value fell outside its allowed range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
    },
    /// A string was empty or whitespace-only after trimming.
    #[error("{0} cannot be empty")]
    EmptyString(&'static str),
    /// A string exceeded its maximum length in characters.
    #[error("{0} is too long")]
    TooLong(&'static str),
    /// URL validation failed.
    #[error("{0} must be a valid URL")]
    InvalidUrl(&'static str),
    /// Similarity score must be in [0.0, 100.0].
    #[error("similarity score must be between 0 and 100")]
    InvalidSimilarityScore,
    /// Catch-all for custom validation failures.
    #[error("invalid value: {0}")]
    InvalidValue(String),
}

fn trim_and_require_non_empty<S: Into<String>>(
    value: S,
    field: &'static str,
) -> Result<String, TypeConstraintError> {
    let trimmed = value.into().trim().to_string();
    if trimmed.is_empty() {
        Err(TypeConstraintError::EmptyString(field))
    } else {
        Ok(trimmed)
    }
}

fn require_max_chars(
    value: String,
    max: usize,
    field: &'static str,
) -> Result<String, TypeConstraintError> {
    if value.chars().count() > max {
        Err(TypeConstraintError::TooLong(field))
    } else {
        Ok(value)
    }
}

/// Shared accessors and conversions for string-backed newtypes.
macro_rules! string_newtype_common {
    ($name:ident) => {
        impl $name {
            /// Borrow the value as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the wrapper and return the owned string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl std::ops::Deref for $name {
            type Target = str;

            fn deref(&self) -> &Self::Target {
                self.as_str()
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl TryFrom<String> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.as_str() == *other
            }
        }
    };
}

/// Macro to generate lightweight newtypes for positive identifiers.
macro_rules! id_newtype {
    ($name:ident, $doc:expr, $field:expr) => {
        #[doc = $doc]
        #[derive(
            Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Creates a new identifier ensuring it is greater than zero.
            pub fn new(value: i32) -> Result<Self, TypeConstraintError> {
                if value > 0 {
                    Ok(Self(value))
                } else {
                    Err(TypeConstraintError::NonPositiveId($field))
                }
            }

            /// Returns the raw `i32` backing this identifier.
            pub const fn get(self) -> i32 {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<i32> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: i32) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for i32 {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl PartialEq<i32> for $name {
            fn eq(&self, other: &i32) -> bool {
                self.0 == *other
            }
        }
    };
}

/// Trimmed, non-empty text capped at `$max` characters.
macro_rules! bounded_string_newtype {
    ($name:ident, $doc:expr, $field:expr, $max:expr) => {
        #[doc = $doc]
        #[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Maximum length in characters.
            pub const MAX_CHARS: usize = $max;

            /// Constructs a trimmed, non-empty value within the length limit.
            pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
                let trimmed = trim_and_require_non_empty(value, $field)?;
                require_max_chars(trimmed, $max, $field).map(Self)
            }
        }

        string_newtype_common!($name);
    };
}

macro_rules! url_string_newtype {
    ($name:ident, $doc:expr, $field:expr) => {
        #[doc = $doc]
        #[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Constructs a trimmed URL and validates its format.
            pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
                let trimmed = trim_and_require_non_empty(value, $field)?;
                if !trimmed.as_str().validate_url() {
                    return Err(TypeConstraintError::InvalidUrl($field));
                }
                require_max_chars(trimmed, 255, $field).map(Self)
            }
        }

        string_newtype_common!($name);
    };
}

id_newtype!(UserId, "Identifier of a user issued by the auth service.", "user_id");
id_newtype!(ListingId, "Unique identifier for a listing.", "listing_id");
id_newtype!(MatchId, "Unique identifier for a stored match.", "match_id");
id_newtype!(
    NotificationId,
    "Unique identifier for a notification.",
    "notification_id"
);

bounded_string_newtype!(ListingName, "Listing title.", "listing name", 100);
bounded_string_newtype!(
    ListingDescription,
    "Free-form listing description.",
    "description",
    5000
);
bounded_string_newtype!(CategoryName, "Listing category label.", "category", 50);
bounded_string_newtype!(
    ListingCondition,
    "Condition of the offered item, e.g. `used`.",
    "condition",
    30
);
bounded_string_newtype!(
    NotificationMessage,
    "Human-readable notification text.",
    "message",
    255
);

url_string_newtype!(ImageUrl, "Listing image URL.", "image url");
url_string_newtype!(VideoUrl, "Listing video URL.", "video url");

/// Non-negative price in standard currency units.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, PartialOrd)]
#[serde(try_from = "f64", into = "f64")]
pub struct ListingPrice(f64);

impl ListingPrice {
    /// Constructs a finite price that is zero or greater.
    pub fn new(value: f64) -> Result<Self, TypeConstraintError> {
        if value.is_finite() && value >= 0.0 {
            Ok(Self(value))
        } else {
            Err(TypeConstraintError::NegativeNumber("price"))
        }
    }

    /// Returns the raw `f64` value.
    pub const fn get(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for ListingPrice {
    type Error = TypeConstraintError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ListingPrice> for f64 {
    fn from(value: ListingPrice) -> Self {
        value.0
    }
}

/// Number of units offered or sought, between 1 and 1000.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(try_from = "i32", into = "i32")]
pub struct ListingQuantity(i32);

impl ListingQuantity {
    pub const MIN: i32 = 1;
    pub const MAX: i32 = 1000;

    pub fn new(value: i32) -> Result<Self, TypeConstraintError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(TypeConstraintError::OutOfRange {
                field: "quantity",
                min: Self::MIN.into(),
                max: Self::MAX.into(),
            })
        }
    }

    pub const fn get(self) -> i32 {
        self.0
    }
}

impl Default for ListingQuantity {
    fn default() -> Self {
        Self(Self::MIN)
    }
}

impl TryFrom<i32> for ListingQuantity {
    type Error = TypeConstraintError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ListingQuantity> for i32 {
    fn from(value: ListingQuantity) -> Self {
        value.0
    }
}

/// Whether a listing offers an item or seeks one.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Have,
    Need,
}

impl ItemType {
    /// String representation used in persistence.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Have => "have",
            Self::Need => "need",
        }
    }

    /// The type a listing of this type is matched against.
    pub const fn opposite(self) -> Self {
        match self {
            Self::Have => Self::Need,
            Self::Need => Self::Have,
        }
    }
}

impl Display for ItemType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ItemType {
    type Error = TypeConstraintError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "have" => Ok(Self::Have),
            "need" => Ok(Self::Need),
            other => Err(TypeConstraintError::InvalidValue(format!(
                "item type: {other}"
            ))),
        }
    }
}

impl TryFrom<String> for ItemType {
    type Error = TypeConstraintError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

/// Weighted similarity between two listings in the inclusive range [0, 100].
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, PartialOrd)]
#[serde(try_from = "f64", into = "f64")]
pub struct SimilarityScore(f64);

impl SimilarityScore {
    pub const MIN: f64 = 0.0;
    pub const MAX: f64 = 100.0;

    /// Constructs a validated similarity score.
    pub fn new(value: f64) -> Result<Self, TypeConstraintError> {
        if value.is_finite() && (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(TypeConstraintError::InvalidSimilarityScore)
        }
    }

    /// Builds a score from a raw value, clamping it into range.
    ///
    /// Non-finite input maps to zero.
    pub fn saturating(value: f64) -> Self {
        if value.is_finite() {
            Self(value.clamp(Self::MIN, Self::MAX))
        } else {
            Self(Self::MIN)
        }
    }

    /// Returns the raw `f64` value.
    pub const fn get(self) -> f64 {
        self.0
    }
}

impl Display for SimilarityScore {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl TryFrom<f64> for SimilarityScore {
    type Error = TypeConstraintError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SimilarityScore> for f64 {
    fn from(value: SimilarityScore) -> Self {
        value.0
    }
}

impl PartialEq<f64> for SimilarityScore {
    fn eq(&self, other: &f64) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_listing_names() {
        let value = ListingName::new("  red bicycle  ").unwrap();
        assert_eq!(value.as_str(), "red bicycle");
    }

    #[test]
    fn rejects_overlong_listing_names() {
        let err = ListingName::new("x".repeat(101)).unwrap_err();
        assert_eq!(err, TypeConstraintError::TooLong("listing name"));
    }

    #[test]
    fn rejects_non_positive_ids() {
        let err = ListingId::new(0).unwrap_err();
        assert_eq!(err, TypeConstraintError::NonPositiveId("listing_id"));
    }

    #[test]
    fn validates_urls() {
        assert!(ImageUrl::new("https://cdn.example.com/img/1.jpg").is_ok());
        let err = VideoUrl::new("not-a-url").unwrap_err();
        assert_eq!(err, TypeConstraintError::InvalidUrl("video url"));
    }

    #[test]
    fn quantity_is_bounded() {
        assert!(ListingQuantity::new(1).is_ok());
        assert!(ListingQuantity::new(1000).is_ok());
        assert!(ListingQuantity::new(0).is_err());
        assert!(ListingQuantity::new(1001).is_err());
        assert_eq!(ListingQuantity::default().get(), 1);
    }

    #[test]
    fn price_rejects_negative_numbers() {
        assert_eq!(ListingPrice::new(0.0).unwrap().get(), 0.0);
        assert_eq!(
            ListingPrice::new(-0.01).unwrap_err(),
            TypeConstraintError::NegativeNumber("price")
        );
    }

    #[test]
    fn item_type_round_trips_through_strings() {
        assert_eq!(ItemType::try_from("have").unwrap(), ItemType::Have);
        assert_eq!(ItemType::try_from(" NEED ").unwrap(), ItemType::Need);
        assert!(ItemType::try_from("swap").is_err());
        assert_eq!(ItemType::Have.opposite(), ItemType::Need);
        assert_eq!(ItemType::Need.opposite(), ItemType::Have);
    }

    #[test]
    fn similarity_score_range() {
        assert!(SimilarityScore::new(0.0).is_ok());
        assert!(SimilarityScore::new(100.0).is_ok());
        assert_eq!(
            SimilarityScore::new(100.5).unwrap_err(),
            TypeConstraintError::InvalidSimilarityScore
        );
        assert_eq!(SimilarityScore::saturating(120.0).get(), 100.0);
        assert_eq!(SimilarityScore::saturating(f64::NAN).get(), 0.0);
    }

    #[test]
    fn deserialization_enforces_constraints() {
        assert!(serde_json::from_str::<ListingName>("\"  \"").is_err());
        assert!(serde_json::from_str::<ListingQuantity>("0").is_err());
        let name: ListingName = serde_json::from_str("\" kayak \"").unwrap();
        assert_eq!(name, "kayak");
    }
}
