use crate::models::Category;
use serde::{Deserialize, Serialize};

/// Flat rent-time tag
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RentTime {
    pub id: i64,
    pub name: String,
}

/// Shape of a listing, selects how its detail is rendered.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ListingKind {
    SaleProperty,
    RentalProperty,
    LeisureItem,
}

impl ListingKind {
    /// Infer the kind from the workflow status when the server does not send one.
    pub fn from_status(status: &str) -> Self {
        let status = status.trim().to_lowercase();
        if status.contains("leisure") {
            ListingKind::LeisureItem
        } else if status.contains("portfolio") || status.contains("sale") {
            ListingKind::SaleProperty
        } else {
            ListingKind::RentalProperty
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListingImage {
    pub image: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::models::lenient::opt_f64"
    )]
    pub order: Option<f64>,
}

impl ListingImage {
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            order: None,
        }
    }

    pub fn ordered(image: impl Into<String>, order: f64) -> Self {
        Self {
            image: image.into(),
            order: Some(order),
        }
    }
}

/// Field metadata attached to a custom-data value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct FieldMeta {
    pub name: String,
    #[serde(default, rename = "type", deserialize_with = "crate::models::lenient::string")]
    pub field_type: String,
}

/// One value of a category custom field on a listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CustomDatum {
    #[serde(default, deserialize_with = "crate::models::lenient::string")]
    pub value: String,
    #[serde(default)]
    pub categories_datum: FieldMeta,
}

/// Rental, sale or leisure listing as served by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Listing {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub address: String,
    /// `0` means "price on request"
    #[serde(default, deserialize_with = "crate::models::lenient::f64_or_zero")]
    pub price: f64,
    #[serde(default, deserialize_with = "crate::models::lenient::string")]
    pub unit_of_numeration: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub featured: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ListingKind>,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub rent_time: Option<RentTime>,
    #[serde(default)]
    pub rentals_images: Vec<ListingImage>,
    #[serde(default)]
    pub rental_custom_data: Vec<CustomDatum>,
}

impl Listing {
    pub fn kind(&self) -> ListingKind {
        self.kind
            .unwrap_or_else(|| ListingKind::from_status(&self.status))
    }

    pub fn category_id(&self) -> Option<i64> {
        self.category.as_ref().map(|c| c.id)
    }
}
