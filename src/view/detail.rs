//! Full listing detail, one variant per listing shape.

use crate::models::{Listing, ListingKind};
use crate::view::reconcile::{detail_fields, display_unit, order_images, price_label, DetailField};
use serde::Serialize;

/// Parts every detail dialog shows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailCommon {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub address: String,
    /// Ordered image paths, primary first
    pub images: Vec<String>,
    pub fields: Vec<DetailField>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaleDetail {
    #[serde(flatten)]
    pub common: DetailCommon,
    pub price: String,
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RentalDetail {
    #[serde(flatten)]
    pub common: DetailCommon,
    pub price: String,
    pub unit: String,
    pub rent_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeisureDetail {
    #[serde(flatten)]
    pub common: DetailCommon,
    pub price: String,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ListingDetail {
    SaleProperty(SaleDetail),
    RentalProperty(RentalDetail),
    LeisureItem(LeisureDetail),
}

impl ListingDetail {
    pub fn from_listing(listing: &Listing) -> Self {
        let common = DetailCommon {
            id: listing.id,
            name: listing.name.clone(),
            description: listing.description.clone(),
            address: listing.address.clone(),
            images: order_images(&listing.rentals_images)
                .into_iter()
                .map(|i| i.image)
                .collect(),
            fields: detail_fields(listing),
        };
        let price = price_label(listing.price);
        let unit = display_unit(&listing.unit_of_numeration);

        match listing.kind() {
            ListingKind::SaleProperty => ListingDetail::SaleProperty(SaleDetail {
                common,
                price,
                category: listing.category.as_ref().map(|c| c.name.clone()),
            }),
            ListingKind::RentalProperty => ListingDetail::RentalProperty(RentalDetail {
                common,
                price,
                unit,
                rent_time: listing.rent_time.as_ref().map(|r| r.name.clone()),
            }),
            ListingKind::LeisureItem => ListingDetail::LeisureItem(LeisureDetail { common, price, unit }),
        }
    }

    pub fn kind(&self) -> ListingKind {
        match self {
            ListingDetail::SaleProperty(_) => ListingKind::SaleProperty,
            ListingDetail::RentalProperty(_) => ListingKind::RentalProperty,
            ListingDetail::LeisureItem(_) => ListingKind::LeisureItem,
        }
    }

    pub fn common(&self) -> &DetailCommon {
        match self {
            ListingDetail::SaleProperty(d) => &d.common,
            ListingDetail::RentalProperty(d) => &d.common,
            ListingDetail::LeisureItem(d) => &d.common,
        }
    }

    /// Plain-text rendering of the detail dialog.
    pub fn render_lines(&self) -> Vec<String> {
        let common = self.common();
        let mut lines = vec![common.name.clone()];
        if !common.address.is_empty() {
            lines.push(common.address.clone());
        }

        match self {
            ListingDetail::SaleProperty(d) => {
                lines.push(format!("Price: {}", d.price));
                if let Some(category) = &d.category {
                    lines.push(format!("Category: {}", category));
                }
            }
            ListingDetail::RentalProperty(d) => {
                lines.push(with_unit(&d.price, &d.unit));
                if let Some(rent_time) = &d.rent_time {
                    lines.push(format!("Rental term: {}", rent_time));
                }
            }
            ListingDetail::LeisureItem(d) => lines.push(with_unit(&d.price, &d.unit)),
        }

        for field in &common.fields {
            lines.push(format!("{}: {}", field.name, field.value));
        }
        if !common.description.is_empty() {
            lines.push(common.description.clone());
        }
        lines
    }
}

fn with_unit(price: &str, unit: &str) -> String {
    if unit.is_empty() || price == crate::view::reconcile::PRICE_ON_REQUEST {
        format!("Price: {}", price)
    } else {
        format!("Price: {} {}", price, unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ListingImage, RentTime};

    fn listing(status: &str) -> Listing {
        Listing {
            id: 9,
            name: "Sea Loft".to_string(),
            description: "Loft above the marina".to_string(),
            address: "Harbour 1".to_string(),
            price: 4200.0,
            unit_of_numeration: "\"per month\"".to_string(),
            status: status.to_string(),
            featured: true,
            kind: None,
            category: None,
            rent_time: Some(RentTime {
                id: 1,
                name: "Long term".to_string(),
            }),
            rentals_images: vec![ListingImage::new("b.jpg"), ListingImage::ordered("a.jpg", 0.5)],
            rental_custom_data: vec![],
        }
    }

    #[test]
    fn test_variant_follows_kind() {
        let rental = ListingDetail::from_listing(&listing("rentals"));
        assert_eq!(rental.kind(), ListingKind::RentalProperty);
        assert_eq!(rental.common().images, vec!["b.jpg", "a.jpg"]);
        assert!(rental.render_lines().contains(&"Price: 4,200 per month".to_string()));
        assert!(rental.render_lines().contains(&"Rental term: Long term".to_string()));

        let mut explicit = listing("rentals");
        explicit.kind = Some(ListingKind::LeisureItem);
        assert_eq!(ListingDetail::from_listing(&explicit).kind(), ListingKind::LeisureItem);
    }

    #[test]
    fn test_serialized_detail_is_tagged() {
        let detail = ListingDetail::from_listing(&listing("our portfolio"));
        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["kind"], "sale_property");
        assert_eq!(json["price"], "4,200");
        assert_eq!(json["name"], "Sea Loft");
    }
}
