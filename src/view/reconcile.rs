//! Turn nested listing JSON into display-ready values.

use crate::models::{Category, FieldType, Listing, ListingImage};
use serde::Serialize;
use std::cmp::Ordering;

/// Field names rendered as areas in square metres
const AREA_FIELDS: [&str; 2] = ["Plot Area", "Living Area"];

pub const PRICE_ON_REQUEST: &str = "Price on request";

/// Image shown on a card
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum CardImage {
    Image(String),
    Placeholder,
}

/// Display order of a listing's images.
///
/// Each image is annotated with its `order`, or its position in the input
/// when it has none, then sorted ascending. Ties keep input order.
pub fn order_images(images: &[ListingImage]) -> Vec<ListingImage> {
    let mut annotated: Vec<ListingImage> = images
        .iter()
        .enumerate()
        .map(|(index, image)| {
            let order = image
                .order
                .filter(|o| o.is_finite())
                .unwrap_or(index as f64);
            ListingImage::ordered(image.image.clone(), order)
        })
        .collect();

    // sort_by is stable
    annotated.sort_by(|a, b| {
        a.order
            .partial_cmp(&b.order)
            .unwrap_or(Ordering::Equal)
    });
    annotated
}

pub fn primary_image(images: &[ListingImage]) -> CardImage {
    order_images(images)
        .into_iter()
        .map(|image| image.image)
        .find(|path| !path.trim().is_empty())
        .map(CardImage::Image)
        .unwrap_or(CardImage::Placeholder)
}

/// Format with `,` thousands separators and up to three decimals.
pub fn format_grouped(value: f64) -> String {
    // scaling beyond this overflows; such values have no fractional digits anyway
    let rounded = if value.abs() < 1e15 {
        (value * 1000.0).round() / 1000.0
    } else {
        value
    };
    let negative = rounded < 0.0;
    let abs = rounded.abs();

    let formatted = format!("{:.3}", abs);
    let (int_part, frac_part) = formatted
        .split_once('.')
        .unwrap_or((formatted.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if !frac_part.is_empty() {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}

pub fn is_area_field(name: &str) -> bool {
    AREA_FIELDS.iter().any(|token| name.contains(token))
}

/// Rendered value of a custom field, or `None` when it must be hidden.
pub fn render_custom_value(field_name: &str, value: &str) -> Option<String> {
    if value.is_empty() || value == "0" {
        return None;
    }
    if !is_area_field(field_name) {
        return Some(value.to_string());
    }
    match value.trim().replace(',', "").parse::<f64>() {
        Ok(area) => Some(format!("{} m²", format_grouped(area))),
        Err(_) => Some(format!("{} m²", value)),
    }
}

pub fn price_label(price: f64) -> String {
    if price == 0.0 {
        PRICE_ON_REQUEST.to_string()
    } else {
        format_grouped(price)
    }
}

/// Unit text with stray quote characters removed.
pub fn display_unit(unit: &str) -> String {
    unit.replace('"', "").trim().to_string()
}

/// Custom-data value joined with its category field definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailField {
    pub name: String,
    pub value: String,
    pub field_type: FieldType,
    pub icon: Option<String>,
}

/// Visible custom fields of a listing, in the category's field order.
/// Entries with no matching definition follow in their original order.
pub fn detail_fields(listing: &Listing) -> Vec<DetailField> {
    let category = listing.category.as_ref();
    let mut rows: Vec<(usize, DetailField)> = listing
        .rental_custom_data
        .iter()
        .filter_map(|datum| {
            let name = &datum.categories_datum.name;
            let value = render_custom_value(name, &datum.value)?;
            let (position, definition) = lookup_field(category, name);
            let field_type = definition
                .map(|d| d.field_type)
                .unwrap_or_else(|| parse_field_type(&datum.categories_datum.field_type));
            let icon = definition
                .map(|d| d.icon.clone())
                .filter(|icon| !icon.is_empty());
            Some((
                position,
                DetailField {
                    name: name.clone(),
                    value,
                    field_type,
                    icon,
                },
            ))
        })
        .collect();

    rows.sort_by_key(|(position, _)| *position);
    rows.into_iter().map(|(_, field)| field).collect()
}

fn lookup_field<'a>(
    category: Option<&'a Category>,
    name: &str,
) -> (usize, Option<&'a crate::models::CustomField>) {
    category
        .and_then(|c| {
            c.custom_fields
                .iter()
                .position(|f| f.field_name == name)
                .map(|i| (i, &c.custom_fields[i]))
        })
        .map(|(i, field)| (i, Some(field)))
        .unwrap_or((usize::MAX, None))
}

fn parse_field_type(raw: &str) -> FieldType {
    match raw.trim().to_lowercase().as_str() {
        "int" => FieldType::Int,
        "double" => FieldType::Double,
        "date" => FieldType::Date,
        _ => FieldType::String,
    }
}
