use serde::{Deserialize, Serialize};

/// Declared type of a custom field
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    String,
    Int,
    Double,
    Date,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Int => "int",
            FieldType::Double => "double",
            FieldType::Date => "date",
        }
    }
}

/// Administrator-defined attribute of a category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CustomField {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(alias = "name")]
    pub field_name: String,
    #[serde(default, alias = "type")]
    pub field_type: FieldType,
    #[serde(default, deserialize_with = "crate::models::lenient::f64_or_zero")]
    pub min_size: f64,
    #[serde(default, deserialize_with = "crate::models::lenient::f64_or_zero")]
    pub max_size: f64,
    #[serde(default, deserialize_with = "crate::models::lenient::string")]
    pub icon: String,
}

/// Listing category with its custom field schema.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub is_locked: bool,
    #[serde(default)]
    pub custom_fields: Vec<CustomField>,
}

impl Category {
    pub fn field(&self, name: &str) -> Option<&CustomField> {
        self.custom_fields.iter().find(|f| f.field_name == name)
    }
}
