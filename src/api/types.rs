use crate::models::{ListingImage, MemberStatus, Purpose};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Registration form; the server always creates the account as pending.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purpose: Option<Purpose>,
}

/// Every auth endpoint answers with a signed session token.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
}

/// File attached to a multipart request
#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    pub file_name: String,
    pub mime: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime: None,
            bytes,
        }
    }
}

/// Server-bound shape of a custom field definition.
///
/// Always carries every key: size bounds are numbers (missing input becomes
/// `0`) and `icon` is an empty string rather than absent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CustomFieldPayload {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub min_size: f64,
    pub max_size: f64,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryForm {
    pub name: String,
    /// Newly uploaded icon, if any
    pub icon: Option<UploadFile>,
    /// Existing icon path kept on update
    pub icon_path: Option<String>,
    pub custom_fields: Vec<CustomFieldPayload>,
}

/// Value for one category field on a listing form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CustomDataPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_id: Option<i64>,
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListingForm {
    pub name: String,
    pub description: String,
    pub address: String,
    pub price: f64,
    pub unit_of_numeration: String,
    pub status: String,
    pub featured: bool,
    pub category_id: Option<i64>,
    pub rent_time_id: Option<i64>,
    pub custom_data: Vec<CustomDataPayload>,
    /// Images already stored on the server, with their display order
    pub kept_images: Vec<ListingImage>,
    pub new_images: Vec<UploadFile>,
}

/// Which slice of listings to fetch
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum ListingQuery {
    #[default]
    All,
    Status(String),
    Featured,
    Category(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    Approve,
    Block,
    Unblock,
}

impl UserAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserAction::Approve => "approve",
            UserAction::Block => "block",
            UserAction::Unblock => "unblock",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserPageQuery {
    /// 1-based page number
    pub page: u32,
    pub limit: u32,
    pub status: Option<MemberStatus>,
}

impl Default for UserPageQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 20,
            status: None,
        }
    }
}
