use crate::models::{MemberStatus, Purpose, Role};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Processing state of a member request
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    #[default]
    New,
    InProgress,
    Done,
}

/// Request for membership or a booking, sent by a visitor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewMemberRequest {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rental_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MemberRequest {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub rental_id: Option<i64>,
    #[serde(default)]
    pub status: RequestStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Account as listed on the user administration screen.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub phone: String,
    pub role: Role,
    pub status: MemberStatus,
    #[serde(default)]
    pub purpose: Option<Purpose>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// One page of accounts
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct UserPage {
    #[serde(default)]
    pub rows: Vec<UserRecord>,
    #[serde(default)]
    pub count: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct UserCounts {
    pub total: u64,
    pub pending: u64,
    pub approved: u64,
    pub blocked: u64,
}

impl UserCounts {
    pub fn get(&self, status: MemberStatus) -> u64 {
        match status {
            MemberStatus::Pending => self.pending,
            MemberStatus::Approved => self.approved,
            MemberStatus::Blocked => self.blocked,
        }
    }
}

/// Legal document (terms, privacy policy, ...) stored by the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LegalDocument {
    pub doc_type: String,
    #[serde(alias = "file")]
    pub url: String,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}
