mod admin;
mod category;
mod identity;
mod listing;

pub use admin::{LegalDocument, MemberRequest, NewMemberRequest, RequestStatus, UserCounts, UserPage, UserRecord};
pub use category::{Category, CustomField, FieldType};
pub use identity::{Identity, MemberStatus, Purpose, Role};
pub use listing::{CustomDatum, FieldMeta, Listing, ListingImage, ListingKind, RentTime};

/// Lenient deserializers for values the API sends either as JSON numbers or strings.
pub(crate) mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    /// Number, numeric string, or anything else as `None`.
    pub fn opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.and_then(|v| match v {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }))
    }

    /// Number or numeric string, `0.0` when missing or unparseable.
    pub fn f64_or_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(opt_f64(deserializer)?.unwrap_or(0.0))
    }

    /// Scalars rendered to their string form, `null` to empty.
    pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s,
            Some(other) => other.to_string(),
        })
    }
}
