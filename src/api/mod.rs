pub mod http;
pub mod tokens;
pub mod traits;
pub mod types;

pub use http::HttpPortalApi;
pub use tokens::{decode_identity, FileTokenStore, MemoryTokenStore, TokenSlot, TokenStore};
pub use traits::PortalApi;
pub use types::{
    AuthResponse, CategoryForm, Credentials, CustomDataPayload, CustomFieldPayload, ListingForm,
    ListingQuery, Registration, UploadFile, UserAction, UserPageQuery,
};
