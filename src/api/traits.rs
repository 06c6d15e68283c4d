use crate::api::types::{
    AuthResponse, CategoryForm, Credentials, ListingForm, ListingQuery, Registration, UploadFile,
    UserAction, UserPageQuery,
};
use crate::error::Result;
use crate::models::{
    Category, LegalDocument, Listing, MemberRequest, MemberStatus, NewMemberRequest, RentTime,
    RequestStatus, UserPage,
};
use async_trait::async_trait;

/// Boundary to the remote REST API.
/// Stores only talk to the server through this trait, so tests can swap in a fake.
#[async_trait]
pub trait PortalApi: Send + Sync {
    /// Ask the server who owns `token`; answers with a fresh token.
    async fn check_auth(&self, token: &str) -> Result<AuthResponse>;
    async fn login(&self, credentials: &Credentials) -> Result<AuthResponse>;
    async fn register(&self, registration: &Registration) -> Result<AuthResponse>;
    async fn admin_login(&self, credentials: &Credentials) -> Result<AuthResponse>;

    async fn list_categories(&self) -> Result<Vec<Category>>;
    async fn create_category(&self, form: &CategoryForm) -> Result<Category>;
    async fn update_category(&self, id: i64, form: &CategoryForm) -> Result<Category>;
    async fn delete_category(&self, id: i64) -> Result<()>;
    async fn lock_category(&self, id: i64) -> Result<()>;
    async fn unlock_category(&self, id: i64) -> Result<()>;

    async fn list_rent_times(&self) -> Result<Vec<RentTime>>;
    async fn create_rent_time(&self, name: &str) -> Result<RentTime>;
    async fn update_rent_time(&self, id: i64, name: &str) -> Result<RentTime>;
    async fn delete_rent_time(&self, id: i64) -> Result<()>;

    async fn list_listings(&self, query: &ListingQuery) -> Result<Vec<Listing>>;
    async fn create_listing(&self, form: &ListingForm) -> Result<Listing>;
    async fn update_listing(&self, id: i64, form: &ListingForm) -> Result<Listing>;
    /// Change only the `featured` flag of a listing.
    async fn set_featured(&self, id: i64, featured: bool) -> Result<()>;
    async fn delete_listing(&self, id: i64) -> Result<()>;

    async fn upload_document(&self, doc_type: &str, file: &UploadFile) -> Result<LegalDocument>;
    async fn fetch_document(&self, doc_type: &str) -> Result<LegalDocument>;

    async fn create_member_request(&self, request: &NewMemberRequest) -> Result<MemberRequest>;
    async fn list_member_requests(&self) -> Result<Vec<MemberRequest>>;
    async fn update_member_request(&self, id: i64, status: RequestStatus) -> Result<MemberRequest>;

    /// Number of accounts, optionally restricted to one status.
    async fn count_users(&self, status: Option<MemberStatus>) -> Result<u64>;
    async fn list_users(&self, query: &UserPageQuery) -> Result<UserPage>;
    async fn change_user_status(&self, id: i64, action: UserAction) -> Result<()>;
}
