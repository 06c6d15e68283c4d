#![allow(dead_code)]
//! In-process stand-in for the portal REST API.

use async_trait::async_trait;
use estate_portal::api::{
    AuthResponse, CategoryForm, Credentials, ListingForm, ListingQuery, PortalApi, Registration,
    UploadFile, UserAction, UserPageQuery,
};
use estate_portal::error::{PortalError, Result};
use estate_portal::models::{
    Category, CustomField, FieldType, LegalDocument, Listing, MemberRequest, MemberStatus,
    NewMemberRequest, RentTime, RequestStatus, UserPage, UserRecord,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

pub fn mint_token(id: i64, email: &str, role: &str, status: &str) -> String {
    let claims = json!({
        "id": id,
        "email": email,
        "fullName": "Test Person",
        "phone": "+1 555 0100",
        "role": role,
        "status": status,
        "iat": 1_700_000_000u64,
    });
    encode(&Header::default(), &claims, &EncodingKey::from_secret(b"fake-server")).unwrap()
}

#[derive(Default)]
pub struct FakeState {
    pub accounts: HashMap<String, (String, String)>,
    pub admin_accounts: HashMap<String, (String, String)>,
    /// Session token -> token the server answers with on check
    pub sessions: HashMap<String, String>,
    pub categories: Vec<Category>,
    pub listings: Vec<Listing>,
    pub rent_times: Vec<RentTime>,
    pub requests: Vec<MemberRequest>,
    pub users: Vec<UserRecord>,
    pub documents: HashMap<String, LegalDocument>,
    pub calls: Vec<String>,
    pub fail_loads: bool,
    pub unauthorized_loads: bool,
    pub next_id: i64,
}

#[derive(Default)]
pub struct FakeApi {
    pub state: Mutex<FakeState>,
    /// Calls that wait for a release before answering, keyed by call name
    holds: Mutex<HashMap<String, Arc<Notify>>>,
}

impl FakeApi {
    pub fn new() -> Self {
        let api = Self::default();
        api.state.lock().unwrap().next_id = 100;
        api
    }

    pub fn with_member(&self, email: &str, password: &str, status: &str) -> String {
        let mut state = self.state.lock().unwrap();
        let id = state.accounts.len() as i64 + 1;
        let token = mint_token(id, email, "user", status);
        state
            .accounts
            .insert(email.to_string(), (password.to_string(), token.clone()));
        state.sessions.insert(token.clone(), token.clone());
        token
    }

    pub fn with_admin(&self, email: &str, password: &str) -> String {
        let mut state = self.state.lock().unwrap();
        let token = mint_token(900, email, "admin", "approved");
        state
            .admin_accounts
            .insert(email.to_string(), (password.to_string(), token.clone()));
        state.sessions.insert(token.clone(), token.clone());
        token
    }

    /// Make the next session check for `token` answer with `replacement`.
    pub fn reissue(&self, token: &str, replacement: &str) {
        let mut state = self.state.lock().unwrap();
        state
            .sessions
            .insert(token.to_string(), replacement.to_string());
        state
            .sessions
            .insert(replacement.to_string(), replacement.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count_calls(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    pub fn set_fail_loads(&self, fail: bool) {
        self.state.lock().unwrap().fail_loads = fail;
    }

    pub fn set_unauthorized_loads(&self, unauthorized: bool) {
        self.state.lock().unwrap().unauthorized_loads = unauthorized;
    }

    pub fn push_listing(&self, listing: Listing) {
        self.state.lock().unwrap().listings.push(listing);
    }

    pub fn push_category(&self, category: Category) {
        self.state.lock().unwrap().categories.push(category);
    }

    pub fn push_user(&self, user: UserRecord) {
        self.state.lock().unwrap().users.push(user);
    }

    /// Make the next `call` wait until the returned handle is notified.
    pub fn hold(&self, call: &str) -> Arc<Notify> {
        let release = Arc::new(Notify::new());
        self.holds
            .lock()
            .unwrap()
            .insert(call.to_string(), release.clone());
        release
    }

    async fn wait_if_held(&self, call: &str) {
        let release = self.holds.lock().unwrap().remove(call);
        if let Some(release) = release {
            release.notified().await;
        }
    }

    fn record(&self, call: impl Into<String>) -> std::sync::MutexGuard<'_, FakeState> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call.into());
        state
    }

    fn load_guard(state: &FakeState) -> Result<()> {
        if state.unauthorized_loads {
            return Err(PortalError::Unauthorized {
                status: 401,
                message: "jwt expired".to_string(),
            });
        }
        if state.fail_loads {
            return Err(PortalError::Server {
                status: 503,
                message: "unavailable".to_string(),
            });
        }
        Ok(())
    }

    fn next_id(state: &mut FakeState) -> i64 {
        state.next_id += 1;
        state.next_id
    }
}

fn fields_from_form(form: &CategoryForm) -> Vec<CustomField> {
    form.custom_fields
        .iter()
        .enumerate()
        .map(|(i, f)| CustomField {
            id: Some(i as i64 + 1),
            field_name: f.name.clone(),
            field_type: serde_json::from_value(json!(f.field_type)).unwrap_or(FieldType::String),
            min_size: f.min_size,
            max_size: f.max_size,
            icon: f.icon.clone(),
        })
        .collect()
}

fn not_found(what: &str, id: i64) -> PortalError {
    PortalError::NotFound(format!("{} {} not found", what, id))
}

#[async_trait]
impl PortalApi for FakeApi {
    async fn check_auth(&self, token: &str) -> Result<AuthResponse> {
        self.wait_if_held("check_auth").await;
        let state = self.record("check_auth");
        match state.sessions.get(token) {
            Some(current) => Ok(AuthResponse {
                token: current.clone(),
            }),
            None => Err(PortalError::Unauthorized {
                status: 401,
                message: "invalid token".to_string(),
            }),
        }
    }

    async fn login(&self, credentials: &Credentials) -> Result<AuthResponse> {
        let state = self.record("login");
        match state.accounts.get(&credentials.email) {
            Some((password, token)) if *password == credentials.password => Ok(AuthResponse {
                token: token.clone(),
            }),
            _ => Err(PortalError::Unauthorized {
                status: 401,
                message: "Wrong email or password".to_string(),
            }),
        }
    }

    async fn register(&self, registration: &Registration) -> Result<AuthResponse> {
        let mut state = self.record("register");
        if state.accounts.contains_key(&registration.email) {
            return Err(PortalError::Validation("User already exists".to_string()));
        }
        let id = Self::next_id(&mut state);
        let token = mint_token(id, &registration.email, "user", "pending");
        state.accounts.insert(
            registration.email.clone(),
            (registration.password.clone(), token.clone()),
        );
        state.sessions.insert(token.clone(), token.clone());
        Ok(AuthResponse { token })
    }

    async fn admin_login(&self, credentials: &Credentials) -> Result<AuthResponse> {
        let state = self.record("admin_login");
        match state.admin_accounts.get(&credentials.email) {
            Some((password, token)) if *password == credentials.password => Ok(AuthResponse {
                token: token.clone(),
            }),
            _ => Err(PortalError::Unauthorized {
                status: 403,
                message: "Access denied".to_string(),
            }),
        }
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        let state = self.record("list_categories");
        Self::load_guard(&state)?;
        Ok(state.categories.clone())
    }

    async fn create_category(&self, form: &CategoryForm) -> Result<Category> {
        let mut state = self.record("create_category");
        let id = Self::next_id(&mut state);
        let category = Category {
            id,
            name: form.name.clone(),
            icon: form.icon_path.clone(),
            is_locked: false,
            custom_fields: fields_from_form(form),
        };
        state.categories.push(category.clone());
        Ok(category)
    }

    async fn update_category(&self, id: i64, form: &CategoryForm) -> Result<Category> {
        let mut state = self.record(format!("update_category {}", id));
        let category = state
            .categories
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| not_found("category", id))?;
        if category.is_locked {
            return Err(PortalError::Unauthorized {
                status: 403,
                message: "Category is locked".to_string(),
            });
        }
        category.name = form.name.clone();
        category.custom_fields = fields_from_form(form);
        Ok(category.clone())
    }

    async fn delete_category(&self, id: i64) -> Result<()> {
        let mut state = self.record(format!("delete_category {}", id));
        state.categories.retain(|c| c.id != id);
        Ok(())
    }

    async fn lock_category(&self, id: i64) -> Result<()> {
        let mut state = self.record(format!("lock_category {}", id));
        if let Some(c) = state.categories.iter_mut().find(|c| c.id == id) {
            c.is_locked = true;
        }
        Ok(())
    }

    async fn unlock_category(&self, id: i64) -> Result<()> {
        let mut state = self.record(format!("unlock_category {}", id));
        if let Some(c) = state.categories.iter_mut().find(|c| c.id == id) {
            c.is_locked = false;
        }
        Ok(())
    }

    async fn list_rent_times(&self) -> Result<Vec<RentTime>> {
        let state = self.record("list_rent_times");
        Self::load_guard(&state)?;
        Ok(state.rent_times.clone())
    }

    async fn create_rent_time(&self, name: &str) -> Result<RentTime> {
        let mut state = self.record("create_rent_time");
        let rent_time = RentTime {
            id: Self::next_id(&mut state),
            name: name.to_string(),
        };
        state.rent_times.push(rent_time.clone());
        Ok(rent_time)
    }

    async fn update_rent_time(&self, id: i64, name: &str) -> Result<RentTime> {
        let mut state = self.record(format!("update_rent_time {}", id));
        let rent_time = state
            .rent_times
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| not_found("rent time", id))?;
        rent_time.name = name.to_string();
        Ok(rent_time.clone())
    }

    async fn delete_rent_time(&self, id: i64) -> Result<()> {
        let mut state = self.record(format!("delete_rent_time {}", id));
        state.rent_times.retain(|r| r.id != id);
        Ok(())
    }

    async fn list_listings(&self, query: &ListingQuery) -> Result<Vec<Listing>> {
        let call = format!("list_listings {:?}", query);
        self.wait_if_held(&call).await;
        let state = self.record(call);
        Self::load_guard(&state)?;
        Ok(state
            .listings
            .iter()
            .filter(|l| match query {
                ListingQuery::All => true,
                ListingQuery::Featured => l.featured,
                ListingQuery::Status(status) => &l.status == status,
                ListingQuery::Category(id) => l.category_id() == Some(*id),
            })
            .cloned()
            .collect())
    }

    async fn create_listing(&self, form: &ListingForm) -> Result<Listing> {
        let mut state = self.record("create_listing");
        let id = Self::next_id(&mut state);
        let category = form
            .category_id
            .and_then(|cid| state.categories.iter().find(|c| c.id == cid).cloned());
        let listing = Listing {
            id,
            name: form.name.clone(),
            description: form.description.clone(),
            address: form.address.clone(),
            price: form.price,
            unit_of_numeration: form.unit_of_numeration.clone(),
            status: form.status.clone(),
            featured: form.featured,
            kind: None,
            category,
            rent_time: None,
            rentals_images: form.kept_images.clone(),
            rental_custom_data: vec![],
        };
        state.listings.push(listing.clone());
        Ok(listing)
    }

    async fn update_listing(&self, id: i64, form: &ListingForm) -> Result<Listing> {
        let mut state = self.record(format!("update_listing {}", id));
        let listing = state
            .listings
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| not_found("listing", id))?;
        listing.name = form.name.clone();
        listing.price = form.price;
        listing.status = form.status.clone();
        listing.featured = form.featured;
        Ok(listing.clone())
    }

    async fn set_featured(&self, id: i64, featured: bool) -> Result<()> {
        let mut state = self.record(format!("set_featured {} {}", id, featured));
        let listing = state
            .listings
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| not_found("listing", id))?;
        listing.featured = featured;
        Ok(())
    }

    async fn delete_listing(&self, id: i64) -> Result<()> {
        let mut state = self.record(format!("delete_listing {}", id));
        state.listings.retain(|l| l.id != id);
        Ok(())
    }

    async fn upload_document(&self, doc_type: &str, file: &UploadFile) -> Result<LegalDocument> {
        let mut state = self.record(format!("upload_document {}", doc_type));
        let document = LegalDocument {
            doc_type: doc_type.to_string(),
            url: format!("/docs/{}", file.file_name),
            updated_at: None,
        };
        state
            .documents
            .insert(doc_type.to_string(), document.clone());
        Ok(document)
    }

    async fn fetch_document(&self, doc_type: &str) -> Result<LegalDocument> {
        let state = self.record(format!("fetch_document {}", doc_type));
        Self::load_guard(&state)?;
        state
            .documents
            .get(doc_type)
            .cloned()
            .ok_or_else(|| PortalError::NotFound(doc_type.to_string()))
    }

    async fn create_member_request(&self, request: &NewMemberRequest) -> Result<MemberRequest> {
        let mut state = self.record("create_member_request");
        let created = MemberRequest {
            id: Self::next_id(&mut state),
            full_name: request.full_name.clone(),
            email: request.email.clone(),
            phone: request.phone.clone(),
            message: request.message.clone(),
            rental_id: request.rental_id,
            status: RequestStatus::New,
            created_at: None,
        };
        state.requests.push(created.clone());
        Ok(created)
    }

    async fn list_member_requests(&self) -> Result<Vec<MemberRequest>> {
        let state = self.record("list_member_requests");
        Self::load_guard(&state)?;
        Ok(state.requests.clone())
    }

    async fn update_member_request(&self, id: i64, status: RequestStatus) -> Result<MemberRequest> {
        let mut state = self.record(format!("update_member_request {}", id));
        let request = state
            .requests
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| not_found("request", id))?;
        request.status = status;
        Ok(request.clone())
    }

    async fn count_users(&self, status: Option<MemberStatus>) -> Result<u64> {
        let state = self.record("count_users");
        Self::load_guard(&state)?;
        Ok(state
            .users
            .iter()
            .filter(|u| status.map(|s| u.status == s).unwrap_or(true))
            .count() as u64)
    }

    async fn list_users(&self, query: &UserPageQuery) -> Result<UserPage> {
        let state = self.record("list_users");
        Self::load_guard(&state)?;
        let matching: Vec<UserRecord> = state
            .users
            .iter()
            .filter(|u| query.status.map(|s| u.status == s).unwrap_or(true))
            .cloned()
            .collect();
        let start = ((query.page.max(1) - 1) * query.limit) as usize;
        Ok(UserPage {
            count: matching.len() as u64,
            rows: matching
                .into_iter()
                .skip(start)
                .take(query.limit as usize)
                .collect(),
        })
    }

    async fn change_user_status(&self, id: i64, action: UserAction) -> Result<()> {
        let mut state = self.record(format!("change_user_status {} {}", id, action.as_str()));
        let user = state
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| not_found("user", id))?;
        user.status = match action {
            UserAction::Approve | UserAction::Unblock => MemberStatus::Approved,
            UserAction::Block => MemberStatus::Blocked,
        };
        Ok(())
    }
}
