use crate::api::tokens::TokenStore;
use crate::api::traits::PortalApi;
use crate::api::types::{
    AuthResponse, CategoryForm, Credentials, ListingForm, ListingQuery, Registration, UploadFile,
    UserAction, UserPageQuery,
};
use crate::config::PortalConfig;
use crate::error::{PortalError, Result};
use crate::models::{
    Category, LegalDocument, Listing, MemberRequest, MemberStatus, NewMemberRequest, RentTime,
    RequestStatus, UserPage,
};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

/// reqwest-backed implementation of the portal REST API
pub struct HttpPortalApi {
    client: Client,
    config: PortalConfig,
    tokens: Arc<dyn TokenStore>,
}

#[derive(Deserialize)]
struct CountResponse {
    count: u64,
}

impl HttpPortalApi {
    pub fn new(config: PortalConfig, tokens: Arc<dyn TokenStore>) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("estate-portal/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            config,
            tokens,
        })
    }

    /// Build a request, attaching the preferred token at send time.
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.authorized(self.client.request(method, self.config.url(path)))
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.tokens.preferred() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response> {
        let response = request.send().await?;
        let status = response.status();
        debug!("{} {}", status, response.url().path());

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PortalError::from_status(status, &body));
        }
        Ok(response)
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self.send(request).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn execute(&self, request: RequestBuilder) -> Result<()> {
        self.send(request).await.map(|_| ())
    }
}

fn file_part(file: &UploadFile) -> Result<Part> {
    let part = Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
    match &file.mime {
        Some(mime) => Ok(part.mime_str(mime)?),
        None => Ok(part),
    }
}

fn category_form(form: &CategoryForm) -> Result<Form> {
    let mut multipart = Form::new()
        .text("name", form.name.clone())
        .text("customFields", serde_json::to_string(&form.custom_fields)?);

    if let Some(path) = &form.icon_path {
        multipart = multipart.text("iconPath", path.clone());
    }
    if let Some(icon) = &form.icon {
        multipart = multipart.part("icon", file_part(icon)?);
    }
    Ok(multipart)
}

fn listing_form(form: &ListingForm) -> Result<Form> {
    let mut multipart = Form::new()
        .text("name", form.name.clone())
        .text("description", form.description.clone())
        .text("address", form.address.clone())
        .text("price", form.price.to_string())
        .text("unit_of_numeration", form.unit_of_numeration.clone())
        .text("status", form.status.clone())
        .text("featured", form.featured.to_string())
        .text("customData", serde_json::to_string(&form.custom_data)?)
        .text("keptImages", serde_json::to_string(&form.kept_images)?);

    if let Some(id) = form.category_id {
        multipart = multipart.text("categoryId", id.to_string());
    }
    if let Some(id) = form.rent_time_id {
        multipart = multipart.text("rentTimeId", id.to_string());
    }
    for image in &form.new_images {
        multipart = multipart.part("images", file_part(image)?);
    }
    Ok(multipart)
}

/// Listing collection URL; free-form status segments such as "our portfolio" are percent-encoded.
fn listing_url(base_url: &str, query: &ListingQuery) -> Result<Url> {
    let invalid = || PortalError::Config(format!("Invalid base URL: {}", base_url));
    let mut url = Url::parse(&format!("{}/api/rentals", base_url)).map_err(|_| invalid())?;
    {
        let mut segments = url.path_segments_mut().map_err(|_| invalid())?;
        match query {
            ListingQuery::All => {}
            ListingQuery::Featured => {
                segments.push("featured");
            }
            ListingQuery::Status(status) => {
                segments.push("status").push(status);
            }
            ListingQuery::Category(id) => {
                segments.push("category").push(&id.to_string());
            }
        }
    }
    Ok(url)
}

#[async_trait]
impl PortalApi for HttpPortalApi {
    async fn check_auth(&self, token: &str) -> Result<AuthResponse> {
        let request = self
            .client
            .get(self.config.url("/api/user/auth"))
            .bearer_auth(token);
        self.fetch(request).await
    }

    async fn login(&self, credentials: &Credentials) -> Result<AuthResponse> {
        self.fetch(self.request(Method::POST, "/api/user/login").json(credentials))
            .await
    }

    async fn register(&self, registration: &Registration) -> Result<AuthResponse> {
        self.fetch(
            self.request(Method::POST, "/api/user/registration")
                .json(registration),
        )
        .await
    }

    async fn admin_login(&self, credentials: &Credentials) -> Result<AuthResponse> {
        self.fetch(
            self.request(Method::POST, "/api/user/adminLogin")
                .json(credentials),
        )
        .await
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        self.fetch(self.request(Method::GET, "/api/categories")).await
    }

    async fn create_category(&self, form: &CategoryForm) -> Result<Category> {
        let multipart = category_form(form)?;
        self.fetch(
            self.request(Method::POST, "/api/categories/create")
                .multipart(multipart),
        )
        .await
    }

    async fn update_category(&self, id: i64, form: &CategoryForm) -> Result<Category> {
        let multipart = category_form(form)?;
        self.fetch(
            self.request(Method::PUT, &format!("/api/categories/{}", id))
                .multipart(multipart),
        )
        .await
    }

    async fn delete_category(&self, id: i64) -> Result<()> {
        self.execute(self.request(Method::DELETE, &format!("/api/categories/{}", id)))
            .await
    }

    async fn lock_category(&self, id: i64) -> Result<()> {
        self.execute(self.request(Method::PATCH, &format!("/api/categories/{}/lock", id)))
            .await
    }

    async fn unlock_category(&self, id: i64) -> Result<()> {
        self.execute(self.request(Method::PATCH, &format!("/api/categories/{}/unlock", id)))
            .await
    }

    async fn list_rent_times(&self) -> Result<Vec<RentTime>> {
        self.fetch(self.request(Method::GET, "/api/rentals/renttime"))
            .await
    }

    async fn create_rent_time(&self, name: &str) -> Result<RentTime> {
        self.fetch(
            self.request(Method::POST, "/api/rentals/renttime")
                .json(&json!({ "name": name })),
        )
        .await
    }

    async fn update_rent_time(&self, id: i64, name: &str) -> Result<RentTime> {
        self.fetch(
            self.request(Method::PUT, &format!("/api/rentals/renttime/{}", id))
                .json(&json!({ "name": name })),
        )
        .await
    }

    async fn delete_rent_time(&self, id: i64) -> Result<()> {
        self.execute(self.request(Method::DELETE, &format!("/api/rentals/renttime/{}", id)))
            .await
    }

    async fn list_listings(&self, query: &ListingQuery) -> Result<Vec<Listing>> {
        let url = listing_url(&self.config.base_url, query)?;
        self.fetch(self.authorized(self.client.get(url))).await
    }

    async fn create_listing(&self, form: &ListingForm) -> Result<Listing> {
        let multipart = listing_form(form)?;
        self.fetch(self.request(Method::POST, "/api/rentals").multipart(multipart))
            .await
    }

    async fn update_listing(&self, id: i64, form: &ListingForm) -> Result<Listing> {
        let multipart = listing_form(form)?;
        self.fetch(
            self.request(Method::PUT, &format!("/api/rentals/{}", id))
                .multipart(multipart),
        )
        .await
    }

    async fn set_featured(&self, id: i64, featured: bool) -> Result<()> {
        self.execute(
            self.request(Method::PUT, &format!("/api/rentals/{}", id))
                .json(&json!({ "featured": featured })),
        )
        .await
    }

    async fn delete_listing(&self, id: i64) -> Result<()> {
        self.execute(self.request(Method::DELETE, &format!("/api/rentals/{}", id)))
            .await
    }

    async fn upload_document(&self, doc_type: &str, file: &UploadFile) -> Result<LegalDocument> {
        let multipart = Form::new().part("file", file_part(file)?);
        self.fetch(
            self.request(Method::POST, "/api/docs")
                .query(&[("docType", doc_type)])
                .multipart(multipart),
        )
        .await
    }

    async fn fetch_document(&self, doc_type: &str) -> Result<LegalDocument> {
        self.fetch(
            self.request(Method::GET, "/api/docs")
                .query(&[("docType", doc_type)]),
        )
        .await
    }

    async fn create_member_request(&self, request: &NewMemberRequest) -> Result<MemberRequest> {
        self.fetch(
            self.request(Method::POST, "/api/member-requests")
                .json(request),
        )
        .await
    }

    async fn list_member_requests(&self) -> Result<Vec<MemberRequest>> {
        self.fetch(self.request(Method::GET, "/api/member-requests"))
            .await
    }

    async fn update_member_request(&self, id: i64, status: RequestStatus) -> Result<MemberRequest> {
        self.fetch(
            self.request(Method::PUT, &format!("/api/member-requests/{}", id))
                .json(&json!({ "status": status })),
        )
        .await
    }

    async fn count_users(&self, status: Option<MemberStatus>) -> Result<u64> {
        let path = match status {
            Some(status) => format!("/api/user-work/count/{}", status.as_str()),
            None => "/api/user-work/count".to_string(),
        };
        let response: CountResponse = self.fetch(self.request(Method::GET, &path)).await?;
        Ok(response.count)
    }

    async fn list_users(&self, query: &UserPageQuery) -> Result<UserPage> {
        let mut params = vec![
            ("page", query.page.to_string()),
            ("limit", query.limit.to_string()),
        ];
        if let Some(status) = query.status {
            params.push(("status", status.as_str().to_string()));
        }
        self.fetch(self.request(Method::GET, "/api/user-work").query(&params))
            .await
    }

    async fn change_user_status(&self, id: i64, action: UserAction) -> Result<()> {
        self.execute(self.request(
            Method::PATCH,
            &format!("/api/user-work/{}/{}", id, action.as_str()),
        ))
        .await
    }
}
