//! Client-side state containers mirroring server resources.
//!
//! Each store publishes its state through a `tokio::sync::watch` channel so
//! every mounted consumer sees mutations without threading values around.
//! Background loads log failures and keep prior state; user-initiated
//! mutations return errors and are always followed by a full reload.

mod categories;
mod documents;
mod listings;
mod member_requests;
mod rent_times;
mod session;
mod users;

pub use categories::{CategoryState, CategoryStore};
pub use documents::{DocumentState, DocumentStore};
pub use listings::{ListingState, ListingStore};
pub use member_requests::{MemberRequestState, MemberRequestStore};
pub use rent_times::{RentTimeState, RentTimeStore};
pub use session::{CheckState, SessionState, SessionStore};
pub use users::{UserAdminState, UserAdminStore};

use crate::api::{FileTokenStore, HttpPortalApi, MemoryTokenStore, PortalApi, TokenStore};
use crate::config::{PortalConfig, SessionPolicy};
use crate::error::{PortalError, Result};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::warn;

/// Counter raised whenever a background request comes back 401.
/// The session store subscribes to it to re-check under `RecheckOnUnauthorized`.
#[derive(Debug, Clone)]
pub struct UnauthorizedSignal(Arc<watch::Sender<u64>>);

impl Default for UnauthorizedSignal {
    fn default() -> Self {
        let (sender, _) = watch::channel(0);
        Self(Arc::new(sender))
    }
}

impl UnauthorizedSignal {
    pub fn raise(&self) {
        self.0.send_modify(|count| *count += 1);
    }

    pub fn count(&self) -> u64 {
        *self.0.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.0.subscribe()
    }
}

/// Log a failed background load and note unauthorized answers.
pub(crate) fn report_load_failure(operation: &str, err: &PortalError, signal: &UnauthorizedSignal) {
    warn!("{} failed: {}", operation, err);
    if err.is_unauthorized() {
        signal.raise();
    }
}

/// All stores of one application instance, sharing one API boundary.
#[derive(Clone)]
pub struct Stores {
    pub session: Arc<SessionStore>,
    pub categories: Arc<CategoryStore>,
    pub listings: Arc<ListingStore>,
    pub rent_times: Arc<RentTimeStore>,
    pub member_requests: Arc<MemberRequestStore>,
    pub users: Arc<UserAdminStore>,
    pub documents: Arc<DocumentStore>,
}

impl Stores {
    /// Under `RecheckOnUnauthorized` this spawns the re-check listener, so it
    /// should be called from within a tokio runtime.
    pub fn new(api: Arc<dyn PortalApi>, tokens: Arc<dyn TokenStore>, policy: SessionPolicy) -> Self {
        let signal = UnauthorizedSignal::default();
        let session = Arc::new(SessionStore::new(api.clone(), tokens, policy, signal.clone()));
        session.listen_for_unauthorized();
        Self {
            session,
            categories: Arc::new(CategoryStore::new(api.clone(), signal.clone())),
            listings: Arc::new(ListingStore::new(api.clone(), signal.clone())),
            rent_times: Arc::new(RentTimeStore::new(api.clone(), signal.clone())),
            member_requests: Arc::new(MemberRequestStore::new(api.clone(), signal.clone())),
            users: Arc::new(UserAdminStore::new(api.clone(), signal.clone())),
            documents: Arc::new(DocumentStore::new(api, signal)),
        }
    }

    /// Wire the HTTP client and token storage described by `config`.
    pub fn from_config(config: &PortalConfig) -> Result<Self> {
        let tokens: Arc<dyn TokenStore> = match &config.token_dir {
            Some(dir) => Arc::new(FileTokenStore::open(dir)?),
            None => Arc::new(MemoryTokenStore::new()),
        };
        let api = Arc::new(HttpPortalApi::new(config.clone(), tokens.clone())?);
        Ok(Self::new(api, tokens, config.session_policy))
    }

    /// Run both session checks; they are independent and may finish in any order.
    pub async fn check_sessions(&self) {
        tokio::join!(
            self.session.check_session(),
            self.session.check_admin_session()
        );
    }
}
