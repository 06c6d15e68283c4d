use crate::api::{PortalApi, UserAction, UserPageQuery};
use crate::error::Result;
use crate::models::{MemberStatus, UserCounts, UserPage};
use crate::stores::{report_load_failure, UnauthorizedSignal};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserAdminState {
    pub counts: UserCounts,
    pub query: UserPageQuery,
    pub page: UserPage,
    pub loading: bool,
}

impl UserAdminState {
    pub fn total_pages(&self) -> u64 {
        let limit = u64::from(self.query.limit.max(1));
        self.page.count.div_ceil(limit)
    }
}

/// Account administration: counts, paging, approve/block/unblock.
pub struct UserAdminStore {
    api: Arc<dyn PortalApi>,
    unauthorized: UnauthorizedSignal,
    state: watch::Sender<UserAdminState>,
}

impl UserAdminStore {
    pub fn new(api: Arc<dyn PortalApi>, unauthorized: UnauthorizedSignal) -> Self {
        let (state, _) = watch::channel(UserAdminState::default());
        Self {
            api,
            unauthorized,
            state,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<UserAdminState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> UserAdminState {
        self.state.borrow().clone()
    }

    pub async fn load_counts(&self) {
        let fetched = async {
            Ok::<_, crate::error::PortalError>(UserCounts {
                total: self.api.count_users(None).await?,
                pending: self.api.count_users(Some(MemberStatus::Pending)).await?,
                approved: self.api.count_users(Some(MemberStatus::Approved)).await?,
                blocked: self.api.count_users(Some(MemberStatus::Blocked)).await?,
            })
        }
        .await;

        match fetched {
            Ok(counts) => self.state.send_modify(|s| s.counts = counts),
            Err(e) => report_load_failure("Loading user counts", &e, &self.unauthorized),
        }
    }

    pub async fn load_page(&self, query: UserPageQuery) {
        self.state.send_modify(|s| s.loading = true);
        match self.api.list_users(&query).await {
            Ok(page) => self.state.send_modify(|s| {
                s.query = query;
                s.page = page;
                s.loading = false;
            }),
            Err(e) => {
                report_load_failure("Loading users", &e, &self.unauthorized);
                self.state.send_modify(|s| s.loading = false);
            }
        }
    }

    pub async fn approve(&self, id: i64) -> Result<()> {
        self.apply(id, UserAction::Approve).await
    }

    pub async fn block(&self, id: i64) -> Result<()> {
        self.apply(id, UserAction::Block).await
    }

    pub async fn unblock(&self, id: i64) -> Result<()> {
        self.apply(id, UserAction::Unblock).await
    }

    async fn apply(&self, id: i64, action: UserAction) -> Result<()> {
        self.api.change_user_status(id, action).await?;
        info!("User {}: {}", id, action.as_str());
        let query = self.state.borrow().query;
        self.load_page(query).await;
        self.load_counts().await;
        Ok(())
    }
}
