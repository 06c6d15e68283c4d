use crate::api::PortalApi;
use crate::error::{PortalError, Result};
use crate::models::{MemberRequest, NewMemberRequest, RequestStatus};
use crate::stores::{report_load_failure, UnauthorizedSignal};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemberRequestState {
    pub requests: Vec<MemberRequest>,
    pub loading: bool,
}

impl MemberRequestState {
    pub fn open_count(&self) -> usize {
        self.requests
            .iter()
            .filter(|r| r.status != RequestStatus::Done)
            .count()
    }
}

/// Membership and booking requests
pub struct MemberRequestStore {
    api: Arc<dyn PortalApi>,
    unauthorized: UnauthorizedSignal,
    state: watch::Sender<MemberRequestState>,
}

impl MemberRequestStore {
    pub fn new(api: Arc<dyn PortalApi>, unauthorized: UnauthorizedSignal) -> Self {
        let (state, _) = watch::channel(MemberRequestState::default());
        Self {
            api,
            unauthorized,
            state,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<MemberRequestState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> MemberRequestState {
        self.state.borrow().clone()
    }

    /// Send a request from the public site. Does not touch the admin list.
    pub async fn submit(&self, request: &NewMemberRequest) -> Result<MemberRequest> {
        if request.full_name.trim().is_empty() || request.email.trim().is_empty() {
            return Err(PortalError::Validation(
                "Name and email are required".to_string(),
            ));
        }
        let created = self.api.create_member_request(request).await?;
        info!("Submitted member request {}", created.id);
        Ok(created)
    }

    pub async fn load(&self) {
        self.state.send_modify(|s| s.loading = true);
        match self.api.list_member_requests().await {
            Ok(requests) => self.state.send_modify(|s| {
                s.requests = requests;
                s.loading = false;
            }),
            Err(e) => {
                report_load_failure("Loading member requests", &e, &self.unauthorized);
                self.state.send_modify(|s| s.loading = false);
            }
        }
    }

    pub async fn update_status(&self, id: i64, status: RequestStatus) -> Result<MemberRequest> {
        let updated = self.api.update_member_request(id, status).await?;
        self.load().await;
        Ok(updated)
    }
}
