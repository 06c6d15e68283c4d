use crate::api::PortalApi;
use crate::error::{PortalError, Result};
use crate::models::RentTime;
use crate::stores::{report_load_failure, UnauthorizedSignal};
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RentTimeState {
    pub rent_times: Vec<RentTime>,
    pub loading: bool,
}

pub struct RentTimeStore {
    api: Arc<dyn PortalApi>,
    unauthorized: UnauthorizedSignal,
    state: watch::Sender<RentTimeState>,
}

impl RentTimeStore {
    pub fn new(api: Arc<dyn PortalApi>, unauthorized: UnauthorizedSignal) -> Self {
        let (state, _) = watch::channel(RentTimeState::default());
        Self {
            api,
            unauthorized,
            state,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<RentTimeState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> RentTimeState {
        self.state.borrow().clone()
    }

    pub async fn load(&self) {
        self.state.send_modify(|s| s.loading = true);
        match self.api.list_rent_times().await {
            Ok(rent_times) => self.state.send_modify(|s| {
                s.rent_times = rent_times;
                s.loading = false;
            }),
            Err(e) => {
                report_load_failure("Loading rent times", &e, &self.unauthorized);
                self.state.send_modify(|s| s.loading = false);
            }
        }
    }

    pub async fn create(&self, name: &str) -> Result<RentTime> {
        let created = self.api.create_rent_time(required_name(name)?).await?;
        self.load().await;
        Ok(created)
    }

    pub async fn update(&self, id: i64, name: &str) -> Result<RentTime> {
        let updated = self.api.update_rent_time(id, required_name(name)?).await?;
        self.load().await;
        Ok(updated)
    }

    pub async fn remove(&self, id: i64) -> Result<()> {
        self.api.delete_rent_time(id).await?;
        self.load().await;
        Ok(())
    }
}

fn required_name(name: &str) -> Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(PortalError::Validation("Rent time name is required".to_string()));
    }
    Ok(name)
}
