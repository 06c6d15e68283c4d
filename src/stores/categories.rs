use crate::api::{CategoryForm, PortalApi};
use crate::error::{PortalError, Result};
use crate::models::Category;
use crate::stores::{report_load_failure, UnauthorizedSignal};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryState {
    pub categories: Vec<Category>,
    pub loading: bool,
    pub loaded: bool,
}

impl CategoryState {
    pub fn get(&self, id: i64) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }
}

/// Category and custom-field schema store
pub struct CategoryStore {
    api: Arc<dyn PortalApi>,
    unauthorized: UnauthorizedSignal,
    state: watch::Sender<CategoryState>,
}

impl CategoryStore {
    pub fn new(api: Arc<dyn PortalApi>, unauthorized: UnauthorizedSignal) -> Self {
        let (state, _) = watch::channel(CategoryState::default());
        Self {
            api,
            unauthorized,
            state,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<CategoryState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> CategoryState {
        self.state.borrow().clone()
    }

    /// Replace the full category set from the server.
    pub async fn load(&self) {
        self.state.send_modify(|s| s.loading = true);
        match self.api.list_categories().await {
            Ok(categories) => {
                debug!("Loaded {} categories", categories.len());
                self.state.send_modify(|s| {
                    s.categories = categories;
                    s.loading = false;
                    s.loaded = true;
                });
            }
            Err(e) => {
                report_load_failure("Loading categories", &e, &self.unauthorized);
                self.state.send_modify(|s| s.loading = false);
            }
        }
    }

    pub async fn create(&self, form: &CategoryForm) -> Result<Category> {
        let created = self.api.create_category(form).await?;
        info!("Created category {} ({})", created.id, created.name);
        self.load().await;
        Ok(created)
    }

    /// Structural edit; refused locally when the cached category is locked.
    pub async fn update(&self, id: i64, form: &CategoryForm) -> Result<Category> {
        if self.is_locked(id) {
            return Err(PortalError::CategoryLocked(id));
        }
        let updated = self.api.update_category(id, form).await?;
        info!("Updated category {}", id);
        self.load().await;
        Ok(updated)
    }

    pub async fn remove(&self, id: i64) -> Result<()> {
        self.api.delete_category(id).await?;
        info!("Deleted category {}", id);
        self.load().await;
        Ok(())
    }

    pub async fn lock(&self, id: i64) -> Result<()> {
        self.api.lock_category(id).await?;
        self.load().await;
        Ok(())
    }

    pub async fn unlock(&self, id: i64) -> Result<()> {
        self.api.unlock_category(id).await?;
        self.load().await;
        Ok(())
    }

    fn is_locked(&self, id: i64) -> bool {
        self.state
            .borrow()
            .get(id)
            .map(|c| c.is_locked)
            .unwrap_or(false)
    }
}
