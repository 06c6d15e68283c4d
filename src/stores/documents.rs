use crate::api::{PortalApi, UploadFile};
use crate::error::Result;
use crate::models::LegalDocument;
use crate::stores::{report_load_failure, UnauthorizedSignal};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentState {
    /// Last fetch result per document type; `None` after a failed fetch
    pub documents: HashMap<String, Option<LegalDocument>>,
}

impl DocumentState {
    pub fn get(&self, doc_type: &str) -> Option<&LegalDocument> {
        self.documents.get(doc_type).and_then(Option::as_ref)
    }
}

/// Legal documents
pub struct DocumentStore {
    api: Arc<dyn PortalApi>,
    unauthorized: UnauthorizedSignal,
    state: watch::Sender<DocumentState>,
}

impl DocumentStore {
    pub fn new(api: Arc<dyn PortalApi>, unauthorized: UnauthorizedSignal) -> Self {
        let (state, _) = watch::channel(DocumentState::default());
        Self {
            api,
            unauthorized,
            state,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<DocumentState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> DocumentState {
        self.state.borrow().clone()
    }

    /// Fetch a document in the background. A failure clears the cached reference.
    pub async fn prefetch(&self, doc_type: &str) {
        let fetched = match self.api.fetch_document(doc_type).await {
            Ok(document) => Some(document),
            Err(e) => {
                report_load_failure("Fetching document", &e, &self.unauthorized);
                None
            }
        };
        self.state.send_modify(|s| {
            s.documents.insert(doc_type.to_string(), fetched);
        });
    }

    pub async fn upload(&self, doc_type: &str, file: &UploadFile) -> Result<LegalDocument> {
        let uploaded = self.api.upload_document(doc_type, file).await?;
        self.prefetch(doc_type).await;
        Ok(uploaded)
    }
}
