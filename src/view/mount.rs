use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared "still mounted" flag for a view.
/// Async work checks it before applying results to view state.
#[derive(Debug, Clone)]
pub struct MountHandle(Arc<AtomicBool>);

impl MountHandle {
    pub fn mounted() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn is_mounted(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn unmount(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl Default for MountHandle {
    fn default() -> Self {
        Self::mounted()
    }
}
