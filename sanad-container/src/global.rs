//! Process-wide default container.
//!
//! [`container`] lazily creates a default [`Container`] on first use;
//! [`set_container`] replaces it. Handles already returned by
//! [`container`] keep pointing at the container they were taken from.

use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use tracing::debug;

use crate::container::Container;

static GLOBAL: Lazy<RwLock<Arc<Container>>> = Lazy::new(|| {
    debug!("Creating global container");
    RwLock::new(Arc::new(Container::new()))
});

/// Returns the process-wide container.
pub fn container() -> Arc<Container> {
    GLOBAL.read().clone()
}

/// Replaces the process-wide container.
pub fn set_container(container: Arc<Container>) {
    debug!(container = ?container, "Replacing global container");
    *GLOBAL.write() = container;
}
