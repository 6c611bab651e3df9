//! Injected dependencies for the posts and users reducers

use crate::service::BlogService;
use postboard_core::environment::{Clock, IdGenerator, SystemClock, UuidGenerator};
use std::sync::Arc;

/// Environment shared by every slice of the blog store
pub struct BlogEnvironment<S> {
    /// Remote API
    pub service: Arc<S>,
    /// Source of "now"
    pub clock: Arc<dyn Clock>,
    /// Ids for locally created posts
    pub ids: Arc<dyn IdGenerator>,
}

impl<S: BlogService> BlogEnvironment<S> {
    /// Create an environment from explicit dependencies
    #[must_use]
    pub fn new(service: Arc<S>, clock: Arc<dyn Clock>, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            service,
            clock,
            ids,
        }
    }

    /// Production environment: wall clock and UUID ids
    #[must_use]
    pub fn live(service: S) -> Self {
        Self::new(Arc::new(service), Arc::new(SystemClock), Arc::new(UuidGenerator))
    }
}

impl<S> Clone for BlogEnvironment<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            clock: Arc::clone(&self.clock),
            ids: Arc::clone(&self.ids),
        }
    }
}
