//! # Postboard Runtime
//!
//! The [`Store`] that drives reducers built on `postboard-core`.
//!
//! A store owns the state, runs the reducer for every action under a write
//! lock, and executes the returned effects on tokio tasks. Actions produced by
//! effects are broadcast to observers and then reduced like any other action.
//!
//! ## Example
//!
//! ```ignore
//! use postboard_runtime::Store;
//!
//! let store = Store::new(AppState::default(), AppReducer::new(), environment);
//!
//! let mut handle = store.send(AppAction::Posts(PostsAction::FetchPosts)).await?;
//! handle.wait().await;
//!
//! let status = store.state(select_posts_status).await;
//! ```

use std::time::Duration;

mod handle;
pub mod store;

pub use handle::EffectHandle;
pub use store::Store;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors returned by [`Store`](crate::Store) operations
    #[derive(Error, Debug)]
    pub enum StoreError {
        /// `send` was called after shutdown started
        #[error("Store is shutting down")]
        ShutdownInProgress,

        /// Effects were still running when the shutdown timeout elapsed
        #[error("Shutdown timed out with {0} effects still running")]
        ShutdownTimeout(usize),

        /// A wait elapsed before the awaited effects or action arrived
        #[error("Timed out waiting for effects or actions")]
        Timeout,

        /// The action broadcast channel has no senders left
        #[error("Action broadcast channel closed")]
        ChannelClosed,
    }
}

pub use error::StoreError;

/// Tunables for a [`Store`]
///
/// # Example
///
/// ```
/// use postboard_runtime::StoreConfig;
/// use std::time::Duration;
///
/// let config = StoreConfig::default()
///     .with_broadcast_capacity(64)
///     .with_shutdown_timeout(Duration::from_secs(10));
/// assert_eq!(config.broadcast_capacity, 64);
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Effect-produced actions buffered per observer before it lags
    pub broadcast_capacity: usize,
    /// Timeout used by [`Store::shutdown_gracefully`]
    pub default_shutdown_timeout: Duration,
}

impl StoreConfig {
    /// Set the action broadcast capacity (at least 1 is used)
    #[must_use]
    pub const fn with_broadcast_capacity(mut self, capacity: usize) -> Self {
        self.broadcast_capacity = capacity;
        self
    }

    /// Set the timeout used by [`Store::shutdown_gracefully`]
    #[must_use]
    pub const fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.default_shutdown_timeout = timeout;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            broadcast_capacity: 16,
            default_shutdown_timeout: Duration::from_secs(30),
        }
    }
}
