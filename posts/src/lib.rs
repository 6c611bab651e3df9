//! # Postboard
//!
//! A blog posts store built on the Postboard reducer architecture.
//!
//! Posts can be added locally, reacted to, fetched in bulk from a remote JSON
//! API, and created through that API. A small users slice sits next to the
//! posts slice in the root [`AppState`].
//!
//! ## Example
//!
//! ```ignore
//! use postboard::{BlogEnvironment, HttpBlogService, PostsAction, blog_store};
//!
//! let env = BlogEnvironment::live(HttpBlogService::new("https://jsonplaceholder.typicode.com"));
//! let store = blog_store(env);
//!
//! let mut handle = store.send(PostsAction::FetchPosts.into()).await?;
//! handle.wait().await;
//!
//! let count = store.state(|s| postboard::selectors::select_all_posts(s).len()).await;
//! ```

pub mod app;
pub mod config;
pub mod environment;
pub mod error;
pub mod mocks;
pub mod reducer;
pub mod selectors;
pub mod service;
pub mod thunks;
pub mod types;
pub mod users;

pub use app::{AppAction, AppReducer, AppState, BlogStore, blog_store};
pub use config::Config;
pub use environment::BlogEnvironment;
pub use error::{ApiError, ConfigError};
pub use reducer::PostsReducer;
pub use service::{BlogService, HttpBlogService};
pub use types::{
    FetchStatus, NewPost, Phase, Post, PostId, PostsAction, PostsState, ReactionKind, Reactions,
    RemotePost, UserId,
};
pub use users::{User, UsersAction, UsersReducer, UsersState};
