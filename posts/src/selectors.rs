//! Read-only views over [`AppState`]
//!
//! Use them through [`Store::state`](postboard_runtime::Store::state):
//!
//! ```ignore
//! let posts = store.state(|s| select_all_posts(s).to_vec()).await;
//! ```

use crate::app::AppState;
use crate::types::{FetchStatus, Post, PostId, UserId};
use crate::users::User;

/// Every post in insertion order
#[must_use]
pub fn select_all_posts(state: &AppState) -> &[Post] {
    &state.posts.posts
}

/// Current fetch-all status
#[must_use]
pub const fn select_posts_status(state: &AppState) -> FetchStatus {
    state.posts.status
}

/// Message of the last failed fetch
#[must_use]
pub fn select_posts_error(state: &AppState) -> Option<&str> {
    state.posts.error.as_deref()
}

/// The first post with the given id
#[must_use]
pub fn select_post_by_id<'a>(state: &'a AppState, id: &PostId) -> Option<&'a Post> {
    state.posts.find(id)
}

/// Posts written by one user, in insertion order
#[must_use]
pub fn select_posts_by_user<'a>(state: &'a AppState, user_id: &UserId) -> Vec<&'a Post> {
    state
        .posts
        .posts
        .iter()
        .filter(|post| &post.user_id == user_id)
        .collect()
}

/// Posts sorted by date, newest first
///
/// The sort is stable, so posts with equal dates keep insertion order.
#[must_use]
pub fn select_posts_newest_first(state: &AppState) -> Vec<&Post> {
    let mut posts: Vec<&Post> = state.posts.posts.iter().collect();
    posts.sort_by(|a, b| b.date.cmp(&a.date));
    posts
}

/// Every known user
#[must_use]
pub fn select_all_users(state: &AppState) -> &[User] {
    &state.users.users
}

/// The user with the given id
#[must_use]
pub fn select_user_by_id<'a>(state: &'a AppState, id: &UserId) -> Option<&'a User> {
    state.users.users.iter().find(|user| &user.id == id)
}
