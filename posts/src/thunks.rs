//! One async function per remote operation
//!
//! Each settles the service call into a [`Phase`] that the matching
//! reducer arm pattern-matches. Reducers wrap these in `Effect::Future`.

use crate::service::BlogService;
use crate::types::{NewPost, Phase, RemotePost};
use crate::users::User;

/// Fetch all posts and settle the outcome
pub async fn fetch_posts<S: BlogService + ?Sized>(service: &S) -> Phase<Vec<RemotePost>> {
    let result = service.fetch_posts().await;
    if let Err(error) = &result {
        tracing::warn!(%error, "fetch posts failed");
    }
    Phase::settle(result)
}

/// Create a post remotely and settle the outcome
pub async fn add_new_post<S: BlogService + ?Sized>(
    service: &S,
    post: &NewPost,
) -> Phase<RemotePost> {
    Phase::settle(service.create_post(post).await)
}

/// Fetch all users and settle the outcome
pub async fn fetch_users<S: BlogService + ?Sized>(service: &S) -> Phase<Vec<User>> {
    Phase::settle(service.fetch_users().await)
}
