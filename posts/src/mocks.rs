//! In-memory [`BlogService`] for tests and offline demos

use crate::error::ApiError;
use crate::service::BlogService;
use crate::types::{NewPost, PostId, RemotePost, UserId};
use crate::users::User;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Mock blog service
///
/// Serves a fixed post and user list. Created posts are echoed back with
/// server ids starting at 101 and recorded for inspection. Calling
/// [`fail_with`](Self::fail_with) makes every request fail with a transport
/// error carrying the given message.
#[derive(Debug, Clone)]
pub struct MockBlogService {
    posts: Arc<Mutex<Vec<RemotePost>>>,
    users: Arc<Mutex<Vec<User>>>,
    created: Arc<Mutex<Vec<NewPost>>>,
    failure: Arc<Mutex<Option<String>>>,
    next_id: Arc<AtomicU64>,
    latency: Option<Duration>,
}

impl MockBlogService {
    /// Create an empty mock service
    #[must_use]
    pub fn new() -> Self {
        Self {
            posts: Arc::new(Mutex::new(Vec::new())),
            users: Arc::new(Mutex::new(Vec::new())),
            created: Arc::new(Mutex::new(Vec::new())),
            failure: Arc::new(Mutex::new(None)),
            next_id: Arc::new(AtomicU64::new(101)),
            latency: None,
        }
    }

    /// Create a mock serving `count` posts with ids `1..=count`
    #[must_use]
    pub fn with_posts(count: usize) -> Self {
        Self::with_remote_posts(
            (1..=count)
                .map(|i| RemotePost {
                    id: PostId::new(i.to_string()),
                    title: format!("Post {i}"),
                    body: format!("Body of post {i}"),
                    user_id: UserId::new(((i - 1) % 10 + 1).to_string()),
                })
                .collect(),
        )
    }

    /// Create a mock serving exactly these posts
    #[must_use]
    pub fn with_remote_posts(posts: Vec<RemotePost>) -> Self {
        Self {
            posts: Arc::new(Mutex::new(posts)),
            ..Self::new()
        }
    }

    /// Serve this user list
    #[must_use]
    pub fn with_users(self, users: Vec<User>) -> Self {
        Self {
            users: Arc::new(Mutex::new(users)),
            ..self
        }
    }

    /// Delay every response
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Make every subsequent request fail with `message`
    pub fn fail_with(&self, message: impl Into<String>) {
        if let Ok(mut failure) = self.failure.lock() {
            *failure = Some(message.into());
        }
    }

    /// Make subsequent requests succeed again
    pub fn recover(&self) {
        if let Ok(mut failure) = self.failure.lock() {
            *failure = None;
        }
    }

    /// Payloads received by the create endpoint
    ///
    /// # Errors
    ///
    /// Returns error if the internal lock is poisoned.
    pub fn created_posts(&self) -> Result<Vec<NewPost>, ApiError> {
        Ok(self.created.lock().map_err(|_| poisoned())?.clone())
    }

    async fn respond<T, F>(
        latency: Option<Duration>,
        failure: Arc<Mutex<Option<String>>>,
        body: F,
    ) -> Result<T, ApiError>
    where
        F: FnOnce() -> Result<T, ApiError>,
    {
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let failure = failure.lock().map_err(|_| poisoned())?.clone();
        match failure {
            Some(message) => Err(ApiError::RequestFailed(message)),
            None => body(),
        }
    }
}

impl Default for MockBlogService {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned() -> ApiError {
    ApiError::RequestFailed("mock state lock poisoned".to_string())
}

impl BlogService for MockBlogService {
    fn fetch_posts(&self) -> impl Future<Output = Result<Vec<RemotePost>, ApiError>> + Send {
        let posts = Arc::clone(&self.posts);
        let failure = Arc::clone(&self.failure);
        let latency = self.latency;

        async move {
            Self::respond(latency, failure, || {
                Ok(posts.lock().map_err(|_| poisoned())?.clone())
            })
            .await
        }
    }

    fn create_post(
        &self,
        post: &NewPost,
    ) -> impl Future<Output = Result<RemotePost, ApiError>> + Send {
        let created = Arc::clone(&self.created);
        let failure = Arc::clone(&self.failure);
        let next_id = Arc::clone(&self.next_id);
        let latency = self.latency;
        let post = post.clone();

        async move {
            Self::respond(latency, failure, || {
                created.lock().map_err(|_| poisoned())?.push(post.clone());
                let id = next_id.fetch_add(1, Ordering::SeqCst);
                Ok(RemotePost {
                    id: PostId::new(id.to_string()),
                    title: post.title,
                    body: post.body,
                    user_id: post.user_id,
                })
            })
            .await
        }
    }

    fn fetch_users(&self) -> impl Future<Output = Result<Vec<User>, ApiError>> + Send {
        let users = Arc::clone(&self.users);
        let failure = Arc::clone(&self.failure);
        let latency = self.latency;

        async move {
            Self::respond(latency, failure, || {
                Ok(users.lock().map_err(|_| poisoned())?.clone())
            })
            .await
        }
    }
}
