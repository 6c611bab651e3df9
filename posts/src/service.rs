//! Remote blog service
//!
//! [`BlogService`] abstracts the JSON API the posts and users slices talk to.
//! [`HttpBlogService`] is the `reqwest` implementation used in production;
//! tests use [`MockBlogService`](crate::mocks::MockBlogService).

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::types::{NewPost, RemotePost};
use crate::users::User;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::future::Future;

/// Remote API holding posts and users
pub trait BlogService: Send + Sync {
    /// Fetch every post
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Network request fails
    /// - Server answers with a non-2xx status
    /// - Body is not a JSON array of posts
    fn fetch_posts(&self) -> impl Future<Output = Result<Vec<RemotePost>, ApiError>> + Send;

    /// Create a post and return the server's record
    ///
    /// # Errors
    ///
    /// Same failure modes as [`BlogService::fetch_posts`].
    fn create_post(
        &self,
        post: &NewPost,
    ) -> impl Future<Output = Result<RemotePost, ApiError>> + Send;

    /// Fetch every user
    ///
    /// # Errors
    ///
    /// Same failure modes as [`BlogService::fetch_posts`].
    fn fetch_users(&self) -> impl Future<Output = Result<Vec<User>, ApiError>> + Send;
}

/// `reqwest`-backed [`BlogService`]
#[derive(Debug, Clone)]
pub struct HttpBlogService {
    client: Client,
    base_url: String,
}

impl HttpBlogService {
    /// Create a service against `base_url` with a default client
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: trim_base(base_url.into()),
        }
    }

    /// Create a service from configuration
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::ClientBuild`] if the HTTP client cannot be built.
    pub fn from_config(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ApiError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            base_url: trim_base(config.base_url.clone()),
        })
    }

    /// Base URL without a trailing slash
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn posts_url(&self) -> String {
        format!("{}/posts", self.base_url)
    }

    fn users_url(&self) -> String {
        format!("{}/users", self.base_url)
    }
}

fn trim_base(mut url: String) -> String {
    while url.ends_with('/') {
        url.pop();
    }
    url
}

/// Maps a response to its JSON body or an [`ApiError`]
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(ApiError::UnexpectedStatus {
            status: status.as_u16(),
            message,
        });
    }

    response
        .json::<T>()
        .await
        .map_err(|e| ApiError::ResponseParseFailed(e.to_string()))
}

impl BlogService for HttpBlogService {
    fn fetch_posts(&self) -> impl Future<Output = Result<Vec<RemotePost>, ApiError>> + Send {
        let request = self.client.get(self.posts_url());

        async move {
            tracing::debug!("GET /posts");
            let response = request
                .send()
                .await
                .map_err(|e| ApiError::RequestFailed(e.to_string()))?;
            decode(response).await
        }
    }

    fn create_post(
        &self,
        post: &NewPost,
    ) -> impl Future<Output = Result<RemotePost, ApiError>> + Send {
        let request = self.client.post(self.posts_url()).json(post);

        async move {
            tracing::debug!("POST /posts");
            let response = request
                .send()
                .await
                .map_err(|e| ApiError::RequestFailed(e.to_string()))?;
            decode(response).await
        }
    }

    fn fetch_users(&self) -> impl Future<Output = Result<Vec<User>, ApiError>> + Send {
        let request = self.client.get(self.users_url());

        async move {
            tracing::debug!("GET /users");
            let response = request
                .send()
                .await
                .map_err(|e| ApiError::RequestFailed(e.to_string()))?;
            decode(response).await
        }
    }
}
