//! Domain types for the posts feature.
//!
//! A post list is a plain ordered sequence: posts are appended by three paths
//! (local creation, bulk fetch, remote creation) and never removed. Reaction
//! counters are the only thing that changes on an existing post.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Accepts an identifier encoded either as a JSON string or a JSON number.
///
/// The remote service sends numeric ids; locally generated ids are strings.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Unsigned(u64),
        Signed(i64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Str(s) => s,
        Raw::Unsigned(n) => n.to_string(),
        Raw::Signed(n) => n.to_string(),
    })
}

/// Opaque post identifier
///
/// Ordering is plain string ordering, so `"10" < "2"`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(#[serde(deserialize_with = "string_or_number")] String);

impl PostId {
    /// Creates a `PostId` from any string-like value
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PostId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Opaque identifier of the authoring user
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(#[serde(deserialize_with = "string_or_number")] String);

impl UserId {
    /// Creates a `UserId` from any string-like value
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// The five reaction kinds a reader can add to a post
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReactionKind {
    /// 👍
    ThumbsUp,
    /// 😮
    Wow,
    /// ❤️
    Heart,
    /// 🚀
    Rocket,
    /// ☕
    Coffee,
}

impl ReactionKind {
    /// Every kind, in display order
    pub const ALL: [Self; 5] = [
        Self::ThumbsUp,
        Self::Wow,
        Self::Heart,
        Self::Rocket,
        Self::Coffee,
    ];

    /// Wire name (`thumbsUp`, `wow`, ...)
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ThumbsUp => "thumbsUp",
            Self::Wow => "wow",
            Self::Heart => "heart",
            Self::Rocket => "rocket",
            Self::Coffee => "coffee",
        }
    }

    /// Emoji shown on reaction buttons
    #[must_use]
    pub const fn emoji(self) -> &'static str {
        match self {
            Self::ThumbsUp => "👍",
            Self::Wow => "😮",
            Self::Heart => "❤️",
            Self::Rocket => "🚀",
            Self::Coffee => "☕",
        }
    }
}

impl fmt::Display for ReactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reaction name that is not one of the five known kinds
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown reaction kind: {0}")]
pub struct UnknownReaction(pub String);

impl FromStr for ReactionKind {
    type Err = UnknownReaction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownReaction(s.to_string()))
    }
}

/// Reaction counters of a post; all start at zero
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reactions {
    /// 👍 count
    pub thumbs_up: u32,
    /// 😮 count
    pub wow: u32,
    /// ❤️ count
    pub heart: u32,
    /// 🚀 count
    pub rocket: u32,
    /// ☕ count
    pub coffee: u32,
}

impl Reactions {
    /// Current count for one kind
    #[must_use]
    pub const fn get(&self, kind: ReactionKind) -> u32 {
        match kind {
            ReactionKind::ThumbsUp => self.thumbs_up,
            ReactionKind::Wow => self.wow,
            ReactionKind::Heart => self.heart,
            ReactionKind::Rocket => self.rocket,
            ReactionKind::Coffee => self.coffee,
        }
    }

    /// Adds exactly one to the counter for `kind`
    pub fn increment(&mut self, kind: ReactionKind) {
        let counter = match kind {
            ReactionKind::ThumbsUp => &mut self.thumbs_up,
            ReactionKind::Wow => &mut self.wow,
            ReactionKind::Heart => &mut self.heart,
            ReactionKind::Rocket => &mut self.rocket,
            ReactionKind::Coffee => &mut self.coffee,
        };
        *counter = counter.saturating_add(1);
    }

    /// Sum of all counters
    #[must_use]
    pub fn total(&self) -> u64 {
        ReactionKind::ALL
            .into_iter()
            .map(|kind| u64::from(self.get(kind)))
            .sum()
    }
}

/// A single blog post
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Unique identifier (at insertion time)
    pub id: PostId,
    /// Title
    pub title: String,
    /// Body text
    pub body: String,
    /// Author
    pub user_id: UserId,
    /// Creation time, serialized as ISO-8601
    pub date: DateTime<Utc>,
    /// Reaction counters
    pub reactions: Reactions,
}

impl Post {
    /// Creates a post with zeroed reactions
    #[must_use]
    pub fn new(
        id: PostId,
        title: impl Into<String>,
        body: impl Into<String>,
        user_id: UserId,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            body: body.into(),
            user_id,
            date,
            reactions: Reactions::default(),
        }
    }
}

/// Payload sent to the remote create endpoint
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    /// Title
    pub title: String,
    /// Body text
    pub body: String,
    /// Author
    pub user_id: UserId,
}

impl NewPost {
    /// Creates a new post payload
    #[must_use]
    pub fn new(title: impl Into<String>, body: impl Into<String>, user_id: UserId) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            user_id,
        }
    }
}

/// A post record as returned by the remote service
///
/// Any `date` or `reactions` the remote sends are ignored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemotePost {
    /// Server-assigned id
    #[serde(default)]
    pub id: PostId,
    /// Title
    #[serde(default)]
    pub title: String,
    /// Body text
    #[serde(default)]
    pub body: String,
    /// Author
    pub user_id: UserId,
}

impl RemotePost {
    /// Converts into a client post with the given date and zeroed reactions
    #[must_use]
    pub fn into_post(self, date: DateTime<Utc>) -> Post {
        Post::new(self.id, self.title, self.body, self.user_id, date)
    }
}

/// Lifecycle of the fetch-all operation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchStatus {
    /// Nothing requested yet
    #[default]
    Idle,
    /// A fetch is in flight
    Loading,
    /// The last resolved fetch succeeded
    Succeeded,
    /// The last resolved fetch failed
    Failed,
}

impl fmt::Display for FetchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        })
    }
}

/// Observable phase of an asynchronous operation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase<T> {
    /// The operation has been issued
    Pending,
    /// The operation succeeded with a result
    Fulfilled(T),
    /// The operation failed; carries the error's message
    Rejected(String),
}

impl<T> Phase<T> {
    /// Settles a remote call result into `Fulfilled` or `Rejected`
    pub fn settle<E: fmt::Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::Fulfilled(value),
            Err(error) => Self::Rejected(error.to_string()),
        }
    }

    /// Returns `true` for `Fulfilled` and `Rejected`
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// State of the posts feature
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostsState {
    /// All posts in insertion order
    pub posts: Vec<Post>,
    /// Fetch-all lifecycle
    pub status: FetchStatus,
    /// Message of the last failed fetch; only set while `status` is `Failed`
    pub error: Option<String>,
}

impl PostsState {
    /// Creates an empty, idle state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Finds a post by id
    #[must_use]
    pub fn find(&self, id: &PostId) -> Option<&Post> {
        self.posts.iter().find(|post| &post.id == id)
    }

    /// Finds a post by id for mutation
    pub fn find_mut(&mut self, id: &PostId) -> Option<&mut Post> {
        self.posts.iter_mut().find(|post| &post.id == id)
    }

    /// Id for a post created through the remote service
    ///
    /// Takes the greatest existing id under string ordering, reads it as an
    /// integer and adds one. With ids `["1", "2", "10"]` the greatest is
    /// `"2"`, so the result is `"3"`. An empty list yields `"1"`.
    ///
    /// Returns `None` if the greatest id is not an integer.
    ///
    /// Deliberately differs from sorting `posts` in place and taking the last
    /// element: the list is not reordered and keeps insertion order.
    #[must_use]
    pub fn next_remote_id(&self) -> Option<PostId> {
        let Some(last) = self.posts.iter().map(|post| &post.id).max() else {
            return Some(PostId::new("1"));
        };

        last.as_str()
            .parse::<u64>()
            .ok()
            .map(|n| PostId::new(n.saturating_add(1).to_string()))
    }
}

/// Actions for the posts feature
///
/// Intents (`PostAdded`, `ReactionAdded`, `FetchPosts`, `AddNewPost`) are
/// dispatched by the presentation layer. The `*Phase` actions carry the
/// settled outcome of a remote call and are normally produced by effects.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum PostsAction {
    /// Add a post locally with a generated id and the current time
    PostAdded {
        /// Title
        title: String,
        /// Body text
        body: String,
        /// Author
        user_id: UserId,
    },

    /// Add one reaction to a post; unknown posts are ignored
    ReactionAdded {
        /// Target post
        post_id: PostId,
        /// Reaction to add
        reaction: ReactionKind,
    },

    /// Fetch every post from the remote service
    FetchPosts,

    /// Phase of a fetch-all call
    FetchPostsPhase(Phase<Vec<RemotePost>>),

    /// Create a post through the remote service
    AddNewPost(NewPost),

    /// Phase of a remote create call
    AddNewPostPhase(Phase<RemotePost>),
}

impl PostsAction {
    /// Builds a `PostAdded` intent
    #[must_use]
    pub fn post_added(title: impl Into<String>, body: impl Into<String>, user_id: UserId) -> Self {
        Self::PostAdded {
            title: title.into(),
            body: body.into(),
            user_id,
        }
    }

    /// Builds a `ReactionAdded` intent
    #[must_use]
    pub const fn reaction_added(post_id: PostId, reaction: ReactionKind) -> Self {
        Self::ReactionAdded { post_id, reaction }
    }
}
