//! Posts reducer

use crate::environment::BlogEnvironment;
use crate::service::BlogService;
use crate::thunks;
use crate::types::{FetchStatus, Phase, Post, PostId, PostsAction, PostsState, RemotePost};
use chrono::Duration;
use postboard_core::{SmallVec, async_effect, effect::Effect, reducer::Reducer, smallvec};
use std::marker::PhantomData;
use std::sync::Arc;

/// Reducer for the posts slice
///
/// Generic over the remote service so tests can swap in
/// [`MockBlogService`](crate::mocks::MockBlogService).
#[derive(Debug)]
pub struct PostsReducer<S> {
    _service: PhantomData<fn() -> S>,
}

impl<S> PostsReducer<S> {
    /// Creates a new `PostsReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _service: PhantomData,
        }
    }
}

impl<S> Default for PostsReducer<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Clone for PostsReducer<S> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<S: BlogService + 'static> PostsReducer<S> {
    fn reduce_fetch_phase(
        state: &mut PostsState,
        phase: Phase<Vec<RemotePost>>,
        env: &BlogEnvironment<S>,
    ) {
        match phase {
            Phase::Pending => {
                state.status = FetchStatus::Loading;
                state.error = None;
            },
            Phase::Fulfilled(remote) => {
                state.status = FetchStatus::Succeeded;
                state.error = None;

                // Staggered dates: first result is one minute old, the next two, ...
                let now = env.clock.now();
                let fetched = remote
                    .into_iter()
                    .zip(1_i64..)
                    .map(|(post, minutes)| post.into_post(now - Duration::minutes(minutes)));

                let before = state.posts.len();
                state.posts.extend(fetched);
                tracing::debug!(
                    fetched = state.posts.len() - before,
                    total = state.posts.len(),
                    "posts fetched"
                );
            },
            Phase::Rejected(message) => {
                tracing::warn!(error = %message, "fetch posts rejected");
                state.status = FetchStatus::Failed;
                state.error = Some(message);
            },
        }
    }

    fn reduce_add_phase(state: &mut PostsState, phase: Phase<RemotePost>, env: &BlogEnvironment<S>) {
        match phase {
            Phase::Pending => {},
            Phase::Fulfilled(remote) => {
                let id = state.next_remote_id().unwrap_or_else(|| {
                    tracing::debug!("greatest post id is not numeric, generating one");
                    PostId::new(env.ids.next_id())
                });

                let post = Post {
                    id,
                    ..remote.into_post(env.clock.now())
                };
                tracing::debug!(id = %post.id, "remote post added");
                state.posts.push(post);
            },
            Phase::Rejected(message) => {
                tracing::warn!(error = %message, "add new post rejected, ignoring");
            },
        }
    }
}

impl<S: BlogService + 'static> Reducer for PostsReducer<S> {
    type State = PostsState;
    type Action = PostsAction;
    type Environment = BlogEnvironment<S>;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            PostsAction::PostAdded {
                title,
                body,
                user_id,
            } => {
                let post = Post::new(
                    PostId::new(env.ids.next_id()),
                    title,
                    body,
                    user_id,
                    env.clock.now(),
                );
                tracing::debug!(id = %post.id, "local post added");
                state.posts.push(post);
                smallvec![Effect::None]
            },

            PostsAction::ReactionAdded { post_id, reaction } => {
                match state.find_mut(&post_id) {
                    Some(post) => post.reactions.increment(reaction),
                    None => tracing::debug!(%post_id, %reaction, "reaction for unknown post ignored"),
                }
                smallvec![Effect::None]
            },

            PostsAction::FetchPosts => {
                Self::reduce_fetch_phase(state, Phase::Pending, env);

                let service = Arc::clone(&env.service);
                smallvec![async_effect! {
                    let phase = thunks::fetch_posts(service.as_ref()).await;
                    Some(PostsAction::FetchPostsPhase(phase))
                }]
            },

            PostsAction::FetchPostsPhase(phase) => {
                Self::reduce_fetch_phase(state, phase, env);
                smallvec![Effect::None]
            },

            PostsAction::AddNewPost(new_post) => {
                Self::reduce_add_phase(state, Phase::Pending, env);

                let service = Arc::clone(&env.service);
                smallvec![async_effect! {
                    let phase = thunks::add_new_post(service.as_ref(), &new_post).await;
                    Some(PostsAction::AddNewPostPhase(phase))
                }]
            },

            PostsAction::AddNewPostPhase(phase) => {
                Self::reduce_add_phase(state, phase, env);
                smallvec![Effect::None]
            },
        }
    }
}
