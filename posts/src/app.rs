//! Root store: the posts and users slices combined

use crate::environment::BlogEnvironment;
use crate::reducer::PostsReducer;
use crate::service::BlogService;
use crate::types::{PostsAction, PostsState};
use crate::users::{UsersAction, UsersReducer, UsersState};
use postboard_core::composition::{ScopedFeature, scope_feature};
use postboard_core::{SmallVec, effect::Effect, reducer::Reducer};
use postboard_runtime::Store;
use serde::{Deserialize, Serialize};

/// Root state read by the selectors
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppState {
    /// Posts slice
    pub posts: PostsState,
    /// Users slice
    pub users: UsersState,
}

/// Root action
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum AppAction {
    /// Routed to the posts slice
    Posts(PostsAction),
    /// Routed to the users slice
    Users(UsersAction),
}

impl AppAction {
    fn into_posts(self) -> Option<PostsAction> {
        match self {
            Self::Posts(action) => Some(action),
            Self::Users(_) => None,
        }
    }

    fn into_users(self) -> Option<UsersAction> {
        match self {
            Self::Users(action) => Some(action),
            Self::Posts(_) => None,
        }
    }
}

impl From<PostsAction> for AppAction {
    fn from(action: PostsAction) -> Self {
        Self::Posts(action)
    }
}

impl From<UsersAction> for AppAction {
    fn from(action: UsersAction) -> Self {
        Self::Users(action)
    }
}

fn posts_slice(state: &mut AppState) -> &mut PostsState {
    &mut state.posts
}

fn users_slice(state: &mut AppState) -> &mut UsersState {
    &mut state.users
}

type PostsFeature<S> =
    ScopedFeature<AppState, PostsState, AppAction, PostsAction, BlogEnvironment<S>, PostsReducer<S>>;

type UsersFeature<S> =
    ScopedFeature<AppState, UsersState, AppAction, UsersAction, BlogEnvironment<S>, UsersReducer<S>>;

/// Root reducer delegating to the slice reducers
pub struct AppReducer<S: BlogService + 'static> {
    posts: PostsFeature<S>,
    users: UsersFeature<S>,
}

impl<S: BlogService + 'static> AppReducer<S> {
    /// Creates the root reducer
    #[must_use]
    pub fn new() -> Self {
        Self {
            posts: scope_feature(
                PostsReducer::new(),
                posts_slice,
                AppAction::into_posts,
                AppAction::Posts,
            ),
            users: scope_feature(
                UsersReducer::new(),
                users_slice,
                AppAction::into_users,
                AppAction::Users,
            ),
        }
    }
}

impl<S: BlogService + 'static> Default for AppReducer<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: BlogService + 'static> Clone for AppReducer<S> {
    fn clone(&self) -> Self {
        Self {
            posts: self.posts.clone(),
            users: self.users.clone(),
        }
    }
}

impl<S: BlogService + 'static> Reducer for AppReducer<S> {
    type State = AppState;
    type Action = AppAction;
    type Environment = BlogEnvironment<S>;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            AppAction::Posts(_) => self.posts.reduce(state, action, env),
            AppAction::Users(_) => self.users.reduce(state, action, env),
        }
    }
}

/// The blog store
pub type BlogStore<S> = Store<AppState, AppAction, BlogEnvironment<S>, AppReducer<S>>;

/// Creates a store with empty state
#[must_use]
pub fn blog_store<S: BlogService + 'static>(env: BlogEnvironment<S>) -> BlogStore<S> {
    Store::new(AppState::default(), AppReducer::new(), env)
}
