//! Users slice
//!
//! Holds the author list the post views use to resolve `user_id` to a name.

use crate::environment::BlogEnvironment;
use crate::service::BlogService;
use crate::thunks;
use crate::types::{Phase, UserId};
use postboard_core::{SmallVec, async_effect, effect::Effect, reducer::Reducer, smallvec};
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use std::sync::Arc;

/// A post author
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Identifier
    pub id: UserId,
    /// Display name
    pub name: String,
}

impl User {
    /// Creates a user
    #[must_use]
    pub fn new(id: UserId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// State of the users slice
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsersState {
    /// Every known user
    pub users: Vec<User>,
}

/// Actions for the users slice
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum UsersAction {
    /// Fetch every user from the remote service
    FetchUsers,
    /// Phase of a fetch-users call
    FetchUsersPhase(Phase<Vec<User>>),
}

/// Reducer for the users slice
#[derive(Debug)]
pub struct UsersReducer<S> {
    _service: PhantomData<fn() -> S>,
}

impl<S> UsersReducer<S> {
    /// Creates a new `UsersReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _service: PhantomData,
        }
    }
}

impl<S> Default for UsersReducer<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Clone for UsersReducer<S> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<S: BlogService + 'static> Reducer for UsersReducer<S> {
    type State = UsersState;
    type Action = UsersAction;
    type Environment = BlogEnvironment<S>;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            UsersAction::FetchUsers => {
                let service = Arc::clone(&env.service);
                smallvec![async_effect! {
                    let phase = thunks::fetch_users(service.as_ref()).await;
                    Some(UsersAction::FetchUsersPhase(phase))
                }]
            },

            UsersAction::FetchUsersPhase(Phase::Fulfilled(users)) => {
                tracing::debug!(count = users.len(), "users fetched");
                state.users = users;
                smallvec![Effect::None]
            },

            UsersAction::FetchUsersPhase(Phase::Rejected(message)) => {
                tracing::warn!(error = %message, "fetch users rejected");
                smallvec![Effect::None]
            },

            UsersAction::FetchUsersPhase(Phase::Pending) => smallvec![Effect::None],
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::mocks::MockBlogService;
    use postboard_testing::{ReducerTest, SequentialIdGenerator, assertions, test_clock};

    fn test_env() -> BlogEnvironment<MockBlogService> {
        BlogEnvironment::new(
            Arc::new(MockBlogService::new()),
            Arc::new(test_clock()),
            Arc::new(SequentialIdGenerator::new("local")),
        )
    }

    #[test]
    fn test_user_accepts_numeric_id_and_ignores_extra_fields() {
        let json = r#"{"id": 3, "name": "Clementine Bauch", "username": "Samantha"}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user, User::new(UserId::new("3"), "Clementine Bauch"));
    }

    #[test]
    fn test_fetch_users_returns_effect() {
        ReducerTest::new(UsersReducer::new())
            .with_env(test_env())
            .given_state(UsersState::default())
            .when_action(UsersAction::FetchUsers)
            .then_state(|state| assert!(state.users.is_empty()))
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[test]
    fn test_fulfilled_replaces_user_list() {
        ReducerTest::new(UsersReducer::new())
            .with_env(test_env())
            .given_state(UsersState {
                users: vec![User::new(UserId::new("old"), "Old")],
            })
            .when_action(UsersAction::FetchUsersPhase(Phase::Fulfilled(vec![
                User::new(UserId::new("1"), "Leanne"),
                User::new(UserId::new("2"), "Ervin"),
            ])))
            .then_state(|state| {
                let names: Vec<&str> = state.users.iter().map(|u| u.name.as_str()).collect();
                assert_eq!(names, ["Leanne", "Ervin"]);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_rejected_keeps_user_list() {
        let initial = UsersState {
            users: vec![User::new(UserId::new("1"), "Leanne")],
        };
        let expected = initial.clone();

        ReducerTest::new(UsersReducer::new())
            .with_env(test_env())
            .given_state(initial)
            .when_action(UsersAction::FetchUsersPhase(Phase::Rejected("down".to_string())))
            .then_state(move |state| assert_eq!(state, &expected))
            .run();
    }
}
