//! # Postboard Core
//!
//! Core traits and types for the Postboard reducer architecture.
//!
//! This crate provides the fundamental abstractions for building a client-side
//! state container where every state transition is a pure reducer call and
//! every side effect is a value returned to a runtime.
//!
//! A feature is a state type, an action enum covering both user intents and
//! settled async results, and a [`Reducer`](reducer::Reducer) that mutates the
//! state and answers with [`Effect`](effect::Effect) values. Anything the
//! reducer needs from the outside world (time, ids, HTTP) reaches it through
//! the environment argument, so reducers never perform I/O themselves.
//!
//! ## Example
//!
//! ```
//! use postboard_core::{SmallVec, effect::Effect, reducer::Reducer, smallvec};
//!
//! #[derive(Clone, Debug, Default)]
//! struct LikeState {
//!     likes: u32,
//! }
//!
//! #[derive(Clone, Debug)]
//! enum LikeAction {
//!     Like,
//! }
//!
//! struct LikeReducer;
//!
//! impl Reducer for LikeReducer {
//!     type State = LikeState;
//!     type Action = LikeAction;
//!     type Environment = ();
//!
//!     fn reduce(
//!         &self,
//!         state: &mut LikeState,
//!         action: LikeAction,
//!         _env: &(),
//!     ) -> SmallVec<[Effect<LikeAction>; 4]> {
//!         match action {
//!             LikeAction::Like => state.likes += 1,
//!         }
//!         smallvec![Effect::None]
//!     }
//! }
//!
//! let mut state = LikeState::default();
//! let _ = LikeReducer.reduce(&mut state, LikeAction::Like, &());
//! assert_eq!(state.likes, 1);
//! ```

pub use chrono::{DateTime, Utc};
pub use smallvec::{SmallVec, smallvec};

/// Reducer composition utilities
pub mod composition;

/// Declarative macros for effect construction
pub mod effect_macros;

/// The [`Reducer`](reducer::Reducer) trait
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// Turns `(state, action)` into a new state plus work for the runtime
    ///
    /// Given the same state, action and environment answers, a reducer must
    /// make the same change and return the same effects.
    ///
    /// # Example
    ///
    /// ```ignore
    /// impl Reducer for PostsReducer {
    ///     type State = PostsState;
    ///     type Action = PostsAction;
    ///     type Environment = BlogEnvironment<HttpBlogService>;
    ///
    ///     fn reduce(
    ///         &self,
    ///         state: &mut PostsState,
    ///         action: PostsAction,
    ///         env: &Self::Environment,
    ///     ) -> SmallVec<[Effect<PostsAction>; 4]> {
    ///         match action {
    ///             PostsAction::ReactionAdded { post_id, reaction } => {
    ///                 // Business logic here
    ///                 smallvec![Effect::None]
    ///             }
    ///             _ => smallvec![Effect::None],
    ///         }
    ///     }
    /// }
    /// ```
    pub trait Reducer {
        /// Slice of state owned by this reducer
        type State;

        /// Intents and settled results this reducer handles
        type Action;

        /// Services the reducer may call from its effects
        type Environment;

        /// Apply `action` to `state` in place and return the effects to run
        ///
        /// Nothing returned here has started yet; the store executes the
        /// effects after the write lock is released.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Work requested by reducers
pub mod effect {
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Arc;
    use std::time::Duration;

    /// A description of async work whose outcome, if any, is another `Action`
    ///
    /// The runtime feeds every produced action back through the reducer.
    pub enum Effect<Action> {
        /// Nothing to do
        None,

        /// Start every child at once
        Parallel(Vec<Effect<Action>>),

        /// Start each child after the previous one has settled
        Sequential(Vec<Effect<Action>>),

        /// Produce `action` after `duration`
        Delay {
            /// Wait before producing the action
            duration: Duration,
            /// Produced once the wait is over
            action: Box<Action>,
        },

        /// Await a future; `Some(action)` is reduced, `None` ends silently
        Future(Pin<Box<dyn Future<Output = Option<Action>> + Send>>),
    }

    impl<Action> std::fmt::Debug for Effect<Action>
    where
        Action: std::fmt::Debug,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Self::None => f.write_str("None"),
                Self::Parallel(children) => f.debug_tuple("Parallel").field(children).finish(),
                Self::Sequential(children) => f.debug_tuple("Sequential").field(children).finish(),
                Self::Delay { duration, action } => f
                    .debug_struct("Delay")
                    .field("duration", duration)
                    .field("action", action)
                    .finish(),
                Self::Future(_) => f.write_str("Future(..)"),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Shorthand for [`Effect::Parallel`]
        #[must_use]
        pub const fn merge(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Parallel(effects)
        }

        /// Shorthand for [`Effect::Sequential`]
        #[must_use]
        pub const fn chain(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Sequential(effects)
        }

        /// Returns `true` if this effect does nothing
        #[must_use]
        pub const fn is_none(&self) -> bool {
            matches!(self, Effect::None)
        }

        /// Transform the actions this effect produces
        ///
        /// Used to lift a child feature's effects into a parent action type,
        /// e.g. `PostsAction` into `AppAction::Posts`.
        ///
        /// # Example
        ///
        /// ```
        /// use postboard_core::effect::Effect;
        ///
        /// let child: Effect<u8> = Effect::None;
        /// let parent: Effect<String> = child.map(|n| n.to_string());
        /// assert!(parent.is_none());
        /// ```
        #[must_use]
        pub fn map<B, F>(self, f: F) -> Effect<B>
        where
            Action: Send + 'static,
            B: Send + 'static,
            F: Fn(Action) -> B + Send + Sync + 'static,
        {
            self.map_shared(Arc::new(f))
        }

        fn map_shared<B>(self, f: Arc<dyn Fn(Action) -> B + Send + Sync>) -> Effect<B>
        where
            Action: Send + 'static,
            B: Send + 'static,
        {
            match self {
                Effect::None => Effect::None,
                Effect::Parallel(effects) => Effect::Parallel(
                    effects
                        .into_iter()
                        .map(|e| e.map_shared(Arc::clone(&f)))
                        .collect(),
                ),
                Effect::Sequential(effects) => Effect::Sequential(
                    effects
                        .into_iter()
                        .map(|e| e.map_shared(Arc::clone(&f)))
                        .collect(),
                ),
                Effect::Delay { duration, action } => Effect::Delay {
                    duration,
                    action: Box::new(f(*action)),
                },
                Effect::Future(fut) => {
                    Effect::Future(Box::pin(async move { fut.await.map(|a| f(a)) }))
                },
            }
        }
    }
}

/// Time and identity sources handed to reducers
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Source of "now" for timestamps such as a post's `date`
    ///
    /// Live code uses [`SystemClock`]; tests pin the time.
    pub trait Clock: Send + Sync {
        /// Current instant in UTC
        fn now(&self) -> DateTime<Utc>;
    }

    /// Wall-clock time
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }

    /// Generates opaque unique identifiers for locally created records
    pub trait IdGenerator: Send + Sync {
        /// Produce the next identifier
        fn next_id(&self) -> String;
    }

    /// Random v4 UUID identifiers
    #[derive(Debug, Clone, Copy, Default)]
    pub struct UuidGenerator;

    impl IdGenerator for UuidGenerator {
        fn next_id(&self) -> String {
            uuid::Uuid::new_v4().simple().to_string()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::effect::Effect;
    use super::environment::{IdGenerator, UuidGenerator};
    use std::collections::HashSet;
    use std::time::Duration;

    #[test]
    fn uuid_generator_produces_distinct_ids() {
        let ids: HashSet<String> = (0..100).map(|_| UuidGenerator.next_id()).collect();
        assert_eq!(ids.len(), 100);
    }

    #[test]
    fn map_rewrites_delayed_action() {
        let effect: Effect<u8> = Effect::Delay {
            duration: Duration::from_millis(5),
            action: Box::new(7),
        };

        match effect.map(|n| u32::from(n) * 2) {
            Effect::Delay { duration, action } => {
                assert_eq!(duration, Duration::from_millis(5));
                assert_eq!(*action, 14);
            },
            other => panic!("unexpected effect: {other:?}"),
        }
    }

    #[tokio::test]
    async fn map_rewrites_future_output() {
        let effect: Effect<u8> = Effect::Future(Box::pin(async { Some(3) }));

        let Effect::Future(fut) = effect.map(|n| format!("got {n}")) else {
            panic!("expected a future effect");
        };
        assert_eq!(fut.await.as_deref(), Some("got 3"));
    }

    #[test]
    fn map_preserves_structure() {
        let effect: Effect<u8> = Effect::merge(vec![
            Effect::None,
            Effect::chain(vec![Effect::None, Effect::None]),
        ]);

        match effect.map(|n| n.to_string()) {
            Effect::Parallel(children) => {
                assert_eq!(children.len(), 2);
                assert!(children[0].is_none());
                assert!(matches!(&children[1], Effect::Sequential(inner) if inner.len() == 2));
            },
            other => panic!("unexpected effect: {other:?}"),
        }
    }
}
