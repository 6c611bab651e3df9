//! Reducer composition utilities
//!
//! A feature reducer is written against its own state and action types. To
//! run it inside an application-wide store it has to be *scoped*: pointed at
//! the slice of the root state it owns, fed only the root actions meant for
//! it, and have the actions its effects produce wrapped back into root
//! actions.
//!
//! # Example
//!
//! ```
//! use postboard_core::{SmallVec, effect::Effect, reducer::Reducer, smallvec};
//! use postboard_core::composition::scope_feature;
//!
//! #[derive(Clone, Debug, Default)]
//! struct CounterState {
//!     count: i32,
//! }
//!
//! #[derive(Clone, Debug)]
//! enum CounterAction {
//!     Increment,
//! }
//!
//! struct CounterReducer;
//!
//! impl Reducer for CounterReducer {
//!     type State = CounterState;
//!     type Action = CounterAction;
//!     type Environment = ();
//!
//!     fn reduce(&self, state: &mut CounterState, action: CounterAction, _env: &()) -> SmallVec<[Effect<CounterAction>; 4]> {
//!         match action {
//!             CounterAction::Increment => state.count += 1,
//!         }
//!         smallvec![Effect::None]
//!     }
//! }
//!
//! #[derive(Clone, Debug, Default)]
//! struct AppState {
//!     counter: CounterState,
//!     title: String,
//! }
//!
//! #[derive(Clone, Debug)]
//! enum AppAction {
//!     Counter(CounterAction),
//!     Rename(String),
//! }
//!
//! let scoped = scope_feature(
//!     CounterReducer,
//!     |app: &mut AppState| &mut app.counter,
//!     |action: AppAction| match action {
//!         AppAction::Counter(inner) => Some(inner),
//!         AppAction::Rename(_) => None,
//!     },
//!     AppAction::Counter,
//! );
//!
//! let mut state = AppState::default();
//! let _ = scoped.reduce(&mut state, AppAction::Counter(CounterAction::Increment), &());
//! assert_eq!(state.counter.count, 1);
//! ```

use crate::effect::Effect;
use crate::reducer::Reducer;
use smallvec::SmallVec;

/// Scopes a feature reducer to a slice of a larger state and action space.
///
/// # Arguments
///
/// - `reducer`: The feature reducer
/// - `state`: Projects the root state onto the feature's slice
/// - `extract`: Returns the feature action carried by a root action, if any
/// - `embed`: Wraps a feature action (produced by an effect) into a root action
///
/// Root actions for which `extract` returns `None` are ignored and produce no
/// effects.
pub const fn scope_feature<S, SubS, A, SubA, E, R>(
    reducer: R,
    state: fn(&mut S) -> &mut SubS,
    extract: fn(A) -> Option<SubA>,
    embed: fn(SubA) -> A,
) -> ScopedFeature<S, SubS, A, SubA, E, R>
where
    R: Reducer<State = SubS, Action = SubA, Environment = E>,
{
    ScopedFeature {
        reducer,
        state,
        extract,
        embed,
        _phantom: std::marker::PhantomData,
    }
}

/// A feature reducer running inside a larger state and action space.
///
/// Created by [`scope_feature`].
pub struct ScopedFeature<S, SubS, A, SubA, E, R>
where
    R: Reducer<State = SubS, Action = SubA, Environment = E>,
{
    reducer: R,
    state: fn(&mut S) -> &mut SubS,
    extract: fn(A) -> Option<SubA>,
    embed: fn(SubA) -> A,
    _phantom: std::marker::PhantomData<fn() -> E>,
}

impl<S, SubS, A, SubA, E, R> ScopedFeature<S, SubS, A, SubA, E, R>
where
    R: Reducer<State = SubS, Action = SubA, Environment = E>,
{
    /// The wrapped feature reducer
    #[must_use]
    pub const fn inner(&self) -> &R {
        &self.reducer
    }
}

impl<S, SubS, A, SubA, E, R> Clone for ScopedFeature<S, SubS, A, SubA, E, R>
where
    R: Reducer<State = SubS, Action = SubA, Environment = E> + Clone,
{
    fn clone(&self) -> Self {
        Self {
            reducer: self.reducer.clone(),
            state: self.state,
            extract: self.extract,
            embed: self.embed,
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<S, SubS, A, SubA, E, R> Reducer for ScopedFeature<S, SubS, A, SubA, E, R>
where
    A: Send + 'static,
    SubA: Send + 'static,
    R: Reducer<State = SubS, Action = SubA, Environment = E>,
{
    type State = S;
    type Action = A;
    type Environment = E;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        let Some(action) = (self.extract)(action) else {
            return SmallVec::new();
        };

        let sub_state = (self.state)(state);

        self.reducer
            .reduce(sub_state, action, env)
            .into_iter()
            .map(|effect| effect.map(self.embed))
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::smallvec;

    #[derive(Clone, Debug, Default)]
    struct SubState {
        value: i32,
    }

    #[derive(Clone, Debug)]
    enum SubAction {
        Add(i32),
        Echo(i32),
    }

    #[derive(Clone)]
    struct SubReducer;

    impl Reducer for SubReducer {
        type State = SubState;
        type Action = SubAction;
        type Environment = ();

        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            _env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]> {
            match action {
                SubAction::Add(n) => {
                    state.value += n;
                    smallvec![Effect::None]
                },
                SubAction::Echo(n) => smallvec![Effect::Future(Box::pin(async move {
                    Some(SubAction::Add(n))
                }))],
            }
        }
    }

    #[derive(Clone, Debug, Default)]
    struct ParentState {
        sub: SubState,
        other: String,
    }

    #[derive(Clone, Debug)]
    enum ParentAction {
        Sub(SubAction),
        Other,
    }

    fn scoped() -> ScopedFeature<ParentState, SubState, ParentAction, SubAction, (), SubReducer> {
        scope_feature(
            SubReducer,
            |parent: &mut ParentState| &mut parent.sub,
            |action| match action {
                ParentAction::Sub(inner) => Some(inner),
                ParentAction::Other => None,
            },
            ParentAction::Sub,
        )
    }

    #[test]
    fn test_scoped_feature_updates_slice_only() {
        let scoped = scoped();
        let mut state = ParentState {
            sub: SubState { value: 5 },
            other: "test".to_string(),
        };

        let _ = scoped.reduce(&mut state, ParentAction::Sub(SubAction::Add(3)), &());
        assert_eq!(state.sub.value, 8);
        assert_eq!(state.other, "test");
    }

    #[test]
    fn test_scoped_feature_ignores_foreign_actions() {
        let scoped = scoped();
        let mut state = ParentState::default();

        let effects = scoped.reduce(&mut state, ParentAction::Other, &());
        assert!(effects.is_empty());
        assert_eq!(state.sub.value, 0);
    }

    #[tokio::test]
    async fn test_scoped_feature_embeds_effect_actions() {
        let scoped = scoped().clone();
        let mut state = ParentState::default();

        let mut effects = scoped.reduce(&mut state, ParentAction::Sub(SubAction::Echo(4)), &());
        assert_eq!(effects.len(), 1);

        let Some(Effect::Future(fut)) = effects.pop() else {
            unreachable!("echo produces a single future effect");
        };
        assert!(matches!(
            fut.await,
            Some(ParentAction::Sub(SubAction::Add(4)))
        ));
    }
}
