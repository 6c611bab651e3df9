//! The store: serialized reduction plus effect execution

use crate::handle::{EffectHandle, InFlight, InFlightGuard};
use crate::{StoreConfig, StoreError};
use postboard_core::{effect::Effect, reducer::Reducer};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::{RwLock, broadcast};

/// Owns a state value and drives a reducer over it
///
/// - Reducer calls are serialized by a write lock, so each transition is
///   applied atomically.
/// - Effects run on spawned tasks. The action an effect produces is broadcast
///   to [`subscribe_actions`](Self::subscribe_actions) observers, then reduced.
/// - Cloning a store is cheap and every clone shares the same state.
///
/// # Type Parameters
///
/// - `S`: State type
/// - `A`: Action type
/// - `E`: Environment type
/// - `R`: Reducer implementation
pub struct Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    state: Arc<RwLock<S>>,
    reducer: R,
    environment: E,
    config: StoreConfig,
    shutdown: Arc<AtomicBool>,
    in_flight: InFlight,
    action_broadcast: broadcast::Sender<A>,
}

impl<S, A, E, R> Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
    A: Send + Clone + 'static,
    S: Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    /// Create a store with [`StoreConfig::default`]
    #[must_use]
    pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
        Self::with_config(initial_state, reducer, environment, StoreConfig::default())
    }

    /// Create a store with explicit configuration
    ///
    /// ```ignore
    /// let config = StoreConfig::default().with_shutdown_timeout(Duration::from_secs(5));
    /// let store = Store::with_config(AppState::default(), AppReducer::new(), env, config);
    /// ```
    #[must_use]
    pub fn with_config(initial_state: S, reducer: R, environment: E, config: StoreConfig) -> Self {
        let (action_broadcast, _) = broadcast::channel(config.broadcast_capacity.max(1));

        Self {
            state: Arc::new(RwLock::new(initial_state)),
            reducer,
            environment,
            config,
            shutdown: Arc::new(AtomicBool::new(false)),
            in_flight: InFlight::new(),
            action_broadcast,
        }
    }

    /// Effects running across all `send` calls
    #[must_use]
    pub fn pending_effects(&self) -> usize {
        self.in_flight.count()
    }

    /// Stop accepting actions and wait for running effects
    ///
    /// New calls to [`send`](Self::send) fail from now on. Effects already
    /// running still complete and their actions are still reduced.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownTimeout`] with the number of effects still
    /// running if `timeout` elapses first.
    pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
        self.shutdown.store(true, Ordering::Release);
        tracing::info!(pending_effects = self.pending_effects(), "Store shutting down");
        metrics::counter!("store.shutdown.initiated").increment(1);

        let start = Instant::now();
        if tokio::time::timeout(timeout, self.in_flight.idle()).await.is_ok() {
            tracing::info!(elapsed_ms = start.elapsed().as_millis(), "Store shut down");
            metrics::counter!("store.shutdown.completed").increment(1);
            return Ok(());
        }

        let pending = self.pending_effects();
        tracing::error!(pending_effects = pending, "Shutdown timed out");
        metrics::counter!("store.shutdown.timeout").increment(1);
        Err(StoreError::ShutdownTimeout(pending))
    }

    /// [`shutdown`](Self::shutdown) with the configured default timeout
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownTimeout`] if effects outlive the timeout.
    pub async fn shutdown_gracefully(&self) -> Result<(), StoreError> {
        self.shutdown(self.config.default_shutdown_timeout).await
    }

    /// Reduce an action and start the effects it returns
    ///
    /// Returns once the effects are started, not finished. Use the returned
    /// [`EffectHandle`] to wait for them. Concurrent calls are serialized at
    /// the reducer, and effects may finish in any order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] once shutdown has started.
    ///
    /// # Panics
    ///
    /// A panicking reducer panics the caller.
    #[tracing::instrument(skip(self, action), name = "store_send")]
    pub async fn send(&self, action: A) -> Result<EffectHandle, StoreError>
    where
        R: Clone,
        E: Clone,
    {
        if self.shutdown.load(Ordering::Acquire) {
            tracing::warn!("Rejected action: store is shutting down");
            metrics::counter!("store.shutdown.rejected_actions").increment(1);
            return Err(StoreError::ShutdownInProgress);
        }

        Ok(self.dispatch(action).await)
    }

    /// Send an intent and wait for the first effect-produced action matching
    /// `predicate`
    ///
    /// ```ignore
    /// let settled = store.send_and_wait_for(
    ///     PostsAction::FetchPosts.into(),
    ///     |a| matches!(a, AppAction::Posts(PostsAction::FetchPostsPhase(_))),
    ///     Duration::from_secs(10),
    /// ).await?;
    /// ```
    ///
    /// # Errors
    ///
    /// - [`StoreError::Timeout`] if nothing matched in time
    /// - [`StoreError::ChannelClosed`] if the broadcast channel closed
    /// - [`StoreError::ShutdownInProgress`] if the store is shutting down
    pub async fn send_and_wait_for<F>(
        &self,
        action: A,
        predicate: F,
        timeout: Duration,
    ) -> Result<A, StoreError>
    where
        R: Clone,
        E: Clone,
        F: Fn(&A) -> bool,
    {
        // Subscribe first so a fast effect cannot be missed
        let mut rx = self.action_broadcast.subscribe();
        self.send(action).await?;

        let matching = async {
            loop {
                match rx.recv().await {
                    Ok(action) if predicate(&action) => return Ok(action),
                    Ok(_) => {},
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Action observer lagged");
                    },
                    Err(broadcast::error::RecvError::Closed) => {
                        return Err(StoreError::ChannelClosed);
                    },
                }
            }
        };

        tokio::time::timeout(timeout, matching)
            .await
            .map_err(|_| StoreError::Timeout)?
    }

    /// Observe every action produced by an effect
    ///
    /// Actions passed to [`send`](Self::send) directly are not broadcast.
    #[must_use]
    pub fn subscribe_actions(&self) -> broadcast::Receiver<A> {
        self.action_broadcast.subscribe()
    }

    /// Read the state through a closure, typically a selector
    ///
    /// ```ignore
    /// let post_count = store.state(|s| select_all_posts(s).len()).await;
    /// ```
    pub async fn state<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&S) -> T,
    {
        let state = self.state.read().await;
        f(&*state)
    }

    async fn dispatch(&self, action: A) -> EffectHandle
    where
        R: Clone,
        E: Clone,
    {
        tracing::debug!("Processing action");
        metrics::counter!("store.commands.total").increment(1);

        let effects = {
            let mut state = self.state.write().await;
            let _span = tracing::debug_span!("reducer_execution").entered();

            let start = Instant::now();
            let effects = self.reducer.reduce(&mut *state, action, &self.environment);
            metrics::histogram!("store.reducer.duration_seconds")
                .record(start.elapsed().as_secs_f64());
            tracing::trace!(effects = effects.len(), "Reducer finished");
            effects
        };

        let (handle, in_flight) = EffectHandle::new();
        for effect in effects {
            self.execute_effect(effect, &in_flight);
        }
        handle
    }

    /// Start one effect, registered with `caller` and the store
    fn execute_effect(&self, effect: Effect<A>, caller: &InFlight)
    where
        R: Clone,
        E: Clone,
    {
        match effect {
            Effect::None => {
                metrics::counter!("store.effects.executed", "type" => "none").increment(1);
            },
            Effect::Future(fut) => {
                metrics::counter!("store.effects.executed", "type" => "future").increment(1);
                let guards = self.register(caller);
                let store = self.clone();

                tokio::spawn(async move {
                    let _guards = guards;
                    match fut.await {
                        Some(action) => store.feed_back(action).await,
                        None => tracing::trace!("Future effect finished without an action"),
                    }
                });
            },
            Effect::Delay { duration, action } => {
                metrics::counter!("store.effects.executed", "type" => "delay").increment(1);
                let guards = self.register(caller);
                let store = self.clone();

                tokio::spawn(async move {
                    let _guards = guards;
                    tokio::time::sleep(duration).await;
                    store.feed_back(*action).await;
                });
            },
            Effect::Parallel(effects) => {
                metrics::counter!("store.effects.executed", "type" => "parallel").increment(1);
                for effect in effects {
                    self.execute_effect(effect, caller);
                }
            },
            Effect::Sequential(effects) => {
                metrics::counter!("store.effects.executed", "type" => "sequential").increment(1);
                let guards = self.register(caller);
                let store = self.clone();

                tokio::spawn(async move {
                    let _guards = guards;
                    for effect in effects {
                        let step = InFlight::new();
                        store.execute_effect(effect, &step);
                        step.idle().await;
                    }
                });
            },
        }
    }

    fn register(&self, caller: &InFlight) -> [InFlightGuard; 2] {
        [caller.enter(), self.in_flight.enter()]
    }

    /// Broadcast an effect-produced action, then reduce it
    ///
    /// Bypasses the shutdown gate so running effects still settle.
    async fn feed_back(&self, action: A)
    where
        R: Clone,
        E: Clone,
    {
        let _ = self.action_broadcast.send(action.clone());
        let _follow_up = self.dispatch(action).await;
    }
}

impl<S, A, E, R> Clone for Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E> + Clone,
    E: Clone,
{
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            reducer: self.reducer.clone(),
            environment: self.environment.clone(),
            config: self.config.clone(),
            shutdown: Arc::clone(&self.shutdown),
            in_flight: self.in_flight.clone(),
            action_broadcast: self.action_broadcast.clone(),
        }
    }
}
