//! # Travel Desk Runtime
//!
//! The [`Store`] behind the agent console: it holds the app state, runs the
//! reducer for each action and drives the request effects the reducer returns.
//!
//! ## Execution Model
//!
//! - Actions are reduced one at a time under the state write lock
//! - Requests run concurrently; their results are reduced as responses arrive
//! - Nothing is cancelled: a result nobody waits for is still merged
//!
//! ## Example
//!
//! ```ignore
//! use travel_desk_runtime::Store;
//!
//! let store = Store::new(AppState::default(), app_reducer(), environment);
//!
//! let mut handle = store.send(AppAction::Hotels(HotelAction::Fetch { query })).await?;
//! handle.wait().await;
//!
//! let count = store.state(|s| s.hotels.items.len()).await;
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{RwLock, watch};
use travel_desk_core::{effect::Effect, reducer::Reducer};

/// Store metric names and descriptions
pub mod metrics;

/// Store errors
pub mod error {
    use thiserror::Error;

    /// Why a store call did not go through
    ///
    /// State stays readable after any of these.
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StoreError {
        /// `send` was called after `shutdown` started
        #[error("store is shutting down, action refused")]
        ShutdownInProgress,

        /// Requests were still outstanding when the shutdown deadline passed
        #[error("shutdown deadline passed with {0} requests outstanding")]
        ShutdownTimeout(usize),

        /// No settling action arrived in time
        #[error("timed out waiting for a request to settle")]
        Timeout,

        /// The result channel has no sender left
        #[error("result channel closed")]
        ChannelClosed,
    }
}

pub use error::StoreError;

/// Store tuning
///
/// ```
/// use std::time::Duration;
/// use travel_desk_runtime::StoreConfig;
///
/// let config = StoreConfig::default()
///     .with_broadcast_capacity(256)
///     .with_shutdown_timeout(Duration::from_secs(5));
/// assert_eq!(config.broadcast_capacity, 256);
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Result actions kept for observers that fall behind
    pub broadcast_capacity: usize,
    /// Deadline used by callers that do not pick their own
    pub default_shutdown_timeout: Duration,
}

impl StoreConfig {
    /// Override the result buffer size
    #[must_use]
    pub const fn with_broadcast_capacity(mut self, capacity: usize) -> Self {
        self.broadcast_capacity = capacity;
        self
    }

    /// Override the shutdown deadline
    #[must_use]
    pub const fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.default_shutdown_timeout = timeout;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            broadcast_capacity: 64,
            default_shutdown_timeout: Duration::from_secs(30),
        }
    }
}

/// Completion handle for one [`Store::send`]
///
/// Resolves once every request started by that action has answered and its
/// fulfilled or rejected action has been reduced.
///
/// ```ignore
/// let mut handle = store.send(AppAction::Payment(PaymentAction::FetchHistory)).await?;
/// handle.wait_with_timeout(Duration::from_secs(5)).await?;
/// // history merged, or the payment error is set
/// ```
#[derive(Clone)]
pub struct EffectHandle {
    outstanding: Arc<AtomicUsize>,
    settled: watch::Receiver<()>,
}

impl EffectHandle {
    fn new() -> (Self, Settlement) {
        let outstanding = Arc::new(AtomicUsize::new(0));
        let (notify, settled) = watch::channel(());

        (
            Self {
                outstanding: Arc::clone(&outstanding),
                settled,
            },
            Settlement {
                outstanding,
                notify,
            },
        )
    }

    /// A handle with nothing to wait for
    #[must_use]
    pub fn completed() -> Self {
        let (notify, settled) = watch::channel(());
        let _ = notify.send(());

        Self {
            outstanding: Arc::new(AtomicUsize::new(0)),
            settled,
        }
    }

    /// Requests of this action still unanswered
    #[must_use]
    pub fn pending(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }

    /// Wait until every request of this action has settled
    pub async fn wait(&mut self) {
        while self.pending() > 0 {
            if self.settled.changed().await.is_err() {
                break;
            }
        }
    }

    /// [`wait`](Self::wait) bounded by `timeout`
    ///
    /// # Errors
    ///
    /// [`StoreError::Timeout`] when requests are still open at the deadline.
    pub async fn wait_with_timeout(&mut self, timeout: Duration) -> Result<(), StoreError> {
        tokio::time::timeout(timeout, self.wait())
            .await
            .map_err(|_| StoreError::Timeout)
    }
}

impl std::fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectHandle")
            .field("pending", &self.pending())
            .finish_non_exhaustive()
    }
}

/// Writer half of an [`EffectHandle`]
#[derive(Clone)]
struct Settlement {
    outstanding: Arc<AtomicUsize>,
    notify: watch::Sender<()>,
}

impl Settlement {
    fn open(&self) -> SettleOnDrop {
        self.outstanding.fetch_add(1, Ordering::SeqCst);
        SettleOnDrop(self.clone())
    }
}

/// Marks one request settled when dropped, panicking or not
struct SettleOnDrop(Settlement);

impl Drop for SettleOnDrop {
    fn drop(&mut self) {
        if self.0.outstanding.fetch_sub(1, Ordering::SeqCst) == 1 {
            let _ = self.0.notify.send(());
        }
    }
}

/// Keeps the store-wide in-flight count (and its gauge) accurate
struct InFlight(Arc<AtomicUsize>);

impl InFlight {
    fn enter(counter: &Arc<AtomicUsize>) -> Self {
        let now = counter.fetch_add(1, Ordering::SeqCst) + 1;
        record_in_flight(now);
        Self(Arc::clone(counter))
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        let before = self.0.fetch_sub(1, Ordering::SeqCst);
        record_in_flight(before.saturating_sub(1));
    }
}

#[allow(clippy::cast_precision_loss)]
fn record_in_flight(count: usize) {
    metrics::gauge!(metrics::EFFECTS_IN_FLIGHT).set(count as f64);
}

/// The store itself
pub mod store {
    use super::{
        Arc, AtomicBool, AtomicUsize, Duration, Effect, EffectHandle, InFlight, Ordering, Reducer,
        RwLock, Settlement, StoreConfig, StoreError, metrics,
    };
    use tokio::sync::broadcast;

    /// Owns state `S`, reduces actions `A` with reducer `R` against
    /// environment `E`, and runs the resulting requests.
    ///
    /// Clones share the same state.
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        state: Arc<RwLock<S>>,
        reducer: Arc<R>,
        environment: Arc<E>,
        closing: Arc<AtomicBool>,
        in_flight: Arc<AtomicUsize>,
        default_shutdown_timeout: Duration,
        /// Every action produced by a request, published before it is reduced
        results: broadcast::Sender<A>,
    }

    impl<S, A, E, R> Clone for Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        fn clone(&self) -> Self {
            Self {
                state: Arc::clone(&self.state),
                reducer: Arc::clone(&self.reducer),
                environment: Arc::clone(&self.environment),
                closing: Arc::clone(&self.closing),
                in_flight: Arc::clone(&self.in_flight),
                default_shutdown_timeout: self.default_shutdown_timeout,
                results: self.results.clone(),
            }
        }
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
        A: Send + Clone + std::fmt::Debug + 'static,
        S: Send + Sync + 'static,
        E: Send + Sync + 'static,
    {
        /// Store with [`StoreConfig::default`]
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            Self::with_config(initial_state, reducer, environment, StoreConfig::default())
        }

        /// Store with explicit tuning
        #[must_use]
        pub fn with_config(initial_state: S, reducer: R, environment: E, config: StoreConfig) -> Self {
            let (results, _) = broadcast::channel(config.broadcast_capacity.max(1));

            Self {
                state: Arc::new(RwLock::new(initial_state)),
                reducer: Arc::new(reducer),
                environment: Arc::new(environment),
                closing: Arc::new(AtomicBool::new(false)),
                in_flight: Arc::new(AtomicUsize::new(0)),
                default_shutdown_timeout: config.default_shutdown_timeout,
                results,
            }
        }

        /// Requests still awaiting a response, across all handles
        #[must_use]
        pub fn pending_effects(&self) -> usize {
            self.in_flight.load(Ordering::Acquire)
        }

        /// Shutdown deadline from the store's config
        #[must_use]
        pub const fn default_shutdown_timeout(&self) -> Duration {
            self.default_shutdown_timeout
        }

        /// Refuse new actions, then wait up to `timeout` for open requests
        ///
        /// Open requests are never aborted. Their results are still reduced.
        ///
        /// # Errors
        ///
        /// [`StoreError::ShutdownTimeout`] with the number of requests still
        /// open at the deadline.
        pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
            tracing::info!(timeout_ms = timeout.as_millis(), "Store closing");
            self.closing.store(true, Ordering::Release);

            let deadline = tokio::time::Instant::now() + timeout;
            let mut tick = tokio::time::interval(Duration::from_millis(20));

            loop {
                tick.tick().await;
                let open = self.pending_effects();

                if open == 0 {
                    tracing::info!("Store closed, no requests outstanding");
                    return Ok(());
                }
                if tokio::time::Instant::now() >= deadline {
                    tracing::error!(open, "Store shutdown deadline passed");
                    return Err(StoreError::ShutdownTimeout(open));
                }
                tracing::debug!(open, "Waiting on outstanding requests");
            }
        }

        /// Reduce `action` and start the requests it returns
        ///
        /// Returns once the reducer has run. The handle settles when the
        /// requests have answered and their results have been reduced. Two
        /// sends of the same request race and the later response wins.
        ///
        /// # Errors
        ///
        /// [`StoreError::ShutdownInProgress`] after [`shutdown`](Self::shutdown).
        #[tracing::instrument(skip_all, name = "store_send")]
        pub async fn send(&self, action: A) -> Result<EffectHandle, StoreError> {
            if self.closing.load(Ordering::Acquire) {
                tracing::warn!(?action, "Action refused during shutdown");
                metrics::counter!(metrics::SHUTDOWN_REJECTED).increment(1);
                return Err(StoreError::ShutdownInProgress);
            }

            Ok(self.dispatch(action).await)
        }

        /// Reducer pass for one action. Request results re-enter here, past
        /// the shutdown check.
        async fn dispatch(&self, action: A) -> EffectHandle {
            tracing::debug!(?action, "Reducing");
            metrics::counter!(metrics::COMMANDS_TOTAL).increment(1);

            let (handle, settlement) = EffectHandle::new();

            let effects = {
                let mut state = self.state.write().await;
                let started = std::time::Instant::now();
                let effects = self.reducer.reduce(&mut state, action, &self.environment);
                metrics::histogram!(metrics::REDUCER_DURATION).record(started.elapsed().as_secs_f64());
                #[allow(clippy::cast_precision_loss)]
                metrics::histogram!(metrics::EFFECTS_COUNT).record(effects.len() as f64);
                effects
            };

            for effect in effects {
                self.run_effect(effect, &settlement);
            }

            handle
        }

        /// Send `action` and return the first request result matching `predicate`
        ///
        /// The result is returned as soon as it is published, which can be
        /// before it is reduced. Wait on the handle from [`send`](Self::send)
        /// when the merged state is what you need.
        ///
        /// # Errors
        ///
        /// - [`StoreError::ShutdownInProgress`] when the store is closing
        /// - [`StoreError::Timeout`] when nothing matches within `timeout`
        /// - [`StoreError::ChannelClosed`] when the result channel goes away
        pub async fn send_and_wait_for<F>(&self, action: A, predicate: F, timeout: Duration) -> Result<A, StoreError>
        where
            F: Fn(&A) -> bool,
        {
            let mut results = self.results.subscribe();
            self.send(action).await?;

            let matching = async {
                loop {
                    match results.recv().await {
                        Ok(result) if predicate(&result) => break Ok(result),
                        Ok(_) => {},
                        Err(broadcast::error::RecvError::Lagged(missed)) => {
                            tracing::warn!(missed, "Result observer fell behind");
                        },
                        Err(broadcast::error::RecvError::Closed) => break Err(StoreError::ChannelClosed),
                    }
                }
            };

            tokio::time::timeout(timeout, matching)
                .await
                .unwrap_or(Err(StoreError::Timeout))
        }

        /// Receive every action produced by a request
        ///
        /// Actions passed to [`send`](Self::send) are not published.
        #[must_use]
        pub fn subscribe_actions(&self) -> broadcast::Receiver<A> {
            self.results.subscribe()
        }

        /// Read state through `f`
        ///
        /// ```ignore
        /// let unread = store.state(|s| s.chat.unread_count).await;
        /// ```
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            f(&*self.state.read().await)
        }

        fn run_effect(&self, effect: Effect<A>, settlement: &Settlement) {
            match effect {
                Effect::None => {
                    metrics::counter!(metrics::EFFECTS_EXECUTED, "type" => "none").increment(1);
                },
                Effect::Parallel(effects) => {
                    metrics::counter!(metrics::EFFECTS_EXECUTED, "type" => "parallel").increment(1);
                    for effect in effects {
                        self.run_effect(effect, settlement);
                    }
                },
                Effect::Future(request) => {
                    metrics::counter!(metrics::EFFECTS_EXECUTED, "type" => "future").increment(1);
                    let settle = settlement.open();
                    let in_flight = InFlight::enter(&self.in_flight);
                    let store = self.clone();

                    // A panic in `request` drops both guards, so the handle still settles
                    tokio::spawn(async move {
                        let _settle = settle;
                        let _in_flight = in_flight;

                        match request.await {
                            Some(result) => {
                                tracing::trace!(?result, "Request settled");
                                let _ = store.results.send(result.clone());
                                // follow-up requests get their own handle
                                let _ = store.dispatch(result).await;
                            },
                            None => tracing::trace!("Request finished without a result action"),
                        }
                    });
                },
            }
        }
    }
}

pub use store::Store;

#[cfg(test)]
mod tests {
    #![allow(clippy::panic, clippy::unwrap_used)] // Test code can panic

    use super::*;
    use travel_desk_core::{SmallVec, smallvec};

    /// A one-request slice: a list of quotes fetched with a simulated delay
    #[derive(Debug, Default)]
    struct QuoteState {
        quotes: Vec<u32>,
        loading: bool,
        error: Option<String>,
    }

    #[derive(Debug, Clone)]
    enum QuoteAction {
        Fetch { delay_ms: u64, quotes: Vec<u32> },
        FetchAll,
        Fetched { quotes: Vec<u32> },
        FetchFailed,
        Broken,
        Clear,
    }

    struct Backend;

    struct QuoteReducer;

    fn delayed(delay_ms: u64, result: QuoteAction) -> Effect<QuoteAction> {
        Effect::Future(Box::pin(async move {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            Some(result)
        }))
    }

    impl Reducer for QuoteReducer {
        type State = QuoteState;
        type Action = QuoteAction;
        type Environment = Backend;

        fn reduce(
            &self,
            state: &mut QuoteState,
            action: QuoteAction,
            _env: &Backend,
        ) -> SmallVec<[Effect<QuoteAction>; 4]> {
            match action {
                QuoteAction::Fetch { delay_ms, quotes } => {
                    state.loading = true;
                    smallvec![delayed(delay_ms, QuoteAction::Fetched { quotes })]
                },
                QuoteAction::FetchAll => {
                    state.loading = true;
                    smallvec![Effect::Parallel(vec![
                        delayed(1, QuoteAction::Fetched { quotes: vec![1] }),
                        delayed(15, QuoteAction::Fetched { quotes: vec![1, 2] }),
                        delayed(30, QuoteAction::FetchFailed),
                    ])]
                },
                QuoteAction::Fetched { quotes } => {
                    state.loading = false;
                    state.error = None;
                    state.quotes = quotes;
                    SmallVec::new()
                },
                QuoteAction::FetchFailed => {
                    state.loading = false;
                    state.error = Some("Failed to fetch quotes".to_string());
                    state.quotes.clear();
                    SmallVec::new()
                },
                QuoteAction::Broken => {
                    smallvec![Effect::Future(Box::pin(async {
                        panic!("quote request blew up");
                    }))]
                },
                QuoteAction::Clear => {
                    state.quotes.clear();
                    smallvec![Effect::None]
                },
            }
        }
    }

    type QuoteStore = Store<QuoteState, QuoteAction, Backend, QuoteReducer>;

    fn store() -> QuoteStore {
        Store::new(QuoteState::default(), QuoteReducer, Backend)
    }

    fn fetch(delay_ms: u64, quotes: &[u32]) -> QuoteAction {
        QuoteAction::Fetch {
            delay_ms,
            quotes: quotes.to_vec(),
        }
    }

    #[tokio::test]
    async fn test_pending_until_request_settles() {
        let store = store();

        let mut handle = store.send(fetch(20, &[7, 8])).await.unwrap();
        assert!(store.state(|s| s.loading).await);
        assert_eq!(handle.pending(), 1);

        handle.wait_with_timeout(Duration::from_secs(1)).await.unwrap();

        let (loading, quotes) = store.state(|s| (s.loading, s.quotes.clone())).await;
        assert!(!loading);
        assert_eq!(quotes, vec![7, 8]);
        assert_eq!(store.pending_effects(), 0);
    }

    #[tokio::test]
    async fn test_parallel_requests_merge_in_arrival_order() {
        let store = store();

        let mut handle = store.send(QuoteAction::FetchAll).await.unwrap();
        handle.wait_with_timeout(Duration::from_secs(1)).await.unwrap();

        let (quotes, error) = store.state(|s| (s.quotes.clone(), s.error.clone())).await;
        assert!(quotes.is_empty());
        assert_eq!(error.as_deref(), Some("Failed to fetch quotes"));
    }

    #[tokio::test]
    async fn test_later_response_overwrites_earlier_one() {
        let store = store();

        let mut slow = store.send(fetch(40, &[1])).await.unwrap();
        let mut fast = store.send(fetch(5, &[2, 3])).await.unwrap();
        fast.wait_with_timeout(Duration::from_secs(1)).await.unwrap();
        assert_eq!(store.state(|s| s.quotes.clone()).await, vec![2, 3]);

        slow.wait_with_timeout(Duration::from_secs(1)).await.unwrap();
        assert_eq!(store.state(|s| s.quotes.clone()).await, vec![1]);
    }

    #[tokio::test]
    async fn test_send_and_wait_for_returns_matching_result() {
        let store = store();

        let result = store
            .send_and_wait_for(
                fetch(5, &[4]),
                |a| matches!(a, QuoteAction::Fetched { .. }),
                Duration::from_secs(1),
            )
            .await
            .unwrap();

        assert!(matches!(result, QuoteAction::Fetched { quotes } if quotes == vec![4]));
    }

    #[tokio::test]
    async fn test_send_and_wait_for_times_out() {
        let store = store();

        let outcome = store
            .send_and_wait_for(
                fetch(200, &[4]),
                |a| matches!(a, QuoteAction::Fetched { .. }),
                Duration::from_millis(10),
            )
            .await;

        assert_eq!(outcome.unwrap_err(), StoreError::Timeout);
    }

    #[tokio::test]
    async fn test_panicking_request_still_settles_handle() {
        let store = store();

        let mut handle = store.send(QuoteAction::Broken).await.unwrap();
        handle.wait_with_timeout(Duration::from_secs(1)).await.unwrap();

        let _ = store.send(QuoteAction::Clear).await.unwrap();
        assert!(store.state(|s| s.quotes.is_empty()).await);
        assert_eq!(store.pending_effects(), 0);
    }

    #[tokio::test]
    async fn test_shutdown_waits_for_open_request() {
        let store = store();

        let _ = store.send(fetch(30, &[9])).await.unwrap();
        store.shutdown(Duration::from_secs(1)).await.unwrap();

        assert_eq!(store.state(|s| s.quotes.clone()).await, vec![9]);
        let refused = store.send(QuoteAction::Clear).await;
        assert_eq!(refused.unwrap_err(), StoreError::ShutdownInProgress);
    }

    #[tokio::test]
    async fn test_shutdown_deadline_reports_open_requests() {
        let store = store();

        let _ = store.send(fetch(500, &[1])).await.unwrap();
        let outcome = store.shutdown(Duration::from_millis(30)).await;

        assert_eq!(outcome.unwrap_err(), StoreError::ShutdownTimeout(1));
    }

    #[tokio::test]
    async fn test_completed_handle_returns_immediately() {
        let mut handle = EffectHandle::completed();
        assert_eq!(handle.pending(), 0);
        handle.wait_with_timeout(Duration::from_millis(10)).await.unwrap();
    }
}
