//! # Travel Desk Core
//!
//! Core traits and types for the Travel Desk client store.
//!
//! Every screen of the agent console reads from one shared store made of
//! independent slices (auth, hotels, payments, chat, ...). Each slice is an
//! owned state struct driven by a pure reducer, and every network call is an
//! [`Effect`](effect::Effect) that feeds its outcome back as an action.
//!
//! ## Core Concepts
//!
//! - **State**: Owned state of one slice (entities, current entity, loading flags, last error)
//! - **Action**: Tagged union of everything that can happen to a slice
//! - **Reducer**: Mutates its slice in place and hands back the requests to run
//! - **Effect**: Description of a request to perform (not its execution)
//! - **Environment**: Injected backend and clock
//!
//! ## Request Lifecycle
//!
//! An asynchronous operation moves its slice through `pending`, then either
//! `fulfilled` or `rejected`. [`request::RequestStatus`] keeps the loading flags
//! and the last error, [`collection::EntityCollection`] implements the merge
//! rules (replace, append, upsert, remove).
//!
//! ## Example
//!
//! ```ignore
//! use travel_desk_core::*;
//!
//! impl Reducer for HotelReducer {
//!     type State = HotelState;
//!     type Action = HotelAction;
//!     type Environment = ClientEnvironment<ApiClient>;
//!
//!     fn reduce(
//!         &self,
//!         state: &mut HotelState,
//!         action: HotelAction,
//!         env: &Self::Environment,
//!     ) -> SmallVec<[Effect<HotelAction>; 4]> {
//!         match action {
//!             HotelAction::Fetch { query } => {
//!                 state.status.pending(HotelOp::FetchList);
//!                 let api = env.api.clone();
//!                 smallvec![thunk! {
//!                     request: api.list(&query),
//!                     on_success: |page| HotelAction::Fetched { page },
//!                     on_error: |error| HotelAction::FetchFailed { message: error.server_message() },
//!                 }]
//!             }
//!             _ => SmallVec::new(),
//!         }
//!     }
//! }
//! ```

pub use chrono::{DateTime, Utc};
pub use serde::{Deserialize, Serialize};
pub use smallvec::{smallvec, SmallVec};

/// Reducer composition (combine, scope)
pub mod composition;

/// Entity collections and their merge rules
pub mod collection;

/// Request-phase bookkeeping (loading flags, last error)
pub mod request;

/// Declarative macros for building effects
pub mod effect_macros;

/// Slice logic
///
/// A reducer never talks to the network itself. It updates its state and
/// returns [`Effect`](crate::effect::Effect)s for the store to run.
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// One slice's update function
    ///
    /// # Example
    ///
    /// ```ignore
    /// impl Reducer for ChatReducer {
    ///     type State = ChatState;
    ///     type Action = ChatAction;
    ///     type Environment = ClientEnvironment<ApiClient>;
    ///
    ///     fn reduce(
    ///         &self,
    ///         state: &mut ChatState,
    ///         action: ChatAction,
    ///         env: &Self::Environment,
    ///     ) -> SmallVec<[Effect<ChatAction>; 4]> {
    ///         match action {
    ///             ChatAction::ClearError => {
    ///                 state.status.clear_error();
    ///                 SmallVec::new()
    ///             }
    ///             _ => SmallVec::new(),
    ///         }
    ///     }
    /// }
    /// ```
    pub trait Reducer {
        /// Slice state
        type State;

        /// Everything that can happen to the slice
        type Action;

        /// Backend and clock
        type Environment;

        /// Apply `action` to `state` and return the requests it starts
        ///
        /// Local actions return no effects. A pending action returns the
        /// request whose outcome comes back as a fulfilled or rejected action.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Work for the store to run after a reducer returns
pub mod effect {
    use std::future::Future;
    use std::pin::Pin;

    /// A request a reducer wants run, resolving to the action that reports
    /// its outcome
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Run effects concurrently
        ///
        /// Their result actions are fed back in completion order.
        Parallel(Vec<Effect<Action>>),

        /// Arbitrary async computation, typically one HTTP request
        ///
        /// A `Some` result is dispatched back into the store
        Future(Pin<Box<dyn Future<Output = Option<Action>> + Send>>),
    }

    impl<Action> std::fmt::Debug for Effect<Action>
    where
        Action: std::fmt::Debug,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Self::None => f.write_str("None"),
                Self::Parallel(effects) => f.debug_tuple("Parallel").field(effects).finish(),
                Self::Future(_) => f.write_str("Future(..)"),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Run `effects` side by side
        #[must_use]
        pub const fn merge(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Parallel(effects)
        }

        /// Returns true for [`Effect::None`]
        #[must_use]
        pub const fn is_none(&self) -> bool {
            matches!(self, Effect::None)
        }

        /// Lift an effect into a parent action type
        ///
        /// Used when a slice reducer is embedded into the app reducer: the
        /// slice's result actions are wrapped into the app action on the way out.
        #[must_use]
        pub fn map<B>(self, f: fn(Action) -> B) -> Effect<B>
        where
            Action: Send + 'static,
            B: Send + 'static,
        {
            match self {
                Effect::None => Effect::None,
                Effect::Parallel(effects) => {
                    Effect::Parallel(effects.into_iter().map(|effect| effect.map(f)).collect())
                },
                Effect::Future(fut) => Effect::Future(Box::pin(async move { fut.await.map(f) })),
            }
        }
    }
}

/// Injected services shared by every slice
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Source of "now" for timestamps stamped into state
    ///
    /// # Examples
    ///
    /// ```
    /// use travel_desk_core::environment::{Clock, SystemClock};
    ///
    /// let clock = SystemClock;
    /// let _now = clock.now();
    /// ```
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
}
