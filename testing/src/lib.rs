//! # Travel Desk Testing
//!
//! Testing utilities and helpers for Travel Desk reducers.
//!
//! This crate provides:
//! - [`ReducerTest`], a Given/When/Then harness for slice reducers
//! - Effect assertions
//! - [`settle`], which runs a reducer's request effects without a store
//! - A deterministic [`FixedClock`]
//!
//! ## Example
//!
//! ```ignore
//! use travel_desk_testing::{settle, ReducerTest};
//!
//! #[tokio::test]
//! async fn test_fetch_hotels() {
//!     let env = ClientEnvironment::new(MockBackend::new());
//!     let (mut state, effects) = ReducerTest::new(HotelReducer::new())
//!         .with_env(env.clone())
//!         .given_state(HotelState::default())
//!         .when_action(CatalogAction::Fetch { query: ListQuery::default() })
//!         .run();
//!
//!     for action in settle(effects).await {
//!         HotelReducer::new().reduce(&mut state, action, &env);
//!     }
//!     assert!(state.status.error().is_none());
//! }
//! ```

use chrono::{DateTime, Utc};
use futures::future::join_all;
use travel_desk_core::effect::Effect;
use travel_desk_core::environment::Clock;

mod reducer_test;

pub use reducer_test::{ReducerTest, assertions};

/// Stand-ins for environment services
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Clock frozen at one instant
    ///
    /// # Example
    ///
    /// ```
    /// use travel_desk_testing::mocks::FixedClock;
    /// use travel_desk_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Freeze at `time`
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Clock frozen at 2025-03-15 12:00:00 UTC
    ///
    /// # Panics
    ///
    /// Only if the literal timestamp below stops parsing.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-03-15T12:00:00Z")
                .expect("literal RFC 3339 timestamp")
                .with_timezone(&Utc),
        )
    }
}

pub use mocks::{FixedClock, test_clock};

/// Execute effects the way the store would, without feeding them back
///
/// Futures are awaited concurrently and their result actions are returned in
/// effect order. `Parallel` effects are flattened.
pub async fn settle<A>(effects: impl IntoIterator<Item = Effect<A>>) -> Vec<A> {
    let mut futures = Vec::new();
    let mut pending: Vec<Effect<A>> = effects.into_iter().collect();

    while let Some(effect) = pending.pop() {
        match effect {
            Effect::None => {},
            Effect::Future(fut) => futures.push(fut),
            Effect::Parallel(inner) => pending.extend(inner),
        }
    }
    futures.reverse();

    join_all(futures).await.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock() {
        let clock = test_clock();
        assert_eq!(clock.now(), clock.now());
        assert_eq!(clock.now().to_rfc3339(), "2025-03-15T12:00:00+00:00");
    }

    #[tokio::test]
    async fn test_settle_preserves_effect_order() {
        let effects: Vec<Effect<u8>> = vec![
            Effect::Future(Box::pin(async { Some(1) })),
            Effect::None,
            Effect::Future(Box::pin(async { None })),
            Effect::Future(Box::pin(async { Some(3) })),
        ];

        assert_eq!(settle(effects).await, vec![1, 3]);
    }
}
