//! Dependencies injected into every slice reducer.

use std::sync::Arc;
use travel_desk_core::environment::{Clock, SystemClock};

/// Backend handle plus clock, shared by all slices of the app store
///
/// `B` is [`ApiClient`](travel_desk_api::ApiClient) in production and an
/// in-memory backend in tests.
pub struct ClientEnvironment<B> {
    /// Backend the request effects call
    pub api: B,
    /// Time source for fetch timestamps
    pub clock: Arc<dyn Clock>,
}

impl<B> ClientEnvironment<B> {
    /// Environment with the wall clock
    #[must_use]
    pub fn new(api: B) -> Self {
        Self::with_clock(api, Arc::new(SystemClock))
    }

    /// Environment with an explicit clock
    #[must_use]
    pub fn with_clock(api: B, clock: Arc<dyn Clock>) -> Self {
        Self { api, clock }
    }
}

impl<B: Clone> Clone for ClientEnvironment<B> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<B: std::fmt::Debug> std::fmt::Debug for ClientEnvironment<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientEnvironment")
            .field("api", &self.api)
            .field("now", &self.clock.now())
            .finish()
    }
}
