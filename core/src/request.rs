//! Request-phase bookkeeping for store slices.
//!
//! Every asynchronous operation a slice performs goes through the same three
//! phases:
//!
//! 1. **pending**: the operation's loading flag is raised and the slice error is cleared
//! 2. **fulfilled**: the flag is lowered and the payload is merged into state
//! 3. **rejected**: the flag is lowered and the error is set to the server
//!    message, or to a fixed fallback when the server said nothing useful
//!
//! Flags carry "at least one in flight" semantics. Dispatching the same
//! operation twice raises the same flag twice and the first settlement lowers
//! it; there is no counting and no request fencing.

use std::collections::BTreeSet;
use std::fmt;

/// The phase of a request lifecycle an action represents
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Request dispatched, response outstanding
    Pending,
    /// Response arrived and was merged
    Fulfilled,
    /// Request failed (network or server)
    Rejected,
}

impl Phase {
    /// Returns true for `Fulfilled` and `Rejected`
    #[must_use]
    pub const fn is_settled(self) -> bool {
        matches!(self, Self::Fulfilled | Self::Rejected)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Fulfilled => write!(f, "fulfilled"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

/// Named boolean loading flags, one per operation kind
///
/// `K` is a slice-specific operation enum (e.g. `CatalogOp::FetchList`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadingFlags<K: Ord> {
    active: BTreeSet<K>,
}

impl<K: Ord + Copy> LoadingFlags<K> {
    /// Create a set with every flag lowered
    #[must_use]
    pub const fn new() -> Self {
        Self {
            active: BTreeSet::new(),
        }
    }

    /// Raise or lower the flag for `kind`
    pub fn set(&mut self, kind: K, loading: bool) {
        if loading {
            self.active.insert(kind);
        } else {
            self.active.remove(&kind);
        }
    }

    /// Whether an operation of `kind` is in flight
    #[must_use]
    pub fn is_loading(&self, kind: K) -> bool {
        self.active.contains(&kind)
    }

    /// Whether any operation is in flight
    #[must_use]
    pub fn any(&self) -> bool {
        !self.active.is_empty()
    }

    /// Operation kinds currently in flight, in `K`'s order
    pub fn active(&self) -> impl Iterator<Item = K> + '_ {
        self.active.iter().copied()
    }
}

impl<K: Ord + Copy> Default for LoadingFlags<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// Loading flags plus the slice's single nullable error
///
/// # Example
///
/// ```
/// use travel_desk_core::request::RequestStatus;
///
/// #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
/// enum Op { FetchList }
///
/// let mut status = RequestStatus::new();
/// status.pending(Op::FetchList);
/// assert!(status.is_loading(Op::FetchList));
///
/// status.rejected(Op::FetchList, None, "Failed to fetch hotels");
/// assert!(!status.is_loading(Op::FetchList));
/// assert_eq!(status.error(), Some("Failed to fetch hotels"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestStatus<K: Ord> {
    loading: LoadingFlags<K>,
    error: Option<String>,
}

impl<K: Ord + Copy> RequestStatus<K> {
    /// Create an idle status with no error
    #[must_use]
    pub const fn new() -> Self {
        Self {
            loading: LoadingFlags::new(),
            error: None,
        }
    }

    /// Enter the pending phase: raise the flag and clear the error
    pub fn pending(&mut self, kind: K) {
        self.loading.set(kind, true);
        self.error = None;
    }

    /// Enter the fulfilled phase: lower the flag
    ///
    /// The error is left alone; only [`pending`](Self::pending) clears it.
    pub fn fulfilled(&mut self, kind: K) {
        self.loading.set(kind, false);
    }

    /// Enter the rejected phase: lower the flag and record the error
    ///
    /// A missing or blank server message falls back to `fallback`.
    pub fn rejected(&mut self, kind: K, message: Option<String>, fallback: &str) {
        self.loading.set(kind, false);
        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| fallback.to_string());
        self.error = Some(message);
    }

    /// Drop the last error (e.g. when the banner is dismissed)
    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Whether an operation of `kind` is in flight
    #[must_use]
    pub fn is_loading(&self, kind: K) -> bool {
        self.loading.is_loading(kind)
    }

    /// Whether any operation is in flight
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.loading.any()
    }

    /// The loading flags
    #[must_use]
    pub const fn loading(&self) -> &LoadingFlags<K> {
        &self.loading
    }

    /// The last error, if any
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

impl<K: Ord + Copy> Default for RequestStatus<K> {
    fn default() -> Self {
        Self::new()
    }
}
