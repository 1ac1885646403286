//! Catalog slice: hotels, packages, flights and bookings.
//!
//! The four agent catalogs share one slice shape. A list fetch replaces the
//! collection and its pagination, create appends, update upserts by id and
//! delete removes by id. [`CatalogReducer`] is generic over the record type
//! and the backend, so each catalog is a type alias.

use crate::environment::ClientEnvironment;
use chrono::{DateTime, Utc};
use smallvec::{SmallVec, smallvec};
use std::marker::PhantomData;
use travel_desk_api::types::{Booking, Flight, Hotel, ListQuery, Page, Pagination, TravelPackage};
use travel_desk_api::{CatalogApi, Resource};
use travel_desk_core::collection::EntityCollection;
use travel_desk_core::request::RequestStatus;
use travel_desk_core::{effect::Effect, reducer::Reducer, thunk};
use travel_desk_macros::Action;

/// Operation kinds of a catalog slice, one loading flag each
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CatalogOp {
    /// List fetch
    FetchList,
    /// Single-record fetch (edit screens)
    FetchOne,
    /// Create
    Create,
    /// Update
    Update,
    /// Delete
    Delete,
}

impl CatalogOp {
    /// Verb used in fallback error messages
    const fn verb(self) -> &'static str {
        match self {
            Self::FetchList | Self::FetchOne => "fetch",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }

    /// Fixed message used when the server gives none, e.g. `Failed to fetch hotels`
    #[must_use]
    pub fn fallback<T: Resource>(self) -> String {
        let noun = match self {
            Self::FetchList => T::PLURAL,
            Self::FetchOne | Self::Create | Self::Update | Self::Delete => T::SINGULAR,
        };
        format!("Failed to {} {noun}", self.verb())
    }
}

/// State of one catalog
#[derive(Clone, Debug)]
pub struct CatalogState<T: Resource> {
    /// Records of the last list fetch, plus local merges
    pub items: EntityCollection<T>,
    /// Paging metadata of the last list fetch
    pub pagination: Option<Pagination>,
    /// Query of the last list fetch
    pub query: ListQuery,
    /// Record open on the edit screen
    pub current: Option<T>,
    /// When the last list fetch was merged
    pub fetched_at: Option<DateTime<Utc>>,
    /// Loading flags and last error
    pub status: RequestStatus<CatalogOp>,
}

impl<T: Resource> Default for CatalogState<T> {
    fn default() -> Self {
        Self {
            items: EntityCollection::new(),
            pagination: None,
            query: ListQuery::default(),
            current: None,
            fetched_at: None,
            status: RequestStatus::new(),
        }
    }
}

impl<T: Resource> CatalogState<T> {
    /// Whether a list fetch is in flight
    #[must_use]
    pub fn is_fetching(&self) -> bool {
        self.status.is_loading(CatalogOp::FetchList)
    }

    /// The last error, if any
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.status.error()
    }
}

/// Actions of a catalog slice
#[derive(Action, Clone, Debug)]
pub enum CatalogAction<T: Resource> {
    /// Fetch one page of records
    #[pending]
    Fetch {
        /// Paging and search
        query: ListQuery,
    },
    /// The page arrived
    #[fulfilled]
    Fetched {
        /// Records and pagination
        page: Page<T>,
    },
    /// The list fetch failed
    #[rejected]
    FetchFailed {
        /// Server message, if any
        message: Option<String>,
    },

    /// Fetch one record into `current`
    #[pending]
    Load {
        /// Record to open
        id: T::Id,
    },
    /// The record arrived
    #[fulfilled]
    Loaded {
        /// The record
        item: T,
    },
    /// The record fetch failed
    #[rejected]
    LoadFailed {
        /// Server message, if any
        message: Option<String>,
    },

    /// Create a record
    #[pending]
    Create {
        /// Validated form output
        draft: T::Draft,
    },
    /// The record was created
    #[fulfilled]
    Created {
        /// The stored record
        item: T,
    },
    /// Creation failed
    #[rejected]
    CreateFailed {
        /// Server message, if any
        message: Option<String>,
    },

    /// Replace the editable fields of a record
    #[pending]
    Update {
        /// Record to edit
        id: T::Id,
        /// Validated form output
        draft: T::Draft,
    },
    /// The record was updated
    #[fulfilled]
    Updated {
        /// The stored record
        item: T,
    },
    /// The update failed
    #[rejected]
    UpdateFailed {
        /// Server message, if any
        message: Option<String>,
    },

    /// Delete a record
    #[pending]
    Delete {
        /// Record to delete
        id: T::Id,
    },
    /// The record was deleted
    #[fulfilled]
    Deleted {
        /// The deleted id
        id: T::Id,
    },
    /// The deletion failed
    #[rejected]
    DeleteFailed {
        /// Server message, if any
        message: Option<String>,
    },

    /// Open a record already in the collection
    Select {
        /// Record to open
        id: T::Id,
    },
    /// Close the edit screen
    ClearCurrent,
    /// Dismiss the error banner
    ClearError,
}

/// Reducer of a catalog slice
pub struct CatalogReducer<T, B> {
    _marker: PhantomData<fn() -> (T, B)>,
}

impl<T, B> CatalogReducer<T, B> {
    /// Create a new catalog reducer
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T, B> Default for CatalogReducer<T, B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, B> CatalogReducer<T, B>
where
    T: Resource,
{
    fn reject(state: &mut CatalogState<T>, op: CatalogOp, message: Option<String>) {
        tracing::warn!(
            resource = T::PLURAL,
            ?op,
            message = message.as_deref().unwrap_or_default(),
            "Catalog request rejected"
        );
        state.status.rejected(op, message, &op.fallback::<T>());
    }
}

impl<T, B> Reducer for CatalogReducer<T, B>
where
    T: Resource,
    B: CatalogApi<T> + Clone + 'static,
{
    type State = CatalogState<T>;
    type Action = CatalogAction<T>;
    type Environment = ClientEnvironment<B>;

    #[allow(clippy::too_many_lines)] // one arm per lifecycle step
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ═══════════════════════════════════════════════════════════════
            // List fetch: replace
            // ═══════════════════════════════════════════════════════════════
            CatalogAction::Fetch { query } => {
                state.status.pending(CatalogOp::FetchList);
                state.query = query.clone();

                let api = env.api.clone();
                smallvec![thunk! {
                    request: CatalogApi::<T>::list(&api, &query),
                    on_success: |page| CatalogAction::Fetched { page },
                    on_error: |error| CatalogAction::FetchFailed { message: error.server_message() },
                }]
            },
            CatalogAction::Fetched { page } => {
                state.status.fulfilled(CatalogOp::FetchList);
                state.items.replace(page.items);
                state.pagination = page.pagination;
                state.fetched_at = Some(env.clock.now());
                SmallVec::new()
            },
            CatalogAction::FetchFailed { message } => {
                Self::reject(state, CatalogOp::FetchList, message);
                state.items.clear();
                state.pagination = None;
                SmallVec::new()
            },

            // ═══════════════════════════════════════════════════════════════
            // Detail fetch: current
            // ═══════════════════════════════════════════════════════════════
            CatalogAction::Load { id } => {
                state.status.pending(CatalogOp::FetchOne);

                let api = env.api.clone();
                smallvec![thunk! {
                    request: CatalogApi::<T>::get(&api, &id),
                    on_success: |item| CatalogAction::Loaded { item },
                    on_error: |error| CatalogAction::LoadFailed { message: error.server_message() },
                }]
            },
            CatalogAction::Loaded { item } => {
                state.status.fulfilled(CatalogOp::FetchOne);
                state.current = Some(item);
                SmallVec::new()
            },
            CatalogAction::LoadFailed { message } => {
                Self::reject(state, CatalogOp::FetchOne, message);
                state.current = None;
                SmallVec::new()
            },

            // ═══════════════════════════════════════════════════════════════
            // Create: append
            // ═══════════════════════════════════════════════════════════════
            CatalogAction::Create { draft } => {
                state.status.pending(CatalogOp::Create);

                let api = env.api.clone();
                smallvec![thunk! {
                    request: CatalogApi::<T>::create(&api, &draft),
                    on_success: |item| CatalogAction::Created { item },
                    on_error: |error| CatalogAction::CreateFailed { message: error.server_message() },
                }]
            },
            CatalogAction::Created { item } => {
                state.status.fulfilled(CatalogOp::Create);
                tracing::info!(resource = T::SINGULAR, id = %item.id(), "Record created");
                state.items.append(item);
                SmallVec::new()
            },
            CatalogAction::CreateFailed { message } => {
                Self::reject(state, CatalogOp::Create, message);
                SmallVec::new()
            },

            // ═══════════════════════════════════════════════════════════════
            // Update: upsert
            // ═══════════════════════════════════════════════════════════════
            CatalogAction::Update { id, draft } => {
                state.status.pending(CatalogOp::Update);

                let api = env.api.clone();
                smallvec![thunk! {
                    request: CatalogApi::<T>::update(&api, &id, &draft),
                    on_success: |item| CatalogAction::Updated { item },
                    on_error: |error| CatalogAction::UpdateFailed { message: error.server_message() },
                }]
            },
            CatalogAction::Updated { item } => {
                state.status.fulfilled(CatalogOp::Update);
                if state.current.as_ref().is_some_and(|current| current.id() == item.id()) {
                    state.current = Some(item.clone());
                }
                state.items.upsert(item);
                SmallVec::new()
            },
            CatalogAction::UpdateFailed { message } => {
                Self::reject(state, CatalogOp::Update, message);
                SmallVec::new()
            },

            // ═══════════════════════════════════════════════════════════════
            // Delete: remove
            // ═══════════════════════════════════════════════════════════════
            CatalogAction::Delete { id } => {
                state.status.pending(CatalogOp::Delete);

                let api = env.api.clone();
                smallvec![thunk! {
                    request: CatalogApi::<T>::delete(&api, &id),
                    on_success: |id| CatalogAction::Deleted { id },
                    on_error: |error| CatalogAction::DeleteFailed { message: error.server_message() },
                }]
            },
            CatalogAction::Deleted { id } => {
                state.status.fulfilled(CatalogOp::Delete);
                state.items.remove(&id);
                if state.current.as_ref().is_some_and(|current| current.id() == &id) {
                    state.current = None;
                }
                SmallVec::new()
            },
            CatalogAction::DeleteFailed { message } => {
                Self::reject(state, CatalogOp::Delete, message);
                SmallVec::new()
            },

            // ═══════════════════════════════════════════════════════════════
            // Local
            // ═══════════════════════════════════════════════════════════════
            CatalogAction::Select { id } => {
                state.current = state.items.get(&id).cloned();
                SmallVec::new()
            },
            CatalogAction::ClearCurrent => {
                state.current = None;
                SmallVec::new()
            },
            CatalogAction::ClearError => {
                state.status.clear_error();
                SmallVec::new()
            },
        }
    }
}

/// Hotel catalog state
pub type HotelState = CatalogState<Hotel>;
/// Hotel catalog action
pub type HotelAction = CatalogAction<Hotel>;
/// Hotel catalog reducer
pub type HotelReducer<B> = CatalogReducer<Hotel, B>;

/// Package catalog state
pub type PackageState = CatalogState<TravelPackage>;
/// Package catalog action
pub type PackageAction = CatalogAction<TravelPackage>;
/// Package catalog reducer
pub type PackageReducer<B> = CatalogReducer<TravelPackage, B>;

/// Flight catalog state
pub type FlightState = CatalogState<Flight>;
/// Flight catalog action
pub type FlightAction = CatalogAction<Flight>;
/// Flight catalog reducer
pub type FlightReducer<B> = CatalogReducer<Flight, B>;

/// Booking catalog state
pub type BookingState = CatalogState<Booking>;
/// Booking catalog action
pub type BookingAction = CatalogAction<Booking>;
/// Booking catalog reducer
pub type BookingReducer<B> = CatalogReducer<Booking, B>;
