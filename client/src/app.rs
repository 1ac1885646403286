//! The app store: every slice scoped into one state and one action type.

use crate::environment::ClientEnvironment;
use crate::slices::{
    AuthAction, AuthReducer, AuthState, BookingAction, BookingReducer, BookingState, ChatAction,
    ChatReducer, ChatState, FlightAction, FlightReducer, FlightState, HotelAction, HotelReducer,
    HotelState, PackageAction, PackageReducer, PackageState, PaymentAction, PaymentReducer,
    PaymentState,
};
use travel_desk_api::types::{Booking, Flight, Hotel, TravelPackage};
use travel_desk_api::{AuthApi, CatalogApi, ChatApi, PaymentApi};
use travel_desk_core::composition::{CombinedReducer, combine_reducers, scope_reducer};
use travel_desk_core::request::Phase;
use travel_desk_runtime::Store;

/// Everything a backend must serve for the full console
pub trait Backend:
    AuthApi
    + CatalogApi<Hotel>
    + CatalogApi<TravelPackage>
    + CatalogApi<Flight>
    + CatalogApi<Booking>
    + PaymentApi
    + ChatApi
    + Clone
    + 'static
{
}

impl<B> Backend for B where
    B: AuthApi
        + CatalogApi<Hotel>
        + CatalogApi<TravelPackage>
        + CatalogApi<Flight>
        + CatalogApi<Booking>
        + PaymentApi
        + ChatApi
        + Clone
        + 'static
{
}

/// State of the whole console, one field per slice
#[derive(Clone, Debug, Default)]
pub struct AppState {
    /// Session
    pub auth: AuthState,
    /// Hotel catalog
    pub hotels: HotelState,
    /// Package catalog
    pub packages: PackageState,
    /// Flight catalog
    pub flights: FlightState,
    /// Bookings
    pub bookings: BookingState,
    /// Payments
    pub payment: PaymentState,
    /// Chat
    pub chat: ChatState,
}

impl AppState {
    /// Slice errors currently shown, as `(slice, message)`
    #[must_use]
    pub fn errors(&self) -> Vec<(&'static str, &str)> {
        [
            ("auth", self.auth.status.error()),
            ("hotels", self.hotels.error()),
            ("packages", self.packages.error()),
            ("flights", self.flights.error()),
            ("bookings", self.bookings.error()),
            ("payment", self.payment.status.error()),
            ("chat", self.chat.status.error()),
        ]
        .into_iter()
        .filter_map(|(slice, error)| error.map(|e| (slice, e)))
        .collect()
    }
}

/// Every action of the console, tagged by slice
#[derive(Clone, Debug)]
pub enum AppAction {
    /// Auth slice
    Auth(AuthAction),
    /// Hotel catalog
    Hotels(HotelAction),
    /// Package catalog
    Packages(PackageAction),
    /// Flight catalog
    Flights(FlightAction),
    /// Bookings
    Bookings(BookingAction),
    /// Payments
    Payment(PaymentAction),
    /// Chat
    Chat(ChatAction),
}

impl AppAction {
    /// Name of the slice the action belongs to
    #[must_use]
    pub const fn slice(&self) -> &'static str {
        match self {
            Self::Auth(_) => "auth",
            Self::Hotels(_) => "hotels",
            Self::Packages(_) => "packages",
            Self::Flights(_) => "flights",
            Self::Bookings(_) => "bookings",
            Self::Payment(_) => "payment",
            Self::Chat(_) => "chat",
        }
    }

    /// Request phase of the wrapped slice action
    #[must_use]
    pub const fn phase(&self) -> Option<Phase> {
        match self {
            Self::Auth(action) => action.phase(),
            Self::Hotels(action) => action.phase(),
            Self::Packages(action) => action.phase(),
            Self::Flights(action) => action.phase(),
            Self::Bookings(action) => action.phase(),
            Self::Payment(action) => action.phase(),
            Self::Chat(action) => action.phase(),
        }
    }

    /// Whether this is a fulfilled or rejected result
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        matches!(self.phase(), Some(Phase::Fulfilled | Phase::Rejected))
    }

    /// Whether this is a rejected result
    #[must_use]
    pub const fn is_rejected(&self) -> bool {
        matches!(self.phase(), Some(Phase::Rejected))
    }
}

/// The app reducer over backend `B`
pub type AppReducer<B> = CombinedReducer<AppState, AppAction, ClientEnvironment<B>>;

/// The app store over backend `B`
pub type AppStore<B> = Store<AppState, AppAction, ClientEnvironment<B>, AppReducer<B>>;

/// Build the app reducer: every slice reducer scoped into [`AppState`]
#[must_use]
pub fn app_reducer<B: Backend>() -> AppReducer<B> {
    combine_reducers(vec![
        Box::new(scope_reducer(
            AuthReducer::<B>::new(),
            |s: &mut AppState| &mut s.auth,
            |a: AppAction| match a {
                AppAction::Auth(a) => Some(a),
                _ => None,
            },
            AppAction::Auth,
        )),
        Box::new(scope_reducer(
            HotelReducer::<B>::new(),
            |s: &mut AppState| &mut s.hotels,
            |a: AppAction| match a {
                AppAction::Hotels(a) => Some(a),
                _ => None,
            },
            AppAction::Hotels,
        )),
        Box::new(scope_reducer(
            PackageReducer::<B>::new(),
            |s: &mut AppState| &mut s.packages,
            |a: AppAction| match a {
                AppAction::Packages(a) => Some(a),
                _ => None,
            },
            AppAction::Packages,
        )),
        Box::new(scope_reducer(
            FlightReducer::<B>::new(),
            |s: &mut AppState| &mut s.flights,
            |a: AppAction| match a {
                AppAction::Flights(a) => Some(a),
                _ => None,
            },
            AppAction::Flights,
        )),
        Box::new(scope_reducer(
            BookingReducer::<B>::new(),
            |s: &mut AppState| &mut s.bookings,
            |a: AppAction| match a {
                AppAction::Bookings(a) => Some(a),
                _ => None,
            },
            AppAction::Bookings,
        )),
        Box::new(scope_reducer(
            PaymentReducer::<B>::new(),
            |s: &mut AppState| &mut s.payment,
            |a: AppAction| match a {
                AppAction::Payment(a) => Some(a),
                _ => None,
            },
            AppAction::Payment,
        )),
        Box::new(scope_reducer(
            ChatReducer::<B>::new(),
            |s: &mut AppState| &mut s.chat,
            |a: AppAction| match a {
                AppAction::Chat(a) => Some(a),
                _ => None,
            },
            AppAction::Chat,
        )),
    ])
}

/// Create the app store with empty state
#[must_use]
pub fn app_store<B: Backend>(environment: ClientEnvironment<B>) -> AppStore<B> {
    Store::new(AppState::default(), app_reducer(), environment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use travel_desk_api::mocks::MockBackend;
    use travel_desk_api::types::ListQuery;
    use travel_desk_core::reducer::Reducer;
    use travel_desk_testing::test_clock;

    fn env() -> ClientEnvironment<MockBackend> {
        ClientEnvironment::with_clock(MockBackend::new(), Arc::new(test_clock()))
    }

    #[test]
    fn test_app_reducer_routes_to_one_slice() {
        let reducer = app_reducer::<MockBackend>();
        let mut state = AppState::default();

        let effects = reducer.reduce(
            &mut state,
            AppAction::Flights(FlightAction::Fetch {
                query: ListQuery::first_page(10),
            }),
            &env(),
        );

        assert_eq!(effects.len(), 1);
        assert!(state.flights.is_fetching());
        assert!(!state.hotels.is_fetching());
        assert!(!state.payment.status.is_busy());
    }

    #[test]
    fn test_errors_lists_failing_slices() {
        let reducer = app_reducer::<MockBackend>();
        let mut state = AppState::default();

        let _ = reducer.reduce(
            &mut state,
            AppAction::Payment(PaymentAction::HistoryFailed { message: None }),
            &env(),
        );
        let _ = reducer.reduce(
            &mut state,
            AppAction::Chat(ChatAction::SendFailed {
                message: Some("Receiver not found".to_string()),
            }),
            &env(),
        );

        assert_eq!(
            state.errors(),
            vec![
                ("payment", "Failed to fetch payment history"),
                ("chat", "Receiver not found")
            ]
        );
    }

    #[test]
    fn test_phase_delegates_to_slice() {
        assert_eq!(AppAction::Auth(AuthAction::FetchProfile).phase(), Some(Phase::Pending));
        assert!(AppAction::Chat(ChatAction::UnreadCountFetched { count: 2 }).is_settled());
        assert!(AppAction::Hotels(HotelAction::FetchFailed { message: None }).is_rejected());
        assert_eq!(AppAction::Hotels(HotelAction::ClearError).phase(), None);
    }
}
