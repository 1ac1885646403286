//! Client-visible routes and the store actions tied to them.
//!
//! Rendering and navigation live outside this crate. What is modeled here is
//! the contract between a route and the store: which requests a screen issues
//! when it opens, and which `Clear…` action runs when the user leaves an edit
//! screen.

use crate::app::AppAction;
use crate::slices::{
    AuthAction, BookingAction, ChatAction, FlightAction, HotelAction, PackageAction, PaymentAction,
};
use std::fmt;
use travel_desk_api::types::{FlightId, HotelId, ListQuery, PackageId};

/// A screen of the agent console
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    /// `/login`
    Login,
    /// `/register`
    Register,
    /// `/verify-email`
    VerifyEmail,
    /// `/agent/dashboard`
    Dashboard,
    /// `/agent/hotels`
    Hotels,
    /// `/agent/hotels/add`
    AddHotel,
    /// `/agent/hotels/edit/:id`
    EditHotel(HotelId),
    /// `/agent/packages`
    Packages,
    /// `/agent/packages/add`
    AddPackage,
    /// `/agent/packages/edit/:id`
    EditPackage(PackageId),
    /// `/agent/flights`
    Flights,
    /// `/agent/flights/add`
    AddFlight,
    /// `/agent/flights/edit/:id`
    EditFlight(FlightId),
    /// `/agent/bookings`
    Bookings,
    /// `/agent/chat`
    Chat,
    /// `/agent/payments`
    Payments,
}

impl Route {
    /// URL path of the route
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Login => "/login".to_string(),
            Self::Register => "/register".to_string(),
            Self::VerifyEmail => "/verify-email".to_string(),
            Self::Dashboard => "/agent/dashboard".to_string(),
            Self::Hotels => "/agent/hotels".to_string(),
            Self::AddHotel => "/agent/hotels/add".to_string(),
            Self::EditHotel(id) => format!("/agent/hotels/edit/{id}"),
            Self::Packages => "/agent/packages".to_string(),
            Self::AddPackage => "/agent/packages/add".to_string(),
            Self::EditPackage(id) => format!("/agent/packages/edit/{id}"),
            Self::Flights => "/agent/flights".to_string(),
            Self::AddFlight => "/agent/flights/add".to_string(),
            Self::EditFlight(id) => format!("/agent/flights/edit/{id}"),
            Self::Bookings => "/agent/bookings".to_string(),
            Self::Chat => "/agent/chat".to_string(),
            Self::Payments => "/agent/payments".to_string(),
        }
    }

    /// Parse a URL path; a trailing slash is ignored
    #[must_use]
    pub fn parse(path: &str) -> Option<Self> {
        let path = path.trim();
        let path = path.strip_suffix('/').filter(|p| !p.is_empty()).unwrap_or(path);
        let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();

        match segments.as_slice() {
            ["login"] => Some(Self::Login),
            ["register"] => Some(Self::Register),
            ["verify-email"] => Some(Self::VerifyEmail),
            ["agent", "dashboard"] => Some(Self::Dashboard),
            ["agent", "hotels"] => Some(Self::Hotels),
            ["agent", "hotels", "add"] => Some(Self::AddHotel),
            ["agent", "hotels", "edit", id] if is_record_id(id) => Some(Self::EditHotel(HotelId::from(*id))),
            ["agent", "packages"] => Some(Self::Packages),
            ["agent", "packages", "add"] => Some(Self::AddPackage),
            ["agent", "packages", "edit", id] if is_record_id(id) => {
                Some(Self::EditPackage(PackageId::from(*id)))
            },
            ["agent", "flights"] => Some(Self::Flights),
            ["agent", "flights", "add"] => Some(Self::AddFlight),
            ["agent", "flights", "edit", id] if is_record_id(id) => Some(Self::EditFlight(FlightId::from(*id))),
            ["agent", "bookings"] => Some(Self::Bookings),
            ["agent", "chat"] => Some(Self::Chat),
            ["agent", "payments"] => Some(Self::Payments),
            _ => None,
        }
    }

    /// Whether the screen needs a session
    #[must_use]
    pub const fn requires_auth(&self) -> bool {
        !matches!(self, Self::Login | Self::Register | Self::VerifyEmail)
    }

    /// Requests the screen issues when it opens
    #[must_use]
    pub fn on_enter(&self, page_size: u32) -> Vec<AppAction> {
        let first_page = ListQuery::first_page(page_size);

        match self {
            Self::Login | Self::Register | Self::VerifyEmail => Vec::new(),
            Self::AddHotel | Self::AddPackage | Self::AddFlight => Vec::new(),
            Self::Dashboard => vec![
                AppAction::Auth(AuthAction::FetchProfile),
                AppAction::Hotels(HotelAction::Fetch { query: first_page.clone() }),
                AppAction::Packages(PackageAction::Fetch { query: first_page.clone() }),
                AppAction::Flights(FlightAction::Fetch { query: first_page.clone() }),
                AppAction::Bookings(BookingAction::Fetch { query: first_page }),
                AppAction::Payment(PaymentAction::FetchHistory),
                AppAction::Chat(ChatAction::FetchUnreadCount),
            ],
            Self::Hotels => vec![AppAction::Hotels(HotelAction::Fetch { query: first_page })],
            Self::EditHotel(id) => vec![AppAction::Hotels(HotelAction::Load { id: id.clone() })],
            Self::Packages => vec![AppAction::Packages(PackageAction::Fetch { query: first_page })],
            Self::EditPackage(id) => vec![AppAction::Packages(PackageAction::Load { id: id.clone() })],
            Self::Flights => vec![AppAction::Flights(FlightAction::Fetch { query: first_page })],
            Self::EditFlight(id) => vec![AppAction::Flights(FlightAction::Load { id: id.clone() })],
            Self::Bookings => vec![AppAction::Bookings(BookingAction::Fetch { query: first_page })],
            Self::Chat => vec![
                AppAction::Chat(ChatAction::FetchConversations),
                AppAction::Chat(ChatAction::FetchUnreadCount),
            ],
            Self::Payments => vec![AppAction::Payment(PaymentAction::FetchHistory)],
        }
    }

    /// Action that clears the screen's current record when the user leaves
    #[must_use]
    pub const fn on_leave(&self) -> Option<AppAction> {
        match self {
            Self::EditHotel(_) => Some(AppAction::Hotels(HotelAction::ClearCurrent)),
            Self::EditPackage(_) => Some(AppAction::Packages(PackageAction::ClearCurrent)),
            Self::EditFlight(_) => Some(AppAction::Flights(FlightAction::ClearCurrent)),
            Self::Chat => Some(AppAction::Chat(ChatAction::CloseConversation)),
            Self::Payments => Some(AppAction::Payment(PaymentAction::ClearCurrent)),
            _ => None,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// An edit-screen id segment: non-empty, no query or fragment, not a dot segment
fn is_record_id(id: &str) -> bool {
    !id.is_empty() && !id.contains(['?', '#']) && id != "." && id != ".."
}
