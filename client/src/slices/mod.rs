//! Store slices.
//!
//! Each slice owns its records, its current record, one loading flag per
//! operation kind and a single last error. Every request goes through the
//! pending/fulfilled/rejected lifecycle of [`travel_desk_core::request`].

pub mod auth;
pub mod catalog;
pub mod chat;
pub mod payment;

pub use auth::{AuthAction, AuthOp, AuthReducer, AuthState};
pub use catalog::{
    BookingAction, BookingReducer, BookingState, CatalogAction, CatalogOp, CatalogReducer,
    CatalogState, FlightAction, FlightReducer, FlightState, HotelAction, HotelReducer, HotelState,
    PackageAction, PackageReducer, PackageState,
};
pub use chat::{ChatAction, ChatOp, ChatReducer, ChatState};
pub use payment::{PaymentAction, PaymentOp, PaymentReducer, PaymentState};
