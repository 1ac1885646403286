//! Tests for #[derive(Action)] macro

use travel_desk_core::request::Phase;
use travel_desk_macros::Action;

#[derive(Action, Clone, Debug, PartialEq)]
enum HotelAction {
    #[pending]
    FetchHotels { page: u32 },

    #[fulfilled]
    HotelsFetched { ids: Vec<u32> },

    #[rejected]
    HotelsFailed { message: Option<String> },

    #[pending]
    DeleteHotel(u32),

    #[fulfilled]
    HotelDeleted(u32),

    #[rejected]
    DeleteFailed(Option<String>),

    ClearError,

    SetCurrent { id: Option<u32> },
}

#[derive(Action, Clone, Debug, PartialEq)]
enum Wrapped<T> {
    #[pending]
    Load,

    #[fulfilled]
    Loaded(T),
}

#[test]
fn test_pending_variant() {
    let action = HotelAction::FetchHotels { page: 1 };

    assert_eq!(action.phase(), Some(Phase::Pending));
    assert!(action.is_pending());
    assert!(!action.is_settled());
}

#[test]
fn test_fulfilled_variant() {
    let action = HotelAction::HotelsFetched { ids: vec![1, 2] };

    assert_eq!(action.phase(), Some(Phase::Fulfilled));
    assert!(!action.is_pending());
    assert!(action.is_settled());
}

#[test]
fn test_rejected_variant() {
    let action = HotelAction::HotelsFailed { message: None };

    assert_eq!(action.phase(), Some(Phase::Rejected));
    assert!(action.is_settled());
}

#[test]
fn test_tuple_variants() {
    assert!(HotelAction::DeleteHotel(7).is_pending());
    assert_eq!(HotelAction::HotelDeleted(7).phase(), Some(Phase::Fulfilled));
    assert_eq!(
        HotelAction::DeleteFailed(Some("not found".to_string())).phase(),
        Some(Phase::Rejected)
    );
}

#[test]
fn test_local_actions_have_no_phase() {
    let locals = vec![HotelAction::ClearError, HotelAction::SetCurrent { id: Some(3) }];

    for action in locals {
        assert_eq!(action.phase(), None, "Expected local action: {action:?}");
        assert!(!action.is_pending());
        assert!(!action.is_settled());
    }
}

#[test]
fn test_variant_names() {
    assert_eq!(HotelAction::FetchHotels { page: 2 }.name(), "FetchHotels");
    assert_eq!(HotelAction::DeleteHotel(1).name(), "DeleteHotel");
    assert_eq!(HotelAction::ClearError.name(), "ClearError");
}

#[test]
fn test_generic_enum() {
    assert!(Wrapped::<String>::Load.is_pending());
    assert!(Wrapped::Loaded("x".to_string()).is_settled());
    assert_eq!(Wrapped::Loaded(1_u8).name(), "Loaded");
}
