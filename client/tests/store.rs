//! Store integration tests against the in-memory backend
//!
//! These run the full app store: reducer, spawned request effects and the
//! action broadcast, with `MockBackend` standing in for the HTTP API.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use std::sync::Arc;
use std::time::Duration;
use travel_desk_api::ApiError;
use travel_desk_api::mocks::MockBackend;
use travel_desk_api::types::{Hotel, HotelDraft, HotelId, ListQuery, LoginRequest, Role, User, UserId};
use travel_desk_client::app::{AppAction, AppStore, app_store};
use travel_desk_client::environment::ClientEnvironment;
use travel_desk_client::slices::{AuthAction, HotelAction};
use travel_desk_runtime::StoreError;
use travel_desk_testing::test_clock;

const WAIT: Duration = Duration::from_secs(5);

fn hotel(id: &str, city: &str) -> Hotel {
    Hotel {
        id: HotelId::new(id),
        name: format!("Hotel {id}"),
        city: city.to_string(),
        address: String::new(),
        description: String::new(),
        price_per_night: 2500.0,
        rating: 4.0,
        amenities: Vec::new(),
        images: Vec::new(),
        rooms_available: 5,
        created_at: None,
    }
}

fn setup(hotels: Vec<Hotel>) -> (MockBackend, AppStore<MockBackend>) {
    let backend = MockBackend::new();
    backend.seed(hotels);
    let env = ClientEnvironment::with_clock(backend.clone(), Arc::new(test_clock()));
    (backend, app_store(env))
}

/// Send `action`, wait until its requests are merged and return the last result action
async fn send(store: &AppStore<MockBackend>, action: AppAction) -> AppAction {
    let mut results = store.subscribe_actions();
    let mut handle = store.send(action).await.expect("store accepts actions");
    handle
        .wait_with_timeout(WAIT)
        .await
        .expect("request should settle");

    let mut outcome = None;
    while let Ok(action) = results.try_recv() {
        if action.is_settled() {
            outcome = Some(action);
        }
    }
    outcome.expect("request produced a result")
}

async fn fetch_hotels(store: &AppStore<MockBackend>) -> AppAction {
    send(
        store,
        AppAction::Hotels(HotelAction::Fetch {
            query: ListQuery::first_page(10),
        }),
    )
    .await
}

async fn hotel_ids(store: &AppStore<MockBackend>) -> Vec<String> {
    store
        .state(|s| s.hotels.items.iter().map(|h| h.id.to_string()).collect())
        .await
}

#[tokio::test]
async fn test_fetch_replaces_collection() {
    let (_backend, store) = setup(vec![hotel("1", "Goa"), hotel("2", "Jaipur")]);

    let outcome = fetch_hotels(&store).await;

    assert!(matches!(outcome, AppAction::Hotels(HotelAction::Fetched { .. })));
    let (ids, fetching, error, total) = store
        .state(|s| {
            (
                s.hotels.items.ids(),
                s.hotels.is_fetching(),
                s.hotels.error().map(str::to_string),
                s.hotels.pagination.as_ref().map(|p| p.total),
            )
        })
        .await;
    assert_eq!(ids, vec![HotelId::new("1"), HotelId::new("2")]);
    assert!(!fetching);
    assert_eq!(error, None);
    assert_eq!(total, Some(2));
}

#[tokio::test]
async fn test_failed_fetch_surfaces_server_message_without_stale_data() {
    let (backend, store) = setup(vec![hotel("1", "Goa")]);
    fetch_hotels(&store).await;

    backend.fail_with(ApiError::Server {
        status: 503,
        message: Some("Database unavailable".to_string()),
    });
    let outcome = fetch_hotels(&store).await;

    assert!(outcome.is_rejected());
    let (empty, fetching, error) = store
        .state(|s| {
            (
                s.hotels.items.is_empty(),
                s.hotels.is_fetching(),
                s.hotels.error().map(str::to_string),
            )
        })
        .await;
    assert!(empty);
    assert!(!fetching);
    assert_eq!(error.as_deref(), Some("Database unavailable"));
}

#[tokio::test]
async fn test_failure_without_message_uses_fallback() {
    let (backend, store) = setup(Vec::new());
    backend.fail_with(ApiError::Network("connection refused".to_string()));

    fetch_hotels(&store).await;

    let error = store.state(|s| s.hotels.error().map(str::to_string)).await;
    assert_eq!(error.as_deref(), Some("Failed to fetch hotels"));
}

#[tokio::test]
async fn test_retry_after_failure_clears_error() {
    let (backend, store) = setup(vec![hotel("1", "Goa")]);
    backend.fail_with(ApiError::Network("timeout".to_string()));
    fetch_hotels(&store).await;

    backend.recover();
    fetch_hotels(&store).await;

    let error = store.state(|s| s.hotels.error().map(str::to_string)).await;
    assert_eq!(error, None);
    assert_eq!(hotel_ids(&store).await, vec!["1"]);
}

#[tokio::test]
async fn test_delete_removes_by_id() {
    let (_backend, store) = setup(vec![hotel("3", "Goa"), hotel("7", "Agra"), hotel("9", "Pune")]);
    fetch_hotels(&store).await;

    let outcome = send(
        &store,
        AppAction::Hotels(HotelAction::Delete {
            id: HotelId::new("7"),
        }),
    )
    .await;

    assert!(matches!(outcome, AppAction::Hotels(HotelAction::Deleted { .. })));
    assert_eq!(hotel_ids(&store).await, vec!["3", "9"]);
}

#[tokio::test]
async fn test_deleting_missing_id_leaves_collection() {
    let (_backend, store) = setup(vec![hotel("3", "Goa"), hotel("9", "Pune")]);
    fetch_hotels(&store).await;

    let outcome = send(
        &store,
        AppAction::Hotels(HotelAction::Delete {
            id: HotelId::new("42"),
        }),
    )
    .await;

    assert!(outcome.is_rejected());
    assert_eq!(hotel_ids(&store).await, vec!["3", "9"]);
    let error = store.state(|s| s.hotels.error().map(str::to_string)).await;
    assert_eq!(error.as_deref(), Some("No hotel with id 42"));
}

#[tokio::test]
async fn test_create_appends_and_failed_create_keeps_collection() {
    let (backend, store) = setup(vec![hotel("1", "Goa")]);
    fetch_hotels(&store).await;

    let draft = HotelDraft {
        name: "Snow Peak".to_string(),
        city: "Manali".to_string(),
        address: String::new(),
        description: String::new(),
        price_per_night: 5200.0,
        rating: 4.6,
        amenities: vec!["heater".to_string()],
        images: Vec::new(),
        rooms_available: 2,
    };
    send(&store, AppAction::Hotels(HotelAction::Create { draft: draft.clone() })).await;

    let names: Vec<String> = store
        .state(|s| s.hotels.items.iter().map(|h| h.name.clone()).collect())
        .await;
    assert_eq!(names, vec!["Hotel 1", "Snow Peak"]);

    backend.fail_with(ApiError::Network("offline".to_string()));
    send(&store, AppAction::Hotels(HotelAction::Create { draft })).await;

    let (count, error) = store
        .state(|s| (s.hotels.items.len(), s.hotels.error().map(str::to_string)))
        .await;
    assert_eq!(count, 2);
    assert_eq!(error.as_deref(), Some("Failed to create hotel"));
}

#[tokio::test]
async fn test_later_arriving_response_wins() {
    let (backend, store) = setup(vec![hotel("1", "Goa"), hotel("2", "Jaipur"), hotel("3", "Goa")]);
    let mut actions = store.subscribe_actions();

    // First request is slow; the second overtakes it
    backend.set_latency(Some(Duration::from_millis(150)));
    let mut slow = store
        .send(AppAction::Hotels(HotelAction::Fetch {
            query: ListQuery::first_page(10).with_search("goa"),
        }))
        .await
        .unwrap();
    while backend.calls() < 1 {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    backend.set_latency(None);
    let mut fast = store
        .send(AppAction::Hotels(HotelAction::Fetch {
            query: ListQuery::first_page(10),
        }))
        .await
        .unwrap();
    fast.wait_with_timeout(WAIT).await.unwrap();
    slow.wait_with_timeout(WAIT).await.unwrap();

    let mut settled = Vec::new();
    while let Ok(action) = actions.try_recv() {
        if let AppAction::Hotels(HotelAction::Fetched { page }) = action {
            settled.push(page.items.len());
        }
    }

    assert_eq!(settled, vec![3, 2]);
    assert_eq!(hotel_ids(&store).await, vec!["1", "3"]);
}

#[tokio::test]
async fn test_login_starts_session() {
    let (backend, store) = setup(Vec::new());
    backend.add_account(
        User {
            id: UserId::new("u-1"),
            name: "Meera".to_string(),
            email: "meera@travel.io".to_string(),
            phone: None,
            role: Role::Agent,
            is_verified: true,
        },
        "secret1",
    );

    let outcome = send(
        &store,
        AppAction::Auth(AuthAction::Login {
            request: LoginRequest {
                email: "meera@travel.io".to_string(),
                password: "secret1".to_string(),
            },
        }),
    )
    .await;

    assert!(matches!(outcome, AppAction::Auth(AuthAction::LoggedIn { .. })));
    let (authenticated, token) = store
        .state(|s| (s.auth.is_authenticated(), s.auth.token.clone()))
        .await;
    assert!(authenticated);
    assert_eq!(token.as_deref(), Some("mock-token-u-1"));
}

#[tokio::test]
async fn test_wrong_password_is_rejected() {
    let (_backend, store) = setup(Vec::new());

    let outcome = send(
        &store,
        AppAction::Auth(AuthAction::Login {
            request: LoginRequest {
                email: "nobody@travel.io".to_string(),
                password: "secret1".to_string(),
            },
        }),
    )
    .await;

    assert!(outcome.is_rejected());
    let errors: Vec<(&str, String)> = store
        .state(|s| s.errors().into_iter().map(|(k, v)| (k, v.to_string())).collect())
        .await;
    assert_eq!(errors, vec![("auth", "Invalid email or password".to_string())]);
}

#[tokio::test]
async fn test_shutdown_rejects_new_actions() {
    let (_backend, store) = setup(vec![hotel("1", "Goa")]);
    fetch_hotels(&store).await;

    store.shutdown(WAIT).await.unwrap();

    let result = store.send(AppAction::Hotels(HotelAction::ClearError)).await;
    assert!(matches!(result, Err(StoreError::ShutdownInProgress)));
}
