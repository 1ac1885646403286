//! # Travel Desk Client
//!
//! The client side of the Travel Desk agent console: store slices for
//! accounts, catalogs, payments and chat, the form validators that run before
//! anything is submitted, and the aggregations behind the dashboard charts.
//!
//! ## Architecture
//!
//! - [`slices`]: one reducer per domain; every request goes pending, then
//!   fulfilled or rejected, with a slice-level error string on failure
//! - [`app`]: the slices scoped into one [`app::AppState`] and run by a
//!   single [`travel_desk_runtime::Store`]
//! - [`forms`]: synchronous field validation producing a field → message map
//! - [`dashboard`]: pure chart series computed from slice state
//! - [`route`]: console routes and the store actions they trigger
//!
//! ## Example
//!
//! ```no_run
//! use travel_desk_api::ApiClient;
//! use travel_desk_api::types::ListQuery;
//! use travel_desk_client::app::{AppAction, app_store};
//! use travel_desk_client::environment::ClientEnvironment;
//! use travel_desk_client::slices::HotelAction;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = app_store(ClientEnvironment::new(ApiClient::from_env()?));
//!
//!     let mut handle = store
//!         .send(AppAction::Hotels(HotelAction::Fetch { query: ListQuery::first_page(10) }))
//!         .await?;
//!     handle.wait_with_timeout(Duration::from_secs(10)).await?;
//!
//!     let names = store.state(|s| s.hotels.items.iter().map(|h| h.name.clone()).collect::<Vec<_>>()).await;
//!     println!("{names:?}");
//!     Ok(())
//! }
//! ```

pub mod app;
pub mod config;
pub mod dashboard;
pub mod environment;
pub mod forms;
pub mod route;
pub mod slices;

pub use app::{AppAction, AppState, AppStore, Backend, app_reducer, app_store};
pub use config::ClientConfig;
pub use environment::ClientEnvironment;
pub use route::Route;
