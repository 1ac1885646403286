//! # Travel Desk API Client
//!
//! Typed client for the booking backend used by the Travel Desk agent
//! console: accounts, the hotel/package/flight/booking catalogs, payments and
//! chat.
//!
//! ## Example
//!
//! ```no_run
//! use travel_desk_api::{ApiClient, CatalogApi};
//! use travel_desk_api::types::{Hotel, ListQuery};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads TRAVEL_DESK_API_URL and TRAVEL_DESK_AUTH_TOKEN
//!     let client = ApiClient::from_env()?;
//!
//!     let page = CatalogApi::<Hotel>::list(&client, &ListQuery::first_page(10)).await?;
//!
//!     for hotel in page.items {
//!         println!("{} ({})", hotel.name, hotel.city);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - Response envelope handling (`success`, `data`, `pagination`, `message`)
//! - Bearer-token session set on login, cleared on logout
//! - One trait per backend area, so store slices can run against
//!   [`mocks::MockBackend`] (feature `test-utils`)

pub mod backend;
pub mod client;
pub mod config;
pub mod error;
pub mod types;

#[cfg(feature = "test-utils")]
pub mod mocks;

// Re-export main types for convenience
pub use backend::{AuthApi, CatalogApi, ChatApi, PaymentApi, Resource};
pub use client::ApiClient;
pub use config::ApiConfig;
pub use error::ApiError;
