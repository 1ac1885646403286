//! Wire types for the booking backend
//!
//! Field names follow the backend's camelCase JSON. Record ids are accepted
//! both as `_id` and `id`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use travel_desk_core::collection::Entity;

// ═══════════════════════════════════════════════════════════════════════
// ID Types
// ═══════════════════════════════════════════════════════════════════════

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Wrap a raw identifier
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// The raw identifier
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

string_id!(
    /// Unique identifier for a user (agent, customer or admin).
    UserId
);
string_id!(
    /// Unique identifier for a hotel.
    HotelId
);
string_id!(
    /// Unique identifier for a travel package.
    PackageId
);
string_id!(
    /// Unique identifier for a flight.
    FlightId
);
string_id!(
    /// Unique identifier for a booking.
    BookingId
);
string_id!(
    /// Unique identifier for a payment record.
    PaymentId
);
string_id!(
    /// Payment-gateway order identifier.
    OrderId
);
string_id!(
    /// Unique identifier for a chat message.
    MessageId
);

// ═══════════════════════════════════════════════════════════════════════
// Envelope and paging
// ═══════════════════════════════════════════════════════════════════════

/// Successful response body: `{ success, data, pagination?, message? }`
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    /// `false` marks a failure reported with a 2xx status
    #[serde(default)]
    pub success: Option<bool>,
    /// The payload
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    /// Present on list responses
    #[serde(default)]
    pub pagination: Option<Pagination>,
    /// Human-readable server message
    #[serde(default)]
    pub message: Option<String>,
}

/// Failure response body: `{ message }`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    /// Server-provided explanation
    #[serde(default)]
    pub message: Option<String>,
}

/// Paging metadata returned with list responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// 1-based page number
    pub page: u32,
    /// Page size
    pub limit: u32,
    /// Total number of records
    pub total: u64,
    /// Total number of pages
    pub total_pages: u32,
}

/// One page of a list response
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Records in server order
    pub items: Vec<T>,
    /// Paging metadata, when the server sent it
    pub pagination: Option<Pagination>,
}

/// List query parameters, sent as a query string
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ListQuery {
    /// 1-based page number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    /// Page size
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Free-text search
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl ListQuery {
    /// First page with the given size
    #[must_use]
    pub const fn first_page(limit: u32) -> Self {
        Self {
            page: Some(1),
            limit: Some(limit),
            search: None,
        }
    }

    /// Set the page number
    #[must_use]
    pub const fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Set the search term; blank terms are dropped
    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        let search = search.into();
        self.search = (!search.trim().is_empty()).then_some(search);
        self
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Users and sessions
// ═══════════════════════════════════════════════════════════════════════

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Travel agent managing a catalog
    #[default]
    Agent,
    /// End customer
    Customer,
    /// Platform administrator
    Admin,
}

impl Role {
    /// Parse the lowercase wire name
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "agent" => Some(Self::Agent),
            "customer" => Some(Self::Customer),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

/// A registered account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Identifier
    #[serde(rename = "_id", alias = "id")]
    pub id: UserId,
    /// Display name
    pub name: String,
    /// Login email
    pub email: String,
    /// Contact phone
    #[serde(default)]
    pub phone: Option<String>,
    /// Account role
    #[serde(default)]
    pub role: Role,
    /// Whether the email was verified
    #[serde(default)]
    pub is_verified: bool,
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &UserId {
        &self.id
    }
}

/// Bearer token and the account it belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Bearer token for authenticated requests
    pub token: String,
    /// The logged-in account
    pub user: User,
}

/// `POST /api/user/register` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterRequest {
    /// Display name
    pub name: String,
    /// Login email
    pub email: String,
    /// Contact phone
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Password
    pub password: String,
    /// Requested role
    pub role: Role,
}

/// `POST /api/user/login` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginRequest {
    /// Login email
    pub email: String,
    /// Password
    pub password: String,
}

/// `POST /api/user/verify-email` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyEmailRequest {
    /// Email the code was sent to
    pub email: String,
    /// One-time code
    #[serde(rename = "otp")]
    pub code: String,
}

// ═══════════════════════════════════════════════════════════════════════
// Catalog records
// ═══════════════════════════════════════════════════════════════════════

/// A hotel listed by an agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hotel {
    /// Identifier
    #[serde(rename = "_id", alias = "id")]
    pub id: HotelId,
    /// Hotel name
    pub name: String,
    /// City
    pub city: String,
    /// Street address
    #[serde(default)]
    pub address: String,
    /// Free-text description
    #[serde(default)]
    pub description: String,
    /// Nightly rate in major currency units
    pub price_per_night: f64,
    /// Guest rating, 0 to 5
    #[serde(default)]
    pub rating: f64,
    /// Amenity labels
    #[serde(default)]
    pub amenities: Vec<String>,
    /// Image URLs
    #[serde(default)]
    pub images: Vec<String>,
    /// Rooms currently bookable
    #[serde(default)]
    pub rooms_available: u32,
    /// Creation time
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Fields an agent submits to create or update a hotel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelDraft {
    /// Hotel name
    pub name: String,
    /// City
    pub city: String,
    /// Street address
    pub address: String,
    /// Free-text description
    pub description: String,
    /// Nightly rate
    pub price_per_night: f64,
    /// Guest rating
    pub rating: f64,
    /// Amenity labels
    pub amenities: Vec<String>,
    /// Image URLs
    pub images: Vec<String>,
    /// Rooms currently bookable
    pub rooms_available: u32,
}

/// A multi-day travel package
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelPackage {
    /// Identifier
    #[serde(rename = "_id", alias = "id")]
    pub id: PackageId,
    /// Package title
    pub title: String,
    /// Destination
    pub destination: String,
    /// Length in days
    pub duration_days: u32,
    /// Price per traveler in major currency units
    pub price: f64,
    /// Free-text description
    #[serde(default)]
    pub description: String,
    /// What the price includes
    #[serde(default)]
    pub inclusions: Vec<String>,
    /// Image URLs
    #[serde(default)]
    pub images: Vec<String>,
    /// Group size limit
    #[serde(default)]
    pub max_travelers: u32,
    /// Creation time
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Fields an agent submits to create or update a package
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageDraft {
    /// Package title
    pub title: String,
    /// Destination
    pub destination: String,
    /// Length in days
    pub duration_days: u32,
    /// Price per traveler
    pub price: f64,
    /// Free-text description
    pub description: String,
    /// What the price includes
    pub inclusions: Vec<String>,
    /// Image URLs
    pub images: Vec<String>,
    /// Group size limit
    pub max_travelers: u32,
}

/// A scheduled flight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flight {
    /// Identifier
    #[serde(rename = "_id", alias = "id")]
    pub id: FlightId,
    /// Operating airline
    pub airline: String,
    /// Flight number, e.g. `AI-202`
    pub flight_number: String,
    /// Departure city or airport
    pub origin: String,
    /// Arrival city or airport
    pub destination: String,
    /// Departure time
    pub departure_at: DateTime<Utc>,
    /// Arrival time
    pub arrival_at: DateTime<Utc>,
    /// Fare in major currency units
    pub price: f64,
    /// Seats currently bookable
    #[serde(default)]
    pub seats_available: u32,
}

/// Fields an agent submits to create or update a flight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightDraft {
    /// Operating airline
    pub airline: String,
    /// Flight number
    pub flight_number: String,
    /// Departure city or airport
    pub origin: String,
    /// Arrival city or airport
    pub destination: String,
    /// Departure time
    pub departure_at: DateTime<Utc>,
    /// Arrival time
    pub arrival_at: DateTime<Utc>,
    /// Fare
    pub price: f64,
    /// Seats currently bookable
    pub seats_available: u32,
}

/// What a booking reserves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingKind {
    /// Hotel stay
    #[default]
    Hotel,
    /// Travel package
    Package,
    /// Flight seat
    Flight,
}

impl BookingKind {
    /// Display label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Hotel => "Hotel",
            Self::Package => "Package",
            Self::Flight => "Flight",
        }
    }
}

/// Booking lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    /// Awaiting payment or agent confirmation
    #[default]
    Pending,
    /// Paid and confirmed
    Confirmed,
    /// Cancelled by customer or agent
    Cancelled,
    /// Trip completed
    Completed,
}

impl BookingStatus {
    /// Display label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Confirmed => "Confirmed",
            Self::Cancelled => "Cancelled",
            Self::Completed => "Completed",
        }
    }

    /// Whether the booking's amount counts as earned revenue
    #[must_use]
    pub const fn is_revenue(self) -> bool {
        matches!(self, Self::Confirmed | Self::Completed)
    }
}

/// A customer booking of a hotel, package or flight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    /// Identifier
    #[serde(rename = "_id", alias = "id")]
    pub id: BookingId,
    /// What is booked
    pub kind: BookingKind,
    /// Id of the booked hotel, package or flight
    pub item_id: String,
    /// Name of the booked item at booking time
    #[serde(default)]
    pub item_name: String,
    /// Customer name
    pub customer_name: String,
    /// Customer email
    #[serde(default)]
    pub customer_email: String,
    /// Number of travelers
    #[serde(default = "one")]
    pub travelers: u32,
    /// Total amount in major currency units
    pub amount: f64,
    /// Lifecycle status
    #[serde(default)]
    pub status: BookingStatus,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

const fn one() -> u32 {
    1
}

/// Fields an agent submits to create or update a booking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingDraft {
    /// What is booked
    pub kind: BookingKind,
    /// Id of the booked item
    pub item_id: String,
    /// Name of the booked item
    pub item_name: String,
    /// Customer name
    pub customer_name: String,
    /// Customer email
    pub customer_email: String,
    /// Number of travelers
    pub travelers: u32,
    /// Total amount
    pub amount: f64,
    /// Lifecycle status
    pub status: BookingStatus,
}

impl Booking {
    /// The draft that reproduces this booking, for status edits
    #[must_use]
    pub fn to_draft(&self) -> BookingDraft {
        BookingDraft {
            kind: self.kind,
            item_id: self.item_id.clone(),
            item_name: self.item_name.clone(),
            customer_name: self.customer_name.clone(),
            customer_email: self.customer_email.clone(),
            travelers: self.travelers,
            amount: self.amount,
            status: self.status,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Payments
// ═══════════════════════════════════════════════════════════════════════

/// Payment status as reported by the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Order created, not yet attempted
    #[default]
    Created,
    /// Attempt in progress
    Pending,
    /// Captured
    Paid,
    /// Attempt failed; may be retried
    Failed,
    /// Refunded to the customer
    Refunded,
}

impl PaymentStatus {
    /// Whether an explicit retry makes sense
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::Failed | Self::Created)
    }
}

/// A payment attempt for a booking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    /// Identifier
    #[serde(rename = "_id", alias = "id")]
    pub id: PaymentId,
    /// Booking being paid
    pub booking_id: BookingId,
    /// Gateway order
    pub order_id: OrderId,
    /// Amount in the smallest currency unit
    #[serde(alias = "amount")]
    pub amount_minor: i64,
    /// ISO currency code
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Gateway status
    #[serde(default)]
    pub status: PaymentStatus,
    /// Card, UPI, netbanking...
    #[serde(default)]
    pub method: Option<String>,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

fn default_currency() -> String {
    "INR".to_string()
}

/// `POST /payment` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    /// Booking to pay for
    pub booking_id: BookingId,
}

/// Gateway order created for a booking (create and retry)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentOrder {
    /// Gateway order
    pub order_id: OrderId,
    /// Booking being paid
    pub booking_id: BookingId,
    /// Amount in the smallest currency unit
    #[serde(alias = "amount")]
    pub amount_minor: i64,
    /// ISO currency code
    #[serde(default = "default_currency")]
    pub currency: String,
    /// The payment record tracking this order
    pub payment: Payment,
}

/// `GET /payment/status/:orderId` payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusReport {
    /// Gateway order
    pub order_id: OrderId,
    /// Current status
    pub status: PaymentStatus,
}

// ═══════════════════════════════════════════════════════════════════════
// Chat
// ═══════════════════════════════════════════════════════════════════════

/// One chat message between two users
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// Identifier
    #[serde(rename = "_id", alias = "id")]
    pub id: MessageId,
    /// Author
    pub sender_id: UserId,
    /// Recipient
    pub receiver_id: UserId,
    /// Message text
    pub content: String,
    /// Whether the recipient has read it
    #[serde(default)]
    pub read: bool,
    /// Send time
    pub created_at: DateTime<Utc>,
}

/// Entry of the conversation list, keyed by the other participant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    /// The other participant
    pub user_id: UserId,
    /// Their display name
    pub name: String,
    /// Preview of the latest message
    #[serde(default)]
    pub last_message: Option<String>,
    /// Time of the latest message
    #[serde(default)]
    pub last_message_at: Option<DateTime<Utc>>,
    /// Messages from them not yet read
    #[serde(default)]
    pub unread_count: u32,
}

/// `POST /chat/send` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    /// Recipient
    pub receiver_id: UserId,
    /// Message text
    pub content: String,
}

/// `GET /chat/unread-count` payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UnreadCount {
    /// Unread messages across all conversations
    pub count: u32,
}

macro_rules! entity {
    ($ty:ty, $id:ty) => {
        impl Entity for $ty {
            type Id = $id;

            fn id(&self) -> &$id {
                &self.id
            }
        }
    };
}

entity!(Hotel, HotelId);
entity!(TravelPackage, PackageId);
entity!(Flight, FlightId);
entity!(Booking, BookingId);
entity!(Payment, PaymentId);
entity!(ChatMessage, MessageId);

impl Entity for Conversation {
    type Id = UserId;

    fn id(&self) -> &UserId {
        &self.user_id
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use serde_json::json;

    #[test]
    fn test_hotel_accepts_mongo_id() {
        let hotel: Hotel = serde_json::from_value(json!({
            "_id": "h-1",
            "name": "Sea Breeze",
            "city": "Goa",
            "pricePerNight": 4200.0,
            "rating": 4.5
        }))
        .unwrap();

        assert_eq!(hotel.id, HotelId::new("h-1"));
        assert!(hotel.amenities.is_empty());
        assert_eq!(hotel.created_at, None);
    }

    #[test]
    fn test_booking_defaults() {
        let booking: Booking = serde_json::from_value(json!({
            "id": "b-1",
            "kind": "package",
            "itemId": "p-1",
            "customerName": "Ravi",
            "amount": 1500.0,
            "createdAt": "2025-03-01T10:00:00Z"
        }))
        .unwrap();

        assert_eq!(booking.kind, BookingKind::Package);
        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.travelers, 1);
    }

    #[test]
    fn test_pagination_is_camel_case() {
        let value = serde_json::to_value(Pagination {
            page: 2,
            limit: 10,
            total: 35,
            total_pages: 4,
        })
        .unwrap();

        assert_eq!(value, json!({"page": 2, "limit": 10, "total": 35, "totalPages": 4}));
    }

    #[test]
    fn test_list_query_drops_blank_search() {
        let query = ListQuery::first_page(10).with_search("   ");
        assert_eq!(query.search, None);

        let query = ListQuery::first_page(10).with_page(3).with_search("goa");
        assert_eq!(query.page, Some(3));
        assert_eq!(query.search.as_deref(), Some("goa"));
    }

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::parse(" Agent "), Some(Role::Agent));
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("pilot"), None);
    }

    #[test]
    fn test_verify_email_sends_otp_field() {
        let body = serde_json::to_value(VerifyEmailRequest {
            email: "a@b.com".to_string(),
            code: "123456".to_string(),
        })
        .unwrap();

        assert_eq!(body, json!({"email": "a@b.com", "otp": "123456"}));
    }
}
