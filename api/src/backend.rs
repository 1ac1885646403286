//! Backend traits.
//!
//! Reducers never talk HTTP directly. They hold a backend through their
//! environment and call one of these traits inside a request effect, so the
//! same slice runs against [`ApiClient`](crate::ApiClient) in production and
//! against an in-memory backend in tests.

use crate::error::ApiError;
use crate::types::{
    Booking, BookingDraft, BookingId, ChatMessage, Conversation, Flight, FlightDraft, FlightId,
    Hotel, HotelDraft, HotelId, ListQuery, MessageId, OrderId, PackageDraft, PackageId, Page,
    Payment, PaymentId, PaymentOrder, PaymentStatusReport, RegisterRequest, Session,
    TravelPackage, User, UserId, VerifyEmailRequest, LoginRequest, SendMessageRequest,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use std::future::Future;
use travel_desk_core::collection::Entity;

/// Result alias for backend calls.
pub type Result<T> = std::result::Result<T, ApiError>;

/// A record served by the generic catalog routes
/// (`GET/POST /{resource}`, `GET/PUT/DELETE /{resource}/:id`).
pub trait Resource:
    Entity + Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Create/update payload
    type Draft: Clone + Debug + Serialize + Send + Sync + 'static;

    /// Route prefix, e.g. `/hotels`
    const PATH: &'static str;

    /// Lowercase singular noun used in messages
    const SINGULAR: &'static str;

    /// Lowercase plural noun used in messages
    const PLURAL: &'static str;

    /// Wrap a raw identifier (in-memory backends)
    fn id_from(raw: String) -> Self::Id;

    /// Build a record from a draft (in-memory backends)
    fn from_draft(id: Self::Id, draft: Self::Draft, now: DateTime<Utc>) -> Self;

    /// Overwrite the editable fields from a draft (in-memory backends)
    fn apply_draft(&mut self, draft: Self::Draft);
}

/// CRUD over one catalog resource.
pub trait CatalogApi<T: Resource>: Send + Sync {
    /// Fetch one page of records.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport, status or decode failure.
    fn list(&self, query: &ListQuery) -> impl Future<Output = Result<Page<T>>> + Send;

    /// Fetch one record.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Server`] with status 404 when the record is missing.
    fn get(&self, id: &T::Id) -> impl Future<Output = Result<T>> + Send;

    /// Create a record.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] when the backend rejects the draft.
    fn create(&self, draft: &T::Draft) -> impl Future<Output = Result<T>> + Send;

    /// Replace the editable fields of a record.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] when the record is missing or the draft is rejected.
    fn update(&self, id: &T::Id, draft: &T::Draft) -> impl Future<Output = Result<T>> + Send;

    /// Delete a record, returning the id that was deleted.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] when the backend refuses the deletion.
    fn delete(&self, id: &T::Id) -> impl Future<Output = Result<T::Id>> + Send;
}

/// Account and session routes under `/api/user`.
pub trait AuthApi: Send + Sync {
    /// Create an account; the backend emails a verification code.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] when the email is taken or the payload rejected.
    fn register(&self, request: &RegisterRequest) -> impl Future<Output = Result<User>> + Send;

    /// Log in and remember the bearer token for later requests.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] on bad credentials.
    fn login(&self, request: &LoginRequest) -> impl Future<Output = Result<Session>> + Send;

    /// Confirm the emailed code.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] when the code is wrong or expired.
    fn verify_email(&self, request: &VerifyEmailRequest)
    -> impl Future<Output = Result<User>> + Send;

    /// Fetch the logged-in account.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] without a valid token.
    fn profile(&self) -> impl Future<Output = Result<User>> + Send;

    /// Forget the bearer token. Purely local.
    fn logout(&self) -> impl Future<Output = ()> + Send;
}

/// Payment routes under `/payment`.
pub trait PaymentApi: Send + Sync {
    /// Create a gateway order for a booking.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] when the booking cannot be paid.
    fn create_payment(&self, booking_id: &BookingId)
    -> impl Future<Output = Result<PaymentOrder>> + Send;

    /// Payments of the logged-in user.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport, status or decode failure.
    fn payment_history(&self) -> impl Future<Output = Result<Vec<Payment>>> + Send;

    /// One payment record.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] when the payment is missing.
    fn payment_details(&self, id: &PaymentId) -> impl Future<Output = Result<Payment>> + Send;

    /// Create a fresh order for a booking whose payment failed.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] when the booking has nothing to retry.
    fn retry_payment(&self, booking_id: &BookingId)
    -> impl Future<Output = Result<PaymentOrder>> + Send;

    /// Poll the gateway status of an order.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] when the order is unknown.
    fn payment_status(&self, order_id: &OrderId)
    -> impl Future<Output = Result<PaymentStatusReport>> + Send;
}

/// Chat routes under `/chat`.
pub trait ChatApi: Send + Sync {
    /// Send a message.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] when the recipient is unknown.
    fn send_message(&self, request: &SendMessageRequest)
    -> impl Future<Output = Result<ChatMessage>> + Send;

    /// Messages exchanged with one user, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport, status or decode failure.
    fn chat_history(&self, user_id: &UserId)
    -> impl Future<Output = Result<Vec<ChatMessage>>> + Send;

    /// Conversation list of the logged-in user.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport, status or decode failure.
    fn conversations(&self) -> impl Future<Output = Result<Vec<Conversation>>> + Send;

    /// Mark every message from `sender_id` as read.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport or status failure.
    fn mark_read(&self, sender_id: &UserId) -> impl Future<Output = Result<()>> + Send;

    /// Unread messages across all conversations.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport, status or decode failure.
    fn unread_count(&self) -> impl Future<Output = Result<u32>> + Send;

    /// Delete one message, returning its id.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] when the message is missing or not the caller's.
    fn delete_message(&self, id: &MessageId) -> impl Future<Output = Result<MessageId>> + Send;
}

// ═══════════════════════════════════════════════════════════════════════
// Catalog resources
// ═══════════════════════════════════════════════════════════════════════

impl Resource for Hotel {
    type Draft = HotelDraft;

    const PATH: &'static str = "/hotels";
    const SINGULAR: &'static str = "hotel";
    const PLURAL: &'static str = "hotels";

    fn id_from(raw: String) -> HotelId {
        HotelId(raw)
    }

    fn from_draft(id: HotelId, draft: HotelDraft, now: DateTime<Utc>) -> Self {
        let mut hotel = Self {
            id,
            name: String::new(),
            city: String::new(),
            address: String::new(),
            description: String::new(),
            price_per_night: 0.0,
            rating: 0.0,
            amenities: Vec::new(),
            images: Vec::new(),
            rooms_available: 0,
            created_at: Some(now),
        };
        hotel.apply_draft(draft);
        hotel
    }

    fn apply_draft(&mut self, draft: HotelDraft) {
        self.name = draft.name;
        self.city = draft.city;
        self.address = draft.address;
        self.description = draft.description;
        self.price_per_night = draft.price_per_night;
        self.rating = draft.rating;
        self.amenities = draft.amenities;
        self.images = draft.images;
        self.rooms_available = draft.rooms_available;
    }
}

impl Resource for TravelPackage {
    type Draft = PackageDraft;

    const PATH: &'static str = "/packages";
    const SINGULAR: &'static str = "package";
    const PLURAL: &'static str = "packages";

    fn id_from(raw: String) -> PackageId {
        PackageId(raw)
    }

    fn from_draft(id: PackageId, draft: PackageDraft, now: DateTime<Utc>) -> Self {
        let mut package = Self {
            id,
            title: String::new(),
            destination: String::new(),
            duration_days: 0,
            price: 0.0,
            description: String::new(),
            inclusions: Vec::new(),
            images: Vec::new(),
            max_travelers: 0,
            created_at: Some(now),
        };
        package.apply_draft(draft);
        package
    }

    fn apply_draft(&mut self, draft: PackageDraft) {
        self.title = draft.title;
        self.destination = draft.destination;
        self.duration_days = draft.duration_days;
        self.price = draft.price;
        self.description = draft.description;
        self.inclusions = draft.inclusions;
        self.images = draft.images;
        self.max_travelers = draft.max_travelers;
    }
}

impl Resource for Flight {
    type Draft = FlightDraft;

    const PATH: &'static str = "/flights";
    const SINGULAR: &'static str = "flight";
    const PLURAL: &'static str = "flights";

    fn id_from(raw: String) -> FlightId {
        FlightId(raw)
    }

    fn from_draft(id: FlightId, draft: FlightDraft, _now: DateTime<Utc>) -> Self {
        Self {
            id,
            airline: draft.airline,
            flight_number: draft.flight_number,
            origin: draft.origin,
            destination: draft.destination,
            departure_at: draft.departure_at,
            arrival_at: draft.arrival_at,
            price: draft.price,
            seats_available: draft.seats_available,
        }
    }

    fn apply_draft(&mut self, draft: FlightDraft) {
        let id = self.id.clone();
        *self = Self::from_draft(id, draft, Utc::now());
    }
}

impl Resource for Booking {
    type Draft = BookingDraft;

    const PATH: &'static str = "/bookings";
    const SINGULAR: &'static str = "booking";
    const PLURAL: &'static str = "bookings";

    fn id_from(raw: String) -> BookingId {
        BookingId(raw)
    }

    fn from_draft(id: BookingId, draft: BookingDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            kind: draft.kind,
            item_id: draft.item_id,
            item_name: draft.item_name,
            customer_name: draft.customer_name,
            customer_email: draft.customer_email,
            travelers: draft.travelers,
            amount: draft.amount,
            status: draft.status,
            created_at: now,
        }
    }

    fn apply_draft(&mut self, draft: BookingDraft) {
        *self = Self::from_draft(self.id.clone(), draft, self.created_at);
    }
}
