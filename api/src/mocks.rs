//! In-memory booking backend for tests.
//!
//! [`MockBackend`] implements every backend trait over shared in-memory
//! state. Clones share that state, so a test can keep one handle for seeding
//! and assertions while the store owns another.

use crate::backend::{AuthApi, CatalogApi, ChatApi, PaymentApi, Resource, Result};
use crate::error::ApiError;
use crate::types::{
    Booking, BookingId, ChatMessage, Conversation, Flight, Hotel, ListQuery, LoginRequest,
    MessageId, OrderId, Page, Pagination, Payment, PaymentId, PaymentOrder, PaymentStatus,
    PaymentStatusReport, RegisterRequest, SendMessageRequest, Session, TravelPackage, User,
    UserId, VerifyEmailRequest,
};
use chrono::Utc;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Verification code the mock accepts for every account
pub const MOCK_VERIFICATION_CODE: &str = "123456";

fn poisoned() -> ApiError {
    ApiError::Server {
        status: 500,
        message: Some("mock state poisoned".to_string()),
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    mutex.lock().map_err(|_| poisoned())
}

fn not_found(what: &str, id: &dyn std::fmt::Display) -> ApiError {
    ApiError::Server {
        status: 404,
        message: Some(format!("No {what} with id {id}")),
    }
}

/// Records of one catalog resource
#[derive(Debug)]
pub struct MockCatalog<T> {
    records: Arc<Mutex<Vec<T>>>,
}

impl<T> Clone for MockCatalog<T> {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
        }
    }
}

impl<T> Default for MockCatalog<T> {
    fn default() -> Self {
        Self {
            records: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl<T: Clone> MockCatalog<T> {
    /// Snapshot of the stored records
    #[must_use]
    pub fn records(&self) -> Vec<T> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

/// Resources the mock can serve through [`CatalogApi`]
pub trait MockResource: Resource {
    /// The catalog holding this resource
    fn catalog(backend: &MockBackend) -> &MockCatalog<Self>;
}

impl MockResource for Hotel {
    fn catalog(backend: &MockBackend) -> &MockCatalog<Self> {
        &backend.hotels
    }
}

impl MockResource for TravelPackage {
    fn catalog(backend: &MockBackend) -> &MockCatalog<Self> {
        &backend.packages
    }
}

impl MockResource for Flight {
    fn catalog(backend: &MockBackend) -> &MockCatalog<Self> {
        &backend.flights
    }
}

impl MockResource for Booking {
    fn catalog(backend: &MockBackend) -> &MockCatalog<Self> {
        &backend.bookings
    }
}

/// In-memory backend
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    hotels: MockCatalog<Hotel>,
    packages: MockCatalog<TravelPackage>,
    flights: MockCatalog<Flight>,
    bookings: MockCatalog<Booking>,
    accounts: Arc<Mutex<Vec<(User, String)>>>,
    current_user: Arc<Mutex<Option<UserId>>>,
    payments: Arc<Mutex<Vec<Payment>>>,
    messages: Arc<Mutex<Vec<ChatMessage>>>,
    conversations: Arc<Mutex<Vec<Conversation>>>,
    failure: Arc<Mutex<Option<ApiError>>>,
    latency: Arc<Mutex<Option<Duration>>>,
    next_id: Arc<AtomicU64>,
    calls: Arc<AtomicU64>,
}

impl MockBackend {
    /// Create an empty backend
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the records of one catalog
    pub fn seed<T: MockResource>(&self, records: Vec<T>) {
        if let Ok(mut stored) = T::catalog(self).records.lock() {
            *stored = records;
        }
    }

    /// Snapshot of one catalog
    #[must_use]
    pub fn records<T: MockResource>(&self) -> Vec<T> {
        T::catalog(self).records()
    }

    /// Register an account that can log in with `password`
    pub fn add_account(&self, user: User, password: impl Into<String>) {
        if let Ok(mut accounts) = self.accounts.lock() {
            accounts.push((user, password.into()));
        }
    }

    /// Look up an account by email
    #[must_use]
    pub fn account(&self, email: &str) -> Option<User> {
        let accounts = self.accounts.lock().ok()?;
        accounts.iter().find(|(u, _)| u.email == email).map(|(u, _)| u.clone())
    }

    /// Store a payment record
    pub fn add_payment(&self, payment: Payment) {
        if let Ok(mut payments) = self.payments.lock() {
            payments.push(payment);
        }
    }

    /// Store a chat message
    pub fn add_message(&self, message: ChatMessage) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(message);
        }
    }

    /// Store a conversation list entry
    pub fn add_conversation(&self, conversation: Conversation) {
        if let Ok(mut conversations) = self.conversations.lock() {
            conversations.push(conversation);
        }
    }

    /// Make every following call fail with `error`
    pub fn fail_with(&self, error: ApiError) {
        if let Ok(mut failure) = self.failure.lock() {
            *failure = Some(error);
        }
    }

    /// Let calls succeed again
    pub fn recover(&self) {
        if let Ok(mut failure) = self.failure.lock() {
            *failure = None;
        }
    }

    /// Delay every following call
    pub fn set_latency(&self, latency: Option<Duration>) {
        if let Ok(mut slot) = self.latency.lock() {
            *slot = latency;
        }
    }

    /// Number of calls served so far, failed ones included
    #[must_use]
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    fn next_id(&self, prefix: &str) -> String {
        format!("{prefix}-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Common prologue of every call: count, delay, injected failure
    async fn enter(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let latency = *lock(&self.latency)?;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        match lock(&self.failure)?.clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn session_user(&self) -> Result<UserId> {
        lock(&self.current_user)?
            .clone()
            .ok_or_else(|| ApiError::Unauthorized {
                message: Some("Please log in".to_string()),
            })
    }

    fn order_for(&self, booking_id: &BookingId) -> Result<PaymentOrder> {
        let booking = lock(&self.bookings.records)?
            .iter()
            .find(|b| &b.id == booking_id)
            .cloned()
            .ok_or_else(|| not_found("booking", booking_id))?;

        #[allow(clippy::cast_possible_truncation)]
        let amount_minor = (booking.amount * 100.0).round() as i64;
        let order_id = OrderId::new(self.next_id("order"));
        let payment = Payment {
            id: PaymentId::new(self.next_id("payment")),
            booking_id: booking_id.clone(),
            order_id: order_id.clone(),
            amount_minor,
            currency: "INR".to_string(),
            status: PaymentStatus::Created,
            method: None,
            created_at: Utc::now(),
        };
        lock(&self.payments)?.push(payment.clone());

        Ok(PaymentOrder {
            order_id,
            booking_id: booking_id.clone(),
            amount_minor,
            currency: payment.currency.clone(),
            payment,
        })
    }
}

impl<T: MockResource> CatalogApi<T> for MockBackend {
    fn list(&self, query: &ListQuery) -> impl Future<Output = Result<Page<T>>> + Send {
        let backend = self.clone();
        let query = query.clone();

        async move {
            backend.enter().await?;
            let records = lock(&T::catalog(&backend).records)?;

            let matching: Vec<T> = match &query.search {
                Some(term) => {
                    let term = term.to_lowercase();
                    records
                        .iter()
                        .filter(|r| {
                            serde_json::to_string(r)
                                .map(|json| json.to_lowercase().contains(&term))
                                .unwrap_or(false)
                        })
                        .cloned()
                        .collect()
                },
                None => records.clone(),
            };

            let total = matching.len();
            let limit = query.limit.unwrap_or(10).max(1) as usize;
            let page = query.page.unwrap_or(1).max(1) as usize;
            let items = matching
                .into_iter()
                .skip((page - 1) * limit)
                .take(limit)
                .collect();

            #[allow(clippy::cast_possible_truncation)]
            let pagination = Pagination {
                page: page as u32,
                limit: limit as u32,
                total: total as u64,
                total_pages: total.div_ceil(limit) as u32,
            };

            Ok(Page {
                items,
                pagination: Some(pagination),
            })
        }
    }

    fn get(&self, id: &T::Id) -> impl Future<Output = Result<T>> + Send {
        let backend = self.clone();
        let id = id.clone();

        async move {
            backend.enter().await?;
            lock(&T::catalog(&backend).records)?
                .iter()
                .find(|r| r.id() == &id)
                .cloned()
                .ok_or_else(|| not_found(T::SINGULAR, &id))
        }
    }

    fn create(&self, draft: &T::Draft) -> impl Future<Output = Result<T>> + Send {
        let backend = self.clone();
        let draft = draft.clone();

        async move {
            backend.enter().await?;
            let id = T::id_from(backend.next_id(T::SINGULAR));
            let record = T::from_draft(id, draft, Utc::now());
            lock(&T::catalog(&backend).records)?.push(record.clone());
            Ok(record)
        }
    }

    fn update(&self, id: &T::Id, draft: &T::Draft) -> impl Future<Output = Result<T>> + Send {
        let backend = self.clone();
        let id = id.clone();
        let draft = draft.clone();

        async move {
            backend.enter().await?;
            let mut records = lock(&T::catalog(&backend).records)?;
            let record = records
                .iter_mut()
                .find(|r| r.id() == &id)
                .ok_or_else(|| not_found(T::SINGULAR, &id))?;
            record.apply_draft(draft);
            Ok(record.clone())
        }
    }

    fn delete(&self, id: &T::Id) -> impl Future<Output = Result<T::Id>> + Send {
        let backend = self.clone();
        let id = id.clone();

        async move {
            backend.enter().await?;
            let mut records = lock(&T::catalog(&backend).records)?;
            let position = records
                .iter()
                .position(|r| r.id() == &id)
                .ok_or_else(|| not_found(T::SINGULAR, &id))?;
            records.remove(position);
            Ok(id)
        }
    }
}

impl AuthApi for MockBackend {
    fn register(&self, request: &RegisterRequest) -> impl Future<Output = Result<User>> + Send {
        let backend = self.clone();
        let request = request.clone();

        async move {
            backend.enter().await?;
            let mut accounts = lock(&backend.accounts)?;
            if accounts.iter().any(|(u, _)| u.email == request.email) {
                return Err(ApiError::Server {
                    status: 409,
                    message: Some("User already exists".to_string()),
                });
            }

            let user = User {
                id: UserId::new(backend.next_id("user")),
                name: request.name,
                email: request.email,
                phone: request.phone,
                role: request.role,
                is_verified: false,
            };
            accounts.push((user.clone(), request.password));
            Ok(user)
        }
    }

    fn login(&self, request: &LoginRequest) -> impl Future<Output = Result<Session>> + Send {
        let backend = self.clone();
        let request = request.clone();

        async move {
            backend.enter().await?;
            let user = lock(&backend.accounts)?
                .iter()
                .find(|(u, password)| u.email == request.email && *password == request.password)
                .map(|(u, _)| u.clone())
                .ok_or_else(|| ApiError::Unauthorized {
                    message: Some("Invalid email or password".to_string()),
                })?;

            *lock(&backend.current_user)? = Some(user.id.clone());
            Ok(Session {
                token: format!("mock-token-{}", user.id),
                user,
            })
        }
    }

    fn verify_email(
        &self,
        request: &VerifyEmailRequest,
    ) -> impl Future<Output = Result<User>> + Send {
        let backend = self.clone();
        let request = request.clone();

        async move {
            backend.enter().await?;
            if request.code != MOCK_VERIFICATION_CODE {
                return Err(ApiError::Server {
                    status: 400,
                    message: Some("Invalid or expired code".to_string()),
                });
            }

            let mut accounts = lock(&backend.accounts)?;
            let (user, _) = accounts
                .iter_mut()
                .find(|(u, _)| u.email == request.email)
                .ok_or_else(|| not_found("user", &request.email))?;
            user.is_verified = true;
            Ok(user.clone())
        }
    }

    fn profile(&self) -> impl Future<Output = Result<User>> + Send {
        let backend = self.clone();

        async move {
            backend.enter().await?;
            let id = backend.session_user()?;
            lock(&backend.accounts)?
                .iter()
                .find(|(u, _)| u.id == id)
                .map(|(u, _)| u.clone())
                .ok_or_else(|| not_found("user", &id))
        }
    }

    fn logout(&self) -> impl Future<Output = ()> + Send {
        let backend = self.clone();

        async move {
            if let Ok(mut current) = backend.current_user.lock() {
                *current = None;
            }
        }
    }
}

impl PaymentApi for MockBackend {
    fn create_payment(
        &self,
        booking_id: &BookingId,
    ) -> impl Future<Output = Result<PaymentOrder>> + Send {
        let backend = self.clone();
        let booking_id = booking_id.clone();

        async move {
            backend.enter().await?;
            backend.order_for(&booking_id)
        }
    }

    fn payment_history(&self) -> impl Future<Output = Result<Vec<Payment>>> + Send {
        let backend = self.clone();

        async move {
            backend.enter().await?;
            Ok(lock(&backend.payments)?.clone())
        }
    }

    fn payment_details(&self, id: &PaymentId) -> impl Future<Output = Result<Payment>> + Send {
        let backend = self.clone();
        let id = id.clone();

        async move {
            backend.enter().await?;
            lock(&backend.payments)?
                .iter()
                .find(|p| p.id == id)
                .cloned()
                .ok_or_else(|| not_found("payment", &id))
        }
    }

    fn retry_payment(
        &self,
        booking_id: &BookingId,
    ) -> impl Future<Output = Result<PaymentOrder>> + Send {
        let backend = self.clone();
        let booking_id = booking_id.clone();

        async move {
            backend.enter().await?;
            let retryable = lock(&backend.payments)?
                .iter()
                .any(|p| p.booking_id == booking_id && p.status.is_retryable());
            if !retryable {
                return Err(ApiError::Server {
                    status: 400,
                    message: Some("No failed payment to retry".to_string()),
                });
            }
            backend.order_for(&booking_id)
        }
    }

    fn payment_status(
        &self,
        order_id: &OrderId,
    ) -> impl Future<Output = Result<PaymentStatusReport>> + Send {
        let backend = self.clone();
        let order_id = order_id.clone();

        async move {
            backend.enter().await?;
            lock(&backend.payments)?
                .iter()
                .find(|p| p.order_id == order_id)
                .map(|p| PaymentStatusReport {
                    order_id: p.order_id.clone(),
                    status: p.status,
                })
                .ok_or_else(|| not_found("order", &order_id))
        }
    }
}

impl ChatApi for MockBackend {
    fn send_message(
        &self,
        request: &SendMessageRequest,
    ) -> impl Future<Output = Result<ChatMessage>> + Send {
        let backend = self.clone();
        let request = request.clone();

        async move {
            backend.enter().await?;
            let sender_id = backend.session_user()?;
            let message = ChatMessage {
                id: MessageId::new(backend.next_id("message")),
                sender_id,
                receiver_id: request.receiver_id,
                content: request.content,
                read: false,
                created_at: Utc::now(),
            };
            lock(&backend.messages)?.push(message.clone());
            Ok(message)
        }
    }

    fn chat_history(
        &self,
        user_id: &UserId,
    ) -> impl Future<Output = Result<Vec<ChatMessage>>> + Send {
        let backend = self.clone();
        let user_id = user_id.clone();

        async move {
            backend.enter().await?;
            let me = backend.session_user()?;
            Ok(lock(&backend.messages)?
                .iter()
                .filter(|m| {
                    (m.sender_id == me && m.receiver_id == user_id)
                        || (m.sender_id == user_id && m.receiver_id == me)
                })
                .cloned()
                .collect())
        }
    }

    fn conversations(&self) -> impl Future<Output = Result<Vec<Conversation>>> + Send {
        let backend = self.clone();

        async move {
            backend.enter().await?;
            Ok(lock(&backend.conversations)?.clone())
        }
    }

    fn mark_read(&self, sender_id: &UserId) -> impl Future<Output = Result<()>> + Send {
        let backend = self.clone();
        let sender_id = sender_id.clone();

        async move {
            backend.enter().await?;
            let me = backend.session_user()?;
            for message in lock(&backend.messages)?
                .iter_mut()
                .filter(|m| m.sender_id == sender_id && m.receiver_id == me)
            {
                message.read = true;
            }
            for conversation in lock(&backend.conversations)?
                .iter_mut()
                .filter(|c| c.user_id == sender_id)
            {
                conversation.unread_count = 0;
            }
            Ok(())
        }
    }

    fn unread_count(&self) -> impl Future<Output = Result<u32>> + Send {
        let backend = self.clone();

        async move {
            backend.enter().await?;
            let me = backend.session_user()?;
            let count = lock(&backend.messages)?
                .iter()
                .filter(|m| m.receiver_id == me && !m.read)
                .count();
            Ok(u32::try_from(count).unwrap_or(u32::MAX))
        }
    }

    fn delete_message(&self, id: &MessageId) -> impl Future<Output = Result<MessageId>> + Send {
        let backend = self.clone();
        let id = id.clone();

        async move {
            backend.enter().await?;
            let mut messages = lock(&backend.messages)?;
            let position = messages
                .iter()
                .position(|m| m.id == id)
                .ok_or_else(|| not_found("message", &id))?;
            messages.remove(position);
            Ok(id)
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::types::{HotelDraft, HotelId, Role};

    fn draft(name: &str) -> HotelDraft {
        HotelDraft {
            name: name.to_string(),
            city: "Udaipur".to_string(),
            address: String::new(),
            description: String::new(),
            price_per_night: 5000.0,
            rating: 4.0,
            amenities: vec![],
            images: vec![],
            rooms_available: 2,
        }
    }

    #[tokio::test]
    async fn test_catalog_crud() {
        let backend = MockBackend::new();

        let created = CatalogApi::<Hotel>::create(&backend, &draft("Lake Palace"))
            .await
            .unwrap();
        let updated = CatalogApi::<Hotel>::update(&backend, &created.id, &draft("Lake Palace Deluxe"))
            .await
            .unwrap();
        assert_eq!(updated.name, "Lake Palace Deluxe");

        let deleted = CatalogApi::<Hotel>::delete(&backend, &created.id).await.unwrap();
        assert_eq!(deleted, created.id);
        assert!(backend.records::<Hotel>().is_empty());
    }

    #[tokio::test]
    async fn test_list_paginates() {
        let backend = MockBackend::new();
        for i in 0..5 {
            CatalogApi::<Hotel>::create(&backend, &draft(&format!("Hotel {i}")))
                .await
                .unwrap();
        }

        let page = CatalogApi::<Hotel>::list(&backend, &ListQuery::first_page(2).with_page(3))
            .await
            .unwrap();

        assert_eq!(page.items.len(), 1);
        assert_eq!(page.pagination.map(|p| p.total_pages), Some(3));
    }

    #[tokio::test]
    async fn test_missing_record_is_404() {
        let backend = MockBackend::new();

        let error = CatalogApi::<Hotel>::get(&backend, &HotelId::new("nope"))
            .await
            .unwrap_err();

        assert!(matches!(error, ApiError::Server { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let backend = MockBackend::new();
        backend.fail_with(ApiError::Network("offline".to_string()));

        assert!(backend.payment_history().await.is_err());

        backend.recover();
        assert!(backend.payment_history().await.is_ok());
        assert_eq!(backend.calls(), 2);
    }

    #[tokio::test]
    async fn test_register_verify_login() {
        let backend = MockBackend::new();
        let request = RegisterRequest {
            name: "Asha".to_string(),
            email: "asha@example.com".to_string(),
            phone: None,
            password: "secret1".to_string(),
            role: Role::Agent,
        };

        let user = backend.register(&request).await.unwrap();
        assert!(!user.is_verified);
        assert!(backend.register(&request).await.is_err());

        let verified = backend
            .verify_email(&VerifyEmailRequest {
                email: "asha@example.com".to_string(),
                code: MOCK_VERIFICATION_CODE.to_string(),
            })
            .await
            .unwrap();
        assert!(verified.is_verified);

        let session = backend
            .login(&LoginRequest {
                email: "asha@example.com".to_string(),
                password: "secret1".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(backend.profile().await.unwrap().id, session.user.id);

        backend.logout().await;
        assert!(backend.profile().await.unwrap_err().is_unauthorized());
    }
}
