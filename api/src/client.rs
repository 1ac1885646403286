//! Booking backend HTTP client implementation

use crate::backend::{AuthApi, CatalogApi, ChatApi, PaymentApi, Resource, Result};
use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::types::{
    BookingId, ChatMessage, Conversation, CreatePaymentRequest, Envelope, ErrorBody, ListQuery,
    LoginRequest, MessageId, OrderId, Page, Payment, PaymentId, PaymentOrder,
    PaymentStatusReport, RegisterRequest, SendMessageRequest, Session, UnreadCount, User, UserId,
    VerifyEmailRequest,
};
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::de::{DeserializeOwned, IgnoredAny};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Booking backend client
///
/// Cloning is cheap; clones share the connection pool and the session token.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Arc<RwLock<Option<String>>>,
}

impl ApiClient {
    /// Create a new client from environment variables
    ///
    /// # Errors
    ///
    /// Returns `ApiError::MissingConfig` if `TRAVEL_DESK_API_URL` is set but blank
    pub fn from_env() -> Result<Self> {
        Ok(Self::from_config(&ApiConfig::from_env()?))
    }

    /// Create a new client from explicit settings
    #[must_use]
    pub fn from_config(config: &ApiConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url.clone(),
            token: Arc::new(RwLock::new(config.token.clone())),
        }
    }

    /// Create a new client for a backend at `base_url`, without a session
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::from_config(&ApiConfig::new(base_url))
    }

    /// Backend base URL
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Current bearer token
    pub async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    /// Replace the bearer token
    pub async fn set_token(&self, token: Option<String>) {
        *self.token.write().await = token;
    }

    /// Resolve `route` and an optional id against the base URL
    ///
    /// The id is pushed as one escaped path segment, so `/`, `?` and `#`
    /// inside it never change which endpoint is hit.
    fn url(&self, route: &str, id: Option<&str>) -> Result<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|e| ApiError::InvalidUrl(e.to_string()))?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| ApiError::InvalidUrl(self.base_url.clone()))?;
            segments
                .pop_if_empty()
                .extend(route.split('/').filter(|segment| !segment.is_empty()));
            if let Some(id) = id {
                segments.push(id);
            }
        }
        Ok(url)
    }

    fn request(&self, method: Method, route: &str, id: Option<&str>) -> Result<RequestBuilder> {
        let url = self.url(route, id)?;
        tracing::debug!(%method, %url, "Sending request");
        Ok(self.client.request(method, url))
    }

    /// Send a request and unwrap the response envelope
    async fn execute<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<Envelope<T>> {
        let token = self.token.read().await.clone();
        let builder = match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        };

        let response = builder.send().await.map_err(|e| {
            tracing::warn!(error = %e, "Request failed");
            ApiError::Network(e.to_string())
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|error| error.message);
            tracing::warn!(
                status = status.as_u16(),
                message = message.as_deref().unwrap_or_default(),
                "Request rejected"
            );

            return Err(if status == StatusCode::UNAUTHORIZED {
                ApiError::Unauthorized { message }
            } else {
                ApiError::Server {
                    status: status.as_u16(),
                    message,
                }
            });
        }

        if body.trim().is_empty() {
            return Ok(Envelope {
                success: None,
                data: None,
                pagination: None,
                message: None,
            });
        }

        let envelope: Envelope<T> = serde_json::from_str(&body).map_err(|e| {
            tracing::warn!(error = %e, "Response parsing failed");
            ApiError::Decode(e.to_string())
        })?;

        if envelope.success == Some(false) {
            tracing::warn!(message = envelope.message.as_deref().unwrap_or_default(), "Request rejected");
            return Err(ApiError::Server {
                status: status.as_u16(),
                message: envelope.message,
            });
        }

        Ok(envelope)
    }

    /// Send a request whose envelope must carry `data`
    async fn fetch<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        self.execute::<T>(builder).await?.data.ok_or(ApiError::MissingData)
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl<T: Resource> CatalogApi<T> for ApiClient {
    async fn list(&self, query: &ListQuery) -> Result<Page<T>> {
        let envelope = self
            .execute::<Vec<T>>(self.request(Method::GET, T::PATH, None)?.query(query))
            .await?;

        Ok(Page {
            items: envelope.data.ok_or(ApiError::MissingData)?,
            pagination: envelope.pagination,
        })
    }

    async fn get(&self, id: &T::Id) -> Result<T> {
        self.fetch(self.request(Method::GET, T::PATH, Some(&id.to_string()))?)
            .await
    }

    async fn create(&self, draft: &T::Draft) -> Result<T> {
        self.fetch(self.request(Method::POST, T::PATH, None)?.json(draft))
            .await
    }

    async fn update(&self, id: &T::Id, draft: &T::Draft) -> Result<T> {
        self.fetch(self.request(Method::PUT, T::PATH, Some(&id.to_string()))?.json(draft))
            .await
    }

    async fn delete(&self, id: &T::Id) -> Result<T::Id> {
        self.execute::<IgnoredAny>(self.request(Method::DELETE, T::PATH, Some(&id.to_string()))?)
            .await?;
        Ok(id.clone())
    }
}

impl AuthApi for ApiClient {
    async fn register(&self, request: &RegisterRequest) -> Result<User> {
        self.fetch(self.request(Method::POST, "/api/user/register", None)?.json(request))
            .await
    }

    async fn login(&self, request: &LoginRequest) -> Result<Session> {
        let session: Session = self
            .fetch(self.request(Method::POST, "/api/user/login", None)?.json(request))
            .await?;

        self.set_token(Some(session.token.clone())).await;
        tracing::info!(user = %session.user.id, "Logged in");
        Ok(session)
    }

    async fn verify_email(&self, request: &VerifyEmailRequest) -> Result<User> {
        self.fetch(self.request(Method::POST, "/api/user/verify-email", None)?.json(request))
            .await
    }

    async fn profile(&self) -> Result<User> {
        self.fetch(self.request(Method::GET, "/api/user/profile", None)?)
            .await
    }

    async fn logout(&self) {
        self.set_token(None).await;
        tracing::info!("Logged out");
    }
}

impl PaymentApi for ApiClient {
    async fn create_payment(&self, booking_id: &BookingId) -> Result<PaymentOrder> {
        let body = CreatePaymentRequest {
            booking_id: booking_id.clone(),
        };
        self.fetch(self.request(Method::POST, "/payment", None)?.json(&body))
            .await
    }

    async fn payment_history(&self) -> Result<Vec<Payment>> {
        self.fetch(self.request(Method::GET, "/payment/history", None)?)
            .await
    }

    async fn payment_details(&self, id: &PaymentId) -> Result<Payment> {
        self.fetch(self.request(Method::GET, "/payment", Some(id.as_str()))?)
            .await
    }

    async fn retry_payment(&self, booking_id: &BookingId) -> Result<PaymentOrder> {
        self.fetch(self.request(Method::POST, "/payment/retry", Some(booking_id.as_str()))?)
            .await
    }

    async fn payment_status(&self, order_id: &OrderId) -> Result<PaymentStatusReport> {
        self.fetch(self.request(Method::GET, "/payment/status", Some(order_id.as_str()))?)
            .await
    }
}

impl ChatApi for ApiClient {
    async fn send_message(&self, request: &SendMessageRequest) -> Result<ChatMessage> {
        self.fetch(self.request(Method::POST, "/chat/send", None)?.json(request))
            .await
    }

    async fn chat_history(&self, user_id: &UserId) -> Result<Vec<ChatMessage>> {
        self.fetch(self.request(Method::GET, "/chat/history", Some(user_id.as_str()))?)
            .await
    }

    async fn conversations(&self) -> Result<Vec<Conversation>> {
        self.fetch(self.request(Method::GET, "/chat/list", None)?)
            .await
    }

    async fn mark_read(&self, sender_id: &UserId) -> Result<()> {
        self.execute::<IgnoredAny>(self.request(Method::PUT, "/chat/mark-read", Some(sender_id.as_str()))?)
            .await?;
        Ok(())
    }

    async fn unread_count(&self) -> Result<u32> {
        let unread: UnreadCount = self
            .fetch(self.request(Method::GET, "/chat/unread-count", None)?)
            .await?;
        Ok(unread.count)
    }

    async fn delete_message(&self, id: &MessageId) -> Result<MessageId> {
        self.execute::<IgnoredAny>(self.request(Method::DELETE, "/chat/message", Some(id.as_str()))?)
            .await?;
        Ok(id.clone())
    }
}
