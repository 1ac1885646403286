//! Auth slice: registration, email verification, login and profile.

use crate::environment::ClientEnvironment;
use chrono::{DateTime, Utc};
use smallvec::{SmallVec, smallvec};
use std::marker::PhantomData;
use travel_desk_api::AuthApi;
use travel_desk_api::types::{LoginRequest, RegisterRequest, Session, User, VerifyEmailRequest};
use travel_desk_core::request::RequestStatus;
use travel_desk_core::{async_effect, effect::Effect, reducer::Reducer, thunk};
use travel_desk_macros::Action;

/// Operation kinds of the auth slice
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AuthOp {
    /// Account creation
    Register,
    /// Credential check
    Login,
    /// Emailed code confirmation
    VerifyEmail,
    /// Session refresh
    Profile,
}

impl AuthOp {
    /// Fixed message used when the server gives none
    #[must_use]
    pub const fn fallback(self) -> &'static str {
        match self {
            Self::Register => "Registration failed",
            Self::Login => "Login failed",
            Self::VerifyEmail => "Email verification failed",
            Self::Profile => "Failed to fetch profile",
        }
    }
}

/// Session state
#[derive(Clone, Debug, Default)]
pub struct AuthState {
    /// The logged-in account
    pub user: Option<User>,
    /// Bearer token of the session
    pub token: Option<String>,
    /// Email waiting for its verification code
    pub pending_verification: Option<String>,
    /// When the session started
    pub logged_in_at: Option<DateTime<Utc>>,
    /// Loading flags and last error
    pub status: RequestStatus<AuthOp>,
}

impl AuthState {
    /// Whether a session exists
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    fn end_session(&mut self) {
        self.user = None;
        self.token = None;
        self.logged_in_at = None;
    }
}

/// Auth actions
#[derive(Action, Clone, Debug)]
pub enum AuthAction {
    /// Create an account
    #[pending]
    Register {
        /// Validated registration form
        request: RegisterRequest,
    },
    /// Account created; a code was emailed
    #[fulfilled]
    Registered {
        /// The new, unverified account
        user: User,
    },
    /// Registration failed
    #[rejected]
    RegisterFailed {
        /// Server message, if any
        message: Option<String>,
    },

    /// Confirm the emailed code
    #[pending]
    VerifyEmail {
        /// Email and code
        request: VerifyEmailRequest,
    },
    /// Email confirmed
    #[fulfilled]
    EmailVerified {
        /// The verified account
        user: User,
    },
    /// Verification failed
    #[rejected]
    VerifyFailed {
        /// Server message, if any
        message: Option<String>,
    },

    /// Log in
    #[pending]
    Login {
        /// Credentials
        request: LoginRequest,
    },
    /// Session established
    #[fulfilled]
    LoggedIn {
        /// Token and account
        session: Session,
    },
    /// Login failed
    #[rejected]
    LoginFailed {
        /// Server message, if any
        message: Option<String>,
    },

    /// Refresh the logged-in account
    #[pending]
    FetchProfile,
    /// Account refreshed
    #[fulfilled]
    ProfileFetched {
        /// The account
        user: User,
    },
    /// Refresh failed; the session is dropped
    #[rejected]
    ProfileFailed {
        /// Server message, if any
        message: Option<String>,
    },

    /// End the session locally
    Logout,
    /// Dismiss the error banner
    ClearError,
}

/// Reducer of the auth slice
pub struct AuthReducer<B> {
    _marker: PhantomData<fn() -> B>,
}

impl<B> AuthReducer<B> {
    /// Create a new auth reducer
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<B> Default for AuthReducer<B> {
    fn default() -> Self {
        Self::new()
    }
}

fn reject(state: &mut AuthState, op: AuthOp, message: Option<String>) {
    tracing::warn!(
        ?op,
        message = message.as_deref().unwrap_or_default(),
        "Auth request rejected"
    );
    state.status.rejected(op, message, op.fallback());
}

impl<B> Reducer for AuthReducer<B>
where
    B: AuthApi + Clone + 'static,
{
    type State = AuthState;
    type Action = AuthAction;
    type Environment = ClientEnvironment<B>;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            AuthAction::Register { request } => {
                state.status.pending(AuthOp::Register);

                let api = env.api.clone();
                smallvec![thunk! {
                    request: api.register(&request),
                    on_success: |user| AuthAction::Registered { user },
                    on_error: |error| AuthAction::RegisterFailed { message: error.server_message() },
                }]
            },
            AuthAction::Registered { user } => {
                state.status.fulfilled(AuthOp::Register);
                tracing::info!(user_id = %user.id, "Account registered, verification pending");
                state.pending_verification = Some(user.email);
                SmallVec::new()
            },
            AuthAction::RegisterFailed { message } => {
                reject(state, AuthOp::Register, message);
                state.pending_verification = None;
                SmallVec::new()
            },

            AuthAction::VerifyEmail { request } => {
                state.status.pending(AuthOp::VerifyEmail);

                let api = env.api.clone();
                smallvec![thunk! {
                    request: api.verify_email(&request),
                    on_success: |user| AuthAction::EmailVerified { user },
                    on_error: |error| AuthAction::VerifyFailed { message: error.server_message() },
                }]
            },
            AuthAction::EmailVerified { user } => {
                state.status.fulfilled(AuthOp::VerifyEmail);
                state.pending_verification = None;
                if state.user.as_ref().is_some_and(|current| current.id == user.id) {
                    state.user = Some(user);
                }
                SmallVec::new()
            },
            AuthAction::VerifyFailed { message } => {
                reject(state, AuthOp::VerifyEmail, message);
                SmallVec::new()
            },

            AuthAction::Login { request } => {
                state.status.pending(AuthOp::Login);

                let api = env.api.clone();
                smallvec![thunk! {
                    request: api.login(&request),
                    on_success: |session| AuthAction::LoggedIn { session },
                    on_error: |error| AuthAction::LoginFailed { message: error.server_message() },
                }]
            },
            AuthAction::LoggedIn { session } => {
                state.status.fulfilled(AuthOp::Login);
                tracing::info!(user_id = %session.user.id, "Logged in");
                state.token = Some(session.token);
                state.user = Some(session.user);
                state.logged_in_at = Some(env.clock.now());
                SmallVec::new()
            },
            AuthAction::LoginFailed { message } => {
                reject(state, AuthOp::Login, message);
                state.end_session();
                SmallVec::new()
            },

            AuthAction::FetchProfile => {
                state.status.pending(AuthOp::Profile);

                let api = env.api.clone();
                smallvec![thunk! {
                    request: api.profile(),
                    on_success: |user| AuthAction::ProfileFetched { user },
                    on_error: |error| AuthAction::ProfileFailed { message: error.server_message() },
                }]
            },
            AuthAction::ProfileFetched { user } => {
                state.status.fulfilled(AuthOp::Profile);
                state.user = Some(user);
                SmallVec::new()
            },
            AuthAction::ProfileFailed { message } => {
                reject(state, AuthOp::Profile, message);
                state.end_session();
                SmallVec::new()
            },

            AuthAction::Logout => {
                state.end_session();
                state.status.clear_error();

                let api = env.api.clone();
                smallvec![async_effect! {
                    api.logout().await;
                    None
                }]
            },
            AuthAction::ClearError => {
                state.status.clear_error();
                SmallVec::new()
            },
        }
    }
}
