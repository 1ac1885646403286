//! Payment slice: gateway orders, history, details and status checks.
//!
//! Retrying a failed payment is an explicit user action
//! ([`PaymentAction::Retry`]), never an automatic reaction to a rejection.

use crate::environment::ClientEnvironment;
use smallvec::{SmallVec, smallvec};
use std::marker::PhantomData;
use travel_desk_api::PaymentApi;
use travel_desk_api::types::{
    BookingId, OrderId, Payment, PaymentId, PaymentOrder, PaymentStatusReport,
};
use travel_desk_core::collection::EntityCollection;
use travel_desk_core::request::RequestStatus;
use travel_desk_core::{effect::Effect, reducer::Reducer, thunk};
use travel_desk_macros::Action;

/// Operation kinds of the payment slice
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PaymentOp {
    /// Order creation
    Create,
    /// History fetch
    History,
    /// Single payment fetch
    Details,
    /// Explicit retry
    Retry,
    /// Gateway status poll
    Status,
}

impl PaymentOp {
    /// Fixed message used when the server gives none
    #[must_use]
    pub const fn fallback(self) -> &'static str {
        match self {
            Self::Create => "Failed to create payment",
            Self::History => "Failed to fetch payment history",
            Self::Details => "Failed to fetch payment details",
            Self::Retry => "Failed to retry payment",
            Self::Status => "Failed to fetch payment status",
        }
    }
}

/// Payment state
#[derive(Clone, Debug, Default)]
pub struct PaymentState {
    /// Payment history
    pub payments: EntityCollection<Payment>,
    /// Payment open on the details screen
    pub current: Option<Payment>,
    /// Gateway order awaiting checkout
    pub order: Option<PaymentOrder>,
    /// Result of the last status poll
    pub last_status: Option<PaymentStatusReport>,
    /// Loading flags and last error
    pub status: RequestStatus<PaymentOp>,
}

impl PaymentState {
    /// Merge a freshly created order and its payment record
    fn accept_order(&mut self, order: PaymentOrder) {
        self.payments.upsert(order.payment.clone());
        self.order = Some(order);
    }
}

/// Payment actions
#[derive(Action, Clone, Debug)]
pub enum PaymentAction {
    /// Create a gateway order for a booking
    #[pending]
    Create {
        /// Booking to pay for
        booking_id: BookingId,
    },
    /// Order created
    #[fulfilled]
    Created {
        /// The order
        order: PaymentOrder,
    },
    /// Order creation failed
    #[rejected]
    CreateFailed {
        /// Server message, if any
        message: Option<String>,
    },

    /// Fetch the payment history
    #[pending]
    FetchHistory,
    /// History arrived
    #[fulfilled]
    HistoryFetched {
        /// Payments, newest first as served
        payments: Vec<Payment>,
    },
    /// History fetch failed
    #[rejected]
    HistoryFailed {
        /// Server message, if any
        message: Option<String>,
    },

    /// Fetch one payment
    #[pending]
    FetchDetails {
        /// Payment to open
        id: PaymentId,
    },
    /// Payment arrived
    #[fulfilled]
    DetailsFetched {
        /// The payment
        payment: Payment,
    },
    /// Payment fetch failed
    #[rejected]
    DetailsFailed {
        /// Server message, if any
        message: Option<String>,
    },

    /// Create a fresh order for a failed payment
    #[pending]
    Retry {
        /// Booking whose payment failed
        booking_id: BookingId,
    },
    /// Retry order created
    #[fulfilled]
    Retried {
        /// The new order
        order: PaymentOrder,
    },
    /// Retry failed
    #[rejected]
    RetryFailed {
        /// Server message, if any
        message: Option<String>,
    },

    /// Poll the gateway status of an order
    #[pending]
    CheckStatus {
        /// Order to poll
        order_id: OrderId,
    },
    /// Status arrived
    #[fulfilled]
    StatusFetched {
        /// Order and status
        report: PaymentStatusReport,
    },
    /// Status poll failed
    #[rejected]
    StatusFailed {
        /// Server message, if any
        message: Option<String>,
    },

    /// Forget the checkout order
    ClearOrder,
    /// Close the details screen
    ClearCurrent,
    /// Dismiss the error banner
    ClearError,
}

/// Reducer of the payment slice
pub struct PaymentReducer<B> {
    _marker: PhantomData<fn() -> B>,
}

impl<B> PaymentReducer<B> {
    /// Create a new payment reducer
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<B> Default for PaymentReducer<B> {
    fn default() -> Self {
        Self::new()
    }
}

fn reject(state: &mut PaymentState, op: PaymentOp, message: Option<String>) {
    tracing::warn!(
        ?op,
        message = message.as_deref().unwrap_or_default(),
        "Payment request rejected"
    );
    state.status.rejected(op, message, op.fallback());
}

impl<B> Reducer for PaymentReducer<B>
where
    B: PaymentApi + Clone + 'static,
{
    type State = PaymentState;
    type Action = PaymentAction;
    type Environment = ClientEnvironment<B>;

    #[allow(clippy::too_many_lines)]
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            PaymentAction::Create { booking_id } => {
                state.status.pending(PaymentOp::Create);

                let api = env.api.clone();
                smallvec![thunk! {
                    request: api.create_payment(&booking_id),
                    on_success: |order| PaymentAction::Created { order },
                    on_error: |error| PaymentAction::CreateFailed { message: error.server_message() },
                }]
            },
            PaymentAction::Created { order } => {
                state.status.fulfilled(PaymentOp::Create);
                tracing::info!(order_id = %order.order_id, booking_id = %order.booking_id, "Payment order created");
                state.accept_order(order);
                SmallVec::new()
            },
            PaymentAction::CreateFailed { message } => {
                reject(state, PaymentOp::Create, message);
                state.order = None;
                SmallVec::new()
            },

            PaymentAction::FetchHistory => {
                state.status.pending(PaymentOp::History);

                let api = env.api.clone();
                smallvec![thunk! {
                    request: api.payment_history(),
                    on_success: |payments| PaymentAction::HistoryFetched { payments },
                    on_error: |error| PaymentAction::HistoryFailed { message: error.server_message() },
                }]
            },
            PaymentAction::HistoryFetched { payments } => {
                state.status.fulfilled(PaymentOp::History);
                state.payments.replace(payments);
                SmallVec::new()
            },
            PaymentAction::HistoryFailed { message } => {
                reject(state, PaymentOp::History, message);
                state.payments.clear();
                SmallVec::new()
            },

            PaymentAction::FetchDetails { id } => {
                state.status.pending(PaymentOp::Details);

                let api = env.api.clone();
                smallvec![thunk! {
                    request: api.payment_details(&id),
                    on_success: |payment| PaymentAction::DetailsFetched { payment },
                    on_error: |error| PaymentAction::DetailsFailed { message: error.server_message() },
                }]
            },
            PaymentAction::DetailsFetched { payment } => {
                state.status.fulfilled(PaymentOp::Details);
                state.current = Some(payment);
                SmallVec::new()
            },
            PaymentAction::DetailsFailed { message } => {
                reject(state, PaymentOp::Details, message);
                state.current = None;
                SmallVec::new()
            },

            PaymentAction::Retry { booking_id } => {
                state.status.pending(PaymentOp::Retry);
                tracing::info!(%booking_id, "Retrying payment");

                let api = env.api.clone();
                smallvec![thunk! {
                    request: api.retry_payment(&booking_id),
                    on_success: |order| PaymentAction::Retried { order },
                    on_error: |error| PaymentAction::RetryFailed { message: error.server_message() },
                }]
            },
            PaymentAction::Retried { order } => {
                state.status.fulfilled(PaymentOp::Retry);
                state.accept_order(order);
                SmallVec::new()
            },
            PaymentAction::RetryFailed { message } => {
                reject(state, PaymentOp::Retry, message);
                SmallVec::new()
            },

            PaymentAction::CheckStatus { order_id } => {
                state.status.pending(PaymentOp::Status);

                let api = env.api.clone();
                smallvec![thunk! {
                    request: api.payment_status(&order_id),
                    on_success: |report| PaymentAction::StatusFetched { report },
                    on_error: |error| PaymentAction::StatusFailed { message: error.server_message() },
                }]
            },
            PaymentAction::StatusFetched { report } => {
                state.status.fulfilled(PaymentOp::Status);
                for payment in state
                    .payments
                    .iter_mut()
                    .filter(|p| p.order_id == report.order_id)
                {
                    payment.status = report.status;
                }
                if let Some(order) = state.order.as_mut().filter(|o| o.order_id == report.order_id) {
                    order.payment.status = report.status;
                }
                state.last_status = Some(report);
                SmallVec::new()
            },
            PaymentAction::StatusFailed { message } => {
                reject(state, PaymentOp::Status, message);
                state.last_status = None;
                SmallVec::new()
            },

            PaymentAction::ClearOrder => {
                state.order = None;
                state.last_status = None;
                SmallVec::new()
            },
            PaymentAction::ClearCurrent => {
                state.current = None;
                SmallVec::new()
            },
            PaymentAction::ClearError => {
                state.status.clear_error();
                SmallVec::new()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::panic, clippy::unwrap_used)] // Test code can panic

    use super::*;
    use chrono::Utc;
    use std::sync::Arc;
    use travel_desk_api::mocks::MockBackend;
    use travel_desk_api::types::PaymentStatus;
    use travel_desk_testing::{ReducerTest, assertions, settle, test_clock};

    fn env(backend: &MockBackend) -> ClientEnvironment<MockBackend> {
        ClientEnvironment::with_clock(backend.clone(), Arc::new(test_clock()))
    }

    fn payment(id: &str, order: &str, status: PaymentStatus) -> Payment {
        Payment {
            id: PaymentId::new(id),
            booking_id: BookingId::new("b-1"),
            order_id: OrderId::new(order),
            amount_minor: 450_000,
            currency: "INR".to_string(),
            status,
            method: None,
            created_at: Utc::now(),
        }
    }

    fn with_history(payments: Vec<Payment>) -> PaymentState {
        PaymentState {
            payments: EntityCollection::from(payments),
            ..PaymentState::default()
        }
    }

    #[test]
    fn test_history_fetched_replaces() {
        let backend = MockBackend::new();
        let fresh = vec![payment("p-2", "o-2", PaymentStatus::Paid)];

        ReducerTest::new(PaymentReducer::<MockBackend>::new())
            .with_env(env(&backend))
            .given_state(with_history(vec![payment("p-1", "o-1", PaymentStatus::Failed)]))
            .when_action(PaymentAction::FetchHistory)
            .when_action(PaymentAction::HistoryFetched { payments: fresh.clone() })
            .then_state(move |state| {
                assert_eq!(state.payments.as_slice(), fresh.as_slice());
                assert!(!state.status.is_loading(PaymentOp::History));
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_history_failed_never_shows_stale_payments() {
        let backend = MockBackend::new();

        ReducerTest::new(PaymentReducer::<MockBackend>::new())
            .with_env(env(&backend))
            .given_state(with_history(vec![payment("p-1", "o-1", PaymentStatus::Paid)]))
            .when_action(PaymentAction::FetchHistory)
            .when_action(PaymentAction::HistoryFailed { message: Some(" ".to_string()) })
            .then_state(|state| {
                assert!(state.payments.is_empty());
                assert_eq!(state.status.error(), Some("Failed to fetch payment history"));
            })
            .run();
    }

    #[test]
    fn test_retry_failed_keeps_history() {
        let backend = MockBackend::new();

        ReducerTest::new(PaymentReducer::<MockBackend>::new())
            .with_env(env(&backend))
            .given_state(with_history(vec![payment("p-1", "o-1", PaymentStatus::Failed)]))
            .when_action(PaymentAction::Retry { booking_id: BookingId::new("b-1") })
            .when_action(PaymentAction::RetryFailed { message: None })
            .then_state(|state| {
                assert_eq!(state.payments.len(), 1);
                assert_eq!(state.status.error(), Some("Failed to retry payment"));
                assert!(!state.status.is_busy());
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_status_fetched_updates_matching_payment() {
        let backend = MockBackend::new();

        ReducerTest::new(PaymentReducer::<MockBackend>::new())
            .with_env(env(&backend))
            .given_state(with_history(vec![
                payment("p-1", "o-1", PaymentStatus::Pending),
                payment("p-2", "o-2", PaymentStatus::Pending),
            ]))
            .when_action(PaymentAction::StatusFetched {
                report: PaymentStatusReport {
                    order_id: OrderId::new("o-2"),
                    status: PaymentStatus::Paid,
                },
            })
            .then_state(|state| {
                let statuses: Vec<_> = state.payments.iter().map(|p| p.status).collect();
                assert_eq!(statuses, vec![PaymentStatus::Pending, PaymentStatus::Paid]);
                assert_eq!(state.last_status.as_ref().map(|r| r.status), Some(PaymentStatus::Paid));
            })
            .run();
    }

    #[tokio::test]
    async fn test_retry_creates_new_order_for_failed_payment() {
        let backend = MockBackend::new();
        backend.seed(vec![travel_desk_api::types::Booking {
            id: BookingId::new("b-1"),
            kind: travel_desk_api::types::BookingKind::Hotel,
            item_id: "h-1".to_string(),
            item_name: "Sea Breeze".to_string(),
            customer_name: "Ravi".to_string(),
            customer_email: String::new(),
            travelers: 2,
            amount: 4500.0,
            status: travel_desk_api::types::BookingStatus::Pending,
            created_at: Utc::now(),
        }]);
        backend.add_payment(payment("p-1", "o-1", PaymentStatus::Failed));

        let reducer = PaymentReducer::<MockBackend>::new();
        let mut state = PaymentState::default();
        let env = env(&backend);

        let results = settle(reducer.reduce(
            &mut state,
            PaymentAction::Retry { booking_id: BookingId::new("b-1") },
            &env,
        ))
        .await;

        let [PaymentAction::Retried { order }] = results.as_slice() else {
            panic!("expected a retry order, got {results:?}");
        };
        assert_eq!(order.amount_minor, 450_000);

        let _ = reducer.reduce(&mut state, results[0].clone(), &env);
        assert!(state.order.is_some());
        assert_eq!(state.payments.len(), 1);
    }
}
