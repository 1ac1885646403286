//! Declarative macros for ergonomic effect construction
//!
//! These macros reduce boilerplate when turning a backend call into an
//! `Effect::Future` that feeds a fulfilled or rejected action back to the store.

/// Create an `Effect::Future` that awaits one request and maps its outcome
///
/// The request expression is evaluated inside an `async move` block, so every
/// value it borrows must be an owned local captured by the block.
///
/// # Example
///
/// ```rust,ignore
/// use travel_desk_core::thunk;
///
/// let api = env.api.clone();
/// thunk! {
///     request: api.history(),
///     on_success: |payments| PaymentAction::HistoryFetched { payments },
///     on_error: |error| PaymentAction::HistoryFailed { message: error.server_message() }
/// }
/// ```
#[macro_export]
macro_rules! thunk {
    (
        request: $request:expr,
        on_success: |$success_param:pat_param| $success_body:expr,
        on_error: |$error_param:ident| $error_body:expr $(,)?
    ) => {
        $crate::effect::Effect::Future(::std::boxed::Box::pin(async move {
            match $request.await {
                ::std::result::Result::Ok($success_param) => {
                    ::std::option::Option::Some($success_body)
                },
                ::std::result::Result::Err($error_param) => {
                    ::std::option::Option::Some($error_body)
                },
            }
        }))
    };
}

/// Create an `Effect::Future` from an async block
///
/// # Example
///
/// ```rust,ignore
/// use travel_desk_core::async_effect;
///
/// async_effect! {
///     api.logout().await;
///     None
/// }
/// ```
#[macro_export]
macro_rules! async_effect {
    ($($body:tt)*) => {
        $crate::effect::Effect::Future(
            ::std::boxed::Box::pin(async move { $($body)* })
        )
    };
}

#[cfg(test)]
mod tests {
    #![allow(clippy::panic)] // Test code can panic

    use crate::effect::Effect;

    #[derive(Clone, Debug, PartialEq)]
    enum TestAction {
        Loaded { value: i32 },
        Failed { message: String },
        LoggedOut,
    }

    async fn succeed() -> Result<i32, String> {
        Ok(42)
    }

    async fn fail() -> Result<i32, String> {
        Err("boom".to_string())
    }

    #[tokio::test]
    async fn test_thunk_maps_success() {
        let effect = thunk! {
            request: succeed(),
            on_success: |value| TestAction::Loaded { value },
            on_error: |message| TestAction::Failed { message },
        };

        let Effect::Future(fut) = effect else {
            panic!("thunk! must build a future effect");
        };
        assert_eq!(fut.await, Some(TestAction::Loaded { value: 42 }));
    }

    #[tokio::test]
    async fn test_thunk_maps_error() {
        let effect = thunk! {
            request: fail(),
            on_success: |value| TestAction::Loaded { value },
            on_error: |message| TestAction::Failed { message }
        };

        let Effect::Future(fut) = effect else {
            panic!("thunk! must build a future effect");
        };
        assert_eq!(
            fut.await,
            Some(TestAction::Failed {
                message: "boom".to_string()
            })
        );
    }

    #[test]
    fn test_async_effect_macro() {
        let effect = async_effect! {
            Some(TestAction::LoggedOut)
        };

        assert!(matches!(effect, Effect::Future(_)));
    }
}
