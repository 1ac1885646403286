//! Given/when/then driver for slice reducers
//!
//! Reduces a sequence of actions against a starting state without a store or
//! a network, then checks the final state and the last action's effects.

#![allow(clippy::module_name_repetitions)]

use smallvec::SmallVec;
use travel_desk_core::{effect::Effect, reducer::Reducer};

type Check<T> = Box<dyn FnOnce(&T)>;
type EffectCheck<A> = Box<dyn FnOnce(&[Effect<A>])>;

/// Scripted reducer run
///
/// Actions are reduced in the order given. Effect checks only see what the
/// last action returned, which is how a request lifecycle is replayed:
///
/// ```ignore
/// use travel_desk_testing::ReducerTest;
///
/// ReducerTest::new(HotelReducer::new())
///     .with_env(test_environment())
///     .given_state(HotelState::default())
///     .when_action(CatalogAction::Fetch { query: ListQuery::default() })
///     .when_action(CatalogAction::FetchFailed { message: None })
///     .then_state(|state| {
///         assert!(!state.status.is_loading(CatalogOp::FetchList));
///         assert_eq!(state.status.error(), Some("Failed to fetch hotels"));
///     })
///     .then_effects(assertions::assert_no_effects)
///     .run();
/// ```
pub struct ReducerTest<R, S, A, E>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    reducer: R,
    env: Option<E>,
    given: Option<S>,
    script: Vec<A>,
    state_checks: Vec<Check<S>>,
    effect_checks: Vec<EffectCheck<A>>,
}

impl<R, S, A, E> ReducerTest<R, S, A, E>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    /// Start a script for `reducer`
    #[must_use]
    pub const fn new(reducer: R) -> Self {
        Self {
            reducer,
            env: None,
            given: None,
            script: Vec::new(),
            state_checks: Vec::new(),
            effect_checks: Vec::new(),
        }
    }

    /// Environment handed to every reduce call
    #[must_use]
    pub fn with_env(mut self, env: E) -> Self {
        self.env = Some(env);
        self
    }

    /// Starting state
    #[must_use]
    pub fn given_state(mut self, state: S) -> Self {
        self.given = Some(state);
        self
    }

    /// Append one action to the script
    #[must_use]
    pub fn when_action(mut self, action: A) -> Self {
        self.script.push(action);
        self
    }

    /// Append several actions to the script
    #[must_use]
    pub fn when_actions(mut self, actions: impl IntoIterator<Item = A>) -> Self {
        self.script.extend(actions);
        self
    }

    /// Check the state after the whole script
    #[must_use]
    pub fn then_state(mut self, check: impl FnOnce(&S) + 'static) -> Self {
        self.state_checks.push(Box::new(check));
        self
    }

    /// Check the effects returned by the last action
    #[must_use]
    pub fn then_effects(mut self, check: impl FnOnce(&[Effect<A>]) + 'static) -> Self {
        self.effect_checks.push(Box::new(check));
        self
    }

    /// Reduce the script and run every check
    ///
    /// Hands back the final state and the last effects, ready for
    /// [`crate::settle`].
    ///
    /// # Panics
    ///
    /// When the state, the environment or the script is missing, or when a
    /// check fails.
    #[allow(clippy::panic, clippy::expect_used)] // Test code can panic
    pub fn run(self) -> (S, SmallVec<[Effect<A>; 4]>) {
        let Self {
            reducer,
            env,
            given,
            script,
            state_checks,
            effect_checks,
        } = self;

        let env = env.expect("call with_env() before run()");
        let mut state = given.expect("call given_state() before run()");
        assert!(!script.is_empty(), "script is empty, call when_action()");

        let effects = script
            .into_iter()
            .fold(SmallVec::new(), |_, action| reducer.reduce(&mut state, action, &env));

        state_checks.into_iter().for_each(|check| check(&state));
        effect_checks.into_iter().for_each(|check| check(&effects));

        (state, effects)
    }
}

/// Effect checks for [`ReducerTest::then_effects`]
pub mod assertions {
    use travel_desk_core::effect::Effect;

    /// Only `Effect::None` (or nothing) was returned
    ///
    /// # Panics
    ///
    /// On any request effect.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_no_effects<A: std::fmt::Debug>(effects: &[Effect<A>]) {
        assert!(
            effects.iter().all(Effect::is_none),
            "expected a local-only action, got {effects:?}"
        );
    }

    /// Exactly `expected` top-level effects
    ///
    /// # Panics
    ///
    /// On a different count.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_effects_count<A>(effects: &[Effect<A>], expected: usize) {
        assert_eq!(effects.len(), expected, "unexpected number of effects");
    }

    /// At least one request was started, possibly inside `Parallel`
    ///
    /// # Panics
    ///
    /// When no `Effect::Future` is present.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_has_future_effect<A>(effects: &[Effect<A>]) {
        assert!(
            effects.iter().any(|e| match e {
                Effect::Future(_) => true,
                Effect::Parallel(inner) => inner.iter().any(|e| matches!(e, Effect::Future(_))),
                Effect::None => false,
            }),
            "expected the action to start a request"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    #[derive(Clone, Debug, Default)]
    struct TestState {
        loading: bool,
        values: Vec<i32>,
        error: Option<String>,
    }

    #[derive(Clone, Debug, PartialEq)]
    enum TestAction {
        Load,
        Loaded(Vec<i32>),
        Failed(String),
    }

    struct TestReducer;

    struct TestEnv;

    impl Reducer for TestReducer {
        type State = TestState;
        type Action = TestAction;
        type Environment = TestEnv;

        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            _env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]> {
            match action {
                TestAction::Load => {
                    state.loading = true;
                    state.error = None;
                    smallvec![Effect::Future(Box::pin(async {
                        Some(TestAction::Loaded(vec![1, 2]))
                    }))]
                },
                TestAction::Loaded(values) => {
                    state.loading = false;
                    state.values = values;
                    smallvec![Effect::None]
                },
                TestAction::Failed(message) => {
                    state.loading = false;
                    state.error = Some(message);
                    SmallVec::new()
                },
            }
        }
    }

    #[test]
    fn test_pending_raises_flag_and_returns_request() {
        ReducerTest::new(TestReducer)
            .with_env(TestEnv)
            .given_state(TestState::default())
            .when_action(TestAction::Load)
            .then_state(|state| {
                assert!(state.loading);
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_future_effect(effects);
            })
            .run();
    }

    #[test]
    fn test_action_sequence_replays_lifecycle() {
        let (state, _) = ReducerTest::new(TestReducer)
            .with_env(TestEnv)
            .given_state(TestState::default())
            .when_actions([TestAction::Load, TestAction::Failed("offline".to_string())])
            .then_state(|state| {
                assert!(!state.loading);
            })
            .then_effects(assertions::assert_no_effects)
            .run();

        assert_eq!(state.error.as_deref(), Some("offline"));
    }

    #[tokio::test]
    async fn test_settle_feeds_result_back() {
        let (mut state, effects) = ReducerTest::new(TestReducer)
            .with_env(TestEnv)
            .given_state(TestState::default())
            .when_action(TestAction::Load)
            .run();

        let results = crate::settle(effects).await;
        assert_eq!(results, vec![TestAction::Loaded(vec![1, 2])]);

        for action in results {
            let _ = TestReducer.reduce(&mut state, action, &TestEnv);
        }
        assert_eq!(state.values, vec![1, 2]);
        assert!(!state.loading);
    }

    #[test]
    fn test_assertions_no_effects() {
        assertions::assert_no_effects::<TestAction>(&[Effect::None]);
        assertions::assert_no_effects::<TestAction>(&[]);
    }
}
