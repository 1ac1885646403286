//! Reducer composition utilities
//!
//! The client store is one app state made of independent slices. This module
//! provides the glue:
//! - **`combine_reducers`**: Run multiple reducers on the same state/action
//! - **`scope_reducer`**: Embed a slice reducer into the app state and action
//!
//! # Examples
//!
//! ```
//! use travel_desk_core::{smallvec, effect::Effect, reducer::Reducer, SmallVec};
//! use travel_desk_core::composition::{combine_reducers, scope_reducer};
//!
//! #[derive(Clone, Default)]
//! struct CartState { items: u32 }
//!
//! #[derive(Clone, Debug)]
//! enum CartAction { Add }
//!
//! #[derive(Clone, Default)]
//! struct AppState { cart: CartState }
//!
//! #[derive(Clone, Debug)]
//! enum AppAction { Cart(CartAction) }
//!
//! struct CartReducer;
//!
//! impl Reducer for CartReducer {
//!     type State = CartState;
//!     type Action = CartAction;
//!     type Environment = ();
//!
//!     fn reduce(&self, state: &mut CartState, action: CartAction, _env: &()) -> SmallVec<[Effect<CartAction>; 4]> {
//!         match action {
//!             CartAction::Add => state.items += 1,
//!         }
//!         smallvec![Effect::None]
//!     }
//! }
//!
//! let app = combine_reducers(vec![Box::new(scope_reducer(
//!     CartReducer,
//!     |s: &mut AppState| &mut s.cart,
//!     |a: AppAction| match a { AppAction::Cart(a) => Some(a) },
//!     AppAction::Cart,
//! ))]);
//!
//! let mut state = AppState::default();
//! let _ = app.reduce(&mut state, AppAction::Cart(CartAction::Add), &());
//! assert_eq!(state.cart.items, 1);
//! ```

use crate::effect::Effect;
use crate::reducer::Reducer;
use smallvec::SmallVec;

/// Run `reducers` one after another on the same state and action.
///
/// Effects are concatenated in reducer order with `Effect::None` dropped. Every
/// reducer sees every action, so scoped slices ignore what is not theirs.
#[must_use]
pub fn combine_reducers<S, A, E>(
    reducers: Vec<Box<dyn Reducer<State = S, Action = A, Environment = E> + Send + Sync>>,
) -> CombinedReducer<S, A, E>
where
    S: 'static,
    A: Clone + 'static,
    E: 'static,
{
    CombinedReducer { reducers }
}

/// Output of [`combine_reducers`]
pub struct CombinedReducer<S, A, E>
where
    S: 'static,
    A: Clone + 'static,
    E: 'static,
{
    reducers: Vec<Box<dyn Reducer<State = S, Action = A, Environment = E> + Send + Sync>>,
}

impl<S, A, E> CombinedReducer<S, A, E>
where
    S: 'static,
    A: Clone + 'static,
    E: 'static,
{
    /// Number of combined reducers
    #[must_use]
    pub fn len(&self) -> usize {
        self.reducers.len()
    }

    /// Whether no reducer was combined
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reducers.is_empty()
    }
}

impl<S, A, E> Reducer for CombinedReducer<S, A, E>
where
    S: 'static,
    A: Clone + 'static,
    E: 'static,
{
    type State = S;
    type Action = A;
    type Environment = E;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        self.reducers
            .iter()
            .flat_map(|reducer| reducer.reduce(state, action.clone(), env))
            .filter(|effect| !effect.is_none())
            .collect()
    }
}

/// Mount a slice reducer inside the app state and action.
///
/// `state` borrows the slice out of the app state, `extract` unwraps the
/// slice's own actions (returning `None` for other slices) and `embed` wraps
/// result actions back up. The environment is shared as is.
pub fn scope_reducer<S, A, R>(
    reducer: R,
    state: fn(&mut S) -> &mut R::State,
    extract: fn(A) -> Option<R::Action>,
    embed: fn(R::Action) -> A,
) -> ScopedReducer<S, A, R>
where
    R: Reducer,
{
    ScopedReducer {
        reducer,
        state,
        extract,
        embed,
    }
}

/// Output of [`scope_reducer`]
pub struct ScopedReducer<S, A, R>
where
    R: Reducer,
{
    reducer: R,
    state: fn(&mut S) -> &mut R::State,
    extract: fn(A) -> Option<R::Action>,
    embed: fn(R::Action) -> A,
}

impl<S, A, R> Reducer for ScopedReducer<S, A, R>
where
    R: Reducer,
    R::Action: Send + 'static,
    A: Send + 'static,
{
    type State = S;
    type Action = A;
    type Environment = R::Environment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        let Some(own) = (self.extract)(action) else {
            return SmallVec::new();
        };

        self.reducer
            .reduce((self.state)(state), own, env)
            .into_iter()
            .map(|effect| effect.map(self.embed))
            .collect()
    }
}
