//! Confluence: a composable state reducer library with cancellable effects
//!
//! Confluence implements a unidirectional state-reducer architecture in the
//! "pure core, imperative shell" style. Feature logic lives in pure reducers
//! mapping (state, action, environment) to (new state, effect); all I/O is
//! deferred into [`Effect`] values executed by a [`Store`] after the reducer
//! returns.
//!
//! # Core Concepts
//!
//! - **Reducer**: pure transition function per feature, composed across
//!   features with `combine`, `optional`, and `pullback`
//! - **Effect**: side effects as inert data, cancellable by [`CancelId`]
//! - **Environment**: an immutable capability bundle injected per feature,
//!   with child environments derived from the parent's at composition time
//! - **Store**: thin driver owning state, processing actions one at a time
//!   and feeding effect completions back through the same entry point
//!
//! # Example
//!
//! ```rust
//! use confluence::{Effect, Reducer};
//!
//! #[derive(Clone, PartialEq, Debug, Default)]
//! struct CounterState {
//!     count: i32,
//! }
//!
//! #[derive(Clone, PartialEq, Debug)]
//! enum CounterAction {
//!     Incremented,
//!     Decremented,
//! }
//!
//! let reducer = Reducer::new(|state: &mut CounterState, action, _environment: &()| {
//!     match action {
//!         CounterAction::Incremented => state.count += 1,
//!         CounterAction::Decremented => state.count -= 1,
//!     }
//!     Effect::none()
//! });
//!
//! let mut state = CounterState::default();
//! reducer.reduce(&mut state, CounterAction::Incremented, &());
//! assert_eq!(state.count, 1);
//! ```
//!
//! The `features` module contains a complete worked example: a login flow
//! delegating into a nested two-factor sub-flow, composed with
//! `combine` + `optional` + `pullback`.

pub mod core;
pub mod effects;
pub mod features;
pub mod store;
pub mod testing;

// Re-export commonly used types
pub use crate::core::{ActionPrism, Reducer};
pub use crate::effects::{CancelId, Effect, HasScheduler, Scheduler};
pub use crate::store::Store;
pub use crate::testing::TestStore;
