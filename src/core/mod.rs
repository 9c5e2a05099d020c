//! Pure reducer core: reduction and composition.
//!
//! Everything in this module is pure (no side effects, no I/O, no await):
//! - [`Reducer`] maps (state, action, environment) to (new state, effect)
//! - `combine`, `optional`, and `pullback` compose reducers across features
//! - [`ActionPrism`] routes child actions through a parent action enum
//!
//! Deferred work only ever appears as returned [`Effect`](crate::effects::Effect)
//! values; executing them is the store's job.

mod prism;
mod reducer;

pub use prism::ActionPrism;
pub use reducer::Reducer;
