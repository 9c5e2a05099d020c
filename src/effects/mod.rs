//! Effect values and the scheduling contexts that execute them.
//!
//! This module is the boundary between the pure reducer core and the
//! imperative shell:
//!
//! - [`Effect`] describes deferred work as inert data, keeping reducers pure
//! - [`CancelId`] correlates in-flight work for cancellation
//! - [`Scheduler`] is the opaque context on which tasks run and deliver
//!   their completions, reached through the [`HasScheduler`] environment seam

mod effect;
mod scheduler;

pub use effect::{CancelId, Effect};
pub use scheduler::{HasScheduler, Scheduler, Spawn, TaskHandle};

pub(crate) use effect::{EffectTask, Step};
