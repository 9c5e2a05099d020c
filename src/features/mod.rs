//! Concrete feature state machines built on the reducer core.
//!
//! Two features exercise the composition mechanism end to end: `login` is
//! the parent flow, `two_factor` the nested sub-flow it delegates into. Each
//! declares its own (state, action, environment) triple; neither knows the
//! other's internals beyond the lens/prism/derivation handed to `pullback`.

pub mod auth;
pub mod login;
pub mod two_factor;

use serde::{Deserialize, Serialize};

/// Opaque alert payload handed upward for display. This crate produces it
/// and never renders it.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct AlertData {
    pub title: String,
}

impl AlertData {
    pub fn new(title: impl Into<String>) -> Self {
        AlertData {
            title: title.into(),
        }
    }
}
