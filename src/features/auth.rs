//! The authentication capability boundary.
//!
//! This is the sole I/O boundary of the feature set. The client is consumed
//! as an opaque capability behind a trait object; production code supplies a
//! transport-backed implementation, tests supply
//! [`FakeAuthenticationClient`](crate::testing::FakeAuthenticationClient).

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Credentials submitted by the login form.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Second-factor code paired with the token issued by the login response.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct TwoFactorRequest {
    pub code: String,
    pub token: String,
}

/// Successful authentication result. `two_factor_required` signals that a
/// nested two-factor sub-flow must complete before the session is usable.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct AuthenticationResponse {
    pub token: String,
    pub two_factor_required: bool,
}

/// Domain failures surfaced by the authentication client. The `Display`
/// implementation carries the human-readable description shown in alerts.
#[derive(Clone, PartialEq, Eq, Debug, Error, Serialize, Deserialize)]
pub enum AuthenticationError {
    #[error("Unknown user or invalid password.")]
    InvalidUserPassword,

    #[error("Invalid second factor code.")]
    InvalidTwoFactor,
}

/// Outcome of any authentication call. Failures are captured here, as
/// values, before re-entering the reducer pipeline; they never cross the
/// dispatch boundary as unwinding faults.
pub type AuthenticationResult = Result<AuthenticationResponse, AuthenticationError>;

/// Capability performing the authentication calls.
pub trait AuthenticationClient: Send + Sync {
    fn login(&self, request: LoginRequest) -> BoxFuture<'static, AuthenticationResult>;

    fn two_factor(&self, request: TwoFactorRequest) -> BoxFuture<'static, AuthenticationResult>;
}

/// Shared, immutable handle to the authentication capability.
pub type SharedAuthenticationClient = Arc<dyn AuthenticationClient>;
