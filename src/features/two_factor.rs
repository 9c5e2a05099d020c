//! The two-factor sub-flow: a nested state machine activated when a login
//! response signals that a second authentication step is required.

use super::auth::{AuthenticationResult, SharedAuthenticationClient, TwoFactorRequest};
use super::AlertData;
use crate::core::Reducer;
use crate::effects::{CancelId, Effect, HasScheduler, Scheduler};
use serde::{Deserialize, Serialize};

/// Cancellation token scoping the in-flight second-factor submission to this
/// sub-flow's lifetime. Dismissing the sub-flow cancels everything tagged
/// with it.
pub const TWO_FACTOR_TEARDOWN: CancelId = CancelId::from_static("two-factor-teardown");

/// Minimum length at which a second-factor code is considered submittable.
const MIN_CODE_LENGTH: usize = 4;

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct TwoFactorState {
    pub alert_data: Option<AlertData>,
    pub code: String,
    pub is_form_valid: bool,
    pub is_two_factor_request_in_flight: bool,
    pub token: String,
}

impl TwoFactorState {
    /// Fresh sub-flow state carrying the token issued by the login response.
    pub fn new(token: impl Into<String>) -> Self {
        TwoFactorState {
            alert_data: None,
            code: String::new(),
            is_form_valid: false,
            is_two_factor_request_in_flight: false,
            token: token.into(),
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum TwoFactorAction {
    AlertDismissed,
    CodeChanged(String),
    SubmitButtonTapped,
    TwoFactorResponse(AuthenticationResult),
}

#[derive(Clone)]
pub struct TwoFactorEnvironment {
    pub authentication_client: SharedAuthenticationClient,
    pub scheduler: Scheduler,
}

impl HasScheduler for TwoFactorEnvironment {
    fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }
}

pub fn two_factor_reducer() -> Reducer<TwoFactorState, TwoFactorAction, TwoFactorEnvironment> {
    Reducer::new(|state: &mut TwoFactorState, action, environment: &TwoFactorEnvironment| match action {
        TwoFactorAction::AlertDismissed => {
            state.alert_data = None;
            Effect::none()
        }

        TwoFactorAction::CodeChanged(code) => {
            state.code = code;
            state.is_form_valid = state.code.len() >= MIN_CODE_LENGTH;
            Effect::none()
        }

        TwoFactorAction::SubmitButtonTapped => {
            state.is_two_factor_request_in_flight = true;
            let request = TwoFactorRequest {
                code: state.code.clone(),
                token: state.token.clone(),
            };
            let client = environment.authentication_client.clone();
            Effect::future(async move {
                TwoFactorAction::TwoFactorResponse(client.two_factor(request).await)
            })
            .cancellable(TWO_FACTOR_TEARDOWN)
        }

        TwoFactorAction::TwoFactorResponse(Ok(_)) => {
            state.is_two_factor_request_in_flight = false;
            Effect::none()
        }

        TwoFactorAction::TwoFactorResponse(Err(error)) => {
            state.alert_data = Some(AlertData::new(error.to_string()));
            state.is_two_factor_request_in_flight = false;
            Effect::none()
        }
    })
}
