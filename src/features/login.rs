//! The login flow: parent state machine that delegates into the nested
//! two-factor sub-flow when a login response requires a second step.

use super::auth::{AuthenticationResult, LoginRequest, SharedAuthenticationClient};
use super::two_factor::{
    two_factor_reducer, TwoFactorAction, TwoFactorEnvironment, TwoFactorState,
    TWO_FACTOR_TEARDOWN,
};
use super::AlertData;
use crate::core::{ActionPrism, Reducer};
use crate::effects::{CancelId, Effect, HasScheduler, Scheduler};
use serde::{Deserialize, Serialize};

/// Cancellation token for the in-flight login request. The reducer itself
/// never cancels it (the result of a request that outlives interest is
/// simply discarded), but the stable id lets an embedding application issue
/// `Effect::cancel(LOGIN_REQUEST)` when navigating away mid-flight.
pub const LOGIN_REQUEST: CancelId = CancelId::from_static("login-request");

#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct LoginState {
    pub alert_data: Option<AlertData>,
    pub email: String,
    pub is_form_valid: bool,
    pub is_login_request_in_flight: bool,
    pub password: String,
    pub two_factor: Option<TwoFactorState>,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum LoginAction {
    AlertDismissed,
    EmailChanged(String),
    PasswordChanged(String),
    LoginButtonTapped,
    LoginResponse(AuthenticationResult),
    TwoFactor(TwoFactorAction),
    TwoFactorDismissed,
}

#[derive(Clone)]
pub struct LoginEnvironment {
    pub authentication_client: SharedAuthenticationClient,
    pub scheduler: Scheduler,
}

impl HasScheduler for LoginEnvironment {
    fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }
}

/// The login feature's own transitions. Delegated two-factor actions are
/// no-ops here; [`login_feature_reducer`] lifts the child reducer alongside.
pub fn login_reducer() -> Reducer<LoginState, LoginAction, LoginEnvironment> {
    Reducer::new(|state: &mut LoginState, action, environment: &LoginEnvironment| match action {
        LoginAction::AlertDismissed => {
            state.alert_data = None;
            Effect::none()
        }

        LoginAction::EmailChanged(email) => {
            state.email = email;
            state.is_form_valid = !state.email.is_empty() && !state.password.is_empty();
            Effect::none()
        }

        LoginAction::PasswordChanged(password) => {
            state.password = password;
            state.is_form_valid = !state.email.is_empty() && !state.password.is_empty();
            Effect::none()
        }

        LoginAction::LoginButtonTapped => {
            state.is_login_request_in_flight = true;
            let request = LoginRequest {
                email: state.email.clone(),
                password: state.password.clone(),
            };
            let client = environment.authentication_client.clone();
            Effect::future(async move { LoginAction::LoginResponse(client.login(request).await) })
                .cancellable(LOGIN_REQUEST)
        }

        LoginAction::LoginResponse(Ok(response)) => {
            state.is_login_request_in_flight = false;
            if response.two_factor_required {
                state.two_factor = Some(TwoFactorState::new(response.token));
            }
            Effect::none()
        }

        LoginAction::LoginResponse(Err(error)) => {
            state.alert_data = Some(AlertData::new(error.to_string()));
            state.is_login_request_in_flight = false;
            Effect::none()
        }

        // Delegated to the lifted two-factor reducer.
        LoginAction::TwoFactor(_) => Effect::none(),

        LoginAction::TwoFactorDismissed => {
            state.two_factor = None;
            // Abort any submission the sub-flow still has in flight so a
            // stale completion cannot mutate state after teardown.
            Effect::cancel(TWO_FACTOR_TEARDOWN)
        }
    })
}

/// The composed login feature: the parent's own logic first, then the
/// two-factor reducer lifted over the optional `two_factor` state, the
/// `LoginAction::TwoFactor` action variant, and an environment derived by
/// copying the shared client and scheduler out of the parent's.
pub fn login_feature_reducer() -> Reducer<LoginState, LoginAction, LoginEnvironment> {
    Reducer::combine([
        login_reducer(),
        two_factor_reducer().optional().pullback(
            |state: &mut LoginState| &mut state.two_factor,
            ActionPrism::new(
                |action| match action {
                    LoginAction::TwoFactor(action) => Some(action),
                    _ => None,
                },
                LoginAction::TwoFactor,
            ),
            |environment: &LoginEnvironment| TwoFactorEnvironment {
                authentication_client: environment.authentication_client.clone(),
                scheduler: environment.scheduler.clone(),
            },
        ),
    ])
}
