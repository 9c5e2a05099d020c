//! End-to-end tests for the composed login feature: parent flow, nested
//! two-factor sub-flow, and cancellation across teardown.

use confluence::features::auth::{AuthenticationError, AuthenticationResponse};
use confluence::features::login::{
    login_feature_reducer, LoginAction, LoginEnvironment, LoginState,
};
use confluence::features::two_factor::{TwoFactorAction, TwoFactorState};
use confluence::features::AlertData;
use confluence::testing::{FakeAuthenticationClient, TestStore};
use confluence::{Scheduler, Store};
use std::sync::Arc;

fn test_store(
    client: FakeAuthenticationClient,
) -> TestStore<LoginState, LoginAction, LoginEnvironment> {
    TestStore::new(
        LoginState::default(),
        login_feature_reducer(),
        LoginEnvironment {
            authentication_client: Arc::new(client),
            scheduler: Scheduler::immediate(),
        },
    )
}

fn live_store(
    client: FakeAuthenticationClient,
) -> Store<LoginState, LoginAction, LoginEnvironment> {
    Store::new(
        LoginState::default(),
        login_feature_reducer(),
        LoginEnvironment {
            authentication_client: Arc::new(client),
            scheduler: Scheduler::tokio(),
        },
    )
}

#[tokio::test]
async fn full_login_flow_with_two_factor_challenge() {
    let response = AuthenticationResponse {
        token: "T".into(),
        two_factor_required: true,
    };
    let mut store = test_store(FakeAuthenticationClient::succeeding(response.clone()));

    store
        .send(LoginAction::EmailChanged("a@b.com".into()), |state| {
            state.email = "a@b.com".into();
        })
        .await;
    store
        .send(LoginAction::PasswordChanged("pw".into()), |state| {
            state.password = "pw".into();
            state.is_form_valid = true;
        })
        .await;
    store
        .send(LoginAction::LoginButtonTapped, |state| {
            state.is_login_request_in_flight = true;
        })
        .await;
    store
        .receive(
            LoginAction::LoginResponse(Ok(response.clone())),
            |state| {
                state.is_login_request_in_flight = false;
                state.two_factor = Some(TwoFactorState::new("T"));
            },
        )
        .await;

    store
        .send(
            LoginAction::TwoFactor(TwoFactorAction::CodeChanged("1234".into())),
            |state| {
                let two_factor = state.two_factor.as_mut().unwrap();
                two_factor.code = "1234".into();
                two_factor.is_form_valid = true;
            },
        )
        .await;
    store
        .send(
            LoginAction::TwoFactor(TwoFactorAction::SubmitButtonTapped),
            |state| {
                state.two_factor.as_mut().unwrap().is_two_factor_request_in_flight = true;
            },
        )
        .await;
    store
        .receive(
            LoginAction::TwoFactor(TwoFactorAction::TwoFactorResponse(Ok(response))),
            |state| {
                state.two_factor.as_mut().unwrap().is_two_factor_request_in_flight = false;
            },
        )
        .await;

    store.assert_idle();
}

#[tokio::test]
async fn failed_login_shows_alert_with_error_description() {
    let mut store = test_store(FakeAuthenticationClient::failing(
        AuthenticationError::InvalidUserPassword,
    ));

    store
        .send(LoginAction::EmailChanged("a@b.com".into()), |state| {
            state.email = "a@b.com".into();
        })
        .await;
    store
        .send(LoginAction::PasswordChanged("nope".into()), |state| {
            state.password = "nope".into();
            state.is_form_valid = true;
        })
        .await;
    store
        .send(LoginAction::LoginButtonTapped, |state| {
            state.is_login_request_in_flight = true;
        })
        .await;
    store
        .receive(
            LoginAction::LoginResponse(Err(AuthenticationError::InvalidUserPassword)),
            |state| {
                state.alert_data = Some(AlertData::new("Unknown user or invalid password."));
                state.is_login_request_in_flight = false;
            },
        )
        .await;
    store
        .send(LoginAction::AlertDismissed, |state| {
            state.alert_data = None;
        })
        .await;

    store.assert_idle();
}

#[tokio::test]
async fn dismissing_two_factor_cancels_the_in_flight_submit() {
    let response = AuthenticationResponse {
        token: "T".into(),
        two_factor_required: true,
    };
    let mut store = test_store(FakeAuthenticationClient::succeeding(response.clone()));

    store
        .send(LoginAction::LoginResponse(Ok(response)), |state| {
            state.two_factor = Some(TwoFactorState::new("T"));
        })
        .await;
    store
        .send(
            LoginAction::TwoFactor(TwoFactorAction::CodeChanged("1234".into())),
            |state| {
                let two_factor = state.two_factor.as_mut().unwrap();
                two_factor.code = "1234".into();
                two_factor.is_form_valid = true;
            },
        )
        .await;
    store
        .send(
            LoginAction::TwoFactor(TwoFactorAction::SubmitButtonTapped),
            |state| {
                state.two_factor.as_mut().unwrap().is_two_factor_request_in_flight = true;
            },
        )
        .await;

    // Teardown mid-flight: the queued submit response must be dropped, not
    // delivered.
    store
        .send(LoginAction::TwoFactorDismissed, |state| {
            state.two_factor = None;
        })
        .await;

    // Any further delegated action is a no-op on state.
    store
        .send(
            LoginAction::TwoFactor(TwoFactorAction::CodeChanged("9".into())),
            |_state| {},
        )
        .await;

    store.assert_idle();
}

#[tokio::test]
async fn live_store_runs_the_login_pipeline_to_quiescence() {
    let mut store = live_store(FakeAuthenticationClient::succeeding(
        AuthenticationResponse {
            token: "T".into(),
            two_factor_required: true,
        },
    ));

    store.send(LoginAction::EmailChanged("a@b.com".into()));
    store.send(LoginAction::PasswordChanged("pw".into()));
    assert!(store.state().is_form_valid);

    store.send(LoginAction::LoginButtonTapped);
    assert!(store.state().is_login_request_in_flight);
    assert_eq!(store.effects_in_flight(), 1);

    store.run_until_idle().await;

    assert!(!store.state().is_login_request_in_flight);
    let two_factor = store.state().two_factor.as_ref().unwrap();
    assert_eq!(two_factor.token, "T");
}

#[tokio::test]
async fn live_store_dismissal_aborts_a_hung_submit() {
    let mut store = live_store(FakeAuthenticationClient::hanging());

    // Drive the sub-flow into existence by injecting the response action
    // directly; the hung client only matters for the submit below.
    store.send(LoginAction::LoginResponse(Ok(AuthenticationResponse {
        token: "T".into(),
        two_factor_required: true,
    })));
    store.send(LoginAction::TwoFactor(TwoFactorAction::CodeChanged(
        "1234".into(),
    )));
    store.send(LoginAction::TwoFactor(TwoFactorAction::SubmitButtonTapped));
    assert_eq!(store.effects_in_flight(), 1);

    store.send(LoginAction::TwoFactorDismissed);
    assert_eq!(store.effects_in_flight(), 0);
    assert!(!store.recv().await);
    assert_eq!(store.state().two_factor, None);
}
