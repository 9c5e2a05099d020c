//! Deterministic test support: an exhaustive-assertion store and a
//! programmable authentication fake.

use crate::core::Reducer;
use crate::effects::{CancelId, Effect, Step};
use crate::features::auth::{
    AuthenticationClient, AuthenticationError, AuthenticationResponse, AuthenticationResult,
    LoginRequest, TwoFactorRequest,
};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

struct PendingAction<A> {
    cancel_id: Option<CancelId>,
    action: A,
}

/// A store for tests that makes every state change and every effect output
/// explicit.
///
/// `send` asserts that the reducer's state change matches the expectation
/// described by the closure, then runs the returned effect's tasks to
/// completion inline (immediate-scheduler semantics) and queues their
/// follow-up actions. `receive` consumes the next queued follow-up, asserts
/// it is the expected action, and feeds it back through the reducer the same
/// way. Cancellation effects drop queued follow-ups carrying the cancelled
/// id, mirroring the live store's discard of stale completions.
///
/// Finish every test with [`TestStore::assert_idle`]: an unconsumed
/// follow-up action means the test did not account for everything the
/// feature did.
pub struct TestStore<S, A, E> {
    state: S,
    reducer: Reducer<S, A, E>,
    environment: E,
    pending: VecDeque<PendingAction<A>>,
}

impl<S, A, E> TestStore<S, A, E>
where
    S: Clone + PartialEq + fmt::Debug + 'static,
    A: PartialEq + fmt::Debug + Send + 'static,
    E: 'static,
{
    pub fn new(initial_state: S, reducer: Reducer<S, A, E>, environment: E) -> Self {
        TestStore {
            state: initial_state,
            reducer,
            environment,
            pending: VecDeque::new(),
        }
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    /// Send an action, asserting the resulting state change.
    ///
    /// # Panics
    ///
    /// Panics when the post-reduction state differs from the expectation
    /// built by `update`.
    pub async fn send<F>(&mut self, action: A, update: F)
    where
        F: FnOnce(&mut S),
    {
        let mut expected = self.state.clone();
        update(&mut expected);

        let effect = self
            .reducer
            .reduce(&mut self.state, action, &self.environment);
        assert_eq!(
            self.state, expected,
            "state after send does not match the expectation",
        );

        self.run_effect(effect).await;
    }

    /// Consume the next queued effect output, asserting both the action and
    /// the state change it causes.
    ///
    /// # Panics
    ///
    /// Panics when no follow-up is queued, when the queued action differs
    /// from `expected_action`, or when the state change does not match.
    pub async fn receive<F>(&mut self, expected_action: A, update: F)
    where
        F: FnOnce(&mut S),
    {
        let pending = self
            .pending
            .pop_front()
            .expect("expected a pending effect action, but none were queued");
        assert_eq!(
            pending.action, expected_action,
            "next pending effect action does not match",
        );

        let mut expected = self.state.clone();
        update(&mut expected);

        let effect = self
            .reducer
            .reduce(&mut self.state, pending.action, &self.environment);
        assert_eq!(
            self.state, expected,
            "state after receive does not match the expectation",
        );

        self.run_effect(effect).await;
    }

    /// Assert that every effect output has been consumed with `receive`.
    pub fn assert_idle(&self) {
        assert!(
            self.pending.is_empty(),
            "unconsumed effect actions: {:?}",
            self.pending.iter().map(|p| &p.action).collect::<Vec<_>>(),
        );
    }

    async fn run_effect(&mut self, effect: Effect<A>) {
        for step in effect.into_steps() {
            match step {
                Step::Task(task) => {
                    if let Some(action) = task.future.await {
                        self.pending.push_back(PendingAction {
                            cancel_id: task.id,
                            action,
                        });
                    }
                }
                Step::Cancel(id) => {
                    self.pending
                        .retain(|pending| pending.cancel_id.as_ref() != Some(&id));
                }
            }
        }
    }
}

type AuthCall<Request> =
    Arc<dyn Fn(Request) -> BoxFuture<'static, AuthenticationResult> + Send + Sync>;

/// Closure-programmable authentication capability for tests.
#[derive(Clone)]
pub struct FakeAuthenticationClient {
    login: AuthCall<LoginRequest>,
    two_factor: AuthCall<TwoFactorRequest>,
}

impl FakeAuthenticationClient {
    /// Program each endpoint with a synchronous handler; results are
    /// delivered as ready futures.
    pub fn new<L, T>(login: L, two_factor: T) -> Self
    where
        L: Fn(LoginRequest) -> AuthenticationResult + Send + Sync + 'static,
        T: Fn(TwoFactorRequest) -> AuthenticationResult + Send + Sync + 'static,
    {
        FakeAuthenticationClient {
            login: Arc::new(move |request| {
                let result = login(request);
                async move { result }.boxed()
            }),
            two_factor: Arc::new(move |request| {
                let result = two_factor(request);
                async move { result }.boxed()
            }),
        }
    }

    /// Both endpoints answer with `response`.
    pub fn succeeding(response: AuthenticationResponse) -> Self {
        let login_response = response.clone();
        Self::new(
            move |_| Ok(login_response.clone()),
            move |_| Ok(response.clone()),
        )
    }

    /// Both endpoints fail with `error`.
    pub fn failing(error: AuthenticationError) -> Self {
        let login_error = error.clone();
        Self::new(move |_| Err(login_error.clone()), move |_| Err(error.clone()))
    }

    /// Both endpoints never complete. For live-store cancellation tests.
    pub fn hanging() -> Self {
        FakeAuthenticationClient {
            login: Arc::new(|_| futures::future::pending::<AuthenticationResult>().boxed()),
            two_factor: Arc::new(|_| futures::future::pending::<AuthenticationResult>().boxed()),
        }
    }
}

impl AuthenticationClient for FakeAuthenticationClient {
    fn login(&self, request: LoginRequest) -> BoxFuture<'static, AuthenticationResult> {
        (self.login)(request)
    }

    fn two_factor(&self, request: TwoFactorRequest) -> BoxFuture<'static, AuthenticationResult> {
        (self.two_factor)(request)
    }
}
