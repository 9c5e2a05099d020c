//! The live store: owns state, applies the reducer, runs effects.
//!
//! This is the imperative shell around the pure reducer core. A store
//! processes actions one at a time; the reducer invocation itself is fully
//! synchronous, and all suspension happens in spawned effect tasks strictly
//! after the reducer returns. Effect completions re-enter the same
//! single-action-at-a-time entry point through a channel, so state mutation
//! is never subject to data races.

use crate::core::Reducer;
use crate::effects::{CancelId, Effect, EffectTask, HasScheduler, Step, TaskHandle};
use futures::FutureExt;
use std::collections::{HashMap, HashSet};
use std::fmt;
use tokio::sync::mpsc;
use uuid::Uuid;

struct TaskEntry {
    cancel_id: Option<CancelId>,
    handle: TaskHandle,
}

struct Completion<A> {
    task: Uuid,
    action: Option<A>,
}

/// Holds the current state for one feature instance, applies the reducer to
/// each incoming action, schedules the resulting effects on the
/// environment's scheduler, and feeds their output actions back in.
pub struct Store<S, A, E> {
    state: S,
    reducer: Reducer<S, A, E>,
    environment: E,
    completions_tx: mpsc::UnboundedSender<Completion<A>>,
    completions_rx: mpsc::UnboundedReceiver<Completion<A>>,
    in_flight: HashMap<Uuid, TaskEntry>,
    by_cancel_id: HashMap<CancelId, HashSet<Uuid>>,
}

impl<S, A, E> Store<S, A, E>
where
    S: 'static,
    A: fmt::Debug + Send + 'static,
    E: HasScheduler + 'static,
{
    pub fn new(initial_state: S, reducer: Reducer<S, A, E>, environment: E) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Store {
            state: initial_state,
            reducer,
            environment,
            completions_tx,
            completions_rx,
            in_flight: HashMap::new(),
            by_cancel_id: HashMap::new(),
        }
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn environment(&self) -> &E {
        &self.environment
    }

    /// Number of effect tasks spawned but not yet completed or cancelled.
    pub fn effects_in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Apply the reducer to `action` synchronously, then schedule whatever
    /// effect it returned. Never blocks on effect execution.
    pub fn send(&mut self, action: A) {
        tracing::trace!(?action, "reducing action");
        let effect = self
            .reducer
            .reduce(&mut self.state, action, &self.environment);
        self.handle_effect(effect);
    }

    /// Deliver all already-completed effect outputs back into the reducer
    /// without awaiting. Returns the number of completions processed.
    pub fn pump(&mut self) -> usize {
        let mut delivered = 0;
        while let Ok(completion) = self.completions_rx.try_recv() {
            self.deliver(completion);
            delivered += 1;
        }
        delivered
    }

    /// Await the next effect completion and feed it through the reducer.
    /// Returns `false` immediately when nothing is in flight.
    pub async fn recv(&mut self) -> bool {
        if self.in_flight.is_empty() {
            return false;
        }
        match self.completions_rx.recv().await {
            Some(completion) => {
                self.deliver(completion);
                true
            }
            None => false,
        }
    }

    /// Process effect completions until no effects remain in flight.
    pub async fn run_until_idle(&mut self) {
        while self.recv().await {}
    }

    fn handle_effect(&mut self, effect: Effect<A>) {
        for step in effect.into_steps() {
            match step {
                Step::Task(task) => self.spawn(task),
                Step::Cancel(id) => self.cancel(&id),
            }
        }
    }

    fn spawn(&mut self, task: EffectTask<A>) {
        let task_id = Uuid::new_v4();
        let cancel_id = task.id.clone();
        tracing::debug!(%task_id, ?cancel_id, "spawning effect task");

        let completions = self.completions_tx.clone();
        let future = task.future;
        let handle = self.environment.scheduler().spawn(
            async move {
                let action = future.await;
                let _ = completions.send(Completion {
                    task: task_id,
                    action,
                });
            }
            .boxed(),
        );

        if let Some(id) = &cancel_id {
            self.by_cancel_id
                .entry(id.clone())
                .or_default()
                .insert(task_id);
        }
        self.in_flight.insert(task_id, TaskEntry { cancel_id, handle });
    }

    fn cancel(&mut self, id: &CancelId) {
        if let Some(tasks) = self.by_cancel_id.remove(id) {
            tracing::debug!(cancel_id = %id, count = tasks.len(), "cancelling effect tasks");
            for task_id in tasks {
                if let Some(entry) = self.in_flight.remove(&task_id) {
                    entry.handle.cancel();
                }
            }
        }
    }

    fn deliver(&mut self, completion: Completion<A>) {
        // A task cancelled after it finished may still have queued its
        // completion; the registry check drops the stale follow-up before it
        // can touch state.
        let Some(entry) = self.in_flight.remove(&completion.task) else {
            tracing::debug!(task_id = %completion.task, "discarding completion of cancelled task");
            return;
        };
        if let Some(cancel_id) = &entry.cancel_id {
            if let Some(tasks) = self.by_cancel_id.get_mut(cancel_id) {
                tasks.remove(&completion.task);
                if tasks.is_empty() {
                    self.by_cancel_id.remove(cancel_id);
                }
            }
        }
        if let Some(action) = completion.action {
            self.send(action);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::Scheduler;

    #[derive(Clone)]
    struct TestEnvironment {
        scheduler: Scheduler,
    }

    impl HasScheduler for TestEnvironment {
        fn scheduler(&self) -> &Scheduler {
            &self.scheduler
        }
    }

    #[derive(Clone, PartialEq, Debug, Default)]
    struct PingState {
        pings: u32,
        pongs: u32,
    }

    #[derive(Clone, PartialEq, Debug)]
    enum PingAction {
        Ping,
        Pong,
        Teardown,
    }

    const PING_REQUEST: CancelId = CancelId::from_static("ping-request");

    fn ping_reducer() -> Reducer<PingState, PingAction, TestEnvironment> {
        Reducer::new(|state: &mut PingState, action, _environment| match action {
            PingAction::Ping => {
                state.pings += 1;
                Effect::future(async { PingAction::Pong }).cancellable(PING_REQUEST)
            }
            PingAction::Pong => {
                state.pongs += 1;
                Effect::none()
            }
            PingAction::Teardown => Effect::cancel(PING_REQUEST),
        })
    }

    #[tokio::test]
    async fn send_applies_state_synchronously_and_defers_effects() {
        let mut store = Store::new(
            PingState::default(),
            ping_reducer(),
            TestEnvironment {
                scheduler: Scheduler::tokio(),
            },
        );

        store.send(PingAction::Ping);
        assert_eq!(store.state(), &PingState { pings: 1, pongs: 0 });
        assert_eq!(store.effects_in_flight(), 1);

        store.run_until_idle().await;
        assert_eq!(store.state(), &PingState { pings: 1, pongs: 1 });
        assert_eq!(store.effects_in_flight(), 0);
    }

    #[tokio::test]
    async fn cancel_aborts_in_flight_tasks() {
        let hang_reducer: Reducer<PingState, PingAction, TestEnvironment> =
            Reducer::new(|state: &mut PingState, action, _environment| match action {
                PingAction::Ping => {
                    state.pings += 1;
                    Effect::future(async {
                        futures::future::pending::<()>().await;
                        PingAction::Pong
                    })
                    .cancellable(PING_REQUEST)
                }
                PingAction::Pong => {
                    state.pongs += 1;
                    Effect::none()
                }
                PingAction::Teardown => Effect::cancel(PING_REQUEST),
            });

        let mut store = Store::new(
            PingState::default(),
            hang_reducer,
            TestEnvironment {
                scheduler: Scheduler::tokio(),
            },
        );

        store.send(PingAction::Ping);
        assert_eq!(store.effects_in_flight(), 1);

        store.send(PingAction::Teardown);
        assert_eq!(store.effects_in_flight(), 0);
        assert!(!store.recv().await);
        assert_eq!(store.state(), &PingState { pings: 1, pongs: 0 });
    }

    #[tokio::test]
    async fn completion_racing_a_cancel_is_discarded() {
        // The immediate scheduler completes the task at spawn time, so its
        // completion is already queued when the teardown arrives. The
        // registry check must still drop it.
        let mut store = Store::new(
            PingState::default(),
            ping_reducer(),
            TestEnvironment {
                scheduler: Scheduler::immediate(),
            },
        );

        store.send(PingAction::Ping);
        store.send(PingAction::Teardown);

        assert_eq!(store.pump(), 1);
        assert_eq!(store.state(), &PingState { pings: 1, pongs: 0 });
        assert_eq!(store.effects_in_flight(), 0);
    }

    #[tokio::test]
    async fn pump_delivers_ready_completions_in_order() {
        let mut store = Store::new(
            PingState::default(),
            ping_reducer(),
            TestEnvironment {
                scheduler: Scheduler::immediate(),
            },
        );

        store.send(PingAction::Ping);
        store.send(PingAction::Ping);
        assert_eq!(store.state().pongs, 0);

        assert_eq!(store.pump(), 2);
        assert_eq!(store.state(), &PingState { pings: 2, pongs: 2 });
    }
}
