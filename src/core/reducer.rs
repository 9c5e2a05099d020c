//! Reducers and the operators that compose them.

use super::prism::ActionPrism;
use crate::effects::Effect;
use std::sync::Arc;

/// A pure function mapping (state, action, environment) to (new state,
/// effect).
///
/// Reducers mutate state in place (the caller owns the value exclusively),
/// return an [`Effect`] describing any deferred work, and must be total over
/// the action set: a closed action enum plus an exhaustive `match` makes an
/// unhandled variant a compile error rather than a runtime fallback.
///
/// Reducers never perform I/O, never block and never await. Given the same
/// inputs they produce the same state and the same effect shape.
///
/// # Example
///
/// ```rust
/// use confluence::{Effect, Reducer};
///
/// #[derive(Clone, PartialEq, Debug, Default)]
/// struct CounterState {
///     count: i32,
/// }
///
/// #[derive(Clone, PartialEq, Debug)]
/// enum CounterAction {
///     Incremented,
///     Decremented,
/// }
///
/// let reducer = Reducer::new(|state: &mut CounterState, action, _environment: &()| {
///     match action {
///         CounterAction::Incremented => state.count += 1,
///         CounterAction::Decremented => state.count -= 1,
///     }
///     Effect::none()
/// });
///
/// let mut state = CounterState::default();
/// let effect = reducer.reduce(&mut state, CounterAction::Incremented, &());
/// assert_eq!(state.count, 1);
/// assert!(effect.is_none());
/// ```
pub struct Reducer<S, A, E> {
    reduce: Arc<dyn Fn(&mut S, A, &E) -> Effect<A> + Send + Sync>,
}

impl<S, A, E> Clone for Reducer<S, A, E> {
    fn clone(&self) -> Self {
        Reducer {
            reduce: Arc::clone(&self.reduce),
        }
    }
}

impl<S, A, E> Reducer<S, A, E>
where
    S: 'static,
    A: Send + 'static,
    E: 'static,
{
    /// Wrap a reduce function.
    pub fn new<F>(reduce: F) -> Self
    where
        F: Fn(&mut S, A, &E) -> Effect<A> + Send + Sync + 'static,
    {
        Reducer {
            reduce: Arc::new(reduce),
        }
    }

    /// Run the reducer for one action.
    pub fn reduce(&self, state: &mut S, action: A, environment: &E) -> Effect<A> {
        (self.reduce)(state, action, environment)
    }

    /// Combine several reducers over the same types into one.
    ///
    /// Every reducer sees every incoming action, in declaration order,
    /// against the same state; the effects they return are merged and later
    /// scheduled in parallel (no sequential dependency between them). The
    /// ordering is deterministic: a parent's own handling of an action and a
    /// lifted child's handling of that same action run exactly in the order
    /// the reducers were declared.
    pub fn combine<I>(reducers: I) -> Self
    where
        I: IntoIterator<Item = Self>,
        A: Clone,
    {
        let reducers: Vec<Self> = reducers.into_iter().collect();
        Self::new(move |state, action, environment| {
            let mut effects = Vec::with_capacity(reducers.len());
            for reducer in &reducers {
                effects.push(reducer.reduce(state, action.clone(), environment));
            }
            Effect::merge(effects)
        })
    }

    /// Lift this reducer to operate on optional state.
    ///
    /// When the state is `None` the action is dropped: no state change, no
    /// effect. This models an action arriving for a child instance that
    /// logically no longer exists (for example a response racing against
    /// dismissal) and is an expected occurrence, not an error.
    pub fn optional(self) -> Reducer<Option<S>, A, E> {
        Reducer::new(move |state: &mut Option<S>, action, environment| {
            match state.as_mut() {
                Some(state) => self.reduce(state, action, environment),
                None => Effect::none(),
            }
        })
    }

    /// Lift this reducer into a parent's (state, action, environment) types.
    ///
    /// Given a state lens projecting the child state out of the parent
    /// state, an [`ActionPrism`] relating the action enums, and a derivation
    /// building the child environment from the parent's, the returned
    /// reducer:
    ///
    /// 1. extracts a child action from the incoming parent action, returning
    ///    the empty effect when the action is not the child's;
    /// 2. reduces the child state in place through the lens;
    /// 3. re-embeds the child effect's eventual follow-up actions into the
    ///    parent action type.
    ///
    /// For a child whose state is an `Option` field of the parent, compose
    /// with [`Reducer::optional`] first and project the `Option` itself:
    ///
    /// ```rust
    /// use confluence::{ActionPrism, Effect, Reducer};
    ///
    /// #[derive(Clone, PartialEq, Debug, Default)]
    /// struct ChildState { loaded: bool }
    ///
    /// #[derive(Clone, PartialEq, Debug)]
    /// enum ChildAction { Loaded }
    ///
    /// #[derive(Clone, PartialEq, Debug, Default)]
    /// struct ParentState { child: Option<ChildState> }
    ///
    /// #[derive(Clone, PartialEq, Debug)]
    /// enum ParentAction { Child(ChildAction) }
    ///
    /// let child = Reducer::new(|state: &mut ChildState, action: ChildAction, _env: &()| {
    ///     match action {
    ///         ChildAction::Loaded => state.loaded = true,
    ///     }
    ///     Effect::none()
    /// });
    ///
    /// let lifted: Reducer<ParentState, ParentAction, ()> = child.optional().pullback(
    ///     |state: &mut ParentState| &mut state.child,
    ///     ActionPrism::new(
    ///         |action| match action {
    ///             ParentAction::Child(child) => Some(child),
    ///         },
    ///         ParentAction::Child,
    ///     ),
    ///     |_env| (),
    /// );
    ///
    /// let mut state = ParentState { child: Some(ChildState::default()) };
    /// lifted.reduce(&mut state, ParentAction::Child(ChildAction::Loaded), &());
    /// assert_eq!(state.child, Some(ChildState { loaded: true }));
    /// ```
    pub fn pullback<PS, PA, PE, EnvF>(
        self,
        state: fn(&mut PS) -> &mut S,
        action: ActionPrism<PA, A>,
        environment: EnvF,
    ) -> Reducer<PS, PA, PE>
    where
        PS: 'static,
        PA: Send + 'static,
        PE: 'static,
        EnvF: Fn(&PE) -> E + Send + Sync + 'static,
    {
        Reducer::new(move |parent_state, parent_action, parent_environment| {
            let Some(child_action) = action.extract(parent_action) else {
                return Effect::none();
            };
            let child_environment = environment(parent_environment);
            let child_state = state(parent_state);
            self.reduce(child_state, child_action, &child_environment)
                .map(action.embed_fn())
        })
    }
}
