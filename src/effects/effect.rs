//! Effects as values: descriptions of deferred work and how its outcome
//! re-enters the action pipeline.
//!
//! An [`Effect`] is inert data until a store executes it. Reducers stay pure
//! by returning effects instead of performing I/O; the store spawns the
//! described tasks and feeds each produced follow-up action back through the
//! reducer.

use futures::future::BoxFuture;
use futures::FutureExt;
use std::borrow::Cow;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Stable identifier used to correlate in-flight effect tasks for
/// cancellation.
///
/// Features declare teardown tokens as constants so that the action which
/// tears a sub-flow down can abort any work still running on its behalf:
///
/// ```rust
/// use confluence::CancelId;
///
/// const TEARDOWN: CancelId = CancelId::from_static("profile-teardown");
/// assert_eq!(TEARDOWN.as_str(), "profile-teardown");
/// ```
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct CancelId(Cow<'static, str>);

impl CancelId {
    /// Create a cancel id from a static string, usable in `const` contexts.
    pub const fn from_static(id: &'static str) -> Self {
        CancelId(Cow::Borrowed(id))
    }

    /// Create a cancel id from an owned string.
    pub fn new(id: impl Into<String>) -> Self {
        CancelId(Cow::Owned(id.into()))
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CancelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One unit of deferred asynchronous work, producing zero or one follow-up
/// actions when awaited. Tagged with an optional [`CancelId`] so a later
/// cancellation can abort it.
pub(crate) struct EffectTask<A> {
    pub(crate) id: Option<CancelId>,
    pub(crate) future: BoxFuture<'static, Option<A>>,
}

/// Flattened execution plan of an effect, in declaration order.
pub(crate) enum Step<A> {
    Task(EffectTask<A>),
    Cancel(CancelId),
}

enum EffectKind<A> {
    None,
    Task(EffectTask<A>),
    Cancel(CancelId),
    Merge(Vec<Effect<A>>),
}

/// A value describing deferred work plus how its result maps back into an
/// action.
///
/// Effects are what reducers return instead of performing I/O. They are not
/// running tasks: nothing happens until a store walks the effect and spawns
/// its tasks on a scheduler.
///
/// ```rust
/// use confluence::Effect;
///
/// let effect: Effect<u32> = Effect::merge([Effect::none(), Effect::none()]);
/// assert!(effect.is_none());
/// ```
pub struct Effect<A> {
    kind: EffectKind<A>,
}

impl<A: Send + 'static> Effect<A> {
    /// The empty effect: no work, no follow-up action.
    pub fn none() -> Self {
        Effect {
            kind: EffectKind::None,
        }
    }

    /// An effect running one asynchronous task whose output becomes exactly
    /// one follow-up action.
    pub fn future<F>(future: F) -> Self
    where
        F: Future<Output = A> + Send + 'static,
    {
        Effect {
            kind: EffectKind::Task(EffectTask {
                id: None,
                future: future.map(Some).boxed(),
            }),
        }
    }

    /// An effect that aborts every in-flight task tagged with `id`. Produces
    /// no follow-up action of its own.
    pub fn cancel(id: CancelId) -> Self {
        Effect {
            kind: EffectKind::Cancel(id),
        }
    }

    /// Parallel composition. Empty effects are dropped; merging nothing
    /// yields the empty effect.
    pub fn merge<I>(effects: I) -> Self
    where
        I: IntoIterator<Item = Effect<A>>,
    {
        let mut merged: Vec<Effect<A>> = effects
            .into_iter()
            .filter(|effect| !effect.is_none())
            .collect();
        match merged.len() {
            0 => Effect::none(),
            1 => merged.remove(0),
            _ => Effect {
                kind: EffectKind::Merge(merged),
            },
        }
    }

    /// Tag every task inside this effect with `id`, making it abortable via
    /// [`Effect::cancel`]. Cancellation instructions already inside are left
    /// untouched.
    pub fn cancellable(self, id: CancelId) -> Self {
        let kind = match self.kind {
            EffectKind::None => EffectKind::None,
            EffectKind::Task(mut task) => {
                task.id = Some(id);
                EffectKind::Task(task)
            }
            EffectKind::Cancel(other) => EffectKind::Cancel(other),
            EffectKind::Merge(effects) => EffectKind::Merge(
                effects
                    .into_iter()
                    .map(|effect| effect.cancellable(id.clone()))
                    .collect(),
            ),
        };
        Effect { kind }
    }

    /// Transform the follow-up actions this effect will produce.
    ///
    /// Used by reducer pullback to re-embed a child feature's actions into
    /// the parent's action type.
    pub fn map<B, F>(self, f: F) -> Effect<B>
    where
        B: Send + 'static,
        F: Fn(A) -> B + Send + Sync + 'static,
    {
        self.map_shared(Arc::new(f))
    }

    fn map_shared<B>(self, f: Arc<dyn Fn(A) -> B + Send + Sync>) -> Effect<B>
    where
        B: Send + 'static,
    {
        let kind = match self.kind {
            EffectKind::None => EffectKind::None,
            EffectKind::Task(EffectTask { id, future }) => EffectKind::Task(EffectTask {
                id,
                future: future
                    .map(move |output| output.map(|action| f(action)))
                    .boxed(),
            }),
            EffectKind::Cancel(id) => EffectKind::Cancel(id),
            EffectKind::Merge(effects) => EffectKind::Merge(
                effects
                    .into_iter()
                    .map(|effect| effect.map_shared(Arc::clone(&f)))
                    .collect(),
            ),
        };
        Effect { kind }
    }

    /// Whether this is the empty effect.
    pub fn is_none(&self) -> bool {
        matches!(self.kind, EffectKind::None)
    }

    /// Flatten into the ordered list of tasks to spawn and cancellations to
    /// apply.
    pub(crate) fn into_steps(self) -> Vec<Step<A>> {
        let mut steps = Vec::new();
        self.collect_steps(&mut steps);
        steps
    }

    fn collect_steps(self, steps: &mut Vec<Step<A>>) {
        match self.kind {
            EffectKind::None => {}
            EffectKind::Task(task) => steps.push(Step::Task(task)),
            EffectKind::Cancel(id) => steps.push(Step::Cancel(id)),
            EffectKind::Merge(effects) => {
                for effect in effects {
                    effect.collect_steps(steps);
                }
            }
        }
    }
}

impl<A> fmt::Debug for Effect<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            EffectKind::None => f.write_str("Effect::None"),
            EffectKind::Task(task) => f
                .debug_struct("Effect::Task")
                .field("cancel_id", &task.id)
                .finish_non_exhaustive(),
            EffectKind::Cancel(id) => f.debug_tuple("Effect::Cancel").field(id).finish(),
            EffectKind::Merge(effects) => write!(f, "Effect::Merge({} effects)", effects.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_is_none() {
        assert!(Effect::<u32>::none().is_none());
        assert!(!Effect::future(async { 1u32 }).is_none());
    }

    #[test]
    fn merge_drops_empty_effects() {
        let effect = Effect::<u32>::merge([Effect::none(), Effect::none()]);
        assert!(effect.is_none());

        let effect = Effect::merge([Effect::none(), Effect::future(async { 1u32 })]);
        assert_eq!(effect.into_steps().len(), 1);
    }

    #[test]
    fn into_steps_preserves_declaration_order() {
        let id = CancelId::from_static("request");
        let effect = Effect::merge([
            Effect::future(async { 1u32 }),
            Effect::cancel(id.clone()),
            Effect::future(async { 2u32 }),
        ]);

        let steps = effect.into_steps();
        assert_eq!(steps.len(), 3);
        assert!(matches!(&steps[0], Step::Task(_)));
        assert!(matches!(&steps[1], Step::Cancel(cancel) if *cancel == id));
        assert!(matches!(&steps[2], Step::Task(_)));
    }

    #[test]
    fn cancellable_tags_nested_tasks() {
        let id = CancelId::from_static("nested");
        let effect = Effect::merge([
            Effect::future(async { 1u32 }),
            Effect::merge([Effect::future(async { 2u32 }), Effect::none()]),
        ])
        .cancellable(id.clone());

        for step in effect.into_steps() {
            match step {
                Step::Task(task) => assert_eq!(task.id, Some(id.clone())),
                Step::Cancel(_) => panic!("no cancellation was declared"),
            }
        }
    }

    #[tokio::test]
    async fn map_transforms_follow_up_actions() {
        let effect = Effect::future(async { 20u32 }).map(|n| n + 1);

        let mut steps = effect.into_steps();
        assert_eq!(steps.len(), 1);
        match steps.remove(0) {
            Step::Task(task) => assert_eq!(task.future.await, Some(21)),
            Step::Cancel(_) => panic!("expected a task"),
        }
    }

    #[tokio::test]
    async fn map_preserves_cancel_ids() {
        let id = CancelId::from_static("mapped");
        let effect = Effect::future(async { 1u32 })
            .cancellable(id.clone())
            .map(|n| n * 2);

        match effect.into_steps().remove(0) {
            Step::Task(task) => assert_eq!(task.id, Some(id)),
            Step::Cancel(_) => panic!("expected a task"),
        }
    }

    #[test]
    fn cancel_id_display_matches_contents() {
        assert_eq!(CancelId::from_static("abc").to_string(), "abc");
        assert_eq!(CancelId::new(String::from("xyz")).as_str(), "xyz");
    }
}
