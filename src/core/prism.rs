//! Action prisms: extraction/embedding pairs for routing child actions
//! through a parent action enum.

/// A pair of pure functions relating a parent action type `P` to a child
/// action type `C`: `extract` recognizes the parent variant wrapping a child
/// action, and `embed` wraps a child action back up.
///
/// Enum variant constructors coerce directly into the embed half, so a prism
/// for a wrapping variant is just:
///
/// ```rust
/// use confluence::ActionPrism;
///
/// #[derive(Clone, PartialEq, Debug)]
/// enum ChildAction {
///     Refreshed,
/// }
///
/// #[derive(Clone, PartialEq, Debug)]
/// enum ParentAction {
///     Child(ChildAction),
///     Closed,
/// }
///
/// let prism = ActionPrism::new(
///     |action| match action {
///         ParentAction::Child(child) => Some(child),
///         _ => None,
///     },
///     ParentAction::Child,
/// );
///
/// assert_eq!(prism.extract(ParentAction::Closed), None);
/// assert_eq!(
///     prism.extract(ParentAction::Child(ChildAction::Refreshed)),
///     Some(ChildAction::Refreshed),
/// );
/// assert_eq!(
///     prism.embed(ChildAction::Refreshed),
///     ParentAction::Child(ChildAction::Refreshed),
/// );
/// ```
///
/// `embed` after a successful `extract` must reproduce the original parent
/// action.
pub struct ActionPrism<P, C> {
    extract: fn(P) -> Option<C>,
    embed: fn(C) -> P,
}

impl<P, C> ActionPrism<P, C> {
    /// Build a prism from its two halves.
    pub const fn new(extract: fn(P) -> Option<C>, embed: fn(C) -> P) -> Self {
        ActionPrism { extract, embed }
    }

    /// Attempt to extract a child action from a parent action.
    pub fn extract(&self, parent: P) -> Option<C> {
        (self.extract)(parent)
    }

    /// Embed a child action into the parent action type.
    pub fn embed(&self, child: C) -> P {
        (self.embed)(child)
    }

    pub(crate) fn embed_fn(&self) -> fn(C) -> P {
        self.embed
    }
}

impl<P, C> Clone for ActionPrism<P, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P, C> Copy for ActionPrism<P, C> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, PartialEq, Debug)]
    enum Child {
        Poked,
        Named(String),
    }

    #[derive(Clone, PartialEq, Debug)]
    enum Parent {
        Child(Child),
        Other,
    }

    fn prism() -> ActionPrism<Parent, Child> {
        ActionPrism::new(
            |action| match action {
                Parent::Child(child) => Some(child),
                _ => None,
            },
            Parent::Child,
        )
    }

    #[test]
    fn extract_recognizes_wrapping_variant() {
        assert_eq!(prism().extract(Parent::Child(Child::Poked)), Some(Child::Poked));
        assert_eq!(prism().extract(Parent::Other), None);
    }

    #[test]
    fn embed_after_extract_round_trips() {
        let prism = prism();
        let original = Parent::Child(Child::Named("a".into()));

        let child = prism.extract(original.clone()).unwrap();
        assert_eq!(prism.embed(child), original);
    }
}
