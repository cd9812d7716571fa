use std::sync::Arc;

use crate::elements::Outcome;

/// Callback receiving every leaf outcome of a subtree.
///
/// May be invoked concurrently from parallel children; implementations synchronize
/// their own state.
pub type OutcomeListener = Arc<dyn Fn(&Outcome) + Send + Sync>;

/// Wraps `inner` so that `after` runs once each outcome has been forwarded.
///
/// The wrapped listener always forwards first, so ancestors observe an outcome before
/// `after` reacts to it.
pub fn forward<F>(inner: &OutcomeListener, after: F) -> OutcomeListener
where
    F: Fn(&Outcome) + Send + Sync + 'static,
{
    let inner = Arc::clone(inner);
    Arc::new(move |outcome: &Outcome| {
        inner(outcome);
        after(outcome);
    })
}
