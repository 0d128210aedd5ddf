//! [`ContinuationHint`] trait.

/// Hint whether invoking a handler continues the current logical task.
///
/// A scheduler can use this to run the handler inline instead of queueing it
/// behind other, unrelated, work. The provided implementation returns `false`.
pub trait ContinuationHint {
    /// Returns `true` if invoking this handler is a continuation of the
    /// currently running handler.
    fn is_continuation(&self) -> bool {
        false
    }
}

/// Returns the continuation hint of `handler`.
pub fn is_continuation<H>(handler: &H) -> bool
where
    H: ContinuationHint + ?Sized,
{
    handler.is_continuation()
}
