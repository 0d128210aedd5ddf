//! [`InvocationStrategy`] trait and helpers.

use crate::call::CallOnce;

/// Strategy used to invoke a handler.
///
/// Before a handler is called the framework hands it to [`invoke`], together
/// with the function that performs the actual call. The strategy decides how
/// and where that function is run. For example a handler bound to a strand
/// ensures the function never runs concurrently with other handlers of the
/// same strand.
///
/// The provided implementation calls the function directly, on the current
/// thread.
///
/// # Examples
///
/// A handler that serialises all its invocations using a lock.
///
/// ```
/// use std::sync::{Arc, Mutex, PoisonError};
///
/// use context_alloc::InvocationStrategy;
///
/// struct OnRead {
///     lock: Arc<Mutex<()>>,
/// }
///
/// impl InvocationStrategy for OnRead {
///     fn invoke<F>(self, function: F)
///     where
///         F: FnOnce(Self),
///     {
///         let lock = self.lock.clone();
///         let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
///         function(self)
///     }
/// }
/// ```
///
/// # Running other functions
///
/// `function` receives the handler, so a composed operation that runs an
/// intermediate step using the strategy of its final handler gets the handler
/// back by moving it out of `function`. [`dispatch`] does this for handlers
/// that implement `Clone`.
///
/// ```
/// use context_alloc::{handler_fn, CallOnce, InvocationStrategy};
///
/// let handler = handler_fn(|n: usize| assert_eq!(n, 2));
///
/// // Run the first step, keeping the handler.
/// let mut slot = None;
/// handler.invoke(|handler| {
///     // First step of the operation.
///     slot = Some(handler);
/// });
///
/// // Last step.
/// if let Some(handler) = slot {
///     handler.call_once((2_usize,));
/// }
/// ```
///
/// [`invoke`]: InvocationStrategy::invoke
pub trait InvocationStrategy: Sized {
    /// Run `function`, passing it this handler.
    ///
    /// `function` must be called exactly once (unless it panics).
    fn invoke<F>(self, function: F)
    where
        F: FnOnce(Self),
    {
        function(self)
    }
}

/// Run `function` using the invocation strategy of `handler`.
pub fn invoke<H, F>(handler: H, function: F)
where
    H: InvocationStrategy,
    F: FnOnce(H),
{
    handler.invoke(function)
}

/// Run `function` using the invocation strategy of `handler`, without giving
/// up `handler`.
///
/// The strategy is applied to a clone of `handler`, which is dropped once
/// `function` returns.
pub fn dispatch<H, F>(handler: &H, function: F)
where
    H: InvocationStrategy + Clone,
    F: FnOnce(),
{
    handler.clone().invoke(move |_| function())
}

/// Call `handler` with `args` using the handler's invocation strategy.
///
/// This is how a completed operation fires its handler.
pub fn complete<H, Args>(handler: H, args: Args)
where
    H: InvocationStrategy + CallOnce<Args>,
{
    handler.invoke(move |handler| handler.call_once(args))
}
