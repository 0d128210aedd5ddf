//! Call forms of a handler: [`CallOnce`], [`CallMut`] and [`Call`].
//!
//! The arguments of a call are passed as a tuple, e.g. a handler for a read
//! operation implements `CallOnce<(io::Result<()>, usize)>`. Closures can be
//! used as handlers using [`handler_fn`].

use std::fmt;

use crate::alloc::AllocationStrategy;
use crate::cont::ContinuationHint;
use crate::invoke::InvocationStrategy;

/// Call a handler, consuming it.
pub trait CallOnce<Args> {
    /// Call the handler with `args`.
    fn call_once(self, args: Args);
}

/// Call a handler by mutable reference.
pub trait CallMut<Args>: CallOnce<Args> {
    /// Call the handler with `args`.
    fn call_mut(&mut self, args: Args);
}

/// Call a handler by shared reference.
pub trait Call<Args>: CallMut<Args> {
    /// Call the handler with `args`.
    fn call(&self, args: Args);
}

/// Create a handler from closure `f`.
///
/// The returned handler uses the default allocation and invocation
/// strategies and is never a continuation.
///
/// Closures taking zero up to eight arguments are supported.
///
/// # Examples
///
/// ```
/// use std::io;
///
/// use context_alloc::{handler_fn, CallOnce};
///
/// let on_read = handler_fn(|result: io::Result<()>, n: usize| {
///     assert!(result.is_ok());
///     assert_eq!(n, 10);
/// });
/// let result: io::Result<()> = Ok(());
/// on_read.call_once((result, 10_usize));
/// ```
pub const fn handler_fn<F>(f: F) -> FnHandler<F> {
    FnHandler { f }
}

/// Handler created by [`handler_fn`].
#[derive(Copy, Clone)]
pub struct FnHandler<F> {
    f: F,
}

impl<F> FnHandler<F> {
    /// Returns the closure.
    pub fn into_inner(self) -> F {
        self.f
    }
}

// SAFETY: uses the default strategy.
unsafe impl<F> AllocationStrategy for FnHandler<F> {}

impl<F> InvocationStrategy for FnHandler<F> {}

impl<F> ContinuationHint for FnHandler<F> {}

impl<F> fmt::Debug for FnHandler<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnHandler").finish()
    }
}

/// Calls `$m!` once for every supported argument list, passing pairs of
/// `type value` identifiers.
macro_rules! for_each_arity {
    ($m: ident) => {
        $m!();
        $m!(A1 a1);
        $m!(A1 a1, A2 a2);
        $m!(A1 a1, A2 a2, A3 a3);
        $m!(A1 a1, A2 a2, A3 a3, A4 a4);
        $m!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5);
        $m!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6);
        $m!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6, A7 a7);
        $m!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6, A7 a7, A8 a8);
    };
}

pub(crate) use for_each_arity;

macro_rules! fn_handler_impls {
    ($( $arg: ident $value: ident ),*) => {
        impl<F $(, $arg)*> CallOnce<($($arg,)*)> for FnHandler<F>
        where
            F: FnOnce($($arg),*),
        {
            fn call_once(self, ($($value,)*): ($($arg,)*)) {
                (self.f)($($value),*)
            }
        }

        impl<F $(, $arg)*> CallMut<($($arg,)*)> for FnHandler<F>
        where
            F: FnMut($($arg),*),
        {
            fn call_mut(&mut self, ($($value,)*): ($($arg,)*)) {
                (self.f)($($value),*)
            }
        }

        impl<F $(, $arg)*> Call<($($arg,)*)> for FnHandler<F>
        where
            F: Fn($($arg),*),
        {
            fn call(&self, ($($value,)*): ($($arg,)*)) {
                (self.f)($($value),*)
            }
        }
    };
}

for_each_arity!(fn_handler_impls);
