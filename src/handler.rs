//! Handler wrappers that override the allocation strategy of a handler.
//!
//! See [`ContextAllocHandler`] and [`ExplicitContextAllocHandler`].

use std::ptr::NonNull;

use crate::alloc::{self, AllocationStrategy};
use crate::call::{for_each_arity, Call, CallMut, CallOnce};
use crate::cont::{self, ContinuationHint};
use crate::invoke::InvocationStrategy;

/// Handler that uses the allocation strategy of a context.
///
/// Created by [`make_context_alloc_handler`].
///
/// The wrapper:
///  * allocates using the [`AllocationStrategy`] of the context, never that of
///    the handler,
///  * invokes using the [`InvocationStrategy`] of the handler,
///  * returns the [`ContinuationHint`] of the handler, and
///  * forwards all calls, unchanged, to the handler.
///
/// Because the wrapper itself is a handler it can be passed anywhere a
/// handler is expected, including to another wrapper.
///
/// # Notes
///
/// The context is stored by value. To share a single context, e.g. an arena
/// per connection, between multiple operations wrap a handle to it, such as
/// `&Arena` or `Rc<Arena>`.
#[derive(Copy, Clone, Debug)]
pub struct ContextAllocHandler<C, H> {
    context: C,
    handler: H,
}

impl<C, H> ContextAllocHandler<C, H> {
    /// Wrap `handler`, making it use the allocation strategy of `context`.
    pub const fn new(context: C, handler: H) -> ContextAllocHandler<C, H> {
        ContextAllocHandler { context, handler }
    }

    /// Returns the allocation context.
    pub const fn context(&self) -> &C {
        &self.context
    }

    /// Returns the wrapped handler.
    pub const fn handler(&self) -> &H {
        &self.handler
    }

    /// Returns the context and handler.
    pub fn into_parts(self) -> (C, H) {
        (self.context, self.handler)
    }
}

// SAFETY: forwards both methods to the context.
unsafe impl<C, H> AllocationStrategy for ContextAllocHandler<C, H>
where
    C: AllocationStrategy,
{
    fn allocate(&self, size: usize) -> Option<NonNull<u8>> {
        alloc::allocate(size, &self.context)
    }

    unsafe fn deallocate(&self, pointer: NonNull<u8>, size: usize) {
        // SAFETY: `allocate` uses the context's strategy, so the caller's
        // contract carries over to it.
        unsafe { self.context.deallocate(pointer, size) }
    }
}

impl<C, H> InvocationStrategy for ContextAllocHandler<C, H>
where
    H: InvocationStrategy,
{
    fn invoke<F>(self, function: F)
    where
        F: FnOnce(Self),
    {
        let ContextAllocHandler { context, handler } = self;
        handler.invoke(move |handler| function(ContextAllocHandler { context, handler }))
    }
}

impl<C, H> ContinuationHint for ContextAllocHandler<C, H>
where
    H: ContinuationHint,
{
    fn is_continuation(&self) -> bool {
        cont::is_continuation(&self.handler)
    }
}

impl<C, H, Args> CallOnce<Args> for ContextAllocHandler<C, H>
where
    H: CallOnce<Args>,
{
    fn call_once(self, args: Args) {
        self.handler.call_once(args)
    }
}

impl<C, H, Args> CallMut<Args> for ContextAllocHandler<C, H>
where
    H: CallMut<Args>,
{
    fn call_mut(&mut self, args: Args) {
        self.handler.call_mut(args)
    }
}

impl<C, H, Args> Call<Args> for ContextAllocHandler<C, H>
where
    H: Call<Args>,
{
    fn call(&self, args: Args) {
        self.handler.call(args)
    }
}

/// Create a [`ContextAllocHandler`].
///
/// # Examples
///
/// ```
/// use std::io;
///
/// use context_alloc::{handler_fn, make_context_alloc_handler, CallOnce, DefaultStrategy};
///
/// let on_read = handler_fn(|result: io::Result<()>, n: usize| {
///     assert!(result.is_ok());
///     assert_eq!(n, 10);
/// });
/// let handler = make_context_alloc_handler(DefaultStrategy, on_read);
///
/// let result: io::Result<()> = Ok(());
/// handler.call_once((result, 10_usize));
/// ```
pub const fn make_context_alloc_handler<C, H>(context: C, handler: H) -> ContextAllocHandler<C, H> {
    ContextAllocHandler::new(context, handler)
}

/// Handler that uses the allocation strategy of a context and passes the
/// context to the handler.
///
/// Created by [`make_explicit_context_alloc_handler`].
///
/// This is the same as [`ContextAllocHandler`], except that each call passes
/// a shared reference to the context as first argument to the handler. This
/// way the handler can use the context, e.g. the connection that owns the
/// arena, without having to store (a copy of) it itself. This reduces the size
/// of the wrapper and the cost of moving it around.
///
/// The handler must accept the context reference in all call forms, e.g. for
/// a wrapper called with `(io::Result<()>, usize)` the handler must implement
/// `for<'c> CallOnce<(&'c C, io::Result<()>, usize)>`. The context is passed
/// as shared reference, even when the wrapper is called by mutable reference
/// or by value.
#[derive(Copy, Clone, Debug)]
pub struct ExplicitContextAllocHandler<C, H> {
    context: C,
    handler: H,
}

impl<C, H> ExplicitContextAllocHandler<C, H> {
    /// Wrap `handler`, making it use the allocation strategy of `context`.
    pub const fn new(context: C, handler: H) -> ExplicitContextAllocHandler<C, H> {
        ExplicitContextAllocHandler { context, handler }
    }

    /// Returns the allocation context.
    pub const fn context(&self) -> &C {
        &self.context
    }

    /// Returns the wrapped handler.
    pub const fn handler(&self) -> &H {
        &self.handler
    }

    /// Returns the context and handler.
    pub fn into_parts(self) -> (C, H) {
        (self.context, self.handler)
    }
}

// SAFETY: forwards both methods to the context.
unsafe impl<C, H> AllocationStrategy for ExplicitContextAllocHandler<C, H>
where
    C: AllocationStrategy,
{
    fn allocate(&self, size: usize) -> Option<NonNull<u8>> {
        alloc::allocate(size, &self.context)
    }

    unsafe fn deallocate(&self, pointer: NonNull<u8>, size: usize) {
        // SAFETY: see `ContextAllocHandler::deallocate`.
        unsafe { self.context.deallocate(pointer, size) }
    }
}

impl<C, H> InvocationStrategy for ExplicitContextAllocHandler<C, H>
where
    H: InvocationStrategy,
{
    fn invoke<F>(self, function: F)
    where
        F: FnOnce(Self),
    {
        let ExplicitContextAllocHandler { context, handler } = self;
        handler.invoke(move |handler| function(ExplicitContextAllocHandler { context, handler }))
    }
}

impl<C, H> ContinuationHint for ExplicitContextAllocHandler<C, H>
where
    H: ContinuationHint,
{
    fn is_continuation(&self) -> bool {
        cont::is_continuation(&self.handler)
    }
}

macro_rules! explicit_call_impls {
    ($( $arg: ident $value: ident ),*) => {
        impl<C, H $(, $arg)*> CallOnce<($($arg,)*)> for ExplicitContextAllocHandler<C, H>
        where
            H: for<'c> CallOnce<(&'c C, $($arg,)*)>,
        {
            fn call_once(self, ($($value,)*): ($($arg,)*)) {
                let ExplicitContextAllocHandler { context, handler } = self;
                handler.call_once((&context, $($value,)*))
            }
        }

        impl<C, H $(, $arg)*> CallMut<($($arg,)*)> for ExplicitContextAllocHandler<C, H>
        where
            H: for<'c> CallMut<(&'c C, $($arg,)*)>,
        {
            fn call_mut(&mut self, ($($value,)*): ($($arg,)*)) {
                self.handler.call_mut((&self.context, $($value,)*))
            }
        }

        impl<C, H $(, $arg)*> Call<($($arg,)*)> for ExplicitContextAllocHandler<C, H>
        where
            H: for<'c> Call<(&'c C, $($arg,)*)>,
        {
            fn call(&self, ($($value,)*): ($($arg,)*)) {
                self.handler.call((&self.context, $($value,)*))
            }
        }
    };
}

for_each_arity!(explicit_call_impls);

/// Create an [`ExplicitContextAllocHandler`].
///
/// # Examples
///
/// ```
/// use std::io;
///
/// use context_alloc::{handler_fn, make_explicit_context_alloc_handler, CallOnce, DefaultStrategy};
///
/// let on_read = handler_fn(|context: &DefaultStrategy, result: io::Result<()>, n: usize| {
///     assert_eq!(*context, DefaultStrategy);
///     assert!(result.is_ok());
///     assert_eq!(n, 10);
/// });
/// let handler = make_explicit_context_alloc_handler(DefaultStrategy, on_read);
///
/// let result: io::Result<()> = Ok(());
/// handler.call_once((result, 10_usize));
/// ```
pub const fn make_explicit_context_alloc_handler<C, H>(
    context: C,
    handler: H,
) -> ExplicitContextAllocHandler<C, H> {
    ExplicitContextAllocHandler::new(context, handler)
}
