//! Completion handler wrappers that override the allocation strategy of a
//! handler.
//!
//! An asynchronous operation, e.g. a read from a socket, is started with a
//! completion handler: a value that is called once the operation is done (or
//! canceled). Besides being callable, a handler determines three things:
//!
//!  * how the memory the operation needs for its bookkeeping is allocated,
//!    its [`AllocationStrategy`],
//!  * how the handler is invoked, e.g. on a strand, its
//!    [`InvocationStrategy`], and
//!  * whether invoking it continues the current task, its
//!    [`ContinuationHint`].
//!
//! This crate provides two wrappers that replace *only* the allocation
//! strategy of a handler with the one from a separate context (e.g. an arena
//! per connection), while forwarding everything else to the handler unchanged:
//!
//!  * [`ContextAllocHandler`], created by [`make_context_alloc_handler`],
//!    calls the handler with the arguments it receives.
//!  * [`ExplicitContextAllocHandler`], created by
//!    [`make_explicit_context_alloc_handler`], additionally passes a reference
//!    to the context as first argument, so the handler doesn't need to keep its
//!    own copy.
//!
//! Both wrappers are handlers themselves, so they can be used anywhere a
//! handler can, including in another wrapper.
//!
//! The [`Completion`] type shows the other side of the contract: how an I/O
//! framework stores a handler for a pending operation.
//!
//! # Examples
//!
//! Allocating the completion record of an operation using a context.
//!
//! ```
//! use std::cell::Cell;
//! use std::io;
//! use std::ptr::NonNull;
//!
//! use context_alloc::alloc::{default_allocate, default_deallocate};
//! use context_alloc::{handler_fn, make_context_alloc_handler, AllocationStrategy, Completion};
//!
//! /// Context that counts the number of allocations.
//! #[derive(Default)]
//! struct Connection {
//!     allocations: Cell<usize>,
//! }
//!
//! // SAFETY: allocates and deallocates using the default strategy.
//! unsafe impl AllocationStrategy for Connection {
//!     fn allocate(&self, size: usize) -> Option<NonNull<u8>> {
//!         self.allocations.set(self.allocations.get() + 1);
//!         default_allocate(size)
//!     }
//!
//!     unsafe fn deallocate(&self, pointer: NonNull<u8>, size: usize) {
//!         // SAFETY: caller must ensure `pointer` comes from `allocate`.
//!         unsafe { default_deallocate(pointer, size) }
//!     }
//! }
//!
//! let connection = Connection::default();
//! let on_read = handler_fn(|result: io::Result<()>, n: usize| {
//!     assert!(result.is_ok());
//!     assert_eq!(n, 10);
//! });
//!
//! // Start the operation.
//! let completion = Completion::new(make_context_alloc_handler(&connection, on_read));
//! assert_eq!(connection.allocations.get(), 1);
//!
//! // Operation is done.
//! let result: io::Result<()> = Ok(());
//! completion.complete((result, 10_usize));
//! ```

pub mod alloc;
mod call;
mod completion;
mod cont;
mod handler;
pub mod invoke;

pub use alloc::{AllocationStrategy, DefaultStrategy};
pub use call::{handler_fn, Call, CallMut, CallOnce, FnHandler};
pub use completion::Completion;
pub use cont::{is_continuation, ContinuationHint};
pub use handler::{
    make_context_alloc_handler, make_explicit_context_alloc_handler, ContextAllocHandler,
    ExplicitContextAllocHandler,
};
pub use invoke::InvocationStrategy;

/// Complete handler contract.
///
/// A handler that can be called with `Args` and has an allocation strategy,
/// invocation strategy and continuation hint. Implemented for all types that
/// implement the required traits, there is no need to implement it manually.
pub trait Handler<Args>:
    CallOnce<Args> + AllocationStrategy + InvocationStrategy + ContinuationHint
{
}

impl<T, Args> Handler<Args> for T where
    T: CallOnce<Args> + AllocationStrategy + InvocationStrategy + ContinuationHint
{
}
