//! [`AllocationStrategy`] trait and helpers.
//!
//! An allocation strategy is used to obtain and release the memory an
//! asynchronous operation needs to hold its bookkeeping state, most notably the
//! handler itself. See [`Completion`] for how the strategy of a handler is used.
//!
//! [`Completion`]: crate::Completion

use std::mem;
use std::ptr::NonNull;
use std::rc::Rc;
use std::sync::Arc;

/// Alignment guaranteed for all pointers returned by the default allocation
/// strategy.
///
/// Custom strategies must return pointers aligned to (at least) this value.
// NOTE: this matches `MALLOC_ALIGNMENT` of the common C libraries.
pub const DEFAULT_ALIGNMENT: usize = 2 * mem::size_of::<usize>();

/// Strategy to allocate the memory of an asynchronous operation.
///
/// Both methods have a provided implementation that uses the default heap
/// strategy, see [`default_allocate`] and [`default_deallocate`]. So a type
/// that implements this trait without overriding anything uses the default
/// strategy, which is what most handlers want:
///
/// ```
/// use context_alloc::AllocationStrategy;
///
/// struct OnRead;
///
/// // SAFETY: uses the default strategy.
/// unsafe impl AllocationStrategy for OnRead {}
/// ```
///
/// Overriding both methods installs a custom strategy, for example one that
/// hands out memory from a per-connection arena.
///
/// # Safety
///
/// Users of the trait, such as [`Completion`], write values into the memory
/// returned by `allocate` and later hand it back to `deallocate`. So an
/// implementation must ensure that:
///  * `allocate` only returns a block of at least `size` bytes, aligned to
///    [`DEFAULT_ALIGNMENT`], that is owned by the caller until it's passed to
///    `deallocate`, and
///  * `deallocate` releases every block returned by `allocate`. The provided
///    `deallocate` only handles blocks returned by [`default_allocate`],
///    overriding `allocate` means `deallocate` must be overridden as well.
///
/// Implementing the trait requires `unsafe impl`:
///
/// ```compile_fail
/// use std::ptr::NonNull;
///
/// use context_alloc::AllocationStrategy;
///
/// struct Bogus;
///
/// impl AllocationStrategy for Bogus {
///     fn allocate(&self, _: usize) -> Option<NonNull<u8>> {
///         NonNull::new(64 as *mut u8)
///     }
/// }
/// ```
///
/// [`Completion`]: crate::Completion
pub unsafe trait AllocationStrategy {
    /// Allocate a block of at least `size` bytes.
    ///
    /// The returned pointer, if any, must be aligned to at least
    /// [`DEFAULT_ALIGNMENT`]. Returns `None` if the request can't be
    /// satisfied, in which case the caller is expected to fall back to the
    /// default strategy.
    fn allocate(&self, size: usize) -> Option<NonNull<u8>> {
        default_allocate(size)
    }

    /// Deallocate the block at `pointer`.
    ///
    /// # Safety
    ///
    /// `pointer` must be returned by [`AllocationStrategy::allocate`] on this
    /// strategy (or a clone of it), called with the same `size`. The memory
    /// can't be used after this call.
    unsafe fn deallocate(&self, pointer: NonNull<u8>, size: usize) {
        // SAFETY: caller must uphold the contract, which is the same as the
        // one of `default_deallocate` for the default `allocate`.
        unsafe { default_deallocate(pointer, size) }
    }
}

/// Context that uses the default allocation strategy.
///
/// Useful if an operation needs a context, but no custom strategy.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct DefaultStrategy;

// SAFETY: uses the default strategy.
unsafe impl AllocationStrategy for DefaultStrategy {}

// SAFETY: uses the default strategy.
unsafe impl AllocationStrategy for () {}

// SAFETY: forwards both methods to the same `T`.
unsafe impl<T: AllocationStrategy + ?Sized> AllocationStrategy for &T {
    fn allocate(&self, size: usize) -> Option<NonNull<u8>> {
        (**self).allocate(size)
    }

    unsafe fn deallocate(&self, pointer: NonNull<u8>, size: usize) {
        // SAFETY: caller must uphold the contract.
        unsafe { (**self).deallocate(pointer, size) }
    }
}

// SAFETY: forwards both methods to the same `T`.
unsafe impl<T: AllocationStrategy + ?Sized> AllocationStrategy for Rc<T> {
    fn allocate(&self, size: usize) -> Option<NonNull<u8>> {
        (**self).allocate(size)
    }

    unsafe fn deallocate(&self, pointer: NonNull<u8>, size: usize) {
        // SAFETY: caller must uphold the contract.
        unsafe { (**self).deallocate(pointer, size) }
    }
}

// SAFETY: forwards both methods to the same `T`.
unsafe impl<T: AllocationStrategy + ?Sized> AllocationStrategy for Arc<T> {
    fn allocate(&self, size: usize) -> Option<NonNull<u8>> {
        (**self).allocate(size)
    }

    unsafe fn deallocate(&self, pointer: NonNull<u8>, size: usize) {
        // SAFETY: caller must uphold the contract.
        unsafe { (**self).deallocate(pointer, size) }
    }
}

/// Allocate `size` bytes using the allocation strategy of `strategy`.
pub fn allocate<S>(size: usize, strategy: &S) -> Option<NonNull<u8>>
where
    S: AllocationStrategy + ?Sized,
{
    strategy.allocate(size)
}

/// Deallocate `pointer` using the allocation strategy of `strategy`.
///
/// If `pointer` is null this does nothing.
///
/// # Safety
///
/// If not null, `pointer` must be returned by [`allocate`] (or
/// [`AllocationStrategy::allocate`]) called on the same strategy with the same
/// `size`.
pub unsafe fn deallocate<S>(pointer: *mut u8, size: usize, strategy: &S)
where
    S: AllocationStrategy + ?Sized,
{
    if let Some(pointer) = NonNull::new(pointer) {
        // SAFETY: caller must uphold the contract.
        unsafe { strategy.deallocate(pointer, size) }
    }
}

/// Default allocation strategy: allocate from the process heap.
///
/// Never returns a null pointer for zero sized requests, this allocates a
/// single byte instead.
pub fn default_allocate(size: usize) -> Option<NonNull<u8>> {
    // SAFETY: `malloc` is always safe to call, it returns null on failure.
    let pointer = unsafe { libc::malloc(size.max(1)) };
    NonNull::new(pointer.cast())
}

/// Deallocate memory allocated by [`default_allocate`].
///
/// # Safety
///
/// `pointer` must be returned by [`default_allocate`]. The memory can't be
/// used after this call.
pub unsafe fn default_deallocate(pointer: NonNull<u8>, _size: usize) {
    // SAFETY: caller must ensure `pointer` was allocated by `malloc`.
    unsafe { libc::free(pointer.as_ptr().cast()) }
}
