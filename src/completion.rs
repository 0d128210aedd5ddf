//! Completion record of an asynchronous operation.
//!
//! See [`Completion`].

use std::fmt;
use std::marker::PhantomData;
use std::mem::{self, ManuallyDrop, MaybeUninit};
use std::ptr::NonNull;

use log::trace;

use crate::alloc::{AllocationStrategy, DEFAULT_ALIGNMENT};
use crate::call::CallOnce;
use crate::cont::{self, ContinuationHint};
use crate::invoke::{self, InvocationStrategy};

/// Completion record of a pending operation.
///
/// This holds the handler of an operation between the moment the operation is
/// submitted and the moment it completes (or is canceled). The memory for the
/// record is allocated using the [`AllocationStrategy`] of the handler, which
/// allows [wrappers] to place it in memory owned by a context.
///
/// If the strategy fails to allocate, or the handler requires a larger
/// alignment than [`DEFAULT_ALIGNMENT`], the record falls back to the global
/// heap.
///
/// Dropping the record without calling [`complete`] drops the handler without
/// calling it, which is what happens when an operation is canceled.
///
/// [wrappers]: crate::ContextAllocHandler
/// [`complete`]: Completion::complete
pub struct Completion<H: AllocationStrategy> {
    /// Always points to an initialised handler.
    handler: NonNull<H>,
    storage: Storage,
    _phantom: PhantomData<H>,
}

/// Where the memory of a [`Completion`] came from.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Storage {
    /// Allocated using the handler's [`AllocationStrategy`].
    Strategy,
    /// Allocated using a `Box`.
    Heap,
}

impl<H: AllocationStrategy> Completion<H> {
    /// Create a new completion record holding `handler`.
    pub fn new(handler: H) -> Completion<H> {
        let size = mem::size_of::<H>();
        let align = mem::align_of::<H>();
        if align <= DEFAULT_ALIGNMENT {
            if let Some(pointer) = handler.allocate(size) {
                if (pointer.as_ptr() as usize) % align == 0 {
                    let pointer = pointer.cast::<H>();
                    // SAFETY: `AllocationStrategy` ensures the block is
                    // owned by us and valid for `size` bytes, the alignment
                    // is checked above.
                    unsafe { pointer.as_ptr().write(handler) };
                    return Completion {
                        handler: pointer,
                        storage: Storage::Strategy,
                        _phantom: PhantomData,
                    };
                }

                trace!(size = size, align = align; "allocation strategy returned a misaligned pointer");
                // SAFETY: `pointer` was just allocated using the same
                // strategy and size.
                unsafe { handler.deallocate(pointer, size) };
            }
        }

        trace!(size = size, align = align; "using global heap for completion record");
        Completion {
            handler: NonNull::from(Box::leak(Box::new(handler))),
            storage: Storage::Heap,
            _phantom: PhantomData,
        }
    }

    /// Returns `true` if the record was allocated using the handler's
    /// allocation strategy, `false` if it fell back to the global heap.
    pub fn uses_strategy(&self) -> bool {
        self.storage == Storage::Strategy
    }

    /// Returns the continuation hint of the handler.
    pub fn is_continuation(&self) -> bool
    where
        H: ContinuationHint,
    {
        // SAFETY: `handler` is always initialised.
        cont::is_continuation(unsafe { self.handler.as_ref() })
    }

    /// Complete the operation, calling the handler with `args`.
    ///
    /// The memory of the record is released *before* the handler is called,
    /// so that the handler can reuse it for the next operation. The handler is
    /// called using its [`InvocationStrategy`].
    pub fn complete<Args>(self, args: Args)
    where
        H: InvocationStrategy + CallOnce<Args>,
    {
        let handler = self.take();
        invoke::complete(handler, args)
    }

    /// Take the handler out of the record, releasing the record's memory.
    fn take(self) -> H {
        let this = ManuallyDrop::new(self);
        // SAFETY: `handler` is always initialised and `ManuallyDrop` ensures
        // we don't drop it again.
        let handler = unsafe { this.handler.as_ptr().read() };
        // SAFETY: moved the handler out above.
        unsafe { release(&handler, this.handler, this.storage) };
        handler
    }
}

/// Release the memory at `pointer`, the handler must be moved out already.
///
/// # Safety
///
/// `pointer` must be allocated by [`Completion::new`] with `storage`, and the
/// value at `pointer` must no longer be used.
unsafe fn release<H: AllocationStrategy>(handler: &H, pointer: NonNull<H>, storage: Storage) {
    match storage {
        // SAFETY: caller must ensure `pointer` is allocated using the
        // handler's strategy, which uses `size_of::<H>` as size.
        Storage::Strategy => unsafe { handler.deallocate(pointer.cast(), mem::size_of::<H>()) },
        // SAFETY: caller must ensure `pointer` comes from `Box::leak`.
        // `MaybeUninit` ensures we don't drop the handler twice.
        Storage::Heap => drop(unsafe { Box::from_raw(pointer.cast::<MaybeUninit<H>>().as_ptr()) }),
    }
}

impl<H: AllocationStrategy> Drop for Completion<H> {
    fn drop(&mut self) {
        // SAFETY: `handler` is always initialised. `take` doesn't call `drop`,
        // so this is the only other place it's moved out.
        let handler = unsafe { self.handler.as_ptr().read() };
        // SAFETY: moved the handler out above.
        unsafe { release(&handler, self.handler, self.storage) };
        drop(handler);
    }
}

impl<H: AllocationStrategy> fmt::Debug for Completion<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("storage", &self.storage)
            .finish()
    }
}

// SAFETY: `Completion` owns the handler, like a `Box`.
unsafe impl<H: AllocationStrategy + Send> Send for Completion<H> {}
unsafe impl<H: AllocationStrategy + Sync> Sync for Completion<H> {}
