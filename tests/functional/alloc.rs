use std::ptr::{self, NonNull};
use std::rc::Rc;
use std::sync::Arc;

use context_alloc::alloc::{self, default_allocate, default_deallocate, DEFAULT_ALIGNMENT};
use context_alloc::{AllocationStrategy, DefaultStrategy};

use crate::util::{Arena, NoMemory, ARENA_SIZE};

#[test]
fn default_allocate_is_aligned() {
    for size in [0, 1, 7, 8, 16, 31, 64, 100, 4096] {
        let pointer = default_allocate(size).expect("failed to allocate");
        assert_eq!(pointer.as_ptr() as usize % DEFAULT_ALIGNMENT, 0);
        // SAFETY: allocated `size` bytes above.
        unsafe {
            pointer.as_ptr().write_bytes(0xAB, size);
            default_deallocate(pointer, size);
        }
    }
}

#[test]
fn default_strategy() {
    let pointer = DefaultStrategy.allocate(32).expect("failed to allocate");
    unsafe { DefaultStrategy.deallocate(pointer, 32) };

    let pointer = ().allocate(32).expect("failed to allocate");
    unsafe { ().deallocate(pointer, 32) };
}

#[test]
fn arena_pool() {
    let arena = Arena::new();
    let pointer = arena.allocate(ARENA_SIZE).expect("failed to allocate");
    assert!(arena.owns(pointer));
    assert!(arena.in_use());

    // Pool is in use, falls back to the heap.
    let pointer2 = arena.allocate(8).expect("failed to allocate");
    assert!(!arena.owns(pointer2));

    unsafe {
        arena.deallocate(pointer2, 8);
        arena.deallocate(pointer, ARENA_SIZE);
    }
    assert!(!arena.in_use());
    assert_eq!(arena.allocations(), 2);
    assert_eq!(arena.deallocations(), 2);

    // Too large for the pool.
    let pointer = arena.allocate(ARENA_SIZE + 1).expect("failed to allocate");
    assert!(!arena.owns(pointer));
    assert!(!arena.in_use());
    unsafe { arena.deallocate(pointer, ARENA_SIZE + 1) };
}

#[test]
fn handles_forward_strategy() {
    let arena = Arena::new();
    let pointer = (&arena).allocate(16).expect("failed to allocate");
    assert!(arena.owns(pointer));
    unsafe { (&arena).deallocate(pointer, 16) };
    assert!(!arena.in_use());

    let arena = Rc::new(Arena::new());
    let pointer = arena.clone().allocate(16).expect("failed to allocate");
    assert!(arena.owns(pointer));
    unsafe { AllocationStrategy::deallocate(&arena, pointer, 16) };
    assert!(!arena.in_use());

    let arena = Arc::new(Arena::new());
    let pointer = AllocationStrategy::allocate(&arena, 16).expect("failed to allocate");
    assert!(arena.owns(pointer));
    unsafe { AllocationStrategy::deallocate(&arena, pointer, 16) };
    assert!(!arena.in_use());
    assert_eq!(arena.allocations(), 1);
    assert_eq!(arena.deallocations(), 1);
}

#[test]
fn allocate_helper() {
    let arena = Arena::new();
    let pointer = alloc::allocate(32, &arena).expect("failed to allocate");
    assert!(arena.owns(pointer));
    unsafe { alloc::deallocate(pointer.as_ptr(), 32, &arena) };
    assert!(!arena.in_use());
    assert_eq!(arena.deallocations(), 1);
}

#[test]
fn allocate_helper_returns_none() {
    let context = NoMemory::default();
    assert!(alloc::allocate(32, &context).is_none());
    assert_eq!(context.attempts(), 1);
}

#[test]
fn deallocate_null_pointer() {
    // `NoMemory` panics if `deallocate` is called.
    let context = NoMemory::default();
    unsafe { alloc::deallocate(ptr::null_mut(), 32, &context) };

    let arena = Arena::new();
    unsafe { alloc::deallocate(ptr::null_mut(), 32, &arena) };
    assert_eq!(arena.deallocations(), 0);
}

#[test]
fn dyn_allocation_strategy() {
    let arena = Arena::new();
    let strategy: &dyn AllocationStrategy = &arena;
    let pointer: NonNull<u8> = alloc::allocate(8, strategy).expect("failed to allocate");
    assert!(arena.owns(pointer));
    unsafe { alloc::deallocate(pointer.as_ptr(), 8, strategy) };
    assert!(!arena.in_use());
}
