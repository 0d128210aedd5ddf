use std::cell::{Cell, RefCell};
use std::io;
use std::rc::Rc;

use context_alloc::{handler_fn, is_continuation, Call, CallMut, CallOnce, FnHandler};

use crate::util::{is_send, is_sync};

#[test]
fn fn_handler_is_send_and_sync() {
    is_send::<FnHandler<fn()>>();
    is_sync::<FnHandler<fn()>>();
}

#[test]
fn fn_handler_all_arities() {
    let calls = Rc::new(RefCell::new(Vec::new()));

    let c = calls.clone();
    handler_fn(move || c.borrow_mut().push(0)).call_once(());
    let c = calls.clone();
    handler_fn(move |a: u8| c.borrow_mut().push(a)).call_once((1,));
    let c = calls.clone();
    handler_fn(move |a: u8, b: u8| c.borrow_mut().push(a + b)).call_once((1, 1));
    let c = calls.clone();
    handler_fn(move |a: u8, b: u8, d: u8| c.borrow_mut().push(a + b + d)).call_once((1, 1, 1));
    let c = calls.clone();
    handler_fn(move |a: u8, b: u8, d: u8, e: u8| c.borrow_mut().push(a + b + d + e))
        .call_once((1, 1, 1, 1));
    let c = calls.clone();
    handler_fn(move |a: u8, b: u8, d: u8, e: u8, f: u8| c.borrow_mut().push(a + b + d + e + f))
        .call_once((1, 1, 1, 1, 1));
    let c = calls.clone();
    handler_fn(move |a: u8, b: u8, d: u8, e: u8, f: u8, g: u8| {
        c.borrow_mut().push(a + b + d + e + f + g)
    })
    .call_once((1, 1, 1, 1, 1, 1));
    let c = calls.clone();
    handler_fn(move |a: u8, b: u8, d: u8, e: u8, f: u8, g: u8, h: u8| {
        c.borrow_mut().push(a + b + d + e + f + g + h)
    })
    .call_once((1, 1, 1, 1, 1, 1, 1));
    let c = calls.clone();
    handler_fn(move |a: u8, b: u8, d: u8, e: u8, f: u8, g: u8, h: u8, i: u8| {
        c.borrow_mut().push(a + b + d + e + f + g + h + i)
    })
    .call_once((1, 1, 1, 1, 1, 1, 1, 1));

    assert_eq!(*calls.borrow(), [0, 1, 2, 3, 4, 5, 6, 7, 8]);
}

#[test]
fn fn_handler_call_forms() {
    let total = Rc::new(Cell::new(0));

    let t = total.clone();
    let handler = handler_fn(move |n: usize| t.set(t.get() + n));
    handler.call((1,));
    handler.call((2,));

    let mut count = 0;
    let mut handler = handler_fn(|n: usize| count += n);
    handler.call_mut((3,));
    handler.call_mut((4,));
    drop(handler);
    assert_eq!(count, 7);

    let t = total.clone();
    let s = String::from("moved");
    let handler = handler_fn(move |result: io::Result<()>| {
        assert!(result.is_ok());
        t.set(t.get() + s.len());
    });
    let result: io::Result<()> = Ok(());
    handler.call_once((result,));

    assert_eq!(total.get(), 3 + "moved".len());
}

#[test]
fn fn_handler_defaults() {
    let handler = handler_fn(|| {});
    assert!(!is_continuation(&handler));
    let f = handler.into_inner();
    f();
}
