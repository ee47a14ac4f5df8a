//! Per-call overhead of the different ways to invoke the same trivial
//! function (`i * 2`).
//!
//! Plain closures in Rust are stack values and never allocate, whatever they
//! capture. The boxed variants are the ones that pay for a heap-allocated
//! function value, once per construction.

use std::hint::black_box;

use anyhow::Result;

use crate::driver::Bench;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallVariant {
    Direct,
    NoInline,
    ClosureArgument,
    /// Closure reading the loop variable through a shared borrow.
    ClosureCapture,
    /// Closure holding its own copy of the loop variable.
    ClosureMove,
    FnPointer,
    FnPointerRepeated,
    BoxedClosure,
    BoxedClosureRepeated,
}

// The closures are built and called in place on purpose; that is what is measured.
#[allow(clippy::redundant_closure_call)]
impl CallVariant {
    pub const ALL: [CallVariant; 9] = [
        CallVariant::Direct,
        CallVariant::NoInline,
        CallVariant::ClosureArgument,
        CallVariant::ClosureCapture,
        CallVariant::ClosureMove,
        CallVariant::FnPointer,
        CallVariant::FnPointerRepeated,
        CallVariant::BoxedClosure,
        CallVariant::BoxedClosureRepeated,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            CallVariant::Direct => "normal",
            CallVariant::NoInline => "normal_not_inline",
            CallVariant::ClosureArgument => "closure_argument",
            CallVariant::ClosureCapture => "closure",
            CallVariant::ClosureMove => "closure_move",
            CallVariant::FnPointer => "function_pointer",
            CallVariant::FnPointerRepeated => "function_pointer_repeated",
            CallVariant::BoxedClosure => "boxed_closure",
            CallVariant::BoxedClosureRepeated => "boxed_closure_repeated",
        }
    }

    /// Whether building the function value costs a heap allocation.
    pub fn allocates(self) -> bool {
        matches!(self, CallVariant::BoxedClosure | CallVariant::BoxedClosureRepeated)
    }

    /// Invoke the variant once.
    pub fn call(self, i: i64) -> i64 {
        match self {
            CallVariant::Direct => double(i),
            CallVariant::NoInline => double_no_inline(i),
            CallVariant::ClosureArgument => {
                let f = |j: i64| j * 2;
                f(i)
            }
            CallVariant::ClosureCapture => {
                let f = || i * 2;
                f()
            }
            CallVariant::ClosureMove => {
                let f = move || i * 2;
                f()
            }
            CallVariant::FnPointer | CallVariant::FnPointerRepeated => doubler()(i),
            CallVariant::BoxedClosure | CallVariant::BoxedClosureRepeated => scaler(2)(i),
        }
    }

    /// Timing loop: call the variant for `0..iters`, returning the last result.
    pub fn run(self, iters: u64) -> i64 {
        let n = i64::try_from(iters).unwrap_or(i64::MAX);
        let mut t = 0;
        match self {
            CallVariant::Direct => {
                for i in 0..n {
                    t = black_box(double(i));
                }
            }
            CallVariant::NoInline => {
                for i in 0..n {
                    t = black_box(double_no_inline(i));
                }
            }
            CallVariant::ClosureArgument => {
                for i in 0..n {
                    let f = |j: i64| j * 2;
                    t = black_box(f(i));
                }
            }
            CallVariant::ClosureCapture => {
                for i in 0..n {
                    let f = || i * 2;
                    t = black_box(f());
                }
            }
            CallVariant::ClosureMove => {
                for i in 0..n {
                    let f = move || i * 2;
                    t = black_box(f());
                }
            }
            CallVariant::FnPointer => {
                let f = black_box(doubler());
                for i in 0..n {
                    t = black_box(f(i));
                }
            }
            CallVariant::FnPointerRepeated => {
                for i in 0..n {
                    let f = black_box(doubler());
                    t = black_box(f(i));
                }
            }
            CallVariant::BoxedClosure => {
                let f = scaler(2);
                for i in 0..n {
                    t = black_box(f(i));
                }
            }
            CallVariant::BoxedClosureRepeated => {
                for i in 0..n {
                    let f = scaler(2);
                    t = black_box(f(i));
                }
            }
        }
        t
    }
}

pub fn double(i: i64) -> i64 {
    i * 2
}

#[inline(never)]
pub fn double_no_inline(i: i64) -> i64 {
    i * 2
}

/// Hands out a first-class function value.
pub fn doubler() -> fn(i64) -> i64 {
    |i| i * 2
}

/// Boxed closure capturing `factor`. The box goes through `black_box` so the
/// allocation cannot be elided.
pub fn scaler(factor: i64) -> Box<dyn Fn(i64) -> i64> {
    let f: Box<dyn Fn(i64) -> i64> = Box::new(move |i: i64| i * factor);
    black_box(f)
}

pub(crate) fn bench(b: &mut Bench, variant: CallVariant) -> Result<()> {
    b.time(|n| variant.run(n));
    Ok(())
}
