//! Division and shift throughput across widths and representations.
//!
//! Integer division is not uniformly cheap: some ARM cores have no divide
//! instruction at all and some x86 parts are much slower on 64-bit operands.
//! Each kernel repeatedly divides an accumulator by a divisor derived from
//! the iteration count, so the chain of dependent divisions is what gets
//! timed.

use std::hint::black_box;
use std::num::{NonZeroI64, NonZeroU64};

use anyhow::Result;

use crate::driver::Bench;

/// `i64 -> f64 -> i64` division agrees with native truncating division
/// whenever `|t| + |d| <= F64_EXACT_LIMIT`. Past it the float quotient can
/// round across an integer boundary. `i64::MIN / -1` is outside the range
/// too: it has no `i64` result, and the float path saturates to `i64::MAX`.
pub const F64_EXACT_LIMIT: i64 = 1 << 53;

pub fn divisor_i32(iters: u64) -> i32 {
    i32::try_from(iters).unwrap_or(i32::MAX).max(1)
}

pub fn divisor_i64(iters: u64) -> i64 {
    i64::try_from(iters).unwrap_or(i64::MAX).max(1)
}

pub fn divisor_u64(iters: u64) -> NonZeroU64 {
    NonZeroU64::new(iters).unwrap_or(NonZeroU64::MIN)
}

pub fn divisor_f32(iters: u64) -> f32 {
    iters.max(1) as f32
}

pub fn divisor_f64(iters: u64) -> f64 {
    iters.max(1) as f64
}

pub fn div_i32(iters: u64) -> i32 {
    let d = black_box(divisor_i32(iters));
    let mut t = i32::MAX;
    for _ in 0..iters {
        t /= d;
    }
    t
}

pub fn div_i64(iters: u64) -> i64 {
    let d = black_box(divisor_i64(iters));
    let mut t = i64::MAX;
    for _ in 0..iters {
        t /= d;
    }
    t
}

pub fn div_i64_checked(iters: u64) -> i64 {
    let d = black_box(divisor_i64(iters));
    let mut t = i64::MAX;
    // Once `d > 0` is established here the optimizer may drop the per-iteration
    // zero and `MIN / -1` checks. Nothing guarantees it; compare the timing
    // against `div_i64` to see whether it happened.
    if d <= 0 {
        return t;
    }
    for _ in 0..iters {
        t /= d;
    }
    t
}

/// No runtime check at all: the divisor type rules zero out.
pub fn div_u64_nonzero(iters: u64) -> u64 {
    let d = black_box(divisor_u64(iters));
    let mut t = u64::MAX;
    for _ in 0..iters {
        t /= d;
    }
    t
}

pub fn div_f32(iters: u64) -> f32 {
    let d = black_box(divisor_f32(iters));
    let mut t = 1e38f32;
    for _ in 0..iters {
        t /= d;
    }
    t
}

pub fn div_f64(iters: u64) -> f64 {
    let d = black_box(divisor_f64(iters));
    let mut t = 1e308f64;
    for _ in 0..iters {
        t /= d;
    }
    t
}

pub fn div_i64_via_f64(iters: u64) -> i64 {
    let d = black_box(divisor_i64(iters));
    let mut t = i64::MAX;
    for _ in 0..iters {
        t = via_f64(t, d);
    }
    t
}

/// Truncating division routed through `f64`. `as` saturates at the `i64`
/// bounds.
#[inline]
pub fn via_f64(t: i64, d: i64) -> i64 {
    (t as f64 / d as f64) as i64
}

pub fn shr_i32(iters: u64) -> i32 {
    let mut t = i32::MAX;
    for _ in 0..iters {
        t >>= 1;
    }
    t
}

pub fn shr_i64(iters: u64) -> i64 {
    let mut t = i64::MAX;
    for _ in 0..iters {
        t >>= 1;
    }
    t
}

/// `>> 1` rounds toward negative infinity, `/ 2` toward zero: they agree on
/// every non-negative value and every even value, and differ by one on
/// negative odd values.
pub fn shr1_matches_div2_i32(t: i32) -> bool {
    t >> 1 == t / 2
}

pub fn shr1_matches_div2_i64(t: i64) -> bool {
    t >> 1 == t / 2
}

/// One `t / d` step in every representation the kernels use.
///
/// The integer fields are `None` when the quotient has no value in that
/// width: operands that do not fit, or `MIN / -1`, whose true result is one
/// past `MAX`. The float fields always hold the rounded exact quotient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quotients {
    pub int32: Option<i32>,
    pub int64: Option<i64>,
    pub float32: f32,
    pub float64: f64,
    pub int64_via_float64: i64,
}

pub fn divide_all(t: i64, d: NonZeroI64) -> Quotients {
    let d = d.get();
    let int32 = match (i32::try_from(t), i32::try_from(d)) {
        (Ok(t), Ok(d)) => t.checked_div(d),
        _ => None,
    };
    Quotients {
        int32,
        int64: t.checked_div(d),
        float32: t as f32 / d as f32,
        float64: t as f64 / d as f64,
        int64_via_float64: via_f64(t, d),
    }
}

pub(crate) fn bench<T>(b: &mut Bench, kernel: fn(u64) -> T) -> Result<()> {
    b.time(kernel);
    Ok(())
}
