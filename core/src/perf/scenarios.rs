use anyhow::{Context, Result};
use regex::Regex;

use crate::driver::{BenchCase, Group};
use crate::perf::{
    addressing, arith,
    calls::{self, CallVariant},
    format::{self, FormatVariant},
};

macro_rules! call_case {
    ($variant:expr) => {
        BenchCase {
            group: Group::Function,
            variant: $variant.name(),
            report_allocs: true,
            run: |b| calls::bench(b, $variant),
        }
    };
}

macro_rules! format_case {
    ($variant:expr) => {
        BenchCase {
            group: Group::Format,
            variant: $variant.name(),
            report_allocs: true,
            run: |b| format::bench(b, $variant),
        }
    };
}

macro_rules! arith_case {
    ($group:expr, $variant:literal, $kernel:path) => {
        BenchCase {
            group: $group,
            variant: $variant,
            report_allocs: false,
            run: |b| arith::bench(b, $kernel),
        }
    };
}

static CASES: &[BenchCase] = &[
    BenchCase {
        group: Group::Addressing,
        variant: "uint16",
        report_allocs: false,
        run: addressing::bench_uint16,
    },
    BenchCase {
        group: Group::Addressing,
        variant: "uint8_pair",
        report_allocs: false,
        run: addressing::bench_uint8_pair,
    },
    BenchCase {
        group: Group::Addressing,
        variant: "uint8_pair_chunks",
        report_allocs: false,
        run: addressing::bench_uint8_pair_chunks,
    },
    call_case!(CallVariant::Direct),
    call_case!(CallVariant::NoInline),
    call_case!(CallVariant::ClosureArgument),
    call_case!(CallVariant::ClosureCapture),
    call_case!(CallVariant::ClosureMove),
    call_case!(CallVariant::FnPointer),
    call_case!(CallVariant::FnPointerRepeated),
    call_case!(CallVariant::BoxedClosure),
    call_case!(CallVariant::BoxedClosureRepeated),
    arith_case!(Group::Division, "int32", arith::div_i32),
    arith_case!(Group::Division, "int64", arith::div_i64),
    arith_case!(Group::Division, "int64_checked", arith::div_i64_checked),
    arith_case!(Group::Division, "uint64_nonzero", arith::div_u64_nonzero),
    arith_case!(Group::Division, "float32", arith::div_f32),
    arith_case!(Group::Division, "float64", arith::div_f64),
    arith_case!(Group::Division, "int64_via_float64", arith::div_i64_via_f64),
    arith_case!(Group::Shift, "int32", arith::shr_i32),
    arith_case!(Group::Shift, "int64", arith::shr_i64),
    format_case!(FormatVariant::DisplayInt32),
    format_case!(FormatVariant::DisplayInt64),
    format_case!(FormatVariant::FixedFloat32),
    format_case!(FormatVariant::FixedFloat64),
    format_case!(FormatVariant::ShortestFloat32),
    format_case!(FormatVariant::ShortestFloat64),
    format_case!(FormatVariant::RyuFloat64),
    format_case!(FormatVariant::ItoaInt64),
    format_case!(FormatVariant::ToStringInt64),
    format_case!(FormatVariant::FormatMacroInt32),
];

/// Every registered benchmark, in reporting order.
pub fn all_cases() -> &'static [BenchCase] {
    CASES
}

pub fn group_cases(group: Group) -> impl Iterator<Item = &'static BenchCase> {
    CASES.iter().filter(move |case| case.group == group)
}

pub fn find(name: &str) -> Option<&'static BenchCase> {
    CASES.iter().find(|case| case.name() == name)
}

/// Cases whose `group/variant` name matches `pattern` (a regex, unanchored).
pub fn select(pattern: Option<&str>) -> Result<Vec<&'static BenchCase>> {
    let Some(pattern) = pattern else {
        return Ok(CASES.iter().collect());
    };
    let re = Regex::new(pattern).with_context(|| format!("invalid benchmark pattern '{}'", pattern))?;
    Ok(CASES.iter().filter(|case| re.is_match(&case.name())).collect())
}
