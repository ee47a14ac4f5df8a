//! Number-to-text conversion cost.
//!
//! Every benchmark renders the loop counter into a reusable `String` and
//! clears it afterwards, so buffer growth is paid once before the timer
//! starts and only the conversion itself is measured.

use std::fmt::{self, Write as _};
use std::hint::black_box;

use anyhow::Result;

use crate::driver::Bench;

/// Large enough for any counter rendering, including `{:.6}` of `u64::MAX as f64`.
const BUF_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntStrategy {
    /// `write!` straight into the buffer.
    Display,
    Itoa,
    /// `to_string()`, then append. Allocates a temporary.
    ToString,
    /// `format!`, then append. Allocates a temporary.
    FormatMacro,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloatStrategy {
    /// `{:.6}`; lossy for values needing more than six fractional digits.
    Fixed,
    /// `{}`, the shortest string that parses back to the same value.
    Shortest,
    Ryu,
}

pub fn write_int<I>(buf: &mut String, strategy: IntStrategy, value: I)
where
    I: itoa::Integer + fmt::Display,
{
    match strategy {
        IntStrategy::Display => {
            let _ = write!(buf, "{}", value);
        }
        IntStrategy::Itoa => buf.push_str(itoa::Buffer::new().format(value)),
        IntStrategy::ToString => buf.push_str(&value.to_string()),
        IntStrategy::FormatMacro => buf.push_str(&format!("{}", value)),
    }
}

pub fn write_float<F>(buf: &mut String, strategy: FloatStrategy, value: F)
where
    F: ryu::Float + fmt::Display,
{
    match strategy {
        FloatStrategy::Fixed => {
            let _ = write!(buf, "{:.6}", value);
        }
        FloatStrategy::Shortest => {
            let _ = write!(buf, "{}", value);
        }
        FloatStrategy::Ryu => buf.push_str(ryu::Buffer::new().format(value)),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatVariant {
    DisplayInt32,
    DisplayInt64,
    FixedFloat32,
    FixedFloat64,
    ShortestFloat32,
    ShortestFloat64,
    RyuFloat64,
    ItoaInt64,
    ToStringInt64,
    FormatMacroInt32,
}

impl FormatVariant {
    pub const ALL: [FormatVariant; 10] = [
        FormatVariant::DisplayInt32,
        FormatVariant::DisplayInt64,
        FormatVariant::FixedFloat32,
        FormatVariant::FixedFloat64,
        FormatVariant::ShortestFloat32,
        FormatVariant::ShortestFloat64,
        FormatVariant::RyuFloat64,
        FormatVariant::ItoaInt64,
        FormatVariant::ToStringInt64,
        FormatVariant::FormatMacroInt32,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            FormatVariant::DisplayInt32 => "display_int32",
            FormatVariant::DisplayInt64 => "display_int64",
            FormatVariant::FixedFloat32 => "fixed_float32",
            FormatVariant::FixedFloat64 => "fixed_float64",
            FormatVariant::ShortestFloat32 => "shortest_float32",
            FormatVariant::ShortestFloat64 => "shortest_float64",
            FormatVariant::RyuFloat64 => "ryu_float64",
            FormatVariant::ItoaInt64 => "itoa_int64",
            FormatVariant::ToStringInt64 => "to_string_int64",
            FormatVariant::FormatMacroInt32 => "format_macro_int32",
        }
    }

    /// Append the rendering of counter `i` to `buf`.
    pub fn render(self, i: u64, buf: &mut String) {
        match self {
            FormatVariant::DisplayInt32 => write_int(buf, IntStrategy::Display, i as i32),
            FormatVariant::DisplayInt64 => write_int(buf, IntStrategy::Display, i as i64),
            FormatVariant::FixedFloat32 => write_float(buf, FloatStrategy::Fixed, i as f32),
            FormatVariant::FixedFloat64 => write_float(buf, FloatStrategy::Fixed, i as f64),
            FormatVariant::ShortestFloat32 => write_float(buf, FloatStrategy::Shortest, i as f32),
            FormatVariant::ShortestFloat64 => write_float(buf, FloatStrategy::Shortest, i as f64),
            FormatVariant::RyuFloat64 => write_float(buf, FloatStrategy::Ryu, i as f64),
            FormatVariant::ItoaInt64 => write_int(buf, IntStrategy::Itoa, i as i64),
            FormatVariant::ToStringInt64 => write_int(buf, IntStrategy::ToString, i as i64),
            FormatVariant::FormatMacroInt32 => write_int(buf, IntStrategy::FormatMacro, i as i32),
        }
    }
}

pub(crate) fn bench(b: &mut Bench, variant: FormatVariant) -> Result<()> {
    let mut buf = String::with_capacity(BUF_CAPACITY);
    b.reset_timer();
    for i in 0..b.iters() {
        variant.render(i, &mut buf);
        black_box(&buf);
        buf.clear();
    }
    b.stop_timer();
    Ok(())
}
