use std::fmt::Write as _;

use anyhow::Context;
use rtbench_core::driver::Measurement;

/// One line per benchmark: name, iterations, ns/op and, when allocations were
/// tracked, B/op and allocs/op.
pub(crate) fn render_text(measurements: &[Measurement]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "os: {}", std::env::consts::OS);
    let _ = writeln!(out, "arch: {}", std::env::consts::ARCH);

    let width = measurements.iter().map(|m| m.name.len()).max().unwrap_or(0);
    for m in measurements {
        let _ = write!(out, "{:<width$}  {:>12}  {:>12.2} ns/op", m.name, m.iters, m.ns_per_iter());
        if let (Some(bytes), Some(allocs)) = (m.bytes_per_iter(), m.allocs_per_iter()) {
            let _ = write!(out, "  {:>8} B/op  {:>8} allocs/op", bytes, allocs);
        }
        out.push('\n');
    }
    out
}

pub(crate) fn render_json(measurements: &[Measurement]) -> anyhow::Result<String> {
    let mut json = serde_json::to_string_pretty(measurements).context("serialize measurements")?;
    json.push('\n');
    Ok(json)
}
