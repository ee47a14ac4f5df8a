use std::path::{Component, Path, PathBuf};
use std::sync::Once;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use rtbench_core::{
    alloc::CountingAllocator,
    driver::{self, BenchCase, Measurement},
    perf::scenarios,
};
use tracing::info;

mod report;

#[global_allocator]
static GLOBAL_ALLOCATOR: CountingAllocator = CountingAllocator::new();

static TRACE_INIT: Once = Once::new();
const DEFAULT_TRACE_FILTER: &str = "rtbench_core=debug,rtbench=info";

#[derive(Debug, Parser)]
#[command(
    name = "rtbench",
    author,
    version,
    about = "Run runtime micro-benchmarks by name",
    long_about = None,
    after_help = "Set RTBENCH_TRACE=1 (or a filter such as RTBENCH_TRACE=rtbench_core=trace) for diagnostics on stderr."
)]
struct CliArgs {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List registered benchmarks, optionally filtered by PATTERN.
    List {
        /// Regex matched against `group/variant`
        #[arg(value_name = "PATTERN")]
        pattern: Option<String>,
    },
    /// Run every benchmark whose name matches PATTERN (all when omitted).
    Run {
        /// Regex matched against `group/variant`
        #[arg(value_name = "PATTERN")]
        pattern: Option<String>,
        /// Fixed iteration count; skips calibration
        #[arg(long, short = 'n', value_name = "N")]
        iters: Option<u64>,
        /// Calibrate each benchmark until one run takes at least this long
        #[arg(long, value_name = "MS", default_value_t = 1000)]
        bench_time: u64,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// Write the report here instead of stdout
        #[arg(long, short = 'o', value_name = "FILE", value_parser = parse_sanitized_path)]
        output: Option<PathBuf>,
    },
}

/// Report paths may be relative or absolute; `..` components are refused.
fn sanitize_path(raw: &str) -> anyhow::Result<PathBuf> {
    let p = Path::new(raw);

    for comp in p.components() {
        if matches!(comp, Component::ParentDir) {
            return Err(anyhow::anyhow!(
                "Parent directory components ('..') are not allowed in file paths."
            ));
        }
    }

    Ok(p.to_path_buf())
}

fn parse_sanitized_path(raw: &str) -> Result<PathBuf, String> {
    sanitize_path(raw).map_err(|e| e.to_string())
}

fn env_toggle_enabled(raw: &str) -> bool {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return false;
    }
    !(trimmed.eq_ignore_ascii_case("0") || trimmed.eq_ignore_ascii_case("false") || trimmed.eq_ignore_ascii_case("off"))
}

fn filter_expr_from(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("1")
        || trimmed.eq_ignore_ascii_case("true")
        || trimmed.eq_ignore_ascii_case("on")
    {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn maybe_init_tracing() {
    let raw = match std::env::var("RTBENCH_TRACE") {
        Ok(value) => value,
        Err(_) => return,
    };

    if !env_toggle_enabled(&raw) {
        return;
    }

    TRACE_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        use tracing_subscriber::fmt;

        let filter_expr = filter_expr_from(&raw).or_else(|| std::env::var("RUST_LOG").ok());

        let builder = fmt().with_writer(std::io::stderr);

        let builder = match filter_expr.and_then(|expr| EnvFilter::try_new(expr).ok()) {
            Some(filter) => builder.with_env_filter(filter),
            None => builder.with_env_filter(DEFAULT_TRACE_FILTER),
        };

        let _ = builder.try_init();
    });
}

/// How each selected case gets its iteration count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum IterPlan {
    Fixed(u64),
    Calibrate(Duration),
}

impl IterPlan {
    pub(crate) fn from_args(iters: Option<u64>, bench_time_ms: u64) -> Self {
        match iters {
            Some(n) => IterPlan::Fixed(n),
            None => IterPlan::Calibrate(Duration::from_millis(bench_time_ms)),
        }
    }

    fn run(self, case: &BenchCase) -> anyhow::Result<Measurement> {
        match self {
            IterPlan::Fixed(n) => driver::measure(case, n),
            IterPlan::Calibrate(target) => driver::calibrate(case, target),
        }
    }
}

/// Run the cases in order. A failing case is reported and skipped; the rest
/// still run.
pub(crate) fn run_cases(cases: &[&BenchCase], plan: IterPlan) -> (Vec<Measurement>, usize) {
    let mut measurements = Vec::with_capacity(cases.len());
    let mut failures = 0;
    for case in cases {
        match plan.run(case) {
            Ok(m) => {
                info!(name = %m.name, iters = m.iters, ns_per_iter = m.ns_per_iter(), "benchmark finished");
                measurements.push(m);
            }
            Err(err) => {
                eprintln!("FAIL {}: {:#}", case.name(), err);
                failures += 1;
            }
        }
    }
    (measurements, failures)
}

fn write_report(output: Option<&Path>, report: &str) -> anyhow::Result<()> {
    match output {
        Some(path) => std::fs::write(path, report).with_context(|| format!("write report to {}", path.display())),
        None => {
            print!("{}", report);
            Ok(())
        }
    }
}

fn main() -> anyhow::Result<()> {
    maybe_init_tracing();
    let args = CliArgs::parse();

    match args.command {
        Commands::List { pattern } => {
            for case in scenarios::select(pattern.as_deref())? {
                println!("{}", case.name());
            }
            Ok(())
        }
        Commands::Run {
            pattern,
            iters,
            bench_time,
            format,
            output,
        } => {
            let cases = scenarios::select(pattern.as_deref())?;
            if cases.is_empty() {
                anyhow::bail!("no benchmarks match '{}'", pattern.unwrap_or_default());
            }
            let plan = IterPlan::from_args(iters, bench_time);
            let (measurements, failures) = run_cases(&cases, plan);

            let rendered = match format {
                OutputFormat::Text => report::render_text(&measurements),
                OutputFormat::Json => report::render_json(&measurements)?,
            };
            write_report(output.as_deref(), &rendered)?;

            if failures > 0 {
                anyhow::bail!("{} of {} benchmark(s) failed", failures, cases.len());
            }
            Ok(())
        }
    }
}
