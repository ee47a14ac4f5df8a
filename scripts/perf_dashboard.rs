//! Collects Criterion timings for every registered benchmark, adds allocation
//! figures measured in-process, and keeps a rolling history of snapshots.

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use clap::Parser;
use rtbench_core::{
    alloc::CountingAllocator,
    driver::{BenchCase, measure},
    perf::scenarios,
};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

#[cfg(test)]
mod perf_dashboard_test;

#[global_allocator]
static GLOBAL_ALLOCATOR: CountingAllocator = CountingAllocator::new();

#[derive(Debug, Parser)]
#[command(name = "perf_dashboard", about = "Snapshot rtbench Criterion results with allocation figures")]
struct Options {
    /// Bench targets to run before collecting (comma separated)
    #[arg(
        long,
        value_delimiter = ',',
        default_values = ["addressing_bench", "calls_bench", "arith_bench", "format_bench"]
    )]
    benches: Vec<String>,
    /// Reuse existing Criterion output instead of running cargo bench
    #[arg(long)]
    skip_bench: bool,
    /// Only report benchmarks whose name matches this regex
    #[arg(long)]
    pattern: Option<String>,
    #[arg(long, default_value = "target/criterion")]
    criterion_dir: PathBuf,
    #[arg(long, default_value = "docs/perf/report")]
    output_dir: PathBuf,
    /// Max history snapshots to keep (at least 1)
    #[arg(long, default_value_t = 30, value_parser = parse_history_limit)]
    history_limit: usize,
    /// Iterations used for allocation accounting
    #[arg(long, default_value_t = 10_000)]
    alloc_iters: u64,
    /// Override the snapshot timestamp (RFC3339)
    #[arg(long, value_parser = parse_timestamp)]
    timestamp: Option<DateTime<Utc>>,
    /// Free-form notes attached to the snapshot
    #[arg(long)]
    notes: Option<String>,
}

fn parse_history_limit(raw: &str) -> Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(0) => Err("history limit must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(format!("invalid history limit: {}", e)),
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| format!("invalid RFC3339 timestamp: {}", e))
}

#[derive(Debug, Serialize, Deserialize)]
struct CaseMetrics {
    name: String,
    group: String,
    mean_ns: f64,
    median_ns: f64,
    std_dev_ns: f64,
    p95_ns: f64,
    #[serde(default)]
    allocs_per_iter: Option<u64>,
    #[serde(default)]
    bytes_per_iter: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    generated_at: String,
    git_rev: Option<String>,
    notes: Option<String>,
    os: String,
    arch: String,
    metrics: Vec<CaseMetrics>,
}

#[derive(Debug, Serialize)]
struct History<'a> {
    generated_at: &'a str,
    history_limit: usize,
    runs: Vec<Snapshot>,
}

#[derive(Deserialize)]
struct Estimates {
    mean: Estimate,
    median: Estimate,
    std_dev: Estimate,
}

#[derive(Deserialize)]
struct Estimate {
    point_estimate: f64,
}

fn main() -> Result<()> {
    let opts = Options::parse();
    if !opts.skip_bench {
        for bench in opts.benches.iter().filter(|b| !b.trim().is_empty()) {
            run_cargo_bench(bench.trim())?;
        }
    }

    let history_dir = opts.output_dir.join("history");
    fs::create_dir_all(&history_dir).with_context(|| format!("create {}", history_dir.display()))?;

    let mut metrics = Vec::new();
    for case in scenarios::select(opts.pattern.as_deref())? {
        let case_dir = opts.criterion_dir.join(case.group.as_str()).join(case.variant);
        if !case_dir.is_dir() {
            eprintln!("skipping {}: nothing at {}", case.name(), case_dir.display());
            continue;
        }
        metrics.push(collect_case(case, &case_dir, opts.alloc_iters)?);
    }
    if metrics.is_empty() {
        bail!("no Criterion results under {}", opts.criterion_dir.display());
    }

    let timestamp = opts.timestamp.unwrap_or_else(Utc::now);
    let generated_at = timestamp.to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
    let snapshot = Snapshot {
        generated_at: generated_at.clone(),
        git_rev: std::env::var("GITHUB_SHA").ok().map(|sha| sha.chars().take(8).collect()),
        notes: opts.notes,
        os: std::env::consts::OS.to_string(),
        arch: std::env::consts::ARCH.to_string(),
        metrics,
    };

    let stamp = timestamp.format("%Y%m%dT%H%M%SZ");
    write_json(&opts.output_dir.join("latest.json"), &snapshot)?;
    write_csv(&opts.output_dir.join("latest.csv"), &snapshot.metrics)?;
    write_json(&history_dir.join(format!("{}.json", stamp)), &snapshot)?;
    write_csv(&history_dir.join(format!("{}.csv", stamp)), &snapshot.metrics)?;

    let runs = rotate_history(&history_dir, opts.history_limit)?;
    let history_path = opts.output_dir.join("history.json");
    write_json(
        &history_path,
        &History {
            generated_at: &generated_at,
            history_limit: opts.history_limit,
            runs,
        },
    )?;

    println!(
        "Benchmark report updated -> {}, {}",
        opts.output_dir.join("latest.json").display(),
        history_path.display()
    );
    Ok(())
}

fn run_cargo_bench(bench: &str) -> Result<()> {
    let status = Command::new("cargo")
        .args(["bench", "-p", "rtbench-core", "--bench", bench, "--", "--noplot"])
        .status()
        .context("failed to spawn cargo bench")?;
    if !status.success() {
        bail!("cargo bench --bench {} exited with {}", bench, status);
    }
    Ok(())
}

fn collect_case(case: &BenchCase, case_dir: &Path, alloc_iters: u64) -> Result<CaseMetrics> {
    let estimates_path = case_dir.join("new").join("estimates.json");
    let raw = fs::read_to_string(&estimates_path).with_context(|| format!("read {}", estimates_path.display()))?;
    let estimates: Estimates =
        serde_json::from_str(&raw).with_context(|| format!("parse {}", estimates_path.display()))?;

    let samples_path = case_dir.join("new").join("raw.csv");
    let raw = fs::read_to_string(&samples_path).with_context(|| format!("read {}", samples_path.display()))?;
    let mut samples = raw
        .lines()
        .filter(|line| !line.is_empty() && !line.starts_with("group"))
        .map(per_iteration_ns)
        .collect::<Result<Vec<f64>>>()
        .with_context(|| format!("parse {}", samples_path.display()))?;
    samples.sort_by(f64::total_cmp);

    let (allocs_per_iter, bytes_per_iter) = if case.report_allocs {
        // Warm-up so lazily initialized state is not charged to the case.
        measure(case, 1)?;
        let m = measure(case, alloc_iters.max(1))?;
        (m.allocs_per_iter(), m.bytes_per_iter())
    } else {
        (None, None)
    };

    Ok(CaseMetrics {
        name: case.name(),
        group: case.group.to_string(),
        mean_ns: estimates.mean.point_estimate,
        median_ns: estimates.median.point_estimate,
        std_dev_ns: estimates.std_dev.point_estimate,
        p95_ns: percentile(&samples, 0.95),
        allocs_per_iter,
        bytes_per_iter,
    })
}

/// `raw.csv` rows carry the sample total in column 5 and its iteration count
/// in column 7.
fn per_iteration_ns(line: &str) -> Result<f64> {
    let cols: Vec<&str> = line.trim_end().split(',').collect();
    let (Some(total), Some(iters)) = (cols.get(5), cols.get(7)) else {
        bail!("raw.csv row had {} columns, expected at least 8", cols.len());
    };
    let total: f64 = total.parse().context("non-numeric sample_measured_value")?;
    let iters: f64 = iters.parse().context("non-numeric iteration_count")?;
    Ok(if iters > 0.0 { total / iters } else { total })
}

/// Linear interpolation between the closest ranks of a sorted slice.
fn percentile(sorted: &[f64], q: f64) -> f64 {
    match sorted {
        [] => 0.0,
        [only] => *only,
        _ => {
            let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
            let (lo, hi) = (pos.floor() as usize, pos.ceil() as usize);
            let w = pos - lo as f64;
            sorted[lo] + (sorted[hi] - sorted[lo]) * w
        }
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut out = BufWriter::new(File::create(path).with_context(|| format!("create {}", path.display()))?);
    serde_json::to_writer_pretty(&mut out, value).with_context(|| format!("write {}", path.display()))?;
    out.flush().with_context(|| format!("flush {}", path.display()))
}

fn write_csv(path: &Path, metrics: &[CaseMetrics]) -> Result<()> {
    let cell = |v: Option<u64>| v.map(|v| v.to_string()).unwrap_or_default();
    let mut out = BufWriter::new(File::create(path).with_context(|| format!("create {}", path.display()))?);
    writeln!(out, "name,group,mean_ns,median_ns,std_dev_ns,p95_ns,allocs_per_iter,bytes_per_iter")?;
    for m in metrics {
        writeln!(
            out,
            "{},{},{:.6},{:.6},{:.6},{:.6},{},{}",
            m.name,
            m.group,
            m.mean_ns,
            m.median_ns,
            m.std_dev_ns,
            m.p95_ns,
            cell(m.allocs_per_iter),
            cell(m.bytes_per_iter)
        )?;
    }
    out.flush()?;
    Ok(())
}

/// Drop the oldest snapshots beyond `limit` and return the rest, newest first.
/// The newest snapshot is always kept.
fn rotate_history(history_dir: &Path, limit: usize) -> Result<Vec<Snapshot>> {
    let mut snapshots: Vec<PathBuf> = fs::read_dir(history_dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    // Timestamped names sort chronologically.
    snapshots.sort();
    snapshots.reverse();

    for stale in snapshots.split_off(limit.max(1).min(snapshots.len())) {
        fs::remove_file(&stale).with_context(|| format!("remove {}", stale.display()))?;
        fs::remove_file(stale.with_extension("csv")).ok();
    }

    snapshots
        .iter()
        .map(|path| -> Result<Snapshot> {
            let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
            let mut snapshot: Snapshot =
                serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))?;
            snapshot.metrics.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(snapshot)
        })
        .collect()
}
