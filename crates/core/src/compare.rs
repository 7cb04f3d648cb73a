//! Run comparison engine
//!
//! Suites are matched positionally (index i vs index i) with a package
//! equality check; benchmarks within a matched suite pair are matched by
//! name. Matching suites by content instead of position would change
//! behavior on reordered suite lists, so positional matching is kept.

use crate::data::{Benchmark, ComparisonResult, Run, Suite};
use crate::error::{Error, Result};
use crate::storage::read_runs;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt::Write;
use std::path::Path;

/// Compute per-benchmark deltas between two runs.
///
/// Results preserve suite order, then the `before`-side benchmark order
/// within each suite. A benchmark missing from `after` is silently
/// skipped; a benchmark new in `after` is never reported.
pub fn compare_two_runs(before: &Run, after: &Run) -> Result<Vec<ComparisonResult>> {
    if before.suites.len() != after.suites.len() {
        return Err(Error::SuiteCountMismatch {
            before: before.suites.len(),
            after: after.suites.len(),
        });
    }

    let total: usize = before.suites.iter().map(|s| s.benchmarks.len()).sum();
    let mut results = Vec::with_capacity(total);

    for (i, (before_suite, after_suite)) in
        before.suites.iter().zip(after.suites.iter()).enumerate()
    {
        if before_suite.pkg != after_suite.pkg {
            return Err(Error::SuitePackageMismatch {
                index: i,
                before: before_suite.pkg.clone(),
                after: after_suite.pkg.clone(),
            });
        }

        results.extend(compare_suites(before_suite, after_suite));
    }

    Ok(results)
}

/// Read two stored run files and compare the first run of each.
pub fn compare_two_files(before_path: &Path, after_path: &Path) -> Result<Vec<ComparisonResult>> {
    let before_runs = read_runs(before_path)?;
    let after_runs = read_runs(after_path)?;

    let before = before_runs.first().ok_or_else(|| Error::EmptyInput {
        path: before_path.display().to_string(),
    })?;
    let after = after_runs.first().ok_or_else(|| Error::EmptyInput {
        path: after_path.display().to_string(),
    })?;

    compare_two_runs(before, after)
}

fn compare_suites(before: &Suite, after: &Suite) -> Vec<ComparisonResult> {
    // Lookup by name on the after side; first occurrence wins.
    let mut after_map: HashMap<&str, &Benchmark> = HashMap::with_capacity(after.benchmarks.len());
    for bench in &after.benchmarks {
        after_map.entry(bench.name.as_str()).or_insert(bench);
    }

    let mut results = Vec::with_capacity(before.benchmarks.len());

    for before_bench in &before.benchmarks {
        let Some(after_bench) = after_map.get(before_bench.name.as_str()) else {
            continue;
        };

        let mut result = ComparisonResult {
            name: format!("{}/{}", before.pkg, before_bench.name),
            old_runs: before_bench.runs,
            new_runs: after_bench.runs,
            old_ns_per_op: before_bench.ns_per_op,
            new_ns_per_op: after_bench.ns_per_op,
            ..Default::default()
        };

        // A zero "before" value means no signal, not a division by zero.
        if before_bench.ns_per_op > 0.0 {
            result.ns_per_op_diff = after_bench.ns_per_op - before_bench.ns_per_op;
            result.ns_per_op_pct = (result.ns_per_op_diff / before_bench.ns_per_op) * 100.0;
        }

        if let (Some(before_mem), Some(after_mem)) = (&before_bench.mem, &after_bench.mem) {
            result.old_bytes = before_mem.bytes_per_op;
            result.new_bytes = after_mem.bytes_per_op;

            if before_mem.bytes_per_op > 0.0 {
                result.bytes_diff = after_mem.bytes_per_op - before_mem.bytes_per_op;
                result.bytes_pct = (result.bytes_diff / before_mem.bytes_per_op) * 100.0;
            }

            result.old_allocs = before_mem.allocs_per_op;
            result.new_allocs = after_mem.allocs_per_op;

            if before_mem.allocs_per_op > 0.0 {
                result.allocs_diff = after_mem.allocs_per_op - before_mem.allocs_per_op;
                result.allocs_pct = (result.allocs_diff / before_mem.allocs_per_op) * 100.0;
            }
        }

        results.push(result);
    }

    results
}

/// Render results as a fixed-width table with a trailing summary line
/// counting regressions and improvements at the given threshold.
pub fn format_comparison_results(results: &[ComparisonResult], threshold: f64) -> String {
    let mut out = String::new();

    out.push_str("Benchmark Comparison Results:\n");
    out.push_str(&"=".repeat(120));
    out.push_str("\n\n");

    if results.is_empty() {
        out.push_str("No benchmarks to compare.\n");
        return out;
    }

    let _ = writeln!(
        out,
        "{:<50} {:>12} {:>12} {:>10} | {:>10} {:>10} {:>10}",
        "Benchmark", "Time Old", "Time New", "Time Δ%", "Mem Old", "Mem New", "Mem Δ%"
    );
    out.push_str(&"-".repeat(120));
    out.push('\n');

    let mut regressions = 0;
    let mut improvements = 0;

    for result in results {
        let _ = write!(
            out,
            "{:<50} {:>12.0} {:>12.0} {:>10} | ",
            truncate(&result.name, 50),
            result.old_ns_per_op,
            result.new_ns_per_op,
            format_delta(result.ns_per_op_pct)
        );

        if result.old_bytes > 0.0 || result.new_bytes > 0.0 {
            let _ = writeln!(
                out,
                "{:>10.0} {:>10.0} {:>10}",
                result.old_bytes,
                result.new_bytes,
                format_delta(result.bytes_pct)
            );
        } else {
            let _ = writeln!(out, "{:>10} {:>10} {:>10}", "-", "-", "-");
        }

        if result.is_regression(threshold) {
            regressions += 1;
        } else if result.is_improvement(threshold) {
            improvements += 1;
        }
    }

    out.push_str(&"-".repeat(120));
    out.push('\n');
    let _ = write!(out, "\nSummary: {} benchmarks compared", results.len());

    if regressions > 0 {
        let _ = write!(
            out,
            ", {} REGRESSIONS detected (threshold: {:.1}%)",
            regressions, threshold
        );
    }
    if improvements > 0 {
        let _ = write!(out, ", {} improvements", improvements);
    }
    out.push('\n');

    out
}

fn format_delta(pct: f64) -> String {
    if pct.abs() < 0.01 {
        return "~0%".to_string();
    }
    let sign = if pct < 0.0 { "" } else { "+" };
    format!("{}{:.1}%", sign, pct)
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{head}...")
    }
}

fn f64_is_zero(v: &f64) -> bool {
    *v == 0.0
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ComparisonJson<'a> {
    name: &'a str,
    old_ns_per_op: f64,
    new_ns_per_op: f64,
    ns_per_op_change: f64,
    old_bytes_per_op: f64,
    new_bytes_per_op: f64,
    bytes_per_op_change: f64,
    #[serde(skip_serializing_if = "f64_is_zero")]
    old_allocs_per_op: f64,
    #[serde(skip_serializing_if = "f64_is_zero")]
    new_allocs_per_op: f64,
    #[serde(skip_serializing_if = "f64_is_zero")]
    allocs_per_op_change: f64,
}

impl<'a> From<&'a ComparisonResult> for ComparisonJson<'a> {
    fn from(r: &'a ComparisonResult) -> Self {
        Self {
            name: &r.name,
            old_ns_per_op: r.old_ns_per_op,
            new_ns_per_op: r.new_ns_per_op,
            ns_per_op_change: r.ns_per_op_pct,
            old_bytes_per_op: r.old_bytes,
            new_bytes_per_op: r.new_bytes,
            bytes_per_op_change: r.bytes_pct,
            old_allocs_per_op: r.old_allocs,
            new_allocs_per_op: r.new_allocs,
            allocs_per_op_change: r.allocs_pct,
        }
    }
}

/// Render results as a JSON array with camelCase keys; allocs fields are
/// omitted when zero.
pub fn comparison_json(results: &[ComparisonResult]) -> String {
    let rows: Vec<ComparisonJson> = results.iter().map(ComparisonJson::from).collect();
    serde_json::to_string_pretty(&rows).unwrap_or_else(|_| String::from("[]"))
}
