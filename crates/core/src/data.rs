//! Data structures for benchmark runs and comparisons
//!
//! `Run` → `Suite` → `Benchmark` form a strict containment tree. The JSON
//! field names reproduce the wire format used by the stored run files
//! (`nsPerOp`, `bytesPerOp`, ...), with optional fields omitted when
//! zero/empty.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn f64_is_zero(v: &f64) -> bool {
    *v == 0.0
}

fn i64_is_zero(v: &i64) -> bool {
    *v == 0
}

/// One benchmarking session: a tagged, timestamped collection of suites.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Run {
    /// Free-form version label (e.g. a git tag)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,
    /// Unix timestamp of the run, seconds
    #[serde(default, skip_serializing_if = "i64_is_zero")]
    pub date: i64,
    /// Labels attached to the run; order preserved for display
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    pub suites: Vec<Suite>,
}

impl Run {
    /// Wrap parsed suites with run metadata.
    pub fn new(suites: Vec<Suite>, version: String, date: i64, tags: Vec<String>) -> Self {
        Self {
            version,
            date,
            tags,
            suites,
        }
    }
}

/// Benchmarks run for one package under one OS/architecture combination.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Suite {
    /// Toolchain version, when known
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub go: String,
    pub goos: String,
    pub goarch: String,
    pub pkg: String,
    pub benchmarks: Vec<Benchmark>,
}

/// One named benchmark result.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Benchmark {
    pub name: String,
    /// Iteration count
    pub runs: i64,
    /// Nanoseconds per operation; zero means "not measured"
    #[serde(rename = "nsPerOp", default, skip_serializing_if = "f64_is_zero")]
    pub ns_per_op: f64,
    /// Memory statistics, present only when a memory metric was reported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mem: Option<Mem>,
    /// Non-standard metrics keyed by unit string
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom: BTreeMap<String, f64>,
}

/// Per-operation memory statistics.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Mem {
    #[serde(rename = "bytesPerOp", default, skip_serializing_if = "f64_is_zero")]
    pub bytes_per_op: f64,
    #[serde(rename = "allocsPerOp", default, skip_serializing_if = "f64_is_zero")]
    pub allocs_per_op: f64,
    #[serde(rename = "mbPerSec", default, skip_serializing_if = "f64_is_zero")]
    pub mb_per_sec: f64,
}

/// Delta between a "before" and "after" benchmark matched by name.
///
/// Holds copies of the numeric values, never references into the source
/// runs. Percentages stay zero when the "before" value is zero (no signal,
/// not an error).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComparisonResult {
    /// Suite-package-qualified benchmark name (`pkg/name`)
    pub name: String,
    pub old_runs: i64,
    pub new_runs: i64,
    pub old_ns_per_op: f64,
    pub new_ns_per_op: f64,
    pub ns_per_op_diff: f64,
    pub ns_per_op_pct: f64,
    pub old_bytes: f64,
    pub new_bytes: f64,
    pub bytes_diff: f64,
    pub bytes_pct: f64,
    pub old_allocs: f64,
    pub new_allocs: f64,
    pub allocs_diff: f64,
    pub allocs_pct: f64,
}

impl ComparisonResult {
    /// A regression is any of time/bytes/allocs strictly above the
    /// percentage threshold.
    pub fn is_regression(&self, threshold: f64) -> bool {
        self.ns_per_op_pct > threshold
            || self.bytes_pct > threshold
            || self.allocs_pct > threshold
    }

    /// An improvement is time or bytes strictly below the negated
    /// threshold. Allocs are deliberately not part of this check even
    /// though they count towards regressions; kept to match the existing
    /// report semantics (open question for product owners).
    pub fn is_improvement(&self, threshold: f64) -> bool {
        self.ns_per_op_pct < -threshold || self.bytes_pct < -threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_regression_classification() {
        let result = ComparisonResult {
            name: "pkg/Foo".to_string(),
            old_ns_per_op: 100.0,
            new_ns_per_op: 150.0,
            ns_per_op_diff: 50.0,
            ns_per_op_pct: 50.0,
            ..Default::default()
        };

        assert!(result.is_regression(10.0));
        assert!(!result.is_regression(50.0)); // strictly above, not equal
        assert!(!result.is_improvement(10.0));
    }

    #[test]
    fn test_allocs_count_for_regression_but_not_improvement() {
        let worse = ComparisonResult {
            allocs_pct: 20.0,
            ..Default::default()
        };
        assert!(worse.is_regression(5.0));

        let better = ComparisonResult {
            allocs_pct: -20.0,
            ..Default::default()
        };
        assert!(!better.is_improvement(5.0));
    }

    #[test]
    fn test_bytes_improvement() {
        let result = ComparisonResult {
            bytes_pct: -12.5,
            ..Default::default()
        };
        assert!(result.is_improvement(5.0));
        assert!(!result.is_improvement(12.5)); // strictly below -threshold
    }

    #[test]
    fn test_run_json_omits_empty_optional_fields() {
        let run = Run::new(
            vec![Suite {
                goos: "linux".to_string(),
                goarch: "amd64".to_string(),
                pkg: "example.com/foo".to_string(),
                benchmarks: vec![Benchmark {
                    name: "Baseline".to_string(),
                    runs: 1000,
                    ..Default::default()
                }],
                ..Default::default()
            }],
            String::new(),
            0,
            Vec::new(),
        );

        let json = serde_json::to_string(&run).unwrap();
        assert!(!json.contains("version"));
        assert!(!json.contains("date"));
        assert!(!json.contains("tags"));
        assert!(!json.contains("nsPerOp"));
        assert!(!json.contains("mem"));
        assert!(!json.contains("custom"));
    }

    #[test]
    fn test_benchmark_json_field_names() {
        let bench = Benchmark {
            name: "Foo".to_string(),
            runs: 42,
            ns_per_op: 523.4,
            mem: Some(Mem {
                bytes_per_op: 128.0,
                allocs_per_op: 3.0,
                mb_per_sec: 0.0,
            }),
            custom: BTreeMap::new(),
        };

        let json = serde_json::to_value(&bench).unwrap();
        assert_eq!(json["nsPerOp"], 523.4);
        assert_eq!(json["mem"]["bytesPerOp"], 128.0);
        assert_eq!(json["mem"]["allocsPerOp"], 3.0);
        assert!(json["mem"].get("mbPerSec").is_none());
    }

    #[test]
    fn test_decode_applies_defaults() {
        let json = r#"{"name":"Foo","runs":10}"#;
        let bench: Benchmark = serde_json::from_str(json).unwrap();
        assert_eq!(bench.ns_per_op, 0.0);
        assert_eq!(bench.mem, None);
        assert!(bench.custom.is_empty());
    }
}
