//! benchtrack-core - Parsing and comparison engine for Go benchmark logs
//!
//! # Features
//!
//! - Parse `go test -bench` output into structured suites
//! - Compare two runs with regression/improvement classification
//! - Merge, sort, deduplicate and tag-filter stored runs
//! - Whole-file JSON persistence of run collections
//!
//! Everything here is synchronous and free of shared mutable state; each
//! call owns its inputs and outputs.

pub mod compare;
pub mod data;
pub mod error;
pub mod merge;
pub mod parser;
pub mod storage;

pub use compare::{
    compare_two_files, compare_two_runs, comparison_json, format_comparison_results,
};
pub use data::{Benchmark, ComparisonResult, Mem, Run, Suite};
pub use error::{Error, Result};
pub use merge::{
    deduplicate_runs, filter_by_tag, filter_by_tags, merge_runs, merge_runs_from_files,
    sort_by_date, sort_by_date_descending,
};
pub use parser::Parser;
pub use storage::{decode_runs, encode_runs, read_runs, write_run_to_file, write_runs};
