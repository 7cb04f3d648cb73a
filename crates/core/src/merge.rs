//! Set-like operations over run collections: merge, sort, dedup, filter.

use crate::data::Run;
use crate::error::Result;
use crate::storage::read_runs;
use std::collections::HashSet;
use std::path::Path;

/// Concatenate run lists, preserving relative order. No deduplication.
pub fn merge_runs(lists: Vec<Vec<Run>>) -> Vec<Run> {
    lists.into_iter().flatten().collect()
}

/// Read and concatenate the runs stored in each file, in argument order.
pub fn merge_runs_from_files(paths: &[impl AsRef<Path>]) -> Result<Vec<Run>> {
    let mut all_runs = Vec::new();
    for path in paths {
        all_runs.extend(read_runs(path.as_ref())?);
    }
    Ok(all_runs)
}

/// Sort runs by date ascending. Stable: equal dates keep input order.
pub fn sort_by_date(runs: &mut [Run]) {
    runs.sort_by_key(|run| run.date);
}

/// Sort runs by date descending. Stable: equal dates keep input order.
pub fn sort_by_date_descending(runs: &mut [Run]) {
    runs.sort_by_key(|run| std::cmp::Reverse(run.date));
}

/// Drop runs whose `(version, date)` pair was already seen, keeping the
/// first occurrence. Suite content is not part of the key.
pub fn deduplicate_runs(runs: Vec<Run>) -> Vec<Run> {
    let mut seen: HashSet<(String, i64)> = HashSet::new();
    runs.into_iter()
        .filter(|run| seen.insert((run.version.clone(), run.date)))
        .collect()
}

/// Runs carrying the given tag.
pub fn filter_by_tag(runs: &[Run], tag: &str) -> Vec<Run> {
    runs.iter()
        .filter(|run| run.tags.iter().any(|t| t == tag))
        .cloned()
        .collect()
}

/// Runs carrying every one of the given tags.
pub fn filter_by_tags(runs: &[Run], tags: &[String]) -> Vec<Run> {
    runs.iter()
        .filter(|run| tags.iter().all(|tag| run.tags.contains(tag)))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn run(version: &str, date: i64, tags: &[&str]) -> Run {
        Run {
            version: version.to_string(),
            date,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            suites: Vec::new(),
        }
    }

    #[test]
    fn test_merge_preserves_order() {
        let merged = merge_runs(vec![
            vec![run("a", 1, &[]), run("b", 2, &[])],
            vec![run("c", 3, &[])],
        ]);
        let versions: Vec<&str> = merged.iter().map(|r| r.version.as_str()).collect();
        assert_eq!(versions, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_sort_by_date() {
        let mut runs = vec![run("c", 300, &[]), run("a", 100, &[]), run("b", 200, &[])];
        sort_by_date(&mut runs);
        let dates: Vec<i64> = runs.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![100, 200, 300]);
    }

    #[test]
    fn test_sort_descending() {
        let mut runs = vec![run("a", 100, &[]), run("c", 300, &[]), run("b", 200, &[])];
        sort_by_date_descending(&mut runs);
        let dates: Vec<i64> = runs.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![300, 200, 100]);
    }

    #[test]
    fn test_sort_is_stable_on_equal_dates() {
        let mut runs = vec![run("first", 100, &[]), run("second", 100, &[])];
        sort_by_date(&mut runs);
        assert_eq!(runs[0].version, "first");
        assert_eq!(runs[1].version, "second");

        sort_by_date_descending(&mut runs);
        assert_eq!(runs[0].version, "first");
        assert_eq!(runs[1].version, "second");
    }

    #[test]
    fn test_deduplicate_keeps_first_occurrence() {
        let runs = vec![run("v1", 100, &[]), run("v1", 100, &[]), run("v2", 200, &[])];
        let unique = deduplicate_runs(runs);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].version, "v1");
        assert_eq!(unique[0].date, 100);
        assert_eq!(unique[1].version, "v2");
    }

    #[test]
    fn test_deduplicate_ignores_suite_content() {
        let mut a = run("v1", 100, &[]);
        a.suites.push(Default::default());
        let b = run("v1", 100, &[]);

        let unique = deduplicate_runs(vec![a, b]);
        assert_eq!(unique.len(), 1);
        assert_eq!(unique[0].suites.len(), 1);
    }

    #[test]
    fn test_filter_by_tag_returns_all_matches() {
        let runs = vec![
            run("a", 1, &["ci"]),
            run("b", 2, &["local"]),
            run("c", 3, &["ci", "nightly"]),
        ];
        let filtered = filter_by_tag(&runs, "ci");
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0].version, "a");
        assert_eq!(filtered[1].version, "c");
    }

    #[test]
    fn test_filter_by_tags_requires_all() {
        let runs = vec![
            run("a", 1, &["ci"]),
            run("b", 2, &["ci", "nightly"]),
            run("c", 3, &[]),
        ];
        let tags = vec!["ci".to_string(), "nightly".to_string()];
        let filtered = filter_by_tags(&runs, &tags);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].version, "b");
    }

    #[test]
    fn test_untagged_run_never_matches_nonempty_filter() {
        let runs = vec![run("a", 1, &[])];
        assert!(filter_by_tag(&runs, "ci").is_empty());
        assert!(filter_by_tags(&runs, &["ci".to_string()]).is_empty());
    }

    #[test]
    fn test_empty_tag_filter_matches_everything() {
        let runs = vec![run("a", 1, &[]), run("b", 2, &["ci"])];
        assert_eq!(filter_by_tags(&runs, &[]).len(), 2);
    }

    #[test]
    fn test_merge_runs_from_files_preserves_argument_order() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.json");
        let second = dir.path().join("second.json");

        crate::storage::write_runs(&first, &[run("v1", 100, &[]), run("v2", 200, &[])])
            .unwrap();
        crate::storage::write_runs(&second, &[run("v3", 300, &[])]).unwrap();

        let merged = merge_runs_from_files(&[&second, &first]).unwrap();
        let versions: Vec<&str> = merged.iter().map(|r| r.version.as_str()).collect();
        assert_eq!(versions, vec!["v3", "v1", "v2"]);
    }

    #[test]
    fn test_merge_runs_from_missing_file_fails() {
        let err = merge_runs_from_files(&[Path::new("/nonexistent/runs.json")]).unwrap_err();
        assert!(matches!(err, crate::error::Error::FileRead { .. }));
    }
}
