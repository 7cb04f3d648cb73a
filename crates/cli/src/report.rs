//! HTML report generation with minijinja
//!
//! Two report flavors: a run listing (suites and their benchmarks) and a
//! before/after comparison with rows colored by regression/improvement
//! classification at the given threshold.

use anyhow::{Context, Result};
use benchtrack_core::{ComparisonResult, Run};
use chrono::{DateTime, Utc};
use minijinja::{context, Environment};
use serde::Serialize;
use std::path::Path;

const REPORT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{{ title }}</title>
    <style>
        :root {
            --bg: #0d1117;
            --bg-alt: #161b22;
            --text: #c9d1d9;
            --muted: #8b949e;
            --border: #30363d;
            --green: #3fb950;
            --red: #f85149;
        }
        * { margin: 0; padding: 0; box-sizing: border-box; }
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif;
            background: var(--bg);
            color: var(--text);
            line-height: 1.6;
        }
        .container { max-width: 1200px; margin: 0 auto; padding: 2rem; }
        h1 { font-size: 1.8rem; margin-bottom: 0.25rem; }
        h2 { font-size: 1.2rem; margin: 1.5rem 0 0.5rem; }
        .meta { color: var(--muted); font-size: 0.9rem; margin-bottom: 1.5rem; }
        .tag {
            display: inline-block;
            padding: 0 0.5rem;
            border: 1px solid var(--border);
            border-radius: 10px;
            font-size: 0.8rem;
            color: var(--muted);
        }
        table {
            width: 100%;
            border-collapse: collapse;
            background: var(--bg-alt);
            border: 1px solid var(--border);
            font-variant-numeric: tabular-nums;
        }
        th, td { padding: 0.4rem 0.75rem; border-bottom: 1px solid var(--border); }
        th { text-align: left; color: var(--muted); font-weight: 600; }
        td.num, th.num { text-align: right; }
        tr.regression td.delta { color: var(--red); font-weight: 600; }
        tr.improvement td.delta { color: var(--green); font-weight: 600; }
        .summary { margin-top: 1rem; color: var(--muted); }
    </style>
</head>
<body>
    <div class="container">
        <h1>{{ title }}</h1>
        <div class="meta">Generated {{ generated }}</div>

        {% if comparison %}
        <table>
            <thead>
                <tr>
                    <th>Benchmark</th>
                    <th class="num">Time Old (ns/op)</th>
                    <th class="num">Time New (ns/op)</th>
                    <th class="num">Time Δ%</th>
                    <th class="num">Mem Old (B/op)</th>
                    <th class="num">Mem New (B/op)</th>
                    <th class="num">Mem Δ%</th>
                </tr>
            </thead>
            <tbody>
                {% for row in rows %}
                <tr class="{{ row.class }}">
                    <td>{{ row.name }}</td>
                    <td class="num">{{ row.old_ns }}</td>
                    <td class="num">{{ row.new_ns }}</td>
                    <td class="num delta">{{ row.time_delta }}</td>
                    <td class="num">{{ row.old_bytes }}</td>
                    <td class="num">{{ row.new_bytes }}</td>
                    <td class="num delta">{{ row.bytes_delta }}</td>
                </tr>
                {% endfor %}
            </tbody>
        </table>
        <div class="summary">
            {{ rows | length }} benchmarks compared,
            {{ regressions }} regressions, {{ improvements }} improvements
            (threshold {{ threshold }}%)
        </div>
        {% else %}
        {% for run in runs %}
        <h2>
            {% if run.version %}{{ run.version }}{% else %}(unversioned){% endif %}
            &mdash; {{ run.date }}
            {% for tag in run.tags %}<span class="tag">{{ tag }}</span>{% endfor %}
        </h2>
        {% for suite in run.suites %}
        <div class="meta">{{ suite.pkg }} ({{ suite.goos }}/{{ suite.goarch }}{% if suite.go %}, {{ suite.go }}{% endif %})</div>
        <table>
            <thead>
                <tr>
                    <th>Benchmark</th>
                    <th class="num">Iterations</th>
                    <th class="num">ns/op</th>
                    <th class="num">B/op</th>
                    <th class="num">allocs/op</th>
                </tr>
            </thead>
            <tbody>
                {% for bench in suite.benchmarks %}
                <tr>
                    <td>{{ bench.name }}</td>
                    <td class="num">{{ bench.runs }}</td>
                    <td class="num">{{ bench.ns_per_op }}</td>
                    <td class="num">{{ bench.bytes_per_op }}</td>
                    <td class="num">{{ bench.allocs_per_op }}</td>
                </tr>
                {% endfor %}
            </tbody>
        </table>
        {% endfor %}
        {% endfor %}
        {% endif %}
    </div>
</body>
</html>
"#;

#[derive(Serialize)]
struct RunCtx {
    version: String,
    date: String,
    tags: Vec<String>,
    suites: Vec<SuiteCtx>,
}

#[derive(Serialize)]
struct SuiteCtx {
    go: String,
    goos: String,
    goarch: String,
    pkg: String,
    benchmarks: Vec<BenchCtx>,
}

#[derive(Serialize)]
struct BenchCtx {
    name: String,
    runs: i64,
    ns_per_op: String,
    bytes_per_op: String,
    allocs_per_op: String,
}

#[derive(Serialize)]
struct RowCtx {
    name: String,
    old_ns: String,
    new_ns: String,
    time_delta: String,
    old_bytes: String,
    new_bytes: String,
    bytes_delta: String,
    class: &'static str,
}

fn format_date(ts: i64) -> String {
    DateTime::<Utc>::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn format_delta(pct: f64) -> String {
    if pct.abs() < 0.01 {
        return "~0%".to_string();
    }
    let sign = if pct < 0.0 { "" } else { "+" };
    format!("{}{:.1}%", sign, pct)
}

/// Render an HTML listing of the given runs.
pub fn render_runs(runs: &[Run]) -> Result<String> {
    let title = match runs.first() {
        Some(run) if !run.version.is_empty() => format!("Benchmarks - {}", run.version),
        _ => "Benchmark Results".to_string(),
    };

    let run_ctxs: Vec<RunCtx> = runs
        .iter()
        .map(|run| RunCtx {
            version: run.version.clone(),
            date: format_date(run.date),
            tags: run.tags.clone(),
            suites: run
                .suites
                .iter()
                .map(|suite| SuiteCtx {
                    go: suite.go.clone(),
                    goos: suite.goos.clone(),
                    goarch: suite.goarch.clone(),
                    pkg: suite.pkg.clone(),
                    benchmarks: suite
                        .benchmarks
                        .iter()
                        .map(|bench| BenchCtx {
                            name: bench.name.clone(),
                            runs: bench.runs,
                            ns_per_op: format!("{:.2}", bench.ns_per_op),
                            bytes_per_op: bench
                                .mem
                                .as_ref()
                                .map(|m| format!("{:.0}", m.bytes_per_op))
                                .unwrap_or_else(|| "-".to_string()),
                            allocs_per_op: bench
                                .mem
                                .as_ref()
                                .map(|m| format!("{:.0}", m.allocs_per_op))
                                .unwrap_or_else(|| "-".to_string()),
                        })
                        .collect(),
                })
                .collect(),
        })
        .collect();

    render(context! {
        title => title,
        generated => Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        comparison => false,
        runs => run_ctxs,
    })
}

/// Render an HTML comparison report at the given regression threshold.
pub fn render_comparison(results: &[ComparisonResult], threshold: f64) -> Result<String> {
    let mut regressions = 0;
    let mut improvements = 0;

    let rows: Vec<RowCtx> = results
        .iter()
        .map(|r| {
            let class = if r.is_regression(threshold) {
                regressions += 1;
                "regression"
            } else if r.is_improvement(threshold) {
                improvements += 1;
                "improvement"
            } else {
                ""
            };

            RowCtx {
                name: r.name.clone(),
                old_ns: format!("{:.0}", r.old_ns_per_op),
                new_ns: format!("{:.0}", r.new_ns_per_op),
                time_delta: format_delta(r.ns_per_op_pct),
                old_bytes: format!("{:.0}", r.old_bytes),
                new_bytes: format!("{:.0}", r.new_bytes),
                bytes_delta: format_delta(r.bytes_pct),
                class,
            }
        })
        .collect();

    render(context! {
        title => "Benchmark Comparison",
        generated => Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        comparison => true,
        rows => rows,
        regressions => regressions,
        improvements => improvements,
        threshold => format!("{:.1}", threshold),
    })
}

fn render(ctx: minijinja::Value) -> Result<String> {
    let mut env = Environment::new();
    env.add_template("report", REPORT_TEMPLATE)
        .context("invalid report template")?;
    let tmpl = env.get_template("report")?;
    Ok(tmpl.render(ctx)?)
}

/// Write rendered HTML to a file, creating parent directories.
pub fn write_report(path: &Path, html: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
    }
    std::fs::write(path, html)
        .with_context(|| format!("failed to write report to {}", path.display()))
}
