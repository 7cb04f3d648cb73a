//! Parser for Go benchmark logs
//!
//! Input format (`go test -bench=. -benchmem`):
//! ```text
//! goos: linux
//! goarch: amd64
//! pkg: example.com/foo
//! BenchmarkFoo-8	1000	523.40 ns/op	128 B/op	3 allocs/op
//! PASS
//! ok  	example.com/foo	1.234s
//! ```
//!
//! The parser is a two-state line machine: `Scanning` until a `goos:` marker
//! opens a suite, `InSuite` until a terminator (`PASS`/`FAIL`/`ok`) closes
//! it. Lines that match none of the known markers are ignored, so the parser
//! tolerates arbitrary log noise. Any malformed benchmark line is fatal and
//! aborts the whole parse.

use crate::data::{Benchmark, Mem, Suite};
use crate::error::{Error, Result};
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// Per-line buffer limit; longer lines fail with [`Error::LineTooLong`].
pub const MAX_LINE_LEN: usize = 4096;

const PREFIX_GOOS: &str = "goos:";
const PREFIX_GOARCH: &str = "goarch:";
const PREFIX_PKG: &str = "pkg:";
const PREFIX_BENCHMARK: &str = "Benchmark";
const PREFIX_PASS: &str = "PASS";
const PREFIX_FAIL: &str = "FAIL";
const PREFIX_OK: &str = "ok";

/// Classification of one input line against the fixed marker set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    Goos,
    Goarch,
    Pkg,
    Benchmark,
    Terminator,
    Other,
}

fn classify(line: &str) -> LineKind {
    if line.starts_with(PREFIX_GOOS) {
        LineKind::Goos
    } else if line.starts_with(PREFIX_GOARCH) {
        LineKind::Goarch
    } else if line.starts_with(PREFIX_PKG) {
        LineKind::Pkg
    } else if line.starts_with(PREFIX_BENCHMARK) {
        LineKind::Benchmark
    } else if line.starts_with(PREFIX_PASS)
        || line.starts_with(PREFIX_FAIL)
        || line.starts_with(PREFIX_OK)
    {
        LineKind::Terminator
    } else {
        LineKind::Other
    }
}

/// The value after a `marker: value` header, or `None` without the
/// `": "` separator.
fn header_value(line: &str) -> Option<&str> {
    line.split_once(": ").map(|(_, value)| value.trim())
}

enum State {
    Scanning,
    InSuite(Suite),
}

/// Parser for Go benchmark log text.
///
/// Configuration is fixed at construction, so calls have no ordering
/// dependency and the parser is freely shareable.
#[derive(Debug, Clone, Default)]
pub struct Parser {
    go_version: Option<String>,
}

impl Parser {
    pub fn new() -> Self {
        Self::default()
    }

    /// A parser that stamps the given toolchain version onto every suite
    /// it produces.
    pub fn with_go_version(version: impl Into<String>) -> Self {
        Self {
            go_version: Some(version.into()),
        }
    }

    /// Parse benchmark log text line-by-line into suites, one per `goos:`
    /// marker. A suite left open at end-of-input is returned as-is.
    pub fn parse<R: Read>(&self, reader: R) -> Result<Vec<Suite>> {
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::with_capacity(256);
        let mut suites = Vec::new();
        let mut state = State::Scanning;

        while let Some(line) = next_line(&mut reader, &mut buf)? {
            state = match state {
                State::Scanning => match classify(&line) {
                    LineKind::Goos => State::InSuite(self.open_suite(&line)?),
                    _ => State::Scanning,
                },
                State::InSuite(mut suite) => match classify(&line) {
                    LineKind::Terminator => {
                        suites.push(suite);
                        State::Scanning
                    }
                    LineKind::Goarch => {
                        if let Some(value) = header_value(&line) {
                            suite.goarch = value.to_string();
                        }
                        State::InSuite(suite)
                    }
                    LineKind::Pkg => {
                        if let Some(value) = header_value(&line) {
                            suite.pkg = value.to_string();
                        }
                        State::InSuite(suite)
                    }
                    LineKind::Benchmark => {
                        suite.benchmarks.push(parse_benchmark(&line)?);
                        State::InSuite(suite)
                    }
                    // A stray goos: marker inside an open region is noise,
                    // same as any unrecognized line.
                    LineKind::Goos | LineKind::Other => State::InSuite(suite),
                },
            };
        }

        // Missing terminator is end-of-stream, not an error.
        if let State::InSuite(suite) = state {
            suites.push(suite);
        }

        Ok(suites)
    }

    pub fn parse_bytes(&self, data: &[u8]) -> Result<Vec<Suite>> {
        self.parse(data)
    }

    pub fn parse_file(&self, path: &Path) -> Result<Vec<Suite>> {
        let file = std::fs::File::open(path).map_err(|e| Error::FileRead {
            path: path.display().to_string(),
            source: e,
        })?;
        self.parse(file)
    }

    fn open_suite(&self, line: &str) -> Result<Suite> {
        let goos = header_value(line).ok_or_else(|| Error::InvalidSectionHeader {
            line: line.to_string(),
        })?;

        Ok(Suite {
            go: self.go_version.clone().unwrap_or_default(),
            goos: goos.to_string(),
            ..Default::default()
        })
    }
}

/// Read one line, stripping the `\n` (and `\r\n`) terminator. Returns
/// `None` at end-of-input.
///
/// Reads chunk-by-chunk and checks the length limit after every chunk,
/// so an overlong line fails with [`Error::LineTooLong`] without being
/// buffered whole.
fn next_line(reader: &mut impl BufRead, buf: &mut Vec<u8>) -> Result<Option<String>> {
    buf.clear();
    let mut saw_input = false;

    loop {
        let (found_newline, used) = {
            let available = reader.fill_buf()?;
            if available.is_empty() {
                break;
            }
            saw_input = true;
            match available.iter().position(|&b| b == b'\n') {
                Some(i) => {
                    buf.extend_from_slice(&available[..i]);
                    (true, i + 1)
                }
                None => {
                    buf.extend_from_slice(available);
                    (false, available.len())
                }
            }
        };
        reader.consume(used);
        if buf.len() > MAX_LINE_LEN {
            return Err(Error::LineTooLong { limit: MAX_LINE_LEN });
        }
        if found_newline {
            break;
        }
    }

    if !saw_input {
        return Ok(None);
    }
    if buf.last() == Some(&b'\r') {
        buf.pop();
    }
    Ok(Some(String::from_utf8_lossy(buf).into_owned()))
}

/// Parse one `Benchmark...` line: tab-separated `name`, iteration count,
/// then one or more `<value> <unit>` metric fields.
fn parse_benchmark(line: &str) -> Result<Benchmark> {
    let parts: Vec<&str> = line.split('\t').collect();
    if parts.len() < 3 {
        return Err(Error::InvalidBenchmarkFormat {
            line: line.to_string(),
        });
    }

    let raw_name = parts[0].trim();
    let name = raw_name.strip_prefix(PREFIX_BENCHMARK).unwrap_or(raw_name);

    let runs_field = parts[1].trim();
    let runs: i64 = runs_field
        .parse()
        .map_err(|_| Error::InvalidIterationCount {
            name: name.to_string(),
            value: runs_field.to_string(),
        })?;

    let mut bench = Benchmark {
        name: name.to_string(),
        runs,
        ..Default::default()
    };

    for metric in &parts[2..] {
        parse_metric(&mut bench, metric.trim())?;
    }

    Ok(bench)
}

/// Apply one `<value> <unit>` metric field to a benchmark. Recognized
/// units map to fixed fields; anything else lands in `custom` (duplicate
/// units overwrite, last wins).
fn parse_metric(bench: &mut Benchmark, metric: &str) -> Result<()> {
    let (value_str, unit) = metric.split_once(' ').ok_or_else(|| Error::InvalidMetricFormat {
        name: bench.name.clone(),
        metric: metric.to_string(),
    })?;

    let value: f64 = value_str.parse().map_err(|_| Error::InvalidMetricValue {
        name: bench.name.clone(),
        metric: metric.to_string(),
    })?;

    match unit {
        "ns/op" => bench.ns_per_op = value,
        "B/op" => bench.mem.get_or_insert_with(Mem::default).bytes_per_op = value,
        "allocs/op" => bench.mem.get_or_insert_with(Mem::default).allocs_per_op = value,
        "MB/s" => bench.mem.get_or_insert_with(Mem::default).mb_per_sec = value,
        _ => {
            bench.custom.insert(unit.to_string(), value);
        }
    }

    Ok(())
}
