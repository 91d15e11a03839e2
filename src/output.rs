//! CLI output formatting.
//!
//! Each report has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects. `--json` bypasses these and
//! serializes the underlying values instead.
//!
//! # Output Format
//!
//! ## List conversion
//!
//! ```text
//! Converted
//! 001 shots/a.webp
//! 002 shots/b.webp
//! Failed
//! 001 shots/c.png
//!     Cause: failed to decode shots/c.png: ...
//! Converted 2 of 3 images
//! ```
//!
//! ## Directory conversion
//!
//! ```text
//! shots/ (recursive)
//!     Processed: 3
//!     Converted: 2
//!     Failed: 1
//! 001 shots/c.png
//!     Cause: ...
//! ```
//!
//! ## Scan
//!
//! ```text
//! 001 a.jpg
//! 002 trip/b.png
//! 2 candidates in shots/
//! ```
//!
//! Failures are sorted by path so repeated runs print the same report even
//! though workers finish in any order.

use crate::config::{AppConfig, version};
use crate::types::{BatchResult, DirectorySummary, ItemFailure};
use std::path::{Path, PathBuf};

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

/// Numbered failure entries, each followed by an indented cause.
fn failure_lines(failures: &[ItemFailure]) -> Vec<String> {
    let mut sorted: Vec<&ItemFailure> = failures.iter().collect();
    sorted.sort_by(|a, b| a.source.cmp(&b.source));

    let mut lines = Vec::with_capacity(sorted.len() * 2);
    for (i, failure) in sorted.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), failure.source.display()));
        lines.push(format!("{}Cause: {}", indent(1), failure.cause));
    }
    lines
}

// ============================================================================
// List conversion
// ============================================================================

/// Format the outcome of a list conversion.
pub fn format_batch_result(result: &BatchResult) -> Vec<String> {
    let mut lines = Vec::new();

    if !result.succeeded.is_empty() {
        let mut outputs: Vec<&PathBuf> = result.succeeded.iter().collect();
        outputs.sort();
        lines.push("Converted".to_string());
        for (i, output) in outputs.iter().enumerate() {
            lines.push(format!("{} {}", format_index(i + 1), output.display()));
        }
    }

    if !result.failures.is_empty() {
        lines.push("Failed".to_string());
        lines.extend(failure_lines(&result.failures));
    }

    lines.push(format!(
        "Converted {} of {}",
        result.succeeded.len(),
        plural(result.total(), "image")
    ));
    lines
}

pub fn print_batch_result(result: &BatchResult) {
    for line in format_batch_result(result) {
        println!("{}", line);
    }
}

// ============================================================================
// Directory conversion
// ============================================================================

/// Format a directory pass: counts first, then any failures.
pub fn format_directory_summary(
    dir: &Path,
    recursive: bool,
    summary: &DirectorySummary,
) -> Vec<String> {
    let mode = if recursive { "recursive" } else { "flat" };
    let mut lines = vec![
        format!("{} ({})", dir.display(), mode),
        format!("{}Processed: {}", indent(1), summary.processed()),
        format!("{}Converted: {}", indent(1), summary.succeeded),
    ];
    if !summary.failures.is_empty() {
        lines.push(format!("{}Failed: {}", indent(1), summary.failures.len()));
        lines.extend(failure_lines(&summary.failures));
    }
    lines
}

pub fn print_directory_summary(dir: &Path, recursive: bool, summary: &DirectorySummary) {
    for line in format_directory_summary(dir, recursive, summary) {
        println!("{}", line);
    }
}

// ============================================================================
// Scan
// ============================================================================

/// Format candidate paths relative to `root`, in enumeration order.
pub fn format_candidates(root: &Path, candidates: &[PathBuf]) -> Vec<String> {
    let mut lines: Vec<String> = candidates
        .iter()
        .enumerate()
        .map(|(i, path)| {
            let shown = path.strip_prefix(root).unwrap_or(path);
            format!("{} {}", format_index(i + 1), shown.display())
        })
        .collect();
    lines.push(format!(
        "{} in {}",
        plural(candidates.len(), "candidate"),
        root.display()
    ));
    lines
}

pub fn print_candidates(root: &Path, candidates: &[PathBuf]) {
    for line in format_candidates(root, candidates) {
        println!("{}", line);
    }
}

// ============================================================================
// Size and config
// ============================================================================

/// Format one target-size calculation.
///
/// ```text
/// 1920x1080 within 0x0 -> 1280x720
/// ```
pub fn format_target_size(original: (u32, u32), bounds: (u32, u32), target: (u32, u32)) -> String {
    format!(
        "{}x{} within {}x{} -> {}x{}",
        original.0, original.1, bounds.0, bounds.1, target.0, target.1
    )
}

/// Format the effective configuration as `key = value` lines.
pub fn format_config(config: &AppConfig) -> Vec<String> {
    let c = &config.conversion;
    let bound = |b: Option<u32>| b.map_or_else(|| "unset".to_string(), |v| v.to_string());
    vec![
        format!("pixbatch {}", version()),
        "Paths".to_string(),
        format!("{}assets_dir = {}", indent(1), config.assets_dir().display()),
        format!("{}db_path = {}", indent(1), config.db_path().display()),
        "Conversion".to_string(),
        format!("{}format = {}", indent(1), c.format),
        format!("{}quality = {}", indent(1), c.quality),
        format!("{}concurrency = {}", indent(1), config.concurrency().get()),
        format!("{}keep_original = {}", indent(1), c.keep_original),
        format!("{}keep_extension = {}", indent(1), c.keep_extension),
        format!("{}codec = {}", indent(1), c.codec),
        format!("{}max_width = {}", indent(1), bound(c.max_width)),
        format!("{}max_height = {}", indent(1), bound(c.max_height)),
    ]
}

pub fn print_config(config: &AppConfig) {
    for line in format_config(config) {
        println!("{}", line);
    }
}
