//! # pixbatch
//!
//! Converts batches of JPEG, PNG and WebP images to WebP or AVIF with a
//! bounded number of conversions in flight. One bad file never sinks the
//! batch: every item produces exactly one outcome, and failures are collected
//! rather than short-circuiting.
//!
//! # Architecture
//!
//! ```text
//! paths / JSON list / directory
//!            │
//!        [scan]      directory → candidate paths (filtered by [naming])
//!            │
//!       [process]    jobs → worker pool → outcomes → result or summary
//!            │
//!       [imaging]    one source → one encoded output (ImageConverter)
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`process`] | Batch engine: worker pool, list and directory conversion, error aggregation |
//! | [`imaging`] | [`ImageConverter`](imaging::ImageConverter) trait, target-size math, the `image`-based codec |
//! | [`scan`] | Flat and recursive directory enumeration |
//! | [`naming`] | Extension checks and output path derivation |
//! | [`types`] | Outcome types shared by the engine, CLI output and `--json` |
//! | [`config`] | Layered `pixbatch.toml` + environment configuration |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## A Pool Per Batch
//!
//! Each batch builds its own rayon pool sized to the requested concurrency
//! and joins it before returning. Nothing outlives the call, so two batches
//! never compete for one global pool and a batch's worker count is exactly
//! what was asked for. Jobs travel over a crossbeam channel that is filled
//! and closed before any worker starts; workers exit when it runs dry.
//!
//! ## Counting After the Join
//!
//! Workers never touch shared counters. Each sends its outcome down a second
//! channel, and the dispatcher tallies them once the pool has finished.
//!
//! ## Two Failure Contracts
//!
//! An explicit list is something the caller asked for by name, so any failure
//! fails the call (with the successes still attached). A directory pass is
//! best effort: failures are logged and listed in the summary, and only an
//! enumeration error fails the call.
//!
//! ## Pure-Rust Imaging
//!
//! Decoding, resizing (Lanczos3) and encoding use the `image` crate, with
//! rav1e behind AVIF. No system libraries are needed at build or run time.

pub mod config;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod process;
pub mod scan;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
