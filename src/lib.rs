//! # photoprep
//!
//! A batch image normalizer that prepares product photos for upload.
//! Point it at files or directories and it produces payloads that are safe
//! and efficient to hand to an uploader: bounded in pixel dimensions,
//! re-encoded for size, and never worse than the input.
//!
//! # Architecture: Scan, then Prepare
//!
//! A run has two stages. Scan turns the command line into an ordered
//! candidate list; prepare pushes each candidate through the normalization
//! pipeline and writes the results plus a JSON report:
//!
//! ```text
//! 1. Scan      args      →  candidates       (files, sizes, media types)
//! 2. Prepare   candidates →  prepared/ + manifest.json
//! ```
//!
//! Each file is one independent pipeline (decode → resize decision →
//! encode → compare), processed in parallel with no shared state between
//! files.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Stage 1 — resolves files and directories into an ordered candidate list |
//! | [`prepare`] | Stage 2 — parallel normalization, output writing, report manifest; also the `check` dry run |
//! | [`blob`] | In-memory payload type and extension-based media type guessing |
//! | [`imaging`] | The normalization pipeline: policy, dimension math, codec trait, `image`-crate codec |
//! | [`cache`] | Content-addressed skip cache for repeated runs |
//! | [`config`] | `photoprep.toml` loading, validation, and the stock template |
//! | [`output`] | CLI output formatting — per-file progress lines and summaries |
//!
//! # Design Decisions
//!
//! ## Never Worse Than the Input
//!
//! Normalization is a strict-improvement-or-noop transform. A re-encode
//! that fails to beat the input's byte size is discarded and the original
//! bytes are used, metadata untouched. The same applies to every failure
//! path: undecodable bytes, encoder errors, and non-image payloads all
//! degrade to passing the original through. Uploads are never blocked by
//! the optimizer.
//!
//! ## PNG Stays PNG
//!
//! Converting a transparent PNG to JPEG composites its alpha channel onto
//! a background and visibly corrupts the image. PNG inputs therefore keep
//! their format (lossless re-encode, possibly downscaled); every other
//! image becomes JPEG at quality 90, which is the right trade-off for
//! product photography.
//!
//! ## Codec Behind a Trait
//!
//! The policy — threshold, dimension cap, format choice, regression guard
//! — lives in [`imaging::normalize`] and talks to pixels only through the
//! [`imaging::Codec`] trait. Policy tests run against a recording mock and
//! never encode a real pixel; the production codec is the pure-Rust
//! `image` crate, so the binary has zero system dependencies.
//!
//! ## Content-Addressed Skip Cache
//!
//! Re-running prepare over a mostly-unchanged photo set should cost
//! nothing. The cache keys on SHA-256 of the source bytes plus the policy
//! values, so renames and touched mtimes don't invalidate it — only real
//! content or policy changes do.

pub mod blob;
pub mod cache;
pub mod config;
pub mod imaging;
pub mod output;
pub mod prepare;
pub mod scan;
