//! Batch preparation stage.
//!
//! Takes the candidate list from the scan stage, normalizes each file, and
//! writes the results plus a report manifest to the output directory.
//!
//! ## Output Structure
//!
//! ```text
//! prepared/
//! ├── manifest.json        # Per-file report: action, sizes, dimensions
//! ├── .prep-cache.json     # Skip cache (content-addressed)
//! ├── 001-red-dress.jpg
//! ├── 002-blue-shirt.jpg
//! └── logo.png
//! ```
//!
//! ## Parallel Processing
//!
//! Files are processed in parallel using [rayon](https://docs.rs/rayon);
//! each file is one independent pipeline with no shared mutable state.
//! Progress events are emitted as files complete — out of order — tagged
//! with the file's scan index; the report manifest lists entries in scan
//! order regardless of completion order.
//!
//! ## Failure policy
//!
//! Normalization itself never fails (it degrades to passing the original
//! through; see [`normalize`](crate::imaging::normalize)). What *can* fail
//! here is real I/O — an unreadable source, an unwritable output directory
//! — and those abort the run with an error.

use crate::blob::ImageBlob;
use crate::cache::{self, CacheManifest};
use crate::imaging::{Codec, NormalizeConfig, Outcome, OutputFormat, SkipReason, fit_within, normalize};
use crate::scan::Candidate;
use rayon::prelude::*;
use serde::Serialize;
use std::path::Path;
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PrepareError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Report manifest filename within the output directory.
pub const REPORT_FILENAME: &str = "manifest.json";

/// What happened to one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    /// A smaller payload was produced and written.
    Normalized,
    /// The original bytes were written unchanged.
    PassedThrough,
    /// The skip cache proved the existing output is current.
    Cached,
}

/// One line of the report manifest.
#[derive(Debug, Clone, Serialize)]
pub struct ReportEntry {
    pub source: String,
    /// Output filename, relative to the output directory.
    pub output: String,
    pub action: Action,
    /// Pass-through reason label, present only for `PassedThrough`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub input_bytes: u64,
    pub output_bytes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_dimensions: Option<(u32, u32)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dimensions: Option<(u32, u32)>,
    /// Output format label, present only for `Normalized`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

/// Report manifest written as `manifest.json`, entries in scan order.
#[derive(Debug, Serialize)]
pub struct Report {
    pub entries: Vec<ReportEntry>,
}

impl Report {
    pub fn count(&self, action: Action) -> usize {
        self.entries.iter().filter(|e| e.action == action).count()
    }

    pub fn total_input_bytes(&self) -> u64 {
        self.entries.iter().map(|e| e.input_bytes).sum()
    }

    pub fn total_output_bytes(&self) -> u64 {
        self.entries.iter().map(|e| e.output_bytes).sum()
    }
}

/// Progress event emitted as each file completes.
#[derive(Debug, Clone)]
pub struct PrepareEvent {
    /// Scan index of the file (0-based).
    pub index: usize,
    pub total: usize,
    pub entry: ReportEntry,
}

/// Prepare all candidates into `output_dir`.
///
/// Writes one output file per candidate, the report manifest, and the
/// updated skip cache. Events are sent as files complete when a sender is
/// given.
pub fn prepare(
    codec: &impl Codec,
    candidates: &[Candidate],
    output_dir: &Path,
    config: &NormalizeConfig,
    use_cache: bool,
    events: Option<Sender<PrepareEvent>>,
) -> Result<Report, PrepareError> {
    std::fs::create_dir_all(output_dir)?;

    let mut manifest = if use_cache {
        CacheManifest::load(output_dir)
    } else {
        CacheManifest::empty()
    };
    let params_hash = cache::hash_params(config);
    let total = candidates.len();

    let mut results: Vec<(usize, ReportEntry, String)> = candidates
        .par_iter()
        .enumerate()
        .map_with(events, |tx, (index, candidate)| {
            let (entry, source_hash) = prepare_one(
                codec,
                candidate,
                output_dir,
                config,
                &manifest,
                use_cache,
                &params_hash,
            )?;
            if let Some(tx) = tx {
                // A dropped receiver only means nobody is listening
                tx.send(PrepareEvent {
                    index,
                    total,
                    entry: entry.clone(),
                })
                .ok();
            }
            Ok((index, entry, source_hash))
        })
        .collect::<Result<Vec<_>, PrepareError>>()?;

    results.sort_by_key(|(index, ..)| *index);

    let mut entries = Vec::with_capacity(results.len());
    for (_, entry, source_hash) in results {
        manifest.insert(entry.output.clone(), source_hash, params_hash.clone());
        entries.push(entry);
    }
    manifest.save(output_dir)?;

    let report = Report { entries };
    let json = serde_json::to_string_pretty(&report)?;
    std::fs::write(output_dir.join(REPORT_FILENAME), json)?;

    Ok(report)
}

fn prepare_one(
    codec: &impl Codec,
    candidate: &Candidate,
    output_dir: &Path,
    config: &NormalizeConfig,
    manifest: &CacheManifest,
    use_cache: bool,
    params_hash: &str,
) -> Result<(ReportEntry, String), PrepareError> {
    let bytes = std::fs::read(&candidate.source)?;
    let source_hash = cache::hash_bytes(&bytes);
    let output_path = output_dir.join(&candidate.name);

    if use_cache && manifest.is_fresh(&candidate.name, &source_hash, params_hash, output_dir) {
        let output_bytes = std::fs::metadata(&output_path)?.len();
        return Ok((
            ReportEntry {
                source: candidate.source.display().to_string(),
                output: candidate.name.clone(),
                action: Action::Cached,
                reason: None,
                input_bytes: bytes.len() as u64,
                output_bytes,
                input_dimensions: None,
                output_dimensions: None,
                format: None,
            },
            source_hash,
        ));
    }

    let input_bytes = bytes.len() as u64;
    let blob = ImageBlob::new(bytes, candidate.mime.clone(), candidate.name.clone());
    let outcome = normalize(codec, blob, config);

    let entry = match &outcome {
        Outcome::Normalized {
            blob,
            input_dimensions,
            output_dimensions,
            format,
        } => ReportEntry {
            source: candidate.source.display().to_string(),
            output: candidate.name.clone(),
            action: Action::Normalized,
            reason: None,
            input_bytes,
            output_bytes: blob.byte_size(),
            input_dimensions: Some(*input_dimensions),
            output_dimensions: Some(*output_dimensions),
            format: Some(format.label().to_string()),
        },
        Outcome::Unchanged { blob, reason } => ReportEntry {
            source: candidate.source.display().to_string(),
            output: candidate.name.clone(),
            action: Action::PassedThrough,
            reason: Some(reason.label().to_string()),
            input_bytes,
            output_bytes: blob.byte_size(),
            input_dimensions: None,
            output_dimensions: None,
            format: None,
        },
    };

    std::fs::write(&output_path, &outcome.blob().bytes)?;
    Ok((entry, source_hash))
}

/// What a prepare run would do with one file. Produced by [`check`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    /// Would pass through untouched (not an image, or below threshold).
    PassThrough(SkipReason),
    /// Header probe failed; prepare would fall into the fail-open path
    /// and copy the bytes unchanged.
    Unreadable,
    /// Would decode and re-encode. `to` equals `from` when only the
    /// encoding changes.
    Encode {
        from: (u32, u32),
        to: (u32, u32),
        format: OutputFormat,
    },
}

/// Dry-run result for one candidate.
#[derive(Debug, Clone)]
pub struct CheckEntry {
    pub name: String,
    pub byte_size: u64,
    pub plan: Plan,
}

/// Plan a prepare run without decoding or encoding anything.
///
/// Probes dimensions via [`Codec::identify`] only. Writes nothing.
pub fn check(
    codec: &impl Codec,
    candidates: &[Candidate],
    config: &NormalizeConfig,
) -> Result<Vec<CheckEntry>, PrepareError> {
    candidates
        .iter()
        .map(|candidate| {
            let plan = if !candidate.mime.starts_with("image/") {
                Plan::PassThrough(SkipReason::NotAnImage)
            } else if candidate.byte_size < config.threshold {
                Plan::PassThrough(SkipReason::BelowThreshold)
            } else {
                let bytes = std::fs::read(&candidate.source)?;
                match codec.identify(&bytes) {
                    Err(_) => Plan::Unreadable,
                    Ok(dims) => {
                        let from = (dims.width, dims.height);
                        let to = fit_within(from, config.max_dimension).unwrap_or(from);
                        let format = if candidate.mime == "image/png" {
                            OutputFormat::Png
                        } else {
                            OutputFormat::Jpeg
                        };
                        Plan::Encode { from, to, format }
                    }
                }
            };
            Ok(CheckEntry {
                name: candidate.name.clone(),
                byte_size: candidate.byte_size,
                plan,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::Dimensions;
    use crate::imaging::codec::tests::{MockCodec, RecordedOp};
    use crate::scan::scan;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// Policy with a tiny threshold so small fixtures still get processed.
    fn test_config() -> NormalizeConfig {
        NormalizeConfig {
            threshold: 16,
            ..NormalizeConfig::default()
        }
    }

    fn write_fixture(dir: &Path, name: &str, size: usize) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, vec![0x5au8; size]).unwrap();
        path
    }

    fn dims(width: u32, height: u32) -> Dimensions {
        Dimensions { width, height }
    }

    #[test]
    fn prepare_writes_outputs_and_report() {
        let tmp = TempDir::new().unwrap();
        let source_dir = tmp.path().join("source");
        let output_dir = tmp.path().join("prepared");
        fs::create_dir_all(&source_dir).unwrap();

        let photo = write_fixture(&source_dir, "photo.jpg", 64);
        let notes = write_fixture(&source_dir, "notes.txt", 64);

        let candidates = scan(&[photo, notes]).unwrap();
        let codec = MockCodec::with_encoded(vec![dims(4000, 3000)], vec![vec![9u8; 8]]);

        let report = prepare(&codec, &candidates, &output_dir, &test_config(), true, None).unwrap();

        // Entries in scan order
        assert_eq!(report.entries.len(), 2);
        assert_eq!(report.entries[0].output, "photo.jpg");
        assert_eq!(report.entries[0].action, Action::Normalized);
        assert_eq!(report.entries[0].input_dimensions, Some((4000, 3000)));
        assert_eq!(report.entries[0].output_dimensions, Some((1920, 1440)));
        assert_eq!(report.entries[0].format.as_deref(), Some("jpeg"));
        assert_eq!(report.entries[1].output, "notes.txt");
        assert_eq!(report.entries[1].action, Action::PassedThrough);
        assert_eq!(report.entries[1].reason.as_deref(), Some("not-an-image"));

        // Normalized file holds the encoded payload, pass-through the original
        assert_eq!(fs::read(output_dir.join("photo.jpg")).unwrap(), vec![9u8; 8]);
        assert_eq!(
            fs::read(output_dir.join("notes.txt")).unwrap(),
            vec![0x5au8; 64]
        );

        // Report manifest is valid JSON with both entries
        let json = fs::read_to_string(output_dir.join(REPORT_FILENAME)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["entries"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn second_run_hits_the_cache() {
        let tmp = TempDir::new().unwrap();
        let source_dir = tmp.path().join("source");
        let output_dir = tmp.path().join("prepared");
        fs::create_dir_all(&source_dir).unwrap();
        let photo = write_fixture(&source_dir, "photo.jpg", 64);

        let candidates = scan(&[photo]).unwrap();
        let codec = MockCodec::with_encoded(vec![dims(2000, 1000)], vec![vec![9u8; 8]]);
        prepare(&codec, &candidates, &output_dir, &test_config(), true, None).unwrap();

        // Fresh mock with empty queues: any decode would error the outcome
        // into a pass-through, so a Cached action proves no work happened.
        let codec = MockCodec::new();
        let report = prepare(&codec, &candidates, &output_dir, &test_config(), true, None).unwrap();
        assert_eq!(report.entries[0].action, Action::Cached);
        assert!(codec.get_operations().is_empty());
    }

    #[test]
    fn no_cache_forces_rework() {
        let tmp = TempDir::new().unwrap();
        let source_dir = tmp.path().join("source");
        let output_dir = tmp.path().join("prepared");
        fs::create_dir_all(&source_dir).unwrap();
        let photo = write_fixture(&source_dir, "photo.jpg", 64);

        let candidates = scan(&[photo]).unwrap();
        let codec = MockCodec::with_encoded(vec![dims(2000, 1000)], vec![vec![9u8; 8]]);
        prepare(&codec, &candidates, &output_dir, &test_config(), true, None).unwrap();

        let codec = MockCodec::with_encoded(vec![dims(2000, 1000)], vec![vec![9u8; 8]]);
        let report =
            prepare(&codec, &candidates, &output_dir, &test_config(), false, None).unwrap();
        assert_eq!(report.entries[0].action, Action::Normalized);
        assert!(
            codec
                .get_operations()
                .iter()
                .any(|op| matches!(op, RecordedOp::Decode))
        );
    }

    #[test]
    fn changed_policy_invalidates_the_cache() {
        let tmp = TempDir::new().unwrap();
        let source_dir = tmp.path().join("source");
        let output_dir = tmp.path().join("prepared");
        fs::create_dir_all(&source_dir).unwrap();
        let photo = write_fixture(&source_dir, "photo.jpg", 64);

        let candidates = scan(&[photo]).unwrap();
        let codec = MockCodec::with_encoded(vec![dims(2000, 1000)], vec![vec![9u8; 8]]);
        prepare(&codec, &candidates, &output_dir, &test_config(), true, None).unwrap();

        let tighter = NormalizeConfig {
            max_dimension: 1280,
            ..test_config()
        };
        let codec = MockCodec::with_encoded(vec![dims(2000, 1000)], vec![vec![9u8; 8]]);
        let report = prepare(&codec, &candidates, &output_dir, &tighter, true, None).unwrap();
        assert_eq!(report.entries[0].action, Action::Normalized);
        assert_eq!(report.entries[0].output_dimensions, Some((1280, 640)));
    }

    #[test]
    fn failed_encode_copies_original_bytes() {
        let tmp = TempDir::new().unwrap();
        let source_dir = tmp.path().join("source");
        let output_dir = tmp.path().join("prepared");
        fs::create_dir_all(&source_dir).unwrap();
        let photo = write_fixture(&source_dir, "photo.jpg", 64);

        let candidates = scan(&[photo]).unwrap();
        // Decode succeeds, encode queue empty → encode fails → fail-open
        let codec = MockCodec::with_decoded(vec![dims(2000, 1000)]);
        let report = prepare(&codec, &candidates, &output_dir, &test_config(), true, None).unwrap();

        assert_eq!(report.entries[0].action, Action::PassedThrough);
        assert_eq!(report.entries[0].reason.as_deref(), Some("encode-failed"));
        assert_eq!(
            fs::read(output_dir.join("photo.jpg")).unwrap(),
            vec![0x5au8; 64]
        );
    }

    #[test]
    fn events_arrive_for_every_file() {
        let tmp = TempDir::new().unwrap();
        let source_dir = tmp.path().join("source");
        let output_dir = tmp.path().join("prepared");
        fs::create_dir_all(&source_dir).unwrap();
        let a = write_fixture(&source_dir, "a.jpg", 64);
        let b = write_fixture(&source_dir, "b.jpg", 64);

        let candidates = scan(&[a, b]).unwrap();
        let codec = MockCodec::with_encoded(
            vec![dims(2000, 1000), dims(2000, 1000)],
            vec![vec![9u8; 8], vec![9u8; 8]],
        );

        let (tx, rx) = std::sync::mpsc::channel();
        prepare(
            &codec,
            &candidates,
            &output_dir,
            &test_config(),
            true,
            Some(tx),
        )
        .unwrap();

        let events: Vec<PrepareEvent> = rx.iter().collect();
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.total == 2));
        let mut indices: Vec<usize> = events.iter().map(|e| e.index).collect();
        indices.sort_unstable();
        assert_eq!(indices, vec![0, 1]);
    }

    #[test]
    fn report_totals() {
        let report = Report {
            entries: vec![
                ReportEntry {
                    source: "a".into(),
                    output: "a".into(),
                    action: Action::Normalized,
                    reason: None,
                    input_bytes: 100,
                    output_bytes: 40,
                    input_dimensions: None,
                    output_dimensions: None,
                    format: None,
                },
                ReportEntry {
                    source: "b".into(),
                    output: "b".into(),
                    action: Action::PassedThrough,
                    reason: Some("below-threshold".into()),
                    input_bytes: 10,
                    output_bytes: 10,
                    input_dimensions: None,
                    output_dimensions: None,
                    format: None,
                },
            ],
        };

        assert_eq!(report.count(Action::Normalized), 1);
        assert_eq!(report.count(Action::PassedThrough), 1);
        assert_eq!(report.count(Action::Cached), 0);
        assert_eq!(report.total_input_bytes(), 110);
        assert_eq!(report.total_output_bytes(), 50);
    }

    #[test]
    fn check_plans_without_touching_outputs() {
        let tmp = TempDir::new().unwrap();
        let source_dir = tmp.path().join("source");
        fs::create_dir_all(&source_dir).unwrap();

        let big = write_fixture(&source_dir, "big.jpg", 64);
        let png = write_fixture(&source_dir, "logo.png", 64);
        let tiny = write_fixture(&source_dir, "tiny.jpg", 4);
        let text = write_fixture(&source_dir, "notes.txt", 64);
        let broken = write_fixture(&source_dir, "broken.jpg", 64);

        let candidates = scan(&[big, png, tiny, text, broken]).unwrap();
        // identify queue popped from the end: big.jpg first, then logo.png,
        // then broken.jpg gets nothing and errors
        let codec = MockCodec {
            identify_results: std::sync::Mutex::new(vec![dims(1500, 1500), dims(4000, 3000)]),
            ..MockCodec::new()
        };

        let entries = check(&codec, &candidates, &test_config()).unwrap();
        assert_eq!(entries.len(), 5);
        assert_eq!(
            entries[0].plan,
            Plan::Encode {
                from: (4000, 3000),
                to: (1920, 1440),
                format: OutputFormat::Jpeg
            }
        );
        assert_eq!(
            entries[1].plan,
            Plan::Encode {
                from: (1500, 1500),
                to: (1500, 1500),
                format: OutputFormat::Png
            }
        );
        assert_eq!(
            entries[2].plan,
            Plan::PassThrough(SkipReason::BelowThreshold)
        );
        assert_eq!(entries[3].plan, Plan::PassThrough(SkipReason::NotAnImage));
        assert_eq!(entries[4].plan, Plan::Unreadable);
    }
}
