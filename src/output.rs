//! CLI output formatting for all stages.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**: the primary display
//! for every file is its positional index and name, with what happened to
//! it as indented context. Sizes are humanized; exact byte counts live in
//! the report manifest, not on screen.
//!
//! # Output Format
//!
//! ## Prepare
//!
//! ```text
//! 001 001-red-dress.jpg
//!     2.1 MB 4000x3000 → 628 KB 1920x1440 jpeg
//! 002 logo.png
//!     cached
//! 003 notes.txt
//!     passed through (not an image)
//!
//! Prepared 1 file, 1 cached, 1 passed through
//! Total 2.4 MB → 900 KB
//! ```
//!
//! ## Check
//!
//! ```text
//! 001 001-red-dress.jpg
//!     2.1 MB 4000x3000 → 1920x1440 jpeg
//! 002 tiny.jpg
//!     would pass through (below size threshold)
//! ```
//!
//! # Architecture
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure — no I/O, no side effects.

use crate::prepare::{Action, CheckEntry, Plan, PrepareEvent, Report};

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Humanize a byte count: `512 B`, `300 KB`, `2.1 MB`.
pub fn format_bytes(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = 1024 * 1024;
    if bytes >= MIB {
        format!("{:.1} MB", bytes as f64 / MIB as f64)
    } else if bytes >= KIB {
        format!("{} KB", bytes / KIB)
    } else {
        format!("{} B", bytes)
    }
}

fn format_dims(dims: Option<(u32, u32)>) -> String {
    match dims {
        Some((w, h)) => format!(" {}x{}", w, h),
        None => String::new(),
    }
}

/// Format one prepare progress event as display lines.
pub fn format_prepare_event(event: &PrepareEvent) -> Vec<String> {
    let entry = &event.entry;
    let header = format!("{} {}", format_index(event.index + 1), entry.output);

    let detail = match entry.action {
        Action::Normalized => format!(
            "    {}{} → {}{} {}",
            format_bytes(entry.input_bytes),
            format_dims(entry.input_dimensions),
            format_bytes(entry.output_bytes),
            format_dims(entry.output_dimensions),
            entry.format.as_deref().unwrap_or_default(),
        ),
        Action::Cached => "    cached".to_string(),
        Action::PassedThrough => {
            let reason = entry.reason.as_deref().unwrap_or("unchanged");
            format!("    passed through ({})", reason.replace('-', " "))
        }
    };

    vec![header, detail]
}

/// Format the end-of-run summary.
pub fn format_summary(report: &Report) -> Vec<String> {
    let normalized = report.count(Action::Normalized);
    let cached = report.count(Action::Cached);
    let passed = report.count(Action::PassedThrough);

    let mut parts = vec![format!(
        "Prepared {} file{}",
        normalized,
        if normalized == 1 { "" } else { "s" }
    )];
    if cached > 0 {
        parts.push(format!("{} cached", cached));
    }
    if passed > 0 {
        parts.push(format!("{} passed through", passed));
    }

    vec![
        parts.join(", "),
        format!(
            "Total {} → {}",
            format_bytes(report.total_input_bytes()),
            format_bytes(report.total_output_bytes())
        ),
    ]
}

/// Format dry-run check results.
pub fn format_check_output(entries: &[CheckEntry]) -> Vec<String> {
    let mut lines = Vec::with_capacity(entries.len() * 2);
    for (pos, entry) in entries.iter().enumerate() {
        lines.push(format!("{} {}", format_index(pos + 1), entry.name));
        lines.push(match &entry.plan {
            Plan::Encode { from, to, format } => format!(
                "    {} {}x{} → {}x{} {}",
                format_bytes(entry.byte_size),
                from.0,
                from.1,
                to.0,
                to.1,
                format.label(),
            ),
            Plan::PassThrough(reason) => {
                format!("    would pass through ({})", reason.describe())
            }
            Plan::Unreadable => "    unreadable (would copy unchanged)".to_string(),
        });
    }
    lines
}

pub fn print_check_output(entries: &[CheckEntry]) {
    for line in format_check_output(entries) {
        println!("{}", line);
    }
}

pub fn print_summary(report: &Report) {
    for line in format_summary(report) {
        println!("{}", line);
    }
}
