//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Compute output dimensions that cap the longer edge at `cap`.
///
/// Returns `None` when both axes already fit — the caller skips resampling
/// entirely (no upscaling, ever). Otherwise returns the capped dimensions
/// with the shorter axis scaled proportionally, rounded to the nearest
/// pixel. Square inputs take the width branch; for them both branches
/// produce `cap` × `cap`, so the choice only fixes which comparison runs.
///
/// # Examples
/// ```
/// # use photoprep::imaging::fit_within;
/// // 4000x3000 capped at 1920 → 1920x1440
/// assert_eq!(fit_within((4000, 3000), 1920), Some((1920, 1440)));
///
/// // Already within the cap → no resample
/// assert_eq!(fit_within((1600, 900), 1920), None);
/// ```
pub fn fit_within(source: (u32, u32), cap: u32) -> Option<(u32, u32)> {
    let (w, h) = source;

    if w >= h {
        if w > cap {
            let scaled = (h as f64 * cap as f64 / w as f64).round() as u32;
            // Extreme aspect ratios can round the short axis to zero
            return Some((cap, scaled.max(1)));
        }
    } else if h > cap {
        let scaled = (w as f64 * cap as f64 / h as f64).round() as u32;
        return Some((scaled.max(1), cap));
    }

    None
}
