//! Session read projections
//!
//! Pure derivations over session time accounting, used identically by every
//! surface that displays a session (full session view, floating mini-player,
//! SSE progress events). Centralizing them here guarantees the surfaces can
//! never disagree about remaining time or progress.

/// Format remaining seconds as a zero-padded "MM:SS" clock.
///
/// Minutes are not wrapped at 60; a 2-hour step renders as "120:00" padded
/// to at least two digits, which matches how the surfaces display it.
///
/// # Examples
///
/// ```
/// use simmer_common::projection::remaining_clock;
///
/// assert_eq!(remaining_clock(125), "02:05");
/// assert_eq!(remaining_clock(0), "00:00");
/// ```
pub fn remaining_clock(seconds: u32) -> String {
    let minutes = seconds / 60;
    let secs = seconds % 60;
    format!("{:02}:{:02}", minutes, secs)
}

/// Percentage of a duration already elapsed, rounded to the nearest integer.
///
/// `elapsed_sec` is expected to be `total_sec - remaining_sec`, already
/// floored at zero by the caller (see [`elapsed_sec`]). A zero `total_sec`
/// is a precondition violation — validated recipes never produce one — and
/// is guarded to 0 rather than dividing by zero.
///
/// # Examples
///
/// ```
/// use simmer_common::projection::progress_percent;
///
/// assert_eq!(progress_percent(30, 120), 25);
/// assert_eq!(progress_percent(120, 120), 100);
/// ```
pub fn progress_percent(elapsed_sec: u32, total_sec: u32) -> u8 {
    debug_assert!(total_sec > 0, "progress over a zero-length duration");
    if total_sec == 0 {
        return 0;
    }
    let percent = (100.0 * elapsed_sec as f64 / total_sec as f64).round();
    percent.clamp(0.0, 100.0) as u8
}

/// Elapsed time derived from remaining time, floored at zero.
///
/// Remaining can momentarily exceed total when a recipe is edited between
/// reads; the floor keeps the projection non-negative regardless.
pub fn elapsed_sec(total_sec: u32, remaining_sec: u32) -> u32 {
    total_sec.saturating_sub(remaining_sec)
}

/// Whether the step at `current_step_index` is the final step.
pub fn is_last_step(current_step_index: usize, step_count: usize) -> bool {
    step_count > 0 && current_step_index == step_count - 1
}
