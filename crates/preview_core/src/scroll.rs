//! Percentage bridge between the editor and preview scroll positions.
//!
//! The two panes have unrelated content heights, so positions are only ever
//! exchanged as a percentage of the respective content height.

/// Converts an editor scroll offset into a percentage in `[0, 100]`.
///
/// A zero (or otherwise unusable) content height yields `0`.
///
/// # Examples
///
/// ```
/// use preview_core::scroll::to_preview_percent;
///
/// assert_eq!(to_preview_percent(0.0, 400.0), 0.0);
/// assert_eq!(to_preview_percent(100.0, 400.0), 25.0);
/// assert_eq!(to_preview_percent(400.0, 400.0), 100.0);
/// assert_eq!(to_preview_percent(30.0, 0.0), 0.0);
/// ```
pub fn to_preview_percent(editor_scroll_offset: f64, editor_content_height: f64) -> f64 {
    if !editor_content_height.is_finite() || editor_content_height <= 0.0 {
        return 0.0;
    }
    let percent = 100.0 * editor_scroll_offset / editor_content_height;
    if percent.is_nan() {
        0.0
    } else {
        percent.clamp(0.0, 100.0)
    }
}

/// Converts a percentage back into a scroll offset for the preview pane.
pub fn apply_to_preview(percent: f64, preview_content_height: f64) -> f64 {
    percent * preview_content_height / 100.0
}
