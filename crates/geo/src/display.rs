//! "Distance away" display rule.

/// Formats a distance for listing cards.
///
/// Unknown distances render as `"--"`, anything under one kilometer as whole
/// meters, everything else as kilometers with one decimal.
///
/// # Example
/// ```
/// use gigmap_geo::format_distance;
///
/// assert_eq!(format_distance(Some(0.4567)), "457m");
/// assert_eq!(format_distance(Some(290.172)), "290.2 km");
/// assert_eq!(format_distance(None), "--");
/// ```
pub fn format_distance(distance_km: Option<f64>) -> String {
    match distance_km {
        Some(d) if d.is_finite() && d < 1.0 => format!("{}m", (d * 1000.0).round()),
        Some(d) if d.is_finite() => format!("{d:.1} km"),
        _ => "--".to_string(),
    }
}
