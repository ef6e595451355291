use crate::models::ViewRow;

use super::schema::ColumnPresence;

/// Marker size in degrees as a function of peak height.
pub const MARKER_BASE: f64 = 0.0012;
pub const MARKER_SCALE: f64 = 0.00011;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerColor {
    Red,
    Blue,
    Black,
    Purple,
}

/// Per-page marker appearance: the base color varies between views, the
/// star/done overrides do not.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerStyle {
    pub base: f64,
    pub scale: f64,
    pub default_color: MarkerColor,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        MarkerStyle {
            base: MARKER_BASE,
            scale: MARKER_SCALE,
            default_color: MarkerColor::Red,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    /// Triangle vertices as `(lat, lon)`: apex first, then the two base
    /// corners.
    pub polygon: [(f64, f64); 3],
    pub color: MarkerColor,
    pub tooltip: String,
}

/// Projects one sanitized row to a map marker. Rows with an invalid
/// height or degenerate size are excluded, not errors.
pub fn project<R: ViewRow>(row: &R, style: &MarkerStyle, presence: &ColumnPresence) -> Option<Marker> {
    let hoehe = row.hoehe();
    if !hoehe.is_finite() || hoehe < 0.0 {
        return None;
    }
    let size = style.base + hoehe * style.scale;
    if size <= 0.0 || !row.lat().is_finite() || !row.lon().is_finite() {
        return None;
    }

    let (lat, lon) = (row.lat(), row.lon());
    let half_width = size * 3.0_f64.sqrt() / 2.0;
    let polygon = [
        (lat + size, lon),
        (lat - size / 2.0, lon - half_width),
        (lat - size / 2.0, lon + half_width),
    ];

    // Layered override, last write wins: done beats starred beats the
    // page default.
    let mut color = style.default_color;
    if presence.route_stern && row.has_star() {
        color = MarkerColor::Purple;
    }
    if row.climbed() {
        color = MarkerColor::Black;
    }

    Some(Marker {
        polygon,
        color,
        tooltip: tooltip(row, presence),
    })
}

/// Tooltip text: name, height, route count, area, then the optional
/// star/climbed/comment parts in that fixed order. A part backed by an
/// absent column is left out.
pub fn tooltip<R: ViewRow>(row: &R, presence: &ColumnPresence) -> String {
    let mut parts = vec![
        row.name().to_string(),
        format!("{} m", row.hoehe() as i64),
        format!("{} Routen", row.route_count()),
        row.gebiet().to_string(),
    ];
    if presence.route_stern && row.has_star() {
        parts.push("★".to_string());
    }
    if row.climbed() {
        parts.push("bestiegen".to_string());
    }
    if presence.ascent_kommentar && !row.kommentar().is_empty() {
        parts.push(row.kommentar().to_string());
    }
    parts.join(" | ")
}

/// Mean coordinate over the final row set, `None` when nothing survived
/// filtering — the renderer then skips the map instead of erroring.
pub fn map_center<R: ViewRow>(rows: &[R]) -> Option<(f64, f64)> {
    if rows.is_empty() {
        return None;
    }
    let n = rows.len() as f64;
    let lat = rows.iter().map(ViewRow::lat).sum::<f64>() / n;
    let lon = rows.iter().map(ViewRow::lon).sum::<f64>() / n;
    Some((lat, lon))
}
