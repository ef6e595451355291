use crate::models::{Ascent, Peak, PeakView, Route};

/// Computes the derived per-peak facts from the peak's routes and the
/// ascents logged on them.
///
/// `ascents` must be in source-table order: when several ascents carry a
/// comment, the first one wins. That tie-break is arbitrary but stable,
/// and deliberately not based on date or rating.
pub fn aggregate_peak(peak: &Peak, routes: &[&Route], ascents: &[&Ascent]) -> PeakView {
    // Ascent re-ratings override route ratings; a peak with no rated
    // ascent stays unrated rather than rated zero.
    let max_bewertung = ascents.iter().filter_map(|a| a.bewertung).max();

    let kommentar = ascents
        .iter()
        .filter_map(|a| a.kommentar.as_deref())
        .find(|k| !k.is_empty())
        .unwrap_or("")
        .to_string();

    PeakView {
        peak: peak.clone(),
        anzahl_routen: routes.len(),
        peak_has_star: routes.iter().any(|r| r.stern),
        max_bewertung,
        has_done_route: !ascents.is_empty(),
        kommentar,
    }
}
