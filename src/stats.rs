use std::collections::{BTreeMap, HashMap, HashSet};

use crate::pipeline::Snapshot;

/// Per-area summary backing the statistics view: how many peaks an area
/// has, how many of them were climbed, and how many distinct routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AreaStats {
    pub gebiet: String,
    pub total_peaks: usize,
    pub climbed_peaks: usize,
    pub climbed_routes: usize,
}

impl AreaStats {
    pub fn missing_peaks(&self) -> usize {
        self.total_peaks.saturating_sub(self.climbed_peaks)
    }
}

/// Groups the snapshot by `gebiet`, in sorted area order. Unresolved
/// references fall out the same way they do in the join stage.
pub fn area_stats(snapshot: &Snapshot) -> Vec<AreaStats> {
    let peak_area: HashMap<i64, &str> = snapshot
        .peaks
        .iter()
        .map(|p| (p.peak_id, p.gebiet.as_str()))
        .collect();
    let route_peak: HashMap<i64, i64> = snapshot
        .routes
        .iter()
        .filter(|r| peak_area.contains_key(&r.peak_id))
        .map(|r| (r.route_id, r.peak_id))
        .collect();

    let mut climbed_peaks: HashSet<i64> = HashSet::new();
    let mut climbed_routes: HashSet<i64> = HashSet::new();
    for ascent in &snapshot.ascents {
        if let Some(peak_id) = route_peak.get(&ascent.route_id) {
            climbed_peaks.insert(*peak_id);
            climbed_routes.insert(ascent.route_id);
        }
    }

    let mut by_area: BTreeMap<&str, AreaStats> = BTreeMap::new();
    for peak in &snapshot.peaks {
        let entry = by_area
            .entry(peak.gebiet.as_str())
            .or_insert_with(|| AreaStats {
                gebiet: peak.gebiet.clone(),
                total_peaks: 0,
                climbed_peaks: 0,
                climbed_routes: 0,
            });
        entry.total_peaks += 1;
        if climbed_peaks.contains(&peak.peak_id) {
            entry.climbed_peaks += 1;
        }
    }
    for route_id in &climbed_routes {
        let peak_id = route_peak[route_id];
        if let Some(area) = peak_area.get(&peak_id) {
            if let Some(entry) = by_area.get_mut(area) {
                entry.climbed_routes += 1;
            }
        }
    }

    by_area.into_values().collect()
}
