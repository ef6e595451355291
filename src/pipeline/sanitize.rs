use crate::models::ViewRow;

/// A field the renderer cannot do without.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Lat,
    Lon,
    Hoehe,
    Name,
    Gebiet,
}

/// Drops every row missing one of `required` — a hard filter, no
/// fallback, because an incomplete marker cannot be plotted. Returns the
/// surviving rows and how many were removed.
pub fn sanitize<R: ViewRow>(rows: Vec<R>, required: &[Field]) -> (Vec<R>, usize) {
    let before = rows.len();
    let rows: Vec<R> = rows
        .into_iter()
        .filter(|row| required.iter().all(|field| complete(row, *field)))
        .collect();
    let removed = before - rows.len();
    if removed > 0 {
        tracing::debug!(removed, "rows incomplete for rendering dropped");
    }
    (rows, removed)
}

fn complete<R: ViewRow>(row: &R, field: Field) -> bool {
    match field {
        Field::Lat => row.lat().is_finite(),
        Field::Lon => row.lon().is_finite(),
        Field::Hoehe => row.hoehe().is_finite(),
        Field::Name => !row.name().is_empty(),
        Field::Gebiet => !row.gebiet().is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Peak, PeakView};

    fn view(name: &str, lat: f64, lon: f64, hoehe: f64) -> PeakView {
        PeakView {
            peak: Peak {
                peak_id: 1,
                gipfel: name.to_string(),
                gebiet: "X".to_string(),
                hoehe,
                lat,
                lon,
            },
            anzahl_routen: 0,
            peak_has_star: false,
            max_bewertung: None,
            has_done_route: false,
            kommentar: String::new(),
        }
    }

    const REQUIRED: &[Field] = &[Field::Lat, Field::Lon, Field::Hoehe, Field::Name];

    #[test]
    fn complete_rows_pass_through() {
        let (rows, removed) = sanitize(vec![view("A", 50.9, 14.0, 20.0)], REQUIRED);
        assert_eq!(rows.len(), 1);
        assert_eq!(removed, 0);
    }

    #[test]
    fn nan_coordinates_are_dropped_and_counted() {
        let rows = vec![
            view("A", 50.9, 14.0, 20.0),
            view("B", f64::NAN, 14.0, 20.0),
            view("C", 50.9, f64::NAN, 20.0),
            view("", 50.9, 14.0, 20.0),
        ];
        let (rows, removed) = sanitize(rows, REQUIRED);
        assert_eq!(rows.len(), 1);
        assert_eq!(removed, 3);
        assert_eq!(rows[0].peak.gipfel, "A");
    }

    #[test]
    fn gebiet_is_only_checked_when_requested() {
        let mut row = view("A", 50.9, 14.0, 20.0);
        row.peak.gebiet = String::new();
        let (kept, _) = sanitize(vec![row.clone()], REQUIRED);
        assert_eq!(kept.len(), 1);
        let (kept, removed) = sanitize(vec![row], &[Field::Gebiet]);
        assert!(kept.is_empty());
        assert_eq!(removed, 1);
    }
}
