use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::models::{Ascent, Peak, Route};

pub type RawRow = Map<String, Value>;
pub type RawTable = Vec<RawRow>;

/// How a column's values are coerced into the canonical relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coerce {
    Integer,
    Float,
    Boolean,
    Text,
}

/// Makes sure `column` exists in every row of `table`: absent or
/// un-coercible values are replaced with `default`. Never errors.
///
/// Returns whether the column was present in the input at all, so later
/// stages know which predicates and tooltip parts apply.
pub fn ensure(table: &mut RawTable, column: &str, default: &Value, coerce: Coerce) -> bool {
    let present = table.iter().any(|row| row.contains_key(column));

    for row in table.iter_mut() {
        let coerced = row.get(column).and_then(|v| coerce_value(v, coerce));
        row.insert(column.to_string(), coerced.unwrap_or_else(|| default.clone()));
    }

    if !present && !table.is_empty() {
        tracing::warn!(column, "column missing from source table, filled with default");
    }

    present
}

fn coerce_value(value: &Value, coerce: Coerce) -> Option<Value> {
    match coerce {
        Coerce::Integer => match value {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)).map(Value::from),
            Value::String(s) => s.trim().parse::<i64>().ok().map(Value::from),
            _ => None,
        },
        Coerce::Float => match value {
            Value::Number(n) => n.as_f64().filter(|f| f.is_finite()).map(Value::from),
            Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()).map(Value::from),
            _ => None,
        },
        Coerce::Boolean => match value {
            Value::Bool(b) => Some(Value::Bool(*b)),
            Value::Number(n) => n.as_i64().map(|i| Value::Bool(i != 0)),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "t" | "1" => Some(Value::Bool(true)),
                "false" | "f" | "0" => Some(Value::Bool(false)),
                _ => None,
            },
            _ => None,
        },
        Coerce::Text => match value {
            Value::String(s) => Some(Value::String(s.clone())),
            Value::Number(n) => Some(Value::String(n.to_string())),
            Value::Bool(b) => Some(Value::String(b.to_string())),
            _ => None,
        },
    }
}

/// Which optional columns the source tables actually carried. Predicates
/// and tooltip parts backed by an absent column are skipped downstream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnPresence {
    pub gebiet: bool,
    pub hoehe: bool,
    pub route_stern: bool,
    pub route_bewertung: bool,
    pub ascent_bewertung: bool,
    pub ascent_kommentar: bool,
    pub ascent_date: bool,
}

/// An immutable in-memory copy of the three source tables, canonicalized
/// once at pipeline entry. Every later stage may assume fully populated
/// records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub peaks: Vec<Peak>,
    pub routes: Vec<Route>,
    pub ascents: Vec<Ascent>,
    pub presence: ColumnPresence,
}

impl Snapshot {
    /// Runs the schema guard over the raw tables and builds typed records.
    /// Rows without a usable primary key are dropped (they can never join).
    pub fn from_raw(mut peaks: RawTable, mut routes: RawTable, mut ascents: RawTable) -> Self {
        let mut presence = ColumnPresence::default();

        ensure(&mut peaks, "peak_id", &Value::Null, Coerce::Integer);
        ensure(&mut peaks, "gipfel", &Value::String(String::new()), Coerce::Text);
        presence.gebiet = ensure(&mut peaks, "gebiet", &Value::String(String::new()), Coerce::Text);
        presence.hoehe = ensure(&mut peaks, "hoehe", &Value::from(0.0), Coerce::Float);
        ensure(&mut peaks, "lat", &Value::Null, Coerce::Float);
        ensure(&mut peaks, "lon", &Value::Null, Coerce::Float);

        ensure(&mut routes, "route_id", &Value::Null, Coerce::Integer);
        ensure(&mut routes, "peak_id", &Value::Null, Coerce::Integer);
        ensure(&mut routes, "name", &Value::String(String::new()), Coerce::Text);
        presence.route_bewertung = ensure(&mut routes, "bewertung", &Value::from(0), Coerce::Integer);
        presence.route_stern = ensure(&mut routes, "stern", &Value::Bool(false), Coerce::Boolean);

        ensure(&mut ascents, "ascent_id", &Value::Null, Coerce::Integer);
        ensure(&mut ascents, "route_id", &Value::Null, Coerce::Integer);
        presence.ascent_bewertung = ensure(&mut ascents, "bewertung", &Value::Null, Coerce::Integer);
        presence.ascent_kommentar =
            ensure(&mut ascents, "kommentar", &Value::Null, Coerce::Text);
        presence.ascent_date = ensure(&mut ascents, "date", &Value::Null, Coerce::Text);

        let dropped_peaks = peaks.iter().filter(|r| key(r, "peak_id").is_none()).count();
        let dropped_routes = routes
            .iter()
            .filter(|r| key(r, "route_id").is_none() || key(r, "peak_id").is_none())
            .count();
        let dropped_ascents = ascents
            .iter()
            .filter(|r| key(r, "ascent_id").is_none() || key(r, "route_id").is_none())
            .count();
        if dropped_peaks + dropped_routes + dropped_ascents > 0 {
            tracing::debug!(
                dropped_peaks,
                dropped_routes,
                dropped_ascents,
                "rows without usable keys dropped during canonicalization"
            );
        }

        Snapshot {
            peaks: peaks.iter().filter_map(peak_from_row).collect(),
            routes: routes.iter().filter_map(route_from_row).collect(),
            ascents: ascents.iter().filter_map(ascent_from_row).collect(),
            presence,
        }
    }

    /// `[min(hoehe), max(hoehe)]` over all peaks, the bounds of the height
    /// filter control. `None` when there are no peaks with a finite height.
    pub fn height_bounds(&self) -> Option<(f64, f64)> {
        let mut bounds: Option<(f64, f64)> = None;
        for peak in &self.peaks {
            if !peak.hoehe.is_finite() {
                continue;
            }
            bounds = Some(match bounds {
                None => (peak.hoehe, peak.hoehe),
                Some((lo, hi)) => (lo.min(peak.hoehe), hi.max(peak.hoehe)),
            });
        }
        bounds
    }

    /// Distinct area names in sorted order, for the area selection control.
    pub fn areas(&self) -> Vec<String> {
        let mut areas: Vec<String> = self
            .peaks
            .iter()
            .map(|p| p.gebiet.clone())
            .filter(|g| !g.is_empty())
            .collect();
        areas.sort();
        areas.dedup();
        areas
    }
}

fn key(row: &RawRow, column: &str) -> Option<i64> {
    row.get(column).and_then(Value::as_i64)
}

fn float_or_nan(row: &RawRow, column: &str) -> f64 {
    row.get(column).and_then(Value::as_f64).unwrap_or(f64::NAN)
}

fn text(row: &RawRow, column: &str) -> String {
    row.get(column)
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string()
}

fn peak_from_row(row: &RawRow) -> Option<Peak> {
    Some(Peak {
        peak_id: key(row, "peak_id")?,
        gipfel: text(row, "gipfel"),
        gebiet: text(row, "gebiet"),
        hoehe: float_or_nan(row, "hoehe"),
        lat: float_or_nan(row, "lat"),
        lon: float_or_nan(row, "lon"),
    })
}

fn route_from_row(row: &RawRow) -> Option<Route> {
    Some(Route {
        route_id: key(row, "route_id")?,
        peak_id: key(row, "peak_id")?,
        name: text(row, "name"),
        bewertung: key(row, "bewertung").unwrap_or(0),
        stern: row.get("stern").and_then(Value::as_bool).unwrap_or(false),
    })
}

fn ascent_from_row(row: &RawRow) -> Option<Ascent> {
    let kommentar = match text(row, "kommentar") {
        s if s.is_empty() => None,
        s => Some(s),
    };
    let date = row
        .get("date")
        .and_then(Value::as_str)
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok());
    Some(Ascent {
        ascent_id: key(row, "ascent_id")?,
        route_id: key(row, "route_id")?,
        date,
        bewertung: key(row, "bewertung"),
        kommentar,
    })
}
