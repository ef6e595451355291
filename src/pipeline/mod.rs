//! The one fetch-merge-filter-render pipeline behind every page, run as
//! a pure one-shot transformation over an immutable [`Snapshot`]:
//! schema guard -> join -> aggregate -> filter -> sanitize -> project.

pub mod aggregate;
pub mod filter;
pub mod join;
pub mod marker;
pub mod sanitize;
pub mod schema;

pub use join::JoinStats;
pub use marker::{Marker, MarkerColor, MarkerStyle};
pub use schema::{ColumnPresence, RawRow, RawTable, Snapshot};

use crate::models::{FilterOptions, ViewRow};
use filter::ColumnSupport;
use sanitize::Field;

/// Aggregate mode shows one marker per peak; expand mode one record per
/// logged climb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinMode {
    Aggregate,
    Expand,
}

/// A column of the tabular display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableColumn {
    Gipfel,
    Route,
    Gebiet,
    Hoehe,
    Routen,
    Bewertung,
    Stern,
    Bestiegen,
    Kommentar,
    Datum,
}

impl TableColumn {
    pub fn title(&self) -> &'static str {
        match self {
            TableColumn::Gipfel => "Gipfel",
            TableColumn::Route => "Route",
            TableColumn::Gebiet => "Gebiet",
            TableColumn::Hoehe => "Höhe",
            TableColumn::Routen => "Routen",
            TableColumn::Bewertung => "Bewertung",
            TableColumn::Stern => "Stern",
            TableColumn::Bestiegen => "Bestiegen",
            TableColumn::Kommentar => "Kommentar",
            TableColumn::Datum => "Datum",
        }
    }

    fn cell<R: ViewRow>(&self, row: &R) -> String {
        match self {
            TableColumn::Gipfel => row.name().to_string(),
            TableColumn::Route => row.route_name().to_string(),
            TableColumn::Gebiet => row.gebiet().to_string(),
            TableColumn::Hoehe => format!("{}", row.hoehe() as i64),
            TableColumn::Routen => row.route_count().to_string(),
            TableColumn::Bewertung => row
                .rating()
                .map(|r| r.to_string())
                .unwrap_or_else(|| "-".to_string()),
            TableColumn::Stern => if row.has_star() { "★" } else { "" }.to_string(),
            TableColumn::Bestiegen => if row.climbed() { "ja" } else { "nein" }.to_string(),
            TableColumn::Kommentar => row.kommentar().to_string(),
            TableColumn::Datum => row
                .date()
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
        }
    }
}

/// What distinguishes one page from another: the join strategy, marker
/// styling and the table projection. Everything else is shared.
#[derive(Debug, Clone, PartialEq)]
pub struct PageConfig {
    pub join_mode: JoinMode,
    pub style: MarkerStyle,
    pub table_columns: Vec<TableColumn>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableView {
    pub header: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
}

/// Everything a page needs to render: markers with a map center, the
/// tabular projection, per-row tooltips for the detail panel, and the
/// diagnostic drop counts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageOutput {
    pub markers: Vec<Marker>,
    pub center: Option<(f64, f64)>,
    pub table: TableView,
    pub tooltips: Vec<String>,
    pub join_stats: JoinStats,
    pub sanitized_out: usize,
}

impl PageOutput {
    fn default_with_header(page: &PageConfig) -> Self {
        PageOutput {
            table: TableView {
                header: page.table_columns.iter().map(TableColumn::title).collect(),
                rows: Vec::new(),
            },
            ..PageOutput::default()
        }
    }
}

pub fn run(snapshot: &Snapshot, page: &PageConfig, options: &FilterOptions) -> PageOutput {
    match page.join_mode {
        JoinMode::Aggregate => {
            let (rows, stats) = join::join_aggregate(snapshot);
            finish(rows, stats, snapshot, page, options)
        }
        JoinMode::Expand => {
            let (rows, stats) = join::join_expand(snapshot);
            finish(rows, stats, snapshot, page, options)
        }
    }
}

fn finish<R: ViewRow>(
    rows: Vec<R>,
    join_stats: JoinStats,
    snapshot: &Snapshot,
    page: &PageConfig,
    options: &FilterOptions,
) -> PageOutput {
    let support = ColumnSupport::for_mode(page.join_mode, &snapshot.presence);
    let rows = filter::apply(rows, &options.predicates(), &support);

    let mut required = vec![Field::Lat, Field::Lon, Field::Hoehe, Field::Name];
    if snapshot.presence.gebiet {
        required.push(Field::Gebiet);
    }
    let (rows, sanitized_out) = sanitize::sanitize(rows, &required);

    let mut output = PageOutput::default_with_header(page);
    output.join_stats = join_stats;
    output.sanitized_out = sanitized_out;
    output.markers = rows
        .iter()
        .filter_map(|row| marker::project(row, &page.style, &snapshot.presence))
        .collect();
    output.center = marker::map_center(&rows);
    output.tooltips = rows
        .iter()
        .map(|row| marker::tooltip(row, &snapshot.presence))
        .collect();
    output.table.rows = rows
        .iter()
        .map(|row| page.table_columns.iter().map(|c| c.cell(row)).collect())
        .collect();
    output
}
