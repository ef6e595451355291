use crate::config::Config;
use crate::db::SupabaseClient;
use crate::error::Result;
use crate::models::{AreaFilter, FilterOptions};
use crate::pipeline::{
    self, JoinMode, MarkerColor, MarkerStyle, PageConfig, PageOutput, Snapshot, TableColumn,
};
use crate::stats::{self, AreaStats};
use crate::tui::AppAction;

const HEIGHT_STEP: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    PeakMap,
    AscentLog,
    AreaStats,
}

impl View {
    pub fn label(&self) -> &'static str {
        match self {
            View::PeakMap => "Gipfel",
            View::AscentLog => "Begehungen",
            View::AreaStats => "Gebiete",
        }
    }

    pub fn cycle(&self) -> Self {
        match self {
            View::PeakMap => View::AscentLog,
            View::AscentLog => View::AreaStats,
            View::AreaStats => View::PeakMap,
        }
    }
}

pub struct App {
    // Data
    pub snapshot: Snapshot,
    pub output: PageOutput,
    pub stats: Vec<AreaStats>,

    // UI state
    pub view: View,
    pub options: FilterOptions,
    pub selected_index: usize,
    pub show_help: bool,
    pub is_refreshing: bool,

    // Derived from the snapshot, for the filter controls
    pub areas: Vec<String>,
    pub height_bounds: Option<(f64, f64)>,

    marker_style: MarkerStyle,
    client: SupabaseClient,
}

impl App {
    pub async fn new(config: &Config) -> Result<Self> {
        let (url, key) = config.credentials()?;
        let client = SupabaseClient::new(url, key)?;
        let snapshot = client.fetch_snapshot().await?;

        let marker_style = MarkerStyle {
            base: config.marker_base,
            scale: config.marker_scale,
            default_color: MarkerColor::Red,
        };

        let mut app = Self {
            snapshot,
            output: PageOutput::default(),
            stats: Vec::new(),
            view: View::PeakMap,
            options: FilterOptions::default(),
            selected_index: 0,
            show_help: false,
            is_refreshing: false,
            areas: Vec::new(),
            height_bounds: None,
            marker_style,
            client,
        };
        app.on_snapshot_changed();
        Ok(app)
    }

    fn page_config(&self) -> PageConfig {
        match self.view {
            View::PeakMap | View::AreaStats => PageConfig {
                join_mode: JoinMode::Aggregate,
                style: self.marker_style,
                table_columns: vec![
                    TableColumn::Gipfel,
                    TableColumn::Gebiet,
                    TableColumn::Hoehe,
                    TableColumn::Routen,
                    TableColumn::Bewertung,
                    TableColumn::Stern,
                    TableColumn::Bestiegen,
                ],
            },
            View::AscentLog => PageConfig {
                join_mode: JoinMode::Expand,
                style: MarkerStyle {
                    default_color: MarkerColor::Blue,
                    ..self.marker_style
                },
                table_columns: vec![
                    TableColumn::Gipfel,
                    TableColumn::Route,
                    TableColumn::Gebiet,
                    TableColumn::Datum,
                    TableColumn::Bewertung,
                    TableColumn::Stern,
                    TableColumn::Kommentar,
                ],
            },
        }
    }

    fn on_snapshot_changed(&mut self) {
        self.areas = self.snapshot.areas();
        self.height_bounds = self.snapshot.height_bounds();
        self.recompute();
    }

    /// Re-runs the pipeline against the cached snapshot. Cheap by design:
    /// every stage is pure, so UI interaction never re-fetches.
    pub fn recompute(&mut self) {
        self.output = pipeline::run(&self.snapshot, &self.page_config(), &self.options);
        self.stats = stats::area_stats(&self.snapshot);

        let len = self.output.table.rows.len();
        if len == 0 {
            self.selected_index = 0;
        } else if self.selected_index >= len {
            self.selected_index = len - 1;
        }
    }

    /// The effective inclusive height bound shown in the filter bar.
    pub fn effective_max_height(&self) -> Option<f64> {
        self.options
            .max_height
            .or(self.height_bounds.map(|(_, hi)| hi))
    }

    pub async fn handle_action(&mut self, action: AppAction) -> Result<bool> {
        match action {
            AppAction::Quit => return Ok(true),

            AppAction::MoveUp => {
                if self.selected_index > 0 {
                    self.selected_index -= 1;
                }
            }

            AppAction::MoveDown => {
                let len = self.output.table.rows.len();
                if len > 0 && self.selected_index < len - 1 {
                    self.selected_index += 1;
                }
            }

            AppAction::MoveToTop => {
                self.selected_index = 0;
            }

            AppAction::MoveToBottom => {
                let len = self.output.table.rows.len();
                if len > 0 {
                    self.selected_index = len - 1;
                }
            }

            AppAction::NextView => {
                self.view = self.view.cycle();
                self.selected_index = 0;
                self.recompute();
            }

            AppAction::CycleArea => {
                self.cycle_area();
                self.recompute();
            }

            AppAction::CycleDifficulty => {
                self.options.difficulty = self.options.difficulty.cycle();
                self.recompute();
            }

            AppAction::CycleStar => {
                self.options.star = self.options.star.cycle();
                self.recompute();
            }

            AppAction::ToggleClimbedOnly => {
                self.options.climbed_only = !self.options.climbed_only;
                self.recompute();
            }

            AppAction::HeightDown => {
                self.adjust_height(-HEIGHT_STEP);
                self.recompute();
            }

            AppAction::HeightUp => {
                self.adjust_height(HEIGHT_STEP);
                self.recompute();
            }

            AppAction::ResetFilters => {
                self.options = FilterOptions::default();
                self.recompute();
            }

            AppAction::RefreshData => {
                self.refresh().await?;
            }

            AppAction::ShowHelp => {
                self.show_help = true;
            }

            AppAction::HideHelp => {
                self.show_help = false;
            }
        }

        Ok(false)
    }

    fn cycle_area(&mut self) {
        if self.areas.is_empty() {
            self.options.area = AreaFilter::All;
            return;
        }
        self.options.area = match &self.options.area {
            AreaFilter::All => AreaFilter::Only(self.areas[0].clone()),
            AreaFilter::Only(current) => match self.areas.iter().position(|a| a == current) {
                Some(i) if i + 1 < self.areas.len() => AreaFilter::Only(self.areas[i + 1].clone()),
                _ => AreaFilter::All,
            },
        };
    }

    fn adjust_height(&mut self, delta: f64) {
        let Some((lo, hi)) = self.height_bounds else {
            return;
        };
        let current = self.options.max_height.unwrap_or(hi);
        let next = (current + delta).clamp(lo, hi);
        // Back at the top of the range the bound is a no-op again
        self.options.max_height = if next >= hi { None } else { Some(next) };
    }

    pub async fn refresh(&mut self) -> Result<()> {
        self.is_refreshing = true;
        let result = self.client.fetch_snapshot().await;
        self.is_refreshing = false;
        self.snapshot = result?;
        self.on_snapshot_changed();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Peak, Route};
    use crate::pipeline::ColumnPresence;

    fn app() -> App {
        let snapshot = Snapshot {
            peaks: vec![
                Peak {
                    peak_id: 1,
                    gipfel: "A".to_string(),
                    gebiet: "Rathen".to_string(),
                    hoehe: 20.0,
                    lat: 50.9,
                    lon: 14.0,
                },
                Peak {
                    peak_id: 2,
                    gipfel: "B".to_string(),
                    gebiet: "Zschand".to_string(),
                    hoehe: 40.0,
                    lat: 50.8,
                    lon: 14.1,
                },
            ],
            routes: vec![Route {
                route_id: 10,
                peak_id: 1,
                name: "Alter Weg".to_string(),
                bewertung: 2,
                stern: false,
            }],
            ascents: Vec::new(),
            presence: ColumnPresence {
                gebiet: true,
                hoehe: true,
                ..ColumnPresence::default()
            },
        };
        let mut app = App {
            snapshot,
            output: PageOutput::default(),
            stats: Vec::new(),
            view: View::PeakMap,
            options: FilterOptions::default(),
            selected_index: 0,
            show_help: false,
            is_refreshing: false,
            areas: Vec::new(),
            height_bounds: None,
            marker_style: MarkerStyle::default(),
            client: SupabaseClient::new("https://example.supabase.co", "anon").unwrap(),
        };
        app.on_snapshot_changed();
        app
    }

    #[test]
    fn quit_action_signals_exit() {
        let mut app = app();
        let quit = tokio_test::block_on(app.handle_action(AppAction::Quit)).unwrap();
        assert!(quit);
    }

    #[test]
    fn cycling_the_area_walks_all_areas_then_back_to_all() {
        let mut app = app();
        tokio_test::block_on(app.handle_action(AppAction::CycleArea)).unwrap();
        assert_eq!(app.options.area, AreaFilter::Only("Rathen".to_string()));
        assert_eq!(app.output.table.rows.len(), 1);

        tokio_test::block_on(app.handle_action(AppAction::CycleArea)).unwrap();
        assert_eq!(app.options.area, AreaFilter::Only("Zschand".to_string()));

        tokio_test::block_on(app.handle_action(AppAction::CycleArea)).unwrap();
        assert_eq!(app.options.area, AreaFilter::All);
        assert_eq!(app.output.table.rows.len(), 2);
    }

    #[test]
    fn height_bound_steps_down_and_clears_at_the_top() {
        let mut app = app();
        assert_eq!(app.height_bounds, Some((20.0, 40.0)));
        assert_eq!(app.options.max_height, None);

        tokio_test::block_on(app.handle_action(AppAction::HeightDown)).unwrap();
        assert_eq!(app.options.max_height, Some(35.0));
        assert_eq!(app.output.table.rows.len(), 1);

        tokio_test::block_on(app.handle_action(AppAction::HeightUp)).unwrap();
        assert_eq!(app.options.max_height, None);
    }

    #[test]
    fn switching_views_swaps_the_table_projection() {
        let mut app = app();
        assert!(app.output.table.header.contains(&"Routen"));

        tokio_test::block_on(app.handle_action(AppAction::NextView)).unwrap();
        assert_eq!(app.view, View::AscentLog);
        assert!(app.output.table.header.contains(&"Datum"));
        // No ascents logged, so the expand view is empty
        assert!(app.output.table.rows.is_empty());
    }

    #[test]
    fn reset_clears_every_filter() {
        let mut app = app();
        tokio_test::block_on(app.handle_action(AppAction::CycleArea)).unwrap();
        tokio_test::block_on(app.handle_action(AppAction::ToggleClimbedOnly)).unwrap();
        tokio_test::block_on(app.handle_action(AppAction::ResetFilters)).unwrap();
        assert_eq!(app.options, FilterOptions::default());
        assert_eq!(app.output.table.rows.len(), 2);
    }
}
