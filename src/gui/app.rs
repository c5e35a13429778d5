//! HabitBoard Main Application
//! Main window with control panel and chart viewer, background loading
//! and recomputation.

use crate::charts::{build_chart_data, dashboard_catalogue, ChartData, ChartExporter};
use crate::config::AppConfig;
use crate::data::{apply_filters, schema, CategoricalFilter, CleaningReport, DataCleaner, DataLoader};
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction, FilterGroup};
use crate::stats::Kpis;
use egui::SidePanel;
use polars::prelude::*;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread;
use tracing::{error, info};

/// Columns offered as sidebar filters, with display labels.
const FILTER_COLUMNS: [(&str, &str); 2] = [
    (schema::GENDER, "Gender"),
    (schema::PART_TIME_JOB, "Part-Time Job"),
];

/// CSV load + clean result from background thread
enum LoadResult {
    Progress(String),
    Complete {
        df: DataFrame,
        report: CleaningReport,
        path: PathBuf,
    },
    Error(String),
}

/// Chart recomputation result from background thread
enum CalcResult {
    Complete {
        charts: Vec<ChartData>,
        kpis: Kpis,
        rows: usize,
    },
    Error(String),
}

/// Main application window.
pub struct HabitBoardApp {
    loader: DataLoader,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,
    config: AppConfig,

    // Async CSV loading
    load_rx: Option<Receiver<LoadResult>>,
    is_loading: bool,

    // Async chart recomputation
    calc_rx: Option<Receiver<CalcResult>>,
    is_calculating: bool,
    recalc_pending: bool,
}

impl HabitBoardApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let config = AppConfig::load();
        let mut app = Self {
            loader: DataLoader::new(),
            control_panel: ControlPanel::new(),
            chart_viewer: ChartViewer::new(),
            config,
            load_rx: None,
            is_loading: false,
            calc_rx: None,
            is_calculating: false,
            recalc_pending: false,
        };

        // Reopen the previous session's dataset if it is still there
        if let Some(path) = app.config.last_csv.clone() {
            if path.exists() {
                app.start_load(path);
            }
        }
        app
    }

    /// Handle CSV file selection
    fn handle_browse_csv(&mut self) {
        if self.is_loading {
            return; // Already loading
        }

        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .pick_file()
        {
            self.start_load(path);
        }
    }

    /// Load and clean the CSV in a background thread
    fn start_load(&mut self, path: PathBuf) {
        self.chart_viewer.clear();
        self.control_panel.csv_path = Some(path.clone());
        self.control_panel.set_progress(0.0, "Loading CSV file...");
        self.is_loading = true;

        let (tx, rx) = channel();
        self.load_rx = Some(rx);

        thread::spawn(move || {
            Self::run_load(tx, path);
        });
    }

    /// Runs on the background thread: read, then clean.
    fn run_load(tx: Sender<LoadResult>, path: PathBuf) {
        let _ = tx.send(LoadResult::Progress("Reading CSV file...".to_string()));

        let df = match DataLoader::read_csv(&path.to_string_lossy()) {
            Ok(df) => df,
            Err(e) => {
                let _ = tx.send(LoadResult::Error(e.to_string()));
                return;
            }
        };

        let _ = tx.send(LoadResult::Progress("Cleaning data...".to_string()));

        match DataCleaner::clean(df) {
            Ok((df, report)) => {
                let _ = tx.send(LoadResult::Complete { df, report, path });
            }
            Err(e) => {
                let _ = tx.send(LoadResult::Error(e.to_string()));
            }
        }
    }

    /// Check for CSV loading results
    fn check_load_results(&mut self) {
        let rx = self.load_rx.take();
        if let Some(rx) = rx {
            let mut should_keep_receiver = true;

            while let Ok(result) = rx.try_recv() {
                match result {
                    LoadResult::Progress(status) => {
                        self.control_panel.set_progress(20.0, &status);
                    }
                    LoadResult::Complete { df, report, path } => {
                        info!(rows = df.height(), path = %path.display(), "dataset ready");
                        self.rebuild_filter_groups(&df);
                        self.loader.set_dataframe(df);

                        self.control_panel.cleaning_summary = Some(report.summary());
                        self.control_panel.cleaning_steps = report.steps.clone();
                        self.control_panel
                            .set_progress(50.0, &format!("Cleaned: {}", report.summary()));

                        self.config.last_csv = Some(path);
                        self.config.save();

                        self.is_loading = false;
                        should_keep_receiver = false;
                        self.start_calculation();
                    }
                    LoadResult::Error(error) => {
                        error!(%error, "CSV load failed");
                        self.control_panel
                            .set_progress(0.0, &format!("Error: {}", error));
                        self.is_loading = false;
                        should_keep_receiver = false;
                    }
                }
            }

            if should_keep_receiver {
                self.load_rx = Some(rx);
            }
        }
    }

    /// Build sidebar filter blocks from the cleaned frame, restoring any
    /// saved selections.
    fn rebuild_filter_groups(&mut self, df: &DataFrame) {
        let mut groups = Vec::new();
        for (column, label) in FILTER_COLUMNS {
            let options = DataLoader::unique_values(df, column);
            if options.is_empty() {
                continue;
            }
            let saved = self.config.filters.get(column).map(|v| v.as_slice());
            groups.push(FilterGroup::new(column, label, options, saved));
        }
        self.control_panel.set_filter_groups(groups);
    }

    /// Persist filter selections, then recompute.
    fn handle_filters_changed(&mut self) {
        for group in &self.control_panel.filter_groups {
            self.config
                .filters
                .insert(group.column.clone(), group.selected_values());
        }
        self.config.save();
        self.start_calculation();
    }

    /// Recompute KPIs and charts in a background thread
    fn start_calculation(&mut self) {
        let Some(df) = self.loader.get_dataframe().cloned() else {
            return;
        };
        if self.is_calculating {
            // A recompute is already running; redo it when it finishes so
            // the result reflects the latest selection.
            self.recalc_pending = true;
            return;
        }

        let filters: Vec<CategoricalFilter> = self.control_panel.active_filters();

        let (tx, rx) = channel();
        self.calc_rx = Some(rx);
        self.is_calculating = true;
        self.control_panel.set_progress(60.0, "Computing charts...");

        thread::spawn(move || {
            Self::run_calculation(tx, df, filters);
        });
    }

    /// Runs on the background thread: filter, then aggregate.
    fn run_calculation(tx: Sender<CalcResult>, df: DataFrame, filters: Vec<CategoricalFilter>) {
        let filtered = match apply_filters(&df, &filters) {
            Ok(filtered) => filtered,
            Err(e) => {
                let _ = tx.send(CalcResult::Error(e.to_string()));
                return;
            }
        };

        let kpis = Kpis::compute(&filtered);
        let charts = build_chart_data(&filtered, &dashboard_catalogue());

        let _ = tx.send(CalcResult::Complete {
            charts,
            kpis,
            rows: filtered.height(),
        });
    }

    /// Check for recomputation results
    fn check_calculation_results(&mut self) {
        let rx = self.calc_rx.take();
        if let Some(rx) = rx {
            let mut should_keep_receiver = true;

            while let Ok(result) = rx.try_recv() {
                match result {
                    CalcResult::Complete { charts, kpis, rows } => {
                        let count = charts.len();
                        self.chart_viewer.set_data(charts, kpis);
                        self.control_panel.export_enabled = count > 0;
                        self.control_panel.set_progress(
                            100.0,
                            &format!("{} charts ready ({} students)", count, rows),
                        );
                        self.is_calculating = false;
                        should_keep_receiver = false;
                    }
                    CalcResult::Error(error) => {
                        error!(%error, "chart computation failed");
                        self.control_panel
                            .set_progress(0.0, &format!("Error: {}", error));
                        self.is_calculating = false;
                        should_keep_receiver = false;
                    }
                }
            }

            if should_keep_receiver {
                self.calc_rx = Some(rx);
            } else if self.recalc_pending {
                self.recalc_pending = false;
                self.start_calculation();
            }
        }
    }

    /// Render the current charts to PNGs in a user-chosen directory.
    fn handle_export_charts(&mut self) {
        if self.chart_viewer.charts.is_empty() {
            self.control_panel.set_progress(0.0, "No charts to export");
            return;
        }

        let Some(dir) = rfd::FileDialog::new().pick_folder() else {
            return; // User cancelled
        };

        self.control_panel.set_progress(10.0, "Rendering charts...");

        match ChartExporter::export_all(&self.chart_viewer.charts, &dir) {
            Ok(written) => {
                info!(count = written.len(), dir = %dir.display(), "charts exported");
                self.control_panel
                    .set_progress(100.0, &format!("Exported {} charts", written.len()));
                let _ = open::that(&dir);
            }
            Err(e) => {
                error!(error = %e, "chart export failed");
                self.control_panel
                    .set_progress(0.0, &format!("Error: {}", e));
            }
        }
    }
}

impl eframe::App for HabitBoardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Check for background results
        self.check_load_results();
        self.check_calculation_results();

        // Request repaint while loading or calculating
        if self.is_loading || self.is_calculating {
            ctx.request_repaint();
        }

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(300.0)
            .max_width(350.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let action = self.control_panel.show(ui);

                    match action {
                        ControlPanelAction::BrowseCsv => self.handle_browse_csv(),
                        ControlPanelAction::FiltersChanged => self.handle_filters_changed(),
                        ControlPanelAction::ExportCharts => self.handle_export_charts(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Chart Viewer
        egui::CentralPanel::default().show(ctx, |ui| {
            self.chart_viewer.show(ctx, ui);
        });
    }
}
