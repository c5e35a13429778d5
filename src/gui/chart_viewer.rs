//! Chart Viewer Widget
//! Central panel: KPI metric strip plus a responsive grid of chart cards.

use crate::charts::{ChartContent, ChartData, ChartPlotter};
use crate::stats::Kpis;
use egui::{Color32, RichText, ScrollArea};

/// Chart card configuration
const CHART_SPACING: f32 = 15.0;
const CARD_HEIGHT: f32 = 430.0;
const CHART_WIDTH: f32 = 640.0;
const PLOT_HEIGHT: f32 = 280.0;

/// Scrollable chart display area with responsive multi-column layout.
pub struct ChartViewer {
    pub charts: Vec<ChartData>,
    pub kpis: Kpis,
    has_data: bool,
}

impl Default for ChartViewer {
    fn default() -> Self {
        Self {
            charts: Vec::new(),
            kpis: Kpis::default(),
            has_data: false,
        }
    }
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all charts
    pub fn clear(&mut self) {
        self.charts.clear();
        self.kpis = Kpis::default();
        self.has_data = false;
    }

    /// Replace chart data, significant cards first.
    pub fn set_data(&mut self, mut charts: Vec<ChartData>, kpis: Kpis) {
        charts.sort_by_key(|c| !c.is_significant());
        self.charts = charts;
        self.kpis = kpis;
        self.has_data = true;
    }

    /// Draw the KPI strip and the chart grid.
    pub fn show(&mut self, _ctx: &egui::Context, ui: &mut egui::Ui) {
        if !self.has_data {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No Data - load a CSV to begin").size(20.0));
            });
            return;
        }

        Self::draw_kpi_strip(ui, &self.kpis);
        ui.add_space(CHART_SPACING);

        if self.charts.is_empty() {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No rows match the current filters").size(16.0));
            });
            return;
        }

        // Calculate how many columns fit in available width
        let avail_width = ui.available_width();
        let card_total_width = CHART_WIDTH + CHART_SPACING;
        let num_columns = ((avail_width / card_total_width).floor() as usize).max(1);

        let total_items = self.charts.len();
        let total_rows = total_items.div_ceil(num_columns);
        let row_height = CARD_HEIGHT + CHART_SPACING;

        let charts = self.charts.clone();

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show_rows(ui, row_height, total_rows, |ui, row_range| {
                for row in row_range {
                    ui.horizontal(|ui| {
                        for col in 0..num_columns {
                            let idx = row * num_columns + col;
                            if let Some(chart) = charts.get(idx) {
                                Self::draw_chart_card(ui, chart);
                                ui.add_space(CHART_SPACING);
                            }
                        }
                    });
                    ui.add_space(CHART_SPACING);
                }
            });
    }

    /// The four headline metrics as fixed-width metric cards.
    fn draw_kpi_strip(ui: &mut egui::Ui, kpis: &Kpis) {
        let metrics: [(&str, String); 4] = [
            ("Total Students", kpis.total_students.to_string()),
            ("Avg. Exam Score", format_metric(kpis.avg_exam_score)),
            ("Avg. Sleep Hours", format_metric(kpis.avg_sleep_hours)),
            ("Avg. Study Hours", format_metric(kpis.avg_study_hours)),
        ];

        ui.horizontal(|ui| {
            for (label, value) in metrics {
                egui::Frame::none()
                    .fill(ui.visuals().widgets.noninteractive.bg_fill)
                    .rounding(8.0)
                    .inner_margin(12.0)
                    .show(ui, |ui| {
                        ui.set_width(150.0);
                        ui.vertical_centered(|ui| {
                            ui.label(RichText::new(label).size(12.0).color(Color32::GRAY));
                            ui.label(RichText::new(value).size(22.0).strong());
                        });
                    });
                ui.add_space(10.0);
            }
        });
    }

    /// Draw a single chart card with fixed width
    fn draw_chart_card(ui: &mut egui::Ui, chart: &ChartData) {
        let is_sig = chart.is_significant();
        let border_color = if is_sig {
            Color32::from_rgb(220, 53, 69) // Red for significant
        } else {
            Color32::from_rgb(70, 90, 110)
        };

        let card_width = CHART_WIDTH - 20.0;

        egui::Frame::none()
            .rounding(8.0)
            .stroke(egui::Stroke::new(2.0, border_color))
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.set_width(card_width);

                ui.vertical(|ui| {
                    let icon = if is_sig { "⚠" } else { "📈" };
                    ui.label(
                        RichText::new(format!("{} {}", icon, chart.title))
                            .size(16.0)
                            .strong()
                            .color(if is_sig {
                                border_color
                            } else {
                                ui.visuals().text_color()
                            }),
                    );

                    ui.add_space(8.0);
                    ChartPlotter::draw_chart(ui, chart, PLOT_HEIGHT);
                    ui.add_space(6.0);
                    ChartPlotter::draw_annotation(ui, chart);

                    if let ChartContent::Box { summaries, .. } = &chart.content {
                        ui.add_space(6.0);
                        ChartPlotter::draw_summary_table(ui, &chart.id, summaries);
                    }
                });
            });
    }
}

fn format_metric(value: Option<f64>) -> String {
    match value {
        Some(v) if !v.is_nan() => format!("{:.1}", v),
        _ => "N/A".to_string(),
    }
}
