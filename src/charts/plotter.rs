//! Chart Plotter Module
//! Creates interactive visualizations using egui_plot.

use crate::charts::{ChartContent, ChartData};
use crate::stats::SummaryStats;
use egui::{Color32, RichText};
use egui_plot::{Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Line, Plot, PlotPoints, Points};
use std::collections::HashMap;

/// Color palette for group series (genders, categories)
pub const PALETTE: [Color32; 10] = [
    Color32::from_rgb(52, 152, 219),  // Blue
    Color32::from_rgb(231, 76, 60),   // Red
    Color32::from_rgb(46, 204, 113),  // Green
    Color32::from_rgb(155, 89, 182),  // Purple
    Color32::from_rgb(243, 156, 18),  // Orange
    Color32::from_rgb(26, 188, 156),  // Teal
    Color32::from_rgb(233, 30, 99),   // Pink
    Color32::from_rgb(0, 188, 212),   // Cyan
    Color32::from_rgb(255, 87, 34),   // Deep Orange
    Color32::from_rgb(121, 85, 72),   // Brown
];

const FIT_LINE_COLOR: Color32 = Color32::from_rgb(90, 90, 90);

/// Creates dashboard visualizations using egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Color for the i-th series of a chart.
    pub fn series_color(index: usize) -> Color32 {
        PALETTE[index % PALETTE.len()]
    }

    /// Draw the plot area of a chart card.
    pub fn draw_chart(ui: &mut egui::Ui, chart: &ChartData, height: f32) {
        match &chart.content {
            ChartContent::Histogram {
                edges,
                series,
                x_label,
            } => Self::draw_histogram(ui, &chart.id, edges, series, x_label, height),
            ChartContent::Scatter {
                series,
                fit,
                x_label,
                y_label,
                ..
            } => Self::draw_scatter(ui, &chart.id, series, *fit, x_label, y_label, height),
            ChartContent::Box {
                buckets,
                x_label,
                y_label,
                ..
            } => Self::draw_box(ui, &chart.id, buckets, x_label, y_label, height),
            ChartContent::Bar {
                bars,
                x_label,
                y_label,
            } => Self::draw_bar(ui, &chart.id, bars, x_label, y_label, height),
        }
    }

    /// Grouped histogram: per-group bars side by side inside each bin.
    fn draw_histogram(
        ui: &mut egui::Ui,
        id: &str,
        edges: &[f64],
        series: &[(String, Vec<usize>)],
        x_label: &str,
        height: f32,
    ) {
        if edges.len() < 2 || series.is_empty() {
            ui.label(RichText::new("No data").color(Color32::GRAY));
            return;
        }

        let bin_width = edges[1] - edges[0];
        let n_groups = series.len() as f64;
        let bar_width = bin_width / (n_groups + 0.5);

        Plot::new(format!("hist_{}", id))
            .height(height)
            .allow_scroll(false)
            .x_axis_label(x_label.to_string())
            .y_axis_label("count")
            .show(ui, |plot_ui| {
                for (gi, (group, counts)) in series.iter().enumerate() {
                    let color = Self::series_color(gi);
                    let bars: Vec<Bar> = counts
                        .iter()
                        .enumerate()
                        .map(|(bi, &count)| {
                            let bin_start = edges[bi];
                            let x = bin_start + bar_width * (gi as f64 + 0.5);
                            Bar::new(x, count as f64).width(bar_width * 0.95)
                        })
                        .collect();

                    plot_ui.bar_chart(
                        BarChart::new(bars)
                            .color(color)
                            .name(group),
                    );
                }
            });
    }

    /// Scatter with one point series per group and an overall fit line.
    fn draw_scatter(
        ui: &mut egui::Ui,
        id: &str,
        series: &[(String, Vec<[f64; 2]>)],
        fit: Option<(f64, f64)>,
        x_label: &str,
        y_label: &str,
        height: f32,
    ) {
        Plot::new(format!("scatter_{}", id))
            .height(height)
            .allow_scroll(false)
            .x_axis_label(x_label.to_string())
            .y_axis_label(y_label.to_string())
            .show(ui, |plot_ui| {
                let mut x_min = f64::INFINITY;
                let mut x_max = f64::NEG_INFINITY;

                for (gi, (group, points)) in series.iter().enumerate() {
                    for p in points {
                        x_min = x_min.min(p[0]);
                        x_max = x_max.max(p[0]);
                    }
                    let plot_points: PlotPoints = points.iter().copied().collect();
                    plot_ui.points(
                        Points::new(plot_points)
                            .radius(3.0)
                            .color(Self::series_color(gi))
                            .name(group),
                    );
                }

                if let (Some((slope, intercept)), true) = (fit, x_min.is_finite()) {
                    let line: PlotPoints = [
                        [x_min, slope * x_min + intercept],
                        [x_max, slope * x_max + intercept],
                    ]
                    .into_iter()
                    .collect();
                    plot_ui.line(
                        Line::new(line)
                            .color(FIT_LINE_COLOR)
                            .width(1.5)
                            .name("Fit"),
                    );
                }
            });
    }

    /// Box plot per category with beeswarm point overlay.
    fn draw_box(
        ui: &mut egui::Ui,
        id: &str,
        buckets: &[(String, Vec<f64>)],
        x_label: &str,
        y_label: &str,
        height: f32,
    ) {
        let x_labels: Vec<String> = buckets.iter().map(|(name, _)| name.clone()).collect();

        Plot::new(format!("box_{}", id))
            .height(height)
            .allow_scroll(false)
            .x_axis_label(x_label.to_string())
            .y_axis_label(y_label.to_string())
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round() as usize;
                if (mark.value - idx as f64).abs() < 1e-6 && idx < x_labels.len() {
                    x_labels[idx].clone()
                } else {
                    String::new()
                }
            })
            .show(ui, |plot_ui| {
                for (i, (name, values)) in buckets.iter().enumerate() {
                    if values.is_empty() {
                        continue;
                    }
                    let color = Self::series_color(i);

                    let mut sorted = values.clone();
                    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

                    let n = sorted.len();
                    let q1 = sorted[n / 4];
                    let median = sorted[n / 2];
                    let q3 = sorted[(3 * n / 4).min(n - 1)];
                    let iqr = q3 - q1;
                    let whisker_low = sorted
                        .iter()
                        .copied()
                        .find(|&v| v >= q1 - 1.5 * iqr)
                        .unwrap_or(q1);
                    let whisker_high = sorted
                        .iter()
                        .rev()
                        .copied()
                        .find(|&v| v <= q3 + 1.5 * iqr)
                        .unwrap_or(q3);

                    let box_elem = BoxElem::new(
                        i as f64,
                        BoxSpread::new(whisker_low, q1, median, q3, whisker_high),
                    )
                    .box_width(0.5)
                    .fill(color.gamma_multiply(0.3))
                    .stroke(egui::Stroke::new(1.5, color));

                    plot_ui.box_plot(BoxPlot::new(vec![box_elem]).name(name));

                    // Scatter overlay so individual students stay visible
                    let x_positions = Self::beeswarm_positions(values, i as f64, 0.35);
                    let points: PlotPoints = x_positions
                        .iter()
                        .zip(values.iter())
                        .map(|(&x, &y)| [x, y])
                        .collect();
                    plot_ui.points(
                        Points::new(points)
                            .radius(2.5)
                            .color(color.gamma_multiply(0.7)),
                    );
                }
            });
    }

    /// Bar chart of category means.
    fn draw_bar(
        ui: &mut egui::Ui,
        id: &str,
        bars: &[(String, f64, usize)],
        x_label: &str,
        y_label: &str,
        height: f32,
    ) {
        let x_labels: Vec<String> = bars.iter().map(|(name, _, _)| name.clone()).collect();

        Plot::new(format!("bar_{}", id))
            .height(height)
            .allow_scroll(false)
            .x_axis_label(x_label.to_string())
            .y_axis_label(y_label.to_string())
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round() as usize;
                if (mark.value - idx as f64).abs() < 1e-6 && idx < x_labels.len() {
                    x_labels[idx].clone()
                } else {
                    String::new()
                }
            })
            .show(ui, |plot_ui| {
                for (i, (name, mean, count)) in bars.iter().enumerate() {
                    let bar = Bar::new(i as f64, *mean).width(0.6);
                    plot_ui.bar_chart(
                        BarChart::new(vec![bar])
                            .color(Self::series_color(i))
                            .name(format!("{} (n={})", name, count)),
                    );
                }
            });
    }

    /// Calculate beeswarm positions for points with duplicate values.
    pub fn beeswarm_positions(y_values: &[f64], center: f64, width: f64) -> Vec<f64> {
        let n = y_values.len();
        if n == 0 {
            return Vec::new();
        }

        let mut positions = vec![center; n];

        // Round values and find duplicates
        let precision = 1e6;
        let mut value_indices: HashMap<i64, Vec<usize>> = HashMap::new();

        for (i, &y) in y_values.iter().enumerate() {
            let key = (y * precision).round() as i64;
            value_indices.entry(key).or_default().push(i);
        }

        // Spread duplicates symmetrically
        for indices in value_indices.values() {
            if indices.len() > 1 {
                let count = indices.len();
                let step = width / (count.max(2) - 1) as f64;
                let start = center - width / 2.0;

                for (i, &idx) in indices.iter().enumerate() {
                    positions[idx] = start + i as f64 * step;
                }
            }
        }

        positions
    }

    /// Legend row plus the significance annotation under a chart.
    pub fn draw_annotation(ui: &mut egui::Ui, chart: &ChartData) {
        match &chart.content {
            ChartContent::Scatter {
                correlation: Some(corr),
                ..
            } => {
                let color = if corr.is_significant {
                    Color32::from_rgb(220, 53, 69)
                } else {
                    ui.visuals().text_color()
                };
                ui.label(
                    RichText::new(format!(
                        "r = {:.3}, p = {:.4}, n = {}",
                        corr.r, corr.p_value, corr.n
                    ))
                    .size(11.0)
                    .color(color),
                );
            }
            ChartContent::Box {
                ttest: Some((p, significant)),
                ..
            } => {
                let color = if *significant {
                    Color32::from_rgb(220, 53, 69)
                } else {
                    ui.visuals().text_color()
                };
                ui.label(
                    RichText::new(format!("Welch t-test p = {:.4}", p))
                        .size(11.0)
                        .color(color),
                );
            }
            _ => {}
        }
    }

    /// Summary table for box charts.
    pub fn draw_summary_table(
        ui: &mut egui::Ui,
        chart_id: &str,
        summaries: &[(String, SummaryStats)],
    ) {
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                egui::Grid::new(ui.make_persistent_id(format!("summary_{}", chart_id)))
                    .striped(true)
                    .min_col_width(55.0)
                    .spacing([8.0, 4.0])
                    .show(ui, |ui| {
                        ui.label(RichText::new("Group").strong().size(11.0));
                        ui.label(RichText::new("N").strong().size(11.0));
                        ui.label(RichText::new("Mean").strong().size(11.0));
                        ui.label(RichText::new("Median").strong().size(11.0));
                        ui.label(RichText::new("Std").strong().size(11.0));
                        ui.label(RichText::new("P95").strong().size(11.0));
                        ui.label(RichText::new("P05").strong().size(11.0));
                        ui.end_row();

                        for (name, stats) in summaries {
                            ui.label(RichText::new(name).size(11.0));
                            ui.label(RichText::new(stats.count.to_string()).size(11.0));
                            ui.label(RichText::new(format!("{:.2}", stats.mean)).size(11.0));
                            ui.label(RichText::new(format!("{:.2}", stats.median)).size(11.0));
                            ui.label(RichText::new(format!("{:.2}", stats.std)).size(11.0));
                            ui.label(RichText::new(format!("{:.2}", stats.p95)).size(11.0));
                            ui.label(RichText::new(format!("{:.2}", stats.p05)).size(11.0));
                            ui.end_row();
                        }
                    });
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn beeswarm_spreads_duplicates() {
        let values = [5.0, 5.0, 5.0, 7.0];
        let positions = ChartPlotter::beeswarm_positions(&values, 1.0, 0.4);

        assert_eq!(positions.len(), 4);
        // The lone value stays centered
        assert_eq!(positions[3], 1.0);
        // Duplicates spread around the center
        assert!(positions[0] < positions[1] && positions[1] < positions[2]);
        assert!((positions[0] - 0.8).abs() < 1e-9);
        assert!((positions[2] - 1.2).abs() < 1e-9);
    }

    #[test]
    fn series_colors_cycle() {
        assert_eq!(ChartPlotter::series_color(0), ChartPlotter::series_color(10));
    }
}
