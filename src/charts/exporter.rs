//! Static Chart Exporter
//! Renders every dashboard chart to a PNG file with plotters, for sharing
//! outside the app.

use crate::charts::{ChartContent, ChartData};
use anyhow::{Context, Result};
use plotters::prelude::*;
use std::path::{Path, PathBuf};

const WIDTH: u32 = 1280;
const HEIGHT: u32 = 800;

/// Palette matching the interactive charts.
const PALETTE: [RGBColor; 10] = [
    RGBColor(52, 152, 219),
    RGBColor(231, 76, 60),
    RGBColor(46, 204, 113),
    RGBColor(155, 89, 182),
    RGBColor(243, 156, 18),
    RGBColor(26, 188, 156),
    RGBColor(233, 30, 99),
    RGBColor(0, 188, 212),
    RGBColor(255, 87, 34),
    RGBColor(121, 85, 72),
];

fn series_color(index: usize) -> RGBColor {
    PALETTE[index % PALETTE.len()]
}

/// Renders chart cards to PNG files.
pub struct ChartExporter;

impl ChartExporter {
    /// Export every chart into `dir` as numbered PNGs. Returns the
    /// written paths.
    pub fn export_all(charts: &[ChartData], dir: &Path) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating export directory {}", dir.display()))?;

        let mut written = Vec::with_capacity(charts.len());
        for (idx, chart) in charts.iter().enumerate() {
            let path = dir.join(format!("{:02}_{}.png", idx + 1, chart.id));
            Self::export_chart(chart, &path)
                .with_context(|| format!("rendering chart '{}'", chart.id))?;
            written.push(path);
        }
        Ok(written)
    }

    /// Render one chart card to a PNG file.
    pub fn export_chart(chart: &ChartData, path: &Path) -> Result<()> {
        let root = BitMapBackend::new(path, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&WHITE)?;

        match &chart.content {
            ChartContent::Scatter {
                series,
                fit,
                x_label,
                y_label,
                ..
            } => Self::render_scatter(&root, &chart.title, series, *fit, x_label, y_label)?,
            ChartContent::Histogram {
                edges,
                series,
                x_label,
            } => Self::render_histogram(&root, &chart.title, edges, series, x_label)?,
            ChartContent::Box {
                buckets,
                x_label,
                y_label,
                ..
            } => Self::render_box(&root, &chart.title, buckets, x_label, y_label)?,
            ChartContent::Bar {
                bars,
                x_label,
                y_label,
            } => Self::render_bar(&root, &chart.title, bars, x_label, y_label)?,
        }

        root.present()?;
        Ok(())
    }

    fn render_scatter(
        root: &DrawingArea<BitMapBackend, plotters::coord::Shift>,
        title: &str,
        series: &[(String, Vec<[f64; 2]>)],
        fit: Option<(f64, f64)>,
        x_label: &str,
        y_label: &str,
    ) -> Result<()> {
        let points: Vec<[f64; 2]> = series.iter().flat_map(|(_, p)| p.iter().copied()).collect();
        let (x_range, y_range) = padded_ranges(&points);

        let mut chart = ChartBuilder::on(root)
            .caption(title, ("sans-serif", 28))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(60)
            .build_cartesian_2d(x_range.clone(), y_range)?;

        chart
            .configure_mesh()
            .x_desc(x_label)
            .y_desc(y_label)
            .draw()?;

        for (gi, (group, points)) in series.iter().enumerate() {
            let color = series_color(gi);
            chart
                .draw_series(
                    points
                        .iter()
                        .map(|p| Circle::new((p[0], p[1]), 3, color.filled())),
                )?
                .label(group.clone())
                .legend(move |(x, y)| Circle::new((x, y), 3, color.filled()));
        }

        if let Some((slope, intercept)) = fit {
            let (x0, x1) = (x_range.start, x_range.end);
            chart.draw_series(LineSeries::new(
                [(x0, slope * x0 + intercept), (x1, slope * x1 + intercept)],
                BLACK.stroke_width(2),
            ))?;
        }

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
        Ok(())
    }

    fn render_histogram(
        root: &DrawingArea<BitMapBackend, plotters::coord::Shift>,
        title: &str,
        edges: &[f64],
        series: &[(String, Vec<usize>)],
        x_label: &str,
    ) -> Result<()> {
        if edges.len() < 2 || series.is_empty() {
            return Ok(());
        }

        let max_count = series
            .iter()
            .flat_map(|(_, counts)| counts.iter().copied())
            .max()
            .unwrap_or(1)
            .max(1) as f64;
        let x_range = edges[0]..edges[edges.len() - 1];

        let mut chart = ChartBuilder::on(root)
            .caption(title, ("sans-serif", 28))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(60)
            .build_cartesian_2d(x_range, 0.0..max_count * 1.1)?;

        chart
            .configure_mesh()
            .x_desc(x_label)
            .y_desc("count")
            .draw()?;

        let bin_width = edges[1] - edges[0];
        let n_groups = series.len() as f64;
        let bar_width = bin_width / (n_groups + 0.5);

        for (gi, (group, counts)) in series.iter().enumerate() {
            let color = series_color(gi);
            chart
                .draw_series(counts.iter().enumerate().map(|(bi, &count)| {
                    let x0 = edges[bi] + bar_width * gi as f64;
                    let x1 = x0 + bar_width * 0.95;
                    Rectangle::new([(x0, 0.0), (x1, count as f64)], color.mix(0.8).filled())
                }))?
                .label(group.clone())
                .legend(move |(x, y)| {
                    Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled())
                });
        }

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
        Ok(())
    }

    fn render_box(
        root: &DrawingArea<BitMapBackend, plotters::coord::Shift>,
        title: &str,
        buckets: &[(String, Vec<f64>)],
        x_label: &str,
        y_label: &str,
    ) -> Result<()> {
        let values: Vec<[f64; 2]> = buckets
            .iter()
            .enumerate()
            .flat_map(|(i, (_, vals))| vals.iter().map(move |&v| [i as f64, v]))
            .collect();
        let (_, y_range) = padded_ranges(&values);
        let names: Vec<String> = buckets.iter().map(|(n, _)| n.clone()).collect();

        let mut chart = ChartBuilder::on(root)
            .caption(title, ("sans-serif", 28))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(60)
            .build_cartesian_2d(
                -0.5..buckets.len() as f64 - 0.5,
                y_range.start as f32..y_range.end as f32,
            )?;

        chart
            .configure_mesh()
            .x_desc(x_label)
            .y_desc(y_label)
            .x_labels(buckets.len())
            .x_label_formatter(&|x| {
                let idx = x.round() as usize;
                if (x - idx as f64).abs() < 1e-6 && idx < names.len() {
                    names[idx].clone()
                } else {
                    String::new()
                }
            })
            .draw()?;

        for (i, (_, vals)) in buckets.iter().enumerate() {
            if vals.is_empty() {
                continue;
            }
            let color = series_color(i);
            let quartiles = Quartiles::new(vals);
            chart.draw_series(std::iter::once(
                Boxplot::new_vertical(i as f64, &quartiles)
                    .width(40)
                    .style(color),
            ))?;
        }
        Ok(())
    }

    fn render_bar(
        root: &DrawingArea<BitMapBackend, plotters::coord::Shift>,
        title: &str,
        bars: &[(String, f64, usize)],
        x_label: &str,
        y_label: &str,
    ) -> Result<()> {
        let max_mean = bars.iter().map(|(_, m, _)| *m).fold(0.0f64, f64::max).max(1.0);
        let names: Vec<String> = bars.iter().map(|(n, _, _)| n.clone()).collect();

        let mut chart = ChartBuilder::on(root)
            .caption(title, ("sans-serif", 28))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(60)
            .build_cartesian_2d(-0.5..bars.len() as f64 - 0.5, 0.0..max_mean * 1.1)?;

        chart
            .configure_mesh()
            .x_desc(x_label)
            .y_desc(y_label)
            .x_labels(bars.len())
            .x_label_formatter(&|x| {
                let idx = x.round() as usize;
                if (x - idx as f64).abs() < 1e-6 && idx < names.len() {
                    names[idx].clone()
                } else {
                    String::new()
                }
            })
            .draw()?;

        chart.draw_series(bars.iter().enumerate().map(|(i, (_, mean, _))| {
            Rectangle::new(
                [(i as f64 - 0.3, 0.0), (i as f64 + 0.3, *mean)],
                series_color(i).mix(0.85).filled(),
            )
        }))?;
        Ok(())
    }
}

/// Axis ranges with 5% padding so points never sit on the frame.
fn padded_ranges(points: &[[f64; 2]]) -> (std::ops::Range<f64>, std::ops::Range<f64>) {
    let mut x_min = f64::INFINITY;
    let mut x_max = f64::NEG_INFINITY;
    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;
    for p in points {
        x_min = x_min.min(p[0]);
        x_max = x_max.max(p[0]);
        y_min = y_min.min(p[1]);
        y_max = y_max.max(p[1]);
    }
    if !x_min.is_finite() {
        return (0.0..1.0, 0.0..1.0);
    }
    let x_pad = ((x_max - x_min) * 0.05).max(0.5);
    let y_pad = ((y_max - y_min) * 0.05).max(0.5);
    (
        (x_min - x_pad)..(x_max + x_pad),
        (y_min - y_pad)..(y_max + y_pad),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padded_ranges_surround_points() {
        let points = [[1.0, 10.0], [3.0, 30.0]];
        let (xr, yr) = padded_ranges(&points);
        assert!(xr.start < 1.0 && xr.end > 3.0);
        assert!(yr.start < 10.0 && yr.end > 30.0);
    }

    #[test]
    fn padded_ranges_empty_input_defaults() {
        let (xr, yr) = padded_ranges(&[]);
        assert_eq!(xr, 0.0..1.0);
        assert_eq!(yr, 0.0..1.0);
    }
}
