//! Dashboard chart catalogue.
//! The fixed set of views the dashboard renders, and the per-chart data
//! computed from the filtered frame.

use crate::data::schema;
use crate::stats::{CorrelationStats, StatsCalculator, SummaryStats};
use polars::prelude::*;
use rayon::prelude::*;
use tracing::warn;

/// Number of bins for the age histogram.
pub const HISTOGRAM_BINS: usize = 8;

/// What a single dashboard view plots.
#[derive(Debug, Clone)]
pub enum ChartKind {
    /// Grouped histogram of `value_col`, one bar series per `group_col` value.
    Histogram {
        value_col: &'static str,
        group_col: &'static str,
    },
    /// Scatter of `x_col` against `y_col`, colored by `group_col`, with a
    /// least-squares fit and Pearson correlation over all points.
    Scatter {
        x_col: &'static str,
        y_col: &'static str,
        group_col: &'static str,
    },
    /// Box plot of `value_col` per `category_col` value. Two-category
    /// boxes get a Welch t-test.
    Box {
        category_col: &'static str,
        value_col: &'static str,
    },
    /// Mean of `value_col` per `category_col` value.
    Bar {
        category_col: &'static str,
        value_col: &'static str,
    },
}

impl ChartKind {
    /// Columns this chart cannot render without.
    fn required_columns(&self) -> Vec<&'static str> {
        match *self {
            ChartKind::Histogram {
                value_col,
                group_col,
            } => vec![value_col, group_col],
            ChartKind::Scatter {
                x_col,
                y_col,
                group_col,
            } => vec![x_col, y_col, group_col],
            ChartKind::Box {
                category_col,
                value_col,
            }
            | ChartKind::Bar {
                category_col,
                value_col,
            } => vec![category_col, value_col],
        }
    }
}

/// A dashboard view: stable id, display title, what to plot.
#[derive(Debug, Clone)]
pub struct ChartSpec {
    pub id: &'static str,
    pub title: &'static str,
    pub kind: ChartKind,
}

/// The eight views of the dashboard, in display order.
pub fn dashboard_catalogue() -> Vec<ChartSpec> {
    vec![
        ChartSpec {
            id: "age_distribution",
            title: "Age Distribution by Gender",
            kind: ChartKind::Histogram {
                value_col: schema::AGE,
                group_col: schema::GENDER,
            },
        },
        ChartSpec {
            id: "study_vs_score",
            title: "Study Hours vs Exam Score",
            kind: ChartKind::Scatter {
                x_col: schema::STUDY_HOURS,
                y_col: schema::EXAM_SCORE,
                group_col: schema::GENDER,
            },
        },
        ChartSpec {
            id: "social_vs_score",
            title: "Social Media Hours vs Exam Score",
            kind: ChartKind::Scatter {
                x_col: schema::SOCIAL_MEDIA_HOURS,
                y_col: schema::EXAM_SCORE,
                group_col: schema::GENDER,
            },
        },
        ChartSpec {
            id: "attendance_vs_score",
            title: "Attendance % vs Exam Score",
            kind: ChartKind::Scatter {
                x_col: schema::ATTENDANCE,
                y_col: schema::EXAM_SCORE,
                group_col: schema::GENDER,
            },
        },
        ChartSpec {
            id: "diet_vs_score",
            title: "Exam Score by Diet Quality",
            kind: ChartKind::Box {
                category_col: schema::DIET_QUALITY,
                value_col: schema::EXAM_SCORE,
            },
        },
        ChartSpec {
            id: "exercise_vs_score",
            title: "Average Exam Score by Exercise Frequency",
            kind: ChartKind::Bar {
                category_col: schema::EXERCISE_FREQUENCY,
                value_col: schema::EXAM_SCORE,
            },
        },
        ChartSpec {
            id: "extracurricular_vs_score",
            title: "Exam Score by Extracurricular Participation",
            kind: ChartKind::Box {
                category_col: schema::EXTRACURRICULAR,
                value_col: schema::EXAM_SCORE,
            },
        },
        ChartSpec {
            id: "sleep_vs_score",
            title: "Sleep Hours vs Exam Score",
            kind: ChartKind::Scatter {
                x_col: schema::SLEEP_HOURS,
                y_col: schema::EXAM_SCORE,
                group_col: schema::GENDER,
            },
        },
    ]
}

/// Computed data for one chart card.
#[derive(Debug, Clone)]
pub struct ChartData {
    pub id: String,
    pub title: String,
    pub content: ChartContent,
}

#[derive(Debug, Clone)]
pub enum ChartContent {
    Histogram {
        /// Bin edges, `bins + 1` entries.
        edges: Vec<f64>,
        /// Per-group bin counts, aligned with `edges.len() - 1`.
        series: Vec<(String, Vec<usize>)>,
        x_label: String,
    },
    Scatter {
        series: Vec<(String, Vec<[f64; 2]>)>,
        /// Least-squares (slope, intercept) over all points.
        fit: Option<(f64, f64)>,
        correlation: Option<CorrelationStats>,
        x_label: String,
        y_label: String,
    },
    Box {
        buckets: Vec<(String, Vec<f64>)>,
        summaries: Vec<(String, SummaryStats)>,
        /// Welch t-test when exactly two categories are present.
        ttest: Option<(f64, bool)>,
        x_label: String,
        y_label: String,
    },
    Bar {
        bars: Vec<(String, f64, usize)>,
        x_label: String,
        y_label: String,
    },
}

impl ChartData {
    /// Whether the card deserves the highlighted border: a significant
    /// correlation or group difference.
    pub fn is_significant(&self) -> bool {
        match &self.content {
            ChartContent::Scatter { correlation, .. } => {
                correlation.map(|c| c.is_significant).unwrap_or(false)
            }
            ChartContent::Box { ttest, .. } => ttest.map(|(_, sig)| sig).unwrap_or(false),
            _ => false,
        }
    }
}

/// Build chart data for every catalogue entry over the filtered frame.
/// Charts whose columns are missing are skipped with a warning.
pub fn build_chart_data(df: &DataFrame, specs: &[ChartSpec]) -> Vec<ChartData> {
    let available: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();

    specs
        .par_iter()
        .filter_map(|spec| {
            let missing: Vec<&str> = spec
                .kind
                .required_columns()
                .into_iter()
                .filter(|c| !available.iter().any(|a| a.as_str() == *c))
                .collect();
            if !missing.is_empty() {
                warn!(chart = spec.id, ?missing, "skipping chart, columns absent");
                return None;
            }
            Some(build_one(df, spec))
        })
        .collect()
}

fn build_one(df: &DataFrame, spec: &ChartSpec) -> ChartData {
    let content = match &spec.kind {
        ChartKind::Histogram {
            value_col,
            group_col,
        } => build_histogram(df, value_col, group_col),
        ChartKind::Scatter {
            x_col,
            y_col,
            group_col,
        } => {
            let series = StatsCalculator::paired_values_by_group(df, x_col, y_col, group_col);
            let all_points = StatsCalculator::paired_values(df, x_col, y_col);
            let fit = StatsCalculator::linear_fit(&all_points);
            let xs: Vec<f64> = all_points.iter().map(|p| p[0]).collect();
            let ys: Vec<f64> = all_points.iter().map(|p| p[1]).collect();
            let correlation = StatsCalculator::pearson_correlation(&xs, &ys);
            ChartContent::Scatter {
                series,
                fit,
                correlation,
                x_label: humanize(x_col),
                y_label: humanize(y_col),
            }
        }
        ChartKind::Box {
            category_col,
            value_col,
        } => {
            let buckets = StatsCalculator::values_by_category(df, category_col, value_col);
            let summaries = buckets
                .iter()
                .map(|(name, values)| {
                    (
                        name.clone(),
                        StatsCalculator::compute_descriptive_stats(values),
                    )
                })
                .collect();
            let ttest = if buckets.len() == 2 {
                Some(StatsCalculator::welch_ttest(&buckets[0].1, &buckets[1].1))
            } else {
                None
            };
            ChartContent::Box {
                buckets,
                summaries,
                ttest,
                x_label: humanize(category_col),
                y_label: humanize(value_col),
            }
        }
        ChartKind::Bar {
            category_col,
            value_col,
        } => ChartContent::Bar {
            bars: StatsCalculator::group_means(df, category_col, value_col),
            x_label: humanize(category_col),
            y_label: format!("mean {}", humanize(value_col)),
        },
    };

    ChartData {
        id: spec.id.to_string(),
        title: spec.title.to_string(),
        content,
    }
}

fn build_histogram(df: &DataFrame, value_col: &str, group_col: &str) -> ChartContent {
    let buckets = StatsCalculator::values_by_category(df, group_col, value_col);

    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for (_, values) in &buckets {
        for &v in values {
            min = min.min(v);
            max = max.max(v);
        }
    }
    if !min.is_finite() || !max.is_finite() {
        return ChartContent::Histogram {
            edges: Vec::new(),
            series: Vec::new(),
            x_label: humanize(value_col),
        };
    }
    // Degenerate range still deserves one visible bin.
    let span = if max > min { max - min } else { 1.0 };
    let width = span / HISTOGRAM_BINS as f64;

    let edges: Vec<f64> = (0..=HISTOGRAM_BINS)
        .map(|i| min + i as f64 * width)
        .collect();

    let series = buckets
        .into_iter()
        .map(|(name, values)| {
            let mut counts = vec![0usize; HISTOGRAM_BINS];
            for v in values {
                let idx = (((v - min) / width) as usize).min(HISTOGRAM_BINS - 1);
                counts[idx] += 1;
            }
            (name, counts)
        })
        .collect();

    ChartContent::Histogram {
        edges,
        series,
        x_label: humanize(value_col),
    }
}

/// "study_hours_per_day" -> "study hours per day"
fn humanize(column: &str) -> String {
    column.replace('_', " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DataFrame {
        df![
            "student_id" => ["S001", "S002", "S003", "S004", "S005", "S006"],
            "age" => [18i64, 19, 20, 21, 22, 23],
            "gender" => ["Male", "Female", "Male", "Female", "Male", "Female"],
            "study_hours_per_day" => [1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0],
            "social_media_hours" => [4.0f64, 3.5, 3.0, 2.5, 2.0, 1.5],
            "sleep_hours" => [6.0f64, 7.0, 8.0, 6.5, 7.5, 8.5],
            "attendance_percentage" => [70.0f64, 75.0, 80.0, 85.0, 90.0, 95.0],
            "diet_quality" => ["Good", "Fair", "Poor", "Good", "Fair", "Poor"],
            "exercise_frequency" => [0i64, 1, 2, 3, 2, 1],
            "extracurricular_participation" => ["Yes", "No", "Yes", "No", "Yes", "No"],
            "exam_score" => [55.0f64, 62.0, 70.0, 78.0, 85.0, 92.0],
        ]
        .unwrap()
    }

    #[test]
    fn catalogue_builds_all_charts_for_full_schema() {
        let df = sample();
        let charts = build_chart_data(&df, &dashboard_catalogue());
        assert_eq!(charts.len(), dashboard_catalogue().len());
    }

    #[test]
    fn charts_with_missing_columns_are_skipped() {
        let df = df![
            "gender" => ["Male", "Female"],
            "age" => [20i64, 21],
        ]
        .unwrap();
        let charts = build_chart_data(&df, &dashboard_catalogue());
        assert_eq!(charts.len(), 1);
        assert_eq!(charts[0].id, "age_distribution");
    }

    #[test]
    fn scatter_chart_carries_fit_and_correlation() {
        let df = sample();
        let charts = build_chart_data(&df, &dashboard_catalogue());
        let study = charts.iter().find(|c| c.id == "study_vs_score").unwrap();

        let ChartContent::Scatter {
            fit, correlation, ..
        } = &study.content
        else {
            panic!("expected scatter content");
        };
        let (slope, _) = fit.unwrap();
        assert!(slope > 0.0);
        let corr = correlation.unwrap();
        assert!(corr.r > 0.99);
        assert!(study.is_significant());
    }

    #[test]
    fn histogram_counts_cover_every_row() {
        let df = sample();
        let charts = build_chart_data(&df, &dashboard_catalogue());
        let hist = charts.iter().find(|c| c.id == "age_distribution").unwrap();

        let ChartContent::Histogram { edges, series, .. } = &hist.content else {
            panic!("expected histogram content");
        };
        assert_eq!(edges.len(), HISTOGRAM_BINS + 1);
        let total: usize = series
            .iter()
            .map(|(_, counts)| counts.iter().sum::<usize>())
            .sum();
        assert_eq!(total, df.height());
    }

    #[test]
    fn two_category_box_gets_ttest() {
        let df = sample();
        let charts = build_chart_data(&df, &dashboard_catalogue());
        let extra = charts
            .iter()
            .find(|c| c.id == "extracurricular_vs_score")
            .unwrap();

        let ChartContent::Box { ttest, buckets, .. } = &extra.content else {
            panic!("expected box content");
        };
        assert_eq!(buckets.len(), 2);
        assert!(ttest.is_some());
    }

    #[test]
    fn bar_chart_means_per_exercise_bucket() {
        let df = sample();
        let charts = build_chart_data(&df, &dashboard_catalogue());
        let bar = charts.iter().find(|c| c.id == "exercise_vs_score").unwrap();

        let ChartContent::Bar { bars, .. } = &bar.content else {
            panic!("expected bar content");
        };
        assert_eq!(bars.len(), 4); // frequencies 0..3
        assert_eq!(bars[0].0, "0");
        assert_eq!(bars[0].1, 55.0);
    }
}
