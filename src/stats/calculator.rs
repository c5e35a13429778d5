//! Statistics Calculator Module
//! Descriptive stats, Pearson correlation, Welch's t-test and dashboard KPIs.

use crate::data::schema;
use polars::prelude::*;
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Significance threshold for correlation and t-tests
pub const SIGNIFICANCE_THRESHOLD: f64 = 0.05;

/// Descriptive statistics for one sample.
#[derive(Debug, Clone)]
pub struct SummaryStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub variance: f64,
    pub p95: f64,
    pub p05: f64,
}

impl Default for SummaryStats {
    fn default() -> Self {
        Self {
            count: 0,
            mean: f64::NAN,
            median: f64::NAN,
            std: f64::NAN,
            variance: f64::NAN,
            p95: f64::NAN,
            p05: f64::NAN,
        }
    }
}

/// Pearson correlation with a two-tailed significance test.
#[derive(Debug, Clone, Copy)]
pub struct CorrelationStats {
    pub r: f64,
    pub p_value: f64,
    pub n: usize,
    pub is_significant: bool,
}

/// Headline numbers for the filtered record set. A `None` means the
/// column is absent and the GUI shows "N/A".
#[derive(Debug, Clone, Default)]
pub struct Kpis {
    pub total_students: usize,
    pub avg_exam_score: Option<f64>,
    pub avg_sleep_hours: Option<f64>,
    pub avg_study_hours: Option<f64>,
}

impl Kpis {
    pub fn compute(df: &DataFrame) -> Self {
        Self {
            total_students: df.height(),
            avg_exam_score: column_mean(df, schema::EXAM_SCORE),
            avg_sleep_hours: column_mean(df, schema::SLEEP_HOURS),
            avg_study_hours: column_mean(df, schema::STUDY_HOURS),
        }
    }
}

fn column_mean(df: &DataFrame, column: &str) -> Option<f64> {
    df.column(column)
        .ok()
        .and_then(|col| col.as_materialized_series().mean())
}

/// Handles statistical calculations over the cleaned frame.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Compute descriptive statistics for an array of values.
    pub fn compute_descriptive_stats(values: &[f64]) -> SummaryStats {
        let n = values.len();
        if n == 0 {
            return SummaryStats::default();
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let mean = values.iter().sum::<f64>() / n as f64;
        let median = if n % 2 == 0 {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        } else {
            sorted[n / 2]
        };

        let variance = if n > 1 {
            values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64
        } else {
            0.0
        };
        let std = variance.sqrt();

        SummaryStats {
            count: n,
            mean,
            median,
            std,
            variance,
            p95: Self::percentile(&sorted, 95.0),
            p05: Self::percentile(&sorted, 5.0),
        }
    }

    /// Calculate percentile using linear interpolation (NumPy compatible).
    fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }

    /// Pearson correlation between two equally long samples, with a
    /// two-tailed p-value from t = r * sqrt((n-2) / (1-r^2)).
    pub fn pearson_correlation(x: &[f64], y: &[f64]) -> Option<CorrelationStats> {
        let n = x.len().min(y.len());
        if n < 3 {
            return None;
        }

        let nf = n as f64;
        let mean_x = x[..n].iter().sum::<f64>() / nf;
        let mean_y = y[..n].iter().sum::<f64>() / nf;

        let mut cov = 0.0;
        let mut var_x = 0.0;
        let mut var_y = 0.0;
        for i in 0..n {
            let dx = x[i] - mean_x;
            let dy = y[i] - mean_y;
            cov += dx * dy;
            var_x += dx * dx;
            var_y += dy * dy;
        }

        if var_x == 0.0 || var_y == 0.0 {
            return None;
        }

        let r = (cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0);

        let df = nf - 2.0;
        let denom = 1.0 - r * r;
        let (p_value, is_significant) = if denom <= f64::EPSILON {
            (0.0, true)
        } else {
            let t = r * (df / denom).sqrt();
            match StudentsT::new(0.0, 1.0, df) {
                Ok(dist) => {
                    let p = 2.0 * (1.0 - dist.cdf(t.abs()));
                    (p, p <= SIGNIFICANCE_THRESHOLD)
                }
                Err(_) => (f64::NAN, false),
            }
        };

        Some(CorrelationStats {
            r,
            p_value,
            n,
            is_significant,
        })
    }

    /// Perform Welch's t-test (independent samples, unequal variance).
    pub fn welch_ttest(group_values: &[f64], other_values: &[f64]) -> (f64, bool) {
        let n1 = group_values.len() as f64;
        let n2 = other_values.len() as f64;

        if n1 < 2.0 || n2 < 2.0 {
            return (f64::NAN, false);
        }

        let mean1 = group_values.iter().sum::<f64>() / n1;
        let mean2 = other_values.iter().sum::<f64>() / n2;

        let var1 = group_values
            .iter()
            .map(|x| (x - mean1).powi(2))
            .sum::<f64>()
            / (n1 - 1.0);
        let var2 = other_values
            .iter()
            .map(|x| (x - mean2).powi(2))
            .sum::<f64>()
            / (n2 - 1.0);

        let se = (var1 / n1 + var2 / n2).sqrt();
        if se == 0.0 {
            return (1.0, false); // No variance difference
        }

        let t = (mean1 - mean2) / se;

        // Welch-Satterthwaite degrees of freedom
        let df_num = (var1 / n1 + var2 / n2).powi(2);
        let df_denom = (var1 / n1).powi(2) / (n1 - 1.0) + (var2 / n2).powi(2) / (n2 - 1.0);
        let df = df_num / df_denom;

        if let Ok(dist) = StudentsT::new(0.0, 1.0, df) {
            let p_value = 2.0 * (1.0 - dist.cdf(t.abs()));
            (p_value, p_value <= SIGNIFICANCE_THRESHOLD)
        } else {
            (f64::NAN, false)
        }
    }

    /// Least-squares line through scatter points: (slope, intercept).
    pub fn linear_fit(points: &[[f64; 2]]) -> Option<(f64, f64)> {
        let n = points.len();
        if n < 2 {
            return None;
        }
        let nf = n as f64;
        let mean_x = points.iter().map(|p| p[0]).sum::<f64>() / nf;
        let mean_y = points.iter().map(|p| p[1]).sum::<f64>() / nf;

        let mut cov = 0.0;
        let mut var_x = 0.0;
        for p in points {
            cov += (p[0] - mean_x) * (p[1] - mean_y);
            var_x += (p[0] - mean_x).powi(2);
        }
        if var_x == 0.0 {
            return None;
        }
        let slope = cov / var_x;
        Some((slope, mean_y - slope * mean_x))
    }

    /// (x, y) pairs where both columns are present, keyed by the value of
    /// a categorical column. Rows with a null on either axis are skipped.
    pub fn paired_values_by_group(
        df: &DataFrame,
        x_col: &str,
        y_col: &str,
        group_col: &str,
    ) -> Vec<(String, Vec<[f64; 2]>)> {
        let Some((x_ca, y_ca)) = Self::paired_chunked(df, x_col, y_col) else {
            return Vec::new();
        };
        let Ok(group_series) = df.column(group_col) else {
            return Vec::new();
        };
        let group_series = group_series.as_materialized_series();

        let mut by_group: Vec<(String, Vec<[f64; 2]>)> = Vec::new();
        for i in 0..df.height() {
            let (Some(x), Some(y), Ok(g)) = (x_ca.get(i), y_ca.get(i), group_series.get(i)) else {
                continue;
            };
            if g.is_null() || x.is_nan() || y.is_nan() {
                continue;
            }
            let group = g.to_string().trim_matches('"').to_string();
            match by_group.iter_mut().find(|(name, _)| *name == group) {
                Some((_, points)) => points.push([x, y]),
                None => by_group.push((group, vec![[x, y]])),
            }
        }
        by_group.sort_by(|a, b| a.0.cmp(&b.0));
        by_group
    }

    /// All (x, y) pairs regardless of group.
    pub fn paired_values(df: &DataFrame, x_col: &str, y_col: &str) -> Vec<[f64; 2]> {
        let Some((x_ca, y_ca)) = Self::paired_chunked(df, x_col, y_col) else {
            return Vec::new();
        };
        (0..df.height())
            .filter_map(|i| match (x_ca.get(i), y_ca.get(i)) {
                (Some(x), Some(y)) if !x.is_nan() && !y.is_nan() => Some([x, y]),
                _ => None,
            })
            .collect()
    }

    fn paired_chunked(
        df: &DataFrame,
        x_col: &str,
        y_col: &str,
    ) -> Option<(Float64Chunked, Float64Chunked)> {
        let x = df
            .column(x_col)
            .ok()?
            .as_materialized_series()
            .cast(&DataType::Float64)
            .ok()?;
        let y = df
            .column(y_col)
            .ok()?
            .as_materialized_series()
            .cast(&DataType::Float64)
            .ok()?;
        Some((x.f64().ok()?.clone(), y.f64().ok()?.clone()))
    }

    /// Numeric values of `value_col` bucketed by the categories of
    /// `category_col`, sorted by category name.
    pub fn values_by_category(
        df: &DataFrame,
        category_col: &str,
        value_col: &str,
    ) -> Vec<(String, Vec<f64>)> {
        let Ok(cat_series) = df.column(category_col) else {
            return Vec::new();
        };
        let cat_series = cat_series.as_materialized_series();
        let Some(val_ca) = df
            .column(value_col)
            .ok()
            .and_then(|c| c.as_materialized_series().cast(&DataType::Float64).ok())
            .and_then(|s| s.f64().ok().cloned())
        else {
            return Vec::new();
        };

        let mut buckets: Vec<(String, Vec<f64>)> = Vec::new();
        for i in 0..df.height() {
            let (Ok(cat), Some(val)) = (cat_series.get(i), val_ca.get(i)) else {
                continue;
            };
            if cat.is_null() || val.is_nan() {
                continue;
            }
            let name = cat.to_string().trim_matches('"').to_string();
            match buckets.iter_mut().find(|(n, _)| *n == name) {
                Some((_, values)) => values.push(val),
                None => buckets.push((name, vec![val])),
            }
        }
        buckets.sort_by(|a, b| natural_category_cmp(&a.0, &b.0));
        buckets
    }

    /// Mean of `value_col` per category, sorted by category.
    pub fn group_means(
        df: &DataFrame,
        category_col: &str,
        value_col: &str,
    ) -> Vec<(String, f64, usize)> {
        Self::values_by_category(df, category_col, value_col)
            .into_iter()
            .filter(|(_, values)| !values.is_empty())
            .map(|(name, values)| {
                let mean = values.iter().sum::<f64>() / values.len() as f64;
                (name, mean, values.len())
            })
            .collect()
    }
}

/// Sort categories numerically when they are numbers (exercise frequency
/// buckets), lexically otherwise.
fn natural_category_cmp(a: &str, b: &str) -> std::cmp::Ordering {
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(x), Ok(y)) => x.partial_cmp(&y).unwrap_or(std::cmp::Ordering::Equal),
        _ => a.cmp(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptive_stats_basic() {
        let stats = StatsCalculator::compute_descriptive_stats(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(stats.count, 5);
        assert!((stats.mean - 3.0).abs() < 1e-12);
        assert!((stats.median - 3.0).abs() < 1e-12);
        assert!((stats.variance - 2.5).abs() < 1e-12);
    }

    #[test]
    fn descriptive_stats_empty_is_nan() {
        let stats = StatsCalculator::compute_descriptive_stats(&[]);
        assert_eq!(stats.count, 0);
        assert!(stats.mean.is_nan());
    }

    #[test]
    fn pearson_detects_perfect_correlation() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [2.0, 4.0, 6.0, 8.0, 10.0];
        let corr = StatsCalculator::pearson_correlation(&x, &y).unwrap();
        assert!((corr.r - 1.0).abs() < 1e-9);
        assert!(corr.is_significant);
    }

    #[test]
    fn pearson_near_zero_for_noise() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let y = [5.0, 1.0, 4.0, 2.0, 5.0, 2.0];
        let corr = StatsCalculator::pearson_correlation(&x, &y).unwrap();
        assert!(corr.r.abs() < 0.9);
        assert!(!corr.is_significant);
    }

    #[test]
    fn pearson_rejects_constant_input() {
        let x = [1.0, 1.0, 1.0, 1.0];
        let y = [2.0, 4.0, 6.0, 8.0];
        assert!(StatsCalculator::pearson_correlation(&x, &y).is_none());
    }

    #[test]
    fn welch_ttest_separated_samples_significant() {
        let a = [1.0, 1.1, 0.9, 1.05, 0.95, 1.02];
        let b = [5.0, 5.1, 4.9, 5.05, 4.95, 5.02];
        let (p, significant) = StatsCalculator::welch_ttest(&a, &b);
        assert!(p < 0.001);
        assert!(significant);
    }

    #[test]
    fn welch_ttest_identical_samples_not_significant() {
        let a = [1.0, 2.0, 3.0, 4.0];
        let (p, significant) = StatsCalculator::welch_ttest(&a, &a);
        assert!(p > SIGNIFICANCE_THRESHOLD || p.is_nan());
        assert!(!significant);
    }

    #[test]
    fn linear_fit_recovers_line() {
        let points = [[0.0, 1.0], [1.0, 3.0], [2.0, 5.0]];
        let (slope, intercept) = StatsCalculator::linear_fit(&points).unwrap();
        assert!((slope - 2.0).abs() < 1e-12);
        assert!((intercept - 1.0).abs() < 1e-12);
    }

    #[test]
    fn kpis_over_frame() {
        let df = df![
            "exam_score" => [80.0f64, 90.0],
            "sleep_hours" => [6.0f64, 8.0],
            "study_hours_per_day" => [2.0f64, 4.0],
        ]
        .unwrap();

        let kpis = Kpis::compute(&df);
        assert_eq!(kpis.total_students, 2);
        assert_eq!(kpis.avg_exam_score, Some(85.0));
        assert_eq!(kpis.avg_sleep_hours, Some(7.0));
        assert_eq!(kpis.avg_study_hours, Some(3.0));
    }

    #[test]
    fn kpis_missing_column_is_none() {
        let df = df![
            "exam_score" => [80.0f64, 90.0],
        ]
        .unwrap();
        let kpis = Kpis::compute(&df);
        assert!(kpis.avg_sleep_hours.is_none());
    }

    #[test]
    fn values_by_category_buckets_and_sorts() {
        let df = df![
            "diet_quality" => ["Good", "Poor", "Good", "Fair"],
            "exam_score" => [90.0f64, 50.0, 85.0, 70.0],
        ]
        .unwrap();

        let buckets = StatsCalculator::values_by_category(&df, "diet_quality", "exam_score");
        let names: Vec<&str> = buckets.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["Fair", "Good", "Poor"]);
        assert_eq!(buckets[1].1, vec![90.0, 85.0]);
    }

    #[test]
    fn group_means_numeric_categories_in_order() {
        let df = df![
            "exercise_frequency" => [2i64, 0, 2, 10],
            "exam_score" => [80.0f64, 60.0, 90.0, 95.0],
        ]
        .unwrap();

        let means = StatsCalculator::group_means(&df, "exercise_frequency", "exam_score");
        let names: Vec<&str> = means.iter().map(|(n, _, _)| n.as_str()).collect();
        assert_eq!(names, vec!["0", "2", "10"]);
        assert_eq!(means[1].1, 85.0);
        assert_eq!(means[1].2, 2);
    }

    #[test]
    fn paired_values_by_group_skips_nulls() {
        let df = df![
            "study_hours_per_day" => [Some(2.0f64), None, Some(4.0)],
            "exam_score" => [Some(70.0f64), Some(80.0), Some(90.0)],
            "gender" => ["Male", "Female", "Female"],
        ]
        .unwrap();

        let grouped = StatsCalculator::paired_values_by_group(
            &df,
            "study_hours_per_day",
            "exam_score",
            "gender",
        );
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].0, "Female");
        assert_eq!(grouped[0].1, vec![[4.0, 90.0]]);
        assert_eq!(grouped[1].1, vec![[2.0, 70.0]]);
    }
}
