//! Data Cleaner Module
//! The deterministic per-column cleaning pipeline: gender imputation, text
//! normalization, bounds clipping and missing-value imputation.

use crate::data::schema;
use polars::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tracing::info;

/// Seed for the gender imputation RNG so repeated runs agree.
pub const GENDER_IMPUTATION_SEED: u64 = 42;

#[derive(Error, Debug)]
pub enum CleanerError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// What the pipeline changed, step by step.
#[derive(Debug, Clone, Default)]
pub struct CleaningReport {
    pub genders_imputed: usize,
    pub cells_clipped: usize,
    pub numeric_cells_filled: usize,
    pub categorical_cells_filled: usize,
    pub steps: Vec<String>,
}

impl CleaningReport {
    /// One-line summary for the status bar.
    pub fn summary(&self) -> String {
        format!(
            "{} genders imputed, {} values clipped, {} missing filled",
            self.genders_imputed,
            self.cells_clipped,
            self.numeric_cells_filled + self.categorical_cells_filled
        )
    }
}

/// Runs the cleaning pipeline over a loaded DataFrame.
pub struct DataCleaner;

impl DataCleaner {
    /// Run the full pipeline. Row count is preserved: bad values are
    /// clipped or filled, never dropped.
    pub fn clean(mut df: DataFrame) -> Result<(DataFrame, CleaningReport), CleanerError> {
        let mut report = CleaningReport::default();

        Self::impute_gender(&mut df, GENDER_IMPUTATION_SEED, &mut report)?;
        Self::normalize_text(&mut df, &mut report)?;
        Self::clip_bounds(&mut df, &mut report)?;
        Self::fill_missing(&mut df, &mut report)?;

        info!(
            genders = report.genders_imputed,
            clipped = report.cells_clipped,
            filled = report.numeric_cells_filled + report.categorical_cells_filled,
            "cleaning pipeline finished"
        );
        Ok((df, report))
    }

    /// Remap "Other" genders onto the two allowed categories with a seeded
    /// RNG. Nulls are left alone here; `fill_missing` handles them.
    pub fn impute_gender(
        df: &mut DataFrame,
        seed: u64,
        report: &mut CleaningReport,
    ) -> Result<(), CleanerError> {
        let Ok(col) = df.column(schema::GENDER) else {
            return Ok(());
        };
        let series = col.as_materialized_series();
        if series.dtype() != &DataType::String {
            return Ok(());
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let str_series = series.str()?;
        let mut imputed = 0usize;
        let mut values: Vec<Option<String>> = Vec::with_capacity(str_series.len());

        for opt_val in str_series.into_iter() {
            match opt_val {
                Some(val) if val.trim().eq_ignore_ascii_case("other") => {
                    let pick = if rng.gen_bool(0.5) {
                        schema::GENDER_CATEGORIES[0]
                    } else {
                        schema::GENDER_CATEGORIES[1]
                    };
                    values.push(Some(pick.to_string()));
                    imputed += 1;
                }
                Some(val) => values.push(Some(val.to_string())),
                None => values.push(None),
            }
        }

        if imputed > 0 {
            let replaced = Series::new(schema::GENDER.into(), values);
            df.replace(schema::GENDER, replaced)?;
            report
                .steps
                .push(format!("Imputed {} 'Other' genders", imputed));
        }
        report.genders_imputed = imputed;
        Ok(())
    }

    /// Trim and case-normalize String columns: the id column is
    /// upper-cased, every other text column is title-cased.
    pub fn normalize_text(
        df: &mut DataFrame,
        report: &mut CleaningReport,
    ) -> Result<(), CleanerError> {
        let column_names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        for col_name in &column_names {
            let Ok(col) = df.column(col_name) else {
                continue;
            };
            let series = col.as_materialized_series();
            if series.dtype() != &DataType::String {
                continue;
            }

            let str_series = series.str()?;
            let is_id = col_name == schema::STUDENT_ID;
            let values: Vec<Option<String>> = str_series
                .into_iter()
                .map(|opt_val| {
                    opt_val.map(|val| {
                        if is_id {
                            val.trim().to_uppercase()
                        } else {
                            title_case(val)
                        }
                    })
                })
                .collect();

            let replaced = Series::new(col_name.as_str().into(), values);
            df.replace(col_name, replaced)?;
        }

        report.steps.push("Normalized text columns".to_string());
        Ok(())
    }

    /// Clip numeric columns to the documented bounds. Integer columns stay
    /// integer; clipping never removes rows.
    pub fn clip_bounds(
        df: &mut DataFrame,
        report: &mut CleaningReport,
    ) -> Result<(), CleanerError> {
        let column_names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        let mut total_clipped = 0usize;

        for col_name in &column_names {
            let Some((lo, hi)) = schema::clip_bounds(col_name) else {
                continue;
            };
            let Ok(col) = df.column(col_name) else {
                continue;
            };
            let series = col.as_materialized_series().clone();

            let clipped = match series.dtype() {
                DataType::Int8
                | DataType::Int16
                | DataType::Int32
                | DataType::Int64
                | DataType::UInt8
                | DataType::UInt16
                | DataType::UInt32
                | DataType::UInt64 => {
                    let lo_i = if lo.is_finite() { lo as i64 } else { i64::MIN };
                    let hi_i = if hi.is_finite() { hi as i64 } else { i64::MAX };
                    let ca = series.cast(&DataType::Int64)?;
                    let ca = ca.i64()?;
                    let mut clipped_count = 0usize;
                    let values: Vec<Option<i64>> = ca
                        .into_iter()
                        .map(|opt| {
                            opt.map(|v| {
                                let c = v.clamp(lo_i, hi_i);
                                if c != v {
                                    clipped_count += 1;
                                }
                                c
                            })
                        })
                        .collect();
                    total_clipped += clipped_count;
                    if clipped_count == 0 {
                        continue;
                    }
                    Series::new(col_name.as_str().into(), values)
                }
                DataType::Float32 | DataType::Float64 => {
                    let ca = series.cast(&DataType::Float64)?;
                    let ca = ca.f64()?;
                    let mut clipped_count = 0usize;
                    let values: Vec<Option<f64>> = ca
                        .into_iter()
                        .map(|opt| {
                            opt.map(|v| {
                                let c = v.clamp(lo, hi);
                                if c != v {
                                    clipped_count += 1;
                                }
                                c
                            })
                        })
                        .collect();
                    total_clipped += clipped_count;
                    if clipped_count == 0 {
                        continue;
                    }
                    Series::new(col_name.as_str().into(), values)
                }
                _ => continue,
            };

            df.replace(col_name, clipped)?;
            report
                .steps
                .push(format!("Clipped '{}' to [{}, {}]", col_name, lo, hi));
        }

        report.cells_clipped = total_clipped;
        Ok(())
    }

    /// Fill missing values in place of dropping rows: numeric columns take
    /// the column mean (promoting to Float64), text columns take "Unknown".
    pub fn fill_missing(
        df: &mut DataFrame,
        report: &mut CleaningReport,
    ) -> Result<(), CleanerError> {
        let column_names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        for col_name in &column_names {
            let Ok(col) = df.column(col_name) else {
                continue;
            };
            let series = col.as_materialized_series();
            let null_count = series.null_count();
            if null_count == 0 {
                continue;
            }

            if series.dtype() == &DataType::String {
                let str_series = series.str()?;
                let values: Vec<Option<String>> = str_series
                    .into_iter()
                    .map(|opt_val| {
                        Some(
                            opt_val
                                .map(|v| v.to_string())
                                .unwrap_or_else(|| schema::UNKNOWN.to_string()),
                        )
                    })
                    .collect();
                let replaced = Series::new(col_name.as_str().into(), values);
                df.replace(col_name, replaced)?;
                report.categorical_cells_filled += null_count;
                report.steps.push(format!(
                    "Filled {} missing '{}' with '{}'",
                    null_count,
                    col_name,
                    schema::UNKNOWN
                ));
            } else if is_numeric(series.dtype()) {
                let Some(mean_val) = series.mean() else {
                    continue;
                };
                let ca = series.cast(&DataType::Float64)?;
                let ca = ca.f64()?;
                let values: Vec<Option<f64>> = ca
                    .into_iter()
                    .map(|opt| Some(opt.unwrap_or(mean_val)))
                    .collect();
                let replaced = Series::new(col_name.as_str().into(), values);
                df.replace(col_name, replaced)?;
                report.numeric_cells_filled += null_count;
                report.steps.push(format!(
                    "Filled {} missing '{}' with mean: {:.2}",
                    null_count, col_name, mean_val
                ));
            }
        }

        Ok(())
    }
}

fn is_numeric(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Float32
            | DataType::Float64
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

/// Title case a value the way the original dashboard did: each word starts
/// upper, the rest goes lower. Also collapses surrounding whitespace.
fn title_case(value: &str) -> String {
    value
        .trim()
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_case_normalizes_words() {
        assert_eq!(title_case("  high school "), "High School");
        assert_eq!(title_case("GOOD"), "Good");
        assert_eq!(title_case("yes"), "Yes");
    }

    #[test]
    fn impute_gender_remaps_other_to_allowed_categories() {
        let mut df = df![
            "gender" => ["Other", "Male", "OTHER", " other ", "Female"],
        ]
        .unwrap();
        let mut report = CleaningReport::default();

        DataCleaner::impute_gender(&mut df, GENDER_IMPUTATION_SEED, &mut report).unwrap();

        assert_eq!(report.genders_imputed, 3);
        let gender = df.column("gender").unwrap();
        let ca = gender.as_materialized_series().str().unwrap().clone();
        for opt in ca.into_iter() {
            let v = opt.unwrap();
            assert!(v == "Male" || v == "Female", "unexpected gender: {}", v);
        }
    }

    #[test]
    fn impute_gender_is_deterministic() {
        let make = || {
            df![
                "gender" => ["Other", "Other", "Other", "Other"],
            ]
            .unwrap()
        };
        let mut a = make();
        let mut b = make();
        let mut ra = CleaningReport::default();
        let mut rb = CleaningReport::default();

        DataCleaner::impute_gender(&mut a, GENDER_IMPUTATION_SEED, &mut ra).unwrap();
        DataCleaner::impute_gender(&mut b, GENDER_IMPUTATION_SEED, &mut rb).unwrap();

        let sa = a.column("gender").unwrap().as_materialized_series();
        let sb = b.column("gender").unwrap().as_materialized_series();
        assert!(sa.equals(sb));
    }

    #[test]
    fn normalize_text_uppercases_ids_and_title_cases_categories() {
        let mut df = df![
            "student_id" => [" s001 ", "s002"],
            "diet_quality" => ["good", " FAIR "],
        ]
        .unwrap();
        let mut report = CleaningReport::default();

        DataCleaner::normalize_text(&mut df, &mut report).unwrap();

        let ids = df.column("student_id").unwrap();
        assert_eq!(ids.get(0).unwrap().to_string(), "\"S001\"");
        assert_eq!(ids.get(1).unwrap().to_string(), "\"S002\"");

        let diet = df.column("diet_quality").unwrap();
        assert_eq!(diet.get(0).unwrap().to_string(), "\"Good\"");
        assert_eq!(diet.get(1).unwrap().to_string(), "\"Fair\"");
    }

    #[test]
    fn clip_bounds_enforces_documented_ranges() {
        let mut df = df![
            "age" => [-3i64, 20],
            "attendance_percentage" => [105.0f64, 87.5],
            "mental_health_rating" => [0i64, 11],
            "sleep_hours" => [-1.5f64, 7.0],
        ]
        .unwrap();
        let mut report = CleaningReport::default();

        DataCleaner::clip_bounds(&mut df, &mut report).unwrap();

        let age = df.column("age").unwrap();
        assert_eq!(age.get(0).unwrap().try_extract::<i64>().unwrap(), 0);
        assert_eq!(age.get(1).unwrap().try_extract::<i64>().unwrap(), 20);

        let att = df.column("attendance_percentage").unwrap();
        assert_eq!(att.get(0).unwrap().try_extract::<f64>().unwrap(), 100.0);
        assert_eq!(att.get(1).unwrap().try_extract::<f64>().unwrap(), 87.5);

        let mh = df.column("mental_health_rating").unwrap();
        assert_eq!(mh.get(0).unwrap().try_extract::<i64>().unwrap(), 1);
        assert_eq!(mh.get(1).unwrap().try_extract::<i64>().unwrap(), 10);

        let sleep = df.column("sleep_hours").unwrap();
        assert_eq!(sleep.get(0).unwrap().try_extract::<f64>().unwrap(), 0.0);

        // age(1) + attendance(1) + rating(2) + sleep(1)
        assert_eq!(report.cells_clipped, 5);
    }

    #[test]
    fn clip_bounds_preserves_in_range_values() {
        let mut df = df![
            "exam_score" => [55.0f64, 99.9],
        ]
        .unwrap();
        let mut report = CleaningReport::default();

        DataCleaner::clip_bounds(&mut df, &mut report).unwrap();

        let score = df.column("exam_score").unwrap();
        assert_eq!(score.get(1).unwrap().try_extract::<f64>().unwrap(), 99.9);
        assert_eq!(report.cells_clipped, 0);
    }

    #[test]
    fn fill_missing_uses_mean_for_numeric() {
        let mut df = df![
            "exam_score" => [Some(60.0f64), None, Some(80.0)],
        ]
        .unwrap();
        let mut report = CleaningReport::default();

        DataCleaner::fill_missing(&mut df, &mut report).unwrap();

        let score = df.column("exam_score").unwrap();
        assert_eq!(score.null_count(), 0);
        assert_eq!(score.get(1).unwrap().try_extract::<f64>().unwrap(), 70.0);
        assert_eq!(report.numeric_cells_filled, 1);
    }

    #[test]
    fn fill_missing_uses_placeholder_for_categorical() {
        let mut df = df![
            "diet_quality" => [Some("Good"), None, Some("Poor")],
        ]
        .unwrap();
        let mut report = CleaningReport::default();

        DataCleaner::fill_missing(&mut df, &mut report).unwrap();

        let diet = df.column("diet_quality").unwrap();
        assert_eq!(diet.null_count(), 0);
        assert_eq!(diet.get(1).unwrap().to_string(), "\"Unknown\"");
        assert_eq!(report.categorical_cells_filled, 1);
    }

    #[test]
    fn full_pipeline_preserves_rows_and_removes_nulls() {
        let df = df![
            "student_id" => [Some(" s001"), Some("s002 "), Some("s003"), None],
            "gender" => [Some("other"), Some("Male"), None, Some("Female")],
            "age" => [Some(-1i64), Some(20), Some(22), None],
            "sleep_hours" => [Some(7.5f64), Some(-2.0), None, Some(6.0)],
            "diet_quality" => [Some("good"), None, Some("FAIR"), Some("poor")],
            "exam_score" => [Some(88.0f64), Some(120.0), Some(40.0), None],
        ]
        .unwrap();
        let rows = df.height();

        let (cleaned, report) = DataCleaner::clean(df).unwrap();

        assert_eq!(cleaned.height(), rows);
        for col in cleaned.get_columns() {
            assert_eq!(col.null_count(), 0, "nulls left in {}", col.name());
        }
        assert_eq!(report.genders_imputed, 1);
        assert!(report.cells_clipped >= 3); // age, sleep_hours, exam_score
        assert!(!report.summary().is_empty());
    }
}
