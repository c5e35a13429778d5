//! CSV Data Loader Module
//! Handles CSV file loading and column extraction using Polars.

use polars::prelude::*;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
}

/// Holds the cleaned DataFrame the dashboard works from.
pub struct DataLoader {
    df: Option<DataFrame>,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    pub fn new() -> Self {
        Self { df: None }
    }

    /// Read a CSV file into a DataFrame with trimmed column names.
    /// This is the entry point used by the background load thread.
    pub fn read_csv(file_path: &str) -> Result<DataFrame, LoaderError> {
        // Use lazy evaluation for memory efficiency, then collect
        let mut df = LazyCsvReader::new(file_path)
            .with_infer_schema_length(Some(10000))
            .with_ignore_errors(true)
            .finish()?
            .collect()?;

        Self::trim_column_names(&mut df)?;
        info!(rows = df.height(), cols = df.width(), "CSV loaded");
        Ok(df)
    }

    /// Strip whitespace from column headers in place.
    pub fn trim_column_names(df: &mut DataFrame) -> Result<(), LoaderError> {
        let trimmed: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|name| name.trim().to_string())
            .collect();
        df.set_column_names(trimmed)?;
        Ok(())
    }

    /// Unique non-null values of a column as sorted strings, for stable
    /// filter lists.
    pub fn unique_values(df: &DataFrame, column: &str) -> Vec<String> {
        df.column(column)
            .ok()
            .and_then(|col| col.unique().ok())
            .map(|unique| {
                let series = unique.as_materialized_series();
                let mut values: Vec<String> = (0..series.len())
                    .filter_map(|i| {
                        let val = series.get(i).ok()?;
                        if val.is_null() {
                            None
                        } else {
                            Some(val.to_string().trim_matches('"').to_string())
                        }
                    })
                    .collect();
                values.sort();
                values
            })
            .unwrap_or_default()
    }

    /// Get a reference to the loaded DataFrame.
    pub fn get_dataframe(&self) -> Option<&DataFrame> {
        self.df.as_ref()
    }

    /// Set DataFrame directly (used for async loading)
    pub fn set_dataframe(&mut self, df: DataFrame) {
        self.df = Some(df);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trim_column_names_strips_whitespace() {
        let mut df = df![
            " age " => [20i64, 21],
            "gender" => ["Male", "Female"],
        ]
        .unwrap();

        DataLoader::trim_column_names(&mut df).unwrap();

        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(names, vec!["age", "gender"]);
    }

    #[test]
    fn unique_values_sorted_without_nulls() {
        let df = df![
            "gender" => [Some("Male"), Some("Female"), None, Some("Male")],
        ]
        .unwrap();

        let values = DataLoader::unique_values(&df, "gender");
        assert_eq!(values, vec!["Female", "Male"]);
    }
}
