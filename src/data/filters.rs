//! Categorical set-membership filtering for the dashboard sidebar.

use polars::prelude::*;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// A multiselect filter over one categorical column. Rows survive when the
/// column value is a member of `selected`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoricalFilter {
    pub column: String,
    pub selected: Vec<String>,
}

impl CategoricalFilter {
    pub fn new(column: impl Into<String>, selected: Vec<String>) -> Self {
        Self {
            column: column.into(),
            selected,
        }
    }

    /// Membership as an OR-fold of equality expressions. An empty
    /// selection matches nothing.
    fn to_expr(&self) -> Expr {
        let mut iter = self.selected.iter();
        let Some(first) = iter.next() else {
            return lit(false);
        };
        let mut expr = col(self.column.as_str()).eq(lit(first.as_str()));
        for value in iter {
            expr = expr.or(col(self.column.as_str()).eq(lit(value.as_str())));
        }
        expr
    }
}

/// Apply every filter (combined with AND). The result is always a subset
/// of the input: filters only ever remove rows.
pub fn apply_filters(
    df: &DataFrame,
    filters: &[CategoricalFilter],
) -> Result<DataFrame, FilterError> {
    // Filters on columns the frame does not have are ignored rather than
    // erroring, so a stale saved selection cannot break a new dataset.
    let mut applicable = filters
        .iter()
        .filter(|f| df.get_column_names().iter().any(|c| c.as_str() == f.column));

    let Some(first) = applicable.next() else {
        return Ok(df.clone());
    };
    let mut expr = first.to_expr();
    for filter in applicable {
        expr = expr.and(filter.to_expr());
    }

    let filtered = df.clone().lazy().filter(expr).collect()?;
    Ok(filtered)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DataFrame {
        df![
            "gender" => ["Male", "Female", "Male", "Female", "Male"],
            "part_time_job" => ["Yes", "No", "No", "Yes", "No"],
            "exam_score" => [80.0f64, 90.0, 70.0, 60.0, 85.0],
        ]
        .unwrap()
    }

    #[test]
    fn selecting_all_values_is_identity() {
        let df = sample();
        let filters = [CategoricalFilter::new(
            "gender",
            vec!["Male".into(), "Female".into()],
        )];

        let filtered = apply_filters(&df, &filters).unwrap();
        assert_eq!(filtered.height(), df.height());
    }

    #[test]
    fn filters_by_set_membership() {
        let df = sample();
        let filters = [CategoricalFilter::new("gender", vec!["Female".into()])];

        let filtered = apply_filters(&df, &filters).unwrap();
        assert_eq!(filtered.height(), 2);

        let gender = filtered.column("gender").unwrap();
        for i in 0..filtered.height() {
            assert_eq!(gender.get(i).unwrap().to_string(), "\"Female\"");
        }
    }

    #[test]
    fn filters_combine_with_and() {
        let df = sample();
        let filters = [
            CategoricalFilter::new("gender", vec!["Male".into()]),
            CategoricalFilter::new("part_time_job", vec!["No".into()]),
        ];

        let filtered = apply_filters(&df, &filters).unwrap();
        assert_eq!(filtered.height(), 2);
    }

    #[test]
    fn narrowing_a_selection_is_monotone() {
        let df = sample();

        let wide = apply_filters(
            &df,
            &[CategoricalFilter::new(
                "part_time_job",
                vec!["Yes".into(), "No".into()],
            )],
        )
        .unwrap();
        let narrow = apply_filters(
            &df,
            &[CategoricalFilter::new("part_time_job", vec!["Yes".into()])],
        )
        .unwrap();
        let empty = apply_filters(&df, &[CategoricalFilter::new("part_time_job", vec![])]).unwrap();

        assert!(wide.height() <= df.height());
        assert!(narrow.height() <= wide.height());
        assert_eq!(empty.height(), 0);
    }

    #[test]
    fn unknown_columns_are_ignored() {
        let df = sample();
        let filters = [CategoricalFilter::new("no_such_column", vec!["X".into()])];

        let filtered = apply_filters(&df, &filters).unwrap();
        assert_eq!(filtered.height(), df.height());
    }
}
