//! Stats module - descriptive statistics, correlations and KPIs

mod calculator;

pub use calculator::{
    CorrelationStats, Kpis, StatsCalculator, SummaryStats, SIGNIFICANCE_THRESHOLD,
};
