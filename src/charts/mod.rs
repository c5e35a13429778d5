//! Charts module - catalogue, interactive plotting and PNG export

mod catalogue;
mod exporter;
mod plotter;

pub use catalogue::{
    build_chart_data, dashboard_catalogue, ChartContent, ChartData, ChartKind, ChartSpec,
    HISTOGRAM_BINS,
};
pub use exporter::ChartExporter;
pub use plotter::ChartPlotter;
