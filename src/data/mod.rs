//! Data module - CSV loading, cleaning and filtering

mod cleaner;
mod filters;
mod loader;
pub mod schema;

pub use cleaner::{CleanerError, CleaningReport, DataCleaner};
pub use filters::{apply_filters, CategoricalFilter, FilterError};
pub use loader::{DataLoader, LoaderError};
