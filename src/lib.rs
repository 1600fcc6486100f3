//! Data layer for a territory/year indicator explorer.
//!
//! Indicator tables are served as parquet payloads. The [`TableLoader`]
//! fetches and decodes one into row-major [`Record`]s, the filter narrows
//! the resulting [`IndicatorRecord`]s by territory and year, and the
//! [`TerritorySelect`] control drives the caller-owned selection set.
//! Rendering is left entirely to the consumer.

pub mod data;
pub mod explorer;
pub mod select;

pub use data::filter::{distinct_territories, filter_records, year_span, YearInterval};
pub use data::loader::{
    decode_table, decode_table_with_schema, fetch_bytes, fetch_table, fetch_table_with_schema,
    LoadError, LoadState, LoadTicket, TableLoader,
};
pub use data::model::{CellValue, IndicatorRecord, Record, Table};
pub use explorer::IndicatorExplorer;
pub use select::TerritorySelect;
