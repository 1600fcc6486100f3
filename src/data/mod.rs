/// Data layer: core types, loading, and filtering.
///
/// Architecture:
/// ```text
///  http .parquet payload
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  fetch + decode → Table (row-major records)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  model    │  Table → Vec<IndicatorRecord>
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  territory set + year interval → filtered rows
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
