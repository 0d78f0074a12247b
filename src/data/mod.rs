/// Data layer: core types, loading, and filtering.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → TimeSeriesDataset
///   └──────────┘
///        │
///        ▼
///   ┌───────────────────┐
///   │ TimeSeriesDataset  │  Vec<Record>, metric column names
///   └───────────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  inclusive date range → indices → Series
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod filter;
