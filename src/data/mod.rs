/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .json / .csv / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → RecordStore   (store: load once per process)
///   └──────────┘
///        │
///        ▼
///   ┌─────────────┐
///   │ RecordStore  │  Vec<Article>, vocabularies, year bounds
///   └─────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  FilterState → filtered articles
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  filtered articles → Summary (metrics + chart data)
///   └───────────┘
/// ```

pub mod aggregate;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
pub mod store;
