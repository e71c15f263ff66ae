/// Data layer: core types, loading, and filtering.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  read file → RawTable (header + untyped cells)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  schema   │  resolve columns + CategorySet once, type every row
///   └──────────┘
///        │
///        ▼
///   ┌───────────────┐
///   │ CustomerTable  │  Vec<CustomerRecord>, CategorySet
///   └───────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  category selection → CustomerView (row indices)
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod schema;
