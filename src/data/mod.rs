/// Data layer: core types, loading, inference, and filtering.
///
/// Architecture:
/// ```text
///  .csv / .xlsx bytes
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse bytes → Table (per-column dtype)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  infer    │  text columns → DateTime (whole column or nothing)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ classify  │  numeric / temporal / categorical names
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  category ∧ numeric range → filtered indices
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  stats    │  describe() of the filtered rows
///   └──────────┘
/// ```

pub mod classify;
pub mod filter;
pub mod infer;
pub mod loader;
pub mod model;
pub mod stats;
