/// Data layer: records, providers, loading, and filtering.
///
/// Architecture:
/// ```text
///  .parquet / .json / .csv        seed
///        │                          │
///        ▼                          │
///   ┌──────────┐                    │
///   │  loader   │  parse file → Vec<Filing>
///   └──────────┘                    │
///        │                          │
///        ▼                          ▼
///   ┌──────────────────────────────────┐
///   │ provider   list_all / get_by_id   │
///   └──────────────────────────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  tab → fund type → status → year → search → page
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod provider;
pub mod seed;
