//! Enrichment domain - what each data source tells us about an area.
//!
//! - `SourceKind` / `SourceErrorKind` / `DataOrigin` - source identity, failure class, provenance
//! - Snapshots - the fixed normalised schema of every source
//! - `SourceResult` / `EnrichmentRecord` / `EnrichmentOutcome` - per-request aggregation

mod record;
mod snapshots;
mod source;

pub use record::{EnrichmentOutcome, EnrichmentRecord, SourceResult};
pub use snapshots::{
    AmenitiesSnapshot, CommuteSnapshot, CrimeSnapshot, GeographySnapshot, PriceTrends,
    PropertySnapshot, ResearchSnapshot, SchoolsSnapshot, SourceData,
};
pub use source::{DataOrigin, SourceErrorKind, SourceKind};
