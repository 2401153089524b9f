// Service exports
pub mod cache;
pub mod enrichment;

pub use cache::{CacheKey, CacheStats, ReasoningCache};
pub use enrichment::{Enricher, EnrichmentClient, EnrichmentError, EnrichmentPayload};
