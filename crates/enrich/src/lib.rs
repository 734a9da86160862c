pub mod engine;
pub mod entity;
pub mod normalize;
pub mod relations;
pub mod rules;
pub mod taxonomy;

pub use engine::EnrichmentEngine;
pub use entity::{EnrichedEntity, SuperLabel};
pub use relations::{extract_candidates, CandidateEdge, PROXIMITY_WINDOW};
pub use taxonomy::{Taxonomy, TaxonomyEntry};
