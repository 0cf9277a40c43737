pub mod manager;
pub mod normalize;
pub mod reference;
pub mod resolver;
pub mod scorer;

pub use normalize::{coerce_query, NormalizedKey};
pub use reference::ReferenceSet;
pub use resolver::NameResolver;
pub use scorer::{ScoredCandidate, SimilarityAlgorithm, SimilarityScorer, StrsimScorer};
