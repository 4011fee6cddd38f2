//! Content-based recommendation engine.
//!
//! Instruments are encoded into feature vectors (one-hot categories plus
//! min-max scaled numerics), a client's portfolio is collapsed into one
//! quantity-weighted query vector, and every eligible instrument is ranked
//! by cosine similarity to it.

pub mod aggregate;
pub mod encoder;
pub mod ranker;
pub mod similarity;

pub use encoder::{encode, encode_with_vocabulary, FeatureMatrix, Vocabulary};
pub use ranker::{Eligibility, RecommendOptions, Recommender, VocabularyScope};
