pub mod models;
pub mod prediction_cache;

pub use models::CachedPrediction;
pub use prediction_cache::PredictionCache;
