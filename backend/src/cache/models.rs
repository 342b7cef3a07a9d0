use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::PredictionResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedPrediction {
    pub result: PredictionResult,
    pub created_at: DateTime<Utc>,
}

impl CachedPrediction {
    pub fn new(result: PredictionResult) -> Self {
        Self {
            result,
            created_at: Utc::now(),
        }
    }
}
