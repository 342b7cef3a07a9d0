use crate::cache::models::CachedPrediction;
use shared::PredictionResult;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Session-scoped store bridging the upload step to the later notification
/// step. Last write wins per session; no TTL of its own (lifetime is the
/// hosting session mechanism's problem); only ever written on full pipeline
/// success.
#[derive(Clone, Default)]
pub struct PredictionCache {
    entries: Arc<Mutex<HashMap<String, CachedPrediction>>>,
}

impl PredictionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, session_id: &str, result: PredictionResult) {
        self.entries
            .lock()
            .unwrap()
            .insert(session_id.to_string(), CachedPrediction::new(result));
    }

    /// Absence is a normal outcome: no upload yet, or the session expired.
    pub fn get(&self, session_id: &str) -> Option<PredictionResult> {
        self.entries
            .lock()
            .unwrap()
            .get(session_id)
            .map(|entry| entry.result.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn result(top: &str, email: &str) -> PredictionResult {
        let mut predictions = BTreeMap::new();
        predictions.insert(top.to_string(), 0.9);
        PredictionResult {
            predictions,
            highest_class: top.to_string(),
            highest_probability: 0.9,
            recipient_email: email.to_string(),
        }
    }

    #[test]
    fn put_then_get_returns_the_stored_value() {
        let cache = PredictionCache::new();
        let stored = result("Serous", "patient@example.com");
        cache.put("session-1", stored.clone());
        assert_eq!(cache.get("session-1"), Some(stored));
    }

    #[test]
    fn get_without_put_is_none() {
        let cache = PredictionCache::new();
        assert_eq!(cache.get("nope"), None);
    }

    #[test]
    fn last_write_wins_per_session() {
        let cache = PredictionCache::new();
        cache.put("s", result("Mucinous", "a@example.com"));
        cache.put("s", result("Serous", "b@example.com"));
        let got = cache.get("s").unwrap();
        assert_eq!(got.highest_class, "Serous");
        assert_eq!(got.recipient_email, "b@example.com");
    }

    #[test]
    fn sessions_do_not_contend() {
        let cache = PredictionCache::new();
        cache.put("s1", result("Serous", "a@example.com"));
        cache.put("s2", result("Mucinous", "b@example.com"));
        assert_eq!(cache.get("s1").unwrap().highest_class, "Serous");
        assert_eq!(cache.get("s2").unwrap().highest_class, "Mucinous");
    }
}
