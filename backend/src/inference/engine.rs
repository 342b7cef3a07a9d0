use crate::imaging::preprocess::InputTensor;
use once_cell::sync::OnceCell;

#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    /// The model artifact could not be loaded (missing or corrupt). An
    /// operational incident, not a user mistake.
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),
    /// The forward pass failed, or the model returned something other than
    /// the expected probability vector.
    #[error("inference failure: {0}")]
    InferenceFailure(String),
}

/// Capability boundary around the trained classifier. The concrete model
/// technology stays swappable: production uses the TorchScript backend,
/// tests plug in stubs returning canned vectors.
///
/// `predict` must be a pure function of (model, tensor): deterministic, no
/// per-call mutation of shared model state.
pub trait Classifier: Send + Sync {
    fn predict(&self, input: &InputTensor) -> Result<Vec<f32>, InferenceError>;
}

type Loader = Box<dyn Fn() -> Result<Box<dyn Classifier>, InferenceError> + Send + Sync>;

/// Holds the classifier behind a lazy, at-most-once initialization.
///
/// The first `predict` call triggers the load; racing first calls block on
/// the cell and observe the same fully-initialized instance. The model stays
/// resident for the process lifetime; there is no teardown or reload. A
/// failed load is reported to that request and retried on the next one.
pub struct InferenceEngine {
    loader: Loader,
    model: OnceCell<Box<dyn Classifier>>,
}

impl InferenceEngine {
    pub fn new(loader: Loader) -> Self {
        Self {
            loader,
            model: OnceCell::new(),
        }
    }

    /// Engine with an already-constructed classifier; the loader never runs.
    pub fn preloaded(classifier: Box<dyn Classifier>) -> Self {
        Self {
            loader: Box::new(|| {
                Err(InferenceError::ModelUnavailable(
                    "preloaded engine has no loader".into(),
                ))
            }),
            model: OnceCell::with_value(classifier),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.model.get().is_some()
    }

    pub fn predict(&self, input: &InputTensor) -> Result<Vec<f32>, InferenceError> {
        let model = self.model.get_or_try_init(|| (self.loader)())?;
        model.predict(input)
    }
}
