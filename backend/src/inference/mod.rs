pub mod engine;
#[cfg(feature = "torch")]
pub mod torch;

pub use engine::{Classifier, InferenceEngine, InferenceError};
#[cfg(feature = "torch")]
pub use torch::TorchClassifier;
