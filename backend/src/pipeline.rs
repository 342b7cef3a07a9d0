use crate::config::GateConfig;
use crate::imaging::decode::{DecodedImage, SourceColorMode};
use crate::imaging::gate::{GateVerdict, HistopathologyGate, RejectReason};
use crate::imaging::preprocess::{self, MODEL_INPUT_SIZE};
use crate::inference::engine::{InferenceEngine, InferenceError};
use shared::PredictionResult;
use std::sync::Arc;

/// Index-to-class table matching the classifier's training-time output
/// order. Process-wide constant; any mismatch with the artifact is a silent
/// correctness bug, so the order is pinned by an integration test.
pub const CLASS_LABELS: [&str; 5] = [
    "Clear_Cell",
    "Endometri",
    "Mucinous",
    "Non_Cancerous",
    "Serous",
];

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The upload could not be decoded as an image at all.
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(#[from] image::ImageError),
    /// Decoded fine, but not an RGB or RGBA image.
    #[error("invalid color mode; expected an RGB or RGBA image")]
    InvalidColorMode,
    /// The content gate turned the upload away.
    #[error("content rejected: {0}")]
    ContentRejected(RejectReason),
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),
    #[error("inference failure: {0}")]
    InferenceFailure(String),
    /// Catch-all for unexpected failures; details stay in server logs.
    #[error("classification failed")]
    PipelineFailure,
}

impl From<InferenceError> for PipelineError {
    fn from(err: InferenceError) -> Self {
        match err {
            InferenceError::ModelUnavailable(msg) => PipelineError::ModelUnavailable(msg),
            InferenceError::InferenceFailure(msg) => PipelineError::InferenceFailure(msg),
        }
    }
}

/// Orchestrates decode -> gate -> preprocess -> predict -> label mapping.
/// The only component with a contract toward the upload handler.
pub struct ClassificationPipeline {
    gate: HistopathologyGate,
    engine: Arc<InferenceEngine>,
}

impl ClassificationPipeline {
    pub fn new(config: GateConfig, engine: Arc<InferenceEngine>) -> Self {
        Self {
            gate: HistopathologyGate::new(config),
            engine,
        }
    }

    /// Classifies one upload. `recipient_email` travels through verbatim;
    /// validating it is the upload collaborator's job, not ours.
    pub fn classify(
        &self,
        raw_bytes: &[u8],
        recipient_email: &str,
    ) -> Result<PredictionResult, PipelineError> {
        let dynamic = image::load_from_memory(raw_bytes)?;
        let decoded = DecodedImage::from_dynamic(dynamic);
        if decoded.source_mode() == SourceColorMode::Other {
            return Err(PipelineError::InvalidColorMode);
        }

        match self.gate.evaluate(&decoded) {
            GateVerdict::Rejected(reason) => return Err(PipelineError::ContentRejected(reason)),
            GateVerdict::Accepted => {}
        }

        let tensor = preprocess::prepare(&decoded, MODEL_INPUT_SIZE);
        let probabilities = self.engine.predict(&tensor)?;
        if probabilities.len() != CLASS_LABELS.len() {
            return Err(PipelineError::InferenceFailure(format!(
                "expected {} class probabilities, got {}",
                CLASS_LABELS.len(),
                probabilities.len()
            )));
        }

        // Argmax with ties resolved to the lowest index.
        let (top_index, top_probability) = probabilities
            .iter()
            .enumerate()
            .fold((0usize, probabilities[0]), |best, (i, &p)| {
                if p > best.1 { (i, p) } else { best }
            });

        let predictions = CLASS_LABELS
            .iter()
            .zip(probabilities.iter())
            .map(|(label, &p)| (label.to_string(), p))
            .collect();

        Ok(PredictionResult {
            predictions,
            highest_class: CLASS_LABELS[top_index].to_string(),
            highest_probability: top_probability,
            recipient_email: recipient_email.to_string(),
        })
    }
}
