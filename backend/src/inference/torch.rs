use crate::imaging::preprocess::InputTensor;
use crate::inference::engine::{Classifier, InferenceError};
use std::sync::Mutex;
use tch::{CModule, Device, Kind, Tensor};

/// TorchScript-backed classifier. The module is loaded once onto the best
/// available device; forward passes are serialized through the lock because
/// `CModule` is not `Sync`.
pub struct TorchClassifier {
    module: Mutex<CModule>,
    device: Device,
}

impl TorchClassifier {
    pub fn load(model_path: &str) -> Result<Self, InferenceError> {
        let device = Device::cuda_if_available();
        let module = CModule::load_on_device(model_path, device)
            .map_err(|e| InferenceError::ModelUnavailable(e.to_string()))?;
        Ok(Self {
            module: Mutex::new(module),
            device,
        })
    }
}

impl Classifier for TorchClassifier {
    fn predict(&self, input: &InputTensor) -> Result<Vec<f32>, InferenceError> {
        let (n, h, w, c) = input.dim();
        let data: Vec<f32> = input.iter().copied().collect();
        // The input must live on the module's device or forward raises a
        // device-mismatch error on CUDA builds.
        let tensor = Tensor::from_slice(&data)
            .view([n as i64, h as i64, w as i64, c as i64])
            .to_device(self.device);

        let module = self
            .module
            .lock()
            .map_err(|_| InferenceError::InferenceFailure("model lock poisoned".into()))?;
        let output = module
            .forward_ts(&[tensor])
            .map_err(|e| InferenceError::InferenceFailure(e.to_string()))?;

        // The artifact already emits probabilities; no re-normalization here.
        let flat = output
            .to_device(Device::Cpu)
            .to_kind(Kind::Float)
            .view([-1]);
        let len = flat.size()[0] as usize;
        let mut probabilities = vec![0.0f32; len];
        flat.copy_data(&mut probabilities, len);
        Ok(probabilities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_artifact_is_model_unavailable() {
        let err = match TorchClassifier::load("/nonexistent/ovarian_subtype.pt") {
            Ok(_) => panic!("loaded a nonexistent artifact"),
            Err(e) => e,
        };
        assert!(matches!(err, InferenceError::ModelUnavailable(_)), "{err:?}");
    }
}
