use crate::imaging::decode::DecodedImage;
use image::imageops::{self, FilterType};
use ndarray::Array4;

/// Input contract of the subtype classifier: NHWC, 224x224, RGB.
pub const MODEL_INPUT_SIZE: (u32, u32) = (224, 224);

/// Batched float tensor in [0,1], shape (1, height, width, 3).
pub type InputTensor = Array4<f32>;

/// Maps a gate-accepted image onto the classifier's tensor contract:
/// full-frame resize (no cropping, no aspect-ratio preservation - the model
/// was trained that way), scale samples to [0,1], prepend a batch axis.
///
/// Resampling uses bilinear (`FilterType::Triangle`); the filter choice
/// shifts downstream probabilities slightly, so keep it stable across
/// deployments.
///
/// Callers must only pass gate-accepted images; this is a contract, not a
/// runtime check.
pub fn prepare(decoded: &DecodedImage, target_size: (u32, u32)) -> InputTensor {
    let (tw, th) = target_size;
    let resized = imageops::resize(decoded.as_rgb(), tw, th, FilterType::Triangle);

    let mut tensor = Array4::<f32>::zeros((1, th as usize, tw as usize, 3));
    for (x, y, px) in resized.enumerate_pixels() {
        for c in 0..3 {
            tensor[(0, y as usize, x as usize, c)] = px[c] as f32 / 255.0;
        }
    }
    tensor
}
