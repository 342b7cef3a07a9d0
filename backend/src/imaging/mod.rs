pub mod analysis;
pub mod decode;
pub mod gate;
pub mod preprocess;

pub use decode::{DecodedImage, SourceColorMode};
pub use gate::{GateVerdict, HistopathologyGate, RejectReason};
