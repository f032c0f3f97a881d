//! Inference layer: ONNX Runtime sequence classification over a BERT encoder.

mod cell;
mod error;
mod scores;

pub use cell::ModelCell;
pub use error::ClassifierError;
pub use scores::label_from_logits;

#[cfg(feature = "onnx")]
mod classifier;
#[cfg(feature = "onnx")]
mod encoding;
#[cfg(feature = "onnx")]
pub use classifier::OnnxClassifier;
#[cfg(feature = "onnx")]
pub use encoding::{EncodedInput, Encoder, MAX_SEQUENCE_LENGTH};

use newsdesk_core::Label;

/// A loaded single-text classifier.
///
/// Implementations are read-only after construction and may be shared
/// across threads.
pub trait TextClassifier: Send + Sync {
    fn predict(&self, text: &str) -> Result<Label, ClassifierError>;
}
