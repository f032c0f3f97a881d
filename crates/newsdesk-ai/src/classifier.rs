//! ONNX Runtime news classifier.
//!
//! Runs a BERT-tiny sequence-classification export (AG News, four classes).
//! The artifact is `model.onnx` with inputs `input_ids`, `attention_mask`,
//! `token_type_ids` and a `[batch, 4]` logits output; the vocabulary is a
//! separate `tokenizer.json`.

use std::path::Path;
use std::sync::Mutex;

use newsdesk_core::Label;
use ort::session::Session;
use ort::value::Tensor;
use tracing::{debug, info};

use crate::encoding::Encoder;
use crate::scores::label_from_logits;
use crate::{ClassifierError, TextClassifier};

/// Sequence classifier holding the ONNX session and its tokenizer.
///
/// Inference only: the session has no training state, and the same weights
/// and text always give the same label.
pub struct OnnxClassifier {
    session: Mutex<Session>,
    encoder: Encoder,
}

impl OnnxClassifier {
    /// Load the model and tokenizer.
    ///
    /// Fails if either file is missing or unreadable, or if the model's
    /// output width is known and is not four.
    pub fn load(model_path: &Path, tokenizer_path: &Path) -> Result<Self, ClassifierError> {
        if !model_path.exists() {
            return Err(ClassifierError::ArtifactMissing(model_path.to_path_buf()));
        }
        let encoder = Encoder::from_file(tokenizer_path)?;

        let session = Session::builder()
            .map_err(|e| load_error(model_path, e))?
            .commit_from_file(model_path)
            .map_err(|e| load_error(model_path, e))?;

        let width = session.outputs().first().and_then(|o| head_width(o.dtype()));
        if let Some(found) = width
            && found != Label::COUNT
        {
            return Err(ClassifierError::IncompatibleHead {
                expected: Label::COUNT,
                found,
            });
        }

        info!(model = %model_path.display(), tokenizer = %tokenizer_path.display(), "loaded classifier");
        Ok(Self {
            session: Mutex::new(session),
            encoder,
        })
    }

    /// Raw class scores for one text.
    pub fn logits(&self, text: &str) -> Result<Vec<f32>, ClassifierError> {
        let encoded = self.encoder.encode(text)?;
        let shape = [1i64, encoded.len() as i64];

        let ids_tensor = Tensor::from_array((shape, encoded.input_ids.into_boxed_slice()))
            .map_err(inference_error)?;
        let mask_tensor = Tensor::from_array((shape, encoded.attention_mask.into_boxed_slice()))
            .map_err(inference_error)?;
        let type_tensor = Tensor::from_array((shape, encoded.token_type_ids.into_boxed_slice()))
            .map_err(inference_error)?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| ClassifierError::Inference("session lock poisoned".into()))?;

        let outputs = session
            .run(ort::inputs![
                "input_ids" => ids_tensor,
                "attention_mask" => mask_tensor,
                "token_type_ids" => type_tensor,
            ])
            .map_err(inference_error)?;

        let (output_shape, output_data) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(inference_error)?;
        let dims: &[i64] = output_shape;
        if dims.len() != 2 || dims[0] != 1 || dims[1] as usize != Label::COUNT {
            return Err(ClassifierError::Inference(format!(
                "unexpected output shape: {dims:?}, expected [1, {}]",
                Label::COUNT
            )));
        }

        Ok(output_data.to_vec())
    }
}

impl TextClassifier for OnnxClassifier {
    fn predict(&self, text: &str) -> Result<Label, ClassifierError> {
        let logits = self.logits(text)?;
        let label = label_from_logits(&logits)?;
        debug!(?logits, %label, "classified");
        Ok(label)
    }
}

fn load_error(path: &Path, err: impl std::fmt::Display) -> ClassifierError {
    ClassifierError::ModelLoad {
        path: path.to_path_buf(),
        reason: err.to_string(),
    }
}

fn inference_error(err: impl std::fmt::Display) -> ClassifierError {
    ClassifierError::Inference(err.to_string())
}

/// Number of classes from the logits output type, when static.
fn head_width(output_type: &ort::value::ValueType) -> Option<usize> {
    match output_type {
        ort::value::ValueType::Tensor { shape, .. } => shape
            .last()
            .and_then(|&d| if d > 0 { Some(d as usize) } else { None }),
        _ => None,
    }
}
