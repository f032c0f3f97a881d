//! Tokenization into fixed-shape BERT inputs.

use std::path::Path;

use tokenizers::Tokenizer;
use tracing::debug;

use crate::ClassifierError;

/// Maximum sequence length of the encoder, special tokens included.
pub const MAX_SEQUENCE_LENGTH: usize = 512;

/// Model inputs for a batch of one: `[1, len]` each.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedInput {
    pub input_ids: Vec<i64>,
    pub attention_mask: Vec<i64>,
    pub token_type_ids: Vec<i64>,
    /// Attended tokens that are not `[CLS]`/`[SEP]`/padding.
    pub content_tokens: usize,
}

impl EncodedInput {
    pub fn len(&self) -> usize {
        self.input_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.input_ids.is_empty()
    }
}

/// Tokenizer configured for truncation to [`MAX_SEQUENCE_LENGTH`] and
/// batch-longest padding.
pub struct Encoder {
    tokenizer: Tokenizer,
}

impl Encoder {
    /// Load a `tokenizer.json` file.
    pub fn from_file(path: &Path) -> Result<Self, ClassifierError> {
        if !path.exists() {
            return Err(ClassifierError::ArtifactMissing(path.to_path_buf()));
        }
        let tokenizer = Tokenizer::from_file(path).map_err(|e| ClassifierError::ModelLoad {
            path: path.to_path_buf(),
            reason: format!("load tokenizer: {e}"),
        })?;
        Self::from_tokenizer(tokenizer).map_err(|e| match e {
            ClassifierError::Inference(reason) => ClassifierError::ModelLoad {
                path: path.to_path_buf(),
                reason,
            },
            other => other,
        })
    }

    pub fn from_tokenizer(mut tokenizer: Tokenizer) -> Result<Self, ClassifierError> {
        // Longest-first on a single sequence drops tokens from the end.
        tokenizer
            .with_truncation(Some(tokenizers::TruncationParams {
                max_length: MAX_SEQUENCE_LENGTH,
                ..Default::default()
            }))
            .map_err(|e| ClassifierError::Inference(format!("set truncation: {e}")))?;

        tokenizer.with_padding(Some(tokenizers::PaddingParams::default()));

        Ok(Self { tokenizer })
    }

    /// Tokenize one text, keeping the first [`MAX_SEQUENCE_LENGTH`] tokens.
    pub fn encode(&self, text: &str) -> Result<EncodedInput, ClassifierError> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| ClassifierError::Inference(format!("tokenize: {e}")))?;

        let input_ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
        let attention_mask: Vec<i64> = encoding
            .get_attention_mask()
            .iter()
            .map(|&m| m as i64)
            .collect();
        let token_type_ids: Vec<i64> = encoding.get_type_ids().iter().map(|&t| t as i64).collect();

        let content_tokens = encoding
            .get_special_tokens_mask()
            .iter()
            .zip(encoding.get_attention_mask())
            .filter(|&(&special, &mask)| special == 0 && mask == 1)
            .count();

        debug!(tokens = input_ids.len(), content_tokens, "encoded text");

        if content_tokens == 0 {
            return Err(ClassifierError::EmptyInput);
        }

        Ok(EncodedInput {
            input_ids,
            attention_mask,
            token_type_ids,
            content_tokens,
        })
    }
}
