use newsdesk_core::Label;

use crate::ClassifierError;

/// Map a raw score vector to its label by arg-max.
///
/// Ties resolve to the lowest index. A vector of the wrong width or one
/// containing NaN is an inference failure, never a guess.
pub fn label_from_logits(logits: &[f32]) -> Result<Label, ClassifierError> {
    if logits.len() != Label::COUNT {
        return Err(ClassifierError::Inference(format!(
            "expected {} logits, got {}",
            Label::COUNT,
            logits.len()
        )));
    }
    if logits.iter().any(|x| x.is_nan()) {
        return Err(ClassifierError::Inference("logits contain NaN".into()));
    }

    let mut best = 0;
    for (i, &score) in logits.iter().enumerate().skip(1) {
        if score > logits[best] {
            best = i;
        }
    }
    Label::from_index(best)
        .ok_or_else(|| ClassifierError::Inference(format!("no label for class index {best}")))
}
