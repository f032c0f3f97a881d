//! Artifact resolution: make sure model files exist locally before loading.

mod locator;
mod resolver;

pub use locator::ArtifactLocator;
pub use resolver::{ArtifactError, ArtifactResolver};
