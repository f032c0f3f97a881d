pub mod article;
pub mod interaction;
pub mod label;

pub use article::{ArticleText, UserName, ValidationError};
pub use interaction::{InteractionRecord, NewInteraction};
pub use label::{Label, ParseLabelError};
