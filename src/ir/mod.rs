//! In-memory representation of a translation catalog document.
mod document;
mod message;

pub use document::{
    Context,
    DEFAULT_VERSION,
    TranslationFile,
};
pub use message::{
    Message,
    MessageKey,
    TranslationText,
};
