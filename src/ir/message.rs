//! Message records.

use crate::types::{
    Location,
    TranslationStatus,
};

/// Translated text of a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationText {
    Single(String),
    /// One form per plural category of the target language, in category order.
    Numerus(Vec<String>),
}

impl Default for TranslationText {
    fn default() -> Self {
        Self::Single(String::new())
    }
}

impl TranslationText {
    /// True when no text was provided (every numerus form empty counts too).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Single(text) => text.is_empty(),
            Self::Numerus(forms) => forms.iter().all(String::is_empty),
        }
    }
}

/// A single `<message>` of a context.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Message {
    /// Original-language text, the lookup key within a context.
    pub source: String,
    /// Disambiguation comment. Identical sources with different comments are different messages.
    pub comment: Option<String>,
    /// `id` attribute for ID-based translation workflows.
    pub id: Option<String>,
    pub old_source: Option<String>,
    /// Note from the developer to the translator (`//:` in the source code).
    pub extra_comment: Option<String>,
    pub translator_comment: Option<String>,
    pub locations: Vec<Location>,
    pub status: TranslationStatus,
    pub translation: TranslationText,
}

impl Message {
    /// Finished, non-plural message.
    pub fn new(source: impl Into<String>, translation: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            translation: TranslationText::Single(translation.into()),
            ..Self::default()
        }
    }

    /// Finished numerus message.
    pub fn numerus<I, S>(source: impl Into<String>, forms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            source: source.into(),
            translation: TranslationText::Numerus(forms.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_status(mut self, status: TranslationStatus) -> Self {
        self.status = status;
        self
    }

    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    #[must_use]
    pub const fn is_numerus(&self) -> bool {
        matches!(self.translation, TranslationText::Numerus(_))
    }

    /// Disambiguation comment, empty when absent.
    #[must_use]
    pub fn disambiguation(&self) -> &str {
        self.comment.as_deref().unwrap_or_default()
    }

    /// Borrowed lookup key of this message inside `context`.
    #[must_use]
    pub fn key<'a>(&'a self, context: &'a str) -> MessageKey<'a> {
        MessageKey { context, source: &self.source, comment: self.disambiguation() }
    }
}

/// Logical identity of a message. Locations are not part of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageKey<'a> {
    pub context: &'a str,
    pub source: &'a str,
    pub comment: &'a str,
}
