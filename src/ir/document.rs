//! Document-level records: the translation file and its contexts.

use super::message::Message;

/// Schema version written by current `lupdate`.
pub const DEFAULT_VERSION: &str = "2.1";

/// Root of a `.ts` document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TranslationFile {
    /// Target locale, e.g. `pl_PL`.
    pub language: Option<String>,
    pub source_language: Option<String>,
    pub version: Option<String>,
    pub contexts: Vec<Context>,
}

impl TranslationFile {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: Some(language.into()),
            version: Some(DEFAULT_VERSION.to_string()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn context(&self, name: &str) -> Option<&Context> {
        self.contexts.iter().find(|context| context.name == name)
    }

    /// All messages paired with the name of their context, in document order.
    pub fn messages(&self) -> impl Iterator<Item = (&str, &Message)> {
        self.contexts
            .iter()
            .flat_map(|context| context.messages.iter().map(move |m| (context.name.as_str(), m)))
    }

    #[must_use]
    pub fn message_count(&self) -> usize {
        self.contexts.iter().map(|context| context.messages.len()).sum()
    }
}

/// Messages originating from one UI component.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Context {
    pub name: String,
    /// Context-level comment from old Qt 3 era files.
    pub comment: Option<String>,
    pub messages: Vec<Message>,
}

impl Context {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    #[must_use]
    pub fn with_message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }
}
