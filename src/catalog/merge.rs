//! Combining several documents into one.
//!
//! The same (context, source, comment) key may appear in more than one
//! input, or twice in one input. [`MergeStrategy`] decides which entry
//! survives; the survivor keeps the position of the key's first appearance.

use std::collections::HashMap;

use serde::{
    Deserialize,
    Serialize,
};

use crate::error::CatalogError;
use crate::ir::{
    Context,
    Message,
    TranslationFile,
};

/// Policy for duplicate (context, source, comment) keys.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum MergeStrategy {
    /// The entry loaded last replaces earlier ones.
    #[default]
    LastWins,
    /// The entry loaded first is kept, later ones are dropped.
    FirstWins,
    /// Any duplicate fails the merge.
    Reject,
}

/// Incremental merge of translation files.
#[derive(Debug, Default)]
pub struct Merger {
    strategy: MergeStrategy,
    file: TranslationFile,
    /// Context name -> position in `file.contexts`.
    contexts: HashMap<String, usize>,
    /// (context position, source, comment) -> position in the context's messages.
    messages: HashMap<(usize, String, String), usize>,
    duplicates: usize,
}

impl Merger {
    #[must_use]
    pub fn new(strategy: MergeStrategy) -> Self {
        Self { strategy, ..Self::default() }
    }

    /// Number of duplicate keys resolved so far.
    #[must_use]
    pub const fn duplicates(&self) -> usize {
        self.duplicates
    }

    pub fn add(&mut self, file: TranslationFile) -> Result<(), CatalogError> {
        self.merge_header(&file);

        for context in file.contexts {
            let position = self.context_position(&context);
            for message in context.messages {
                self.add_message(position, &context.name, message)?;
            }
        }

        Ok(())
    }

    fn merge_header(&mut self, file: &TranslationFile) {
        match (&self.file.language, &file.language) {
            (None, Some(language)) => self.file.language = Some(language.clone()),
            (Some(current), Some(language)) if current != language => {
                tracing::warn!(
                    "Merging translations for '{language}' into a catalog for '{current}', keeping '{current}'"
                );
            }
            _ => {}
        }

        if self.file.source_language.is_none() {
            self.file.source_language.clone_from(&file.source_language);
        }
        if self.file.version.is_none() {
            self.file.version.clone_from(&file.version);
        }
    }

    fn context_position(&mut self, context: &Context) -> usize {
        if let Some(&position) = self.contexts.get(&context.name) {
            if let Some(existing) = self.file.contexts.get_mut(position)
                && existing.comment.is_none()
            {
                existing.comment.clone_from(&context.comment);
            }
            return position;
        }

        let position = self.file.contexts.len();
        self.file.contexts.push(Context {
            name: context.name.clone(),
            comment: context.comment.clone(),
            messages: Vec::new(),
        });
        self.contexts.insert(context.name.clone(), position);
        position
    }

    fn add_message(
        &mut self,
        context_position: usize,
        context_name: &str,
        message: Message,
    ) -> Result<(), CatalogError> {
        let Some(context) = self.file.contexts.get_mut(context_position) else {
            return Ok(());
        };

        let key = (context_position, message.source.clone(), message.disambiguation().to_string());
        let Some(&position) = self.messages.get(&key) else {
            self.messages.insert(key, context.messages.len());
            context.messages.push(message);
            return Ok(());
        };

        self.duplicates += 1;
        let Some(existing) = context.messages.get_mut(position) else {
            return Ok(());
        };

        if existing.translation != message.translation || existing.status != message.status {
            tracing::warn!(
                strategy = ?self.strategy,
                "Conflicting translations for '{}' in context '{context_name}'",
                message.source
            );
        } else {
            tracing::debug!("Duplicate message '{}' in context '{context_name}'", message.source);
        }

        match self.strategy {
            MergeStrategy::LastWins => *existing = message,
            MergeStrategy::FirstWins => {}
            MergeStrategy::Reject => {
                return Err(CatalogError::DuplicateMessage {
                    context: context_name.to_string(),
                    source_text: message.source,
                });
            }
        }

        Ok(())
    }

    #[must_use]
    pub fn finish(self) -> TranslationFile {
        self.file
    }
}

/// Merge files in order under `strategy`.
pub fn merge_files<I>(files: I, strategy: MergeStrategy) -> Result<TranslationFile, CatalogError>
where
    I: IntoIterator<Item = TranslationFile>,
{
    let mut merger = Merger::new(strategy);
    for file in files {
        merger.add(file)?;
    }
    if merger.duplicates() > 0 {
        tracing::debug!(duplicates = merger.duplicates(), ?strategy, "Resolved duplicate messages");
    }
    Ok(merger.finish())
}
