//! In-memory translation catalog and lookups.
//!
//! A [`Catalog`] is built once from one or more parsed documents and is
//! read-only afterwards. Lookups follow `QTranslator` semantics: the
//! (context, source, comment) key selects a message, retired messages are
//! never returned, and anything without a usable translation falls back to
//! the source text.

mod loader;
mod merge;
mod validate;

use std::collections::HashMap;

pub use merge::{
    MergeStrategy,
    Merger,
    merge_files,
};
pub use validate::{
    ContextStatistics,
    Issue,
    IssueKind,
    StatusCounts,
    ValidationReport,
    statistics,
    validate,
    validate_with_rule,
};

use crate::error::CatalogError;
use crate::input::parse_document;
use crate::ir::{
    Message,
    TranslationFile,
    TranslationText,
};
use crate::plural::{
    PluralRule,
    substitute_count,
};
use crate::types::TranslationStatus;

/// Load-time behavior of a catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogOptions {
    /// Refuse to build a catalog whose validation report has issues.
    pub reject_incomplete: bool,
    /// Fail plural lookups past the last numerus form instead of clamping.
    pub strict_plural: bool,
    /// Return unfinished translations that carry text, as `lrelease` does by default.
    pub include_unfinished: bool,
    pub strategy: MergeStrategy,
    /// Overrides the `language` attribute of the documents.
    pub language: Option<String>,
}

impl Default for CatalogOptions {
    fn default() -> Self {
        Self {
            reject_incomplete: false,
            strict_plural: false,
            include_unfinished: true,
            strategy: MergeStrategy::default(),
            language: None,
        }
    }
}

/// Outcome of a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<'a> {
    Translated(&'a str),
    /// No usable translation. Carries the source text to display instead.
    Untranslated(&'a str),
}

impl<'a> Lookup<'a> {
    /// Text to display: the translation, or the source as a fallback.
    #[must_use]
    pub const fn text(self) -> &'a str {
        match self {
            Self::Translated(text) | Self::Untranslated(text) => text,
        }
    }

    #[must_use]
    pub const fn is_translated(self) -> bool {
        matches!(self, Self::Translated(_))
    }
}

/// Read-only translation store.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    language: Option<String>,
    plural_rule: PluralRule,
    options: CatalogOptions,
    /// context -> source -> messages differing only by comment
    contexts: HashMap<String, HashMap<String, Vec<Message>>>,
    message_count: usize,
}

impl Catalog {
    /// Catalog without messages. Every lookup falls back to the source text.
    #[must_use]
    pub fn empty(options: CatalogOptions) -> Self {
        let language = options.language.clone();
        let plural_rule = language.as_deref().map_or_else(PluralRule::default, PluralRule::for_language);
        Self { language, plural_rule, options, ..Self::default() }
    }

    /// Build a catalog from one parsed document.
    pub fn from_file(file: TranslationFile, options: CatalogOptions) -> Result<Self, CatalogError> {
        Self::from_files([file], options)
    }

    /// Merge documents in order under `options.strategy` and build a catalog.
    pub fn from_files<I>(files: I, options: CatalogOptions) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = TranslationFile>,
    {
        let mut file = merge_files(files, options.strategy)?;
        if options.language.is_some() {
            file.language.clone_from(&options.language);
        }

        if options.reject_incomplete {
            let report = validate(&file);
            if !report.is_complete() {
                return Err(CatalogError::Incomplete(report));
            }
        }

        let language = file.language.take();
        let plural_rule = language.as_deref().map_or_else(PluralRule::default, PluralRule::for_language);
        let mut catalog = Self { language, plural_rule, options, ..Self::default() };

        for context in file.contexts {
            let sources = catalog.contexts.entry(context.name).or_default();
            for message in context.messages {
                catalog.message_count += 1;
                sources.entry(message.source.clone()).or_default().push(message);
            }
        }

        tracing::debug!(
            language = ?catalog.language,
            contexts = catalog.contexts.len(),
            messages = catalog.message_count,
            "Built translation catalog"
        );
        Ok(catalog)
    }

    /// Parse a `.ts` document and build a catalog from it.
    pub fn parse(text: &str, options: CatalogOptions) -> Result<Self, CatalogError> {
        Self::from_file(parse_document(text)?, options)
    }

    #[must_use]
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    #[must_use]
    pub const fn plural_rule(&self) -> PluralRule {
        self.plural_rule
    }

    #[must_use]
    pub const fn options(&self) -> &CatalogOptions {
        &self.options
    }

    /// Number of messages, retired ones included.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.message_count
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.message_count == 0
    }

    /// Context names in arbitrary order.
    pub fn context_names(&self) -> impl Iterator<Item = &str> {
        self.contexts.keys().map(String::as_str)
    }

    /// Message stored under the exact (context, source, comment) key.
    ///
    /// `None` and `Some("")` both select the message without a comment.
    #[must_use]
    pub fn find(&self, context: &str, source: &str, comment: Option<&str>) -> Option<&Message> {
        let comment = comment.unwrap_or_default();
        self.contexts
            .get(context)?
            .get(source)?
            .iter()
            .find(|message| message.disambiguation() == comment)
    }

    /// Translation of a non-plural message.
    ///
    /// For numerus messages this yields the first form.
    #[must_use]
    pub fn lookup<'a>(&'a self, context: &str, source: &'a str) -> Lookup<'a> {
        self.lookup_with_comment(context, source, None)
    }

    /// Like [`Self::lookup`], trying the disambiguated key before the plain one.
    #[must_use]
    pub fn lookup_with_comment<'a>(
        &'a self,
        context: &str,
        source: &'a str,
        comment: Option<&str>,
    ) -> Lookup<'a> {
        self.resolve(context, source, comment, |message| Ok(self.select(message, 0)))
            .unwrap_or(Lookup::Untranslated(source))
    }

    /// Numerus form for an explicit plural `category`.
    ///
    /// A category past the last form clamps to the last form, or fails with
    /// `strict_plural`. Messages that are never served do not fail.
    pub fn lookup_plural<'a>(
        &'a self,
        context: &str,
        source: &'a str,
        comment: Option<&str>,
        category: usize,
    ) -> Result<Lookup<'a>, CatalogError> {
        self.resolve(context, source, comment, |message| {
            if !self.is_usable(message) {
                return Ok(Lookup::Untranslated(&message.source));
            }
            if let TranslationText::Numerus(forms) = &message.translation
                && category >= forms.len()
            {
                if self.options.strict_plural {
                    return Err(CatalogError::PluralCategoryOutOfRange {
                        context: context.to_string(),
                        source_text: message.source.clone(),
                        category,
                        count: forms.len(),
                    });
                }
                tracing::debug!(
                    category,
                    forms = forms.len(),
                    "Plural category out of range for '{}', using the last form",
                    message.source
                );
            }
            Ok(self.select(message, category))
        })
    }

    /// Numerus form for a count, chosen by the catalog language's plural rule.
    pub fn lookup_count<'a>(
        &'a self,
        context: &str,
        source: &'a str,
        comment: Option<&str>,
        count: i64,
    ) -> Result<Lookup<'a>, CatalogError> {
        self.lookup_plural(context, source, comment, self.plural_rule.category(count))
    }

    /// Display text for a non-plural message.
    #[must_use]
    pub fn translate<'a>(&'a self, context: &str, source: &'a str) -> &'a str {
        self.lookup(context, source).text()
    }

    /// Display text for a count with `%n` replaced, as `tr(source, comment, n)` returns it.
    pub fn translate_count(
        &self,
        context: &str,
        source: &str,
        comment: Option<&str>,
        count: i64,
    ) -> Result<String, CatalogError> {
        let lookup = self.lookup_count(context, source, comment, count)?;
        Ok(substitute_count(lookup.text(), count))
    }

    /// Apply `select` to the disambiguated message, then to the plain one
    /// when the first has nothing usable.
    fn resolve<'a, F>(
        &'a self,
        context: &str,
        source: &'a str,
        comment: Option<&str>,
        select: F,
    ) -> Result<Lookup<'a>, CatalogError>
    where
        F: Fn(&'a Message) -> Result<Lookup<'a>, CatalogError>,
    {
        let mut keys = vec![comment.unwrap_or_default()];
        if !keys.contains(&"") {
            keys.push("");
        }

        for key in keys {
            let Some(message) = self.find(context, source, Some(key)) else {
                continue;
            };
            let lookup = select(message)?;
            if lookup.is_translated() {
                return Ok(lookup);
            }
        }

        Ok(Lookup::Untranslated(source))
    }

    const fn is_usable(&self, message: &Message) -> bool {
        match message.status {
            TranslationStatus::Finished => true,
            TranslationStatus::Unfinished => self.options.include_unfinished,
            TranslationStatus::Vanished | TranslationStatus::Obsolete => false,
        }
    }

    fn select<'a>(&self, message: &'a Message, category: usize) -> Lookup<'a> {
        if !self.is_usable(message) {
            return Lookup::Untranslated(&message.source);
        }

        let text = match &message.translation {
            TranslationText::Single(text) => text.as_str(),
            TranslationText::Numerus(forms) => {
                forms.get(category).or_else(|| forms.last()).map_or("", String::as_str)
            }
        };

        if text.is_empty() { Lookup::Untranslated(&message.source) } else { Lookup::Translated(text) }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use googletest::prelude::*;
    use rstest::rstest;

    use super::*;
    use crate::test_utils::photo_broom_file;

    fn catalog() -> Catalog {
        Catalog::from_file(photo_broom_file(), CatalogOptions::default()).unwrap()
    }

    fn strict_plural() -> CatalogOptions {
        CatalogOptions { strict_plural: true, ..CatalogOptions::default() }
    }

    #[googletest::test]
    fn test_lookup_finished_message() {
        let catalog = catalog();

        expect_that!(catalog.lookup("MainWindow", "Open"), eq(Lookup::Translated("Otwórz")));
        expect_that!(catalog.translate("MainWindow", "Open"), eq("Otwórz"));
        expect_that!(catalog.language(), some(eq("pl_PL")));
        expect_that!(catalog.plural_rule(), eq(PluralRule::Polish));
    }

    #[rstest]
    #[case("MainWindow", "Close")]
    #[case("NoSuchContext", "Open")]
    fn test_unknown_key_falls_back_to_source(#[case] context: &str, #[case] source: &str) {
        let catalog = catalog();

        assert_eq!(catalog.lookup(context, source), Lookup::Untranslated(source));
        assert_eq!(catalog.translate(context, source), source);
    }

    #[googletest::test]
    fn test_retired_translations_are_never_returned() {
        let catalog = catalog();

        expect_that!(
            catalog.lookup("MainWindow", "&All photos"),
            eq(Lookup::Untranslated("&All photos"))
        );
        expect_that!(
            catalog.lookup("MainWindow", "Tags editor"),
            eq(Lookup::Untranslated("Tags editor"))
        );
    }

    #[googletest::test]
    fn test_unfinished_translations_follow_option() {
        let included = catalog();
        let excluded = Catalog::from_file(
            photo_broom_file(),
            CatalogOptions { include_unfinished: false, ..CatalogOptions::default() },
        )
        .unwrap();

        expect_that!(
            included.lookup("PhotosWidget", "Search:"),
            eq(Lookup::Translated("Szukaj:"))
        );
        expect_that!(excluded.lookup("PhotosWidget", "Search:"), eq(Lookup::Untranslated("Search:")));
    }

    #[googletest::test]
    fn test_empty_unfinished_translation_falls_back() {
        let catalog = catalog();

        expect_that!(
            catalog.lookup("MainWindow", "&Reviewed photos"),
            eq(Lookup::Untranslated("&Reviewed photos"))
        );
    }

    #[googletest::test]
    fn test_disambiguation_comment() {
        let catalog = catalog();

        expect_that!(
            catalog.lookup_with_comment("MainWindow", "Open", Some("state")),
            eq(Lookup::Translated("Otwarte"))
        );
        expect_that!(
            catalog.lookup_with_comment("MainWindow", "Open", Some("unknown comment")),
            eq(Lookup::Translated("Otwórz"))
        );
        expect_that!(catalog.find("MainWindow", "Open", Some("state")).is_some(), eq(true));
        expect_that!(catalog.find("MainWindow", "Open", Some("unknown comment")).is_none(), eq(true));
    }

    #[rstest]
    #[case(0, "Zakończono. Znaleziono %n nowe zdjęcie.")]
    #[case(1, "Zakończono. Znaleziono %n nowe zdjęcia.")]
    #[case(2, "Zakończono. Znaleziono %n nowych zdjęć.")]
    fn test_lookup_plural(#[case] category: usize, #[case] expected: &str) {
        let catalog = catalog();

        let lookup = catalog
            .lookup_plural("CollectionDirScanDialog", "Done. %n new photo(s) found.", None, category)
            .unwrap();

        assert_eq!(lookup, Lookup::Translated(expected));
    }

    #[googletest::test]
    fn test_out_of_range_category_clamps_in_permissive_mode() {
        let catalog = catalog();

        let lookup = catalog
            .lookup_plural("CollectionDirScanDialog", "Done. %n new photo(s) found.", None, 7)
            .unwrap();

        expect_that!(lookup, eq(Lookup::Translated("Zakończono. Znaleziono %n nowych zdjęć.")));
    }

    #[googletest::test]
    fn test_out_of_range_category_fails_with_strict_plural() {
        let catalog = Catalog::from_file(photo_broom_file(), strict_plural()).unwrap();

        let result =
            catalog.lookup_plural("CollectionDirScanDialog", "Done. %n new photo(s) found.", None, 3);

        assert!(matches!(
            result,
            Err(CatalogError::PluralCategoryOutOfRange { category: 3, count: 3, .. })
        ));
        expect_that!(catalog.translate("MainWindow", "Open"), eq("Otwórz"));
    }

    #[googletest::test]
    fn test_strict_plural_ignores_retired_messages() {
        let mut file = photo_broom_file();
        file.contexts.push(crate::ir::Context::new("PhotosWidget").with_message(
            Message::numerus("%n photo(s) removed", ["%n zdjęcie usunięte", "%n zdjęcia usunięte"])
                .with_status(TranslationStatus::Vanished),
        ));
        let catalog = Catalog::from_file(file, strict_plural()).unwrap();

        let lookup = catalog.lookup_plural("PhotosWidget", "%n photo(s) removed", None, 5).unwrap();

        expect_that!(lookup, eq(Lookup::Untranslated("%n photo(s) removed")));
    }

    #[rstest]
    #[case(1, "Zakończono. Znaleziono 1 nowe zdjęcie.")]
    #[case(3, "Zakończono. Znaleziono 3 nowe zdjęcia.")]
    #[case(5, "Zakończono. Znaleziono 5 nowych zdjęć.")]
    #[case(22, "Zakończono. Znaleziono 22 nowe zdjęcia.")]
    fn test_translate_count(#[case] count: i64, #[case] expected: &str) {
        let catalog = catalog();

        let text = catalog
            .translate_count("CollectionDirScanDialog", "Done. %n new photo(s) found.", None, count)
            .unwrap();

        assert_eq!(text, expected);
    }

    #[googletest::test]
    fn test_translate_count_substitutes_in_source_fallback() {
        let catalog = Catalog::empty(CatalogOptions::default());

        let text = catalog.translate_count("Ctx", "%n file(s)", None, 4).unwrap();

        expect_that!(text.as_str(), eq("4 file(s)"));
    }

    #[googletest::test]
    fn test_reject_incomplete_refuses_incomplete_catalog() {
        let result = Catalog::from_file(
            photo_broom_file(),
            CatalogOptions { reject_incomplete: true, ..CatalogOptions::default() },
        );

        let Err(CatalogError::Incomplete(report)) = result else {
            panic!("expected an incomplete catalog error");
        };
        expect_that!(report.count(|kind| *kind == IssueKind::Unfinished), eq(2));
        expect_that!(report.count(|kind| *kind == IssueKind::Vanished), eq(1));
    }

    #[googletest::test]
    fn test_language_override_changes_plural_rule() {
        let catalog = Catalog::from_file(
            photo_broom_file(),
            CatalogOptions { language: Some("en".to_string()), ..CatalogOptions::default() },
        )
        .unwrap();

        expect_that!(catalog.plural_rule(), eq(PluralRule::EnglishLike));
        expect_that!(catalog.language(), some(eq("en")));
    }

    #[googletest::test]
    fn test_duplicates_resolve_last_wins() {
        let mut file = photo_broom_file();
        let mut newer = TranslationFile::new("pl_PL");
        newer.contexts.push(
            crate::ir::Context::new("MainWindow").with_message(Message::new("Open", "Otwórz plik")),
        );
        file.contexts.extend(newer.contexts);

        let catalog = Catalog::from_file(file, CatalogOptions::default()).unwrap();

        expect_that!(catalog.translate("MainWindow", "Open"), eq("Otwórz plik"));
    }

    #[googletest::test]
    fn test_empty_catalog() {
        let catalog = Catalog::empty(CatalogOptions::default());

        expect_that!(catalog.is_empty(), eq(true));
        expect_that!(catalog.translate("MainWindow", "Open"), eq("Open"));
    }

    #[test]
    fn test_catalog_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Catalog>();
    }
}
