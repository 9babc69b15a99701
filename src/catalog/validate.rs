//! Completeness and consistency checks.

use std::collections::{
    BTreeSet,
    HashSet,
};
use std::fmt;

use serde::Serialize;

use crate::ir::{
    Message,
    TranslationFile,
    TranslationText,
};
use crate::plural::PluralRule;
use crate::types::TranslationStatus;

/// What is wrong with a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum IssueKind {
    Unfinished,
    Vanished,
    Obsolete,
    /// Marked finished but carries no text.
    EmptyTranslation,
    #[serde(rename_all = "camelCase")]
    NumerusFormCount { expected: usize, found: usize },
    /// The same key appears more than once in the document.
    DuplicateMessage,
    /// A `%1`-style placeholder of the source is missing from the translation.
    MissingPlaceholder { placeholder: String },
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unfinished => f.write_str("translation is unfinished"),
            Self::Vanished => f.write_str("source string has vanished"),
            Self::Obsolete => f.write_str("translation is obsolete"),
            Self::EmptyTranslation => f.write_str("finished translation is empty"),
            Self::NumerusFormCount { expected, found } => {
                write!(f, "expected {expected} numerus forms, found {found}")
            }
            Self::DuplicateMessage => f.write_str("duplicate message"),
            Self::MissingPlaceholder { placeholder } => {
                write!(f, "placeholder {placeholder} missing from translation")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub context: String,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(flatten)]
    pub kind: IssueKind,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: \"{}\"", self.context, self.source.escape_debug())?;
        if let Some(comment) = &self.comment {
            write!(f, " ({comment})")?;
        }
        write!(f, ": {}", self.kind)
    }
}

/// Result of [`validate`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub language: Option<String>,
    pub messages: usize,
    pub issues: Vec<Issue>,
}

impl ValidationReport {
    /// True when every message is finished and consistent.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.issues.is_empty()
    }

    /// Number of issues matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&IssueKind) -> bool) -> usize {
        self.issues.iter().filter(|issue| predicate(&issue.kind)).count()
    }
}

/// Collect `%n` and `%1`..`%99` markers (with or without the `L` localization flag).
fn placeholders(text: &str) -> BTreeSet<String> {
    let mut found = BTreeSet::new();
    let mut rest = text;

    while let Some(position) = rest.find('%') {
        rest = rest.get(position + 1..).unwrap_or_default();
        if rest.starts_with('n') {
            found.insert("%n".to_string());
            continue;
        }
        let body = rest.strip_prefix('L').unwrap_or(rest);
        let digits: String = body.chars().take_while(char::is_ascii_digit).take(2).collect();
        if !digits.is_empty() && digits != "0" {
            found.insert(format!("%{digits}"));
        }
    }

    found
}

fn status_issue(status: TranslationStatus) -> Option<IssueKind> {
    match status {
        TranslationStatus::Finished => None,
        TranslationStatus::Unfinished => Some(IssueKind::Unfinished),
        TranslationStatus::Vanished => Some(IssueKind::Vanished),
        TranslationStatus::Obsolete => Some(IssueKind::Obsolete),
    }
}

fn message_issues(message: &Message, rule: PluralRule) -> Vec<IssueKind> {
    if let Some(issue) = status_issue(message.status) {
        return vec![issue];
    }
    if message.translation.is_empty() {
        return vec![IssueKind::EmptyTranslation];
    }

    let mut issues = Vec::new();
    let forms: Vec<&str> = match &message.translation {
        TranslationText::Single(text) => vec![text.as_str()],
        TranslationText::Numerus(forms) => {
            if forms.len() != rule.form_count() {
                issues.push(IssueKind::NumerusFormCount {
                    expected: rule.form_count(),
                    found: forms.len(),
                });
            }
            forms.iter().map(String::as_str).collect()
        }
    };

    for placeholder in placeholders(&message.source) {
        if forms.iter().any(|form| !placeholders(form).contains(&placeholder)) {
            issues.push(IssueKind::MissingPlaceholder { placeholder });
        }
    }

    issues
}

/// Check a document for incomplete or inconsistent translations, using the
/// plural rule of its language.
#[must_use]
pub fn validate(file: &TranslationFile) -> ValidationReport {
    let rule = file.language.as_deref().map_or_else(PluralRule::default, PluralRule::for_language);
    validate_with_rule(file, rule)
}

/// [`validate`] with an explicit plural rule for the numerus form count check.
#[must_use]
pub fn validate_with_rule(file: &TranslationFile, rule: PluralRule) -> ValidationReport {
    let mut report = ValidationReport {
        language: file.language.clone(),
        messages: file.message_count(),
        issues: Vec::new(),
    };
    let mut seen = HashSet::new();

    for (context, message) in file.messages() {
        let issue = |kind| Issue {
            context: context.to_string(),
            source: message.source.clone(),
            comment: message.comment.clone(),
            kind,
        };

        if !seen.insert(message.key(context)) {
            report.issues.push(issue(IssueKind::DuplicateMessage));
        }
        report.issues.extend(message_issues(message, rule).into_iter().map(issue));
    }

    report
}

/// Message counts per status for one context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub finished: usize,
    pub unfinished: usize,
    pub vanished: usize,
    pub obsolete: usize,
}

impl StatusCounts {
    const fn record(&mut self, status: TranslationStatus) {
        match status {
            TranslationStatus::Finished => self.finished += 1,
            TranslationStatus::Unfinished => self.unfinished += 1,
            TranslationStatus::Vanished => self.vanished += 1,
            TranslationStatus::Obsolete => self.obsolete += 1,
        }
    }

    #[must_use]
    pub const fn total(&self) -> usize {
        self.finished + self.unfinished + self.vanished + self.obsolete
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextStatistics {
    pub name: String,
    #[serde(flatten)]
    pub counts: StatusCounts,
}

/// Per-context status counts, in document order.
#[must_use]
pub fn statistics(file: &TranslationFile) -> Vec<ContextStatistics> {
    file.contexts
        .iter()
        .map(|context| {
            let mut counts = StatusCounts::default();
            for message in &context.messages {
                counts.record(message.status);
            }
            ContextStatistics { name: context.name.clone(), counts }
        })
        .collect()
}
