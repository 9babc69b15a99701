//! Command line front end.
//!
//! Output goes to the writer handed to [`run`]; diagnostics go through
//! `tracing`.

use std::io::Write;
use std::path::{
    Path,
    PathBuf,
};

use clap::{
    Parser,
    Subcommand,
    ValueEnum,
};
use thiserror::Error;

use crate::catalog::{
    Catalog,
    CatalogOptions,
    MergeStrategy,
    ValidationReport,
    merge_files,
    statistics,
    validate,
};
use crate::config::{
    CatalogSettings,
    ConfigManager,
};
use crate::discovery::find_translation_files;
use crate::error::CatalogError;
use crate::input::{
    load_translation_file,
    write_translation_file,
};
use crate::ir::TranslationFile;
use crate::plural::substitute_count;

#[derive(Debug, Parser)]
#[command(name = "ts-catalog")]
#[command(about = "Inspect, validate and merge Qt Linguist .ts translation files", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Workspace root holding `.ts-catalog.json`. Searched for `.ts` files when none are given
    #[arg(short, long, global = true, value_name = "DIR", default_value = ".")]
    pub workspace: PathBuf,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Report unfinished, retired and inconsistent messages
    Check {
        #[arg(value_name = "FILES")]
        files: Vec<PathBuf>,

        /// Exit with failure when the catalog is incomplete
        #[arg(long, alias = "strict")]
        reject_incomplete: bool,
    },

    /// Print the translation of one message
    Lookup {
        #[arg(value_name = "FILES")]
        files: Vec<PathBuf>,

        /// Context (UI component) name
        #[arg(long)]
        context: String,

        /// Source text
        #[arg(long)]
        source: String,

        /// Disambiguation comment
        #[arg(long)]
        comment: Option<String>,

        /// Count selecting the plural form; `%n` is replaced by it
        #[arg(long, allow_negative_numbers = true, conflicts_with = "category")]
        count: Option<i64>,

        /// Explicit plural category index
        #[arg(long)]
        category: Option<usize>,

        /// Refuse to load an incomplete catalog
        #[arg(long)]
        reject_incomplete: bool,

        /// Fail on a plural category past the last numerus form
        #[arg(long)]
        strict_plural: bool,
    },

    /// Merge several files into one
    Merge {
        #[arg(value_name = "FILES", required = true)]
        files: Vec<PathBuf>,

        /// Destination `.ts` file
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// Duplicate message policy (defaults to the configured one)
        #[arg(long, value_enum)]
        strategy: Option<MergeStrategy>,
    },

    /// Print per-context status counts
    Stats {
        #[arg(value_name = "FILES")]
        files: Vec<PathBuf>,
    },
}

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No translation files given and none found in '{}'", .0.display())]
    NoTranslationFiles(PathBuf),
}

/// Run a parsed command, writing its output to `out`.
///
/// Returns `Ok(false)` when the command ran but its check failed.
pub fn run(cli: &Cli, out: &mut impl Write) -> Result<bool, CliError> {
    let mut config_manager = ConfigManager::new();
    config_manager
        .load_settings(Some(cli.workspace.clone()))
        .map_err(CatalogError::from)?;

    match &cli.command {
        Command::Check { files, reject_incomplete } => {
            let mut settings = config_manager.get_settings().clone();
            settings.reject_incomplete |= *reject_incomplete;
            config_manager.update_settings(settings).map_err(CatalogError::from)?;

            let paths = input_files(files, &cli.workspace, config_manager.get_settings())?;
            check(&paths, config_manager.get_settings(), cli.format, out)
        }
        Command::Lookup {
            files,
            context,
            source,
            comment,
            count,
            category,
            reject_incomplete,
            strict_plural,
        } => {
            let mut settings = config_manager.get_settings().clone();
            settings.reject_incomplete |= *reject_incomplete;
            settings.strict_plural |= *strict_plural;
            config_manager.update_settings(settings).map_err(CatalogError::from)?;

            let paths = input_files(files, &cli.workspace, config_manager.get_settings())?;
            let catalog = Catalog::load(&paths, CatalogOptions::from(config_manager.get_settings()))?;
            let query = Query { context, source, comment: comment.as_deref(), count: *count, category: *category };
            lookup(&catalog, &query, cli.format, out)
        }
        Command::Merge { files, output, strategy } => {
            let strategy = strategy.unwrap_or(config_manager.get_settings().merge_strategy);
            merge(files, output, strategy, cli.format, out)
        }
        Command::Stats { files } => {
            let paths = input_files(files, &cli.workspace, config_manager.get_settings())?;
            stats(&paths, cli.format, out)
        }
    }
}

fn input_files(
    files: &[PathBuf],
    workspace: &Path,
    settings: &CatalogSettings,
) -> Result<Vec<PathBuf>, CliError> {
    if !files.is_empty() {
        return Ok(files.to_vec());
    }

    let found = find_translation_files(workspace, settings)?;
    if found.is_empty() {
        return Err(CliError::NoTranslationFiles(workspace.to_path_buf()));
    }
    Ok(found)
}

fn load_all(paths: &[PathBuf]) -> Result<Vec<TranslationFile>, CatalogError> {
    paths.iter().map(|path| load_translation_file(path)).collect()
}

fn check(
    paths: &[PathBuf],
    settings: &CatalogSettings,
    format: OutputFormat,
    out: &mut impl Write,
) -> Result<bool, CliError> {
    let mut file = merge_files(load_all(paths)?, settings.merge_strategy)?;
    if settings.language.is_some() {
        file.language.clone_from(&settings.language);
    }
    let report = validate(&file);

    match format {
        OutputFormat::Text => write_report(&report, out)?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, &report)?;
            writeln!(out)?;
        }
    }

    Ok(report.is_complete() || !settings.reject_incomplete)
}

fn write_report(report: &ValidationReport, out: &mut impl Write) -> std::io::Result<()> {
    writeln!(
        out,
        "{}: {} messages, {} issue(s)",
        report.language.as_deref().unwrap_or("unknown language"),
        report.messages,
        report.issues.len()
    )?;
    for issue in &report.issues {
        writeln!(out, "  {issue}")?;
    }
    Ok(())
}

struct Query<'a> {
    context: &'a str,
    source: &'a str,
    comment: Option<&'a str>,
    count: Option<i64>,
    category: Option<usize>,
}

fn lookup(
    catalog: &Catalog,
    query: &Query<'_>,
    format: OutputFormat,
    out: &mut impl Write,
) -> Result<bool, CliError> {
    let (translated, text) = match (query.count, query.category) {
        (Some(count), _) => {
            let lookup = catalog.lookup_count(query.context, query.source, query.comment, count)?;
            (lookup.is_translated(), substitute_count(lookup.text(), count))
        }
        (None, Some(category)) => {
            let lookup = catalog.lookup_plural(query.context, query.source, query.comment, category)?;
            (lookup.is_translated(), lookup.text().to_string())
        }
        (None, None) => {
            let lookup = catalog.lookup_with_comment(query.context, query.source, query.comment);
            (lookup.is_translated(), lookup.text().to_string())
        }
    };

    if !translated {
        tracing::info!(context = query.context, "No translation for '{}', using source text", query.source);
    }

    match format {
        OutputFormat::Text => writeln!(out, "{text}")?,
        OutputFormat::Json => {
            let value = serde_json::json!({ "translated": translated, "text": text });
            serde_json::to_writer_pretty(&mut *out, &value)?;
            writeln!(out)?;
        }
    }

    Ok(true)
}

fn merge(
    paths: &[PathBuf],
    output: &Path,
    strategy: MergeStrategy,
    format: OutputFormat,
    out: &mut impl Write,
) -> Result<bool, CliError> {
    let merged = merge_files(load_all(paths)?, strategy)?;
    write_translation_file(output, &merged)?;

    match format {
        OutputFormat::Text => writeln!(
            out,
            "Merged {} file(s) into {} ({} messages)",
            paths.len(),
            output.display(),
            merged.message_count()
        )?,
        OutputFormat::Json => {
            let value = serde_json::json!({
                "files": paths.len(),
                "output": output,
                "messages": merged.message_count(),
            });
            serde_json::to_writer_pretty(&mut *out, &value)?;
            writeln!(out)?;
        }
    }

    Ok(true)
}

fn stats(paths: &[PathBuf], format: OutputFormat, out: &mut impl Write) -> Result<bool, CliError> {
    let mut reports = Vec::new();
    for path in paths {
        let file = load_translation_file(path)?;
        reports.push(serde_json::json!({
            "path": path,
            "language": file.language,
            "contexts": statistics(&file),
        }));

        if format == OutputFormat::Text {
            writeln!(out, "{} ({})", path.display(), file.language.as_deref().unwrap_or("unknown language"))?;
            for context in statistics(&file) {
                let counts = context.counts;
                writeln!(
                    out,
                    "  {:<32} finished {:>4}  unfinished {:>4}  vanished {:>4}  obsolete {:>4}",
                    context.name, counts.finished, counts.unfinished, counts.vanished, counts.obsolete
                )?;
            }
        }
    }

    if format == OutputFormat::Json {
        serde_json::to_writer_pretty(&mut *out, &reports)?;
        writeln!(out)?;
    }

    Ok(true)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use googletest::prelude::*;
    use tempfile::TempDir;

    use super::*;
    use crate::test_utils::photo_broom_file;

    fn run_args(args: &[&str]) -> (Result<bool, CliError>, String) {
        let cli = Cli::try_parse_from(std::iter::once("ts-catalog").chain(args.iter().copied())).unwrap();
        let mut out = Vec::new();
        let result = run(&cli, &mut out);
        (result, String::from_utf8(out).unwrap())
    }

    fn workspace() -> (TempDir, String) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("photo_broom_pl.ts");
        write_translation_file(&path, &photo_broom_file()).unwrap();
        let path = path.to_string_lossy().into_owned();
        (temp_dir, path)
    }

    #[googletest::test]
    fn test_lookup_command() {
        let (temp_dir, path) = workspace();
        let root = temp_dir.path().to_string_lossy().into_owned();

        let (result, output) =
            run_args(&["lookup", &path, "--workspace", &root, "--context", "MainWindow", "--source", "Open"]);

        expect_that!(result.unwrap(), eq(true));
        expect_that!(output.as_str(), eq("Otwórz\n"));
    }

    #[googletest::test]
    fn test_lookup_count_command_discovers_files() {
        let (temp_dir, _) = workspace();
        let root = temp_dir.path().to_string_lossy().into_owned();

        let (result, output) = run_args(&[
            "lookup",
            "--workspace",
            &root,
            "--context",
            "CollectionDirScanDialog",
            "--source",
            "Done. %n new photo(s) found.",
            "--count",
            "5",
        ]);

        expect_that!(result.unwrap(), eq(true));
        expect_that!(output.as_str(), eq("Zakończono. Znaleziono 5 nowych zdjęć.\n"));
    }

    #[googletest::test]
    fn test_check_command_strict_fails_on_incomplete() {
        let (temp_dir, path) = workspace();
        let root = temp_dir.path().to_string_lossy().into_owned();

        let (relaxed, _) = run_args(&["check", &path, "--workspace", &root]);
        let (strict, output) = run_args(&["check", &path, "--workspace", &root, "--strict"]);

        expect_that!(relaxed.unwrap(), eq(true));
        expect_that!(strict.unwrap(), eq(false));
        expect_that!(output.as_str(), starts_with("pl_PL: 8 messages, 4 issue(s)"));
        expect_that!(output.as_str(), contains_substring("translation is unfinished"));
    }

    #[googletest::test]
    fn test_lookup_strict_plural_on_incomplete_catalog() {
        let (temp_dir, path) = workspace();
        let root = temp_dir.path().to_string_lossy().into_owned();
        let args = [
            "lookup",
            path.as_str(),
            "--workspace",
            root.as_str(),
            "--context",
            "CollectionDirScanDialog",
            "--source",
            "Done. %n new photo(s) found.",
            "--strict-plural",
        ];

        let in_range: Vec<&str> = args.iter().copied().chain(["--category", "2"]).collect();
        let (result, output) = run_args(&in_range);
        expect_that!(result.unwrap(), eq(true));
        expect_that!(output.as_str(), eq("Zakończono. Znaleziono %n nowych zdjęć.\n"));

        let past_end: Vec<&str> = args.iter().copied().chain(["--category", "3"]).collect();
        let (result, _) = run_args(&past_end);
        assert!(matches!(
            result,
            Err(CliError::Catalog(CatalogError::PluralCategoryOutOfRange { category: 3, .. }))
        ));
    }

    #[googletest::test]
    fn test_check_command_json() {
        let (temp_dir, path) = workspace();
        let root = temp_dir.path().to_string_lossy().into_owned();

        let (_, output) = run_args(&["check", &path, "--workspace", &root, "--format", "json"]);

        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["language"], "pl_PL");
        assert_eq!(value["issues"].as_array().map(Vec::len), Some(4));
    }

    #[googletest::test]
    fn test_merge_command() {
        let (temp_dir, path) = workspace();
        let root = temp_dir.path().to_string_lossy().into_owned();
        let output_path = temp_dir.path().join("merged_pl.ts");
        let output_arg = output_path.to_string_lossy().into_owned();

        let (result, output) =
            run_args(&["merge", &path, &path, "--output", &output_arg, "--workspace", &root]);

        expect_that!(result.unwrap(), eq(true));
        expect_that!(output.as_str(), contains_substring("(8 messages)"));
        let merged = load_translation_file(&output_path).unwrap();
        expect_that!(merged.message_count(), eq(8));

        let (rejected, _) = run_args(&[
            "merge", &path, &path, "--output", &output_arg, "--workspace", &root, "--strategy", "reject",
        ]);
        assert!(matches!(rejected, Err(CliError::Catalog(CatalogError::DuplicateMessage { .. }))));
    }

    #[googletest::test]
    fn test_stats_command() {
        let (temp_dir, path) = workspace();
        let root = temp_dir.path().to_string_lossy().into_owned();

        let (result, output) = run_args(&["stats", &path, "--workspace", &root]);

        expect_that!(result.unwrap(), eq(true));
        expect_that!(output.as_str(), contains_substring("MainWindow"));
        expect_that!(output.as_str(), contains_substring("unfinished    1"));
    }

    #[googletest::test]
    fn test_no_translation_files() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().to_string_lossy().into_owned();

        let (result, _) = run_args(&["stats", "--workspace", &root]);

        assert!(matches!(result, Err(CliError::NoTranslationFiles(_))));
    }

    #[googletest::test]
    fn test_count_conflicts_with_category() {
        let result = Cli::try_parse_from([
            "ts-catalog", "lookup", "a.ts", "--context", "A", "--source", "B", "--count", "1", "--category", "0",
        ]);

        expect_that!(result.is_err(), eq(true));
    }
}
