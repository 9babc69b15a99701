//! Locating translation files on disk.

use std::fs::File;
use std::io::Read;
use std::path::{
    Path,
    PathBuf,
};

use ignore::WalkBuilder;

use crate::config::{
    CatalogSettings,
    FileMatcher,
};
use crate::error::CatalogError;
use crate::input::is_translation_document;

/// Extension appended to names passed to [`resolve_translation_path`].
pub const TRANSLATION_SUFFIX: &str = ".ts";

const SEARCH_DELIMITERS: [char; 2] = ['_', '.'];

/// Bytes read to tell a Qt `.ts` document from a TypeScript source.
const SNIFF_LEN: u64 = 4096;

/// Unreadable files are kept so that loading reports the error with its path.
fn looks_like_translation_file(path: &Path) -> bool {
    let mut head = Vec::new();
    match File::open(path).and_then(|file| file.take(SNIFF_LEN).read_to_end(&mut head)) {
        Ok(_) => is_translation_document(&String::from_utf8_lossy(&head)),
        Err(err) => {
            tracing::debug!(path = %path.display(), ?err, "Failed to read file header");
            true
        }
    }
}

/// Collect the translation files under `root` matching `settings`, honoring
/// `.gitignore`. The result is sorted so that merge order is reproducible.
///
/// Matching files without a `<TS>` root, such as TypeScript sources, are
/// skipped with a warning.
pub fn find_translation_files(
    root: &Path,
    settings: &CatalogSettings,
) -> Result<Vec<PathBuf>, CatalogError> {
    tracing::debug!(root = %root.display(), "Searching for translation files");
    let matcher = FileMatcher::new(root.to_path_buf(), settings)?;
    let mut found_files = Vec::new();

    for result in WalkBuilder::new(root)
        .hidden(false)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .follow_links(false)
        .build()
    {
        let entry = match result {
            Ok(entry) => entry,
            Err(err) => {
                tracing::debug!(?err, "Failed to read directory entry");
                continue;
            }
        };

        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }

        if !matcher.is_translation_file(entry.path()) {
            continue;
        }
        if !looks_like_translation_file(entry.path()) {
            tracing::warn!(path = %entry.path().display(), "Skipping file that is not a Qt translation file");
            continue;
        }
        found_files.push(entry.into_path());
    }

    found_files.sort();
    tracing::debug!(count = found_files.len(), "Found translation files");
    Ok(found_files)
}

/// Find the file `QTranslator::load(name, dir)` would open.
///
/// Tries `name.ts`, then `name`, then repeats with the text after the last
/// `_` or `.` removed, so `photo_broom_pl_PL` falls back to
/// `photo_broom_pl` and then `photo_broom`.
pub fn resolve_translation_path(dir: &Path, name: &str) -> Result<PathBuf, CatalogError> {
    let mut candidate = name;

    loop {
        for file_name in [format!("{candidate}{TRANSLATION_SUFFIX}"), candidate.to_string()] {
            let path = dir.join(file_name);
            if path.is_file() {
                tracing::debug!(path = %path.display(), "Resolved translation file");
                return Ok(path);
            }
        }

        match candidate.rfind(SEARCH_DELIMITERS) {
            Some(position) if position > 0 => {
                candidate = candidate.get(..position).unwrap_or_default();
            }
            _ => break,
        }
    }

    Err(CatalogError::NotFound { dir: dir.to_path_buf(), name: name.to_string() })
}
