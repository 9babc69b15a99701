//! Building catalogs from files on disk.

use std::path::Path;

use super::{
    Catalog,
    CatalogOptions,
};
use crate::config::CatalogSettings;
use crate::discovery::{
    find_translation_files,
    resolve_translation_path,
};
use crate::error::CatalogError;
use crate::input::load_translation_file;

impl From<&CatalogSettings> for CatalogOptions {
    fn from(settings: &CatalogSettings) -> Self {
        Self {
            reject_incomplete: settings.reject_incomplete,
            strict_plural: settings.strict_plural,
            include_unfinished: settings.include_unfinished,
            strategy: settings.merge_strategy,
            language: settings.language.clone(),
        }
    }
}

impl Catalog {
    /// Load and merge `.ts` files in the given order.
    ///
    /// With the default `last-wins` strategy later files override earlier ones.
    pub fn load<P: AsRef<Path>>(paths: &[P], options: CatalogOptions) -> Result<Self, CatalogError> {
        let files = paths
            .iter()
            .map(|path| load_translation_file(path.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        Self::from_files(files, options)
    }

    /// [`Self::load`], but any failure yields an empty catalog so callers
    /// keep working with source strings.
    #[must_use]
    pub fn load_or_empty<P: AsRef<Path>>(paths: &[P], options: CatalogOptions) -> Self {
        match Self::load(paths, options.clone()) {
            Ok(catalog) => catalog,
            Err(error) => {
                tracing::error!("Failed to load translation catalog, falling back to source strings: {error}");
                Self::empty(options)
            }
        }
    }

    /// Load the file `QTranslator::load(name, dir)` would open, so
    /// `photo_broom_pl_PL` finds `photo_broom_pl.ts`.
    ///
    /// Like [`Self::load_or_empty`], failures are logged and yield an empty
    /// catalog.
    #[must_use]
    pub fn load_named(dir: &Path, name: &str, options: CatalogOptions) -> Self {
        tracing::info!(dir = %dir.display(), "Searching for translations");

        let loaded = resolve_translation_path(dir, name).and_then(|path| {
            let catalog = Self::load(&[&path], options.clone())?;
            Ok((path, catalog))
        });
        match loaded {
            Ok((path, catalog)) => {
                tracing::info!(path = %path.display(), language = ?catalog.language(), "Translations loaded");
                catalog
            }
            Err(error) => {
                tracing::error!("Could not load translations '{name}': {error}");
                Self::empty(options)
            }
        }
    }

    /// Discover every translation file under `root` matching `settings` and
    /// load them in path order.
    pub fn load_workspace(root: &Path, settings: &CatalogSettings) -> Result<Self, CatalogError> {
        let paths = find_translation_files(root, settings)?;
        tracing::debug!(root = %root.display(), files = paths.len(), "Loading workspace translations");

        Self::load(&paths, CatalogOptions::from(settings))
    }
}
