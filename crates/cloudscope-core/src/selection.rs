//! Dataset selection state.
//!
//! The selector lists the manual loaders first, followed by every catalog
//! leaf. Index 0 always means "load the file at a user-supplied path".

use std::path::{Path, PathBuf};

use crate::catalog::{Catalog, CatalogEntry};

/// Number of selector entries that are not backed by the catalog.
pub const NUM_MANUAL_LOADERS: usize = 1;

/// Display names of the manual loaders.
pub const MANUAL_LOADER_NAMES: [&str; NUM_MANUAL_LOADERS] = ["Local file..."];

/// Selector index of the free-text file path loader.
pub const CUSTOM_FILE_INDEX: usize = 0;

/// What a selector index refers to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectedSource<'a> {
    /// The user-supplied path.
    CustomFile(&'a Path),
    /// A built-in loader that is not backed by a file.
    Builtin(usize),
    /// A catalog dataset.
    Catalog(&'a CatalogEntry),
}

/// The currently chosen selector entry plus the free-text path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    index: usize,
    custom_path: PathBuf,
}

impl Selection {
    /// Creates a selection pointing at the custom file loader.
    pub fn new(custom_path: impl Into<PathBuf>) -> Self {
        Self {
            index: CUSTOM_FILE_INDEX,
            custom_path: custom_path.into(),
        }
    }

    /// Returns the selector index.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Sets the selector index.
    pub fn set_index(&mut self, index: usize) {
        self.index = index;
    }

    /// Returns the free-text path.
    #[must_use]
    pub fn custom_path(&self) -> &Path {
        &self.custom_path
    }

    /// Sets the free-text path.
    pub fn set_custom_path(&mut self, path: impl Into<PathBuf>) {
        self.custom_path = path.into();
    }

    /// Returns true if the index refers to a catalog dataset.
    #[must_use]
    pub fn is_catalog_entry(&self) -> bool {
        self.index >= NUM_MANUAL_LOADERS
    }

    /// Resolves the selection against a catalog.
    ///
    /// Returns `None` for indices past the end of the catalog.
    #[must_use]
    pub fn resolve<'a>(&'a self, catalog: &'a Catalog) -> Option<SelectedSource<'a>> {
        match self.index {
            CUSTOM_FILE_INDEX => Some(SelectedSource::CustomFile(&self.custom_path)),
            i if i < NUM_MANUAL_LOADERS => Some(SelectedSource::Builtin(i)),
            i => catalog
                .leaf_at(i - NUM_MANUAL_LOADERS)
                .map(SelectedSource::Catalog),
        }
    }

    /// Returns the file that should be loaded for the current selection.
    #[must_use]
    pub fn filename<'a>(&'a self, catalog: &'a Catalog) -> Option<&'a Path> {
        match self.resolve(catalog)? {
            SelectedSource::CustomFile(path) => Some(path),
            SelectedSource::Builtin(_) => None,
            SelectedSource::Catalog(entry) => entry.filename(),
        }
    }

    /// Returns the catalog entry for the current selection, if any.
    #[must_use]
    pub fn catalog_entry<'a>(&self, catalog: &'a Catalog) -> Option<&'a CatalogEntry> {
        if self.is_catalog_entry() {
            catalog.leaf_at(self.index - NUM_MANUAL_LOADERS)
        } else {
            None
        }
    }
}
