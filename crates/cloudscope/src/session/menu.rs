//! The "Datasets" menu.

use cloudscope_core::catalog::{CatalogEntry, CatalogVisitor};
use cloudscope_core::selection::MANUAL_LOADER_NAMES;
use cloudscope_core::NUM_MANUAL_LOADERS;
use cloudscope_render::RenderBackend;

use super::{LoadOutcome, Session};

/// Immediate-mode menu calls of the GUI toolkit.
pub trait MenuBackend {
    /// Opens a submenu. Returns true if it is expanded and its items should be emitted.
    fn begin_menu(&mut self, label: &str) -> bool;

    /// Emits an item. Returns true if it was clicked this frame.
    fn menu_item(&mut self, label: &str) -> bool;

    /// Closes the submenu opened by the last expanded [`begin_menu`](MenuBackend::begin_menu).
    fn end_menu(&mut self);
}

struct DatasetMenu<'m, M: ?Sized> {
    menu: &'m mut M,
    clicked: Option<usize>,
}

impl<'a, M: MenuBackend + ?Sized> CatalogVisitor<'a> for DatasetMenu<'_, M> {
    fn enter_group(&mut self, group: &'a CatalogEntry) -> bool {
        self.menu.begin_menu(group.name())
    }

    fn exit_group(&mut self, _group: &'a CatalogEntry) {
        self.menu.end_menu();
    }

    fn leaf(&mut self, leaf: &'a CatalogEntry) {
        if self.menu.menu_item(leaf.name()) {
            self.clicked = leaf.sequential_index();
        }
    }
}

impl<B: RenderBackend> Session<B> {
    /// Emits the "Datasets" menu: the built-in loaders, then the catalog tree.
    ///
    /// Submenus are only walked while they are open. Clicking a dataset
    /// selects and loads it; clicking a built-in loader only selects it.
    pub fn build_dataset_menu<M: MenuBackend + ?Sized>(&mut self, menu: &mut M) -> Option<LoadOutcome> {
        if !menu.begin_menu("Datasets") {
            return None;
        }

        for (index, name) in MANUAL_LOADER_NAMES
            .iter()
            .enumerate()
            .take(NUM_MANUAL_LOADERS)
            .skip(1)
        {
            if menu.menu_item(name) {
                self.selection.set_index(index);
            }
        }

        let mut visitor = DatasetMenu {
            menu: &mut *menu,
            clicked: None,
        };
        self.catalog.walk(&mut visitor);
        let clicked = visitor.clicked;
        menu.end_menu();

        let index = clicked?;
        self.selection.set_index(index);
        Some(self.load_selected_dataset())
    }
}
