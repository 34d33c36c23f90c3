//! Dataset catalog: a tree of dataset descriptors built from a JSON manifest.
//!
//! The catalog is organized as an arena of [`CatalogEntry`] nodes below a
//! synthetic root group. Leaves are numbered in depth-first, children-in-order
//! order; the number of a leaf is its index in the dataset selector (see
//! [`crate::selection`]).
//!
//! Traversal uses an explicit stack of `(group, next child)` frames instead of
//! recursion so that callers can run side effects exactly when a group is
//! entered or left, e.g. to open and close nested menus.
//!
//! # Manifest format
//!
//! ```json
//! {
//!     "datasets": [
//!         { "name": "Clouds", "type": "node", "children": [
//!             { "name": "Wdas", "type": "leaf", "filename": "wdas_cloud.xyz" }
//!         ] }
//!     ]
//! }
//! ```
//!
//! `type` may be omitted: entries with `children` are groups, all others are
//! leaves. Relative file names are resolved against the manifest's directory.
//! An optional `transform` holds 16 numbers of a row-major 4x4 matrix.

use std::path::{Path, PathBuf};

use glam::Mat4;
use serde::{Deserialize, Serialize};

use crate::cloud_data::is_supported_extension;
use crate::error::{CloudscopeError, Result};
use crate::selection::{MANUAL_LOADER_NAMES, NUM_MANUAL_LOADERS};

/// Index of an entry inside a [`Catalog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId(usize);

/// Dataset information attached to a leaf entry.
#[derive(Debug, Clone, PartialEq)]
pub struct LeafInfo {
    /// Resolved path of the dataset file.
    pub filename: PathBuf,
    /// Optional custom model transform.
    pub transform: Option<Mat4>,
    /// Selector index of this leaf, assigned when the catalog is flattened.
    pub sequential_index: usize,
}

/// Kind of a catalog entry.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryKind {
    /// A group of entries, in display order.
    Group { children: Vec<EntryId> },
    /// A loadable dataset.
    Leaf(LeafInfo),
}

/// A node in the dataset tree.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    name: String,
    kind: EntryKind,
}

impl CatalogEntry {
    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the entry kind.
    #[must_use]
    pub fn kind(&self) -> &EntryKind {
        &self.kind
    }

    /// Returns true for group entries.
    #[must_use]
    pub fn is_group(&self) -> bool {
        matches!(self.kind, EntryKind::Group { .. })
    }

    /// Returns the leaf information, if this entry is a leaf.
    #[must_use]
    pub fn leaf(&self) -> Option<&LeafInfo> {
        match &self.kind {
            EntryKind::Leaf(info) => Some(info),
            EntryKind::Group { .. } => None,
        }
    }

    /// Returns the child ids of a group (empty for leaves).
    #[must_use]
    pub fn children(&self) -> &[EntryId] {
        match &self.kind {
            EntryKind::Group { children } => children,
            EntryKind::Leaf(_) => &[],
        }
    }

    /// Returns the dataset file of a leaf.
    #[must_use]
    pub fn filename(&self) -> Option<&Path> {
        self.leaf().map(|info| info.filename.as_path())
    }

    /// Returns the selector index of a leaf.
    #[must_use]
    pub fn sequential_index(&self) -> Option<usize> {
        self.leaf().map(|info| info.sequential_index)
    }

    /// Returns the custom transform of a leaf.
    #[must_use]
    pub fn transform(&self) -> Option<Mat4> {
        self.leaf().and_then(|info| info.transform)
    }
}

/// Explicit manifest entry type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManifestKind {
    /// A group with children.
    Node,
    /// A dataset.
    Leaf,
}

/// One entry of the manifest as written on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestNode {
    /// Display name.
    pub name: String,
    /// Explicit entry type.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ManifestKind>,
    /// Dataset file, relative to the manifest directory unless absolute.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Children of a group.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ManifestNode>,
    /// Row-major 4x4 transform.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<[f32; 16]>,
}

impl ManifestNode {
    /// Creates a leaf node.
    pub fn leaf(name: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: Some(ManifestKind::Leaf),
            filename: Some(filename.into()),
            children: Vec::new(),
            transform: None,
        }
    }

    /// Creates a group node.
    pub fn group(name: impl Into<String>, children: Vec<ManifestNode>) -> Self {
        Self {
            name: name.into(),
            kind: Some(ManifestKind::Node),
            filename: None,
            children,
            transform: None,
        }
    }

    fn is_group(&self) -> bool {
        match self.kind {
            Some(ManifestKind::Node) => true,
            Some(ManifestKind::Leaf) => false,
            None => !self.children.is_empty() || self.filename.is_none(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ManifestFile {
    Object { datasets: Vec<ManifestNode> },
    List(Vec<ManifestNode>),
}

/// Callbacks invoked while walking the catalog.
///
/// `exit_group` is called exactly once for every group for which
/// `enter_group` returned `true`, after all of its visited children.
pub trait CatalogVisitor<'a> {
    /// Called when a group is reached. Returning `false` skips its children.
    fn enter_group(&mut self, _group: &'a CatalogEntry) -> bool {
        true
    }

    /// Called after the last child of an entered group.
    fn exit_group(&mut self, _group: &'a CatalogEntry) {}

    /// Called for every visited leaf.
    fn leaf(&mut self, leaf: &'a CatalogEntry);
}

/// Id-level hooks used by the internal walk.
trait EntryWalk {
    fn enter(&mut self, id: EntryId) -> bool;
    fn exit(&mut self, id: EntryId);
    fn leaf(&mut self, id: EntryId);
}

struct Frame {
    node: EntryId,
    next_child: usize,
}

fn walk_entries(entries: &[CatalogEntry], root: EntryId, walk: &mut impl EntryWalk) {
    let mut stack = vec![Frame {
        node: root,
        next_child: 0,
    }];

    while let Some(Frame {
        node,
        mut next_child,
    }) = stack.pop()
    {
        let children = entries[node.0].children();
        let mut descended = false;

        while next_child < children.len() {
            let child = children[next_child];
            next_child += 1;

            if entries[child.0].is_group() {
                if walk.enter(child) {
                    // Resume with the parent's next sibling once the child is done.
                    stack.push(Frame { node, next_child });
                    stack.push(Frame {
                        node: child,
                        next_child: 0,
                    });
                    descended = true;
                    break;
                }
            } else {
                walk.leaf(child);
            }
        }

        if !descended && node != root {
            walk.exit(node);
        }
    }
}

struct VisitorWalk<'a, 'v, V> {
    entries: &'a [CatalogEntry],
    visitor: &'v mut V,
}

impl<'a, V: CatalogVisitor<'a>> EntryWalk for VisitorWalk<'a, '_, V> {
    fn enter(&mut self, id: EntryId) -> bool {
        self.visitor.enter_group(&self.entries[id.0])
    }

    fn exit(&mut self, id: EntryId) {
        self.visitor.exit_group(&self.entries[id.0]);
    }

    fn leaf(&mut self, id: EntryId) {
        self.visitor.leaf(&self.entries[id.0]);
    }
}

#[derive(Default)]
struct LeafCollector(Vec<EntryId>);

impl EntryWalk for LeafCollector {
    fn enter(&mut self, _id: EntryId) -> bool {
        true
    }

    fn exit(&mut self, _id: EntryId) {}

    fn leaf(&mut self, id: EntryId) {
        self.0.push(id);
    }
}

/// The dataset catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
    root: EntryId,
    names: Vec<String>,
    leaves: Vec<EntryId>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::empty()
    }
}

impl Catalog {
    /// Creates a catalog without datasets. Only the manual loaders are selectable.
    pub fn empty() -> Self {
        Self::from_nodes(Vec::new(), Path::new(""))
    }

    /// Reads and flattens the manifest at `manifest_path`.
    ///
    /// Relative dataset paths are resolved against the manifest's directory.
    pub fn build(manifest_path: impl AsRef<Path>) -> Result<Self> {
        let manifest_path = manifest_path.as_ref();
        let json = std::fs::read_to_string(manifest_path)?;
        let base_dir = manifest_path.parent().unwrap_or_else(|| Path::new(""));
        Self::from_json_str(&json, base_dir)
    }

    /// Builds the catalog, degrading to an empty catalog if the manifest is
    /// missing or unreadable.
    pub fn load_or_empty(manifest_path: impl AsRef<Path>) -> Self {
        let manifest_path = manifest_path.as_ref();
        if !manifest_path.exists() {
            log::info!(
                "No dataset manifest at {}, only manual loaders are available",
                manifest_path.display()
            );
            return Self::empty();
        }

        match Self::build(manifest_path) {
            Ok(catalog) => {
                log::info!(
                    "Loaded dataset catalog with {} datasets from {}",
                    catalog.num_leaves(),
                    manifest_path.display()
                );
                catalog
            }
            Err(e) => {
                log::warn!(
                    "Ignoring dataset manifest {}: {e}",
                    manifest_path.display()
                );
                Self::empty()
            }
        }
    }

    /// Parses a manifest from a JSON string.
    pub fn from_json_str(json: &str, base_dir: &Path) -> Result<Self> {
        let nodes = match serde_json::from_str::<ManifestFile>(json)? {
            ManifestFile::Object { datasets } => datasets,
            ManifestFile::List(nodes) => nodes,
        };
        Ok(Self::from_nodes(nodes, base_dir))
    }

    /// Builds the catalog from already parsed manifest nodes.
    ///
    /// Leaves without a file name are skipped with a warning.
    pub fn from_nodes(nodes: Vec<ManifestNode>, base_dir: &Path) -> Self {
        let mut entries = vec![CatalogEntry {
            name: "root".to_string(),
            kind: EntryKind::Group {
                children: Vec::new(),
            },
        }];
        let root = EntryId(0);
        let children = insert_nodes(&mut entries, nodes, base_dir);
        entries[root.0].kind = EntryKind::Group { children };

        let mut collector = LeafCollector::default();
        walk_entries(&entries, root, &mut collector);
        let leaves = collector.0;

        let mut names: Vec<String> = MANUAL_LOADER_NAMES.iter().map(ToString::to_string).collect();
        for (position, id) in leaves.iter().enumerate() {
            let entry = &mut entries[id.0];
            if let EntryKind::Leaf(info) = &mut entry.kind {
                info.sequential_index = NUM_MANUAL_LOADERS + position;
            }
            names.push(entry.name.clone());
        }

        Self {
            entries,
            root,
            names,
            leaves,
        }
    }

    /// Walks the tree in pre-order, calling the visitor at group and leaf boundaries.
    pub fn walk<'a, V: CatalogVisitor<'a>>(&'a self, visitor: &mut V) {
        let mut walk = VisitorWalk {
            entries: &self.entries,
            visitor,
        };
        walk_entries(&self.entries, self.root, &mut walk);
    }

    /// Returns the synthetic root group.
    #[must_use]
    pub fn root(&self) -> &CatalogEntry {
        &self.entries[self.root.0]
    }

    /// Returns an entry by id.
    #[must_use]
    pub fn entry(&self, id: EntryId) -> Option<&CatalogEntry> {
        self.entries.get(id.0)
    }

    /// Returns the selector names: manual loaders first, then every leaf in order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Returns the leaf at `position` in the flat leaf list.
    #[must_use]
    pub fn leaf_at(&self, position: usize) -> Option<&CatalogEntry> {
        self.leaves.get(position).map(|id| &self.entries[id.0])
    }

    /// Returns all leaves in selector order.
    pub fn leaves(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.leaves.iter().map(|id| &self.entries[id.0])
    }

    /// Returns the number of datasets in the catalog.
    #[must_use]
    pub fn num_leaves(&self) -> usize {
        self.leaves.len()
    }

    /// Returns true if the catalog holds no datasets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }
}

fn insert_nodes(entries: &mut Vec<CatalogEntry>, nodes: Vec<ManifestNode>, base_dir: &Path) -> Vec<EntryId> {
    let mut ids = Vec::with_capacity(nodes.len());
    for node in nodes {
        if let Some(id) = insert_node(entries, node, base_dir) {
            ids.push(id);
        }
    }
    ids
}

fn insert_node(entries: &mut Vec<CatalogEntry>, node: ManifestNode, base_dir: &Path) -> Option<EntryId> {
    if node.is_group() {
        let id = EntryId(entries.len());
        entries.push(CatalogEntry {
            name: node.name,
            kind: EntryKind::Group {
                children: Vec::new(),
            },
        });
        let children = insert_nodes(entries, node.children, base_dir);
        entries[id.0].kind = EntryKind::Group { children };
        return Some(id);
    }

    let Some(filename) = node.filename else {
        log::warn!("{}", CloudscopeError::ManifestEntry(node.name));
        return None;
    };

    let filename = resolve_path(base_dir, &filename);
    if !is_supported_extension(&filename) {
        log::warn!(
            "Dataset '{}' has an unsupported file extension: {}",
            node.name,
            filename.display()
        );
    }

    let id = EntryId(entries.len());
    entries.push(CatalogEntry {
        name: node.name,
        kind: EntryKind::Leaf(LeafInfo {
            filename,
            transform: node
                .transform
                .map(|rows| Mat4::from_cols_array(&rows).transpose()),
            sequential_index: 0,
        }),
    });
    Some(id)
}

fn resolve_path(base_dir: &Path, filename: &str) -> PathBuf {
    let path = Path::new(filename);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}
