use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::error::{Result, TreeError};
use crate::node::{NodeIndex, NodeKind, ResourceNode};
use crate::resolve::{Deferred, PayloadResolver};
use crate::walker::{SkippedEntry, Walker};

/// Arena owning every node of one compilation run, addressed by index.
///
/// Nodes are stored in emission order: `nodes[i].index == i`, every child
/// index is smaller than its parent's, and the root is the last node.
#[derive(Debug, Clone)]
pub struct ResourceTree {
    nodes: Vec<ResourceNode>,
    skipped: Vec<SkippedEntry>,
}

impl ResourceTree {
    /// Walk `root` and resolve every payload on the current thread.
    pub fn build(root: impl AsRef<Path>, resolver: &dyn PayloadResolver) -> Result<Self> {
        let mut walker = Walker::new(root, resolver)?;
        let mut nodes = Vec::new();
        for node in walker.by_ref() {
            nodes.push(node?);
        }
        let mut tree = Self::from_nodes(nodes)?;
        tree.skipped = walker.take_skipped();
        Ok(tree)
    }

    /// Walk `root` first, then resolve payloads on a pool of `jobs` threads.
    ///
    /// Payloads are written back by index, so the result is identical to
    /// [`ResourceTree::build`]. The first failure in index order is reported.
    pub fn build_parallel(
        root: impl AsRef<Path>,
        resolver: &(dyn PayloadResolver + Sync),
        jobs: usize,
    ) -> Result<Self> {
        let mut tree = Self::build(root, &Deferred)?;

        let pending: Vec<(NodeIndex, PathBuf, String)> = tree
            .nodes
            .iter()
            .filter(|node| !node.is_dir())
            .map(|node| (node.index, node.source.clone(), node.path.clone()))
            .collect();

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs.max(1))
            .build()
            .map_err(|e| TreeError::Pool(e.to_string()))?;

        log::debug!("resolving {} payload(s) on {} thread(s)", pending.len(), jobs);
        let resolved: Vec<Result<(NodeIndex, Vec<u8>)>> = pool.install(|| {
            pending
                .par_iter()
                .map(|(index, source, path)| {
                    resolver.resolve(source, path).map(|payload| (*index, payload))
                })
                .collect()
        });

        for result in resolved {
            let (index, resolved_payload) = result?;
            if let NodeKind::File { payload } = &mut tree.nodes[index.get()].kind {
                *payload = resolved_payload;
            }
        }
        Ok(tree)
    }

    /// Take ownership of a post-order node sequence, checking its invariants.
    pub fn from_nodes(nodes: Vec<ResourceNode>) -> Result<Self> {
        let Some(root) = nodes.last() else {
            return Err(TreeError::Invariant("empty node sequence".into()));
        };
        if !root.is_root() || !root.is_dir() {
            return Err(TreeError::Invariant(format!(
                "last node {:?} is not the root directory",
                root.path
            )));
        }

        for (position, node) in nodes.iter().enumerate() {
            if node.index.get() != position {
                return Err(TreeError::Invariant(format!(
                    "node {:?} has index {} at position {}",
                    node.path, node.index, position
                )));
            }
            if node.is_root() && position + 1 != nodes.len() {
                return Err(TreeError::Invariant(format!(
                    "second root at position {position}"
                )));
            }

            let children = node.children();
            for child in children {
                if child.get() >= position {
                    return Err(TreeError::Invariant(format!(
                        "{:?} references child {} that is not emitted before it",
                        node.path, child
                    )));
                }
            }
            let sorted = children
                .windows(2)
                .all(|pair| nodes[pair[0].get()].path < nodes[pair[1].get()].path);
            if !sorted {
                return Err(TreeError::Invariant(format!(
                    "children of {:?} are not sorted by path",
                    node.path
                )));
            }
        }

        Ok(Self {
            nodes,
            skipped: Vec::new(),
        })
    }

    pub fn get(&self, index: NodeIndex) -> Option<&ResourceNode> {
        self.nodes.get(index.get())
    }

    /// The highest-indexed node.
    pub fn root(&self) -> &ResourceNode {
        // from_nodes guarantees at least the root
        &self.nodes[self.nodes.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in emission order.
    pub fn iter(&self) -> std::slice::Iter<'_, ResourceNode> {
        self.nodes.iter()
    }

    pub fn nodes(&self) -> &[ResourceNode] {
        &self.nodes
    }

    pub fn children<'a>(&'a self, node: &'a ResourceNode) -> impl Iterator<Item = &'a ResourceNode> + 'a {
        node.children().iter().map(move |index| &self.nodes[index.get()])
    }

    pub fn file_count(&self) -> usize {
        self.nodes.iter().filter(|n| !n.is_dir()).count()
    }

    pub fn dir_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_dir()).count()
    }

    pub fn total_payload_bytes(&self) -> usize {
        self.nodes.iter().filter_map(|n| n.payload()).map(<[u8]>::len).sum()
    }

    /// Entries excluded during the walk.
    pub fn skipped(&self) -> &[SkippedEntry] {
        &self.skipped
    }

    /// Resolve a `/`-separated path from the root, the way a consumer of the
    /// emitted structure navigates it. Leading and trailing `/` are ignored.
    pub fn lookup(&self, path: &str) -> Option<&ResourceNode> {
        let path = path.trim_matches('/');
        let mut current = self.root();
        if path.is_empty() {
            return Some(current);
        }

        let mut end = 0;
        for part in path.split('/') {
            end += part.len();
            let prefix = &path[..end];
            current = self.children(current).find(|child| child.path == prefix)?;
            end += 1;
        }
        Some(current)
    }
}

impl<'a> IntoIterator for &'a ResourceTree {
    type Item = &'a ResourceNode;
    type IntoIter = std::slice::Iter<'a, ResourceNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
