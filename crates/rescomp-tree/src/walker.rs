use std::collections::VecDeque;
use std::fs::FileType;
use std::path::{Component, Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Result, TreeError};
use crate::node::{NodeIndex, ResourceNode};
use crate::resolve::PayloadResolver;

/// An entry left out of the embedded image because it is neither a regular
/// file nor a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    pub path: PathBuf,
    pub kind: &'static str,
}

/// A directory whose subtree is still being visited.
struct OpenDir {
    path: String,
    source: PathBuf,
    depth: usize,
    children: Vec<(String, NodeIndex)>,
}

/// Post-order traversal of a directory tree.
///
/// Yields fully resolved nodes, every node after all of its descendants, with
/// indices assigned in yield order. Siblings are visited in file-name order.
/// The traversal keeps an explicit stack of open directories instead of
/// recursing, and stops for good after the first error.
pub struct Walker<'r> {
    root: PathBuf,
    entries: walkdir::IntoIter,
    resolver: &'r dyn PayloadResolver,
    open: Vec<OpenDir>,
    ready: VecDeque<ResourceNode>,
    skipped: Vec<SkippedEntry>,
    next_index: usize,
    finished: bool,
}

impl<'r> Walker<'r> {
    /// Start walking `root`. Fails if `root` is not a readable directory.
    pub fn new(root: impl AsRef<Path>, resolver: &'r dyn PayloadResolver) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::read_dir(&root).map_err(|source| TreeError::RootNotFound {
            path: root.clone(),
            source,
        })?;

        let entries = WalkDir::new(&root)
            .follow_links(false)
            .sort_by(|a, b| a.file_name().cmp(b.file_name()))
            .into_iter();

        Ok(Self {
            root,
            entries,
            resolver,
            open: Vec::new(),
            ready: VecDeque::new(),
            skipped: Vec::new(),
            next_index: 0,
            finished: false,
        })
    }

    /// Entries excluded so far.
    pub fn skipped(&self) -> &[SkippedEntry] {
        &self.skipped
    }

    pub fn take_skipped(&mut self) -> Vec<SkippedEntry> {
        std::mem::take(&mut self.skipped)
    }

    fn allocate_index(&mut self) -> NodeIndex {
        let index = NodeIndex(self.next_index);
        self.next_index += 1;
        index
    }

    /// Close every open directory at `depth` or deeper.
    fn close_from(&mut self, depth: usize) {
        while self.open.last().is_some_and(|dir| dir.depth >= depth) {
            let Some(dir) = self.open.pop() else { break };
            self.close(dir);
        }
    }

    fn close(&mut self, mut dir: OpenDir) {
        dir.children.sort_by(|a, b| a.0.cmp(&b.0));
        let children: Vec<NodeIndex> = dir.children.into_iter().map(|(_, index)| index).collect();
        let index = self.allocate_index();

        let node = if dir.depth == 0 {
            log::info!("including root directory {:?}", self.root.display().to_string());
            ResourceNode::root(index, dir.source, children)
        } else {
            log::info!("including directory {:?}", dir.path);
            ResourceNode::directory(index, dir.path, dir.source, children)
        };
        self.attach(&node);
        self.ready.push_back(node);
    }

    /// Record `node` as a child of the innermost open directory.
    fn attach(&mut self, node: &ResourceNode) {
        if let Some(parent) = self.open.last_mut() {
            parent.children.push((node.path.clone(), node.index));
        }
    }

    fn visit(&mut self, entry: walkdir::DirEntry) -> Result<()> {
        let depth = entry.depth();
        self.close_from(depth);

        let file_type = entry.file_type();
        let source = entry.into_path();

        if depth == 0 {
            log::info!("scanning directory {:?}", source.display().to_string());
            self.open.push(OpenDir {
                path: String::new(),
                source,
                depth,
                children: Vec::new(),
            });
            return Ok(());
        }

        if file_type.is_dir() {
            let path = relative_path(&self.root, &source)?;
            log::info!("scanning directory {:?}", path);
            self.open.push(OpenDir {
                path,
                source,
                depth,
                children: Vec::new(),
            });
        } else if file_type.is_file() {
            let path = relative_path(&self.root, &source)?;
            let payload = self.resolver.resolve(&source, &path)?;
            let index = self.allocate_index();
            let node = ResourceNode::file(index, path, source, payload);
            self.attach(&node);
            self.ready.push_back(node);
        } else {
            let kind = describe_file_type(&file_type);
            log::warn!("skipping {} {:?}: not a regular file or directory", kind, source.display().to_string());
            self.skipped.push(SkippedEntry { path: source, kind });
        }
        Ok(())
    }
}

impl Iterator for Walker<'_> {
    type Item = Result<ResourceNode>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(node) = self.ready.pop_front() {
                return Some(Ok(node));
            }
            if self.finished {
                return None;
            }

            match self.entries.next() {
                None => {
                    self.close_from(0);
                    self.finished = true;
                }
                Some(Err(e)) => {
                    self.fail();
                    let path = e.path().unwrap_or(&self.root).to_path_buf();
                    return Some(Err(TreeError::Io {
                        path,
                        source: e.into(),
                    }));
                }
                Some(Ok(entry)) => {
                    if let Err(e) = self.visit(entry) {
                        self.fail();
                        return Some(Err(e));
                    }
                }
            }
        }
    }
}

impl Walker<'_> {
    fn fail(&mut self) {
        self.finished = true;
        self.open.clear();
        self.ready.clear();
    }
}

impl std::iter::FusedIterator for Walker<'_> {}

/// `/`-joined path of `source` relative to `root`.
fn relative_path(root: &Path, source: &Path) -> Result<String> {
    let rel = source.strip_prefix(root).unwrap_or(source);
    let mut parts = Vec::new();
    for component in rel.components() {
        if let Component::Normal(part) = component {
            let part = part
                .to_str()
                .ok_or_else(|| TreeError::InvalidPath(source.to_path_buf()))?;
            parts.push(part);
        }
    }
    Ok(parts.join("/"))
}

#[cfg(unix)]
fn describe_file_type(file_type: &FileType) -> &'static str {
    use std::os::unix::fs::FileTypeExt;

    if file_type.is_symlink() {
        "symbolic link"
    } else if file_type.is_fifo() {
        "fifo"
    } else if file_type.is_socket() {
        "socket"
    } else if file_type.is_block_device() {
        "block device"
    } else if file_type.is_char_device() {
        "character device"
    } else {
        "special file"
    }
}

#[cfg(not(unix))]
fn describe_file_type(file_type: &FileType) -> &'static str {
    if file_type.is_symlink() {
        "symbolic link"
    } else {
        "special file"
    }
}
