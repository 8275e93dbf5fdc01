use anyhow::Result;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// One file or directory inside the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreEntry {
    pub path: PathBuf,
    /// File name as shown in the tree.
    pub name: String,
    /// 0 for direct children of the store root.
    pub depth: usize,
    pub is_dir: bool,
}

/// A directory tree rooted at the password store, with per-directory
/// expansion state.
#[derive(Debug, Clone, Default)]
pub struct StoreTree {
    root: PathBuf,
    /// Every entry, depth-first, directories before files at each level.
    entries: Vec<StoreEntry>,
    expanded: HashSet<PathBuf>,
}

impl StoreTree {
    /// Scan `root`. A root that does not exist yields an empty tree.
    pub fn load(root: impl Into<PathBuf>) -> Result<Self> {
        let mut tree = Self {
            root: root.into(),
            entries: Vec::new(),
            expanded: HashSet::new(),
        };
        tree.refresh()?;
        Ok(tree)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Re-scan the root, keeping the expansion state of directories that
    /// still exist.
    pub fn refresh(&mut self) -> Result<()> {
        self.entries = scan(&self.root);
        let dirs: HashSet<&PathBuf> = self
            .entries
            .iter()
            .filter(|e| e.is_dir)
            .map(|e| &e.path)
            .collect();
        self.expanded.retain(|p| dirs.contains(p));
        debug!(
            "scanned {} entries under {}",
            self.entries.len(),
            self.root.display()
        );
        Ok(())
    }

    /// Point the tree at a different root and re-scan it.
    pub fn set_root(&mut self, root: impl Into<PathBuf>) -> Result<()> {
        let root = root.into();
        if root != self.root {
            self.root = root;
            self.expanded.clear();
        }
        self.refresh()
    }

    pub fn entries(&self) -> &[StoreEntry] {
        &self.entries
    }

    /// Entries whose ancestors are all expanded, in display order.
    pub fn visible(&self) -> Vec<&StoreEntry> {
        let mut items = Vec::new();
        let mut hidden_below: Option<usize> = None;

        for entry in &self.entries {
            if let Some(depth) = hidden_below {
                if entry.depth > depth {
                    continue;
                }
                hidden_below = None;
            }
            items.push(entry);
            if entry.is_dir && !self.is_expanded(&entry.path) {
                hidden_below = Some(entry.depth);
            }
        }

        items
    }

    pub fn is_expanded(&self, dir: &Path) -> bool {
        self.expanded.contains(dir)
    }

    pub fn expand(&mut self, dir: &Path) {
        self.expanded.insert(dir.to_path_buf());
    }

    pub fn collapse(&mut self, dir: &Path) {
        self.expanded.remove(dir);
    }

    pub fn toggle(&mut self, dir: &Path) {
        if self.is_expanded(dir) {
            self.collapse(dir);
        } else {
            self.expand(dir);
        }
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_str().is_some_and(|s| s.starts_with('.'))
}

fn dirs_first(a: &DirEntry, b: &DirEntry) -> Ordering {
    let a_dir = a.file_type().is_dir();
    let b_dir = b.file_type().is_dir();
    b_dir
        .cmp(&a_dir)
        .then_with(|| a.file_name().cmp(b.file_name()))
}

fn scan(root: &Path) -> Vec<StoreEntry> {
    if !root.is_dir() {
        warn!("password store not found: {}", root.display());
        return Vec::new();
    }

    WalkDir::new(root)
        .min_depth(1)
        .follow_links(true)
        .sort_by(dirs_first)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e))
        .filter_map(|e| match e {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!("failed to read store entry: {}", err);
                None
            }
        })
        .map(|entry| StoreEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            depth: entry.depth() - 1,
            is_dir: entry.file_type().is_dir(),
            path: entry.into_path(),
        })
        .collect()
}

/// Whether `path` looks like an encrypted entry.
pub fn is_secret_file(path: &Path) -> bool {
    path.extension() == Some(OsStr::new("gpg"))
}
