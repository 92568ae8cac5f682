//! Template store: bundled or local template roots
//!
//! Both sources produce the same in-memory shape:
//! - Embedded: template trees compiled into the binary with `include_dir`
//! - Local: a directory on disk, walked with `walkdir` (for template development)
//!
//! Entries are sorted by relative path and tagged as render, copy or
//! directory at load time, so the materializer never has to guess.

use super::manifest::{Classification, TemplateManifest, MANIFEST_FILE};
use crate::error::{CreatorError, Result};
use include_dir::{include_dir, Dir, DirEntry};
use std::borrow::Cow;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

static BUNDLED: Dir<'static> = include_dir!("$CARGO_MANIFEST_DIR/templates");

/// Suffix marking a file as a text template
pub const TEMPLATE_SUFFIX: &str = ".j2";

/// Directory names never copied out of a template root
const SKIP_DIRS: &[&str] = &["__pycache__"];

/// File suffixes never copied out of a template root
const SKIP_FILE_SUFFIXES: &[&str] = &[".pyc"];

/// How a template entry is turned into destination content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Text with placeholders to substitute
    Render,
    /// Opaque bytes copied verbatim
    Copy,
    Directory,
}

/// One file or directory inside a template root
#[derive(Debug, Clone)]
pub struct TemplateEntry {
    /// Path relative to the root; may contain placeholder tokens
    pub rel_path: PathBuf,
    pub kind: EntryKind,
    /// Raw content (empty for directories)
    pub content: Cow<'static, [u8]>,
}

impl TemplateEntry {
    fn new(rel_path: PathBuf, is_dir: bool, content: Cow<'static, [u8]>) -> Self {
        let kind = if is_dir {
            EntryKind::Directory
        } else if rel_path
            .file_name()
            .is_some_and(|name| name.to_string_lossy().ends_with(TEMPLATE_SUFFIX))
        {
            EntryKind::Render
        } else {
            EntryKind::Copy
        };
        Self {
            rel_path,
            kind,
            content,
        }
    }

    /// Relative path with `/` separators, as used by manifest patterns
    pub fn rel_str(&self) -> String {
        slash_path(&self.rel_path)
    }

    /// Relative path with the template suffix removed
    pub fn logical_path(&self) -> String {
        let rel = self.rel_str();
        match rel.strip_suffix(TEMPLATE_SUFFIX) {
            Some(stripped) if self.kind == EntryKind::Render => stripped.to_string(),
            _ => rel,
        }
    }
}

/// A named, loaded template tree
#[derive(Debug, Clone)]
pub struct TemplateRoot {
    pub name: String,
    pub manifest: TemplateManifest,
    /// Entries in lexicographic order of their relative path
    pub entries: Vec<TemplateEntry>,
}

impl TemplateRoot {
    pub fn classify(&self, entry: &TemplateEntry) -> Classification {
        self.manifest.classify(&entry.logical_path())
    }
}

/// Where template roots are read from
#[derive(Debug, Clone)]
pub enum TemplateSource {
    Embedded,
    Local(PathBuf),
}

/// Read-only access to template roots
///
/// Holds no mutable state, so one store can serve concurrent invocations.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    source: TemplateSource,
}

impl Default for TemplateStore {
    fn default() -> Self {
        Self::embedded()
    }
}

impl TemplateStore {
    pub fn new(source: TemplateSource) -> Self {
        Self { source }
    }

    /// Store backed by the templates bundled into the binary
    pub fn embedded() -> Self {
        Self::new(TemplateSource::Embedded)
    }

    /// Store backed by a local directory tree
    pub fn local(path: PathBuf) -> Self {
        Self::new(TemplateSource::Local(path))
    }

    pub fn source(&self) -> &TemplateSource {
        &self.source
    }

    /// Names of every root in the store (directories holding a manifest), sorted
    pub fn root_names(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        match &self.source {
            TemplateSource::Embedded => collect_embedded_roots(&BUNDLED, &mut names),
            TemplateSource::Local(base) => {
                for entry in WalkDir::new(base).min_depth(1) {
                    let entry = entry.map_err(|e| {
                        CreatorError::TemplateStore(format!(
                            "failed to walk {}: {}",
                            base.display(),
                            e
                        ))
                    })?;
                    if entry.file_type().is_file() && entry.file_name() == MANIFEST_FILE {
                        if let Some(parent) = entry.path().parent() {
                            if let Ok(rel) = parent.strip_prefix(base) {
                                names.push(slash_path(rel));
                            }
                        }
                    }
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Load a root by name, e.g. `collection_project` or `plugins/filter`
    pub fn load(&self, name: &str) -> Result<TemplateRoot> {
        tracing::debug!(root = name, "loading template root");
        let (manifest_src, entries) = match &self.source {
            TemplateSource::Embedded => load_embedded(name)?,
            TemplateSource::Local(base) => load_local(base, name)?,
        };

        let manifest: TemplateManifest =
            serde_yaml::from_slice(&manifest_src).map_err(|source| CreatorError::Manifest {
                root: name.to_string(),
                source,
            })?;

        let mut entries = entries;
        entries.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));

        Ok(TemplateRoot {
            name: name.to_string(),
            manifest,
            entries,
        })
    }
}

fn collect_embedded_roots(dir: &Dir<'static>, names: &mut Vec<String>) {
    for entry in dir.entries() {
        if let DirEntry::Dir(sub) = entry {
            if sub.get_file(sub.path().join(MANIFEST_FILE)).is_some() {
                names.push(slash_path(sub.path()));
            }
            collect_embedded_roots(sub, names);
        }
    }
}

fn load_embedded(name: &str) -> Result<(Cow<'static, [u8]>, Vec<TemplateEntry>)> {
    let root = BUNDLED
        .get_dir(name)
        .ok_or_else(|| CreatorError::TemplateStore(format!("template root '{}' not found", name)))?;
    let manifest = root
        .get_file(root.path().join(MANIFEST_FILE))
        .ok_or_else(|| {
            CreatorError::TemplateStore(format!("template root '{}' has no {}", name, MANIFEST_FILE))
        })?;

    let mut entries = Vec::new();
    collect_embedded_entries(root, root.path(), &mut entries);
    Ok((Cow::Borrowed(manifest.contents()), entries))
}

fn collect_embedded_entries(dir: &Dir<'static>, base: &Path, out: &mut Vec<TemplateEntry>) {
    for entry in dir.entries() {
        let Ok(rel) = entry.path().strip_prefix(base) else {
            continue;
        };
        match entry {
            DirEntry::Dir(sub) => {
                if is_skipped_dir(rel) {
                    continue;
                }
                out.push(TemplateEntry::new(rel.to_path_buf(), true, Cow::Borrowed(&[])));
                collect_embedded_entries(sub, base, out);
            }
            DirEntry::File(file) => {
                if is_skipped_file(rel) {
                    continue;
                }
                out.push(TemplateEntry::new(
                    rel.to_path_buf(),
                    false,
                    Cow::Borrowed(file.contents()),
                ));
            }
        }
    }
}

fn load_local(base: &Path, name: &str) -> Result<(Cow<'static, [u8]>, Vec<TemplateEntry>)> {
    let root = base.join(name);
    let manifest_path = root.join(MANIFEST_FILE);
    let manifest = std::fs::read(&manifest_path).map_err(|e| {
        CreatorError::TemplateStore(format!("failed to read {}: {}", manifest_path.display(), e))
    })?;

    let mut entries = Vec::new();
    let walker = WalkDir::new(&root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !(e.file_type().is_dir() && is_skipped_dir(e.path())));

    for entry in walker {
        let entry = entry.map_err(|e| {
            CreatorError::TemplateStore(format!("failed to walk {}: {}", root.display(), e))
        })?;
        let Ok(rel) = entry.path().strip_prefix(&root) else {
            continue;
        };
        if entry.file_type().is_dir() {
            entries.push(TemplateEntry::new(rel.to_path_buf(), true, Cow::Borrowed(&[])));
        } else if !is_skipped_file(rel) {
            let bytes = std::fs::read(entry.path()).map_err(|e| {
                CreatorError::TemplateStore(format!(
                    "failed to read {}: {}",
                    entry.path().display(),
                    e
                ))
            })?;
            entries.push(TemplateEntry::new(rel.to_path_buf(), false, Cow::Owned(bytes)));
        }
    }

    Ok((Cow::Owned(manifest), entries))
}

fn is_skipped_dir(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|name| SKIP_DIRS.iter().any(|skip| name == *skip))
}

fn is_skipped_file(rel: &Path) -> bool {
    // The manifest only counts at the top of the root
    if rel == Path::new(MANIFEST_FILE) {
        return true;
    }
    let name = rel.to_string_lossy();
    SKIP_FILE_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}

/// Render a relative path with `/` separators on every platform
pub(crate) fn slash_path(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_roots_present() {
        let names = TemplateStore::embedded().root_names().unwrap();
        for expected in [
            "collection_project",
            "playbook_project",
            "execution_env_project",
            "common/devcontainer",
            "common/devfile",
            "common/gitignore",
            "common/vscode",
            "common/execution-environment",
            "common/role",
            "plugins/action",
            "plugins/filter",
            "plugins/lookup",
            "plugins/module",
            "plugins/test",
        ] {
            assert!(names.iter().any(|n| n == expected), "missing root {}", expected);
        }
    }

    #[test]
    fn test_every_bundled_root_loads() {
        let store = TemplateStore::embedded();
        for name in store.root_names().unwrap() {
            let root = store.load(&name).unwrap();
            assert!(!root.entries.is_empty(), "root {} is empty", name);
            assert!(
                root.entries.iter().all(|e| e.rel_str() != MANIFEST_FILE),
                "manifest leaked into entries of {}",
                name
            );
        }
    }

    #[test]
    fn test_entries_sorted_and_tagged() {
        let root = TemplateStore::embedded().load("collection_project").unwrap();
        let paths: Vec<_> = root.entries.iter().map(|e| e.rel_path.clone()).collect();
        let mut sorted = paths.clone();
        sorted.sort();
        assert_eq!(paths, sorted);

        let galaxy = root
            .entries
            .iter()
            .find(|e| e.rel_str() == "galaxy.yml.j2")
            .unwrap();
        assert_eq!(galaxy.kind, EntryKind::Render);
        assert_eq!(galaxy.logical_path(), "galaxy.yml");

        let keep = root
            .entries
            .iter()
            .find(|e| e.rel_str() == "docs/.keep")
            .unwrap();
        assert_eq!(keep.kind, EntryKind::Copy);

        let docs = root.entries.iter().find(|e| e.rel_str() == "docs").unwrap();
        assert_eq!(docs.kind, EntryKind::Directory);
    }

    #[test]
    fn test_unknown_root() {
        let err = TemplateStore::embedded().load("no_such_root").unwrap_err();
        assert!(err.to_string().contains("no_such_root"));
    }

    #[test]
    fn test_local_source_skips_cache_files() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("demo");
        std::fs::create_dir_all(root.join("__pycache__")).unwrap();
        std::fs::create_dir_all(root.join("src")).unwrap();
        std::fs::write(root.join(MANIFEST_FILE), "name: demo\n").unwrap();
        std::fs::write(root.join("__pycache__/x.pyc"), [0u8, 1, 2]).unwrap();
        std::fs::write(root.join("src/mod.pyc"), [0u8]).unwrap();
        std::fs::write(root.join("src/main.py.j2"), "# {{ fqcn }}\n").unwrap();
        std::fs::write(root.join("README.md"), "readme\n").unwrap();

        let store = TemplateStore::local(dir.path().to_path_buf());
        assert_eq!(store.root_names().unwrap(), vec!["demo".to_string()]);

        let loaded = store.load("demo").unwrap();
        let rels: Vec<_> = loaded.entries.iter().map(|e| e.rel_str()).collect();
        assert_eq!(rels, vec!["README.md", "src", "src/main.py.j2"]);
        assert_eq!(loaded.entries[2].kind, EntryKind::Render);
    }
}
