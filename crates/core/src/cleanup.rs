//! Recursive filesystem cleanup
//!
//! Removes generated files and directory trees. Every operation is idempotent:
//! a path that does not exist is a successful no-op. Failures are never
//! swallowed; they surface as [`PipelineError::Io`] naming the failing path,
//! and whatever was removed before the failure stays removed.
//!
//! Symbolic links are unlinked, never followed, so descent cannot leave the
//! target subtree or loop through a link cycle.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::types::{PipelineError, PipelineResult};

/// The kind of filesystem entry a cleanup target is expected to be
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum PathKind {
    File,
    Directory,
}

/// A path scheduled for removal, with the kind it is expected to have
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CleanTarget {
    pub path: PathBuf,
    pub kind: PathKind,
}

impl CleanTarget {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: PathKind::File,
        }
    }

    pub fn directory(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: PathKind::Directory,
        }
    }
}

/// Outcome of cleaning a list of targets
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CleanReport {
    /// Targets that existed and were deleted.
    pub removed: Vec<PathBuf>,
    /// Targets that did not exist.
    pub missing: Vec<PathBuf>,
    /// Targets that exist with a different kind than expected and were left alone.
    pub skipped: Vec<PathBuf>,
}

enum EntryKind {
    File,
    Directory,
    Symlink,
}

/// Classify a path without following symlinks. `None` means it does not exist.
fn classify(path: &Path) -> PipelineResult<Option<EntryKind>> {
    match fs::symlink_metadata(path) {
        Ok(meta) => {
            let file_type = meta.file_type();
            Ok(Some(if file_type.is_symlink() {
                EntryKind::Symlink
            } else if file_type.is_dir() {
                EntryKind::Directory
            } else {
                EntryKind::File
            }))
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(PipelineError::io(path, e)),
    }
}

/// Delete the file or directory at `path` if it exists.
pub fn remove_path(path: &Path) -> PipelineResult<()> {
    match classify(path)? {
        None => Ok(()),
        Some(EntryKind::Directory) => remove_tree(path),
        Some(EntryKind::File) => unlink(path),
        Some(EntryKind::Symlink) => unlink_symlink(path),
    }
}

/// Delete `path` only if it is a regular file (or a link). Returns whether anything was removed.
pub fn remove_file(path: &Path) -> PipelineResult<bool> {
    match classify(path)? {
        Some(EntryKind::File) => unlink(path).map(|_| true),
        Some(EntryKind::Symlink) => unlink_symlink(path).map(|_| true),
        Some(EntryKind::Directory) | None => Ok(false),
    }
}

/// Delete `path` and its contents only if it is a directory. Returns whether anything was removed.
pub fn remove_dir(path: &Path) -> PipelineResult<bool> {
    match classify(path)? {
        Some(EntryKind::Directory) => remove_tree(path).map(|_| true),
        _ => Ok(false),
    }
}

/// Clean every target in order, stopping at the first failure.
pub fn clean(root: &Path, targets: &[CleanTarget]) -> PipelineResult<CleanReport> {
    let mut report = CleanReport::default();

    for target in targets {
        let path = root.join(&target.path);
        let removed = match target.kind {
            PathKind::File => remove_file(&path)?,
            PathKind::Directory => remove_dir(&path)?,
        };

        if removed {
            debug!(path = %path.display(), "removed");
            report.removed.push(path);
        } else if path.symlink_metadata().is_ok() {
            warn!(
                path = %path.display(),
                expected = ?target.kind,
                "clean target has unexpected kind, leaving it in place"
            );
            report.skipped.push(path);
        } else {
            report.missing.push(path);
        }
    }

    Ok(report)
}

fn unlink(path: &Path) -> PipelineResult<()> {
    fs::remove_file(path).map_err(|e| PipelineError::io(path, e))
}

/// Remove a link itself, never its target
#[cfg(windows)]
fn unlink_symlink(path: &Path) -> PipelineResult<()> {
    // Directory links are removed like directories
    if fs::metadata(path).map(|m| m.is_dir()).unwrap_or(false) {
        return fs::remove_dir(path).map_err(|e| PipelineError::io(path, e));
    }
    unlink(path)
}

#[cfg(not(windows))]
fn unlink_symlink(path: &Path) -> PipelineResult<()> {
    unlink(path)
}

fn remove_entry(path: &Path, kind: EntryKind) -> PipelineResult<()> {
    match kind {
        EntryKind::File => unlink(path),
        EntryKind::Symlink => unlink_symlink(path),
        EntryKind::Directory => fs::remove_dir(path).map_err(|e| PipelineError::io(path, e)),
    }
}

fn sorted_children(dir: &Path) -> PipelineResult<Vec<PathBuf>> {
    let mut children = fs::read_dir(dir)
        .map_err(|e| PipelineError::io(dir, e))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<io::Result<Vec<_>>>()
        .map_err(|e| PipelineError::io(dir, e))?;
    children.sort();
    Ok(children)
}

fn remove_tree(root: &Path) -> PipelineResult<()> {
    walk_tree(root, remove_entry)
}

enum Frame {
    Enter(PathBuf),
    /// All children are gone; the directory itself is next
    Leave(PathBuf),
}

/// Depth-first post-order walk with an explicit stack. Children are visited
/// in file-name order and each subdirectory is finished before its next
/// sibling, so a failure leaves every later name untouched.
fn walk_tree(
    root: &Path,
    mut remove: impl FnMut(&Path, EntryKind) -> PipelineResult<()>,
) -> PipelineResult<()> {
    let mut stack = vec![Frame::Enter(root.to_path_buf())];

    while let Some(frame) = stack.pop() {
        match frame {
            Frame::Leave(dir) => remove(&dir, EntryKind::Directory)?,
            Frame::Enter(path) => match classify(&path)? {
                None => {}
                Some(EntryKind::Directory) => {
                    let children = sorted_children(&path)?;
                    stack.push(Frame::Leave(path));
                    // Reversed so the first name is popped first
                    stack.extend(children.into_iter().rev().map(Frame::Enter));
                }
                Some(kind) => remove(&path, kind)?,
            },
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_tree(root: &Path) {
        fs::create_dir_all(root.join("a/b/c")).unwrap();
        fs::create_dir_all(root.join("empty")).unwrap();
        fs::write(root.join("top.txt"), "top").unwrap();
        fs::write(root.join("a/one.js"), "1").unwrap();
        fs::write(root.join("a/b/two.js"), "2").unwrap();
        fs::write(root.join("a/b/c/three.js.map"), "3").unwrap();
    }

    #[test]
    fn test_remove_path_on_missing_path_is_noop() {
        let temp_dir = tempfile::tempdir().unwrap();
        let missing = temp_dir.path().join("does/not/exist");

        remove_path(&missing).expect("missing paths should be ignored");
        assert!(!missing.exists());
    }

    #[test]
    fn test_remove_path_deletes_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file = temp_dir.path().join("listings.json");
        fs::write(&file, "{}").unwrap();

        remove_path(&file).unwrap();
        assert!(!file.exists());
    }

    #[test]
    fn test_remove_path_deletes_whole_tree() {
        let temp_dir = tempfile::tempdir().unwrap();
        let tree = temp_dir.path().join("build");
        build_tree(&tree);

        remove_path(&tree).unwrap();

        assert!(!tree.exists(), "tree root should be gone");
        assert!(temp_dir.path().exists(), "parent must be untouched");
    }

    #[test]
    fn test_remove_path_twice_is_idempotent() {
        let temp_dir = tempfile::tempdir().unwrap();
        let tree = temp_dir.path().join("build");
        build_tree(&tree);

        remove_path(&tree).unwrap();
        remove_path(&tree).expect("second removal should be a no-op");
        assert!(!tree.exists());
    }

    #[test]
    fn test_kind_checked_removal_leaves_mismatches() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dir = temp_dir.path().join("fixtures");
        let file = temp_dir.path().join("listings.json");
        fs::create_dir(&dir).unwrap();
        fs::write(&file, "[]").unwrap();

        assert!(!remove_file(&dir).unwrap());
        assert!(!remove_dir(&file).unwrap());
        assert!(dir.exists() && file.exists());

        assert!(remove_dir(&dir).unwrap());
        assert!(remove_file(&file).unwrap());
        assert!(!dir.exists() && !file.exists());
    }

    #[test]
    fn test_clean_reports_each_target() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        build_tree(&root.join("build/dev"));
        fs::write(root.join("listings.json"), "{}").unwrap();
        fs::create_dir(root.join("not_a_file")).unwrap();

        let targets = vec![
            CleanTarget::file("listings.json"),
            CleanTarget::directory("build/dev"),
            CleanTarget::directory("build/release"),
            CleanTarget::file("not_a_file"),
        ];

        let report = clean(root, &targets).unwrap();

        assert_eq!(
            report.removed,
            vec![root.join("listings.json"), root.join("build/dev")]
        );
        assert_eq!(report.missing, vec![root.join("build/release")]);
        assert_eq!(report.skipped, vec![root.join("not_a_file")]);
        assert!(root.join("not_a_file").exists());

        let second = clean(root, &targets).unwrap();
        assert!(second.removed.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_are_unlinked_not_followed() {
        let temp_dir = tempfile::tempdir().unwrap();
        let outside = temp_dir.path().join("outside");
        fs::create_dir(&outside).unwrap();
        fs::write(outside.join("keep.txt"), "keep").unwrap();

        let tree = temp_dir.path().join("tree");
        fs::create_dir(&tree).unwrap();
        std::os::unix::fs::symlink(&outside, tree.join("link")).unwrap();
        // A link back to its own parent would loop forever if followed
        std::os::unix::fs::symlink(&tree, tree.join("loop")).unwrap();

        remove_path(&tree).unwrap();

        assert!(!tree.exists());
        assert!(outside.join("keep.txt").exists());
    }

    fn relative(root: &Path, path: &Path) -> String {
        path.strip_prefix(root).unwrap().display().to_string()
    }

    #[test]
    fn test_walk_finishes_each_child_in_name_order() {
        let temp_dir = tempfile::tempdir().unwrap();
        let tree = temp_dir.path().join("tree");
        fs::create_dir_all(tree.join("a/inner")).unwrap();
        fs::create_dir_all(tree.join("c")).unwrap();
        fs::write(tree.join("a/inner/two.txt"), "2").unwrap();
        fs::write(tree.join("a/one.txt"), "1").unwrap();
        fs::write(tree.join("b.txt"), "b").unwrap();

        let mut order = Vec::new();
        walk_tree(&tree, |path, kind| {
            order.push(relative(temp_dir.path(), path));
            remove_entry(path, kind)
        })
        .unwrap();

        assert_eq!(
            order,
            vec![
                "tree/a/inner/two.txt",
                "tree/a/inner",
                "tree/a/one.txt",
                "tree/a",
                "tree/b.txt",
                "tree/c",
                "tree",
            ]
        );
        assert!(!tree.exists());
    }

    #[test]
    fn test_failure_stops_before_later_names_with_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        let tree = temp_dir.path().join("tree");
        fs::create_dir_all(tree.join("a")).unwrap();
        fs::write(tree.join("a/locked"), "x").unwrap();
        fs::write(tree.join("a/next.txt"), "x").unwrap();
        fs::write(tree.join("b.txt"), "b").unwrap();

        let locked = tree.join("a/locked");
        // rmdir on a regular file fails for every user, root included
        let err = walk_tree(&tree, |path, kind| {
            if path == locked {
                remove_entry(path, EntryKind::Directory)
            } else {
                remove_entry(path, kind)
            }
        })
        .expect_err("removing a file as a directory should fail");

        match err {
            PipelineError::Io { path, .. } => assert_eq!(path, locked),
            other => panic!("unexpected error: {other}"),
        }
        assert!(locked.exists());
        assert!(tree.join("a/next.txt").exists(), "later sibling was reached");
        assert!(tree.join("b.txt").exists(), "later subtree sibling was reached");
    }

    #[cfg(unix)]
    #[test]
    fn test_remove_path_reports_io_error_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file = temp_dir.path().join("listings.json");
        fs::write(&file, "{}").unwrap();

        // A path below a regular file cannot be inspected
        let below = file.join("nested");
        let err = remove_path(&below).expect_err("lookup through a file should fail");

        match err {
            PipelineError::Io { path, .. } => assert_eq!(path, below),
            other => panic!("unexpected error: {other}"),
        }
        assert!(file.exists());
    }
}
