//! Containment checks for every path the engine reads or writes.
//!
//! A candidate is resolved to its canonical absolute form (symlinks followed,
//! `..` collapsed) and must sit inside the canonical form of its allowed root.
//! Paths that do not exist yet are resolved one component at a time, so
//! output files can be checked before they are created.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::error::StockSenseError;

const MAX_SYMLINK_HOPS: usize = 40;

/// Resolve `candidate` and require it to lie within `allowed_root`.
///
/// Relative paths are taken from the current working directory. Containment
/// is checked per path component, so `output_backup/x` is not inside
/// `output`. The returned path is the one to hand to the actual I/O call.
pub fn resolve(candidate: &Path, allowed_root: &Path) -> Result<PathBuf, StockSenseError> {
    let root = canonicalize_lenient(allowed_root)?;
    let resolved = canonicalize_lenient(candidate)?;

    if resolved.starts_with(&root) {
        Ok(resolved)
    } else {
        tracing::error!(
            path = %candidate.display(),
            root = %root.display(),
            "path traversal attempt blocked"
        );
        Err(StockSenseError::PathTraversal {
            path: candidate.to_path_buf(),
            root,
        })
    }
}

/// Canonicalize a path that may not exist yet.
///
/// Components are applied one at a time. After each pushed name the path
/// goes back through the filesystem, so a symlink is followed wherever it
/// appears, including after a `..` that follows a missing directory. Names
/// that do not exist are kept as written.
fn canonicalize_lenient(path: &Path) -> Result<PathBuf, StockSenseError> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    let mut hops = 0;
    walk(&absolute, &mut hops).map_err(StockSenseError::Io)
}

fn walk(path: &Path, hops: &mut usize) -> io::Result<PathBuf> {
    let mut resolved = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => resolved.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            Component::Normal(name) => {
                resolved.push(name);
                resolved = follow(resolved, hops)?;
            }
        }
    }
    Ok(resolved)
}

/// Canonical form of `path` if it exists. A dangling symlink is resolved
/// through its target; anything else missing is returned unchanged.
fn follow(path: PathBuf, hops: &mut usize) -> io::Result<PathBuf> {
    match path.canonicalize() {
        Ok(canonical) => Ok(canonical),
        Err(e) if is_missing(&e) => match fs::symlink_metadata(&path) {
            Ok(meta) if meta.file_type().is_symlink() => {
                *hops += 1;
                if *hops > MAX_SYMLINK_HOPS {
                    return Err(io::Error::other("too many levels of symbolic links"));
                }
                let target = fs::read_link(&path)?;
                let parent = path.parent().map(Path::to_path_buf).unwrap_or_default();
                walk(&parent.join(target), hops)
            }
            _ => Ok(path),
        },
        Err(e) => Err(e),
    }
}

// A regular file used as a directory mid-path reports NotADirectory.
fn is_missing(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_escape_rejected() {
        let err = resolve(Path::new("../secret.csv"), Path::new("data")).unwrap_err();
        assert!(matches!(err, StockSenseError::PathTraversal { .. }));
    }

    #[test]
    fn test_inner_escape_rejected() {
        let err = resolve(Path::new("data/../secret.txt"), Path::new("data")).unwrap_err();
        assert!(matches!(err, StockSenseError::PathTraversal { .. }));
    }

    #[test]
    fn test_path_inside_root_accepted() {
        let resolved = resolve(Path::new("data/x.csv"), Path::new("data")).unwrap();
        let cwd = std::env::current_dir().unwrap().canonicalize().unwrap();
        assert_eq!(resolved, cwd.join("data").join("x.csv"));
    }

    #[test]
    fn test_sibling_with_shared_prefix_rejected() {
        let err = resolve(Path::new("output_backup/x"), Path::new("output")).unwrap_err();
        assert!(matches!(err, StockSenseError::PathTraversal { .. }));
    }

    #[test]
    fn test_absolute_outside_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("data");
        fs::create_dir(&root).unwrap();
        let outside = dir.path().join("outside.txt");
        assert!(resolve(&outside, &root).is_err());
    }

    #[test]
    fn test_nested_missing_dirs_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("output");
        fs::create_dir(&root).unwrap();
        let candidate = root.join("reports/2024/../today.json");
        let resolved = resolve(&candidate, &root).unwrap();
        assert_eq!(
            resolved,
            root.canonicalize().unwrap().join("reports").join("today.json")
        );
    }

    #[test]
    fn test_missing_dir_then_parent_escape_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("output");
        fs::create_dir(&root).unwrap();
        let candidate = root.join("nope/../../escape.json");
        assert!(resolve(&candidate, &root).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_escape_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("data");
        let secret_dir = dir.path().join("secret");
        fs::create_dir(&root).unwrap();
        fs::create_dir(&secret_dir).unwrap();
        fs::write(secret_dir.join("inventory.csv"), "name\n").unwrap();
        std::os::unix::fs::symlink(&secret_dir, root.join("link")).unwrap();

        let err = resolve(&root.join("link/inventory.csv"), &root).unwrap_err();
        assert!(matches!(err, StockSenseError::PathTraversal { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_after_missing_dir_and_parent_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("data");
        let secret_dir = dir.path().join("secret");
        fs::create_dir(&root).unwrap();
        fs::create_dir(&secret_dir).unwrap();
        fs::write(secret_dir.join("inventory.csv"), "TOP SECRET\n").unwrap();
        std::os::unix::fs::symlink("../secret", root.join("link")).unwrap();

        let candidate = root.join("missing/../link/inventory.csv");
        let err = resolve(&candidate, &root).unwrap_err();
        assert!(matches!(err, StockSenseError::PathTraversal { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_out_of_root_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("output");
        fs::create_dir(&root).unwrap();
        std::os::unix::fs::symlink(dir.path().join("planted.json"), root.join("report.json"))
            .unwrap();

        let err = resolve(&root.join("report.json"), &root).unwrap_err();
        assert!(matches!(err, StockSenseError::PathTraversal { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_inside_root_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("data");
        fs::create_dir_all(root.join("2024")).unwrap();
        std::os::unix::fs::symlink("2024", root.join("current")).unwrap();

        let resolved = resolve(&root.join("gone/../current/stock.csv"), &root).unwrap();
        assert_eq!(
            resolved,
            root.canonicalize().unwrap().join("2024").join("stock.csv")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_loop_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("data");
        fs::create_dir(&root).unwrap();
        std::os::unix::fs::symlink("b", root.join("a")).unwrap();
        std::os::unix::fs::symlink("a", root.join("b")).unwrap();

        assert!(resolve(&root.join("a"), &root).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_root_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let real = dir.path().join("real");
        fs::create_dir(&real).unwrap();
        let alias = dir.path().join("alias");
        std::os::unix::fs::symlink(&real, &alias).unwrap();

        let resolved = resolve(&alias.join("a.csv"), &alias).unwrap();
        assert_eq!(resolved, real.canonicalize().unwrap().join("a.csv"));
    }
}
