//! Package discovery — enumerate buildable schema packages under import roots.
//!
//! Walks every import root depth-first with lexicographically sorted entries,
//! so discovery order (and everything ordered downstream of it, descriptor-set
//! iteration included) is deterministic across runs. A directory becomes a
//! package when it directly holds at least one `.proto` file; directories with
//! none are never part of the working set. `vendor` directories and
//! dot-directories are not descended into.

use super::types::ProtoPackage;
use std::path::{Path, PathBuf};

/// Discover packages under the given roots, in root order then walk order.
///
/// `filters` restricts the result to packages whose import path is at or under
/// one of the given relative paths; an empty list means no restriction.
pub fn discover(roots: &[PathBuf], filters: &[String]) -> Result<Vec<ProtoPackage>, String> {
    let mut packages = Vec::new();
    for root in roots {
        if !root.is_dir() {
            return Err(format!("import root {} is not a directory", root.display()));
        }
        walk(root, root, filters, &mut packages)?;
    }
    Ok(packages)
}

fn walk(
    root: &Path,
    dir: &Path,
    filters: &[String],
    out: &mut Vec<ProtoPackage>,
) -> Result<(), String> {
    let import_path = relative_import_path(root, dir)?;

    if matches_filters(filters, &import_path) {
        let files = proto_files(dir)?;
        if !files.is_empty() {
            out.push(ProtoPackage {
                dir: dir.to_path_buf(),
                import_path,
                files,
            });
        }
    }

    let entries = std::fs::read_dir(dir)
        .map_err(|e| format!("cannot read directory {}: {}", dir.display(), e))?;

    let mut subdirs = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| format!("cannot read directory {}: {}", dir.display(), e))?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with('.') || name == super::resolver::VENDOR_DIR {
            continue;
        }
        subdirs.push(path);
    }
    subdirs.sort();

    for subdir in &subdirs {
        walk(root, subdir, filters, out)?;
    }
    Ok(())
}

/// `/`-separated path of `dir` relative to `root`; "." for the root itself.
fn relative_import_path(root: &Path, dir: &Path) -> Result<String, String> {
    let rel = dir
        .strip_prefix(root)
        .map_err(|_| format!("{} is not under {}", dir.display(), root.display()))?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        Ok(".".to_string())
    } else {
        Ok(parts.join("/"))
    }
}

fn matches_filters(filters: &[String], import_path: &str) -> bool {
    if filters.is_empty() {
        return true;
    }
    filters.iter().any(|f| {
        f == "." || import_path == f || import_path.starts_with(&format!("{}/", f))
    })
}

/// The `.proto` files directly in `dir`, sorted.
fn proto_files(dir: &Path) -> Result<Vec<PathBuf>, String> {
    let pattern = dir.join("*.proto");
    let pattern = pattern.to_string_lossy();
    let mut files = Vec::new();
    for entry in
        glob::glob(&pattern).map_err(|e| format!("bad glob pattern {}: {}", pattern, e))?
    {
        let path = entry.map_err(|e| format!("cannot read {}: {}", pattern, e))?;
        files.push(path);
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"syntax = \"proto3\";").unwrap();
    }

    fn import_paths(packages: &[ProtoPackage]) -> Vec<&str> {
        packages.iter().map(|p| p.import_path.as_str()).collect()
    }

    #[test]
    fn test_discovery_sorted_and_recursive() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("zeta/z.proto"));
        touch(&root.join("alpha/a.proto"));
        touch(&root.join("alpha/nested/n.proto"));

        let packages = discover(&[root.to_path_buf()], &[]).unwrap();
        assert_eq!(import_paths(&packages), vec!["alpha", "alpha/nested", "zeta"]);
    }

    #[test]
    fn test_directories_without_protos_excluded() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("pkg/p.proto"));
        std::fs::create_dir_all(root.join("empty")).unwrap();
        std::fs::write(root.join("pkg").join("readme.md"), b"docs").unwrap();
        touch(&root.join("between/deep/d.proto")); // "between" itself has none

        let packages = discover(&[root.to_path_buf()], &[]).unwrap();
        assert_eq!(import_paths(&packages), vec!["between/deep", "pkg"]);
    }

    #[test]
    fn test_root_package_is_dot() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("top.proto"));

        let packages = discover(&[dir.path().to_path_buf()], &[]).unwrap();
        assert_eq!(import_paths(&packages), vec!["."]);
        assert_eq!(packages[0].files.len(), 1);
    }

    #[test]
    fn test_vendor_and_dot_dirs_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("pkg/p.proto"));
        touch(&root.join("vendor/dep/d.proto"));
        touch(&root.join(".git/g.proto"));

        let packages = discover(&[root.to_path_buf()], &[]).unwrap();
        assert_eq!(import_paths(&packages), vec!["pkg"]);
    }

    #[test]
    fn test_files_sorted_within_package() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("pkg/b.proto"));
        touch(&root.join("pkg/a.proto"));

        let packages = discover(&[root.to_path_buf()], &[]).unwrap();
        let names: Vec<_> = packages[0]
            .files
            .iter()
            .map(|f| f.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.proto", "b.proto"]);
    }

    #[test]
    fn test_filters_restrict_to_subtrees() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("api/v1/a.proto"));
        touch(&root.join("api/v2/b.proto"));
        touch(&root.join("internal/i.proto"));

        let packages =
            discover(&[root.to_path_buf()], &["api".to_string()]).unwrap();
        assert_eq!(import_paths(&packages), vec!["api/v1", "api/v2"]);

        let packages =
            discover(&[root.to_path_buf()], &["api/v2".to_string()]).unwrap();
        assert_eq!(import_paths(&packages), vec!["api/v2"]);
    }

    #[test]
    fn test_multiple_roots_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let r1 = dir.path().join("r1");
        let r2 = dir.path().join("r2");
        touch(&r1.join("pkg/a.proto"));
        touch(&r2.join("pkg/b.proto"));

        let packages = discover(&[r1.clone(), r2.clone()], &[]).unwrap();
        assert_eq!(packages.len(), 2);
        assert!(packages[0].dir.starts_with(&r1));
        assert!(packages[1].dir.starts_with(&r2));
    }

    #[test]
    fn test_missing_root_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(discover(&[missing], &[]).is_err());
    }
}
