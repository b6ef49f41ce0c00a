use std::path::Path;

use pretty_assertions::assert_eq;
use rescomp_preprocess::{InterpreterTable, Registry};
use rescomp_tree::{NodeIndex, ResourceTree, TreeError, Walker};
use tempfile::TempDir;

// ── Helpers ──────────────────────────────────────────────────────────

/// `a.json` + `b/c.txt`, the canonical two-level scenario.
fn scenario_tree() -> TempDir {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("a.json"), br#"{ "x": 1 }"#).unwrap();
    std::fs::create_dir(tmp.path().join("b")).unwrap();
    std::fs::write(tmp.path().join("b/c.txt"), b"hi").unwrap();
    tmp
}

fn paths(tree: &ResourceTree) -> Vec<&str> {
    tree.iter().map(|n| n.path.as_str()).collect()
}

fn registry_from(scripts: &[(&str, &str)]) -> (TempDir, Registry) {
    let tmp = TempDir::new().unwrap();
    for (name, body) in scripts {
        std::fs::write(tmp.path().join(name), format!("#!/bin/sh\n{body}\n")).unwrap();
    }
    let registry = Registry::load(tmp.path(), &InterpreterTable::builtin()).unwrap();
    (tmp, registry)
}

// ══════════════════════════════════════════════════════════════════════
// Ordering and structure
// ══════════════════════════════════════════════════════════════════════

#[test]
fn test_scenario_emission_order() {
    let root = scenario_tree();
    let tree = ResourceTree::build(root.path(), &Registry::empty()).unwrap();

    assert_eq!(paths(&tree), vec!["a.json", "b/c.txt", "b", "/"]);

    let b = tree.lookup("b").unwrap();
    assert_eq!(b.children(), &[NodeIndex(1)]);
    assert_eq!(b.basename(), "b");

    let root_node = tree.root();
    assert_eq!(root_node.index, NodeIndex(3));
    assert_eq!(root_node.children(), &[NodeIndex(0), NodeIndex(2)]);

    assert_eq!(tree.get(NodeIndex(0)).unwrap().payload(), Some(&br#"{ "x": 1 }"#[..]));
    assert_eq!(tree.get(NodeIndex(1)).unwrap().payload(), Some(&b"hi"[..]));
}

#[test]
fn test_children_precede_parents() {
    let tmp = TempDir::new().unwrap();
    for dir in ["z", "z/y", "m", "m/n/o", "a"] {
        std::fs::create_dir_all(tmp.path().join(dir)).unwrap();
    }
    for file in ["z/1", "z/y/2", "m/n/o/3", "m/4", "5", "a/6"] {
        std::fs::write(tmp.path().join(file), file).unwrap();
    }

    let tree = ResourceTree::build(tmp.path(), &Registry::empty()).unwrap();
    for node in &tree {
        for child in node.children() {
            assert!(child < &node.index, "{} -> {}", node.path, child);
        }
        let child_paths: Vec<&str> = tree.children(node).map(|c| c.path.as_str()).collect();
        let mut sorted = child_paths.clone();
        sorted.sort();
        assert_eq!(child_paths, sorted);
    }
    assert_eq!(tree.len(), 13);
    assert_eq!(tree.lookup("m/n/o/3").unwrap().basename(), "3");
}

#[test]
fn test_root_normalized_regardless_of_input_name() {
    let root = scenario_tree();
    let tree = ResourceTree::build(root.path(), &Registry::empty()).unwrap();
    assert_eq!(tree.root().path, "/");
    assert_eq!(tree.root().basename(), "/");

    let nested = root.path().join("b");
    let tree = ResourceTree::build(&nested, &Registry::empty()).unwrap();
    assert_eq!(paths(&tree), vec!["c.txt", "/"]);
    assert_eq!(tree.root().basename(), "/");
}

#[test]
fn test_empty_dir_and_empty_file() {
    let tmp = TempDir::new().unwrap();
    std::fs::create_dir(tmp.path().join("empty")).unwrap();
    std::fs::write(tmp.path().join("zero.bin"), b"").unwrap();

    let tree = ResourceTree::build(tmp.path(), &Registry::empty()).unwrap();
    let empty = tree.lookup("empty").unwrap();
    assert!(empty.is_dir());
    assert_eq!(empty.size(), 0);

    let zero = tree.lookup("zero.bin").unwrap();
    assert_eq!(zero.size(), 0);
    assert_eq!(zero.payload(), Some(&b""[..]));
}

#[test]
fn test_deep_tree_does_not_recurse() {
    let tmp = TempDir::new().unwrap();
    let mut dir = tmp.path().to_path_buf();
    for _ in 0..200 {
        dir.push("d");
    }
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("leaf"), b"x").unwrap();

    let tree = ResourceTree::build(tmp.path(), &Registry::empty()).unwrap();
    assert_eq!(tree.len(), 202);
    assert_eq!(tree.get(NodeIndex(0)).unwrap().basename(), "leaf");
}

#[test]
fn test_walker_is_lazy_and_fused() {
    let root = scenario_tree();
    let registry = Registry::empty();
    let mut walker = Walker::new(root.path(), &registry).unwrap();

    let first = walker.next().unwrap().unwrap();
    assert_eq!(first.path, "a.json");
    assert_eq!(walker.by_ref().count(), 3);
    assert!(walker.next().is_none());
}

// ══════════════════════════════════════════════════════════════════════
// Failures
// ══════════════════════════════════════════════════════════════════════

#[test]
fn test_missing_root() {
    let err = ResourceTree::build(Path::new("/nonexistent/assets"), &Registry::empty()).unwrap_err();
    assert!(matches!(err, TreeError::RootNotFound { .. }));
}

// ══════════════════════════════════════════════════════════════════════
// Preprocessing (needs /bin/sh)
// ══════════════════════════════════════════════════════════════════════

#[cfg(unix)]
mod unix {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_registered_extension_is_transformed() {
        let root = scenario_tree();
        let (_rc, registry) = registry_from(&[("json_squash.sh", "tr -d ' '")]);

        let tree = ResourceTree::build(root.path(), &registry).unwrap();
        assert_eq!(tree.lookup("a.json").unwrap().payload(), Some(&br#"{"x":1}"#[..]));
        assert_eq!(tree.lookup("b/c.txt").unwrap().payload(), Some(&b"hi"[..]));
    }

    #[test]
    fn test_failing_preprocessor_aborts_walk() {
        let root = scenario_tree();
        let (_rc, registry) = registry_from(&[("json_broken.sh", "exit 1")]);

        let err = ResourceTree::build(root.path(), &registry).unwrap_err();
        match err {
            TreeError::Preprocess { path, .. } => assert_eq!(path, "a.json"),
            e => panic!("Expected Preprocess, got: {:?}", e),
        }

        let mut walker = Walker::new(root.path(), &registry).unwrap();
        assert!(walker.next().unwrap().is_err());
        assert!(walker.next().is_none());
    }

    #[test]
    fn test_symlinks_are_skipped() {
        let root = scenario_tree();
        std::os::unix::fs::symlink(root.path().join("a.json"), root.path().join("link.json")).unwrap();
        std::os::unix::fs::symlink(root.path().join("b"), root.path().join("link_dir")).unwrap();

        let tree = ResourceTree::build(root.path(), &Registry::empty()).unwrap();
        assert_eq!(paths(&tree), vec!["a.json", "b/c.txt", "b", "/"]);
        assert_eq!(tree.skipped().len(), 2);
        assert!(tree.skipped().iter().all(|s| s.kind == "symbolic link"));
    }

    // Some Unix filesystems (APFS) refuse non-UTF-8 names outright.
    #[cfg(target_os = "linux")]
    #[test]
    fn test_non_utf8_name_is_invalid_path() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let root = scenario_tree();
        std::fs::create_dir(root.path().join("nu")).unwrap();
        let bad = root.path().join("nu").join(OsStr::from_bytes(b"bad\xff"));
        std::fs::write(&bad, b"x").unwrap();

        let registry = Registry::empty();
        let err = ResourceTree::build(root.path(), &registry).unwrap_err();
        match err {
            TreeError::InvalidPath(path) => assert_eq!(path, bad),
            e => panic!("Expected InvalidPath, got: {:?}", e),
        }

        let mut walker = Walker::new(root.path(), &registry).unwrap();
        let results: Vec<_> = walker.by_ref().collect();
        assert!(matches!(results.last(), Some(Err(TreeError::InvalidPath(_)))));
        assert!(walker.next().is_none());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let tmp = TempDir::new().unwrap();
        for d in 0..5 {
            let dir = tmp.path().join(format!("dir{d}"));
            std::fs::create_dir(&dir).unwrap();
            for f in 0..8 {
                std::fs::write(dir.join(format!("f{f}.txt")), format!("file {d} {f}")).unwrap();
            }
        }
        let (_rc, registry) = registry_from(&[("txt_upper.sh", "tr 'a-z' 'A-Z'")]);

        let sequential = ResourceTree::build(tmp.path(), &registry).unwrap();
        let parallel = ResourceTree::build_parallel(tmp.path(), &registry, 4).unwrap();

        assert_eq!(sequential.nodes(), parallel.nodes());
        assert_eq!(parallel.lookup("dir3/f7.txt").unwrap().payload(), Some(&b"FILE 3 7"[..]));
    }

    #[test]
    fn test_parallel_failure_reports_error() {
        let root = scenario_tree();
        let (_rc, registry) = registry_from(&[("txt_broken.sh", "exit 2")]);

        let err = ResourceTree::build_parallel(root.path(), &registry, 2).unwrap_err();
        assert!(matches!(err, TreeError::Preprocess { .. }));
    }
}
