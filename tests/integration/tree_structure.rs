//! Integration tests for tree structure and lookup

use super::test_utils::{nested_fixture, write, FULL_PATH};
use ftree::{BuildConfig, DirNode, EntryKind, Tree, TreeBuilder, TreeError};
use std::collections::BTreeSet;
use std::fs;
use tempfile::TempDir;
use walkdir::WalkDir;

/// Test that the deep fixture can be found by its full path
#[test]
fn test_find_deep_directory_and_file() {
    let temp_dir = nested_fixture();
    let tree = Tree::build(temp_dir.path()).unwrap();

    let deepest = tree.find(FULL_PATH).unwrap();
    assert_eq!(deepest.path().relative(), FULL_PATH);
    assert_eq!(deepest.path().name(), "dir10");

    let file = tree
        .find_file(&format!("{}/test2.json", FULL_PATH))
        .unwrap();
    assert_eq!(file.extension(), ".json");
    assert_eq!(file.name(), "test2.json");
    assert_eq!(file.dir_name(), "dir10");
}

/// Test that the root carries "." and the resolved absolute path
#[test]
fn test_root_path_info() {
    let temp_dir = nested_fixture();
    let tree = Tree::build(temp_dir.path()).unwrap();

    let expected = dunce::canonicalize(temp_dir.path()).unwrap();
    assert_eq!(tree.root().path().relative(), ".");
    assert_eq!(tree.root().path().absolute(), expected.as_path());
}

/// Test lookup of a single nested JSON file
#[test]
fn test_find_and_find_file_scenario() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), "a/b.json", r#"{"hello":1}"#);

    let tree = Tree::build(temp_dir.path()).unwrap();

    let a = tree.find("a").unwrap();
    assert!(!a.entries().is_empty());
    let entry = tree.find_file("a/b.json").unwrap();
    assert_eq!(entry.extension(), ".json");
    assert_eq!(entry.kind(), EntryKind::File);
}

/// Test lookup misses
#[test]
fn test_find_file_misses() {
    let temp_dir = nested_fixture();
    let tree = Tree::build(temp_dir.path()).unwrap();

    assert!(tree.find("dir1/nope").is_none());
    assert!(tree.find_file("nope/test.json").is_none());
    assert!(tree.find_file("dir1/missing.json").is_none());
    assert!(tree.find_file("").is_none());
}

/// Test that every directory child also appears as an entry
#[test]
fn test_children_are_also_entries() {
    let temp_dir = nested_fixture();
    let tree = Tree::build(temp_dir.path()).unwrap();

    tree.traverse(|dir: &DirNode| {
        for name in dir.children().keys() {
            let entry = dir.entry(name).unwrap();
            assert!(entry.is_dir());
        }
    });
}

/// Test that the tree mirrors every path walkdir sees
#[test]
fn test_tree_mirrors_filesystem() {
    let temp_dir = nested_fixture();
    write(temp_dir.path(), "side/x.md", "# x");
    fs::create_dir(temp_dir.path().join("empty")).unwrap();

    let tree = Tree::build(temp_dir.path()).unwrap();

    let expected: BTreeSet<String> = WalkDir::new(temp_dir.path())
        .min_depth(1)
        .into_iter()
        .map(|e| {
            let e = e.unwrap();
            e.path()
                .strip_prefix(temp_dir.path())
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect();

    let mut actual = BTreeSet::new();
    tree.traverse(|dir| {
        for entry in dir.entries().values() {
            actual.insert(entry.relative().to_string());
        }
    });

    assert_eq!(actual, expected);
    assert!(tree.find("empty").unwrap().entries().is_empty());
}

/// Test that traversal visits each directory exactly once, parents first
#[test]
fn test_traverse_pre_order() {
    let temp_dir = nested_fixture();
    let tree = Tree::build(temp_dir.path()).unwrap();

    let mut order = Vec::new();
    tree.traverse(|dir| order.push(dir.path().relative().to_string()));

    assert_eq!(order.len(), 11);
    assert_eq!(order[0], ".");
    for (i, rel) in order.iter().enumerate().skip(1) {
        let parent = match rel.rfind('/') {
            Some(idx) => &rel[..idx],
            None => ".",
        };
        let parent_pos = order.iter().position(|r| r == parent).unwrap();
        assert!(parent_pos < i, "{} visited before its parent", rel);
    }
}

/// Test that an unreadable subdirectory is skipped but still recorded
#[cfg(unix)]
#[test]
fn test_unreadable_subdirectory_is_skipped() {
    use std::os::unix::fs::PermissionsExt;

    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "locked/secret.json", "{}");
    write(root, "open/a.json", "{}");
    write(root, "open/deeper/b.json", "{}");

    let locked = root.join("locked");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Privileged users can still list the directory. The long-path test below
    // covers nested listing failures regardless of privilege.
    if fs::read_dir(&locked).is_ok() {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        eprintln!("skipping test_unreadable_subdirectory_is_skipped: mode 000 is still listable");
        return;
    }

    let tree = Tree::build(root);
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
    let tree = tree.unwrap();

    assert!(tree.root().child("locked").is_none());
    assert!(tree.root().entry("locked").unwrap().is_dir());
    assert!(tree.find_file("open/a.json").is_some());
    assert!(tree.find_file("open/deeper/b.json").is_some());
}

/// Test that a subdirectory whose absolute path is too long to list is skipped
/// but still recorded, while the rest of the tree is built
#[cfg(target_os = "linux")]
#[test]
fn test_overlong_subdirectory_is_skipped() {
    const LEVELS: usize = 24;

    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "open/a.json", "{}");

    let mut dir = root.join("deep");
    for _ in 0..LEVELS {
        dir = dir.join("d");
    }
    fs::create_dir_all(&dir).unwrap();

    // Lengthen names bottom-up so each rename only touches short paths while
    // the deepest absolute paths end up past PATH_MAX.
    let long = "d".repeat(200);
    for level in (1..=LEVELS).rev() {
        let mut parent = root.join("deep");
        for _ in 1..level {
            parent = parent.join("d");
        }
        fs::rename(parent.join("d"), parent.join(&long)).unwrap();
    }

    let tree = Tree::build(root).unwrap();

    let mut node = tree.find("deep").unwrap();
    let mut depth = 0;
    while let Some(child) = node.child(&long) {
        node = child;
        depth += 1;
    }

    assert!(depth > 0 && depth < LEVELS, "reached depth {}", depth);
    assert!(node.entry(&long).unwrap().is_dir());
    assert!(tree.find_file("open/a.json").is_some());
}

/// Test that names which are not valid UTF-8 are left out instead of being
/// mangled into paths that do not exist
#[cfg(target_os = "linux")]
#[test]
fn test_non_utf8_names_are_skipped() {
    use super::test_utils::JsonKeys;
    use ftree::Walker;
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;
    use std::sync::Arc;

    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let bad_dir = root.join(OsStr::from_bytes(b"bad\xffdir"));
    fs::create_dir(&bad_dir).unwrap();
    fs::write(bad_dir.join("x.json"), "{}").unwrap();
    fs::write(root.join(OsStr::from_bytes(b"f\xfe.json")), "{}").unwrap();
    fs::write(root.join(OsStr::from_bytes(b"f\xfd.json")), "{}").unwrap();
    write(root, "good/y.json", r#"{"test":1}"#);

    let tree = Tree::build(root).unwrap();

    let names: Vec<&String> = tree.root().entries().keys().collect();
    assert_eq!(names, vec!["good"]);
    assert_eq!(tree.root().children().len(), 1);
    tree.traverse(|dir| {
        for entry in dir.entries().values() {
            assert!(entry.absolute().exists(), "{:?} does not exist", entry.absolute());
        }
    });

    let mut json = JsonKeys::default();
    let report = {
        let mut walker = Walker::new(Arc::new(tree));
        walker.add_visitor(&mut json);
        walker.walk()
    };
    assert!(report.is_clean(), "unexpected failures: {:?}", report);
    assert_eq!(json.visited, vec!["good/y.json"]);
}

/// Test that symlinks are recorded but never followed
#[cfg(unix)]
#[test]
fn test_symlinked_directory_not_followed() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "real/a.json", "{}");
    std::os::unix::fs::symlink(root.join("real"), root.join("link")).unwrap();

    let tree = Tree::build(root).unwrap();

    assert_eq!(tree.root().entry("link").unwrap().kind(), EntryKind::Symlink);
    assert!(tree.find("link").is_none());
    assert!(tree.find("real").is_some());
}

/// Test that a missing root is a fatal build error
#[test]
fn test_missing_root_is_fatal() {
    let temp_dir = TempDir::new().unwrap();
    let result = Tree::build(temp_dir.path().join("absent"));
    assert!(matches!(result, Err(TreeError::RootUnresolved { .. })));
}

/// Test building with an ignore list
#[test]
fn test_builder_with_ignore_names() {
    let temp_dir = nested_fixture();
    let config = BuildConfig {
        ignore_names: vec!["dir5".to_string()],
        max_depth: None,
    };

    let tree = TreeBuilder::new(temp_dir.path().to_path_buf())
        .with_config(config)
        .build()
        .unwrap();

    assert!(tree.find("dir1/dir2/dir3/dir4").is_some());
    assert!(tree.find("dir1/dir2/dir3/dir4/dir5").is_none());
    assert!(tree.find_file("dir1/dir2/dir3/dir4/dir5").is_none());
}
