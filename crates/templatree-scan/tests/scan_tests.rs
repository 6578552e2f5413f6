use std::fs;
use std::path::Path;

use tempfile::TempDir;
use templatree_scan::{
    BlobStore, ContentKind, FilterPolicy, PolicyOverrides, TemplateError, TemplateFile,
    TemplateItem, TemplateScanner, WarningKind, decode, encode, scan_template_directory,
};

fn write(root: &Path, rel: &str, contents: impl AsRef<[u8]>) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

fn scan(root: &Path) -> templatree_scan::TemplateFolder {
    TemplateScanner::new()
        .scan(root, &FilterPolicy::default())
        .unwrap()
}

#[test]
fn test_default_policy_scenario() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "a.txt", "hello");
    write(root, "node_modules/left-pad/index.js", "module.exports = 1");
    write(root, ".env", "SECRET=1");

    let tree = scan(root);

    assert_eq!(
        tree.children,
        vec![TemplateItem::File(TemplateFile::new("a", "txt", "hello"))]
    );
}

#[test]
fn test_leaf_count_matches_regular_files() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let files = [
        "index.html",
        "src/main.ts",
        "src/lib/util.ts",
        "src/lib/deep/more/x.json",
        "public/favicon.svg",
    ];
    for file in files {
        write(root, file, "x");
    }
    fs::create_dir(root.join("empty")).unwrap();

    let tree = scan(root);

    assert_eq!(tree.file_count(), files.len());
    assert!(tree.child("empty").unwrap().is_folder());
}

#[test]
fn test_excluded_names_never_appear() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "package-lock.json", "{}");
    write(root, "src/.DS_Store", "");
    write(root, "src/deep/.env.local", "A=1");
    write(root, "src/deep/.app.ts.swp", "");
    write(root, "src/deep/.#app.ts", "");
    write(root, "src/deep/app.ts~", "");
    write(root, "src/deep/app.ts", "ok");

    let tree = scan(root);
    let names: Vec<String> = tree.walk_files().into_iter().map(|(p, _)| p).collect();

    assert_eq!(names, vec!["src/deep/app.ts"]);
}

#[test]
fn test_excluded_folders_at_any_depth() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "dist/bundle.js", "x");
    write(root, "packages/ui/build/out.js", "x");
    write(root, "packages/ui/.git/HEAD", "ref");
    write(root, "packages/ui/coverage/lcov.info", "x");
    write(root, "packages/ui/src/index.ts", "x");

    let tree = scan(root);

    assert!(tree.child("dist").is_none());
    let ui = tree.find("packages/ui").unwrap().as_folder().unwrap();
    assert_eq!(ui.child_count(), 1);
    assert_eq!(tree.file_count(), 1);
}

#[test]
fn test_oversized_file_placeholder() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "big.bin", vec![b'a'; 2_000_000]);

    let overrides = PolicyOverrides::builder()
        .max_file_bytes(Some(1_048_576u64))
        .build()
        .unwrap();
    let tree = scan_template_directory(root, &overrides).unwrap();

    let big = tree.find("big.bin").unwrap().as_file().unwrap();
    assert_eq!(big.content_kind(), ContentKind::Placeholder);
    assert!(big.content().contains("2000000"));
    assert!(big.content().contains("1048576"));
}

#[test]
fn test_file_at_threshold_is_read() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "exact.txt", "12345");
    write(root, "over.txt", "123456");

    let overrides = PolicyOverrides::builder()
        .max_file_bytes(Some(5u64))
        .build()
        .unwrap();
    let tree = scan_template_directory(root, &overrides).unwrap();

    let exact = tree.find("exact.txt").unwrap().as_file().unwrap();
    let over = tree.find("over.txt").unwrap().as_file().unwrap();
    assert_eq!(exact.content(), "12345");
    assert_eq!(over.content_kind(), ContentKind::Placeholder);
}

#[test]
fn test_fault_isolation() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "one.txt", "1");
    write(root, "two.txt", "2");
    write(root, "three.txt", "3");
    write(root, "logo.png", [0x89, 0x50, 0x4e, 0x47, 0xff, 0xfe, 0x00, 0x80]);

    let report = TemplateScanner::new()
        .scan_report(root, &FilterPolicy::default())
        .unwrap();

    assert_eq!(report.root.child_count(), 4);
    let unavailable: Vec<&TemplateFile> = report
        .root
        .children
        .iter()
        .filter_map(TemplateItem::as_file)
        .filter(|f| f.is_unavailable())
        .collect();
    assert_eq!(unavailable.len(), 1);
    assert_eq!(unavailable[0].name(), "logo");
    assert!(unavailable[0].content().starts_with("Error reading file: "));

    assert_eq!(report.stats.degraded, 1);
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].kind, WarningKind::ReadError);
}

#[test]
fn test_round_trip_of_scanned_tree() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "index.html", "<!doctype html>\n<div id=\"app\"></div>");
    write(root, "src/App.vue", "<template>\n  <h1>{{ msg }}</h1>\n</template>\n");
    write(root, "src/assets/logo.svg", "<svg/>");
    write(root, "README", "unicode: héllo ✓");

    let tree = scan(root);

    assert_eq!(decode(&encode(&tree).unwrap()).unwrap(), tree);
}

#[test]
fn test_round_trip_of_deeply_nested_tree() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let rel = format!("{}leaf.txt", "d/".repeat(100));
    write(root, &rel, "bottom");

    let tree = scan(root);
    let files = tree.walk_files();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].0, rel);

    assert_eq!(decode(&encode(&tree).unwrap()).unwrap(), tree);
}

#[test]
fn test_scan_is_idempotent() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    for i in 0..50 {
        write(root, &format!("src/file{i}.ts"), format!("export const n = {i};"));
    }
    write(root, "a/b/c/d.txt", "deep");

    assert_eq!(scan(root), scan(root));
}

#[test]
fn test_children_follow_listing_order() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    for name in ["zeta.txt", "alpha.txt", "mid", "beta.md"] {
        if name == "mid" {
            fs::create_dir(root.join(name)).unwrap();
        } else {
            write(root, name, name);
        }
    }

    let listed: Vec<String> = fs::read_dir(root)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    let scanned: Vec<String> = scan(root).children.iter().map(TemplateItem::entry_name).collect();

    assert_eq!(scanned, listed);
}

#[test]
fn test_missing_root() {
    let temp = TempDir::new().unwrap();
    let err = TemplateScanner::new()
        .scan(temp.path().join("nope"), &FilterPolicy::default())
        .unwrap_err();

    assert!(matches!(err, TemplateError::PathNotFound { .. }));
}

#[test]
fn test_root_is_a_file() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "file.txt", "x");

    let err = TemplateScanner::new()
        .scan(temp.path().join("file.txt"), &FilterPolicy::default())
        .unwrap_err();

    assert!(matches!(err, TemplateError::NotADirectory { .. }));
}

#[test]
fn test_root_below_a_file() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "file.txt", "x");

    let err = TemplateScanner::new()
        .scan(temp.path().join("file.txt/sub"), &FilterPolicy::default())
        .unwrap_err();

    assert!(matches!(err, TemplateError::PathNotFound { .. }));
}

#[cfg(unix)]
#[test]
fn test_non_utf8_file_name_round_trips() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let raw = OsStr::from_bytes(&[0xff; 200]);
    if fs::write(root.join(raw), "bytes").is_err() {
        // Filesystem refuses non-UTF-8 names.
        return;
    }

    let tree = scan(root);
    let file = tree.children[0].as_file().unwrap();
    assert_eq!(file.name(), "\u{FFFD}".repeat(200));
    assert_eq!(file.content(), "bytes");

    assert_eq!(decode(&encode(&tree).unwrap()).unwrap(), tree);
}

#[cfg(unix)]
#[test]
fn test_unlistable_subdirectory_aborts_scan() {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "src/index.ts", "x");
    write(root, "src/locked/secret.ts", "x");
    let locked = root.join("src/locked");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Root ignores directory permissions.
    let listable = fs::read_dir(&locked).is_ok();
    let result = TemplateScanner::new().scan(root, &FilterPolicy::default());
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
    if listable {
        return;
    }

    match result {
        Err(TemplateError::DirectoryListingFailed { path, .. }) => assert_eq!(path, locked),
        other => panic!("expected DirectoryListingFailed, got {other:?}"),
    }
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_is_degraded() {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "ok.txt", "fine");
    write(root, "private.key", "secret");
    let private = root.join("private.key");
    fs::set_permissions(&private, fs::Permissions::from_mode(0o000)).unwrap();
    if fs::read(&private).is_ok() {
        return;
    }

    let report = TemplateScanner::new()
        .scan_report(root, &FilterPolicy::default())
        .unwrap();

    let file = report.root.child("private.key").unwrap().as_file().unwrap();
    assert!(file.is_unavailable());
    assert!(!file.content().contains("secret"));
    assert_eq!(report.root.find("ok.txt").unwrap().as_file().unwrap().content(), "fine");

    assert_eq!(report.stats.degraded, 1);
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].kind, WarningKind::ReadError);
    assert_eq!(report.warnings[0].path, private);
}

#[cfg(unix)]
#[test]
fn test_symlinks_are_omitted() {
    use std::os::unix::fs::symlink;

    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "real.txt", "real");
    fs::create_dir(root.join("dir")).unwrap();
    symlink(root.join("real.txt"), root.join("link.txt")).unwrap();
    symlink(root.join("dir"), root.join("dirlink")).unwrap();
    symlink(root.join("missing"), root.join("broken")).unwrap();

    let tree = scan(root);
    let mut names: Vec<String> = tree.children.iter().map(TemplateItem::entry_name).collect();
    names.sort();

    assert_eq!(names, vec!["dir", "real.txt"]);
}

#[test]
fn test_custom_overrides_union_with_defaults() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "README.md", "docs");
    write(root, "docs/guide.md", "guide");
    write(root, "server.log", "log");
    write(root, "yarn.lock", "lock");
    write(root, "main.ts", "main");

    let overrides = PolicyOverrides::builder()
        .exclude_files(vec!["README.md".to_string()])
        .exclude_folders(vec!["docs".to_string()])
        .exclude_patterns(vec![r"\.log$".to_string()])
        .build()
        .unwrap();
    let tree = scan_template_directory(root, &overrides).unwrap();

    let names: Vec<String> = tree.children.iter().map(TemplateItem::entry_name).collect();
    assert_eq!(names, vec!["main.ts"]);
}

#[test]
fn test_scan_to_blob_and_back() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("react");
    write(&root, "src/main.jsx", "render(<App />)");

    let store = BlobStore::new(temp.path().join("output"));
    let scanner = TemplateScanner::new();
    let policy = FilterPolicy::default();

    let handle = store.scan_to_blob(&scanner, &root, "REACT", &policy).unwrap();
    let loaded = store.load(&handle).unwrap();
    assert_eq!(loaded, scanner.scan(&root, &policy).unwrap());
    assert_eq!(loaded.name, "react");

    store.remove(handle.clone()).unwrap();
    assert!(!handle.path().exists());
}

#[test]
fn test_concurrent_scans_of_disjoint_roots() {
    let temp = TempDir::new().unwrap();
    let roots: Vec<_> = (0..4)
        .map(|i| {
            let root = temp.path().join(format!("t{i}"));
            write(&root, "index.js", format!("// {i}"));
            root
        })
        .collect();

    let scanner = &TemplateScanner::new();
    let policy = &FilterPolicy::default();

    std::thread::scope(|s| {
        let handles: Vec<_> = roots
            .iter()
            .map(|root| s.spawn(move || scanner.scan(root, policy).unwrap()))
            .collect();
        for (i, handle) in handles.into_iter().enumerate() {
            let tree = handle.join().unwrap();
            assert_eq!(tree.name, format!("t{i}"));
            assert_eq!(
                tree.find("index.js").unwrap().as_file().unwrap().content(),
                format!("// {i}")
            );
        }
    });
}
