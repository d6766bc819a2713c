//! Apply and coverage against a real directory tree.

use camino::{Utf8Path, Utf8PathBuf};
use locpatch_edit::{
    Applier, ApplyOptions, CoverageScope, FsSourceTree, SourceError, SourceTree, analyze_coverage,
    eligible_files, find_obsolete,
};
use locpatch_types::apply::{FileStatus, SkipReason};
use locpatch_types::rules::RuleSet;
use locpatch_types::verify::ObsoleteReason;
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::TempDir;

fn temp_root() -> (TempDir, Utf8PathBuf) {
    let td = tempfile::tempdir().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(td.path().to_path_buf()).expect("utf8 path");
    (td, root)
}

fn write(root: &Utf8Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().expect("parent")).unwrap();
    fs::write(path, contents).unwrap();
}

#[test]
fn real_run_rewrites_file_on_disk() {
    let (_td, root) = temp_root();
    write(&root, "src/tui/app.tsx", "<text>Save</text>\n<text>Quit</text>\n");
    let tree = FsSourceTree::new(root.clone());
    let set = RuleSet::from_pairs("src/tui/app.tsx", [("Save", "保存"), ("Quit", "退出")]);

    let outcome = Applier::new(&tree, ApplyOptions { dry_run: false }).apply(&set);

    assert_eq!(outcome.status, FileStatus::Succeeded);
    assert!(outcome.written);
    assert_eq!(
        fs::read_to_string(root.join("src/tui/app.tsx")).unwrap(),
        "<text>保存</text>\n<text>退出</text>\n"
    );
}

#[test]
fn dry_run_leaves_bytes_untouched() {
    let (_td, root) = temp_root();
    let original = "<p>\r\nSave\r\n</p>";
    write(&root, "src/a.tsx", original);
    let tree = FsSourceTree::new(root.clone());
    let set = RuleSet::from_pairs("src/a.tsx", [("Save", "保存")]);

    let mut applier = Applier::new(&tree, ApplyOptions { dry_run: true });
    let outcome = applier.apply(&set);

    assert_eq!(outcome.status, FileStatus::Succeeded);
    assert!(!outcome.written);
    assert!(outcome.sha256_after.is_some());
    assert_eq!(fs::read(root.join("src/a.tsx")).unwrap(), original.as_bytes());
    assert!(applier.patch().contains("+保存"));
}

#[test]
fn crlf_file_is_written_back_with_lf() {
    let (_td, root) = temp_root();
    write(&root, "src/a.tsx", "one\r\nSave\r\n");
    let tree = FsSourceTree::new(root.clone());
    let set = RuleSet::from_pairs("src/a.tsx", [("Save", "保存")]);

    Applier::new(&tree, ApplyOptions { dry_run: false }).apply(&set);

    assert_eq!(
        fs::read_to_string(root.join("src/a.tsx")).unwrap(),
        "one\n保存\n"
    );
}

#[test]
fn missing_target_on_disk_is_skipped() {
    let (_td, root) = temp_root();
    let tree = FsSourceTree::new(root);
    let set = RuleSet::from_pairs("src/gone.tsx", [("Save", "保存")]);

    let outcome = Applier::new(&tree, ApplyOptions::default()).apply(&set);

    assert_eq!(outcome.status, FileStatus::Skipped);
    assert_eq!(outcome.skip_reason, Some(SkipReason::TargetMissing));
}

#[test]
fn coverage_and_obsolete_over_directory() {
    let (_td, root) = temp_root();
    for i in 0..10 {
        write(&root, &format!("src/tui/component/f{i}.tsx"), "");
    }
    write(&root, "src/tui/theme.ts", "");
    write(&root, "README.md", "");

    let tree = FsSourceTree::new(root);
    let scope = CoverageScope {
        scan_dir: Utf8PathBuf::from("src/tui"),
        extensions: vec!["tsx".to_string(), "jsx".to_string()],
    };
    let sets: Vec<RuleSet> = (0..4)
        .map(|i| RuleSet::from_pairs(format!("src/tui/component/f{i}.tsx"), [("a", "b")]))
        .collect();

    let report = analyze_coverage(&tree, &scope, &sets, &[]).unwrap();
    assert_eq!(report.eligible, 10);
    assert_eq!(report.covered, 4);
    assert_eq!(report.percentage, 40.0);

    let eligible = eligible_files(&tree, &scope).unwrap();
    let theme = RuleSet::from_pairs("src/tui/theme.ts", [("a", "b")]);
    let gone = RuleSet::from_pairs("src/tui/gone.tsx", [("a", "b")]);
    let obsolete = find_obsolete(
        &tree,
        &eligible,
        [
            (Utf8Path::new("tui/theme.json"), &theme),
            (Utf8Path::new("tui/gone.json"), &gone),
            (Utf8Path::new("tui/f0.json"), &sets[0]),
        ],
    );

    let reasons: Vec<ObsoleteReason> = obsolete.iter().map(|o| o.reason).collect();
    assert_eq!(
        reasons,
        vec![ObsoleteReason::OutOfScope, ObsoleteReason::FileMissing]
    );
}

fn run_counts(root: &Utf8Path, sets: &[RuleSet], dry_run: bool) -> Vec<(u64, u64)> {
    let tree = FsSourceTree::new(root.to_path_buf());
    let mut applier = Applier::new(&tree, ApplyOptions { dry_run });
    sets.iter()
        .map(|set| {
            let o = applier.apply(set);
            (o.replacements.succeeded, o.replacements.failed)
        })
        .collect()
}

#[test]
fn aliased_targets_chain_identically_in_dry_and_real_runs() {
    let sets = vec![
        RuleSet::from_pairs("src/a.tsx", [("Quit", "Exit")]),
        RuleSet::from_pairs("./src/a.tsx", [("Exit", "退出")]),
        RuleSet::from_pairs("src\\a.tsx", [("退出", "离开")]),
    ];

    let (_dry_td, dry_root) = temp_root();
    write(&dry_root, "src/a.tsx", "Quit");
    let dry = run_counts(&dry_root, &sets, true);

    let (_real_td, real_root) = temp_root();
    write(&real_root, "src/a.tsx", "Quit");
    let real = run_counts(&real_root, &sets, false);

    assert_eq!(dry, vec![(1, 0), (1, 0), (1, 0)]);
    assert_eq!(dry, real);
    assert_eq!(fs::read_to_string(dry_root.join("src/a.tsx")).unwrap(), "Quit");
    assert_eq!(fs::read_to_string(real_root.join("src/a.tsx")).unwrap(), "离开");
}

#[test]
fn targets_outside_the_source_root_are_never_touched() {
    let (_td, base) = temp_root();
    write(&base, "outside.tsx", "Save");
    write(&base, "project/src/a.tsx", "Save");
    let root = base.join("project");
    let tree = FsSourceTree::new(root);
    let absolute = base.join("outside.tsx");

    for target in ["../outside.tsx", "src/../../outside.tsx", absolute.as_str()] {
        let set = RuleSet::from_pairs(target, [("Save", "保存")]);
        let outcome = Applier::new(&tree, ApplyOptions::default()).apply(&set);
        assert_eq!(outcome.status, FileStatus::Skipped, "{target}");
        assert_eq!(outcome.skip_reason, Some(SkipReason::TargetOutsideRoot), "{target}");
    }
    assert_eq!(fs::read_to_string(base.join("outside.tsx")).unwrap(), "Save");

    let escaping = Utf8Path::new("../outside.tsx");
    assert!(!tree.exists(escaping));
    assert!(matches!(
        tree.write(escaping, "x"),
        Err(SourceError::OutsideRoot { .. })
    ));
    assert!(matches!(
        tree.read_to_string(escaping),
        Err(SourceError::OutsideRoot { .. })
    ));
}

#[test]
fn source_root_with_glob_metacharacters_is_listed() {
    let (_td, base) = temp_root();
    let root = base.join("app [v2]*");
    write(&root, "src/a.tsx", "");
    write(&root, "src/nested/b.jsx", "");

    let tree = FsSourceTree::new(root);
    let files = eligible_files(&tree, &CoverageScope::default()).unwrap();

    assert_eq!(
        files,
        vec![Utf8PathBuf::from("src/a.tsx"), Utf8PathBuf::from("src/nested/b.jsx")]
    );
}
