//! Scenario Tests
//!
//! End-to-end reconciliation runs through both adapters: the in-memory
//! target, which records every operation, and the local target, which
//! exercises real files.

use pretty_assertions::assert_eq;
use serde_json::json;
use treesync_core::{
    Attributes, CopyEngine, LocalAdapter, LocalOptions, OwnershipPolicy, TemplateEngine,
};
use treesync_fs::Mode;
use treesync_fs::io::mode_of;
use treesync_test_utils::{MemoryAdapter, Node, Op, TestTree};

fn attrs(owner: &str, group: &str, mode: &str) -> Attributes {
    Attributes::new(
        Some(owner.to_string()),
        Some(group.to_string()),
        Mode::parse(mode).unwrap(),
    )
}

fn local(tree: &TestTree, check_mode: bool) -> LocalAdapter {
    LocalAdapter::new(
        tree.target_root(),
        LocalOptions {
            check_mode,
            diff_mode: true,
            ownership: OwnershipPolicy::Ignore,
        },
    )
}

// =============================================================================
// Copy variant
// =============================================================================

#[test]
fn copy_creates_parents_in_order_then_file() {
    let tree = TestTree::new().with_file("a/b/file.txt", "payload\n");
    let mut adapter = MemoryAdapter::new();

    let result = CopyEngine::new(&mut adapter).run(&tree.copy_args("root", "root", "0644", "0755"));

    assert!(result.changed && !result.failed, "{}", result.msg());
    assert_eq!(
        adapter.ops,
        vec![
            Op::EnsureDirectory("/a".into()),
            Op::EnsureDirectory("/a/b".into()),
            Op::WriteFile("/a/b/file.txt".into()),
        ]
    );
    assert_eq!(
        adapter.node("/a/b/file.txt"),
        Some(&Node::File {
            content: b"payload\n".to_vec(),
            attributes: attrs("root", "root", "0644"),
        })
    );
}

#[test]
fn copy_mode_override_leaves_directories_alone() {
    let tree = TestTree::new().with_file("a/b/file.txt", "payload\n");
    let mut args = tree.copy_args("root", "root", "0644", "0755");
    args.insert("mode_overrides".into(), json!({"0600": ["/a/b/file.txt"]}));
    let mut adapter = MemoryAdapter::new();

    CopyEngine::new(&mut adapter).run(&args);

    assert_eq!(adapter.node("/a"), Some(&Node::Directory(attrs("root", "root", "0755"))));
    assert_eq!(adapter.node("/a/b"), Some(&Node::Directory(attrs("root", "root", "0755"))));
    let Some(Node::File { attributes, .. }) = adapter.node("/a/b/file.txt") else {
        panic!("file not written");
    };
    assert_eq!(attributes, &attrs("root", "root", "0600"));
}

#[test]
fn copy_override_on_unknown_path_fails_before_any_operation() {
    let tree = TestTree::new().with_file("a/b/file.txt", "payload\n");
    let mut args = tree.copy_args("root", "root", "0644", "0755");
    args.insert("mode_overrides".into(), json!({"0600": ["/not/a/real/path"]}));
    let mut adapter = MemoryAdapter::new();

    let result = CopyEngine::new(&mut adapter).run(&args);

    assert!(result.failed);
    assert!(result.msg().contains("/not/a/real/path"));
    assert!(result.msg().contains("valid paths"));
    assert!(adapter.ops.is_empty());
}

#[test]
fn copy_rerun_is_idempotent() {
    let tree = TestTree::new()
        .with_file("etc/app/app.conf", "a=1\n")
        .with_file("etc/app/conf.d/extra.conf", "b=2\n")
        .with_file("usr/share/app/readme", "hi\n");
    let args = tree.copy_args("root", "root", "0644", "0755");
    let mut adapter = MemoryAdapter::new();

    let first = CopyEngine::new(&mut adapter).run(&args);
    let second = CopyEngine::new(&mut adapter).run(&args);

    assert!(first.changed);
    assert!(second.is_converged(), "{}", second.msg());
    assert!(second.diff.is_empty());
}

#[test]
fn copy_failure_halts_and_keeps_earlier_outcomes() {
    let tree = TestTree::new()
        .with_file("a/one.txt", "1")
        .with_file("a/two.txt", "2")
        .with_file("a/three.txt", "3");
    let mut adapter = MemoryAdapter::new().failing_on("/a/three.txt");

    let result = CopyEngine::new(&mut adapter).run(&tree.copy_args("root", "root", "0644", "0755"));

    assert!(result.failed);
    assert!(result.changed);
    // Files are applied in destination order: one, three, two
    assert_eq!(
        adapter.mutations(),
        vec![
            &Op::EnsureDirectory("/a".into()),
            &Op::WriteFile("/a/one.txt".into()),
            &Op::WriteFile("/a/three.txt".into()),
        ]
    );
    assert_eq!(
        result.messages,
        vec![
            "created directory /a",
            "wrote /a/one.txt",
            "/a/three.txt: injected failure",
        ]
    );
    assert!(adapter.node("/a/two.txt").is_none());
}

#[test]
fn copy_onto_local_target_in_check_mode_then_for_real() {
    let tree = TestTree::new().with_file("srv/www/index.html", "<h1>hi</h1>\n");
    let args = tree.copy_args("root", "root", "0640", "0750");

    let dry = CopyEngine::new(&mut local(&tree, true)).run(&args);
    assert!(dry.changed && !dry.failed, "{}", dry.msg());
    assert!(dry.diff.iter().any(|d| d.after == "<h1>hi</h1>\n"));
    tree.assert_target_missing("srv");

    let real = CopyEngine::new(&mut local(&tree, false)).run(&args);
    assert!(real.changed && !real.failed, "{}", real.msg());
    assert_eq!(tree.read_target("srv/www/index.html"), "<h1>hi</h1>\n");
    assert_eq!(mode_of(&tree.target_root().join("srv/www")).unwrap().to_string(), "0750");
    assert_eq!(
        mode_of(&tree.target_root().join("srv/www/index.html")).unwrap().to_string(),
        "0640"
    );

    let again = CopyEngine::new(&mut local(&tree, false)).run(&args);
    assert!(again.is_converged(), "{}", again.msg());
}

#[test]
fn copy_updates_drifted_content_with_diff() {
    let tree = TestTree::new().with_file("etc/motd", "new\n");
    tree.write_target("etc/motd", "old\n");
    let args = tree.copy_args("root", "root", "0644", "0755");

    let result = CopyEngine::new(&mut local(&tree, false)).run(&args);

    assert!(result.changed && !result.failed, "{}", result.msg());
    let record = result
        .diff
        .iter()
        .find(|d| d.before_header == "/etc/motd")
        .unwrap();
    assert_eq!(record.before, "old\n");
    assert_eq!(record.after, "new\n");
    assert!(record.unified().contains("-old"));
    assert_eq!(tree.read_target("etc/motd"), "new\n");
}

#[test]
fn copy_into_path_occupied_by_file_fails() {
    let tree = TestTree::new().with_file("a/b/file.txt", "x");
    tree.write_target("a", "not a directory");

    let result = CopyEngine::new(&mut local(&tree, false))
        .run(&tree.copy_args("root", "root", "0644", "0755"));

    assert!(result.failed);
    assert!(result.msg().contains("not a directory"), "{}", result.msg());
    assert_eq!(tree.read_target("a"), "not a directory");
}

// =============================================================================
// Template variant
// =============================================================================

#[test]
fn template_strips_suffix_and_creates_missing_parent() {
    let tree = TestTree::new()
        .with_file("config.yml.j2", "host: {{ host }}\n")
        .with_file("etc/app/app.conf.j2", "port={{ port }}\n");
    let mut adapter = MemoryAdapter::new();

    let result = TemplateEngine::new(&mut adapter)
        .run(&tree.template_args(json!({"host": "db", "port": 5432})));

    assert!(!result.failed, "{}", result.msg());
    assert_eq!(
        adapter.ops,
        vec![
            Op::Stat("/etc/app".into()),
            Op::EnsureDirectory("/etc/app".into()),
            Op::RenderTemplate("/config.yml".into()),
            Op::RenderTemplate("/etc/app/app.conf".into()),
        ]
    );
    let Some(Node::File { content, attributes }) = adapter.node("/config.yml") else {
        panic!("template not rendered");
    };
    assert_eq!(content, b"host: db\n");
    assert_eq!(attributes.mode.to_string(), "0644");
    assert_eq!(attributes.owner, None);
}

#[test]
fn template_keeps_existing_parent_attributes() {
    let tree = TestTree::new().with_file("etc/app/app.conf.j2", "x\n");
    let mut adapter = MemoryAdapter::new();
    let existing = attrs("app", "app", "0700");
    adapter.insert("/etc", Node::Directory(attrs("root", "root", "0755")));
    adapter.insert("/etc/app", Node::Directory(existing.clone()));

    let result = TemplateEngine::new(&mut adapter).run(&tree.template_args(json!({})));

    assert!(!result.failed, "{}", result.msg());
    assert_eq!(adapter.node("/etc/app"), Some(&Node::Directory(existing)));
    assert!(!adapter.ops.contains(&Op::EnsureDirectory("/etc/app".into())));
}

#[test]
fn template_onto_local_target_is_idempotent() {
    let tree = TestTree::new().with_file("opt/svc/env.j2", "NAME={{ name }}\n");
    let args = tree.template_args(json!({"name": "svc"}));

    let first = TemplateEngine::new(&mut local(&tree, false)).run(&args);
    assert!(first.changed && !first.failed, "{}", first.msg());
    tree.assert_target_dir("opt/svc");
    assert_eq!(tree.read_target("opt/svc/env"), "NAME=svc\n");

    let second = TemplateEngine::new(&mut local(&tree, false)).run(&args);
    assert!(second.is_converged(), "{}", second.msg());
}

#[test]
fn template_check_mode_reports_changes_only() {
    let tree = TestTree::new().with_file("opt/svc/env.j2", "NAME={{ name }}\n");

    let result = TemplateEngine::new(&mut local(&tree, true))
        .run(&tree.template_args(json!({"name": "svc"})));

    assert!(result.changed && !result.failed, "{}", result.msg());
    tree.assert_target_missing("opt");
}

// =============================================================================
// Argument files
// =============================================================================

#[test]
fn args_file_round_trips_through_store() {
    let tree = TestTree::new().with_file("a.txt", "a");
    let args = tree.copy_args("root", "root", "0644", "0755");
    let path = tree.write_args("args.json", &args);

    let loaded = treesync_fs::ArgsStore::new().load(&path).unwrap();
    let mut adapter = MemoryAdapter::new();
    let result = CopyEngine::new(&mut adapter).run(&loaded);

    assert_eq!(loaded, args);
    assert!(result.changed && !result.failed);
    assert_eq!(adapter.ops, vec![Op::WriteFile("/a.txt".into())]);
}
