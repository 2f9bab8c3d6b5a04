//! Loading, linking and resolving blueprint files.

use std::fs;

use camino::Utf8Path;
use hwforge::blueprint::{Blueprint, BlueprintError};
use hwforge::graph::{to_blueprint_json, walk};
use hwforge::resolve::Resolver;
use hwforge::value::Resolved;
use rstest::rstest;
use test_support::{RecordingExecutor, utf8_tempdir};

fn load(name: &str) -> Blueprint {
    Blueprint::from_path(&Utf8Path::new("tests/data").join(name)).expect("load blueprint")
}

#[test]
fn cycles_are_rejected_before_anything_runs() {
    let err = load("cycle.json").link().expect_err("cycle");
    let BlueprintError::CircularDependency { cycle } = &err else {
        panic!("expected a circular dependency, got {err}");
    };
    assert_eq!(cycle, &["a", "b", "a"]);
    assert_eq!(err.to_string(), "circular dependency detected: a -> b -> a");
}

#[rstest]
#[case(r#"{"targets": {"a": {"kind": "job", "params": {"x": {"field": "out", "of": "ghost"}}}}}"#)]
#[case(r#"{"targets": {"a": {"kind": "job", "params": {"x": [{"target": "ghost"}]}}}}"#)]
fn references_to_undefined_labels_are_rejected(#[case] json: &str) {
    let err = json
        .parse::<Blueprint>()
        .expect("parse")
        .link()
        .expect_err("missing target");
    assert!(
        matches!(&err, BlueprintError::MissingTarget { target, missing } if target == "a" && missing == "ghost"),
        "unexpected error: {err}"
    );
}

#[test]
fn undefined_roots_are_rejected() {
    let err = r#"{"targets": {"a": {"kind": "job"}}, "roots": ["b"]}"#
        .parse::<Blueprint>()
        .expect("parse")
        .link()
        .expect_err("unknown root");
    assert!(matches!(err, BlueprintError::UnknownRoot { root } if root == "b"));
}

#[test]
fn shared_producers_run_once_and_feed_their_paths_forward() {
    let (_guard, root) = utf8_tempdir().expect("tempdir");
    let text = fs::read_to_string("tests/data/soc.json").expect("read blueprint");
    let rooted = text.replace("build/soc", root.join("build/soc").as_str());
    let linked = rooted
        .parse::<Blueprint>()
        .expect("parse")
        .link()
        .expect("link");
    assert_eq!(linked.root_labels(), ["bsp"]);

    let executor = RecordingExecutor::new();
    let mut resolver = Resolver::new(&executor);
    let outputs = resolver
        .resolve_all(&linked.roots())
        .into_iter()
        .next()
        .expect("one root")
        .expect("bsp resolves");

    let soc = root.join("build/soc");
    assert_eq!(
        outputs.get("settings"),
        Some(&Resolved::Path(soc.join("bsp/settings.mk")))
    );
    assert_eq!(executor.count("job"), 3);
    let bsp = executor.jobs().pop().expect("bsp ran last");
    let command = bsp.command().expect("command");
    assert_eq!(
        command,
        [
            "freedom-bsp-generator".to_owned(),
            "--dts".to_owned(),
            soc.join("soc.dts").to_string(),
            "--dtb".to_owned(),
            soc.join("soc.dtb").to_string(),
        ]
    );
}

#[test]
fn exported_graphs_link_back_to_the_same_targets() {
    let linked = load("soc.json").link().expect("link");
    let roots = linked.roots();
    let exported = to_blueprint_json(&roots).to_string();
    let relinked = exported
        .parse::<Blueprint>()
        .expect("parse export")
        .link()
        .expect("link export");
    assert_eq!(relinked.roots(), roots);
    assert_eq!(walk(&relinked.roots()).len(), 3);
}
