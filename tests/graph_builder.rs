use interlink::core::graph::{DependencyRef, GraphBuilder};
use interlink::core::module::{Module, ModuleMap};
use std::path::PathBuf;

fn module(name: &str, deps: &[&str]) -> Module {
    let path = PathBuf::from("/ws").join(name);
    Module::new(name.to_string(), path.clone(), path.join("package.json"))
        .with_dependencies(deps.iter().map(|d| d.to_string()).collect())
}

fn dep(name: &str) -> DependencyRef {
    DependencyRef {
        name: name.to_string(),
        path: PathBuf::from("/ws").join(name),
    }
}

#[test]
fn only_modules_with_local_dependencies_produce_links() {
    let modules: ModuleMap = vec![
        module("A", &["B"]),
        module("B", &[]),
        module("C", &["D"]),
    ]
    .into_iter()
    .collect();

    let links = GraphBuilder::from_modules(&modules).links();

    assert_eq!(links.len(), 1);
    assert_eq!(links[0].name, "A");
    assert_eq!(links[0].path, PathBuf::from("/ws/A"));
    assert_eq!(links[0].dependencies, vec![dep("B")]);
}

#[test]
fn local_dependencies_keep_declaration_order() {
    let modules: ModuleMap = vec![
        module("app", &["react", "zeta", "lodash", "alpha"]),
        module("alpha", &[]),
        module("zeta", &[]),
    ]
    .into_iter()
    .collect();

    let links = GraphBuilder::from_modules(&modules).links();

    assert_eq!(links.len(), 1);
    assert_eq!(links[0].dependencies, vec![dep("zeta"), dep("alpha")]);
}

#[test]
fn links_follow_module_registration_order() {
    let modules: ModuleMap = vec![
        module("web", &["core"]),
        module("core", &["util"]),
        module("util", &[]),
        module("cli", &["core", "util"]),
    ]
    .into_iter()
    .collect();

    let names: Vec<_> = GraphBuilder::from_modules(&modules)
        .links()
        .into_iter()
        .map(|link| link.name)
        .collect();
    assert_eq!(names, vec!["web", "core", "cli"]);
}

#[test]
fn cycles_are_detected_but_still_linked() {
    let modules: ModuleMap = vec![module("a", &["b"]), module("b", &["a"])]
        .into_iter()
        .collect();

    let builder = GraphBuilder::from_modules(&modules);
    assert!(builder.has_cycles());

    let links = builder.links();
    assert_eq!(links.len(), 2);
    assert_eq!(links[0].dependencies, vec![dep("b")]);
    assert_eq!(links[1].dependencies, vec![dep("a")]);
}

#[test]
fn skippable_flag_is_carried_onto_links() {
    let modules: ModuleMap = vec![
        module("a", &["b"]).with_skippable(true),
        module("b", &[]),
    ]
    .into_iter()
    .collect();

    let links = GraphBuilder::from_modules(&modules).links();
    assert!(links[0].is_skippable);
}

#[test]
fn add_edge_returns_none_for_unknown_modules() {
    let modules: ModuleMap = vec![module("a", &[])].into_iter().collect();
    let mut builder = GraphBuilder::from_modules(&modules);

    assert!(builder
        .add_edge("a", "missing", interlink::core::graph::Edge { position: 0 })
        .is_none());
    assert!(builder
        .add_edge("a", "a", interlink::core::graph::Edge { position: 0 })
        .is_some());
    assert_eq!(builder.links()[0].dependencies, vec![dep("a")]);
}
