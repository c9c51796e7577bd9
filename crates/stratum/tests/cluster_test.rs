use stratum::cluster::MAX_NESTING_DEPTH;
use stratum::{ContainerSpec, ContainerTree, Error, Size};

fn attach(parent: Option<&str>, child: &str) -> (Option<String>, String) {
    (parent.map(str::to_string), child.to_string())
}

/// `c1` at the top, `c{i}` inside `c{i-1}`, a single node in the innermost one.
fn chain(depth: usize) -> (Vec<ContainerSpec>, Vec<(Option<String>, String)>) {
    let mut specs = Vec::new();
    let mut attachments = Vec::new();
    for i in 1..=depth {
        let mut spec = ContainerSpec::loose(format!("c{i}"));
        if i == depth {
            spec = spec.with_nodes(["leaf"]);
        }
        specs.push(spec);
        if i > 1 {
            attachments.push(attach(Some(&format!("c{}", i - 1)), &format!("c{i}")));
        }
    }
    (specs, attachments)
}

#[test]
fn father_cycle_is_a_cycle_dependency() {
    let specs = vec![
        ContainerSpec::loose("a").with_nodes(["x"]),
        ContainerSpec::loose("b").with_nodes(["y"]),
    ];
    let attachments = vec![attach(Some("a"), "b"), attach(Some("b"), "a")];
    let err = ContainerTree::resolve(specs, &attachments).unwrap_err();
    match err {
        Error::CycleDependency { container } => assert!(container == "a" || container == "b"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn self_attachment_is_a_cycle_dependency() {
    let specs = vec![ContainerSpec::loose("a").with_nodes(["x"])];
    let err = ContainerTree::resolve(specs, &[attach(Some("a"), "a")]).unwrap_err();
    assert_eq!(
        err,
        Error::CycleDependency {
            container: "a".to_string()
        }
    );
}

#[test]
fn duplicate_attachment_is_rejected() {
    let specs = vec![
        ContainerSpec::loose("a").with_nodes(["x"]),
        ContainerSpec::loose("b").with_nodes(["y"]),
    ];
    let attachments = vec![attach(Some("a"), "b"), attach(Some("a"), "b")];
    assert!(matches!(
        ContainerTree::resolve(specs, &attachments),
        Err(Error::InvalidStructure { .. })
    ));
}

#[test]
fn two_fathers_are_rejected() {
    let specs = vec![
        ContainerSpec::loose("a").with_nodes(["x"]),
        ContainerSpec::loose("b").with_nodes(["y"]),
        ContainerSpec::loose("c").with_nodes(["z"]),
    ];
    let attachments = vec![attach(Some("a"), "c"), attach(Some("b"), "c")];
    assert!(matches!(
        ContainerTree::resolve(specs, &attachments),
        Err(Error::InvalidStructure { .. })
    ));
}

#[test]
fn unknown_ids_are_rejected() {
    let specs = vec![ContainerSpec::loose("a").with_nodes(["x"])];
    assert!(ContainerTree::resolve(specs.clone(), &[attach(Some("a"), "ghost")]).is_err());
    assert!(ContainerTree::resolve(specs, &[attach(Some("ghost"), "a")]).is_err());
}

#[test]
fn empty_containers_are_rejected_unless_sized() {
    let specs = vec![ContainerSpec::bordered("empty")];
    assert!(matches!(
        ContainerTree::resolve(specs, &[]),
        Err(Error::InvalidStructure { .. })
    ));

    let specs = vec![
        ContainerSpec::loose("outer"),
        ContainerSpec::bordered("inner").with_min_size(Size::new(40.0, 30.0)),
    ];
    let tree = ContainerTree::resolve(specs, &[attach(Some("outer"), "inner")]).unwrap();
    assert_eq!(tree.len(), 2);

    let specs = vec![ContainerSpec::loose("sized").with_min_size(Size::new(40.0, 30.0))];
    assert!(ContainerTree::resolve(specs, &[]).is_err());
}

#[test]
fn nesting_depth_limit() {
    for depth in [MAX_NESTING_DEPTH - 1, MAX_NESTING_DEPTH] {
        let (specs, attachments) = chain(depth);
        let tree = ContainerTree::resolve(specs, &attachments).unwrap();
        assert_eq!(tree.depth(&format!("c{depth}")), Some(depth));
    }
    let (specs, attachments) = chain(MAX_NESTING_DEPTH + 1);
    assert!(matches!(
        ContainerTree::resolve(specs, &attachments),
        Err(Error::InvalidStructure { .. })
    ));
}

#[test]
fn effective_father_skips_loose_containers() {
    let specs = vec![
        ContainerSpec::bordered("outer").with_nodes(["a"]),
        ContainerSpec::loose("mid").with_nodes(["b"]),
        ContainerSpec::bordered("inner").with_nodes(["c"]),
    ];
    let attachments = vec![attach(Some("outer"), "mid"), attach(Some("mid"), "inner")];
    let tree = ContainerTree::resolve(specs, &attachments).unwrap();

    assert_eq!(tree.father("inner"), Some("mid"));
    assert_eq!(tree.effective_father("inner"), Some("outer"));
    assert_eq!(tree.effective_father("mid"), Some("outer"));
    assert_eq!(tree.effective_father("outer"), None);
    assert_eq!(tree.closest_effective_container("mid"), Some("outer"));

    assert_eq!(tree.node_father("b"), Some("mid"));
    assert_eq!(tree.node_effective_father("b"), Some("outer"));
    assert_eq!(tree.node_effective_father("c"), Some("inner"));
    assert_eq!(tree.node_father("nobody"), None);

    let outer = tree.index_of("outer").unwrap();
    let inner = tree.index_of("inner").unwrap();
    assert_eq!(tree.bordered_path("c"), vec![outer, inner]);
    assert_eq!(tree.bordered_path("b"), vec![outer]);
    assert_eq!(tree.members_recursive("outer"), vec!["a", "b", "c"]);
    assert_eq!(tree.depth("inner"), Some(3));
}

#[test]
fn node_father_prefers_the_deeper_container_then_the_first_declared() {
    let specs = vec![
        ContainerSpec::loose("top").with_nodes(["n", "m"]),
        ContainerSpec::loose("deep").with_nodes(["n"]),
        ContainerSpec::loose("first").with_nodes(["k"]),
        ContainerSpec::loose("second").with_nodes(["k"]),
    ];
    let tree = ContainerTree::resolve(specs, &[attach(Some("top"), "deep")]).unwrap();
    assert_eq!(tree.node_father("n"), Some("deep"));
    assert_eq!(tree.node_father("m"), Some("top"));
    assert_eq!(tree.node_father("k"), Some("first"));
}
