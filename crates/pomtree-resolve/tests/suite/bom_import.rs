use pretty_assertions::assert_eq;

use super::support::*;

const IMPORT: &str = "<type>pom</type><scope>import</scope>";

#[test]
fn version_comes_from_imported_bom() {
    let mut manifests = leaves(&["org.f:f:2.5"]);
    manifests.push((
        "org.bom:bom:1.0",
        pom("org.bom:bom:1.0", &management(&[dep("org.f:f:2.5", "")])),
    ));
    let repo = repository(&manifests);
    let root = pom(
        "com.example:app:1",
        &format!(
            "{}{}",
            management(&[dep("org.bom:bom:1.0", IMPORT)]),
            dependencies(&[dep("org.f:f", "")])
        ),
    );

    let graph = resolver(&repo)
        .resolve_bytes(root.as_bytes())
        .expect("resolve");

    assert_eq!(graph.errors, vec![]);
    assert_eq!(describe_all(&graph.roots), ["org.f:f:2.5:compile"]);
}

#[test]
fn nested_boms_and_bom_parents_are_searched_depth_first() {
    let mut manifests = leaves(&["org.nested:nested:3", "org.inherited:inherited:4"]);
    manifests.extend([
        (
            "org.bom:outer:1",
            pom(
                "org.bom:outer:1",
                &format!(
                    "<parent><groupId>org.bom</groupId><artifactId>outer-parent</artifactId><version>1</version></parent>{}",
                    management(&[dep("org.bom:inner:1", IMPORT)])
                ),
            ),
        ),
        (
            "org.bom:outer-parent:1",
            pom(
                "org.bom:outer-parent:1",
                &management(&[dep("org.inherited:inherited:4", "")]),
            ),
        ),
        (
            "org.bom:inner:1",
            pom(
                "org.bom:inner:1",
                &management(&[dep("org.nested:nested:3", "")]),
            ),
        ),
    ]);
    let repo = repository(&manifests);
    let root = pom(
        "com.example:app:1",
        &format!(
            "{}{}",
            management(&[dep("org.bom:outer:1", IMPORT)]),
            dependencies(&[dep("org.nested:nested", ""), dep("org.inherited:inherited", "")])
        ),
    );

    let resolver = resolver(&repo);
    let graph = resolver.resolve_bytes(root.as_bytes()).expect("resolve");

    assert_eq!(graph.errors, vec![]);
    assert_eq!(
        describe_all(&graph.roots),
        ["org.nested:nested:3:compile", "org.inherited:inherited:4:compile"]
    );
    assert_eq!(repo.reads(&coordinate("org.bom:outer:1")), 1);
    assert_eq!(repo.reads(&coordinate("org.bom:inner:1")), 1);
}

#[test]
fn own_management_wins_over_bom() {
    let mut manifests = leaves(&["org.f:f:9"]);
    manifests.push((
        "org.bom:bom:1.0",
        pom("org.bom:bom:1.0", &management(&[dep("org.f:f:2.5", "")])),
    ));
    let repo = repository(&manifests);
    let root = pom(
        "com.example:app:1",
        &format!(
            "{}{}",
            management(&[dep("org.bom:bom:1.0", IMPORT), dep("org.f:f:9", "")]),
            dependencies(&[dep("org.f:f", "")])
        ),
    );

    let graph = resolver(&repo)
        .resolve_bytes(root.as_bytes())
        .expect("resolve");

    assert_eq!(describe_all(&graph.roots), ["org.f:f:9:compile"]);
    assert_eq!(repo.reads(&coordinate("org.bom:bom:1.0")), 0);
}

#[test]
fn bom_version_from_property() {
    let mut manifests = leaves(&["org.f:f:2.5"]);
    manifests.push((
        "org.bom:bom:1.0",
        pom("org.bom:bom:1.0", &management(&[dep("org.f:f:2.5", "")])),
    ));
    let repo = repository(&manifests);
    let root = pom(
        "com.example:app:1",
        &format!(
            "<properties><bom.version>1.0</bom.version></properties>{}{}",
            management(&[dep("org.bom:bom:${bom.version}", IMPORT)]),
            dependencies(&[dep("org.f:f", "")])
        ),
    );

    let graph = resolver(&repo)
        .resolve_bytes(root.as_bytes())
        .expect("resolve");

    assert_eq!(describe_all(&graph.roots), ["org.f:f:2.5:compile"]);
}

#[test]
fn unavailable_bom_leaves_version_unresolved() {
    let repo = repository(&[]);
    let root = pom(
        "com.example:app:1",
        &format!(
            "{}{}",
            management(&[dep("org.bom:missing:1.0", IMPORT)]),
            dependencies(&[dep("org.f:f", "")])
        ),
    );

    let graph = resolver(&repo)
        .resolve_bytes(root.as_bytes())
        .expect("resolve");

    assert!(graph.roots.is_empty());
    assert_eq!(graph.errors.len(), 1);
}
