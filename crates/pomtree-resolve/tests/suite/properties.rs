use std::sync::Arc;

use pomtree_pom::parse_manifest_str;
use pomtree_resolve::{ActivationContext, EffectiveManifest, ManifestCache, PropertyResolver};
use pretty_assertions::assert_eq;

use super::support::*;

const PARENT_REF: &str =
    "<parent><groupId>org.corp</groupId><artifactId>corp-parent</artifactId><version>5</version></parent>";

#[test]
fn project_version_placeholder_uses_manifest_version() {
    let repo = repository(&leaves(&["com.example:sibling:4.2.0"]));
    let root = pom(
        "com.example:app:4.2.0",
        &dependencies(&[dep("com.example:sibling:${project.version}", "")]),
    );

    let graph = resolver(&repo)
        .resolve_bytes(root.as_bytes())
        .expect("resolve");

    assert_eq!(describe_all(&graph.roots), ["com.example:sibling:4.2.0:compile"]);
}

#[test]
fn properties_are_inherited_through_the_parent_chain() {
    let mut manifests = leaves(&["org.lib:lib:7.1", "org.managed:managed:8"]);
    manifests.extend([
        (
            "org.corp:corp-parent:5",
            pom(
                "org.corp:corp-parent:5",
                &format!(
                    "<parent><groupId>org.corp</groupId><artifactId>corp-root</artifactId><version>1</version></parent>{}",
                    management(&[dep("org.managed:managed:${managed.version}", "")])
                ),
            ),
        ),
        (
            "org.corp:corp-root:1",
            pom(
                "org.corp:corp-root:1",
                "<properties><lib.version>7.1</lib.version><managed.version>8</managed.version></properties>",
            ),
        ),
    ]);
    let repo = repository(&manifests);
    let root = format!(
        "<project>{PARENT_REF}<artifactId>app</artifactId>{}</project>",
        dependencies(&[
            dep("org.lib:lib:${lib.version}", ""),
            dep("org.managed:managed", ""),
        ])
    );

    let graph = resolver(&repo)
        .resolve_bytes(root.as_bytes())
        .expect("resolve");

    assert_eq!(graph.errors, vec![]);
    assert_eq!(
        describe_all(&graph.roots),
        ["org.lib:lib:7.1:compile", "org.managed:managed:8:compile"]
    );
}

#[test]
fn dependency_on_parent_takes_parent_version() {
    let repo = repository(&[
        ("org.corp:corp-parent:5", pom("org.corp:corp-parent:5", "")),
    ]);
    let root = format!(
        "<project>{PARENT_REF}<artifactId>app</artifactId>{}</project>",
        dependencies(&[dep("org.corp:corp-parent", "<type>pom</type>")])
    );

    let graph = resolver(&repo)
        .resolve_bytes(root.as_bytes())
        .expect("resolve");

    assert_eq!(describe_all(&graph.roots), ["org.corp:corp-parent:5:compile"]);
}

#[test]
fn circular_reference_returns_placeholder() {
    let repo = repository(&[]);
    let cache = ManifestCache::new(repo, ActivationContext::new("17"));
    let manifest = EffectiveManifest::from_raw(
        parse_manifest_str(&pom(
            "g:a:1",
            "<properties><a>${b}</a><b>${a}</b><c>${a}</c></properties>",
        ))
        .expect("parse"),
        cache.context(),
    );

    let properties = PropertyResolver::new(&cache);
    assert_eq!(properties.resolve("${c}", &manifest), "${a}");
    assert_eq!(properties.resolve("${unknown}", &manifest), "${unknown}");
    assert_eq!(properties.resolve("literal", &manifest), "literal");
}

#[test]
fn missing_parent_leaves_placeholder() {
    let repo = repository(&[]);
    let cache = ManifestCache::new(repo.clone(), ActivationContext::new("17"));
    let manifest = Arc::new(EffectiveManifest::from_raw(
        parse_manifest_str(&format!(
            "<project>{PARENT_REF}<artifactId>app</artifactId></project>"
        ))
        .expect("parse"),
        cache.context(),
    ));

    let properties = PropertyResolver::new(&cache);
    assert_eq!(properties.resolve("${x}", &manifest), "${x}");
    assert_eq!(properties.resolve("${x}", &manifest), "${x}");
    assert_eq!(repo.reads(&coordinate("org.corp:corp-parent:5")), 1);
}
