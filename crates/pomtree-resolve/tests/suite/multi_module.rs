use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;
use tempfile::tempdir;

use super::support::*;

fn write(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    fs::write(path, contents).expect("write");
}

#[test]
fn modules_resolve_against_shared_cache() {
    let tmp = tempdir().expect("tempdir");
    let root = tmp.path();

    write(
        &root.join("pom.xml"),
        &pom(
            "com.example:parent:1.0",
            &format!(
                "<packaging>pom</packaging><properties><lib.version>3</lib.version></properties>{}<modules><module>core</module><module>web</module><module>absent</module></modules>",
                management(&[dep("org.lib:lib:${lib.version}", "")])
            ),
        ),
    );
    write(
        &root.join("core/pom.xml"),
        &format!(
            "<project><artifactId>core</artifactId>{}</project>",
            dependencies(&[dep("org.lib:lib", "")])
        ),
    );
    write(
        &root.join("web/pom.xml"),
        &format!(
            "<project><artifactId>web</artifactId>{}</project>",
            dependencies(&[dep("com.example:core:${project.version}", "")])
        ),
    );

    let repo = repository(&leaves(&["org.lib:lib:3"]));
    let resolver = resolver(&repo);
    let modules = resolver
        .flatten_modules(&root.join("pom.xml"))
        .expect("resolve modules");

    assert_eq!(modules.keys().collect::<Vec<_>>(), ["core", "web"]);
    assert_eq!(
        describe_all(&modules["core"].dependencies),
        ["org.lib:lib:3:compile"]
    );
    assert_eq!(
        describe_all(&modules["web"].dependencies),
        ["com.example:core:1.0:compile", "org.lib:lib:3:compile"]
    );
    assert!(modules.values().all(|m| m.errors.is_empty()));

    // `core` came from the reactor, never from the repository.
    assert_eq!(repo.reads(&coordinate("com.example:core:1.0")), 0);
    assert_eq!(repo.reads(&coordinate("org.lib:lib:3")), 1);
}

#[test]
fn nested_aggregators_use_joined_names() {
    let tmp = tempdir().expect("tempdir");
    let root = tmp.path();

    write(
        &root.join("pom.xml"),
        &pom(
            "com.example:top:2",
            "<packaging>pom</packaging><modules><module>services</module></modules>",
        ),
    );
    write(
        &root.join("services/pom.xml"),
        "<project><artifactId>services</artifactId><packaging>pom</packaging><modules><module>api</module></modules></project>",
    );
    write(
        &root.join("services/api/pom.xml"),
        &format!(
            "<project><artifactId>api</artifactId>{}</project>",
            dependencies(&[dep("org.lib:lib:1", "")])
        ),
    );

    let repo = repository(&leaves(&["org.lib:lib:1"]));
    let modules = resolver(&repo)
        .flatten_modules(&root.join("pom.xml"))
        .expect("resolve modules");

    assert_eq!(
        modules.keys().collect::<Vec<_>>(),
        ["services", "services/api"]
    );
    assert_eq!(
        describe_all(&modules["services/api"].dependencies),
        ["org.lib:lib:1:compile"]
    );
}

#[test]
fn manifest_without_modules_is_a_single_module() {
    let tmp = tempdir().expect("tempdir");
    let path = tmp.path().join("pom.xml");
    write(
        &path,
        &pom("com.example:solo:1", &dependencies(&[dep("org.lib:lib:1", "")])),
    );

    let repo = repository(&leaves(&["org.lib:lib:1"]));
    let modules = resolver(&repo)
        .resolve_modules(&path)
        .expect("resolve modules");

    assert_eq!(modules.keys().collect::<Vec<_>>(), ["solo"]);
    assert_eq!(describe_all(&modules["solo"].roots), ["org.lib:lib:1:compile"]);
}

#[test]
fn unreadable_root_manifest_is_fatal() {
    let tmp = tempdir().expect("tempdir");
    let repo = repository(&[]);
    let err = resolver(&repo)
        .resolve_path(&tmp.path().join("missing.xml"))
        .expect_err("root is required");
    assert!(matches!(err, pomtree_resolve::LoadError::Io { .. }), "{err}");
}
