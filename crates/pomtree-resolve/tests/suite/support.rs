use std::sync::Arc;

use pomtree_pom::{Coordinate, MemoryRepository};
use pomtree_resolve::{ActivationContext, EffectiveDependency, Resolver};

pub(crate) fn coordinate(gav: &str) -> Coordinate {
    let mut parts = gav.split(':');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(g), Some(a), Some(v)) => Coordinate::new(g, a, v),
        _ => panic!("expected group:artifact:version, got {gav}"),
    }
}

/// A `<project>` with the given coordinate and body.
pub(crate) fn pom(gav: &str, body: &str) -> String {
    let c = coordinate(gav);
    format!(
        r#"<project xmlns="http://maven.apache.org/POM/4.0.0">
  <modelVersion>4.0.0</modelVersion>
  <groupId>{}</groupId>
  <artifactId>{}</artifactId>
  <version>{}</version>
{body}
</project>"#,
        c.group_id, c.artifact_id, c.version
    )
}

/// `<dependency>` for `group:artifact[:version]`, with optional extra elements.
pub(crate) fn dep(ga_or_gav: &str, extra: &str) -> String {
    let parts: Vec<&str> = ga_or_gav.split(':').collect();
    let version = parts
        .get(2)
        .map(|v| format!("<version>{v}</version>"))
        .unwrap_or_default();
    format!(
        "<dependency><groupId>{}</groupId><artifactId>{}</artifactId>{version}{extra}</dependency>",
        parts[0], parts[1]
    )
}

pub(crate) fn dependencies(deps: &[String]) -> String {
    format!("<dependencies>{}</dependencies>", deps.concat())
}

pub(crate) fn management(deps: &[String]) -> String {
    format!(
        "<dependencyManagement><dependencies>{}</dependencies></dependencyManagement>",
        deps.concat()
    )
}

pub(crate) fn repository(manifests: &[(&str, String)]) -> Arc<MemoryRepository> {
    let repo = MemoryRepository::new();
    for (gav, contents) in manifests {
        repo.insert(coordinate(gav), contents.clone());
    }
    Arc::new(repo)
}

/// Repository entries for leaf artifacts without dependencies.
pub(crate) fn leaves(gavs: &[&'static str]) -> Vec<(&'static str, String)> {
    gavs.iter().map(|gav| (*gav, pom(gav, ""))).collect()
}

pub(crate) fn resolver(repo: &Arc<MemoryRepository>) -> Resolver {
    Resolver::new(repo.clone(), ActivationContext::new("17"))
}

/// `group:artifact:version:scope`, plus ` (duplicate)` for duplicate markers.
pub(crate) fn describe(dep: &EffectiveDependency) -> String {
    format!(
        "{}:{}{}",
        dep.coordinate,
        dep.scope,
        if dep.duplicate { " (duplicate)" } else { "" }
    )
}

pub(crate) fn describe_all<'a>(deps: impl IntoIterator<Item = &'a EffectiveDependency>) -> Vec<String> {
    deps.into_iter().map(describe).collect()
}
