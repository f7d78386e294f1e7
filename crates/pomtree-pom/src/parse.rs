//! POM descriptor parsing.
//!
//! Elements are matched by local name only, so manifests with and without the
//! `http://maven.apache.org/POM/4.0.0` default namespace parse identically.

use std::collections::BTreeMap;

use roxmltree::Node;

use crate::{Activation, Coordinate, Exclusion, ParseError, Profile, RawDependency, RawManifest};

/// Parse raw manifest bytes into a [`RawManifest`].
pub fn parse_manifest(bytes: &[u8]) -> Result<RawManifest, ParseError> {
    let contents = std::str::from_utf8(bytes).map_err(|err| ParseError::Utf8 {
        message: err.to_string(),
    })?;
    parse_manifest_str(contents)
}

pub fn parse_manifest_str(contents: &str) -> Result<RawManifest, ParseError> {
    let doc = roxmltree::Document::parse(contents).map_err(|err| ParseError::Xml {
        message: err.to_string(),
    })?;

    let project = doc.root_element();

    let artifact_id =
        child_text(project, "artifactId").ok_or(ParseError::MissingElement {
            element: "artifactId",
        })?;

    let mut manifest = RawManifest {
        group_id: child_text(project, "groupId"),
        artifact_id,
        version: child_text(project, "version"),
        packaging: child_text(project, "packaging"),
        ..RawManifest::default()
    };

    if let Some(parent_node) = child_element(project, "parent") {
        manifest.parent = Some(parse_parent(parent_node)?);
    }

    if let Some(props_node) = child_element(project, "properties") {
        manifest.properties = parse_properties(props_node);
    }

    if let Some(deps_node) = child_element(project, "dependencies") {
        manifest.dependencies = parse_dependencies(deps_node);
    }

    manifest.dependency_management = parse_dependency_management(project);

    if let Some(profiles_node) = child_element(project, "profiles") {
        manifest.profiles = profiles_node
            .children()
            .filter(|n| n.is_element() && n.has_tag_name("profile"))
            .map(parse_profile)
            .collect();
    }

    if let Some(modules_node) = child_element(project, "modules") {
        manifest.modules = modules_node
            .children()
            .filter(|n| n.is_element() && n.has_tag_name("module"))
            .filter_map(|n| n.text())
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
    }

    Ok(manifest)
}

fn parse_parent(node: Node<'_, '_>) -> Result<Coordinate, ParseError> {
    let group_id = child_text(node, "groupId").ok_or(ParseError::MissingElement {
        element: "parent/groupId",
    })?;
    let artifact_id = child_text(node, "artifactId").ok_or(ParseError::MissingElement {
        element: "parent/artifactId",
    })?;
    let version = child_text(node, "version").ok_or(ParseError::MissingElement {
        element: "parent/version",
    })?;
    Ok(Coordinate {
        group_id,
        artifact_id,
        version,
    })
}

fn parse_properties(node: Node<'_, '_>) -> BTreeMap<String, String> {
    let mut properties = BTreeMap::new();
    for child in node.children().filter(|n| n.is_element()) {
        let key = child.tag_name().name().to_string();
        if let Some(value) = child.text().map(str::trim).filter(|t| !t.is_empty()) {
            properties.insert(key, value.to_string());
        }
    }
    properties
}

fn parse_dependency_management(node: Node<'_, '_>) -> Vec<RawDependency> {
    child_element(node, "dependencyManagement")
        .and_then(|dm| child_element(dm, "dependencies"))
        .map(parse_dependencies)
        .unwrap_or_default()
}

fn parse_dependencies(deps_node: Node<'_, '_>) -> Vec<RawDependency> {
    deps_node
        .children()
        .filter(|n| n.is_element() && n.has_tag_name("dependency"))
        .filter_map(|dep_node| {
            let group_id = child_text(dep_node, "groupId")?;
            let artifact_id = child_text(dep_node, "artifactId")?;

            Some(RawDependency {
                group_id,
                artifact_id,
                version: child_text(dep_node, "version"),
                type_: child_text(dep_node, "type"),
                scope: child_text(dep_node, "scope"),
                classifier: child_text(dep_node, "classifier"),
                optional: child_text(dep_node, "optional").as_deref() == Some("true"),
                exclusions: parse_exclusions(dep_node),
            })
        })
        .collect()
}

fn parse_exclusions(dep_node: Node<'_, '_>) -> Vec<Exclusion> {
    let Some(exclusions) = child_element(dep_node, "exclusions") else {
        return Vec::new();
    };
    exclusions
        .children()
        .filter(|n| n.is_element() && n.has_tag_name("exclusion"))
        .filter_map(|n| {
            Some(Exclusion {
                group_id: child_text(n, "groupId")?,
                artifact_id: child_text(n, "artifactId")?,
            })
        })
        .collect()
}

fn parse_profile(node: Node<'_, '_>) -> Profile {
    let activation = child_element(node, "activation").map(|activation| Activation {
        active_by_default: child_text(activation, "activeByDefault").as_deref() == Some("true"),
        jdk: child_text(activation, "jdk"),
    });

    Profile {
        id: child_text(node, "id").unwrap_or_else(|| "default".to_string()),
        activation,
        properties: child_element(node, "properties")
            .map(parse_properties)
            .unwrap_or_default(),
        dependencies: child_element(node, "dependencies")
            .map(parse_dependencies)
            .unwrap_or_default(),
        dependency_management: parse_dependency_management(node),
    }
}

fn child_element<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == name)
}

fn child_text(node: Node<'_, '_>, name: &str) -> Option<String> {
    child_element(node, name)
        .and_then(|n| n.text())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}
