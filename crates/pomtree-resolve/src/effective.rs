//! Effective manifests: a raw manifest merged with its active profiles and, for
//! modules of an aggregator, the aggregator itself.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use pomtree_pom::{Coordinate, Profile, RawDependency, RawManifest};

use crate::activation::ActivationContext;
use crate::properties::placeholder_key;

/// Read-only merged view over a [`RawManifest`].
///
/// Everything is computed once at construction; the wrapped manifest is never modified.
#[derive(Debug, Clone)]
pub struct EffectiveManifest {
    raw: Arc<RawManifest>,
    coordinate: Coordinate,
    parent_ref: Option<Coordinate>,
    active_profiles: Vec<Profile>,
    properties: BTreeMap<String, String>,
    dependencies: Vec<RawDependency>,
    dependency_management: Vec<RawDependency>,
}

impl EffectiveManifest {
    /// `parent` is the aggregator context for reactor modules, `None` for manifests
    /// fetched from a repository (their `<parent>` chain is walked lazily).
    pub fn new(
        raw: Arc<RawManifest>,
        parent: Option<&EffectiveManifest>,
        context: &ActivationContext,
    ) -> Self {
        let mut active_profiles: Vec<Profile> = parent
            .map(|p| p.active_profiles.clone())
            .unwrap_or_default();
        active_profiles.extend(
            raw.profiles
                .iter()
                .filter(|profile| context.is_active(profile))
                .cloned(),
        );

        let mut properties = parent.map(|p| p.properties.clone()).unwrap_or_default();
        properties.extend(raw.properties.clone());
        for profile in &active_profiles {
            properties.extend(profile.properties.clone());
        }

        let declared = Coordinate {
            group_id: raw
                .group_id
                .clone()
                .or_else(|| raw.parent.as_ref().map(|p| p.group_id.clone()))
                .or_else(|| parent.map(|p| p.coordinate.group_id.clone()))
                .unwrap_or_default(),
            artifact_id: raw.artifact_id.clone(),
            version: raw
                .version
                .clone()
                .or_else(|| raw.parent.as_ref().map(|p| p.version.clone()))
                .or_else(|| parent.map(|p| p.coordinate.version.clone()))
                .unwrap_or_default(),
        };
        let coordinate = Coordinate {
            group_id: substitute(&declared.group_id, &properties, &declared),
            artifact_id: substitute(&declared.artifact_id, &properties, &declared),
            version: substitute(&declared.version, &properties, &declared),
        };

        let resolve_dependency = |dependency: &RawDependency| {
            let mut dependency = dependency.clone();
            dependency.group_id = substitute(&dependency.group_id, &properties, &coordinate);
            dependency.artifact_id =
                substitute(&dependency.artifact_id, &properties, &coordinate);
            dependency.version = dependency
                .version
                .as_deref()
                .map(|v| substitute(v, &properties, &coordinate));
            dependency
        };

        let dependencies = active_profiles
            .iter()
            .flat_map(|profile| profile.dependencies.iter())
            .chain(raw.dependencies.iter())
            .map(resolve_dependency)
            .collect();

        // Lookup order: own entries, then active profiles, then the aggregator.
        let dependency_management = raw
            .dependency_management
            .iter()
            .chain(
                active_profiles
                    .iter()
                    .flat_map(|profile| profile.dependency_management.iter()),
            )
            .map(resolve_dependency)
            .chain(
                parent
                    .map(|p| p.dependency_management.clone())
                    .unwrap_or_default(),
            )
            .collect();

        // A reactor module continues its parent walk where the aggregator's ends.
        let parent_ref = match parent {
            Some(parent) => parent.parent_ref.clone(),
            None => raw.parent.clone(),
        };

        Self {
            raw,
            coordinate,
            parent_ref,
            active_profiles,
            properties,
            dependencies,
            dependency_management,
        }
    }

    pub fn from_raw(raw: RawManifest, context: &ActivationContext) -> Self {
        Self::new(Arc::new(raw), None, context)
    }

    pub fn raw(&self) -> &RawManifest {
        &self.raw
    }

    pub fn coordinate(&self) -> &Coordinate {
        &self.coordinate
    }

    /// Next manifest in the `<parent>` chain.
    pub fn parent_ref(&self) -> Option<&Coordinate> {
        self.parent_ref.as_ref()
    }

    pub fn active_profiles(&self) -> &[Profile] {
        &self.active_profiles
    }

    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    /// Active-profile dependencies followed by the manifest's own.
    pub fn dependencies(&self) -> &[RawDependency] {
        &self.dependencies
    }

    pub fn dependency_management(&self) -> &[RawDependency] {
        &self.dependency_management
    }

    /// `<type>pom</type><scope>import</scope>` entries, in declaration order.
    pub fn bom_imports(&self) -> impl Iterator<Item = &RawDependency> + '_ {
        self.dependency_management
            .iter()
            .filter(|dependency| dependency.is_bom_import())
    }

    pub fn modules(&self) -> &[String] {
        &self.raw.modules
    }
}

/// Resolves a whole-value placeholder against this manifest alone.
///
/// Unknown keys and reference cycles leave the placeholder in place;
/// [`crate::PropertyResolver`] picks those up and walks the parent chain.
fn substitute(value: &str, properties: &BTreeMap<String, String>, coordinate: &Coordinate) -> String {
    let mut seen = HashSet::new();
    let mut current = value.to_string();
    while let Some(key) = placeholder_key(&current) {
        if !seen.insert(current.clone()) {
            break;
        }
        let next = match key {
            "project.version" => Some(&coordinate.version),
            "project.groupId" => Some(&coordinate.group_id),
            "project.artifactId" => Some(&coordinate.artifact_id),
            other => properties.get(other),
        };
        match next {
            Some(next) => current = next.clone(),
            None => break,
        }
    }
    current
}
