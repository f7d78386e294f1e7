//! Java specification version detection for profile activation.

use std::path::{Path, PathBuf};
use std::process::Command;

/// Used when no JDK can be found.
pub const DEFAULT_JDK: &str = "17";

/// Java specification version of the JDK in the environment.
///
/// Sources, in order:
/// 1. `java.specification.version` from `java -XshowSettings:properties -version`
///    (`$JAVA_HOME/bin/java` first, then `java` on `PATH`);
/// 2. `JAVA_VERSION` in `$JAVA_HOME/release`;
/// 3. [`DEFAULT_JDK`], with a warning.
pub fn detect_jdk_version() -> String {
    let java_home = std::env::var_os("JAVA_HOME").map(PathBuf::from);

    let from_java_home = java_home.as_ref().and_then(|home| {
        let exe = if cfg!(windows) { "java.exe" } else { "java" };
        query_java(&home.join("bin").join(exe))
    });
    let detected = from_java_home
        .or_else(|| query_java(Path::new("java")))
        .or_else(|| {
            java_home
                .as_ref()
                .and_then(|home| std::fs::read_to_string(home.join("release")).ok())
                .and_then(|text| parse_release_file(&text))
        });

    match detected {
        Some(version) => {
            tracing::debug!(target: "pomtree.config", jdk = %version, "detected JDK specification version");
            version
        }
        None => {
            tracing::warn!(
                target: "pomtree.config",
                fallback = DEFAULT_JDK,
                "could not detect a JDK; pass --jdk or set resolve.jdk to override"
            );
            DEFAULT_JDK.to_string()
        }
    }
}

fn query_java(java: &Path) -> Option<String> {
    let output = Command::new(java)
        .args(["-XshowSettings:properties", "-version"])
        .output()
        .ok()?;

    // HotSpot prints settings to stderr, but we accept both.
    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));
    spec_version_from_settings(&combined)
}

/// Extracts `java.specification.version` from `-XshowSettings:properties` output.
pub fn spec_version_from_settings(output: &str) -> Option<String> {
    output.lines().find_map(|line| {
        let (key, value) = line.trim().split_once('=')?;
        (key.trim() == "java.specification.version")
            .then(|| value.trim())
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    })
}

/// Specification version from the `JAVA_VERSION="..."` line of a JDK `release` file.
///
/// `1.x` versions are kept as-is; later versions are reduced to their feature number
/// (`17.0.2` -> `17`).
pub fn parse_release_file(text: &str) -> Option<String> {
    let raw = text.lines().find_map(|line| {
        line.trim()
            .strip_prefix("JAVA_VERSION=")
            .map(|value| value.trim().trim_matches('"'))
    })?;

    let mut parts = raw.split(['.', '_', '-', '+']);
    let major = parts.next().filter(|p| !p.is_empty())?;
    if major == "1" {
        let minor = parts.next()?;
        Some(format!("1.{minor}"))
    } else {
        Some(major.to_string())
    }
}
