use std::path::{Path, PathBuf};

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}

/// Local Maven repository for this user.
///
/// `<localRepository>` from `$MAVEN_USER_HOME/settings.xml` or `~/.m2/settings.xml`
/// wins; otherwise `~/.m2/repository`.
pub fn discover_local_repository() -> PathBuf {
    let home = home_dir();
    let maven_user_home = std::env::var_os("MAVEN_USER_HOME")
        .map(PathBuf::from)
        .or_else(|| home.as_ref().map(|home| home.join(".m2")));

    if let Some(settings) = maven_user_home.map(|dir| dir.join("settings.xml")) {
        if let Ok(text) = std::fs::read_to_string(&settings) {
            if let Some(repo) = local_repository_from_settings(&text, home.as_deref()) {
                tracing::debug!(
                    target: "pomtree.config",
                    settings = %settings.display(),
                    repository = %repo.display(),
                    "using localRepository from settings.xml"
                );
                return repo;
            }
        }
    }

    home.unwrap_or_else(|| PathBuf::from("."))
        .join(".m2")
        .join("repository")
}

/// `<localRepository>` of a `settings.xml` document, with `${user.home}` expanded.
pub fn local_repository_from_settings(text: &str, home: Option<&Path>) -> Option<PathBuf> {
    let doc = match roxmltree::Document::parse(text) {
        Ok(doc) => doc,
        Err(err) => {
            tracing::warn!(target: "pomtree.config", error = %err, "ignoring malformed settings.xml");
            return None;
        }
    };
    let value = doc
        .root_element()
        .children()
        .find(|n| n.is_element() && n.tag_name().name() == "localRepository")
        .and_then(|n| n.text())
        .map(str::trim)
        .filter(|t| !t.is_empty())?;

    if value.contains("${user.home}") {
        let home = home?;
        return Some(PathBuf::from(
            value.replace("${user.home}", &home.to_string_lossy()),
        ));
    }
    Some(PathBuf::from(value))
}
