use std::fs;
use std::path::PathBuf;

use pomtree_config::{
    discover_config_path, discover_local_repository, load_for_project, with_config_env_lock,
    PomtreeConfig,
    POMTREE_CONFIG_ENV_VAR,
};
use tempfile::tempdir;

struct EnvGuard {
    key: &'static str,
    previous: Option<std::ffi::OsString>,
}

impl EnvGuard {
    fn set(key: &'static str, value: impl AsRef<std::ffi::OsStr>) -> Self {
        let previous = std::env::var_os(key);
        std::env::set_var(key, value);
        Self { key, previous }
    }

    fn remove(key: &'static str) -> Self {
        let previous = std::env::var_os(key);
        std::env::remove_var(key);
        Self { key, previous }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.previous.take() {
            Some(value) => std::env::set_var(self.key, value),
            None => std::env::remove_var(self.key),
        }
    }
}

#[test]
fn discovers_project_config_files_in_order() {
    with_config_env_lock(|| {
        let _env = EnvGuard::remove(POMTREE_CONFIG_ENV_VAR);
        let tmp = tempdir().expect("tempdir");
        let root = tmp.path();

        assert_eq!(discover_config_path(root), None);
        let (config, path) = load_for_project(root).expect("defaults");
        assert_eq!(config, PomtreeConfig::default());
        assert_eq!(path, None);

        fs::write(root.join(".pomtree.toml"), "[resolve]\njdk = \"11\"\n").expect("write");
        let hidden = discover_config_path(root).expect("hidden config");
        assert!(hidden.ends_with(".pomtree.toml"));

        fs::write(root.join("pomtree.toml"), "[resolve]\njdk = \"21\"\n").expect("write");
        let (config, path) = load_for_project(root).expect("load");
        assert!(path.expect("path").ends_with("pomtree.toml"));
        assert_eq!(config.resolve.jdk.as_deref(), Some("21"));
    });
}

#[test]
fn env_var_overrides_discovery() {
    with_config_env_lock(|| {
        let tmp = tempdir().expect("tempdir");
        let root = tmp.path();
        fs::write(root.join("pomtree.toml"), "").expect("write");
        fs::create_dir_all(root.join("conf")).expect("mkdir");
        fs::write(
            root.join("conf/custom.toml"),
            "[repository]\noffline = true\n",
        )
        .expect("write");

        let _env = EnvGuard::set(POMTREE_CONFIG_ENV_VAR, "conf/custom.toml");
        let (config, path) = load_for_project(root).expect("load");
        assert!(path.expect("path").ends_with("conf/custom.toml"));
        assert!(config.repository.offline);
    });
}

#[test]
fn malformed_config_is_an_error() {
    with_config_env_lock(|| {
        let _env = EnvGuard::remove(POMTREE_CONFIG_ENV_VAR);
        let tmp = tempdir().expect("tempdir");
        fs::write(tmp.path().join("pomtree.toml"), "[resolve\n").expect("write");
        assert!(load_for_project(tmp.path()).is_err());
    });
}

#[test]
fn local_repository_comes_from_maven_settings() {
    with_config_env_lock(|| {
        let tmp = tempdir().expect("tempdir");
        let home = tmp.path().join("home");
        let maven_home = tmp.path().join("maven-home");
        fs::create_dir_all(&maven_home).expect("mkdir");
        fs::write(
            maven_home.join("settings.xml"),
            "<settings><localRepository>${user.home}/repo-from-settings</localRepository></settings>",
        )
        .expect("write settings");

        let _home = EnvGuard::set("HOME", &home);
        let _maven = EnvGuard::set("MAVEN_USER_HOME", &maven_home);
        assert_eq!(
            discover_local_repository(),
            home.join("repo-from-settings")
        );

        fs::remove_file(maven_home.join("settings.xml")).expect("remove settings");
        assert_eq!(
            discover_local_repository(),
            PathBuf::from(&home).join(".m2/repository")
        );
    });
}
