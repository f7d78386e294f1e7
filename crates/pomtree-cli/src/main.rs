use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use pomtree_config::{init_tracing, load_for_project, PomtreeConfig};
use pomtree_resolve::{
    ActivationContext, DependencyGraph, EffectiveDependency, FlatDependencies, ResolveError,
    Resolver,
};
use serde::Serialize;

#[derive(Parser)]
#[command(
    name = "pomtree",
    version,
    about = "Resolve the transitive dependencies of Maven POM manifests"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the dependency tree of a manifest, duplicates marked
    Tree(ResolveArgs),
    /// Print the flattened dependency set of a manifest
    Flatten(ResolveArgs),
    /// Resolve every module of an aggregator manifest and print each flattened set
    Modules(ResolveArgs),
}

#[derive(Args)]
struct ResolveArgs {
    /// Manifest file, or a directory containing `pom.xml`
    pom: PathBuf,

    /// Java specification version used for profile activation (e.g. `1.8`, `17`)
    #[arg(long, value_name = "VERSION")]
    jdk: Option<String>,

    /// Activate a profile by id (repeatable, comma-separated lists accepted)
    #[arg(short = 'P', long = "profile", value_name = "ID", value_delimiter = ',')]
    profiles: Vec<String>,

    /// Local repository root (defaults to the `settings.xml` / `~/.m2` location)
    #[arg(long, value_name = "PATH")]
    local_repo: Option<PathBuf>,

    /// Remote repository base URL
    #[arg(long, value_name = "URL")]
    remote_url: Option<String>,

    /// Only read manifests from the local repository
    #[arg(long)]
    offline: bool,

    /// Config file (defaults to `pomtree.toml` next to the manifest)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Emit JSON instead of text
    #[arg(long)]
    json: bool,
}

impl ResolveArgs {
    fn manifest_path(&self) -> PathBuf {
        if self.pom.is_dir() {
            self.pom.join("pom.xml")
        } else {
            self.pom.clone()
        }
    }

    fn load_config(&self, manifest: &Path) -> Result<PomtreeConfig> {
        let mut config = match &self.config {
            Some(path) => PomtreeConfig::load_from_path(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => {
                let project_root = manifest
                    .parent()
                    .filter(|dir| !dir.as_os_str().is_empty())
                    .unwrap_or(Path::new("."));
                load_for_project(project_root)
                    .with_context(|| {
                        format!("failed to load config for {}", project_root.display())
                    })?
                    .0
            }
        };

        if let Some(jdk) = &self.jdk {
            config.resolve.jdk = Some(jdk.clone());
        }
        config.resolve.profiles.extend(
            self.profiles
                .iter()
                .map(|id| id.trim())
                .filter(|id| !id.is_empty())
                .map(str::to_string),
        );
        if let Some(local) = &self.local_repo {
            config.repository.local = Some(local.clone());
        }
        if let Some(remote) = &self.remote_url {
            config.repository.remote = remote.clone();
        }
        if self.offline {
            config.repository.offline = true;
        }
        Ok(config)
    }
}

fn main() {
    let cli = Cli::parse();
    let exit_code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            2
        }
    };

    std::process::exit(exit_code);
}

fn run(cli: Cli) -> Result<i32> {
    let args = match &cli.command {
        Command::Tree(args) | Command::Flatten(args) | Command::Modules(args) => args,
    };
    let manifest = args.manifest_path();
    let config = args.load_config(&manifest)?;
    init_tracing(&config.logging);

    let context =
        ActivationContext::new(config.jdk()).with_profiles(config.resolve.profiles.clone());
    tracing::debug!(
        target: "pomtree.cli",
        manifest = %manifest.display(),
        jdk = context.jdk(),
        offline = config.repository.offline,
        "starting resolution"
    );
    let resolver = Resolver::new(config.manifest_source(), context);

    let errors = match cli.command {
        Command::Tree(args) => {
            let graph = resolver.resolve_path(&manifest)?;
            if args.json {
                print_json(&graph)?;
            } else {
                print_tree(&graph);
            }
            graph.errors
        }
        Command::Flatten(args) => {
            let flat = resolver.flatten_path(&manifest)?;
            if args.json {
                print_json(&flat)?;
            } else {
                for dependency in &flat.dependencies {
                    println!("{}", describe(dependency));
                }
            }
            flat.errors
        }
        Command::Modules(args) => {
            let modules = resolver.flatten_modules(&manifest)?;
            if args.json {
                print_json(&modules)?;
            } else {
                print_modules(&modules);
            }
            modules.into_values().flat_map(|module| module.errors).collect()
        }
    };

    Ok(report_errors(&errors))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value)?;
    println!("{out}");
    Ok(())
}

/// `group:artifact:type:version:scope`
fn describe(dependency: &EffectiveDependency) -> String {
    let coordinate = &dependency.coordinate;
    format!(
        "{}:{}:{}:{}:{}",
        coordinate.group_id,
        coordinate.artifact_id,
        dependency.type_,
        coordinate.version,
        dependency.scope
    )
}

fn print_tree(graph: &DependencyGraph) {
    fn print_node(node: &EffectiveDependency, depth: usize) {
        let marker = if node.duplicate { " (duplicate)" } else { "" };
        println!("{}{}{marker}", "  ".repeat(depth), describe(node));
        for child in &node.children {
            print_node(child, depth + 1);
        }
    }

    for root in &graph.roots {
        print_node(root, 0);
    }
}

fn print_modules(modules: &BTreeMap<String, FlatDependencies>) {
    for (name, module) in modules {
        println!("{name}:");
        for dependency in &module.dependencies {
            println!("  {}", describe(dependency));
        }
    }
}

/// Prints collected per-coordinate errors to stderr; returns the exit code.
fn report_errors(errors: &[ResolveError]) -> i32 {
    for err in errors {
        eprintln!("error: {err}");
    }
    if errors.is_empty() {
        0
    } else {
        1
    }
}
