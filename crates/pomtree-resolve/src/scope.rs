use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Dependency scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Compile,
    Provided,
    Runtime,
    Test,
    System,
    Import,
}

impl Scope {
    pub fn as_str(self) -> &'static str {
        match self {
            Scope::Compile => "compile",
            Scope::Provided => "provided",
            Scope::Runtime => "runtime",
            Scope::Test => "test",
            Scope::System => "system",
            Scope::Import => "import",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown dependency scope `{0}`")]
pub struct UnknownScope(pub String);

impl FromStr for Scope {
    type Err = UnknownScope;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "compile" => Ok(Scope::Compile),
            "provided" => Ok(Scope::Provided),
            "runtime" => Ok(Scope::Runtime),
            "test" => Ok(Scope::Test),
            "system" => Ok(Scope::System),
            "import" => Ok(Scope::Import),
            other => Err(UnknownScope(other.to_string())),
        }
    }
}

/// Scope of a transitive dependency, or `None` when it is left out of the graph.
///
/// `declared` is the scope of the dependency being walked, `child` the scope its
/// manifest declares for the transitive dependency (absent means `compile`).
///
/// | declared \ child | compile  | provided | runtime  | test |
/// |------------------|----------|----------|----------|------|
/// | compile          | compile  | -        | runtime  | -    |
/// | provided         | provided | -        | provided | -    |
/// | runtime          | runtime  | -        | runtime  | -    |
/// | test             | test     | -        | compile  | -    |
///
/// `test` x `runtime` yields `compile` rather than `test`; existing reports depend on it.
/// `system` and `import` never propagate.
pub fn effective_scope(declared: Scope, child: Option<Scope>) -> Option<Scope> {
    let child = child.unwrap_or(Scope::Compile);
    match (declared, child) {
        (_, Scope::Provided | Scope::Test | Scope::System | Scope::Import) => None,
        (Scope::System | Scope::Import, _) => None,
        (Scope::Compile, Scope::Compile) => Some(Scope::Compile),
        (Scope::Compile, Scope::Runtime) => Some(Scope::Runtime),
        (Scope::Provided, Scope::Compile | Scope::Runtime) => Some(Scope::Provided),
        (Scope::Runtime, Scope::Compile | Scope::Runtime) => Some(Scope::Runtime),
        (Scope::Test, Scope::Compile) => Some(Scope::Test),
        (Scope::Test, Scope::Runtime) => Some(Scope::Compile),
    }
}
