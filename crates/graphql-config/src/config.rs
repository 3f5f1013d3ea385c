use crate::{ConfigError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Name given to the project of a single-project config
pub const DEFAULT_PROJECT: &str = "default";

/// Top-level GraphQL configuration.
/// Either a single project or multiple named projects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GraphQLConfig {
    /// Multi-project configuration
    Multi {
        projects: BTreeMap<String, ProjectConfig>,
    },
    /// Single project configuration
    Single(ProjectConfig),
}

impl GraphQLConfig {
    /// All projects in name order.
    /// A single-project config yields one project named [`DEFAULT_PROJECT`].
    pub fn projects(&self) -> Box<dyn Iterator<Item = (&str, &ProjectConfig)> + '_> {
        match self {
            Self::Single(config) => Box::new(std::iter::once((DEFAULT_PROJECT, config))),
            Self::Multi { projects } => {
                Box::new(projects.iter().map(|(name, config)| (name.as_str(), config)))
            }
        }
    }

    #[must_use]
    pub fn get_project(&self, name: &str) -> Option<&ProjectConfig> {
        match self {
            Self::Single(config) => (name == DEFAULT_PROJECT).then_some(config),
            Self::Multi { projects } => projects.get(name),
        }
    }

    /// The project whose document patterns match `path`, falling back to the
    /// first project when none claims it
    #[must_use]
    pub fn project_for_file(&self, path: &Path, base_dir: &Path) -> Option<(&str, &ProjectConfig)> {
        self.projects()
            .find(|(_, project)| {
                project
                    .documents
                    .as_ref()
                    .is_some_and(|documents| documents.matches(path, base_dir))
            })
            .or_else(|| self.projects().next())
    }

    #[must_use]
    pub const fn is_multi_project(&self) -> bool {
        matches!(self, Self::Multi { .. })
    }
}

/// Configuration for a single GraphQL project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    /// Schema source(s)
    pub schema: SchemaConfig,

    /// Document patterns (queries, mutations, fragments)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documents: Option<DocumentsConfig>,

    /// Tool-specific extensions
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extensions: BTreeMap<String, serde_json::Value>,
}

impl ProjectConfig {
    /// Deserialize the extension stored under `name`, if present
    pub fn extension<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        self.extensions
            .get(name)
            .map(|value| {
                serde_json::from_value(value.clone()).map_err(|source| ConfigError::Extension {
                    name: name.to_string(),
                    source,
                })
            })
            .transpose()
    }
}

/// Schema source configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaConfig {
    /// Single file path or glob pattern
    Path(String),
    /// Multiple file paths or glob patterns
    Paths(Vec<String>),
}

impl SchemaConfig {
    #[must_use]
    pub fn paths(&self) -> Vec<&str> {
        match self {
            Self::Path(path) => vec![path.as_str()],
            Self::Paths(paths) => paths.iter().map(String::as_str).collect(),
        }
    }
}

/// Documents source configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocumentsConfig {
    /// Single pattern
    Pattern(String),
    /// Multiple patterns
    Patterns(Vec<String>),
}

impl DocumentsConfig {
    #[must_use]
    pub fn patterns(&self) -> Vec<&str> {
        match self {
            Self::Pattern(pattern) => vec![pattern.as_str()],
            Self::Patterns(patterns) => patterns.iter().map(String::as_str).collect(),
        }
    }

    /// Whether `path` matches one of the patterns, which are relative to `base_dir`
    #[must_use]
    pub fn matches(&self, path: &Path, base_dir: &Path) -> bool {
        let relative = path.strip_prefix(base_dir).unwrap_or(path);
        self.patterns()
            .into_iter()
            .flat_map(expand_braces)
            .any(|pattern| {
                glob::Pattern::new(&pattern).map_or_else(
                    |e| {
                        tracing::warn!("Ignoring invalid document pattern '{pattern}': {e}");
                        false
                    },
                    |compiled| compiled.matches_path(relative),
                )
            })
    }
}

/// Expand a single brace group like `**/*.{ts,tsx}`, which glob does not support
fn expand_braces(pattern: &str) -> Vec<String> {
    if let (Some(start), Some(end)) = (pattern.find('{'), pattern.find('}')) {
        if start < end {
            let (before, after) = (&pattern[..start], &pattern[end + 1..]);
            return pattern[start + 1..end]
                .split(',')
                .map(|option| format!("{before}{option}{after}"))
                .collect();
        }
    }

    vec![pattern.to_string()]
}
