use crate::{ConfigError, GraphQLConfig, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Config file names to search for, in order of preference
const CONFIG_FILES: &[&str] = &[
    ".graphqlrc.yml",
    ".graphqlrc.yaml",
    ".graphqlrc.json",
    ".graphqlrc",
    "graphql.config.yml",
    "graphql.config.yaml",
    "graphql.config.json",
];

/// Find a GraphQL config file by walking up the directory tree from `start_dir`.
pub fn find_config(start_dir: &Path) -> Result<Option<PathBuf>> {
    for dir in start_dir.ancestors() {
        for file_name in CONFIG_FILES {
            let config_path = dir.join(file_name);
            if config_path.is_file() {
                tracing::debug!("Found GraphQL config at {}", config_path.display());
                return Ok(Some(config_path));
            }
        }
    }

    Ok(None)
}

/// Load a GraphQL config from the specified path.
/// The format is chosen from the file extension.
pub fn load_config(path: &Path) -> Result<GraphQLConfig> {
    let contents = fs::read_to_string(path)?;
    load_config_from_str(&contents, path)
}

/// Load a GraphQL config from a string.
/// The path is used for error messages and format detection.
pub fn load_config_from_str(contents: &str, path: &Path) -> Result<GraphQLConfig> {
    let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");
    let file_name = path.file_name().and_then(|name| name.to_str()).unwrap_or("");

    let config = match extension {
        "yml" | "yaml" => parse_yaml(contents, path)?,
        "json" => parse_json(contents, path)?,
        // .graphqlrc without extension - YAML is a superset of JSON
        "" if file_name == ".graphqlrc" => parse_yaml(contents, path)?,
        _ => return Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
    };

    validate_config(&config, path)?;

    Ok(config)
}

fn parse_yaml(contents: &str, path: &Path) -> Result<GraphQLConfig> {
    serde_yaml::from_str(contents).map_err(|e| invalid(path, format!("YAML parse error: {e}")))
}

fn parse_json(contents: &str, path: &Path) -> Result<GraphQLConfig> {
    serde_json::from_str(contents).map_err(|e| invalid(path, format!("JSON parse error: {e}")))
}

fn invalid(path: &Path, message: String) -> ConfigError {
    ConfigError::Invalid {
        path: path.to_path_buf(),
        message,
    }
}

/// Reject projects with no schema or blank schema/document entries
fn validate_config(config: &GraphQLConfig, path: &Path) -> Result<()> {
    for (name, project) in config.projects() {
        let schema_paths = project.schema.paths();
        if schema_paths.is_empty() {
            return Err(invalid(
                path,
                format!("Project '{name}' has empty schema configuration"),
            ));
        }
        if schema_paths.iter().any(|p| p.trim().is_empty()) {
            return Err(invalid(path, format!("Project '{name}' has empty schema path")));
        }

        if let Some(documents) = &project.documents {
            if documents.patterns().iter().any(|p| p.trim().is_empty()) {
                return Err(invalid(
                    path,
                    format!("Project '{name}' has empty document pattern"),
                ));
            }
        }
    }

    Ok(())
}
