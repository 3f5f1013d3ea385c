use crate::{ProjectError, Result};
use graphql_config::SchemaConfig;
use std::path::{Path, PathBuf};

/// Schema loader for loading GraphQL schemas from local files
pub struct SchemaLoader {
    config: SchemaConfig,
    base_path: Option<PathBuf>,
}

impl SchemaLoader {
    #[must_use]
    pub const fn new(config: SchemaConfig) -> Self {
        Self {
            config,
            base_path: None,
        }
    }

    #[must_use]
    pub fn with_base_path(mut self, path: impl AsRef<Path>) -> Self {
        self.base_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Load every configured schema file and join them into one SDL string.
    ///
    /// Each entry may be a glob pattern; all matches are read in path order.
    pub async fn load(&self) -> Result<String> {
        let mut schema_parts = Vec::new();

        for path in self.config.paths() {
            if path.starts_with("http://") || path.starts_with("https://") {
                return Err(ProjectError::SchemaLoad(format!(
                    "Remote schemas are not supported: {path}"
                )));
            }

            for file in self.resolve(path)? {
                tracing::debug!("Loading schema file {}", file.display());
                schema_parts.push(tokio::fs::read_to_string(&file).await?);
            }
        }

        if schema_parts.is_empty() {
            return Err(ProjectError::SchemaLoad(
                "No schema files found".to_string(),
            ));
        }

        Ok(schema_parts.join("\n\n"))
    }

    /// Expand a configured path into the files it matches
    fn resolve(&self, pattern: &str) -> Result<Vec<PathBuf>> {
        let pattern = self.base_path.as_ref().map_or_else(
            || pattern.to_string(),
            |base| base.join(pattern).display().to_string(),
        );

        let paths = glob::glob(&pattern).map_err(|e| {
            ProjectError::SchemaLoad(format!("Invalid glob pattern '{pattern}': {e}"))
        })?;

        let mut files = paths
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| ProjectError::SchemaLoad(format!("Glob error: {e}")))?;

        if files.is_empty() {
            return Err(ProjectError::SchemaLoad(format!(
                "No files matched pattern: {pattern}"
            )));
        }

        files.sort();
        Ok(files)
    }
}
