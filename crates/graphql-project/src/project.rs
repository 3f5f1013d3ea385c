use crate::{
    node_and_type_info_at_position, range_for_node, Position, Range, Result, SchemaIndex,
    SchemaLoader, TypeInfo,
};
use apollo_parser::{cst::CstNode, Parser};
use graphql_config::{GraphQLConfig, ProjectConfig};
use graphql_extract::{extract_from_file, ExtractConfig, ExtractedGraphQL};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Name of the config extension holding extraction settings
pub const EXTRACT_EXTENSION: &str = "extract";

/// A project's schema plus the settings needed to read its documents
#[derive(Debug, Clone)]
pub struct GraphQLProject {
    config: ProjectConfig,
    base_dir: Option<PathBuf>,
    schema_index: SchemaIndex,
}

/// What sits at a position in a file, in the file's own coordinates
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocatedNode {
    /// Name of the source the node was found in
    pub source: String,
    /// Syntax kind, e.g. `FIELD`
    pub kind: String,
    /// Node text as written
    pub text: String,
    pub range: Range,
    pub context: TypeContextSummary,
}

/// The type context at a node, flattened to names for display
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TypeContextSummary {
    pub parent_type: Option<String>,
    #[serde(rename = "type")]
    pub type_: Option<String>,
    pub input_type: Option<String>,
    pub parent_input_type: Option<String>,
    pub field: Option<String>,
    pub argument: Option<String>,
    pub directive: Option<String>,
    pub enum_value: Option<String>,
}

impl From<&TypeInfo<'_>> for TypeContextSummary {
    fn from(info: &TypeInfo<'_>) -> Self {
        Self {
            parent_type: info.parent_type().map(|t| t.name.clone()),
            type_: info.current_type().map(ToString::to_string),
            input_type: info.input_type().map(ToString::to_string),
            parent_input_type: info.parent_input_type().map(ToString::to_string),
            field: info.field_def().map(|f| f.name.clone()),
            argument: info.argument().map(|a| a.name.clone()),
            directive: info.directive().map(|d| d.name.clone()),
            enum_value: info.enum_value().map(|v| v.name.clone()),
        }
    }
}

impl GraphQLProject {
    /// Create a project with only the built-in schema types
    #[must_use]
    pub fn new(config: ProjectConfig) -> Self {
        Self {
            config,
            base_dir: None,
            schema_index: SchemaIndex::new(),
        }
    }

    /// Resolve relative schema paths against `base_dir`
    #[must_use]
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(base_dir.into());
        self
    }

    /// Create projects from GraphQL config with a base directory
    #[must_use]
    pub fn from_config_with_base(config: &GraphQLConfig, base_dir: &Path) -> Vec<(String, Self)> {
        config
            .projects()
            .map(|(name, project_config)| {
                let project = Self::new(project_config.clone()).with_base_dir(base_dir);
                (name.to_string(), project)
            })
            .collect()
    }

    #[must_use]
    pub const fn config(&self) -> &ProjectConfig {
        &self.config
    }

    #[must_use]
    pub const fn schema_index(&self) -> &SchemaIndex {
        &self.schema_index
    }

    /// Replace the schema with one built from SDL text
    pub fn set_schema(&mut self, sdl: &str) {
        self.schema_index = SchemaIndex::from_schema(sdl);
    }

    /// Load the schema from configured sources
    pub async fn load_schema(&mut self) -> Result<()> {
        let mut loader = SchemaLoader::new(self.config.schema.clone());
        if let Some(base_dir) = &self.base_dir {
            loader = loader.with_base_path(base_dir);
        }

        let sdl = loader.load().await?;
        self.set_schema(&sdl);
        Ok(())
    }

    /// Extraction settings from the `extract` extension, or the defaults
    pub fn extract_config(&self) -> Result<ExtractConfig> {
        Ok(self
            .config
            .extension::<ExtractConfig>(EXTRACT_EXTENSION)?
            .unwrap_or_default())
    }

    /// Every GraphQL source in a file
    pub fn extract_file(&self, path: &Path) -> Result<Vec<ExtractedGraphQL>> {
        let config = self.extract_config()?;
        Ok(extract_from_file(path, &config)?)
    }

    /// Find the node at an editor `position` in the file at `path`
    pub fn locate_in_file(&self, path: &Path, position: Position) -> Result<Option<LocatedNode>> {
        let extracted = self.extract_file(path)?;
        Ok(self.locate_in_sources(&extracted, position))
    }

    /// Find the node at an editor `position` among the sources of one file.
    ///
    /// The first source covering the position's line is searched; the
    /// position is translated into that source's own coordinates first.
    #[must_use]
    pub fn locate_in_sources(
        &self,
        extracted: &[ExtractedGraphQL],
        position: Position,
    ) -> Option<LocatedNode> {
        let Some(source) = extracted
            .iter()
            .map(|item| &item.source)
            .find(|source| source.contains_container_position(position))
        else {
            tracing::debug!(?position, "no GraphQL source at position");
            return None;
        };

        let tree = Parser::new(&source.body).parse();
        let document = tree.document();
        let found = node_and_type_info_at_position(
            source,
            source.to_fragment(position),
            document.syntax(),
            &self.schema_index,
        )?;

        Some(LocatedNode {
            source: source.name.clone(),
            kind: format!("{:?}", found.node.kind()),
            text: found.node.text().to_string().trim().to_string(),
            range: range_for_node(source, &found.node)?,
            context: TypeContextSummary::from(&found.type_info),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphql_config::{DocumentsConfig, SchemaConfig};
    use graphql_extract::{extract_from_source, Language};
    use std::collections::BTreeMap;
    use std::fs;

    const SCHEMA: &str = "type Query { user(id: ID!): User } type User { id: ID! name: String }";

    fn project_config(extensions: BTreeMap<String, serde_json::Value>) -> ProjectConfig {
        ProjectConfig {
            schema: SchemaConfig::Path("schema.graphql".to_string()),
            documents: Some(DocumentsConfig::Pattern("src/**/*.ts".to_string())),
            extensions,
        }
    }

    #[test]
    fn test_from_single_config() {
        let config = GraphQLConfig::Single(project_config(BTreeMap::new()));

        let projects = GraphQLProject::from_config_with_base(&config, Path::new("/repo"));
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].0, "default");
        // Only built-ins until the schema is loaded
        assert!(projects[0].1.schema_index().get_type("Query").is_none());
    }

    #[test]
    fn test_extract_config_from_extension() {
        let mut extensions = BTreeMap::new();
        extensions.insert(
            EXTRACT_EXTENSION.to_string(),
            serde_json::json!({ "tagIdentifiers": ["gqlx"] }),
        );
        let project = GraphQLProject::new(project_config(extensions));

        let config = project.extract_config().unwrap();
        assert_eq!(config.tag_identifiers, vec!["gqlx"]);
        assert_eq!(config.magic_comment, ExtractConfig::default().magic_comment);

        let project = GraphQLProject::new(project_config(BTreeMap::new()));
        assert_eq!(project.extract_config().unwrap(), ExtractConfig::default());
    }

    #[test]
    fn test_locate_in_embedded_source() {
        let mut project = GraphQLProject::new(project_config(BTreeMap::new()));
        project.set_schema(SCHEMA);

        let text = "import { gql } from 'graphql-tag';\n\nconst QUERY = gql`\nquery {\n  user(id: 1) {\n    name\n  }\n}\n`;\n";
        let extracted =
            extract_from_source(text, "app.ts", Language::TypeScript, &ExtractConfig::default())
                .unwrap();

        // Line 5 of the file is "    name"
        let located = project
            .locate_in_sources(&extracted, Position::new(5, 5))
            .unwrap();

        assert_eq!(located.source, "app.ts");
        assert_eq!(located.kind, "FIELD");
        assert_eq!(located.text, "name");
        assert_eq!(located.range.start, Position::new(5, 4));
        assert_eq!(located.context.parent_type.as_deref(), Some("User"));
        assert_eq!(located.context.field.as_deref(), Some("name"));
        assert_eq!(located.context.type_.as_deref(), Some("String"));

        // Outside every template
        assert!(project
            .locate_in_sources(&extracted, Position::new(0, 3))
            .is_none());
    }

    #[tokio::test]
    async fn test_load_schema_and_locate_in_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join("schema.graphql"), SCHEMA).unwrap();
        let query_path = temp_dir.path().join("query.graphql");
        fs::write(&query_path, "{ user(id: 1) { id } }").unwrap();

        let mut project =
            GraphQLProject::new(project_config(BTreeMap::new())).with_base_dir(temp_dir.path());
        project.load_schema().await.unwrap();

        let located = project
            .locate_in_file(&query_path, Position::new(0, 8))
            .unwrap()
            .unwrap();
        assert_eq!(located.kind, "ARGUMENT");
        assert_eq!(located.context.argument.as_deref(), Some("id"));
        assert_eq!(located.context.input_type.as_deref(), Some("ID!"));
    }
}
