mod error;
mod index;
mod line_index;
mod locate;
mod project;
mod schema;
mod syntax;
mod type_info;
mod visit;

pub use error::{ProjectError, Result};
pub use index::{
    DirectiveDefinition, EnumValueDefinition, FieldDefinition, InputValueDefinition,
    OperationType, SchemaIndex, TypeDefinition, TypeKind, TypeRef,
};
pub use line_index::{offset_to_position, position_to_offset, LineIndex};
pub use locate::{
    locate, node_and_type_info_at_position, range_for_node, NodeAtPosition, NodeLocator,
};
pub use project::{GraphQLProject, LocatedNode, TypeContextSummary, EXTRACT_EXTENSION};
pub use schema::SchemaLoader;
pub use syntax::{Span, SyntaxTreeNode};
pub use type_info::TypeInfo;
pub use visit::{
    walk, TypeContext, TypeInfoVisitor, VisitAction, Visitor, WalkOutcome, WithTypeInfo,
};

// Re-export common types from dependencies
pub use graphql_config::{GraphQLConfig, ProjectConfig};
pub use graphql_extract::{LocationOffset, Position, Range, Source};
