use apollo_parser::cst::{self, CstNode};
use apollo_parser::Parser;
use std::collections::HashMap;
use std::fmt;

/// Built-in scalars and directives every schema has
const BUILTIN_SDL: &str = r#"
scalar Int
scalar Float
scalar String
scalar Boolean
scalar ID

directive @skip(if: Boolean!) on FIELD | FRAGMENT_SPREAD | INLINE_FRAGMENT
directive @include(if: Boolean!) on FIELD | FRAGMENT_SPREAD | INLINE_FRAGMENT
directive @deprecated(reason: String = "No longer supported") on FIELD_DEFINITION | ARGUMENT_DEFINITION | INPUT_FIELD_DEFINITION | ENUM_VALUE
directive @specifiedBy(url: String!) on SCALAR
"#;

/// Index of schema types, fields and directives for fast lookups
#[derive(Debug, Clone)]
pub struct SchemaIndex {
    /// Type definitions (name -> definition), extensions already merged
    types: HashMap<String, TypeDefinition>,

    /// Directive definitions (name without `@` -> definition)
    directives: HashMap<String, DirectiveDefinition>,

    /// Explicit root operation types from `schema { ... }` or `extend schema`
    roots: HashMap<OperationType, String>,

    /// Introspection fields available on every selection
    meta_fields: MetaFields,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationType {
    Query,
    Mutation,
    Subscription,
}

impl OperationType {
    /// Name of the root type used when the schema does not declare one
    #[must_use]
    pub const fn default_type_name(self) -> &'static str {
        match self {
            Self::Query => "Query",
            Self::Mutation => "Mutation",
            Self::Subscription => "Subscription",
        }
    }

    pub(crate) fn from_cst(operation_type: &cst::OperationType) -> Option<Self> {
        if operation_type.query_token().is_some() {
            Some(Self::Query)
        } else if operation_type.mutation_token().is_some() {
            Some(Self::Mutation)
        } else if operation_type.subscription_token().is_some() {
            Some(Self::Subscription)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDefinition {
    pub name: String,
    pub kind: TypeKind,
    pub description: Option<String>,
    /// Output fields of objects and interfaces
    pub fields: Vec<FieldDefinition>,
    /// Fields of input objects
    pub input_fields: Vec<InputValueDefinition>,
    pub enum_values: Vec<EnumValueDefinition>,
    pub implements: Vec<String>,
    pub union_members: Vec<String>,
}

impl TypeDefinition {
    fn new(name: String, kind: TypeKind, description: Option<String>) -> Self {
        Self {
            name,
            kind,
            description,
            fields: Vec::new(),
            input_fields: Vec::new(),
            enum_values: Vec::new(),
            implements: Vec::new(),
            union_members: Vec::new(),
        }
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|field| field.name == name)
    }

    #[must_use]
    pub fn input_field(&self, name: &str) -> Option<&InputValueDefinition> {
        self.input_fields.iter().find(|field| field.name == name)
    }

    #[must_use]
    pub fn enum_value(&self, name: &str) -> Option<&EnumValueDefinition> {
        self.enum_values.iter().find(|value| value.name == name)
    }

    fn merge(&mut self, other: Self) {
        if self.description.is_none() {
            self.description = other.description;
        }
        self.fields.extend(other.fields);
        self.input_fields.extend(other.input_fields);
        self.enum_values.extend(other.enum_values);
        self.implements.extend(other.implements);
        self.union_members.extend(other.union_members);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Object,
    Interface,
    Union,
    Enum,
    InputObject,
    Scalar,
}

impl TypeKind {
    /// Types that have selection sets
    #[must_use]
    pub const fn is_composite(self) -> bool {
        matches!(self, Self::Object | Self::Interface | Self::Union)
    }

    /// Types allowed as argument and variable types
    #[must_use]
    pub const fn is_input(self) -> bool {
        matches!(self, Self::Scalar | Self::Enum | Self::InputObject)
    }

    /// Types allowed as field types
    #[must_use]
    pub const fn is_output(self) -> bool {
        !matches!(self, Self::InputObject)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDefinition {
    pub name: String,
    pub ty: TypeRef,
    pub arguments: Vec<InputValueDefinition>,
    pub description: Option<String>,
}

impl FieldDefinition {
    #[must_use]
    pub fn argument(&self, name: &str) -> Option<&InputValueDefinition> {
        self.arguments.iter().find(|arg| arg.name == name)
    }
}

/// An argument or input object field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputValueDefinition {
    pub name: String,
    pub ty: TypeRef,
    pub default_value: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValueDefinition {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveDefinition {
    pub name: String,
    pub arguments: Vec<InputValueDefinition>,
    /// Locations as written, e.g. `FIELD`, `FRAGMENT_SPREAD`
    pub locations: Vec<String>,
    pub description: Option<String>,
}

impl DirectiveDefinition {
    #[must_use]
    pub fn argument(&self, name: &str) -> Option<&InputValueDefinition> {
        self.arguments.iter().find(|arg| arg.name == name)
    }
}

/// Reference to a type, with list and non-null wrappers
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Named(String),
    List(Box<TypeRef>),
    NonNull(Box<TypeRef>),
}

impl TypeRef {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    #[must_use]
    pub fn list(inner: Self) -> Self {
        Self::List(Box::new(inner))
    }

    #[must_use]
    pub fn non_null(inner: Self) -> Self {
        Self::NonNull(Box::new(inner))
    }

    /// The innermost type name, with all wrappers removed
    #[must_use]
    pub fn named_type(&self) -> &str {
        match self {
            Self::Named(name) => name,
            Self::List(inner) | Self::NonNull(inner) => inner.named_type(),
        }
    }

    /// The type with an outer non-null wrapper removed
    #[must_use]
    pub fn nullable(&self) -> &Self {
        match self {
            Self::NonNull(inner) => inner,
            other => other,
        }
    }

    /// Item type of a (possibly non-null) list, `None` for other types
    #[must_use]
    pub fn item_type(&self) -> Option<&Self> {
        match self.nullable() {
            Self::List(inner) => Some(inner),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_non_null(&self) -> bool {
        matches!(self, Self::NonNull(_))
    }

    pub(crate) fn from_cst(ty: &cst::Type) -> Option<Self> {
        match ty {
            cst::Type::NamedType(named) => Some(Self::named(named.name()?.text().as_str())),
            cst::Type::ListType(list) => Some(Self::list(Self::from_cst(&list.ty()?)?)),
            cst::Type::NonNullType(non_null) => {
                // NonNullType wraps either a NamedType or a ListType
                let inner = if let Some(named) = non_null.named_type() {
                    Self::named(named.name()?.text().as_str())
                } else {
                    Self::list(Self::from_cst(&non_null.list_type()?.ty()?)?)
                };
                Some(Self::non_null(inner))
            }
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => write!(f, "{name}"),
            Self::List(inner) => write!(f, "[{inner}]"),
            Self::NonNull(inner) => write!(f, "{inner}!"),
        }
    }
}

#[derive(Debug, Clone)]
struct MetaFields {
    typename: FieldDefinition,
    schema: FieldDefinition,
    type_: FieldDefinition,
}

impl MetaFields {
    fn new() -> Self {
        let meta = |name: &str, ty: TypeRef, arguments| FieldDefinition {
            name: name.to_string(),
            ty,
            arguments,
            description: None,
        };

        Self {
            typename: meta(
                "__typename",
                TypeRef::non_null(TypeRef::named("String")),
                Vec::new(),
            ),
            schema: meta(
                "__schema",
                TypeRef::non_null(TypeRef::named("__Schema")),
                Vec::new(),
            ),
            type_: meta(
                "__type",
                TypeRef::named("__Type"),
                vec![InputValueDefinition {
                    name: "name".to_string(),
                    ty: TypeRef::non_null(TypeRef::named("String")),
                    default_value: None,
                    description: None,
                }],
            ),
        }
    }
}

impl Default for SchemaIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaIndex {
    /// An index holding only the built-in scalars and directives
    #[must_use]
    pub fn new() -> Self {
        let mut index = Self {
            types: HashMap::new(),
            directives: HashMap::new(),
            roots: HashMap::new(),
            meta_fields: MetaFields::new(),
        };
        index.add_sdl(BUILTIN_SDL);
        index
    }

    /// Build index from schema string.
    ///
    /// Syntax errors are logged and skipped; whatever definitions parse are
    /// still indexed.
    #[must_use]
    pub fn from_schema(schema: &str) -> Self {
        let mut index = Self::new();
        index.add_sdl(schema);
        tracing::debug!(
            types = index.types.len(),
            directives = index.directives.len(),
            "built schema index"
        );
        index
    }

    /// Get a type by name
    #[must_use]
    pub fn get_type(&self, name: &str) -> Option<&TypeDefinition> {
        self.types.get(name)
    }

    /// Get fields for a type
    #[must_use]
    pub fn get_fields(&self, type_name: &str) -> Option<&[FieldDefinition]> {
        self.types
            .get(type_name)
            .map(|type_def| type_def.fields.as_slice())
    }

    /// Get a directive by name, without the leading `@`
    #[must_use]
    pub fn get_directive(&self, name: &str) -> Option<&DirectiveDefinition> {
        self.directives.get(name)
    }

    /// The root type for an operation: the declared one, or the conventional
    /// name when the schema has no `schema` definition for it
    #[must_use]
    pub fn root_type(&self, operation: OperationType) -> Option<&TypeDefinition> {
        let name = self
            .roots
            .get(&operation)
            .map_or(operation.default_type_name(), String::as_str);
        self.get_type(name)
    }

    /// Look up a field selected on `parent`, including the introspection
    /// meta fields `__typename`, `__schema` and `__type`
    #[must_use]
    pub fn field_definition<'a>(
        &'a self,
        parent: &'a TypeDefinition,
        name: &str,
    ) -> Option<&'a FieldDefinition> {
        match name {
            "__typename" if parent.kind.is_composite() => Some(&self.meta_fields.typename),
            "__schema" | "__type" if self.is_query_root(parent) => {
                if name == "__schema" {
                    Some(&self.meta_fields.schema)
                } else {
                    Some(&self.meta_fields.type_)
                }
            }
            _ => parent.field(name),
        }
    }

    /// All type definitions, in no particular order
    pub fn types(&self) -> impl Iterator<Item = &TypeDefinition> {
        self.types.values()
    }

    fn is_query_root(&self, type_def: &TypeDefinition) -> bool {
        self.root_type(OperationType::Query)
            .is_some_and(|root| root.name == type_def.name)
    }

    fn add_sdl(&mut self, sdl: &str) {
        let tree = Parser::new(sdl).parse();
        for error in tree.errors() {
            tracing::warn!("Schema syntax error: {}", error.message());
        }

        for definition in tree.document().definitions() {
            self.add_definition(&definition);
        }
    }

    fn add_definition(&mut self, definition: &cst::Definition) {
        match definition {
            cst::Definition::SchemaDefinition(schema) => {
                self.add_roots(schema.root_operation_type_definitions());
            }
            cst::Definition::SchemaExtension(ext) => {
                self.add_roots(ext.root_operation_type_definitions());
            }
            cst::Definition::DirectiveDefinition(directive) => {
                if let Some(directive) = directive_definition(directive) {
                    self.directives.insert(directive.name.clone(), directive);
                }
            }
            cst::Definition::ObjectTypeDefinition(obj) => {
                self.add_type(object_type(obj));
            }
            cst::Definition::ObjectTypeExtension(ext) => {
                self.add_type(object_type_extension(ext));
            }
            cst::Definition::InterfaceTypeDefinition(iface) => {
                self.add_type(interface_type(iface));
            }
            cst::Definition::InterfaceTypeExtension(ext) => {
                self.add_type(interface_type_extension(ext));
            }
            cst::Definition::UnionTypeDefinition(union) => {
                self.add_type(union_type(union));
            }
            cst::Definition::UnionTypeExtension(ext) => {
                self.add_type(union_type_extension(ext));
            }
            cst::Definition::EnumTypeDefinition(enum_def) => {
                self.add_type(enum_type(enum_def));
            }
            cst::Definition::EnumTypeExtension(ext) => {
                self.add_type(enum_type_extension(ext));
            }
            cst::Definition::InputObjectTypeDefinition(input) => {
                self.add_type(input_object_type(input));
            }
            cst::Definition::InputObjectTypeExtension(ext) => {
                self.add_type(input_object_type_extension(ext));
            }
            cst::Definition::ScalarTypeDefinition(scalar) => {
                self.add_type(scalar_type(scalar));
            }
            cst::Definition::ScalarTypeExtension(ext) => {
                let name = ext.name().map(|name| name.text().to_string());
                self.add_type(name.map(|name| TypeDefinition::new(name, TypeKind::Scalar, None)));
            }
            cst::Definition::OperationDefinition(_) | cst::Definition::FragmentDefinition(_) => {
                tracing::trace!("Ignoring executable definition in schema");
            }
        }
    }

    fn add_roots(&mut self, roots: impl Iterator<Item = cst::RootOperationTypeDefinition>) {
        for root in roots {
            let operation = root
                .operation_type()
                .as_ref()
                .and_then(OperationType::from_cst);
            let type_name = root
                .named_type()
                .and_then(|named| named.name())
                .map(|name| name.text().to_string());
            if let (Some(operation), Some(type_name)) = (operation, type_name) {
                self.roots.insert(operation, type_name);
            }
        }
    }

    /// Insert a definition, merging it into an existing one of the same name
    fn add_type(&mut self, type_def: Option<TypeDefinition>) {
        let Some(type_def) = type_def else {
            return;
        };

        match self.types.get_mut(&type_def.name) {
            Some(existing) => existing.merge(type_def),
            None => {
                self.types.insert(type_def.name.clone(), type_def);
            }
        }
    }
}

fn description(description: Option<cst::Description>) -> Option<String> {
    description.map(|d| d.syntax().text().to_string().trim_matches('"').trim().to_string())
}

fn named_types(named: impl Iterator<Item = cst::NamedType>) -> Vec<String> {
    named
        .filter_map(|named| named.name())
        .map(|name| name.text().to_string())
        .collect()
}

fn object_type(obj: &cst::ObjectTypeDefinition) -> Option<TypeDefinition> {
    let mut type_def = TypeDefinition::new(
        obj.name()?.text().to_string(),
        TypeKind::Object,
        description(obj.description()),
    );
    type_def.fields = fields(obj.fields_definition());
    if let Some(implements) = obj.implements_interfaces() {
        type_def.implements = named_types(implements.named_types());
    }
    Some(type_def)
}

fn object_type_extension(ext: &cst::ObjectTypeExtension) -> Option<TypeDefinition> {
    let mut type_def =
        TypeDefinition::new(ext.name()?.text().to_string(), TypeKind::Object, None);
    type_def.fields = fields(ext.fields_definition());
    if let Some(implements) = ext.implements_interfaces() {
        type_def.implements = named_types(implements.named_types());
    }
    Some(type_def)
}

fn interface_type(iface: &cst::InterfaceTypeDefinition) -> Option<TypeDefinition> {
    let mut type_def = TypeDefinition::new(
        iface.name()?.text().to_string(),
        TypeKind::Interface,
        description(iface.description()),
    );
    type_def.fields = fields(iface.fields_definition());
    if let Some(implements) = iface.implements_interfaces() {
        type_def.implements = named_types(implements.named_types());
    }
    Some(type_def)
}

fn interface_type_extension(ext: &cst::InterfaceTypeExtension) -> Option<TypeDefinition> {
    let mut type_def =
        TypeDefinition::new(ext.name()?.text().to_string(), TypeKind::Interface, None);
    type_def.fields = fields(ext.fields_definition());
    if let Some(implements) = ext.implements_interfaces() {
        type_def.implements = named_types(implements.named_types());
    }
    Some(type_def)
}

fn union_type(union: &cst::UnionTypeDefinition) -> Option<TypeDefinition> {
    let mut type_def = TypeDefinition::new(
        union.name()?.text().to_string(),
        TypeKind::Union,
        description(union.description()),
    );
    if let Some(members) = union.union_member_types() {
        type_def.union_members = named_types(members.named_types());
    }
    Some(type_def)
}

fn union_type_extension(ext: &cst::UnionTypeExtension) -> Option<TypeDefinition> {
    let mut type_def = TypeDefinition::new(ext.name()?.text().to_string(), TypeKind::Union, None);
    if let Some(members) = ext.union_member_types() {
        type_def.union_members = named_types(members.named_types());
    }
    Some(type_def)
}

fn enum_type(enum_def: &cst::EnumTypeDefinition) -> Option<TypeDefinition> {
    let mut type_def = TypeDefinition::new(
        enum_def.name()?.text().to_string(),
        TypeKind::Enum,
        description(enum_def.description()),
    );
    type_def.enum_values = enum_values(enum_def.enum_values_definition());
    Some(type_def)
}

fn enum_type_extension(ext: &cst::EnumTypeExtension) -> Option<TypeDefinition> {
    let mut type_def = TypeDefinition::new(ext.name()?.text().to_string(), TypeKind::Enum, None);
    type_def.enum_values = enum_values(ext.enum_values_definition());
    Some(type_def)
}

fn input_object_type(input: &cst::InputObjectTypeDefinition) -> Option<TypeDefinition> {
    let mut type_def = TypeDefinition::new(
        input.name()?.text().to_string(),
        TypeKind::InputObject,
        description(input.description()),
    );
    if let Some(fields) = input.input_fields_definition() {
        type_def.input_fields = input_values(fields.input_value_definitions());
    }
    Some(type_def)
}

fn input_object_type_extension(ext: &cst::InputObjectTypeExtension) -> Option<TypeDefinition> {
    let mut type_def =
        TypeDefinition::new(ext.name()?.text().to_string(), TypeKind::InputObject, None);
    if let Some(fields) = ext.input_fields_definition() {
        type_def.input_fields = input_values(fields.input_value_definitions());
    }
    Some(type_def)
}

fn scalar_type(scalar: &cst::ScalarTypeDefinition) -> Option<TypeDefinition> {
    Some(TypeDefinition::new(
        scalar.name()?.text().to_string(),
        TypeKind::Scalar,
        description(scalar.description()),
    ))
}

fn fields(fields: Option<cst::FieldsDefinition>) -> Vec<FieldDefinition> {
    fields
        .into_iter()
        .flat_map(|fields| fields.field_definitions())
        .filter_map(|field| field_definition(&field))
        .collect()
}

fn field_definition(field: &cst::FieldDefinition) -> Option<FieldDefinition> {
    let arguments = field
        .arguments_definition()
        .map(|args| input_values(args.input_value_definitions()))
        .unwrap_or_default();

    Some(FieldDefinition {
        name: field.name()?.text().to_string(),
        ty: TypeRef::from_cst(&field.ty()?)?,
        arguments,
        description: description(field.description()),
    })
}

fn input_values(values: impl Iterator<Item = cst::InputValueDefinition>) -> Vec<InputValueDefinition> {
    values
        .filter_map(|value| {
            Some(InputValueDefinition {
                name: value.name()?.text().to_string(),
                ty: TypeRef::from_cst(&value.ty()?)?,
                default_value: value
                    .default_value()
                    .and_then(|v| v.value().map(|val| val.syntax().text().to_string())),
                description: description(value.description()),
            })
        })
        .collect()
}

fn enum_values(values: Option<cst::EnumValuesDefinition>) -> Vec<EnumValueDefinition> {
    values
        .into_iter()
        .flat_map(|values| values.enum_value_definitions())
        .filter_map(|value| {
            Some(EnumValueDefinition {
                name: value.enum_value()?.name()?.text().to_string(),
                description: description(value.description()),
            })
        })
        .collect()
}

fn directive_definition(directive: &cst::DirectiveDefinition) -> Option<DirectiveDefinition> {
    let arguments = directive
        .arguments_definition()
        .map(|args| input_values(args.input_value_definitions()))
        .unwrap_or_default();
    let locations = directive
        .directive_locations()
        .map(|locations| {
            locations
                .syntax()
                .text()
                .to_string()
                .split('|')
                .map(str::trim)
                .filter(|location| !location.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    Some(DirectiveDefinition {
        name: directive.name()?.text().to_string(),
        arguments,
        locations,
        description: description(directive.description()),
    })
}
