use crate::index::{
    DirectiveDefinition, EnumValueDefinition, FieldDefinition, InputValueDefinition,
    OperationType, SchemaIndex, TypeDefinition, TypeKind, TypeRef,
};
use crate::TypeContext;
use apollo_parser::cst::{self, CstNode};
use apollo_parser::{SyntaxKind, SyntaxNode};

/// Schema type context for a walk over an executable document.
///
/// Entering a node pushes what the schema says applies at that node and
/// leaving it pops the same entries, so between the two the accessors
/// describe that node. Node kinds with no type rules leave the context
/// untouched.
#[derive(Debug, Clone)]
pub struct TypeInfo<'a> {
    schema: &'a SchemaIndex,
    /// Enclosing composite types, one per selection set
    parent_type_stack: Vec<Option<&'a TypeDefinition>>,
    /// Output types of operations, fragments and fields
    type_stack: Vec<Option<TypeRef>>,
    /// Expected types of variables, arguments, list items and object fields
    input_type_stack: Vec<Option<TypeRef>>,
    field_def_stack: Vec<Option<&'a FieldDefinition>>,
    directive: Option<&'a DirectiveDefinition>,
    argument: Option<&'a InputValueDefinition>,
    enum_value: Option<&'a EnumValueDefinition>,
    depth: usize,
}

impl<'a> TypeInfo<'a> {
    #[must_use]
    pub const fn new(schema: &'a SchemaIndex) -> Self {
        Self {
            schema,
            parent_type_stack: Vec::new(),
            type_stack: Vec::new(),
            input_type_stack: Vec::new(),
            field_def_stack: Vec::new(),
            directive: None,
            argument: None,
            enum_value: None,
            depth: 0,
        }
    }

    #[must_use]
    pub const fn schema(&self) -> &'a SchemaIndex {
        self.schema
    }

    /// The composite type whose selection set encloses the current node
    #[must_use]
    pub fn parent_type(&self) -> Option<&'a TypeDefinition> {
        self.parent_type_stack.last().copied().flatten()
    }

    /// Output type of the current operation, fragment or field
    #[must_use]
    pub fn current_type(&self) -> Option<&TypeRef> {
        self.type_stack.last().and_then(Option::as_ref)
    }

    /// Expected type of the current input value
    #[must_use]
    pub fn input_type(&self) -> Option<&TypeRef> {
        self.input_type_stack.last().and_then(Option::as_ref)
    }

    /// Expected type of the input value enclosing the current one
    #[must_use]
    pub fn parent_input_type(&self) -> Option<&TypeRef> {
        let len = self.input_type_stack.len();
        len.checked_sub(2)
            .and_then(|i| self.input_type_stack[i].as_ref())
    }

    #[must_use]
    pub fn field_def(&self) -> Option<&'a FieldDefinition> {
        self.field_def_stack.last().copied().flatten()
    }

    #[must_use]
    pub const fn directive(&self) -> Option<&'a DirectiveDefinition> {
        self.directive
    }

    #[must_use]
    pub const fn argument(&self) -> Option<&'a InputValueDefinition> {
        self.argument
    }

    #[must_use]
    pub const fn enum_value(&self) -> Option<&'a EnumValueDefinition> {
        self.enum_value
    }

    /// Number of nodes currently entered
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Definition of the named type at the core of `ty`
    fn named_definition(&self, ty: Option<&TypeRef>) -> Option<&'a TypeDefinition> {
        ty.and_then(|ty| self.schema.get_type(ty.named_type()))
    }

    /// `ty` if it names an output type known to the schema
    fn output_type(&self, ty: Option<TypeRef>) -> Option<TypeRef> {
        ty.filter(|ty| {
            self.schema
                .get_type(ty.named_type())
                .is_some_and(|type_def| type_def.kind.is_output())
        })
    }

    /// `ty` if it names an input type known to the schema
    fn checked_input_type(&self, ty: Option<TypeRef>) -> Option<TypeRef> {
        ty.filter(|ty| {
            self.schema
                .get_type(ty.named_type())
                .is_some_and(|type_def| type_def.kind.is_input())
        })
    }

    fn enter_selection_set(&mut self) {
        let named = self
            .named_definition(self.current_type())
            .filter(|type_def| type_def.kind.is_composite());
        self.parent_type_stack.push(named);
    }

    fn enter_field(&mut self, node: &SyntaxNode) {
        let field_def = self.parent_type().and_then(|parent| {
            let name = cst::Field::cast(node.clone())?.name()?;
            self.schema.field_definition(parent, name.text().as_str())
        });
        let field_type = self.output_type(field_def.map(|def| def.ty.clone()));

        self.field_def_stack.push(field_def);
        self.type_stack.push(field_type);
    }

    fn enter_directive(&mut self, node: &SyntaxNode) {
        self.directive = cst::Directive::cast(node.clone())
            .and_then(|directive| directive.name())
            .and_then(|name| self.schema.get_directive(name.text().as_str()));
    }

    fn enter_operation_definition(&mut self, node: &SyntaxNode) {
        let operation = cst::OperationDefinition::cast(node.clone())
            .and_then(|op| op.operation_type())
            .map_or(Some(OperationType::Query), |op| OperationType::from_cst(&op));

        let root = operation
            .and_then(|operation| self.schema.root_type(operation))
            .filter(|root| root.kind == TypeKind::Object)
            .map(|root| TypeRef::named(root.name.clone()));
        self.type_stack.push(root);
    }

    fn enter_fragment(&mut self, type_condition: Option<cst::TypeCondition>) {
        // Inline fragments without a type condition keep the enclosing type
        let ty = match type_condition {
            Some(condition) => condition
                .named_type()
                .and_then(|named| named.name())
                .map(|name| TypeRef::named(name.text().as_str())),
            None => self
                .current_type()
                .map(|ty| TypeRef::named(ty.named_type())),
        };
        let ty = self.output_type(ty);
        self.type_stack.push(ty);
    }

    fn enter_variable_definition(&mut self, node: &SyntaxNode) {
        let ty = cst::VariableDefinition::cast(node.clone())
            .and_then(|var_def| var_def.ty())
            .and_then(|ty| TypeRef::from_cst(&ty));
        let ty = self.checked_input_type(ty);
        self.input_type_stack.push(ty);
    }

    fn enter_argument(&mut self, node: &SyntaxNode) {
        let argument = cst::Argument::cast(node.clone())
            .and_then(|argument| argument.name())
            .and_then(|name| {
                let name = name.text();
                match self.directive {
                    Some(directive) => directive.argument(name.as_str()),
                    None => self.field_def()?.argument(name.as_str()),
                }
            });
        let ty = self.checked_input_type(argument.map(|arg| arg.ty.clone()));

        self.argument = argument;
        self.input_type_stack.push(ty);
    }

    fn enter_list_value(&mut self) {
        let item = self.input_type().map(|ty| {
            ty.item_type()
                .map_or_else(|| ty.nullable().clone(), Clone::clone)
        });
        let item = self.checked_input_type(item);
        self.input_type_stack.push(item);
    }

    fn enter_object_field(&mut self, node: &SyntaxNode) {
        let field_type = self
            .named_definition(self.input_type())
            .filter(|type_def| type_def.kind == TypeKind::InputObject)
            .and_then(|input_object| {
                let name = cst::ObjectField::cast(node.clone())?.name()?;
                input_object.input_field(name.text().as_str())
            })
            .map(|field| field.ty.clone());
        let field_type = self.checked_input_type(field_type);
        self.input_type_stack.push(field_type);
    }

    fn enter_enum_value(&mut self, node: &SyntaxNode) {
        self.enum_value = self
            .named_definition(self.input_type())
            .filter(|type_def| type_def.kind == TypeKind::Enum)
            .and_then(|enum_type| {
                let name = cst::EnumValue::cast(node.clone())?.name()?;
                enum_type.enum_value(name.text().as_str())
            });
    }
}

impl TypeContext<SyntaxNode> for TypeInfo<'_> {
    fn enter(&mut self, node: &SyntaxNode) {
        self.depth += 1;

        match node.kind() {
            SyntaxKind::SELECTION_SET => self.enter_selection_set(),
            SyntaxKind::FIELD => self.enter_field(node),
            SyntaxKind::DIRECTIVE => self.enter_directive(node),
            SyntaxKind::OPERATION_DEFINITION => self.enter_operation_definition(node),
            SyntaxKind::INLINE_FRAGMENT => {
                let condition =
                    cst::InlineFragment::cast(node.clone()).and_then(|f| f.type_condition());
                self.enter_fragment(condition);
            }
            SyntaxKind::FRAGMENT_DEFINITION => {
                // A fragment definition always names its type; a missing one
                // is a syntax error and leaves the type unknown
                let ty = cst::FragmentDefinition::cast(node.clone())
                    .and_then(|f| f.type_condition())
                    .and_then(|condition| condition.named_type())
                    .and_then(|named| named.name())
                    .map(|name| TypeRef::named(name.text().as_str()));
                let ty = self.output_type(ty);
                self.type_stack.push(ty);
            }
            SyntaxKind::VARIABLE_DEFINITION => self.enter_variable_definition(node),
            SyntaxKind::ARGUMENT => self.enter_argument(node),
            SyntaxKind::LIST_VALUE => self.enter_list_value(),
            SyntaxKind::OBJECT_FIELD => self.enter_object_field(node),
            SyntaxKind::ENUM_VALUE => self.enter_enum_value(node),
            _ => {}
        }
    }

    fn leave(&mut self, node: &SyntaxNode) {
        self.depth = self.depth.saturating_sub(1);

        match node.kind() {
            SyntaxKind::SELECTION_SET => {
                self.parent_type_stack.pop();
            }
            SyntaxKind::FIELD => {
                self.field_def_stack.pop();
                self.type_stack.pop();
            }
            SyntaxKind::DIRECTIVE => self.directive = None,
            SyntaxKind::OPERATION_DEFINITION
            | SyntaxKind::INLINE_FRAGMENT
            | SyntaxKind::FRAGMENT_DEFINITION => {
                self.type_stack.pop();
            }
            SyntaxKind::VARIABLE_DEFINITION
            | SyntaxKind::LIST_VALUE
            | SyntaxKind::OBJECT_FIELD => {
                self.input_type_stack.pop();
            }
            SyntaxKind::ARGUMENT => {
                self.argument = None;
                self.input_type_stack.pop();
            }
            SyntaxKind::ENUM_VALUE => self.enum_value = None,
            _ => {}
        }
    }
}
