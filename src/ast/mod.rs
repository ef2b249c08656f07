//! # AST
//!
//! The syntax tree node types, compatible with the JSON AST schema of the
//! TypeScript [solidity-parser](https://github.com/solidity-parser/parser).
//!
//! Every node is a [`Node`]: a closed [`NodeKind`] variant plus the optional
//! `loc`/`range` header fields, which are populated uniformly by the parser
//! when requested. Serialization tags each node with its `type` string and
//! camelCase field names, matching the external schema.

mod walk;

pub use walk::walk;

use crate::parser::ParseError;
use serde::Serialize;
use thin_vec::ThinVec;

/// A parsed source unit together with the diagnostics found along the way
#[must_use]
#[derive(Debug)]
pub struct Ast {
  /// The root of the tree, always a [`NodeKind::SourceUnit`]
  pub root: Node,
  /// Errors found during parsing, empty unless parsing was tolerant
  pub errors: Vec<ParseError>,
}

impl Ast {
  /// Is the parsed tree valid, with no errors found during parsing?
  #[must_use]
  pub fn is_valid(&self) -> bool {
    self.errors.is_empty()
  }

  /// Serialize the tree to a compact JSON string
  ///
  /// # Errors
  /// If the tree cannot be serialized
  pub fn to_json(&self) -> Result<String, serde_json::Error> {
    serde_json::to_string(&self.root)
  }

  /// Serialize the tree to a pretty-printed JSON string
  ///
  /// # Errors
  /// If the tree cannot be serialized
  pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&self.root)
  }

  /// Visit every node of the tree, see [`walk`]
  pub fn walk(&self, visit: &mut impl FnMut(&Node) -> bool) {
    walk(&self.root, visit);
  }
}

/// A node of the syntax tree
///
/// The variant lives in [`Node::kind`]; `loc` and `range` are only present
/// when the parser was asked for them.
#[must_use]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
  #[serde(flatten)]
  pub kind: NodeKind,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub loc: Option<Loc>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub range: Option<[usize; 2]>,
}

impl Node {
  pub fn new(kind: NodeKind) -> Self {
    Self {
      kind,
      loc: None,
      range: None,
    }
  }
}

impl From<NodeKind> for Node {
  fn from(kind: NodeKind) -> Self {
    Self::new(kind)
  }
}

/// The source location of a node, in lines and columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Loc {
  pub start: Position,
  pub end: Position,
}

/// A position in the source code. Lines start at 1, columns at 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Position {
  pub line: usize,
  pub column: usize,
}

/// A symbol brought in by an import directive, e.g. `{ sym as alias }`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportSymbol {
  pub symbol: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub alias: Option<String>,
}

/// The closed set of node variants
///
/// Variant names are the stable `type` strings of the external JSON schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum NodeKind {
  SourceUnit {
    children: ThinVec<Node>,
  },
  PragmaDirective {
    name: String,
    value: String,
  },
  ImportDirective {
    path: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    unit_alias: String,
    #[serde(skip_serializing_if = "ThinVec::is_empty")]
    symbol_aliases: ThinVec<ImportSymbol>,
  },
  ContractDefinition {
    name: String,
    base_contracts: ThinVec<Node>,
    sub_nodes: ThinVec<Node>,
    /// One of `contract`, `abstract`, `interface`, `library`
    kind: String,
    /// The `layout at` expression, if the contract declared one
    #[serde(skip_serializing_if = "Option::is_none")]
    layout: Option<Box<Node>>,
  },
  InheritanceSpecifier {
    base_name: Box<Node>,
    #[serde(skip_serializing_if = "ThinVec::is_empty")]
    arguments: ThinVec<Node>,
  },
  FunctionDefinition {
    #[serde(skip_serializing_if = "String::is_empty")]
    name: String,
    parameters: ThinVec<Node>,
    #[serde(skip_serializing_if = "ThinVec::is_empty")]
    return_parameters: ThinVec<Node>,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<Box<Node>>,
    #[serde(skip_serializing_if = "String::is_empty")]
    visibility: String,
    #[serde(skip_serializing_if = "ThinVec::is_empty")]
    modifiers: ThinVec<Node>,
    #[serde(rename = "override", skip_serializing_if = "ThinVec::is_empty")]
    overrides: ThinVec<Node>,
    is_constructor: bool,
    is_fallback: bool,
    is_receive_ether: bool,
    is_virtual: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    state_mutability: String,
  },
  ModifierDefinition {
    name: String,
    #[serde(skip_serializing_if = "ThinVec::is_empty")]
    parameters: ThinVec<Node>,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<Box<Node>>,
    is_virtual: bool,
    #[serde(rename = "override", skip_serializing_if = "ThinVec::is_empty")]
    overrides: ThinVec<Node>,
  },
  ModifierInvocation {
    name: String,
    #[serde(skip_serializing_if = "ThinVec::is_empty")]
    arguments: ThinVec<Node>,
  },
  StateVariableDeclaration {
    variables: ThinVec<Node>,
    #[serde(skip_serializing_if = "Option::is_none")]
    initial_value: Option<Box<Node>>,
  },
  VariableDeclaration {
    type_name: Box<Node>,
    #[serde(skip_serializing_if = "String::is_empty")]
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    identifier: Option<Box<Node>>,
    #[serde(skip_serializing_if = "String::is_empty")]
    storage_location: String,
    is_state_var: bool,
    is_indexed: bool,
    is_immutable: bool,
    #[serde(rename = "override", skip_serializing_if = "ThinVec::is_empty")]
    overrides: ThinVec<Node>,
    #[serde(skip_serializing_if = "String::is_empty")]
    visibility: String,
    is_declared_const: bool,
  },
  VariableDeclarationStatement {
    /// Tuple declarations may have empty slots, which are `None`
    variables: ThinVec<Option<Node>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    initial_value: Option<Box<Node>>,
  },
  StructDefinition {
    name: String,
    members: ThinVec<Node>,
  },
  EnumDefinition {
    name: String,
    members: ThinVec<Node>,
  },
  EnumValue {
    name: String,
  },
  EventDefinition {
    name: String,
    parameters: ThinVec<Node>,
    is_anonymous: bool,
  },
  ErrorDefinition {
    name: String,
    parameters: ThinVec<Node>,
  },
  UserDefinedValueTypeDefinition {
    name: String,
    underlying_type: Box<Node>,
  },
  UsingForDeclaration {
    #[serde(skip_serializing_if = "Option::is_none")]
    type_name: Option<Box<Node>>,
    #[serde(skip_serializing_if = "ThinVec::is_empty")]
    functions: ThinVec<String>,
    /// Parallel to `functions`: the overloaded operator, if one was bound
    #[serde(skip_serializing_if = "ThinVec::is_empty")]
    operators: ThinVec<Option<String>>,
    #[serde(skip_serializing_if = "String::is_empty")]
    library_name: String,
    is_global: bool,
  },

  // Types
  ElementaryTypeName {
    name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    state_mutability: String,
  },
  UserDefinedTypeName {
    name_path: String,
  },
  Mapping {
    key_type: Box<Node>,
    #[serde(skip_serializing_if = "Option::is_none")]
    key_name: Option<Box<Node>>,
    value_type: Box<Node>,
    #[serde(skip_serializing_if = "Option::is_none")]
    value_name: Option<Box<Node>>,
  },
  ArrayTypeName {
    base_type_name: Box<Node>,
    #[serde(skip_serializing_if = "Option::is_none")]
    length: Option<Box<Node>>,
  },
  FunctionTypeName {
    parameter_types: ThinVec<Node>,
    #[serde(skip_serializing_if = "ThinVec::is_empty")]
    return_types: ThinVec<Node>,
    #[serde(skip_serializing_if = "String::is_empty")]
    visibility: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    state_mutability: String,
  },

  // Statements
  Block {
    statements: ThinVec<Node>,
  },
  UncheckedBlock {
    body: Box<Node>,
  },
  ExpressionStatement {
    expression: Box<Node>,
  },
  IfStatement {
    condition: Box<Node>,
    true_body: Box<Node>,
    #[serde(skip_serializing_if = "Option::is_none")]
    false_body: Option<Box<Node>>,
  },
  WhileStatement {
    condition: Box<Node>,
    body: Box<Node>,
  },
  DoWhileStatement {
    condition: Box<Node>,
    body: Box<Node>,
  },
  ForStatement {
    #[serde(skip_serializing_if = "Option::is_none")]
    init_expression: Option<Box<Node>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    condition_expression: Option<Box<Node>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    loop_expression: Option<Box<Node>>,
    body: Box<Node>,
  },
  ContinueStatement,
  BreakStatement,
  ReturnStatement {
    #[serde(skip_serializing_if = "Option::is_none")]
    expression: Option<Box<Node>>,
  },
  EmitStatement {
    event_call: Box<Node>,
  },
  RevertStatement {
    #[serde(skip_serializing_if = "Option::is_none")]
    revert_call: Option<Box<Node>>,
  },
  TryStatement {
    expression: Box<Node>,
    #[serde(skip_serializing_if = "ThinVec::is_empty")]
    return_parameters: ThinVec<Node>,
    body: Box<Node>,
    catch_clauses: ThinVec<Node>,
  },
  CatchClause {
    is_reason_string_type: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    kind: String,
    #[serde(skip_serializing_if = "ThinVec::is_empty")]
    parameters: ThinVec<Node>,
    body: Box<Node>,
  },

  // Expressions
  BinaryOperation {
    operator: String,
    left: Box<Node>,
    right: Box<Node>,
  },
  UnaryOperation {
    operator: String,
    sub_expression: Box<Node>,
    is_prefix: bool,
  },
  Conditional {
    condition: Box<Node>,
    true_expression: Box<Node>,
    false_expression: Box<Node>,
  },
  FunctionCall {
    expression: Box<Node>,
    arguments: ThinVec<Node>,
    #[serde(skip_serializing_if = "ThinVec::is_empty")]
    names: ThinVec<String>,
  },
  FunctionCallOptions {
    expression: Box<Node>,
    names: ThinVec<String>,
    options: ThinVec<Node>,
  },
  MemberAccess {
    expression: Box<Node>,
    member_name: String,
  },
  IndexAccess {
    base: Box<Node>,
    #[serde(skip_serializing_if = "Option::is_none")]
    index: Option<Box<Node>>,
  },
  IndexRangeAccess {
    base: Box<Node>,
    #[serde(skip_serializing_if = "Option::is_none")]
    index_start: Option<Box<Node>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    index_end: Option<Box<Node>>,
  },
  NewExpression {
    type_name: Box<Node>,
  },
  TupleExpression {
    /// Empty tuple slots are `None` and serialize as `null`
    components: ThinVec<Option<Node>>,
    is_array: bool,
  },
  Identifier {
    name: String,
  },
  NumberLiteral {
    number: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    subdenomination: String,
  },
  BooleanLiteral {
    value: bool,
  },
  StringLiteral {
    value: String,
    parts: ThinVec<String>,
    is_unicode: bool,
  },
  HexLiteral {
    value: String,
    parts: ThinVec<String>,
  },

  // Assembly
  InlineAssembly {
    #[serde(skip_serializing_if = "String::is_empty")]
    language: String,
    body: Box<Node>,
  },
  AssemblyBlock {
    operations: ThinVec<Node>,
  },
  AssemblyCall {
    function_name: String,
    arguments: ThinVec<Node>,
  },
  AssemblyLocalDefinition {
    names: ThinVec<Node>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expression: Option<Box<Node>>,
  },
  AssemblyAssignment {
    names: ThinVec<Node>,
    expression: Box<Node>,
  },
  AssemblyIdentifier {
    name: String,
  },
  AssemblyLiteral {
    /// One of `number`, `string`, `boolean`
    kind: String,
    value: String,
  },
  AssemblyIf {
    condition: Box<Node>,
    body: Box<Node>,
  },
  AssemblySwitch {
    expression: Box<Node>,
    cases: ThinVec<Node>,
  },
  AssemblyCase {
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<Box<Node>>,
    body: Box<Node>,
    default: bool,
  },
  AssemblyFor {
    pre: Box<Node>,
    condition: Box<Node>,
    post: Box<Node>,
    body: Box<Node>,
  },
  AssemblyFunctionDefinition {
    name: String,
    #[serde(skip_serializing_if = "ThinVec::is_empty")]
    arguments: ThinVec<Node>,
    #[serde(skip_serializing_if = "ThinVec::is_empty")]
    return_arguments: ThinVec<Node>,
    body: Box<Node>,
  },
}

impl NodeKind {
  /// The stable `type` string of the node kind
  #[must_use]
  pub fn name(&self) -> &'static str {
    match self {
      Self::SourceUnit { .. } => "SourceUnit",
      Self::PragmaDirective { .. } => "PragmaDirective",
      Self::ImportDirective { .. } => "ImportDirective",
      Self::ContractDefinition { .. } => "ContractDefinition",
      Self::InheritanceSpecifier { .. } => "InheritanceSpecifier",
      Self::FunctionDefinition { .. } => "FunctionDefinition",
      Self::ModifierDefinition { .. } => "ModifierDefinition",
      Self::ModifierInvocation { .. } => "ModifierInvocation",
      Self::StateVariableDeclaration { .. } => "StateVariableDeclaration",
      Self::VariableDeclaration { .. } => "VariableDeclaration",
      Self::VariableDeclarationStatement { .. } => "VariableDeclarationStatement",
      Self::StructDefinition { .. } => "StructDefinition",
      Self::EnumDefinition { .. } => "EnumDefinition",
      Self::EnumValue { .. } => "EnumValue",
      Self::EventDefinition { .. } => "EventDefinition",
      Self::ErrorDefinition { .. } => "ErrorDefinition",
      Self::UserDefinedValueTypeDefinition { .. } => "UserDefinedValueTypeDefinition",
      Self::UsingForDeclaration { .. } => "UsingForDeclaration",
      Self::ElementaryTypeName { .. } => "ElementaryTypeName",
      Self::UserDefinedTypeName { .. } => "UserDefinedTypeName",
      Self::Mapping { .. } => "Mapping",
      Self::ArrayTypeName { .. } => "ArrayTypeName",
      Self::FunctionTypeName { .. } => "FunctionTypeName",
      Self::Block { .. } => "Block",
      Self::UncheckedBlock { .. } => "UncheckedBlock",
      Self::ExpressionStatement { .. } => "ExpressionStatement",
      Self::IfStatement { .. } => "IfStatement",
      Self::WhileStatement { .. } => "WhileStatement",
      Self::DoWhileStatement { .. } => "DoWhileStatement",
      Self::ForStatement { .. } => "ForStatement",
      Self::ContinueStatement => "ContinueStatement",
      Self::BreakStatement => "BreakStatement",
      Self::ReturnStatement { .. } => "ReturnStatement",
      Self::EmitStatement { .. } => "EmitStatement",
      Self::RevertStatement { .. } => "RevertStatement",
      Self::TryStatement { .. } => "TryStatement",
      Self::CatchClause { .. } => "CatchClause",
      Self::BinaryOperation { .. } => "BinaryOperation",
      Self::UnaryOperation { .. } => "UnaryOperation",
      Self::Conditional { .. } => "Conditional",
      Self::FunctionCall { .. } => "FunctionCall",
      Self::FunctionCallOptions { .. } => "FunctionCallOptions",
      Self::MemberAccess { .. } => "MemberAccess",
      Self::IndexAccess { .. } => "IndexAccess",
      Self::IndexRangeAccess { .. } => "IndexRangeAccess",
      Self::NewExpression { .. } => "NewExpression",
      Self::TupleExpression { .. } => "TupleExpression",
      Self::Identifier { .. } => "Identifier",
      Self::NumberLiteral { .. } => "NumberLiteral",
      Self::BooleanLiteral { .. } => "BooleanLiteral",
      Self::StringLiteral { .. } => "StringLiteral",
      Self::HexLiteral { .. } => "HexLiteral",
      Self::InlineAssembly { .. } => "InlineAssembly",
      Self::AssemblyBlock { .. } => "AssemblyBlock",
      Self::AssemblyCall { .. } => "AssemblyCall",
      Self::AssemblyLocalDefinition { .. } => "AssemblyLocalDefinition",
      Self::AssemblyAssignment { .. } => "AssemblyAssignment",
      Self::AssemblyIdentifier { .. } => "AssemblyIdentifier",
      Self::AssemblyLiteral { .. } => "AssemblyLiteral",
      Self::AssemblyIf { .. } => "AssemblyIf",
      Self::AssemblySwitch { .. } => "AssemblySwitch",
      Self::AssemblyCase { .. } => "AssemblyCase",
      Self::AssemblyFor { .. } => "AssemblyFor",
      Self::AssemblyFunctionDefinition { .. } => "AssemblyFunctionDefinition",
    }
  }
}
