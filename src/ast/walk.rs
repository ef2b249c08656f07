//! Depth-first traversal of the syntax tree.
//!
//! One generic walker covers every node kind; consumers narrow on
//! [`NodeKind`](super::NodeKind) inside their callback.

use super::{Node, NodeKind};

/// Visit `node` and all of its descendants, in source order.
///
/// The callback runs before a node's children; returning `false` skips the
/// children of that node.
///
/// # Examples
/// ```
/// use solast::{parse, NodeKind};
///
/// let ast = parse("contract C { uint x; }").unwrap();
/// let mut functions = 0;
/// ast.walk(&mut |node| {
///   if let NodeKind::FunctionDefinition { .. } = node.kind {
///     functions += 1;
///   }
///   true
/// });
/// ```
pub fn walk(node: &Node, visit: &mut impl FnMut(&Node) -> bool) {
  if !visit(node) {
    return;
  }

  match &node.kind {
    NodeKind::SourceUnit { children } => walk_all(children, visit),
    NodeKind::ContractDefinition {
      base_contracts,
      sub_nodes,
      layout,
      ..
    } => {
      walk_opt(layout, visit);
      walk_all(base_contracts, visit);
      walk_all(sub_nodes, visit);
    }
    NodeKind::InheritanceSpecifier {
      base_name,
      arguments,
    } => {
      walk(base_name, visit);
      walk_all(arguments, visit);
    }
    NodeKind::FunctionDefinition {
      parameters,
      return_parameters,
      body,
      modifiers,
      overrides,
      ..
    } => {
      walk_all(parameters, visit);
      walk_all(modifiers, visit);
      walk_all(overrides, visit);
      walk_all(return_parameters, visit);
      walk_opt(body, visit);
    }
    NodeKind::ModifierDefinition {
      parameters,
      body,
      overrides,
      ..
    } => {
      walk_all(parameters, visit);
      walk_all(overrides, visit);
      walk_opt(body, visit);
    }
    NodeKind::ModifierInvocation { arguments, .. } => walk_all(arguments, visit),
    NodeKind::StateVariableDeclaration {
      variables,
      initial_value,
    } => {
      walk_all(variables, visit);
      walk_opt(initial_value, visit);
    }
    NodeKind::VariableDeclaration {
      type_name,
      identifier,
      overrides,
      ..
    } => {
      walk(type_name, visit);
      walk_opt(identifier, visit);
      walk_all(overrides, visit);
    }
    NodeKind::VariableDeclarationStatement {
      variables,
      initial_value,
    } => {
      for variable in variables.iter().flatten() {
        walk(variable, visit);
      }
      walk_opt(initial_value, visit);
    }
    NodeKind::StructDefinition { members, .. } | NodeKind::EnumDefinition { members, .. } => {
      walk_all(members, visit);
    }
    NodeKind::EventDefinition { parameters, .. } | NodeKind::ErrorDefinition { parameters, .. } => {
      walk_all(parameters, visit);
    }
    NodeKind::UserDefinedValueTypeDefinition {
      underlying_type, ..
    } => walk(underlying_type, visit),
    NodeKind::UsingForDeclaration { type_name, .. } => walk_opt(type_name, visit),

    NodeKind::Mapping {
      key_type,
      key_name,
      value_type,
      value_name,
    } => {
      walk(key_type, visit);
      walk_opt(key_name, visit);
      walk(value_type, visit);
      walk_opt(value_name, visit);
    }
    NodeKind::ArrayTypeName {
      base_type_name,
      length,
    } => {
      walk(base_type_name, visit);
      walk_opt(length, visit);
    }
    NodeKind::FunctionTypeName {
      parameter_types,
      return_types,
      ..
    } => {
      walk_all(parameter_types, visit);
      walk_all(return_types, visit);
    }

    NodeKind::Block { statements } => walk_all(statements, visit),
    NodeKind::UncheckedBlock { body } => walk(body, visit),
    NodeKind::ExpressionStatement { expression } => walk(expression, visit),
    NodeKind::IfStatement {
      condition,
      true_body,
      false_body,
    } => {
      walk(condition, visit);
      walk(true_body, visit);
      walk_opt(false_body, visit);
    }
    NodeKind::WhileStatement { condition, body }
    | NodeKind::DoWhileStatement { condition, body } => {
      walk(condition, visit);
      walk(body, visit);
    }
    NodeKind::ForStatement {
      init_expression,
      condition_expression,
      loop_expression,
      body,
    } => {
      walk_opt(init_expression, visit);
      walk_opt(condition_expression, visit);
      walk_opt(loop_expression, visit);
      walk(body, visit);
    }
    NodeKind::ReturnStatement { expression } => walk_opt(expression, visit),
    NodeKind::EmitStatement { event_call } => walk(event_call, visit),
    NodeKind::RevertStatement { revert_call } => walk_opt(revert_call, visit),
    NodeKind::TryStatement {
      expression,
      return_parameters,
      body,
      catch_clauses,
    } => {
      walk(expression, visit);
      walk_all(return_parameters, visit);
      walk(body, visit);
      walk_all(catch_clauses, visit);
    }
    NodeKind::CatchClause {
      parameters, body, ..
    } => {
      walk_all(parameters, visit);
      walk(body, visit);
    }

    NodeKind::BinaryOperation { left, right, .. } => {
      walk(left, visit);
      walk(right, visit);
    }
    NodeKind::UnaryOperation { sub_expression, .. } => walk(sub_expression, visit),
    NodeKind::Conditional {
      condition,
      true_expression,
      false_expression,
    } => {
      walk(condition, visit);
      walk(true_expression, visit);
      walk(false_expression, visit);
    }
    NodeKind::FunctionCall {
      expression,
      arguments,
      ..
    } => {
      walk(expression, visit);
      walk_all(arguments, visit);
    }
    NodeKind::FunctionCallOptions {
      expression,
      options,
      ..
    } => {
      walk(expression, visit);
      walk_all(options, visit);
    }
    NodeKind::MemberAccess { expression, .. } => walk(expression, visit),
    NodeKind::IndexAccess { base, index } => {
      walk(base, visit);
      walk_opt(index, visit);
    }
    NodeKind::IndexRangeAccess {
      base,
      index_start,
      index_end,
    } => {
      walk(base, visit);
      walk_opt(index_start, visit);
      walk_opt(index_end, visit);
    }
    NodeKind::NewExpression { type_name } => walk(type_name, visit),
    NodeKind::TupleExpression { components, .. } => {
      for component in components.iter().flatten() {
        walk(component, visit);
      }
    }

    NodeKind::InlineAssembly { body, .. } => walk(body, visit),
    NodeKind::AssemblyBlock { operations } => walk_all(operations, visit),
    NodeKind::AssemblyCall { arguments, .. } => walk_all(arguments, visit),
    NodeKind::AssemblyLocalDefinition { names, expression } => {
      walk_all(names, visit);
      walk_opt(expression, visit);
    }
    NodeKind::AssemblyAssignment { names, expression } => {
      walk_all(names, visit);
      walk(expression, visit);
    }
    NodeKind::AssemblyIf { condition, body } => {
      walk(condition, visit);
      walk(body, visit);
    }
    NodeKind::AssemblySwitch { expression, cases } => {
      walk(expression, visit);
      walk_all(cases, visit);
    }
    NodeKind::AssemblyCase { value, body, .. } => {
      walk_opt(value, visit);
      walk(body, visit);
    }
    NodeKind::AssemblyFor {
      pre,
      condition,
      post,
      body,
    } => {
      walk(pre, visit);
      walk(condition, visit);
      walk(post, visit);
      walk(body, visit);
    }
    NodeKind::AssemblyFunctionDefinition {
      arguments,
      return_arguments,
      body,
      ..
    } => {
      walk_all(arguments, visit);
      walk_all(return_arguments, visit);
      walk(body, visit);
    }

    NodeKind::PragmaDirective { .. }
    | NodeKind::ImportDirective { .. }
    | NodeKind::EnumValue { .. }
    | NodeKind::ElementaryTypeName { .. }
    | NodeKind::UserDefinedTypeName { .. }
    | NodeKind::ContinueStatement
    | NodeKind::BreakStatement
    | NodeKind::Identifier { .. }
    | NodeKind::NumberLiteral { .. }
    | NodeKind::BooleanLiteral { .. }
    | NodeKind::StringLiteral { .. }
    | NodeKind::HexLiteral { .. }
    | NodeKind::AssemblyIdentifier { .. }
    | NodeKind::AssemblyLiteral { .. } => {}
  }
}

fn walk_all(nodes: &[Node], visit: &mut impl FnMut(&Node) -> bool) {
  for node in nodes {
    walk(node, visit);
  }
}

fn walk_opt(node: &Option<Box<Node>>, visit: &mut impl FnMut(&Node) -> bool) {
  if let Some(node) = node {
    walk(node, visit);
  }
}
