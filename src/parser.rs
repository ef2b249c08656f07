//! # Parser
//! A recursive descent parser over the token stream, producing the syntax
//! tree defined in [`crate::ast`].
//!
//! The parser runs in one of two modes. In strict mode the first error aborts
//! the parse. In tolerant mode errors are collected and the parser
//! resynchronises at the next statement or top-level construct, so a tree is
//! always produced, possibly with partial nodes.

use crate::{
  ast::{Ast, ImportSymbol, Loc, Node, NodeKind, Position},
  tokeniser::{tokenise, Token, TokenKind},
};
use std::{error, fmt};
use thin_vec::{thin_vec, ThinVec};

/// Configuration for a [`Parser`]
///
/// Options are recorded at construction and do not change during parsing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Options {
  /// Collect errors and keep parsing instead of stopping at the first one
  pub tolerant: bool,
  /// Record line/column locations on every node
  pub loc: bool,
  /// Record byte offset ranges on every node
  pub range: bool,
}

/// Parses a token stream into an [`Ast`]
pub struct Parser {
  tokens: Vec<Token>,
  /// The current token
  position: usize,
  /// Errors found so far
  errors: Vec<ParseError>,
  options: Options,
}

impl Parser {
  /// Create a parser for a source string. The source is tokenised eagerly
  pub fn new(source: &str, options: Options) -> Self {
    Self {
      tokens: tokenise(source),
      position: 0,
      errors: Vec::new(),
      options,
    }
  }

  /// Parse the whole source into a `SourceUnit` tree.
  ///
  /// # Errors
  /// In strict mode, the first parse error. Tolerant parses always succeed;
  /// their diagnostics are in [`Ast::errors`].
  pub fn parse(mut self) -> Result<Ast, ParseError> {
    let mut children: ThinVec<Node> = ThinVec::new();

    while !self.is_at_end() {
      if let Some(node) = self.parse_source_unit_element() {
        children.push(node);
      }
      if !self.options.tolerant {
        if let Some(error) = self.errors.first() {
          return Err(error.clone());
        }
      }
    }

    let mut root = Node::new(NodeKind::SourceUnit { children });
    self.set_root_bounds(&mut root);

    Ok(Ast {
      root,
      errors: self.errors,
    })
  }

  /// The root spans its children, when there are any
  fn set_root_bounds(&self, root: &mut Node) {
    let NodeKind::SourceUnit { children } = &root.kind else {
      return;
    };
    let (Some(first), Some(last)) = (children.first(), children.last()) else {
      return;
    };

    if self.options.loc {
      if let (Some(first), Some(last)) = (first.loc, last.loc) {
        root.loc = Some(Loc {
          start: first.start,
          end: last.end,
        });
      }
    }
    if self.options.range {
      if let (Some(first), Some(last)) = (first.range, last.range) {
        root.range = Some([first[0], last[1]]);
      }
    }
  }
}

// Token navigation
impl Parser {
  fn peek(&self) -> &Token {
    &self.tokens[self.position.min(self.tokens.len() - 1)]
  }

  fn peek_kind(&self) -> TokenKind {
    self.peek().kind
  }

  fn peek_kind_at(&self, offset: usize) -> TokenKind {
    let position = (self.position + offset).min(self.tokens.len() - 1);
    self.tokens[position].kind
  }

  fn previous(&self) -> &Token {
    let position = self.position.saturating_sub(1).min(self.tokens.len() - 1);
    &self.tokens[position]
  }

  fn advance(&mut self) -> Token {
    if !self.is_at_end() {
      self.position += 1;
    }
    self.previous().clone()
  }

  fn check(&self, kind: TokenKind) -> bool {
    self.peek_kind() == kind
  }

  fn matches(&mut self, kind: TokenKind) -> bool {
    if self.check(kind) {
      self.position += 1;
      true
    } else {
      false
    }
  }

  fn is_at_end(&self) -> bool {
    self.peek_kind() == TokenKind::EndOfFile
  }

  /// Consume a token of the given kind, or record an error.
  ///
  /// On failure the parser still advances (in strict mode directly, in
  /// tolerant mode through synchronisation), which guarantees termination.
  fn expect(&mut self, kind: TokenKind) -> Token {
    if self.check(kind) {
      return self.advance();
    }

    self.error(ParseError::Expected {
      expected: kind,
      received: self.peek().clone(),
    });
    if !self.options.tolerant {
      self.advance();
    }
    self.peek().clone()
  }

  fn error(&mut self, error: ParseError) {
    self.errors.push(error);
    if self.options.tolerant {
      self.synchronize();
    }
  }

  /// Skip tokens until the start of the next statement or top-level
  /// construct, so that parsing can continue after an error
  fn synchronize(&mut self) {
    self.advance();

    while !self.is_at_end() {
      if self.previous().kind == TokenKind::Semicolon {
        return;
      }

      match self.peek_kind() {
        TokenKind::Contract
        | TokenKind::Interface
        | TokenKind::Library
        | TokenKind::Function
        | TokenKind::Struct
        | TokenKind::Enum
        | TokenKind::Event
        | TokenKind::Error
        | TokenKind::Pragma
        | TokenKind::Import
        | TokenKind::Using => return,
        _ => {}
      }

      self.advance();
    }
  }
}

// Node construction
impl Parser {
  /// Build a node spanning from the token at `start` to the previous token,
  /// attaching `loc`/`range` when the options ask for them
  fn node_from(&self, start: usize, kind: NodeKind) -> Node {
    let start_token = &self.tokens[start.min(self.tokens.len() - 1)];
    let end_token = self.previous();
    self.node_between(kind, start_token, end_token)
  }

  /// Build a node spanning a single token
  fn token_node(&self, kind: NodeKind, token: &Token) -> Node {
    self.node_between(kind, token, token)
  }

  fn node_between(&self, kind: NodeKind, start: &Token, end: &Token) -> Node {
    let mut node = Node::new(kind);

    if self.options.loc {
      node.loc = Some(Loc {
        start: Position {
          line: start.line,
          column: start.column,
        },
        end: Position {
          line: end.line,
          column: end.column + (end.end - end.start),
        },
      });
    }
    if self.options.range {
      node.range = Some([start.start, end.end]);
    }

    node
  }

  fn identifier(&self, token: &Token) -> Node {
    self.token_node(
      NodeKind::Identifier {
        name: token.value.clone(),
      },
      token,
    )
  }
}

// Source unit elements
impl Parser {
  fn parse_source_unit_element(&mut self) -> Option<Node> {
    let start = self.position;

    match self.peek_kind() {
      TokenKind::Pragma => Some(self.parse_pragma_directive()),
      TokenKind::Import => Some(self.parse_import_directive()),
      TokenKind::Contract => Some(self.parse_contract_definition("contract", start)),
      TokenKind::Abstract => {
        self.advance();
        if self.check(TokenKind::Contract) {
          Some(self.parse_contract_definition("abstract", start))
        } else {
          let received = self.peek().clone();
          self.error(ParseError::ExpectedContract(received));
          None
        }
      }
      TokenKind::Interface => Some(self.parse_contract_definition("interface", start)),
      TokenKind::Library => Some(self.parse_contract_definition("library", start)),
      TokenKind::Struct => Some(self.parse_struct_definition()),
      TokenKind::Enum => Some(self.parse_enum_definition()),
      TokenKind::Function => Some(self.parse_function_definition()),
      TokenKind::Event => Some(self.parse_event_definition()),
      TokenKind::Error => Some(self.parse_error_definition()),
      TokenKind::Using => Some(self.parse_using_directive()),
      TokenKind::Type => Some(self.parse_user_defined_value_type_definition()),
      TokenKind::EndOfFile => None,
      _ => {
        // a type name starts a file-level constant declaration
        if self.is_type_name() {
          return Some(self.parse_state_variable_declaration());
        }
        let token = self.peek().clone();
        self.error(ParseError::UnexpectedToken(token));
        if !self.options.tolerant {
          self.advance();
        }
        None
      }
    }
  }

  fn parse_pragma_directive(&mut self) -> Node {
    let start = self.position;
    self.advance(); // pragma

    let name = self.advance().value;

    // the value is every token up to the semicolon, space separated; a
    // version like 0.8.0 scans as two number tokens, so a part starting
    // with a dot rejoins the token it is adjacent to
    let mut value = String::new();
    let mut previous_end = 0;
    while !self.check(TokenKind::Semicolon) && !self.is_at_end() {
      let token = self.advance();
      if !value.is_empty() && !(token.start == previous_end && token.value.starts_with('.')) {
        value.push(' ');
      }
      value.push_str(&token.value);
      previous_end = token.end;
    }
    self.expect(TokenKind::Semicolon);

    self.node_from(start, NodeKind::PragmaDirective { name, value })
  }

  fn parse_import_directive(&mut self) -> Node {
    let start = self.position;
    self.advance(); // import

    let mut path = String::new();
    let mut unit_alias = String::new();
    let mut symbol_aliases: ThinVec<ImportSymbol> = ThinVec::new();

    if self.check(TokenKind::String) {
      // import "path";
      path = self.advance().value;
      if self.matches(TokenKind::As) {
        unit_alias = self.expect(TokenKind::Identifier).value;
      }
    } else if self.check(TokenKind::Star) {
      // import * as alias from "path";
      self.advance();
      self.expect(TokenKind::As);
      unit_alias = self.expect(TokenKind::Identifier).value;
      self.expect(TokenKind::From);
      path = self.expect(TokenKind::String).value;
    } else if self.check(TokenKind::LeftCurly) {
      // import { symbol, symbol as alias } from "path";
      self.advance();
      while !self.check(TokenKind::RightCurly) && !self.is_at_end() {
        let symbol = self.expect(TokenKind::Identifier).value;
        let alias = self
          .matches(TokenKind::As)
          .then(|| self.expect(TokenKind::Identifier).value);
        symbol_aliases.push(ImportSymbol { symbol, alias });

        if !self.check(TokenKind::RightCurly) {
          self.expect(TokenKind::Comma);
        }
      }
      self.expect(TokenKind::RightCurly);
      self.expect(TokenKind::From);
      path = self.expect(TokenKind::String).value;
    } else if self.check(TokenKind::Identifier) {
      // import Identifier from "path";
      unit_alias = self.advance().value;
      self.expect(TokenKind::From);
      path = self.expect(TokenKind::String).value;
    }

    self.expect(TokenKind::Semicolon);

    self.node_from(
      start,
      NodeKind::ImportDirective {
        path,
        unit_alias,
        symbol_aliases,
      },
    )
  }

  fn parse_contract_definition(&mut self, kind: &str, start: usize) -> Node {
    self.advance(); // contract | interface | library

    let name = self.expect(TokenKind::Identifier).value;

    // layout at <slot> fixes the starting storage slot (0.8.24+). The
    // expression is a primary so that the following `{` stays the body
    let layout = if self.matches(TokenKind::Layout) {
      self.expect(TokenKind::At);
      Some(Box::new(self.parse_primary()))
    } else {
      None
    };

    let mut base_contracts: ThinVec<Node> = ThinVec::new();
    if self.matches(TokenKind::Is) {
      loop {
        base_contracts.push(self.parse_inheritance_specifier());
        if !self.matches(TokenKind::Comma) {
          break;
        }
      }
    }

    self.expect(TokenKind::LeftCurly);

    let mut sub_nodes: ThinVec<Node> = ThinVec::new();
    while !self.check(TokenKind::RightCurly) && !self.is_at_end() {
      if let Some(node) = self.parse_contract_body_element() {
        sub_nodes.push(node);
      }
    }

    self.expect(TokenKind::RightCurly);

    self.node_from(
      start,
      NodeKind::ContractDefinition {
        name,
        base_contracts,
        sub_nodes,
        kind: kind.to_owned(),
        layout,
      },
    )
  }

  fn parse_inheritance_specifier(&mut self) -> Node {
    let start = self.position;
    let base_name = Box::new(self.parse_user_defined_type_name());

    let mut arguments: ThinVec<Node> = ThinVec::new();
    if self.matches(TokenKind::LeftParen) {
      arguments = self.parse_expression_list();
      self.expect(TokenKind::RightParen);
    }

    self.node_from(
      start,
      NodeKind::InheritanceSpecifier {
        base_name,
        arguments,
      },
    )
  }

  fn parse_contract_body_element(&mut self) -> Option<Node> {
    match self.peek_kind() {
      TokenKind::Function => Some(self.parse_function_definition()),
      TokenKind::Constructor => Some(self.parse_constructor_definition()),
      TokenKind::Modifier => Some(self.parse_modifier_definition()),
      TokenKind::Fallback => Some(self.parse_fallback_definition()),
      TokenKind::Receive => Some(self.parse_receive_definition()),
      TokenKind::Struct => Some(self.parse_struct_definition()),
      TokenKind::Enum => Some(self.parse_enum_definition()),
      TokenKind::Event => Some(self.parse_event_definition()),
      TokenKind::Error => Some(self.parse_error_definition()),
      TokenKind::Using => Some(self.parse_using_directive()),
      TokenKind::Type => Some(self.parse_user_defined_value_type_definition()),
      _ => {
        if self.is_type_name() {
          return Some(self.parse_state_variable_declaration());
        }
        let token = self.peek().clone();
        self.error(ParseError::UnexpectedContractMember(token));
        if !self.options.tolerant {
          self.advance();
        }
        None
      }
    }
  }

  fn parse_function_definition(&mut self) -> Node {
    let start = self.position;
    self.advance(); // function

    let mut name = String::new();
    let mut is_fallback = false;
    let mut is_receive_ether = false;

    // the name is optional, and pre-0.6 sources may define functions
    // literally named fallback or receive
    if let TokenKind::Identifier | TokenKind::Fallback | TokenKind::Receive = self.peek_kind() {
      let token = self.advance();
      is_fallback = token.kind == TokenKind::Fallback;
      is_receive_ether = token.kind == TokenKind::Receive;
      name = token.value;
    }

    let parameters = self.parse_parameter_list();
    let attributes = self.parse_function_modifiers();

    let return_parameters = if self.matches(TokenKind::Returns) {
      self.parse_parameter_list()
    } else {
      ThinVec::new()
    };

    let body = self.parse_function_body();

    self.node_from(
      start,
      NodeKind::FunctionDefinition {
        name,
        parameters,
        return_parameters,
        body,
        visibility: attributes.visibility,
        modifiers: attributes.modifiers,
        overrides: attributes.overrides,
        is_constructor: false,
        is_fallback,
        is_receive_ether,
        is_virtual: attributes.is_virtual,
        state_mutability: attributes.state_mutability,
      },
    )
  }

  fn parse_constructor_definition(&mut self) -> Node {
    let start = self.position;
    self.advance(); // constructor

    let parameters = self.parse_parameter_list();
    let attributes = self.parse_function_modifiers();
    let body = Some(Box::new(self.parse_block()));

    self.node_from(
      start,
      NodeKind::FunctionDefinition {
        name: String::new(),
        parameters,
        return_parameters: ThinVec::new(),
        body,
        visibility: attributes.visibility,
        modifiers: attributes.modifiers,
        overrides: attributes.overrides,
        is_constructor: true,
        is_fallback: false,
        is_receive_ether: false,
        is_virtual: attributes.is_virtual,
        state_mutability: attributes.state_mutability,
      },
    )
  }

  fn parse_fallback_definition(&mut self) -> Node {
    let start = self.position;
    self.advance(); // fallback

    let parameters = self.parse_parameter_list();
    let attributes = self.parse_function_modifiers();

    let return_parameters = if self.matches(TokenKind::Returns) {
      self.parse_parameter_list()
    } else {
      ThinVec::new()
    };

    let body = self.parse_function_body();

    self.node_from(
      start,
      NodeKind::FunctionDefinition {
        name: String::new(),
        parameters,
        return_parameters,
        body,
        visibility: attributes.visibility,
        modifiers: attributes.modifiers,
        overrides: attributes.overrides,
        is_constructor: false,
        is_fallback: true,
        is_receive_ether: false,
        is_virtual: attributes.is_virtual,
        state_mutability: attributes.state_mutability,
      },
    )
  }

  fn parse_receive_definition(&mut self) -> Node {
    let start = self.position;
    self.advance(); // receive

    let parameters = self.parse_parameter_list();
    let attributes = self.parse_function_modifiers();
    let body = self.parse_function_body();

    self.node_from(
      start,
      NodeKind::FunctionDefinition {
        name: String::new(),
        parameters,
        return_parameters: ThinVec::new(),
        body,
        visibility: attributes.visibility,
        modifiers: attributes.modifiers,
        overrides: attributes.overrides,
        is_constructor: false,
        is_fallback: false,
        is_receive_ether: true,
        is_virtual: attributes.is_virtual,
        state_mutability: attributes.state_mutability,
      },
    )
  }

  /// A function body is either a block or a bare `;` (interfaces, abstracts)
  fn parse_function_body(&mut self) -> Option<Box<Node>> {
    if self.check(TokenKind::LeftCurly) {
      Some(Box::new(self.parse_block()))
    } else {
      self.expect(TokenKind::Semicolon);
      None
    }
  }

  fn parse_function_modifiers(&mut self) -> FunctionModifiers {
    let mut attributes = FunctionModifiers::default();

    loop {
      match self.peek_kind() {
        TokenKind::Public => {
          self.advance();
          attributes.visibility = "public".into();
        }
        TokenKind::Private => {
          self.advance();
          attributes.visibility = "private".into();
        }
        TokenKind::Internal => {
          self.advance();
          attributes.visibility = "internal".into();
        }
        TokenKind::External => {
          self.advance();
          attributes.visibility = "external".into();
        }
        TokenKind::Pure => {
          self.advance();
          attributes.state_mutability = "pure".into();
        }
        TokenKind::View => {
          self.advance();
          attributes.state_mutability = "view".into();
        }
        TokenKind::Payable => {
          self.advance();
          attributes.state_mutability = "payable".into();
        }
        TokenKind::Virtual => {
          self.advance();
          attributes.is_virtual = true;
        }
        TokenKind::Override => {
          self.advance();
          attributes.overrides.extend(self.parse_override_list());
        }
        TokenKind::Identifier => {
          let invocation = self.parse_modifier_invocation();
          attributes.modifiers.push(invocation);
        }
        _ => return attributes,
      }
    }
  }

  /// The optional parenthesised list of base names after `override`
  fn parse_override_list(&mut self) -> ThinVec<Node> {
    let mut overrides: ThinVec<Node> = ThinVec::new();

    if self.matches(TokenKind::LeftParen) {
      while !self.check(TokenKind::RightParen) && !self.is_at_end() {
        overrides.push(self.parse_user_defined_type_name());
        if !self.check(TokenKind::RightParen) {
          self.expect(TokenKind::Comma);
        }
      }
      self.expect(TokenKind::RightParen);
    }

    overrides
  }

  fn parse_modifier_invocation(&mut self) -> Node {
    let start = self.position;
    let name = self.advance().value;

    let mut arguments: ThinVec<Node> = ThinVec::new();
    if self.matches(TokenKind::LeftParen) {
      arguments = self.parse_expression_list();
      self.expect(TokenKind::RightParen);
    }

    self.node_from(start, NodeKind::ModifierInvocation { name, arguments })
  }

  fn parse_modifier_definition(&mut self) -> Node {
    let start = self.position;
    self.advance(); // modifier
    let name = self.expect(TokenKind::Identifier).value;

    let parameters = if self.check(TokenKind::LeftParen) {
      self.parse_parameter_list()
    } else {
      ThinVec::new()
    };

    let mut is_virtual = false;
    let mut overrides: ThinVec<Node> = ThinVec::new();
    loop {
      if self.matches(TokenKind::Virtual) {
        is_virtual = true;
      } else if self.matches(TokenKind::Override) {
        overrides.extend(self.parse_override_list());
      } else {
        break;
      }
    }

    let body = if self.check(TokenKind::LeftCurly) {
      Some(Box::new(self.parse_block()))
    } else {
      self.expect(TokenKind::Semicolon);
      None
    };

    self.node_from(
      start,
      NodeKind::ModifierDefinition {
        name,
        parameters,
        body,
        is_virtual,
        overrides,
      },
    )
  }
}

#[derive(Default)]
struct FunctionModifiers {
  visibility: String,
  state_mutability: String,
  is_virtual: bool,
  overrides: ThinVec<Node>,
  modifiers: ThinVec<Node>,
}

// Statements
impl Parser {
  fn parse_block(&mut self) -> Node {
    let start = self.position;
    self.expect(TokenKind::LeftCurly);

    let mut statements: ThinVec<Node> = ThinVec::new();
    while !self.check(TokenKind::RightCurly) && !self.is_at_end() {
      statements.push(self.parse_statement());
    }

    self.expect(TokenKind::RightCurly);
    self.node_from(start, NodeKind::Block { statements })
  }

  fn parse_statement(&mut self) -> Node {
    match self.peek_kind() {
      TokenKind::LeftCurly => self.parse_block(),
      TokenKind::If => self.parse_if_statement(),
      TokenKind::For => self.parse_for_statement(),
      TokenKind::While => self.parse_while_statement(),
      TokenKind::Do => self.parse_do_while_statement(),
      TokenKind::Continue => self.parse_simple_statement(NodeKind::ContinueStatement),
      TokenKind::Break => self.parse_simple_statement(NodeKind::BreakStatement),
      TokenKind::Return => self.parse_return_statement(),
      TokenKind::Emit => self.parse_emit_statement(),
      TokenKind::Revert => self.parse_revert_statement(),
      TokenKind::Try => self.parse_try_statement(),
      TokenKind::Assembly => self.parse_assembly_statement(),
      TokenKind::Unchecked => self.parse_unchecked_block(),
      _ => {
        // a statement starting with a type name declares a variable, one
        // starting with `(` may declare a tuple; anything else is an
        // expression statement
        if self.looks_like_variable_declaration() {
          return self.parse_variable_declaration_statement();
        }
        if self.check(TokenKind::LeftParen) {
          return self.parse_tuple_variable_declaration_or_expression();
        }
        self.parse_expression_statement()
      }
    }
  }

  /// Bounded lookahead to tell `Type name;` apart from an expression.
  ///
  /// The cursor is saved and restored; the caller reparses from the start.
  fn looks_like_variable_declaration(&mut self) -> bool {
    if self.peek_kind().is_elementary_type() {
      return true;
    }
    if self.check(TokenKind::Mapping) || self.check(TokenKind::Function) {
      return true;
    }
    if !self.check(TokenKind::Identifier) {
      return false;
    }

    let saved = self.position;
    self.position += 1; // the identifier, a potential type name

    // array dimensions like [10] or []
    while self.check(TokenKind::LeftSquare) {
      self.position += 1;
      while !self.check(TokenKind::RightSquare) && !self.is_at_end() {
        self.position += 1;
      }
      if self.check(TokenKind::RightSquare) {
        self.position += 1;
      }
    }

    // qualified type path like A.B.C
    while self.check(TokenKind::Dot) {
      self.position += 1;
      if self.check(TokenKind::Identifier) {
        self.position += 1;
      }
    }

    // storage location
    if let TokenKind::Memory | TokenKind::Storage | TokenKind::Calldata = self.peek_kind() {
      self.position += 1;
    }

    let declares_variable = self.check(TokenKind::Identifier);
    self.position = saved;
    declares_variable
  }

  fn parse_if_statement(&mut self) -> Node {
    let start = self.position;
    self.advance(); // if

    self.expect(TokenKind::LeftParen);
    let condition = Box::new(self.parse_expression());
    self.expect(TokenKind::RightParen);

    let true_body = Box::new(self.parse_statement());
    let false_body = self
      .matches(TokenKind::Else)
      .then(|| Box::new(self.parse_statement()));

    self.node_from(
      start,
      NodeKind::IfStatement {
        condition,
        true_body,
        false_body,
      },
    )
  }

  fn parse_for_statement(&mut self) -> Node {
    let start = self.position;
    self.advance(); // for

    self.expect(TokenKind::LeftParen);

    let init_expression = if self.check(TokenKind::Semicolon) {
      self.advance();
      None
    } else if self.looks_like_variable_declaration() {
      Some(Box::new(self.parse_variable_declaration_statement()))
    } else {
      Some(Box::new(self.parse_expression_statement()))
    };

    let condition_expression = if self.check(TokenKind::Semicolon) {
      None
    } else {
      Some(Box::new(self.parse_expression()))
    };
    self.expect(TokenKind::Semicolon);

    let loop_expression = if self.check(TokenKind::RightParen) {
      None
    } else {
      Some(Box::new(self.parse_expression()))
    };
    self.expect(TokenKind::RightParen);

    let body = Box::new(self.parse_statement());

    self.node_from(
      start,
      NodeKind::ForStatement {
        init_expression,
        condition_expression,
        loop_expression,
        body,
      },
    )
  }

  fn parse_while_statement(&mut self) -> Node {
    let start = self.position;
    self.advance(); // while

    self.expect(TokenKind::LeftParen);
    let condition = Box::new(self.parse_expression());
    self.expect(TokenKind::RightParen);
    let body = Box::new(self.parse_statement());

    self.node_from(start, NodeKind::WhileStatement { condition, body })
  }

  fn parse_do_while_statement(&mut self) -> Node {
    let start = self.position;
    self.advance(); // do

    let body = Box::new(self.parse_statement());
    self.expect(TokenKind::While);
    self.expect(TokenKind::LeftParen);
    let condition = Box::new(self.parse_expression());
    self.expect(TokenKind::RightParen);
    self.expect(TokenKind::Semicolon);

    self.node_from(start, NodeKind::DoWhileStatement { condition, body })
  }

  /// `continue;` and `break;`
  fn parse_simple_statement(&mut self, kind: NodeKind) -> Node {
    let start = self.position;
    self.advance();
    self.expect(TokenKind::Semicolon);
    self.node_from(start, kind)
  }

  fn parse_return_statement(&mut self) -> Node {
    let start = self.position;
    self.advance(); // return

    let expression = if self.check(TokenKind::Semicolon) {
      None
    } else {
      Some(Box::new(self.parse_expression()))
    };
    self.expect(TokenKind::Semicolon);

    self.node_from(start, NodeKind::ReturnStatement { expression })
  }

  fn parse_emit_statement(&mut self) -> Node {
    let start = self.position;
    self.advance(); // emit

    let event_call = Box::new(self.parse_expression());
    self.expect(TokenKind::Semicolon);

    self.node_from(start, NodeKind::EmitStatement { event_call })
  }

  fn parse_revert_statement(&mut self) -> Node {
    let start = self.position;
    self.advance(); // revert

    let revert_call = if self.check(TokenKind::Semicolon) {
      None
    } else {
      Some(Box::new(self.parse_expression()))
    };
    self.expect(TokenKind::Semicolon);

    self.node_from(start, NodeKind::RevertStatement { revert_call })
  }

  fn parse_try_statement(&mut self) -> Node {
    let start = self.position;
    self.advance(); // try

    // the call options production is disabled here, the `{` after the
    // expression is the try body
    let expression = Box::new(self.parse_call_member_index(false));

    let return_parameters = if self.matches(TokenKind::Returns) {
      self.parse_parameter_list()
    } else {
      ThinVec::new()
    };

    let body = Box::new(self.parse_block());

    let mut catch_clauses: ThinVec<Node> = ThinVec::new();
    while self.check(TokenKind::Catch) {
      catch_clauses.push(self.parse_catch_clause());
    }

    self.node_from(
      start,
      NodeKind::TryStatement {
        expression,
        return_parameters,
        body,
        catch_clauses,
      },
    )
  }

  fn parse_catch_clause(&mut self) -> Node {
    let start = self.position;
    self.advance(); // catch

    let mut kind = String::new();
    if self.check(TokenKind::Identifier) {
      kind = self.advance().value;
    }
    let is_reason_string_type = kind == "Error";

    let parameters = if self.check(TokenKind::LeftParen) {
      self.parse_parameter_list()
    } else {
      ThinVec::new()
    };

    let body = Box::new(self.parse_block());

    self.node_from(
      start,
      NodeKind::CatchClause {
        is_reason_string_type,
        kind,
        parameters,
        body,
      },
    )
  }

  fn parse_unchecked_block(&mut self) -> Node {
    let start = self.position;
    self.advance(); // unchecked

    let body = Box::new(self.parse_block());
    self.node_from(start, NodeKind::UncheckedBlock { body })
  }

  fn parse_variable_declaration_statement(&mut self) -> Node {
    let start = self.position;

    let declaration = self.parse_variable_declaration();
    let variables: ThinVec<Option<Node>> = thin_vec![Some(declaration)];

    let initial_value = self
      .matches(TokenKind::Equal)
      .then(|| Box::new(self.parse_expression()));

    self.expect(TokenKind::Semicolon);

    self.node_from(
      start,
      NodeKind::VariableDeclarationStatement {
        variables,
        initial_value,
      },
    )
  }

  /// A statement starting with `(` is either a tuple variable declaration,
  /// e.g. `(uint a, , bool b) = f();`, or an expression. Parse the
  /// declaration speculatively; restore the cursor fully and reparse as an
  /// expression statement when it is not one.
  fn parse_tuple_variable_declaration_or_expression(&mut self) -> Node {
    let start = self.position;
    let saved_errors = self.errors.len();

    self.expect(TokenKind::LeftParen);

    let mut variables: ThinVec<Option<Node>> = ThinVec::new();
    let mut has_types = false;

    while !self.check(TokenKind::RightParen) && !self.is_at_end() {
      if self.matches(TokenKind::Comma) {
        variables.push(None);
        continue;
      }

      if self.is_type_name() {
        has_types = true;
        variables.push(Some(self.parse_variable_declaration()));
      } else {
        break;
      }

      if !self.check(TokenKind::RightParen) && !self.check(TokenKind::Comma) {
        break;
      }
      self.matches(TokenKind::Comma);
    }

    if has_types && self.check(TokenKind::RightParen) {
      self.advance();

      let initial_value = self
        .matches(TokenKind::Equal)
        .then(|| Box::new(self.parse_expression()));
      self.expect(TokenKind::Semicolon);

      return self.node_from(
        start,
        NodeKind::VariableDeclarationStatement {
          variables,
          initial_value,
        },
      );
    }

    // not a declaration: forget anything recorded while speculating
    self.position = start;
    self.errors.truncate(saved_errors);
    self.parse_expression_statement()
  }

  fn parse_expression_statement(&mut self) -> Node {
    let start = self.position;
    let expression = Box::new(self.parse_expression());
    self.expect(TokenKind::Semicolon);
    self.node_from(start, NodeKind::ExpressionStatement { expression })
  }
}

// Expressions
//
// Precedence, lowest to highest: assignment, ternary, logical or, logical
// and, equality, relational, bitwise or, xor, and, shift, additive,
// multiplicative, exponentiation, prefix unary, postfix unary, and finally
// member access / index / call.
impl Parser {
  fn parse_expression(&mut self) -> Node {
    self.parse_assignment()
  }

  fn parse_assignment(&mut self) -> Node {
    let start = self.position;
    let left = self.parse_ternary();

    if self.peek_kind().is_assignment_operator() {
      let operator = self.advance().value;
      let right = self.parse_assignment();

      return self.node_from(
        start,
        NodeKind::BinaryOperation {
          operator,
          left: Box::new(left),
          right: Box::new(right),
        },
      );
    }

    left
  }

  fn parse_ternary(&mut self) -> Node {
    let start = self.position;
    let condition = self.parse_logical_or();

    if self.matches(TokenKind::Question) {
      let true_expression = Box::new(self.parse_expression());
      self.expect(TokenKind::Colon);
      let false_expression = Box::new(self.parse_ternary());

      return self.node_from(
        start,
        NodeKind::Conditional {
          condition: Box::new(condition),
          true_expression,
          false_expression,
        },
      );
    }

    condition
  }

  /// Parse a left associative run of binary operators from `operators`,
  /// with operands parsed by `next`
  fn parse_binary_level(
    &mut self,
    operators: &[TokenKind],
    next: fn(&mut Self) -> Node,
  ) -> Node {
    let start = self.position;
    let mut left = next(self);

    while operators.contains(&self.peek_kind()) {
      let operator = self.advance().value;
      let right = next(self);
      left = self.node_from(
        start,
        NodeKind::BinaryOperation {
          operator,
          left: Box::new(left),
          right: Box::new(right),
        },
      );
    }

    left
  }

  fn parse_logical_or(&mut self) -> Node {
    self.parse_binary_level(&[TokenKind::Or], Self::parse_logical_and)
  }

  fn parse_logical_and(&mut self) -> Node {
    self.parse_binary_level(&[TokenKind::And], Self::parse_equality)
  }

  fn parse_equality(&mut self) -> Node {
    self.parse_binary_level(
      &[TokenKind::EqualEqual, TokenKind::BangEqual],
      Self::parse_relational,
    )
  }

  fn parse_relational(&mut self) -> Node {
    self.parse_binary_level(
      &[
        TokenKind::Less,
        TokenKind::Greater,
        TokenKind::LessEqual,
        TokenKind::GreaterEqual,
      ],
      Self::parse_bitwise_or,
    )
  }

  fn parse_bitwise_or(&mut self) -> Node {
    self.parse_binary_level(&[TokenKind::Pipe], Self::parse_bitwise_xor)
  }

  fn parse_bitwise_xor(&mut self) -> Node {
    self.parse_binary_level(&[TokenKind::Caret], Self::parse_bitwise_and)
  }

  fn parse_bitwise_and(&mut self) -> Node {
    self.parse_binary_level(&[TokenKind::Ampersand], Self::parse_shift)
  }

  fn parse_shift(&mut self) -> Node {
    self.parse_binary_level(
      &[
        TokenKind::LessLess,
        TokenKind::GreaterGreater,
        TokenKind::GreaterGreaterGreater,
      ],
      Self::parse_additive,
    )
  }

  fn parse_additive(&mut self) -> Node {
    self.parse_binary_level(
      &[TokenKind::Plus, TokenKind::Minus],
      Self::parse_multiplicative,
    )
  }

  fn parse_multiplicative(&mut self) -> Node {
    self.parse_binary_level(
      &[TokenKind::Star, TokenKind::Slash, TokenKind::Percent],
      Self::parse_exponentiation,
    )
  }

  fn parse_exponentiation(&mut self) -> Node {
    let start = self.position;
    let left = self.parse_unary();

    // right associative
    if self.check(TokenKind::StarStar) {
      let operator = self.advance().value;
      let right = self.parse_exponentiation();

      return self.node_from(
        start,
        NodeKind::BinaryOperation {
          operator,
          left: Box::new(left),
          right: Box::new(right),
        },
      );
    }

    left
  }

  fn parse_unary(&mut self) -> Node {
    let start = self.position;

    if let TokenKind::Bang
    | TokenKind::Tilde
    | TokenKind::Minus
    | TokenKind::Plus
    | TokenKind::PlusPlus
    | TokenKind::MinusMinus
    | TokenKind::Delete = self.peek_kind()
    {
      let operator = self.advance().value;
      let sub_expression = Box::new(self.parse_unary());

      return self.node_from(
        start,
        NodeKind::UnaryOperation {
          operator,
          sub_expression,
          is_prefix: true,
        },
      );
    }

    self.parse_postfix()
  }

  fn parse_postfix(&mut self) -> Node {
    let start = self.position;
    let mut expression = self.parse_call_member_index(true);

    while let TokenKind::PlusPlus | TokenKind::MinusMinus = self.peek_kind() {
      let operator = self.advance().value;
      expression = self.node_from(
        start,
        NodeKind::UnaryOperation {
          operator,
          sub_expression: Box::new(expression),
          is_prefix: false,
        },
      );
    }

    expression
  }

  /// The tightest binding level: member access, indexing, slicing, calls
  /// and call options. `allow_call_options` is false after `try`, where a
  /// `{` starts the try body instead.
  fn parse_call_member_index(&mut self, allow_call_options: bool) -> Node {
    let start = self.position;
    let mut expression = self.parse_primary();

    loop {
      match self.peek_kind() {
        TokenKind::Dot => {
          self.advance();
          let member = self.advance();
          expression = self.node_from(
            start,
            NodeKind::MemberAccess {
              expression: Box::new(expression),
              member_name: member.value,
            },
          );
        }
        TokenKind::LeftSquare => {
          self.advance();

          let mut index_start = None;
          if !self.check(TokenKind::Colon) && !self.check(TokenKind::RightSquare) {
            index_start = Some(Box::new(self.parse_expression()));
          }

          if self.matches(TokenKind::Colon) {
            let index_end = if self.check(TokenKind::RightSquare) {
              None
            } else {
              Some(Box::new(self.parse_expression()))
            };
            self.expect(TokenKind::RightSquare);

            expression = self.node_from(
              start,
              NodeKind::IndexRangeAccess {
                base: Box::new(expression),
                index_start,
                index_end,
              },
            );
          } else {
            self.expect(TokenKind::RightSquare);
            expression = self.node_from(
              start,
              NodeKind::IndexAccess {
                base: Box::new(expression),
                index: index_start,
              },
            );
          }
        }
        TokenKind::LeftParen => expression = self.parse_function_call(expression, start),
        TokenKind::LeftCurly if allow_call_options => {
          expression = self.parse_function_call_options(expression, start);
        }
        _ => break,
      }
    }

    expression
  }

  fn parse_function_call(&mut self, callee: Node, start: usize) -> Node {
    self.expect(TokenKind::LeftParen);

    let mut arguments: ThinVec<Node> = ThinVec::new();
    let mut names: ThinVec<String> = ThinVec::new();

    if self.matches(TokenKind::LeftCurly) {
      // named arguments: f({value: 1, from: a})
      while !self.check(TokenKind::RightCurly) && !self.is_at_end() {
        names.push(self.expect(TokenKind::Identifier).value);
        self.expect(TokenKind::Colon);
        arguments.push(self.parse_expression());

        if !self.check(TokenKind::RightCurly) {
          self.expect(TokenKind::Comma);
        }
      }
      self.expect(TokenKind::RightCurly);
    } else {
      arguments = self.parse_expression_list();
    }

    self.expect(TokenKind::RightParen);

    self.node_from(
      start,
      NodeKind::FunctionCall {
        expression: Box::new(callee),
        arguments,
        names,
      },
    )
  }

  /// `{value: 1, gas: 100}` following a call target
  fn parse_function_call_options(&mut self, expression: Node, start: usize) -> Node {
    self.expect(TokenKind::LeftCurly);

    let mut names: ThinVec<String> = ThinVec::new();
    let mut options: ThinVec<Node> = ThinVec::new();

    while !self.check(TokenKind::RightCurly) && !self.is_at_end() {
      names.push(self.expect(TokenKind::Identifier).value);
      self.expect(TokenKind::Colon);
      options.push(self.parse_expression());

      if !self.check(TokenKind::RightCurly) {
        self.expect(TokenKind::Comma);
      }
    }
    self.expect(TokenKind::RightCurly);

    self.node_from(
      start,
      NodeKind::FunctionCallOptions {
        expression: Box::new(expression),
        names,
        options,
      },
    )
  }

  fn parse_primary(&mut self) -> Node {
    let start = self.position;

    match self.peek_kind() {
      TokenKind::Identifier => {
        let token = self.advance();
        self.identifier(&token)
      }
      // contextual keywords double as identifiers in expressions
      kind if kind.is_contextual_keyword() => {
        let token = self.advance();
        self.identifier(&token)
      }

      TokenKind::Number => {
        let number = self.advance().value;
        let subdenomination = if self.peek_number_unit() {
          self.advance().value
        } else {
          String::new()
        };

        self.node_from(
          start,
          NodeKind::NumberLiteral {
            number,
            subdenomination,
          },
        )
      }
      TokenKind::HexNumber => {
        let number = self.advance().value;
        self.node_from(
          start,
          NodeKind::NumberLiteral {
            number,
            subdenomination: String::new(),
          },
        )
      }

      TokenKind::String
      | TokenKind::HexString
      | TokenKind::UnicodeString
      | TokenKind::UnterminatedString => self.parse_string_literal(),

      TokenKind::True => {
        let token = self.advance();
        self.token_node(NodeKind::BooleanLiteral { value: true }, &token)
      }
      TokenKind::False => {
        let token = self.advance();
        self.token_node(NodeKind::BooleanLiteral { value: false }, &token)
      }

      TokenKind::LeftParen => self.parse_tuple_or_parenthesized(),
      TokenKind::LeftSquare => self.parse_array_literal(),
      TokenKind::New => self.parse_new_expression(),
      TokenKind::Type => self.parse_type_expression(),
      TokenKind::Payable => self.parse_payable_conversion(),

      // an elementary type name used as an expression, e.g. `uint256(x)`
      kind if kind.is_elementary_type() => self.parse_elementary_type_name(),

      TokenKind::Unknown => {
        let token = self.peek().clone();
        self.error(ParseError::UnknownCharacter(token));
        self.advance();
        self.node_from(
          start,
          NodeKind::Identifier {
            name: String::new(),
          },
        )
      }
      _ => {
        let token = self.peek().clone();
        self.error(ParseError::ExpectedExpression(token));
        self.advance();
        self.node_from(
          start,
          NodeKind::Identifier {
            name: String::new(),
          },
        )
      }
    }
  }

  /// Adjacent string literals concatenate into one node; any `hex` part
  /// makes the whole literal a `HexLiteral`, any `unicode` part marks it
  fn parse_string_literal(&mut self) -> Node {
    let start = self.position;

    let mut parts: ThinVec<String> = ThinVec::new();
    let mut is_unicode = false;
    let mut is_hex = false;

    while let TokenKind::String
    | TokenKind::UnicodeString
    | TokenKind::HexString
    | TokenKind::UnterminatedString = self.peek_kind()
    {
      let token = self.advance();
      parts.push(token.value.clone());
      match token.kind {
        TokenKind::UnicodeString => is_unicode = true,
        TokenKind::HexString => is_hex = true,
        TokenKind::UnterminatedString => {
          self.error(ParseError::UnterminatedString(token));
        }
        _ => {}
      }
    }

    let value = parts.first().cloned().unwrap_or_default();

    if is_hex {
      self.node_from(start, NodeKind::HexLiteral { value, parts })
    } else {
      self.node_from(
        start,
        NodeKind::StringLiteral {
          value,
          parts,
          is_unicode,
        },
      )
    }
  }

  /// Disambiguate `(` in expression position: an empty tuple, a tuple of
  /// components (possibly with empty slots), or a plain parenthesised
  /// expression which is returned bare
  fn parse_tuple_or_parenthesized(&mut self) -> Node {
    let start = self.position;
    self.advance(); // (

    if self.check(TokenKind::RightParen) {
      self.advance();
      return self.node_from(
        start,
        NodeKind::TupleExpression {
          components: ThinVec::new(),
          is_array: false,
        },
      );
    }

    let mut components: ThinVec<Option<Node>> = ThinVec::new();
    if self.check(TokenKind::Comma) {
      components.push(None);
    } else {
      components.push(Some(self.parse_expression()));
    }

    if self.check(TokenKind::Comma) {
      while self.matches(TokenKind::Comma) {
        if self.check(TokenKind::RightParen) || self.check(TokenKind::Comma) {
          components.push(None);
        } else {
          components.push(Some(self.parse_expression()));
        }
      }
      self.expect(TokenKind::RightParen);

      return self.node_from(
        start,
        NodeKind::TupleExpression {
          components,
          is_array: false,
        },
      );
    }

    self.expect(TokenKind::RightParen);
    match components.into_iter().next() {
      Some(Some(expression)) => expression,
      _ => self.node_from(
        start,
        NodeKind::Identifier {
          name: String::new(),
        },
      ),
    }
  }

  fn parse_array_literal(&mut self) -> Node {
    let start = self.position;
    self.advance(); // [

    let mut components: ThinVec<Option<Node>> = ThinVec::new();
    if !self.check(TokenKind::RightSquare) {
      components = self.parse_expression_list().into_iter().map(Some).collect();
    }
    self.expect(TokenKind::RightSquare);

    self.node_from(
      start,
      NodeKind::TupleExpression {
        components,
        is_array: true,
      },
    )
  }

  fn parse_new_expression(&mut self) -> Node {
    let start = self.position;
    self.advance(); // new

    let type_name = Box::new(self.parse_type_name());
    self.node_from(start, NodeKind::NewExpression { type_name })
  }

  /// `type(T)` is encoded as a call of an identifier named `type`
  fn parse_type_expression(&mut self) -> Node {
    let start = self.position;
    let keyword = self.advance(); // type

    self.expect(TokenKind::LeftParen);
    let type_name = self.parse_type_name();
    self.expect(TokenKind::RightParen);

    let callee = self.token_node(
      NodeKind::Identifier {
        name: "type".into(),
      },
      &keyword,
    );

    self.node_from(
      start,
      NodeKind::FunctionCall {
        expression: Box::new(callee),
        arguments: thin_vec![type_name],
        names: ThinVec::new(),
      },
    )
  }

  /// `payable(e)` is encoded as a call whose callee is the elementary type
  /// `address` with payable mutability
  fn parse_payable_conversion(&mut self) -> Node {
    let start = self.position;
    let keyword = self.advance(); // payable

    self.expect(TokenKind::LeftParen);
    let argument = self.parse_expression();
    self.expect(TokenKind::RightParen);

    let callee = self.token_node(
      NodeKind::ElementaryTypeName {
        name: "address".into(),
        state_mutability: "payable".into(),
      },
      &keyword,
    );

    self.node_from(
      start,
      NodeKind::FunctionCall {
        expression: Box::new(callee),
        arguments: thin_vec![argument],
        names: ThinVec::new(),
      },
    )
  }

  fn parse_expression_list(&mut self) -> ThinVec<Node> {
    let mut expressions: ThinVec<Node> = ThinVec::new();

    if let TokenKind::RightParen | TokenKind::RightSquare | TokenKind::RightCurly =
      self.peek_kind()
    {
      return expressions;
    }

    expressions.push(self.parse_expression());
    while self.matches(TokenKind::Comma) {
      if let TokenKind::RightParen | TokenKind::RightSquare | TokenKind::RightCurly =
        self.peek_kind()
      {
        break;
      }
      expressions.push(self.parse_expression());
    }

    expressions
  }

  fn peek_number_unit(&self) -> bool {
    self.check(TokenKind::Identifier)
      && matches!(
        self.peek().value.as_str(),
        "wei" | "gwei" | "ether" | "seconds" | "minutes" | "hours" | "days" | "weeks" | "years"
      )
  }
}

// Types
impl Parser {
  fn is_type_name(&self) -> bool {
    self.peek_kind().is_elementary_type()
      || self.check(TokenKind::Mapping)
      || self.check(TokenKind::Function)
      || self.check(TokenKind::Identifier)
  }

  fn parse_type_name(&mut self) -> Node {
    let start = self.position;

    let mut type_name = if self.check(TokenKind::Function) {
      self.parse_function_type_name()
    } else if self.check(TokenKind::Mapping) {
      self.parse_mapping_type()
    } else if self.peek_kind().is_elementary_type() {
      self.parse_elementary_type_name()
    } else {
      self.parse_user_defined_type_name()
    };

    // array dimensions bind outside-in: uint[2][] is an array of uint[2]
    while self.matches(TokenKind::LeftSquare) {
      let length = if self.check(TokenKind::RightSquare) {
        None
      } else {
        Some(Box::new(self.parse_expression()))
      };
      self.expect(TokenKind::RightSquare);

      type_name = self.node_from(
        start,
        NodeKind::ArrayTypeName {
          base_type_name: Box::new(type_name),
          length,
        },
      );
    }

    type_name
  }

  fn parse_elementary_type_name(&mut self) -> Node {
    let start = self.position;
    let token = self.advance();

    let state_mutability = if token.kind == TokenKind::Address && self.matches(TokenKind::Payable)
    {
      "payable".into()
    } else {
      String::new()
    };

    self.node_from(
      start,
      NodeKind::ElementaryTypeName {
        name: token.value,
        state_mutability,
      },
    )
  }

  fn parse_user_defined_type_name(&mut self) -> Node {
    let start = self.position;
    let name_path = self.parse_dotted_name();
    self.node_from(start, NodeKind::UserDefinedTypeName { name_path })
  }

  /// A dotted identifier path like `A.B.C`
  fn parse_dotted_name(&mut self) -> String {
    let mut path = self.expect(TokenKind::Identifier).value;
    while self.matches(TokenKind::Dot) {
      path.push('.');
      path.push_str(&self.expect(TokenKind::Identifier).value);
    }
    path
  }

  fn parse_mapping_type(&mut self) -> Node {
    let start = self.position;
    self.advance(); // mapping
    self.expect(TokenKind::LeftParen);

    let key_type = if self.peek_kind().is_elementary_type() {
      self.parse_elementary_type_name()
    } else {
      self.parse_user_defined_type_name()
    };

    // named mapping parameters (0.8.18+), purely descriptive
    let key_name = if self.check(TokenKind::Identifier) {
      let token = self.advance();
      Some(Box::new(self.identifier(&token)))
    } else {
      None
    };

    self.expect(TokenKind::Arrow);

    let value_type = self.parse_type_name();

    let value_name = if self.check(TokenKind::Identifier) {
      let token = self.advance();
      Some(Box::new(self.identifier(&token)))
    } else {
      None
    };

    self.expect(TokenKind::RightParen);

    self.node_from(
      start,
      NodeKind::Mapping {
        key_type: Box::new(key_type),
        key_name,
        value_type: Box::new(value_type),
        value_name,
      },
    )
  }

  fn parse_function_type_name(&mut self) -> Node {
    let start = self.position;
    self.advance(); // function

    let parameter_types = self.parse_parameter_list();

    let mut visibility = String::new();
    let mut state_mutability = String::new();
    loop {
      match self.peek_kind() {
        TokenKind::Internal => {
          self.advance();
          visibility = "internal".into();
        }
        TokenKind::External => {
          self.advance();
          visibility = "external".into();
        }
        TokenKind::Pure => {
          self.advance();
          state_mutability = "pure".into();
        }
        TokenKind::View => {
          self.advance();
          state_mutability = "view".into();
        }
        TokenKind::Payable => {
          self.advance();
          state_mutability = "payable".into();
        }
        _ => break,
      }
    }

    let return_types = if self.matches(TokenKind::Returns) {
      self.parse_parameter_list()
    } else {
      ThinVec::new()
    };

    self.node_from(
      start,
      NodeKind::FunctionTypeName {
        parameter_types,
        return_types,
        visibility,
        state_mutability,
      },
    )
  }

  fn parse_parameter_list(&mut self) -> ThinVec<Node> {
    let mut parameters: ThinVec<Node> = ThinVec::new();

    self.expect(TokenKind::LeftParen);
    while !self.check(TokenKind::RightParen) && !self.is_at_end() {
      parameters.push(self.parse_variable_declaration());
      if !self.check(TokenKind::RightParen) {
        self.expect(TokenKind::Comma);
      }
    }
    self.expect(TokenKind::RightParen);

    parameters
  }

  /// `typeName (memory|storage|calldata)? name?` — parameters and local
  /// variable declarations share this shape. The name may also be a
  /// contextual keyword such as `from`
  fn parse_variable_declaration(&mut self) -> Node {
    let start = self.position;

    let type_name = Box::new(self.parse_type_name());

    let storage_location = if let TokenKind::Memory | TokenKind::Storage | TokenKind::Calldata =
      self.peek_kind()
    {
      self.advance().value
    } else {
      String::new()
    };

    let mut name = String::new();
    let mut identifier = None;
    if self.check(TokenKind::Identifier) || self.peek_kind().is_contextual_keyword() {
      let token = self.advance();
      name = token.value.clone();
      identifier = Some(Box::new(self.identifier(&token)));
    }

    self.node_from(
      start,
      NodeKind::VariableDeclaration {
        type_name,
        name,
        identifier,
        storage_location,
        is_state_var: false,
        is_indexed: false,
        is_immutable: false,
        overrides: ThinVec::new(),
        visibility: String::new(),
        is_declared_const: false,
      },
    )
  }

  /// A state variable (or file-level constant): type, a free-order set of
  /// modifiers, a name, and an optional initial value
  fn parse_state_variable_declaration(&mut self) -> Node {
    let start = self.position;

    let type_name = Box::new(self.parse_type_name());

    let mut visibility = String::new();
    let mut storage_location = String::new();
    let mut is_declared_const = false;
    let mut is_immutable = false;
    let mut overrides: ThinVec<Node> = ThinVec::new();

    loop {
      match self.peek_kind() {
        TokenKind::Public => {
          self.advance();
          visibility = "public".into();
        }
        TokenKind::Private => {
          self.advance();
          visibility = "private".into();
        }
        TokenKind::Internal => {
          self.advance();
          visibility = "internal".into();
        }
        TokenKind::Constant => {
          self.advance();
          is_declared_const = true;
        }
        TokenKind::Immutable => {
          self.advance();
          is_immutable = true;
        }
        TokenKind::Transient => {
          // transient storage (0.8.24+)
          self.advance();
          storage_location = "transient".into();
        }
        TokenKind::Override => {
          self.advance();
          overrides.extend(self.parse_override_list());
        }
        _ => break,
      }
    }

    let name_token = self.expect(TokenKind::Identifier);
    let name = name_token.value.clone();
    let identifier = Some(Box::new(self.identifier(&name_token)));

    let initial_value = self
      .matches(TokenKind::Equal)
      .then(|| Box::new(self.parse_expression()));

    self.expect(TokenKind::Semicolon);

    let declaration = self.node_from(
      start,
      NodeKind::VariableDeclaration {
        type_name,
        name,
        identifier,
        storage_location,
        is_state_var: true,
        is_indexed: false,
        is_immutable,
        overrides,
        visibility,
        is_declared_const,
      },
    );

    self.node_from(
      start,
      NodeKind::StateVariableDeclaration {
        variables: thin_vec![declaration],
        initial_value,
      },
    )
  }

  fn parse_struct_definition(&mut self) -> Node {
    let start = self.position;
    self.advance(); // struct
    let name = self.expect(TokenKind::Identifier).value;

    self.expect(TokenKind::LeftCurly);

    let mut members: ThinVec<Node> = ThinVec::new();
    while !self.check(TokenKind::RightCurly) && !self.is_at_end() {
      let member_start = self.position;
      let type_name = Box::new(self.parse_type_name());
      let member_token = self.expect(TokenKind::Identifier);
      self.expect(TokenKind::Semicolon);

      let member_name = member_token.value.clone();
      let identifier = Some(Box::new(self.identifier(&member_token)));
      members.push(self.node_from(
        member_start,
        NodeKind::VariableDeclaration {
          type_name,
          name: member_name,
          identifier,
          storage_location: String::new(),
          is_state_var: false,
          is_indexed: false,
          is_immutable: false,
          overrides: ThinVec::new(),
          visibility: String::new(),
          is_declared_const: false,
        },
      ));
    }

    self.expect(TokenKind::RightCurly);
    self.node_from(start, NodeKind::StructDefinition { name, members })
  }

  fn parse_enum_definition(&mut self) -> Node {
    let start = self.position;
    self.advance(); // enum
    let name = self.expect(TokenKind::Identifier).value;

    self.expect(TokenKind::LeftCurly);

    let mut members: ThinVec<Node> = ThinVec::new();
    while !self.check(TokenKind::RightCurly) && !self.is_at_end() {
      let value_token = self.expect(TokenKind::Identifier);
      members.push(self.token_node(
        NodeKind::EnumValue {
          name: value_token.value.clone(),
        },
        &value_token,
      ));

      if !self.check(TokenKind::RightCurly) {
        self.expect(TokenKind::Comma);
      }
    }

    self.expect(TokenKind::RightCurly);
    self.node_from(start, NodeKind::EnumDefinition { name, members })
  }

  fn parse_event_definition(&mut self) -> Node {
    let start = self.position;
    self.advance(); // event
    let name = self.expect(TokenKind::Identifier).value;

    self.expect(TokenKind::LeftParen);

    let mut parameters: ThinVec<Node> = ThinVec::new();
    while !self.check(TokenKind::RightParen) && !self.is_at_end() {
      let parameter_start = self.position;
      let type_name = Box::new(self.parse_type_name());

      let is_indexed = self.matches(TokenKind::Indexed);

      let mut parameter_name = String::new();
      let mut identifier = None;
      if self.check(TokenKind::Identifier) || self.peek_kind().is_contextual_keyword() {
        let token = self.advance();
        parameter_name = token.value.clone();
        identifier = Some(Box::new(self.identifier(&token)));
      }

      parameters.push(self.node_from(
        parameter_start,
        NodeKind::VariableDeclaration {
          type_name,
          name: parameter_name,
          identifier,
          storage_location: String::new(),
          is_state_var: false,
          is_indexed,
          is_immutable: false,
          overrides: ThinVec::new(),
          visibility: String::new(),
          is_declared_const: false,
        },
      ));

      if !self.matches(TokenKind::Comma) && !self.check(TokenKind::RightParen) {
        // skip an unexpected token so the loop always makes progress
        self.advance();
      }
    }

    self.expect(TokenKind::RightParen);

    let is_anonymous = self.matches(TokenKind::Anonymous);
    self.expect(TokenKind::Semicolon);

    self.node_from(
      start,
      NodeKind::EventDefinition {
        name,
        parameters,
        is_anonymous,
      },
    )
  }

  fn parse_error_definition(&mut self) -> Node {
    let start = self.position;
    self.advance(); // error
    let name = self.expect(TokenKind::Identifier).value;

    self.expect(TokenKind::LeftParen);

    let mut parameters: ThinVec<Node> = ThinVec::new();
    while !self.check(TokenKind::RightParen) && !self.is_at_end() {
      let parameter_start = self.position;
      let type_name = Box::new(self.parse_type_name());

      let mut parameter_name = String::new();
      let mut identifier = None;
      if self.check(TokenKind::Identifier) || self.peek_kind().is_contextual_keyword() {
        let token = self.advance();
        parameter_name = token.value.clone();
        identifier = Some(Box::new(self.identifier(&token)));
      }

      parameters.push(self.node_from(
        parameter_start,
        NodeKind::VariableDeclaration {
          type_name,
          name: parameter_name,
          identifier,
          storage_location: String::new(),
          is_state_var: false,
          is_indexed: false,
          is_immutable: false,
          overrides: ThinVec::new(),
          visibility: String::new(),
          is_declared_const: false,
        },
      ));

      if !self.check(TokenKind::RightParen) {
        self.expect(TokenKind::Comma);
      }
    }

    self.expect(TokenKind::RightParen);
    self.expect(TokenKind::Semicolon);

    self.node_from(start, NodeKind::ErrorDefinition { name, parameters })
  }

  /// `using Library for Type;` or `using { fn1 as +, fn2 } for Type global;`
  fn parse_using_directive(&mut self) -> Node {
    let start = self.position;
    self.advance(); // using

    let mut functions: ThinVec<String> = ThinVec::new();
    let mut operators: ThinVec<Option<String>> = ThinVec::new();
    let mut library_name = String::new();

    if self.matches(TokenKind::LeftCurly) {
      while !self.check(TokenKind::RightCurly) && !self.is_at_end() {
        functions.push(self.expect(TokenKind::Identifier).value);
        operators.push(self.matches(TokenKind::As).then(|| self.advance().value));

        if !self.check(TokenKind::RightCurly) {
          self.expect(TokenKind::Comma);
        }
      }
      self.expect(TokenKind::RightCurly);
    } else {
      library_name = self.parse_dotted_name();
    }

    self.expect(TokenKind::For);

    let type_name = if self.matches(TokenKind::Star) {
      None
    } else {
      Some(Box::new(self.parse_type_name()))
    };

    let is_global = self.matches(TokenKind::Global);
    self.expect(TokenKind::Semicolon);

    self.node_from(
      start,
      NodeKind::UsingForDeclaration {
        type_name,
        functions,
        operators,
        library_name,
        is_global,
      },
    )
  }

  fn parse_user_defined_value_type_definition(&mut self) -> Node {
    let start = self.position;
    self.advance(); // type
    let name = self.expect(TokenKind::Identifier).value;
    self.expect(TokenKind::Is);

    let underlying_type = Box::new(self.parse_elementary_type_name());
    self.expect(TokenKind::Semicolon);

    self.node_from(
      start,
      NodeKind::UserDefinedValueTypeDefinition {
        name,
        underlying_type,
      },
    )
  }
}

// Inline assembly
impl Parser {
  fn parse_assembly_statement(&mut self) -> Node {
    let start = self.position;
    self.advance(); // assembly

    let language = if self.check(TokenKind::String) {
      self.advance().value
    } else {
      String::new()
    };

    let body = Box::new(self.parse_assembly_block());

    self.node_from(start, NodeKind::InlineAssembly { language, body })
  }

  fn parse_assembly_block(&mut self) -> Node {
    let start = self.position;
    self.expect(TokenKind::LeftCurly);

    let mut operations: ThinVec<Node> = ThinVec::new();
    while !self.check(TokenKind::RightCurly) && !self.is_at_end() {
      if let Some(operation) = self.parse_assembly_operation() {
        operations.push(operation);
      }
    }

    self.expect(TokenKind::RightCurly);
    self.node_from(start, NodeKind::AssemblyBlock { operations })
  }

  fn parse_assembly_operation(&mut self) -> Option<Node> {
    match self.peek_kind() {
      TokenKind::LeftCurly => Some(self.parse_assembly_block()),
      TokenKind::Let => Some(self.parse_assembly_local_definition()),
      TokenKind::If => Some(self.parse_assembly_if()),
      TokenKind::For => Some(self.parse_assembly_for()),
      TokenKind::Switch => Some(self.parse_assembly_switch()),
      TokenKind::Function => Some(self.parse_assembly_function_definition()),
      TokenKind::Identifier => Some(self.parse_assembly_expression_or_assignment()),
      _ => {
        let token = self.peek().clone();
        self.error(ParseError::UnexpectedToken(token));
        if !self.options.tolerant {
          self.advance();
        }
        None
      }
    }
  }

  /// `:=` is not an operator token, it is a `:` followed by a `=`
  fn matches_assembly_assign(&mut self) -> bool {
    if self.check(TokenKind::Colon) && self.peek_kind_at(1) == TokenKind::Equal {
      self.advance();
      self.advance();
      true
    } else {
      false
    }
  }

  fn parse_assembly_local_definition(&mut self) -> Node {
    let start = self.position;
    self.advance(); // let

    let mut names: ThinVec<Node> = ThinVec::new();
    loop {
      let token = self.expect(TokenKind::Identifier);
      names.push(self.identifier(&token));
      if !self.matches(TokenKind::Comma) {
        break;
      }
    }

    let expression = self
      .matches_assembly_assign()
      .then(|| Box::new(self.parse_assembly_expression()));

    self.node_from(
      start,
      NodeKind::AssemblyLocalDefinition { names, expression },
    )
  }

  fn parse_assembly_if(&mut self) -> Node {
    let start = self.position;
    self.advance(); // if

    let condition = Box::new(self.parse_assembly_expression());
    let body = Box::new(self.parse_assembly_block());

    self.node_from(start, NodeKind::AssemblyIf { condition, body })
  }

  fn parse_assembly_for(&mut self) -> Node {
    let start = self.position;
    self.advance(); // for

    let pre = Box::new(self.parse_assembly_block());
    let condition = Box::new(self.parse_assembly_expression());
    let post = Box::new(self.parse_assembly_block());
    let body = Box::new(self.parse_assembly_block());

    self.node_from(
      start,
      NodeKind::AssemblyFor {
        pre,
        condition,
        post,
        body,
      },
    )
  }

  fn parse_assembly_switch(&mut self) -> Node {
    let start = self.position;
    self.advance(); // switch

    let expression = Box::new(self.parse_assembly_expression());

    let mut cases: ThinVec<Node> = ThinVec::new();
    while let TokenKind::Case | TokenKind::Default = self.peek_kind() {
      let case_start = self.position;
      let is_default = self.peek_kind() == TokenKind::Default;
      self.advance();

      let value = if is_default {
        None
      } else {
        Some(Box::new(self.parse_assembly_literal()))
      };
      let body = Box::new(self.parse_assembly_block());

      cases.push(self.node_from(
        case_start,
        NodeKind::AssemblyCase {
          value,
          body,
          default: is_default,
        },
      ));
    }

    self.node_from(start, NodeKind::AssemblySwitch { expression, cases })
  }

  fn parse_assembly_function_definition(&mut self) -> Node {
    let start = self.position;
    self.advance(); // function
    let name = self.expect(TokenKind::Identifier).value;

    self.expect(TokenKind::LeftParen);
    let mut arguments: ThinVec<Node> = ThinVec::new();
    while !self.check(TokenKind::RightParen) && !self.is_at_end() {
      let token = self.expect(TokenKind::Identifier);
      arguments.push(self.identifier(&token));
      if !self.check(TokenKind::RightParen) {
        self.expect(TokenKind::Comma);
      }
    }
    self.expect(TokenKind::RightParen);

    let mut return_arguments: ThinVec<Node> = ThinVec::new();
    if self.matches(TokenKind::RightArrow) {
      loop {
        let token = self.expect(TokenKind::Identifier);
        return_arguments.push(self.identifier(&token));
        if !self.matches(TokenKind::Comma) {
          break;
        }
      }
    }

    let body = Box::new(self.parse_assembly_block());

    self.node_from(
      start,
      NodeKind::AssemblyFunctionDefinition {
        name,
        arguments,
        return_arguments,
        body,
      },
    )
  }

  fn parse_assembly_expression_or_assignment(&mut self) -> Node {
    let start = self.position;

    let first_token = self.peek().clone();
    let mut names: ThinVec<Node> = ThinVec::new();
    loop {
      let token = self.expect(TokenKind::Identifier);
      names.push(self.identifier(&token));
      if !self.matches(TokenKind::Comma) {
        break;
      }
    }

    if self.matches_assembly_assign() {
      let expression = Box::new(self.parse_assembly_expression());
      return self.node_from(start, NodeKind::AssemblyAssignment { names, expression });
    }

    if names.len() == 1 && self.check(TokenKind::LeftParen) {
      return self.parse_assembly_call(first_token.value, start);
    }

    self.token_node(
      NodeKind::AssemblyIdentifier {
        name: first_token.value.clone(),
      },
      &first_token,
    )
  }

  fn parse_assembly_call(&mut self, function_name: String, start: usize) -> Node {
    self.expect(TokenKind::LeftParen);

    let mut arguments: ThinVec<Node> = ThinVec::new();
    while !self.check(TokenKind::RightParen) && !self.is_at_end() {
      arguments.push(self.parse_assembly_expression());
      if !self.check(TokenKind::RightParen) {
        self.expect(TokenKind::Comma);
      }
    }
    self.expect(TokenKind::RightParen);

    self.node_from(
      start,
      NodeKind::AssemblyCall {
        function_name,
        arguments,
      },
    )
  }

  fn parse_assembly_expression(&mut self) -> Node {
    if self.check(TokenKind::Identifier) {
      let start = self.position;
      let token = self.advance();

      if self.check(TokenKind::LeftParen) {
        return self.parse_assembly_call(token.value, start);
      }
      return self.token_node(NodeKind::AssemblyIdentifier { name: token.value.clone() }, &token);
    }

    self.parse_assembly_literal()
  }

  fn parse_assembly_literal(&mut self) -> Node {
    let token = self.advance();

    let kind = match token.kind {
      TokenKind::String
      | TokenKind::HexString
      | TokenKind::UnicodeString
      | TokenKind::UnterminatedString => "string",
      TokenKind::True | TokenKind::False => "boolean",
      _ => "number",
    };

    self.token_node(
      NodeKind::AssemblyLiteral {
        kind: kind.into(),
        value: token.value.clone(),
      },
      &token,
    )
  }
}

/// An error which arose during parsing
#[derive(Debug, Clone)]
pub enum ParseError {
  /// Expected a token of a certain kind
  Expected {
    /// The kind of token which was expected
    expected: TokenKind,
    /// The token which was received instead
    received: Token,
  },
  /// Expected the start of an expression
  ExpectedExpression(Token),
  /// `abstract` must be followed by `contract`
  ExpectedContract(Token),
  /// A token which no top-level construct starts with
  UnexpectedToken(Token),
  /// A token which no contract member starts with
  UnexpectedContractMember(Token),
  /// An unknown character in the source
  UnknownCharacter(Token),
  /// A string literal missing its closing quote
  UnterminatedString(Token),
}

impl ParseError {
  /// The title of the error message
  #[must_use]
  pub fn title(&self) -> String {
    match self {
      Self::Expected { expected, .. } => format!("Expected {expected}"),
      Self::ExpectedExpression(_) => "Expected Expression".into(),
      Self::ExpectedContract(_) => "Expected Contract".into(),
      Self::UnexpectedToken(_) => "Unexpected Token".into(),
      Self::UnexpectedContractMember(_) => "Unexpected Token in Contract".into(),
      Self::UnknownCharacter(_) => "Unknown Character".into(),
      Self::UnterminatedString(_) => "Unterminated String".into(),
    }
  }

  /// The body of the error message describing what has gone wrong
  #[must_use]
  pub fn message(&self) -> String {
    match self {
      Self::Expected { expected, received } if received.value.is_empty() => {
        format!("expected {expected}, got {}", received.kind)
      }
      Self::Expected { expected, received } => {
        format!("expected {expected}, got {}", received.value)
      }
      Self::ExpectedExpression(token) => {
        format!("expected expression, got {}", token.kind)
      }
      Self::ExpectedContract(_) => "expected 'contract' after 'abstract'".into(),
      Self::UnexpectedToken(token) => format!("unexpected token: {}", token.value),
      Self::UnexpectedContractMember(token) => {
        format!("unexpected token in contract body: {}", token.value)
      }
      Self::UnknownCharacter(_) => "got unknown character".into(),
      Self::UnterminatedString(_) => "missing closing quote for string".into(),
    }
  }

  fn token(&self) -> &Token {
    match self {
      Self::Expected { received, .. } => received,
      Self::ExpectedExpression(token)
      | Self::ExpectedContract(token)
      | Self::UnexpectedToken(token)
      | Self::UnexpectedContractMember(token)
      | Self::UnknownCharacter(token)
      | Self::UnterminatedString(token) => token,
    }
  }

  /// The position of the offending token
  #[must_use]
  pub fn position(&self) -> Position {
    let token = self.token();
    Position {
      line: token.line,
      column: token.column,
    }
  }
}

impl fmt::Display for ParseError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.message())
  }
}
impl error::Error for ParseError {}
