//! # Solast
//! Parse Solidity source code into a syntax tree.
//!
//! The front end is a hand-written tokeniser followed by a recursive descent
//! parser. The tree it produces follows the JSON AST schema of the TypeScript
//! [solidity-parser](https://github.com/solidity-parser/parser), covering
//! Solidity 0.4 through 0.8.24 (custom errors, user-defined value types,
//! named mapping parameters, transient storage, and `layout at`).
//!
//! Parsing is a pure function of the source and options: no shared state, so
//! independent parses may run on independent threads. In tolerant mode the
//! parser recovers from errors and always returns a tree, together with the
//! list of diagnostics it collected along the way.

pub mod ast;
mod parser;
mod tokeniser;
pub mod version;


/// Parses a source code string into an [`Ast`], with default options.
///
/// # Examples
/// ```
/// use solast::parse;
/// let ast = parse("contract C { uint256 x; }").unwrap();
///
/// assert!(ast.is_valid());
/// ```
///
/// # Errors
/// The first parse error, if the syntax of the source is invalid.
pub fn parse(source: &str) -> Result<Ast, ParseError> {
  parser::Parser::new(source, Options::default()).parse()
}

/// Parses a source code string into an [`Ast`].
///
/// With [`Options::tolerant`] the parse always succeeds and collects its
/// diagnostics in [`Ast::errors`]; otherwise the first error is returned.
/// [`Options::loc`] and [`Options::range`] attach source locations to every
/// node.
///
/// # Examples
/// ```
/// use solast::{parse_with, Options};
///
/// let options = Options { tolerant: true, ..Options::default() };
/// let ast = parse_with("contract C { not valid }", options).unwrap();
///
/// assert!(!ast.is_valid());
/// ```
///
/// # Errors
/// In strict mode, the first parse error.
pub fn parse_with(source: &str, options: Options) -> Result<Ast, ParseError> {
  parser::Parser::new(source, options).parse()
}

/// Get the tokens from a source code string
pub fn tokenise(source: &str) -> impl Iterator<Item = tokeniser::Token> + '_ {
  tokeniser::Tokeniser::from(source)
}

pub use ast::{walk, Ast, Loc, Node, NodeKind, Position};
pub use parser::{Options, ParseError, Parser};
pub use tokeniser::{Token, TokenKind};
