use anstream::eprintln;
use owo_colors::OwoColorize;
use solast::{ParseError, Position};
use std::fmt;

pub struct Message {
  title: String,
  body: String,
}

impl Message {
  pub fn error(message: &str) -> Self {
    Self {
      title: message.to_owned(),
      body: String::new(),
    }
  }
}

impl fmt::Display for Message {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", "✕ Error".bold().red())?;
    writeln!(f, "{} {}", ":".bold(), &self.title.bold())?;

    if !self.body.is_empty() {
      writeln!(f, "{}", &self.body)?;
    }

    Ok(())
  }
}

impl From<&ParseError> for Message {
  fn from(error: &ParseError) -> Self {
    Self {
      title: error.title(),
      body: error.message(),
    }
  }
}

/// A frame around the source line an error points at
pub struct CodeFrame<'a> {
  title: &'a str,
  source: &'a str,
  position: Position,
}

impl<'a> CodeFrame<'a> {
  pub fn new(title: &'a str, source: &'a str, position: Position) -> Self {
    Self {
      title,
      source,
      position,
    }
  }
}

impl fmt::Display for CodeFrame<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let line = self.position.line;
    let line_text = self.source.lines().nth(line.saturating_sub(1)).unwrap_or("");

    writeln!(f, "    ╭─[{}]", self.title)?;
    writeln!(f, "{line:>3} │ {line_text}")?;
    write!(f, "────╯")
  }
}

/// Print a parse error with its code frame
pub fn report(filename: &str, source: &str, error: &ParseError) {
  eprintln!("{}", Message::from(error));
  eprintln!("{}", CodeFrame::new(filename, source, error.position()));
}
