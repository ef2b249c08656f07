use super::diagnostics::{self, Message};
use super::ParseOptions;
use anstream::{eprintln, println};
use solast::{parse_with, version, Options};
use std::{fs, io::Read};

/// Read the input file, or stdin when no file (or `-`) was given
fn read_input(file: Option<&str>) -> Result<(String, String), ()> {
  match file {
    Some(filename) if filename != "-" => match fs::read_to_string(filename) {
      Ok(source) => Ok((filename.to_owned(), source)),
      Err(_) => {
        eprintln!("{}", Message::error("File not found"));
        Err(())
      }
    },
    _ => {
      let mut source = String::new();
      if std::io::stdin().read_to_string(&mut source).is_err() {
        eprintln!("{}", Message::error("Problem reading stdin"));
        return Err(());
      }
      Ok(("stdin".to_owned(), source))
    }
  }
}

pub fn parse(options: &ParseOptions) -> Result<(), ()> {
  let (filename, source) = read_input(options.file.as_deref())?;

  let parse_options = Options {
    tolerant: options.tolerant,
    loc: options.loc,
    range: options.range,
  };

  let ast = match parse_with(&source, parse_options) {
    Ok(ast) => ast,
    Err(error) => {
      diagnostics::report(&filename, &source, &error);
      return Err(());
    }
  };

  let json = if options.compact {
    ast.to_json()
  } else {
    ast.to_json_pretty()
  };
  let Ok(json) = json else {
    eprintln!("{}", Message::error("Problem encoding the syntax tree"));
    return Err(());
  };

  match &options.output {
    Some(output) => {
      if fs::write(output, json).is_err() {
        eprintln!("{}", Message::error("Problem writing to file"));
        return Err(());
      }
    }
    None => println!("{json}"),
  }

  Ok(())
}

pub fn validate(file: Option<&str>) -> Result<(), ()> {
  let (_, source) = read_input(file)?;

  let options = Options {
    tolerant: true,
    ..Options::default()
  };

  match parse_with(&source, options) {
    Ok(ast) if ast.is_valid() => {
      println!("Syntax OK");
      Ok(())
    }
    Ok(ast) => {
      eprintln!("Syntax errors found:");
      for error in &ast.errors {
        let position = error.position();
        eprintln!("  line {}:{}: {error}", position.line, position.column);
      }
      Err(())
    }
    Err(error) => {
      let position = error.position();
      eprintln!("Syntax errors found:");
      eprintln!("  line {}:{}: {error}", position.line, position.column);
      Err(())
    }
  }
}

pub fn version_detect(file: Option<&str>) -> Result<(), ()> {
  let (_, source) = read_input(file)?;

  match version::detect(&source) {
    Ok(detected) => {
      println!("Pragma: {}", detected.raw);
      println!("Version: {}", detected.version);
      if !detected.constraint.is_empty() {
        println!("Constraint: {}", detected.constraint);
      }
      Ok(())
    }
    Err(error) => {
      eprintln!("{}", Message::error(&error.message()));
      Err(())
    }
  }
}
