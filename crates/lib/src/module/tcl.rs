//! Minimal Tcl word quoting for modulefile lines.
//!
//! Only what a generated modulefile needs: turning arbitrary strings into
//! single Tcl words and splitting a line back into words. Command and
//! variable substitution are never performed, `$` and `[` read back literally.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TclError {
  #[error("unbalanced braces")]
  UnbalancedBraces,

  #[error("unterminated quoted word")]
  UnterminatedQuote,

  #[error("trailing characters after closing {0}")]
  TrailingAfterClose(char),
}

fn is_special(c: char) -> bool {
  c.is_whitespace() || matches!(c, '"' | '$' | '[' | ']' | '{' | '}' | '\\' | ';' | '#')
}

/// Quote a string as a single Tcl word.
///
/// Plain words are emitted bare, words with separators or substitution
/// characters are braced, anything braces cannot carry is backslash-escaped.
pub fn quote(word: &str) -> String {
  if word.is_empty() {
    return "{}".to_string();
  }
  if !word.chars().any(is_special) {
    return word.to_string();
  }
  if !word.contains(['{', '}', '\\', '\n', '\r']) {
    return format!("{{{}}}", word);
  }

  let mut out = String::with_capacity(word.len() * 2);
  for c in word.chars() {
    match c {
      '\n' => out.push_str("\\n"),
      '\r' => out.push_str("\\r"),
      '\t' => out.push_str("\\t"),
      c if is_special(c) => {
        out.push('\\');
        out.push(c);
      }
      c => out.push(c),
    }
  }
  out
}

/// Join words into one Tcl command line.
pub fn join<I, S>(words: I) -> String
where
  I: IntoIterator<Item = S>,
  S: AsRef<str>,
{
  words.into_iter().map(|w| quote(w.as_ref())).collect::<Vec<_>>().join(" ")
}

fn unescape(c: char) -> char {
  match c {
    'n' => '\n',
    'r' => '\r',
    't' => '\t',
    other => other,
  }
}

/// Split a single line into Tcl words.
pub fn split(line: &str) -> Result<Vec<String>, TclError> {
  let mut words = Vec::new();
  let mut chars = line.chars().peekable();

  loop {
    while chars.next_if(|c| c.is_whitespace()).is_some() {}
    let Some(&first) = chars.peek() else {
      break;
    };

    let mut word = String::new();
    match first {
      '{' => {
        chars.next();
        let mut depth = 1;
        loop {
          match chars.next() {
            Some('{') => {
              depth += 1;
              word.push('{');
            }
            Some('}') => {
              depth -= 1;
              if depth == 0 {
                break;
              }
              word.push('}');
            }
            Some(c) => word.push(c),
            None => return Err(TclError::UnbalancedBraces),
          }
        }
        if chars.peek().is_some_and(|c| !c.is_whitespace()) {
          return Err(TclError::TrailingAfterClose('}'));
        }
      }
      '"' => {
        chars.next();
        loop {
          match chars.next() {
            Some('"') => break,
            Some('\\') => match chars.next() {
              Some(c) => word.push(unescape(c)),
              None => return Err(TclError::UnterminatedQuote),
            },
            Some(c) => word.push(c),
            None => return Err(TclError::UnterminatedQuote),
          }
        }
        if chars.peek().is_some_and(|c| !c.is_whitespace()) {
          return Err(TclError::TrailingAfterClose('"'));
        }
      }
      _ => {
        while let Some(c) = chars.next_if(|c| !c.is_whitespace()) {
          if c == '\\' {
            if let Some(escaped) = chars.next() {
              word.push(unescape(escaped));
            }
          } else {
            word.push(c);
          }
        }
      }
    }
    words.push(word);
  }

  Ok(words)
}
