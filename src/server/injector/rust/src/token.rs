/* src/server/injector/rust/src/token.rs */

use crate::substitutions::Namespace;

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Token<'a> {
  Text(&'a str),
  /// A `__NS_KEY__` placeholder; `raw` is the full marker text, kept for pass-through.
  Marker { namespace: Namespace, key: &'a str, raw: &'a str },
}

pub(crate) const MARKER_EDGE: &str = "__";

fn is_key_char(ch: char) -> bool {
  ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-' | '.')
}

/// Try to read a marker whose opening `__` starts at `open`.
/// Returns the marker token and the byte offset just past its closing `__`.
fn read_marker(text: &str, open: usize) -> Option<(Token<'_>, usize)> {
  let after_open = open + MARKER_EDGE.len();
  let rest = &text[after_open..];
  let namespace = Namespace::ALL.into_iter().find(|ns| {
    rest.strip_prefix(ns.prefix()).is_some_and(|r| r.starts_with('_'))
  })?;

  let key_start = after_open + namespace.prefix().len() + 1;
  let close_rel = text[key_start..].find(MARKER_EDGE)?;
  let key = &text[key_start..key_start + close_rel];
  if key.is_empty() || !key.chars().all(is_key_char) {
    return None;
  }

  let end = key_start + close_rel + MARKER_EDGE.len();
  Some((Token::Marker { namespace, key, raw: &text[open..end] }, end))
}

pub(crate) fn tokenize(text: &str) -> Vec<Token<'_>> {
  let mut tokens = Vec::new();
  let mut text_start = 0;
  let mut cursor = 0;

  while let Some(rel) = text[cursor..].find(MARKER_EDGE) {
    let open = cursor + rel;
    match read_marker(text, open) {
      Some((marker, end)) => {
        if open > text_start {
          tokens.push(Token::Text(&text[text_start..open]));
        }
        tokens.push(marker);
        text_start = end;
        cursor = end;
      }
      // Not a marker: slide one byte so `___MSG_x__` still finds the inner pair.
      None => cursor = open + 1,
    }
  }

  if text_start < text.len() {
    tokens.push(Token::Text(&text[text_start..]));
  }

  tokens
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn tokenize_empty_text() {
    assert!(tokenize("").is_empty());
  }

  #[test]
  fn tokenize_plain_text() {
    assert_eq!(tokenize("hello world"), vec![Token::Text("hello world")]);
  }

  #[test]
  fn tokenize_single_marker() {
    assert_eq!(
      tokenize("__MSG_title__"),
      vec![Token::Marker { namespace: Namespace::Message, key: "title", raw: "__MSG_title__" }]
    );
  }

  #[test]
  fn tokenize_marker_between_text() {
    let tokens = tokenize("Hi __UP_name__!");
    assert_eq!(tokens.len(), 3);
    assert_eq!(tokens[0], Token::Text("Hi "));
    assert!(matches!(tokens[1], Token::Marker { namespace: Namespace::UserPref, key: "name", .. }));
    assert_eq!(tokens[2], Token::Text("!"));
  }

  #[test]
  fn tokenize_key_with_underscores() {
    let tokens = tokenize("__MSG_hello_world__");
    assert!(matches!(tokens[0], Token::Marker { key: "hello_world", .. }));
  }

  #[test]
  fn tokenize_adjacent_markers() {
    let tokens = tokenize("__BIDI_DIR____MODULE_ID__");
    assert_eq!(tokens.len(), 2);
    assert!(matches!(tokens[0], Token::Marker { namespace: Namespace::Bidi, key: "DIR", .. }));
    assert!(matches!(tokens[1], Token::Marker { namespace: Namespace::Module, key: "ID", .. }));
  }

  #[test]
  fn tokenize_unknown_namespace_is_text() {
    assert_eq!(tokenize("__FOO_bar__"), vec![Token::Text("__FOO_bar__")]);
  }

  #[test]
  fn tokenize_unclosed_marker_is_text() {
    assert_eq!(tokenize("__MSG_title"), vec![Token::Text("__MSG_title")]);
  }

  #[test]
  fn tokenize_leading_extra_underscore() {
    let tokens = tokenize("___MSG_x__");
    assert_eq!(tokens[0], Token::Text("_"));
    assert!(matches!(tokens[1], Token::Marker { key: "x", .. }));
  }

  #[test]
  fn tokenize_rejects_key_with_space() {
    assert_eq!(tokenize("__MSG_a b__"), vec![Token::Text("__MSG_a b__")]);
  }
}
