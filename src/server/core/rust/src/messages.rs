/* src/server/core/rust/src/messages.rs */

use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::errors::GadgetError;
use crate::locale::MessageBundle;
use crate::xml::{attr, local_name};

const WHAT: &str = "message bundle";

/// Decode `<messagebundle><msg name="k">text</msg>...</messagebundle>` into a flat map.
pub fn parse_message_bundle(document: &str) -> Result<MessageBundle, GadgetError> {
  let fail = |message: String| GadgetError::parse(WHAT, message, document);

  let mut reader = Reader::from_str(document);

  let mut bundle = MessageBundle::new();
  let mut saw_root = false;
  let mut depth = 0usize;
  // (name, text) of the <msg> being read
  let mut current: Option<(String, String)> = None;

  loop {
    match reader.read_event().map_err(|e| fail(e.to_string()))? {
      Event::Start(e) => {
        let name = local_name(&e);
        if depth == 0 {
          if name != "messagebundle" {
            return Err(fail(format!("unexpected root element <{name}>")));
          }
          saw_root = true;
        } else if depth == 1 && name == "msg" {
          let key = attr(&e, "name")
            .map_err(|e| fail(e.to_string()))?
            .ok_or_else(|| fail("<msg> without a name attribute".to_string()))?;
          current = Some((key, String::new()));
        }
        depth += 1;
      }
      Event::Empty(e) => {
        let name = local_name(&e);
        if depth == 0 {
          if name != "messagebundle" {
            return Err(fail(format!("unexpected root element <{name}>")));
          }
          saw_root = true;
        } else if depth == 1 && name == "msg" {
          if let Some(key) = attr(&e, "name").map_err(|e| fail(e.to_string()))? {
            bundle.insert(key, String::new());
          }
        }
      }
      Event::Text(t) => {
        if let Some((_, text)) = current.as_mut() {
          text.push_str(&t.unescape().map_err(|e| fail(e.to_string()))?);
        }
      }
      Event::CData(c) => {
        if let Some((_, text)) = current.as_mut() {
          text.push_str(&String::from_utf8_lossy(&c.into_inner()));
        }
      }
      Event::End(_) => {
        depth = depth.saturating_sub(1);
        if depth == 1 {
          if let Some((key, text)) = current.take() {
            bundle.insert(key, text.trim().to_string());
          }
        }
      }
      Event::Eof => break,
      _ => {}
    }
  }

  if !saw_root {
    return Err(fail("missing <messagebundle> root element".to_string()));
  }
  if depth != 0 {
    return Err(fail("unexpected end of document".to_string()));
  }
  Ok(bundle)
}
