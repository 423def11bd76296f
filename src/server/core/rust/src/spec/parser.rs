/* src/server/core/rust/src/spec/parser.rs */

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use super::{AuthzMode, EnumValue, GadgetSpec, Preload, TemplateLibrary, UserPref, View, parse_sign_flag};
use crate::context::GadgetContext;
use crate::errors::GadgetError;
use crate::locale::{ALL, Direction, LocaleEntry, MessageBundle, MessageSource};
use crate::xml::{attr, attr_or_default, local_name};

const WHAT: &str = "gadget spec";
const REQUIRE_LIBRARY: &str = "requireLibrary";

/// Turns a fetched definition into a [`GadgetSpec`].
pub trait SpecParser: Send + Sync {
  fn parse(&self, raw: &str, ctx: &GadgetContext) -> Result<GadgetSpec, GadgetError>;
}

/// Parser for the `<Module>` XML gadget format.
#[derive(Debug, Default, Clone, Copy)]
pub struct XmlSpecParser;

impl SpecParser for XmlSpecParser {
  fn parse(&self, raw: &str, _ctx: &GadgetContext) -> Result<GadgetSpec, GadgetError> {
    parse_module(raw).map_err(|message| GadgetError::parse(WHAT, message, raw))
  }
}

type ParseResult<T> = Result<T, String>;

fn xml_err(e: impl std::fmt::Display) -> String {
  e.to_string()
}

#[derive(Default)]
struct ModuleBuilder {
  spec: GadgetSpec,
  stack: Vec<String>,
  saw_root: bool,
  /// Param name of the `<Param>` being read inside a Require/Optional
  param: Option<String>,
  locale: Option<(LocaleEntry, MessageBundle)>,
  msg: Option<String>,
  pref: Option<UserPref>,
  view: Option<View>,
  text: String,
}

impl ModuleBuilder {
  fn open(&mut self, e: &BytesStart<'_>) -> ParseResult<()> {
    let name = local_name(e);
    let parent = self.stack.last().cloned();
    match (parent.as_deref(), name.as_str()) {
      (None, "Module") => self.saw_root = true,
      (None, other) => return Err(format!("expected <Module> root element, found <{other}>")),
      (Some("Module"), "ModulePrefs") => {
        self.spec.title = attr_or_default(e, "title").map_err(xml_err)?;
      }
      (Some("ModulePrefs"), tag @ ("Require" | "Optional")) => {
        let feature = attr(e, "feature")
          .map_err(xml_err)?
          .ok_or_else(|| format!("<{tag}> without a feature attribute"))?;
        if tag == "Require" {
          self.spec.required_features.insert(feature);
        } else {
          self.spec.optional_features.insert(feature);
        }
      }
      (Some("Require" | "Optional"), "Param") => {
        self.param = Some(attr_or_default(e, "name").map_err(xml_err)?);
        self.text.clear();
      }
      (Some("ModulePrefs"), "Locale") => {
        let lang = attr(e, "lang").map_err(xml_err)?.filter(|s| !s.is_empty());
        let country = attr(e, "country").map_err(xml_err)?.filter(|s| !s.is_empty());
        let direction = attr(e, "language_direction").map_err(xml_err)?;
        let messages = match attr(e, "messages").map_err(xml_err)? {
          Some(href) if !href.trim().is_empty() => MessageSource::Remote(href.trim().to_string()),
          _ => MessageSource::Missing,
        };
        let entry = LocaleEntry {
          language: lang.unwrap_or_else(|| ALL.to_string()),
          country: country.unwrap_or_else(|| ALL.to_string()),
          direction: direction.as_deref().map(Direction::parse).unwrap_or_default(),
          messages,
        };
        self.locale = Some((entry, MessageBundle::new()));
      }
      (Some("Locale"), "msg") => {
        let key =
          attr(e, "name").map_err(xml_err)?.ok_or("<msg> without a name attribute".to_string())?;
        self.msg = Some(key);
        self.text.clear();
      }
      (Some("ModulePrefs"), "Preload") => {
        let href = attr(e, "href")
          .map_err(xml_err)?
          .filter(|h| !h.trim().is_empty())
          .ok_or("<Preload> without an href attribute".to_string())?;
        let mut preload = Preload::new(href.trim());
        preload.authz = AuthzMode::parse(&attr_or_default(e, "authz").map_err(xml_err)?);
        preload.sign_viewer = parse_sign_flag(attr(e, "sign_viewer").map_err(xml_err)?.as_deref());
        preload.sign_owner = parse_sign_flag(attr(e, "sign_owner").map_err(xml_err)?.as_deref());
        self.spec.preloads.push(preload);
      }
      (Some("Module"), "UserPref") => {
        let name = attr(e, "name")
          .map_err(xml_err)?
          .ok_or("<UserPref> without a name attribute".to_string())?;
        self.pref = Some(UserPref {
          display_name: attr_or_default(e, "display_name").map_err(xml_err)?,
          required: attr_or_default(e, "required").map_err(xml_err)?,
          datatype: attr(e, "datatype").map_err(xml_err)?.unwrap_or_else(|| "string".into()),
          default_value: attr_or_default(e, "default_value").map_err(xml_err)?,
          name,
          value: None,
          enum_values: Vec::new(),
        });
      }
      (Some("UserPref"), "EnumValue") => {
        let value = attr_or_default(e, "value").map_err(xml_err)?;
        let display_value =
          attr(e, "display_value").map_err(xml_err)?.unwrap_or_else(|| value.clone());
        if let Some(pref) = self.pref.as_mut() {
          pref.enum_values.push(EnumValue { value, display_value });
        }
      }
      (Some("Module"), "Content") => {
        self.view = Some(View {
          name: attr(e, "view").map_err(xml_err)?.unwrap_or_else(|| "default".into()),
          content_type: attr(e, "type").map_err(xml_err)?.unwrap_or_else(|| "html".into()),
          href: attr(e, "href").map_err(xml_err)?,
          body: String::new(),
        });
        self.text.clear();
      }
      // Unknown elements are tolerated and skipped.
      _ => {}
    }
    self.stack.push(name);
    Ok(())
  }

  fn close(&mut self) {
    let Some(name) = self.stack.pop() else {
      return;
    };
    match name.as_str() {
      "Param" => {
        if self.param.take().as_deref() == Some(REQUIRE_LIBRARY) {
          let url = self.text.trim();
          if !url.is_empty() {
            self.spec.template_libraries.push(TemplateLibrary { url: url.to_string(), body: None });
          }
        }
      }
      "msg" => {
        if let (Some(key), Some((_, bundle))) = (self.msg.take(), self.locale.as_mut()) {
          bundle.insert(key, self.text.trim().to_string());
          self.text.clear();
        }
      }
      "Locale" => {
        if let Some((mut entry, bundle)) = self.locale.take() {
          // A remote reference takes priority over inline messages.
          if !bundle.is_empty() && entry.messages == MessageSource::Missing {
            entry.messages = MessageSource::Inline(bundle);
          }
          self.spec.locales.push(entry);
        }
      }
      "UserPref" => {
        if let Some(pref) = self.pref.take() {
          self.spec.user_prefs.push(pref);
        }
      }
      "Content" => {
        if let Some(mut view) = self.view.take() {
          view.body = std::mem::take(&mut self.text);
          self.spec.views.push(view);
        }
      }
      _ => {}
    }
  }

  fn capturing_text(&self) -> bool {
    self.param.is_some() || self.msg.is_some() || self.view.is_some()
  }
}

fn parse_module(raw: &str) -> ParseResult<GadgetSpec> {
  let mut reader = Reader::from_str(raw);
  let mut builder = ModuleBuilder::default();

  loop {
    match reader.read_event().map_err(xml_err)? {
      Event::Start(e) => builder.open(&e)?,
      Event::Empty(e) => {
        builder.open(&e)?;
        builder.close();
      }
      Event::End(_) => builder.close(),
      Event::Text(t) if builder.capturing_text() => {
        builder.text.push_str(&t.unescape().map_err(xml_err)?);
      }
      Event::CData(c) if builder.capturing_text() => {
        builder.text.push_str(&String::from_utf8_lossy(&c.into_inner()));
      }
      Event::Eof => break,
      _ => {}
    }
  }

  if !builder.saw_root {
    return Err("missing <Module> root element".to_string());
  }
  if !builder.stack.is_empty() {
    return Err("unexpected end of document".to_string());
  }
  Ok(builder.spec)
}
