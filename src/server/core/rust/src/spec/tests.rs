/* src/server/core/rust/src/spec/tests.rs */

use std::sync::Arc;

use url::Url;

use super::*;
use crate::context::GadgetContext;
use crate::errors::GadgetError;
use crate::fetch::testing::StaticFetcher;
use crate::locale::{Direction, MessageSource};
use crate::registry::StaticFeatureRegistry;

fn ctx() -> GadgetContext {
  GadgetContext::new(
    Url::parse("http://gadgets.example/g/gadget.xml").unwrap(),
    Arc::new(StaticFetcher::default()),
    Arc::new(StaticFeatureRegistry::default()),
  )
}

fn parse(raw: &str) -> Result<GadgetSpec, GadgetError> {
  XmlSpecParser.parse(raw, &ctx())
}

const FULL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Module>
  <ModulePrefs title="__MSG_title__">
    <Require feature="core"/>
    <Require feature="opensocial-templates">
      <Param name="requireLibrary">templates.xml</Param>
    </Require>
    <Optional feature="views"/>
    <Locale lang="en" country="US" messages="en_US.xml"/>
    <Locale lang="ar" language_direction="rtl">
      <msg name="title">مرحبا</msg>
      <msg name="greeting"><![CDATA[<b>hi</b>]]></msg>
    </Locale>
    <Preload href="http://data.example/feed" authz="SIGNED" sign_viewer="FALSE"/>
    <Preload href="feed.json"/>
  </ModulePrefs>
  <UserPref name="color" display_name="Color" datatype="enum" default_value="red">
    <EnumValue value="red" display_value="Red"/>
    <EnumValue value="blue"/>
  </UserPref>
  <UserPref name="count"/>
  <Content type="html"><![CDATA[<div>__UP_color__</div>]]></Content>
  <Content view="canvas" type="url" href="http://gadgets.example/canvas"/>
</Module>"#;

#[test]
fn parses_module_prefs() {
  let spec = parse(FULL).unwrap();
  assert_eq!(spec.title, "__MSG_title__");
  assert_eq!(spec.required_features.iter().collect::<Vec<_>>(), ["core", "opensocial-templates"]);
  assert_eq!(spec.optional_features.iter().collect::<Vec<_>>(), ["views"]);
  assert_eq!(
    spec.template_libraries,
    vec![TemplateLibrary { url: "templates.xml".into(), body: None }]
  );
}

#[test]
fn parses_locales() {
  let spec = parse(FULL).unwrap();
  assert_eq!(spec.locales.len(), 2);

  let en = &spec.locales[0];
  assert_eq!((en.language.as_str(), en.country.as_str()), ("en", "US"));
  assert_eq!(en.messages, MessageSource::Remote("en_US.xml".into()));
  assert_eq!(en.direction, Direction::Ltr);

  let ar = &spec.locales[1];
  assert_eq!((ar.language.as_str(), ar.country.as_str()), ("ar", "all"));
  assert_eq!(ar.direction, Direction::Rtl);
  let bundle = ar.messages.bundle().unwrap();
  assert_eq!(bundle["title"], "مرحبا");
  assert_eq!(bundle["greeting"], "<b>hi</b>");
}

#[test]
fn parses_preloads() {
  let spec = parse(FULL).unwrap();
  assert_eq!(spec.preloads.len(), 2);

  let signed = &spec.preloads[0];
  assert_eq!(signed.href, "http://data.example/feed");
  assert_eq!(signed.authz, AuthzMode::Signed);
  assert!(!signed.sign_viewer);
  assert!(signed.sign_owner);

  let plain = &spec.preloads[1];
  assert_eq!(plain.authz, AuthzMode::None);
  assert!(plain.sign_viewer && plain.sign_owner);
  assert!(plain.body.is_none());
}

#[test]
fn parses_user_prefs() {
  let spec = parse(FULL).unwrap();
  let color = &spec.user_prefs[0];
  assert_eq!(color.name, "color");
  assert_eq!(color.display_name, "Color");
  assert_eq!(color.datatype, "enum");
  assert_eq!(color.default_value, "red");
  assert_eq!(color.value, None);
  assert_eq!(
    color.enum_values,
    vec![
      EnumValue { value: "red".into(), display_value: "Red".into() },
      EnumValue { value: "blue".into(), display_value: "blue".into() },
    ]
  );

  let count = &spec.user_prefs[1];
  assert_eq!(count.datatype, "string");
  assert_eq!(count.default_value, "");
}

#[test]
fn parses_views() {
  let spec = parse(FULL).unwrap();
  assert_eq!(spec.views.len(), 2);
  assert_eq!(spec.views[0].name, "default");
  assert_eq!(spec.views[0].body, "<div>__UP_color__</div>");
  assert_eq!(spec.views[1].name, "canvas");
  assert_eq!(spec.views[1].href.as_deref(), Some("http://gadgets.example/canvas"));
}

#[test]
fn remote_messages_win_over_inline() {
  let spec = parse(
    r#"<Module><ModulePrefs><Locale lang="fr" messages="fr.xml"><msg name="a">x</msg></Locale></ModulePrefs></Module>"#,
  )
  .unwrap();
  assert_eq!(spec.locales[0].messages, MessageSource::Remote("fr.xml".into()));
}

#[test]
fn locale_without_messages() {
  let spec = parse(r#"<Module><ModulePrefs><Locale/></ModulePrefs></Module>"#).unwrap();
  let entry = &spec.locales[0];
  assert_eq!((entry.language.as_str(), entry.country.as_str()), ("all", "all"));
  assert_eq!(entry.messages, MessageSource::Missing);
}

#[test]
fn sign_flags_only_disabled_by_false() {
  let spec = parse(
    r#"<Module><ModulePrefs><Preload href="a" authz="signed" sign_owner="no" sign_viewer="False"/></ModulePrefs></Module>"#,
  )
  .unwrap();
  let preload = &spec.preloads[0];
  assert_eq!(preload.authz, AuthzMode::Signed);
  assert!(preload.sign_owner);
  assert!(!preload.sign_viewer);
}

#[test]
fn unknown_elements_are_skipped() {
  let spec =
    parse(r#"<Module><ModulePrefs><Icon>x.png</Icon></ModulePrefs><Extra/></Module>"#).unwrap();
  assert_eq!(spec, GadgetSpec::default());
}

#[test]
fn rejects_wrong_root() {
  let err = parse("<Gadget/>").unwrap_err();
  match err {
    GadgetError::Parse { what, message, document } => {
      assert_eq!(what, "gadget spec");
      assert!(message.contains("<Gadget>"));
      assert_eq!(document, "<Gadget/>");
    }
    other => panic!("unexpected error: {other:?}"),
  }
}

#[test]
fn rejects_empty_document() {
  assert!(matches!(parse(""), Err(GadgetError::Parse { .. })));
}

#[test]
fn rejects_truncated_document() {
  assert!(matches!(parse("<Module><ModulePrefs>"), Err(GadgetError::Parse { .. })));
}

#[test]
fn rejects_preload_without_href() {
  let err = parse(r#"<Module><ModulePrefs><Preload/></ModulePrefs></Module>"#).unwrap_err();
  assert!(err.to_string().contains("href"));
}

#[test]
fn authz_and_sign_flag_parsing() {
  assert_eq!(AuthzMode::parse("SIGNED"), AuthzMode::Signed);
  assert_eq!(AuthzMode::parse("oauth"), AuthzMode::None);
  assert_eq!(AuthzMode::parse(""), AuthzMode::None);
  assert!(parse_sign_flag(None));
  assert!(parse_sign_flag(Some("true")));
  assert!(parse_sign_flag(Some("0")));
  assert!(!parse_sign_flag(Some("FaLsE")));
}

#[test]
fn inline_and_remote_messages_decode_alike() {
  let spec = parse(
    r#"<Module><ModulePrefs><Locale lang="de">
      <msg name="a">
        Hallo  Welt
      </msg>
      <msg name="b"> <![CDATA[<i>x</i>]]> </msg>
    </Locale></ModulePrefs></Module>"#,
  )
  .unwrap();
  let MessageSource::Inline(inline) = &spec.locales[0].messages else {
    panic!("expected inline messages");
  };
  let remote = crate::messages::parse_message_bundle(
    r#"<messagebundle>
      <msg name="a">
        Hallo  Welt
      </msg>
      <msg name="b"> <![CDATA[<i>x</i>]]> </msg>
    </messagebundle>"#,
  )
  .unwrap();
  assert_eq!(inline["a"], "Hallo  Welt");
  assert_eq!(inline["b"], "<i>x</i>");
  assert_eq!(inline, &remote);
}
