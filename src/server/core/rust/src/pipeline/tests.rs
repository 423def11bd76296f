/* src/server/core/rust/src/pipeline/tests.rs */

use std::sync::Arc;

use gadget_injector::Namespace;
use url::Url;

use super::*;
use crate::context::PatternBlacklist;
use crate::fetch::KeySource;
use crate::fetch::testing::StaticFetcher;
use crate::locale::Locale;
use crate::registry::StaticFeatureRegistry;

const GADGET: &str = "http://gadgets.example/g/gadget.xml";

const DEFINITION: &str = r#"<Module>
  <ModulePrefs title="__MSG_title__">
    <Require feature="views"/>
    <Optional feature="tabs"/>
    <Locale lang="en" country="US" language_direction="ltr">
      <msg name="a">1</msg>
    </Locale>
    <Locale lang="en" messages="en_ALL.xml"/>
    <Locale lang="fr" messages="fr_ALL.xml"/>
    <Preload href="http://data.example/feed"/>
    <Preload href="http://data.example/gone"/>
  </ModulePrefs>
  <UserPref name="color" display_name="__MSG_b__" default_value="red"/>
  <UserPref name="label" default_value="__UP_color__ on __BIDI_START_EDGE__"/>
  <Content><![CDATA[hello]]></Content>
</Module>"#;

const EN_ALL: &str =
  r#"<messagebundle><msg name="a">2</msg><msg name="b">Colour</msg></messagebundle>"#;

fn registry() -> Arc<StaticFeatureRegistry> {
  Arc::new(
    StaticFeatureRegistry::default()
      .with_feature("core", Vec::<String>::new())
      .with_feature("views", ["core"]),
  )
}

fn fetcher() -> StaticFetcher {
  StaticFetcher::default()
    .with(GADGET, 200, DEFINITION)
    .with("http://gadgets.example/g/en_ALL.xml", 200, EN_ALL)
    .with("http://data.example/feed", 200, "feed for __MODULE_ID__")
    .with("http://data.example/gone", 404, "")
}

fn ctx(fetcher: &Arc<StaticFetcher>) -> GadgetContext {
  GadgetContext::new(Url::parse(GADGET).unwrap(), fetcher.clone(), registry())
    .with_locale(Locale::new("en", "US"))
}

#[tokio::test]
async fn assembles_full_gadget() {
  let fetcher = Arc::new(fetcher());
  let ctx = ctx(&fetcher).with_user_pref("color", "blue");
  let token = SecurityToken { module_id: 7, ..SecurityToken::default() };

  let gadget = GadgetAssembler::default().assemble(&ctx, Some(&token)).await.unwrap();

  // definition + en_ALL + two preloads; fr never fetched
  assert_eq!(fetcher.request_count(), 4);
  assert!(fetcher.requests().iter().all(|r| !r.url.as_str().contains("fr_ALL")));

  assert_eq!(gadget.message("a"), Some("1"));
  assert_eq!(gadget.message("b"), Some("Colour"));
  assert!(!gadget.right_to_left);
  assert!(gadget.spec.locales.is_empty());

  assert_eq!(gadget.features, vec!["core".to_string(), "views".to_string()]);
  assert!(gadget.spec.required_features.is_empty());
  assert!(gadget.spec.optional_features.is_empty());

  let color = &gadget.spec.user_prefs[0];
  assert_eq!(color.value.as_deref(), Some("blue"));
  assert_eq!(color.display_name, "Colour");
  let label = &gadget.spec.user_prefs[1];
  assert_eq!(label.value.as_deref(), Some("blue on left"));

  assert_eq!(gadget.spec.preloads.len(), 1);
  assert_eq!(gadget.preload("http://data.example/feed"), Some("feed for 7"));
  assert_eq!(gadget.substitutions.get(Namespace::Module, "ID"), Some("7"));
  // views are not substituted; the renderer does that
  assert_eq!(gadget.spec.title, "__MSG_title__");
}

#[tokio::test]
async fn blacklisted_gadget_is_never_fetched() {
  let fetcher = Arc::new(fetcher());
  let blacklist = PatternBlacklist::new(&["^http://gadgets\\.example/"]).unwrap();
  let ctx = ctx(&fetcher).with_blacklist(Arc::new(blacklist));

  let err = GadgetAssembler::default().assemble(&ctx, None).await.unwrap_err();

  assert!(matches!(err, GadgetError::Blacklisted { .. }));
  assert_eq!(fetcher.request_count(), 0);
}

#[tokio::test]
async fn definition_fetch_failure() {
  let fetcher = Arc::new(StaticFetcher::default().with(GADGET, 500, "oops"));
  let err = GadgetAssembler::default().assemble(&ctx(&fetcher), None).await.unwrap_err();
  assert!(matches!(err, GadgetError::Fetch { status: Some(500), .. }));

  let fetcher = Arc::new(StaticFetcher::default().failing(GADGET));
  let err = GadgetAssembler::default().assemble(&ctx(&fetcher), None).await.unwrap_err();
  assert!(matches!(err, GadgetError::Fetch { status: None, .. }));
}

#[tokio::test]
async fn malformed_definition() {
  let fetcher = Arc::new(StaticFetcher::default().with(GADGET, 200, "<NotAModule/>"));
  let err = GadgetAssembler::default().assemble(&ctx(&fetcher), None).await.unwrap_err();
  match err {
    GadgetError::Parse { document, .. } => assert_eq!(document, "<NotAModule/>"),
    other => panic!("unexpected error: {other:?}"),
  }
}

#[tokio::test]
async fn signed_preload_without_token_stops_after_definition() {
  let definition = r#"<Module><ModulePrefs>
    <Locale lang="en" messages="en_ALL.xml"/>
    <Preload href="http://x/y" authz="SIGNED"/>
  </ModulePrefs></Module>"#;
  let fetcher = Arc::new(StaticFetcher::default().with(GADGET, 200, definition));
  let signing = SigningFetcherFactory::from_key_source("k", &KeySource::Inline("s".into())).unwrap();

  let err = GadgetAssembler::default()
    .with_signing(signing)
    .assemble(&ctx(&fetcher), None)
    .await
    .unwrap_err();

  assert!(matches!(err, GadgetError::SecurityToken { ref href } if href == "http://x/y"));
  // only the definition itself went out
  assert_eq!(fetcher.request_count(), 1);
}

#[tokio::test]
async fn missing_required_feature_fails() {
  let definition = r#"<Module><ModulePrefs>
    <Require feature="core"/><Optional feature="views"/>
  </ModulePrefs></Module>"#;
  let fetcher = Arc::new(StaticFetcher::default().with(GADGET, 200, definition));
  let registry = Arc::new(StaticFeatureRegistry::default().with_feature("views", Vec::<String>::new()));
  let ctx = GadgetContext::new(Url::parse(GADGET).unwrap(), fetcher, registry);

  let err = GadgetAssembler::default().assemble(&ctx, None).await.unwrap_err();

  match err {
    GadgetError::FeatureResolution { missing } => assert_eq!(missing, vec!["core".to_string()]),
    other => panic!("unexpected error: {other:?}"),
  }
}

#[tokio::test]
async fn missing_optional_feature_is_dropped() {
  let definition = r#"<Module><ModulePrefs>
    <Require feature="views"/><Optional feature="nope"/>
  </ModulePrefs></Module>"#;
  let fetcher = Arc::new(StaticFetcher::default().with(GADGET, 200, definition));

  let gadget = GadgetAssembler::default().assemble(&ctx(&fetcher), None).await.unwrap();

  assert_eq!(gadget.features, vec!["core".to_string(), "views".to_string()]);
}

#[tokio::test]
async fn rtl_direction_from_full_match() {
  let definition = r#"<Module><ModulePrefs>
    <Locale lang="ar" country="EG" language_direction="rtl"><msg name="k">v</msg></Locale>
    <Locale lang="ar" language_direction="ltr"/>
  </ModulePrefs>
  <UserPref name="edge" default_value="__BIDI_END_EDGE__"/>
  </Module>"#;
  let fetcher = Arc::new(StaticFetcher::default().with(GADGET, 200, definition));
  let ctx = ctx(&fetcher).with_locale(Locale::new("ar", "EG"));

  let gadget = GadgetAssembler::default().assemble(&ctx, None).await.unwrap();

  assert!(gadget.right_to_left);
  assert_eq!(gadget.spec.user_prefs[0].value.as_deref(), Some("left"));
}

#[tokio::test]
async fn no_matching_locale_gives_empty_ltr_bundle() {
  let fetcher = Arc::new(fetcher());
  let ctx = ctx(&fetcher).with_locale(Locale::new("de", "DE"));

  let gadget = GadgetAssembler::default().assemble(&ctx, None).await.unwrap();

  assert!(!gadget.right_to_left);
  assert!(gadget.spec.messages.as_ref().unwrap().messages.is_empty());
  // display name keeps the unresolved message token
  assert_eq!(gadget.spec.user_prefs[0].display_name, "__MSG_b__");
}

#[tokio::test]
async fn ignore_cache_reaches_every_request() {
  let fetcher = Arc::new(fetcher());
  let ctx = ctx(&fetcher).with_ignore_cache(true);
  GadgetAssembler::default().assemble(&ctx, None).await.unwrap();
  assert!(fetcher.requests().iter().all(|r| r.ignore_cache));
}
