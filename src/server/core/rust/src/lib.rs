/* src/server/core/rust/src/lib.rs */

pub mod config;
pub mod context;
pub mod errors;
pub mod features;
pub mod fetch;
pub mod gadget;
pub mod locale;
pub mod messages;
pub mod pipeline;
pub mod preload;
pub mod prefs;
pub mod registry;
pub mod resolve;
pub mod server;
pub mod spec;
pub mod substitution;
pub mod token;
mod xml;

// Re-exports for ergonomic use
pub use config::{GadgetConfig, find_gadget_config, load_gadget_config};
pub use context::{Blacklist, GadgetContext, PatternBlacklist};
pub use errors::GadgetError;
pub use fetch::{
  FetchRequest, FetchResponse, HttpFetcher, KeySource, ReqwestFetcher, ResponseTable,
  SigningFetcherFactory, multi_fetch,
};
pub use gadget::Gadget;
pub use gadget_injector::{Namespace, Substitutions};
pub use locale::{Direction, Locale, MergedLocale, merge_locales};
pub use messages::parse_message_bundle;
pub use pipeline::GadgetAssembler;
pub use prefs::{USER_PREF_PARAM_PREFIX, user_prefs_from_params};
pub use registry::{FeatureRegistry, FeatureResolution, StaticFeatureRegistry};
pub use resolve::{parse_accept_language, resolve_locale};
pub use server::{GadgetParts, GadgetServer};
pub use spec::{GadgetSpec, SpecParser, XmlSpecParser};
pub use token::{PlainTokenDecoder, SecurityToken, SecurityTokenDecoder};
