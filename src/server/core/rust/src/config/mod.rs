/* src/server/core/rust/src/config/mod.rs */

mod loader;
mod types;


pub use loader::{CONFIG_FILE_NAME, find_gadget_config, load_gadget_config, parse_gadget_config};
pub use types::{
  BlacklistSection, FetchSection, GadgetConfig, ServerSection, SigningSection,
};
