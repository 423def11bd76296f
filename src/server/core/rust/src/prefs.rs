/* src/server/core/rust/src/prefs.rs */

use std::collections::HashMap;

use crate::spec::{GadgetSpec, UserPref};

/// Request parameters carrying preference overrides start with this.
pub const USER_PREF_PARAM_PREFIX: &str = "up_";

/// Give every preference its value: the request override if one was sent,
/// otherwise its default. Preferences that already hold a value keep it.
pub fn resolve_user_prefs(overrides: &HashMap<String, String>, mut spec: GadgetSpec) -> GadgetSpec {
  spec.user_prefs = std::mem::take(&mut spec.user_prefs)
    .into_iter()
    .map(|pref| match pref.value {
      Some(_) => pref,
      None => {
        let value = overrides.get(&pref.name).cloned().unwrap_or_else(|| pref.default_value.clone());
        UserPref { value: Some(value), ..pref }
      }
    })
    .collect();
  spec
}

/// Collect `up_<name>=<value>` pairs out of request parameters.
pub fn user_prefs_from_params<'a, I>(params: I) -> HashMap<String, String>
where
  I: IntoIterator<Item = (&'a String, &'a String)>,
{
  params
    .into_iter()
    .filter_map(|(key, value)| {
      let name = key.strip_prefix(USER_PREF_PARAM_PREFIX)?;
      (!name.is_empty()).then(|| (name.to_string(), value.clone()))
    })
    .collect()
}
