/* src/server/core/rust/src/substitution.rs */

use gadget_injector::{Namespace, Substitutions};
use tracing::debug;

use crate::locale::{Direction, MergedLocale};
use crate::spec::{EnumValue, GadgetSpec, Preload, UserPref};
use crate::token::SecurityToken;

/// `(START_EDGE, END_EDGE, DIR, REVERSE_DIR)` for a text direction.
fn bidi_values(direction: Direction) -> [(&'static str, &'static str); 4] {
  match direction {
    Direction::Ltr => {
      [("START_EDGE", "left"), ("END_EDGE", "right"), ("DIR", "ltr"), ("REVERSE_DIR", "rtl")]
    }
    Direction::Rtl => {
      [("START_EDGE", "right"), ("END_EDGE", "left"), ("DIR", "rtl"), ("REVERSE_DIR", "ltr")]
    }
  }
}

/// Build the substitution table for one assembly.
///
/// Order matters: module id, bidi and messages go in first so preference
/// names and values can refer to them. Each preference is substituted against
/// the table as built so far and is not revisited once later entries land.
pub fn seed_substitutions(spec: &GadgetSpec, token: Option<&SecurityToken>) -> Substitutions {
  let mut subst = Substitutions::new();

  let module_id = token.map_or(0, |t| t.module_id);
  subst.add_substitution(Namespace::Module, "ID", module_id.to_string());

  let merged = spec.messages.clone().unwrap_or_default();
  let MergedLocale { messages, direction } = merged;
  subst.add_substitutions(Namespace::Bidi, bidi_values(direction));
  subst.add_substitutions(Namespace::Message, messages);

  for pref in &spec.user_prefs {
    let name = subst.substitute(&pref.name);
    let value = subst.substitute(pref.value.as_deref().unwrap_or(&pref.default_value));
    subst.add_substitution(Namespace::UserPref, name, value);
  }

  debug!(module_id, prefs = spec.user_prefs.len(), "seeded substitutions");
  subst
}

/// Rewrite every user preference field and every preload body.
pub fn apply_substitutions(subst: &Substitutions, mut spec: GadgetSpec) -> GadgetSpec {
  spec.user_prefs =
    std::mem::take(&mut spec.user_prefs).into_iter().map(|p| substitute_pref(subst, p)).collect();
  spec.preloads = std::mem::take(&mut spec.preloads)
    .into_iter()
    .map(|preload| Preload {
      body: preload.body.as_deref().map(|b| subst.substitute(b)),
      ..preload
    })
    .collect();
  spec
}

fn substitute_pref(subst: &Substitutions, pref: UserPref) -> UserPref {
  let s = |text: &str| subst.substitute(text);
  UserPref {
    name: s(&pref.name),
    display_name: s(&pref.display_name),
    required: s(&pref.required),
    datatype: s(&pref.datatype),
    default_value: s(&pref.default_value),
    value: pref.value.as_deref().map(s),
    enum_values: pref
      .enum_values
      .iter()
      .map(|e| EnumValue { value: s(&e.value), display_value: s(&e.display_value) })
      .collect(),
  }
}
