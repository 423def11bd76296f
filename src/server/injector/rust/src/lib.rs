/* src/server/injector/rust/src/lib.rs */

mod substitutions;
mod token;

pub use substitutions::{Namespace, Substitutions};
