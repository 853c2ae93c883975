//! Taxonomy models for label-sync.
//!
//! # Core Concepts
//!
//! ## Taxonomy
//!
//! - [`FlagLabel`]: An independent label, the equivalent of a checkbox.
//! - [`StateLabel`]: A group of mutually exclusive [`StateValue`]s, the equivalent
//!   of a radio group. Each value becomes the concrete label `"<state>/<value>"`.
//! - [`StateChange`]: A transition attached to a state value, firing when all of
//!   its `matches` are present.
//! - [`LabelSet`]: The `adds`/`removes` side effects carried by flags, states and
//!   transitions.
//!
//! ## Resolution Output
//!
//! - [`Change`]: One explained label change, tagged with a [`ChangeVerb`].
//!
//! The taxonomy is loaded once and never mutated; every resolution run reads it.

mod change;
mod label;

pub use change::*;
pub use label::*;
