//! Concrete label names and the canonical priority ordering.

use std::cmp::Ordering;

use crate::models::{BaseLabel, FlagLabel, StateLabel, StateValue};

/// Anything that takes part in priority ordering.
pub trait Prioritized {
    fn name(&self) -> &str;
    fn priority(&self) -> i32;
}

impl Prioritized for BaseLabel {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> i32 {
        self.priority
    }
}

macro_rules! prioritized_via_base {
    ($($ty:ty),*) => {
        $(
            impl Prioritized for $ty {
                fn name(&self) -> &str {
                    &self.base.name
                }

                fn priority(&self) -> i32 {
                    self.base.priority
                }
            }
        )*
    };
}

prioritized_via_base!(FlagLabel, StateLabel, StateValue);

impl<T: Prioritized + ?Sized> Prioritized for &T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn priority(&self) -> i32 {
        (**self).priority()
    }
}

/// The concrete label name of a state value: `"<state>/<value>"`.
pub fn value_name(state: &StateLabel, value: &StateValue) -> String {
    format!("{}/{}", state.base.name, value.base.name)
}

/// Every concrete label name the taxonomy defines.
///
/// Flags come first in input order, then each state's values in input order.
/// Duplicates are kept; [`Resolver::new`](crate::Resolver::new) rejects them.
pub fn build_catalog(flags: &[FlagLabel], states: &[StateLabel]) -> Vec<String> {
    let mut names: Vec<String> = flags.iter().map(|f| f.base.name.clone()).collect();
    for state in states {
        for value in &state.values {
            names.push(value_name(state, value));
        }
    }
    names
}

/// Priority descending, then name ascending.
pub fn priority_order<T: Prioritized + ?Sized>(a: &T, b: &T) -> Ordering {
    b.priority()
        .cmp(&a.priority())
        .then_with(|| a.name().cmp(b.name()))
}

/// Stable sort into the canonical processing order.
pub fn priority_sort<T: Prioritized>(mut items: Vec<T>) -> Vec<T> {
    items.sort_by(|a, b| priority_order(a, b));
    items
}
