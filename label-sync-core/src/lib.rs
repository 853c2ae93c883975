//! Label taxonomy model and resolution engine.
//!
//! The engine is pure and synchronous. A [`Resolver`] compiled from a
//! [`Taxonomy`] is read-only and can be shared across threads; every call to
//! [`Resolver::resolve`] works on its own copy of the current labels.

pub mod catalog;
pub mod color;
mod error;
pub mod models;
pub mod resolve;

pub use catalog::{build_catalog, priority_order, priority_sort, value_name, Prioritized};
pub use color::{resolve_color, DEFAULT_COLOR};
pub use error::{ConfigError, DanglingRef, RefField};
pub use models::*;
pub use resolve::{resolve, Resolution, Resolver, MAX_PASSES};
