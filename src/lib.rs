//! Keep issue tracker labels in line with a declarative taxonomy.
//!
//! The resolution engine lives in `label-sync-core`; this crate adds the
//! configuration file, the remote tracker adapters and the sync passes.

pub mod config;
pub mod graph;
pub mod random;
pub mod remote;
pub mod sync;
