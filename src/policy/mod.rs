//! Merge policy: which sources are aggregated and how.
//!
//! The authoritative policy lives in [`store::PolicyStore`] and is seeded
//! from the configuration file at startup. Individual requests can layer
//! [`overrides::RequestOverrides`] on top without touching the stored
//! policy.

pub mod overrides;
pub mod store;

pub use overrides::RequestOverrides;
pub use store::{PolicyStore, PolicyUpdate, SourceUpdate};
