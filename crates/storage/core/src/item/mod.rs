//! Storable item model.
//!
//! A single tagged union replaces per-kind item classes; identity rules and
//! amount handling are exhaustive matches over [`VariantTag`].
mod variant;

pub use variant::{ItemId, ItemVariant, LookVector, VariantTag};
