//! Composable facet filters.
//!
//! A [`FilterModel`] maps facet keys to [`FacetValue`]s and is immutable:
//! edits return a new model, so a pending fetch can hold the snapshot it was
//! issued under. The same model evaluates client-side through
//! [`FilterModel::to_predicate`] and server-side through
//! [`FilterModel::to_query_parameters`].

mod model;
mod query;
mod registry;

pub use model::{FacetValue, FilterModel};
pub use registry::{FacetKind, FacetRegistry, FacetSpec};
