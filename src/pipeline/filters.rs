// src/pipeline/filters.rs

//! Filter arguments and facet listings for the command line.

use crate::error::{AppError, Result};
use crate::filter::{FacetKind, FilterModel};
use crate::models::Listing;
use crate::utils::split_pair;

/// Build a filter for `listing` from `key=value` arguments.
///
/// Arguments use query-parameter names: repeat a multi-select key to select
/// several options, and give a range as `key_min` and `key_max`.
pub fn parse_filters<S: AsRef<str>>(listing: Listing, args: &[S]) -> Result<FilterModel> {
    let registry = listing.registry();
    let mut pairs = Vec::with_capacity(args.len());
    for arg in args {
        let arg = arg.as_ref();
        let (key, value) = split_pair(arg).ok_or_else(|| {
            AppError::validation(format!("Filter '{arg}' is not of the form key=value"))
        })?;

        let known = registry.iter().any(|spec| match spec.kind {
            FacetKind::Range => {
                key == format!("{}_min", spec.key) || key == format!("{}_max", spec.key)
            }
            _ => key == spec.key,
        });
        if !known {
            return Err(AppError::validation(format!(
                "{} has no facet '{key}'",
                listing.display_name()
            )));
        }
        pairs.push((key, value));
    }
    FilterModel::from_query_parameters(registry, pairs)
}

/// One line per facet of `listing`.
pub fn describe_facets(listing: Listing) -> Vec<String> {
    listing
        .registry()
        .iter()
        .map(|spec| {
            let detail = match spec.kind {
                FacetKind::MultiSelect => spec.options.join(", "),
                FacetKind::Range => format!("{0}_min..{0}_max", spec.key),
                FacetKind::Text => format!("searches {}", spec.fields.join(", ")),
            };
            format!(
                "{} ({}, {}): {}",
                spec.key,
                spec.label,
                spec.kind.as_str(),
                detail
            )
        })
        .collect()
}
