//! Immutable facet filter model.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::filter::{FacetKind, FacetRegistry};
use crate::models::CatalogItem;

/// The value configured for one facet.
#[derive(Debug, Clone, PartialEq)]
pub enum FacetValue {
    /// Item matches if its field is one of the selected values.
    /// An empty set is no constraint.
    MultiSelect(BTreeSet<String>),
    /// Inclusive numeric bounds.
    Range { min: f64, max: f64 },
    /// Case-insensitive substring. Blank text is no constraint.
    Text(String),
}

impl FacetValue {
    pub fn multi_select<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::MultiSelect(values.into_iter().map(Into::into).collect())
    }

    pub fn range(min: f64, max: f64) -> Self {
        Self::Range { min, max }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn kind(&self) -> FacetKind {
        match self {
            Self::MultiSelect(_) => FacetKind::MultiSelect,
            Self::Range { .. } => FacetKind::Range,
            Self::Text(_) => FacetKind::Text,
        }
    }

    /// Whether this value lets every item through.
    pub fn is_unconstrained(&self) -> bool {
        match self {
            Self::MultiSelect(selected) => selected.is_empty(),
            Self::Range { .. } => false,
            Self::Text(text) => text.trim().is_empty(),
        }
    }

    fn validate(&self, key: &str) -> Result<()> {
        if let Self::Range { min, max } = self {
            if min.is_nan() || max.is_nan() {
                return Err(AppError::validation(format!(
                    "Range of facet '{key}' has a NaN bound"
                )));
            }
            if min > max {
                return Err(AppError::validation(format!(
                    "Range of facet '{key}' is inverted: min {min} > max {max}"
                )));
            }
        }
        Ok(())
    }
}

/// A composable, immutable set of facet constraints.
///
/// Every edit returns a new model. Clones share storage, so a pending fetch
/// can keep the snapshot it was issued under.
#[derive(Clone, Default)]
pub struct FilterModel {
    facets: Arc<BTreeMap<String, FacetValue>>,
    registry: Option<Arc<FacetRegistry>>,
}

impl FilterModel {
    /// An empty model without a registry. Facet keys are used as field names.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty model whose edits are checked against `registry`.
    pub fn with_registry(registry: Arc<FacetRegistry>) -> Self {
        Self {
            facets: Arc::default(),
            registry: Some(registry),
        }
    }

    pub fn registry(&self) -> Option<&Arc<FacetRegistry>> {
        self.registry.as_ref()
    }

    /// Return a model with `key` set to `value`.
    ///
    /// Inverted or NaN ranges are rejected, as are values the registry
    /// does not accept.
    pub fn set(&self, key: impl Into<String>, value: FacetValue) -> Result<Self> {
        let key = key.into();
        value.validate(&key)?;
        if let Some(registry) = &self.registry {
            registry.check(&key, &value)?;
        }

        let mut facets = (*self.facets).clone();
        facets.insert(key, value);
        Ok(self.replace(facets))
    }

    /// Return a model without the facet `key`.
    pub fn remove(&self, key: &str) -> Self {
        if !self.facets.contains_key(key) {
            return self.clone();
        }
        let mut facets = (*self.facets).clone();
        facets.remove(key);
        self.replace(facets)
    }

    /// Return a model with no constraints, keeping the registry.
    pub fn clear(&self) -> Self {
        self.replace(BTreeMap::new())
    }

    pub fn get(&self, key: &str) -> Option<&FacetValue> {
        self.facets.get(key)
    }

    /// Configured facets in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FacetValue)> {
        self.facets.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Whether the model matches every item.
    pub fn is_unconstrained(&self) -> bool {
        self.facets.values().all(FacetValue::is_unconstrained)
    }

    /// Logical AND of all configured facets.
    pub fn matches<T: CatalogItem>(&self, item: &T) -> bool {
        self.facets
            .iter()
            .all(|(key, value)| self.facet_matches(key, value, item))
    }

    /// Owned predicate for client-side filtering.
    pub fn to_predicate<T: CatalogItem>(&self) -> impl Fn(&T) -> bool + Send + Sync + use<T> {
        let model = self.clone();
        move |item: &T| model.matches(item)
    }

    fn facet_matches<T: CatalogItem>(&self, key: &str, value: &FacetValue, item: &T) -> bool {
        if value.is_unconstrained() {
            return true;
        }

        let mut fields = self.fields_for(key).into_iter().filter_map(|f| item.field(f));
        match value {
            FacetValue::MultiSelect(selected) => {
                fields.any(|field| field.any_text(|s| selected.contains(s)))
            }
            FacetValue::Range { min, max } => fields
                .filter_map(|field| field.as_number())
                .any(|n| *min <= n && n <= *max),
            FacetValue::Text(needle) => {
                let needle = needle.trim().to_lowercase();
                fields.any(|field| field.any_text(|s| s.to_lowercase().contains(&needle)))
            }
        }
    }

    fn fields_for<'a>(&'a self, key: &'a str) -> Vec<&'a str> {
        match self.registry.as_ref().and_then(|r| r.get(key)) {
            Some(spec) => spec.fields.iter().map(String::as_str).collect(),
            None => vec![key],
        }
    }

    fn replace(&self, facets: BTreeMap<String, FacetValue>) -> Self {
        Self {
            facets: Arc::new(facets),
            registry: self.registry.clone(),
        }
    }
}

impl PartialEq for FilterModel {
    fn eq(&self, other: &Self) -> bool {
        self.facets == other.facets
    }
}

impl fmt::Debug for FilterModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.facets.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CatalogEntry, Listing};

    fn make_entry(id: &str, category: &str, price: f64, title: &str) -> CatalogEntry {
        CatalogEntry::new(id, Listing::Books, title, category)
            .with_provider("Arihant")
            .with_price(price)
            .with_attribute("language", "English")
    }

    fn catalog() -> Vec<CatalogEntry> {
        vec![
            make_entry("1", "SSC", 250.0, "SSC CGL Quantitative Aptitude"),
            make_entry("2", "Banking", 400.0, "IBPS PO Reasoning"),
            make_entry("3", "SSC", 650.0, "SSC CHSL Practice Sets"),
            make_entry("4", "Railways", 150.0, "RRB NTPC General Awareness"),
        ]
    }

    fn matching_ids(filter: &FilterModel) -> Vec<String> {
        let predicate = filter.to_predicate::<CatalogEntry>();
        catalog()
            .into_iter()
            .filter(|e| predicate(e))
            .map(|e| e.id)
            .collect()
    }

    #[test]
    fn test_cleared_model_matches_everything() {
        let filter = FilterModel::new()
            .set("category", FacetValue::multi_select(["SSC"]))
            .unwrap()
            .clear();
        assert!(filter.is_unconstrained());
        assert_eq!(matching_ids(&filter), ["1", "2", "3", "4"]);
    }

    #[test]
    fn test_single_category() {
        let filter = FilterModel::new()
            .set("category", FacetValue::multi_select(["SSC"]))
            .unwrap();
        assert_eq!(matching_ids(&filter), ["1", "3"]);
    }

    #[test]
    fn test_multi_select_is_or_within_facet() {
        let filter = FilterModel::new()
            .set("category", FacetValue::multi_select(["SSC", "Railways"]))
            .unwrap();
        assert_eq!(matching_ids(&filter), ["1", "3", "4"]);
    }

    #[test]
    fn test_facets_compose_with_and() {
        let filter = FilterModel::new()
            .set("category", FacetValue::multi_select(["SSC"]))
            .unwrap()
            .set("price", FacetValue::range(0.0, 300.0))
            .unwrap();
        assert_eq!(matching_ids(&filter), ["1"]);
    }

    #[test]
    fn test_range_is_inclusive() {
        let filter = FilterModel::new()
            .set("price", FacetValue::range(150.0, 250.0))
            .unwrap();
        assert_eq!(matching_ids(&filter), ["1", "4"]);
    }

    #[test]
    fn test_inverted_range_rejected() {
        let err = FilterModel::new()
            .set("price", FacetValue::range(500.0, 100.0))
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(FilterModel::new()
            .set("price", FacetValue::range(f64::NAN, 1.0))
            .is_err());
    }

    #[test]
    fn test_text_is_case_insensitive_substring() {
        let filter = FilterModel::new()
            .set("title", FacetValue::text("  practice "))
            .unwrap();
        assert_eq!(matching_ids(&filter), ["3"]);
    }

    #[test]
    fn test_blank_text_and_empty_selection_are_unconstrained() {
        let filter = FilterModel::new()
            .set("title", FacetValue::text(""))
            .unwrap()
            .set("category", FacetValue::multi_select(Vec::<String>::new()))
            .unwrap();
        assert!(filter.is_unconstrained());
        assert_eq!(matching_ids(&filter).len(), 4);
    }

    #[test]
    fn test_missing_field_does_not_match_constraint() {
        let filter = FilterModel::new()
            .set("vacancies", FacetValue::range(1.0, 100.0))
            .unwrap();
        assert!(matching_ids(&filter).is_empty());
    }

    #[test]
    fn test_registry_maps_facet_to_fields() {
        let filter = FilterModel::with_registry(Listing::Books.registry())
            .set("search", FacetValue::text("arihant"))
            .unwrap();
        assert_eq!(matching_ids(&filter).len(), 4);

        let filter = filter.set("search", FacetValue::text("ibps")).unwrap();
        assert_eq!(matching_ids(&filter), ["2"]);
    }

    #[test]
    fn test_registry_rejects_unknown_facet() {
        let filter = FilterModel::with_registry(Listing::Books.registry());
        assert!(filter.set("vacancies", FacetValue::range(1.0, 2.0)).is_err());
    }

    #[test]
    fn test_edits_do_not_touch_snapshot() {
        let original = FilterModel::new()
            .set("category", FacetValue::multi_select(["SSC"]))
            .unwrap();
        let snapshot = original.clone();
        let edited = original
            .set("category", FacetValue::multi_select(["Banking"]))
            .unwrap();

        assert_eq!(snapshot, original);
        assert_ne!(snapshot, edited);
        assert_eq!(matching_ids(&snapshot), ["1", "3"]);
        assert_eq!(original.remove("category"), FilterModel::new());
    }
}
