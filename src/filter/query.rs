//! Query-parameter form of a filter model.
//!
//! Server-side filtering receives the same constraints as the client-side
//! predicate:
//!
//! - multi-select: one `key=value` pair per selected value
//! - range: `key_min=..` and `key_max=..`
//! - text: `key=text`
//!
//! Unconstrained facets are omitted.

use std::sync::Arc;

use url::form_urlencoded;

use crate::error::{AppError, Result};
use crate::filter::{FacetKind, FacetRegistry, FacetValue, FilterModel};
use crate::models::format_number;

impl FilterModel {
    /// Serialize the model into ordered `(name, value)` pairs.
    pub fn to_query_parameters(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        for (key, value) in self.iter() {
            if value.is_unconstrained() {
                continue;
            }
            match value {
                FacetValue::MultiSelect(selected) => {
                    params.extend(selected.iter().map(|v| (key.to_string(), v.clone())));
                }
                FacetValue::Range { min, max } => {
                    params.push((min_param(key), format_number(*min)));
                    params.push((max_param(key), format_number(*max)));
                }
                FacetValue::Text(text) => {
                    params.push((key.to_string(), text.trim().to_string()));
                }
            }
        }
        params
    }

    /// Form-urlencoded query string of [`FilterModel::to_query_parameters`].
    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.to_query_parameters())
            .finish()
    }

    /// Rebuild a model from query parameters, using `registry` to know each
    /// facet's kind. Parameters that name no facet are ignored.
    pub fn from_query_parameters<I, K, V>(registry: Arc<FacetRegistry>, params: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let params: Vec<(K, V)> = params.into_iter().collect();

        let mut model = FilterModel::with_registry(Arc::clone(&registry));
        for spec in registry.iter() {
            let key = spec.key.as_str();
            let value = match spec.kind {
                FacetKind::MultiSelect => {
                    let selected = values_of(&params, key);
                    if selected.is_empty() {
                        continue;
                    }
                    FacetValue::multi_select(selected)
                }
                FacetKind::Text => match values_of(&params, key).last() {
                    Some(text) => FacetValue::text(*text),
                    None => continue,
                },
                FacetKind::Range => {
                    let min = values_of(&params, &min_param(key)).last().copied();
                    let max = values_of(&params, &max_param(key)).last().copied();
                    match (min, max) {
                        (None, None) => continue,
                        (Some(min), Some(max)) => {
                            FacetValue::range(parse_bound(key, min)?, parse_bound(key, max)?)
                        }
                        _ => {
                            return Err(AppError::validation(format!(
                                "Range facet '{key}' needs both {} and {}",
                                min_param(key),
                                max_param(key)
                            )));
                        }
                    }
                }
            };
            model = model.set(key, value)?;
        }
        Ok(model)
    }

    /// Parse a form-urlencoded query string, see [`FilterModel::from_query_parameters`].
    pub fn from_query_string(registry: Arc<FacetRegistry>, query: &str) -> Result<Self> {
        let query = query.trim_start_matches('?');
        Self::from_query_parameters(registry, form_urlencoded::parse(query.as_bytes()))
    }
}

fn values_of<'p, K, V>(params: &'p [(K, V)], name: &str) -> Vec<&'p str>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    params
        .iter()
        .filter(|(k, _)| k.as_ref() == name)
        .map(|(_, v)| v.as_ref())
        .collect()
}

fn min_param(key: &str) -> String {
    format!("{key}_min")
}

fn max_param(key: &str) -> String {
    format!("{key}_max")
}

fn parse_bound(key: &str, raw: &str) -> Result<f64> {
    raw.trim().parse().map_err(|_| {
        AppError::validation(format!("Range facet '{key}' has a non-numeric bound '{raw}'"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CatalogEntry, Listing};

    fn books_filter() -> FilterModel {
        FilterModel::with_registry(Listing::Books.registry())
            .set("category", FacetValue::multi_select(["SSC", "Banking"]))
            .unwrap()
            .set("price", FacetValue::range(100.0, 499.5))
            .unwrap()
            .set("search", FacetValue::text("Reasoning"))
            .unwrap()
    }

    #[test]
    fn test_parameters_are_ordered_and_expanded() {
        let params = books_filter().to_query_parameters();
        let expected = [
            ("category", "Banking"),
            ("category", "SSC"),
            ("price_min", "100"),
            ("price_max", "499.5"),
            ("search", "Reasoning"),
        ];
        let actual: Vec<_> = params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_unconstrained_facets_omitted() {
        let filter = FilterModel::new()
            .set("category", FacetValue::multi_select(Vec::<String>::new()))
            .unwrap()
            .set("search", FacetValue::text("   "))
            .unwrap();
        assert!(filter.to_query_parameters().is_empty());
        assert_eq!(filter.to_query_string(), "");
    }

    #[test]
    fn test_query_string_is_urlencoded() {
        let filter = FilterModel::new()
            .set("category", FacetValue::multi_select(["State PSC"]))
            .unwrap();
        assert_eq!(filter.to_query_string(), "category=State+PSC");
    }

    #[test]
    fn test_query_string_parses_back() {
        let filter = books_filter();
        let parsed =
            FilterModel::from_query_string(Listing::Books.registry(), &filter.to_query_string())
                .unwrap();
        assert_eq!(parsed, filter);
    }

    #[test]
    fn test_both_forms_select_same_entries() {
        let entries = vec![
            CatalogEntry::new("a", Listing::Books, "Banking Reasoning", "Banking").with_price(300.0),
            CatalogEntry::new("b", Listing::Books, "SSC Reasoning", "SSC").with_price(650.0),
            CatalogEntry::new("c", Listing::Books, "SSC Maths", "SSC").with_price(200.0),
        ];
        let filter = books_filter();
        let parsed = FilterModel::from_query_parameters(
            Listing::Books.registry(),
            filter.to_query_parameters(),
        )
        .unwrap();

        for entry in &entries {
            assert_eq!(filter.matches(entry), parsed.matches(entry), "{}", entry.id);
        }
        assert!(filter.matches(&entries[0]));
    }

    #[test]
    fn test_paging_parameters_ignored() {
        let parsed = FilterModel::from_query_string(
            Listing::JobAlerts.registry(),
            "?offset=20&limit=10&category=Railways",
        )
        .unwrap();
        assert_eq!(
            parsed.get("category"),
            Some(&FacetValue::multi_select(["Railways"]))
        );
        assert_eq!(parsed.iter().count(), 1);
    }

    #[test]
    fn test_half_open_range_rejected() {
        let err =
            FilterModel::from_query_string(Listing::Books.registry(), "price_min=100").unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_non_numeric_bound_rejected() {
        let result =
            FilterModel::from_query_string(Listing::Books.registry(), "price_min=cheap&price_max=9");
        assert!(result.is_err());
    }

    #[test]
    fn test_inverted_range_rejected() {
        let result =
            FilterModel::from_query_string(Listing::Books.registry(), "price_min=900&price_max=9");
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
