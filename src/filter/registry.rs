//! Per-listing facet registry.
//!
//! A registry names the facets a listing offers, the kind of each facet and
//! the item fields it reads. Filter models carrying a registry validate their
//! edits against it, and the query codec uses it to parse parameters back.

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::filter::FacetValue;

/// The kind of value a facet accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacetKind {
    MultiSelect,
    Range,
    Text,
}

impl FacetKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FacetKind::MultiSelect => "multi_select",
            FacetKind::Range => "range",
            FacetKind::Text => "text",
        }
    }
}

/// Description of a single facet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacetSpec {
    /// Facet key used in filter models and query parameters
    pub key: String,

    /// Sidebar label
    pub label: String,

    pub kind: FacetKind,

    /// Item fields the facet reads; a match on any of them counts
    pub fields: Vec<String>,

    /// Allowed values of a multi-select facet (empty means "any value")
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

/// Ordered set of facet specs for one listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FacetRegistry {
    facets: Vec<FacetSpec>,
}

impl FacetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a multi-select facet over a single field.
    pub fn multi_select<'a, I>(
        self,
        key: impl Into<String>,
        label: impl Into<String>,
        field: impl Into<String>,
        options: I,
    ) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.with(FacetSpec {
            key: key.into(),
            label: label.into(),
            kind: FacetKind::MultiSelect,
            fields: vec![field.into()],
            options: options.into_iter().map(str::to_string).collect(),
        })
    }

    /// Register a numeric range facet over a single field.
    pub fn range(
        self,
        key: impl Into<String>,
        label: impl Into<String>,
        field: impl Into<String>,
    ) -> Self {
        self.with(FacetSpec {
            key: key.into(),
            label: label.into(),
            kind: FacetKind::Range,
            fields: vec![field.into()],
            options: Vec::new(),
        })
    }

    /// Register a free-text facet searching one or more fields.
    pub fn text<'a, I>(self, key: impl Into<String>, label: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.with(FacetSpec {
            key: key.into(),
            label: label.into(),
            kind: FacetKind::Text,
            fields: fields.into_iter().map(str::to_string).collect(),
            options: Vec::new(),
        })
    }

    /// Register a facet, replacing any previous spec with the same key.
    pub fn with(mut self, spec: FacetSpec) -> Self {
        match self.facets.iter_mut().find(|f| f.key == spec.key) {
            Some(existing) => *existing = spec,
            None => self.facets.push(spec),
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&FacetSpec> {
        self.facets.iter().find(|f| f.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FacetSpec> {
        self.facets.iter()
    }

    pub fn len(&self) -> usize {
        self.facets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facets.is_empty()
    }

    /// Check that `value` is acceptable for the facet `key`.
    pub fn check(&self, key: &str, value: &FacetValue) -> Result<()> {
        let spec = self
            .get(key)
            .ok_or_else(|| AppError::validation(format!("Unknown facet '{key}'")))?;

        if spec.kind != value.kind() {
            return Err(AppError::validation(format!(
                "Facet '{key}' expects a {} value, got {}",
                spec.kind.as_str(),
                value.kind().as_str()
            )));
        }

        if let FacetValue::MultiSelect(selected) = value {
            if !spec.options.is_empty() {
                if let Some(unknown) = selected.iter().find(|v| !spec.options.contains(v)) {
                    return Err(AppError::validation(format!(
                        "'{unknown}' is not an option of facet '{key}'"
                    )));
                }
            }
        }
        Ok(())
    }
}
