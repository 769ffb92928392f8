//! Catalog entry data structure.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::{CatalogItem, FieldValue, Listing, format_number};

/// A single card of a catalog listing (a book, a course, a job alert, ...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogEntry {
    /// Stable unique identifier
    pub id: String,

    /// Listing this entry belongs to
    pub listing: Listing,

    /// Card title
    pub title: String,

    /// Exam category (e.g., "SSC", "Banking")
    pub category: String,

    /// Publisher, institute or recruiting body
    #[serde(default)]
    pub provider: String,

    /// Price in rupees, if the entry is sold
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,

    /// Free-form search tags
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Listing-specific fields (language, vacancies, questions, ...)
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub attributes: Map<String, Value>,
}

impl CatalogEntry {
    /// Create an entry with the required fields set.
    pub fn new(
        id: impl Into<String>,
        listing: Listing,
        title: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            listing,
            title: title.into(),
            category: category.into(),
            provider: String::new(),
            price: None,
            tags: Vec::new(),
            attributes: Map::new(),
        }
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = provider.into();
        self
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Format entry for display using a template.
    ///
    /// Supported placeholders:
    /// - `{id}`, `{listing}`, `{title}`, `{category}`, `{provider}`, `{price}`
    pub fn format(&self, template: &str) -> String {
        let price = self.price.map(format_number).unwrap_or_else(|| "-".into());
        template
            .replace("{id}", &self.id)
            .replace("{listing}", self.listing.slug())
            .replace("{title}", &self.title)
            .replace("{category}", &self.category)
            .replace("{provider}", &self.provider)
            .replace("{price}", &price)
    }
}

impl CatalogItem for CatalogEntry {
    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "id" => Some(FieldValue::text(&self.id)),
            "listing" => Some(FieldValue::text(self.listing.slug())),
            "title" => Some(FieldValue::text(&self.title)),
            "category" => Some(FieldValue::text(&self.category)),
            "provider" => Some(FieldValue::text(&self.provider)),
            "price" => self.price.map(FieldValue::Number),
            "tags" => Some(FieldValue::list(self.tags.iter().map(String::as_str))),
            other => self.attributes.get(other).and_then(attribute_value),
        }
    }
}

/// Map a JSON attribute onto a facet field value.
fn attribute_value(value: &Value) -> Option<FieldValue<'_>> {
    match value {
        Value::String(s) => Some(FieldValue::text(s)),
        Value::Number(n) => n.as_f64().map(FieldValue::Number),
        Value::Bool(b) => Some(FieldValue::Text(Cow::Owned(b.to_string()))),
        Value::Array(values) => Some(FieldValue::List(
            values
                .iter()
                .filter_map(|v| v.as_str().map(Cow::Borrowed))
                .collect(),
        )),
        Value::Null | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_entry() -> CatalogEntry {
        CatalogEntry::new("book-1", Listing::Books, "SSC CGL Guide", "SSC")
            .with_provider("Arihant")
            .with_price(499.0)
            .with_tags(["cgl", "quant"])
            .with_attribute("language", "Hindi")
            .with_attribute("pages", 640)
    }

    #[test]
    fn test_format() {
        let entry = sample_entry();
        let result = entry.format("[{category}] {title} - {provider} (Rs. {price})");
        assert_eq!(result, "[SSC] SSC CGL Guide - Arihant (Rs. 499)");
    }

    #[test]
    fn test_format_without_price() {
        let entry = CatalogEntry::new("job-1", Listing::JobAlerts, "Clerk", "Banking");
        assert_eq!(entry.format("{listing}/{id} {price}"), "job-alerts/job-1 -");
    }

    #[test]
    fn test_fixed_fields() {
        let entry = sample_entry();
        assert_eq!(entry.field("category"), Some(FieldValue::text("SSC")));
        assert_eq!(entry.field("price"), Some(FieldValue::Number(499.0)));
        assert!(entry.field("tags").unwrap().any_text(|t| t == "quant"));
    }

    #[test]
    fn test_attribute_fields() {
        let entry = sample_entry();
        assert_eq!(entry.field("language"), Some(FieldValue::text("Hindi")));
        assert_eq!(entry.field("pages").and_then(|v| v.as_number()), Some(640.0));
        assert_eq!(entry.field("missing"), None);
    }

    #[test]
    fn test_deserialize_minimal() {
        let json = r#"{"id":"q-7","listing":"daily-quizzes","title":"Reasoning","category":"Railways"}"#;
        let entry: CatalogEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.listing, Listing::DailyQuizzes);
        assert!(entry.price.is_none());
        assert!(entry.attributes.is_empty());
    }
}
