//! The item contract shared by every listing.

use std::borrow::Cow;

/// A record that can be loaded into a collection session and filtered.
///
/// Identity is by [`CatalogItem::id`] only; two records with the same id are
/// the same item no matter what their other fields say.
pub trait CatalogItem: Clone + Send + Sync + 'static {
    /// Stable unique identifier.
    fn id(&self) -> &str;

    /// Look up a named field for facet matching.
    fn field(&self, name: &str) -> Option<FieldValue<'_>>;
}

/// A field value as seen by facet predicates.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'a> {
    Text(Cow<'a, str>),
    Number(f64),
    List(Vec<Cow<'a, str>>),
}

impl<'a> FieldValue<'a> {
    /// Borrowed text value.
    pub fn text(value: &'a str) -> Self {
        Self::Text(Cow::Borrowed(value))
    }

    /// Borrowed list of text values.
    pub fn list<I>(values: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        Self::List(values.into_iter().map(Cow::Borrowed).collect())
    }

    /// Returns true if any textual form of this value satisfies `pred`.
    ///
    /// Numbers are compared in their shortest decimal form.
    pub fn any_text(&self, mut pred: impl FnMut(&str) -> bool) -> bool {
        match self {
            Self::Text(s) => pred(s),
            Self::Number(n) => pred(&format_number(*n)),
            Self::List(values) => values.iter().any(|v| pred(v)),
        }
    }

    /// Numeric form of this value, if it has one.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
            Self::List(_) => None,
        }
    }
}

/// Format a number without a trailing `.0` for whole values.
pub(crate) fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}
