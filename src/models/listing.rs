//! Catalog listings and their facet registries.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::filter::FacetRegistry;

/// Exam categories shared by every listing.
const EXAM_CATEGORIES: &[&str] = &[
    "SSC",
    "Banking",
    "Railways",
    "UPSC",
    "State PSC",
    "Defence",
    "Teaching",
    "Police",
];

/// Material languages offered by books, courses and tests.
const LANGUAGES: &[&str] = &["English", "Hindi", "Bilingual"];

/// A browsable listing of the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
pub enum Listing {
    Books,
    Courses,
    GovernmentExams,
    JobAlerts,
    TestSeries,
    WeeklyTests,
    DailyQuizzes,
}

impl Listing {
    pub const ALL: [Listing; 7] = [
        Listing::Books,
        Listing::Courses,
        Listing::GovernmentExams,
        Listing::JobAlerts,
        Listing::TestSeries,
        Listing::WeeklyTests,
        Listing::DailyQuizzes,
    ];

    /// URL-safe slug, also used as the remote endpoint path.
    pub fn slug(self) -> &'static str {
        match self {
            Listing::Books => "books",
            Listing::Courses => "courses",
            Listing::GovernmentExams => "government-exams",
            Listing::JobAlerts => "job-alerts",
            Listing::TestSeries => "test-series",
            Listing::WeeklyTests => "weekly-tests",
            Listing::DailyQuizzes => "daily-quizzes",
        }
    }

    /// Human-readable name.
    pub fn display_name(self) -> &'static str {
        match self {
            Listing::Books => "Books",
            Listing::Courses => "Courses",
            Listing::GovernmentExams => "Government Exams",
            Listing::JobAlerts => "Job Alerts",
            Listing::TestSeries => "Test Series",
            Listing::WeeklyTests => "Weekly Tests",
            Listing::DailyQuizzes => "Daily Quizzes",
        }
    }

    /// Known category options for this listing.
    pub fn categories(self) -> &'static [&'static str] {
        EXAM_CATEGORIES
    }

    /// Whether entries of this listing carry a price.
    pub fn is_priced(self) -> bool {
        matches!(
            self,
            Listing::Books | Listing::Courses | Listing::TestSeries
        )
    }

    /// Whether entries of this listing are offered in several languages.
    pub fn is_multilingual(self) -> bool {
        matches!(
            self,
            Listing::Books | Listing::Courses | Listing::WeeklyTests | Listing::DailyQuizzes
        )
    }

    /// Facet registry for this listing's filter sidebar.
    pub fn facets(self) -> FacetRegistry {
        let mut registry = FacetRegistry::new().multi_select(
            "category",
            "Category",
            "category",
            self.categories().iter().copied(),
        );

        if self.is_priced() {
            registry = registry.range("price", "Price", "price");
        }
        if self.is_multilingual() {
            registry = registry.multi_select(
                "language",
                "Language",
                "language",
                LANGUAGES.iter().copied(),
            );
        }
        match self {
            Listing::JobAlerts => registry = registry.range("vacancies", "Vacancies", "vacancies"),
            Listing::WeeklyTests | Listing::DailyQuizzes => {
                registry = registry.range("questions", "Questions", "questions")
            }
            _ => {}
        }

        registry.text("search", "Search", ["title", "provider", "tags"])
    }

    /// Shared facet registry, ready to attach to a filter model.
    pub fn registry(self) -> Arc<FacetRegistry> {
        Arc::new(self.facets())
    }
}

impl fmt::Display for Listing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Listing {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        Listing::ALL
            .into_iter()
            .find(|listing| listing.slug() == s)
            .ok_or_else(|| AppError::validation(format!("Unknown listing '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FacetKind;

    #[test]
    fn test_slug_round_trip() {
        for listing in Listing::ALL {
            assert_eq!(listing.slug().parse::<Listing>().unwrap(), listing);
        }
        assert!("magazines".parse::<Listing>().is_err());
    }

    #[test]
    fn test_every_listing_has_category_and_search() {
        for listing in Listing::ALL {
            let facets = listing.facets();
            assert_eq!(
                facets.get("category").map(|s| s.kind),
                Some(FacetKind::MultiSelect)
            );
            assert_eq!(facets.get("search").map(|s| s.kind), Some(FacetKind::Text));
        }
    }

    #[test]
    fn test_listing_specific_facets() {
        assert!(Listing::Books.facets().get("price").is_some());
        assert!(Listing::JobAlerts.facets().get("price").is_none());
        assert!(Listing::JobAlerts.facets().get("vacancies").is_some());
        assert!(Listing::DailyQuizzes.facets().get("questions").is_some());
    }
}
