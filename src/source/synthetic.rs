//! Deterministic stand-in catalog data.
//!
//! Generates plausible entries for every listing so the loader can be
//! exercised without a backend. The same `(listing, count)` always yields
//! the same entries.

use crate::models::{CatalogEntry, Listing};
use crate::source::InMemorySource;

const PROVIDERS: &[&str] = &[
    "Arihant",
    "Kiran Prakashan",
    "Lucent",
    "Adda247",
    "Testbook",
    "Oliveboard",
];

const LANGUAGES: &[&str] = &["English", "Hindi", "Bilingual"];

const SUBJECTS: &[&str] = &[
    "Quantitative Aptitude",
    "Reasoning",
    "General Awareness",
    "English Language",
    "Current Affairs",
];

/// Recruiting bodies per exam category, for job alerts and exam notices.
fn recruiter(category: &str) -> &'static str {
    match category {
        "SSC" => "Staff Selection Commission",
        "Banking" => "IBPS",
        "Railways" => "Railway Recruitment Board",
        "UPSC" => "Union Public Service Commission",
        "State PSC" => "State Public Service Commission",
        "Defence" => "Ministry of Defence",
        "Teaching" => "CTET Board",
        _ => "State Police Board",
    }
}

/// Generate `count` entries of `listing`.
pub fn generate(listing: Listing, count: usize) -> Vec<CatalogEntry> {
    let categories = listing.categories();
    (0..count)
        .map(|i| {
            let category = categories[i % categories.len()];
            let subject = SUBJECTS[(i / categories.len()) % SUBJECTS.len()];
            let number = i + 1;

            let (title, provider) = match listing {
                Listing::Books => (
                    format!("{category} {subject} Guide Vol. {number}"),
                    PROVIDERS[i % PROVIDERS.len()],
                ),
                Listing::Courses => (
                    format!("{category} Complete Course: {subject}"),
                    PROVIDERS[(i + 3) % PROVIDERS.len()],
                ),
                Listing::GovernmentExams => (
                    format!("{category} Recruitment Exam {}", 2024 + i % 3),
                    recruiter(category),
                ),
                Listing::JobAlerts => (
                    format!("{category} Vacancy Notice #{number}"),
                    recruiter(category),
                ),
                Listing::TestSeries => (
                    format!("{category} Mock Test Series {number}"),
                    PROVIDERS[(i + 1) % PROVIDERS.len()],
                ),
                Listing::WeeklyTests => (
                    format!("Week {number} {category} {subject} Test"),
                    PROVIDERS[(i + 2) % PROVIDERS.len()],
                ),
                Listing::DailyQuizzes => (
                    format!("Daily {subject} Quiz #{number}"),
                    PROVIDERS[(i + 4) % PROVIDERS.len()],
                ),
            };

            let mut entry = CatalogEntry::new(
                format!("{}-{number:04}", listing.slug()),
                listing,
                title,
                category,
            )
            .with_provider(provider)
            .with_tags([category.to_lowercase(), subject.to_lowercase()]);

            if listing.is_priced() {
                entry = entry.with_price((149 + (i * 37) % 850) as f64);
            }
            if listing.is_multilingual() {
                entry = entry.with_attribute("language", LANGUAGES[i % LANGUAGES.len()]);
            }
            match listing {
                Listing::JobAlerts => {
                    entry = entry.with_attribute("vacancies", ((i * 53) % 2000 + 10) as u64)
                }
                Listing::WeeklyTests => {
                    entry = entry.with_attribute("questions", (50 + (i % 3) * 25) as u64)
                }
                Listing::DailyQuizzes => {
                    entry = entry.with_attribute("questions", (10 + (i % 3) * 5) as u64)
                }
                _ => {}
            }
            entry
        })
        .collect()
}

/// In-memory source over `count` generated entries of `listing`.
pub fn source(listing: Listing, count: usize) -> InMemorySource<CatalogEntry> {
    InMemorySource::new(generate(listing, count))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::filter::{FacetValue, FilterModel};
    use crate::models::CatalogItem;

    #[test]
    fn test_ids_are_unique_and_stable() {
        let first = generate(Listing::Books, 40);
        let second = generate(Listing::Books, 40);
        assert_eq!(first, second);

        let ids: HashSet<_> = first.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids.len(), 40);
        assert_eq!(first[0].id, "books-0001");
    }

    #[test]
    fn test_entries_fit_their_listing_facets() {
        for listing in Listing::ALL {
            let registry = listing.registry();
            for entry in generate(listing, 24) {
                assert_eq!(entry.listing, listing);
                assert!(listing.categories().contains(&entry.category.as_str()));
                assert_eq!(entry.price.is_some(), listing.is_priced());
                for spec in registry.iter() {
                    let has_field = spec
                        .fields
                        .iter()
                        .any(|f| entry.field(f).is_some());
                    assert!(has_field, "{} lacks facet {}", entry.id, spec.key);
                }
            }
        }
    }

    #[test]
    fn test_every_category_is_represented() {
        let entries = generate(Listing::JobAlerts, 16);
        let filter = FilterModel::with_registry(Listing::JobAlerts.registry());
        for category in Listing::JobAlerts.categories() {
            let filter = filter
                .set("category", FacetValue::multi_select([*category]))
                .unwrap();
            assert_eq!(entries.iter().filter(|e| filter.matches(*e)).count(), 2);
        }
    }
}
