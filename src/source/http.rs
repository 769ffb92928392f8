//! Remote catalog API source.
//!
//! Forwards the filter as query parameters so the server does the
//! filtering, and pages by `offset` or by an opaque `cursor` token.

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{CatalogEntry, Listing, SourceConfig};
use crate::source::{Cursor, DataSource, FetchRequest, Page};
use crate::utils::http;

/// JSON body of one page.
#[derive(Debug, Deserialize)]
struct PageResponse {
    items: Vec<CatalogEntry>,

    #[serde(default)]
    next_cursor: Option<String>,

    #[serde(default)]
    is_last_page: bool,

    #[serde(default)]
    total: Option<usize>,
}

/// Data source backed by `GET {base_url}/{listing}`.
pub struct HttpSource {
    client: reqwest::Client,
    endpoint: Url,
    listing: Listing,
}

impl HttpSource {
    pub fn new(client: reqwest::Client, base_url: &str, listing: Listing) -> Result<Self> {
        Ok(Self {
            client,
            endpoint: http::endpoint_url(base_url, listing.slug())?,
            listing,
        })
    }

    /// Build a source with a client configured from `config`.
    pub fn from_config(config: &SourceConfig, listing: Listing) -> Result<Self> {
        let client = http::create_async_client(config)?;
        Self::new(client, &config.base_url, listing)
    }

    pub fn listing(&self) -> Listing {
        self.listing
    }

    /// URL of the page described by `request`.
    pub fn page_url(&self, request: &FetchRequest) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in request.filter.to_query_parameters() {
                pairs.append_pair(&key, &value);
            }
            pairs.append_pair("limit", &request.page_size.to_string());
            match &request.cursor {
                Cursor::Offset(offset) => pairs.append_pair("offset", &offset.to_string()),
                Cursor::Token(token) => pairs.append_pair("cursor", token),
            };
        }
        url
    }
}

#[async_trait]
impl DataSource for HttpSource {
    type Item = CatalogEntry;

    async fn fetch_page(&self, request: &FetchRequest) -> Result<Page<CatalogEntry>> {
        let url = self.page_url(request);
        log::debug!("GET {url}");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await?
            .error_for_status()?;
        let body: PageResponse = serde_json::from_slice(&response.bytes().await?)
            .map_err(|e| AppError::fetch(url.as_str(), e))?;

        let next_cursor = match body.next_cursor {
            Some(token) => Some(Cursor::Token(token)),
            None => request.cursor.advance(body.items.len()),
        };

        Ok(Page {
            items: body.items,
            next_cursor,
            is_last_page: body.is_last_page,
            total: body.total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{FacetValue, FilterModel};

    fn source() -> HttpSource {
        HttpSource::new(
            reqwest::Client::new(),
            "https://api.example.com/v1",
            Listing::Books,
        )
        .unwrap()
    }

    fn request(filter: FilterModel, cursor: Cursor) -> FetchRequest {
        FetchRequest {
            filter,
            cursor,
            page_size: 12,
            generation: 3,
        }
    }

    #[test]
    fn test_page_url_with_offset() {
        let filter = FilterModel::with_registry(Listing::Books.registry())
            .set("category", FacetValue::multi_select(["SSC", "Banking"]))
            .unwrap()
            .set("price", FacetValue::range(100.0, 500.0))
            .unwrap();

        let url = source().page_url(&request(filter, Cursor::Offset(24)));
        assert_eq!(
            url.as_str(),
            "https://api.example.com/v1/books?category=Banking&category=SSC\
             &price_min=100&price_max=500&limit=12&offset=24"
        );
    }

    #[test]
    fn test_page_url_with_token() {
        let url = source().page_url(&request(FilterModel::new(), Cursor::Token("a b".into())));
        assert_eq!(
            url.as_str(),
            "https://api.example.com/v1/books?limit=12&cursor=a+b"
        );
    }

    #[test]
    fn test_page_response_defaults() {
        let body: PageResponse = serde_json::from_str(r#"{"items":[]}"#).unwrap();
        assert!(body.items.is_empty());
        assert!(!body.is_last_page);
        assert!(body.next_cursor.is_none());
        assert!(body.total.is_none());
    }
}
