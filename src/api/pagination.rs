//! Page-number pagination
//!
//! Lists answer `{"count", "next", "previous", "results"}` where the links
//! repeat the request's path and query with another `page` value.

use axum::http::Uri;
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use crate::domain::PageRequest;
use crate::infrastructure::ApiSettings;

#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<String>,
    pub page_size: Option<String>,
}

impl PageParams {
    /// A page that is not a positive number is invalid; a bad page size falls
    /// back to the default.
    pub fn resolve(&self, settings: &ApiSettings) -> Result<PageRequest, ApiError> {
        let page = match self.page.as_deref().map(str::trim) {
            None | Some("") => 1,
            Some(raw) => match raw.parse::<u64>() {
                Ok(n) if n > 0 => n,
                _ => return Err(ApiError::InvalidPage),
            },
        };
        let page_size = self
            .page_size
            .as_deref()
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .filter(|n| *n > 0)
            .map(|n| n.min(settings.max_page_size))
            .unwrap_or(settings.default_page_size);

        Ok(PageRequest::new(page, page_size))
    }
}

#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Paginated<T> {
    /// Fails with `InvalidPage` past the last page; the first page always exists.
    pub fn new(results: Vec<T>, count: u64, request: PageRequest, uri: &Uri) -> Result<Self, ApiError> {
        let pages = count.div_ceil(request.page_size).max(1);
        if request.page > pages {
            return Err(ApiError::InvalidPage);
        }

        let next = (request.page < pages).then(|| page_link(uri, Some(request.page + 1)));
        let previous = match request.page {
            1 => None,
            2 => Some(page_link(uri, None)),
            n => Some(page_link(uri, Some(n - 1))),
        };

        Ok(Paginated {
            count,
            next,
            previous,
            results,
        })
    }
}

fn page_link(uri: &Uri, page: Option<u64>) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in url::form_urlencoded::parse(uri.query().unwrap_or_default().as_bytes()) {
        if key != "page" {
            query.append_pair(&key, &value);
        }
    }
    if let Some(page) = page {
        query.append_pair("page", &page.to_string());
    }

    let query = query.finish();
    if query.is_empty() {
        uri.path().to_string()
    } else {
        format!("{}?{}", uri.path(), query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(page: Option<&str>, page_size: Option<&str>) -> PageParams {
        PageParams {
            page: page.map(str::to_string),
            page_size: page_size.map(str::to_string),
        }
    }

    #[test]
    fn test_resolve_defaults_and_caps() {
        let settings = ApiSettings::default();
        assert_eq!(
            params(None, None).resolve(&settings).unwrap(),
            PageRequest::new(1, 10)
        );
        assert_eq!(
            params(Some("3"), Some("1000")).resolve(&settings).unwrap(),
            PageRequest::new(3, 100)
        );
        assert_eq!(
            params(None, Some("many")).resolve(&settings).unwrap(),
            PageRequest::new(1, 10)
        );
        assert!(matches!(
            params(Some("0"), None).resolve(&settings),
            Err(ApiError::InvalidPage)
        ));
        assert!(matches!(
            params(Some("two"), None).resolve(&settings),
            Err(ApiError::InvalidPage)
        ));
    }

    #[test]
    fn test_links_keep_other_parameters() {
        let uri: Uri = "/api/books?search=dune&page=2&page_size=1".parse().unwrap();
        let page = Paginated::new(vec![()], 3, PageRequest::new(2, 1), &uri).unwrap();
        assert_eq!(page.count, 3);
        assert_eq!(
            page.next.as_deref(),
            Some("/api/books?search=dune&page_size=1&page=3")
        );
        assert_eq!(
            page.previous.as_deref(),
            Some("/api/books?search=dune&page_size=1")
        );
    }

    #[test]
    fn test_single_page_has_no_links() {
        let uri: Uri = "/api/authors".parse().unwrap();
        let page = Paginated::<()>::new(Vec::new(), 0, PageRequest::new(1, 10), &uri).unwrap();
        assert!(page.next.is_none());
        assert!(page.previous.is_none());
    }

    #[test]
    fn test_page_past_the_end_is_invalid() {
        let uri: Uri = "/api/authors?page=3".parse().unwrap();
        assert!(matches!(
            Paginated::new(vec![()], 11, PageRequest::new(3, 10), &uri),
            Err(ApiError::InvalidPage)
        ));
    }
}
