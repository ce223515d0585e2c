//! Fetch target: base location plus mutable query parameters.

use url::Url;

use crate::error::ConfigurationError;
use crate::sort::SortState;

/// Query parameter carrying the sort column.
pub const SORT_PARAM: &str = "_sort";
/// Query parameter carrying the sort direction.
pub const ORDER_PARAM: &str = "_order";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTarget {
    url: Url,
}

impl FetchTarget {
    /// Resolve `path` against `base` the way a browser resolves a relative
    /// link. An absolute `path` ignores `base`.
    pub fn resolve(base: &str, path: &str) -> Result<Self, ConfigurationError> {
        let base = Url::parse(base)
            .map_err(|e| ConfigurationError::InvalidUrl(format!("{base}: {e}")))?;
        let url = base
            .join(path)
            .map_err(|e| ConfigurationError::InvalidUrl(format!("{path}: {e}")))?;
        Ok(Self { url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn param(&self, key: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    /// Set a query parameter, overwriting it in place if present.
    pub fn set_param(&mut self, key: &str, value: &str) {
        let mut pairs: Vec<(String, String)> = self
            .url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        match pairs.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value.to_string(),
            None => pairs.push((key.to_string(), value.to_string())),
        }
        self.url.query_pairs_mut().clear().extend_pairs(pairs);
    }

    /// Write `_sort` and `_order` for `state`.
    pub fn set_sort(&mut self, state: &SortState) {
        self.set_param(SORT_PARAM, &state.column_id);
        self.set_param(ORDER_PARAM, state.direction.as_str());
    }
}

impl std::fmt::Display for FetchTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_relative_path() {
        let target = FetchTarget::resolve("https://example.test", "products").unwrap();
        assert_eq!(target.url().as_str(), "https://example.test/products");
    }

    #[test]
    fn test_resolve_absolute_path() {
        let target = FetchTarget::resolve("https://example.test", "https://other.test/api").unwrap();
        assert_eq!(target.url().as_str(), "https://other.test/api");
    }

    #[test]
    fn test_resolve_invalid_base() {
        let err = FetchTarget::resolve("not a url", "products").unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidUrl(_)));
    }

    #[test]
    fn test_set_sort_appends_then_overwrites() {
        let mut target = FetchTarget::resolve("https://example.test", "products").unwrap();
        target.set_sort(&SortState::ascending("price"));
        assert_eq!(
            target.url().as_str(),
            "https://example.test/products?_sort=price&_order=asc"
        );

        target.set_sort(&SortState::descending("title"));
        assert_eq!(
            target.url().as_str(),
            "https://example.test/products?_sort=title&_order=desc"
        );
    }

    #[test]
    fn test_filters_survive_sort() {
        let mut target =
            FetchTarget::resolve("https://example.test", "api/rest/products?_embed=subcategory")
                .unwrap();
        target.set_sort(&SortState::ascending("price"));
        assert_eq!(target.param("_embed").as_deref(), Some("subcategory"));
        assert_eq!(target.param(SORT_PARAM).as_deref(), Some("price"));
        assert_eq!(target.param(ORDER_PARAM).as_deref(), Some("asc"));
    }
}
