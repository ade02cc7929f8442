use crate::error::UrlError;
use url::Url;

/// Resolve `endpoint` against `base`.
///
/// An absolute endpoint path replaces whatever path `base` carries, so
/// `("https://host/ignored", "/api/addEvents")` yields
/// `https://host/api/addEvents`. An empty endpoint returns `base` itself.
///
/// **Returns**
/// - `Ok(url)` with the resolved endpoint.
/// - `Err(UrlError)` if `base` is not an absolute URL or the join fails.
pub fn create_url(base: &str, endpoint: &str) -> Result<Url, UrlError> {
    let err = |source| UrlError {
        base: base.to_string(),
        source,
    };

    let base_url = Url::parse(base).map_err(err)?;
    if endpoint.is_empty() {
        return Ok(base_url);
    }
    base_url.join(endpoint).map_err(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_endpoint_to_host() {
        let url = create_url("https://api.scalyr.com", "/api/addEvents").unwrap();
        assert_eq!(url.as_str(), "https://api.scalyr.com/api/addEvents");
    }

    #[test]
    fn absolute_endpoint_replaces_base_path() {
        let url = create_url("http://127.0.0.1:8080/some/prefix", "/api/uploadLogs").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/api/uploadLogs");
    }

    #[test]
    fn empty_endpoint_keeps_base() {
        let url = create_url("https://example.com", "").unwrap();
        assert_eq!(url.as_str(), "https://example.com/");
    }

    #[test]
    fn rejects_relative_base() {
        let err = create_url("not a url", "/api/addEvents").unwrap_err();
        assert_eq!(err.base, "not a url");
        assert!(err.to_string().starts_with("could not build the URL"));
    }
}
