//! Request URL and form decoding.

use url::Url;
use url::form_urlencoded;

/// Base used to resolve request targets, which arrive as origin-form paths.
const BASE: &str = "http://playground.invalid/";

/// Query parameter naming the project when the path does not.
pub(crate) const PROJECT_PARAM: &str = "PROJECT";

/// Form field carrying file contents.
pub(crate) const CONTENT_FIELD: &str = "content";

/// Decoded request target.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct RequestTarget {
    segments: Vec<String>,
    params: Vec<(String, String)>,
}

impl RequestTarget {
    /// Decodes `raw`; malformed targets decode to an empty target.
    pub(crate) fn parse(raw: &str) -> Self {
        let Ok(url) = Url::parse(BASE).and_then(|base| base.join(raw)) else {
            return Self::default();
        };
        let segments = url
            .path_segments()
            .map(|parts| {
                parts
                    .filter(|part| !part.is_empty())
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default();
        let params = url.query_pairs().into_owned().collect();
        Self { segments, params }
    }

    /// Returns `true` for `/`.
    pub(crate) fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns `true` when the path is exactly `/<name>`.
    pub(crate) fn is_path(&self, name: &str) -> bool {
        matches!(self.segments.as_slice(), [only] if only == name)
    }

    /// First value of the query parameter `key`.
    pub(crate) fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    /// Returns `true` when `key` appears in the query, with or without a
    /// value.
    pub(crate) fn has(&self, key: &str) -> bool {
        self.params.iter().any(|(name, _)| name == key)
    }

    /// Project named by the first path segment, or else by `PROJECT`.
    pub(crate) fn project(&self) -> Option<&str> {
        self.segments
            .first()
            .map(String::as_str)
            .or_else(|| self.param(PROJECT_PARAM))
    }
}

/// First value of `field` in an `application/x-www-form-urlencoded` body.
pub(crate) fn form_field(body: &[u8], field: &str) -> Option<String> {
    form_urlencoded::parse(body)
        .find(|(name, _)| name == field)
        .map(|(_, value)| value.into_owned())
}
