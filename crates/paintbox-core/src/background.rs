//! Background image references.

use std::fmt;
use std::path::Path;
use thiserror::Error;
use url::Url;

/// Query parameter names that may carry an initial background.
const QUERY_KEYS: [&str; 2] = ["image", "background"];

/// Background reference errors.
#[derive(Debug, Error)]
pub enum BackgroundError {
    #[error("Empty background reference")]
    Empty,
    #[error("Invalid background reference {reference:?}: {source}")]
    InvalidUrl {
        reference: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Asset root is not an absolute directory: {0}")]
    InvalidRoot(String),
}

/// Locator of the image shown on the background surface.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BackgroundRef {
    url: Url,
}

impl BackgroundRef {
    /// Parse a reference as handed over by the gallery.
    ///
    /// Absolute URLs are used as-is. Anything else is treated as a
    /// (possibly percent-encoded) path relative to `asset_root`.
    pub fn parse(reference: &str, asset_root: &Path) -> Result<Self, BackgroundError> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(BackgroundError::Empty);
        }

        match Url::parse(reference) {
            Ok(url) => Ok(Self { url }),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let base = Url::from_directory_path(asset_root)
                    .map_err(|()| BackgroundError::InvalidRoot(asset_root.display().to_string()))?;
                let url = base
                    .join(reference.trim_start_matches('/'))
                    .map_err(|source| BackgroundError::InvalidUrl {
                        reference: reference.to_string(),
                        source,
                    })?;
                Ok(Self { url })
            }
            Err(source) => Err(BackgroundError::InvalidUrl {
                reference: reference.to_string(),
                source,
            }),
        }
    }

    /// Read the background from a page query string such as `?image=cat.png`.
    pub fn from_query(query: &str, asset_root: &Path) -> Option<Result<Self, BackgroundError>> {
        let query = query.trim_start_matches('?');
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| QUERY_KEYS.contains(&key.as_ref()))
            .map(|(_, value)| Self::parse(&value, asset_root))
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }
}

impl fmt::Display for BackgroundRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}
