//! Adapter construction errors.

use thiserror::Error;

/// Failure to build an HTTP adapter from settings.
#[derive(Debug, Error)]
pub enum ClientBuildError {
    /// A configured URL could not be parsed.
    #[error("invalid URL '{url}': {source}")]
    InvalidUrl {
        /// The rejected value.
        url: String,
        /// Parser error.
        source: url::ParseError,
    },

    /// The underlying HTTP client could not be created.
    #[error("failed to create HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

pub(crate) fn parse_url(url: &str) -> Result<url::Url, ClientBuildError> {
    url::Url::parse(url).map_err(|source| ClientBuildError::InvalidUrl {
        url: url.to_string(),
        source,
    })
}

pub(crate) fn build_client() -> Result<reqwest::Client, ClientBuildError> {
    Ok(reqwest::Client::builder()
        .user_agent(concat!("Gather/", env!("CARGO_PKG_VERSION")))
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()?)
}
