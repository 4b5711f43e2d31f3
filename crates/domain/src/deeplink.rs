//! Deeplink routing.
//!
//! Two URL forms reach the client:
//! - custom scheme: `eventsidekick://<entity>/<identifier>`
//! - universal link: `https://<web-host>/<entity>/<identifier>`
//!
//! `my-requests` is a reserved path and `auth-callback` a reserved host.

use std::collections::BTreeMap;
use std::fmt;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{DomainError, DomainResult};

/// Custom URL scheme registered by the app.
pub const APP_SCHEME: &str = "eventsidekick";

/// Reserved path for the pending-requests inbox.
pub const MY_REQUESTS: &str = "my-requests";

/// Reserved host for OAuth redirects.
pub const AUTH_CALLBACK: &str = "auth-callback";

/// Characters escaped in a rendered path segment (RFC 3986 unreserved stay as-is).
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Identifier that is either a numeric ID or an opaque slug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityRef {
    /// Numeric database ID.
    Id(u64),
    /// URL slug.
    Slug(String),
}

impl EntityRef {
    /// Numeric strings become IDs, anything else a slug.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        raw.parse::<u64>()
            .map_or_else(|_| Self::Slug(raw.to_string()), Self::Id)
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Slug(slug) => f.write_str(slug),
        }
    }
}

/// A resolved in-app destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "route", rename_all = "snake_case")]
pub enum DeepLink {
    /// Event detail, by ID or slug.
    Event {
        /// Event reference.
        target: EntityRef,
    },
    /// User profile.
    User {
        /// Username.
        username: String,
    },
    /// Venue page.
    Venue {
        /// Venue ID.
        id: u64,
    },
    /// Chat thread.
    Chat {
        /// Chat ID.
        id: u64,
    },
    /// Group page.
    Group {
        /// Group slug.
        slug: String,
    },
    /// Pending friend and collaboration requests.
    MyRequests,
    /// OAuth redirect carrying query parameters.
    AuthCallback {
        /// Query parameters (`code`, `state`, ...).
        params: BTreeMap<String, String>,
    },
}

impl DeepLink {
    /// Parses a deeplink in either URL form.
    ///
    /// `web_host` is the host accepted for universal links; a leading
    /// `www.` on the incoming URL is ignored.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidUrl` if the input is not a URL and
    /// `DomainError::InvalidDeepLink` if it does not match a route.
    pub fn parse(input: &str, web_host: &str) -> DomainResult<Self> {
        let url = Url::parse(input.trim())
            .map_err(|e| DomainError::InvalidUrl(format!("{e}: {input}")))?;

        match url.scheme() {
            APP_SCHEME => Self::from_app_url(&url),
            "https" => Self::from_web_url(&url, web_host),
            other => Err(DomainError::InvalidDeepLink(format!(
                "unsupported scheme '{other}'"
            ))),
        }
    }

    fn from_app_url(url: &Url) -> DomainResult<Self> {
        let Some(host) = url.host_str() else {
            return Err(DomainError::InvalidDeepLink(url.to_string()));
        };

        if host == AUTH_CALLBACK {
            let params = url.query_pairs().into_owned().collect();
            return Ok(Self::AuthCallback { params });
        }

        let mut segments = vec![host.to_string()];
        segments.extend(path_segments(url)?);
        Self::from_segments(&segments)
    }

    fn from_web_url(url: &Url, web_host: &str) -> DomainResult<Self> {
        let host = url.host_str().unwrap_or_default();
        let host = host.strip_prefix("www.").unwrap_or(host);
        if !host.eq_ignore_ascii_case(web_host) {
            return Err(DomainError::InvalidDeepLink(format!(
                "unknown host '{host}'"
            )));
        }

        let segments = path_segments(url)?;
        Self::from_segments(&segments)
    }

    fn from_segments(segments: &[String]) -> DomainResult<Self> {
        let segments: Vec<&str> = segments.iter().map(String::as_str).collect();
        match segments.as_slice() {
            [MY_REQUESTS] => Ok(Self::MyRequests),
            ["event" | "events", id] => Ok(Self::Event {
                target: EntityRef::parse(id),
            }),
            ["user" | "u", username] => Ok(Self::User {
                username: (*username).to_string(),
            }),
            ["venue", id] => Ok(Self::Venue {
                id: parse_numeric("venue", id)?,
            }),
            ["chat", id] => Ok(Self::Chat {
                id: parse_numeric("chat", id)?,
            }),
            ["group", slug] => Ok(Self::Group {
                slug: (*slug).to_string(),
            }),
            _ => Err(DomainError::InvalidDeepLink(format!(
                "no route for '/{}'",
                segments.join("/")
            ))),
        }
    }

    /// Renders the custom-scheme form of this link.
    #[must_use]
    pub fn to_app_url(&self) -> String {
        match self {
            Self::Event { target } => {
                let target = target.to_string();
                format!("{APP_SCHEME}://event/{}", encode_segment(&target))
            }
            Self::User { username } => {
                format!("{APP_SCHEME}://user/{}", encode_segment(username))
            }
            Self::Venue { id } => format!("{APP_SCHEME}://venue/{id}"),
            Self::Chat { id } => format!("{APP_SCHEME}://chat/{id}"),
            Self::Group { slug } => format!("{APP_SCHEME}://group/{}", encode_segment(slug)),
            Self::MyRequests => format!("{APP_SCHEME}://{MY_REQUESTS}"),
            Self::AuthCallback { params } => {
                let mut url = format!("{APP_SCHEME}://{AUTH_CALLBACK}");
                if !params.is_empty() {
                    let query = url::form_urlencoded::Serializer::new(String::new())
                        .extend_pairs(params)
                        .finish();
                    url.push('?');
                    url.push_str(&query);
                }
                url
            }
        }
    }
}

/// Non-empty path segments, percent-decoded.
fn path_segments(url: &Url) -> DomainResult<Vec<String>> {
    url.path_segments()
        .into_iter()
        .flatten()
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            percent_decode_str(segment)
                .decode_utf8()
                .map(std::borrow::Cow::into_owned)
                .map_err(|_| {
                    DomainError::InvalidDeepLink(format!("segment is not UTF-8: {segment}"))
                })
        })
        .collect()
}

fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT).to_string()
}

fn parse_numeric(entity: &str, raw: &str) -> DomainResult<u64> {
    raw.parse()
        .map_err(|_| DomainError::InvalidIdentifier(format!("{entity} id must be numeric: {raw}")))
}
