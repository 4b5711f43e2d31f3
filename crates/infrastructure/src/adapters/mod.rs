//! HTTP adapters for the application ports.

mod reqwest_graphql;
mod reqwest_uploader;

pub use reqwest_graphql::ReqwestGraphQlClient;
pub use reqwest_uploader::ReqwestImageUploader;

fn millis(duration: std::time::Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
