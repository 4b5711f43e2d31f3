//! Session authentication.

mod token_store;

pub use token_store::{SessionToken, SessionTokenStore};
