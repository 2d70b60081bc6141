//! # vidshare_core
//!
//! Core domain logic for vidshare: identities, session tokens, channel and
//! watch-history queries, and media uploads.

pub mod auth;
pub mod channel;
pub mod media;
pub mod migrate;
pub mod models;
pub mod store;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_not_empty() {
        assert!(!version().is_empty());
    }
}
