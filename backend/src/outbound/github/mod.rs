//! GitHub outbound adapters.
//!
//! Provides the OAuth web-flow implementation of the `IdentityProvider`
//! port.

mod dto;
mod oauth_client;

pub use oauth_client::{GitHubOAuthClient, GitHubOAuthConfig};
