//! Cloudflare outbound adapters.
//!
//! This module provides a thin HTTP implementation of the `DnsGateway` port
//! against a single Cloudflare zone.

mod dto;
mod http_gateway;

pub use http_gateway::{CloudflareConfig, CloudflareHttpGateway, DEFAULT_CLOUDFLARE_API_BASE};
