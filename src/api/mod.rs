//! Remote content API.
//!
//! - [`types`] - domain types (`ContentSummary`, `Article`, `Strategy`) and the
//!   strict wire records they are decoded from
//! - [`client`] - the [`ContentSource`] seam and its HTTP implementation

mod client;
mod types;

pub use client::{ApiError, ContentApiClient, ContentSource, DEFAULT_API_BASE};
pub use types::{Article, ContentSummary, Strategy};
