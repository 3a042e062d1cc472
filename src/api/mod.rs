//! Data access for the remote query service.
//!
//! Three layers, leaves first:
//! - [`client`]: a resilient HTTP client that classifies outcomes, retries
//!   rate-limited and network-level failures with backoff, and surfaces
//!   rate-limit and deprecation signals.
//! - [`pagination`]: an incremental aggregator that drives the client across
//!   successive pages and merges results into a deduplicated collection.
//! - [`types`]: wire types and endpoint builders.

pub mod client;
pub mod pagination;
pub mod types;

use leptos::prelude::*;

use client::{ApiClient, FetchOutcome, RateLimitState};

/// Shared API wiring, constructed once at app boot and passed down through
/// Leptos context rather than any process-wide singleton.
///
/// The rate-limit and deprecation signals are last-write-wins: every
/// completed request overwrites them, and consumers only ever read.
#[derive(Clone)]
pub struct ApiContext {
	/// The resilient HTTP client.
	pub client: ApiClient,
	/// Rate-limit state from the most recent response.
	pub rate_limit: RwSignal<RateLimitState>,
	/// Latest advisory deprecation notice seen on any endpoint.
	pub deprecation: RwSignal<Option<String>>,
}

impl ApiContext {
	/// Build the context for a service base URL.
	pub fn new(base_url: &str) -> Self {
		Self {
			client: ApiClient::new(base_url),
			rate_limit: RwSignal::new(RateLimitState::default()),
			deprecation: RwSignal::new(None),
		}
	}

	/// Record the shared signals carried by a completed outcome.
	pub fn observe<T>(&self, outcome: &FetchOutcome<T>) {
		match outcome {
			FetchOutcome::Success {
				rate_limit,
				deprecation,
				..
			} => {
				self.rate_limit.set(*rate_limit);
				if let Some(notice) = deprecation {
					self.deprecation.set(Some(notice.clone()));
				}
			}
			FetchOutcome::HttpFailure { rate_limit, .. } => self.rate_limit.set(*rate_limit),
			_ => {}
		}
	}

	/// Fetch the context provided at app boot.
	pub fn expect() -> Self {
		expect_context::<Self>()
	}
}
