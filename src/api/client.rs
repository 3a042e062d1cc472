//! Resilient HTTP client for the query service.
//!
//! Wraps browser `fetch` with outcome classification and bounded retries.
//! Rate-limited responses (429) and network-level failures are retried with
//! server-directed or exponential-backoff delays; every other non-2xx status
//! surfaces immediately. Rate-limit and deprecation headers are parsed on
//! each response and carried alongside the payload, never turning a success
//! into a failure.

use std::rc::Rc;

use log::warn;
use serde::de::DeserializeOwned;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{AbortController, AbortSignal, Headers, Request, RequestInit, RequestMode, Response};

/// Default retry budget: a request may be re-issued this many times after
/// the initial attempt.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

const BACKOFF_BASE_MS: u64 = 1_000;
const BACKOFF_CAP_MS: u64 = 30_000;
const JITTER_FRACTION: f64 = 0.25;

/// Rate-limit counters parsed from a single response. Last response wins;
/// nothing is accumulated across requests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RateLimitState {
	/// Request quota per window (`x-ratelimit-limit`).
	pub limit: u64,
	/// Requests left in the current window (`x-ratelimit-remaining`).
	pub remaining: u64,
	/// Window reset time in epoch seconds (`x-ratelimit-reset`).
	pub reset_epoch_secs: u64,
	/// Server-directed wait before retrying (`retry-after`), if given.
	pub retry_after_secs: Option<u64>,
	/// Whether the response itself was a 429. Derived from the HTTP status,
	/// never from the numeric counters.
	pub is_limited: bool,
}

impl RateLimitState {
	/// Parse raw header values. Missing or garbled numerics read as 0.
	pub fn from_parts(
		limit: Option<String>,
		remaining: Option<String>,
		reset: Option<String>,
		retry_after: Option<String>,
		status: u16,
	) -> Self {
		let number = |v: Option<String>| v.and_then(|s| s.trim().parse::<u64>().ok()).unwrap_or(0);
		Self {
			limit: number(limit),
			remaining: number(remaining),
			reset_epoch_secs: number(reset),
			retry_after_secs: retry_after.and_then(|s| s.trim().parse::<u64>().ok()),
			is_limited: status == 429,
		}
	}
}

/// Result of one logical fetch, after retries. Exactly one variant per call.
#[derive(Clone, Debug)]
pub enum FetchOutcome<T> {
	/// 2xx with a payload that decoded cleanly.
	Success {
		/// Decoded response body.
		data: T,
		/// Rate-limit counters from this response.
		rate_limit: RateLimitState,
		/// Advisory deprecation/sunset notice, if the server sent one.
		deprecation: Option<String>,
	},
	/// Terminal non-2xx status, including a 429 that exhausted the retry
	/// budget.
	HttpFailure {
		/// HTTP status code.
		status: u16,
		/// Rate-limit counters from the failing response.
		rate_limit: RateLimitState,
	},
	/// Connection-level failure after the retry budget was spent.
	NetworkFailure {
		/// Browser-reported cause.
		cause: String,
	},
	/// 2xx whose body did not match the expected schema.
	DecodeFailure {
		/// Decoder error text.
		cause: String,
	},
	/// The caller's [`CancelToken`] aborted the request.
	Cancelled,
}

/// Cancellation handle for an in-flight fetch. Cloned handles share the
/// same underlying controller; cancelling drops the response at the client
/// layer rather than leaving the caller to ignore it.
#[derive(Clone)]
pub struct CancelToken {
	inner: Rc<AbortController>,
}

impl CancelToken {
	/// Create a fresh, un-cancelled token.
	pub fn new() -> Self {
		Self {
			inner: Rc::new(AbortController::new().expect("AbortController unavailable")),
		}
	}

	/// Abort the associated request. Idempotent.
	pub fn cancel(&self) {
		self.inner.abort();
	}

	/// Whether [`cancel`](Self::cancel) has been called.
	pub fn is_cancelled(&self) -> bool {
		self.inner.signal().aborted()
	}

	fn signal(&self) -> AbortSignal {
		self.inner.signal()
	}
}

impl Default for CancelToken {
	fn default() -> Self {
		Self::new()
	}
}

/// Delay before the next attempt, in milliseconds.
///
/// A server-directed `Retry-After` is honored exactly. Otherwise the delay
/// is `base * 2^attempt` plus uniform jitter drawn from `[0, 0.25 * that)`,
/// capped at 30 seconds. `jitter_unit` is the uniform sample in `[0, 1)`.
pub fn backoff_delay_ms(attempt: u32, retry_after_secs: Option<u64>, jitter_unit: f64) -> u64 {
	if let Some(secs) = retry_after_secs {
		return secs * 1_000;
	}
	let exponential = BACKOFF_BASE_MS.saturating_mul(1u64 << attempt.min(16));
	let jitter = (exponential as f64 * JITTER_FRACTION * jitter_unit.clamp(0.0, 1.0)) as u64;
	exponential.saturating_add(jitter).min(BACKOFF_CAP_MS)
}

/// Advisory notice from `deprecation`/`sunset`/`warning` headers, if any.
///
/// A `deprecation: true` header prefers the `warning` header's text over a
/// generic message; a bare `sunset` date asks for migration before it.
pub fn deprecation_notice(
	deprecation: Option<String>,
	warning: Option<String>,
	sunset: Option<String>,
) -> Option<String> {
	if deprecation
		.as_deref()
		.is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
	{
		return Some(warning.unwrap_or_else(|| {
			"this endpoint is deprecated and may be removed in a future release".to_string()
		}));
	}
	sunset.map(|date| format!("this endpoint is being retired; migrate before {date}"))
}

/// HTTP client with a fixed base URL and retry budget. Cheap to clone.
#[derive(Clone, Debug)]
pub struct ApiClient {
	base_url: String,
	max_attempts: u32,
}

impl ApiClient {
	/// Client for a service base URL with the default retry budget.
	pub fn new(base_url: &str) -> Self {
		Self {
			base_url: base_url.trim_end_matches('/').to_string(),
			max_attempts: DEFAULT_MAX_ATTEMPTS,
		}
	}

	/// Override the retry budget.
	pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
		self.max_attempts = max_attempts;
		self
	}

	/// GET `path` (relative to the base URL) and decode the JSON body.
	///
	/// Never panics and never throws: every way the request can end maps to
	/// one [`FetchOutcome`] variant. Backoff sleeps are non-blocking waits
	/// on a `setTimeout` promise, so the event loop keeps running.
	pub async fn fetch_json<T: DeserializeOwned>(
		&self,
		path: &str,
		cancel: Option<&CancelToken>,
	) -> FetchOutcome<T> {
		let url = format!("{}{}", self.base_url, path);

		for attempt in 0..=self.max_attempts {
			// The request descriptor is rebuilt per attempt; nothing from a
			// failed attempt is reused.
			let response = match send(&url, cancel).await {
				Ok(response) => response,
				Err(cause) => {
					if cancel.is_some_and(CancelToken::is_cancelled) {
						return FetchOutcome::Cancelled;
					}
					if attempt < self.max_attempts {
						let delay = backoff_delay_ms(attempt, None, js_sys::Math::random());
						warn!("fetch {url} failed ({cause}); retrying in {delay}ms");
						sleep_ms(delay).await;
						continue;
					}
					return FetchOutcome::NetworkFailure { cause };
				}
			};

			let status = response.status();
			let headers = response.headers();
			let rate_limit = rate_limit_from(&headers, status);

			if status == 429 {
				if attempt < self.max_attempts {
					let delay =
						backoff_delay_ms(attempt, rate_limit.retry_after_secs, js_sys::Math::random());
					warn!("rate limited on {url}; retrying in {delay}ms");
					sleep_ms(delay).await;
					continue;
				}
				return FetchOutcome::HttpFailure { status, rate_limit };
			}

			if !response.ok() {
				// The server said no; retrying would not change its mind.
				return FetchOutcome::HttpFailure { status, rate_limit };
			}

			let deprecation = deprecation_notice(
				header(&headers, "deprecation"),
				header(&headers, "warning"),
				header(&headers, "sunset"),
			);
			if let Some(notice) = &deprecation {
				warn!("api notice for {url}: {notice}");
			}

			let body = match read_text(&response).await {
				Ok(body) => body,
				Err(cause) => return FetchOutcome::NetworkFailure { cause },
			};
			return match serde_json::from_str::<T>(&body) {
				Ok(data) => FetchOutcome::Success {
					data,
					rate_limit,
					deprecation,
				},
				Err(e) => FetchOutcome::DecodeFailure {
					cause: e.to_string(),
				},
			};
		}

		FetchOutcome::NetworkFailure {
			cause: "retry budget exhausted".to_string(),
		}
	}
}

async fn send(url: &str, cancel: Option<&CancelToken>) -> Result<Response, String> {
	let opts = RequestInit::new();
	opts.set_method("GET");
	opts.set_mode(RequestMode::Cors);
	if let Some(token) = cancel {
		opts.set_signal(Some(&token.signal()));
	}

	let request =
		Request::new_with_str_and_init(url, &opts).map_err(|e| format!("bad request: {e:?}"))?;
	let window = web_sys::window().ok_or_else(|| "no window".to_string())?;
	let value = JsFuture::from(window.fetch_with_request(&request))
		.await
		.map_err(|e| format!("fetch rejected: {e:?}"))?;
	value.dyn_into().map_err(|_| "not a Response".to_string())
}

async fn read_text(response: &Response) -> Result<String, String> {
	let promise = response.text().map_err(|e| format!("body error: {e:?}"))?;
	let value = JsFuture::from(promise)
		.await
		.map_err(|e| format!("body read failed: {e:?}"))?;
	value.as_string().ok_or_else(|| "body is not text".to_string())
}

fn header(headers: &Headers, name: &str) -> Option<String> {
	headers.get(name).ok().flatten()
}

fn rate_limit_from(headers: &Headers, status: u16) -> RateLimitState {
	RateLimitState::from_parts(
		header(headers, "x-ratelimit-limit"),
		header(headers, "x-ratelimit-remaining"),
		header(headers, "x-ratelimit-reset"),
		header(headers, "retry-after"),
		status,
	)
}

/// Resolve after `ms` milliseconds without blocking the event loop.
async fn sleep_ms(ms: u64) {
	let promise = js_sys::Promise::new(&mut |resolve, _reject| {
		let window = web_sys::window().expect("no window");
		let _ = window
			.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms as i32);
	});
	let _ = JsFuture::from(promise).await;
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn retry_after_is_honored_exactly() {
		assert_eq!(backoff_delay_ms(0, Some(7), 0.99), 7_000);
		assert_eq!(backoff_delay_ms(3, Some(1), 0.0), 1_000);
	}

	#[test]
	fn exponential_delay_stays_within_jitter_bounds() {
		for attempt in 0..5 {
			let base = 1_000u64 << attempt;
			assert_eq!(backoff_delay_ms(attempt, None, 0.0), base);
			let with_full_jitter = backoff_delay_ms(attempt, None, 1.0);
			assert!(with_full_jitter >= base);
			assert!(with_full_jitter <= base + base / 4);
		}
	}

	#[test]
	fn exponential_delay_is_capped() {
		assert_eq!(backoff_delay_ms(5, None, 1.0), 30_000);
		assert_eq!(backoff_delay_ms(40, None, 0.5), 30_000);
	}

	#[test]
	fn missing_headers_parse_as_zero() {
		let state = RateLimitState::from_parts(None, None, None, None, 200);
		assert_eq!(state.limit, 0);
		assert_eq!(state.remaining, 0);
		assert_eq!(state.reset_epoch_secs, 0);
		assert_eq!(state.retry_after_secs, None);
		assert!(!state.is_limited);
	}

	#[test]
	fn limited_flag_follows_status_not_counters() {
		let exhausted = RateLimitState::from_parts(
			Some("100".into()),
			Some("0".into()),
			Some("1700000000".into()),
			None,
			200,
		);
		assert!(!exhausted.is_limited);

		let limited = RateLimitState::from_parts(None, None, None, Some("12".into()), 429);
		assert!(limited.is_limited);
		assert_eq!(limited.retry_after_secs, Some(12));
	}

	#[test]
	fn garbled_numeric_headers_read_as_zero() {
		let state =
			RateLimitState::from_parts(Some("soon".into()), Some("-3".into()), None, Some("?".into()), 200);
		assert_eq!(state.limit, 0);
		assert_eq!(state.remaining, 0);
		assert_eq!(state.retry_after_secs, None);
	}

	#[test]
	fn deprecation_prefers_warning_text() {
		let notice = deprecation_notice(
			Some("true".into()),
			Some("use /v2/person instead".into()),
			None,
		);
		assert_eq!(notice.as_deref(), Some("use /v2/person instead"));
	}

	#[test]
	fn deprecation_without_warning_is_generic() {
		let notice = deprecation_notice(Some("TRUE".into()), None, Some("2026-01-01".into()));
		assert!(notice.is_some_and(|n| n.contains("deprecated")));
	}

	#[test]
	fn sunset_alone_asks_for_migration() {
		let notice = deprecation_notice(None, None, Some("2026-06-30".into()));
		assert_eq!(
			notice.as_deref(),
			Some("this endpoint is being retired; migrate before 2026-06-30")
		);
	}

	#[test]
	fn no_headers_no_notice() {
		assert_eq!(deprecation_notice(None, Some("ignored".into()), None), None);
	}
}
