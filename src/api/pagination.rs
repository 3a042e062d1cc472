//! Incremental pagination and aggregation over the resilient client.
//!
//! [`use_paged_query`] drives successive page fetches for a reactive query
//! key and merges the results into a deduplicated, growing collection. At
//! most one request is in flight per instance, cursors advance strictly
//! monotonically, and changing the key resets the collection before the
//! first fetch for the new key is issued.

use std::collections::HashSet;

use leptos::prelude::*;
use leptos::task::spawn_local;
use log::debug;
use serde::de::DeserializeOwned;

use super::ApiContext;
use super::client::{CancelToken, FetchOutcome};
use super::types::{Keyed, PagedResponse};

/// Minimum trimmed key length before any fetch is issued.
pub const MIN_QUERY_LEN: usize = 2;

/// Cursor progression strategy. Fixed for the life of an aggregator
/// instance; the two modes are never mixed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CursorMode {
	/// 1-based page counter, advanced by one per page.
	PageIndex,
	/// 0-based item offset, advanced by the page size.
	ByteOffset,
}

impl CursorMode {
	/// Cursor value for the first page.
	pub fn initial(self) -> u64 {
		match self {
			Self::PageIndex => 1,
			Self::ByteOffset => 0,
		}
	}

	/// Cursor value for the page after `current`.
	pub fn advance(self, current: u64, page_size: u32) -> u64 {
		match self {
			Self::PageIndex => current + 1,
			Self::ByteOffset => current + u64::from(page_size),
		}
	}
}

/// Reactive handle onto an aggregated, incrementally fetched collection.
///
/// An error on a later page leaves items from earlier pages intact; the
/// caller sees `is_error` alongside whatever already loaded.
pub struct PagedQuery<T: Send + Sync + 'static> {
	/// The aggregated collection, deduplicated by entity id.
	pub items: Signal<Vec<T>>,
	/// Whether a fetch (including its backoff sleeps) is in flight.
	pub is_loading: Signal<bool>,
	/// Whether the most recent fetch for the current key failed.
	pub is_error: Signal<bool>,
	/// Whether another page is available.
	pub has_more: Signal<bool>,
	/// Request the next page. No-op while loading or exhausted.
	pub fetch_next: Callback<()>,
}

/// Union `fresh` into `held`: entries whose id reappears are dropped from
/// the head and the fresh page appends at the tail, so each id occurs
/// exactly once and a re-observed entity reflects its newest snapshot.
pub fn merge_items<T: Keyed>(held: &mut Vec<T>, fresh: Vec<T>) {
	let incoming: HashSet<&str> = fresh.iter().map(Keyed::key).collect();
	held.retain(|item| !incoming.contains(item.key()));
	held.extend(fresh);
}

/// Aggregate pages of `T` for a reactive query key.
///
/// `build_url` receives the trimmed key, the current cursor, and the page
/// size. The cursor starts at `mode.initial()` and advances only after a
/// successful page.
pub fn use_paged_query<T>(
	api: ApiContext,
	key: Signal<String>,
	build_url: fn(&str, u64, u32) -> String,
	mode: CursorMode,
	page_size: u32,
) -> PagedQuery<T>
where
	T: Clone + DeserializeOwned + Keyed + Send + Sync + 'static,
{
	let items = RwSignal::new(Vec::<T>::new());
	let is_loading = RwSignal::new(false);
	let is_error = RwSignal::new(false);
	let has_more = RwSignal::new(true);
	let cursor = RwSignal::new(mode.initial());
	// Bumped on every key change; a response carrying a stale epoch is for
	// a key the user has already left behind and is discarded unseen.
	let epoch = RwSignal::new(0u64);
	let in_flight: StoredValue<Option<CancelToken>, LocalStorage> = StoredValue::new_local(None);

	let run_fetch = move || {
		if is_loading.get_untracked() || !has_more.get_untracked() {
			return;
		}
		let raw_key = key.get_untracked();
		let trimmed = raw_key.trim();
		if trimmed.len() < MIN_QUERY_LEN {
			return;
		}
		let my_epoch = epoch.get_untracked();
		let current = cursor.get_untracked();
		let url = build_url(trimmed, current, page_size);
		is_loading.set(true);
		is_error.set(false);
		let api = api.clone();
		spawn_local(async move {
			let token = CancelToken::new();
			in_flight.set_value(Some(token.clone()));
			let outcome = api
				.client
				.fetch_json::<PagedResponse<T>>(&url, Some(&token))
				.await;
			if epoch.try_get_untracked() != Some(my_epoch) {
				return;
			}
			api.observe(&outcome);
			match outcome {
				FetchOutcome::Success { data, .. } => {
					let page = data.into_page(page_size);
					debug!(
						"page at cursor {current}: {} items, has_more={}",
						page.items.len(),
						page.has_more
					);
					items.update(|held| merge_items(held, page.items));
					has_more.set(page.has_more);
					cursor.set(mode.advance(current, page_size));
					is_loading.set(false);
				}
				FetchOutcome::Cancelled => {
					// The view that wanted this page is gone.
				}
				_ => {
					is_error.set(true);
					is_loading.set(false);
				}
			}
		});
	};

	let fetch_on_key = run_fetch.clone();
	Effect::new(move |_| {
		let raw_key = key.get();
		// Reset synchronously, before the first fetch for the new key, so
		// stale results for another subject are never visible.
		epoch.update(|e| *e += 1);
		in_flight.update_value(|token| {
			if let Some(token) = token.take() {
				token.cancel();
			}
		});
		items.set(Vec::new());
		cursor.set(mode.initial());
		has_more.set(true);
		is_error.set(false);
		is_loading.set(false);
		if raw_key.trim().len() >= MIN_QUERY_LEN {
			fetch_on_key();
		}
	});

	on_cleanup(move || {
		in_flight.update_value(|token| {
			if let Some(token) = token.take() {
				token.cancel();
			}
		});
	});

	PagedQuery {
		items: items.into(),
		is_loading: is_loading.into(),
		is_error: is_error.into(),
		has_more: has_more.into(),
		fetch_next: Callback::new(move |_| run_fetch()),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[derive(Clone, Debug, PartialEq)]
	struct Item(&'static str);

	impl Keyed for Item {
		fn key(&self) -> &str {
			self.0
		}
	}

	fn ids(items: &[Item]) -> Vec<&str> {
		items.iter().map(|i| i.0).collect()
	}

	#[test]
	fn merge_appends_new_items() {
		let mut held = vec![Item("a")];
		merge_items(&mut held, vec![Item("b"), Item("c")]);
		assert_eq!(ids(&held), ["a", "b", "c"]);
	}

	#[test]
	fn merge_moves_reobserved_ids_to_tail() {
		// Overlapping pages: [a, b] then [b, c] aggregates to [a, b, c].
		let mut held = vec![Item("a"), Item("b")];
		merge_items(&mut held, vec![Item("b"), Item("c")]);
		assert_eq!(ids(&held), ["a", "b", "c"]);
	}

	#[test]
	fn merge_never_duplicates_ids() {
		let mut held = vec![Item("a"), Item("b"), Item("c")];
		merge_items(&mut held, vec![Item("c"), Item("a")]);
		assert_eq!(ids(&held), ["b", "c", "a"]);
		let unique: HashSet<&str> = held.iter().map(Keyed::key).collect();
		assert_eq!(unique.len(), held.len());
	}

	#[test]
	fn page_cursor_counts_pages() {
		let mode = CursorMode::PageIndex;
		assert_eq!(mode.initial(), 1);
		assert_eq!(mode.advance(1, 20), 2);
		assert_eq!(mode.advance(7, 20), 8);
	}

	#[test]
	fn offset_cursor_steps_by_page_size() {
		let mode = CursorMode::ByteOffset;
		assert_eq!(mode.initial(), 0);
		assert_eq!(mode.advance(0, 25), 25);
		assert_eq!(mode.advance(50, 25), 75);
	}
}
