//! Search panel: query input and incrementally loaded results.

use leptos::prelude::*;

use crate::api::ApiContext;
use crate::api::pagination::{CursorMode, MIN_QUERY_LEN, PagedQuery, use_paged_query};
use crate::api::types::{EntitySummary, search_url};

const SEARCH_PAGE_SIZE: u32 = 10;

/// Search input plus an aggregated result list. Selecting a result raises
/// `on_select` with the chosen person.
#[component]
pub fn SearchPanel(#[prop(into)] on_select: Callback<EntitySummary>) -> impl IntoView {
	let api = ApiContext::expect();
	let (query, set_query) = signal(String::new());
	let PagedQuery {
		items,
		is_loading,
		is_error,
		has_more,
		fetch_next,
	} = use_paged_query::<EntitySummary>(
		api,
		query.into(),
		search_url,
		CursorMode::PageIndex,
		SEARCH_PAGE_SIZE,
	);

	// A retry-aware loading line while attempts (and their backoff sleeps)
	// are in flight, and distinct empty vs. error states afterwards.
	let status = move || -> Option<&'static str> {
		if query.get().trim().len() < MIN_QUERY_LEN {
			return Some("Type at least two characters to search.");
		}
		if is_loading.get() && items.with(Vec::is_empty) {
			return Some("Searching…");
		}
		if is_error.get() {
			return Some("Search failed; check the connection and try again.");
		}
		if items.with(Vec::is_empty) {
			return Some("No people match this search.");
		}
		None
	};

	view! {
		<div class="search-panel">
			<input
				type="search"
				placeholder="Search for a person…"
				prop:value=query
				on:input=move |ev| set_query.set(event_target_value(&ev))
			/>
			{move || status().map(|text| view! { <p class="search-status">{text}</p> })}
			<ul class="search-results">
				{move || {
					items
						.get()
						.into_iter()
						.map(|person| {
							let chosen = person.clone();
							view! {
								<li>
									<button class="search-result" on:click=move |_| on_select.run(chosen.clone())>
										<span class="search-result-label">{person.label.clone()}</span>
										{person
											.description
											.clone()
											.map(|d| view! { <span class="search-result-desc">{d}</span> })}
									</button>
								</li>
							}
						})
						.collect_view()
				}}
			</ul>
			{move || {
				(has_more.get() && !items.with(Vec::is_empty))
					.then(|| {
						view! {
							<button class="search-more" on:click=move |_| fetch_next.run(())>
								{move || if is_loading.get() { "Loading…" } else { "More results" }}
							</button>
						}
					})
			}}
		</div>
	}
}
