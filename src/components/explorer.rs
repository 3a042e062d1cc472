//! Explorer for a selected person: collaboration network, aggregate stats,
//! and the incrementally loaded co-star list.

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api::ApiContext;
use crate::api::client::{CancelToken, FetchOutcome};
use crate::api::pagination::{CursorMode, PagedQuery, use_paged_query};
use crate::api::types::{CollaborationStats, EntitySummary, co_items_url, network_url, stats_url};
use crate::components::network_graph::{GraphData, NetworkGraphCanvas};

const CO_STAR_PAGE_SIZE: u32 = 20;

/// Networks smaller than this carry no structure worth simulating.
const MIN_NETWORK_NODES: usize = 2;

/// Network, stats, and co-star list for the selected person.
#[component]
pub fn Explorer(#[prop(into)] selected: Signal<Option<EntitySummary>>) -> impl IntoView {
	let api = ApiContext::expect();
	let subject_id = Signal::derive(move || {
		selected
			.get()
			.map(|person| person.id)
			.unwrap_or_default()
	});
	let subject_label =
		Signal::derive(move || selected.get().map(|person| person.label).unwrap_or_default());

	let graph = RwSignal::new(None::<GraphData>);
	let graph_failed = RwSignal::new(false);
	let stats = RwSignal::new(None::<CollaborationStats>);
	let in_flight: StoredValue<Option<CancelToken>, LocalStorage> = StoredValue::new_local(None);

	let api_effect = api.clone();
	Effect::new(move |_| {
		let id = subject_id.get();
		// A new subject supersedes whatever the old one was loading.
		in_flight.update_value(|token| {
			if let Some(token) = token.take() {
				token.cancel();
			}
		});
		graph.set(None);
		graph_failed.set(false);
		stats.set(None);
		if id.is_empty() {
			return;
		}

		let api = api_effect.clone();
		let network_id = id.clone();
		spawn_local(async move {
			let token = CancelToken::new();
			in_flight.set_value(Some(token.clone()));
			let outcome = api
				.client
				.fetch_json::<GraphData>(&network_url(&network_id), Some(&token))
				.await;
			api.observe(&outcome);
			if subject_id.try_get_untracked() != Some(network_id) {
				return;
			}
			match outcome {
				FetchOutcome::Success { data, .. } => graph.set(Some(data)),
				FetchOutcome::Cancelled => {}
				// Malformed or missing network data degrades to the
				// insufficient-data panel below, never a crash.
				_ => graph_failed.set(true),
			}
		});

		let api = api_effect.clone();
		let stats_id = id;
		spawn_local(async move {
			let outcome = api
				.client
				.fetch_json::<CollaborationStats>(&stats_url(&stats_id), None)
				.await;
			api.observe(&outcome);
			if subject_id.try_get_untracked() != Some(stats_id) {
				return;
			}
			if let FetchOutcome::Success { data, .. } = outcome {
				stats.set(Some(data));
			}
		});
	});

	on_cleanup(move || {
		in_flight.update_value(|token| {
			if let Some(token) = token.take() {
				token.cancel();
			}
		});
	});

	let PagedQuery {
		items: co_stars,
		is_loading: co_loading,
		is_error: co_error,
		has_more: co_has_more,
		fetch_next: co_fetch_next,
	} = use_paged_query::<EntitySummary>(
		api,
		subject_id,
		co_items_url,
		CursorMode::ByteOffset,
		CO_STAR_PAGE_SIZE,
	);

	let graph_signal = Signal::derive(move || graph.get().unwrap_or_default());

	view! {
		<section class="explorer">
			{move || {
				let has_subject = !subject_id.get().is_empty();
				match (graph.get(), graph_failed.get(), has_subject) {
					(Some(data), _, _) if data.nodes.len() >= MIN_NETWORK_NODES => {
						view! { <NetworkGraphCanvas data=graph_signal /> }.into_any()
					}
					(Some(_), _, _) => {
						view! {
							<p class="explorer-empty">
								"Not enough collaboration data to draw a network for "
								{subject_label.get()} "."
							</p>
						}
							.into_any()
					}
					(None, true, _) => {
						view! {
							<p class="explorer-error">"The collaboration network could not be loaded."</p>
						}
							.into_any()
					}
					(None, false, true) => {
						view! { <p class="explorer-loading">"Loading the collaboration network…"</p> }
							.into_any()
					}
					_ => {
						view! { <p class="explorer-hint">"Select a person to explore their network."</p> }
							.into_any()
					}
				}
			}}
			{move || {
				stats
					.get()
					.map(|s| {
						view! {
							<div class="explorer-stats">
								<span>{s.total_collaborators} " collaborators on record"</span>
								{s.most_frequent
									.map(|frequent| {
										view! {
											<span>
												"Most frequent: " {frequent.label} " ("
												{frequent.shared_credits} " shared credits)"
											</span>
										}
									})}
							</div>
						}
					})
			}}
			{move || {
				(!subject_id.get().is_empty())
					.then(|| {
						view! {
							<div class="co-star-list">
								<h2>"Co-stars"</h2>
								{move || {
									co_error
										.get()
										.then(|| {
											// Items from earlier pages stay visible under the error.
											view! {
												<p class="co-star-error">
													"Loading more co-stars failed; showing what arrived."
												</p>
											}
										})
								}}
								<ul>
									{move || {
										co_stars
											.get()
											.into_iter()
											.map(|person| {
												view! {
													<li>
														<span>{person.label.clone()}</span>
														{person
															.description
															.clone()
															.map(|d| view! { <span class="co-star-desc">{d}</span> })}
													</li>
												}
											})
											.collect_view()
									}}
								</ul>
								{move || {
									co_has_more
										.get()
										.then(|| {
											view! {
												<button class="co-star-more" on:click=move |_| co_fetch_next.run(())>
													{move || {
														if co_loading.get() { "Loading…" } else { "Load more" }
													}}
												</button>
											}
										})
								}}
							</div>
						}
					})
			}}
		</section>
	}
}
