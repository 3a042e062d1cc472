//! costar-graph: interactive co-star network browser.
//!
//! This crate is the browser-resident core of a collaboration explorer:
//! a resilient HTTP client for the remote query service, an incremental
//! pagination aggregator, and a force-directed graph component with
//! adaptive level-of-detail, all rendered client-side via WASM.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info};

pub mod api;
pub mod components;

use api::ApiContext;
use api::types::EntitySummary;
use components::explorer::Explorer;
use components::search::SearchPanel;

pub use components::network_graph::{
	GraphData, GraphLink, GraphNode, NetworkGraphCanvas, NodeKind,
};

/// Base URL of the query service, relative to the page origin.
const API_BASE_URL: &str = "/api";

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("costar-graph: logging initialized");
}

/// Main application component.
///
/// Builds the API context once at boot and provides it to every consumer;
/// no process-wide singletons.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();
	provide_context(ApiContext::new(API_BASE_URL));

	let selected = RwSignal::new(None::<EntitySummary>);

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Co-star Network" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="app-shell">
			<RateLimitBanner />
			<DeprecationNotice />
			<aside class="sidebar">
				<h1>"Co-star Network"</h1>
				<p class="subtitle">
					"Search a person, then drag, zoom, and pan their collaboration graph."
				</p>
				<SearchPanel on_select=move |person: EntitySummary| selected.set(Some(person)) />
			</aside>
			<main class="content">
				<Explorer selected=selected />
			</main>
		</div>
	}
}

/// Dismissible banner shown while the service reports rate limiting. A
/// fresh limited response brings a dismissed banner back.
#[component]
fn RateLimitBanner() -> impl IntoView {
	let api = ApiContext::expect();
	let rate_limit = api.rate_limit;
	let dismissed = RwSignal::new(false);

	Effect::new(move |_| {
		if rate_limit.get().is_limited {
			dismissed.set(false);
		}
	});

	view! {
		<Show when=move || rate_limit.get().is_limited && !dismissed.get()>
			<div class="banner banner-rate-limit">
				<span>
					{move || {
						match rate_limit.get().retry_after_secs {
							Some(secs) => {
								format!(
									"The data service is rate limiting requests; retrying in about {secs}s.",
								)
							}
							None => {
								"The data service is rate limiting requests; results may arrive slowly."
									.to_string()
							}
						}
					}}
				</span>
				<button on:click=move |_| dismissed.set(true)>"Dismiss"</button>
			</div>
		</Show>
	}
}

/// Low-key notice line surfaced when any endpoint advertises deprecation.
/// Advisory only; data keeps flowing.
#[component]
fn DeprecationNotice() -> impl IntoView {
	let api = ApiContext::expect();
	let deprecation = api.deprecation;

	view! {
		<Show when=move || deprecation.get().is_some()>
			<p class="banner banner-deprecation">
				{move || deprecation.get().unwrap_or_default()}
			</p>
		</Show>
	}
}
