//! Wire types and endpoint builders for the query service.
//!
//! The co-items endpoint has two live response shapes: a legacy bare array
//! and a paginated envelope. [`PagedResponse`] decodes both and normalizes
//! them into a [`Page`].

use serde::Deserialize;

/// Types carrying a stable entity id, used for merge deduplication.
pub trait Keyed {
	/// The entity id. Two values with equal keys describe the same entity.
	fn key(&self) -> &str;
}

/// A person as returned by search and co-items queries.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EntitySummary {
	/// Knowledge-base entity id.
	pub id: String,
	/// Human-readable name.
	pub label: String,
	/// Short description, when the knowledge base has one.
	#[serde(default)]
	pub description: Option<String>,
	/// Portrait/thumbnail URL, when available.
	#[serde(default)]
	pub image_url: Option<String>,
}

impl Keyed for EntitySummary {
	fn key(&self) -> &str {
		&self.id
	}
}

/// One fetched page, normalized from either wire shape.
#[derive(Clone, Debug)]
pub struct Page<T> {
	/// Items in server order.
	pub items: Vec<T>,
	/// Whether the server reports (or a full page implies) another page.
	pub has_more: bool,
}

/// Pagination envelope metadata.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
	/// Total matching items, when the server counts them.
	#[serde(default)]
	pub total: Option<u64>,
	/// Page size the server applied.
	pub limit: u32,
	/// Offset of this page.
	pub offset: u64,
	/// Whether another page exists.
	pub has_more: bool,
}

/// Either response shape of a paged endpoint.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum PagedResponse<T> {
	/// `{ "results": [...], "pagination": {...} }`
	Paginated {
		/// Items in server order.
		results: Vec<T>,
		/// Envelope metadata.
		pagination: PaginationMeta,
	},
	/// Legacy bare array.
	Bare(Vec<T>),
}

impl<T> PagedResponse<T> {
	/// Normalize into a [`Page`]. For the legacy shape, a full page implies
	/// more may follow; a short page is the end.
	pub fn into_page(self, requested: u32) -> Page<T> {
		match self {
			Self::Paginated {
				results,
				pagination,
			} => Page {
				items: results,
				has_more: pagination.has_more,
			},
			Self::Bare(items) => {
				let has_more = requested > 0 && items.len() as u32 == requested;
				Page { items, has_more }
			}
		}
	}
}

/// Aggregate collaboration counts for one person. Display data only; not
/// part of the layout pipeline.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CollaborationStats {
	/// Distinct collaborators on record.
	pub total_collaborators: u64,
	/// The single most frequent collaborator, when one exists.
	#[serde(default)]
	pub most_frequent: Option<FrequentCollaborator>,
}

/// The collaborator a person shares the most credits with.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FrequentCollaborator {
	/// Knowledge-base entity id.
	pub id: String,
	/// Human-readable name.
	pub label: String,
	/// Number of shared credits.
	pub shared_credits: u64,
}

/// Search endpoint URL for a query, page number, and page size.
pub fn search_url(query: &str, page: u64, limit: u32) -> String {
	format!("/person/search?query={query}&page={page}&limit={limit}")
}

/// Co-items endpoint URL for a person id, byte offset, and page size.
pub fn co_items_url(id: &str, offset: u64, limit: u32) -> String {
	format!("/person/co-items?id={id}&limit={limit}&offset={offset}")
}

/// Collaboration network endpoint URL for a person id.
pub fn network_url(id: &str) -> String {
	format!("/network?id={id}")
}

/// Aggregate stats endpoint URL for a person id.
pub fn stats_url(id: &str) -> String {
	format!("/stats?id={id}")
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn decodes_paginated_envelope() {
		let json = r#"{
			"results": [{"id": "Q1", "label": "Ana"}, {"id": "Q2", "label": "Ben"}],
			"pagination": {"total": 40, "limit": 2, "offset": 0, "hasMore": true}
		}"#;
		let page = serde_json::from_str::<PagedResponse<EntitySummary>>(json)
			.unwrap()
			.into_page(2);
		assert_eq!(page.items.len(), 2);
		assert!(page.has_more);
	}

	#[test]
	fn decodes_legacy_bare_array() {
		let json = r#"[{"id": "Q1", "label": "Ana", "imageUrl": "https://x/a.jpg"}]"#;
		let page = serde_json::from_str::<PagedResponse<EntitySummary>>(json)
			.unwrap()
			.into_page(20);
		assert_eq!(page.items.len(), 1);
		assert_eq!(page.items[0].image_url.as_deref(), Some("https://x/a.jpg"));
		// A short page means the legacy endpoint has nothing further.
		assert!(!page.has_more);
	}

	#[test]
	fn full_legacy_page_implies_more() {
		let json = r#"[{"id": "Q1", "label": "Ana"}, {"id": "Q2", "label": "Ben"}]"#;
		let page = serde_json::from_str::<PagedResponse<EntitySummary>>(json)
			.unwrap()
			.into_page(2);
		assert!(page.has_more);
	}

	#[test]
	fn decodes_stats() {
		let json = r#"{
			"totalCollaborators": 61,
			"mostFrequent": {"id": "Q7", "label": "Cleo", "sharedCredits": 9}
		}"#;
		let stats: CollaborationStats = serde_json::from_str(json).unwrap();
		assert_eq!(stats.total_collaborators, 61);
		assert_eq!(stats.most_frequent.unwrap().shared_credits, 9);
	}

	#[test]
	fn stats_without_frequent_collaborator() {
		let stats: CollaborationStats =
			serde_json::from_str(r#"{"totalCollaborators": 0}"#).unwrap();
		assert!(stats.most_frequent.is_none());
	}
}
