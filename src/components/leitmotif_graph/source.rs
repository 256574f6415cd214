//! The graph definition document and how successive fetches are combined.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Motifs with their associated tracks, plus metadata for every track.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeitmotifDocument {
	#[serde(default)]
	pub leitmotifs: IndexMap<String, MotifEntry>,
	#[serde(default)]
	pub track_data: IndexMap<String, TrackEntry>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct MotifEntry {
	/// Track key this motif coalesces into, if any.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub id: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub subtitle: Option<String>,
	#[serde(default)]
	pub associations: Vec<String>,
}

/// Track metadata is either a bare display name or a detail object.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum TrackEntry {
	Name(String),
	Detail(TrackDetail),
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackDetail {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub subtitle: Option<String>,
	#[serde(default, skip_serializing_if = "std::ops::Not::not")]
	pub is_minor: bool,
}

impl TrackEntry {
	pub fn name(&self) -> Option<&str> {
		match self {
			TrackEntry::Name(name) => Some(name),
			TrackEntry::Detail(detail) => detail.name.as_deref(),
		}
	}

	pub fn subtitle(&self) -> Option<&str> {
		match self {
			TrackEntry::Name(_) => None,
			TrackEntry::Detail(detail) => detail.subtitle.as_deref(),
		}
	}

	pub fn is_minor(&self) -> bool {
		matches!(self, TrackEntry::Detail(detail) if detail.is_minor)
	}
}

/// Older layout: plain motif -> tracks lists, a name table, and an explicit
/// list of unreferenced tracks.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroupedDocument {
	#[serde(default)]
	motif_groups: IndexMap<String, Vec<String>>,
	#[serde(default)]
	track_mappings: IndexMap<String, String>,
	#[serde(default)]
	isolated_tracks: Vec<String>,
}

impl From<GroupedDocument> for LeitmotifDocument {
	fn from(grouped: GroupedDocument) -> Self {
		let mut doc = LeitmotifDocument::default();
		let mapping = |key: &str, doc: &mut LeitmotifDocument| {
			if let Some(name) = grouped.track_mappings.get(key) {
				doc.track_data
					.entry(key.to_string())
					.or_insert_with(|| TrackEntry::Name(name.clone()));
			}
		};

		for (motif, tracks) in &grouped.motif_groups {
			mapping(motif, &mut doc);
			for track in tracks {
				mapping(track, &mut doc);
			}
			doc.leitmotifs.insert(
				motif.clone(),
				MotifEntry {
					associations: tracks.clone(),
					..MotifEntry::default()
				},
			);
		}

		// Only the listed isolates may become isolate nodes.
		for track in &grouped.isolated_tracks {
			let entry = match grouped.track_mappings.get(track) {
				Some(name) => TrackEntry::Name(name.clone()),
				None => TrackEntry::Detail(TrackDetail::default()),
			};
			doc.track_data.entry(track.clone()).or_insert(entry);
		}
		doc
	}
}

const GROUPED_KEYS: [&str; 3] = ["motifGroups", "trackMappings", "isolatedTracks"];

fn is_grouped(value: &Value) -> bool {
	GROUPED_KEYS.iter().any(|key| value.get(key).is_some())
}

impl LeitmotifDocument {
	/// Parses either document layout.
	pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
		if is_grouped(&value) {
			serde_json::from_value::<GroupedDocument>(value).map(Into::into)
		} else {
			serde_json::from_value(value)
		}
	}
}

/// Deep-merges `incoming` into `base`. Objects merge key by key; anything else
/// (scalars, arrays, mismatched kinds) is overwritten.
pub fn merge_json(base: &mut Value, incoming: Value) {
	match (base, incoming) {
		(Value::Object(base), Value::Object(incoming)) => {
			for (key, value) in incoming {
				match base.get_mut(&key) {
					Some(existing) if existing.is_object() && value.is_object() => {
						merge_json(existing, value)
					}
					_ => {
						base.insert(key, value);
					}
				}
			}
		}
		(base, incoming) => *base = incoming,
	}
}

/// Accumulates fetched documents.
///
/// Grouped documents are normalised to the leitmotif layout before merging,
/// so documents of either layout can follow one another.
#[derive(Debug, Default)]
pub struct DocumentStore {
	merged: Option<Value>,
	combined: LeitmotifDocument,
}

impl DocumentStore {
	/// Merges a freshly fetched document into everything received so far and
	/// returns the fetched document on its own. A document that breaks
	/// parsing is not kept.
	pub fn ingest(&mut self, incoming: Value) -> Result<LeitmotifDocument, serde_json::Error> {
		let grouped = is_grouped(&incoming);
		let parsed = LeitmotifDocument::from_value(incoming.clone())?;
		let incoming = if grouped {
			serde_json::to_value(&parsed)?
		} else {
			incoming
		};

		let merged = match &self.merged {
			Some(base) => {
				let mut base = base.clone();
				merge_json(&mut base, incoming);
				base
			}
			None => incoming,
		};
		self.combined = LeitmotifDocument::from_value(merged.clone())?;
		self.merged = Some(merged);
		Ok(parsed)
	}

	/// Every document received so far, merged.
	pub fn combined(&self) -> &LeitmotifDocument {
		&self.combined
	}
}
