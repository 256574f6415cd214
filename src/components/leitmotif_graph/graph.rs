//! Node arena built from a [`LeitmotifDocument`].
//!
//! Nodes live in an insertion-ordered map keyed by their stable string key;
//! relations are stored as index lists into that map, so there are no
//! ownership cycles between parents and children.

use std::collections::HashSet;

use indexmap::IndexMap;
use log::{debug, warn};

use super::camera::Point;
use super::config::GraphStyle;
use super::source::{LeitmotifDocument, TrackEntry};

/// Index of a node in its [`Graph`]. Stable because nodes are never removed.
pub type NodeId = usize;

/// Role of a node, which decides its size, colour and shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
	/// A leitmotif with its own node.
	Motif,
	/// A motif that shares its identity with one of the tracks.
	CoalescedMotif,
	/// A track some motif refers to.
	Track,
	/// A track flagged `isMinor` in its metadata.
	MinorTrack,
	/// A track no motif refers to.
	Isolate,
}

/// A motif or track, with its look and its state in the simulation.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
	/// Stable key from the document.
	pub key: String,
	/// Label drawn under the node.
	pub name: String,
	/// Second label line, if any.
	pub subtitle: Option<String>,
	/// What the node stands for.
	pub kind: NodeKind,
	/// World-space radius.
	pub radius: f64,
	/// CSS fill colour.
	pub color: String,
	/// Polygon side count, 0 for a circle.
	pub sides: u32,
	/// Polygon rotation in radians.
	pub angle: f64,
	/// Disabled nodes are neither simulated, drawn nor hit.
	pub enabled: bool,
	/// World-space position.
	pub position: Point,
	/// Per-frame velocity.
	pub velocity: Point,
	/// Per-frame acceleration.
	pub acceleration: Point,
	parents: Vec<NodeId>,
	children: Vec<NodeId>,
}

impl Node {
	fn new(key: &str, name: String, kind: NodeKind, radius: f64, color: &str) -> Self {
		Self {
			key: key.to_string(),
			name,
			subtitle: None,
			kind,
			radius,
			color: color.to_string(),
			sides: 0,
			angle: 0.0,
			enabled: true,
			position: scatter(key),
			velocity: Point::default(),
			acceleration: Point::default(),
			parents: Vec::new(),
			children: Vec::new(),
		}
	}

	/// Motifs linking to this node.
	pub fn parents(&self) -> &[NodeId] {
		&self.parents
	}

	/// Tracks this node links to.
	pub fn children(&self) -> &[NodeId] {
		&self.children
	}

	/// True for plain and coalesced motifs.
	pub fn is_motif(&self) -> bool {
		matches!(self.kind, NodeKind::Motif | NodeKind::CoalescedMotif)
	}

	/// Whether an edge joins this node and `other`, in either direction.
	pub fn is_linked(&self, other: NodeId) -> bool {
		self.parents.contains(&other) || self.children.contains(&other)
	}
}

/// Deterministic starting position in [-100, 100) on both axes.
fn scatter(key: &str) -> Point {
	let mut seed = key
		.bytes()
		.fold(0x811c_9dc5_u32, |hash, byte| (hash ^ u32::from(byte)).wrapping_mul(0x0100_0193));
	let mut next = || {
		seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
		f64::from(seed >> 8) / f64::from(1_u32 << 24)
	};
	let x = next() * 200.0 - 100.0;
	let y = next() * 200.0 - 100.0;
	Point::new(x, y)
}

fn track_look<'a>(metadata: Option<&TrackEntry>, style: &'a GraphStyle) -> (NodeKind, &'a String) {
	if metadata.is_some_and(TrackEntry::is_minor) {
		(NodeKind::MinorTrack, &style.palette.minor_track)
	} else {
		(NodeKind::Track, &style.palette.track)
	}
}

/// Every node received so far, in creation order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Graph {
	nodes: IndexMap<String, Node>,
	missing_metadata: Vec<String>,
}

impl Graph {
	/// Builds motif, track and isolate nodes and links every motif to its
	/// associated tracks.
	pub fn build(doc: &LeitmotifDocument, style: &GraphStyle) -> Self {
		let mut graph = Graph::default();
		graph.extend(doc, doc, style);
		graph
	}

	/// Adds the nodes and edges of `incoming` to the graph. Names, subtitles
	/// and coalescing come from `combined`, the merge of every document so
	/// far. Existing nodes and edges are never removed.
	pub fn extend(
		&mut self,
		incoming: &LeitmotifDocument,
		combined: &LeitmotifDocument,
		style: &GraphStyle,
	) {
		let mut seen: HashSet<&str> = HashSet::new();
		let palette = &style.palette;
		let metadata = &combined.track_data;

		for (motif, entry) in &incoming.leitmotifs {
			let merged = combined.leitmotifs.get(motif).unwrap_or(entry);
			let key = merged.id.as_deref().unwrap_or(motif);
			let coalesced = key != motif;
			let track = metadata.get(key);
			let name = self.display_name(key, merged.name.as_deref(), track);

			let (kind, color, sides) = if coalesced {
				(NodeKind::CoalescedMotif, &palette.coalesced_motif, style.coalesced_sides)
			} else {
				(NodeKind::Motif, &palette.motif, 0)
			};
			let motif_id = self.upsert(Node::new(key, name, kind, style.motif_radius, color));
			let node = &mut self.nodes[motif_id];
			node.sides = sides;
			node.subtitle = merged.subtitle.clone().or_else(|| {
				track
					.filter(|_| coalesced)
					.and_then(TrackEntry::subtitle)
					.map(String::from)
			});
			seen.insert(key);

			for track in &entry.associations {
				if track == key {
					debug!("motif {motif} lists its own track {track}, skipping self edge");
					continue;
				}
				if seen.insert(track) {
					self.add_track(track, metadata.get(track.as_str()), style);
				}
				if let Some(track_id) = self.id_of(track) {
					self.link(motif_id, track_id);
				}
			}
		}

		for key in incoming.track_data.keys() {
			if seen.contains(key.as_str()) {
				continue;
			}
			if self.id_of(key).is_some() {
				self.refresh(key, metadata.get(key.as_str()), style);
				continue;
			}
			let name = self.display_name(key, None, metadata.get(key.as_str()));
			let radius = style.track_radius;
			self.upsert(Node::new(key, name, NodeKind::Isolate, radius, &palette.isolate));
		}

		debug!(
			"graph now has {} nodes and {} edges",
			self.len(),
			self.edges().count()
		);
	}

	fn add_track(&mut self, key: &str, metadata: Option<&TrackEntry>, style: &GraphStyle) {
		if self.node(key).is_some_and(Node::is_motif) {
			return;
		}
		let name = self.display_name(key, None, metadata);
		let (kind, color) = track_look(metadata, style);
		let id = self.upsert(Node::new(key, name, kind, style.track_radius, color));
		let node = &mut self.nodes[id];
		node.sides = style.track_sides;
		node.subtitle = metadata.and_then(TrackEntry::subtitle).map(String::from);
	}

	/// Applies late metadata to a node that already exists. Motifs keep
	/// their own look.
	fn refresh(&mut self, key: &str, metadata: Option<&TrackEntry>, style: &GraphStyle) {
		let Some(entry) = metadata else {
			return;
		};
		if self.node(key).is_none_or(Node::is_motif) {
			return;
		}
		let name = self.display_name(key, None, Some(entry));
		let Some(node) = self.nodes.get_mut(key) else {
			return;
		};
		node.name = name;
		if node.kind != NodeKind::Isolate {
			let (kind, color) = track_look(Some(entry), style);
			node.kind = kind;
			node.color = color.clone();
			node.subtitle = entry.subtitle().map(String::from);
		}
	}

	fn display_name(
		&mut self,
		key: &str,
		explicit: Option<&str>,
		metadata: Option<&TrackEntry>,
	) -> String {
		if metadata.is_some() {
			self.missing_metadata.retain(|missing| missing != key);
		}
		if let Some(name) = explicit {
			return name.to_string();
		}
		match metadata {
			Some(entry) => entry.name().unwrap_or(key).to_string(),
			None => {
				warn!("no track metadata for {key}, labelling it by key");
				if !self.missing_metadata.iter().any(|missing| missing == key) {
					self.missing_metadata.push(key.to_string());
				}
				key.to_string()
			}
		}
	}

	/// Inserts `node`, or replaces the look of an existing node with the same
	/// key while keeping its relations and kinematics.
	fn upsert(&mut self, node: Node) -> NodeId {
		match self.nodes.get_full_mut(&node.key) {
			Some((id, _, existing)) => {
				existing.name = node.name;
				existing.subtitle = node.subtitle;
				existing.kind = node.kind;
				existing.radius = node.radius;
				existing.color = node.color;
				existing.sides = node.sides;
				id
			}
			None => self.nodes.insert_full(node.key.clone(), node).0,
		}
	}

	/// Records `child` under `parent` and the reciprocal back-reference.
	/// Returns false for self links and already existing links.
	pub fn link(&mut self, parent: NodeId, child: NodeId) -> bool {
		if parent == child || parent >= self.len() || child >= self.len() {
			return false;
		}
		if self.nodes[parent].children.contains(&child) {
			return false;
		}
		self.nodes[parent].children.push(child);
		self.nodes[child].parents.push(parent);
		true
	}

	/// Number of nodes.
	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	/// True before any node exists.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Id of the node with `key`.
	pub fn id_of(&self, key: &str) -> Option<NodeId> {
		self.nodes.get_index_of(key)
	}

	/// Node with `key`.
	pub fn node(&self, key: &str) -> Option<&Node> {
		self.nodes.get(key)
	}

	/// Node with `id`.
	pub fn get(&self, id: NodeId) -> Option<&Node> {
		self.nodes.get_index(id).map(|(_, node)| node)
	}

	/// Mutable node with `id`.
	pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
		self.nodes.get_index_mut(id).map(|(_, node)| node)
	}

	/// All nodes, in id order.
	pub fn nodes(&self) -> impl Iterator<Item = &Node> {
		self.nodes.values()
	}

	pub(super) fn nodes_mut(&mut self) -> impl Iterator<Item = &mut Node> {
		self.nodes.values_mut()
	}

	/// Every edge once, as `(child, parent)`.
	pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
		self.nodes
			.values()
			.enumerate()
			.flat_map(|(child, node)| node.parents.iter().map(move |&parent| (child, parent)))
	}

	/// Keys that were referenced without any track metadata.
	pub fn missing_metadata(&self) -> &[String] {
		&self.missing_metadata
	}

	/// Shows or hides a node. Returns false for an unknown key.
	pub fn set_enabled(&mut self, key: &str, enabled: bool) -> bool {
		match self.nodes.get_mut(key) {
			Some(node) => {
				node.enabled = enabled;
				true
			}
			None => false,
		}
	}
}
