use log::{info, warn};
use serde_json::Value;

use super::camera::{Camera, Point, Viewport};
use super::config::{GraphConfig, GraphStyle, InteractionConfig};
use super::graph::Graph;
use super::interaction::DragState;
use super::simulation::Simulator;
use super::source::DocumentStore;

/// Where the graph definition is in its lifecycle.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum LoadStatus {
	/// Nothing has arrived yet.
	#[default]
	Loading,
	/// At least one document has been applied.
	Ready,
	/// The fetch or parse failed; the graph keeps whatever it had before.
	Failed(String),
}

/// Everything one canvas needs between frames.
pub struct GraphState {
	/// Nodes and edges received so far.
	pub graph: Graph,
	/// Pan and zoom applied when drawing.
	pub camera: Camera,
	/// Canvas size in pixels.
	pub viewport: Viewport,
	/// The gesture in progress.
	pub drag: DragState,
	/// Last known pointer position in screen space.
	pub cursor: Option<Point>,
	/// Outcome of the latest fetch.
	pub status: LoadStatus,
	/// When false, `tick` leaves the layout alone.
	pub animation_running: bool,
	simulator: Simulator,
	style: GraphStyle,
	interaction: InteractionConfig,
	documents: DocumentStore,
}

impl GraphState {
	/// An empty graph for a canvas of the given size.
	pub fn new(config: &GraphConfig, width: f64, height: f64) -> Self {
		Self {
			graph: Graph::default(),
			camera: Camera::default(),
			viewport: Viewport::new(width, height),
			drag: DragState::default(),
			cursor: None,
			status: LoadStatus::default(),
			animation_running: true,
			simulator: Simulator::new(config.simulation),
			style: config.style.clone(),
			interaction: config.interaction,
			documents: DocumentStore::default(),
		}
	}

	/// Merges a fetched document into what has been received so far and adds
	/// its nodes and edges to the graph. Nothing already on screen is removed
	/// and node ids stay valid, so a held node stays held.
	pub fn ingest(&mut self, document: Value) -> Result<(), serde_json::Error> {
		let incoming = match self.documents.ingest(document) {
			Ok(incoming) => incoming,
			Err(err) => {
				self.status = LoadStatus::Failed(err.to_string());
				return Err(err);
			}
		};
		self.graph.extend(&incoming, self.documents.combined(), &self.style);

		let missing = self.graph.missing_metadata();
		if !missing.is_empty() {
			warn!("{} tracks have no metadata: {}", missing.len(), missing.join(", "));
		}
		info!(
			"graph ready: {} nodes, {} edges",
			self.graph.len(),
			self.graph.edges().count()
		);
		self.status = LoadStatus::Ready;
		Ok(())
	}

	/// Records a failed fetch; the graph is kept.
	pub fn fail(&mut self, message: impl Into<String>) {
		self.status = LoadStatus::Failed(message.into());
	}

	/// Runs one simulation frame. A node held by a drag is left where the
	/// pointer put it.
	pub fn tick(&mut self) {
		if self.animation_running {
			self.simulator.step(&mut self.graph, self.drag.pinned());
		}
	}

	/// Follows a canvas resize.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.viewport = Viewport::new(width, height);
	}

	/// World to canvas pixels.
	pub fn to_screen(&self, world: Point) -> Point {
		self.camera.to_screen(world, self.viewport)
	}

	/// Canvas pixels to world.
	pub fn to_world(&self, screen: Point) -> Point {
		self.camera.to_world(screen, self.viewport)
	}

	/// Screen position of every node, indexed by node id.
	pub fn screen_positions(&self) -> Vec<Point> {
		self.graph
			.nodes()
			.map(|node| self.to_screen(node.position))
			.collect()
	}

	/// Colours, sizes and fonts used for drawing.
	pub fn style(&self) -> &GraphStyle {
		&self.style
	}

	/// Zoom, pan and hit-test limits.
	pub fn interaction_config(&self) -> &InteractionConfig {
		&self.interaction
	}
}
