//! Tunables for the layout, the look of the graph, and input handling.

/// Path (relative to the page origin) of the leitmotif document.
pub const DEFAULT_ENDPOINT: &str = "/rhythm-doctor-leitmotifs.json";

/// Everything the graph component needs besides the canvas itself.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphConfig {
	/// Fetched in order; each document is merged into the previous ones.
	pub endpoints: Vec<String>,
	/// Force constants for the layout.
	pub simulation: SimulationConfig,
	/// Look of nodes, edges and labels.
	pub style: GraphStyle,
	/// Limits for zooming, panning and hit-testing.
	pub interaction: InteractionConfig,
}

impl Default for GraphConfig {
	fn default() -> Self {
		Self {
			endpoints: vec![DEFAULT_ENDPOINT.to_string()],
			simulation: SimulationConfig::default(),
			style: GraphStyle::default(),
			interaction: InteractionConfig::default(),
		}
	}
}

impl GraphConfig {
	/// Settings for the grouped (`motifGroups`) document layout.
	pub fn grouped(endpoint: impl Into<String>) -> Self {
		Self {
			endpoints: vec![endpoint.into()],
			simulation: SimulationConfig::grouped(),
			style: GraphStyle::grouped(),
			interaction: InteractionConfig::default(),
		}
	}
}

/// Force constants. All values are per frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimulationConfig {
	pub spring_constant: f64,
	/// Rest length of an edge, in world units.
	pub ideal_length: f64,
	/// Lower bound for `dist^1.5` in the repulsion term.
	pub repulse_distance_min: f64,
	pub permittivity: f64,
	pub friction: f64,
	pub gravity: f64,
	/// Both spring and repulsion magnitudes are capped to this.
	pub max_force: f64,
}

impl Default for SimulationConfig {
	fn default() -> Self {
		Self {
			spring_constant: 0.0025,
			ideal_length: 125.0,
			repulse_distance_min: 127.0,
			permittivity: 250.0,
			friction: 0.15,
			gravity: 0.0005,
			max_force: 1000.0,
		}
	}
}

impl SimulationConfig {
	pub fn grouped() -> Self {
		Self {
			ideal_length: 100.0,
			repulse_distance_min: 256.0,
			friction: 0.1,
			gravity: 0.0001,
			..Self::default()
		}
	}
}

/// Node colours. Any CSS colour string works.
#[derive(Clone, Debug, PartialEq)]
pub struct Palette {
	pub motif: String,
	pub coalesced_motif: String,
	pub track: String,
	pub minor_track: String,
	pub isolate: String,
	pub edge: String,
	pub background: String,
	pub label: String,
	pub subtitle: String,
	pub label_outline: String,
}

impl Default for Palette {
	fn default() -> Self {
		Self {
			motif: "#54527aff".into(),
			coalesced_motif: "#54527aff".into(),
			track: "#b592db".into(),
			minor_track: "#b592db".into(),
			isolate: "#9797b3".into(),
			edge: "#aaaacc".into(),
			background: "#1f1f1f".into(),
			label: "#ffffff".into(),
			subtitle: "#7f7f7f".into(),
			label_outline: "#000000".into(),
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct GraphStyle {
	pub palette: Palette,
	pub motif_radius: f64,
	pub track_radius: f64,
	/// Polygon sides for associated tracks, 0 draws a circle.
	pub track_sides: u32,
	pub coalesced_sides: u32,
	pub font_family: String,
	pub font_size: f64,
	pub labels: LabelLayout,
}

/// How node labels are laid out.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LabelLayout {
	/// Outlined name plus a grey subtitle, at `font_size`.
	#[default]
	Captioned,
	/// Name only, shrunk to fit long names, no outline.
	Fitted,
}

impl Default for GraphStyle {
	fn default() -> Self {
		Self {
			palette: Palette::default(),
			motif_radius: 20.0,
			track_radius: 15.0,
			track_sides: 3,
			coalesced_sides: 5,
			font_family: "rhythmdoctor, sans-serif".into(),
			font_size: 16.0,
			labels: LabelLayout::Captioned,
		}
	}
}

impl GraphStyle {
	pub fn grouped() -> Self {
		Self {
			track_sides: 0,
			coalesced_sides: 0,
			font_family: "determinationsans, sans-serif".into(),
			labels: LabelLayout::Fitted,
			..Self::default()
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InteractionConfig {
	pub min_zoom: f64,
	pub max_zoom: f64,
	/// Pan offset limits, applied symmetrically around the origin.
	pub pan_limit_x: f64,
	pub pan_limit_y: f64,
	/// Hit radius multipliers applied to a node's on-screen radius.
	pub mouse_hit_multiplier: f64,
	pub touch_hit_multiplier: f64,
	/// `zoom *= 2^(delta_y / wheel_divisor)`
	pub wheel_divisor: f64,
}

impl Default for InteractionConfig {
	fn default() -> Self {
		Self {
			min_zoom: 0.1,
			max_zoom: 10.0,
			pan_limit_x: 10000.0,
			pan_limit_y: 5000.0,
			mouse_hit_multiplier: 1.5,
			touch_hit_multiplier: 5.0,
			wheel_divisor: 1000.0,
		}
	}
}

impl InteractionConfig {
	pub fn zoom_range(&self) -> (f64, f64) {
		(self.min_zoom, self.max_zoom)
	}
}
