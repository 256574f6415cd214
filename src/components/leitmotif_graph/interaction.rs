//! Pointer, touch and wheel handling.
//!
//! Input only mutates the camera, the drag state and the held node's
//! position; the next frame picks the changes up.

use super::camera::Point;
use super::graph::NodeId;
use super::state::GraphState;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Gesture {
	#[default]
	Idle,
	/// Dragging the background.
	Panning,
	/// Holding a node; the simulator leaves it alone.
	NodeDragging(NodeId),
	/// Two fingers down.
	Pinching,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DragState {
	pub gesture: Gesture,
	/// Pan offset (panning) or the held node's screen position (node
	/// dragging) when the gesture began.
	pub anchor: Point,
	/// Pointer position when the gesture began.
	pub offset: Point,
	/// Finger positions seen by the last pinch update.
	pub pinch: [Point; 2],
}

impl DragState {
	pub fn is_dragging(&self) -> bool {
		self.gesture != Gesture::Idle
	}

	pub fn pinned(&self) -> Option<NodeId> {
		match self.gesture {
			Gesture::NodeDragging(id) => Some(id),
			_ => None,
		}
	}
}

/// One active touch, in canvas pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TouchPoint {
	pub id: i32,
	pub position: Point,
}

impl GraphState {
	/// Topmost enabled node whose on-screen disc, grown by `multiplier`,
	/// contains `at`.
	pub fn node_at(&self, at: Point, multiplier: f64) -> Option<NodeId> {
		let zoom = self.camera.zoom;
		self.graph
			.nodes()
			.enumerate()
			.filter(|(_, node)| node.enabled)
			.filter(|(_, node)| {
				self.to_screen(node.position).distance(at) <= node.radius / zoom * multiplier
			})
			.map(|(id, _)| id)
			.last()
	}

	/// Grabs the node under the mouse, or starts panning.
	pub fn pointer_down(&mut self, at: Point) {
		self.cursor = Some(at);
		self.begin_drag(at, self.interaction_config().mouse_hit_multiplier);
	}

	/// Tracks the cursor and continues the current drag, if any.
	pub fn pointer_move(&mut self, at: Point) {
		self.cursor = Some(at);
		self.drag_to(at);
	}

	/// Releases whatever the pointer was holding.
	pub fn pointer_up(&mut self) {
		self.end_drag();
	}

	/// One finger grabs like the mouse, two or more start a pinch.
	pub fn touch_start(&mut self, touches: &[TouchPoint]) {
		match touches {
			[] => {}
			[only] => {
				let multiplier = self.interaction_config().touch_hit_multiplier;
				self.begin_drag(only.position, multiplier);
				self.drag.pinch = [only.position; 2];
			}
			[first, second, ..] => self.begin_pinch(first.position, second.position),
		}
	}

	/// `changed` holds the identifiers of the touches that moved.
	pub fn touch_move(&mut self, touches: &[TouchPoint], changed: &[i32]) {
		match touches {
			[] => {}
			[only] => {
				if changed.contains(&only.id) {
					self.pointer_move(only.position);
				}
			}
			[first, second, ..] => {
				if changed.contains(&first.id) || changed.contains(&second.id) {
					self.pinch_to(first.position, second.position);
				}
			}
		}
	}

	/// `remaining` holds the touches still on the screen.
	pub fn touch_end(&mut self, remaining: &[TouchPoint]) {
		match remaining.first() {
			Some(touch) => {
				let multiplier = self.interaction_config().touch_hit_multiplier;
				self.begin_drag(touch.position, multiplier);
				self.drag.pinch = [touch.position; 2];
			}
			None => self.end_drag(),
		}
	}

	/// Zooms about `at`; a positive `delta_y` zooms out.
	pub fn wheel(&mut self, at: Point, delta_y: f64) {
		let config = *self.interaction_config();
		let factor = 2_f64.powf(delta_y / config.wheel_divisor);
		self.camera.zoom_about(at, factor, config.zoom_range(), self.viewport);
	}

	fn begin_drag(&mut self, at: Point, multiplier: f64) {
		self.drag.offset = at;
		match self.node_at(at, multiplier) {
			Some(id) => {
				self.drag.gesture = Gesture::NodeDragging(id);
				self.drag.anchor = self
					.graph
					.get(id)
					.map(|node| self.to_screen(node.position))
					.unwrap_or(at);
			}
			None => {
				self.drag.gesture = Gesture::Panning;
				self.drag.anchor = self.camera.pan;
			}
		}
	}

	fn drag_to(&mut self, at: Point) {
		match self.drag.gesture {
			Gesture::Panning => {
				let config = *self.interaction_config();
				let pan = self.drag.anchor + (self.drag.offset - at) * self.camera.zoom;
				self.camera.pan = Point::new(
					pan.x.clamp(-config.pan_limit_x, config.pan_limit_x),
					pan.y.clamp(-config.pan_limit_y, config.pan_limit_y),
				);
			}
			Gesture::NodeDragging(id) => {
				let world = self.to_world(self.drag.anchor - self.drag.offset + at);
				if let Some(node) = self.graph.get_mut(id) {
					node.position = world;
				}
			}
			Gesture::Idle | Gesture::Pinching => {}
		}
	}

	fn begin_pinch(&mut self, first: Point, second: Point) {
		self.drag.gesture = Gesture::Pinching;
		self.drag.pinch = [first, second];
	}

	fn pinch_to(&mut self, first: Point, second: Point) {
		if self.drag.gesture != Gesture::Pinching {
			self.begin_pinch(first, second);
			return;
		}

		let last = self.drag.pinch[0].distance(self.drag.pinch[1]);
		let now = first.distance(second);
		if last > 0.0 && now > 0.0 {
			let range = self.interaction_config().zoom_range();
			self.camera
				.zoom_about(first.midpoint(second), last / now, range, self.viewport);
		}
		self.drag.pinch = [first, second];
	}

	fn end_drag(&mut self) {
		self.drag.gesture = Gesture::Idle;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::leitmotif_graph::config::GraphConfig;
	use serde_json::json;

	fn state() -> GraphState {
		let mut state = GraphState::new(&GraphConfig::default(), 800.0, 600.0);
		state
			.ingest(json!({
				"leitmotifs": { "M": { "name": "M", "associations": ["A"] } },
				"trackData": { "A": "a", "B": "b" }
			}))
			.unwrap();
		place(&mut state, "M", Point::new(0.0, 0.0));
		place(&mut state, "A", Point::new(200.0, 0.0));
		place(&mut state, "B", Point::new(-200.0, 100.0));
		state
	}

	fn place(state: &mut GraphState, key: &str, at: Point) {
		let id = state.graph.id_of(key).unwrap();
		state.graph.get_mut(id).unwrap().position = at;
	}

	fn close(a: Point, b: Point) -> bool {
		(a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
	}

	fn touch(id: i32, x: f64, y: f64) -> TouchPoint {
		TouchPoint {
			id,
			position: Point::new(x, y),
		}
	}

	#[test]
	fn hit_test_uses_scaled_radius() {
		let mut state = state();
		let m = state.graph.id_of("M").unwrap();
		// M is at the canvas centre with radius 20, so mouse reach is 30px.
		assert_eq!(state.node_at(Point::new(429.0, 300.0), 1.5), Some(m));
		assert_eq!(state.node_at(Point::new(431.0, 300.0), 1.5), None);
		assert_eq!(state.node_at(Point::new(431.0, 300.0), 5.0), Some(m));

		state.camera.zoom = 2.0;
		assert_eq!(state.node_at(Point::new(416.0, 300.0), 1.5), None);
	}

	#[test]
	fn hit_test_prefers_later_nodes_and_skips_disabled() {
		let mut state = state();
		place(&mut state, "A", Point::new(5.0, 0.0));
		let a = state.graph.id_of("A").unwrap();
		let m = state.graph.id_of("M").unwrap();
		assert_eq!(state.node_at(Point::new(402.0, 300.0), 1.5), Some(a));

		state.graph.set_enabled("A", false);
		assert_eq!(state.node_at(Point::new(402.0, 300.0), 1.5), Some(m));
	}

	#[test]
	fn dragged_node_stays_under_pointer() {
		let mut state = state();
		state.camera.zoom = 1.7;
		state.camera.pan = Point::new(33.0, -12.0);
		let a = state.graph.id_of("A").unwrap();
		let start = state.to_screen(Point::new(200.0, 0.0)) + Point::new(4.0, -3.0);

		state.pointer_down(start);
		assert_eq!(state.drag.gesture, Gesture::NodeDragging(a));

		let target = start + Point::new(-120.0, 75.0);
		state.pointer_move(target);
		let on_screen = state.to_screen(state.graph.get(a).unwrap().position);
		assert!(close(on_screen + Point::new(4.0, -3.0), target));
	}

	#[test]
	fn pinned_node_ignores_simulation() {
		let mut state = state();
		let a = state.graph.id_of("A").unwrap();
		let start = state.to_screen(Point::new(200.0, 0.0));
		state.pointer_down(start);
		state.pointer_move(start + Point::new(50.0, 50.0));
		let held = state.graph.get(a).unwrap().position;

		for _ in 0..30 {
			state.tick();
			assert_eq!(state.graph.get(a).unwrap().position, held);
		}

		state.pointer_up();
		assert_eq!(state.drag.pinned(), None);
		for _ in 0..5 {
			state.tick();
		}
		assert_ne!(state.graph.get(a).unwrap().position, held);
	}

	#[test]
	fn background_drag_pans_by_zoomed_delta() {
		let mut state = state();
		state.camera.zoom = 2.0;
		state.camera.pan = Point::new(10.0, 10.0);

		state.pointer_down(Point::new(10.0, 10.0));
		assert_eq!(state.drag.gesture, Gesture::Panning);
		state.pointer_move(Point::new(20.0, 40.0));

		assert_eq!(state.camera.pan, Point::new(-10.0, -50.0));
	}

	#[test]
	fn pan_is_clamped() {
		let mut state = state();
		state.camera.zoom = 10.0;
		state.pointer_down(Point::new(0.0, 0.0));
		state.pointer_move(Point::new(-5000.0, 5000.0));
		assert_eq!(state.camera.pan, Point::new(10000.0, -5000.0));
	}

	#[test]
	fn pointer_up_returns_to_idle() {
		let mut state = state();
		state.pointer_down(Point::new(400.0, 300.0));
		assert!(state.drag.is_dragging());
		state.pointer_up();
		assert!(!state.drag.is_dragging());

		let pan = state.camera.pan;
		state.pointer_move(Point::new(0.0, 0.0));
		assert_eq!(state.camera.pan, pan);
	}

	#[test]
	fn wheel_zoom_stays_in_range() {
		let mut state = state();
		for _ in 0..50 {
			state.wheel(Point::new(100.0, 100.0), 5000.0);
			assert!(state.camera.zoom <= 10.0);
		}
		assert_eq!(state.camera.zoom, 10.0);

		for _ in 0..50 {
			state.wheel(Point::new(700.0, 20.0), -5000.0);
			assert!(state.camera.zoom >= 0.1);
		}
		assert_eq!(state.camera.zoom, 0.1);
	}

	#[test]
	fn wheel_keeps_cursor_world_point() {
		let mut state = state();
		let at = Point::new(123.0, 456.0);
		let before = state.to_world(at);
		state.wheel(at, 1000.0);
		assert!((state.camera.zoom - 2.0).abs() < 1e-12);
		assert!(close(state.to_world(at), before));
	}

	#[test]
	fn pinch_scales_zoom_about_midpoint() {
		let mut state = state();
		state.touch_start(&[touch(1, 100.0, 100.0)]);
		state.touch_start(&[touch(1, 100.0, 100.0), touch(2, 200.0, 100.0)]);
		assert_eq!(state.drag.gesture, Gesture::Pinching);
		assert_eq!(state.drag.pinned(), None);

		let mid = Point::new(150.0, 100.0);
		let before = state.to_world(mid);
		state.touch_move(&[touch(1, 50.0, 100.0), touch(2, 250.0, 100.0)], &[1, 2]);

		assert!((state.camera.zoom - 0.5).abs() < 1e-12);
		assert!(close(state.to_world(mid), before));
	}

	#[test]
	fn pinch_ignores_unchanged_touches() {
		let mut state = state();
		state.touch_start(&[touch(1, 100.0, 100.0), touch(2, 200.0, 100.0)]);
		state.touch_move(&[touch(1, 0.0, 100.0), touch(2, 300.0, 100.0)], &[7]);
		assert_eq!(state.camera.zoom, 1.0);
	}

	#[test]
	fn lifting_one_finger_rehit_tests_the_other() {
		let mut state = state();
		let m = state.graph.id_of("M").unwrap();
		state.touch_start(&[touch(1, 10.0, 10.0), touch(2, 400.0, 300.0)]);

		state.touch_end(&[touch(2, 400.0, 300.0)]);
		assert_eq!(state.drag.gesture, Gesture::NodeDragging(m));

		state.touch_end(&[]);
		assert_eq!(state.drag.gesture, Gesture::Idle);
	}

	#[test]
	fn single_touch_moves_like_a_pointer() {
		let mut state = state();
		state.touch_start(&[touch(1, 10.0, 10.0)]);
		assert_eq!(state.drag.gesture, Gesture::Panning);
		state.touch_move(&[touch(1, 20.0, 10.0)], &[1]);
		assert_eq!(state.camera.pan, Point::new(-10.0, 0.0));
		assert_eq!(state.cursor, Some(Point::new(20.0, 10.0)));
	}

	#[test]
	fn empty_graph_only_pans() {
		let mut state = GraphState::new(&GraphConfig::default(), 800.0, 600.0);
		state.pointer_down(Point::new(400.0, 300.0));
		assert_eq!(state.drag.gesture, Gesture::Panning);
	}
}
