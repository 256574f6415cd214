use std::f64::consts::TAU;

use web_sys::CanvasRenderingContext2d;

use super::camera::Point;
use super::config::LabelLayout;
use super::graph::NodeId;
use super::state::GraphState;

/// Node bodies fade to half opacity away from the cursor.
pub fn body_alpha(distance: f64) -> f64 {
	(500.0 / distance).clamp(0.5, 1.0)
}

/// Labels stay opaque a little longer, then fade faster than bodies.
pub fn text_alpha(distance: f64) -> f64 {
	(50.0 / distance + 0.5)
		.max(150.0 / distance - 1.5)
		.clamp(0.5, 1.0)
}

/// Corners of a regular polygon, starting at `angle`.
pub fn polygon_vertices(center: Point, radius: f64, sides: u32, angle: f64) -> Vec<Point> {
	(0..sides)
		.map(|i| {
			let theta = TAU * f64::from(i) / f64::from(sides) + angle;
			Point::new(center.x + theta.cos() * radius, center.y + theta.sin() * radius)
		})
		.collect()
}

/// Font size that squeezes long names, for [`LabelLayout::Fitted`].
pub fn fitted_font_size(name: &str, zoom: f64) -> f64 {
	300.0 / zoom / name.chars().count().max(10) as f64
}

/// Screen distance from the cursor to every node. Without a cursor every
/// node counts as hovered.
pub fn cursor_distances(state: &GraphState, screen: &[Point]) -> Vec<f64> {
	match state.cursor {
		Some(cursor) => screen.iter().map(|p| p.distance(cursor)).collect(),
		None => vec![0.0; screen.len()],
	}
}

pub fn render(state: &GraphState, ctx: &CanvasRenderingContext2d) {
	let palette = &state.style().palette;
	ctx.set_global_alpha(1.0);
	ctx.set_fill_style_str(&palette.background);
	ctx.fill_rect(0.0, 0.0, state.viewport.width, state.viewport.height);

	if state.graph.is_empty() {
		return;
	}

	let screen = state.screen_positions();
	let distances = cursor_distances(state, &screen);
	draw_edges(state, ctx, &screen, &distances);
	draw_bodies(state, ctx, &screen, &distances);
	draw_labels(state, ctx, &screen, &distances);
	ctx.set_global_alpha(1.0);
}

fn draw_edges(
	state: &GraphState,
	ctx: &CanvasRenderingContext2d,
	screen: &[Point],
	distances: &[f64],
) {
	let pinned = state.drag.pinned();
	ctx.set_stroke_style_str(&state.style().palette.edge);
	ctx.set_line_width(1.0);

	let enabled = |id: NodeId| state.graph.get(id).is_some_and(|node| node.enabled);
	for (child, parent) in state.graph.edges() {
		if !enabled(child) || !enabled(parent) {
			continue;
		}
		let alpha = if pinned == Some(child) {
			1.0
		} else {
			body_alpha(distances[child])
		};
		ctx.set_global_alpha(alpha);
		ctx.begin_path();
		ctx.move_to(screen[child].x, screen[child].y);
		ctx.line_to(screen[parent].x, screen[parent].y);
		ctx.stroke();
	}
}

fn draw_bodies(
	state: &GraphState,
	ctx: &CanvasRenderingContext2d,
	screen: &[Point],
	distances: &[f64],
) {
	let zoom = state.camera.zoom;
	for (id, node) in state.graph.nodes().enumerate() {
		if !node.enabled {
			continue;
		}
		let center = screen[id];
		let radius = node.radius / zoom;

		ctx.set_global_alpha(body_alpha(distances[id]));
		ctx.begin_path();
		if node.sides == 0 {
			let _ = ctx.arc(center.x, center.y, radius, 0.0, TAU);
		} else {
			let vertices = polygon_vertices(center, radius, node.sides, node.angle);
			if let Some(first) = vertices.first() {
				ctx.move_to(first.x, first.y);
			}
			for vertex in vertices.iter().skip(1) {
				ctx.line_to(vertex.x, vertex.y);
			}
		}
		ctx.close_path();
		ctx.set_fill_style_str(&node.color);
		ctx.fill();
	}
}

fn draw_labels(
	state: &GraphState,
	ctx: &CanvasRenderingContext2d,
	screen: &[Point],
	distances: &[f64],
) {
	let style = state.style();
	let zoom = state.camera.zoom;
	ctx.set_text_align("center");
	ctx.set_font(&format!("{}px {}", style.font_size / zoom, style.font_family));
	ctx.set_stroke_style_str(&style.palette.label_outline);

	for (id, node) in state.graph.nodes().enumerate() {
		if !node.enabled {
			continue;
		}
		let Point { x, y } = screen[id];
		ctx.set_global_alpha(text_alpha(distances[id]));
		ctx.set_fill_style_str(&style.palette.label);

		if style.labels == LabelLayout::Fitted {
			let size = fitted_font_size(&node.name, zoom);
			ctx.set_font(&format!("{size}px {}", style.font_family));
			let _ = ctx.fill_text(&node.name, x, y + 3.0 * node.radius / zoom);
			continue;
		}

		let name_y = y + (2.5 + node.radius * 2.0) / zoom;
		let _ = ctx.stroke_text(&node.name, x, name_y);
		let _ = ctx.fill_text(&node.name, x, name_y);

		if let Some(subtitle) = &node.subtitle {
			let subtitle_y = y + (20.5 + node.radius * 2.0) / zoom;
			ctx.set_fill_style_str(&style.palette.subtitle);
			let _ = ctx.stroke_text(subtitle, x, subtitle_y);
			let _ = ctx.fill_text(subtitle, x, subtitle_y);
		}
	}
}
