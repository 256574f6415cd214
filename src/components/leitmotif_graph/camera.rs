//! World/screen coordinate mapping.
//!
//! The camera stores the world point shown at the centre of the canvas and a
//! zoom factor. A zoom above 1 shows more of the world (zoomed out).

use std::ops::{Add, Mul, Sub};

/// A 2D point or vector, used for both world and screen coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	/// Horizontal coordinate, growing to the right.
	pub x: f64,
	/// Vertical coordinate, growing downwards.
	pub y: f64,
}

impl Point {
	/// Creates a point from its coordinates.
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	/// Euclidean length of the point as a vector.
	pub fn length(self) -> f64 {
		(self.x * self.x + self.y * self.y).sqrt()
	}

	/// Euclidean distance to `other`.
	pub fn distance(self, other: Point) -> f64 {
		(self - other).length()
	}

	/// Point halfway between `self` and `other`.
	pub fn midpoint(self, other: Point) -> Point {
		(self + other) * 0.5
	}
}

impl Add for Point {
	type Output = Point;

	fn add(self, rhs: Point) -> Point {
		Point::new(self.x + rhs.x, self.y + rhs.y)
	}
}

impl Sub for Point {
	type Output = Point;

	fn sub(self, rhs: Point) -> Point {
		Point::new(self.x - rhs.x, self.y - rhs.y)
	}
}

impl Mul<f64> for Point {
	type Output = Point;

	fn mul(self, rhs: f64) -> Point {
		Point::new(self.x * rhs, self.y * rhs)
	}
}

/// Canvas size in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Viewport {
	pub width: f64,
	pub height: f64,
}

impl Viewport {
	pub const fn new(width: f64, height: f64) -> Self {
		Self { width, height }
	}

	fn half(self) -> Point {
		Point::new(self.width / 2.0, self.height / 2.0)
	}
}

/// Pan offset and zoom factor shared by drawing and hit-testing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
	pub pan: Point,
	pub zoom: f64,
}

impl Default for Camera {
	fn default() -> Self {
		Self {
			pan: Point::default(),
			zoom: 1.0,
		}
	}
}

impl Camera {
	pub fn to_screen(&self, world: Point, viewport: Viewport) -> Point {
		(world - self.pan) * (1.0 / self.zoom) + viewport.half()
	}

	pub fn to_world(&self, screen: Point, viewport: Viewport) -> Point {
		(screen - viewport.half()) * self.zoom + self.pan
	}

	/// Scales the zoom by `factor` (clamped to `range`) while keeping the
	/// world point under `anchor` fixed on screen.
	pub fn zoom_about(
		&mut self,
		anchor: Point,
		factor: f64,
		range: (f64, f64),
		viewport: Viewport,
	) {
		if !factor.is_finite() || factor <= 0.0 {
			return;
		}
		let before = self.to_world(anchor, viewport);
		self.zoom = (self.zoom * factor).clamp(range.0, range.1);
		let after = self.to_world(anchor, viewport);
		self.pan = self.pan + before - after;
	}
}
