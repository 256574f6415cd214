use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{error, info};
use wasm_bindgen::prelude::*;
use web_sys::{
	CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, TouchEvent, TouchList, WheelEvent,
	Window,
};

use super::camera::Point;
use super::config::GraphConfig;
use super::interaction::TouchPoint;
use super::loader::fetch_document;
use super::render;
use super::state::GraphState;

type SharedState = Rc<RefCell<Option<GraphState>>>;

fn client_point(canvas: &HtmlCanvasElement, client_x: i32, client_y: i32) -> Point {
	let rect = canvas.get_bounding_client_rect();
	Point::new(
		f64::from(client_x) - rect.left(),
		f64::from(client_y) - rect.top(),
	)
}

fn touch_points(canvas: &HtmlCanvasElement, list: &TouchList) -> Vec<TouchPoint> {
	(0..list.length())
		.filter_map(|i| list.get(i))
		.map(|touch| TouchPoint {
			id: touch.identifier(),
			position: client_point(canvas, touch.client_x(), touch.client_y()),
		})
		.collect()
}

fn window_size(window: &Window) -> Option<(f64, f64)> {
	let width = window.inner_width().ok()?.as_f64()?;
	let height = window.inner_height().ok()?.as_f64()?;
	Some((width, height))
}

/// Cursor shown over the canvas for the current gesture.
fn cursor_style(state: &GraphState) -> &'static str {
	if state.drag.is_dragging() { "move" } else { "auto" }
}

fn set_cursor(canvas: &HtmlCanvasElement, state: &GraphState) {
	let cursor = cursor_style(state);
	let _ = web_sys::HtmlElement::style(canvas).set_property("cursor", cursor);
}

/// Runs `f` against the state and the canvas, if both exist yet.
fn with_state(
	state: &SharedState,
	canvas_ref: NodeRef<leptos::html::Canvas>,
	f: impl FnOnce(&mut GraphState, &HtmlCanvasElement),
) {
	let Some(canvas) = canvas_ref.get().map(HtmlCanvasElement::from) else {
		return;
	};
	if let Some(ref mut s) = *state.borrow_mut() {
		f(s, &canvas);
		set_cursor(&canvas, s);
	}
}

fn load(state: SharedState, endpoints: Vec<String>, load_error: RwSignal<Option<String>>) {
	wasm_bindgen_futures::spawn_local(async move {
		for endpoint in endpoints {
			let outcome = match fetch_document(&endpoint).await {
				Ok(document) => match *state.borrow_mut() {
					Some(ref mut s) => s.ingest(document).map_err(|err| err.to_string()),
					None => Ok(()),
				},
				Err(err) => Err(err.to_string()),
			};

			match outcome {
				Ok(()) => info!("loaded {endpoint}"),
				Err(message) => {
					let message = format!("{endpoint}: {message}");
					error!("graph data unavailable: {message}");
					if let Some(ref mut s) = *state.borrow_mut() {
						s.fail(message.clone());
					}
					load_error.set(Some(message));
				}
			}
		}
	});
}

/// Canvas showing the leitmotif graph, with its own frame loop and input
/// handling.
#[component]
pub fn LeitmotifGraph(
	#[prop(optional)] config: GraphConfig,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: SharedState = Rc::new(RefCell::new(None));
	let load_error = RwSignal::new(None::<String>);
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (state_init, animate_init, resize_cb_init) =
		(state.clone(), animate.clone(), resize_cb.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get().map(HtmlCanvasElement::from) else {
			return;
		};
		let Some(window) = web_sys::window() else {
			error!("no window, graph not started");
			return;
		};

		let (w, h) = if fullscreen {
			window_size(&window).unwrap_or((800.0, 600.0))
		} else {
			(
				width.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_width() as f64)
						.unwrap_or(800.0)
				}),
				height.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_height() as f64)
						.unwrap_or(600.0)
				}),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			error!("canvas has no 2d context");
			return;
		};
		*state_init.borrow_mut() = Some(GraphState::new(&config, w, h));
		load(state_init.clone(), config.endpoints.clone(), load_error);

		if fullscreen {
			let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some((nw, nh)) = web_sys::window().as_ref().and_then(window_size) else {
					return;
				};
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(ref mut s) = *state_resize.borrow_mut() {
					s.resize(nw, nh);
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (state_anim, animate_inner) = (state_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				s.tick();
				render::render(s, &ctx);
			}
			if let (Some(cb), Some(window)) = (&*animate_inner.borrow(), web_sys::window()) {
				let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		with_state(&state_md, canvas_ref, |s, canvas| {
			s.pointer_down(client_point(canvas, ev.client_x(), ev.client_y()));
		});
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		with_state(&state_mm, canvas_ref, |s, canvas| {
			s.pointer_move(client_point(canvas, ev.client_x(), ev.client_y()));
		});
	};

	let state_mu = state.clone();
	let on_mouseup = move |_: MouseEvent| {
		with_state(&state_mu, canvas_ref, |s, _| s.pointer_up());
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		with_state(&state_ml, canvas_ref, |s, _| s.pointer_up());
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		with_state(&state_wh, canvas_ref, |s, canvas| {
			s.wheel(client_point(canvas, ev.client_x(), ev.client_y()), ev.delta_y());
		});
	};

	let state_ts = state.clone();
	let on_touchstart = move |ev: TouchEvent| {
		ev.prevent_default();
		with_state(&state_ts, canvas_ref, |s, canvas| {
			s.touch_start(&touch_points(canvas, &ev.touches()));
		});
	};

	let state_tm = state.clone();
	let on_touchmove = move |ev: TouchEvent| {
		ev.prevent_default();
		with_state(&state_tm, canvas_ref, |s, canvas| {
			let changed: Vec<i32> = touch_points(canvas, &ev.changed_touches())
				.iter()
				.map(|touch| touch.id)
				.collect();
			s.touch_move(&touch_points(canvas, &ev.touches()), &changed);
		});
	};

	let state_te = state.clone();
	let on_touchend = move |ev: TouchEvent| {
		with_state(&state_te, canvas_ref, |s, canvas| {
			s.touch_end(&touch_points(canvas, &ev.touches()));
		});
	};

	let state_tc = state;
	let on_touchcancel = move |ev: TouchEvent| {
		with_state(&state_tc, canvas_ref, |s, canvas| {
			s.touch_end(&touch_points(canvas, &ev.touches()));
		});
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="leitmotif-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			on:touchstart=on_touchstart
			on:touchmove=on_touchmove
			on:touchend=on_touchend
			on:touchcancel=on_touchcancel
			style="display: block; touch-action: none;"
		/>
		{move || {
			load_error
				.get()
				.map(|message| view! { <div class="graph-error" role="alert">{message}</div> })
		}}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn cursor_shows_move_while_dragging() {
		let mut state = GraphState::new(&GraphConfig::default(), 400.0, 300.0);
		state
			.ingest(json!({ "leitmotifs": { "m": { "name": "m" } } }))
			.unwrap();
		assert_eq!(cursor_style(&state), "auto");

		state.pointer_down(Point::new(5.0, 5.0));
		assert_eq!(cursor_style(&state), "move");
		state.pointer_up();
		assert_eq!(cursor_style(&state), "auto");
	}
}
