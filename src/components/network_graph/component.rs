//! Leptos component wrapping the collaboration graph canvas.
//!
//! The component creates an HTML canvas element and wires up mouse/wheel
//! event handlers for node dragging, panning, hovering, and zooming. An
//! animation loop runs via `requestAnimationFrame`, advancing the force
//! simulation and any framing transition each frame. The loop never blocks
//! on I/O: data arrives through the reactive `data` signal and re-ingests
//! the simulation when the network changes shape.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent};

use super::render;
use super::state::GraphState;
use super::theme::Theme;
use super::types::GraphData;

/// Bundles graph state with its visual theme.
struct GraphContext {
	state: GraphState,
	theme: Theme,
}

/// Renders an interactive collaboration network on a canvas element.
///
/// Pass network data via the reactive `data` signal; a change of network
/// rebuilds the simulation from scratch. The component sizes itself to its
/// parent container unless explicit `width`/`height` are given. The "fit"
/// button and double-click both frame the whole network.
#[component]
pub fn NetworkGraphCanvas(
	#[prop(into)] data: Signal<GraphData>,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let context: Rc<RefCell<Option<GraphContext>>> = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	// Unmounting must stop the animation loop; the flag makes stop
	// idempotent no matter how often cleanup runs.
	let alive = Arc::new(AtomicBool::new(true));
	let (context_init, animate_init, alive_init) = (context.clone(), animate.clone(), alive.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let data_now = data.get();
		let canvas: HtmlCanvasElement = canvas.into();

		// Later runs only mean new network data: rebuild the simulation,
		// keep the canvas and the already-scheduled animation loop.
		if let Some(ref mut c) = *context_init.borrow_mut() {
			let (w, h) = (f64::from(canvas.width()), f64::from(canvas.height()));
			c.state = GraphState::new(&data_now, w, h);
			return;
		}

		let (w, h) = (
			width.unwrap_or_else(|| {
				canvas
					.parent_element()
					.map(|p| f64::from(p.client_width()))
					.unwrap_or(800.0)
			}),
			height.unwrap_or_else(|| {
				canvas
					.parent_element()
					.map(|p| f64::from(p.client_height()))
					.unwrap_or(600.0)
			}),
		);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let ctx: CanvasRenderingContext2d = canvas
			.get_context("2d")
			.unwrap()
			.unwrap()
			.dyn_into()
			.unwrap();

		*context_init.borrow_mut() = Some(GraphContext {
			state: GraphState::new(&data_now, w, h),
			theme: Theme::default(),
		});

		let (context_anim, animate_inner, alive_anim) =
			(context_init.clone(), animate_init.clone(), alive_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if !alive_anim.load(Ordering::Relaxed) {
				return;
			}
			if let Some(ref mut c) = *context_anim.borrow_mut() {
				let dt = 0.016;
				c.state.tick(dt);
				render::render(&c.state, &ctx, &c.theme);
			}
			if let Some(ref cb) = *animate_inner.borrow() {
				let _ = web_sys::window()
					.unwrap()
					.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = web_sys::window()
				.unwrap()
				.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let alive_cleanup = alive.clone();
	on_cleanup(move || alive_cleanup.store(false, Ordering::Relaxed));

	let cursor = move |ev: &MouseEvent, canvas_ref: NodeRef<leptos::html::Canvas>| {
		let canvas: HtmlCanvasElement = canvas_ref.get().unwrap().into();
		let rect = canvas.get_bounding_client_rect();
		(
			f64::from(ev.client_x()) - rect.left(),
			f64::from(ev.client_y()) - rect.top(),
		)
	};

	let context_md = context.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let (x, y) = cursor(&ev, canvas_ref);
		if let Some(ref mut c) = *context_md.borrow_mut() {
			if let Some(idx) = c.state.node_at_position(x, y) {
				c.state.begin_drag(idx, x, y);
			} else {
				c.state.pan.active = true;
				c.state.pan.start_x = x;
				c.state.pan.start_y = y;
				c.state.pan.transform_start_x = c.state.viewport.transform.x;
				c.state.pan.transform_start_y = c.state.viewport.transform.y;
			}
		}
	};

	let context_mm = context.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let (x, y) = cursor(&ev, canvas_ref);
		if let Some(ref mut c) = *context_mm.borrow_mut() {
			if c.state.drag.active {
				c.state.drag_to(x, y);
			} else if c.state.pan.active {
				c.state.viewport.transform.x = c.state.pan.transform_start_x + (x - c.state.pan.start_x);
				c.state.viewport.transform.y = c.state.pan.transform_start_y + (y - c.state.pan.start_y);
			} else {
				c.state.hovered = c.state.node_at_position(x, y);
			}
		}
	};

	let context_mu = context.clone();
	let on_mouseup = move |_: MouseEvent| {
		if let Some(ref mut c) = *context_mu.borrow_mut() {
			c.state.end_drag();
			c.state.pan.active = false;
		}
	};

	let context_ml = context.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut c) = *context_ml.borrow_mut() {
			c.state.end_drag();
			c.state.pan.active = false;
			c.state.hovered = None;
		}
	};

	let context_wh = context.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let (x, y) = cursor(&ev, canvas_ref);
		if let Some(ref mut c) = *context_wh.borrow_mut() {
			let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
			c.state.viewport.zoom_at(x, y, factor);
		}
	};

	let context_fit = context.clone();
	let on_fit = move |_| {
		if let Some(ref mut c) = *context_fit.borrow_mut() {
			c.state.fit_all();
		}
	};

	let context_dbl = context.clone();
	let on_dblclick = move |_: MouseEvent| {
		if let Some(ref mut c) = *context_dbl.borrow_mut() {
			c.state.fit_all();
		}
	};

	view! {
		<div class="network-graph" style="position: relative;">
			<canvas
				node_ref=canvas_ref
				class="network-graph-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				on:dblclick=on_dblclick
				style="display: block; cursor: grab;"
			/>
			<button
				class="network-graph-fit"
				on:click=on_fit
				style="position: absolute; top: 8px; right: 8px;"
			>
				"Fit"
			</button>
		</div>
	}
}
