//! Leptos component hosting the course graph canvas.
//!
//! Creates the canvas element, wires mouse events for hover highlighting,
//! node dragging, panning, zooming and click-to-add, and runs the animation
//! loop that advances the layout simulation and renders each frame.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{info, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::config;
use super::interact::{self, NewNodeForm};
use super::layout::LayoutEngine;
use super::render;
use super::session::{GraphSession, load_graph};
use super::types::GraphData;
use super::widget::{GraphWidget, ViewTransform};

/// Pixels of mouse travel beyond which a press counts as a drag, not a click.
const CLICK_SLOP: f64 = 3.0;
/// Upper zoom bound for the wheel.
const MAX_ZOOM: f64 = 10.0;

/// Tracks an in-progress node drag operation.
#[derive(Clone, Debug, Default)]
struct DragState {
	node_id: Option<String>,
	start_x: f64,
	start_y: f64,
	node_start_x: f64,
	node_start_y: f64,
	moved: bool,
}

/// Tracks an in-progress canvas pan operation.
#[derive(Clone, Debug, Default)]
struct PanState {
	active: bool,
	start_x: f64,
	start_y: f64,
	transform_start_x: f64,
	transform_start_y: f64,
}

/// Bundles the session, host widget and layout adapter for the event and
/// animation closures.
struct GraphContext {
	session: Rc<GraphSession>,
	widget: GraphWidget,
	layout: LayoutEngine,
	drag: DragState,
	pan: PanState,
	hovered: Option<String>,
	synced_generation: u64,
	width: f64,
	height: f64,
}

impl GraphContext {
	/// Topmost node under a screen position, hit-tested against the same
	/// level-scaled radius the renderer draws with.
	fn node_at_position(&self, sx: f64, sy: f64) -> Option<String> {
		let (gx, gy) = self.widget.transform.screen_to_graph(sx, sy);
		let k = self.widget.transform.k;
		let store = self.session.store.borrow();
		let mut found = None;
		for node in store.nodes() {
			let (dx, dy) = (node.x - gx, node.y - gy);
			let hit = render::node_radius(node.level, k) + 4.0 / k;
			if (dx * dx + dy * dy).sqrt() < hit {
				found = Some(node.id.clone());
			}
		}
		found
	}
}

/// Renders the interactive course/module diagram on a canvas element.
///
/// The component sizes itself to its parent container by default; set
/// `fullscreen = true` to fill the viewport and resize with the window.
/// Clicking a node appends a new course or module built from the bound
/// `form` signal.
#[component]
pub fn CourseGraphCanvas(
	#[prop(into)] data: Signal<GraphData>,
	#[prop(into)] form: Signal<NewNodeForm>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let context: Rc<RefCell<Option<GraphContext>>> = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (context_init, animate_init, resize_cb_init) =
		(context.clone(), animate.clone(), resize_cb.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let window: Window = web_sys::window().unwrap();

		let (w, h) = if fullscreen {
			(
				window.inner_width().unwrap().as_f64().unwrap(),
				window.inner_height().unwrap().as_f64().unwrap(),
			)
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

		let ctx: CanvasRenderingContext2d = canvas
			.get_context("2d")
			.unwrap()
			.unwrap()
			.dyn_into()
			.unwrap();

		let session = match load_graph(data.get()) {
			Ok(session) => session,
			Err(err) => {
				warn!("course-graph: dataset rejected: {err}");
				return;
			}
		};

		let mut widget = GraphWidget::new();
		config::configure(&mut widget, &session);

		let k = widget.visuals().min_zoom;
		let (cx, cy) = widget.visuals().center;
		widget.transform = ViewTransform {
			x: w / 2.0 - cx * k,
			y: h / 2.0 - cy * k,
			k,
		};
		let layout = LayoutEngine::new(widget.visuals());

		*context_init.borrow_mut() = Some(GraphContext {
			session,
			widget,
			layout,
			drag: DragState::default(),
			pan: PanState::default(),
			hovered: None,
			synced_generation: 0,
			width: w,
			height: h,
		});

		if fullscreen {
			let (context_resize, canvas_resize) = (context_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let win: Window = web_sys::window().unwrap();
				let (nw, nh) = (
					win.inner_width().unwrap().as_f64().unwrap(),
					win.inner_height().unwrap().as_f64().unwrap(),
				);
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(ref mut c) = *context_resize.borrow_mut() {
					c.width = nw;
					c.height = nh;
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (context_anim, animate_inner) = (context_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if let Some(ref mut c) = *context_anim.borrow_mut() {
				let generation = c.session.store.borrow().generation();
				if c.widget.take_data_dirty() || generation != c.synced_generation {
					c.layout.sync(&c.session.store.borrow());
					c.synced_generation = generation;
				}
				{
					let mut store = c.session.store.borrow_mut();
					c.layout.step(0.016, &mut store);
				}
				render::render(&c.widget, &ctx, c.width, c.height);
			}
			if let Some(ref cb) = *animate_inner.borrow() {
				let _ = web_sys::window()
					.unwrap()
					.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let context_md = context.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let canvas: HtmlCanvasElement = canvas_ref.get().unwrap().into();
		let rect = canvas.get_bounding_client_rect();
		let (x, y) = (
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		);

		if let Some(ref mut c) = *context_md.borrow_mut() {
			if let Some(id) = c.node_at_position(x, y) {
				let (nx, ny) = {
					let store = c.session.store.borrow();
					store.node(&id).map(|n| (n.x, n.y)).unwrap_or_default()
				};
				c.drag = DragState {
					node_id: Some(id),
					start_x: x,
					start_y: y,
					node_start_x: nx,
					node_start_y: ny,
					moved: false,
				};
			} else {
				c.pan = PanState {
					active: true,
					start_x: x,
					start_y: y,
					transform_start_x: c.widget.transform.x,
					transform_start_y: c.widget.transform.y,
				};
			}
		}
	};

	let context_mm = context.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let canvas: HtmlCanvasElement = canvas_ref.get().unwrap().into();
		let rect = canvas.get_bounding_client_rect();
		let (x, y) = (
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		);

		if let Some(ref mut c) = *context_mm.borrow_mut() {
			if let Some(id) = c.drag.node_id.clone() {
				if (x - c.drag.start_x).abs() + (y - c.drag.start_y).abs() > CLICK_SLOP {
					c.drag.moved = true;
				}
				let k = c.widget.transform.k;
				let (nx, ny) = (
					c.drag.node_start_x + (x - c.drag.start_x) / k,
					c.drag.node_start_y + (y - c.drag.start_y) / k,
				);
				c.layout.pin(&id, nx, ny);
			} else if c.pan.active {
				c.widget.transform.x = c.pan.transform_start_x + (x - c.pan.start_x);
				c.widget.transform.y = c.pan.transform_start_y + (y - c.pan.start_y);
			} else {
				let hit = c.node_at_position(x, y);
				if hit != c.hovered {
					c.hovered = hit;
					let session = Rc::clone(&c.session);
					interact::handle_hover(&mut c.widget, c.hovered.as_deref(), &session);
				}
			}
		}
	};

	let context_mu = context.clone();
	let on_mouseup = move |_: MouseEvent| {
		if let Some(ref mut c) = *context_mu.borrow_mut() {
			if let Some(id) = c.drag.node_id.take() {
				if c.drag.moved {
					c.layout.anchor(&id);
				} else {
					let session = Rc::clone(&c.session);
					match interact::handle_click(&mut c.widget, &id, &session, &form.get_untracked())
					{
						Ok(new_id) => info!("course-graph: created {new_id}"),
						Err(err) => warn!("course-graph: click rejected: {err}"),
					}
				}
			}
			c.drag = DragState::default();
			c.pan.active = false;
		}
	};

	let context_ml = context.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut c) = *context_ml.borrow_mut() {
			c.drag = DragState::default();
			c.pan.active = false;
			if c.hovered.take().is_some() {
				let session = Rc::clone(&c.session);
				interact::handle_hover(&mut c.widget, None, &session);
			}
		}
	};

	let context_wh = context.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let canvas: HtmlCanvasElement = canvas_ref.get().unwrap().into();
		let rect = canvas.get_bounding_client_rect();
		let (x, y) = (
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		);

		if let Some(ref mut c) = *context_wh.borrow_mut() {
			let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
			let new_k = (c.widget.transform.k * factor)
				.clamp(c.widget.visuals().min_zoom, MAX_ZOOM);
			let ratio = new_k / c.widget.transform.k;
			c.widget.transform.x = x - (x - c.widget.transform.x) * ratio;
			c.widget.transform.y = y - (y - c.widget.transform.y) * ratio;
			c.widget.set_zoom(new_k);
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="course-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}
