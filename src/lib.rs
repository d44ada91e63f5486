//! course-graph: Interactive force-directed visualization of a course and
//! module hierarchy.
//!
//! This crate fetches its dataset once over HTTP, then grows the diagram in
//! memory as the user interacts with it: hovering a node highlights its
//! neighborhood, and clicking a node appends a new course or module beneath
//! it.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use wasm_bindgen_futures::spawn_local;

pub mod components;

pub use components::course_graph::{
	CourseGraphCanvas, DatasetLoader, GraphData, GraphLink, GraphNode, NewNodeForm,
};

/// Dataset location relative to the host page.
const GRAPH_DATA_URL: &str = "./graphData.json";

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("course-graph: logging initialized");
}

/// Main application component.
/// Fetches the dataset, then hosts the canvas and the add-node form.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let data = RwSignal::new(None::<GraphData>);
	let load_error = RwSignal::new(None::<String>);
	let name = RwSignal::new(String::new());
	let node_type = RwSignal::new("course".to_string());
	let retry_tick = RwSignal::new(0u32);

	let loader = DatasetLoader::new(GRAPH_DATA_URL);
	Effect::new(move |_| {
		retry_tick.track();
		let loader = loader.clone();
		spawn_local(async move {
			match loader.load().await {
				Ok(graph) => {
					load_error.set(None);
					data.set(Some(graph));
				}
				Err(err) => {
					warn!("course-graph: dataset fetch failed: {err}");
					load_error.set(Some(err.to_string()));
				}
			}
		});
	});

	let form = Signal::derive(move || NewNodeForm {
		name: name.get(),
		node_type: node_type.get(),
	});

	view! {
		<Html attr:lang="en" attr:dir="ltr" />
		<Title text="Course Graph" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="fullscreen-graph">
			{move || match (data.get(), load_error.get()) {
				(Some(graph), _) => view! {
					<CourseGraphCanvas
						data=Signal::derive(move || graph.clone())
						form=form
						fullscreen=true
					/>
				}
				.into_any(),
				(None, Some(err)) => view! {
					<div class="graph-status">
						<p>{format!("Failed to load graph data: {err}")}</p>
						<button on:click=move |_| retry_tick.update(|n| *n += 1)>"Retry"</button>
					</div>
				}
				.into_any(),
				(None, None) => view! {
					<div class="graph-status">
						<p>"Loading graph data..."</p>
					</div>
				}
				.into_any(),
			}}
			<div class="graph-overlay">
				<h1>"Course Graph"</h1>
				<p class="subtitle">
					"Hover a node to highlight its neighborhood. Click a node to add a course or module beneath it."
				</p>
				<label>
					"Name"
					<input
						prop:value=move || name.get()
						on:input=move |ev| name.set(event_target_value(&ev))
					/>
				</label>
				<label>
					"Type"
					<select on:change=move |ev| node_type.set(event_target_value(&ev))>
						<option value="course" selected=true>"Course"</option>
						<option value="module">"Module"</option>
					</select>
				</label>
			</div>
		</div>
	}
}
