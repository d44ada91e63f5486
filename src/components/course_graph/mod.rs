//! Interactive course/module diagram component.
//!
//! Renders a hierarchy of courses and their modules as a node-link diagram
//! on an HTML canvas and grows it in place:
//! - Course nodes draw as palette-colored circles, modules as circular
//!   avatars that appear once their image has decoded
//! - Hovering a node highlights its links and neighbors
//! - Clicking a node appends a new course or module beneath it
//!
//! # Example
//!
//! ```ignore
//! use course_graph::{CourseGraphCanvas, DatasetLoader, NewNodeForm};
//!
//! let data = DatasetLoader::new("./graphData.json").load().await?;
//!
//! view! { <CourseGraphCanvas data=data.into() form=form fullscreen=true /> }
//! ```

mod component;
pub mod config;
mod error;
mod fetch;
mod identity;
mod interact;
mod layout;
mod render;
mod session;
mod store;
mod types;
mod widget;

pub use component::CourseGraphCanvas;
pub use config::configure;
pub use error::{FetchError, GraphError};
pub use fetch::DatasetLoader;
pub use identity::{ImageHandle, NodeIdentityState};
pub use interact::{NewNodeForm, handle_click, handle_hover, slugify};
pub use render::{draw_node, node_radius};
pub use session::{GraphSession, load_graph};
pub use store::{CategoryCounts, GraphStore};
pub use types::{GraphData, GraphLink, GraphNode, Link, Node, NodeKind};
pub use widget::{GraphWidget, ViewTransform, WidgetVisuals};
