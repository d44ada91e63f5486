//! Session counters and the per-node avatar image cache.

use std::collections::HashMap;

use web_sys::HtmlImageElement;

use super::store::CategoryCounts;

/// Handle to an asynchronously decoding avatar image.
///
/// Loading starts when the handle is created and is neither cancelled nor
/// retried. Readiness is a non-blocking flag the renderer polls each frame.
#[derive(Clone, Debug)]
pub struct ImageHandle {
	element: HtmlImageElement,
}

impl ImageHandle {
	fn load(url: &str) -> Option<Self> {
		let element = HtmlImageElement::new().ok()?;
		element.set_src(url);
		Some(ImageHandle { element })
	}

	/// Whether the image has finished decoding with real pixel data.
	pub fn is_ready(&self) -> bool {
		self.element.complete() && self.element.natural_width() > 0
	}

	/// The underlying decoded element, for drawing.
	pub fn element(&self) -> &HtmlImageElement {
		&self.element
	}
}

/// Course/image counters plus the lazily populated avatar cache.
///
/// Constructed once per session from the store's category counts and
/// threaded explicitly into every operation that needs it. The cache grows
/// for the lifetime of the session; the graph itself is append-only and
/// bounded by user interaction.
#[derive(Debug)]
pub struct NodeIdentityState {
	num_courses: u32,
	num_images: u32,
	images: HashMap<String, Option<ImageHandle>>,
}

impl NodeIdentityState {
	/// Seeds the counters from the initial dataset's category counts.
	pub fn new(counts: CategoryCounts) -> Self {
		NodeIdentityState {
			num_courses: counts.max_course_id,
			num_images: counts.module_count,
			images: HashMap::new(),
		}
	}

	/// Next course number. Strictly monotonic within the session; a value is
	/// never issued twice.
	pub fn increment_courses(&mut self) -> u32 {
		self.num_courses += 1;
		self.num_courses
	}

	/// Next image number, used to pick a default avatar. Same monotonic
	/// contract as the course counter.
	pub fn increment_images(&mut self) -> u32 {
		self.num_images += 1;
		self.num_images
	}

	/// Image handle for a node, starting the load on first request.
	///
	/// The cache key is the node id, not the URL: repeated calls for the
	/// same node return the original handle and never restart the load.
	/// `None` means the host could not create an image element; the node is
	/// simply not drawn with an avatar.
	pub fn image(&mut self, node_id: &str, image_url: &str) -> Option<&ImageHandle> {
		self.images
			.entry(node_id.to_string())
			.or_insert_with(|| ImageHandle::load(image_url))
			.as_ref()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn course_counter_is_monotonic_from_its_seed() {
		let mut identity = NodeIdentityState::new(CategoryCounts {
			max_course_id: 7,
			module_count: 1,
		});
		let issued: Vec<u32> = (0..4).map(|_| identity.increment_courses()).collect();
		assert_eq!(issued, vec![8, 9, 10, 11]);
	}

	#[test]
	fn image_counter_seeds_from_module_count() {
		let mut identity = NodeIdentityState::new(CategoryCounts {
			max_course_id: 0,
			module_count: 19,
		});
		assert_eq!(identity.increment_images(), 20);
		assert_eq!(identity.increment_images(), 21);
	}

	#[test]
	fn counters_advance_independently() {
		let mut identity = NodeIdentityState::new(CategoryCounts::default());
		assert_eq!(identity.increment_courses(), 1);
		assert_eq!(identity.increment_images(), 1);
		assert_eq!(identity.increment_courses(), 2);
		assert_eq!(identity.increment_images(), 2);
	}
}
