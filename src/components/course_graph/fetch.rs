//! Memoized, single-flight fetch of the initial dataset.

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::rc::Rc;

use futures::FutureExt;
use futures::future::{LocalBoxFuture, Shared};
use log::debug;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, Response};

use super::error::FetchError;
use super::types::GraphData;

type FlightFuture<T, E> = Shared<LocalBoxFuture<'static, Result<T, E>>>;

struct Flight<T: Clone, E: Clone> {
	id: u64,
	future: FlightFuture<T, E>,
}

/// Shares one in-flight operation, and its result, among all concurrent
/// callers. A failed flight is forgotten so a later call starts fresh
/// instead of observing a poisoned cache.
pub struct SingleFlight<T: Clone + 'static, E: Clone + 'static> {
	slot: RefCell<Option<Flight<T, E>>>,
	next_id: Cell<u64>,
}

impl<T: Clone + 'static, E: Clone + 'static> SingleFlight<T, E> {
	/// Creates an empty flight cache.
	pub fn new() -> Self {
		SingleFlight {
			slot: RefCell::new(None),
			next_id: Cell::new(0),
		}
	}

	/// Returns the cached result or joins the in-flight operation, invoking
	/// `start` only when neither exists yet.
	pub async fn get_or_run<F, Fut>(&self, start: F) -> Result<T, E>
	where
		F: FnOnce() -> Fut,
		Fut: Future<Output = Result<T, E>> + 'static,
	{
		let (id, future) = {
			let mut slot = self.slot.borrow_mut();
			let flight = slot.get_or_insert_with(|| {
				let id = self.next_id.get();
				self.next_id.set(id + 1);
				Flight {
					id,
					future: start().boxed_local().shared(),
				}
			});
			(flight.id, flight.future.clone())
		};

		let result = future.await;
		if result.is_err() {
			// Clear only our own flight; a retry may already occupy the slot.
			let mut slot = self.slot.borrow_mut();
			if slot.as_ref().is_some_and(|flight| flight.id == id) {
				*slot = None;
			}
		}
		result
	}
}

impl<T: Clone + 'static, E: Clone + 'static> Default for SingleFlight<T, E> {
	fn default() -> Self {
		Self::new()
	}
}

/// Fetches the graph dataset at most once per session, sharing the in-flight
/// request among concurrent initializers. Clones share the same cache.
#[derive(Clone)]
pub struct DatasetLoader {
	inner: Rc<LoaderInner>,
}

struct LoaderInner {
	url: String,
	flight: SingleFlight<GraphData, FetchError>,
}

impl DatasetLoader {
	/// Creates a loader for the dataset at `url`.
	pub fn new(url: impl Into<String>) -> Self {
		DatasetLoader {
			inner: Rc::new(LoaderInner {
				url: url.into(),
				flight: SingleFlight::new(),
			}),
		}
	}

	/// Resolves the dataset, issuing at most one request however many
	/// callers arrive before it completes. A failure reaches every waiter
	/// and is not cached, so a later call retries.
	pub async fn load(&self) -> Result<GraphData, FetchError> {
		let url = self.inner.url.clone();
		self.inner.flight.get_or_run(move || fetch_graph_data(url)).await
	}
}

/// One HTTP GET of the dataset JSON.
async fn fetch_graph_data(url: String) -> Result<GraphData, FetchError> {
	debug!("course-graph: fetching dataset from {url}");

	let opts = RequestInit::new();
	opts.set_method("GET");
	let request = Request::new_with_str_and_init(&url, &opts)
		.map_err(|err| FetchError::Request(describe_js_error(&err)))?;

	let window = web_sys::window().ok_or_else(|| FetchError::Request("no window".to_string()))?;
	let response = JsFuture::from(window.fetch_with_request(&request))
		.await
		.map_err(|err| FetchError::Request(describe_js_error(&err)))?;
	let response: Response = response
		.dyn_into()
		.map_err(|_| FetchError::Request("response is not a Response".to_string()))?;

	if !response.ok() {
		return Err(FetchError::Status(response.status()));
	}

	let body = JsFuture::from(
		response
			.text()
			.map_err(|err| FetchError::Decode(describe_js_error(&err)))?,
	)
	.await
	.map_err(|err| FetchError::Decode(describe_js_error(&err)))?;
	let body = body
		.as_string()
		.ok_or_else(|| FetchError::Decode("response body is not text".to_string()))?;

	serde_json::from_str(&body).map_err(|err| FetchError::Decode(err.to_string()))
}

fn describe_js_error(value: &JsValue) -> String {
	value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

#[cfg(test)]
mod tests {
	use std::cell::{Cell, RefCell};
	use std::rc::Rc;

	use futures::channel::oneshot;
	use futures::executor::{LocalPool, block_on};
	use futures::task::LocalSpawnExt;

	use super::*;

	#[test]
	fn memoizes_the_first_success() {
		let flight = SingleFlight::<u32, FetchError>::new();
		let started = Cell::new(0);

		let first = block_on(flight.get_or_run(|| {
			started.set(started.get() + 1);
			async { Ok(1) }
		}));
		let second = block_on(flight.get_or_run(|| {
			started.set(started.get() + 1);
			async { Ok(2) }
		}));

		assert_eq!(first, Ok(1));
		assert_eq!(second, Ok(1));
		assert_eq!(started.get(), 1);
	}

	#[test]
	fn concurrent_callers_share_one_flight() {
		let mut pool = LocalPool::new();
		let spawner = pool.spawner();
		let flight = Rc::new(SingleFlight::<u32, FetchError>::new());
		let started = Rc::new(Cell::new(0));
		let results = Rc::new(RefCell::new(Vec::new()));
		let (tx, rx) = oneshot::channel::<Result<u32, FetchError>>();
		let rx = Rc::new(RefCell::new(Some(rx)));

		for _ in 0..2 {
			let flight = Rc::clone(&flight);
			let started = Rc::clone(&started);
			let results = Rc::clone(&results);
			let rx = Rc::clone(&rx);
			spawner
				.spawn_local(async move {
					let result = flight
						.get_or_run(|| {
							started.set(started.get() + 1);
							let rx = rx
								.borrow_mut()
								.take()
								.expect("only the first caller starts the flight");
							async move { rx.await.expect("sender stays alive") }
						})
						.await;
					results.borrow_mut().push(result);
				})
				.expect("spawn");
		}

		pool.run_until_stalled();
		assert_eq!(started.get(), 1);
		assert!(results.borrow().is_empty());

		tx.send(Ok(7)).expect("waiters are listening");
		pool.run();
		assert_eq!(*results.borrow(), vec![Ok(7), Ok(7)]);
	}

	#[test]
	fn failure_clears_the_cache_for_retry() {
		let flight = SingleFlight::<u32, FetchError>::new();
		let started = Cell::new(0);

		let failed = block_on(flight.get_or_run(|| {
			started.set(started.get() + 1);
			async { Err(FetchError::Status(500)) }
		}));
		assert_eq!(failed, Err(FetchError::Status(500)));

		let retried = block_on(flight.get_or_run(|| {
			started.set(started.get() + 1);
			async { Ok(9) }
		}));
		assert_eq!(retried, Ok(9));
		assert_eq!(started.get(), 2);
	}
}
