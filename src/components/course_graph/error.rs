//! Error taxonomy for graph construction and dataset fetching.

use thiserror::Error;

/// Data-integrity errors raised by store mutation and interaction input.
///
/// All variants are rejected synchronously, before any partial mutation is
/// visible to the rendering host.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
	/// A node with this id is already present in the store.
	#[error("duplicate node id: {0}")]
	DuplicateId(String),

	/// A link references a node id that is not present in the store.
	#[error("link {label:?} references missing node id {missing:?}")]
	DanglingReference {
		/// Label of the offending link.
		label: String,
		/// The endpoint id that failed to resolve.
		missing: String,
	},

	/// An operation named a node the store does not contain.
	#[error("unknown node id: {0}")]
	UnknownNode(String),

	/// Malformed interaction input.
	#[error("invalid input: {0}")]
	InvalidInput(String),
}

/// Initial dataset request failures, handed unchanged to every waiter of a
/// shared in-flight fetch.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
	/// The request never produced a response.
	#[error("dataset request failed: {0}")]
	Request(String),

	/// The server answered with a non-2xx status.
	#[error("dataset request returned HTTP {0}")]
	Status(u16),

	/// The response body was not the expected JSON dataset.
	#[error("dataset could not be decoded: {0}")]
	Decode(String),
}
