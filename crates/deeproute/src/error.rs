//! Error types for route registration and dispatch.

use thiserror::Error;

/// Errors that can occur during route registration and URL dispatch.
#[derive(Debug, Error)]
pub enum RouteError {
	/// The URL could not be parsed at all.
	///
	/// Distinct from "no matching route": a malformed URL never reaches the
	/// pattern tree and never triggers the redirect fallback.
	#[error("malformed URL `{url}`: {reason}")]
	MalformedUrl {
		/// The offending URL string.
		url: String,
		/// Parser diagnostic.
		reason: String,
	},

	/// A route hooker with the same id is already registered.
	#[error("route hooker `{0}` is already registered")]
	DuplicateHooker(String),

	/// A URL convertor was registered with an empty key URL.
	#[error("URL convertor key must not be empty")]
	InvalidConvertorKey,

	/// The match succeeded but produced neither parameters nor a handler.
	///
	/// Dispatch stays a no-op in this case; the error makes the condition
	/// observable instead of silently dropping the URL.
	#[error("dispatch of `{0}` produced no parameters and no handler")]
	EmptyMatch(String),
}
