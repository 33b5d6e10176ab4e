//! Handler and collaborator capabilities.
//!
//! The dispatch core never constructs screens or talks to a navigation
//! stack itself; everything it can cause to happen goes through the narrow
//! traits in this module.

use crate::params::DispatchContext;
use serde_json::Value;
use std::sync::Arc;

/// Completion callback carried through dispatch for the handler to invoke
/// when its work is done. The core stores and forwards it, nothing more.
pub type Completion = Arc<dyn Fn(Option<Value>) + Send + Sync>;

/// A registered route handler, invoked with the resolved parameter context.
pub trait RouteHandler: Send + Sync {
	/// Handles a dispatched URL.
	fn handle(&self, ctx: &DispatchContext);
}

impl<F> RouteHandler for F
where
	F: Fn(&DispatchContext) + Send + Sync,
{
	fn handle(&self, ctx: &DispatchContext) {
		self(ctx)
	}
}

/// A route handler that returns a value to the dispatching caller.
///
/// The core does not interpret the returned value; it is surfaced verbatim
/// in [`DispatchOutcome::Dispatched`](crate::DispatchOutcome::Dispatched).
pub trait ObjectRouteHandler: Send + Sync {
	/// Handles a dispatched URL and produces an optional result.
	fn handle(&self, ctx: &DispatchContext) -> Option<Value>;
}

impl<F> ObjectRouteHandler for F
where
	F: Fn(&DispatchContext) -> Option<Value> + Send + Sync,
{
	fn handle(&self, ctx: &DispatchContext) -> Option<Value> {
		self(ctx)
	}
}

/// The terminal slot of a registered pattern: either a plain handler or an
/// object handler.
#[derive(Clone)]
pub enum RouteTarget {
	/// Fire-and-forget handler.
	Handler(Arc<dyn RouteHandler>),
	/// Handler whose return value is surfaced to the caller.
	Object(Arc<dyn ObjectRouteHandler>),
}

impl std::fmt::Debug for RouteTarget {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Handler(_) => f.write_str("RouteTarget::Handler"),
			Self::Object(_) => f.write_str("RouteTarget::Object"),
		}
	}
}

/// Fallback channel invoked exactly once when no route matches a URL.
///
/// This is the designed not-found escape hatch, not an error path: a host
/// typically routes unmatched URLs to a web view or logs them.
pub trait RedirectFallback: Send + Sync {
	/// Receives the unmatched URL and the caller-supplied parameters.
	fn redirect(&self, url: &str, user_info: &std::collections::HashMap<String, Value>);
}

impl<F> RedirectFallback for F
where
	F: Fn(&str, &std::collections::HashMap<String, Value>) + Send + Sync,
{
	fn redirect(&self, url: &str, user_info: &std::collections::HashMap<String, Value>) {
		self(url, user_info)
	}
}

/// External opener for URLs the app declines to handle internally,
/// typically the system browser.
pub trait ExternalOpener: Send + Sync {
	/// Whether this opener can take the URL. Defaults to accepting.
	fn can_open(&self, _url: &url::Url) -> bool {
		true
	}

	/// Opens the URL outside the app.
	fn open(&self, url: &url::Url);
}

/// Per-dispatch override of the host's screen-transition behavior.
///
/// Screen transitions themselves are out of scope for the core; this trait
/// is stored and handed through to the handler untouched.
pub trait NavigationOverride: Send + Sync {
	/// Performs the custom transition for the dispatched context.
	fn navigate(&self, ctx: &DispatchContext);
}
