//! String-URL deeplink dispatch.
//!
//! This crate routes URL strings to registered handlers:
//!
//! - **Pattern tree**: URL-shaped patterns with literal segments, `:name`
//!   placeholders (optionally decorated, e.g. `:id.html`), and a `~`
//!   wildcard, resolved with an explicit literal > placeholder > wildcard
//!   priority
//! - **Parameter merging**: placeholder bindings, query items, convertor
//!   output, and caller-supplied values flow into one context, decoded
//!   exactly once
//! - **Hook pipeline**: id-keyed interceptors with will/can/did phases
//!   around every dispatch
//! - **Escape valves**: a redirect fallback for unmatched URLs and an
//!   external opener for recognized schemes outside the host allow-list
//!
//! # Quick Start
//!
//! ```rust
//! use deeproute::{DispatchContext, DispatchOutcome, Router};
//! use serde_json::Value;
//! use std::collections::HashMap;
//! use std::sync::{Arc, Mutex};
//!
//! let mut router = Router::new();
//!
//! let visited = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&visited);
//! router
//! 	.register("tap://profile/:user_id", move |ctx: &DispatchContext| {
//! 		sink.lock().unwrap().push(ctx.str("user_id").unwrap().to_string());
//! 	})
//! 	.unwrap();
//!
//! router.set_redirect(|url: &str, _info: &HashMap<String, Value>| {
//! 	eprintln!("unrouted: {url}");
//! });
//!
//! assert_eq!(
//! 	router.open("tap://profile/42").unwrap(),
//! 	DispatchOutcome::Dispatched(None),
//! );
//! assert_eq!(router.open("web://nowhere").unwrap(), DispatchOutcome::Redirected);
//! assert_eq!(visited.lock().unwrap().as_slice(), ["42".to_string()]);
//! ```

pub mod convertor;
pub mod error;
pub mod handler;
pub mod hooks;
pub mod params;
pub mod router;
pub mod segment;
pub mod tree;

// Re-export main types for convenience
pub use convertor::{ConvertedRoute, UrlConvertor};
pub use error::RouteError;
pub use handler::{
	Completion, ExternalOpener, NavigationOverride, ObjectRouteHandler, RedirectFallback,
	RouteHandler, RouteTarget,
};
pub use hooks::RouteHooker;
pub use params::{DispatchContext, TransitionIntent};
pub use router::{DispatchOutcome, OpenRequest, Router};
pub use segment::{WILDCARD_SEGMENT, split_segments};
pub use tree::MatchOutcome;

/// Result type for routing operations.
pub type RouteResult<T> = Result<T, RouteError>;
