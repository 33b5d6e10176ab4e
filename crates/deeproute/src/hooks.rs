//! The dispatch hook pipeline.
//!
//! Hookers are module-level interceptors around dispatch: they are told a
//! dispatch is about to happen, asked collectively whether it may proceed,
//! and told when it finished. Each hooker carries a unique id so the same
//! interceptor cannot be registered twice, and an `enabled` switch that
//! gates participation without deregistering.

use crate::error::RouteError;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// A dispatch interceptor.
///
/// Every method except [`hook_id`](Self::hook_id) has a no-op (or
/// always-allow) default, so an interceptor only implements the phases it
/// cares about.
pub trait RouteHooker: Send + Sync {
	/// Unique id of this hooker; duplicate registration is rejected.
	fn hook_id(&self) -> &str;

	/// Whether this hooker participates. Defaults to `true`.
	fn enabled(&self) -> bool {
		true
	}

	/// Called before the gate, once the URL has matched.
	fn will_dispatch(&self, _url: &str, _params: &HashMap<String, Value>) {}

	/// Votes on whether dispatch may proceed. Defaults to allowing.
	fn can_dispatch(&self, _url: &str, _params: &HashMap<String, Value>) -> bool {
		true
	}

	/// Called after the handler returned.
	fn did_dispatch(&self, _url: &str, _params: &HashMap<String, Value>) {}
}

/// The ordered set of registered hookers.
#[derive(Default)]
pub(crate) struct HookerSet {
	hookers: Vec<Arc<dyn RouteHooker>>,
}

impl HookerSet {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a hooker, rejecting duplicate ids.
	pub fn register(&mut self, hooker: Arc<dyn RouteHooker>) -> Result<(), RouteError> {
		if self
			.hookers
			.iter()
			.any(|existing| existing.hook_id() == hooker.hook_id())
		{
			return Err(RouteError::DuplicateHooker(hooker.hook_id().to_string()));
		}
		self.hookers.push(hooker);
		Ok(())
	}

	fn enabled(&self) -> impl Iterator<Item = &Arc<dyn RouteHooker>> {
		self.hookers.iter().filter(|hooker| hooker.enabled())
	}

	pub fn will_dispatch(&self, url: &str, params: &HashMap<String, Value>) {
		for hooker in self.enabled() {
			hooker.will_dispatch(url, params);
		}
	}

	/// Left-to-right conjunction over all enabled hookers.
	///
	/// Every hooker is consulted even after a refusal, so their side effects
	/// still run, but a single `false` decides the result.
	pub fn can_dispatch(&self, url: &str, params: &HashMap<String, Value>) -> bool {
		self.enabled().fold(true, |allowed, hooker| {
			let vote = hooker.can_dispatch(url, params);
			allowed && vote
		})
	}

	pub fn did_dispatch(&self, url: &str, params: &HashMap<String, Value>) {
		for hooker in self.enabled() {
			hooker.did_dispatch(url, params);
		}
	}
}
