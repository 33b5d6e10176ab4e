//! Dispatch context: the merged parameter mapping a handler receives.
//!
//! Placeholder bindings, query items, convertor output, and caller-supplied
//! parameters all land in one string-keyed map (caller wins ties, last
//! write wins). Reserved dispatch data (the origin URL, the completion
//! callback, the navigation override, and the transition intent) lives in
//! typed fields instead of magic keys, so it can never collide with a
//! parameter name.

use crate::handler::{Completion, NavigationOverride};
use crate::segment::decode_param_value;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// How the matched screen should be placed on the navigation stack.
///
/// The core only transports this token; the host's navigator interprets it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionIntent {
	/// Push onto the current navigation stack.
	#[default]
	Push,
	/// Present modally.
	Present,
}

/// The resolved parameter mapping handed to a [`RouteHandler`].
///
/// [`RouteHandler`]: crate::RouteHandler
pub struct DispatchContext {
	values: HashMap<String, Value>,
	origin_url: String,
	completion: Option<Completion>,
	navigation: Option<Arc<dyn NavigationOverride>>,
	intent: TransitionIntent,
	animated: bool,
}

impl std::fmt::Debug for DispatchContext {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("DispatchContext")
			.field("values", &self.values)
			.field("origin_url", &self.origin_url)
			.field("intent", &self.intent)
			.field("animated", &self.animated)
			.field("has_completion", &self.completion.is_some())
			.field("has_navigation", &self.navigation.is_some())
			.finish()
	}
}

impl DispatchContext {
	pub(crate) fn new(origin_url: impl Into<String>) -> Self {
		Self {
			values: HashMap::new(),
			origin_url: origin_url.into(),
			completion: None,
			navigation: None,
			intent: TransitionIntent::default(),
			animated: true,
		}
	}

	/// Inserts extracted (string) parameters, decoding each value exactly
	/// once: `+` becomes a space and percent-escapes are resolved.
	pub(crate) fn absorb_extracted(&mut self, extracted: HashMap<String, String>) {
		for (name, value) in extracted {
			self.values
				.insert(name, Value::String(decode_param_value(&value)));
		}
	}

	/// Overlays typed values; existing keys are overwritten. Values from
	/// convertors and callers are taken as-is, never decoded.
	pub(crate) fn overlay(&mut self, layer: HashMap<String, Value>) {
		for (name, value) in layer {
			self.values.insert(name, value);
		}
	}

	pub(crate) fn set_completion(&mut self, completion: Option<Completion>) {
		self.completion = completion;
	}

	pub(crate) fn set_navigation(&mut self, navigation: Option<Arc<dyn NavigationOverride>>) {
		self.navigation = navigation;
	}

	pub(crate) fn set_transition(&mut self, intent: TransitionIntent, animated: bool) {
		self.intent = intent;
		self.animated = animated;
	}

	/// Returns a parameter value by name.
	pub fn get(&self, name: &str) -> Option<&Value> {
		self.values.get(name)
	}

	/// Returns a parameter as `&str` if it is a string value.
	///
	/// # Examples
	///
	/// ```
	/// use deeproute::Router;
	/// use std::sync::{Arc, Mutex};
	///
	/// let mut router = Router::new();
	/// let seen = Arc::new(Mutex::new(String::new()));
	/// let sink = Arc::clone(&seen);
	/// router
	/// 	.register("tap://beauty/:id", move |ctx: &deeproute::DispatchContext| {
	/// 		*sink.lock().unwrap() = ctx.str("id").unwrap_or_default().to_string();
	/// 	})
	/// 	.unwrap();
	///
	/// router.open("tap://beauty/42").unwrap();
	/// assert_eq!(*seen.lock().unwrap(), "42");
	/// ```
	pub fn str(&self, name: &str) -> Option<&str> {
		self.values.get(name).and_then(Value::as_str)
	}

	/// The full parameter mapping.
	pub fn values(&self) -> &HashMap<String, Value> {
		&self.values
	}

	/// The URL string this dispatch originated from.
	pub fn origin_url(&self) -> &str {
		&self.origin_url
	}

	/// The completion callback supplied by the dispatching caller, if any.
	pub fn completion(&self) -> Option<&Completion> {
		self.completion.as_ref()
	}

	/// The caller's navigation override, if any.
	pub fn navigation(&self) -> Option<&Arc<dyn NavigationOverride>> {
		self.navigation.as_ref()
	}

	/// The requested transition intent.
	pub fn intent(&self) -> TransitionIntent {
		self.intent
	}

	/// Whether the transition should animate.
	pub fn is_animated(&self) -> bool {
		self.animated
	}

	/// Number of parameters in the mapping.
	pub fn len(&self) -> usize {
		self.values.len()
	}

	/// Whether the mapping carries no parameters.
	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_extracted_values_decoded_once() {
		let mut ctx = DispatchContext::new("tap://a");
		ctx.absorb_extracted(HashMap::from([
			("plus".to_string(), "a+b".to_string()),
			("escaped".to_string(), "a%20b".to_string()),
		]));

		assert_eq!(ctx.str("plus"), Some("a b"));
		assert_eq!(ctx.str("escaped"), Some("a b"));
	}

	#[test]
	fn test_overlay_wins_and_preserves_typed_values() {
		let mut ctx = DispatchContext::new("tap://a");
		ctx.absorb_extracted(HashMap::from([("id".to_string(), "4".to_string())]));
		ctx.overlay(HashMap::from([
			("id".to_string(), json!("9")),
			("flag".to_string(), json!(true)),
			("encoded".to_string(), json!("stay%20put")),
		]));

		assert_eq!(ctx.str("id"), Some("9"));
		assert_eq!(ctx.get("flag"), Some(&json!(true)));
		// Caller/convertor values are never decoded.
		assert_eq!(ctx.str("encoded"), Some("stay%20put"));
	}

	#[test]
	fn test_transition_intent_default_is_push() {
		let ctx = DispatchContext::new("tap://a");
		assert_eq!(ctx.intent(), TransitionIntent::Push);
		assert!(ctx.is_animated());
	}
}
