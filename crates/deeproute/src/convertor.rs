//! URL convertors: per-host reinterpretation of incoming URLs.
//!
//! A convertor lets a host opt out of pattern-tree lookup entirely: when a
//! URL's scheme and host match a registered key URL, the convertor maps it
//! to a synthetic route key plus seed parameters, and dispatch continues
//! with those instead.

use crate::error::RouteError;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use url::Url;

/// The result of converting a URL: a substitute lookup key and the
/// parameters that seed the dispatch context before query and caller
/// values are merged.
#[derive(Debug, Clone, Default)]
pub struct ConvertedRoute {
	/// The logical route identity used for pattern lookup.
	pub key: String,
	/// Seed parameters for the dispatch context.
	pub params: HashMap<String, Value>,
}

impl ConvertedRoute {
	/// Creates a converted route with no seed parameters.
	pub fn new(key: impl Into<String>) -> Self {
		Self {
			key: key.into(),
			params: HashMap::new(),
		}
	}

	/// Adds a seed parameter.
	pub fn with_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
		self.params.insert(name.into(), value.into());
		self
	}
}

/// A conversion function from a raw URL to a [`ConvertedRoute`].
///
/// Returning `None` falls back to ordinary pattern-tree lookup.
pub type UrlConvertor = Arc<dyn Fn(&str) -> Option<ConvertedRoute> + Send + Sync>;

/// Ordered registry of URL convertors, resolved by scheme + host.
#[derive(Default)]
pub(crate) struct ConvertorRegistry {
	entries: Vec<(Url, UrlConvertor)>,
}

impl ConvertorRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a convertor under a representative key URL.
	///
	/// Only the key's scheme and host participate in resolution. With two
	/// keys sharing a scheme + host, the first registered wins.
	pub fn register(&mut self, key_url: &str, convertor: UrlConvertor) -> Result<(), RouteError> {
		if key_url.is_empty() {
			return Err(RouteError::InvalidConvertorKey);
		}
		let key = Url::parse(key_url).map_err(|e| RouteError::MalformedUrl {
			url: key_url.to_string(),
			reason: e.to_string(),
		})?;
		self.entries.push((key, convertor));
		Ok(())
	}

	/// Returns the first convertor whose key shares the URL's scheme and
	/// host, if any. Unparsable URLs resolve to nothing.
	pub fn resolve(&self, url: &str) -> Option<&UrlConvertor> {
		let parsed = Url::parse(url).ok()?;
		self.entries
			.iter()
			.find(|(key, _)| {
				key.scheme() == parsed.scheme() && key.host_str() == parsed.host_str()
			})
			.map(|(_, convertor)| convertor)
	}

	/// Runs resolution and conversion in one step.
	pub fn convert(&self, url: &str) -> Option<ConvertedRoute> {
		self.resolve(url).and_then(|convertor| convertor(url))
	}
}
