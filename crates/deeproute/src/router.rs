//! The dispatcher: ties segmentation, matching, convertors, hooks, and
//! handler invocation together behind one owned `Router` value.
//!
//! A `Router` is built once at startup, routes and hookers are registered,
//! and afterwards it is only read: dispatch is synchronous in-memory work
//! over the pattern tree. There is no global shared instance; hosts pass
//! the router by reference to whatever needs dispatch.

use crate::convertor::{ConvertedRoute, ConvertorRegistry, UrlConvertor};
use crate::error::RouteError;
use crate::handler::{
	Completion, ExternalOpener, NavigationOverride, ObjectRouteHandler, RedirectFallback,
	RouteHandler, RouteTarget,
};
use crate::hooks::{HookerSet, RouteHooker};
use crate::params::{DispatchContext, TransitionIntent};
use crate::segment::{
	SPECIAL_CHARACTERS, decode_param_value, decode_path_portion, normalize_query_plus, query_pairs,
};
use crate::tree::RouteTrie;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use url::Url;

/// How a dispatch attempt ended.
///
/// Every variant is a designed outcome, not a failure; hard failures
/// (malformed URL, empty match) are [`RouteError`]s instead.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
	/// A handler ran. Carries the object handler's return value, if any.
	Dispatched(Option<Value>),
	/// No route matched; the redirect fallback was invoked.
	Redirected,
	/// The hook pipeline refused the dispatch. No redirect fires.
	Refused,
	/// The URL was handed to the external opener instead of being routed
	/// internally.
	External,
}

/// A dispatch request: the URL plus everything the caller wants carried
/// along.
///
/// # Examples
///
/// ```
/// use deeproute::{OpenRequest, TransitionIntent};
/// use serde_json::json;
///
/// let request = OpenRequest::new("tap://beauty/4")
/// 	.with_param("from", json!("feed"))
/// 	.with_intent(TransitionIntent::Present)
/// 	.animated(false);
/// ```
pub struct OpenRequest {
	url: String,
	user_info: HashMap<String, Value>,
	completion: Option<Completion>,
	navigation: Option<Arc<dyn NavigationOverride>>,
	intent: TransitionIntent,
	animated: bool,
}

impl OpenRequest {
	/// Creates a request for `url` with no extra parameters.
	pub fn new(url: impl Into<String>) -> Self {
		Self {
			url: url.into(),
			user_info: HashMap::new(),
			completion: None,
			navigation: None,
			intent: TransitionIntent::Push,
			animated: true,
		}
	}

	/// Adds one caller-supplied parameter. Caller parameters win ties
	/// against extracted and query values.
	pub fn with_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
		self.user_info.insert(name.into(), value.into());
		self
	}

	/// Replaces the caller-supplied parameter mapping.
	pub fn with_user_info(mut self, user_info: HashMap<String, Value>) -> Self {
		self.user_info = user_info;
		self
	}

	/// Attaches a completion callback for the handler to invoke.
	pub fn with_completion<F>(mut self, completion: F) -> Self
	where
		F: Fn(Option<Value>) + Send + Sync + 'static,
	{
		self.completion = Some(Arc::new(completion));
		self
	}

	/// Overrides the host's screen-transition behavior for this dispatch.
	pub fn with_navigation<N>(mut self, navigation: N) -> Self
	where
		N: NavigationOverride + 'static,
	{
		self.navigation = Some(Arc::new(navigation));
		self
	}

	/// Sets the transition intent (push by default).
	pub fn with_intent(mut self, intent: TransitionIntent) -> Self {
		self.intent = intent;
		self
	}

	/// Sets whether the transition should animate (animated by default).
	pub fn animated(mut self, animated: bool) -> Self {
		self.animated = animated;
		self
	}
}

/// The URL dispatch engine.
///
/// # Examples
///
/// ```
/// use deeproute::{DispatchOutcome, Router};
/// use std::sync::{Arc, Mutex};
///
/// let mut router = Router::new();
/// let opened = Arc::new(Mutex::new(Vec::new()));
/// let sink = Arc::clone(&opened);
/// router
/// 	.register("tap://beauty/:id", move |ctx: &deeproute::DispatchContext| {
/// 		sink.lock().unwrap().push(ctx.str("id").unwrap_or_default().to_string());
/// 	})
/// 	.unwrap();
///
/// assert!(router.can_open("tap://beauty/4"));
/// let outcome = router.open("tap://beauty/4").unwrap();
/// assert_eq!(outcome, DispatchOutcome::Dispatched(None));
/// assert_eq!(opened.lock().unwrap().as_slice(), ["4".to_string()]);
/// ```
pub struct Router {
	trie: RouteTrie,
	hookers: HookerSet,
	convertors: ConvertorRegistry,
	external_schemes: Vec<String>,
	allowed_hosts: Vec<Url>,
	redirect: Option<Arc<dyn RedirectFallback>>,
	external: Option<Arc<dyn ExternalOpener>>,
}

impl Default for Router {
	fn default() -> Self {
		Self::new()
	}
}

impl Router {
	/// Creates an empty router. The external-scheme set defaults to
	/// `http`/`https`.
	pub fn new() -> Self {
		Self {
			trie: RouteTrie::new(),
			hookers: HookerSet::new(),
			convertors: ConvertorRegistry::new(),
			external_schemes: vec!["http".to_string(), "https".to_string()],
			allowed_hosts: Vec::new(),
			redirect: None,
			external: None,
		}
	}

	/// Replaces the set of schemes eligible for external hand-off.
	pub fn with_external_schemes<I, S>(mut self, schemes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.external_schemes = schemes.into_iter().map(Into::into).collect();
		self
	}

	/// Registers a URL pattern with a fire-and-forget handler.
	///
	/// Patterns are URL-shaped: `tap://beauty/:id`, `item/:id.html`,
	/// `tap://~`. Re-registering a pattern replaces its handler.
	pub fn register<H>(&mut self, pattern: &str, handler: H) -> Result<(), RouteError>
	where
		H: RouteHandler + 'static,
	{
		self.trie
			.insert(pattern, RouteTarget::Handler(Arc::new(handler)))
	}

	/// Registers a URL pattern with a handler that returns a value to the
	/// dispatching caller.
	pub fn register_object<H>(&mut self, pattern: &str, handler: H) -> Result<(), RouteError>
	where
		H: ObjectRouteHandler + 'static,
	{
		self.trie
			.insert(pattern, RouteTarget::Object(Arc::new(handler)))
	}

	/// Deregisters a pattern's terminal branch. Returns whether anything
	/// was removed.
	pub fn deregister(&mut self, pattern: &str) -> Result<bool, RouteError> {
		self.trie.remove(pattern)
	}

	/// Registers a dispatch hooker. Duplicate ids are rejected.
	pub fn register_hooker(&mut self, hooker: Arc<dyn RouteHooker>) -> Result<(), RouteError> {
		self.hookers.register(hooker)
	}

	/// Registers a URL convertor under a representative key URL; incoming
	/// URLs sharing its scheme and host are offered to the convertor
	/// before pattern lookup.
	pub fn register_convertor<F>(&mut self, key_url: &str, convertor: F) -> Result<(), RouteError>
	where
		F: Fn(&str) -> Option<ConvertedRoute> + Send + Sync + 'static,
	{
		self.convertors
			.register(key_url, Arc::new(convertor) as UrlConvertor)
	}

	/// Sets the not-found fallback, invoked exactly once per unmatched
	/// dispatch.
	pub fn set_redirect<R>(&mut self, redirect: R)
	where
		R: RedirectFallback + 'static,
	{
		self.redirect = Some(Arc::new(redirect));
	}

	/// Sets the opener for URLs that leave the app (external-scheme URLs
	/// whose host is not allow-listed).
	pub fn set_external_opener<O>(&mut self, opener: O)
	where
		O: ExternalOpener + 'static,
	{
		self.external = Some(Arc::new(opener));
	}

	/// Allow-lists a host (given as a representative URL): external-scheme
	/// URLs for that host are routed internally instead of handed off.
	pub fn allow_host(&mut self, url: &str) -> Result<(), RouteError> {
		let parsed = Url::parse(url).map_err(|e| RouteError::MalformedUrl {
			url: url.to_string(),
			reason: e.to_string(),
		})?;
		self.allowed_hosts.push(parsed);
		Ok(())
	}

	/// Dispatches `url` with no extra parameters.
	pub fn open(&self, url: &str) -> Result<DispatchOutcome, RouteError> {
		self.dispatch(OpenRequest::new(url))
	}

	/// Dispatches with push intent, carrying `user_info`.
	pub fn push(
		&self,
		url: &str,
		user_info: HashMap<String, Value>,
	) -> Result<DispatchOutcome, RouteError> {
		self.dispatch(
			OpenRequest::new(url)
				.with_user_info(user_info)
				.with_intent(TransitionIntent::Push),
		)
	}

	/// Dispatches with present intent, carrying `user_info`.
	pub fn present(
		&self,
		url: &str,
		user_info: HashMap<String, Value>,
	) -> Result<DispatchOutcome, RouteError> {
		self.dispatch(
			OpenRequest::new(url)
				.with_user_info(user_info)
				.with_intent(TransitionIntent::Present),
		)
	}

	/// Dispatches a fully-specified request.
	///
	/// The pipeline: normalize the query's `+`s, consult the convertor
	/// registry, hand external URLs off, match the pattern tree, merge and
	/// decode parameters, run the hook pipeline, invoke the handler.
	pub fn dispatch(&self, request: OpenRequest) -> Result<DispatchOutcome, RouteError> {
		let OpenRequest {
			url: origin_url,
			user_info,
			completion,
			navigation,
			intent,
			animated,
		} = request;

		let url = normalize_query_plus(&origin_url);
		tracing::trace!(url = %url, "dispatching");

		let (lookup_key, convertor_params) = match self.convertors.convert(&url) {
			Some(route) => (route.key, route.params),
			None => (url.clone(), HashMap::new()),
		};

		if let Ok(parsed) = Url::parse(&url) {
			let recognized = self
				.external_schemes
				.iter()
				.any(|scheme| scheme == parsed.scheme());
			if recognized && !self.is_allow_listed(&parsed) {
				if let Some(opener) = &self.external {
					if opener.can_open(&parsed) {
						tracing::debug!(url = %url, "handing off to external opener");
						opener.open(&parsed);
						return Ok(DispatchOutcome::External);
					}
				}
			}
		}

		let decoded_key = decode_path_portion(&lookup_key)?;
		let Some(outcome) = self.trie.match_url(&decoded_key, false)? else {
			tracing::debug!(url = %origin_url, "no route matched, redirecting");
			if let Some(redirect) = &self.redirect {
				redirect.redirect(&origin_url, &user_info);
			}
			return Ok(DispatchOutcome::Redirected);
		};

		let mut ctx = DispatchContext::new(origin_url.clone());
		ctx.absorb_extracted(outcome.params);
		ctx.overlay(convertor_params);
		ctx.overlay(user_info.clone());

		if ctx.is_empty() && outcome.target.is_none() {
			return Err(RouteError::EmptyMatch(origin_url));
		}

		self.hookers.will_dispatch(&url, &user_info);
		if !self.hookers.can_dispatch(&url, &user_info) {
			tracing::warn!(url = %url, "dispatch refused by hook pipeline");
			return Ok(DispatchOutcome::Refused);
		}

		ctx.set_completion(completion);
		ctx.set_navigation(navigation);
		ctx.set_transition(intent, animated);

		let result = match &outcome.target {
			Some(RouteTarget::Handler(handler)) => {
				handler.handle(&ctx);
				None
			}
			Some(RouteTarget::Object(handler)) => handler.handle(&ctx),
			None => None,
		};

		self.hookers.did_dispatch(&url, &user_info);

		Ok(DispatchOutcome::Dispatched(result))
	}

	/// Whether a dispatch of `url` would reach handler invocation
	/// (hook refusal aside). Pure probe: no hooks, no redirect.
	pub fn can_open(&self, url: &str) -> bool {
		self.probe(url, false)
	}

	/// Like [`can_open`](Self::can_open), but every URL segment must match
	/// a tree level.
	pub fn can_open_exact(&self, url: &str) -> bool {
		self.probe(url, true)
	}

	/// Matches `url` against the registered patterns and returns the raw
	/// outcome: extracted bindings plus the resolved handler slot.
	///
	/// This is the bare tree walk; convertors, decoding, hooks, and the
	/// redirect fallback are not consulted.
	pub fn match_url(
		&self,
		url: &str,
		exact: bool,
	) -> Result<Option<crate::tree::MatchOutcome>, RouteError> {
		self.trie.match_url(url, exact)
	}

	fn probe(&self, url: &str, exact: bool) -> bool {
		let url = normalize_query_plus(url);
		let key = match self.convertors.convert(&url) {
			Some(route) => route.key,
			None => url,
		};
		let Ok(decoded) = decode_path_portion(&key) else {
			return false;
		};
		matches!(self.trie.match_url(&decoded, exact), Ok(Some(_)))
	}

	/// The convertor-provided route key for `url`, if a convertor resolves.
	pub fn route_key(&self, url: &str) -> Option<String> {
		self.convertors.convert(url).map(|route| route.key)
	}

	/// The convertor-provided parameters for `url`, or its decoded query
	/// items when no convertor resolves.
	pub fn route_params(&self, url: &str) -> HashMap<String, Value> {
		match self.convertors.convert(url) {
			Some(route) => route.params,
			None => query_pairs(url)
				.into_iter()
				.map(|(name, value)| (name, Value::String(decode_param_value(&value))))
				.collect(),
		}
	}

	/// Substitutes positional `parameters` into the placeholders of
	/// `pattern`, left to right.
	///
	/// A placeholder starts at `:` and is closed by one of `/ ? & .` or
	/// the end of the pattern. When `parameters` runs short, the last
	/// value is reused for the remaining placeholders.
	///
	/// # Examples
	///
	/// ```
	/// use deeproute::Router;
	///
	/// assert_eq!(Router::generate_url("item/:id", &["7"]), "item/7");
	/// assert_eq!(Router::generate_url("a/:x/b/:y", &["1"]), "a/1/b/1");
	/// ```
	pub fn generate_url(pattern: &str, parameters: &[&str]) -> String {
		let mut placeholders: Vec<&str> = Vec::new();
		let mut start: Option<usize> = None;

		for (index, character) in pattern.char_indices() {
			if character == ':' {
				start = Some(index);
				continue;
			}
			if let Some(opened) = start {
				if SPECIAL_CHARACTERS.contains(&character) {
					// An empty name (the `:` of `scheme://`) is not a
					// placeholder.
					if index > opened + 1 {
						placeholders.push(&pattern[opened..index]);
					}
					start = None;
				}
			}
		}
		if let Some(opened) = start {
			if opened + 1 < pattern.len() {
				placeholders.push(&pattern[opened..]);
			}
		}

		if placeholders.is_empty() || parameters.is_empty() {
			return pattern.to_string();
		}

		let mut result = pattern.to_string();
		for (index, placeholder) in placeholders.iter().enumerate() {
			let value = parameters[index.min(parameters.len() - 1)];
			result = result.replace(placeholder, value);
		}
		result
	}

	fn is_allow_listed(&self, url: &Url) -> bool {
		self.allowed_hosts
			.iter()
			.any(|entry| match (entry.host_str(), url.host_str()) {
				(Some(allowed), Some(host)) => allowed == host,
				_ => false,
			})
	}
}
