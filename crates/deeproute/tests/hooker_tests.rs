//! Hook pipeline behavior around dispatch.

use deeproute::{DispatchContext, DispatchOutcome, RouteError, RouteHooker, Router};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

type Log = Arc<Mutex<Vec<String>>>;

struct PhaseHooker {
	id: String,
	allow: bool,
	log: Log,
}

impl PhaseHooker {
	fn new(id: &str, allow: bool, log: &Log) -> Arc<Self> {
		Arc::new(Self {
			id: id.to_string(),
			allow,
			log: Arc::clone(log),
		})
	}
}

impl RouteHooker for PhaseHooker {
	fn hook_id(&self) -> &str {
		&self.id
	}

	fn will_dispatch(&self, _url: &str, _params: &HashMap<String, Value>) {
		self.log.lock().unwrap().push(format!("{}:will", self.id));
	}

	fn can_dispatch(&self, _url: &str, _params: &HashMap<String, Value>) -> bool {
		self.log.lock().unwrap().push(format!("{}:can", self.id));
		self.allow
	}

	fn did_dispatch(&self, _url: &str, _params: &HashMap<String, Value>) {
		self.log.lock().unwrap().push(format!("{}:did", self.id));
	}
}

fn router_with_handler(log: &Log) -> Router {
	let mut router = Router::new();
	let sink = Arc::clone(log);
	router
		.register("tap://a", move |_ctx: &DispatchContext| {
			sink.lock().unwrap().push("handle".to_string());
		})
		.unwrap();
	router
}

#[test]
fn test_phases_run_in_order_around_the_handler() {
	let log: Log = Arc::new(Mutex::new(Vec::new()));
	let mut router = router_with_handler(&log);
	router
		.register_hooker(PhaseHooker::new("audit", true, &log))
		.unwrap();

	let outcome = router.open("tap://a?x=1").unwrap();

	assert_eq!(outcome, DispatchOutcome::Dispatched(None));
	assert_eq!(
		log.lock().unwrap().as_slice(),
		["audit:will", "audit:can", "handle", "audit:did"]
	);
}

#[test]
fn test_refusal_skips_handler_and_did_phase_without_redirect() {
	let log: Log = Arc::new(Mutex::new(Vec::new()));
	let mut router = router_with_handler(&log);
	let redirected = Arc::new(Mutex::new(0usize));
	let counter = Arc::clone(&redirected);
	router.set_redirect(move |_url: &str, _info: &HashMap<String, Value>| {
		*counter.lock().unwrap() += 1;
	});
	router
		.register_hooker(PhaseHooker::new("gate", false, &log))
		.unwrap();

	let outcome = router.open("tap://a?x=1").unwrap();

	assert_eq!(outcome, DispatchOutcome::Refused);
	// A refused URL was still recognized, so the redirect stays quiet.
	assert_eq!(*redirected.lock().unwrap(), 0);
	assert_eq!(log.lock().unwrap().as_slice(), ["gate:will", "gate:can"]);
}

#[test]
fn test_every_hooker_votes_even_after_a_refusal() {
	let log: Log = Arc::new(Mutex::new(Vec::new()));
	let mut router = router_with_handler(&log);
	router
		.register_hooker(PhaseHooker::new("first", false, &log))
		.unwrap();
	router
		.register_hooker(PhaseHooker::new("second", true, &log))
		.unwrap();

	let outcome = router.open("tap://a?x=1").unwrap();

	assert_eq!(outcome, DispatchOutcome::Refused);
	let log = log.lock().unwrap();
	assert!(log.contains(&"second:can".to_string()));
}

#[test]
fn test_duplicate_hooker_id_is_rejected() {
	let log: Log = Arc::new(Mutex::new(Vec::new()));
	let mut router = Router::new();
	router
		.register_hooker(PhaseHooker::new("auth", true, &log))
		.unwrap();

	let result = router.register_hooker(PhaseHooker::new("auth", false, &log));
	assert!(matches!(result, Err(RouteError::DuplicateHooker(id)) if id == "auth"));
}

#[test]
fn test_hookers_see_caller_parameters_not_query_items() {
	let seen = Arc::new(Mutex::new(Vec::new()));

	struct ParamHooker {
		seen: Arc<Mutex<Vec<HashMap<String, Value>>>>,
	}

	impl RouteHooker for ParamHooker {
		fn hook_id(&self) -> &str {
			"params"
		}

		fn can_dispatch(&self, _url: &str, params: &HashMap<String, Value>) -> bool {
			self.seen.lock().unwrap().push(params.clone());
			true
		}
	}

	let log: Log = Arc::new(Mutex::new(Vec::new()));
	let mut router = router_with_handler(&log);
	router
		.register_hooker(Arc::new(ParamHooker {
			seen: Arc::clone(&seen),
		}))
		.unwrap();

	router.push("tap://a?q=1", HashMap::from([("u".to_string(), json!(9))]))
		.unwrap();

	let seen = seen.lock().unwrap();
	assert_eq!(seen[0].get("u"), Some(&json!(9)));
	assert!(seen[0].get("q").is_none());
}
