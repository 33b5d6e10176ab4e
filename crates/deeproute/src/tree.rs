//! The registered-pattern tree and its matcher.
//!
//! Patterns are stored as a tree keyed by path segment. Each node maps
//! segment specifiers (literals, `:name` placeholders, or the `~` wildcard)
//! to child nodes and optionally carries the registered handler in a
//! terminal slot, so there is no runtime guessing about whether a value is
//! a subtree or a leaf.
//!
//! Matching is a pure walk: no hooks, no redirect, no decoding. Ambiguity
//! at a level resolves by an explicit key priority (literal over
//! placeholder over wildcard) with stable descending-lexical ordering
//! inside each class.

use crate::error::RouteError;
use crate::handler::RouteTarget;
use crate::segment::{SPECIAL_CHARACTERS, WILDCARD_SEGMENT, query_pairs, split_segments};
use std::collections::{BTreeMap, HashMap};

/// Match priority of a tree key. Lower wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum KeyClass {
	Literal,
	Placeholder,
	Wildcard,
}

fn classify(key: &str) -> KeyClass {
	if key == WILDCARD_SEGMENT {
		KeyClass::Wildcard
	} else if key.starts_with(':') {
		KeyClass::Placeholder
	} else {
		KeyClass::Literal
	}
}

/// A successful tree lookup: extracted placeholder bindings plus the
/// terminal slot of the node the walk ended on (if any).
#[derive(Debug, Clone)]
pub struct MatchOutcome {
	/// Placeholder bindings and query items, name to raw string value.
	pub params: HashMap<String, String>,
	/// Handler stored at the resolved node, if one was registered.
	pub target: Option<RouteTarget>,
}

#[derive(Default)]
struct Node {
	children: BTreeMap<String, Node>,
	target: Option<RouteTarget>,
}

/// The registry of all registered URL patterns.
#[derive(Default)]
pub(crate) struct RouteTrie {
	root: Node,
}

impl RouteTrie {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers `pattern`, creating nodes on demand, and stores `target`
	/// in the terminal slot. Re-registering a pattern replaces its target.
	pub fn insert(&mut self, pattern: &str, target: RouteTarget) -> Result<(), RouteError> {
		let segments = split_segments(pattern)?;
		let mut node = &mut self.root;
		for segment in segments {
			node = node.children.entry(segment).or_default();
		}
		node.target = Some(target);
		Ok(())
	}

	/// Removes the terminal branch of `pattern`: the last segment's node
	/// and everything below it. Intermediate nodes shared with other
	/// patterns stay. Returns whether anything was removed.
	pub fn remove(&mut self, pattern: &str) -> Result<bool, RouteError> {
		let segments = split_segments(pattern)?;
		let Some((last, parents)) = segments.split_last() else {
			// The bare-root pattern only ever holds a target.
			return Ok(self.root.target.take().is_some());
		};

		let mut node = &mut self.root;
		for segment in parents {
			match node.children.get_mut(segment) {
				Some(child) => node = child,
				None => return Ok(false),
			}
		}
		Ok(node.children.remove(last).is_some())
	}

	/// Matches a URL against the tree and merges its query items into the
	/// resulting bindings (last wins).
	pub fn match_url(&self, url: &str, exact: bool) -> Result<Option<MatchOutcome>, RouteError> {
		let segments = split_segments(url)?;
		let Some(mut outcome) = self.lookup(&segments, exact) else {
			return Ok(None);
		};
		for (name, value) in query_pairs(url) {
			outcome.params.insert(name, value);
		}
		Ok(Some(outcome))
	}

	/// Walks the tree level by level.
	///
	/// In exact mode a level with no matching key fails the whole match.
	/// In lenient (non-exact) mode such a level is skipped with the cursor
	/// left in place, so a registered prefix can match a longer URL; the
	/// walk succeeds if any level matched or the final node is terminal.
	fn lookup(&self, segments: &[String], exact: bool) -> Option<MatchOutcome> {
		let mut node = &self.root;
		let mut params = HashMap::new();
		let mut found = false;

		for segment in segments {
			let mut keys: Vec<&String> = node.children.keys().collect();
			keys.sort_by(|a, b| classify(a).cmp(&classify(b)).then_with(|| b.cmp(a)));

			let mut advanced = false;
			for key in keys {
				if key == segment || key.as_str() == WILDCARD_SEGMENT {
					node = &node.children[key];
					found = true;
					advanced = true;
					break;
				}
				if key.starts_with(':') {
					let (name, value) = bind_placeholder(key, segment);
					params.insert(name, value);
					node = &node.children[key];
					found = true;
					advanced = true;
					break;
				}
			}

			if !advanced && exact {
				return None;
			}
		}

		if !found && node.target.is_none() {
			return None;
		}

		Some(MatchOutcome {
			params,
			target: node.target.clone(),
		})
	}
}

/// Binds a `:name` key against a URL segment.
///
/// A decorator suffix (the key's first special character onwards, e.g.
/// `.html` in `:id.html`) is stripped from both the binding name and the
/// segment value. A key with no locatable decorator binds the whole
/// segment.
fn bind_placeholder(key: &str, segment: &str) -> (String, String) {
	match key.find(SPECIAL_CHARACTERS) {
		Some(position) => {
			let name = &key[1..position];
			let suffix = &key[position..];
			let value = segment.strip_suffix(suffix).unwrap_or(segment);
			(name.to_string(), value.to_string())
		}
		None => (key[1..].to_string(), segment.to_string()),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::handler::RouteHandler;
	use std::sync::Arc;

	fn noop_target() -> RouteTarget {
		struct Noop;
		impl RouteHandler for Noop {
			fn handle(&self, _ctx: &crate::DispatchContext) {}
		}
		RouteTarget::Handler(Arc::new(Noop))
	}

	fn trie_with(patterns: &[&str]) -> RouteTrie {
		let mut trie = RouteTrie::new();
		for pattern in patterns {
			trie.insert(pattern, noop_target()).unwrap();
		}
		trie
	}

	#[test]
	fn test_literal_match() {
		let trie = trie_with(&["tap://home/feed"]);
		let outcome = trie.match_url("tap://home/feed", true).unwrap().unwrap();
		assert!(outcome.params.is_empty());
		assert!(outcome.target.is_some());
	}

	#[test]
	fn test_placeholder_binding() {
		let trie = trie_with(&["tap://beauty/:id"]);
		let outcome = trie.match_url("tap://beauty/4", true).unwrap().unwrap();
		assert_eq!(outcome.params.get("id"), Some(&"4".to_string()));
	}

	#[test]
	fn test_decorated_placeholder_strips_suffix() {
		let trie = trie_with(&["item/:id.json"]);
		let outcome = trie.match_url("item/42.json", true).unwrap().unwrap();
		assert_eq!(outcome.params.get("id"), Some(&"42".to_string()));
	}

	#[test]
	fn test_decorated_placeholder_without_suffix_on_segment() {
		// The decorator is absent from the URL segment; the whole segment binds.
		let trie = trie_with(&["item/:id.json"]);
		let outcome = trie.match_url("item/42", true).unwrap().unwrap();
		assert_eq!(outcome.params.get("id"), Some(&"42".to_string()));
	}

	#[test]
	fn test_literal_beats_placeholder_beats_wildcard() {
		// Registration order must not matter.
		let trie = trie_with(&["a/~", "a/:name", "a/fixed"]);
		let outcome = trie.match_url("a/fixed", true).unwrap().unwrap();
		assert!(outcome.params.is_empty(), "literal should win: {outcome:?}");

		let outcome = trie.match_url("a/other", true).unwrap().unwrap();
		assert_eq!(outcome.params.get("name"), Some(&"other".to_string()));
	}

	#[test]
	fn test_wildcard_matches_single_segment() {
		let trie = trie_with(&["a/~"]);
		assert!(trie.match_url("a/anything", true).unwrap().is_some());
		// "a" alone stops at the intermediate node: recognized, but with
		// nothing bound and no handler reached.
		let outcome = trie.match_url("a", true).unwrap().unwrap();
		assert!(outcome.params.is_empty());
		assert!(outcome.target.is_none());
	}

	#[test]
	fn test_digit_literal_still_beats_placeholder() {
		// Under ASCII ordering "42" sorts below ":id"; the class priority
		// keeps the literal in front anyway.
		let trie = trie_with(&["a/42", "a/:id"]);
		let outcome = trie.match_url("a/42", true).unwrap().unwrap();
		assert!(outcome.params.is_empty());
	}

	#[test]
	fn test_scheme_only_pattern_addressable() {
		let trie = trie_with(&["tap://"]);
		assert!(trie.match_url("tap://", true).unwrap().is_some());
	}

	#[test]
	fn test_query_items_merge_last_wins() {
		let trie = trie_with(&["tap://a/:id"]);
		let outcome = trie
			.match_url("tap://a/1?id=override&x=2&x=3", true)
			.unwrap()
			.unwrap();
		assert_eq!(outcome.params.get("id"), Some(&"override".to_string()));
		assert_eq!(outcome.params.get("x"), Some(&"3".to_string()));
	}

	#[test]
	fn test_lenient_walk_skips_unmatched_levels() {
		// "https" and "app" have no keys at the root; the lenient walk
		// leaves the cursor in place until "profile" matches.
		let trie = trie_with(&["profile/:user_id"]);
		let outcome = trie
			.match_url("https://app/profile/99", false)
			.unwrap()
			.unwrap();
		assert_eq!(outcome.params.get("user_id"), Some(&"99".to_string()));
	}

	#[test]
	fn test_lenient_walk_ignores_trailing_segments() {
		let trie = trie_with(&["app/item/:id"]);
		let outcome = trie
			.match_url("app/item/7/extra", false)
			.unwrap()
			.unwrap();
		assert_eq!(outcome.params.get("id"), Some(&"7".to_string()));
	}

	#[test]
	fn test_exact_walk_refuses_partial_match() {
		let trie = trie_with(&["app/item/:id"]);
		assert!(trie.match_url("app/item/7/extra", true).unwrap().is_none());
		assert!(trie.match_url("other://app/item/7", true).unwrap().is_none());
	}

	#[test]
	fn test_no_match_returns_none() {
		let trie = trie_with(&["tap://known"]);
		// Nothing in a foreign-scheme URL matches any level.
		assert!(trie.match_url("zip://unknown", false).unwrap().is_none());
		// A shared scheme is a partial match: the walk reports it with
		// empty bindings and no target.
		let outcome = trie.match_url("tap://unknown", false).unwrap().unwrap();
		assert!(outcome.params.is_empty());
		assert!(outcome.target.is_none());
	}

	#[test]
	fn test_root_registration_catches_unmatched() {
		// A target on the root node keeps even fully-unmatched URLs alive.
		let trie = trie_with(&[""]);
		assert!(trie.match_url("nothing/registered", false).unwrap().is_some());
	}

	#[test]
	fn test_remove_prunes_terminal_branch_only() {
		let mut trie = trie_with(&["tap://a/b", "tap://a/c"]);
		assert!(trie.remove("tap://a/b").unwrap());
		assert!(trie.match_url("tap://a/b", true).unwrap().is_none());
		assert!(trie.match_url("tap://a/c", true).unwrap().is_some());
		// Removing again is a no-op.
		assert!(!trie.remove("tap://a/b").unwrap());
	}

	#[test]
	fn test_reregistration_replaces_target() {
		let mut trie = trie_with(&["tap://a"]);
		trie.insert("tap://a", noop_target()).unwrap();
		assert!(trie.match_url("tap://a", true).unwrap().is_some());
	}
}
