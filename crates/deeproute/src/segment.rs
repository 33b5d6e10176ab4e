//! URL segmentation.
//!
//! Turns a raw URL (or URL-shaped pattern) string into the ordered path
//! segments the pattern tree is keyed by. A `scheme://` prefix is captured
//! as the first segment, so `tap://beauty/:id` and `tap://beauty/4` segment
//! the same way and schemes participate in matching like any other level.

use crate::error::RouteError;
use percent_encoding::percent_decode_str;
use url::Url;

/// The reserved wildcard segment. Matches any single URL segment with the
/// lowest priority, and stands in for the empty remainder of a bare
/// `scheme://` so that pattern stays addressable.
pub const WILDCARD_SEGMENT: &str = "~";

/// Characters that may terminate a placeholder name inside a pattern
/// segment, e.g. the `.` in `:id.html`.
pub(crate) const SPECIAL_CHARACTERS: &[char] = &['/', '?', '&', '.'];

/// Splits a URL into its ordered path segments.
///
/// - `scheme://` is split off once; the scheme becomes the first segment.
/// - An empty remainder after `scheme://` yields the wildcard sentinel.
/// - The query portion (first `?` onwards) is not segmented.
/// - Empty components (repeated or trailing `/`) are skipped.
///
/// # Errors
///
/// Returns [`RouteError::MalformedUrl`] when the input cannot be parsed as
/// a URL at all: a full URL the parser rejects, or a path component whose
/// percent-escapes do not decode to valid UTF-8.
///
/// # Examples
///
/// ```
/// use deeproute::segment::split_segments;
///
/// let segments = split_segments("tap://beauty/4?from=feed").unwrap();
/// assert_eq!(segments, vec!["tap", "beauty", "4"]);
///
/// let segments = split_segments("tap://").unwrap();
/// assert_eq!(segments, vec!["tap", "~"]);
/// ```
pub fn split_segments(url: &str) -> Result<Vec<String>, RouteError> {
	let mut segments = Vec::new();

	let rest = match url.split_once("://") {
		Some((scheme, rest)) => {
			// A full URL gets the real parser's verdict on well-formedness.
			Url::parse(url).map_err(|e| RouteError::MalformedUrl {
				url: url.to_string(),
				reason: e.to_string(),
			})?;
			segments.push(scheme.to_string());
			if rest.is_empty() {
				segments.push(WILDCARD_SEGMENT.to_string());
			}
			rest
		}
		None => url,
	};

	let path = rest.split('?').next().unwrap_or_default();
	for component in path.split('/') {
		if component.is_empty() {
			continue;
		}
		if percent_decode_str(component).decode_utf8().is_err() {
			return Err(RouteError::MalformedUrl {
				url: url.to_string(),
				reason: format!("invalid percent-escape in `{component}`"),
			});
		}
		segments.push(component.to_string());
	}

	Ok(segments)
}

/// Extracts raw (undecoded) query pairs from a URL string.
///
/// Values keep their percent-escapes; decoding happens once, later in the
/// dispatch pipeline. A pair without `=` maps to the empty string and
/// duplicate names resolve last-wins at insertion time.
pub(crate) fn query_pairs(url: &str) -> Vec<(String, String)> {
	match url.split_once('?') {
		Some((_, query)) => query
			.split('&')
			.filter(|pair| !pair.is_empty())
			.filter_map(|pair| {
				// Split on the first '=' only, to preserve '=' in values.
				let mut parts = pair.splitn(2, '=');
				let name = parts.next()?;
				if name.is_empty() {
					return None;
				}
				Some((name.to_string(), parts.next().unwrap_or_default().to_string()))
			})
			.collect(),
		None => Vec::new(),
	}
}

/// Rewrites `+` to `%20` within the query portion only; path segments are
/// left untouched.
pub(crate) fn normalize_query_plus(url: &str) -> String {
	match url.split_once('?') {
		Some((path, query)) => format!("{}?{}", path, query.replace('+', "%20")),
		None => url.to_string(),
	}
}

/// Percent-decodes the path portion of a lookup key, leaving the query
/// untouched (query values are decoded per-parameter later).
pub(crate) fn decode_path_portion(url: &str) -> Result<String, RouteError> {
	let (path, query) = match url.split_once('?') {
		Some((path, query)) => (path, Some(query)),
		None => (url, None),
	};

	let decoded = percent_decode_str(path)
		.decode_utf8()
		.map_err(|e| RouteError::MalformedUrl {
			url: url.to_string(),
			reason: e.to_string(),
		})?;

	Ok(match query {
		Some(query) => format!("{decoded}?{query}"),
		None => decoded.to_string(),
	})
}

/// Reverses the `+`-as-space convention and percent-decodes a single
/// extracted parameter value. Applied exactly once per string value.
pub(crate) fn decode_param_value(value: &str) -> String {
	let value = value.replace('+', "%20");
	percent_decode_str(&value).decode_utf8_lossy().to_string()
}
