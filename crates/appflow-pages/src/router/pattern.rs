//! Path patterns for route matching.
//!
//! Supported syntax:
//!
//! - static segments: `/why-appflow`
//! - named parameters: `/blog/:slug`
//! - a trailing catch-all: `/docs/*` (captured as [`CATCH_ALL_PARAM`])
//!
//! A trailing slash on the matched pathname is optional. Parameter values are
//! percent-decoded.

use std::borrow::Cow;
use std::collections::HashMap;

use regex::Regex;

use super::core::RouterError;

/// Parameter name under which a trailing `*` segment is captured.
pub const CATCH_ALL_PARAM: &str = "*";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
	Static(String),
	Param(String),
	CatchAll,
}

/// A compiled path pattern.
#[derive(Debug, Clone)]
pub struct PathPattern {
	raw: String,
	segments: Vec<Segment>,
	regex: Regex,
}

impl PathPattern {
	/// Compiles a pattern.
	///
	/// # Errors
	///
	/// Returns [`RouterError::InvalidPattern`] if the pattern does not start
	/// with `/`, has an empty segment, a malformed or duplicated parameter
	/// name, or a `*` anywhere but as the last segment.
	pub fn new(pattern: &str) -> Result<Self, RouterError> {
		let invalid = |reason: &str| RouterError::InvalidPattern {
			pattern: pattern.to_string(),
			reason: reason.to_string(),
		};

		let Some(rest) = pattern.strip_prefix('/') else {
			return Err(invalid("pattern must start with `/`"));
		};
		let rest = rest.strip_suffix('/').unwrap_or(rest);

		let mut segments = Vec::new();
		if !rest.is_empty() {
			let parts: Vec<&str> = rest.split('/').collect();
			let last = parts.len() - 1;

			for (index, part) in parts.into_iter().enumerate() {
				if part.is_empty() {
					return Err(invalid("empty path segment"));
				}

				if part == "*" {
					if index != last {
						return Err(invalid("`*` must be the last segment"));
					}
					segments.push(Segment::CatchAll);
				} else if let Some(name) = part.strip_prefix(':') {
					if name.is_empty()
						|| !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
					{
						return Err(invalid("parameter names must be non-empty [A-Za-z0-9_]"));
					}
					if segments.contains(&Segment::Param(name.to_string())) {
						return Err(invalid("duplicate parameter name"));
					}
					segments.push(Segment::Param(name.to_string()));
				} else if part.contains('*') {
					return Err(invalid("`*` is only allowed as a whole segment"));
				} else {
					segments.push(Segment::Static(part.to_string()));
				}
			}
		}

		let mut source = String::from("^");
		for segment in &segments {
			match segment {
				Segment::Static(text) => {
					source.push('/');
					source.push_str(&regex::escape(text));
				}
				Segment::Param(_) => source.push_str("/([^/]+)"),
				Segment::CatchAll => source.push_str("(?:/(.*))?"),
			}
		}
		if segments.last() != Some(&Segment::CatchAll) {
			source.push_str("/?");
		}
		source.push('$');

		let regex = Regex::new(&source).map_err(|e| invalid(&e.to_string()))?;

		Ok(Self {
			raw: pattern.to_string(),
			segments,
			regex,
		})
	}

	/// Returns the pattern as written.
	pub fn as_str(&self) -> &str {
		&self.raw
	}

	/// Returns the parameter names in pattern order.
	pub fn param_names(&self) -> Vec<&str> {
		self.segments
			.iter()
			.filter_map(|segment| match segment {
				Segment::Param(name) => Some(name.as_str()),
				Segment::CatchAll => Some(CATCH_ALL_PARAM),
				Segment::Static(_) => None,
			})
			.collect()
	}

	/// Returns whether `pathname` matches.
	pub fn is_match(&self, pathname: &str) -> bool {
		self.regex.is_match(pathname)
	}

	/// Matches `pathname` and extracts the parameters.
	pub fn matches(&self, pathname: &str) -> Option<HashMap<String, String>> {
		let captures = self.regex.captures(pathname)?;

		let params = self
			.param_names()
			.into_iter()
			.enumerate()
			.map(|(index, name)| {
				let raw = captures.get(index + 1).map_or("", |m| m.as_str());
				(name.to_string(), decode(raw))
			})
			.collect();

		Some(params)
	}

	/// Builds a path from parameter values.
	///
	/// Returns `None` if a named parameter is missing. The catch-all
	/// parameter is optional and inserted verbatim.
	pub fn reverse(&self, params: &HashMap<String, String>) -> Option<String> {
		let mut path = String::new();

		for segment in &self.segments {
			match segment {
				Segment::Static(text) => {
					path.push('/');
					path.push_str(text);
				}
				Segment::Param(name) => {
					path.push('/');
					path.push_str(&urlencoding::encode(params.get(name)?));
				}
				Segment::CatchAll => {
					if let Some(rest) = params.get(CATCH_ALL_PARAM)
						&& !rest.is_empty()
					{
						path.push('/');
						path.push_str(rest.trim_start_matches('/'));
					}
				}
			}
		}

		if path.is_empty() {
			path.push('/');
		}
		Some(path)
	}
}

impl PartialEq for PathPattern {
	fn eq(&self, other: &Self) -> bool {
		self.raw == other.raw
	}
}

impl Eq for PathPattern {}

fn decode(raw: &str) -> String {
	urlencoding::decode(raw)
		.map(Cow::into_owned)
		.unwrap_or_else(|_| raw.to_string())
}
