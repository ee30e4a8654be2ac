//! Location - the current navigation position.

use std::fmt;
use std::str::FromStr;

use url::Url;

use super::core::RouterError;

/// Origin used to resolve hrefs. Only same-origin hrefs become Locations.
const LOCAL_ORIGIN: &str = "http://appflow.local";

/// The current URL state: pathname plus raw query string.
///
/// Two Locations are equal when both `pathname` and `search` are equal; this
/// is the key the router deduplicates navigations on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
	pathname: String,
	search: String,
}

impl Location {
	/// The site root, `/`.
	pub fn root() -> Self {
		Self {
			pathname: "/".to_string(),
			search: String::new(),
		}
	}

	/// Creates a Location from already separated parts.
	///
	/// A missing leading `/` is added to the pathname; an empty pathname
	/// becomes `/`. The search gets a leading `?` unless it is empty, and a
	/// bare `?` becomes empty.
	pub fn new(pathname: impl Into<String>, search: impl Into<String>) -> Self {
		let pathname = pathname.into();
		let pathname = if pathname.starts_with('/') {
			pathname
		} else {
			format!("/{}", pathname)
		};

		Self {
			pathname,
			search: normalize_search(&search.into()),
		}
	}

	/// Parses an href relative to the site root.
	///
	/// # Errors
	///
	/// See [`Location::resolve`].
	pub fn parse(href: &str) -> Result<Self, RouterError> {
		Self::root().resolve(href)
	}

	/// Resolves `href` against this Location, the way a browser resolves a
	/// link on the current page.
	///
	/// Relative paths and `.`/`..` segments are resolved, fragments are
	/// dropped and unsafe characters are percent-encoded.
	///
	/// # Errors
	///
	/// Returns [`RouterError::InvalidLocation`] if `href` cannot be parsed and
	/// [`RouterError::ExternalLocation`] if it points to another origin.
	pub fn resolve(&self, href: &str) -> Result<Self, RouterError> {
		let invalid = |reason: String| RouterError::InvalidLocation {
			href: href.to_string(),
			reason,
		};

		let mut base = Url::parse(LOCAL_ORIGIN).map_err(|e| invalid(e.to_string()))?;
		base.set_path(&self.pathname);
		base.set_query(self.query_string());

		let url = base.join(href).map_err(|e| invalid(e.to_string()))?;
		if url.origin() != base.origin() {
			return Err(RouterError::ExternalLocation(href.to_string()));
		}

		Ok(Self {
			pathname: url.path().to_string(),
			search: url
				.query()
				.filter(|query| !query.is_empty())
				.map(|query| format!("?{}", query))
				.unwrap_or_default(),
		})
	}

	/// Returns the pathname; always starts with `/`.
	pub fn pathname(&self) -> &str {
		&self.pathname
	}

	/// Returns the raw query string including the leading `?`, or `""`.
	pub fn search(&self) -> &str {
		&self.search
	}

	/// Returns `pathname + search`.
	pub fn href(&self) -> String {
		format!("{}{}", self.pathname, self.search)
	}

	/// Returns a copy with `search` replaced.
	pub fn with_search(&self, search: &str) -> Self {
		Self {
			pathname: self.pathname.clone(),
			search: normalize_search(search),
		}
	}

	/// Returns the decoded query parameters, in order.
	pub fn query_pairs(&self) -> Vec<(String, String)> {
		url::form_urlencoded::parse(self.query_string().unwrap_or_default().as_bytes())
			.into_owned()
			.collect()
	}

	/// Returns the first decoded value of query parameter `key`.
	pub fn query(&self, key: &str) -> Option<String> {
		self.query_pairs()
			.into_iter()
			.find(|(name, _)| name == key)
			.map(|(_, value)| value)
	}

	fn query_string(&self) -> Option<&str> {
		self.search
			.strip_prefix('?')
			.filter(|query| !query.is_empty())
	}
}

impl Default for Location {
	fn default() -> Self {
		Self::root()
	}
}

impl fmt::Display for Location {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}{}", self.pathname, self.search)
	}
}

impl FromStr for Location {
	type Err = RouterError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}

fn normalize_search(search: &str) -> String {
	let query = search.strip_prefix('?').unwrap_or(search);
	if query.is_empty() {
		String::new()
	} else {
		format!("?{}", query)
	}
}
