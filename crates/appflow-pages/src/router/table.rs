//! Route table: ordered, immutable mapping of path patterns to pages.
//!
//! The table is the configuration surface of the router. Entries can be
//! built in code with [`RouteTable::builder`] or deserialized from
//! configuration as [`RouteEntry`] values:
//!
//! ```toml
//! [[routes]]
//! path = "/"
//! component = "landing-page"
//!
//! [[routes]]
//! path = "/appflow"
//! redirect = "/why-appflow"
//! ```
//!
//! Matching scans the entries top to bottom; the first match wins. When
//! nothing matches, the fallback route is returned.

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::core::RouterError;
use super::pattern::PathPattern;

/// Component tag of the fallback route unless configured otherwise.
pub const DEFAULT_FALLBACK: &str = "not-found";

/// What a route resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteTarget {
	/// Render the component with this tag.
	Component(String),
	/// Navigate to this local path instead.
	Redirect(String),
}

/// A route table entry as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRouteEntry", into = "RawRouteEntry")]
pub struct RouteEntry {
	/// Path pattern, e.g. `/blog/:slug`.
	pub path: String,
	/// Component or redirect target.
	pub target: RouteTarget,
	/// Optional name for reverse lookups.
	pub name: Option<String>,
	/// Optional document title.
	pub title: Option<String>,
}

impl RouteEntry {
	/// Creates an entry rendering `component`.
	pub fn component(path: impl Into<String>, component: impl Into<String>) -> Self {
		Self {
			path: path.into(),
			target: RouteTarget::Component(component.into()),
			name: None,
			title: None,
		}
	}

	/// Creates an entry redirecting to `to`.
	pub fn redirect(path: impl Into<String>, to: impl Into<String>) -> Self {
		Self {
			path: path.into(),
			target: RouteTarget::Redirect(to.into()),
			name: None,
			title: None,
		}
	}

	/// Sets the route name.
	pub fn with_name(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());
		self
	}

	/// Sets the document title.
	pub fn with_title(mut self, title: impl Into<String>) -> Self {
		self.title = Some(title.into());
		self
	}
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRouteEntry {
	path: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	component: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	redirect: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	name: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	title: Option<String>,
}

impl TryFrom<RawRouteEntry> for RouteEntry {
	type Error = RouterError;

	fn try_from(raw: RawRouteEntry) -> Result<Self, Self::Error> {
		let target = match (raw.component, raw.redirect) {
			(Some(component), None) => RouteTarget::Component(component),
			(None, Some(to)) => RouteTarget::Redirect(to),
			(Some(_), Some(_)) => {
				return Err(RouterError::InvalidEntry {
					path: raw.path,
					reason: "`component` and `redirect` are mutually exclusive".to_string(),
				});
			}
			(None, None) => {
				return Err(RouterError::InvalidEntry {
					path: raw.path,
					reason: "one of `component` or `redirect` is required".to_string(),
				});
			}
		};

		Ok(Self {
			path: raw.path,
			target,
			name: raw.name,
			title: raw.title,
		})
	}
}

impl From<RouteEntry> for RawRouteEntry {
	fn from(entry: RouteEntry) -> Self {
		let (component, redirect) = match entry.target {
			RouteTarget::Component(component) => (Some(component), None),
			RouteTarget::Redirect(to) => (None, Some(to)),
		};
		Self {
			path: entry.path,
			component,
			redirect,
			name: entry.name,
			title: entry.title,
		}
	}
}

/// A compiled route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
	pattern: PathPattern,
	target: RouteTarget,
	name: Option<String>,
	title: Option<String>,
}

impl Route {
	/// Compiles a table entry.
	///
	/// # Errors
	///
	/// Returns [`RouterError::InvalidPattern`] for a bad path pattern and
	/// [`RouterError::InvalidEntry`] for an empty component tag or a redirect
	/// target that is not an absolute local path.
	pub fn compile(entry: &RouteEntry) -> Result<Self, RouterError> {
		let invalid = |reason: &str| RouterError::InvalidEntry {
			path: entry.path.clone(),
			reason: reason.to_string(),
		};

		match &entry.target {
			RouteTarget::Component(tag) if tag.trim().is_empty() => {
				return Err(invalid("component tag must not be empty"));
			}
			RouteTarget::Redirect(to) if !to.starts_with('/') || to.starts_with("//") => {
				return Err(invalid("redirect target must be an absolute local path"));
			}
			_ => {}
		}

		Ok(Self {
			pattern: PathPattern::new(&entry.path)?,
			target: entry.target.clone(),
			name: entry.name.clone(),
			title: entry.title.clone(),
		})
	}

	/// Returns the path pattern.
	pub fn pattern(&self) -> &PathPattern {
		&self.pattern
	}

	/// Returns the target.
	pub fn target(&self) -> &RouteTarget {
		&self.target
	}

	/// Returns the component tag, if this route renders a component.
	pub fn component_tag(&self) -> Option<&str> {
		match &self.target {
			RouteTarget::Component(tag) => Some(tag),
			RouteTarget::Redirect(_) => None,
		}
	}

	/// Returns the redirect destination, if this is a redirect route.
	pub fn redirect_target(&self) -> Option<&str> {
		match &self.target {
			RouteTarget::Redirect(to) => Some(to),
			RouteTarget::Component(_) => None,
		}
	}

	/// Returns the route name.
	pub fn name(&self) -> Option<&str> {
		self.name.as_deref()
	}

	/// Returns the document title.
	pub fn title(&self) -> Option<&str> {
		self.title.as_deref()
	}
}

/// The result of matching a pathname.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a> {
	route: &'a Route,
	params: HashMap<String, String>,
	fallback: bool,
}

impl<'a> RouteMatch<'a> {
	/// Returns the matched route (the fallback route when nothing matched).
	pub fn route(&self) -> &'a Route {
		self.route
	}

	/// Returns whether this is the fallback.
	pub fn is_fallback(&self) -> bool {
		self.fallback
	}

	/// Returns the extracted path parameters.
	pub fn params(&self) -> &HashMap<String, String> {
		&self.params
	}

	/// Returns one path parameter.
	pub fn param(&self, name: &str) -> Option<&str> {
		self.params.get(name).map(String::as_str)
	}

	/// Returns one path parameter parsed as `T`.
	///
	/// Returns `None` when the parameter is missing or does not parse.
	pub fn param_as<T: FromStr>(&self, name: &str) -> Option<T> {
		self.param(name)?.parse().ok()
	}
}

/// Ordered, immutable route table with a fallback route.
#[derive(Debug, Clone)]
pub struct RouteTable {
	routes: Vec<Route>,
	fallback: Route,
	named: HashMap<String, usize>,
}

impl RouteTable {
	/// Starts building a table.
	pub fn builder() -> RouteTableBuilder {
		RouteTableBuilder::new()
	}

	/// Compiles `entries` in order, with `fallback` as the not-found component.
	///
	/// # Errors
	///
	/// Returns the first compile error, or [`RouterError::DuplicateRouteName`]
	/// when two entries share a name.
	pub fn from_entries(
		entries: impl IntoIterator<Item = RouteEntry>,
		fallback: &str,
	) -> Result<Self, RouterError> {
		let mut routes = Vec::new();
		let mut named = HashMap::new();

		for entry in entries {
			let route = Route::compile(&entry)?;
			if let Some(name) = route.name() {
				if named.contains_key(name) {
					return Err(RouterError::DuplicateRouteName(name.to_string()));
				}
				named.insert(name.to_string(), routes.len());
			}
			routes.push(route);
		}

		let fallback = Route::compile(&RouteEntry::component("/*", fallback))?;

		Ok(Self {
			routes,
			fallback,
			named,
		})
	}

	/// The routes this site deploys with.
	pub fn default_entries() -> Vec<RouteEntry> {
		vec![
			RouteEntry::component("/", "landing-page")
				.with_name("landing")
				.with_title("Appflow"),
			RouteEntry::component("/why-appflow", "why-appflow-page")
				.with_name("why-appflow")
				.with_title("Why Appflow"),
		]
	}

	/// Matches `pathname` against the routes in order.
	///
	/// Pure: the same table and pathname always give the same result.
	pub fn match_path(&self, pathname: &str) -> RouteMatch<'_> {
		for route in &self.routes {
			if let Some(params) = route.pattern.matches(pathname) {
				return RouteMatch {
					route,
					params,
					fallback: false,
				};
			}
		}

		RouteMatch {
			route: &self.fallback,
			params: HashMap::new(),
			fallback: true,
		}
	}

	/// Generates a path for the route named `name`.
	///
	/// # Errors
	///
	/// Returns [`RouterError::InvalidRouteName`] for an unknown name and
	/// [`RouterError::MissingParameter`] when a parameter is not supplied.
	pub fn reverse(&self, name: &str, params: &[(&str, &str)]) -> Result<String, RouterError> {
		let route = self
			.get_by_name(name)
			.ok_or_else(|| RouterError::InvalidRouteName(name.to_string()))?;

		let params: HashMap<String, String> = params
			.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect();

		route.pattern.reverse(&params).ok_or_else(|| {
			let missing = route
				.pattern
				.param_names()
				.into_iter()
				.find(|param| !params.contains_key(*param))
				.unwrap_or_default();
			RouterError::MissingParameter(missing.to_string())
		})
	}

	/// Returns the route named `name`.
	pub fn get_by_name(&self, name: &str) -> Option<&Route> {
		self.named.get(name).and_then(|index| self.routes.get(*index))
	}

	/// Returns the routes in match order.
	pub fn routes(&self) -> &[Route] {
		&self.routes
	}

	/// Returns the fallback route.
	pub fn fallback(&self) -> &Route {
		&self.fallback
	}

	/// Returns the number of routes, excluding the fallback.
	pub fn len(&self) -> usize {
		self.routes.len()
	}

	/// Returns whether the table has no routes besides the fallback.
	pub fn is_empty(&self) -> bool {
		self.routes.is_empty()
	}
}

/// Builder for [`RouteTable`].
#[derive(Debug, Clone)]
pub struct RouteTableBuilder {
	entries: Vec<RouteEntry>,
	fallback: String,
}

impl RouteTableBuilder {
	fn new() -> Self {
		Self {
			entries: Vec::new(),
			fallback: DEFAULT_FALLBACK.to_string(),
		}
	}

	/// Appends a component route.
	pub fn component(self, path: &str, component: &str) -> Self {
		self.entry(RouteEntry::component(path, component))
	}

	/// Appends a redirect route.
	pub fn redirect(self, path: &str, to: &str) -> Self {
		self.entry(RouteEntry::redirect(path, to))
	}

	/// Appends an entry.
	pub fn entry(mut self, entry: RouteEntry) -> Self {
		self.entries.push(entry);
		self
	}

	/// Sets the fallback component tag.
	pub fn fallback(mut self, component: &str) -> Self {
		self.fallback = component.to_string();
		self
	}

	/// Compiles the table.
	///
	/// # Errors
	///
	/// See [`RouteTable::from_entries`].
	pub fn build(self) -> Result<RouteTable, RouterError> {
		RouteTable::from_entries(self.entries, &self.fallback)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::{fixture, rstest};

	#[fixture]
	fn table() -> RouteTable {
		RouteTable::from_entries(RouteTable::default_entries(), DEFAULT_FALLBACK).unwrap()
	}

	#[rstest]
	#[case("/", Some("landing-page"))]
	#[case("/why-appflow", Some("why-appflow-page"))]
	#[case("/why-appflow/", Some("why-appflow-page"))]
	#[case("/does-not-exist", None)]
	fn test_default_table(table: RouteTable, #[case] path: &str, #[case] tag: Option<&str>) {
		let route_match = table.match_path(path);
		match tag {
			Some(tag) => {
				assert!(!route_match.is_fallback());
				assert_eq!(route_match.route().component_tag(), Some(tag));
			}
			None => {
				assert!(route_match.is_fallback());
				assert_eq!(route_match.route().component_tag(), Some(DEFAULT_FALLBACK));
			}
		}
	}

	#[rstest]
	fn test_first_registered_wins() {
		let table = RouteTable::builder()
			.component("/a", "first")
			.component("/a/:id", "second")
			.component("/a", "shadowed")
			.build()
			.unwrap();

		assert_eq!(table.match_path("/a").route().component_tag(), Some("first"));
		assert_eq!(table.match_path("/a/7").route().component_tag(), Some("second"));
	}

	#[rstest]
	fn test_not_longest_prefix() {
		let table = RouteTable::builder()
			.component("/docs/*", "docs")
			.component("/docs/api", "api-docs")
			.build()
			.unwrap();

		assert_eq!(table.match_path("/docs/api").route().component_tag(), Some("docs"));
	}

	#[rstest]
	fn test_match_is_pure(table: RouteTable) {
		let first = table.match_path("/why-appflow");
		let second = table.match_path("/why-appflow");
		assert_eq!(first, second);
	}

	#[rstest]
	fn test_params_and_typed_access() {
		let table = RouteTable::builder()
			.component("/blog/:slug/page/:page", "blog-post")
			.build()
			.unwrap();

		let route_match = table.match_path("/blog/ship-faster/page/3");
		assert_eq!(route_match.param("slug"), Some("ship-faster"));
		assert_eq!(route_match.param_as::<u32>("page"), Some(3));
		assert_eq!(route_match.param_as::<u32>("slug"), None);
	}

	#[rstest]
	fn test_custom_fallback() {
		let table = RouteTable::builder().fallback("page-404").build().unwrap();
		assert!(table.is_empty());
		assert_eq!(table.match_path("/").route().component_tag(), Some("page-404"));
	}

	#[rstest]
	fn test_reverse(table: RouteTable) {
		assert_eq!(table.reverse("why-appflow", &[]).unwrap(), "/why-appflow");
		assert!(matches!(
			table.reverse("pricing", &[]),
			Err(RouterError::InvalidRouteName(_))
		));
	}

	#[rstest]
	fn test_reverse_missing_parameter() {
		let table = RouteTable::builder()
			.entry(RouteEntry::component("/blog/:slug", "blog-post").with_name("post"))
			.build()
			.unwrap();

		assert_eq!(table.reverse("post", &[("slug", "intro")]).unwrap(), "/blog/intro");
		assert_eq!(
			table.reverse("post", &[]),
			Err(RouterError::MissingParameter("slug".to_string()))
		);
	}

	#[rstest]
	fn test_duplicate_names_rejected() {
		let result = RouteTable::builder()
			.entry(RouteEntry::component("/", "a").with_name("home"))
			.entry(RouteEntry::component("/home", "b").with_name("home"))
			.build();

		assert_eq!(
			result.unwrap_err(),
			RouterError::DuplicateRouteName("home".to_string())
		);
	}

	#[rstest]
	#[case(RouteEntry::component("/", " "))]
	#[case(RouteEntry::redirect("/old", "new"))]
	#[case(RouteEntry::redirect("/old", "//evil.example/"))]
	fn test_invalid_entries(#[case] entry: RouteEntry) {
		assert!(matches!(
			Route::compile(&entry),
			Err(RouterError::InvalidEntry { .. })
		));
	}

	#[rstest]
	fn test_entry_deserialization() {
		let entries: Vec<RouteEntry> = serde_json::from_value(serde_json::json!([
			{ "path": "/", "component": "landing-page", "title": "Appflow" },
			{ "path": "/appflow", "redirect": "/why-appflow" },
		]))
		.unwrap();

		assert_eq!(
			entries,
			vec![
				RouteEntry::component("/", "landing-page").with_title("Appflow"),
				RouteEntry::redirect("/appflow", "/why-appflow"),
			]
		);
	}

	#[rstest]
	#[case(serde_json::json!({ "path": "/" }))]
	#[case(serde_json::json!({ "path": "/", "component": "a", "redirect": "/b" }))]
	#[case(serde_json::json!({ "path": "/", "component": "a", "layout": "wide" }))]
	fn test_entry_deserialization_errors(#[case] value: serde_json::Value) {
		assert!(serde_json::from_value::<RouteEntry>(value).is_err());
	}

	#[rstest]
	fn test_entry_serialization_omits_unused_target() {
		let value = serde_json::to_value(RouteEntry::redirect("/appflow", "/why-appflow")).unwrap();
		assert_eq!(
			value,
			serde_json::json!({ "path": "/appflow", "redirect": "/why-appflow" })
		);
	}
}
