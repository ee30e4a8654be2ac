//! Core Router Implementation.
//!
//! This module provides the main Router struct and routing logic.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use super::history::{HistoryBackend, HistoryMode, Traversal};
use super::location::Location;
use super::table::{RouteMatch, RouteTable};
use crate::subscription::{ListenerList, Subscription};

/// Redirect hops followed before giving up on a navigation target.
const MAX_REDIRECTS: usize = 8;

/// Error type for router operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouterError {
	/// Path pattern could not be compiled.
	#[error("Invalid route pattern `{pattern}`: {reason}")]
	InvalidPattern {
		/// The pattern as written.
		pattern: String,
		/// Why it was rejected.
		reason: String,
	},
	/// Route table entry is malformed.
	#[error("Invalid route entry `{path}`: {reason}")]
	InvalidEntry {
		/// Path of the offending entry.
		path: String,
		/// Why it was rejected.
		reason: String,
	},
	/// Href could not be parsed.
	#[error("Invalid location `{href}`: {reason}")]
	InvalidLocation {
		/// The href as given.
		href: String,
		/// Parser message.
		reason: String,
	},
	/// Href points to another origin.
	#[error("External location: {0}")]
	ExternalLocation(String),
	/// Invalid route name.
	#[error("Invalid route name: {0}")]
	InvalidRouteName(String),
	/// Two routes share a name.
	#[error("Duplicate route name: {0}")]
	DuplicateRouteName(String),
	/// Missing parameter for reverse URL.
	#[error("Missing parameter: {0}")]
	MissingParameter(String),
}

type FieldCallbacks<T> = ListenerList<dyn Fn(&T, &T)>;

/// An observable field of the router state.
pub trait RouterField: Copy + fmt::Debug + 'static {
	/// Type handed to callbacks.
	type Value: Clone + PartialEq + fmt::Debug + 'static;

	/// Field name, used in logs.
	const NAME: &'static str;

	#[doc(hidden)]
	fn project(location: &Location) -> Self::Value;

	#[doc(hidden)]
	fn listeners(listeners: &RouterListeners) -> &Rc<FieldCallbacks<Self::Value>>;
}

/// The full location; changes on every pathname or search change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Url;

/// The pathname only; query-only navigations leave it unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActivePath;

impl RouterField for Url {
	type Value = Location;
	const NAME: &'static str = "url";

	fn project(location: &Location) -> Location {
		location.clone()
	}

	fn listeners(listeners: &RouterListeners) -> &Rc<FieldCallbacks<Location>> {
		&listeners.url
	}
}

impl RouterField for ActivePath {
	type Value = String;
	const NAME: &'static str = "activePath";

	fn project(location: &Location) -> String {
		location.pathname().to_string()
	}

	fn listeners(listeners: &RouterListeners) -> &Rc<FieldCallbacks<String>> {
		&listeners.active_path
	}
}

#[doc(hidden)]
pub struct RouterListeners {
	url: Rc<FieldCallbacks<Location>>,
	active_path: Rc<FieldCallbacks<String>>,
}

impl RouterListeners {
	fn new() -> Self {
		Self {
			url: ListenerList::new(),
			active_path: ListenerList::new(),
		}
	}
}

/// Options for [`Router::navigate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NavigateOptions {
	/// History semantics; defaults to [`HistoryMode::Push`].
	pub mode: HistoryMode,
}

impl NavigateOptions {
	/// Creates a new history entry.
	pub fn push() -> Self {
		Self {
			mode: HistoryMode::Push,
		}
	}

	/// Overwrites the current history entry.
	pub fn replace() -> Self {
		Self {
			mode: HistoryMode::Replace,
		}
	}
}

/// Outcome of a navigation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
	/// The current location changed and listeners were notified.
	Committed {
		/// Location before the navigation.
		from: Location,
		/// Location after the navigation.
		to: Location,
	},
	/// The target equals the current location; nothing happened.
	Unchanged,
}

impl Navigation {
	/// Returns whether the location changed.
	pub fn is_committed(&self) -> bool {
		matches!(self, Self::Committed { .. })
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NavigationKind {
	Push,
	Replace,
	Pop,
}

impl From<HistoryMode> for NavigationKind {
	fn from(mode: HistoryMode) -> Self {
		match mode {
			HistoryMode::Push => Self::Push,
			HistoryMode::Replace => Self::Replace,
		}
	}
}

struct RouterInner {
	table: Rc<RouteTable>,
	history: Rc<dyn HistoryBackend>,
	current: RefCell<Location>,
	// Bumped on every commit; a notification round ends early once a
	// listener commits a newer location.
	generation: Cell<u64>,
	listeners: RouterListeners,
}

/// The main router.
///
/// Single authority for the current [`Location`]. `Router` is a cheap handle;
/// clones share the same state and listeners.
///
/// # Example
///
/// ```ignore
/// use appflow_pages::router::{RouteTable, Router, Url};
///
/// let table = RouteTable::builder()
///     .component("/", "landing-page")
///     .component("/why-appflow", "why-appflow-page")
///     .build()?;
/// let router = Router::new(table);
///
/// let _sub = router.on_change(Url, |new, old| println!("{old} -> {new}"));
/// router.push("/why-appflow")?;
/// ```
#[derive(Clone)]
pub struct Router {
	inner: Rc<RouterInner>,
}

impl fmt::Debug for Router {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Router")
			.field("current", &*self.inner.current.borrow())
			.field("routes_count", &self.inner.table.len())
			.field("url_listeners", &self.inner.listeners.url.len())
			.finish()
	}
}

impl Router {
	/// Creates a router on the platform's default history.
	///
	/// In the browser this is `window.history`; elsewhere an in-memory
	/// history starting at `/`.
	pub fn new(table: RouteTable) -> Self {
		Self::with_history(table, default_history())
	}

	/// Creates a router on `history`, starting at its current location.
	///
	/// A redirect route matching the initial location is followed by
	/// replacing the current history entry.
	pub fn with_history(table: RouteTable, history: Rc<dyn HistoryBackend>) -> Self {
		let initial = history.current();

		let router = Self {
			inner: Rc::new(RouterInner {
				table: Rc::new(table),
				history,
				current: RefCell::new(initial.clone()),
				generation: Cell::new(0),
				listeners: RouterListeners::new(),
			}),
		};

		let resolved = router.resolve_redirects(initial.clone());
		if resolved != initial {
			router.inner.history.replace(&resolved);
			*router.inner.current.borrow_mut() = resolved;
		}

		router
	}

	/// Returns the route table.
	pub fn routes(&self) -> &RouteTable {
		&self.inner.table
	}

	/// Returns a shared handle to the route table.
	pub fn route_table(&self) -> Rc<RouteTable> {
		Rc::clone(&self.inner.table)
	}

	/// Returns the current location.
	pub fn current(&self) -> Location {
		self.inner.current.borrow().clone()
	}

	/// Matches a location against the route table.
	pub fn match_location(&self, location: &Location) -> RouteMatch<'_> {
		self.inner.table.match_path(location.pathname())
	}

	/// Matches the current location.
	pub fn current_match(&self) -> RouteMatch<'_> {
		self.match_location(&self.current())
	}

	/// Navigates to `href` with a new history entry.
	///
	/// # Errors
	///
	/// See [`Router::navigate`].
	pub fn push(&self, href: &str) -> Result<Navigation, RouterError> {
		self.navigate(href, NavigateOptions::push())
	}

	/// Navigates to `href`, overwriting the current history entry.
	///
	/// # Errors
	///
	/// See [`Router::navigate`].
	pub fn replace(&self, href: &str) -> Result<Navigation, RouterError> {
		self.navigate(href, NavigateOptions::replace())
	}

	/// Navigates to `href`, resolved against the current location.
	///
	/// Redirect routes are followed. A path no route matches still becomes
	/// the current location; it resolves to the fallback route. When the
	/// target equals the current location nothing is committed and no
	/// listener runs. Otherwise `Url` listeners, then `ActivePath` listeners,
	/// run before this returns.
	///
	/// # Errors
	///
	/// Returns [`RouterError::InvalidLocation`] or
	/// [`RouterError::ExternalLocation`] when `href` is not a local location.
	pub fn navigate(&self, href: &str, options: NavigateOptions) -> Result<Navigation, RouterError> {
		let target = self.current().resolve(href)?;
		let target = self.resolve_redirects(target);
		Ok(self.commit(target, options.mode.into()))
	}

	/// Moves one entry back in history.
	pub fn back(&self) -> Navigation {
		self.go(-1)
	}

	/// Moves one entry forward in history.
	pub fn forward(&self) -> Navigation {
		self.go(1)
	}

	/// Moves `delta` entries through history.
	///
	/// With a backend that completes asynchronously (the browser) this
	/// returns [`Navigation::Unchanged`]; the change arrives later through
	/// [`Router::handle_pop`].
	pub fn go(&self, delta: isize) -> Navigation {
		match self.inner.history.go(delta) {
			Traversal::Completed(location) => self.handle_pop(location),
			Traversal::Pending => Navigation::Unchanged,
			Traversal::OutOfRange => {
				tracing::trace!(delta, "history traversal out of range");
				Navigation::Unchanged
			}
		}
	}

	/// Commits a location reported by the platform after back/forward.
	pub fn handle_pop(&self, location: Location) -> Navigation {
		let resolved = self.resolve_redirects(location.clone());
		let kind = if resolved == location {
			NavigationKind::Pop
		} else {
			NavigationKind::Replace
		};
		self.commit(resolved, kind)
	}

	/// Registers `callback` for changes of `field`.
	///
	/// Callbacks receive `(new, old)` and run synchronously in registration
	/// order.
	pub fn on_change<F: RouterField>(
		&self,
		_field: F,
		callback: impl Fn(&F::Value, &F::Value) + 'static,
	) -> Subscription {
		F::listeners(&self.inner.listeners).subscribe(Rc::new(callback))
	}

	/// Generates a path for a named route.
	///
	/// # Errors
	///
	/// See [`RouteTable::reverse`].
	pub fn reverse(&self, name: &str, params: &[(&str, &str)]) -> Result<String, RouterError> {
		self.inner.table.reverse(name, params)
	}

	fn resolve_redirects(&self, mut location: Location) -> Location {
		for _ in 0..MAX_REDIRECTS {
			let route_match = self.inner.table.match_path(location.pathname());
			let Some(to) = route_match.route().redirect_target() else {
				return location;
			};

			match location.resolve(to) {
				Ok(next) => {
					let next = if next.search().is_empty() {
						next.with_search(location.search())
					} else {
						next
					};
					tracing::debug!(from = %location, to = %next, "following route redirect");
					location = next;
				}
				Err(err) => {
					tracing::warn!(error = %err, "route redirect target is not a local location");
					return location;
				}
			}
		}

		tracing::warn!(location = %location, limit = MAX_REDIRECTS, "redirect limit reached");
		location
	}

	fn commit(&self, next: Location, kind: NavigationKind) -> Navigation {
		let previous = {
			let mut current = self.inner.current.borrow_mut();
			if *current == next {
				tracing::trace!(location = %next, "navigation to current location ignored");
				return Navigation::Unchanged;
			}
			std::mem::replace(&mut *current, next.clone())
		};

		match kind {
			NavigationKind::Push => self.inner.history.push(&next),
			NavigationKind::Replace => self.inner.history.replace(&next),
			NavigationKind::Pop => {}
		}

		let generation = self.inner.generation.get() + 1;
		self.inner.generation.set(generation);

		tracing::debug!(from = %previous, to = %next, kind = ?kind, "navigated");

		let completed = self.notify::<Url>(generation, &next, &previous);
		if completed && next.pathname() != previous.pathname() {
			self.notify::<ActivePath>(generation, &next, &previous);
		}

		Navigation::Committed {
			from: previous,
			to: next,
		}
	}

	/// Notifies the listeners of `F` until a listener commits another
	/// location. The nested commit has already notified every listener with
	/// the newer location, so the rest of this round is stale.
	fn notify<F: RouterField>(
		&self,
		generation: u64,
		next: &Location,
		previous: &Location,
	) -> bool {
		let (new, old) = (F::project(next), F::project(previous));
		let completed = F::listeners(&self.inner.listeners).for_each_while(
			|| self.inner.generation.get() == generation,
			|callback| callback(&new, &old),
		);
		if !completed {
			tracing::trace!(field = F::NAME, location = %next, "superseded notification round ended");
		}
		completed
	}
}

#[cfg(target_arch = "wasm32")]
fn default_history() -> Rc<dyn HistoryBackend> {
	Rc::new(super::browser::BrowserHistory)
}

#[cfg(not(target_arch = "wasm32"))]
fn default_history() -> Rc<dyn HistoryBackend> {
	Rc::new(super::history::MemoryHistory::default())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::router::history::MemoryHistory;
	use std::cell::Cell;
	use rstest::{fixture, rstest};

	#[fixture]
	fn router() -> Router {
		let table = RouteTable::builder()
			.component("/", "landing-page")
			.component("/why-appflow", "why-appflow-page")
			.component("/blog/:slug", "blog-post")
			.redirect("/appflow", "/why-appflow")
			.build()
			.unwrap();
		Router::new(table)
	}

	fn counter(router: &Router) -> (Rc<Cell<usize>>, Subscription) {
		let count = Rc::new(Cell::new(0));
		let sub = router.on_change(Url, {
			let count = Rc::clone(&count);
			move |_, _| count.set(count.get() + 1)
		});
		(count, sub)
	}

	#[rstest]
	fn test_router_starts_at_root(router: Router) {
		assert_eq!(router.current(), Location::root());
		assert_eq!(router.current_match().route().component_tag(), Some("landing-page"));
	}

	#[rstest]
	fn test_router_push_updates_current(router: Router) {
		let navigation = router.push("/why-appflow").unwrap();

		assert!(navigation.is_committed());
		assert_eq!(router.current().pathname(), "/why-appflow");
		assert_eq!(
			router.current_match().route().component_tag(),
			Some("why-appflow-page")
		);
	}

	#[rstest]
	fn test_router_on_change_receives_new_and_old(router: Router) {
		let seen = Rc::new(RefCell::new(Vec::new()));
		let _sub = router.on_change(Url, {
			let seen = Rc::clone(&seen);
			move |new: &Location, old: &Location| {
				seen.borrow_mut().push((new.href(), old.href()))
			}
		});

		router.push("/why-appflow").unwrap();

		assert_eq!(
			*seen.borrow(),
			vec![("/why-appflow".to_string(), "/".to_string())]
		);
	}

	#[rstest]
	fn test_router_duplicate_navigation_is_silent(router: Router) {
		let (count, _sub) = counter(&router);

		router.push("/why-appflow").unwrap();
		let second = router.push("/why-appflow").unwrap();
		let replaced = router.replace("/why-appflow").unwrap();

		assert_eq!(second, Navigation::Unchanged);
		assert_eq!(replaced, Navigation::Unchanged);
		assert_eq!(count.get(), 1);
	}

	#[rstest]
	fn test_router_search_change_notifies_url_only(router: Router) {
		let (url_count, _url) = counter(&router);
		let path_count = Rc::new(Cell::new(0));
		let _path = router.on_change(ActivePath, {
			let path_count = Rc::clone(&path_count);
			move |_, _| path_count.set(path_count.get() + 1)
		});

		router.push("/why-appflow").unwrap();
		router.push("/why-appflow?utm_source=blog").unwrap();

		assert_eq!(url_count.get(), 2);
		assert_eq!(path_count.get(), 1);
	}

	#[rstest]
	fn test_router_listeners_fire_in_registration_order(router: Router) {
		let log = Rc::new(RefCell::new(Vec::new()));
		let subs: Vec<Subscription> = (0..5)
			.map(|i| {
				let log = Rc::clone(&log);
				router.on_change(Url, move |_, _| log.borrow_mut().push(i))
			})
			.collect();

		router.push("/why-appflow").unwrap();
		router.push("/").unwrap();

		assert_eq!(*log.borrow(), vec![0, 1, 2, 3, 4, 0, 1, 2, 3, 4]);
		drop(subs);
	}

	#[rstest]
	fn test_router_url_listeners_run_before_active_path(router: Router) {
		let log = Rc::new(RefCell::new(Vec::new()));
		let _path = router.on_change(ActivePath, {
			let log = Rc::clone(&log);
			move |new: &String, _: &String| log.borrow_mut().push(format!("path {new}"))
		});
		let _url = router.on_change(Url, {
			let log = Rc::clone(&log);
			move |new: &Location, _: &Location| log.borrow_mut().push(format!("url {new}"))
		});

		router.push("/why-appflow").unwrap();

		assert_eq!(
			*log.borrow(),
			vec!["url /why-appflow".to_string(), "path /why-appflow".to_string()]
		);
	}

	#[rstest]
	fn test_router_listener_reads_updated_state(router: Router) {
		let seen = Rc::new(RefCell::new(None));
		let _sub = router.on_change(Url, {
			let router = router.clone();
			let seen = Rc::clone(&seen);
			move |_, _| {
				let tag = router
					.current_match()
					.route()
					.component_tag()
					.map(str::to_string);
				*seen.borrow_mut() = tag;
			}
		});

		router.push("/why-appflow").unwrap();

		assert_eq!(seen.borrow().as_deref(), Some("why-appflow-page"));
	}

	#[rstest]
	fn test_router_not_found_is_not_an_error(router: Router) {
		let (count, _sub) = counter(&router);

		let navigation = router.push("/does-not-exist").unwrap();

		assert!(navigation.is_committed());
		assert!(router.current_match().is_fallback());
		assert_eq!(count.get(), 1);
	}

	#[rstest]
	fn test_router_rejects_external_href(router: Router) {
		let (count, _sub) = counter(&router);

		let result = router.push("https://ionic.io/");

		assert!(matches!(result, Err(RouterError::ExternalLocation(_))));
		assert_eq!(router.current(), Location::root());
		assert_eq!(count.get(), 0);
	}

	#[rstest]
	fn test_router_follows_redirect(router: Router) {
		let seen = Rc::new(RefCell::new(Vec::new()));
		let _sub = router.on_change(Url, {
			let seen = Rc::clone(&seen);
			move |new: &Location, _: &Location| seen.borrow_mut().push(new.href())
		});

		router.push("/appflow?ref=nav").unwrap();

		assert_eq!(router.current().href(), "/why-appflow?ref=nav");
		assert_eq!(*seen.borrow(), vec!["/why-appflow?ref=nav".to_string()]);
	}

	#[rstest]
	fn test_router_redirect_loop_stops() {
		let table = RouteTable::builder()
			.redirect("/a", "/b")
			.redirect("/b", "/a")
			.build()
			.unwrap();
		let router = Router::new(table);

		let navigation = router.push("/a").unwrap();

		assert!(navigation.is_committed());
		assert!(router.current_match().route().redirect_target().is_some());
	}

	#[rstest]
	fn test_router_back_forward_use_same_channel() {
		let history = Rc::new(MemoryHistory::default());
		let router = Router::with_history(
			RouteTable::from_entries(RouteTable::default_entries(), "not-found").unwrap(),
			history.clone(),
		);
		let log = Rc::new(RefCell::new(Vec::new()));
		let _sub = router.on_change(Url, {
			let log = Rc::clone(&log);
			move |new: &Location, old: &Location| {
				log.borrow_mut().push(format!("{old} -> {new}"))
			}
		});

		router.push("/why-appflow").unwrap();
		assert!(router.back().is_committed());
		assert!(router.forward().is_committed());
		assert_eq!(router.forward(), Navigation::Unchanged);

		assert_eq!(
			*log.borrow(),
			vec![
				"/ -> /why-appflow".to_string(),
				"/why-appflow -> /".to_string(),
				"/ -> /why-appflow".to_string(),
			]
		);
		assert_eq!(history.len(), 2);
		assert_eq!(history.index(), 1);
	}

	#[rstest]
	fn test_router_replace_does_not_grow_history() {
		let history = Rc::new(MemoryHistory::default());
		let router = Router::with_history(
			RouteTable::from_entries(RouteTable::default_entries(), "not-found").unwrap(),
			history.clone(),
		);

		router.replace("/why-appflow").unwrap();

		assert_eq!(history.entries(), vec![router.current()]);
	}

	#[rstest]
	fn test_router_initial_redirect_replaces_entry() {
		let history = Rc::new(MemoryHistory::new(Location::parse("/appflow").unwrap()));
		let table = RouteTable::builder()
			.component("/why-appflow", "why-appflow-page")
			.redirect("/appflow", "/why-appflow")
			.build()
			.unwrap();

		let router = Router::with_history(table, history.clone());

		assert_eq!(router.current().pathname(), "/why-appflow");
		assert_eq!(history.entries(), vec![router.current()]);
	}

	#[rstest]
	fn test_router_nested_navigation_from_listener(router: Router) {
		let _redirect = router.on_change(Url, {
			let router = router.clone();
			move |new: &Location, _: &Location| {
				if new.pathname() == "/blog/legacy" {
					router.replace("/why-appflow").unwrap();
				}
			}
		});

		router.push("/blog/legacy").unwrap();

		assert_eq!(router.current().pathname(), "/why-appflow");
	}

	#[rstest]
	fn test_router_nested_navigation_leaves_later_listeners_current(router: Router) {
		let _redirect = router.on_change(Url, {
			let router = router.clone();
			move |new: &Location, _: &Location| {
				if new.pathname() == "/blog/legacy" {
					router.replace("/why-appflow").unwrap();
				}
			}
		});
		let urls = Rc::new(RefCell::new(Vec::new()));
		let _urls = router.on_change(Url, {
			let urls = Rc::clone(&urls);
			move |new: &Location, _: &Location| urls.borrow_mut().push(new.pathname().to_string())
		});
		let paths = Rc::new(RefCell::new(Vec::new()));
		let _paths = router.on_change(ActivePath, {
			let paths = Rc::clone(&paths);
			move |new: &String, _: &String| paths.borrow_mut().push(new.clone())
		});

		router.push("/blog/legacy").unwrap();

		let current = router.current().pathname().to_string();
		assert_eq!(current, "/why-appflow");
		assert_eq!(*urls.borrow(), vec!["/why-appflow".to_string()]);
		assert_eq!(*paths.borrow(), vec!["/why-appflow".to_string()]);
		assert_eq!(urls.borrow().last(), Some(&current));
		assert_eq!(paths.borrow().last(), Some(&current));
	}

	#[rstest]
	fn test_router_nested_navigation_reports_from_superseded(router: Router) {
		let _redirect = router.on_change(Url, {
			let router = router.clone();
			move |new: &Location, _: &Location| {
				if new.pathname() == "/appflow-legacy" {
					router.push("/").unwrap();
				}
			}
		});
		let seen = Rc::new(RefCell::new(Vec::new()));
		let _seen = router.on_change(Url, {
			let seen = Rc::clone(&seen);
			move |new: &Location, old: &Location| {
				seen.borrow_mut()
					.push((new.pathname().to_string(), old.pathname().to_string()))
			}
		});

		router.push("/why-appflow").unwrap();
		router.push("/appflow-legacy").unwrap();

		assert_eq!(router.current().pathname(), "/");
		assert_eq!(
			*seen.borrow(),
			vec![
				("/why-appflow".to_string(), "/".to_string()),
				("/".to_string(), "/appflow-legacy".to_string()),
			]
		);
	}

	#[rstest]
	fn test_router_unsubscribed_listener_not_called(router: Router) {
		let (count, sub) = counter(&router);
		sub.unsubscribe();

		router.push("/why-appflow").unwrap();

		assert_eq!(count.get(), 0);
	}

	#[rstest]
	fn test_router_relative_navigation(router: Router) {
		router.push("/blog/first-post").unwrap();
		router.push("second-post").unwrap();

		assert_eq!(router.current().pathname(), "/blog/second-post");
		assert_eq!(router.current_match().param("slug"), Some("second-post"));
	}

	#[rstest]
	fn test_router_error_display() {
		assert_eq!(
			RouterError::InvalidRouteName("test".to_string()).to_string(),
			"Invalid route name: test"
		);
		assert_eq!(
			RouterError::ExternalLocation("https://ionic.io".to_string()).to_string(),
			"External location: https://ionic.io"
		);
	}
}
