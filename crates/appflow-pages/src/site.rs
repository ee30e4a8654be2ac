//! Application start wiring.
//!
//! [`SiteBuilder`] creates the router and the page store, installs the
//! navigation analytics glue, the document title and the outlet, in that
//! order. On every navigation the page view is reported and the theme reset
//! before the new page renders.

use std::rc::Rc;

use crate::analytics::{AnalyticsSink, NoopSink};
use crate::glue::NavigationAnalytics;
use crate::lifecycle::{Attach, Mounted, PageContext};
use crate::outlet::{Outlet, PageRenderer};
use crate::router::{HistoryBackend, RouteTable, Router};
use crate::store::{PageState, PageStore, StoreError};
use crate::title::{DocumentTitle, TitleTarget};

/// A running site: router, page store and the listeners wired at start.
pub struct Site {
	router: Router,
	store: PageStore,
	analytics: NavigationAnalytics,
	reporting: bool,
	title: Option<DocumentTitle>,
	outlet: Outlet,
	#[cfg(target_arch = "wasm32")]
	_popstate: Option<crate::router::PopStateListener>,
}

impl Site {
	/// Starts building a site on `table`.
	pub fn builder(table: RouteTable) -> SiteBuilder {
		SiteBuilder::new(table)
	}

	/// Returns the router.
	pub fn router(&self) -> &Router {
		&self.router
	}

	/// Returns the page store.
	pub fn store(&self) -> &PageStore {
		&self.store
	}

	/// Returns the handles components attach to.
	pub fn context(&self) -> PageContext {
		PageContext::new(self.router.clone(), self.store.clone())
	}

	/// Mounts a component on this site.
	pub fn mount<C: Attach>(&self, component: C) -> Mounted<C> {
		Mounted::mount(component, &self.context())
	}

	/// Returns whether page views go to a configured sink.
	pub fn analytics_enabled(&self) -> bool {
		self.reporting && self.analytics.is_installed()
	}

	/// Returns whether the document title follows navigation.
	pub fn updates_title(&self) -> bool {
		self.title.as_ref().is_some_and(DocumentTitle::is_installed)
	}

	/// Returns whether the outlet is rendering.
	pub fn is_rendering(&self) -> bool {
		self.outlet.is_mounted()
	}
}

impl std::fmt::Debug for Site {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Site")
			.field("router", &self.router)
			.field("store", &self.store)
			.field("analytics", &self.reporting)
			.finish_non_exhaustive()
	}
}

/// Builder for [`Site`].
pub struct SiteBuilder {
	table: RouteTable,
	history: Option<Rc<dyn HistoryBackend>>,
	defaults: PageState,
	sink: Option<Box<dyn AnalyticsSink>>,
	title: Option<Box<dyn FnOnce(&Router) -> DocumentTitle>>,
}

impl SiteBuilder {
	fn new(table: RouteTable) -> Self {
		Self {
			table,
			history: None,
			defaults: PageState::default(),
			sink: None,
			title: None,
		}
	}

	/// Uses `history` instead of the platform default.
	pub fn history(mut self, history: Rc<dyn HistoryBackend>) -> Self {
		self.history = Some(history);
		self
	}

	/// Sets the page store defaults.
	pub fn page_defaults(mut self, defaults: PageState) -> Self {
		self.defaults = defaults;
		self
	}

	/// Reports page views to `sink`.
	///
	/// Without a sink page views are discarded. The page theme is reset on
	/// every navigation either way.
	pub fn analytics<S: AnalyticsSink + 'static>(mut self, sink: S) -> Self {
		self.sink = Some(Box::new(sink));
		self
	}

	/// Writes the page title to `target` on navigation.
	///
	/// Routes without a title use `site_title`.
	pub fn document_title<T: TitleTarget + 'static>(
		mut self,
		site_title: impl Into<String>,
		target: T,
	) -> Self {
		let site_title = site_title.into();
		self.title = Some(Box::new(move |router: &Router| {
			DocumentTitle::install(router, site_title, target)
		}));
		self
	}

	/// Wires the site and renders the current page with `renderer`.
	///
	/// # Errors
	///
	/// Returns [`StoreError::WriterAlreadyClaimed`] if the page theme writer
	/// cannot be claimed.
	pub fn build<R: PageRenderer + 'static>(self, renderer: R) -> Result<Site, StoreError> {
		let router = match self.history {
			Some(history) => Router::with_history(self.table, history),
			None => Router::new(self.table),
		};
		let store = PageStore::with_defaults(self.defaults);

		let reporting = self.sink.is_some();
		let sink = self
			.sink
			.unwrap_or_else(|| Box::new(NoopSink) as Box<dyn AnalyticsSink>);
		let analytics = NavigationAnalytics::install(&router, &store, sink)?;
		let title = self.title.map(|install| install(&router));
		let outlet = Outlet::mount(&router, renderer);

		#[cfg(target_arch = "wasm32")]
		let _popstate = crate::router::PopStateListener::attach(&router);

		tracing::debug!(
			routes = router.routes().len(),
			analytics = reporting,
			location = %router.current(),
			"site started"
		);

		Ok(Site {
			router,
			store,
			analytics,
			reporting,
			title,
			outlet,
			#[cfg(target_arch = "wasm32")]
			_popstate,
		})
	}
}

impl std::fmt::Debug for SiteBuilder {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SiteBuilder")
			.field("table", &self.table)
			.field("defaults", &self.defaults)
			.field("analytics", &self.sink.is_some())
			.field("document_title", &self.title.is_some())
			.finish_non_exhaustive()
	}
}
