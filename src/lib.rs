//! # Appflow
//!
//! Routing and page-state core of the Appflow marketing and blog site.
//!
//! The site is a single page application. Three pieces cooperate on every
//! navigation:
//!
//! - a [`Router`] that maps URL paths to page components and owns the one
//!   current location,
//! - a [`PageStore`] holding the UI flags unrelated components share,
//! - the navigation glue that reports a page view and resets the page theme
//!   before the new page renders.
//!
//! ## Crates
//!
//! - [`pages`]: router, page store, glue, outlet (`appflow-pages`)
//! - [`conf`]: layered site settings (`appflow-conf`)
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use appflow::prelude::*;
//!
//! let settings = SiteSettings::load("appflow.toml")?;
//! let site = appflow::build_site(&settings, render_page, TracingSink)?;
//!
//! site.router().push("/why-appflow")?;
//! ```

pub mod conf;
pub mod pages;

use std::path::Path;

pub use appflow_conf::{SettingsError, SiteSettings};
pub use appflow_conf::settings::validation::ValidationError;
pub use appflow_pages::{
	AnalyticsSink, Location, NoopSink, PageRenderer, PageStore, Router, Site, StoreError,
	TracingSink,
};

/// Error returned while starting the site.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
	/// Settings could not be loaded.
	#[error(transparent)]
	Settings(#[from] SettingsError),
	/// The configured route table is invalid.
	#[error(transparent)]
	Routes(#[from] ValidationError),
	/// The page store rejected the wiring.
	#[error("failed to wire the page store: {0}")]
	Store(#[from] StoreError),
}

/// Builds a running site from `settings`.
///
/// Page views go to `sink` when analytics are enabled; otherwise they are
/// discarded. The page theme is reset on every navigation either way. In the
/// browser the document title follows the current route.
///
/// # Errors
///
/// Returns [`BuildError::Routes`] for an invalid route table.
pub fn build_site<R, S>(settings: &SiteSettings, renderer: R, sink: S) -> Result<Site, BuildError>
where
	R: PageRenderer + 'static,
	S: AnalyticsSink + 'static,
{
	let table = settings.route_table()?;
	let builder = Site::builder(table).page_defaults(settings.page_defaults());

	#[cfg(target_arch = "wasm32")]
	let builder =
		builder.document_title(settings.page.site_title.clone(), appflow_pages::BrowserTitle);

	let builder = if settings.analytics.enabled {
		builder.analytics(sink)
	} else {
		tracing::info!("analytics disabled, page views are discarded");
		builder
	};

	Ok(builder.build(renderer)?)
}

/// Loads settings from `path` (plus environment overrides) and builds the
/// site.
///
/// # Errors
///
/// Returns [`BuildError::Settings`] when the settings cannot be loaded.
pub fn load_site<R, S>(path: impl AsRef<Path>, renderer: R, sink: S) -> Result<Site, BuildError>
where
	R: PageRenderer + 'static,
	S: AnalyticsSink + 'static,
{
	let settings = SiteSettings::load(path)?;
	build_site(&settings, renderer, sink)
}

/// Commonly used types.
pub mod prelude {
	pub use crate::{BuildError, build_site, load_site};

	pub use appflow_conf::{SettingsError, SiteSettings};
	pub use appflow_pages::{
		ActivePath, AnalyticsSink, Attach, Link, LinkClick, Location, Mounted, NavigateOptions,
		NavOpen, PageContext, PageRenderer, PageStore, PageTheme, Route, RouteTable, Router,
		Scrolled, Site, Subscription, Subscriptions, Theme, TracingSink, Url,
	};
}
