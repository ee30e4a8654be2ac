//! Appflow Pages - routing and page state for the Appflow marketing site
//!
//! The site is a single page application: one [`Router`] owns the current
//! URL, one [`PageStore`] holds the UI flags shared between unrelated
//! components, and a small piece of glue reports a page view and resets the
//! page theme on every distinct navigation.
//!
//! ## Architecture
//!
//! - [`subscription`]: ordered listener lists and [`Subscription`] handles
//! - [`store`]: the fixed-schema, observable [`PageStore`]
//! - [`router`]: locations, route table, history backends and the [`Router`]
//! - [`analytics`]: the [`AnalyticsSink`] boundary
//! - [`glue`]: navigation → page view → theme reset
//! - [`outlet`]: renders the matched route through a [`PageRenderer`]
//! - [`title`]: keeps the document title in step with the route
//! - [`lifecycle`]: attach/detach for components holding subscriptions
//! - [`site`]: start-up wiring that fixes listener order
//!
//! ## Notification Guarantees
//!
//! - Callbacks run synchronously, in registration order, before the
//!   navigating or writing call returns.
//! - Navigating to the current `(pathname, search)` notifies nobody.
//! - Writing a store field's current value notifies nobody.
//!
//! ## Example
//!
//! ```ignore
//! use appflow_pages::{RouteTable, Site, TracingSink};
//!
//! let table = RouteTable::from_entries(RouteTable::default_entries(), "not-found")?;
//! let site = Site::builder(table)
//!     .analytics(TracingSink)
//!     .build(|route: &Route| mount_page(route.component_tag()))?;
//!
//! site.router().push("/why-appflow")?;
//! ```

pub mod analytics;
pub mod glue;
pub mod lifecycle;
pub mod outlet;
pub mod router;
pub mod site;
pub mod store;
pub mod subscription;
pub mod title;

// Test doubles (crate tests, or downstream with the `testing` feature)
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use analytics::{AnalyticsError, AnalyticsSink, NoopSink, TracingSink};
pub use glue::NavigationAnalytics;
pub use lifecycle::{Attach, Mounted, PageContext, Subscriptions};
pub use outlet::{Outlet, PageRenderer};
pub use router::{
	ActivePath, HistoryBackend, HistoryMode, Link, LinkClick, LinkOutcome, Location,
	MemoryHistory, NavigateOptions, Navigation, Route, RouteEntry, RouteMatch, RouteTable, Router,
	RouterError, Url,
};
pub use site::{Site, SiteBuilder};
pub use store::{
	BannerVisible, FieldWriter, NavOpen, PageState, PageStore, PageTheme, Scrolled, StoreError,
	StoreField, Theme,
};
pub use subscription::Subscription;
pub use title::{DocumentTitle, TitleTarget};
#[cfg(target_arch = "wasm32")]
pub use title::BrowserTitle;
