//! Routing, page state and navigation analytics
//!
//! This module provides access to appflow-pages.
//!
//! ## Architecture
//!
//! - **Router**: owns the current location, History API or in-memory history
//! - **PageStore**: fixed-schema observable UI flags (theme, scroll, menu)
//! - **Glue**: page view report and theme reset on every distinct navigation
//! - **Outlet**: renders the matched route through a `PageRenderer`
//!
//! ## Example
//!
//! ```rust,ignore
//! use appflow::pages::{Link, LinkClick, RouteTable, Site, TracingSink};
//!
//! let table = RouteTable::from_entries(RouteTable::default_entries(), "not-found")?;
//! let site = Site::builder(table).analytics(TracingSink).build(render_page)?;
//!
//! Link::new("/why-appflow", "Why Appflow").click(site.router(), LinkClick::primary())?;
//! ```

// Re-export all appflow-pages functionality
pub use appflow_pages::*;
