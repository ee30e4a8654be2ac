//! Document title.
//!
//! [`DocumentTitle`] keeps the page title in step with the current route:
//! the route's `title` when it has one, the site title otherwise.

use crate::router::{Location, RouteTable, Router, Url};
use crate::subscription::Subscription;

/// Where the document title is written.
pub trait TitleTarget {
	fn set_title(&self, title: &str);
}

impl<F: Fn(&str)> TitleTarget for F {
	fn set_title(&self, title: &str) {
		self(title)
	}
}

/// Writes `document.title`.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserTitle;

#[cfg(target_arch = "wasm32")]
impl TitleTarget for BrowserTitle {
	fn set_title(&self, title: &str) {
		match web_sys::window().and_then(|window| window.document()) {
			Some(document) => document.set_title(title),
			None => tracing::warn!("no document, title not set"),
		}
	}
}

/// Returns the title for `location`.
///
/// Redirect routes resolve to the fallback, like the outlet does.
pub fn title_for<'a>(table: &'a RouteTable, location: &Location, site_title: &'a str) -> &'a str {
	let route_match = table.match_path(location.pathname());
	let route = match route_match.route().redirect_target() {
		Some(_) => table.fallback(),
		None => route_match.route(),
	};
	route.title().unwrap_or(site_title)
}

/// Updates the document title on every URL change.
#[derive(Debug)]
#[must_use = "dropping DocumentTitle stops title updates"]
pub struct DocumentTitle {
	subscription: Subscription,
}

impl DocumentTitle {
	/// Sets the title for the current location, then after every committed
	/// navigation.
	pub fn install<T: TitleTarget + 'static>(
		router: &Router,
		site_title: impl Into<String>,
		target: T,
	) -> Self {
		let table = router.route_table();
		let site_title = site_title.into();

		target.set_title(title_for(&table, &router.current(), &site_title));

		let subscription = router.on_change(Url, move |new: &Location, _old: &Location| {
			let title = title_for(&table, new, &site_title);
			tracing::trace!(location = %new, title, "document title updated");
			target.set_title(title);
		});

		Self { subscription }
	}

	/// Returns whether titles are still updated.
	pub fn is_installed(&self) -> bool {
		self.subscription.is_active()
	}
}
