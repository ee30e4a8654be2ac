//! Route outlet.
//!
//! The [`Outlet`] is the router subscriber that renders the page for the
//! current location. Rendering itself is delegated to a [`PageRenderer`];
//! the outlet passes only the static [`Route`], components that need path
//! parameters read them from the [`Router`].

use std::rc::Rc;

use crate::router::{Location, Route, RouteTable, Router, Url};
use crate::subscription::Subscription;

/// Renders the page for a matched route.
pub trait PageRenderer {
	/// Replaces the displayed page with the one for `route`.
	fn render(&self, route: &Route);
}

impl<F: Fn(&Route)> PageRenderer for F {
	fn render(&self, route: &Route) {
		self(route)
	}
}

/// Renders the matched route on every URL change.
///
/// Unmounted when dropped.
#[derive(Debug)]
#[must_use = "dropping an Outlet unmounts it"]
pub struct Outlet {
	subscription: Subscription,
}

impl Outlet {
	/// Renders the current page, then re-renders after every committed
	/// navigation.
	///
	/// The outlet runs after every `Url` listener registered before it.
	pub fn mount<R: PageRenderer + 'static>(router: &Router, renderer: R) -> Self {
		let table = router.route_table();
		let renderer = Rc::new(renderer);

		render_location(&table, &*renderer, &router.current());

		let subscription = router.on_change(Url, move |new: &Location, _old: &Location| {
			render_location(&table, &*renderer, new);
		});

		Self { subscription }
	}

	/// Returns whether the outlet still renders on navigation.
	pub fn is_mounted(&self) -> bool {
		self.subscription.is_active()
	}

	/// Stops rendering.
	pub fn unmount(self) {
		self.subscription.unsubscribe();
	}
}

fn render_location<R: PageRenderer + ?Sized>(table: &RouteTable, renderer: &R, location: &Location) {
	let route_match = table.match_path(location.pathname());
	let route = match route_match.route().redirect_target() {
		Some(_) => table.fallback(),
		None => route_match.route(),
	};

	tracing::debug!(
		location = %location,
		component = route.component_tag().unwrap_or_default(),
		fallback = route_match.is_fallback(),
		"rendering page"
	);
	renderer.render(route);
}
