//! Component lifecycle.
//!
//! Components that observe the router or the page store implement
//! [`Attach`]. Their subscriptions go into a [`Subscriptions`] bag owned by
//! the [`Mounted`] guard, so every callback is released when the component
//! goes away.
//!
//! ```ignore
//! struct Header { scrolled: Rc<Cell<bool>> }
//!
//! impl Attach for Header {
//!     fn attach(&mut self, cx: &PageContext, subs: &mut Subscriptions) {
//!         let scrolled = Rc::clone(&self.scrolled);
//!         subs.push(cx.store.subscribe(Scrolled, move |new, _| scrolled.set(*new)));
//!     }
//! }
//!
//! let header = Mounted::mount(Header::default(), &site.context());
//! ```

use crate::router::Router;
use crate::store::PageStore;
use crate::subscription::Subscription;

/// The shared handles handed to components on attach.
#[derive(Debug, Clone)]
pub struct PageContext {
	/// The site router.
	pub router: Router,
	/// The site page store.
	pub store: PageStore,
}

impl PageContext {
	/// Creates a context.
	pub fn new(router: Router, store: PageStore) -> Self {
		Self { router, store }
	}
}

/// A component with a mount/unmount lifecycle.
pub trait Attach {
	/// Registers the component's callbacks.
	fn attach(&mut self, cx: &PageContext, subscriptions: &mut Subscriptions);

	/// Called after the component's subscriptions were released.
	fn detach(&mut self) {}
}

/// A bag of subscriptions released together.
#[derive(Debug, Default)]
pub struct Subscriptions {
	handles: Vec<Subscription>,
}

impl Subscriptions {
	/// Creates an empty bag.
	pub fn new() -> Self {
		Self::default()
	}

	/// Takes ownership of `subscription`.
	pub fn push(&mut self, subscription: Subscription) {
		self.handles.push(subscription);
	}

	/// Returns the number of held subscriptions.
	pub fn len(&self) -> usize {
		self.handles.len()
	}

	/// Returns whether the bag is empty.
	pub fn is_empty(&self) -> bool {
		self.handles.is_empty()
	}

	/// Releases every held subscription.
	pub fn clear(&mut self) {
		self.handles.clear();
	}
}

impl Extend<Subscription> for Subscriptions {
	fn extend<I: IntoIterator<Item = Subscription>>(&mut self, iter: I) {
		self.handles.extend(iter);
	}
}

/// A mounted component.
///
/// Dropping the guard releases the component's subscriptions, then calls
/// [`Attach::detach`].
#[derive(Debug)]
#[must_use = "dropping Mounted unmounts the component"]
pub struct Mounted<C: Attach> {
	component: C,
	subscriptions: Subscriptions,
}

impl<C: Attach> Mounted<C> {
	/// Attaches `component` to `cx`.
	pub fn mount(mut component: C, cx: &PageContext) -> Self {
		let mut subscriptions = Subscriptions::new();
		component.attach(cx, &mut subscriptions);
		tracing::trace!(subscriptions = subscriptions.len(), "component mounted");
		Self {
			component,
			subscriptions,
		}
	}

	/// Returns the component.
	pub fn component(&self) -> &C {
		&self.component
	}

	/// Returns the number of live subscriptions.
	pub fn subscription_count(&self) -> usize {
		self.subscriptions.len()
	}
}

impl<C: Attach> Drop for Mounted<C> {
	fn drop(&mut self) {
		self.subscriptions.clear();
		self.component.detach();
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::router::{RouteTable, Url};
	use crate::store::{NavOpen, Scrolled};
	use std::cell::Cell;
	use std::rc::Rc;
	use rstest::{fixture, rstest};

	#[fixture]
	fn cx() -> PageContext {
		PageContext::new(
			Router::new(RouteTable::from_entries(RouteTable::default_entries(), "not-found").unwrap()),
			PageStore::new(),
		)
	}

	#[derive(Default)]
	struct Header {
		scrolled: Rc<Cell<bool>>,
		navigations: Rc<Cell<usize>>,
		detached: Rc<Cell<bool>>,
	}

	impl Attach for Header {
		fn attach(&mut self, cx: &PageContext, subscriptions: &mut Subscriptions) {
			let scrolled = Rc::clone(&self.scrolled);
			subscriptions.push(cx.store.subscribe(Scrolled, move |new, _| scrolled.set(*new)));

			let navigations = Rc::clone(&self.navigations);
			let store = cx.store.clone();
			subscriptions.push(cx.router.on_change(Url, move |_, _| {
				navigations.set(navigations.get() + 1);
				store.set(NavOpen, false);
			}));
		}

		fn detach(&mut self) {
			self.detached.set(true);
		}
	}

	#[rstest]
	fn test_mounted_component_observes(cx: PageContext) {
		let header = Mounted::mount(Header::default(), &cx);
		cx.store.set(NavOpen, true);

		cx.store.set(Scrolled, true);
		cx.router.push("/why-appflow").unwrap();

		assert!(header.component().scrolled.get());
		assert_eq!(header.component().navigations.get(), 1);
		assert!(!cx.store.get(NavOpen));
		assert_eq!(header.subscription_count(), 2);
	}

	#[rstest]
	fn test_drop_releases_subscriptions(cx: PageContext) {
		let component = Header::default();
		let navigations = Rc::clone(&component.navigations);
		let detached = Rc::clone(&component.detached);

		let header = Mounted::mount(component, &cx);
		assert_eq!(cx.store.subscriber_count(Scrolled), 1);
		drop(header);

		cx.router.push("/why-appflow").unwrap();
		assert_eq!(navigations.get(), 0);
		assert_eq!(cx.store.subscriber_count(Scrolled), 0);
		assert!(detached.get());
	}

	#[rstest]
	fn test_subscriptions_bag(cx: PageContext) {
		let mut bag = Subscriptions::new();
		bag.extend([
			cx.store.subscribe(Scrolled, |_, _| {}),
			cx.store.subscribe(NavOpen, |_, _| {}),
		]);
		assert_eq!(bag.len(), 2);

		bag.clear();

		assert!(bag.is_empty());
		assert_eq!(cx.store.subscriber_count(Scrolled), 0);
	}
}
