//! Ordered listener lists and subscription handles.
//!
//! Both the [`Router`](crate::router::Router) and the
//! [`PageStore`](crate::store::PageStore) keep one [`ListenerList`] per
//! observable field. Registering a callback returns a [`Subscription`]; the
//! callback stays registered exactly as long as the handle is alive.
//!
//! ## Notification Order
//!
//! Callbacks fire synchronously in registration order. The list is
//! snapshotted before a notification round starts, so callbacks may freely
//! subscribe, unsubscribe, read or write while being notified:
//!
//! - a callback registered during a round does not see that round;
//! - a callback released during a round is skipped if it has not run yet.

use core::cell::{Cell, RefCell};
use core::fmt;

extern crate alloc;
use alloc::rc::{Rc, Weak};

/// Identifier of a registered callback, unique within one list.
type ListenerId = u64;

/// Type-erased removal, so a [`Subscription`] does not need to know the
/// callback signature of the list it belongs to.
pub(crate) trait Detach {
	fn detach(&self, id: ListenerId);
	fn contains(&self, id: ListenerId) -> bool;
}

/// An ordered list of callbacks of type `F` (usually `dyn Fn(..)`).
#[doc(hidden)]
pub struct ListenerList<F: ?Sized + 'static> {
	next_id: Cell<ListenerId>,
	entries: RefCell<Vec<(ListenerId, Rc<F>)>>,
}

impl<F: ?Sized + 'static> ListenerList<F> {
	pub(crate) fn new() -> Rc<Self> {
		Rc::new(Self {
			next_id: Cell::new(0),
			entries: RefCell::new(Vec::new()),
		})
	}

	/// Appends a callback and returns the handle that owns its registration.
	pub(crate) fn subscribe(self: &Rc<Self>, callback: Rc<F>) -> Subscription {
		let id = self.next_id.get();
		self.next_id.set(id + 1);
		self.entries.borrow_mut().push((id, callback));

		let list: Weak<dyn Detach> = Rc::downgrade(self) as Weak<dyn Detach>;
		Subscription {
			registration: Some((list, id)),
		}
	}

	/// Calls `f` with every callback, in registration order.
	///
	/// No borrow of the list is held while `f` runs.
	pub(crate) fn for_each(&self, mut f: impl FnMut(&F)) {
		let snapshot: Vec<(ListenerId, Rc<F>)> = self
			.entries
			.borrow()
			.iter()
			.map(|(id, cb)| (*id, Rc::clone(cb)))
			.collect();

		for (id, callback) in snapshot {
			if self.contains(id) {
				f(&callback);
			}
		}
	}

	/// Like [`for_each`](Self::for_each), but checks `proceed` before each
	/// callback and ends the round as soon as it returns `false`.
	///
	/// Returns whether the round ran to completion.
	pub(crate) fn for_each_while(
		&self,
		mut proceed: impl FnMut() -> bool,
		mut f: impl FnMut(&F),
	) -> bool {
		let mut completed = true;
		self.for_each(|callback| {
			if completed && !proceed() {
				completed = false;
			}
			if completed {
				f(callback);
			}
		});
		completed
	}

	pub(crate) fn len(&self) -> usize {
		self.entries.borrow().len()
	}
}

impl<F: ?Sized + 'static> Detach for ListenerList<F> {
	fn detach(&self, id: ListenerId) {
		// Take the removed callback out of the borrow before dropping it: its
		// captures may own other subscriptions on this same list.
		let removed = {
			let mut entries = self.entries.borrow_mut();
			entries
				.iter()
				.position(|(entry_id, _)| *entry_id == id)
				.map(|index| entries.remove(index))
		};
		drop(removed);
	}

	fn contains(&self, id: ListenerId) -> bool {
		self.entries
			.borrow()
			.iter()
			.any(|(entry_id, _)| *entry_id == id)
	}
}

/// Handle owning one registered callback.
///
/// Dropping the handle (or calling [`Subscription::unsubscribe`]) removes the
/// callback; after that it is never invoked again, even if a notification
/// round is in progress.
///
/// # Example
///
/// ```ignore
/// use appflow_pages::store::{PageStore, Scrolled};
///
/// let store = PageStore::new();
/// let subscription = store.subscribe(Scrolled, |new, _old| println!("scrolled: {new}"));
/// store.set(Scrolled, true); // prints
/// subscription.unsubscribe();
/// store.set(Scrolled, false); // silent
/// ```
#[must_use = "dropping a Subscription immediately releases the callback"]
pub struct Subscription {
	registration: Option<(Weak<dyn Detach>, ListenerId)>,
}

impl Subscription {
	/// Releases the callback now.
	pub fn unsubscribe(mut self) {
		self.release();
	}

	/// Returns whether the callback is still registered.
	///
	/// A subscription also becomes inactive when its router or store has been
	/// dropped.
	pub fn is_active(&self) -> bool {
		match &self.registration {
			Some((list, id)) => list.upgrade().is_some_and(|list| list.contains(*id)),
			None => false,
		}
	}

	fn release(&mut self) {
		if let Some((list, id)) = self.registration.take()
			&& let Some(list) = list.upgrade()
		{
			list.detach(id);
		}
	}
}

impl Drop for Subscription {
	fn drop(&mut self) {
		self.release();
	}
}

impl fmt::Debug for Subscription {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Subscription")
			.field("active", &self.is_active())
			.finish()
	}
}
