//! History backends.
//!
//! The router keeps its own current [`Location`] and mirrors committed
//! navigations into a [`HistoryBackend`]. Back/forward traversal goes the
//! other way: the backend reports where it landed and the router funnels
//! that into the same commit-and-notify path as any other navigation.

use std::cell::{Cell, RefCell};

use super::location::Location;

/// How a navigation affects the history stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryMode {
	/// Create a new history entry.
	#[default]
	Push,
	/// Overwrite the current history entry.
	Replace,
}

/// Result of a history traversal request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Traversal {
	/// The traversal finished synchronously at this location.
	Completed(Location),
	/// The platform will deliver the new location later (`popstate`).
	Pending,
	/// No entry exists at the requested offset.
	OutOfRange,
}

/// Platform history the router writes to.
pub trait HistoryBackend {
	/// Returns the location of the current history entry.
	fn current(&self) -> Location;

	/// Adds an entry after the current one, discarding forward entries.
	fn push(&self, location: &Location);

	/// Overwrites the current entry.
	fn replace(&self, location: &Location);

	/// Moves `delta` entries through the history.
	fn go(&self, delta: isize) -> Traversal;
}

/// In-memory history stack.
///
/// Used on native targets and in tests. Traversal completes synchronously.
#[derive(Debug)]
pub struct MemoryHistory {
	entries: RefCell<Vec<Location>>,
	index: Cell<usize>,
}

impl MemoryHistory {
	/// Creates a history with a single entry.
	pub fn new(initial: Location) -> Self {
		Self {
			entries: RefCell::new(vec![initial]),
			index: Cell::new(0),
		}
	}

	/// Returns all entries, oldest first.
	pub fn entries(&self) -> Vec<Location> {
		self.entries.borrow().clone()
	}

	/// Returns the index of the current entry.
	pub fn index(&self) -> usize {
		self.index.get()
	}

	/// Returns the number of entries.
	pub fn len(&self) -> usize {
		self.entries.borrow().len()
	}

	/// Always `false`: a history has at least one entry.
	pub fn is_empty(&self) -> bool {
		self.entries.borrow().is_empty()
	}
}

impl Default for MemoryHistory {
	fn default() -> Self {
		Self::new(Location::root())
	}
}

impl HistoryBackend for MemoryHistory {
	fn current(&self) -> Location {
		self.entries
			.borrow()
			.get(self.index.get())
			.cloned()
			.unwrap_or_default()
	}

	fn push(&self, location: &Location) {
		let mut entries = self.entries.borrow_mut();
		entries.truncate(self.index.get() + 1);
		entries.push(location.clone());
		self.index.set(entries.len() - 1);
	}

	fn replace(&self, location: &Location) {
		if let Some(entry) = self.entries.borrow_mut().get_mut(self.index.get()) {
			*entry = location.clone();
		}
	}

	fn go(&self, delta: isize) -> Traversal {
		let len = self.len();
		let Some(target) = self.index.get().checked_add_signed(delta) else {
			return Traversal::OutOfRange;
		};
		if target >= len {
			return Traversal::OutOfRange;
		}

		self.index.set(target);
		Traversal::Completed(self.current())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn loc(href: &str) -> Location {
		Location::parse(href).unwrap()
	}

	#[rstest]
	fn test_push_and_traverse() {
		let history = MemoryHistory::default();
		history.push(&loc("/a"));
		history.push(&loc("/b"));

		assert_eq!(history.len(), 3);
		assert_eq!(history.current(), loc("/b"));
		assert_eq!(history.go(-1), Traversal::Completed(loc("/a")));
		assert_eq!(history.go(-1), Traversal::Completed(loc("/")));
		assert_eq!(history.go(-1), Traversal::OutOfRange);
		assert_eq!(history.go(2), Traversal::Completed(loc("/b")));
		assert_eq!(history.go(1), Traversal::OutOfRange);
	}

	#[rstest]
	fn test_push_discards_forward_entries() {
		let history = MemoryHistory::default();
		history.push(&loc("/a"));
		history.push(&loc("/b"));
		history.go(-2);

		history.push(&loc("/c"));

		assert_eq!(history.entries(), vec![loc("/"), loc("/c")]);
		assert_eq!(history.index(), 1);
	}

	#[rstest]
	fn test_replace_overwrites_current() {
		let history = MemoryHistory::default();
		history.push(&loc("/a"));

		history.replace(&loc("/b"));

		assert_eq!(history.entries(), vec![loc("/"), loc("/b")]);
		assert!(!history.is_empty());
	}
}
