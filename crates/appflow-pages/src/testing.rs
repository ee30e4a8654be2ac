//! Test doubles for the site's external collaborators.
//!
//! Available in this crate's tests and, with the `testing` feature, to
//! downstream crates.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::analytics::{AnalyticsError, AnalyticsSink};
use crate::outlet::PageRenderer;
use crate::router::Route;

/// Analytics sink that records every reported path.
///
/// Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
	paths: Rc<RefCell<Vec<String>>>,
	failing: Rc<Cell<bool>>,
}

impl RecordingSink {
	/// Creates an empty recording sink.
	pub fn new() -> Self {
		Self::default()
	}

	/// Makes subsequent reports fail (without recording) or succeed.
	pub fn set_failing(&self, failing: bool) {
		self.failing.set(failing);
	}

	/// Returns the recorded paths, oldest first.
	pub fn paths(&self) -> Vec<String> {
		self.paths.borrow().clone()
	}

	/// Returns the number of recorded page views.
	pub fn count(&self) -> usize {
		self.paths.borrow().len()
	}

	/// Forgets all recorded page views.
	pub fn clear(&self) {
		self.paths.borrow_mut().clear();
	}
}

impl AnalyticsSink for RecordingSink {
	fn report_page_view(&self, path: &str) -> Result<(), AnalyticsError> {
		if self.failing.get() {
			return Err(AnalyticsError::Unavailable("recording sink set to fail".to_string()));
		}
		self.paths.borrow_mut().push(path.to_string());
		Ok(())
	}
}

/// Page renderer that records the component tag of every rendered route.
///
/// Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
	rendered: Rc<RefCell<Vec<String>>>,
}

impl RecordingRenderer {
	/// Creates an empty recording renderer.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the rendered component tags, oldest first.
	pub fn rendered(&self) -> Vec<String> {
		self.rendered.borrow().clone()
	}

	/// Returns the most recently rendered component tag.
	pub fn last(&self) -> Option<String> {
		self.rendered.borrow().last().cloned()
	}
}

impl PageRenderer for RecordingRenderer {
	fn render(&self, route: &Route) {
		let tag = route.component_tag().unwrap_or_default().to_string();
		self.rendered.borrow_mut().push(tag);
	}
}
