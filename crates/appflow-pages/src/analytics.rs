//! Page view reporting.
//!
//! The site reports one page view per distinct URL change through an
//! [`AnalyticsSink`]. The sink is an external collaborator; this crate ships
//! a [`TracingSink`] that logs page views and a [`NoopSink`] for disabled
//! analytics.

use std::rc::Rc;

/// Error returned by an [`AnalyticsSink`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalyticsError {
	/// The sink could not deliver the event.
	#[error("failed to report page view `{path}`: {reason}")]
	Delivery {
		/// Path of the page view.
		path: String,
		/// Sink-specific failure message.
		reason: String,
	},
	/// The sink is not ready to accept events.
	#[error("analytics sink unavailable: {0}")]
	Unavailable(String),
}

/// Receives page view events.
pub trait AnalyticsSink {
	/// Reports a page view for `path` (`pathname + search`).
	///
	/// # Errors
	///
	/// Returns [`AnalyticsError`] when the event cannot be delivered. Callers
	/// log and discard the error; navigation never fails because of it.
	fn report_page_view(&self, path: &str) -> Result<(), AnalyticsError>;
}

impl<S: AnalyticsSink + ?Sized> AnalyticsSink for Rc<S> {
	fn report_page_view(&self, path: &str) -> Result<(), AnalyticsError> {
		(**self).report_page_view(path)
	}
}

impl<S: AnalyticsSink + ?Sized> AnalyticsSink for Box<S> {
	fn report_page_view(&self, path: &str) -> Result<(), AnalyticsError> {
		(**self).report_page_view(path)
	}
}

/// Logs each page view as an `info` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl AnalyticsSink for TracingSink {
	fn report_page_view(&self, path: &str) -> Result<(), AnalyticsError> {
		tracing::info!(target: "appflow::analytics", path, "page view");
		Ok(())
	}
}

/// Discards page views.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl AnalyticsSink for NoopSink {
	fn report_page_view(&self, _path: &str) -> Result<(), AnalyticsError> {
		Ok(())
	}
}
