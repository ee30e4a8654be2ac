//! Navigation to analytics glue.
//!
//! On every distinct URL change the site reports a page view and puts the
//! page theme back to its default, so a page that switched to the dark theme
//! does not leak it into the next one. Both happen inside the router's `Url`
//! notification, so they complete before any listener registered later (the
//! [`Outlet`](crate::outlet::Outlet)) sees the new location.

use crate::analytics::AnalyticsSink;
use crate::router::{Location, Router, Url};
use crate::store::{PageStore, PageTheme, StoreError};
use crate::subscription::Subscription;

/// The installed navigation listener.
///
/// Holds the page theme writer for as long as it is installed; dropping it
/// removes the listener and releases the writer.
#[derive(Debug)]
#[must_use = "dropping NavigationAnalytics uninstalls it"]
pub struct NavigationAnalytics {
	subscription: Subscription,
}

impl NavigationAnalytics {
	/// Registers the listener on `router`.
	///
	/// No page view is reported for the location the router starts at; the
	/// host page reports the initial load itself.
	///
	/// # Errors
	///
	/// Returns [`StoreError::WriterAlreadyClaimed`] if another component
	/// already owns the `pageTheme` writer.
	pub fn install<S: AnalyticsSink + 'static>(
		router: &Router,
		store: &PageStore,
		sink: S,
	) -> Result<Self, StoreError> {
		let theme = store.claim_writer(PageTheme)?;

		let subscription = router.on_change(Url, move |new: &Location, old: &Location| {
			let path = new.href();
			if let Err(err) = sink.report_page_view(&path) {
				tracing::warn!(error = %err, path = %path, "page view not reported");
			}

			theme.reset();
			tracing::trace!(from = %old, to = %new, "page theme reset");
		});

		Ok(Self { subscription })
	}

	/// Returns whether the listener is still registered.
	pub fn is_installed(&self) -> bool {
		self.subscription.is_active()
	}

	/// Removes the listener and releases the theme writer.
	pub fn uninstall(self) {
		self.subscription.unsubscribe();
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::router::RouteTable;
	use crate::store::Theme;
	use crate::testing::RecordingSink;
	use rstest::{fixture, rstest};

	#[fixture]
	fn router() -> Router {
		Router::new(RouteTable::from_entries(RouteTable::default_entries(), "not-found").unwrap())
	}

	#[rstest]
	fn test_reports_once_per_distinct_url(router: Router) {
		let store = PageStore::new();
		let sink = RecordingSink::new();
		let _glue = NavigationAnalytics::install(&router, &store, sink.clone()).unwrap();

		router.push("/why-appflow").unwrap();
		router.push("/why-appflow").unwrap();
		router.push("/why-appflow?ref=hero").unwrap();

		assert_eq!(
			sink.paths(),
			vec!["/why-appflow".to_string(), "/why-appflow?ref=hero".to_string()]
		);
	}

	#[rstest]
	fn test_no_report_for_initial_location(router: Router) {
		let store = PageStore::new();
		let sink = RecordingSink::new();

		let _glue = NavigationAnalytics::install(&router, &store, sink.clone()).unwrap();

		assert_eq!(sink.count(), 0);
	}

	#[rstest]
	fn test_resets_theme_on_navigation(router: Router) {
		let store = PageStore::new();
		let _glue = NavigationAnalytics::install(&router, &store, RecordingSink::new()).unwrap();
		store.set(PageTheme, Theme::Dark);

		router.push("/why-appflow").unwrap();

		assert_eq!(store.get(PageTheme), Theme::Light);
	}

	#[rstest]
	fn test_reset_uses_configured_default(router: Router) {
		let store = PageStore::with_defaults(crate::store::PageState {
			page_theme: Theme::Dark,
			..Default::default()
		});
		let _glue = NavigationAnalytics::install(&router, &store, RecordingSink::new()).unwrap();
		store.set(PageTheme, Theme::Light);

		router.push("/why-appflow").unwrap();

		assert_eq!(store.get(PageTheme), Theme::Dark);
	}

	#[rstest]
	fn test_sink_failure_is_swallowed(router: Router) {
		let store = PageStore::new();
		let sink = RecordingSink::new();
		sink.set_failing(true);
		let _glue = NavigationAnalytics::install(&router, &store, sink.clone()).unwrap();
		store.set(PageTheme, Theme::Dark);

		let navigation = router.push("/why-appflow").unwrap();

		assert!(navigation.is_committed());
		assert_eq!(sink.count(), 0);
		assert_eq!(store.get(PageTheme), Theme::Light);
	}

	#[rstest]
	fn test_theme_writer_is_exclusive(router: Router) {
		let store = PageStore::new();
		let glue = NavigationAnalytics::install(&router, &store, RecordingSink::new()).unwrap();

		assert!(matches!(
			NavigationAnalytics::install(&router, &store, RecordingSink::new()),
			Err(StoreError::WriterAlreadyClaimed("pageTheme"))
		));

		glue.uninstall();
		assert!(store.claim_writer(PageTheme).is_ok());
	}

	#[rstest]
	fn test_report_happens_before_reset(router: Router) {
		let store = PageStore::new();
		let sink = RecordingSink::new();
		let _glue = NavigationAnalytics::install(&router, &store, sink.clone()).unwrap();
		let seen = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
		let _theme = store.subscribe(PageTheme, {
			let sink = sink.clone();
			let seen = std::rc::Rc::clone(&seen);
			move |_, _| seen.borrow_mut().push(sink.count())
		});
		store.set(PageTheme, Theme::Dark);

		router.push("/why-appflow").unwrap();

		assert_eq!(*seen.borrow(), vec![0, 1]);
	}
}
