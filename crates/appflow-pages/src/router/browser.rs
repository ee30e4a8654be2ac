//! Browser history backend (wasm32 only).
//!
//! Writes go to `window.history`; traversal is asynchronous and completes
//! with a `popstate` event, which [`PopStateListener`] forwards to
//! [`Router::handle_pop`].

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use super::core::Router;
use super::history::{HistoryBackend, Traversal};
use super::location::Location;

/// [`HistoryBackend`] over `window.history`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserHistory;

impl BrowserHistory {
	fn history() -> Option<web_sys::History> {
		web_sys::window()?.history().ok()
	}
}

/// Reads the location the browser is currently showing.
fn window_location() -> Option<Location> {
	let location = web_sys::window()?.location();
	let pathname = location.pathname().ok()?;
	let search = location.search().ok()?;
	Some(Location::new(pathname, search))
}

impl HistoryBackend for BrowserHistory {
	fn current(&self) -> Location {
		window_location().unwrap_or_default()
	}

	fn push(&self, location: &Location) {
		let Some(history) = Self::history() else {
			return;
		};
		if let Err(err) = history.push_state_with_url(&JsValue::NULL, "", Some(&location.href())) {
			tracing::warn!(error = ?err, location = %location, "history.pushState failed");
		}
	}

	fn replace(&self, location: &Location) {
		let Some(history) = Self::history() else {
			return;
		};
		if let Err(err) = history.replace_state_with_url(&JsValue::NULL, "", Some(&location.href()))
		{
			tracing::warn!(error = ?err, location = %location, "history.replaceState failed");
		}
	}

	fn go(&self, delta: isize) -> Traversal {
		let (Some(history), Ok(delta)) = (Self::history(), i32::try_from(delta)) else {
			return Traversal::OutOfRange;
		};
		match history.go_with_delta(delta) {
			Ok(()) => Traversal::Pending,
			Err(err) => {
				tracing::warn!(error = ?err, delta, "history.go failed");
				Traversal::OutOfRange
			}
		}
	}
}

/// Forwards `popstate` events to a [`Router`].
///
/// The listener is removed when this value is dropped.
pub struct PopStateListener {
	window: web_sys::Window,
	closure: Closure<dyn FnMut(web_sys::Event)>,
}

impl PopStateListener {
	/// Attaches a `popstate` listener to `window`.
	///
	/// Returns `None` outside a browser window.
	pub fn attach(router: &Router) -> Option<Self> {
		let window = web_sys::window()?;
		let router = router.clone();

		let closure = Closure::wrap(Box::new(move |_event: web_sys::Event| {
			if let Some(location) = window_location() {
				router.handle_pop(location);
			}
		}) as Box<dyn FnMut(_)>);

		window
			.add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref())
			.ok()?;

		Some(Self { window, closure })
	}
}

impl Drop for PopStateListener {
	fn drop(&mut self) {
		let _ = self
			.window
			.remove_event_listener_with_callback("popstate", self.closure.as_ref().unchecked_ref());
	}
}

impl std::fmt::Debug for PopStateListener {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("PopStateListener").finish_non_exhaustive()
	}
}
