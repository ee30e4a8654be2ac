//! Router Components for navigation.
//!
//! [`Link`] describes an anchor that navigates without a full page reload:
//! it renders its attributes for the markup layer and decides, per click,
//! whether the router or the browser handles the navigation.

use super::core::{NavigateOptions, Navigation, Router, RouterError};
use super::location::Location;

/// Mouse button and modifier state of a click on a [`Link`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LinkClick {
	/// Mouse button, `0` is the primary button.
	pub button: i16,
	/// Ctrl key held.
	pub ctrl_key: bool,
	/// Meta (Cmd) key held.
	pub meta_key: bool,
	/// Shift key held.
	pub shift_key: bool,
	/// Alt key held.
	pub alt_key: bool,
}

impl LinkClick {
	/// A plain primary-button click.
	pub fn primary() -> Self {
		Self::default()
	}

	/// Returns whether the click asks the browser for default handling
	/// (new tab, new window, download).
	pub fn is_modified(&self) -> bool {
		self.button != 0 || self.ctrl_key || self.meta_key || self.shift_key || self.alt_key
	}
}

/// What happened to a click on a [`Link`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
	/// The router handled the click; the browser default must be prevented.
	Navigated(Navigation),
	/// The browser should follow the link itself.
	Browser,
}

/// A link that navigates without full page reload.
///
/// Similar to HTML `<a>` but routes same-origin clicks through the
/// [`Router`].
///
/// # Example
///
/// ```ignore
/// use appflow_pages::router::{Link, LinkClick};
///
/// let link = Link::new("/why-appflow", "Why Appflow");
/// link.click(&router, LinkClick::primary())?;
/// ```
#[derive(Debug, Clone)]
pub struct Link {
	to: String,
	content: String,
	class: Option<String>,
	replace: bool,
	new_tab: bool,
	attrs: Vec<(String, String)>,
}

impl Link {
	/// Creates a new link.
	pub fn new(to: impl Into<String>, content: impl Into<String>) -> Self {
		Self {
			to: to.into(),
			content: content.into(),
			class: None,
			replace: false,
			new_tab: false,
			attrs: Vec::new(),
		}
	}

	/// Sets the CSS class.
	pub fn class(mut self, class: impl Into<String>) -> Self {
		self.class = Some(class.into());
		self
	}

	/// Sets whether to replace the current history entry.
	pub fn replace(mut self, replace: bool) -> Self {
		self.replace = replace;
		self
	}

	/// Sets whether the link opens in a new tab.
	pub fn new_tab(mut self, new_tab: bool) -> Self {
		self.new_tab = new_tab;
		self
	}

	/// Adds a custom attribute.
	pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.attrs.push((name.into(), value.into()));
		self
	}

	/// Returns the destination as written.
	pub fn to(&self) -> &str {
		&self.to
	}

	/// Returns the content.
	pub fn content(&self) -> &str {
		&self.content
	}

	/// Returns whether this is a replace navigation.
	pub fn is_replace(&self) -> bool {
		self.replace
	}

	/// Returns where the link points, resolved against the current location.
	///
	/// # Errors
	///
	/// Returns [`RouterError::ExternalLocation`] for other origins.
	pub fn target(&self, router: &Router) -> Result<Location, RouterError> {
		router.current().resolve(&self.to)
	}

	/// Returns whether the link leaves the site.
	pub fn is_external(&self, router: &Router) -> bool {
		matches!(self.target(router), Err(RouterError::ExternalLocation(_)))
	}

	/// Returns whether the link points at the current pathname.
	pub fn is_active(&self, router: &Router) -> bool {
		self.target(router)
			.is_ok_and(|target| target.pathname() == router.current().pathname())
	}

	/// Handles a click.
	///
	/// Same-origin primary clicks navigate through the router. External
	/// links, new-tab links and modified clicks are left to the browser.
	///
	/// # Errors
	///
	/// Returns [`RouterError::InvalidLocation`] if the destination cannot be
	/// parsed.
	pub fn click(&self, router: &Router, click: LinkClick) -> Result<LinkOutcome, RouterError> {
		if self.new_tab || click.is_modified() {
			return Ok(LinkOutcome::Browser);
		}

		let options = if self.replace {
			NavigateOptions::replace()
		} else {
			NavigateOptions::push()
		};

		match router.navigate(&self.to, options) {
			Ok(navigation) => Ok(LinkOutcome::Navigated(navigation)),
			Err(RouterError::ExternalLocation(_)) => Ok(LinkOutcome::Browser),
			Err(err) => Err(err),
		}
	}

	/// Returns the anchor attributes, in render order.
	pub fn attrs(&self, router: &Router) -> Vec<(String, String)> {
		let mut attrs = vec![("href".to_string(), self.href(router))];

		if let Some(ref class) = self.class {
			attrs.push(("class".to_string(), class.clone()));
		}

		if self.new_tab || self.is_external(router) {
			attrs.push(("target".to_string(), "_blank".to_string()));
			attrs.push(("rel".to_string(), "noopener noreferrer".to_string()));
		} else {
			attrs.push(("data-link".to_string(), "true".to_string()));
			if self.replace {
				attrs.push(("data-replace".to_string(), "true".to_string()));
			}
			if self.is_active(router) {
				attrs.push(("aria-current".to_string(), "page".to_string()));
			}
		}

		attrs.extend(self.attrs.iter().cloned());
		attrs
	}

	fn href(&self, router: &Router) -> String {
		match self.target(router) {
			Ok(target) => target.href(),
			Err(_) => self.to.clone(),
		}
	}
}
