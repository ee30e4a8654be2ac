//! PageStore - observable page state with a fixed schema
//!
//! `PageStore` holds the UI flags that unrelated components share: the page
//! theme, scroll state, navigation menu state and so on. The set of fields is
//! fixed at compile time; each field is addressed by a zero-sized marker type
//! ([`PageTheme`], [`Scrolled`], ...) so reading or writing a field that does
//! not exist is a type error.
//!
//! ## Semantics
//!
//! - [`PageStore::get`] always returns the latest written value.
//! - [`PageStore::set`] writes, then notifies the field's subscribers in
//!   registration order before returning. Writing an equal value is a no-op.
//! - Store-wide [`PageStore::on_set`] listeners run after the field's own
//!   subscribers.
//! - A subscriber that writes the same field again ends the outer round: the
//!   nested write has already notified everyone with the newer value.
//! - Each field has one owner, claimed with [`PageStore::claim_writer`].
//!
//! ## Example
//!
//! ```ignore
//! use appflow_pages::store::{PageStore, PageTheme, Theme};
//!
//! let store = PageStore::new();
//! let _sub = store.subscribe(PageTheme, |new, old| {
//!     println!("theme changed from {old} to {new}");
//! });
//!
//! store.set(PageTheme, Theme::Dark);
//! assert_eq!(store.get(PageTheme), Theme::Dark);
//! ```

use core::cell::RefCell;
use core::fmt;
use core::str::FromStr;
use std::collections::{HashMap, HashSet};

extern crate alloc;
use alloc::rc::Rc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::subscription::{ListenerList, Subscription};

/// Color theme of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
	/// Light theme (default).
	#[default]
	Light,
	/// Dark theme.
	Dark,
}

impl Theme {
	/// Returns the lowercase name used in markup and configuration.
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Light => "light",
			Self::Dark => "dark",
		}
	}
}

impl fmt::Display for Theme {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Error returned when parsing an unknown theme name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown theme `{0}`, expected `light` or `dark`")]
pub struct ParseThemeError(String);

impl FromStr for Theme {
	type Err = ParseThemeError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"light" => Ok(Self::Light),
			"dark" => Ok(Self::Dark),
			_ => Err(ParseThemeError(s.to_string())),
		}
	}
}

/// Error type for page store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
	/// A field name that is not part of the store schema.
	#[error("unknown page store field `{name}` (known fields: {known})")]
	UnknownField {
		/// The name that was requested.
		name: String,
		/// Comma separated list of valid field names.
		known: String,
	},
	/// A value that cannot be converted to the field's type.
	#[error("invalid value for page store field `{field}`: {source}")]
	InvalidValue {
		/// The field being written.
		field: &'static str,
		/// The conversion error.
		source: serde_json::Error,
	},
	/// The field already has an owning writer.
	#[error("page store field `{0}` already has a writer")]
	WriterAlreadyClaimed(&'static str),
}

impl StoreError {
	fn unknown_field(name: &str) -> Self {
		Self::UnknownField {
			name: name.to_string(),
			known: FIELD_NAMES.join(", "),
		}
	}
}

type FieldCallbacks<T> = ListenerList<dyn Fn(&T, &T)>;

/// A field of the [`PageStore`] schema.
///
/// Implemented only by the marker types generated in this module.
pub trait StoreField: Copy + fmt::Debug + 'static {
	/// Type of the value stored in this field.
	type Value: Clone + PartialEq + fmt::Debug + Serialize + DeserializeOwned + 'static;

	/// Name of the field as seen by dynamic access and serialization.
	const NAME: &'static str;

	#[doc(hidden)]
	fn read(state: &PageState) -> &Self::Value;

	#[doc(hidden)]
	fn slot(state: &mut PageState) -> &mut Self::Value;

	#[doc(hidden)]
	fn listeners(listeners: &FieldListeners) -> &Rc<FieldCallbacks<Self::Value>>;
}

macro_rules! page_fields {
	($(
		$(#[$meta:meta])*
		$marker:ident, $field:ident: $ty:ty = $default:expr, $name:literal;
	)*) => {
		/// Snapshot of every page store field.
		///
		/// Serializes with the field names used by dynamic access
		/// (`pageTheme`, `scrolled`, ...). Missing fields deserialize to
		/// their defaults.
		#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
		#[serde(default)]
		pub struct PageState {
			$(
				$(#[$meta])*
				#[serde(rename = $name)]
				pub $field: $ty,
			)*
		}

		impl Default for PageState {
			fn default() -> Self {
				Self {
					$($field: $default,)*
				}
			}
		}

		#[doc(hidden)]
		pub struct FieldListeners {
			$($field: Rc<FieldCallbacks<$ty>>,)*
		}

		impl FieldListeners {
			fn new() -> Self {
				Self {
					$($field: ListenerList::new(),)*
				}
			}
		}

		$(
			$(#[$meta])*
			#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
			pub struct $marker;

			impl StoreField for $marker {
				type Value = $ty;
				const NAME: &'static str = $name;

				fn read(state: &PageState) -> &$ty {
					&state.$field
				}

				fn slot(state: &mut PageState) -> &mut $ty {
					&mut state.$field
				}

				fn listeners(listeners: &FieldListeners) -> &Rc<FieldCallbacks<$ty>> {
					&listeners.$field
				}
			}
		)*

		/// Names of every page store field, in declaration order.
		pub const FIELD_NAMES: &[&str] = &[$($name),*];

		impl PageStore {
			/// Reads a field by name as JSON.
			///
			/// # Errors
			///
			/// Returns [`StoreError::UnknownField`] if `name` is not a store field.
			pub fn get_by_name(&self, name: &str) -> Result<Value, StoreError> {
				match name {
					$($name => self.field_to_json($marker),)*
					_ => Err(StoreError::unknown_field(name)),
				}
			}

			/// Writes a field by name from JSON.
			///
			/// # Errors
			///
			/// Returns [`StoreError::UnknownField`] if `name` is not a store field,
			/// or [`StoreError::InvalidValue`] if `value` has the wrong shape.
			pub fn set_by_name(&self, name: &str, value: Value) -> Result<(), StoreError> {
				match name {
					$($name => self.set_from_json($marker, value),)*
					_ => Err(StoreError::unknown_field(name)),
				}
			}

			/// Restores every field to its default, notifying changed fields.
			pub fn reset(&self) {
				$(self.set($marker, self.inner.defaults.$field.clone());)*
			}
		}
	};
}

page_fields! {
	/// Color theme of the current page.
	PageTheme, page_theme: Theme = Theme::Light, "pageTheme";
	/// Whether the page has scrolled past the header.
	Scrolled, scrolled: bool = false, "scrolled";
	/// Whether the mobile navigation menu is open.
	NavOpen, nav_open: bool = false, "navOpen";
	/// Whether the announcement banner is shown.
	BannerVisible, banner_visible: bool = true, "bannerVisible";
}

struct StoreInner {
	state: RefCell<PageState>,
	defaults: PageState,
	listeners: FieldListeners,
	on_set: Rc<ListenerList<dyn Fn(&'static str)>>,
	writers: RefCell<HashSet<&'static str>>,
	generations: RefCell<HashMap<&'static str, u64>>,
}

/// Shared, observable page state.
///
/// `PageStore` is a cheap handle: clones share the same state and
/// subscribers. Pass it explicitly to the components that need it.
#[derive(Clone)]
pub struct PageStore {
	inner: Rc<StoreInner>,
}

impl PageStore {
	/// Creates a store initialized with [`PageState::default`].
	pub fn new() -> Self {
		Self::with_defaults(PageState::default())
	}

	/// Creates a store whose initial and reset values are `defaults`.
	pub fn with_defaults(defaults: PageState) -> Self {
		Self {
			inner: Rc::new(StoreInner {
				state: RefCell::new(defaults.clone()),
				defaults,
				listeners: FieldListeners::new(),
				on_set: ListenerList::new(),
				writers: RefCell::new(HashSet::new()),
				generations: RefCell::new(HashMap::new()),
			}),
		}
	}

	/// Returns the current value of `field`.
	pub fn get<F: StoreField>(&self, _field: F) -> F::Value {
		F::read(&self.inner.state.borrow()).clone()
	}

	/// Returns the value `field` is reset to.
	pub fn default_value<F: StoreField>(&self, _field: F) -> F::Value {
		F::read(&self.inner.defaults).clone()
	}

	/// Writes `value` to `field` and notifies its subscribers.
	///
	/// Subscribers receive `(new, old)` and run before this returns. Nothing
	/// happens if `value` equals the current value.
	pub fn set<F: StoreField>(&self, _field: F, value: F::Value) {
		let old = {
			let mut state = self.inner.state.borrow_mut();
			let slot = F::slot(&mut state);
			if *slot == value {
				return;
			}
			core::mem::replace(slot, value.clone())
		};

		let generation = self.bump_generation(F::NAME);
		tracing::debug!(field = F::NAME, old = ?old, new = ?value, "page store field updated");

		let current = || self.generation(F::NAME) == generation;
		let completed = F::listeners(&self.inner.listeners)
			.for_each_while(current, |callback| callback(&value, &old));
		if !completed {
			tracing::trace!(field = F::NAME, "superseded write notification ended");
			return;
		}
		self.inner.on_set.for_each_while(current, |callback| callback(F::NAME));
	}

	/// Updates `field` in place through `f`, then notifies as [`set`](Self::set).
	pub fn update<F: StoreField>(&self, field: F, f: impl FnOnce(&mut F::Value)) {
		let mut value = self.get(field);
		f(&mut value);
		self.set(field, value);
	}

	/// Registers `callback` for changes of `field`.
	pub fn subscribe<F: StoreField>(
		&self,
		_field: F,
		callback: impl Fn(&F::Value, &F::Value) + 'static,
	) -> Subscription {
		F::listeners(&self.inner.listeners).subscribe(Rc::new(callback))
	}

	/// Registers `callback` for changes of any field.
	///
	/// The callback receives the changed field's name.
	pub fn on_set(&self, callback: impl Fn(&'static str) + 'static) -> Subscription {
		self.inner.on_set.subscribe(Rc::new(callback))
	}

	/// Returns the number of live subscribers of `field`.
	pub fn subscriber_count<F: StoreField>(&self, _field: F) -> usize {
		F::listeners(&self.inner.listeners).len()
	}

	/// Returns a copy of every field.
	pub fn snapshot(&self) -> PageState {
		self.inner.state.borrow().clone()
	}

	/// Claims the single owning writer of `field`.
	///
	/// Each field has one conceptual owner. The claim lasts until the
	/// returned [`FieldWriter`] is dropped.
	///
	/// The claim is advisory. It keeps a second owner from claiming the
	/// field, but [`PageStore::set`] stays open to every holder of the store,
	/// since pages write fields their owner only resets (a theme toggle
	/// writes `pageTheme`, the navigation glue owns resetting it).
	///
	/// # Errors
	///
	/// Returns [`StoreError::WriterAlreadyClaimed`] while another writer for
	/// the same field is alive.
	pub fn claim_writer<F: StoreField>(&self, field: F) -> Result<FieldWriter<F>, StoreError> {
		if !self.inner.writers.borrow_mut().insert(F::NAME) {
			return Err(StoreError::WriterAlreadyClaimed(F::NAME));
		}
		Ok(FieldWriter {
			store: self.clone(),
			field,
		})
	}

	fn bump_generation(&self, name: &'static str) -> u64 {
		let mut generations = self.inner.generations.borrow_mut();
		let generation = generations.entry(name).or_insert(0);
		*generation += 1;
		*generation
	}

	fn generation(&self, name: &'static str) -> u64 {
		self.inner
			.generations
			.borrow()
			.get(name)
			.copied()
			.unwrap_or(0)
	}

	fn field_to_json<F: StoreField>(&self, field: F) -> Result<Value, StoreError> {
		serde_json::to_value(self.get(field)).map_err(|source| StoreError::InvalidValue {
			field: F::NAME,
			source,
		})
	}

	fn set_from_json<F: StoreField>(&self, field: F, value: Value) -> Result<(), StoreError> {
		let value: F::Value =
			serde_json::from_value(value).map_err(|source| StoreError::InvalidValue {
				field: F::NAME,
				source,
			})?;
		self.set(field, value);
		Ok(())
	}
}

impl Default for PageStore {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Debug for PageStore {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("PageStore")
			.field("state", &*self.inner.state.borrow())
			.field("on_set_listeners", &self.inner.on_set.len())
			.finish()
	}
}

/// Owning writer of one page store field.
///
/// Obtained from [`PageStore::claim_writer`].
pub struct FieldWriter<F: StoreField> {
	store: PageStore,
	field: F,
}

impl<F: StoreField> FieldWriter<F> {
	/// Returns the current value of the owned field.
	pub fn get(&self) -> F::Value {
		self.store.get(self.field)
	}

	/// Writes the owned field.
	pub fn set(&self, value: F::Value) {
		self.store.set(self.field, value);
	}

	/// Writes the field's default value.
	pub fn reset(&self) {
		self.store.set(self.field, self.store.default_value(self.field));
	}

	/// Returns the name of the owned field.
	pub fn name(&self) -> &'static str {
		F::NAME
	}
}

impl<F: StoreField> Drop for FieldWriter<F> {
	fn drop(&mut self) {
		self.store.inner.writers.borrow_mut().remove(F::NAME);
	}
}

impl<F: StoreField> fmt::Debug for FieldWriter<F> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("FieldWriter")
			.field("field", &F::NAME)
			.finish()
	}
}
