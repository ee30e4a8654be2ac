//! Client-side routing.
//!
//! - [`Location`]: the current pathname and query string
//! - [`PathPattern`]: `:param` / `*` path patterns
//! - [`RouteTable`]: ordered, first-match-wins routes with a fallback
//! - [`Router`]: owns the current location and notifies on change
//! - [`Link`]: SPA link click handling
//! - [`HistoryBackend`]: in-memory or browser history

#[cfg(target_arch = "wasm32")]
mod browser;
mod components;
mod core;
mod history;
mod location;
mod pattern;
mod table;

#[cfg(target_arch = "wasm32")]
pub use browser::{BrowserHistory, PopStateListener};
pub use components::{Link, LinkClick, LinkOutcome};
pub use self::core::{
	ActivePath, NavigateOptions, Navigation, Router, RouterError, RouterField, RouterListeners, Url,
};
pub use history::{HistoryBackend, HistoryMode, MemoryHistory, Traversal};
pub use location::Location;
pub use pattern::{CATCH_ALL_PARAM, PathPattern};
pub use table::{
	DEFAULT_FALLBACK, Route, RouteEntry, RouteMatch, RouteTable, RouteTableBuilder, RouteTarget,
};
