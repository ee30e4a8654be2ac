//! Site settings
//!
//! Settings are assembled from layered [`sources`]: built-in defaults, an
//! optional `appflow.toml`, then `APPFLOW_*` environment variables. Later
//! layers override earlier ones.
//!
//! ```toml
//! [page]
//! default_theme = "light"
//! site_title = "Appflow"
//!
//! [analytics]
//! enabled = true
//!
//! [router]
//! fallback = "not-found"
//!
//! [[router.routes]]
//! path = "/"
//! component = "landing-page"
//!
//! [[router.routes]]
//! path = "/why-appflow"
//! component = "why-appflow-page"
//! ```

pub mod env;
pub mod sources;
pub mod validation;

use std::path::Path;

use appflow_pages::router::{DEFAULT_FALLBACK, RouteEntry, RouteTable};
use appflow_pages::{PageState, Theme};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use self::env::{ENV_PREFIX, Env};
use self::sources::{ConfigSource, DefaultSource, EnvSource, SourceError, TomlSource, merge};
use self::validation::{ValidationError, validate};

/// Default settings file name.
pub const SETTINGS_FILE: &str = "appflow.toml";

/// Default document title.
pub const DEFAULT_SITE_TITLE: &str = "Appflow";

/// Error type for settings loading
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
	#[error("failed to load {description}: {source}")]
	Source {
		description: String,
		source: SourceError,
	},

	#[error("invalid settings: {0}")]
	Deserialize(#[from] serde_json::Error),

	#[error(transparent)]
	Validation(#[from] ValidationError),
}

/// Page store settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PageSettings {
	/// Theme every page starts with, and returns to on navigation
	pub default_theme: Theme,
	/// Document title for routes without their own
	pub site_title: String,
}

impl Default for PageSettings {
	fn default() -> Self {
		Self {
			default_theme: Theme::Light,
			site_title: DEFAULT_SITE_TITLE.to_string(),
		}
	}
}

/// Analytics settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalyticsSettings {
	/// Report page views on navigation
	pub enabled: bool,
}

impl Default for AnalyticsSettings {
	fn default() -> Self {
		Self { enabled: true }
	}
}

/// Router settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RouterSettings {
	/// Component rendered when no route matches
	pub fallback: String,
	/// Routes in match order
	pub routes: Vec<RouteEntry>,
}

impl Default for RouterSettings {
	fn default() -> Self {
		Self {
			fallback: DEFAULT_FALLBACK.to_string(),
			routes: RouteTable::default_entries(),
		}
	}
}

/// All site settings
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteSettings {
	/// Page store settings
	pub page: PageSettings,
	/// Analytics settings
	pub analytics: AnalyticsSettings,
	/// Router settings
	pub router: RouterSettings,
}

impl SiteSettings {
	/// Starts a layered settings builder
	pub fn builder() -> SettingsBuilder {
		SettingsBuilder::new()
	}

	/// Loads defaults, then `path` (if it exists), then `APPFLOW_*`
	/// environment variables
	pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
		Self::builder()
			.add_source(DefaultSource::new())
			.add_source(TomlSource::file(path.as_ref()))
			.add_source(EnvSource::new(Env::new().with_prefix(ENV_PREFIX)))
			.build()
	}

	/// Parses settings from a TOML string over the defaults
	pub fn from_toml_str(content: &str) -> Result<Self, SettingsError> {
		Self::builder()
			.add_source(DefaultSource::new())
			.add_source(TomlSource::inline(content))
			.build()
	}

	/// Compiles the route table
	pub fn route_table(&self) -> Result<RouteTable, ValidationError> {
		validate(self)
	}

	/// Returns the page store defaults
	pub fn page_defaults(&self) -> PageState {
		PageState {
			page_theme: self.page.default_theme,
			..PageState::default()
		}
	}
}

/// Layered settings builder
#[derive(Default)]
pub struct SettingsBuilder {
	sources: Vec<Box<dyn ConfigSource>>,
}

impl SettingsBuilder {
	/// Creates a builder without sources
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a source
	pub fn add_source<S: ConfigSource + 'static>(mut self, source: S) -> Self {
		self.sources.push(Box::new(source));
		self
	}

	/// Merges the sources by priority, deserializes and validates
	pub fn build(mut self) -> Result<SiteSettings, SettingsError> {
		self.sources.sort_by_key(|source| source.priority());

		let mut merged = Map::new();
		for source in &self.sources {
			let config = source.load().map_err(|source_error| SettingsError::Source {
				description: source.description(),
				source: source_error,
			})?;
			tracing::debug!(
				source = %source.description(),
				keys = config.len(),
				"loaded settings source"
			);
			merge(&mut merged, config);
		}

		let settings: SiteSettings = serde_json::from_value(Value::Object(merged))?;
		validate(&settings)?;
		Ok(settings)
	}
}

impl std::fmt::Debug for SettingsBuilder {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let descriptions: Vec<String> = self.sources.iter().map(|s| s.description()).collect();
		f.debug_struct("SettingsBuilder")
			.field("sources", &descriptions)
			.finish()
	}
}
