//! # Appflow Site Configuration
//!
//! Layered settings for the Appflow site: built-in defaults, an
//! `appflow.toml` file and `APPFLOW_*` environment variables.
//!
//! ## Module Organization
//!
//! - [`settings`]: settings types, sources and validation
//!
//! ## Quick Start
//!
//! ```ignore
//! use appflow_conf::SiteSettings;
//!
//! let settings = SiteSettings::load("appflow.toml")?;
//! let table = settings.route_table()?;
//! ```

pub mod settings;

pub use settings::{
	AnalyticsSettings, DEFAULT_SITE_TITLE, PageSettings, RouterSettings, SETTINGS_FILE,
	SettingsBuilder, SettingsError, SiteSettings,
};
