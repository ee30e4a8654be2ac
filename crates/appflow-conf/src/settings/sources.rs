//! Configuration sources for layered settings
//!
//! Sources are merged from lowest to highest priority: defaults, then the
//! TOML file, then environment variables. Each source yields a JSON object;
//! objects merge key by key, any other value (including arrays such as the
//! route list) replaces the lower-priority value as a whole.

use std::fs;
use std::path::PathBuf;

use appflow_pages::Theme;
use serde_json::{Map, Value};

use super::SiteSettings;
use super::env::{Env, EnvError};

/// Trait for configuration sources
pub trait ConfigSource {
	/// Load configuration from this source
	fn load(&self) -> Result<Map<String, Value>, SourceError>;

	/// Get the priority of this source (higher = more important)
	fn priority(&self) -> u8;

	/// Get a description of this source
	fn description(&self) -> String;
}

/// Error type for configuration sources
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
	#[error("IO error reading {path}: {source}")]
	Io {
		path: PathBuf,
		source: std::io::Error,
	},

	#[error("Missing required configuration file: {0}")]
	MissingFile(PathBuf),

	#[error("Parse error: {0}")]
	Parse(String),

	#[error("Environment error: {0}")]
	Env(#[from] EnvError),

	#[error("TOML error: {0}")]
	Toml(#[from] toml::de::Error),

	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),
}

/// Built-in defaults
#[derive(Debug, Clone, Default)]
pub struct DefaultSource {
	defaults: SiteSettings,
}

impl DefaultSource {
	/// Create a source yielding [`SiteSettings::default`]
	pub fn new() -> Self {
		Self::default()
	}

	/// Create a source yielding `defaults`
	pub fn with_settings(defaults: SiteSettings) -> Self {
		Self { defaults }
	}
}

impl ConfigSource for DefaultSource {
	fn load(&self) -> Result<Map<String, Value>, SourceError> {
		into_object(serde_json::to_value(&self.defaults)?)
	}

	fn priority(&self) -> u8 {
		0
	}

	fn description(&self) -> String {
		"Default settings".to_string()
	}
}

/// TOML configuration source
///
/// Reads a file, or a string given up front.
#[derive(Debug, Clone)]
pub struct TomlSource {
	origin: TomlOrigin,
	required: bool,
}

#[derive(Debug, Clone)]
enum TomlOrigin {
	File(PathBuf),
	Inline(String),
}

impl TomlSource {
	/// Create a source reading `path`
	///
	/// A missing file yields no settings unless [`TomlSource::required`] is set.
	pub fn file(path: impl Into<PathBuf>) -> Self {
		Self {
			origin: TomlOrigin::File(path.into()),
			required: false,
		}
	}

	/// Create a source parsing `content`
	pub fn inline(content: impl Into<String>) -> Self {
		Self {
			origin: TomlOrigin::Inline(content.into()),
			required: true,
		}
	}

	/// Fail when the file does not exist
	pub fn required(mut self, required: bool) -> Self {
		self.required = required;
		self
	}

	fn content(&self) -> Result<Option<String>, SourceError> {
		match &self.origin {
			TomlOrigin::Inline(content) => Ok(Some(content.clone())),
			TomlOrigin::File(path) if !path.exists() => {
				if self.required {
					Err(SourceError::MissingFile(path.clone()))
				} else {
					tracing::debug!(path = %path.display(), "settings file not found, skipping");
					Ok(None)
				}
			}
			TomlOrigin::File(path) => fs::read_to_string(path)
				.map(Some)
				.map_err(|source| SourceError::Io {
					path: path.clone(),
					source,
				}),
		}
	}
}

impl ConfigSource for TomlSource {
	fn load(&self) -> Result<Map<String, Value>, SourceError> {
		let Some(content) = self.content()? else {
			return Ok(Map::new());
		};

		let toml_value: toml::Value = toml::from_str(&content)?;
		into_object(serde_json::to_value(toml_value)?)
	}

	fn priority(&self) -> u8 {
		50
	}

	fn description(&self) -> String {
		match &self.origin {
			TomlOrigin::File(path) => format!("TOML file: {}", path.display()),
			TomlOrigin::Inline(_) => "TOML string".to_string(),
		}
	}
}

/// Environment variable overrides
///
/// | Variable                     | Setting                |
/// |------------------------------|------------------------|
/// | `APPFLOW_ANALYTICS_ENABLED`  | `analytics.enabled`    |
/// | `APPFLOW_PAGE_DEFAULT_THEME` | `page.default_theme`   |
/// | `APPFLOW_ROUTER_FALLBACK`    | `router.fallback`      |
#[derive(Debug, Clone)]
pub struct EnvSource {
	env: Env,
}

impl EnvSource {
	/// Create a source over `env`
	pub fn new(env: Env) -> Self {
		Self { env }
	}
}

impl ConfigSource for EnvSource {
	fn load(&self) -> Result<Map<String, Value>, SourceError> {
		let mut config = Map::new();

		if let Some(enabled) = self.env.bool("ANALYTICS_ENABLED")? {
			set_path(&mut config, &["analytics", "enabled"], Value::Bool(enabled));
		}

		let theme = self
			.env
			.parse_with("PAGE_DEFAULT_THEME", |value| {
				value.parse::<Theme>().map_err(|e| e.to_string())
			})?;
		if let Some(theme) = theme {
			set_path(
				&mut config,
				&["page", "default_theme"],
				Value::String(theme.as_str().to_string()),
			);
		}

		if let Some(fallback) = self.env.str("ROUTER_FALLBACK")? {
			set_path(&mut config, &["router", "fallback"], Value::String(fallback));
		}

		Ok(config)
	}

	fn priority(&self) -> u8 {
		100
	}

	fn description(&self) -> String {
		match &self.env.prefix {
			Some(prefix) => format!("Environment variables ({}*)", prefix),
			None => "Environment variables".to_string(),
		}
	}
}

/// Merges `overlay` into `base`, recursing into objects
pub fn merge(base: &mut Map<String, Value>, overlay: Map<String, Value>) {
	for (key, value) in overlay {
		let Value::Object(incoming) = value else {
			base.insert(key, value);
			continue;
		};
		if let Some(Value::Object(existing)) = base.get_mut(&key) {
			merge(existing, incoming);
		} else {
			base.insert(key, Value::Object(incoming));
		}
	}
}

fn set_path(config: &mut Map<String, Value>, path: &[&str], value: Value) {
	let Some((last, parents)) = path.split_last() else {
		return;
	};

	let mut current = config;
	for key in parents {
		let entry = current
			.entry(key.to_string())
			.or_insert_with(|| Value::Object(Map::new()));
		if !entry.is_object() {
			*entry = Value::Object(Map::new());
		}
		let Value::Object(next) = entry else {
			return;
		};
		current = next;
	}
	current.insert(last.to_string(), value);
}

fn into_object(value: Value) -> Result<Map<String, Value>, SourceError> {
	match value {
		Value::Object(map) => Ok(map),
		_ => Err(SourceError::Parse("Expected object at root".to_string())),
	}
}
