//! Environment variable handling module
//!
//! Reads typed values from prefixed environment variables. Lookups go
//! through [`Env`], which can also be backed by a fixed map so tests never
//! touch the process environment.

use std::collections::HashMap;
use std::env;

/// Prefix of every environment variable the site reads.
pub const ENV_PREFIX: &str = "APPFLOW_";

/// Environment variable reader with prefix support
#[derive(Debug, Clone, Default)]
pub struct Env {
	/// Optional prefix for environment variables (e.g., "APPFLOW_")
	pub prefix: Option<String>,

	/// Fixed variables used instead of the process environment
	vars: Option<HashMap<String, String>>,
}

impl Env {
	/// Create an Env reading the process environment
	pub fn new() -> Self {
		Self::default()
	}

	/// Create an Env reading only `vars`
	pub fn from_map<K, V>(vars: impl IntoIterator<Item = (K, V)>) -> Self
	where
		K: Into<String>,
		V: Into<String>,
	{
		Self {
			prefix: None,
			vars: Some(vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect()),
		}
	}

	/// Set a prefix for all environment variable lookups
	pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.prefix = Some(prefix.into());
		self
	}

	/// Get the full key name with prefix
	pub fn key_name(&self, key: &str) -> String {
		match &self.prefix {
			Some(prefix) => format!("{}{}", prefix, key),
			None => key.to_string(),
		}
	}

	fn lookup(&self, full_key: &str) -> Option<String> {
		match &self.vars {
			Some(vars) => vars.get(full_key).cloned(),
			None => env::var(full_key).ok(),
		}
	}

	/// Read an optional string value
	pub fn str(&self, key: &str) -> Result<Option<String>, EnvError> {
		let full_key = self.key_name(key);
		validate_env_var_name(&full_key)?;
		Ok(self.lookup(&full_key))
	}

	/// Read an optional boolean value
	///
	/// Accepts `true`/`false`, `1`/`0`, `yes`/`no` and `on`/`off`,
	/// case-insensitively.
	pub fn bool(&self, key: &str) -> Result<Option<bool>, EnvError> {
		self.parse_with(key, parse_bool)
	}

	/// Read an optional value parsed by `parse`
	pub fn parse_with<T>(
		&self,
		key: &str,
		parse: impl FnOnce(&str) -> Result<T, String>,
	) -> Result<Option<T>, EnvError> {
		let full_key = self.key_name(key);
		let Some(value) = self.str(key)? else {
			return Ok(None);
		};

		parse(&value).map(Some).map_err(|error| EnvError::ParseError {
			key: full_key,
			value_len: value.len(),
			error,
		})
	}
}

/// Parse a boolean environment value
pub fn parse_bool(value: &str) -> Result<bool, String> {
	match value.trim().to_ascii_lowercase().as_str() {
		"true" | "1" | "yes" | "on" => Ok(true),
		"false" | "0" | "no" | "off" => Ok(false),
		_ => Err("expected a boolean (true/false, 1/0, yes/no, on/off)".to_string()),
	}
}

/// Validates an environment variable name.
///
/// Rejects names that are empty, contain control characters, or contain
/// the `=` character.
pub fn validate_env_var_name(name: &str) -> Result<(), EnvError> {
	let invalid = |reason: String| EnvError::InvalidVariableName {
		name: name.to_string(),
		reason,
	};

	if name.is_empty() {
		return Err(invalid("environment variable name must not be empty".to_string()));
	}

	if let Some(pos) = name.find(|c: char| c.is_control()) {
		return Err(invalid(format!(
			"environment variable name contains control character at position {}",
			pos
		)));
	}

	if name.contains('=') {
		return Err(invalid("environment variable name must not contain '='".to_string()));
	}

	Ok(())
}

/// Environment variable errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnvError {
	#[error("Failed to parse environment variable '{key}' (value length: {value_len}): {error}")]
	ParseError {
		key: String,
		/// Length of the original value (the value itself is not echoed)
		value_len: usize,
		error: String,
	},

	#[error("Invalid environment variable name '{name}': {reason}")]
	InvalidVariableName { name: String, reason: String },
}
