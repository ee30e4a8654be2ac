//! Settings validation
//!
//! Runs once, at load time, so a bad route table is reported before the
//! site starts rather than on the first navigation.

use appflow_pages::router::{RouteTable, RouterError};

use super::SiteSettings;

/// Validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
	#[error("router.routes must contain at least one route")]
	NoRoutes,

	#[error("router.fallback must not be empty")]
	EmptyFallback,

	#[error("invalid route table: {0}")]
	Routes(#[from] RouterError),
}

/// Checks `settings` and compiles its route table.
pub fn validate(settings: &SiteSettings) -> Result<RouteTable, ValidationError> {
	if settings.router.routes.is_empty() {
		return Err(ValidationError::NoRoutes);
	}
	if settings.router.fallback.trim().is_empty() {
		return Err(ValidationError::EmptyFallback);
	}

	let table = RouteTable::from_entries(
		settings.router.routes.iter().cloned(),
		&settings.router.fallback,
	)?;
	Ok(table)
}
