// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration management for the Roster authorization service.
//!
//! This crate provides:
//! - Layered configuration from multiple sources (defaults, TOML file, environment)
//! - Type-safe configuration with validation
//! - Consistent environment variable naming (`ROSTER_SERVER_*`)
//!
//! # Usage
//!
//! ```ignore
//! use roster_server_config::load_config;
//!
//! let config = load_config()?;
//! println!("UI bypass: {}", config.auth.enable_no_scopes_ui);
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::ServerConfigLayer;
pub use sections::*;
pub use sources::{
	ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource, SYSTEM_CONFIG_PATH,
};

use tracing::{debug, info};

/// Fully resolved configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServerConfig {
	pub auth: AuthConfig,
	pub scopes: ScopesConfig,
	pub logging: LoggingConfig,
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`ROSTER_SERVER_*`)
/// 2. Config file (`/etc/roster/server.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Load configuration from environment only.
pub fn load_config_from_env() -> Result<ServerConfig, ConfigError> {
	let mut merged = ServerConfigLayer::default();
	merged.merge(EnvSource.load()?);
	finalize(merged)
}

/// Load configuration with a custom config file path in place of the system one.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	])
}

fn load_from_sources(mut sources: Vec<Box<dyn ConfigSource>>) -> Result<ServerConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = ServerConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		merged.merge(source.load()?);
	}

	finalize(merged)
}

/// Resolve a merged layer, applying defaults and validation.
pub fn finalize(layer: ServerConfigLayer) -> Result<ServerConfig, ConfigError> {
	let auth = layer.auth.unwrap_or_default().finalize();
	let scopes = layer.scopes.unwrap_or_default().finalize();
	let logging = layer.logging.unwrap_or_default().finalize();

	validate_config(&auth)?;

	info!(
		environment = %auth.environment,
		no_scopes_ui = auth.enable_no_scopes_ui,
		access_token_ttl_secs = auth.access_token_ttl_secs,
		catalogue = ?scopes.catalogue_path,
		default_scopes = ?scopes.default_scopes,
		assignments = scopes.assignments.len(),
		"Server configuration loaded"
	);

	Ok(ServerConfig {
		auth,
		scopes,
		logging,
	})
}

/// Validate cross-field configuration rules.
fn validate_config(auth: &AuthConfig) -> Result<(), ConfigError> {
	if auth.enable_no_scopes_ui && auth.is_production() {
		return Err(ConfigError::Validation(
			"ROSTER_SERVER_ENABLE_NO_SCOPES_UI is set while ROSTER_SERVER_ENV=production. \
			 Scope-gated UI controls would be shown to every user. Unset the flag or set \
			 ROSTER_SERVER_ENV to a non-production value."
				.to_string(),
		));
	}

	if auth.access_token_ttl_secs == 0 {
		return Err(ConfigError::Validation(
			"ROSTER_SERVER_ACCESS_TOKEN_TTL_SECS must be greater than zero.".to_string(),
		));
	}

	Ok(())
}
