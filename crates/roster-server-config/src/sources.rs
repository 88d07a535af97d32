// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: built-in defaults, TOML files and environment variables.

use std::path::PathBuf;

use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::layer::ServerConfigLayer;
use crate::sections::{AuthConfigLayer, LoggingConfigLayer, ScopesConfigLayer};

/// Location of the system-wide config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/roster/server.toml";

/// Legacy name for the UI bypass flag, honoured when the prefixed one is unset.
pub const LEGACY_NO_SCOPES_UI_ENV_VAR: &str = "ENABLE_NO_SCOPES_UI";

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<ServerConfigLayer, ConfigError>;
}

pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		debug!("loading defaults");
		Ok(ServerConfigLayer::default())
	}
}

/// TOML file configuration source. A missing file yields an empty layer.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn system() -> Self {
		Self::new(SYSTEM_CONFIG_PATH)
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(ServerConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: ServerConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: ROSTER_SERVER_<FIELD>
pub struct EnvSource;

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		debug!("loading environment variables");
		Ok(ServerConfigLayer {
			auth: Some(load_auth_from_env()?),
			scopes: Some(load_scopes_from_env()),
			logging: Some(load_logging_from_env()),
		})
	}
}

fn env_var(name: &str) -> Option<String> {
	std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
	match value.trim().to_ascii_lowercase().as_str() {
		"true" | "1" | "yes" | "on" => Ok(true),
		"false" | "0" | "no" | "off" => Ok(false),
		_ => Err(ConfigError::InvalidValue {
			key: key.to_string(),
			message: format!("invalid boolean value '{value}'"),
		}),
	}
}

fn env_bool(name: &str) -> Result<Option<bool>, ConfigError> {
	env_var(name).map(|v| parse_bool(name, &v)).transpose()
}

fn env_u64(name: &str) -> Result<Option<u64>, ConfigError> {
	env_var(name)
		.map(|v| {
			v.trim().parse::<u64>().map_err(|e| ConfigError::InvalidValue {
				key: name.to_string(),
				message: format!("invalid unsigned integer '{v}': {e}"),
			})
		})
		.transpose()
}

fn env_list(name: &str) -> Option<Vec<String>> {
	env_var(name).map(|s| {
		s.split(',')
			.map(|s| s.trim().to_string())
			.filter(|s| !s.is_empty())
			.collect()
	})
}

fn load_auth_from_env() -> Result<AuthConfigLayer, ConfigError> {
	let enable_no_scopes_ui = match env_bool("ROSTER_SERVER_ENABLE_NO_SCOPES_UI")? {
		Some(enabled) => Some(enabled),
		None => env_bool(LEGACY_NO_SCOPES_UI_ENV_VAR)?,
	};

	Ok(AuthConfigLayer {
		enable_no_scopes_ui,
		environment: env_var("ROSTER_SERVER_ENV"),
		session_cookie_name: env_var("ROSTER_SERVER_SESSION_COOKIE_NAME"),
		access_token_ttl_secs: env_u64("ROSTER_SERVER_ACCESS_TOKEN_TTL_SECS")?,
	})
}

fn load_scopes_from_env() -> ScopesConfigLayer {
	ScopesConfigLayer {
		catalogue_path: env_var("ROSTER_SERVER_SCOPE_CATALOGUE").map(PathBuf::from),
		default_scopes: env_list("ROSTER_SERVER_DEFAULT_SCOPES"),
		assignments: None,
	}
}

fn load_logging_from_env() -> LoggingConfigLayer {
	LoggingConfigLayer {
		level: env_var("ROSTER_SERVER_LOG_LEVEL"),
	}
}
