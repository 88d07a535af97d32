// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authentication and UI gating configuration section.

use serde::{Deserialize, Serialize};

pub const DEFAULT_ENVIRONMENT: &str = "development";
const DEFAULT_SESSION_COOKIE_NAME: &str = "roster_session";
pub const DEFAULT_ACCESS_TOKEN_TTL_SECS: u64 = 30 * 60;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AuthConfigLayer {
	pub enable_no_scopes_ui: Option<bool>,
	pub environment: Option<String>,
	pub session_cookie_name: Option<String>,
	pub access_token_ttl_secs: Option<u64>,
}

impl AuthConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.enable_no_scopes_ui.is_some() {
			self.enable_no_scopes_ui = other.enable_no_scopes_ui;
		}
		if other.environment.is_some() {
			self.environment = other.environment;
		}
		if other.session_cookie_name.is_some() {
			self.session_cookie_name = other.session_cookie_name;
		}
		if other.access_token_ttl_secs.is_some() {
			self.access_token_ttl_secs = other.access_token_ttl_secs;
		}
	}

	pub fn finalize(self) -> AuthConfig {
		AuthConfig {
			enable_no_scopes_ui: self.enable_no_scopes_ui.unwrap_or(false),
			environment: self
				.environment
				.unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string()),
			session_cookie_name: self
				.session_cookie_name
				.unwrap_or_else(|| DEFAULT_SESSION_COOKIE_NAME.to_string()),
			access_token_ttl_secs: self
				.access_token_ttl_secs
				.unwrap_or(DEFAULT_ACCESS_TOKEN_TTL_SECS),
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthConfig {
	/// Enable every scope-gated UI control regardless of assigned scopes.
	/// Server-side authorization is unaffected.
	pub enable_no_scopes_ui: bool,
	pub environment: String,
	pub session_cookie_name: String,
	/// Lifetime of an issued access token, in seconds.
	pub access_token_ttl_secs: u64,
}

impl AuthConfig {
	pub fn is_production(&self) -> bool {
		self.environment == "production"
	}
}

impl Default for AuthConfig {
	fn default() -> Self {
		AuthConfigLayer::default().finalize()
	}
}
