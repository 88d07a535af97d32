// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Credential extraction from HTTP request headers.
//!
//! Two transports carry the same opaque access token:
//!
//! - a session cookie set by the browser login flow
//! - an `Authorization: Bearer <token>` header for programmatic clients
//!
//! When both are present the session cookie wins.
//!
//! # Security
//!
//! Tokens are secrets. [`Credential`]'s `Debug` output never includes the
//! token, and nothing in this crate logs one.

use http::header::{AUTHORIZATION, COOKIE};
use http::HeaderMap;
use std::fmt;
use tracing::instrument;

/// Default name of the session cookie.
pub const SESSION_COOKIE_NAME: &str = "roster_session";

/// A presented credential, prior to resolution.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
	/// Token from an `Authorization: Bearer` header.
	Bearer(String),
	/// Token from the session cookie.
	Session(String),
}

impl Credential {
	/// The opaque token, regardless of transport.
	pub fn token(&self) -> &str {
		match self {
			Credential::Bearer(token) | Credential::Session(token) => token,
		}
	}

	/// Transport name for logging.
	pub fn kind(&self) -> &'static str {
		match self {
			Credential::Bearer(_) => "bearer",
			Credential::Session(_) => "session",
		}
	}
}

impl fmt::Debug for Credential {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Credential::Bearer(_) => f.write_str("Credential::Bearer([REDACTED])"),
			Credential::Session(_) => f.write_str("Credential::Session([REDACTED])"),
		}
	}
}

/// Extract the caller's credential, preferring the session cookie.
///
/// Empty tokens are treated as absent.
#[instrument(level = "trace", skip(headers), fields(credential_kind))]
pub fn extract_credential(headers: &HeaderMap, session_cookie_name: &str) -> Option<Credential> {
	let credential = extract_session_cookie_with_name(headers, session_cookie_name)
		.filter(|token| !token.is_empty())
		.map(Credential::Session)
		.or_else(|| {
			extract_bearer_token(headers)
				.filter(|token| !token.is_empty())
				.map(Credential::Bearer)
		});

	if let Some(credential) = &credential {
		tracing::Span::current().record("credential_kind", credential.kind());
	}
	credential
}

/// Extract the session token from the Cookie header.
///
/// # Arguments
///
/// * `headers` - The HTTP request headers
/// * `cookie_name` - The name of the session cookie to look for
pub fn extract_session_cookie_with_name(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
	headers
		.get(COOKIE)?
		.to_str()
		.ok()?
		.split(';')
		.find_map(|cookie| {
			let (name, value) = cookie.trim().split_once('=')?;
			(name == cookie_name).then(|| value.to_string())
		})
}

/// Extract a bearer token from the Authorization header.
///
/// Expects the format `Authorization: Bearer <token>`. The scheme prefix is
/// case-sensitive.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
	headers
		.get(AUTHORIZATION)?
		.to_str()
		.ok()?
		.strip_prefix("Bearer ")
		.map(|token| token.trim().to_string())
}
