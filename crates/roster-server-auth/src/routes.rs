// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Route-level scope requirements.
//!
//! Each route declares either public access or the scopes it requires.
//! Patterns are `/`-separated with `{name}` placeholders matching exactly one
//! non-empty segment.

use http::Method;
use roster_scope_core::{CatalogueError, RequiredScopes, Scope, ScopeCatalogue};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "access", content = "scopes", rename_all = "snake_case")]
pub enum RouteAccess {
	/// Reachable without a credential.
	Public,
	/// Needs an authenticated caller holding the listed scopes.
	Protected(RequiredScopes),
}

#[derive(Debug, Clone)]
pub struct RouteRequirement {
	pub method: Method,
	pub pattern: String,
	pub access: RouteAccess,
}

impl RouteRequirement {
	pub fn matches(&self, method: &Method, path: &str) -> bool {
		&self.method == method && pattern_matches(&self.pattern, path)
	}
}

/// Ordered route table. The first matching entry wins.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
	routes: Vec<RouteRequirement>,
}

impl RouteTable {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn public(mut self, method: Method, pattern: impl Into<String>) -> Self {
		self.routes.push(RouteRequirement {
			method,
			pattern: pattern.into(),
			access: RouteAccess::Public,
		});
		self
	}

	pub fn protected(
		mut self,
		method: Method,
		pattern: impl Into<String>,
		scopes: impl IntoIterator<Item = Scope>,
	) -> Self {
		self.routes.push(RouteRequirement {
			method,
			pattern: pattern.into(),
			access: RouteAccess::Protected(RequiredScopes::new(scopes)),
		});
		self
	}

	/// Routes of the employee directory application.
	pub fn employee_directory() -> Self {
		Self::new()
			.public(Method::GET, "/auth/login")
			.public(Method::GET, "/auth/home")
			.public(Method::POST, "/auth/token")
			.public(Method::POST, "/auth/logout")
			.public(Method::POST, "/api/login")
			.protected(Method::GET, "/admin/me", [Scope::user_read()])
			.protected(Method::GET, "/api/me", [Scope::user_read()])
			.protected(Method::GET, "/emp/search", [Scope::admin_read()])
			.protected(
				Method::GET,
				"/emp/search/{last_name}/{first_name}",
				[Scope::admin_read()],
			)
			.protected(
				Method::POST,
				"/emp/search/{last_name}/{first_name}",
				[Scope::admin_read()],
			)
			.protected(
				Method::GET,
				"/emp/admin-get-update/{emp_no}",
				[Scope::admin_read()],
			)
			.protected(
				Method::GET,
				"/emp/own-get-update/{emp_no}",
				[Scope::user_read()],
			)
			.protected(Method::POST, "/emp/admin-save", [Scope::admin_write()])
			.protected(Method::GET, "/emp/new", [Scope::admin_write()])
			.protected(Method::POST, "/emp/user-save", [Scope::user_write()])
	}

	/// First route matching `method` and `path`. Any query string is ignored.
	pub fn lookup(&self, method: &Method, path: &str) -> Option<&RouteRequirement> {
		let path = path.split_once('?').map_or(path, |(path, _)| path);
		self.routes.iter().find(|route| route.matches(method, path))
	}

	pub fn iter(&self) -> std::slice::Iter<'_, RouteRequirement> {
		self.routes.iter()
	}

	pub fn len(&self) -> usize {
		self.routes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.routes.is_empty()
	}

	/// Every required scope must be registered in `catalogue`.
	pub fn validate_against(&self, catalogue: &ScopeCatalogue) -> Result<(), CatalogueError> {
		for route in &self.routes {
			if let RouteAccess::Protected(required) = &route.access {
				catalogue.ensure_known(required, &format!("route {} {}", route.method, route.pattern))?;
			}
		}
		Ok(())
	}
}

fn pattern_matches(pattern: &str, path: &str) -> bool {
	let mut pattern_segments = pattern.trim_end_matches('/').split('/');
	let mut path_segments = path.trim_end_matches('/').split('/');

	loop {
		match (pattern_segments.next(), path_segments.next()) {
			(None, None) => return true,
			(Some(expected), Some(actual)) => {
				let is_param = expected.starts_with('{') && expected.ends_with('}');
				if is_param {
					if actual.is_empty() {
						return false;
					}
				} else if expected != actual {
					return false;
				}
			}
			_ => return false,
		}
	}
}
