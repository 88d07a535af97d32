// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Scope identifiers and required-scope sets.
//!
//! - [`Scope`]: a validated capability name such as `user:read` or `super:*`
//! - [`RequiredScopes`]: the de-duplicated, declaration-ordered set of scopes
//!   an operation demands
//!
//! Scope names travel inside `WWW-Authenticate: Bearer scope="..."`
//! challenges, where individual scopes are separated by spaces. A scope name
//! is limited to printable ASCII without space, `"` or `\`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ScopeError;

/// Read own employee record.
pub const USER_READ: &str = "user:read";
/// Update own employee record.
pub const USER_WRITE: &str = "user:write";
/// Search and read any employee record.
pub const ADMIN_READ: &str = "admin:read";
/// Create and update any employee record.
pub const ADMIN_WRITE: &str = "admin:write";
/// Every capability in the directory.
pub const SUPER_ALL: &str = "super:*";

/// A named capability.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Scope(String);

impl Scope {
	/// Parse and validate a scope name.
	pub fn parse(name: &str) -> Result<Self, ScopeError> {
		Self::validate(name)?;
		Ok(Self(name.to_string()))
	}

	/// Build a scope from a compile-time constant known to be valid.
	pub(crate) fn from_static(name: &'static str) -> Self {
		debug_assert!(Self::validate(name).is_ok(), "invalid built-in scope {name}");
		Self(name.to_string())
	}

	pub fn user_read() -> Self {
		Self::from_static(USER_READ)
	}

	pub fn user_write() -> Self {
		Self::from_static(USER_WRITE)
	}

	pub fn admin_read() -> Self {
		Self::from_static(ADMIN_READ)
	}

	pub fn admin_write() -> Self {
		Self::from_static(ADMIN_WRITE)
	}

	pub fn super_all() -> Self {
		Self::from_static(SUPER_ALL)
	}

	/// Returns the scope name.
	pub fn as_str(&self) -> &str {
		&self.0
	}

	fn validate(name: &str) -> Result<(), ScopeError> {
		if name.is_empty() {
			return Err(ScopeError::Empty);
		}
		if name
			.chars()
			.any(|c| !c.is_ascii_graphic() || c == '"' || c == '\\')
		{
			return Err(ScopeError::InvalidCharacter(name.to_string()));
		}
		Ok(())
	}
}

impl fmt::Display for Scope {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl FromStr for Scope {
	type Err = ScopeError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}

impl TryFrom<String> for Scope {
	type Error = ScopeError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::validate(&value)?;
		Ok(Self(value))
	}
}

impl From<Scope> for String {
	fn from(scope: Scope) -> Self {
		scope.0
	}
}

impl AsRef<str> for Scope {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

impl PartialEq<str> for Scope {
	fn eq(&self, other: &str) -> bool {
		self.0 == other
	}
}

impl PartialEq<&str> for Scope {
	fn eq(&self, other: &&str) -> bool {
		self.0 == *other
	}
}

/// Parse a list of scope names, failing on the first invalid one.
pub fn parse_scopes<I, S>(names: I) -> Result<Vec<Scope>, ScopeError>
where
	I: IntoIterator<Item = S>,
	S: AsRef<str>,
{
	names.into_iter().map(|n| Scope::parse(n.as_ref())).collect()
}

/// The set of scopes an operation requires.
///
/// Duplicates are dropped while the first-seen order is kept, so the
/// challenge string lists scopes the way the route declared them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequiredScopes(Vec<Scope>);

impl RequiredScopes {
	/// No scope needed. Always satisfied.
	pub fn none() -> Self {
		Self(Vec::new())
	}

	/// Build a requirement from scopes, dropping repeats.
	pub fn new(scopes: impl IntoIterator<Item = Scope>) -> Self {
		let mut out: Vec<Scope> = Vec::new();
		for scope in scopes {
			if !out.contains(&scope) {
				out.push(scope);
			}
		}
		Self(out)
	}

	/// Requirement consisting of a single scope.
	pub fn single(scope: Scope) -> Self {
		Self(vec![scope])
	}

	/// Parse a requirement from scope names.
	pub fn parse<I, S>(names: I) -> Result<Self, ScopeError>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		Ok(Self::new(parse_scopes(names)?))
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn iter(&self) -> std::slice::Iter<'_, Scope> {
		self.0.iter()
	}

	pub fn contains(&self, scope: &Scope) -> bool {
		self.0.contains(scope)
	}

	pub fn as_slice(&self) -> &[Scope] {
		&self.0
	}

	/// Space-separated scope names, as used in a `scope="..."` challenge parameter.
	pub fn scope_str(&self) -> String {
		self
			.0
			.iter()
			.map(Scope::as_str)
			.collect::<Vec<_>>()
			.join(" ")
	}
}

impl FromIterator<Scope> for RequiredScopes {
	fn from_iter<T: IntoIterator<Item = Scope>>(iter: T) -> Self {
		Self::new(iter)
	}
}

impl<'a> IntoIterator for &'a RequiredScopes {
	type Item = &'a Scope;
	type IntoIter = std::slice::Iter<'a, Scope>;

	fn into_iter(self) -> Self::IntoIter {
		self.0.iter()
	}
}
