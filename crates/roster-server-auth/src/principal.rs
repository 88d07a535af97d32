// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Principal identifiers.
//!
//! Employees sign in with their email address, so a [`PrincipalId`] is an
//! email-like string. It is trimmed and lowercased on construction so that
//! `Behai_Nguyen@Hotmail.com` and `behai_nguyen@hotmail.com` name the same
//! principal.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrincipalError {
	#[error("principal identifier must not be empty")]
	Empty,

	#[error("principal identifier is not an email address: {0}")]
	NotAnEmail(String),
}

/// Identity of an authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PrincipalId(String);

impl PrincipalId {
	pub fn parse(raw: &str) -> Result<Self, PrincipalError> {
		let normalized = raw.trim().to_lowercase();
		if normalized.is_empty() {
			return Err(PrincipalError::Empty);
		}

		match normalized.split_once('@') {
			Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(Self(normalized)),
			_ => Err(PrincipalError::NotAnEmail(raw.trim().to_string())),
		}
	}

	/// Build an identifier from a compile-time literal already in normal form.
	pub(crate) fn from_static(email: &'static str) -> Self {
		debug_assert!(
			Self::parse(email).is_ok_and(|id| id.as_str() == email),
			"invalid built-in principal {email}"
		);
		Self(email.to_string())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for PrincipalId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl FromStr for PrincipalId {
	type Err = PrincipalError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}

impl TryFrom<String> for PrincipalId {
	type Error = PrincipalError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::parse(&value)
	}
}

impl From<PrincipalId> for String {
	fn from(id: PrincipalId) -> Self {
		id.0
	}
}
