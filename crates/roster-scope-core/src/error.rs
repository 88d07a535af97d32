// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for scope parsing and catalogue construction.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for catalogue operations.
pub type Result<T> = std::result::Result<T, CatalogueError>;

/// Errors raised when a scope name is malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScopeError {
	#[error("scope name must not be empty")]
	Empty,

	#[error("scope name must be printable ASCII without space, quote or backslash: {0:?}")]
	InvalidCharacter(String),
}

/// Errors raised while building or loading a scope catalogue.
#[derive(Debug, Error)]
pub enum CatalogueError {
	#[error("invalid scope: {0}")]
	InvalidScope(#[from] ScopeError),

	#[error("scope defined more than once: {0}")]
	DuplicateScope(String),

	#[error("scope {scope} referenced by {referenced_by} is not in the catalogue")]
	UnknownScope { scope: String, referenced_by: String },

	#[error("failed to read catalogue file {path}: {source}")]
	FileRead {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("failed to parse catalogue: {0}")]
	TomlParse(#[from] toml::de::Error),
}
