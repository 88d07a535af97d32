// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Scope catalogue and assignment configuration section.
//!
//! Scope names are kept as plain strings here and validated when the
//! catalogue and assignment table are built.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

fn default_scopes() -> Vec<String> {
	vec!["user:read".to_string()]
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ScopesConfigLayer {
	pub catalogue_path: Option<PathBuf>,
	pub default_scopes: Option<Vec<String>>,
	pub assignments: Option<BTreeMap<String, Vec<String>>>,
}

impl ScopesConfigLayer {
	/// Assignment tables are merged per principal; a principal listed in
	/// `other` replaces that principal's row.
	pub fn merge(&mut self, other: Self) {
		if other.catalogue_path.is_some() {
			self.catalogue_path = other.catalogue_path;
		}
		if other.default_scopes.is_some() {
			self.default_scopes = other.default_scopes;
		}
		if let Some(assignments) = other.assignments {
			self
				.assignments
				.get_or_insert_with(BTreeMap::new)
				.extend(assignments);
		}
	}

	pub fn finalize(self) -> ScopesConfig {
		ScopesConfig {
			catalogue_path: self.catalogue_path,
			default_scopes: self.default_scopes.unwrap_or_else(default_scopes),
			assignments: self.assignments.unwrap_or_default(),
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScopesConfig {
	/// TOML catalogue to load instead of the built-in one.
	pub catalogue_path: Option<PathBuf>,
	/// Scopes for principals without an explicit assignment.
	pub default_scopes: Vec<String>,
	/// Principal email to assigned scope names.
	pub assignments: BTreeMap<String, Vec<String>>,
}

impl Default for ScopesConfig {
	fn default() -> Self {
		ScopesConfigLayer::default().finalize()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_default_values() {
		let config = ScopesConfig::default();
		assert!(config.catalogue_path.is_none());
		assert_eq!(config.default_scopes, vec!["user:read".to_string()]);
		assert!(config.assignments.is_empty());
	}

	#[test]
	fn test_merge_combines_assignment_rows() {
		let mut base = ScopesConfigLayer {
			assignments: Some(BTreeMap::from([
				("a@example.com".to_string(), vec!["user:read".to_string()]),
				("b@example.com".to_string(), vec!["user:read".to_string()]),
			])),
			..Default::default()
		};
		base.merge(ScopesConfigLayer {
			assignments: Some(BTreeMap::from([(
				"b@example.com".to_string(),
				vec!["admin:read".to_string()],
			)])),
			..Default::default()
		});

		let config = base.finalize();
		assert_eq!(config.assignments["a@example.com"], vec!["user:read".to_string()]);
		assert_eq!(config.assignments["b@example.com"], vec!["admin:read".to_string()]);
	}

	#[test]
	fn test_explicit_empty_default_scopes() {
		let layer: ScopesConfigLayer = toml::from_str("default_scopes = []").unwrap();
		assert!(layer.finalize().default_scopes.is_empty());
	}
}
