// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The scope catalogue: descriptions plus the static inclusion table.
//!
//! A catalogue is built once at startup, either from [`ScopeCatalogue::standard`],
//! through [`ScopeCatalogue::builder`], or from a TOML file:
//!
//! ```toml
//! [[scopes]]
//! name = "user:read"
//! description = "Read own employee information"
//!
//! [[scopes]]
//! name = "super:*"
//! description = "Full access"
//! includes = ["user:read"]
//! ```
//!
//! Construction validates that every scope named by an inclusion edge is
//! itself defined. Cycles are not rejected; satisfaction checks only ever
//! look one edge deep, so a cycle cannot cause unbounded work.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::debug;

use crate::error::{CatalogueError, Result};
use crate::scope::Scope;

static NO_INCLUSIONS: BTreeSet<Scope> = BTreeSet::new();

/// Holding `scope` also grants every scope in `included_scopes`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InclusionEdge {
	pub scope: Scope,
	pub included_scopes: BTreeSet<Scope>,
}

impl InclusionEdge {
	pub fn new(scope: Scope, included_scopes: impl IntoIterator<Item = Scope>) -> Self {
		Self {
			scope,
			included_scopes: included_scopes.into_iter().collect(),
		}
	}

	/// Returns true if holding this edge's scope grants `scope`.
	pub fn includes(&self, scope: &Scope) -> bool {
		self.included_scopes.contains(scope)
	}
}

/// One entry of a serialized catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeDefinition {
	pub name: Scope,
	pub description: String,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub includes: Vec<Scope>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CatalogueFile {
	#[serde(default)]
	scopes: Vec<ScopeDefinition>,
}

/// Immutable scope catalogue and inclusion table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeCatalogue {
	descriptions: BTreeMap<Scope, String>,
	inclusions: BTreeMap<Scope, InclusionEdge>,
}

impl ScopeCatalogue {
	pub fn builder() -> ScopeCatalogueBuilder {
		ScopeCatalogueBuilder::default()
	}

	/// The employee directory catalogue: four narrow scopes and `super:*`,
	/// which includes all of them.
	pub fn standard() -> Self {
		let user_read = Scope::user_read();
		let user_write = Scope::user_write();
		let admin_read = Scope::admin_read();
		let admin_write = Scope::admin_write();
		let super_all = Scope::super_all();

		let descriptions = BTreeMap::from([
			(user_read.clone(), "Read own employee information".to_string()),
			(user_write.clone(), "Update own employee information".to_string()),
			(admin_read.clone(), "Search and read any employee information".to_string()),
			(admin_write.clone(), "Create and update any employee information".to_string()),
			(super_all.clone(), "Full access to the employee directory".to_string()),
		]);

		let edges = [
			InclusionEdge::new(user_read.clone(), []),
			InclusionEdge::new(user_write.clone(), []),
			InclusionEdge::new(admin_read.clone(), []),
			InclusionEdge::new(admin_write.clone(), []),
			InclusionEdge::new(
				super_all,
				[user_read, user_write, admin_read, admin_write],
			),
		];

		Self {
			descriptions,
			inclusions: edges.into_iter().map(|e| (e.scope.clone(), e)).collect(),
		}
	}

	/// Build a catalogue from serialized definitions.
	pub fn from_definitions(definitions: impl IntoIterator<Item = ScopeDefinition>) -> Result<Self> {
		definitions
			.into_iter()
			.fold(Self::builder(), |builder, def| {
				builder
					.define(def.name.clone(), def.description)
					.include(def.name, def.includes)
			})
			.build()
	}

	/// Parse a TOML catalogue document.
	pub fn from_toml_str(content: &str) -> Result<Self> {
		let file: CatalogueFile = toml::from_str(content)?;
		Self::from_definitions(file.scopes)
	}

	/// Read and parse a TOML catalogue file.
	pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		debug!(path = %path.display(), "loading scope catalogue");
		let content = std::fs::read_to_string(path).map_err(|e| CatalogueError::FileRead {
			path: path.to_path_buf(),
			source: e,
		})?;
		Self::from_toml_str(&content)
	}

	/// Human-readable description, or `None` for an unregistered scope.
	pub fn describe(&self, scope: &Scope) -> Option<&str> {
		self.descriptions.get(scope).map(String::as_str)
	}

	/// Scopes granted by holding `scope`. Empty for scopes without an entry.
	pub fn included_scopes(&self, scope: &Scope) -> &BTreeSet<Scope> {
		self
			.inclusions
			.get(scope)
			.map(|edge| &edge.included_scopes)
			.unwrap_or(&NO_INCLUSIONS)
	}

	/// The inclusion edge for `scope`, if it has one.
	pub fn inclusion(&self, scope: &Scope) -> Option<&InclusionEdge> {
		self.inclusions.get(scope)
	}

	pub fn contains(&self, scope: &Scope) -> bool {
		self.descriptions.contains_key(scope)
	}

	/// All registered scopes in name order.
	pub fn scopes(&self) -> impl Iterator<Item = &Scope> {
		self.descriptions.keys()
	}

	pub fn len(&self) -> usize {
		self.descriptions.len()
	}

	pub fn is_empty(&self) -> bool {
		self.descriptions.is_empty()
	}

	/// Serializable view of the catalogue.
	pub fn definitions(&self) -> Vec<ScopeDefinition> {
		self
			.descriptions
			.iter()
			.map(|(scope, description)| ScopeDefinition {
				name: scope.clone(),
				description: description.clone(),
				includes: self.included_scopes(scope).iter().cloned().collect(),
			})
			.collect()
	}

	/// Render the catalogue in the TOML file format.
	pub fn to_toml_string(&self) -> std::result::Result<String, toml::ser::Error> {
		toml::to_string(&CatalogueFile {
			scopes: self.definitions(),
		})
	}

	/// Check that every scope in `scopes` is registered.
	///
	/// `referenced_by` names the referencing entity in the error.
	pub fn ensure_known<'a>(
		&self,
		scopes: impl IntoIterator<Item = &'a Scope>,
		referenced_by: &str,
	) -> Result<()> {
		for scope in scopes {
			if !self.contains(scope) {
				return Err(CatalogueError::UnknownScope {
					scope: scope.to_string(),
					referenced_by: referenced_by.to_string(),
				});
			}
		}
		Ok(())
	}
}

/// Incremental catalogue construction with validation in [`build`](Self::build).
#[derive(Debug, Default)]
pub struct ScopeCatalogueBuilder {
	definitions: Vec<(Scope, String)>,
	inclusions: BTreeMap<Scope, BTreeSet<Scope>>,
}

impl ScopeCatalogueBuilder {
	/// Register a scope with its description.
	pub fn define(mut self, scope: Scope, description: impl Into<String>) -> Self {
		self.definitions.push((scope, description.into()));
		self
	}

	/// Declare that holding `scope` grants `included`. Repeated calls merge.
	pub fn include(mut self, scope: Scope, included: impl IntoIterator<Item = Scope>) -> Self {
		self.inclusions.entry(scope).or_default().extend(included);
		self
	}

	pub fn build(self) -> Result<ScopeCatalogue> {
		let mut descriptions = BTreeMap::new();
		for (scope, description) in self.definitions {
			if descriptions.contains_key(&scope) {
				return Err(CatalogueError::DuplicateScope(scope.to_string()));
			}
			descriptions.insert(scope, description);
		}

		let mut inclusions = BTreeMap::new();
		for (scope, included) in self.inclusions {
			if !descriptions.contains_key(&scope) {
				return Err(CatalogueError::UnknownScope {
					scope: scope.to_string(),
					referenced_by: "inclusion table".to_string(),
				});
			}
			if let Some(missing) = included.iter().find(|s| !descriptions.contains_key(*s)) {
				return Err(CatalogueError::UnknownScope {
					scope: missing.to_string(),
					referenced_by: scope.to_string(),
				});
			}
			inclusions.insert(
				scope.clone(),
				InclusionEdge {
					scope,
					included_scopes: included,
				},
			);
		}

		// Every scope gets an edge so the inclusion table covers the catalogue.
		for scope in descriptions.keys() {
			inclusions
				.entry(scope.clone())
				.or_insert_with(|| InclusionEdge::new(scope.clone(), []));
		}

		debug!(
			scopes = descriptions.len(),
			"scope catalogue built"
		);

		Ok(ScopeCatalogue {
			descriptions,
			inclusions,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::scope::{ADMIN_READ, ADMIN_WRITE, SUPER_ALL, USER_READ, USER_WRITE};

	fn scope(name: &str) -> Scope {
		Scope::parse(name).unwrap()
	}

	mod standard {
		use super::*;

		#[test]
		fn registers_the_five_directory_scopes() {
			let catalogue = ScopeCatalogue::standard();
			assert_eq!(catalogue.len(), 5);
			for name in [USER_READ, USER_WRITE, ADMIN_READ, ADMIN_WRITE, SUPER_ALL] {
				assert!(catalogue.contains(&scope(name)), "{name} missing");
				assert!(catalogue.describe(&scope(name)).is_some());
				assert!(catalogue.inclusion(&scope(name)).is_some());
			}
		}

		#[test]
		fn super_scope_includes_every_narrow_scope() {
			let catalogue = ScopeCatalogue::standard();
			let included = catalogue.included_scopes(&scope(SUPER_ALL));
			assert_eq!(included.len(), 4);
			for name in [USER_READ, USER_WRITE, ADMIN_READ, ADMIN_WRITE] {
				assert!(included.contains(&scope(name)));
			}
		}

		#[test]
		fn narrow_scopes_include_nothing() {
			let catalogue = ScopeCatalogue::standard();
			for name in [USER_READ, USER_WRITE, ADMIN_READ, ADMIN_WRITE] {
				assert!(catalogue.included_scopes(&scope(name)).is_empty());
			}
		}

		#[test]
		fn unknown_scope_has_no_description_or_inclusions() {
			let catalogue = ScopeCatalogue::standard();
			assert_eq!(catalogue.describe(&scope("payroll:read")), None);
			assert!(catalogue.included_scopes(&scope("payroll:read")).is_empty());
		}
	}

	mod builder {
		use super::*;

		#[test]
		fn rejects_duplicate_definition() {
			let result = ScopeCatalogue::builder()
				.define(scope("a:read"), "one")
				.define(scope("a:read"), "two")
				.build();
			assert!(matches!(result, Err(CatalogueError::DuplicateScope(s)) if s == "a:read"));
		}

		#[test]
		fn rejects_inclusion_of_undefined_scope() {
			let result = ScopeCatalogue::builder()
				.define(scope("a:*"), "all")
				.include(scope("a:*"), [scope("a:read")])
				.build();
			match result {
				Err(CatalogueError::UnknownScope {
					scope,
					referenced_by,
				}) => {
					assert_eq!(scope, "a:read");
					assert_eq!(referenced_by, "a:*");
				}
				other => panic!("expected UnknownScope, got {other:?}"),
			}
		}

		#[test]
		fn rejects_edge_for_undefined_scope() {
			let result = ScopeCatalogue::builder()
				.define(scope("a:read"), "read")
				.include(scope("a:*"), [scope("a:read")])
				.build();
			assert!(matches!(result, Err(CatalogueError::UnknownScope { .. })));
		}

		#[test]
		fn merges_repeated_includes() {
			let catalogue = ScopeCatalogue::builder()
				.define(scope("a:read"), "read")
				.define(scope("a:write"), "write")
				.define(scope("a:*"), "all")
				.include(scope("a:*"), [scope("a:read")])
				.include(scope("a:*"), [scope("a:write")])
				.build()
				.unwrap();
			assert_eq!(catalogue.included_scopes(&scope("a:*")).len(), 2);
		}

		#[test]
		fn accepts_cycles() {
			let catalogue = ScopeCatalogue::builder()
				.define(scope("a"), "a")
				.define(scope("b"), "b")
				.include(scope("a"), [scope("b")])
				.include(scope("b"), [scope("a")])
				.build()
				.unwrap();
			assert!(catalogue.included_scopes(&scope("a")).contains(&scope("b")));
		}

		#[test]
		fn ensure_known_reports_referencing_entity() {
			let catalogue = ScopeCatalogue::standard();
			let err = catalogue
				.ensure_known(&[scope("user:read"), scope("payroll:read")], "alice@example.com")
				.unwrap_err();
			assert!(err.to_string().contains("payroll:read"));
			assert!(err.to_string().contains("alice@example.com"));
		}
	}

	mod toml_format {
		use super::*;
		use std::io::Write;

		const SAMPLE: &str = r#"
[[scopes]]
name = "report:read"
description = "Read reports"

[[scopes]]
name = "report:*"
description = "All report access"
includes = ["report:read"]
"#;

		#[test]
		fn parses_definitions_and_inclusions() {
			let catalogue = ScopeCatalogue::from_toml_str(SAMPLE).unwrap();
			assert_eq!(catalogue.len(), 2);
			assert_eq!(catalogue.describe(&scope("report:read")), Some("Read reports"));
			assert!(catalogue
				.included_scopes(&scope("report:*"))
				.contains(&scope("report:read")));
		}

		#[test]
		fn rejects_invalid_scope_names() {
			let result = ScopeCatalogue::from_toml_str(
				r#"
[[scopes]]
name = "bad name"
description = "x"
"#,
			);
			assert!(matches!(result, Err(CatalogueError::TomlParse(_))));
		}

		#[test]
		fn rejects_dangling_include() {
			let result = ScopeCatalogue::from_toml_str(
				r#"
[[scopes]]
name = "report:*"
description = "x"
includes = ["report:read"]
"#,
			);
			assert!(matches!(result, Err(CatalogueError::UnknownScope { .. })));
		}

		#[test]
		fn standard_catalogue_survives_toml_rendering() {
			let standard = ScopeCatalogue::standard();
			let rendered = standard.to_toml_string().unwrap();
			let parsed = ScopeCatalogue::from_toml_str(&rendered).unwrap();
			assert_eq!(parsed, standard);
		}

		#[test]
		fn loads_from_file() {
			let mut file = tempfile::NamedTempFile::new().unwrap();
			file.write_all(SAMPLE.as_bytes()).unwrap();
			let catalogue = ScopeCatalogue::from_toml_file(file.path()).unwrap();
			assert_eq!(catalogue.len(), 2);
		}

		#[test]
		fn missing_file_is_a_read_error() {
			let result = ScopeCatalogue::from_toml_file("/nonexistent/scopes.toml");
			assert!(matches!(result, Err(CatalogueError::FileRead { .. })));
		}
	}
}
