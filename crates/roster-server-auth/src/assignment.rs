// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Per-principal scope assignments.
//!
//! A [`ScopeAssignmentStore`] answers "which scopes does this principal
//! hold?". [`StaticScopeAssignments`] is a fixed table with an optional
//! default row that applies to every principal not listed explicitly.

use async_trait::async_trait;
use roster_scope_core::{parse_scopes, CatalogueError, Scope, ScopeCatalogue, ScopeError};
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

use crate::principal::{PrincipalError, PrincipalId};

#[derive(Debug, Error)]
pub enum AssignmentError {
	#[error("invalid principal in assignment table: {0}")]
	InvalidPrincipal(#[from] PrincipalError),

	#[error("invalid scope in assignment table: {0}")]
	InvalidScope(#[from] ScopeError),

	#[error("scope assignments unavailable: {0}")]
	Unavailable(String),
}

/// Source of assigned scopes.
#[async_trait]
pub trait ScopeAssignmentStore: Send + Sync {
	/// Scopes held by `principal`, or `None` when the principal is unknown.
	async fn scopes_for(
		&self,
		principal: &PrincipalId,
	) -> Result<Option<Vec<Scope>>, AssignmentError>;
}

/// Fixed assignment table.
#[derive(Debug, Clone, Default)]
pub struct StaticScopeAssignments {
	assignments: HashMap<PrincipalId, Vec<Scope>>,
	default_scopes: Option<Vec<Scope>>,
}

impl StaticScopeAssignments {
	/// Empty table with no default row. Every principal is unknown.
	pub fn new() -> Self {
		Self::default()
	}

	/// Scopes for principals without an explicit row.
	pub fn with_default_scopes(mut self, scopes: Vec<Scope>) -> Self {
		self.default_scopes = Some(scopes);
		self
	}

	pub fn with_assignment(mut self, principal: PrincipalId, scopes: Vec<Scope>) -> Self {
		self.assignments.insert(principal, scopes);
		self
	}

	/// Build a table from raw names, as found in configuration.
	pub fn from_names<'a, I>(default_scopes: &[String], assignments: I) -> Result<Self, AssignmentError>
	where
		I: IntoIterator<Item = (&'a String, &'a Vec<String>)>,
	{
		let mut table = Self::new().with_default_scopes(parse_scopes(default_scopes)?);
		for (principal, scopes) in assignments {
			table = table.with_assignment(PrincipalId::parse(principal)?, parse_scopes(scopes)?);
		}
		Ok(table)
	}

	/// The demonstration directory's assignments.
	///
	/// Unlisted principals hold `user:read`.
	pub fn demo() -> Self {
		let rows: [(&'static str, Vec<Scope>); 4] = [
			("moss.shanbhogue.10045@gmail.com", vec![]),
			(
				"behai_nguyen@hotmail.com",
				vec![Scope::user_read(), Scope::user_write()],
			),
			(
				"kyoichi.maliniak.10005@gmail.com",
				vec![Scope::admin_read(), Scope::admin_write()],
			),
			("mary.sluis.10011@gmail.com", vec![Scope::super_all()]),
		];

		let mut table = Self::new().with_default_scopes(vec![Scope::user_read()]);
		for (email, scopes) in rows {
			table = table.with_assignment(PrincipalId::from_static(email), scopes);
		}
		table
	}

	/// Explicit row for `principal`, falling back to the default row.
	pub fn get(&self, principal: &PrincipalId) -> Option<&[Scope]> {
		self
			.assignments
			.get(principal)
			.or(self.default_scopes.as_ref())
			.map(Vec::as_slice)
	}

	pub fn default_scopes(&self) -> Option<&[Scope]> {
		self.default_scopes.as_deref()
	}

	pub fn principals(&self) -> impl Iterator<Item = &PrincipalId> {
		self.assignments.keys()
	}

	/// Every assigned scope, including the default row, must be in `catalogue`.
	pub fn validate_against(&self, catalogue: &ScopeCatalogue) -> Result<(), CatalogueError> {
		if let Some(default_scopes) = &self.default_scopes {
			catalogue.ensure_known(default_scopes, "default scope assignment")?;
		}
		for (principal, scopes) in &self.assignments {
			catalogue.ensure_known(scopes, &format!("assignment for {principal}"))?;
		}
		Ok(())
	}
}

#[async_trait]
impl ScopeAssignmentStore for StaticScopeAssignments {
	async fn scopes_for(
		&self,
		principal: &PrincipalId,
	) -> Result<Option<Vec<Scope>>, AssignmentError> {
		let scopes = self.get(principal).map(<[Scope]>::to_vec);
		debug!(
			principal = %principal,
			found = scopes.is_some(),
			"looked up scope assignment"
		);
		Ok(scopes)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use roster_scope_core::RequiredScopes;
	use std::collections::BTreeMap;

	fn principal(email: &str) -> PrincipalId {
		PrincipalId::parse(email).unwrap()
	}

	mod demo_table {
		use super::*;

		#[test]
		fn lists_known_principals() {
			let table = StaticScopeAssignments::demo();

			assert_eq!(table.get(&principal("moss.shanbhogue.10045@gmail.com")), Some(&[][..]));
			assert_eq!(
				table.get(&principal("kyoichi.maliniak.10005@gmail.com")),
				Some(&[Scope::admin_read(), Scope::admin_write()][..])
			);
			assert_eq!(
				table.get(&principal("mary.sluis.10011@gmail.com")),
				Some(&[Scope::super_all()][..])
			);
		}

		#[test]
		fn every_row_is_present() {
			let table = StaticScopeAssignments::demo();
			let mut principals: Vec<&str> = table.principals().map(PrincipalId::as_str).collect();
			principals.sort_unstable();
			assert_eq!(
				principals,
				vec![
					"behai_nguyen@hotmail.com",
					"kyoichi.maliniak.10005@gmail.com",
					"mary.sluis.10011@gmail.com",
					"moss.shanbhogue.10045@gmail.com",
				]
			);
		}

		#[test]
		fn lookup_is_case_insensitive() {
			let table = StaticScopeAssignments::demo();
			assert_eq!(
				table.get(&principal("Behai_Nguyen@Hotmail.com")),
				Some(&[Scope::user_read(), Scope::user_write()][..])
			);
		}

		#[test]
		fn unlisted_principal_gets_default_row() {
			let table = StaticScopeAssignments::demo();
			assert_eq!(
				table.get(&principal("someone.else@example.com")),
				Some(&[Scope::user_read()][..])
			);
		}

		#[test]
		fn is_consistent_with_standard_catalogue() {
			let table = StaticScopeAssignments::demo();
			assert!(table.validate_against(&ScopeCatalogue::standard()).is_ok());
		}
	}

	mod from_names {
		use super::*;

		#[test]
		fn parses_configuration_rows() {
			let mut rows = BTreeMap::new();
			rows.insert(
				"ops@example.com".to_string(),
				vec!["admin:read".to_string()],
			);

			let table = StaticScopeAssignments::from_names(&[], &rows).unwrap();
			assert_eq!(
				table.get(&principal("ops@example.com")),
				Some(&[Scope::admin_read()][..])
			);
			assert_eq!(table.get(&principal("other@example.com")), Some(&[][..]));
		}

		#[test]
		fn rejects_bad_principal() {
			let mut rows = BTreeMap::new();
			rows.insert("not-an-email".to_string(), vec![]);

			let result = StaticScopeAssignments::from_names(&[], &rows);
			assert!(matches!(result, Err(AssignmentError::InvalidPrincipal(_))));
		}

		#[test]
		fn rejects_bad_scope() {
			let mut rows = BTreeMap::new();
			rows.insert("ops@example.com".to_string(), vec!["admin read".to_string()]);

			let result = StaticScopeAssignments::from_names(&[], &rows);
			assert!(matches!(result, Err(AssignmentError::InvalidScope(_))));
		}
	}

	#[test]
	fn validate_against_rejects_uncatalogued_scope() {
		let table = StaticScopeAssignments::new().with_assignment(
			principal("ops@example.com"),
			vec![Scope::parse("reports:read").unwrap()],
		);

		let err = table
			.validate_against(&ScopeCatalogue::standard())
			.unwrap_err();
		assert!(matches!(err, CatalogueError::UnknownScope { .. }));
	}

	#[tokio::test]
	async fn strict_table_reports_unknown_principal() {
		let table = StaticScopeAssignments::new()
			.with_assignment(principal("ops@example.com"), vec![Scope::admin_read()]);

		let known = table.scopes_for(&principal("ops@example.com")).await.unwrap();
		assert_eq!(known, Some(vec![Scope::admin_read()]));

		let unknown = table.scopes_for(&principal("guest@example.com")).await.unwrap();
		assert_eq!(unknown, None);
	}

	#[test]
	fn demo_assignments_drive_scope_checks() {
		let table = StaticScopeAssignments::demo();
		let authority = roster_scope_core::ScopeAuthority::standard();
		let required = RequiredScopes::single(Scope::user_write());

		let mary = table.get(&principal("mary.sluis.10011@gmail.com")).unwrap();
		let kyoichi = table.get(&principal("kyoichi.maliniak.10005@gmail.com")).unwrap();

		assert!(authority.is_satisfied(&required, mary));
		assert!(!authority.is_satisfied(&required, kyoichi));
	}
}
