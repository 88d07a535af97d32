// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Scope satisfaction decisions.
//!
//! [`ScopeAuthority`] answers one question: do a principal's assigned scopes
//! satisfy the scopes an operation requires? It is a pure function over its
//! inputs and an immutable [`ScopeCatalogue`], so a single instance can be
//! shared across request handlers without locking.
//!
//! # Inclusion is one-directional
//!
//! A required scope is satisfied when some assigned scope either equals it or
//! lists it among its included scopes. The required scope's own inclusions
//! are never consulted. Holding `super:*` therefore satisfies `user:write`,
//! but holding `user:read`, `user:write`, `admin:read` and `admin:write`
//! together does *not* satisfy a requirement for `super:*`.

use std::sync::Arc;
use tracing::{instrument, trace};

use crate::catalogue::ScopeCatalogue;
use crate::scope::{RequiredScopes, Scope};

/// Decides whether assigned scopes satisfy required scopes.
#[derive(Debug, Clone)]
pub struct ScopeAuthority {
	catalogue: Arc<ScopeCatalogue>,
}

impl ScopeAuthority {
	pub fn new(catalogue: Arc<ScopeCatalogue>) -> Self {
		Self { catalogue }
	}

	/// Authority over [`ScopeCatalogue::standard`].
	pub fn standard() -> Self {
		Self::new(Arc::new(ScopeCatalogue::standard()))
	}

	pub fn catalogue(&self) -> &ScopeCatalogue {
		&self.catalogue
	}

	/// Returns true if every required scope is granted by `assigned`.
	///
	/// An empty requirement is always satisfied. A non-empty requirement is
	/// never satisfied by an empty assignment. Otherwise the check stops at
	/// the first required scope that no assigned scope grants.
	#[instrument(
		level = "debug",
		skip_all,
		fields(required = %required.scope_str(), assigned = assigned.len()),
		ret
	)]
	pub fn is_satisfied(&self, required: &RequiredScopes, assigned: &[Scope]) -> bool {
		if required.is_empty() {
			return true;
		}

		if assigned.is_empty() {
			return false;
		}

		for required_scope in required {
			if !self.is_granted(required_scope, assigned) {
				trace!(scope = %required_scope, "required scope not granted");
				return false;
			}
		}

		true
	}

	/// Required scopes that are not individually granted by `assigned`.
	///
	/// Informational only; use [`is_satisfied`](Self::is_satisfied) for decisions.
	pub fn unsatisfied(&self, required: &RequiredScopes, assigned: &[Scope]) -> Vec<Scope> {
		required
			.iter()
			.filter(|scope| !self.is_granted(scope, assigned))
			.cloned()
			.collect()
	}

	/// Catalogue description of `scope`, `None` when it is not registered.
	pub fn describe(&self, scope: &Scope) -> Option<&str> {
		self.catalogue.describe(scope)
	}

	/// For each candidate scope, whether a UI control gated on it should be enabled.
	///
	/// With `bypass` set every control is enabled. Otherwise each candidate is
	/// checked on its own as a single-scope requirement.
	pub fn ui_affordance_states(
		&self,
		candidates: &[Scope],
		assigned: &[Scope],
		bypass: bool,
	) -> Vec<bool> {
		if bypass {
			return vec![true; candidates.len()];
		}

		candidates
			.iter()
			.map(|candidate| self.is_satisfied(&RequiredScopes::single(candidate.clone()), assigned))
			.collect()
	}

	/// Whether a single required scope is granted by some assigned scope.
	///
	/// Only the assigned scope's inclusion entry is consulted. An assigned scope
	/// missing from the inclusion table contributes nothing beyond itself.
	fn is_granted(&self, required: &Scope, assigned: &[Scope]) -> bool {
		assigned.iter().any(|held| {
			held == required || self.catalogue.included_scopes(held).contains(required)
		})
	}
}

impl Default for ScopeAuthority {
	fn default() -> Self {
		Self::standard()
	}
}
