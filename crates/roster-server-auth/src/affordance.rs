// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Template-ready view of which scope-gated UI controls are enabled.

use roster_scope_core::{Scope, ScopeAuthority};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScopeAffordance {
	pub scope: Scope,
	/// `None` when the scope is not in the catalogue.
	pub description: Option<String>,
	pub enabled: bool,
}

/// One entry per candidate, in candidate order.
///
/// `bypass` enables every control regardless of `assigned`.
pub fn affordance_view(
	authority: &ScopeAuthority,
	candidates: &[Scope],
	assigned: &[Scope],
	bypass: bool,
) -> Vec<ScopeAffordance> {
	let states = authority.ui_affordance_states(candidates, assigned, bypass);

	candidates
		.iter()
		.zip(states)
		.map(|(scope, enabled)| ScopeAffordance {
			scope: scope.clone(),
			description: authority.describe(scope).map(str::to_string),
			enabled,
		})
		.collect()
}
