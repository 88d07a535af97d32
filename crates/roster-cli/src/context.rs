// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authorization components assembled from configuration.

use anyhow::{Context, Result};
use roster_scope_core::{parse_scopes, ScopeAuthority, ScopeCatalogue};
use roster_server_auth::{InMemoryIdentityResolver, RouteTable, StaticScopeAssignments};
use roster_server_config::ServerConfig;
use std::sync::Arc;
use tracing::{debug, info};

pub struct AuthzContext {
	pub authority: ScopeAuthority,
	pub assignments: Arc<StaticScopeAssignments>,
	pub routes: RouteTable,
	pub bypass_ui: bool,
	pub access_token_ttl_secs: u64,
}

impl AuthzContext {
	/// Build and cross-check the catalogue, assignments and routes.
	///
	/// With no assignments configured, the demonstration table is used with
	/// the configured default scopes.
	pub fn from_config(config: &ServerConfig) -> Result<Self> {
		let catalogue = match &config.scopes.catalogue_path {
			Some(path) => ScopeCatalogue::from_toml_file(path)
				.with_context(|| format!("loading scope catalogue from {}", path.display()))?,
			None => ScopeCatalogue::standard(),
		};

		let assignments = if config.scopes.assignments.is_empty() {
			debug!("no assignments configured, using demonstration table");
			let default_scopes = parse_scopes(&config.scopes.default_scopes)
				.context("parsing default scopes")?;
			StaticScopeAssignments::demo().with_default_scopes(default_scopes)
		} else {
			StaticScopeAssignments::from_names(
				&config.scopes.default_scopes,
				&config.scopes.assignments,
			)
			.context("parsing scope assignments")?
		};

		assignments
			.validate_against(&catalogue)
			.context("scope assignments reference unknown scopes")?;

		let routes = RouteTable::employee_directory();
		routes
			.validate_against(&catalogue)
			.context("route requirements reference unknown scopes")?;

		info!(
			scopes = catalogue.len(),
			routes = routes.len(),
			bypass_ui = config.auth.enable_no_scopes_ui,
			access_token_ttl_secs = config.auth.access_token_ttl_secs,
			"authorization context ready"
		);

		Ok(Self {
			authority: ScopeAuthority::new(Arc::new(catalogue)),
			assignments: Arc::new(assignments),
			routes,
			bypass_ui: config.auth.enable_no_scopes_ui,
			access_token_ttl_secs: config.auth.access_token_ttl_secs,
		})
	}

	/// Token table over the configured assignments, issuing tokens with the
	/// configured lifetime.
	pub fn identity_resolver(&self) -> Arc<InMemoryIdentityResolver> {
		Arc::new(
			InMemoryIdentityResolver::new(self.assignments.clone())
				.with_ttl_secs(self.access_token_ttl_secs),
		)
	}
}
