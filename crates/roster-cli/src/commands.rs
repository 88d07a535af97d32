// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Subcommand implementations. Each returns a report that can be rendered
//! as text or JSON.

use anyhow::{Context, Result};
use roster_scope_core::{parse_scopes, RequiredScopes, Scope};
use roster_server_auth::{
	affordance_view, challenge, AuthorizationDecision, Credential, PrincipalId, RequestAuthorizer,
	RouteAccess, ScopeAffordance, ScopeAssignmentStore,
};
use serde::Serialize;
use std::fmt;

use crate::context::AuthzContext;

/// Where a command's assigned scopes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignedFrom {
	Explicit(Vec<String>),
	Principal(String),
}

#[derive(Debug, Serialize)]
pub struct CatalogueEntry {
	pub scope: Scope,
	pub description: String,
	pub includes: Vec<Scope>,
}

#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct CatalogueReport(pub Vec<CatalogueEntry>);

impl fmt::Display for CatalogueReport {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for entry in &self.0 {
			write!(f, "{:<14} {}", entry.scope, entry.description)?;
			if !entry.includes.is_empty() {
				let includes: Vec<&str> = entry.includes.iter().map(Scope::as_str).collect();
				write!(f, " (includes {})", includes.join(", "))?;
			}
			writeln!(f)?;
		}
		Ok(())
	}
}

pub fn catalogue(ctx: &AuthzContext) -> CatalogueReport {
	CatalogueReport(
		ctx.authority
			.catalogue()
			.definitions()
			.into_iter()
			.map(|d| CatalogueEntry {
				scope: d.name,
				description: d.description,
				includes: d.includes,
			})
			.collect(),
	)
}

#[derive(Debug, Serialize)]
pub struct DescribeReport {
	pub scope: Scope,
	pub description: Option<String>,
}

impl fmt::Display for DescribeReport {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match &self.description {
			Some(description) => writeln!(f, "{}: {description}", self.scope),
			None => writeln!(f, "{}: unknown scope", self.scope),
		}
	}
}

pub fn describe(ctx: &AuthzContext, scope: &str) -> Result<DescribeReport> {
	let scope = Scope::parse(scope).context("invalid scope name")?;
	let description = ctx.authority.describe(&scope).map(str::to_string);
	Ok(DescribeReport { scope, description })
}

#[derive(Debug, Serialize)]
pub struct CheckReport {
	pub permitted: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub principal: Option<PrincipalId>,
	pub required: RequiredScopes,
	pub assigned: Vec<Scope>,
	pub unsatisfied: Vec<Scope>,
	pub challenge: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub message: Option<String>,
}

impl fmt::Display for CheckReport {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		writeln!(
			f,
			"decision:    {}",
			if self.permitted { "permitted" } else { "denied" }
		)?;
		if let Some(principal) = &self.principal {
			writeln!(f, "principal:   {principal}")?;
		}
		writeln!(f, "required:    {}", self.required.scope_str())?;
		writeln!(f, "assigned:    {}", join(&self.assigned))?;
		if !self.unsatisfied.is_empty() {
			writeln!(f, "unsatisfied: {}", join(&self.unsatisfied))?;
		}
		if let Some(message) = &self.message {
			writeln!(f, "message:     {message}")?;
		}
		if !self.permitted {
			writeln!(f, "challenge:   {}", self.challenge)?;
		}
		Ok(())
	}
}

/// Check a requirement against explicit scopes or a principal's assignment.
///
/// A principal goes through the full request flow with a freshly issued
/// token, so the result matches what the service would decide.
pub async fn check(
	ctx: &AuthzContext,
	required: &[String],
	assigned_from: AssignedFrom,
) -> Result<CheckReport> {
	let required = RequiredScopes::parse(required).context("invalid required scope")?;

	match assigned_from {
		AssignedFrom::Explicit(names) => {
			let assigned = parse_scopes(&names).context("invalid assigned scope")?;
			let permitted = ctx.authority.is_satisfied(&required, &assigned);
			Ok(CheckReport {
				permitted,
				principal: None,
				unsatisfied: if permitted {
					Vec::new()
				} else {
					ctx.authority.unsatisfied(&required, &assigned)
				},
				challenge: challenge(&required),
				message: None,
				required,
				assigned,
			})
		}
		AssignedFrom::Principal(email) => {
			let principal = PrincipalId::parse(&email).context("invalid principal")?;
			let resolver = ctx.identity_resolver();
			let token = resolver.issue(principal.clone()).await;
			let authorizer = RequestAuthorizer::new(ctx.authority.clone(), resolver.clone());

			let decision = authorizer
				.authorize(Some(&Credential::Bearer(token.clone())), &required)
				.await;
			resolver.revoke(&token).await;

			let assigned = ctx
				.assignments
				.scopes_for(&principal)
				.await?
				.unwrap_or_default();

			Ok(match decision {
				AuthorizationDecision::Permitted { principal, scopes } => CheckReport {
					permitted: true,
					principal: Some(principal),
					challenge: challenge(&required),
					required,
					assigned: scopes,
					unsatisfied: Vec::new(),
					message: None,
				},
				AuthorizationDecision::Denied(denial) => CheckReport {
					permitted: false,
					principal: denial.principal.or(Some(principal)),
					required,
					assigned,
					unsatisfied: denial.missing,
					challenge: denial.challenge,
					message: Some(denial.message),
				},
			})
		}
	}
}

#[derive(Debug, Serialize)]
pub struct AffordancesReport {
	pub bypass: bool,
	pub affordances: Vec<ScopeAffordance>,
}

impl fmt::Display for AffordancesReport {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.bypass {
			writeln!(f, "(UI bypass enabled: all controls shown)")?;
		}
		for affordance in &self.affordances {
			writeln!(
				f,
				"[{}] {:<14} {}",
				if affordance.enabled { "x" } else { " " },
				affordance.scope,
				affordance.description.as_deref().unwrap_or("unknown scope"),
			)?;
		}
		Ok(())
	}
}

pub async fn affordances(
	ctx: &AuthzContext,
	candidates: &[String],
	assigned_from: AssignedFrom,
	force_bypass: bool,
) -> Result<AffordancesReport> {
	let candidates = parse_scopes(candidates).context("invalid candidate scope")?;
	let assigned = match assigned_from {
		AssignedFrom::Explicit(names) => parse_scopes(&names).context("invalid assigned scope")?,
		AssignedFrom::Principal(email) => {
			let principal = PrincipalId::parse(&email).context("invalid principal")?;
			ctx.assignments
				.scopes_for(&principal)
				.await?
				.unwrap_or_default()
		}
	};

	let bypass = force_bypass || ctx.bypass_ui;
	Ok(AffordancesReport {
		bypass,
		affordances: affordance_view(&ctx.authority, &candidates, &assigned, bypass),
	})
}

#[derive(Debug, Serialize)]
pub struct RouteEntry {
	pub method: String,
	pub path: String,
	#[serde(flatten)]
	pub access: RouteAccess,
}

#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct RoutesReport(pub Vec<RouteEntry>);

impl fmt::Display for RoutesReport {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for route in &self.0 {
			let access = match &route.access {
				RouteAccess::Public => "public".to_string(),
				RouteAccess::Protected(required) if required.is_empty() => {
					"authenticated".to_string()
				}
				RouteAccess::Protected(required) => required.scope_str(),
			};
			writeln!(f, "{:<6} {:<40} {access}", route.method, route.path)?;
		}
		Ok(())
	}
}

pub fn routes(ctx: &AuthzContext) -> RoutesReport {
	RoutesReport(
		ctx.routes
			.iter()
			.map(|r| RouteEntry {
				method: r.method.to_string(),
				path: r.pattern.clone(),
				access: r.access.clone(),
			})
			.collect(),
	)
}

fn join(scopes: &[Scope]) -> String {
	if scopes.is_empty() {
		return "(none)".to_string();
	}
	scopes.iter().map(Scope::as_str).collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
	use super::*;
	use roster_server_config::ServerConfig;

	fn ctx() -> AuthzContext {
		AuthzContext::from_config(&ServerConfig::default()).unwrap()
	}

	fn names(list: &[&str]) -> Vec<String> {
		list.iter().map(|s| s.to_string()).collect()
	}

	mod catalogue {
		use super::*;

		#[test]
		fn lists_every_scope() {
			let report = super::super::catalogue(&ctx());
			assert_eq!(report.0.len(), 5);

			let text = report.to_string();
			assert!(text.contains("super:*"));
			assert!(text.contains("includes"));
		}
	}

	mod describe {
		use super::*;

		#[test]
		fn known_and_unknown_scopes() {
			let known = super::super::describe(&ctx(), "admin:read").unwrap();
			assert!(known.description.is_some());

			let unknown = super::super::describe(&ctx(), "payroll:read").unwrap();
			assert!(unknown.description.is_none());
			assert!(unknown.to_string().contains("unknown scope"));
		}

		#[test]
		fn malformed_scope_is_an_error() {
			assert!(super::super::describe(&ctx(), "bad scope").is_err());
		}
	}

	mod check {
		use super::*;

		#[tokio::test]
		async fn explicit_scopes_keep_the_asymmetry() {
			let report = super::super::check(
				&ctx(),
				&names(&["super:*"]),
				AssignedFrom::Explicit(names(&[
					"user:read",
					"user:write",
					"admin:read",
					"admin:write",
				])),
			)
			.await
			.unwrap();

			assert!(!report.permitted);
			assert_eq!(report.unsatisfied, vec![Scope::super_all()]);
			assert_eq!(report.challenge, "Bearer scope=\"super:*\"");
		}

		#[tokio::test]
		async fn principal_goes_through_request_flow() {
			let report = super::super::check(
				&ctx(),
				&names(&["user:read"]),
				AssignedFrom::Principal("kyoichi.maliniak.10005@gmail.com".to_string()),
			)
			.await
			.unwrap();

			assert!(!report.permitted);
			assert_eq!(report.message.as_deref(), Some("Not enough permissions"));
			assert_eq!(report.assigned, vec![Scope::admin_read(), Scope::admin_write()]);
		}

		#[tokio::test]
		async fn super_principal_is_permitted() {
			let report = super::super::check(
				&ctx(),
				&names(&["admin:write", "user:write"]),
				AssignedFrom::Principal("mary.sluis.10011@gmail.com".to_string()),
			)
			.await
			.unwrap();

			assert!(report.permitted);
			assert!(report.to_string().contains("permitted"));
		}

		#[tokio::test]
		async fn empty_requirement_is_permitted() {
			let report = super::super::check(&ctx(), &[], AssignedFrom::Explicit(vec![]))
				.await
				.unwrap();
			assert!(report.permitted);
			assert_eq!(report.challenge, "Bearer");
		}
	}

	mod affordances {
		use super::*;

		#[tokio::test]
		async fn principal_without_scopes_sees_nothing_enabled() {
			let report = super::super::affordances(
				&ctx(),
				&names(&["user:read", "admin:read"]),
				AssignedFrom::Principal("moss.shanbhogue.10045@gmail.com".to_string()),
				false,
			)
			.await
			.unwrap();

			assert!(!report.bypass);
			assert!(report.affordances.iter().all(|a| !a.enabled));
		}

		#[tokio::test]
		async fn bypass_flag_enables_everything() {
			let report = super::super::affordances(
				&ctx(),
				&names(&["user:read", "admin:read"]),
				AssignedFrom::Explicit(vec![]),
				true,
			)
			.await
			.unwrap();

			assert!(report.bypass);
			assert!(report.affordances.iter().all(|a| a.enabled));
		}
	}

	#[test]
	fn routes_report_renders_access() {
		let report = routes(&ctx());
		let text = report.to_string();
		assert!(text.contains("/auth/login"));
		assert!(text.contains("public"));
		assert!(text.contains("admin:write"));

		let json = serde_json::to_value(&report).unwrap();
		assert_eq!(json[0]["access"], "public");
	}
}
