// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Per-request authorization.
//!
//! Every request walks the same states:
//!
//! ```text
//! Unauthenticated ──credential resolves──▶ IdentityResolved ──scope check──▶ ScopeChecked
//!        │                                                                    (Permitted|Denied)
//!        └──no credential / resolution fails──────────────────────────────▶ ScopeChecked(Denied)
//! ```
//!
//! An empty requirement still needs an authenticated caller. Routes that
//! need no caller at all are marked [`RouteAccess::Public`] instead.
//!
//! # Security
//!
//! Decisions are logged with the principal and the required scopes, never
//! with the presented token.

use http::{HeaderMap, Method};
use roster_scope_core::{RequiredScopes, ScopeAuthority};
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::credential::{extract_credential, Credential, SESSION_COOKIE_NAME};
use crate::decision::{AuthorizationDecision, Denial, DenialKind};
use crate::identity::{IdentityResolver, ResolvedIdentity};
use crate::routes::{RouteAccess, RouteTable};

/// Where a request is in the authorization flow.
#[derive(Debug)]
pub enum AuthorizationState {
	Unauthenticated,
	IdentityResolved(ResolvedIdentity),
	ScopeChecked(AuthorizationDecision),
}

/// Outcome of authorizing against a [`RouteTable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteAuthorization {
	/// No route matches the method and path.
	NoRoute,
	/// The route is public; no credential was consulted.
	Public,
	Decided(AuthorizationDecision),
}

pub struct RequestAuthorizer {
	authority: ScopeAuthority,
	resolver: Arc<dyn IdentityResolver>,
	session_cookie_name: String,
}

impl RequestAuthorizer {
	pub fn new(authority: ScopeAuthority, resolver: Arc<dyn IdentityResolver>) -> Self {
		Self {
			authority,
			resolver,
			session_cookie_name: SESSION_COOKIE_NAME.to_string(),
		}
	}

	pub fn with_session_cookie_name(mut self, name: impl Into<String>) -> Self {
		self.session_cookie_name = name.into();
		self
	}

	pub fn authority(&self) -> &ScopeAuthority {
		&self.authority
	}

	pub fn session_cookie_name(&self) -> &str {
		&self.session_cookie_name
	}

	/// Run the full flow for an already-extracted credential.
	#[instrument(level = "debug", skip_all, fields(required = %required.scope_str()))]
	pub async fn authorize(
		&self,
		credential: Option<&Credential>,
		required: &RequiredScopes,
	) -> AuthorizationDecision {
		let mut state = AuthorizationState::Unauthenticated;

		loop {
			state = match state {
				AuthorizationState::Unauthenticated => self.resolve(credential, required).await,
				AuthorizationState::IdentityResolved(identity) => {
					AuthorizationState::ScopeChecked(self.check(identity, required))
				}
				AuthorizationState::ScopeChecked(decision) => return decision,
			};
		}
	}

	/// Extract the credential from `headers`, then authorize.
	pub async fn authorize_request(
		&self,
		headers: &HeaderMap,
		required: &RequiredScopes,
	) -> AuthorizationDecision {
		let credential = extract_credential(headers, &self.session_cookie_name);
		self.authorize(credential.as_ref(), required).await
	}

	/// Look up the route and authorize against its declared access.
	pub async fn authorize_route(
		&self,
		routes: &RouteTable,
		method: &Method,
		path: &str,
		headers: &HeaderMap,
	) -> RouteAuthorization {
		let Some(route) = routes.lookup(method, path) else {
			debug!(%method, path, "no route requirement declared");
			return RouteAuthorization::NoRoute;
		};

		match &route.access {
			RouteAccess::Public => RouteAuthorization::Public,
			RouteAccess::Protected(required) => {
				RouteAuthorization::Decided(self.authorize_request(headers, required).await)
			}
		}
	}

	/// Scope check for an identity that has already been resolved.
	pub fn check(&self, identity: ResolvedIdentity, required: &RequiredScopes) -> AuthorizationDecision {
		if self.authority.is_satisfied(required, &identity.scopes) {
			debug!(
				principal = %identity.principal,
				required = %required.scope_str(),
				"scope check passed"
			);
			return AuthorizationDecision::permitted(identity);
		}

		let missing = self.authority.unsatisfied(required, &identity.scopes);
		info!(
			principal = %identity.principal,
			required = %required.scope_str(),
			missing = ?missing.iter().map(|s| s.as_str()).collect::<Vec<_>>(),
			"authorization denied: insufficient scope"
		);
		AuthorizationDecision::Denied(Denial::insufficient_scope(
			identity.principal,
			required,
			missing,
		))
	}

	async fn resolve(
		&self,
		credential: Option<&Credential>,
		required: &RequiredScopes,
	) -> AuthorizationState {
		let Some(credential) = credential else {
			debug!("authorization denied: not authenticated");
			return AuthorizationState::ScopeChecked(AuthorizationDecision::Denied(Denial::new(
				DenialKind::NotAuthenticated,
				required,
			)));
		};

		match self.resolver.resolve(credential).await {
			Ok(identity) => AuthorizationState::IdentityResolved(identity),
			Err(e) => {
				info!(
					credential_kind = credential.kind(),
					error = %e,
					"authorization denied: credential did not resolve"
				);
				AuthorizationState::ScopeChecked(AuthorizationDecision::Denied(Denial::new(
					DenialKind::InvalidCredentials,
					required,
				)))
			}
		}
	}
}
