// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Request authorization for the Roster employee directory.
//!
//! This crate connects HTTP requests to the scope model in
//! [`roster_scope_core`]:
//!
//! - **Credentials**: session cookie or bearer token ([`credential`])
//! - **Identity**: token to principal and assigned scopes ([`identity`], [`assignment`])
//! - **Decisions**: permit or deny with a `WWW-Authenticate` challenge ([`decision`])
//! - **Routes**: the scopes each endpoint requires ([`routes`])
//! - **UI**: which scope-gated controls to enable ([`affordance`])
//!
//! [`RequestAuthorizer`] ties these together.

pub mod affordance;
pub mod assignment;
pub mod authorizer;
pub mod credential;
pub mod decision;
pub mod identity;
pub mod principal;
pub mod routes;

pub use affordance::{affordance_view, ScopeAffordance};
pub use assignment::{AssignmentError, ScopeAssignmentStore, StaticScopeAssignments};
pub use authorizer::{AuthorizationState, RequestAuthorizer, RouteAuthorization};
pub use credential::{
	extract_bearer_token, extract_credential, extract_session_cookie_with_name, Credential,
	SESSION_COOKIE_NAME,
};
pub use decision::{
	challenge, AuthorizationDecision, Denial, DenialKind, INVALID_AUTH_CREDENTIALS_MSG,
	NOT_AUTHENTICATED_MSG, NOT_ENOUGH_PERMISSIONS_MSG,
};
pub use identity::{
	IdentityError, IdentityResolver, InMemoryIdentityResolver, ResolvedIdentity,
	DEFAULT_ACCESS_TOKEN_TTL_SECS, TOKEN_PREFIX,
};
pub use principal::{PrincipalError, PrincipalId};
pub use routes::{RouteAccess, RouteRequirement, RouteTable};
