// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authorization outcomes and their HTTP rendering.

use http::header::{CONTENT_TYPE, WWW_AUTHENTICATE};
use http::{HeaderValue, Response, StatusCode};
use roster_scope_core::{RequiredScopes, Scope};
use serde::Serialize;

use crate::identity::ResolvedIdentity;
use crate::principal::PrincipalId;

pub const NOT_AUTHENTICATED_MSG: &str = "Not authenticated";
pub const INVALID_AUTH_CREDENTIALS_MSG: &str = "Invalid authentication credentials";
pub const NOT_ENOUGH_PERMISSIONS_MSG: &str = "Not enough permissions";

/// Why a request was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialKind {
	/// No credential was presented.
	NotAuthenticated,
	/// A credential was presented but did not resolve to a principal.
	InvalidCredentials,
	/// The principal's scopes do not satisfy the requirement.
	InsufficientScope,
}

impl DenialKind {
	pub fn message(self) -> &'static str {
		match self {
			DenialKind::NotAuthenticated => NOT_AUTHENTICATED_MSG,
			DenialKind::InvalidCredentials => INVALID_AUTH_CREDENTIALS_MSG,
			DenialKind::InsufficientScope => NOT_ENOUGH_PERMISSIONS_MSG,
		}
	}
}

/// `WWW-Authenticate` challenge for a requirement.
///
/// `Bearer scope="a b"` when scopes are required, plain `Bearer` otherwise.
pub fn challenge(required: &RequiredScopes) -> String {
	if required.is_empty() {
		"Bearer".to_string()
	} else {
		format!("Bearer scope=\"{}\"", required.scope_str())
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Denial {
	pub kind: DenialKind,
	pub message: String,
	pub challenge: String,
	/// Set when the caller was identified but lacked scope.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub principal: Option<PrincipalId>,
	/// Required scopes the caller does not hold. Empty unless the kind is
	/// [`DenialKind::InsufficientScope`].
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub missing: Vec<Scope>,
}

impl Denial {
	pub fn new(kind: DenialKind, required: &RequiredScopes) -> Self {
		Self {
			kind,
			message: kind.message().to_string(),
			challenge: challenge(required),
			principal: None,
			missing: Vec::new(),
		}
	}

	pub fn insufficient_scope(
		principal: PrincipalId,
		required: &RequiredScopes,
		missing: Vec<Scope>,
	) -> Self {
		Self {
			principal: Some(principal),
			missing,
			..Self::new(DenialKind::InsufficientScope, required)
		}
	}

	/// Every denial is answered with 401 and a challenge, including
	/// insufficient scope.
	pub fn status(&self) -> StatusCode {
		StatusCode::UNAUTHORIZED
	}

	/// Render as a JSON `{"detail": ...}` response with a `WWW-Authenticate` header.
	pub fn into_response(self) -> Response<String> {
		let body = serde_json::json!({ "detail": self.message }).to_string();
		let challenge = HeaderValue::from_str(&self.challenge)
			.unwrap_or_else(|_| HeaderValue::from_static("Bearer"));

		let mut response = Response::new(body);
		*response.status_mut() = self.status();
		response.headers_mut().insert(WWW_AUTHENTICATE, challenge);
		response
			.headers_mut()
			.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
		response
	}
}

/// Final outcome of authorizing a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationDecision {
	Permitted {
		principal: PrincipalId,
		scopes: Vec<Scope>,
	},
	Denied(Denial),
}

impl AuthorizationDecision {
	pub fn permitted(identity: ResolvedIdentity) -> Self {
		Self::Permitted {
			principal: identity.principal,
			scopes: identity.scopes,
		}
	}

	pub fn is_permitted(&self) -> bool {
		matches!(self, Self::Permitted { .. })
	}

	pub fn principal(&self) -> Option<&PrincipalId> {
		match self {
			Self::Permitted { principal, .. } => Some(principal),
			Self::Denied(denial) => denial.principal.as_ref(),
		}
	}

	pub fn denial(&self) -> Option<&Denial> {
		match self {
			Self::Permitted { .. } => None,
			Self::Denied(denial) => Some(denial),
		}
	}
}
