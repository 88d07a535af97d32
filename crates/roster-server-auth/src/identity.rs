// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Credential resolution.
//!
//! An [`IdentityResolver`] turns a presented [`Credential`] into the
//! principal it belongs to and that principal's assigned scopes.
//! [`InMemoryIdentityResolver`] keeps issued tokens in memory and reads
//! scopes from a [`ScopeAssignmentStore`] on every resolution, so a changed
//! assignment takes effect without re-issuing tokens.
//!
//! Every token carries an expiry. An expired token resolves exactly like an
//! unknown one and is dropped from the table.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use roster_scope_core::Scope;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

use crate::assignment::{AssignmentError, ScopeAssignmentStore};
use crate::credential::Credential;
use crate::principal::PrincipalId;

/// Prefix for tokens issued by [`InMemoryIdentityResolver`].
pub const TOKEN_PREFIX: &str = "rs_";

/// Random bytes per issued token.
const TOKEN_BYTES: usize = 32;

/// Lifetime of an issued token unless overridden with
/// [`InMemoryIdentityResolver::with_ttl`].
pub const DEFAULT_ACCESS_TOKEN_TTL_SECS: u64 = 30 * 60;

#[derive(Debug, Error)]
pub enum IdentityError {
	#[error("credential is not recognised")]
	InvalidCredential,

	#[error("principal {0} is not known to the assignment store")]
	UnknownPrincipal(PrincipalId),

	#[error(transparent)]
	Store(#[from] AssignmentError),
}

/// A credential resolved to its principal and assigned scopes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedIdentity {
	pub principal: PrincipalId,
	pub scopes: Vec<Scope>,
}

#[async_trait]
pub trait IdentityResolver: Send + Sync {
	async fn resolve(&self, credential: &Credential) -> Result<ResolvedIdentity, IdentityError>;
}

/// An issued token's holder and expiry.
#[derive(Debug, Clone)]
struct IssuedToken {
	principal: PrincipalId,
	expires_at: DateTime<Utc>,
}

impl IssuedToken {
	fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
		now >= self.expires_at
	}
}

/// Token table kept in process memory.
///
/// Bearer and session credentials share one table: the session cookie
/// carries the same token a programmatic client would send as a bearer.
pub struct InMemoryIdentityResolver {
	tokens: RwLock<HashMap<String, IssuedToken>>,
	store: Arc<dyn ScopeAssignmentStore>,
	ttl: Duration,
}

impl InMemoryIdentityResolver {
	pub fn new(store: Arc<dyn ScopeAssignmentStore>) -> Self {
		Self {
			tokens: RwLock::new(HashMap::new()),
			store,
			ttl: ttl_from_secs(DEFAULT_ACCESS_TOKEN_TTL_SECS),
		}
	}

	/// Set the lifetime of issued tokens.
	pub fn with_ttl(mut self, ttl: Duration) -> Self {
		self.ttl = ttl;
		self
	}

	/// Same as [`with_ttl`](Self::with_ttl), in whole seconds.
	pub fn with_ttl_secs(self, secs: u64) -> Self {
		self.with_ttl(ttl_from_secs(secs))
	}

	pub fn ttl(&self) -> Duration {
		self.ttl
	}

	/// Issue a fresh token for `principal`. Expired tokens are pruned first.
	#[instrument(level = "debug", skip_all, fields(principal = %principal))]
	pub async fn issue(&self, principal: PrincipalId) -> String {
		let now = Utc::now();
		let token = generate_token();
		let expires_at = self.expiry_from(now);

		let mut tokens = self.tokens.write().await;
		prune(&mut tokens, now);
		tokens.insert(
			token.clone(),
			IssuedToken {
				principal,
				expires_at,
			},
		);
		info!(expires_at = %expires_at, "issued access token");
		token
	}

	/// Register a known token with the configured lifetime. Replaces any
	/// existing mapping.
	pub async fn insert_token(&self, token: impl Into<String>, principal: PrincipalId) {
		let expires_at = self.expiry_from(Utc::now());
		self.insert_token_expiring_at(token, principal, expires_at).await;
	}

	/// Register a known token with an explicit expiry.
	pub async fn insert_token_expiring_at(
		&self,
		token: impl Into<String>,
		principal: PrincipalId,
		expires_at: DateTime<Utc>,
	) {
		self.tokens.write().await.insert(
			token.into(),
			IssuedToken {
				principal,
				expires_at,
			},
		);
	}

	/// Revoke a single token. Returns false if it was not issued.
	pub async fn revoke(&self, token: &str) -> bool {
		let removed = self.tokens.write().await.remove(token);
		if let Some(issued) = &removed {
			info!(principal = %issued.principal, "revoked access token");
		}
		removed.is_some()
	}

	/// Revoke every token held by `principal`. Returns how many were removed.
	pub async fn revoke_principal(&self, principal: &PrincipalId) -> usize {
		let mut tokens = self.tokens.write().await;
		let before = tokens.len();
		tokens.retain(|_, issued| &issued.principal != principal);
		let removed = before - tokens.len();
		info!(principal = %principal, removed, "revoked all access tokens");
		removed
	}

	fn expiry_from(&self, now: DateTime<Utc>) -> DateTime<Utc> {
		now.checked_add_signed(self.ttl).unwrap_or(DateTime::<Utc>::MAX_UTC)
	}

	/// Drop every expired token. Returns how many were removed.
	pub async fn prune_expired(&self) -> usize {
		prune(&mut *self.tokens.write().await, Utc::now())
	}

	/// Number of tokens that have not yet expired.
	pub async fn active_tokens(&self) -> usize {
		let now = Utc::now();
		self.tokens
			.read()
			.await
			.values()
			.filter(|issued| !issued.is_expired_at(now))
			.count()
	}
}

#[async_trait]
impl IdentityResolver for InMemoryIdentityResolver {
	#[instrument(level = "debug", skip_all, fields(credential_kind = credential.kind()))]
	async fn resolve(&self, credential: &Credential) -> Result<ResolvedIdentity, IdentityError> {
		let now = Utc::now();
		let issued = self
			.tokens
			.read()
			.await
			.get(credential.token())
			.cloned()
			.ok_or(IdentityError::InvalidCredential)?;

		if issued.is_expired_at(now) {
			let removed = prune(&mut *self.tokens.write().await, now);
			debug!(principal = %issued.principal, removed, "access token expired");
			return Err(IdentityError::InvalidCredential);
		}

		let principal = issued.principal;

		let scopes = self
			.store
			.scopes_for(&principal)
			.await?
			.ok_or_else(|| IdentityError::UnknownPrincipal(principal.clone()))?;

		debug!(principal = %principal, scopes = scopes.len(), "credential resolved");
		Ok(ResolvedIdentity { principal, scopes })
	}
}

fn prune(tokens: &mut HashMap<String, IssuedToken>, now: DateTime<Utc>) -> usize {
	let before = tokens.len();
	tokens.retain(|_, issued| !issued.is_expired_at(now));
	before - tokens.len()
}

fn ttl_from_secs(secs: u64) -> Duration {
	i64::try_from(secs)
		.ok()
		.and_then(Duration::try_seconds)
		.unwrap_or(Duration::MAX)
}

fn generate_token() -> String {
	let mut bytes = [0u8; TOKEN_BYTES];
	rand::thread_rng().fill_bytes(&mut bytes);
	format!("{TOKEN_PREFIX}{}", hex::encode(bytes))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::assignment::StaticScopeAssignments;

	fn principal(email: &str) -> PrincipalId {
		PrincipalId::parse(email).unwrap()
	}

	fn demo_resolver() -> InMemoryIdentityResolver {
		InMemoryIdentityResolver::new(Arc::new(StaticScopeAssignments::demo()))
	}

	#[test]
	fn generated_tokens_are_prefixed_and_unique() {
		let a = generate_token();
		let b = generate_token();
		assert!(a.starts_with(TOKEN_PREFIX));
		assert_eq!(a.len(), TOKEN_PREFIX.len() + TOKEN_BYTES * 2);
		assert_ne!(a, b);
	}

	#[tokio::test]
	async fn issued_token_resolves_through_either_transport() {
		let resolver = demo_resolver();
		let token = resolver
			.issue(principal("behai_nguyen@hotmail.com"))
			.await;

		for credential in [
			Credential::Bearer(token.clone()),
			Credential::Session(token.clone()),
		] {
			let identity = resolver.resolve(&credential).await.unwrap();
			assert_eq!(identity.principal, principal("behai_nguyen@hotmail.com"));
			assert_eq!(identity.scopes, vec![Scope::user_read(), Scope::user_write()]);
		}
	}

	#[tokio::test]
	async fn unknown_token_is_invalid() {
		let resolver = demo_resolver();
		let result = resolver
			.resolve(&Credential::Bearer("rs_forged".to_string()))
			.await;
		assert!(matches!(result, Err(IdentityError::InvalidCredential)));
	}

	#[tokio::test]
	async fn revoked_token_no_longer_resolves() {
		let resolver = demo_resolver();
		let token = resolver.issue(principal("mary.sluis.10011@gmail.com")).await;

		assert!(resolver.revoke(&token).await);
		assert!(!resolver.revoke(&token).await);
		let result = resolver.resolve(&Credential::Bearer(token)).await;
		assert!(matches!(result, Err(IdentityError::InvalidCredential)));
	}

	#[tokio::test]
	async fn revoke_principal_drops_all_their_tokens() {
		let resolver = demo_resolver();
		let mary = principal("mary.sluis.10011@gmail.com");
		resolver.issue(mary.clone()).await;
		resolver.issue(mary.clone()).await;
		resolver.issue(principal("behai_nguyen@hotmail.com")).await;

		assert_eq!(resolver.revoke_principal(&mary).await, 2);
		assert_eq!(resolver.active_tokens().await, 1);
	}

	mod expiry {
		use super::*;

		#[tokio::test]
		async fn token_stops_resolving_after_its_ttl() {
			let resolver = demo_resolver().with_ttl(Duration::milliseconds(50));
			let token = resolver.issue(principal("behai_nguyen@hotmail.com")).await;

			assert!(resolver
				.resolve(&Credential::Bearer(token.clone()))
				.await
				.is_ok());

			tokio::time::sleep(std::time::Duration::from_millis(120)).await;

			let result = resolver.resolve(&Credential::Bearer(token)).await;
			assert!(matches!(result, Err(IdentityError::InvalidCredential)));
			assert_eq!(resolver.active_tokens().await, 0);
		}

		#[tokio::test]
		async fn expired_token_is_removed_on_resolution() {
			let resolver = demo_resolver();
			resolver
				.insert_token_expiring_at(
					"rs_stale",
					principal("behai_nguyen@hotmail.com"),
					Utc::now() - Duration::seconds(1),
				)
				.await;
			resolver
				.insert_token("rs_fresh", principal("behai_nguyen@hotmail.com"))
				.await;

			let result = resolver
				.resolve(&Credential::Session("rs_stale".to_string()))
				.await;
			assert!(matches!(result, Err(IdentityError::InvalidCredential)));
			assert!(!resolver.revoke("rs_stale").await);
			assert!(resolver.revoke("rs_fresh").await);
		}

		#[tokio::test]
		async fn issuing_prunes_expired_tokens() {
			let resolver = demo_resolver();
			let mary = principal("mary.sluis.10011@gmail.com");
			for i in 0..10 {
				resolver
					.insert_token_expiring_at(
						format!("rs_old_{i}"),
						mary.clone(),
						Utc::now() - Duration::seconds(1),
					)
					.await;
			}

			resolver.issue(mary.clone()).await;

			assert_eq!(resolver.active_tokens().await, 1);
			assert_eq!(resolver.prune_expired().await, 0);
			assert_eq!(resolver.revoke_principal(&mary).await, 1);
		}

		#[test]
		fn default_ttl_is_thirty_minutes() {
			let resolver = demo_resolver();
			assert_eq!(resolver.ttl(), Duration::minutes(30));
			assert_eq!(resolver.with_ttl_secs(2).ttl(), Duration::seconds(2));
		}

		#[tokio::test]
		async fn oversized_ttl_saturates() {
			let resolver = demo_resolver().with_ttl_secs(u64::MAX);
			assert_eq!(resolver.ttl(), Duration::MAX);

			let token = resolver.issue(principal("behai_nguyen@hotmail.com")).await;
			assert!(resolver.resolve(&Credential::Bearer(token)).await.is_ok());
		}
	}

	#[tokio::test]
	async fn principal_missing_from_strict_store_is_unknown() {
		let resolver = InMemoryIdentityResolver::new(Arc::new(StaticScopeAssignments::new()));
		resolver
			.insert_token("rs_fixed", principal("guest@example.com"))
			.await;

		let result = resolver
			.resolve(&Credential::Session("rs_fixed".to_string()))
			.await;
		assert!(matches!(result, Err(IdentityError::UnknownPrincipal(_))));
	}
}
