// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core scope model for the Roster employee directory.
//!
//! This crate provides:
//! - [`Scope`] and [`RequiredScopes`]: validated capability names
//! - [`ScopeCatalogue`]: scope descriptions and the static inclusion table
//! - [`ScopeAuthority`]: the satisfaction check used on every request
//!
//! It performs no I/O beyond optionally reading a catalogue file at startup,
//! and holds no mutable state.
//!
//! # Example
//!
//! ```
//! use roster_scope_core::{RequiredScopes, Scope, ScopeAuthority};
//!
//! let authority = ScopeAuthority::standard();
//! let required = RequiredScopes::parse(["user:write"]).unwrap();
//! let assigned = vec![Scope::parse("super:*").unwrap()];
//!
//! assert!(authority.is_satisfied(&required, &assigned));
//! ```

pub mod authority;
pub mod catalogue;
pub mod error;
pub mod scope;

pub use authority::ScopeAuthority;
pub use catalogue::{InclusionEdge, ScopeCatalogue, ScopeCatalogueBuilder, ScopeDefinition};
pub use error::{CatalogueError, Result, ScopeError};
pub use scope::{
	parse_scopes, RequiredScopes, Scope, ADMIN_READ, ADMIN_WRITE, SUPER_ALL, USER_READ, USER_WRITE,
};
