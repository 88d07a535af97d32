// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Partial configuration produced by a single source.

use serde::{Deserialize, Serialize};

use crate::sections::{AuthConfigLayer, LoggingConfigLayer, ScopesConfigLayer};

/// One source's view of the configuration. Unset sections are `None`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ServerConfigLayer {
	pub auth: Option<AuthConfigLayer>,
	pub scopes: Option<ScopesConfigLayer>,
	pub logging: Option<LoggingConfigLayer>,
}

impl ServerConfigLayer {
	/// Overlay `other` on top of `self`; values set in `other` win.
	pub fn merge(&mut self, other: Self) {
		merge_section(&mut self.auth, other.auth, AuthConfigLayer::merge);
		merge_section(&mut self.scopes, other.scopes, ScopesConfigLayer::merge);
		merge_section(&mut self.logging, other.logging, LoggingConfigLayer::merge);
	}
}

fn merge_section<T>(base: &mut Option<T>, overlay: Option<T>, merge: fn(&mut T, T)) {
	match (base.as_mut(), overlay) {
		(Some(existing), Some(overlay)) => merge(existing, overlay),
		(None, Some(overlay)) => *base = Some(overlay),
		(_, None) => {}
	}
}
