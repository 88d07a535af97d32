// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections. Each has a partial `*Layer` and a resolved form.

mod auth;
mod logging;
mod scopes;

pub use auth::{AuthConfig, AuthConfigLayer, DEFAULT_ACCESS_TOKEN_TTL_SECS, DEFAULT_ENVIRONMENT};
pub use logging::{LoggingConfig, LoggingConfigLayer};
pub use scopes::{ScopesConfig, ScopesConfigLayer};
