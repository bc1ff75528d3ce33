// SPDX-License-Identifier: MIT

//! Services module - business logic layer.

pub mod fixtures;
pub mod google_oidc;
pub mod youtube;

pub use fixtures::FixtureCatalog;
pub use google_oidc::{GoogleIdVerifier, OidcError, VerifiedIdentity};
pub use youtube::{ApiRequest, DataSource, Sourced, YouTubeService};
