//! HTTP outbound adapter.
//!
//! This module provides a reqwest implementation of the `OrganizationApi`
//! port together with the bearer token sources it consumes.

mod client;
mod token;

pub use client::{HttpClientBuildError, HttpOrganizationApi};
pub use token::{AccessTokenSource, StaticAccessToken};
