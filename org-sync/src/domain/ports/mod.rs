//! Domain ports for the organization backend and the cache mirror.

mod macros;
pub(crate) use macros::define_port_error;

mod organization_api;
mod organization_cache;

#[cfg(test)]
pub use organization_api::MockOrganizationApi;
pub use organization_api::{OrganizationApi, OrganizationApiError};
#[cfg(test)]
pub use organization_cache::MockOrganizationCache;
pub use organization_cache::{
    NoopOrganizationCache, OrganizationCache, OrganizationCacheError, OrganizationCacheUpdate,
    OrganizationSnapshot,
};
