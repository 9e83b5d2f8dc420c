//! Organization synchronization client for the port-authority admin portal.
//!
//! The [`domain`] module holds the entities, wire mapping, user
//! reconciliation and the [`domain::OrganizationStore`]. Adapters for the
//! backend REST API and the cache mirror live in [`outbound`]; runtime
//! settings are in [`config`].

pub mod config;
pub mod domain;
pub mod outbound;

pub use config::OrgSyncSettings;
