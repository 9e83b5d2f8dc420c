//! Cache mirror adapters implementing the `OrganizationCache` port.
//!
//! - `InMemoryOrganizationCache` keeps the snapshot in process and answers
//!   id lookups.
//! - `FileOrganizationCache` persists a versioned JSON snapshot on disk.

mod file;
mod memory;

pub use file::{CACHE_DATA_VERSION, CACHE_FILE_NAME, FileOrganizationCache};
pub use memory::InMemoryOrganizationCache;
