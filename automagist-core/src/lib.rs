//! automagist core library: domain types, registry persistence, process marker.
//!
//! - [`types`]: newtypes and domain structs
//! - [`error`]: [`RegistryError`]
//! - [`registry`]: [`RegistryStore`] load / save / add / remove
//! - [`marker`]: process marker on [`RegistryStore`]
//! - [`config`]: optional [`Settings`]
//! - [`paths`]: file layout under the configuration root

pub mod config;
pub mod error;
pub mod marker;
pub mod paths;
pub mod registry;
pub mod types;

pub use config::Settings;
pub use error::RegistryError;
pub use registry::RegistryStore;
pub use types::{unix_now, ChangeEvent, FileStatus, Registry, RemoteId, TrackedFile};
