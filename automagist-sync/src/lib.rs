//! # automagist-sync
//!
//! Remote-document capability and the code that drives it.
//!
//! Call [`register`] / [`unregister`] for CLI mutations, and hand
//! [`ChangeEvent`](automagist_core::ChangeEvent)s to a [`SyncDriver`] to push
//! new content. [`GistClient`] is the GitHub implementation of
//! [`RemoteDocuments`].

pub mod driver;
pub mod error;
pub mod gist;
pub mod registration;
pub mod remote;

pub use driver::{SyncDriver, SyncOutcome};
pub use error::SyncError;
pub use gist::GistClient;
pub use registration::{register, unregister, AddOutcome, RemoteTarget, RemoveOutcome};
pub use remote::RemoteDocuments;
