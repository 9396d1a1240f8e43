//! Project storage for the XenonCode playground.
//!
//! A project is a directory named by its [`ProjectId`] under the configured
//! root. It holds flat source files named by [`FileName`]; there are no
//! sub-directories. Directories are created lazily by the first save.

mod error;
mod files;
mod locks;
pub mod naming;
mod store;

pub use error::StoreError;
pub use locks::{ProjectLock, ProjectLocks};
pub use naming::{FileName, NamingError, ProjectId};
pub use store::{EXAMPLE_PROGRAM, LoadOutcome, ProjectStore};

#[cfg(test)]
mod tests;
